//! Shared overlay ownership across network panels.
//!
//! Several network panels share one tooltip/popover slot. Each panel holds a
//! clone of the same [`SharedOverlay`] handle; showing content first releases
//! whatever another panel had up, so at most one overlay is visible.

use std::cell::RefCell;
use std::rc::Rc;

/// Identifies the panel that owns the overlay.
pub type OwnerId = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayContent {
    pub owner: OwnerId,
    pub text: String,
}

/// Cloneable handle to the single overlay slot.
#[derive(Debug, Clone, Default)]
pub struct SharedOverlay {
    current: Rc<RefCell<Option<OverlayContent>>>,
}

impl SharedOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `text` for `owner`. Returns the previous holder, if it was a
    /// different owner that got displaced.
    pub fn acquire(&self, owner: OwnerId, text: impl Into<String>) -> Option<OwnerId> {
        let mut slot = self.current.borrow_mut();
        let displaced = slot
            .take()
            .map(|previous| previous.owner)
            .filter(|&previous| previous != owner);
        if let Some(previous) = displaced {
            log::debug!("overlay released by {previous} for {owner}");
        }
        *slot = Some(OverlayContent {
            owner,
            text: text.into(),
        });
        displaced
    }

    /// Hide the overlay if `owner` holds it. Returns whether it did.
    pub fn release(&self, owner: OwnerId) -> bool {
        let mut slot = self.current.borrow_mut();
        if slot.as_ref().is_some_and(|c| c.owner == owner) {
            *slot = None;
            true
        } else {
            false
        }
    }

    pub fn holder(&self) -> Option<OwnerId> {
        self.current.borrow().as_ref().map(|c| c.owner)
    }

    pub fn content(&self) -> Option<OverlayContent> {
        self.current.borrow().clone()
    }
}
