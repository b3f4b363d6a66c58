//! Layout algorithms for graph visualization.
//!
//! CPU-side placement that seeds node positions before the render layer's
//! own simulation takes over.

pub mod radial;

pub use radial::{RadialLayoutConfig, compute_radial_layout};
