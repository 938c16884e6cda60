//! fr-core: stable foundation for fluxregime.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - ids (stable compact IDs for model internals)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{FrError, FrResult};
pub use ids::*;
pub use numeric::*;
