//! Crate-level tests that drive the whole tick loop.
//!
//! - `determinism.rs`: same seed and inputs give identical state
//! - `integration.rs`: end-to-end scenarios through [`GameCore`](crate::GameCore)
//! - `helpers.rs`: a lightweight `World` fixture shared with the unit tests

pub(crate) mod helpers;
