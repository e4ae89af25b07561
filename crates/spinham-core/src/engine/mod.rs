//! # Engine Module
//!
//! Stateful layer on top of the pure energy models: simulation images that own a
//! spin configuration and its [`Hamiltonian`](crate::core::hamiltonian::Hamiltonian),
//! the chain/image container, and the locked parameter-mutation protocol.
//!
//! ## Architecture
//!
//! - **Images** ([`image`]) - A spin configuration plus energy model behind one lock
//! - **State** ([`state`]) - Chains of images and resolution of `(image, chain)` indices
//! - **Mutation** ([`mutation`]) - Validating setters run under the image's exclusive lock
//! - **Queries** ([`query`]) - Getters that read a consistent snapshot of the model
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! ## Locking
//!
//! Every image carries a single read-write lock. Mutations hold the write guard for
//! their whole validate-install-recompute sequence, so a solver that evaluates under
//! [`SpinImage::lock`](image::SpinImage::lock) or
//! [`SpinImage::read`](image::SpinImage::read) never observes a half-applied change.

pub mod error;
pub mod image;
pub mod mutation;
pub mod query;
pub mod state;

pub use error::EngineError;
pub use image::{ImageData, SpinImage};
pub use mutation::MutationOutcome;
pub use state::{Chain, State};
