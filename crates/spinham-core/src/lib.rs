//! # Spinham Core Library
//!
//! Energy, effective field and Hessian evaluation for lattices of classical magnetic
//! moments, together with a locked protocol for reconfiguring the energy model while
//! a simulation is running.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless lattice geometry, the pair generator that
//!   derives interaction pairs from it, the energy models (`Hamiltonian`) and the TOML
//!   model-file format. Nothing here knows about threads or locks.
//!
//! - **[`engine`]: The Stateful Layer.** Simulation images guarded by an exclusive lock,
//!   the chain/image container with index resolution, and the mutation and query
//!   operations that install new physical parameters into a live `Hamiltonian`.
//!
//! - **[`api`]: The Boundary.** One fault-isolated function per external call. Every
//!   failure is converted into a logged diagnostic keyed by image and chain index and
//!   the call returns a safe default instead of propagating an error.

pub mod api;
pub mod core;
pub mod engine;
