//! # Core Module
//!
//! Stateless building blocks of the spin-lattice energy engine.
//!
//! ## Architecture
//!
//! - **Constants** ([`constants`]) - Physical constants and unit conversions
//! - **Geometry** ([`geometry`]) - Bravais lattices, site positions and the pair generator
//! - **Energy Models** ([`hamiltonian`]) - The `Hamiltonian` sum type and its variants
//! - **Manifold Math** ([`manifold`]) - Helpers for vectors constrained to the unit sphere
//! - **Model Files** ([`params`]) - TOML description of a geometry plus energy model
//!
//! ## Conventions
//!
//! Magnetic moments are measured in Bohr magnetons, energies in meV and lengths in Å.
//! Spin configurations are slices of unit `Vector3<f64>`, one per lattice site, indexed
//! as described in [`geometry::Geometry`].

pub mod constants;
pub mod geometry;
pub mod hamiltonian;
pub mod manifold;
pub mod params;
