//! # Geometry Module
//!
//! Bravais-lattice geometry and the pair generator that derives interaction pairs
//! from it.
//!
//! ## Key Components
//!
//! - [`lattice`] - The [`Geometry`] of a finite block of unit cells and its site indexing
//! - [`pairs`] - Deterministic enumeration of site pairs by radius or by neighbour shell,
//!   and the per-pair dipolar coupling and DMI normals
//!
//! Pairs are expressed between *cell atoms* with a translation in whole cells, so a
//! single [`Pair`] describes the same bond in every cell of the lattice. Whether the
//! bond exists for a given cell is decided at evaluation time from the boundary
//! conditions, see [`Geometry::pair_sites`].

pub mod lattice;
pub mod pairs;

pub use lattice::{Geometry, GeometryError};
pub use pairs::{
    MAX_SEARCH_CELLS, Pair, check_search_radius, ddi_from_pair, dmi_normal_from_pair,
    neighbours_in_shells, pairs_in_radius, shell_search_radius,
};
