use super::lattice::{Geometry, GeometryError};
use crate::core::constants::DIPOLAR_PREFACTOR;
use nalgebra::Vector3;
use tracing::{instrument, trace, warn};

const DISTANCE_TOLERANCE: f64 = 1e-6;

/// Upper bound on the number of cell translations a single search may visit.
pub const MAX_SEARCH_CELLS: usize = 1 << 20;

/// A bond from cell atom `i` to cell atom `j` in the cell displaced by `translation`.
///
/// Pairs are produced only by the generators in this module. Interaction magnitudes
/// and normals live in parallel arrays owned by the energy model that consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pair {
    pub i: usize,
    pub j: usize,
    pub translation: [i32; 3],
}

impl Pair {
    pub fn new(i: usize, j: usize, translation: [i32; 3]) -> Self {
        Self { i, j, translation }
    }

    /// The same bond seen from atom `j`.
    pub fn reversed(&self) -> Self {
        let [a, b, c] = self.translation;
        Self::new(self.j, self.i, [-a, -b, -c])
    }

    /// Of a pair and its reverse exactly one is canonical: the one with `i < j`,
    /// or for `i == j` the one whose translation is lexicographically positive.
    pub fn is_canonical(&self) -> bool {
        self.i < self.j || (self.i == self.j && self.translation > [0, 0, 0])
    }
}

struct Candidate {
    pair: Pair,
    distance: f64,
}

fn translation_extents(geometry: &Geometry, radius: f64) -> [f64; 3] {
    let spread = (0..geometry.n_cell_atoms())
        .map(|ibasis| geometry.cell_atom_position(ibasis).norm())
        .fold(0.0, f64::max);

    let mut extents = [0.0; 3];
    for (axis, extent) in extents.iter_mut().enumerate() {
        if geometry.n_cells()[axis] > 1 {
            *extent = ((radius + 2.0 * spread) / geometry.plane_spacing(axis)).ceil();
        }
    }
    extents
}

/// Checks that a search out to `radius` Å visits at most [`MAX_SEARCH_CELLS`] cells.
pub fn check_search_radius(geometry: &Geometry, radius: f64) -> Result<(), GeometryError> {
    let cells: f64 = translation_extents(geometry, radius)
        .iter()
        .map(|extent| 2.0 * extent + 1.0)
        .product();
    if !radius.is_finite() || !(cells <= MAX_SEARCH_CELLS as f64) {
        return Err(GeometryError::SearchRadiusTooLarge {
            radius,
            limit: MAX_SEARCH_CELLS,
        });
    }
    Ok(())
}

/// Radius that contains the first `n_shells` neighbour shells of every cell atom.
pub fn shell_search_radius(geometry: &Geometry, n_shells: usize) -> f64 {
    // Repeating the shortest translation `n_shells` times already produces `n_shells`
    // distinct distances, so no shell of interest lies beyond this radius.
    match geometry.shortest_active_translation() {
        Some(length) => n_shells as f64 * length,
        None => (0..geometry.n_cell_atoms())
            .flat_map(|i| {
                (0..geometry.n_cell_atoms()).map(move |j| {
                    geometry
                        .pair_displacement(&Pair::new(i, j, [0, 0, 0]))
                        .norm()
                })
            })
            .fold(0.0, f64::max),
    }
}

/// All bonds starting at cell atom `i` with `0 < d ≤ radius`, in deterministic order.
///
/// The radius must have passed [`check_search_radius`].
fn candidates_from(geometry: &Geometry, i: usize, radius: f64) -> Vec<Candidate> {
    let [ba, bb, bc] = translation_extents(geometry, radius).map(|extent| extent as i32);
    let mut candidates = Vec::new();
    for ta in -ba..=ba {
        for tb in -bb..=bb {
            for tc in -bc..=bc {
                for j in 0..geometry.n_cell_atoms() {
                    let pair = Pair::new(i, j, [ta, tb, tc]);
                    let distance = geometry.pair_displacement(&pair).norm();
                    if distance > DISTANCE_TOLERANCE && distance <= radius + DISTANCE_TOLERANCE {
                        candidates.push(Candidate { pair, distance });
                    }
                }
            }
        }
    }
    candidates
}

/// Enumerates every unordered pair of sites whose separation is at most `radius` Å.
///
/// Each bond appears once, in canonical orientation (see [`Pair::is_canonical`]).
/// The output is ordered by cell atom `i`, then by translation, then by `j`, and is
/// identical for identical inputs. A non-positive radius yields no pairs, and so does
/// one rejected by [`check_search_radius`].
#[instrument(skip(geometry), level = "debug")]
pub fn pairs_in_radius(geometry: &Geometry, radius: f64) -> Vec<Pair> {
    if !(radius > 0.0) {
        return Vec::new();
    }
    if let Err(e) = check_search_radius(geometry, radius) {
        warn!("{}", e);
        return Vec::new();
    }
    let pairs: Vec<Pair> = (0..geometry.n_cell_atoms())
        .flat_map(|i| candidates_from(geometry, i, radius))
        .map(|candidate| candidate.pair)
        .filter(Pair::is_canonical)
        .collect();
    trace!(n_pairs = pairs.len(), "Generated pairs in radius.");
    pairs
}

/// Enumerates the pairs of the first `n_shells` neighbour shells.
///
/// The shells of cell atom `i` are its distinct neighbour distances in ascending order.
/// Every canonical pair is returned together with the index of the shell it belongs to
/// as seen from atom `i`.
#[instrument(skip(geometry), level = "debug")]
pub fn neighbours_in_shells(geometry: &Geometry, n_shells: usize) -> Vec<(Pair, usize)> {
    if n_shells == 0 {
        return Vec::new();
    }

    let search_radius = shell_search_radius(geometry, n_shells);
    if let Err(e) = check_search_radius(geometry, search_radius) {
        warn!("{}", e);
        return Vec::new();
    }

    let mut shell_pairs = Vec::new();
    for i in 0..geometry.n_cell_atoms() {
        let candidates = candidates_from(geometry, i, search_radius);

        let mut shell_radii: Vec<f64> = Vec::with_capacity(n_shells);
        let mut distances: Vec<f64> = candidates.iter().map(|c| c.distance).collect();
        distances.sort_by(|a, b| a.total_cmp(b));
        for distance in distances {
            if shell_radii.len() == n_shells {
                break;
            }
            match shell_radii.last() {
                Some(&last) if distance - last < DISTANCE_TOLERANCE => {}
                _ => shell_radii.push(distance),
            }
        }

        for candidate in candidates.iter().filter(|c| c.pair.is_canonical()) {
            if let Some(shell) = shell_radii
                .iter()
                .position(|&r| (r - candidate.distance).abs() < DISTANCE_TOLERANCE)
            {
                shell_pairs.push((candidate.pair, shell));
            }
        }
    }
    shell_pairs
}

/// Dipolar coupling of a pair: the magnitude `μ0 μB² / (4π r³)` in meV (per μB²)
/// and the unit vector from atom `i` to atom `j`.
pub fn ddi_from_pair(geometry: &Geometry, pair: &Pair) -> (f64, Vector3<f64>) {
    let displacement = geometry.pair_displacement(pair);
    let distance = displacement.norm();
    (DIPOLAR_PREFACTOR / distance.powi(3), displacement / distance)
}

/// DMI vector direction of a pair for bulk chirality: the unit bond direction,
/// flipped when `chirality` is negative.
pub fn dmi_normal_from_pair(geometry: &Geometry, pair: &Pair, chirality: i32) -> Vector3<f64> {
    let displacement = geometry.pair_displacement(pair);
    displacement.normalize() * f64::from(chirality.signum())
}
