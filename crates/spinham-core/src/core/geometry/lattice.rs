use super::pairs::Pair;
use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

const DEGENERACY_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("Number of cells along axis {axis} must be at least 1")]
    EmptyAxis { axis: usize },
    #[error("The basis must contain at least one cell atom")]
    EmptyBasis,
    #[error("Bravais vectors are linearly dependent")]
    DegenerateBravaisVectors,
    #[error("Lattice constant must be finite and positive, got {0}")]
    InvalidLatticeConstant(f64),
    #[error("Search radius {radius} would visit more than {limit} cells")]
    SearchRadiusTooLarge { radius: f64, limit: usize },
}

/// A finite block of `n_cells[0] × n_cells[1] × n_cells[2]` unit cells of a Bravais
/// lattice with an arbitrary basis.
///
/// Sites are indexed as `ibasis + n_cell_atoms * (a + n_a * (b + n_b * c))`, so all
/// atoms of one cell are contiguous and cells are ordered with the first axis running
/// fastest. Positions are absolute, in Å.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    bravais_vectors: [Vector3<f64>; 3],
    cell_atoms: Vec<Vector3<f64>>,
    n_cells: [usize; 3],
    lattice_constant: f64,
    positions: Vec<Vector3<f64>>,
}

impl Geometry {
    /// Creates a geometry from Bravais vectors, cell-atom positions given in the
    /// Bravais basis, the number of cells per axis and the lattice constant in Å.
    pub fn new(
        bravais_vectors: [Vector3<f64>; 3],
        cell_atoms: Vec<Vector3<f64>>,
        n_cells: [usize; 3],
        lattice_constant: f64,
    ) -> Result<Self, GeometryError> {
        if let Some(axis) = n_cells.iter().position(|&n| n == 0) {
            return Err(GeometryError::EmptyAxis { axis });
        }
        if cell_atoms.is_empty() {
            return Err(GeometryError::EmptyBasis);
        }
        if !lattice_constant.is_finite() || lattice_constant <= 0.0 {
            return Err(GeometryError::InvalidLatticeConstant(lattice_constant));
        }
        let basis = Matrix3::from_columns(&bravais_vectors);
        if basis.determinant().abs() < DEGENERACY_TOLERANCE {
            return Err(GeometryError::DegenerateBravaisVectors);
        }

        let mut geometry = Self {
            bravais_vectors,
            cell_atoms,
            n_cells,
            lattice_constant,
            positions: Vec::new(),
        };
        geometry.positions = geometry.compute_positions();
        Ok(geometry)
    }

    /// Simple cubic lattice with one atom per cell and unit lattice constant.
    pub fn simple_cubic(n_cells: [usize; 3]) -> Result<Self, GeometryError> {
        Self::new(
            [Vector3::x(), Vector3::y(), Vector3::z()],
            vec![Vector3::zeros()],
            n_cells,
            1.0,
        )
    }

    fn compute_positions(&self) -> Vec<Vector3<f64>> {
        let mut positions = Vec::with_capacity(self.nos());
        for c in 0..self.n_cells[2] {
            for b in 0..self.n_cells[1] {
                for a in 0..self.n_cells[0] {
                    let origin = self.translation_vector([a as i32, b as i32, c as i32]);
                    for ibasis in 0..self.n_cell_atoms() {
                        positions.push(origin + self.cell_atom_position(ibasis));
                    }
                }
            }
        }
        positions
    }

    pub fn bravais_vectors(&self) -> &[Vector3<f64>; 3] {
        &self.bravais_vectors
    }

    pub fn n_cells(&self) -> [usize; 3] {
        self.n_cells
    }

    pub fn n_cell_atoms(&self) -> usize {
        self.cell_atoms.len()
    }

    pub fn lattice_constant(&self) -> f64 {
        self.lattice_constant
    }

    /// Total number of sites.
    pub fn nos(&self) -> usize {
        self.n_cell_atoms() * self.n_cells.iter().product::<usize>()
    }

    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    /// Absolute position of a cell atom inside the origin cell, in Å.
    pub fn cell_atom_position(&self, ibasis: usize) -> Vector3<f64> {
        let frac = self.cell_atoms[ibasis];
        (self.bravais_vectors[0] * frac.x
            + self.bravais_vectors[1] * frac.y
            + self.bravais_vectors[2] * frac.z)
            * self.lattice_constant
    }

    /// Absolute displacement of a translation by whole cells, in Å.
    pub fn translation_vector(&self, translation: [i32; 3]) -> Vector3<f64> {
        (self.bravais_vectors[0] * f64::from(translation[0])
            + self.bravais_vectors[1] * f64::from(translation[1])
            + self.bravais_vectors[2] * f64::from(translation[2]))
            * self.lattice_constant
    }

    /// Displacement from atom `i` to atom `j` of a pair, in Å.
    pub fn pair_displacement(&self, pair: &Pair) -> Vector3<f64> {
        self.cell_atom_position(pair.j) + self.translation_vector(pair.translation)
            - self.cell_atom_position(pair.i)
    }

    /// Distance between adjacent lattice planes spanned by the two other Bravais
    /// vectors, in Å. Bounds how many translations along `axis` fit inside a radius.
    pub(crate) fn plane_spacing(&self, axis: usize) -> f64 {
        let [a, b, c] = &self.bravais_vectors;
        let volume = a.dot(&b.cross(c)).abs();
        let other = match axis {
            0 => b.cross(c),
            1 => c.cross(a),
            _ => a.cross(b),
        };
        volume / other.norm() * self.lattice_constant
    }

    /// Length of the shortest Bravais vector along an axis with more than one cell.
    pub(crate) fn shortest_active_translation(&self) -> Option<f64> {
        (0..3)
            .filter(|&axis| self.n_cells[axis] > 1)
            .map(|axis| self.bravais_vectors[axis].norm() * self.lattice_constant)
            .min_by(|a, b| a.total_cmp(b))
    }

    #[inline]
    pub fn site_index(&self, cell: [usize; 3], ibasis: usize) -> usize {
        ibasis
            + self.n_cell_atoms()
                * (cell[0] + self.n_cells[0] * (cell[1] + self.n_cells[1] * cell[2]))
    }

    /// Iterates over all cells in site-index order.
    pub fn cells(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let [na, nb, nc] = self.n_cells;
        (0..nc).flat_map(move |c| (0..nb).flat_map(move |b| (0..na).map(move |a| [a, b, c])))
    }

    /// Cell reached from `cell` by `translation`, wrapping along periodic axes.
    ///
    /// Returns `None` when the translation leaves the block along an open axis.
    pub fn translate_cell(
        &self,
        cell: [usize; 3],
        translation: [i32; 3],
        boundary_conditions: &[bool; 3],
    ) -> Option<[usize; 3]> {
        let mut target = [0usize; 3];
        for axis in 0..3 {
            let n = self.n_cells[axis] as i64;
            let shifted = cell[axis] as i64 + i64::from(translation[axis]);
            target[axis] = if (0..n).contains(&shifted) {
                shifted as usize
            } else if boundary_conditions[axis] {
                shifted.rem_euclid(n) as usize
            } else {
                return None;
            };
        }
        Some(target)
    }

    /// All `(site_i, site_j)` index pairs realised by `pair` across the lattice.
    pub fn pair_sites<'a>(
        &'a self,
        pair: &'a Pair,
        boundary_conditions: &'a [bool; 3],
    ) -> impl Iterator<Item = (usize, usize)> + 'a {
        self.cells().filter_map(move |cell| {
            let partner = self.translate_cell(cell, pair.translation, boundary_conditions)?;
            Some((
                self.site_index(cell, pair.i),
                self.site_index(partner, pair.j),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_film(n: usize) -> Geometry {
        Geometry::simple_cubic([n, n, 1]).unwrap()
    }

    #[test]
    fn new_rejects_zero_cells_along_an_axis() {
        let result = Geometry::simple_cubic([2, 0, 1]);
        assert_eq!(result, Err(GeometryError::EmptyAxis { axis: 1 }));
    }

    #[test]
    fn new_rejects_empty_basis() {
        let result = Geometry::new(
            [Vector3::x(), Vector3::y(), Vector3::z()],
            vec![],
            [1, 1, 1],
            1.0,
        );
        assert_eq!(result, Err(GeometryError::EmptyBasis));
    }

    #[test]
    fn new_rejects_linearly_dependent_bravais_vectors() {
        let result = Geometry::new(
            [Vector3::x(), Vector3::x() * 2.0, Vector3::z()],
            vec![Vector3::zeros()],
            [1, 1, 1],
            1.0,
        );
        assert_eq!(result, Err(GeometryError::DegenerateBravaisVectors));
    }

    #[test]
    fn new_rejects_non_positive_lattice_constant() {
        let result = Geometry::new(
            [Vector3::x(), Vector3::y(), Vector3::z()],
            vec![Vector3::zeros()],
            [1, 1, 1],
            0.0,
        );
        assert!(matches!(
            result,
            Err(GeometryError::InvalidLatticeConstant(_))
        ));
    }

    #[test]
    fn positions_follow_site_index_order() {
        let geometry = Geometry::new(
            [Vector3::x(), Vector3::y(), Vector3::z()],
            vec![Vector3::zeros(), Vector3::new(0.5, 0.5, 0.0)],
            [2, 1, 1],
            2.0,
        )
        .unwrap();
        assert_eq!(geometry.nos(), 4);
        assert_eq!(geometry.positions()[1], Vector3::new(1.0, 1.0, 0.0));
        assert_eq!(geometry.positions()[2], Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(geometry.site_index([1, 0, 0], 1), 3);
    }

    #[test]
    fn cells_iterate_with_first_axis_fastest() {
        let geometry = Geometry::simple_cubic([2, 2, 1]).unwrap();
        let cells: Vec<_> = geometry.cells().collect();
        assert_eq!(cells, vec![[0, 0, 0], [1, 0, 0], [0, 1, 0], [1, 1, 0]]);
    }

    #[test]
    fn translate_cell_wraps_along_periodic_axes() {
        let geometry = square_film(3);
        let target = geometry.translate_cell([2, 0, 0], [1, -1, 0], &[true, true, false]);
        assert_eq!(target, Some([0, 2, 0]));
    }

    #[test]
    fn translate_cell_drops_partners_outside_open_axes() {
        let geometry = square_film(3);
        let target = geometry.translate_cell([2, 0, 0], [1, 0, 0], &[false, true, false]);
        assert_eq!(target, None);
    }

    #[test]
    fn pair_sites_counts_bonds_according_to_boundary_conditions() {
        let geometry = square_film(4);
        let pair = Pair::new(0, 0, [1, 0, 0]);
        let open = geometry.pair_sites(&pair, &[false, false, false]).count();
        let periodic = geometry.pair_sites(&pair, &[true, false, false]).count();
        assert_eq!(open, 12);
        assert_eq!(periodic, 16);
    }

    #[test]
    fn plane_spacing_of_cubic_lattice_equals_lattice_constant() {
        let geometry = Geometry::new(
            [Vector3::x(), Vector3::y(), Vector3::z()],
            vec![Vector3::zeros()],
            [1, 1, 1],
            3.0,
        )
        .unwrap();
        for axis in 0..3 {
            assert!((geometry.plane_spacing(axis) - 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn shortest_active_translation_ignores_single_cell_axes() {
        let geometry = Geometry::new(
            [Vector3::x() * 2.0, Vector3::y() * 3.0, Vector3::z()],
            vec![Vector3::zeros()],
            [4, 4, 1],
            1.0,
        )
        .unwrap();
        assert_eq!(geometry.shortest_active_translation(), Some(2.0));
    }
}
