//! N-dimensional lattice coordinate mapping.

use crate::error::{AnnetError, Result};
use serde::{Deserialize, Serialize};

/// Maps between linear storage indices and coordinates on an
/// N-dimensional grid, and enumerates neighborhoods on it.
///
/// Cells are laid out row-major: the last dimension varies fastest.
/// Built once from the output-layer shape and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lattice {
    dims: Vec<usize>,
    len: usize,
}

impl Lattice {
    /// Creates a lattice with the given extent per dimension.
    pub fn new(dims: &[usize]) -> Result<Self> {
        if dims.is_empty() {
            return Err(AnnetError::Config("lattice needs at least one dimension".into()));
        }
        if dims.iter().any(|&d| d == 0) {
            return Err(AnnetError::Config(format!(
                "lattice dimensions must be positive, got {dims:?}"
            )));
        }
        let len = dims.iter().product();
        Ok(Self {
            dims: dims.to_vec(),
            len,
        })
    }

    /// Extent per dimension.
    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a lattice has at least one cell.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Converts a linear index to lattice coordinates.
    pub fn coords_of(&self, index: usize) -> Vec<usize> {
        debug_assert!(index < self.len);
        let mut coords = vec![0; self.dims.len()];
        let mut rest = index;
        for (d, &extent) in self.dims.iter().enumerate().rev() {
            coords[d] = rest % extent;
            rest /= extent;
        }
        coords
    }

    /// Converts lattice coordinates to a linear index.
    pub fn index_of(&self, coords: &[usize]) -> usize {
        debug_assert_eq!(coords.len(), self.dims.len());
        let mut index = 0;
        for (&c, &extent) in coords.iter().zip(&self.dims) {
            debug_assert!(c < extent);
            index = index * extent + c;
        }
        index
    }

    /// Linear indices of every cell within `radius` of `center` along
    /// every dimension (a Chebyshev box), clipped to the lattice bounds.
    /// The center cell is included; results come back in ascending index
    /// order.
    pub fn neighbors_within(&self, center: &[usize], radius: usize) -> Vec<usize> {
        debug_assert_eq!(center.len(), self.dims.len());
        let lo: Vec<usize> = center.iter().map(|&c| c.saturating_sub(radius)).collect();
        let hi: Vec<usize> = center
            .iter()
            .zip(&self.dims)
            .map(|(&c, &extent)| (c + radius).min(extent - 1))
            .collect();

        let mut out = Vec::new();
        let mut coords = lo.clone();
        'cells: loop {
            out.push(self.index_of(&coords));
            // Odometer increment, last dimension fastest.
            for d in (0..coords.len()).rev() {
                if coords[d] < hi[d] {
                    coords[d] += 1;
                    for dd in d + 1..coords.len() {
                        coords[dd] = lo[dd];
                    }
                    continue 'cells;
                }
            }
            break;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_degenerate_dims() {
        assert!(matches!(Lattice::new(&[]), Err(AnnetError::Config(_))));
        assert!(matches!(Lattice::new(&[4, 0]), Err(AnnetError::Config(_))));
    }

    #[test]
    fn test_index_coords_roundtrip() {
        let lattice = Lattice::new(&[3, 4, 5]).unwrap();
        assert_eq!(lattice.len(), 60);
        for i in 0..lattice.len() {
            let coords = lattice.coords_of(i);
            assert_eq!(lattice.index_of(&coords), i);
        }
        assert_eq!(lattice.coords_of(0), vec![0, 0, 0]);
        assert_eq!(lattice.coords_of(59), vec![2, 3, 4]);
    }

    #[test]
    fn test_neighbors_interior_3d() {
        let lattice = Lattice::new(&[5, 5, 5]).unwrap();
        let neighbors = lattice.neighbors_within(&[2, 2, 2], 1);
        assert_eq!(neighbors.len(), 27);
        assert!(neighbors.contains(&lattice.index_of(&[2, 2, 2])));
    }

    #[test]
    fn test_neighbors_clipped_at_corner() {
        let lattice = Lattice::new(&[4, 4]).unwrap();
        let neighbors = lattice.neighbors_within(&[0, 0], 1);
        // 2x2 box instead of 3x3 once clipped.
        assert_eq!(neighbors, vec![0, 1, 4, 5]);
    }

    #[test]
    fn test_neighbors_one_dimensional() {
        let lattice = Lattice::new(&[6]).unwrap();
        assert_eq!(lattice.neighbors_within(&[3], 2), vec![1, 2, 3, 4, 5]);
        assert_eq!(lattice.neighbors_within(&[5], 1), vec![4, 5]);
    }

    #[test]
    fn test_neighbors_large_radius_covers_all() {
        let lattice = Lattice::new(&[3, 3]).unwrap();
        let neighbors = lattice.neighbors_within(&[1, 1], 10);
        assert_eq!(neighbors.len(), 9);
    }

    #[test]
    fn test_neighbors_sorted_ascending() {
        let lattice = Lattice::new(&[4, 4]).unwrap();
        let neighbors = lattice.neighbors_within(&[2, 2], 1);
        let mut sorted = neighbors.clone();
        sorted.sort_unstable();
        assert_eq!(neighbors, sorted);
    }
}
