use std::ops;

use crate::{Bounds, GridError};

/// A rectangular grid of bytes addressed by `(i, j)`.
///
/// The grid owns its row-major buffer. Row `i` and column `j` are valid when
/// `i0 <= i <= i1` and `j0 <= j <= j1` for the [`Bounds`] the grid was
/// allocated with. Index checks are only performed in debug builds.
///
/// # Examples
///
/// ```
/// use motion_grid::{Bounds, Grid};
///
/// let mut grid = Grid::new(Bounds::new(-1, 1, 10, 12)).unwrap();
/// grid[(0, 11)] = 255;
///
/// assert_eq!(grid.get(0, 11), 255);
/// assert_eq!(grid.row(0), &[0, 255, 0]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    bounds: Bounds,
    stride: usize,
    data: Vec<u8>,
}

impl Grid {
    /// Allocate a zero-filled grid covering `bounds`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidBounds`] for an empty range and
    /// [`GridError::Allocation`] when the buffer cannot be reserved.
    pub fn new(bounds: Bounds) -> Result<Self, GridError> {
        if bounds.is_empty() {
            return Err(GridError::InvalidBounds(bounds));
        }
        let len = bounds.len();
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, 0);
        Ok(Self {
            bounds,
            stride: bounds.cols(),
            data,
        })
    }

    /// Create a grid from row-major data.
    pub fn from_vec(bounds: Bounds, data: Vec<u8>) -> Result<Self, GridError> {
        if bounds.is_empty() {
            return Err(GridError::InvalidBounds(bounds));
        }
        if data.len() != bounds.len() {
            return Err(GridError::InvalidDataLength(data.len(), bounds.len()));
        }
        Ok(Self {
            bounds,
            stride: bounds.cols(),
            data,
        })
    }

    /// Create a grid by evaluating `f(i, j)` for every cell.
    pub fn from_fn(bounds: Bounds, mut f: impl FnMut(i32, i32) -> u8) -> Result<Self, GridError> {
        let mut grid = Self::new(bounds)?;
        for i in bounds.i0..=bounds.i1 {
            let row = grid.row_mut(i);
            for (j, cell) in (bounds.j0..=bounds.j1).zip(row.iter_mut()) {
                *cell = f(i, j);
            }
        }
        Ok(grid)
    }

    /// The range the grid was allocated with.
    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.bounds.rows()
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.stride
    }

    /// The row-major buffer.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// The row-major buffer.
    pub fn as_slice_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the grid and return its row-major buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    fn offset(&self, i: i32, j: i32) -> usize {
        debug_assert!(
            i >= self.bounds.i0 && i <= self.bounds.i1,
            "row {i} out of {}",
            self.bounds
        );
        debug_assert!(
            j >= self.bounds.j0 && j <= self.bounds.j1,
            "column {j} out of {}",
            self.bounds
        );
        (i - self.bounds.i0) as usize * self.stride + (j - self.bounds.j0) as usize
    }

    /// The value at `(i, j)`.
    #[inline]
    pub fn get(&self, i: i32, j: i32) -> u8 {
        self.data[self.offset(i, j)]
    }

    /// Overwrite the value at `(i, j)`.
    #[inline]
    pub fn set(&mut self, i: i32, j: i32, val: u8) {
        let idx = self.offset(i, j);
        self.data[idx] = val;
    }

    /// The full row `i`.
    #[inline]
    pub fn row(&self, i: i32) -> &[u8] {
        let start = self.offset(i, self.bounds.j0);
        &self.data[start..start + self.stride]
    }

    /// The full row `i`.
    #[inline]
    pub fn row_mut(&mut self, i: i32) -> &mut [u8] {
        let start = self.offset(i, self.bounds.j0);
        let stride = self.stride;
        &mut self.data[start..start + stride]
    }

    /// Columns `j0..=j1` of row `i`.
    #[inline]
    pub fn row_span(&self, i: i32, j0: i32, j1: i32) -> &[u8] {
        let start = self.offset(i, j0);
        let end = self.offset(i, j1) + 1;
        &self.data[start..end]
    }

    /// Iterate over the row spans covered by `range`, top to bottom.
    pub fn rows_span(&self, range: Bounds) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        debug_assert!(self.bounds.contains(&range));
        let first = (range.i0 - self.bounds.i0) as usize;
        let start = (range.j0 - self.bounds.j0) as usize;
        let end = start + range.cols();
        self.data
            .chunks_exact(self.stride)
            .skip(first)
            .take(range.rows())
            .map(move |row| &row[start..end])
    }

    /// Iterate over the disjoint mutable row spans covered by `range`.
    pub fn rows_span_mut(
        &mut self,
        range: Bounds,
    ) -> impl ExactSizeIterator<Item = &mut [u8]> + '_ {
        debug_assert!(self.bounds.contains(&range));
        let first = (range.i0 - self.bounds.i0) as usize;
        let start = (range.j0 - self.bounds.j0) as usize;
        let end = start + range.cols();
        self.data
            .chunks_exact_mut(self.stride)
            .skip(first)
            .take(range.rows())
            .map(move |row| &mut row[start..end])
    }

    /// Set every cell to `val`.
    pub fn fill(&mut self, val: u8) {
        self.data.fill(val);
    }

    /// Set every cell to zero.
    pub fn zero(&mut self) {
        self.fill(0);
    }

    /// Copy the cells of `src` covered by `range`.
    pub fn copy_from(&mut self, src: &Grid, range: Bounds) -> Result<(), GridError> {
        self.check_contains(range)?;
        src.check_contains(range)?;
        for (dst_row, src_row) in self.rows_span_mut(range).zip(src.rows_span(range)) {
            dst_row.copy_from_slice(src_row);
        }
        Ok(())
    }

    /// Check that `range` lies inside the grid.
    pub fn check_contains(&self, range: Bounds) -> Result<(), GridError> {
        if range.is_empty() {
            return Err(GridError::InvalidBounds(range));
        }
        if !self.bounds.contains(&range) {
            return Err(GridError::OutOfRange {
                requested: range,
                available: self.bounds,
            });
        }
        Ok(())
    }
}

impl ops::Index<(i32, i32)> for Grid {
    type Output = u8;

    #[inline]
    fn index(&self, (i, j): (i32, i32)) -> &Self::Output {
        &self.data[self.offset(i, j)]
    }
}

impl ops::IndexMut<(i32, i32)> for Grid {
    #[inline]
    fn index_mut(&mut self, (i, j): (i32, i32)) -> &mut Self::Output {
        let idx = self.offset(i, j);
        &mut self.data[idx]
    }
}
