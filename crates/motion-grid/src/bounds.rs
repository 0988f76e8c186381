use crate::GridError;

/// An inclusive 2D index range `[i0..=i1] x [j0..=j1]`.
///
/// `i` indexes rows and `j` indexes columns. The origin can be any integer,
/// including negative values, which lets callers keep a margin around a frame.
///
/// # Examples
///
/// ```
/// use motion_grid::Bounds;
///
/// let bounds = Bounds::new(0, 239, 0, 319);
/// assert_eq!(bounds.rows(), 240);
/// assert_eq!(bounds.cols(), 320);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    /// First row index (included).
    pub i0: i32,
    /// Last row index (included).
    pub i1: i32,
    /// First column index (included).
    pub j0: i32,
    /// Last column index (included).
    pub j1: i32,
}

impl Bounds {
    /// Create a new range from its inclusive limits.
    pub const fn new(i0: i32, i1: i32, j0: i32, j1: i32) -> Self {
        Self { i0, i1, j0, j1 }
    }

    /// Create a range of `rows x cols` cells with the origin at `(0, 0)`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidSize`] when a dimension is zero or its last
    /// index does not fit in an `i32`.
    pub fn from_size(rows: usize, cols: usize) -> Result<Self, GridError> {
        let last = |n: usize| {
            n.checked_sub(1)
                .and_then(|n| i32::try_from(n).ok())
                .ok_or(GridError::InvalidSize(rows, cols))
        };
        Ok(Self::new(0, last(rows)?, 0, last(cols)?))
    }

    /// Number of rows covered by the range.
    #[inline]
    pub fn rows(&self) -> usize {
        span(self.i0, self.i1)
    }

    /// Number of columns covered by the range.
    #[inline]
    pub fn cols(&self) -> usize {
        span(self.j0, self.j1)
    }

    /// Number of cells covered by the range.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows() * self.cols()
    }

    /// Whether the range covers no cell.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.i1 < self.i0 || self.j1 < self.j0
    }

    /// Whether `other` lies entirely inside this range.
    pub fn contains(&self, other: &Bounds) -> bool {
        other.i0 >= self.i0 && other.i1 <= self.i1 && other.j0 >= self.j0 && other.j1 <= self.j1
    }

    /// The column range of the bit-packed layout of this range.
    ///
    /// Packed columns keep the same origin `j0` and hold 8 pixels each, so the
    /// packed range is `j0 ..= j0 + cols / 8 - 1`. A trailing group of fewer
    /// than 8 columns is dropped.
    ///
    /// ```
    /// use motion_grid::Bounds;
    ///
    /// let packed = Bounds::new(0, 9, 4, 35).packed();
    /// assert_eq!(packed, Bounds::new(0, 9, 4, 7));
    /// ```
    pub fn packed(&self) -> Bounds {
        Bounds::new(
            self.i0,
            self.i1,
            self.j0,
            self.j0 + (self.cols() / 8) as i32 - 1,
        )
    }

    /// The range shrunk by one cell on every side.
    pub fn interior(&self) -> Bounds {
        Bounds::new(self.i0 + 1, self.i1 - 1, self.j0 + 1, self.j1 - 1)
    }
}

// widened so that `i32::MIN..=i32::MAX` does not overflow
#[inline]
fn span(first: i32, last: i32) -> usize {
    (i64::from(last) - i64::from(first) + 1).max(0) as usize
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "[{}..={}] x [{}..={}]",
            self.i0, self.i1, self.j0, self.j1
        )
    }
}
