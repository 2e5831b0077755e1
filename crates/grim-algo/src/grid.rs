//! Dense row-major containers addressed by integer ordinals.
//!
//! Variables and parameters of the expansion model are indexed by
//! (technology, node), (technology, node, time) and similar tuples. These
//! grids give O(1) lookup without hashing composite keys.

use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, PartialEq)]
pub struct Grid2<T> {
    dims: (usize, usize),
    data: Vec<T>,
}

impl<T> Grid2<T> {
    pub fn from_fn(d0: usize, d1: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(d0 * d1);
        for i in 0..d0 {
            for j in 0..d1 {
                data.push(f(i, j));
            }
        }
        Self { dims: (d0, d1), data }
    }

    pub fn dims(&self) -> (usize, usize) {
        self.dims
    }

    pub fn row(&self, i: usize) -> &[T] {
        let w = self.dims.1;
        &self.data[i * w..(i + 1) * w]
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Grid2<U> {
        Grid2 {
            dims: self.dims,
            data: self.data.iter().map(&mut f).collect(),
        }
    }

    /// Rows as owned vectors, for tabular output.
    pub fn to_rows(&self) -> Vec<Vec<T>>
    where
        T: Clone,
    {
        (0..self.dims.0).map(|i| self.row(i).to_vec()).collect()
    }
}

impl<T> Index<(usize, usize)> for Grid2<T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        debug_assert!(i < self.dims.0 && j < self.dims.1);
        &self.data[i * self.dims.1 + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid2<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        debug_assert!(i < self.dims.0 && j < self.dims.1);
        &mut self.data[i * self.dims.1 + j]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid3<T> {
    dims: (usize, usize, usize),
    data: Vec<T>,
}

impl<T> Grid3<T> {
    pub fn from_fn(
        d0: usize,
        d1: usize,
        d2: usize,
        mut f: impl FnMut(usize, usize, usize) -> T,
    ) -> Self {
        let mut data = Vec::with_capacity(d0 * d1 * d2);
        for i in 0..d0 {
            for j in 0..d1 {
                for k in 0..d2 {
                    data.push(f(i, j, k));
                }
            }
        }
        Self {
            dims: (d0, d1, d2),
            data,
        }
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        self.dims
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Grid3<U> {
        Grid3 {
            dims: self.dims,
            data: self.data.iter().map(&mut f).collect(),
        }
    }

    fn offset(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(i < self.dims.0 && j < self.dims.1 && k < self.dims.2);
        (i * self.dims.1 + j) * self.dims.2 + k
    }
}

impl<T> Index<(usize, usize, usize)> for Grid3<T> {
    type Output = T;

    fn index(&self, (i, j, k): (usize, usize, usize)) -> &T {
        &self.data[self.offset(i, j, k)]
    }
}

impl<T> IndexMut<(usize, usize, usize)> for Grid3<T> {
    fn index_mut(&mut self, (i, j, k): (usize, usize, usize)) -> &mut T {
        let at = self.offset(i, j, k);
        &mut self.data[at]
    }
}
