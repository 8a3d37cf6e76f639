use std::{
    fmt,
    ops::{Deref, DerefMut},
};

use serde::{Deserialize, Serialize};
use tinyvec::{tiny_vec, TinyVec};

/// The dimension vector of an array
///
/// Its length is the rank; an empty shape is a scalar.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shape {
    dims: TinyVec<[usize; 3]>,
}

impl Shape {
    /// The shape of a scalar
    pub fn scalar() -> Self {
        Shape { dims: tiny_vec![] }
    }
    pub fn with_capacity(capacity: usize) -> Self {
        Shape {
            dims: TinyVec::with_capacity(capacity),
        }
    }
    /// Add a trailing dimension
    pub fn push(&mut self, dim: usize) {
        self.dims.push(dim);
    }
    /// Insert a dimension at the given index
    pub fn insert(&mut self, index: usize, dim: usize) {
        self.dims.insert(index, dim);
    }
    /// Remove the dimension at the given index
    pub fn remove(&mut self, index: usize) -> usize {
        self.dims.remove(index)
    }
    /// The rank
    pub fn rank(&self) -> usize {
        self.dims.len()
    }
    /// The leading dimension, 1 for scalars
    pub fn row_count(&self) -> usize {
        self.dims.first().copied().unwrap_or(1)
    }
    /// The shape of one major cell
    pub fn row(&self) -> Shape {
        let mut shape = self.clone();
        if shape.rank() > 0 {
            shape.remove(0);
        }
        shape
    }
    /// The number of elements
    pub fn elements(&self) -> usize {
        self.dims.iter().product()
    }
    pub fn extend_from_slice(&mut self, dims: &[usize]) {
        self.dims.extend_from_slice(dims);
    }
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }
    /// Convert a flat row-major position to a dimension index
    pub fn flat_to_dims(&self, flat: usize, index: &mut Vec<usize>) {
        index.clear();
        let mut flat = flat;
        for &dim in self.dims.iter().rev() {
            index.push(if dim == 0 { 0 } else { flat % dim });
            flat /= dim.max(1);
        }
        index.reverse();
    }
    /// Convert a dimension index to a flat row-major position
    pub fn dims_to_flat(&self, index: &[usize]) -> Option<usize> {
        let mut flat = 0;
        for (&dim, &i) in self.dims.iter().zip(index) {
            if i >= dim {
                return None;
            }
            flat = flat * dim + i;
        }
        Some(flat)
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, dim) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", dim)?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<usize> for Shape {
    fn from(dim: usize) -> Self {
        Self::from([dim])
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self {
            dims: dims.iter().copied().collect(),
        }
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        dims.as_slice().into()
    }
}

impl Deref for Shape {
    type Target = [usize];
    fn deref(&self) -> &Self::Target {
        &self.dims
    }
}

impl DerefMut for Shape {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.dims
    }
}

impl IntoIterator for Shape {
    type Item = usize;
    type IntoIter = <TinyVec<[usize; 3]> as IntoIterator>::IntoIter;
    fn into_iter(self) -> Self::IntoIter {
        self.dims.into_iter()
    }
}

impl<'a> IntoIterator for &'a Shape {
    type Item = &'a usize;
    type IntoIter = <&'a [usize] as IntoIterator>::IntoIter;
    fn into_iter(self) -> Self::IntoIter {
        self.dims.iter()
    }
}

impl FromIterator<usize> for Shape {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            dims: iter.into_iter().collect(),
        }
    }
}

impl Extend<usize> for Shape {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        self.dims.extend(iter);
    }
}

impl<const N: usize> PartialEq<[usize; N]> for Shape {
    fn eq(&self, other: &[usize; N]) -> bool {
        self.dims.as_slice() == other.as_slice()
    }
}

impl PartialEq<[usize]> for Shape {
    fn eq(&self, other: &[usize]) -> bool {
        self.dims.as_slice() == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_dims_round_trip() {
        let shape = Shape::from([2, 3, 4]);
        let mut index = Vec::new();
        for flat in 0..shape.elements() {
            shape.flat_to_dims(flat, &mut index);
            assert_eq!(shape.dims_to_flat(&index), Some(flat));
        }
    }

    #[test]
    fn out_of_range_index_rejected() {
        let shape = Shape::from([2, 3]);
        assert_eq!(shape.dims_to_flat(&[1, 3]), None);
        assert_eq!(shape.dims_to_flat(&[1, 2]), Some(5));
    }
}
