use std::fmt;

use ecow::EcoVec;

use crate::shape::Shape;

/// A rectangular array: a shape and flat row-major element storage
///
/// Storage is shared copy-on-write; cloning is cheap until a clone is
/// mutated.
#[derive(Clone)]
pub struct Array<T> {
    pub shape: Shape,
    pub data: EcoVec<T>,
}

/// A type that can be the uniform element of a typed array
pub trait ArrayValue: Clone {
    /// The name used in error messages
    const NAME: &'static str;
    /// The fill element used by overtake, expand and stencil padding
    fn fill() -> Self;
}

impl ArrayValue for u8 {
    const NAME: &'static str = "boolean";
    fn fill() -> Self {
        0
    }
}

impl ArrayValue for i64 {
    const NAME: &'static str = "integer";
    fn fill() -> Self {
        0
    }
}

impl ArrayValue for f64 {
    const NAME: &'static str = "float";
    fn fill() -> Self {
        0.0
    }
}

impl<T: ArrayValue> Array<T> {
    pub fn new(shape: impl Into<Shape>, data: impl Into<EcoVec<T>>) -> Self {
        let shape = shape.into();
        let data = data.into();
        debug_assert_eq!(shape.elements(), data.len());
        Array { shape, data }
    }
    /// A rank-1 array over the given elements
    pub fn vector(data: impl Into<EcoVec<T>>) -> Self {
        let data = data.into();
        Array {
            shape: Shape::from(data.len()),
            data,
        }
    }
    pub fn rank(&self) -> usize {
        self.shape.rank()
    }
    pub fn elements(&self) -> usize {
        self.shape.elements()
    }
    pub fn row_count(&self) -> usize {
        self.shape.row_count()
    }
    /// The element count of one major cell
    pub fn row_len(&self) -> usize {
        self.shape.row().elements()
    }
    /// The i-th major cell
    pub fn row(&self, i: usize) -> Array<T> {
        let len = self.row_len();
        let data: EcoVec<T> = self.data[i * len..(i + 1) * len].iter().cloned().collect();
        Array {
            shape: self.shape.row(),
            data,
        }
    }
    pub fn rows(&self) -> impl Iterator<Item = Array<T>> + '_ {
        (0..self.row_count()).map(|i| self.row(i))
    }
}

impl<T: fmt::Debug> fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}", self.shape, self.data.as_slice())
    }
}

impl<T: ArrayValue> From<Vec<T>> for Array<T> {
    fn from(v: Vec<T>) -> Self {
        Self::vector(EcoVec::from(v))
    }
}

impl<T: ArrayValue> FromIterator<T> for Array<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::vector(iter.into_iter().collect::<EcoVec<T>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_traverse_major_cells() {
        let arr = Array::new([2, 3], (1..=6).collect::<EcoVec<i64>>());
        let rows: Vec<Vec<i64>> = arr.rows().map(|r| r.data.to_vec()).collect();
        assert_eq!(rows, [vec![1, 2, 3], vec![4, 5, 6]]);
    }
}
