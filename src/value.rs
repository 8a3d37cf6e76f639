use std::{fmt, rc::Rc};

use ecow::{EcoString, EcoVec};

use crate::{
    array::{Array, ArrayValue},
    function::Function,
    num::{Kind, Num, Tower},
    pkg::PackageValue,
    shape::Shape,
};

/// A variable or package-qualified name
pub type Ident = EcoString;

/// The tagged union over everything an expression can evaluate to
#[derive(Debug, Clone)]
pub enum Value {
    /// A scalar number of some tower kind
    Num(Num),
    /// A string; strings are scalars
    Str(EcoString),
    /// An undeclared name, which evaluates to itself
    Ident(Ident),
    /// Uniform boolean array
    Bools(Array<u8>),
    /// Uniform integer array
    Ints(Array<i64>),
    /// Uniform float array
    Floats(Array<f64>),
    /// Array of arbitrary values
    General(Array<Value>),
    /// The empty array: shape `[0]`, no elements
    Empty,
    /// A function value
    Func(Function),
    /// An opaque host object
    Pkg(Rc<dyn PackageValue>),
}

impl ArrayValue for Value {
    const NAME: &'static str = "value";
    fn fill() -> Self {
        Value::Num(Num::Int(0))
    }
}

impl Value {
    pub fn int(i: i64) -> Self {
        Value::Num(Num::Int(i))
    }
    pub fn float(f: f64) -> Self {
        Value::Num(Num::Float(f))
    }
    pub fn bool(b: bool) -> Self {
        Value::Num(Num::Bool(b))
    }

    /// The shape; scalars have rank 0
    pub fn shape(&self) -> Shape {
        match self {
            Value::Bools(a) => a.shape.clone(),
            Value::Ints(a) => a.shape.clone(),
            Value::Floats(a) => a.shape.clone(),
            Value::General(a) => a.shape.clone(),
            Value::Empty => Shape::from(0),
            _ => Shape::scalar(),
        }
    }
    pub fn rank(&self) -> usize {
        self.shape().rank()
    }
    /// Total element count; 1 for scalars
    pub fn size(&self) -> usize {
        self.shape().elements()
    }
    pub fn is_scalar(&self) -> bool {
        self.rank() == 0
    }
    pub fn is_empty_array(&self) -> bool {
        !self.is_scalar() && self.size() == 0
    }

    /// The flat element at row-major position `i`; a scalar is its own
    /// only element
    pub fn at(&self, i: usize) -> Value {
        match self {
            Value::Bools(a) => Value::Num(Num::Bool(a.data[i] != 0)),
            Value::Ints(a) => Value::Num(Num::Int(a.data[i])),
            Value::Floats(a) => Value::Num(Num::Float(a.data[i])),
            Value::General(a) => a.data[i].clone(),
            Value::Empty => Value::int(0),
            v => v.clone(),
        }
    }
    /// The ravel as owned values
    pub fn elems(&self) -> Vec<Value> {
        (0..self.size()).map(|i| self.at(i)).collect()
    }

    /// Build an array from flat elements, choosing the most specific
    /// typed storage that holds them all
    pub fn from_elems(shape: Shape, elems: Vec<Value>) -> Value {
        if shape.rank() == 0 {
            return elems.into_iter().next().unwrap_or_else(|| Value::int(0));
        }
        if shape == [0] {
            return Value::Empty;
        }
        let mut kind = Some(Kind::Bool);
        for e in &elems {
            match e {
                Value::Num(n) => {
                    kind = kind.map(|k| k.max(n.kind()));
                    if matches!(n.kind(), Kind::Complex) {
                        kind = None;
                    }
                }
                _ => kind = None,
            }
            if kind.is_none() {
                break;
            }
        }
        match kind {
            Some(Kind::Bool) => Value::Bools(Array::new(
                shape,
                elems
                    .iter()
                    .map(|e| match e {
                        Value::Num(Num::Bool(b)) => *b as u8,
                        _ => 0,
                    })
                    .collect::<EcoVec<u8>>(),
            )),
            Some(Kind::Int) => Value::Ints(Array::new(
                shape,
                elems
                    .iter()
                    .map(|e| match e {
                        Value::Num(n) => n.to_index().unwrap_or(0),
                        _ => 0,
                    })
                    .collect::<EcoVec<i64>>(),
            )),
            Some(Kind::Float) => Value::Floats(Array::new(
                shape,
                elems
                    .iter()
                    .map(|e| match e {
                        Value::Num(Num::Float(f)) => *f,
                        Value::Num(n) => n.to_index().unwrap_or(0) as f64,
                        _ => 0.0,
                    })
                    .collect::<EcoVec<f64>>(),
            )),
            _ => Value::General(Array::new(shape, EcoVec::from(elems))),
        }
    }
    /// A vector over the given elements
    pub fn vector(elems: Vec<Value>) -> Value {
        let shape = Shape::from(elems.len());
        Value::from_elems(shape, elems)
    }
    /// A vector of integers
    pub fn int_vec(ints: Vec<i64>) -> Value {
        if ints.is_empty() {
            Value::Empty
        } else {
            Value::Ints(Array::vector(EcoVec::from(ints)))
        }
    }

    /// View as an untyped array of values, keeping the shape
    pub fn to_general(&self) -> Array<Value> {
        Array::new(self.shape(), EcoVec::from(self.elems()))
    }

    /// The scalar number, if this is one
    pub fn as_num(&self) -> Option<Num> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }
    pub fn as_func(&self) -> Option<&Function> {
        match self {
            Value::Func(f) => Some(f),
            _ => None,
        }
    }
    pub fn is_func(&self) -> bool {
        matches!(self, Value::Func(_))
    }

    /// An exact integer from a scalar or one-element array
    pub fn as_index(&self) -> Option<i64> {
        if self.is_scalar() {
            self.as_num().and_then(|n| n.to_index())
        } else if self.size() == 1 {
            self.at(0).as_num().and_then(|n| n.to_index())
        } else {
            None
        }
    }
    /// Ravel to exact integers
    pub fn as_int_vec(&self) -> Option<Vec<i64>> {
        if self.is_scalar() {
            return Some(vec![self.as_num()?.to_index()?]);
        }
        let mut out = Vec::with_capacity(self.size());
        for i in 0..self.size() {
            out.push(self.at(i).as_num()?.to_index()?);
        }
        Some(out)
    }
    /// A shape from a scalar or vector of non-negative integers
    pub fn as_shape(&self) -> Option<Shape> {
        if self.rank() > 1 {
            return None;
        }
        let ints = self.as_int_vec()?;
        let mut shape = Shape::with_capacity(ints.len());
        for i in ints {
            if i < 0 {
                return None;
            }
            shape.push(i as usize);
        }
        Some(shape)
    }

    /// The fill element for overtake and expand: space for string-like
    /// arrays, zero otherwise
    pub fn fill_value(&self) -> Value {
        let probe = if self.is_scalar() {
            self.clone()
        } else if self.size() > 0 {
            self.at(0)
        } else {
            return Value::int(0);
        };
        match probe {
            Value::Str(_) => Value::Str(EcoString::from(" ")),
            _ => Value::int(0),
        }
    }

    /// Nesting depth: 0 for scalars, 1 for simple arrays
    pub fn depth(&self) -> usize {
        match self {
            Value::General(a) => {
                1 + a
                    .data
                    .iter()
                    .map(Value::depth)
                    .max()
                    .unwrap_or(0)
            }
            Value::Bools(_) | Value::Ints(_) | Value::Floats(_) | Value::Empty => 1,
            _ => 0,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Num(_) => "number",
            Value::Str(_) => "string",
            Value::Ident(_) => "identifier",
            Value::Bools(_) => "boolean array",
            Value::Ints(_) => "integer array",
            Value::Floats(_) => "float array",
            Value::General(_) => "array",
            Value::Empty => "empty array",
            Value::Func(_) => "function",
            Value::Pkg(_) => "package object",
        }
    }
}

/// Deep equality as used by match and the membership family
///
/// Numbers compare after uptyping; shapes must agree exactly.
pub fn eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Num(x), Value::Num(y)) => Tower::default().eq(*x, *y),
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Ident(x), Value::Ident(y)) => x == y,
        _ => {
            if a.is_scalar() || b.is_scalar() {
                return false;
            }
            if a.shape() != b.shape() {
                return false;
            }
            (0..a.size()).all(|i| eq(&a.at(i), &b.at(i)))
        }
    }
}

/// A total order over values for grading and sorting
///
/// Numbers order by the tower comparison, strings lexicographically;
/// numbers sort before strings, scalars before arrays, arrays
/// elementwise then by shape.
pub fn ord(a: &Value, b: &Value) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    fn class(v: &Value) -> u8 {
        match v {
            Value::Num(_) => 0,
            Value::Str(_) => 1,
            Value::Ident(_) => 2,
            _ if v.is_scalar() => 3,
            _ => 4,
        }
    }
    match (a, b) {
        (Value::Num(x), Value::Num(y)) => {
            Tower::default().cmp(*x, *y).unwrap_or(Ordering::Equal)
        }
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        (Value::Ident(x), Value::Ident(y)) => x.cmp(y),
        _ if !a.is_scalar() && !b.is_scalar() => {
            for i in 0..a.size().min(b.size()) {
                let o = ord(&a.at(i), &b.at(i));
                if o != Ordering::Equal {
                    return o;
                }
            }
            a.size().cmp(&b.size())
        }
        _ => class(a).cmp(&class(b)),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::fmt::format_value(self, &crate::fmt::Format::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elems_round_trip_through_from_elems() {
        let v = Value::int_vec(vec![1, 2, 3]);
        let back = Value::from_elems(v.shape(), v.elems());
        assert!(eq(&v, &back));
    }

    #[test]
    fn from_elems_picks_most_specific_storage() {
        let bools = Value::vector(vec![Value::bool(true), Value::bool(false)]);
        assert!(matches!(bools, Value::Bools(_)));
        let mixed = Value::vector(vec![Value::bool(true), Value::int(2)]);
        assert!(matches!(mixed, Value::Ints(_)));
        let floats = Value::vector(vec![Value::int(1), Value::float(0.5)]);
        assert!(matches!(floats, Value::Floats(_)));
        let general = Value::vector(vec![Value::int(1), Value::Str("a".into())]);
        assert!(matches!(general, Value::General(_)));
    }

    #[test]
    fn scalar_and_vector_do_not_match() {
        let scalar = Value::int(3);
        let vector = Value::int_vec(vec![3]);
        assert!(!eq(&scalar, &vector));
        assert!(eq(&Value::Empty, &Value::Empty));
    }

    #[test]
    fn depth_counts_nesting() {
        assert_eq!(Value::int(5).depth(), 0);
        assert_eq!(Value::Str("alpha".into()).depth(), 0);
        assert_eq!(Value::Empty.depth(), 1);
        assert_eq!(Value::int_vec(vec![1, 2]).depth(), 1);
        let nested = Value::General(Array::vector(EcoVec::from(vec![
            Value::int_vec(vec![1, 2]),
            Value::int(3),
        ])));
        assert_eq!(nested.depth(), 2);
    }
}
