//! Monadic array primitives

use std::cmp::Ordering;

use ecow::EcoVec;

use crate::{
    algorithm::lanes,
    array::Array,
    error::{AplError, AplResult},
    shape::Shape,
    value::{self, Value},
};

/// `⍳R`: the index progression of length `R`
pub fn iota(origin: i64, n: i64) -> AplResult<Value> {
    if n < 0 {
        return Err(AplError::domain("iota: length is negative"));
    }
    if n == 0 {
        return Ok(Value::Empty);
    }
    Ok(Value::int_vec((origin..origin + n).collect()))
}

/// `⍴R`: the shape vector; empty for scalars
pub fn shape_of(v: &Value) -> Value {
    let shape = v.shape();
    if shape.rank() == 0 {
        Value::Empty
    } else {
        Value::Ints(Array::vector(
            shape.iter().map(|&d| d as i64).collect::<EcoVec<i64>>(),
        ))
    }
}

/// `,R`: the ravel in row-major order
pub fn ravel(v: &Value) -> Value {
    let elems = v.elems();
    Value::from_elems(Shape::from(elems.len()), elems)
}

/// `,[α]R`: a half-integer axis inserts a singleton dimension, an
/// integer axis list collapses a contiguous range, an empty list
/// appends a trailing singleton
pub fn ravel_axis(v: &Value, axis: &Value, origin: i64) -> AplResult<Value> {
    let mut shape = v.shape();
    if axis.is_empty_array() {
        shape.push(1);
        return Ok(Value::from_elems(shape, v.elems()));
    }
    if let Some(n) = axis.as_num().filter(|n| n.to_index().is_none()) {
        let f = match n {
            crate::num::Num::Float(f) => f,
            _ => return Err(AplError::domain("fractional axis expected")),
        };
        let pos = (f.ceil() as i64 - origin).clamp(0, shape.rank() as i64) as usize;
        shape.insert(pos, 1);
        return Ok(Value::from_elems(shape, v.elems()));
    }
    let ints = axis
        .as_int_vec()
        .ok_or_else(|| AplError::domain("axis must be integers"))?;
    let mut axes = Vec::with_capacity(ints.len());
    for a in ints {
        let a = a - origin;
        if a < 0 {
            return Err(AplError::index("ravel axis out of range"));
        }
        axes.push(a as usize);
    }
    for w in axes.windows(2) {
        if w[1] != w[0] + 1 {
            return Err(AplError::domain("ravel axes must be contiguous"));
        }
    }
    let first = axes[0];
    if *axes.last().unwrap() >= shape.rank() {
        return Err(AplError::index("ravel axis out of range"));
    }
    let merged: usize = axes.iter().map(|&a| shape[a]).product();
    let mut new_shape = Shape::with_capacity(shape.rank() - axes.len() + 1);
    new_shape.extend_from_slice(&shape[..first]);
    new_shape.push(merged);
    new_shape.extend_from_slice(&shape[first + axes.len()..]);
    Ok(Value::from_elems(new_shape, v.elems()))
}

/// `∊R`: enlist, flattening all nesting
pub fn enlist(v: &Value) -> Value {
    fn flatten(v: &Value, out: &mut Vec<Value>) {
        if v.is_scalar() {
            out.push(v.clone());
        } else {
            for i in 0..v.size() {
                flatten(&v.at(i), out);
            }
        }
    }
    let mut out = Vec::new();
    flatten(v, &mut out);
    Value::from_elems(Shape::from(out.len()), out)
}

/// `⌽[k]R`: reverse along an axis
pub fn reverse(v: &Value, axis: usize) -> AplResult<Value> {
    if v.is_scalar() {
        return Ok(v.clone());
    }
    let shape = v.shape();
    if axis >= shape.rank() {
        return Err(AplError::index("reverse axis out of range"));
    }
    let elems = v.elems();
    let mut out = elems.clone();
    for lane in lanes(&shape, axis) {
        for (k, &src) in lane.iter().rev().enumerate() {
            out[lane[k]] = elems[src].clone();
        }
    }
    Ok(Value::from_elems(shape, out))
}

/// `p⍉R`: each source axis `i` maps to result axis `p[i]`; repeated
/// destinations take the diagonal
pub fn transpose(perm: &[usize], v: &Value) -> AplResult<Value> {
    if v.is_scalar() {
        return Ok(v.clone());
    }
    let shape = v.shape();
    if perm.len() != shape.rank() {
        return Err(AplError::length("transpose axes must cover the rank"));
    }
    let out_rank = perm.iter().copied().max().map_or(0, |m| m + 1);
    let mut out_shape = vec![usize::MAX; out_rank];
    for (i, &d) in perm.iter().enumerate() {
        if d >= out_rank {
            return Err(AplError::index("transpose axis out of range"));
        }
        out_shape[d] = out_shape[d].min(shape[i]);
    }
    if out_shape.iter().any(|&d| d == usize::MAX) {
        return Err(AplError::domain("transpose axes must be dense"));
    }
    let out_shape = Shape::from(out_shape.as_slice());
    let mut elems = Vec::with_capacity(out_shape.elements());
    let mut dims = Vec::new();
    for flat in 0..out_shape.elements() {
        out_shape.flat_to_dims(flat, &mut dims);
        let src: Vec<usize> = perm.iter().map(|&d| dims[d]).collect();
        let si = shape
            .dims_to_flat(&src)
            .ok_or_else(|| AplError::index("transpose index out of range"))?;
        elems.push(v.at(si));
    }
    Ok(Value::from_elems(out_shape, elems))
}

/// `⍉R`: reverse the axis order
pub fn transpose_monadic(v: &Value) -> AplResult<Value> {
    let rank = v.rank();
    let perm: Vec<usize> = (0..rank).rev().collect();
    transpose(&perm, v)
}

/// `⍪R`: convert to a matrix, keeping the leading axis
pub fn table(v: &Value) -> Value {
    let shape = v.shape();
    let new_shape = match shape.rank() {
        0 => Shape::from([1, 1]),
        1 => Shape::from([shape[0], 1]),
        _ => Shape::from([shape[0], shape[1..].iter().product()]),
    };
    Value::from_elems(new_shape, v.elems())
}

/// `⍋R` / `⍒R`: the permutation that sorts major cells, stable
pub fn grade(v: &Value, up: bool, origin: i64) -> AplResult<Value> {
    if v.is_scalar() {
        return Ok(Value::int_vec(vec![origin]));
    }
    let rows: Vec<Value> = if v.rank() == 1 {
        v.elems()
    } else {
        let g = v.to_general();
        (0..g.row_count())
            .map(|i| {
                let row = g.row(i);
                Value::from_elems(row.shape.clone(), row.data.to_vec())
            })
            .collect()
    };
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        let o = value::ord(&rows[a], &rows[b]);
        if up {
            o
        } else {
            o.reverse()
        }
    });
    Ok(Value::int_vec(
        order.into_iter().map(|i| i as i64 + origin).collect(),
    ))
}

/// `L⍋R` / `L⍒R`: grade with a collating sequence
pub fn grade_with(l: &Value, r: &Value, up: bool, origin: i64) -> AplResult<Value> {
    if l.rank() != 1 {
        return Err(AplError::rank("collating sequence must be a vector"));
    }
    let coll = l.elems();
    let keys: Vec<i64> = r
        .elems()
        .iter()
        .map(|e| {
            coll.iter()
                .position(|c| value::eq(c, e))
                .unwrap_or(coll.len()) as i64
        })
        .collect();
    grade(&Value::int_vec(keys), up, origin)
}

/// `⍸R`: the indices of nonzero counts, each repeated count times
pub fn where_(v: &Value, origin: i64) -> AplResult<Value> {
    let n = v.size();
    let mut out = Vec::new();
    for i in 0..n {
        let count = v
            .at(i)
            .as_num()
            .and_then(|x| x.to_index())
            .filter(|&c| c >= 0)
            .ok_or_else(|| AplError::domain("where: counts must be non-negative integers"))?;
        for _ in 0..count {
            out.push(i as i64 + origin);
        }
    }
    Ok(Value::int_vec(out))
}

/// `∪R`: first occurrences in ravel order
pub fn unique(v: &Value) -> Value {
    let mut out: Vec<Value> = Vec::new();
    for e in v.elems() {
        if !out.iter().any(|o| value::eq(o, &e)) {
            out.push(e);
        }
    }
    Value::from_elems(Shape::from(out.len()), out)
}

/// `⌹R`: matrix inverse by Gauss-Jordan elimination
pub fn matrix_inverse(v: &Value) -> AplResult<Value> {
    let shape = v.shape();
    if shape.rank() != 2 || shape[0] != shape[1] {
        return Err(AplError::shape("matrix inverse needs a square matrix"));
    }
    let n = shape[0];
    let mut a = to_float_rows(v, n, n)?;
    let mut inv: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| (i == j) as u8 as f64).collect())
        .collect();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| {
                a[i][col]
                    .abs()
                    .partial_cmp(&a[j][col].abs())
                    .unwrap_or(Ordering::Equal)
            })
            .unwrap();
        if a[pivot][col] == 0.0 {
            return Err(AplError::domain("matrix is singular"));
        }
        a.swap(col, pivot);
        inv.swap(col, pivot);
        let p = a[col][col];
        for j in 0..n {
            a[col][j] /= p;
            inv[col][j] /= p;
        }
        for i in 0..n {
            if i != col {
                let factor = a[i][col];
                for j in 0..n {
                    a[i][j] -= factor * a[col][j];
                    inv[i][j] -= factor * inv[col][j];
                }
            }
        }
    }
    let elems: Vec<Value> = inv
        .into_iter()
        .flatten()
        .map(Value::float)
        .collect();
    Ok(Value::from_elems(Shape::from([n, n]), elems))
}

/// `L⌹R`: solve `R x = L`
pub fn matrix_divide(l: &Value, r: &Value) -> AplResult<Value> {
    let inv = matrix_inverse(r)?;
    let n = r.shape()[0];
    if l.size() % n != 0 || l.size() == 0 {
        return Err(AplError::length("solve: right-hand side does not conform"));
    }
    let cols = l.size() / n;
    let b = to_float_rows(l, n, cols)?;
    let a = to_float_rows(&inv, n, n)?;
    let mut out = Vec::with_capacity(n * cols);
    for i in 0..n {
        for j in 0..cols {
            let mut acc = 0.0;
            for (k, row) in b.iter().enumerate() {
                acc += a[i][k] * row[j];
            }
            out.push(Value::float(acc));
        }
    }
    let shape = if l.rank() <= 1 {
        Shape::from(n)
    } else {
        Shape::from([n, cols])
    };
    Ok(Value::from_elems(shape, out))
}

fn to_float_rows(v: &Value, rows: usize, cols: usize) -> AplResult<Vec<Vec<f64>>> {
    let mut out = Vec::with_capacity(rows);
    for i in 0..rows {
        let mut row = Vec::with_capacity(cols);
        for j in 0..cols {
            let n = v
                .at(i * cols + j)
                .as_num()
                .ok_or_else(|| AplError::domain("matrix elements must be numbers"))?;
            if matches!(n, crate::num::Num::Complex(_)) {
                return Err(AplError::domain("matrix elements must be real"));
            }
            row.push(match n.uptype(crate::num::Kind::Float) {
                crate::num::Num::Float(f) => f,
                _ => unreachable!(),
            });
        }
        out.push(row);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iota_respects_origin() {
        assert!(value::eq(&iota(1, 3).unwrap(), &Value::int_vec(vec![1, 2, 3])));
        assert!(value::eq(&iota(0, 3).unwrap(), &Value::int_vec(vec![0, 1, 2])));
        assert!(value::eq(&iota(1, 0).unwrap(), &Value::Empty));
    }

    #[test]
    fn shape_of_scalar_is_empty() {
        assert!(value::eq(&shape_of(&Value::int(5)), &Value::Empty));
        let m = Value::from_elems([2, 3].into(), (1..=6).map(Value::int).collect());
        assert!(value::eq(&shape_of(&m), &Value::int_vec(vec![2, 3])));
    }

    #[test]
    fn diagonal_transpose() {
        let m = Value::from_elems([3, 3].into(), (1..=9).map(Value::int).collect());
        let d = transpose(&[0, 0], &m).unwrap();
        assert!(value::eq(&d, &Value::int_vec(vec![1, 5, 9])));
    }

    #[test]
    fn grade_is_stable() {
        let v = Value::int_vec(vec![23, 14, 23, 12, 14]);
        let g = grade(&v, true, 1).unwrap();
        assert!(value::eq(&g, &Value::int_vec(vec![4, 2, 5, 1, 3])));
    }

    #[test]
    fn where_repeats_counts() {
        let v = Value::int_vec(vec![1, 0, 2]);
        assert!(value::eq(&where_(&v, 1).unwrap(), &Value::int_vec(vec![1, 3, 3])));
    }

    #[test]
    fn inverse_of_diagonal() {
        let m = Value::from_elems([2, 2].into(), [2, 0, 0, 1].map(Value::int).into());
        let inv = matrix_inverse(&m).unwrap();
        let expect = Value::from_elems(
            [2, 2].into(),
            [0.5, 0.0, 0.0, 1.0].map(Value::float).into(),
        );
        assert!(value::eq(&inv, &expect));
    }
}
