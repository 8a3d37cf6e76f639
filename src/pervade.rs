use crate::{
    error::{AplError, AplResult},
    num::{Num, Tower},
    value::Value,
};

fn expect_num(v: &Value) -> AplResult<Num> {
    v.as_num()
        .ok_or_else(|| AplError::domain(format!("expected a number, not a {}", v.type_name())))
}

/// Apply a scalar function to every element, recursing into nested
/// arrays
pub fn un_pervade_generic(
    r: &Value,
    f: &impl Fn(&Value) -> AplResult<Value>,
) -> AplResult<Value> {
    if r.is_scalar() {
        return f(r);
    }
    let shape = r.shape();
    let mut elems = Vec::with_capacity(r.size());
    for i in 0..r.size() {
        let e = r.at(i);
        elems.push(if e.is_scalar() {
            f(&e)?
        } else {
            un_pervade_generic(&e, f)?
        });
    }
    Ok(Value::from_elems(shape, elems))
}

/// Monadic numeric pervasion
pub fn un_pervade(
    tower: &Tower,
    r: &Value,
    f: &impl Fn(&Tower, Num) -> AplResult<Num>,
) -> AplResult<Value> {
    un_pervade_generic(r, &|v| f(tower, expect_num(v)?).map(Value::Num))
}

/// Dyadic pervasion over arbitrary scalars: a scalar combines with
/// every element, arrays must have equal shape
pub fn bin_pervade_generic(
    l: &Value,
    r: &Value,
    f: &impl Fn(&Value, &Value) -> AplResult<Value>,
) -> AplResult<Value> {
    match (l.is_scalar(), r.is_scalar()) {
        (true, true) => f(l, r),
        (true, false) => {
            let shape = r.shape();
            let mut elems = Vec::with_capacity(r.size());
            for i in 0..r.size() {
                elems.push(bin_pervade_generic(l, &r.at(i), f)?);
            }
            Ok(Value::from_elems(shape, elems))
        }
        (false, true) => {
            let shape = l.shape();
            let mut elems = Vec::with_capacity(l.size());
            for i in 0..l.size() {
                elems.push(bin_pervade_generic(&l.at(i), r, f)?);
            }
            Ok(Value::from_elems(shape, elems))
        }
        (false, false) => {
            if l.shape() != r.shape() {
                // Single-element arrays extend like scalars
                if l.size() == 1 {
                    return bin_pervade_generic(&l.at(0), r, f);
                }
                if r.size() == 1 {
                    return bin_pervade_generic(l, &r.at(0), f);
                }
                if l.rank() != r.rank() {
                    return Err(AplError::rank(format!(
                        "ranks {} and {} do not conform",
                        l.rank(),
                        r.rank()
                    )));
                }
                return Err(AplError::length(format!(
                    "shapes {} and {} do not conform",
                    l.shape(),
                    r.shape()
                )));
            }
            let shape = l.shape();
            let mut elems = Vec::with_capacity(l.size());
            for i in 0..l.size() {
                elems.push(bin_pervade_generic(&l.at(i), &r.at(i), f)?);
            }
            Ok(Value::from_elems(shape, elems))
        }
    }
}

/// Dyadic numeric pervasion
pub fn bin_pervade(
    tower: &Tower,
    l: &Value,
    r: &Value,
    f: &impl Fn(&Tower, Num, Num) -> AplResult<Num>,
) -> AplResult<Value> {
    bin_pervade_generic(l, r, &|a, b| {
        f(tower, expect_num(a)?, expect_num(b)?).map(Value::Num)
    })
}

/// Scalar dyadic with an axis: the lower-rank operand's dimensions are
/// aligned with the listed axes of the higher-rank operand
pub fn bin_pervade_axis(
    l: &Value,
    r: &Value,
    axes: &[usize],
    f: &impl Fn(&Value, &Value) -> AplResult<Value>,
) -> AplResult<Value> {
    let (big, small, l_is_big) = if l.rank() >= r.rank() {
        (l, r, true)
    } else {
        (r, l, false)
    };
    if axes.len() != small.rank() {
        return Err(AplError::length(format!(
            "axis list has {} entries for a rank {} operand",
            axes.len(),
            small.rank()
        )));
    }
    let big_shape = big.shape();
    let small_shape = small.shape();
    for (i, &ax) in axes.iter().enumerate() {
        if ax >= big_shape.rank() {
            return Err(AplError::index(format!("axis {} out of range", ax + 1)));
        }
        if big_shape[ax] != small_shape[i] {
            return Err(AplError::length(format!(
                "axis {} length {} does not match {}",
                ax + 1,
                big_shape[ax],
                small_shape[i]
            )));
        }
    }
    let mut elems = Vec::with_capacity(big.size());
    let mut dims = Vec::new();
    for flat in 0..big.size() {
        big_shape.flat_to_dims(flat, &mut dims);
        let small_dims: Vec<usize> = axes.iter().map(|&a| dims[a]).collect();
        let si = small_shape
            .dims_to_flat(&small_dims)
            .ok_or_else(|| AplError::index("axis index out of range"))?;
        let (a, b) = if l_is_big {
            (big.at(flat), small.at(si))
        } else {
            (small.at(si), big.at(flat))
        };
        elems.push(f(&a, &b)?);
    }
    Ok(Value::from_elems(big_shape, elems))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value;

    #[test]
    fn scalar_broadcasts_to_every_element() {
        let t = Tower::default();
        let l = Value::int(1);
        let r = Value::int_vec(vec![1, 2, 3]);
        let sum = bin_pervade(&t, &l, &r, &|t, a, b| t.add(a, b)).unwrap();
        assert!(value::eq(&sum, &Value::int_vec(vec![2, 3, 4])));
    }

    #[test]
    fn unequal_shapes_are_rejected() {
        let t = Tower::default();
        let l = Value::int_vec(vec![1, 2]);
        let r = Value::int_vec(vec![1, 2, 3]);
        assert!(bin_pervade(&t, &l, &r, &|t, a, b| t.add(a, b)).is_err());
    }

    #[test]
    fn axis_aligns_the_lower_rank_operand() {
        let l = Value::from_elems([2, 3].into(), (1..=6).map(Value::int).collect());
        let r = Value::int_vec(vec![1, 2, 3]);
        let t = Tower::default();
        let sum = bin_pervade_axis(&l, &r, &[1], &|a, b| {
            bin_pervade(&t, a, b, &|t, x, y| t.add(x, y))
        })
        .unwrap();
        let expect = Value::from_elems([2, 3].into(), [2, 4, 6, 5, 7, 9].map(Value::int).into());
        assert!(value::eq(&sum, &expect));
    }
}
