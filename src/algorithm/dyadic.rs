//! Dyadic array primitives

use rand::{prelude::SliceRandom, rngs::SmallRng};

use crate::{
    algorithm::lanes,
    error::{AplError, AplResult},
    num::{Num, Tower},
    shape::Shape,
    value::{self, Value},
};

/// Resolve a bracket-axis value to a zero-based axis
pub fn axis_index(axis: &Value, origin: i64) -> AplResult<usize> {
    let a = axis
        .as_index()
        .ok_or_else(|| AplError::domain("axis must be an integer"))?
        - origin;
    if a < 0 {
        return Err(AplError::index("axis out of range"));
    }
    Ok(a as usize)
}

/// Resolve a bracket-axis value to a list of zero-based axes
pub fn axis_list(axis: &Value, origin: i64) -> AplResult<Vec<usize>> {
    let ints = axis
        .as_int_vec()
        .ok_or_else(|| AplError::domain("axis must be integers"))?;
    let mut out = Vec::with_capacity(ints.len());
    for a in ints {
        let a = a - origin;
        if a < 0 {
            return Err(AplError::index("axis out of range"));
        }
        out.push(a as usize);
    }
    Ok(out)
}

/// `L⍴R`: create shape `L` by cycling the ravel of `R`
pub fn reshape(shape: &Shape, r: &Value) -> Value {
    let n = shape.elements();
    let src = r.elems();
    let elems: Vec<Value> = if src.is_empty() {
        let fill = r.fill_value();
        vec![fill; n]
    } else {
        (0..n).map(|i| src[i % src.len()].clone()).collect()
    };
    Value::from_elems(shape.clone(), elems)
}

/// `L,R` and `L⍪R`: catenate along an axis; a fractional axis laminates
pub fn catenate(
    l: &Value,
    r: &Value,
    axis: Option<&Value>,
    origin: i64,
    first_default: bool,
) -> AplResult<Value> {
    if let Some(a) = axis {
        if let Some(Num::Float(f)) = a.as_num() {
            if f.fract() != 0.0 {
                let rank = l.rank().max(r.rank());
                let pos = (f.ceil() as i64 - origin).clamp(0, rank as i64) as usize;
                return laminate(l, r, pos);
            }
        }
    }
    if l.is_scalar() && r.is_scalar() {
        return Ok(Value::vector(vec![l.clone(), r.clone()]));
    }
    let target_rank = l.rank().max(r.rank()).max(1);
    let ax = match axis {
        Some(a) => axis_index(a, origin)?,
        None => {
            if first_default {
                0
            } else {
                target_rank - 1
            }
        }
    };
    if ax >= target_rank {
        return Err(AplError::index("catenate axis out of range"));
    }
    let side_shape = |v: &Value| -> AplResult<Option<Shape>> {
        if v.is_scalar() {
            return Ok(None);
        }
        let shape = v.shape();
        if shape.rank() == target_rank {
            Ok(Some(shape))
        } else if shape.rank() + 1 == target_rank {
            let mut s = shape;
            s.insert(ax, 1);
            Ok(Some(s))
        } else {
            Err(AplError::rank("catenate operands do not conform"))
        }
    };
    let ls = side_shape(l)?;
    let rs = side_shape(r)?;
    let frame = ls.clone().or_else(|| rs.clone()).unwrap();
    let scalar_shape = |s: &Option<Shape>| {
        s.clone().unwrap_or_else(|| {
            let mut t = frame.clone();
            t[ax] = 1;
            t
        })
    };
    let ls = scalar_shape(&ls);
    let rs = scalar_shape(&rs);
    for d in 0..target_rank {
        if d != ax && ls[d] != rs[d] {
            return Err(AplError::length(format!(
                "catenate: shapes {} and {} do not conform",
                ls, rs
            )));
        }
    }
    let (dl, dr) = (ls[ax], rs[ax]);
    let mut shape = ls.clone();
    shape[ax] = dl + dr;
    let mut elems = Vec::with_capacity(shape.elements());
    let mut dims = Vec::new();
    for flat in 0..shape.elements() {
        shape.flat_to_dims(flat, &mut dims);
        let e = if dims[ax] < dl {
            if l.is_scalar() {
                l.clone()
            } else {
                l.at(ls.dims_to_flat(&dims).unwrap())
            }
        } else {
            dims[ax] -= dl;
            let e = if r.is_scalar() {
                r.clone()
            } else {
                r.at(rs.dims_to_flat(&dims).unwrap())
            };
            dims[ax] += dl;
            e
        };
        elems.push(e);
    }
    Ok(Value::from_elems(shape, elems))
}

/// Join along a new axis inserted at `pos`
fn laminate(l: &Value, r: &Value, pos: usize) -> AplResult<Value> {
    let frame = if !l.is_scalar() {
        l.shape()
    } else if !r.is_scalar() {
        r.shape()
    } else {
        Shape::scalar()
    };
    for v in [l, r] {
        if !v.is_scalar() && v.shape() != frame {
            return Err(AplError::length("laminate: shapes do not conform"));
        }
    }
    let pos = pos.min(frame.rank());
    let mut shape = frame.clone();
    shape.insert(pos, 2);
    let extend = |v: &Value| -> Vec<Value> {
        if v.is_scalar() {
            vec![v.clone(); frame.elements()]
        } else {
            v.elems()
        }
    };
    // Build with the new axis leading, then transpose it into place
    let mut elems = extend(l);
    elems.extend(extend(r));
    let mut lead = Shape::from(2);
    lead.extend(frame.iter().copied());
    let joined = Value::from_elems(lead, elems);
    if pos == 0 {
        return Ok(joined);
    }
    let rank = frame.rank() + 1;
    let mut perm = Vec::with_capacity(rank);
    perm.push(pos);
    for d in 0..rank {
        if d != pos {
            perm.push(d);
        }
    }
    crate::algorithm::monadic::transpose(&perm, &joined)
}

/// `L↑R`: positive lengths take from the front, negative from the
/// back; overtake pads with the fill element
pub fn take(l: &Value, r: &Value, axis: Option<&Value>, origin: i64) -> AplResult<Value> {
    let lens = l
        .as_int_vec()
        .ok_or_else(|| AplError::domain("take: lengths must be integers"))?;
    let axes = match axis {
        Some(a) => axis_list(a, origin)?,
        None => (0..lens.len()).collect(),
    };
    taker(&lens, &axes, r, true)
}

/// `L↓R`: positive lengths drop from the front, negative from the back
pub fn drop(l: &Value, r: &Value, axis: Option<&Value>, origin: i64) -> AplResult<Value> {
    let lens = l
        .as_int_vec()
        .ok_or_else(|| AplError::domain("drop: lengths must be integers"))?;
    let axes = match axis {
        Some(a) => axis_list(a, origin)?,
        None => (0..lens.len()).collect(),
    };
    taker(&lens, &axes, r, false)
}

fn taker(lens: &[i64], axes: &[usize], r: &Value, is_take: bool) -> AplResult<Value> {
    if lens.len() != axes.len() {
        return Err(AplError::length("axis list does not match lengths"));
    }
    if lens.is_empty() {
        return Ok(r.clone());
    }
    let max_axis = axes.iter().copied().max().unwrap();
    let src_shape = if r.is_scalar() {
        Shape::from(vec![1; max_axis + 1].as_slice())
    } else {
        let shape = r.shape();
        if max_axis >= shape.rank() {
            return Err(AplError::rank("axis exceeds the rank"));
        }
        shape
    };
    let fill = r.fill_value();
    let mut shape = src_shape.clone();
    // Per-axis source offset; positions outside the source become fill
    let mut offsets = vec![0i64; src_shape.rank()];
    for (&len, &ax) in lens.iter().zip(axes) {
        let dim = src_shape[ax] as i64;
        if is_take {
            shape[ax] = len.unsigned_abs() as usize;
            offsets[ax] = if len >= 0 { 0 } else { dim + len };
        } else {
            shape[ax] = (dim - len.abs()).max(0) as usize;
            offsets[ax] = if len >= 0 { len } else { 0 };
        }
    }
    let mut elems = Vec::with_capacity(shape.elements());
    let mut dims = Vec::new();
    let mut src = Vec::new();
    for flat in 0..shape.elements() {
        shape.flat_to_dims(flat, &mut dims);
        src.clear();
        let mut ok = true;
        for (d, &i) in dims.iter().enumerate() {
            let s = i as i64 + offsets[d];
            if s < 0 || s >= src_shape[d] as i64 {
                ok = false;
                break;
            }
            src.push(s as usize);
        }
        if ok {
            let si = src_shape.dims_to_flat(&src).unwrap();
            elems.push(if r.is_scalar() { r.clone() } else { r.at(si) });
        } else {
            elems.push(fill.clone());
        }
    }
    Ok(Value::from_elems(shape, elems))
}

/// `L⌽[k]R`: cyclic rotation; the shift is a scalar or an array of the
/// target's shape without the axis
pub fn rotate(shift: &Value, r: &Value, axis: usize) -> AplResult<Value> {
    if r.is_scalar() {
        return Ok(r.clone());
    }
    let shape = r.shape();
    if axis >= shape.rank() {
        return Err(AplError::index("rotate axis out of range"));
    }
    let mut lane_shape = shape.clone();
    lane_shape.remove(axis);
    if !shift.is_scalar() && shift.shape() != lane_shape {
        return Err(AplError::shape(
            "rotate: shift shape must drop the rotation axis",
        ));
    }
    let elems = r.elems();
    let mut out = elems.clone();
    for (li, lane) in lanes(&shape, axis).into_iter().enumerate() {
        let s = if shift.is_scalar() {
            shift.clone()
        } else {
            shift.at(li)
        };
        let s = s
            .as_index()
            .ok_or_else(|| AplError::domain("rotate: shift must be an integer"))?;
        let d = lane.len() as i64;
        if d == 0 {
            continue;
        }
        for (k, &dst) in lane.iter().enumerate() {
            let src = lane[(k as i64 + s).rem_euclid(d) as usize];
            out[dst] = elems[src].clone();
        }
    }
    Ok(Value::from_elems(shape, out))
}

/// `L⍳R`: the index of the first occurrence of each item of `R` in the
/// vector `L`; absent items give `(⍴L)+⎕IO`
pub fn index_of(l: &Value, r: &Value, origin: i64) -> AplResult<Value> {
    let items = l.elems();
    let not_found = items.len() as i64 + origin;
    let shape = r.shape();
    let mut out = Vec::with_capacity(r.size());
    for i in 0..r.size() {
        let x = r.at(i);
        let idx = items
            .iter()
            .position(|it| value::eq(it, &x))
            .map(|p| p as i64 + origin)
            .unwrap_or(not_found);
        out.push(Value::int(idx));
    }
    Ok(Value::from_elems(shape, out))
}

/// `L∊R`: membership of each item of `L` in the items of `R`
pub fn membership(l: &Value, r: &Value) -> AplResult<Value> {
    let items = r.elems();
    let shape = l.shape();
    let mut out = Vec::with_capacity(l.size());
    for i in 0..l.size() {
        let x = l.at(i);
        out.push(Value::bool(items.iter().any(|it| value::eq(it, &x))));
    }
    Ok(Value::from_elems(shape, out))
}

/// `L⍸R`: for each item of `R`, how many items of the sorted vector
/// `L` are not greater
pub fn interval_index(l: &Value, r: &Value) -> AplResult<Value> {
    if l.rank() != 1 {
        return Err(AplError::rank("interval index: intervals must be a vector"));
    }
    let bounds = l.elems();
    let shape = r.shape();
    let mut out = Vec::with_capacity(r.size());
    for i in 0..r.size() {
        let x = r.at(i);
        let count = bounds
            .iter()
            .take_while(|b| value::ord(b, &x) != std::cmp::Ordering::Greater)
            .count();
        out.push(Value::int(count as i64));
    }
    Ok(Value::from_elems(shape, out))
}

/// `L~R`: the items of `L` not found in `R`
pub fn without(l: &Value, r: &Value) -> AplResult<Value> {
    let excl = r.elems();
    let out: Vec<Value> = l
        .elems()
        .into_iter()
        .filter(|x| !excl.iter().any(|e| value::eq(e, x)))
        .collect();
    Ok(Value::from_elems(Shape::from(out.len()), out))
}

/// `L∪R`: `L` catenated with the items of `R` not already present
pub fn union(l: &Value, r: &Value) -> AplResult<Value> {
    let mut out = l.elems();
    for x in r.elems() {
        if !out.iter().any(|e| value::eq(e, &x)) {
            out.push(x);
        }
    }
    Ok(Value::from_elems(Shape::from(out.len()), out))
}

/// `L⍷R`: ones where the pattern `L` begins, within the shape of `R`
pub fn find(l: &Value, r: &Value) -> AplResult<Value> {
    let rshape = r.shape();
    let rank = rshape.rank();
    if l.rank() > rank {
        let zeros = vec![Value::bool(false); r.size()];
        return Ok(Value::from_elems(rshape, zeros));
    }
    // Pad the pattern shape with leading singletons
    let lshape_raw = l.shape();
    let mut lshape = Shape::with_capacity(rank);
    for _ in 0..rank - lshape_raw.rank() {
        lshape.push(1);
    }
    lshape.extend(lshape_raw.iter().copied());
    let mut out = Vec::with_capacity(r.size());
    let mut dims = Vec::new();
    let mut probe = Vec::new();
    for flat in 0..r.size() {
        rshape.flat_to_dims(flat, &mut dims);
        let mut hit = true;
        'offsets: for off in 0..lshape.elements() {
            lshape.flat_to_dims(off, &mut probe);
            let mut at = Vec::with_capacity(rank);
            for d in 0..rank {
                let i = dims[d] + probe[d];
                if i >= rshape[d] {
                    hit = false;
                    break 'offsets;
                }
                at.push(i);
            }
            let ri = rshape.dims_to_flat(&at).unwrap();
            if !value::eq(&r.at(ri), &l.at(off)) {
                hit = false;
                break;
            }
        }
        out.push(Value::bool(hit));
    }
    Ok(Value::from_elems(rshape, out))
}

/// `L⊥R`: evaluate digits `R` in the mixed radix `L`
pub fn decode(tower: &Tower, l: &Value, r: &Value) -> AplResult<Value> {
    let lshape = l.shape();
    let rshape = r.shape();
    let dl = if l.is_scalar() {
        1
    } else {
        lshape[lshape.rank() - 1]
    };
    let dr = if r.is_scalar() { 1 } else { rshape[0] };
    if dl != 1 && dr != 1 && dl != dr {
        return Err(AplError::length("decode: radix and digits do not conform"));
    }
    let c = dl.max(dr);
    let rows = l.size() / dl.max(1);
    let cols = r.size() / dr.max(1);
    let mut shape = Shape::with_capacity(lshape.rank() + rshape.rank());
    if !l.is_scalar() {
        shape.extend_from_slice(&lshape[..lshape.rank() - 1]);
    }
    if !r.is_scalar() {
        shape.extend_from_slice(&rshape[1..]);
    }
    let num_at = |v: &Value, i: usize| -> AplResult<Num> {
        v.at(i)
            .as_num()
            .ok_or_else(|| AplError::domain("decode: numbers expected"))
    };
    let mut elems = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        // Weights accumulate right to left over the radix row
        let mut weights = vec![Num::Int(1); c];
        for k in (0..c.saturating_sub(1)).rev() {
            let rad = num_at(l, i * dl + if dl == 1 { 0 } else { k + 1 })?;
            weights[k] = tower.mul(weights[k + 1], rad)?;
        }
        for j in 0..cols {
            let mut acc = Num::Int(0);
            for (k, w) in weights.iter().enumerate() {
                let x = num_at(r, if dr == 1 { j } else { k * cols + j })?;
                acc = tower.add(acc, tower.mul(*w, x)?)?;
            }
            elems.push(Value::Num(acc));
        }
    }
    Ok(Value::from_elems(shape, elems))
}

/// `L⊤R`: represent each number of `R` in the mixed radix given by the
/// leading axis of `L`; a zero radix keeps the remainder
pub fn encode(tower: &Tower, l: &Value, r: &Value) -> AplResult<Value> {
    let lshape = l.shape();
    let digits = if l.is_scalar() { 1 } else { lshape[0] };
    let cols = l.size() / digits.max(1);
    let mut shape = lshape.clone();
    shape.extend(r.shape().iter().copied());
    let rsize = r.size();
    let mut elems = vec![Value::int(0); shape.elements().max(0)];
    for col in 0..cols {
        for j in 0..rsize {
            let mut rem = r
                .at(j)
                .as_num()
                .ok_or_else(|| AplError::domain("encode: numbers expected"))?;
            for k in (0..digits).rev() {
                let rad = l
                    .at(k * cols + col)
                    .as_num()
                    .ok_or_else(|| AplError::domain("encode: numbers expected"))?;
                let digit = if rad.is_zero() {
                    let d = rem;
                    rem = Num::Int(0);
                    d
                } else {
                    let d = tower.residue(rad, rem)?;
                    rem = tower.div(tower.sub(rem, d)?, rad)?;
                    d
                };
                elems[(k * cols + col) * rsize + j] = Value::Num(digit);
            }
        }
    }
    Ok(Value::from_elems(shape, elems))
}

/// `L/[k]R`: repeat items along an axis; negative counts insert fill
pub fn replicate(counts: &Value, r: &Value, axis: Option<&Value>, origin: i64) -> AplResult<Value> {
    let shape = if r.is_scalar() {
        Shape::from(1)
    } else {
        r.shape()
    };
    let ax = match axis {
        Some(a) => axis_index(a, origin)?,
        None => shape.rank() - 1,
    };
    if ax >= shape.rank() {
        return Err(AplError::index("replicate axis out of range"));
    }
    let dim = shape[ax];
    let mut cs = counts
        .as_int_vec()
        .ok_or_else(|| AplError::domain("replicate: counts must be integers"))?;
    if cs.len() == 1 {
        cs = vec![cs[0]; dim];
    }
    // A singleton axis extends to the count list
    let extended = cs.len() != dim && dim == 1;
    if !extended && cs.len() != dim {
        return Err(AplError::length("replicate: counts do not match the axis"));
    }
    let out_dim: usize = cs.iter().map(|&c| c.unsigned_abs() as usize).sum();
    let mut out_shape = shape.clone();
    out_shape[ax] = out_dim;
    let fill = r.fill_value();
    let src_at = |lane: &[usize], i: usize| -> Value {
        if r.is_scalar() {
            r.clone()
        } else if extended {
            r.at(lane[0])
        } else {
            r.at(lane[i])
        }
    };
    // Build lane by lane, then scatter back in axis order
    let src_lanes = lanes(&shape, ax);
    let dst_lanes = lanes(&out_shape, ax);
    let mut elems = vec![fill.clone(); out_shape.elements()];
    for (lane_src, lane_dst) in src_lanes.iter().zip(&dst_lanes) {
        let mut pos = 0;
        for (i, &c) in cs.iter().enumerate() {
            if c >= 0 {
                for _ in 0..c {
                    elems[lane_dst[pos]] = src_at(lane_src, i);
                    pos += 1;
                }
            } else {
                for _ in 0..-c {
                    elems[lane_dst[pos]] = fill.clone();
                    pos += 1;
                }
            }
        }
    }
    Ok(Value::from_elems(out_shape, elems))
}

/// `L\[k]R`: positive counts copy successive items, non-positive
/// counts insert fill
pub fn expand(counts: &Value, r: &Value, axis: Option<&Value>, origin: i64) -> AplResult<Value> {
    let scalar_r = r.is_scalar();
    let shape = if scalar_r { Shape::from(1) } else { r.shape() };
    let ax = match axis {
        Some(a) => axis_index(a, origin)?,
        None => shape.rank() - 1,
    };
    if ax >= shape.rank() {
        return Err(AplError::index("expand axis out of range"));
    }
    let dim = shape[ax];
    let cs = counts
        .as_int_vec()
        .ok_or_else(|| AplError::domain("expand: counts must be integers"))?;
    let positives = cs.iter().filter(|&&c| c > 0).count();
    let extend = scalar_r || dim == 1;
    if !extend && positives != dim {
        return Err(AplError::length(
            "expand: positive counts must match the axis",
        ));
    }
    let out_dim: usize = cs
        .iter()
        .map(|&c| if c > 0 { c as usize } else { (-c).max(1) as usize })
        .sum();
    let mut out_shape = shape.clone();
    out_shape[ax] = out_dim;
    let fill = r.fill_value();
    let src_lanes = lanes(&shape, ax);
    let dst_lanes = lanes(&out_shape, ax);
    let mut elems = vec![fill.clone(); out_shape.elements()];
    for (lane_src, lane_dst) in src_lanes.iter().zip(&dst_lanes) {
        let mut pos = 0;
        let mut item = 0;
        for &c in &cs {
            if c > 0 {
                let e = if scalar_r {
                    r.clone()
                } else if extend {
                    r.at(lane_src[0])
                } else {
                    r.at(lane_src[item])
                };
                item += 1;
                for _ in 0..c {
                    elems[lane_dst[pos]] = e.clone();
                    pos += 1;
                }
            } else {
                for _ in 0..(-c).max(1) {
                    elems[lane_dst[pos]] = fill.clone();
                    pos += 1;
                }
            }
        }
    }
    Ok(Value::from_elems(out_shape, elems))
}

/// `L?R`: deal `L` distinct indices from `⍳R`
pub fn deal(rng: &mut SmallRng, l: &Value, r: &Value, origin: i64) -> AplResult<Value> {
    let k = l
        .as_index()
        .ok_or_else(|| AplError::domain("deal: count must be an integer"))?;
    let n = r
        .as_index()
        .ok_or_else(|| AplError::domain("deal: range must be an integer"))?;
    if k < 0 || n < 0 || k > n {
        return Err(AplError::domain("deal: count exceeds range"));
    }
    let mut pool: Vec<i64> = (origin..origin + n).collect();
    pool.shuffle(rng);
    pool.truncate(k as usize);
    Ok(Value::int_vec(pool))
}

/// Bracket subscripts resolved to a result shape and flat source
/// positions; omitted subscripts select everything along their axis
pub fn index_positions(
    shape: &Shape,
    subs: &[Option<Value>],
    origin: i64,
) -> AplResult<(Shape, Vec<usize>)> {
    if subs.len() != shape.rank().max(1) {
        return Err(AplError::rank(format!(
            "index: {} subscripts for rank {}",
            subs.len(),
            shape.rank()
        )));
    }
    // Per axis: the contributed result dims and the source indices
    let mut contrib: Vec<(Vec<usize>, Vec<usize>)> = Vec::with_capacity(subs.len());
    for (d, sub) in subs.iter().enumerate() {
        let dim = shape.dims().get(d).copied().unwrap_or(1);
        match sub {
            None => contrib.push((vec![dim], (0..dim).collect())),
            Some(v) => {
                let vshape: Vec<usize> = v.shape().iter().copied().collect();
                let mut indices = Vec::with_capacity(v.size());
                for i in 0..v.size() {
                    let ix = v
                        .at(i)
                        .as_num()
                        .and_then(|n| n.to_index())
                        .ok_or_else(|| AplError::domain("index: integers expected"))?
                        - origin;
                    if ix < 0 || ix as usize >= dim {
                        return Err(AplError::index(format!("index {} out of range", ix + origin)));
                    }
                    indices.push(ix as usize);
                }
                contrib.push((vshape, indices));
            }
        }
    }
    let mut out_shape = Shape::with_capacity(subs.len());
    for (dims, _) in &contrib {
        out_shape.extend_from_slice(dims);
    }
    let mut positions = Vec::with_capacity(out_shape.elements());
    let counts: Vec<usize> = contrib.iter().map(|(_, ix)| ix.len()).collect();
    let total: usize = counts.iter().product();
    for flat in 0..total {
        let mut rest = flat;
        let mut dims = vec![0usize; contrib.len()];
        for d in (0..contrib.len()).rev() {
            dims[d] = contrib[d].1[rest % counts[d]];
            rest /= counts[d];
        }
        let si = shape.dims_to_flat(&dims).unwrap_or(0);
        positions.push(si);
    }
    Ok((out_shape, positions))
}

/// `X[i;…]`: bracket indexing
pub fn index_value(x: &Value, subs: &[Option<Value>], origin: i64) -> AplResult<Value> {
    let (shape, positions) = index_positions(&x.shape(), subs, origin)?;
    let elems: Vec<Value> = positions.into_iter().map(|p| x.at(p)).collect();
    Ok(Value::from_elems(shape, elems))
}
