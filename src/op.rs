use enum_iterator::{all, Sequence};

use crate::{
    algorithm::{dyadic, lanes},
    error::{AplError, AplResult},
    function::{Derived, Function},
    shape::Shape,
    value::Value,
    Apl,
};

/// A higher-order operator; its derived functions capture their
/// operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence)]
pub enum Operator {
    /// `f/` reduce, `n f/` n-wise reduce, `a/` replicate
    Reduce,
    ReduceFirst,
    /// `f\` scan, `a\` expand
    Scan,
    ScanFirst,
    Each,
    Commute,
    /// `∘.f` outer product
    Outer,
    /// `f.g` inner product
    Inner,
    /// `f∘g`, `A∘g`, `f∘B` composition forms
    Compose,
    /// `f⍣n` repeat, `f⍣g` fixed point
    Power,
    /// `f⍤k` cell-wise application
    Rank,
    /// `f@g` replace selected positions
    At,
    /// `f⌺s` windows with fill
    Stencil,
}

impl Operator {
    pub fn all() -> impl Iterator<Item = Self> {
        all()
    }
    pub fn from_glyph(c: char) -> Option<Self> {
        use Operator::*;
        Some(match c {
            '/' => Reduce,
            '⌿' => ReduceFirst,
            '\\' => Scan,
            '⍀' => ScanFirst,
            '¨' => Each,
            '⍨' => Commute,
            '∘' => Compose,
            '.' => Inner,
            '⍣' => Power,
            '⍤' => Rank,
            '@' => At,
            '⌺' => Stencil,
            _ => return None,
        })
    }
    pub fn glyph(&self) -> char {
        use Operator::*;
        match self {
            Reduce => '/',
            ReduceFirst => '⌿',
            Scan => '\\',
            ScanFirst => '⍀',
            Each => '¨',
            Commute => '⍨',
            Outer | Compose => '∘',
            Inner => '.',
            Power => '⍣',
            Rank => '⍤',
            At => '@',
            Stencil => '⌺',
        }
    }
    /// Whether the operator consumes a right operand at parse time
    pub fn dyadic_operator(&self) -> bool {
        use Operator::*;
        matches!(self, Inner | Compose | Power | Rank | At | Stencil)
    }
}

/// Apply an operator-derived function
pub fn call_derived(
    apl: &mut Apl,
    d: &Derived,
    l: Option<&Value>,
    r: &Value,
    axis: Option<&Value>,
) -> AplResult {
    use Operator::*;
    match d.op {
        Reduce | ReduceFirst => {
            let first = d.op == ReduceFirst;
            match &d.f {
                Value::Func(f) => match l {
                    None => reduce(apl, f, r, axis, first),
                    Some(n) => nwise(apl, f, n, r, axis, first),
                },
                counts => {
                    let first_axis = Value::int(apl.origin);
                    let ax = axis.or(if first { Some(&first_axis) } else { None });
                    dyadic::replicate(counts, r, ax, apl.origin)
                }
            }
        }
        Scan | ScanFirst => {
            let first = d.op == ScanFirst;
            match &d.f {
                Value::Func(f) => scan(apl, f, r, axis, first),
                counts => {
                    let first_axis = Value::int(apl.origin);
                    let ax = axis.or(if first { Some(&first_axis) } else { None });
                    dyadic::expand(counts, r, ax, apl.origin)
                }
            }
        }
        Each => each(apl, &d.f, l, r),
        Commute => {
            let f = expect_func(&d.f)?;
            match l {
                None => apl.call_function(&f, Some(r.clone()), r.clone(), None),
                Some(l) => apl.call_function(&f, Some(r.clone()), l.clone(), None),
            }
        }
        Outer => outer(apl, &d.f, l, r),
        Inner => inner(apl, d, l, r),
        Compose => compose(apl, d, l, r),
        Power => power(apl, d, l, r),
        Rank => rank(apl, d, l, r),
        At => at(apl, d, l, r),
        Stencil => stencil(apl, d, r),
    }
}

fn expect_func(v: &Value) -> AplResult<Function> {
    v.as_func()
        .cloned()
        .ok_or_else(|| AplError::domain("operator needs a function operand"))
}

fn operand_func(v: &Option<Value>) -> AplResult<Function> {
    match v {
        Some(v) => expect_func(v),
        None => Err(AplError::domain("operator is missing an operand")),
    }
}

fn resolve_axis(
    axis: Option<&Value>,
    rank: usize,
    origin: i64,
    first: bool,
) -> AplResult<usize> {
    match axis {
        Some(a) => dyadic::axis_index(a, origin),
        None => Ok(if first { 0 } else { rank.saturating_sub(1) }),
    }
}

/// The identity element for reducing an empty axis
fn identity_of(f: &Function) -> AplResult<Value> {
    f.as_prim()
        .and_then(|p| p.reduce_identity())
        .ok_or_else(|| AplError::domain("reduce: no identity for an empty axis"))
}

/// `f/R`: fold each lane right to left
fn reduce(apl: &mut Apl, f: &Function, r: &Value, axis: Option<&Value>, first: bool) -> AplResult {
    if r.is_scalar() {
        return Ok(r.clone());
    }
    let shape = r.shape();
    let ax = resolve_axis(axis, shape.rank(), apl.origin, first)?;
    if ax >= shape.rank() {
        return Err(AplError::index("reduce axis out of range"));
    }
    let mut reduced = shape.clone();
    reduced.remove(ax);
    if shape[ax] == 0 {
        let id = identity_of(f)?;
        let elems = vec![id; reduced.elements()];
        return Ok(Value::from_elems(reduced, elems));
    }
    let mut out = Vec::with_capacity(reduced.elements());
    for lane in lanes(&shape, ax) {
        let mut acc = r.at(lane[lane.len() - 1]);
        for &i in lane.iter().rev().skip(1) {
            acc = apl.call_function(f, Some(r.at(i)), acc, None)?;
        }
        out.push(acc);
    }
    Ok(Value::from_elems(reduced, out))
}

/// `n f/R`: windows of length `|n|`, reversed when `n` is negative
fn nwise(
    apl: &mut Apl,
    f: &Function,
    n: &Value,
    r: &Value,
    axis: Option<&Value>,
    first: bool,
) -> AplResult {
    let n = n
        .as_index()
        .ok_or_else(|| AplError::domain("n-wise reduce: integer window expected"))?;
    let shape = if r.is_scalar() {
        Shape::from(1)
    } else {
        r.shape()
    };
    let ax = resolve_axis(axis, shape.rank(), apl.origin, first)?;
    if ax >= shape.rank() {
        return Err(AplError::index("reduce axis out of range"));
    }
    let m = n.unsigned_abs() as usize;
    let dim = shape[ax];
    let out_dim = (dim + 1).saturating_sub(m);
    let mut out_shape = shape.clone();
    out_shape[ax] = out_dim;
    let mut out = Vec::with_capacity(out_shape.elements());
    for lane in lanes(&shape, ax) {
        for i in 0..out_dim {
            if m == 0 {
                out.push(identity_of(f)?);
                continue;
            }
            let window: Vec<usize> = if n < 0 {
                lane[i..i + m].iter().rev().copied().collect()
            } else {
                lane[i..i + m].to_vec()
            };
            let mut acc = r.at(window[m - 1]);
            for &k in window.iter().rev().skip(1) {
                acc = apl.call_function(f, Some(r.at(k)), acc, None)?;
            }
            out.push(acc);
        }
    }
    Ok(Value::from_elems(out_shape, out))
}

/// `f\R`: prefix reductions along an axis
fn scan(apl: &mut Apl, f: &Function, r: &Value, axis: Option<&Value>, first: bool) -> AplResult {
    if r.is_scalar() {
        return Ok(r.clone());
    }
    let shape = r.shape();
    let ax = resolve_axis(axis, shape.rank(), apl.origin, first)?;
    if ax >= shape.rank() {
        return Err(AplError::index("scan axis out of range"));
    }
    let elems = r.elems();
    let mut out = elems.clone();
    for lane in lanes(&shape, ax) {
        for k in 1..lane.len() {
            // Right fold over the prefix, per the right-to-left law
            let mut acc = elems[lane[k]].clone();
            for &i in lane[..k].iter().rev() {
                acc = apl.call_function(f, Some(elems[i].clone()), acc, None)?;
            }
            out[lane[k]] = acc;
        }
    }
    Ok(Value::from_elems(shape, out))
}

/// `f¨`: element-wise application with scalar broadcasting
fn each(apl: &mut Apl, f: &Value, l: Option<&Value>, r: &Value) -> AplResult {
    let f = expect_func(f)?;
    match l {
        None => {
            if r.is_scalar() {
                return apl.call_function(&f, None, r.clone(), None);
            }
            let shape = r.shape();
            let mut out = Vec::with_capacity(r.size());
            for i in 0..r.size() {
                out.push(apl.call_function(&f, None, r.at(i), None)?);
            }
            Ok(Value::from_elems(shape, out))
        }
        Some(l) => {
            let shape = if l.is_scalar() { r.shape() } else { l.shape() };
            if !l.is_scalar() && !r.is_scalar() && l.shape() != r.shape() {
                return Err(AplError::length("each: shapes do not conform"));
            }
            let n = shape.elements();
            let mut out = Vec::with_capacity(n);
            for i in 0..n {
                let a = if l.is_scalar() { l.clone() } else { l.at(i) };
                let b = if r.is_scalar() { r.clone() } else { r.at(i) };
                out.push(apl.call_function(&f, Some(a), b, None)?);
            }
            Ok(Value::from_elems(shape, out))
        }
    }
}

/// `L∘.fR`: the Cartesian table with shape `(⍴L),⍴R`
fn outer(apl: &mut Apl, f: &Value, l: Option<&Value>, r: &Value) -> AplResult {
    let f = expect_func(f)?;
    let l = l.ok_or_else(|| AplError::domain("outer product is dyadic"))?;
    let mut shape = l.shape();
    shape.extend(r.shape().iter().copied());
    let mut out = Vec::with_capacity(shape.elements());
    for i in 0..l.size() {
        for j in 0..r.size() {
            out.push(apl.call_function(&f, Some(l.at(i)), r.at(j), None)?);
        }
    }
    Ok(Value::from_elems(shape, out))
}

/// `Lf.gR`: `f` reduce over the pairwise `g` of the last axis of `L`
/// with the first axis of `R`
fn inner(apl: &mut Apl, d: &Derived, l: Option<&Value>, r: &Value) -> AplResult {
    let f = expect_func(&d.f)?;
    let g = operand_func(&d.g)?;
    let l = l.ok_or_else(|| AplError::domain("inner product is dyadic"))?;
    let lshape = l.shape();
    let rshape = r.shape();
    let dl = if l.is_scalar() {
        1
    } else {
        lshape[lshape.rank() - 1]
    };
    let dr = if r.is_scalar() { 1 } else { rshape[0] };
    if dl != 1 && dr != 1 && dl != dr {
        return Err(AplError::length("inner product: axes do not conform"));
    }
    let c = dl.max(dr);
    let mut shape = Shape::with_capacity(lshape.rank() + rshape.rank());
    if !l.is_scalar() {
        shape.extend_from_slice(&lshape[..lshape.rank() - 1]);
    }
    if !r.is_scalar() {
        shape.extend_from_slice(&rshape[1..]);
    }
    // An empty contraction axis reduces to the identity of f
    if dl == 0 || dr == 0 {
        let id = identity_of(&f)?;
        let n = shape.elements();
        return Ok(Value::from_elems(shape, vec![id; n]));
    }
    let rows = l.size() / dl;
    let cols = r.size() / dr;
    let mut out = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        for j in 0..cols {
            let mut items = Vec::with_capacity(c);
            for k in 0..c {
                let a = l.at(i * dl + if dl == 1 { 0 } else { k });
                let b = r.at(if dr == 1 { j } else { k * cols + j });
                items.push(apl.call_function(&g, Some(a), b, None)?);
            }
            let mut acc = items.pop().unwrap();
            while let Some(item) = items.pop() {
                acc = apl.call_function(&f, Some(item), acc, None)?;
            }
            out.push(acc);
        }
    }
    Ok(Value::from_elems(shape, out))
}

/// The composition forms: `f∘g`, `A∘g` and `f∘B`
fn compose(apl: &mut Apl, d: &Derived, l: Option<&Value>, r: &Value) -> AplResult {
    let g = d
        .g
        .as_ref()
        .ok_or_else(|| AplError::domain("composition is missing an operand"))?;
    match (&d.f, g) {
        (Value::Func(f), Value::Func(g)) => {
            let gr = apl.call_function(g, None, r.clone(), None)?;
            apl.call_function(f, l.cloned(), gr, None)
        }
        // A∘g binds a constant left argument
        (a, Value::Func(g)) if l.is_none() => {
            apl.call_function(g, Some(a.clone()), r.clone(), None)
        }
        // f∘B binds a constant right argument
        (Value::Func(f), b) if l.is_none() => {
            apl.call_function(f, Some(r.clone()), b.clone(), None)
        }
        _ => Err(AplError::domain("composition operands do not apply")),
    }
}

/// `f⍣n` iterates; `f⍣g` iterates to a fixed point of `g`
fn power(apl: &mut Apl, d: &Derived, l: Option<&Value>, r: &Value) -> AplResult {
    let f = expect_func(&d.f)?;
    let g = d
        .g
        .as_ref()
        .ok_or_else(|| AplError::domain("power operator is missing an operand"))?;
    match g {
        Value::Func(test) => {
            let test = test.clone();
            let mut y = r.clone();
            for _ in 0..1_000_000u32 {
                let next = apl.call_function(&f, l.cloned(), y.clone(), None)?;
                let t = apl.call_function(&test, Some(next.clone()), y, None)?;
                if all_true(&t) {
                    return Ok(next);
                }
                y = next;
            }
            Err(AplError::domain("power: no fixed point reached"))
        }
        n => {
            let n = n
                .as_index()
                .ok_or_else(|| AplError::domain("power: integer count expected"))?;
            if n < 0 {
                return Err(AplError::domain("power: negative counts are not supported"));
            }
            let mut y = r.clone();
            for _ in 0..n {
                y = apl.call_function(&f, l.cloned(), y, None)?;
            }
            Ok(y)
        }
    }
}

fn all_true(v: &Value) -> bool {
    (0..v.size()).all(|i| v.at(i).as_num().is_some_and(|n| !n.is_zero()))
}

/// `f⍤k`: apply to every rank-`k` subcell, pad results to a common
/// cell shape and reassemble
fn rank(apl: &mut Apl, d: &Derived, l: Option<&Value>, r: &Value) -> AplResult {
    let f = expect_func(&d.f)?;
    let spec = d
        .g
        .as_ref()
        .ok_or_else(|| AplError::domain("rank operator is missing its specifier"))?
        .as_int_vec()
        .ok_or_else(|| AplError::domain("rank: integer specifier expected"))?;
    if spec.is_empty() || spec.len() > 3 {
        return Err(AplError::length("rank: 1 to 3 specifiers expected"));
    }
    match l {
        None => {
            let k = spec[0];
            let cells = split_cells(r, k)?;
            let results = cells
                .cells
                .iter()
                .map(|c| apl.call_function(&f, None, c.clone(), None))
                .collect::<AplResult<Vec<_>>>()?;
            assemble(cells.frame, results)
        }
        Some(l) => {
            let (kl, kr) = match spec.len() {
                1 => (spec[0], spec[0]),
                2 => (spec[0], spec[1]),
                _ => (spec[1], spec[2]),
            };
            let lc = split_cells(l, kl)?;
            let rc = split_cells(r, kr)?;
            let (frame, pairs) = match (lc.frame.rank(), rc.frame.rank()) {
                _ if lc.frame == rc.frame => {
                    let pairs = lc.cells.into_iter().zip(rc.cells).collect::<Vec<_>>();
                    (lc.frame, pairs)
                }
                (_, 0) => {
                    let rcell = rc.cells.into_iter().next().unwrap();
                    let pairs = lc
                        .cells
                        .into_iter()
                        .map(|c| (c, rcell.clone()))
                        .collect::<Vec<_>>();
                    (lc.frame, pairs)
                }
                (0, _) => {
                    let lcell = lc.cells.into_iter().next().unwrap();
                    let pairs = rc
                        .cells
                        .into_iter()
                        .map(|c| (lcell.clone(), c))
                        .collect::<Vec<_>>();
                    (rc.frame, pairs)
                }
                _ => return Err(AplError::length("rank: frames do not conform")),
            };
            let results = pairs
                .into_iter()
                .map(|(a, b)| apl.call_function(&f, Some(a), b, None))
                .collect::<AplResult<Vec<_>>>()?;
            assemble(frame, results)
        }
    }
}

struct Cells {
    frame: Shape,
    cells: Vec<Value>,
}

fn split_cells(v: &Value, k: i64) -> AplResult<Cells> {
    if k < 0 {
        return Err(AplError::domain("rank: negative cell ranks are not supported"));
    }
    let shape = v.shape();
    let cell_rank = (k as usize).min(shape.rank());
    let split = shape.rank() - cell_rank;
    let frame = Shape::from(&shape[..split]);
    let cell_shape = Shape::from(&shape[split..]);
    let cell_size = cell_shape.elements();
    let mut cells = Vec::with_capacity(frame.elements().max(1));
    for i in 0..frame.elements() {
        let elems: Vec<Value> = (0..cell_size).map(|j| v.at(i * cell_size + j)).collect();
        cells.push(Value::from_elems(cell_shape.clone(), elems));
    }
    Ok(Cells { frame, cells })
}

/// Reassemble cell results under a frame, padding each to the common
/// cell shape with fill
fn assemble(frame: Shape, results: Vec<Value>) -> AplResult<Value> {
    let cell_rank = results.iter().map(Value::rank).max().unwrap_or(0);
    let mut cell_shape = Shape::with_capacity(cell_rank);
    for d in 0..cell_rank {
        let dim = results
            .iter()
            .map(|v| {
                let s = v.shape();
                let pad = cell_rank - s.rank();
                if d < pad {
                    1
                } else {
                    s[d - pad]
                }
            })
            .max()
            .unwrap_or(0);
        cell_shape.push(dim);
    }
    let mut shape = frame.clone();
    shape.extend(cell_shape.iter().copied());
    let mut elems = Vec::with_capacity(shape.elements());
    for v in &results {
        if v.shape() == cell_shape {
            elems.extend(v.elems());
            continue;
        }
        let lens: Vec<i64> = cell_shape.iter().map(|&d| d as i64).collect();
        let padded = dyadic::take(&Value::int_vec(lens), v, None, 1)?;
        elems.extend(padded.elems());
    }
    Ok(Value::from_elems(shape, elems))
}

/// `f@g`: replace the cells selected by `g` with `f` of those cells;
/// a left argument is passed through to `f`
fn at(apl: &mut Apl, d: &Derived, l: Option<&Value>, r: &Value) -> AplResult {
    let sel = d
        .g
        .as_ref()
        .ok_or_else(|| AplError::domain("at is missing its selector"))?;
    let shape = r.shape();
    let mut elems = r.elems();
    // Selected flat positions and the shape of the selection
    let (positions, sel_shape): (Vec<usize>, Shape) = match sel {
        Value::Func(g) => {
            let mask = apl.call_function(g, None, r.clone(), None)?;
            if mask.shape() != shape {
                return Err(AplError::shape("at: mask shape must match"));
            }
            let pos: Vec<usize> = (0..mask.size())
                .filter(|&i| mask.at(i).as_num().is_some_and(|n| !n.is_zero()))
                .collect();
            let shape = Shape::from(pos.len());
            (pos, shape)
        }
        indices => {
            let ints = indices
                .as_int_vec()
                .ok_or_else(|| AplError::domain("at: integer indices expected"))?;
            let row_len: usize = shape[1..].iter().product();
            let mut pos = Vec::new();
            for ix in &ints {
                let i = ix - apl.origin;
                if i < 0 || i as usize >= shape.dims().first().copied().unwrap_or(0) {
                    return Err(AplError::index(format!("at: index {ix} out of range")));
                }
                for j in 0..row_len.max(1) {
                    pos.push(i as usize * row_len.max(1) + j);
                }
            }
            let mut sel_shape = Shape::from(ints.len());
            sel_shape.extend_from_slice(&shape[1..]);
            (pos, sel_shape)
        }
    };
    let selection = Value::from_elems(
        sel_shape,
        positions.iter().map(|&p| elems[p].clone()).collect(),
    );
    let replacement = match &d.f {
        Value::Func(f) => {
            let f = f.clone();
            apl.call_function(&f, l.cloned(), selection, None)?
        }
        v => v.clone(),
    };
    if replacement.size() == 1 {
        let fill = replacement.at(0);
        for &p in &positions {
            elems[p] = fill.clone();
        }
    } else {
        if replacement.size() != positions.len() {
            return Err(AplError::length("at: replacement does not conform"));
        }
        for (k, &p) in positions.iter().enumerate() {
            elems[p] = replacement.at(k);
        }
    }
    Ok(Value::from_elems(shape, elems))
}

/// `f⌺s`: apply `f` to every `s`-shaped window centred on each cell,
/// padding out-of-bound cells with fill
fn stencil(apl: &mut Apl, d: &Derived, r: &Value) -> AplResult {
    let f = expect_func(&d.f)?;
    let sizes = d
        .g
        .as_ref()
        .ok_or_else(|| AplError::domain("stencil is missing its window shape"))?
        .as_int_vec()
        .ok_or_else(|| AplError::domain("stencil: integer window shape expected"))?;
    let shape = r.shape();
    if sizes.len() != shape.rank() {
        return Err(AplError::length("stencil: window rank must match"));
    }
    let window: Shape = sizes.iter().map(|&s| s as usize).collect();
    let fill = r.fill_value();
    let mut out = Vec::with_capacity(r.size());
    let mut dims = Vec::new();
    let mut offs = Vec::new();
    for flat in 0..r.size() {
        shape.flat_to_dims(flat, &mut dims);
        let mut cells = Vec::with_capacity(window.elements());
        for w in 0..window.elements() {
            window.flat_to_dims(w, &mut offs);
            let mut src = Vec::with_capacity(dims.len());
            let mut ok = true;
            for d in 0..dims.len() {
                let centre = (window[d] - 1) / 2;
                let i = dims[d] as i64 + offs[d] as i64 - centre as i64;
                if i < 0 || i as usize >= shape[d] {
                    ok = false;
                    break;
                }
                src.push(i as usize);
            }
            cells.push(if ok {
                r.at(shape.dims_to_flat(&src).unwrap())
            } else {
                fill.clone()
            });
        }
        let win = Value::from_elems(window.clone(), cells);
        out.push(apl.call_function(&f, None, win, None)?);
    }
    Ok(Value::from_elems(shape, out))
}
