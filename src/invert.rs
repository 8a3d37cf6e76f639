//! Selective specification: assignment through structural functions
//!
//! The left-hand side of `(g X) ← v` is re-evaluated with `X` bound to
//! an index array, so every structural function supplies its inverse
//! index map by running forwards. Cells holding the zero marker (fill
//! introduced by overtake or expand) receive no write, and nothing is
//! written until the whole map has been validated.

use ecow::EcoVec;

use crate::{
    array::Array,
    ast::Expr,
    error::{AplError, AplResult},
    lex::Sp,
    value::{Ident, Value},
    Apl,
};

/// The variable under the structural expression: the rightmost name
fn target_name(expr: &Sp<Expr>) -> Option<&Ident> {
    match &expr.value {
        Expr::Ident(name) => Some(name),
        Expr::Monadic(m) => target_name(&m.r),
        Expr::Dyadic(d) => target_name(&d.r),
        _ => None,
    }
}

pub(crate) fn selective_assign(apl: &mut Apl, target: &Sp<Expr>, v: &Value) -> AplResult<()> {
    let name = target_name(target)
        .ok_or_else(|| AplError::name("selective assignment needs a variable"))?
        .clone();
    let holder = apl
        .env
        .holder(&name)
        .ok_or_else(|| AplError::name(format!("undefined variable {name}")))?;
    let cur = holder.get(&name).unwrap();
    let n = cur.size();
    // One-based flat positions; zero marks cells with no source
    let index_map = Value::Ints(Array::new(
        cur.shape(),
        (1..=n as i64).collect::<EcoVec<i64>>(),
    ));
    holder.set_local(name.clone(), index_map);
    let mapped = apl.eval(target);
    holder.set_local(name.clone(), cur.clone());
    let mapped = mapped?;
    if !v.is_scalar() && v.size() != mapped.size() {
        return Err(AplError::length(
            "selective assignment: counts do not match",
        ));
    }
    let targets = mapped
        .as_int_vec()
        .ok_or_else(|| AplError::domain("left side is not a structural expression"))?;
    for &t in &targets {
        if t < 0 || t as usize > n {
            return Err(AplError::index("selective assignment: position out of range"));
        }
    }
    let mut elems = cur.elems();
    for (k, &t) in targets.iter().enumerate() {
        if t == 0 {
            continue;
        }
        elems[(t - 1) as usize] = if v.is_scalar() { v.clone() } else { v.at(k) };
    }
    holder.set_local(name, Value::from_elems(cur.shape(), elems));
    Ok(())
}
