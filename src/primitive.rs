use std::f64::consts::PI;

use enum_iterator::{all, Sequence};

use crate::{
    algorithm::{dyadic, monadic},
    error::{AplError, AplResult},
    num::{Num, Tower},
    pervade,
    value::{self, Value},
    Apl,
};

/// A registered primitive function
///
/// Each carries its glyph, its monadic and dyadic meanings, and an
/// optional reduction identity for empty inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence)]
pub enum Primitive {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Log,
    Mag,
    Floor,
    Ceil,
    Fact,
    Circle,
    Query,
    Tilde,
    And,
    Or,
    Nand,
    Nor,
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Ne,
    Match,
    Natch,
    Rho,
    Iota,
    Comma,
    CommaBar,
    Epsilon,
    Take,
    Drop,
    Rev,
    RevFirst,
    Transpose,
    GradeUp,
    GradeDown,
    Where,
    Unique,
    Find,
    Decode,
    Encode,
    Format,
    Execute,
    Right,
    Left,
    Domino,
}

impl Primitive {
    pub fn all() -> impl Iterator<Item = Self> {
        all()
    }
    pub fn from_glyph(c: char) -> Option<Self> {
        Self::all().find(|p| p.glyph() == c)
    }
    pub fn glyph(&self) -> char {
        use Primitive::*;
        match self {
            Add => '+',
            Sub => '-',
            Mul => '×',
            Div => '÷',
            Pow => '*',
            Log => '⍟',
            Mag => '|',
            Floor => '⌊',
            Ceil => '⌈',
            Fact => '!',
            Circle => '○',
            Query => '?',
            Tilde => '~',
            And => '∧',
            Or => '∨',
            Nand => '⍲',
            Nor => '⍱',
            Lt => '<',
            Le => '≤',
            Eq => '=',
            Ge => '≥',
            Gt => '>',
            Ne => '≠',
            Match => '≡',
            Natch => '≢',
            Rho => '⍴',
            Iota => '⍳',
            Comma => ',',
            CommaBar => '⍪',
            Epsilon => '∊',
            Take => '↑',
            Drop => '↓',
            Rev => '⌽',
            RevFirst => '⊖',
            Transpose => '⍉',
            GradeUp => '⍋',
            GradeDown => '⍒',
            Where => '⍸',
            Unique => '∪',
            Find => '⍷',
            Decode => '⊥',
            Encode => '⊤',
            Format => '⍕',
            Execute => '⍎',
            Right => '⊢',
            Left => '⊣',
            Domino => '⌹',
        }
    }
    pub fn doc(&self) -> &'static str {
        use Primitive::*;
        match self {
            Add => "conjugate, plus",
            Sub => "negate, minus",
            Mul => "direction, times",
            Div => "reciprocal, divide",
            Pow => "exponential, power",
            Log => "natural log, log",
            Mag => "magnitude, residue",
            Floor => "floor, minimum",
            Ceil => "ceiling, maximum",
            Fact => "factorial, binomial",
            Circle => "pi times, circular",
            Query => "roll, deal",
            Tilde => "not, without",
            And => "and, least common multiple",
            Or => "or, greatest common divisor",
            Nand => "nand",
            Nor => "nor",
            Lt => "less than",
            Le => "less or equal",
            Eq => "equal",
            Ge => "greater or equal",
            Gt => "greater than",
            Ne => "not equal",
            Match => "depth, match",
            Natch => "tally, not match",
            Rho => "shape, reshape",
            Iota => "interval, index of",
            Comma => "ravel, catenate",
            CommaBar => "table, catenate first",
            Epsilon => "enlist, membership",
            Take => "take",
            Drop => "drop",
            Rev => "reverse, rotate",
            RevFirst => "reverse first, rotate first",
            Transpose => "transpose",
            GradeUp => "grade up",
            GradeDown => "grade down",
            Where => "where, interval index",
            Unique => "unique, union",
            Find => "find",
            Decode => "decode",
            Encode => "encode",
            Format => "format",
            Execute => "execute",
            Right => "same, right tack",
            Left => "same, left tack",
            Domino => "matrix inverse, matrix divide",
        }
    }
    /// Pervasive dyadics broadcast scalars and accept an axis
    pub fn is_scalar_dyadic(&self) -> bool {
        use Primitive::*;
        matches!(
            self,
            Add | Sub
                | Mul
                | Div
                | Pow
                | Log
                | Mag
                | Floor
                | Ceil
                | Fact
                | Circle
                | And
                | Or
                | Nand
                | Nor
                | Lt
                | Le
                | Eq
                | Ge
                | Gt
                | Ne
        )
    }
    /// The declared identity for reduction over an empty axis
    pub fn reduce_identity(&self) -> Option<Value> {
        use Primitive::*;
        Some(match self {
            Add | Sub | Mag | Rev | RevFirst | Unique | Encode | Right | Left => Value::int(0),
            Mul | Div | Pow | Fact => Value::int(1),
            Floor => Value::float(f64::MAX),
            Ceil => Value::float(-f64::MAX),
            And | Le | Eq | Ge => Value::bool(true),
            Or | Lt | Gt | Ne => Value::bool(false),
            _ => return None,
        })
    }

    /// Apply the primitive; `l` is the left argument of a dyadic call
    pub fn call(
        self,
        apl: &mut Apl,
        l: Option<&Value>,
        r: &Value,
        axis: Option<&Value>,
    ) -> AplResult {
        match l {
            Some(l) => self.dyadic(apl, l, r, axis),
            None => self.monadic(apl, r, axis),
        }
    }

    fn monadic(self, apl: &mut Apl, r: &Value, axis: Option<&Value>) -> AplResult {
        use Primitive::*;
        let origin = apl.origin;
        match self {
            Add | Sub | Mul | Div | Pow | Log | Mag | Floor | Ceil | Fact | Circle | Tilde => {
                let tower = apl.tower.clone();
                pervade::un_pervade(&tower, r, &|t, n| self.scalar_monadic(t, n))
            }
            Query => {
                let origin = apl.origin;
                pervade::un_pervade_generic(r, &|v| {
                    let n = v
                        .as_num()
                        .and_then(|n| n.to_index())
                        .filter(|&n| n > 0)
                        .ok_or_else(|| AplError::domain("roll: positive integer expected"))?;
                    let i = rand::Rng::gen_range(&mut *apl.rng.borrow_mut(), 0..n);
                    Ok(Value::int(i + origin))
                })
            }
            Rho => Ok(monadic::shape_of(r)),
            Iota => {
                let n = r
                    .as_index()
                    .ok_or_else(|| AplError::domain("iota: integer expected"))?;
                monadic::iota(origin, n)
            }
            Comma => match axis {
                Some(a) => monadic::ravel_axis(r, a, origin),
                None => Ok(monadic::ravel(r)),
            },
            CommaBar => Ok(monadic::table(r)),
            Epsilon => Ok(monadic::enlist(r)),
            Rev | RevFirst => {
                let ax = self.resolve_axis(axis, r.rank(), origin)?;
                monadic::reverse(r, ax)
            }
            Transpose => monadic::transpose_monadic(r),
            GradeUp => monadic::grade(r, true, origin),
            GradeDown => monadic::grade(r, false, origin),
            Where => monadic::where_(r, origin),
            Unique => Ok(monadic::unique(r)),
            Match => Ok(Value::int(r.depth() as i64)),
            Natch => Ok(Value::int(if r.is_scalar() {
                1
            } else {
                r.shape()[0] as i64
            })),
            Format => Ok(Value::Str(crate::fmt::format_value(r, &apl.format).into())),
            Execute => match r {
                Value::Str(s) => {
                    let s = s.clone();
                    apl.execute(&s)
                }
                _ => Err(AplError::domain("execute: string expected")),
            },
            Right | Left => Ok(r.clone()),
            Domino => monadic::matrix_inverse(r),
            _ => Err(AplError::domain(format!(
                "{} has no monadic form",
                self.glyph()
            ))),
        }
    }

    fn dyadic(self, apl: &mut Apl, l: &Value, r: &Value, axis: Option<&Value>) -> AplResult {
        use Primitive::*;
        let origin = apl.origin;
        if self.is_scalar_dyadic() {
            let tower = apl.tower.clone();
            let f = |a: &Value, b: &Value| self.scalar_dyadic(&tower, a, b);
            return match axis {
                Some(a) => {
                    let axes = dyadic::axis_list(a, origin)?;
                    pervade::bin_pervade_axis(l, r, &axes, &f)
                }
                None => pervade::bin_pervade_generic(l, r, &f),
            };
        }
        match self {
            Query => dyadic::deal(&mut apl.rng.borrow_mut(), l, r, origin),
            Tilde => dyadic::without(l, r),
            Rho => {
                let shape = l
                    .as_shape()
                    .ok_or_else(|| AplError::domain("reshape: shape must be non-negative"))?;
                Ok(dyadic::reshape(&shape, r))
            }
            Iota => dyadic::index_of(l, r, origin),
            Comma => dyadic::catenate(l, r, axis, origin, false),
            CommaBar => dyadic::catenate(l, r, axis, origin, true),
            Epsilon => dyadic::membership(l, r),
            Take => dyadic::take(l, r, axis, origin),
            Drop => dyadic::drop(l, r, axis, origin),
            Rev | RevFirst => {
                let ax = self.resolve_axis(axis, r.rank(), origin)?;
                dyadic::rotate(l, r, ax)
            }
            Transpose => {
                let ints = l
                    .as_int_vec()
                    .ok_or_else(|| AplError::domain("transpose: integer axes expected"))?;
                let mut perm = Vec::with_capacity(ints.len());
                for a in ints {
                    let a = a - origin;
                    if a < 0 {
                        return Err(AplError::index("transpose axis out of range"));
                    }
                    perm.push(a as usize);
                }
                monadic::transpose(&perm, r)
            }
            GradeUp => monadic::grade_with(l, r, true, origin),
            GradeDown => monadic::grade_with(l, r, false, origin),
            Where => dyadic::interval_index(l, r),
            Unique => dyadic::union(l, r),
            Find => dyadic::find(l, r),
            Decode => dyadic::decode(&apl.tower, l, r),
            Encode => dyadic::encode(&apl.tower, l, r),
            Match => Ok(Value::bool(value::eq(l, r))),
            Natch => Ok(Value::bool(!value::eq(l, r))),
            Right => Ok(r.clone()),
            Left => Ok(l.clone()),
            Domino => monadic::matrix_divide(l, r),
            _ => Err(AplError::domain(format!(
                "{} has no dyadic form",
                self.glyph()
            ))),
        }
    }

    fn scalar_monadic(self, tower: &Tower, n: Num) -> AplResult<Num> {
        use Primitive::*;
        match self {
            Add => tower.conj(n),
            Sub => tower.neg(n),
            Mul => tower.signum(n),
            Div => tower.div(Num::Int(1), n),
            Pow => tower.exp(n),
            Log => tower.ln(n),
            Mag => tower.abs(n),
            Floor => tower.floor(n),
            Ceil => tower.ceil(n),
            Fact => tower.factorial(n),
            Circle => tower.mul(Num::Float(PI), n),
            Tilde => match n.to_bool() {
                Some(b) => Ok(Num::Bool(!b)),
                None => Err(AplError::domain("not: boolean expected")),
            },
            _ => Err(AplError::domain(format!(
                "{} has no monadic form",
                self.glyph()
            ))),
        }
    }

    fn scalar_dyadic(self, tower: &Tower, a: &Value, b: &Value) -> AplResult<Value> {
        use Primitive::*;
        // Equality is generic over all scalars
        match self {
            Eq => return Ok(Value::bool(value::eq(a, b))),
            Ne => return Ok(Value::bool(!value::eq(a, b))),
            _ => {}
        }
        let (x, y) = match (a.as_num(), b.as_num()) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                return Err(AplError::domain(format!(
                    "{}: numbers expected, not {} and {}",
                    self.glyph(),
                    a.type_name(),
                    b.type_name()
                )))
            }
        };
        let n = match self {
            Add => tower.add(x, y)?,
            Sub => tower.sub(x, y)?,
            Mul => tower.mul(x, y)?,
            Div => tower.div(x, y)?,
            Pow => tower.pow(x, y)?,
            Log => tower.log(x, y)?,
            Mag => tower.residue(x, y)?,
            Floor => tower.min(x, y)?,
            Ceil => tower.max(x, y)?,
            Fact => tower.binomial(x, y)?,
            Circle => {
                let k = x
                    .to_index()
                    .ok_or_else(|| AplError::domain("circle: integer selector expected"))?;
                tower.circle(k, y)?
            }
            And => match (x.to_bool(), y.to_bool()) {
                (Some(p), Some(q)) => Num::Bool(p && q),
                _ => tower.and(x, y)?,
            },
            Or => match (x.to_bool(), y.to_bool()) {
                (Some(p), Some(q)) => Num::Bool(p || q),
                _ => tower.or(x, y)?,
            },
            Nand => match (x.to_bool(), y.to_bool()) {
                (Some(p), Some(q)) => Num::Bool(!(p && q)),
                _ => return Err(AplError::domain("nand: booleans expected")),
            },
            Nor => match (x.to_bool(), y.to_bool()) {
                (Some(p), Some(q)) => Num::Bool(!(p || q)),
                _ => return Err(AplError::domain("nor: booleans expected")),
            },
            Lt => Num::Bool(tower.cmp(x, y)? == std::cmp::Ordering::Less),
            Le => Num::Bool(tower.cmp(x, y)? != std::cmp::Ordering::Greater),
            Ge => Num::Bool(tower.cmp(x, y)? != std::cmp::Ordering::Less),
            Gt => Num::Bool(tower.cmp(x, y)? == std::cmp::Ordering::Greater),
            _ => {
                return Err(AplError::domain(format!(
                    "{} has no dyadic form",
                    self.glyph()
                )))
            }
        };
        Ok(Value::Num(n))
    }

    /// Reverse and rotate default to the last axis, their `-First`
    /// forms to the first; a bracket axis overrides either
    fn resolve_axis(&self, axis: Option<&Value>, rank: usize, origin: i64) -> AplResult<usize> {
        match axis {
            Some(a) => dyadic::axis_index(a, origin),
            None => Ok(match self {
                Primitive::RevFirst => 0,
                _ => rank.saturating_sub(1),
            }),
        }
    }
}
