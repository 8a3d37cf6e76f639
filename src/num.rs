use std::cmp::Ordering;

use crate::{
    complex::Complex,
    error::{AplError, AplResult},
};

/// A scalar number belonging to one kind of the tower
///
/// Kinds are ordered by generality; binary operations uptype both sides
/// to the common kind first.
#[derive(Debug, Clone, Copy)]
pub enum Num {
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex(Complex),
}

/// The kind tags of the standard tower, in uptype order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Kind {
    Bool,
    Int,
    Float,
    Complex,
}

impl Num {
    pub fn kind(&self) -> Kind {
        match self {
            Num::Bool(_) => Kind::Bool,
            Num::Int(_) => Kind::Int,
            Num::Float(_) => Kind::Float,
            Num::Complex(_) => Kind::Complex,
        }
    }
    /// Convert to the given kind, which must not be less general
    pub fn uptype(self, kind: Kind) -> Num {
        match kind {
            Kind::Bool => self,
            Kind::Int => Num::Int(match self {
                Num::Bool(b) => b as i64,
                Num::Int(i) => i,
                _ => unreachable!("uptype to less general kind"),
            }),
            Kind::Float => Num::Float(match self {
                Num::Bool(b) => b as i64 as f64,
                Num::Int(i) => i as f64,
                Num::Float(f) => f,
                Num::Complex(_) => unreachable!("uptype to less general kind"),
            }),
            Kind::Complex => Num::Complex(match self {
                Num::Bool(b) => Complex::new(b as i64 as f64, 0.0),
                Num::Int(i) => Complex::new(i as f64, 0.0),
                Num::Float(f) => Complex::new(f, 0.0),
                Num::Complex(z) => z,
            }),
        }
    }
    /// The float view of a non-complex number
    fn float(self) -> f64 {
        match self {
            Num::Bool(b) => b as i64 as f64,
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
            Num::Complex(_) => unreachable!("float view of complex"),
        }
    }
    fn complex(self) -> Complex {
        match self.uptype(Kind::Complex) {
            Num::Complex(z) => z,
            _ => unreachable!(),
        }
    }
    /// Integral value, if the number has one exactly
    pub fn to_index(&self) -> Option<i64> {
        match *self {
            Num::Bool(b) => Some(b as i64),
            Num::Int(i) => Some(i),
            Num::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(f as i64),
            Num::Complex(z) if z.im == 0.0 && z.re.fract() == 0.0 => Some(z.re as i64),
            _ => None,
        }
    }
    /// Boolean value, if the number is exactly 0 or 1
    pub fn to_bool(&self) -> Option<bool> {
        match self.to_index() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        }
    }
    pub fn is_zero(&self) -> bool {
        match *self {
            Num::Bool(b) => !b,
            Num::Int(i) => i == 0,
            Num::Float(f) => f == 0.0,
            Num::Complex(z) => z == Complex::ZERO,
        }
    }
}

impl From<bool> for Num {
    fn from(b: bool) -> Self {
        Num::Bool(b)
    }
}

impl From<i64> for Num {
    fn from(i: i64) -> Self {
        Num::Int(i)
    }
}

impl From<f64> for Num {
    fn from(f: f64) -> Self {
        Num::Float(f)
    }
}

impl From<Complex> for Num {
    fn from(z: Complex) -> Self {
        Num::Complex(z)
    }
}

/// The numeric tower: kind set, uptype rule, parser, formatter and the
/// arithmetic method table
///
/// Owned per runtime; never process-global.
#[derive(Debug, Clone)]
pub struct Tower {
    /// Comparison tolerance. Kept as a registration point; comparisons do
    /// not consult it yet and are exact after uptyping.
    pub ct: f64,
}

impl Default for Tower {
    fn default() -> Self {
        Tower { ct: 0.0 }
    }
}

impl Tower {
    /// Uptype both numbers to their common kind
    pub fn same_type(&self, a: Num, b: Num) -> (Num, Num) {
        let kind = a.kind().max(b.kind());
        (a.uptype(kind), b.uptype(kind))
    }

    /// Parse a numeric literal: decimal, `¯`-negative, exponent, `J`
    /// complex and `a` polar-degree forms
    pub fn parse(&self, s: &str) -> Option<Num> {
        if let Some(pos) = s.find(['J', 'j']) {
            let re = parse_real(&s[..pos])?;
            let im = parse_real(&s[pos + 1..])?;
            return Some(Num::Complex(Complex::new(re, im)));
        }
        if let Some(pos) = s.find('a') {
            let mag = parse_real(&s[..pos])?;
            let deg = parse_real(&s[pos + 1..])?;
            return Some(Num::Complex(from_degrees(mag, deg)));
        }
        let t = s.replace('¯', "-");
        if let Ok(i) = t.parse::<i64>() {
            return Some(Num::Int(i));
        }
        t.parse::<f64>().ok().map(Num::Float)
    }

    /// Format a number with the given print precision (0 means shortest)
    pub fn format(&self, n: &Num, pp: usize) -> String {
        match n {
            Num::Bool(b) => (*b as u8).to_string(),
            Num::Int(i) => {
                if *i < 0 {
                    format!("¯{}", i.unsigned_abs())
                } else {
                    i.to_string()
                }
            }
            Num::Float(f) => fmt_f64(*f, pp),
            Num::Complex(z) => format!("{}J{}", fmt_f64(z.re, pp), fmt_f64(z.im, pp)),
        }
    }

    pub fn add(&self, a: Num, b: Num) -> AplResult<Num> {
        Ok(match self.same_arith(a, b) {
            (Num::Int(x), Num::Int(y)) => match x.checked_add(y) {
                Some(z) => Num::Int(z),
                None => Num::Float(x as f64 + y as f64),
            },
            (Num::Float(x), Num::Float(y)) => Num::Float(x + y),
            (Num::Complex(x), Num::Complex(y)) => Num::Complex(x + y),
            _ => unreachable!(),
        })
    }
    pub fn sub(&self, a: Num, b: Num) -> AplResult<Num> {
        Ok(match self.same_arith(a, b) {
            (Num::Int(x), Num::Int(y)) => match x.checked_sub(y) {
                Some(z) => Num::Int(z),
                None => Num::Float(x as f64 - y as f64),
            },
            (Num::Float(x), Num::Float(y)) => Num::Float(x - y),
            (Num::Complex(x), Num::Complex(y)) => Num::Complex(x - y),
            _ => unreachable!(),
        })
    }
    pub fn mul(&self, a: Num, b: Num) -> AplResult<Num> {
        Ok(match self.same_arith(a, b) {
            (Num::Int(x), Num::Int(y)) => match x.checked_mul(y) {
                Some(z) => Num::Int(z),
                None => Num::Float(x as f64 * y as f64),
            },
            (Num::Float(x), Num::Float(y)) => Num::Float(x * y),
            (Num::Complex(x), Num::Complex(y)) => Num::Complex(x * y),
            _ => unreachable!(),
        })
    }
    /// Division never fails: zero divisors produce the float kind's
    /// infinity and NaN sentinels
    pub fn div(&self, a: Num, b: Num) -> AplResult<Num> {
        let a = a.uptype(Kind::Float.max(a.kind()));
        let b = b.uptype(Kind::Float.max(b.kind()));
        Ok(
            match self.same_type(a, b) {
                (Num::Float(x), Num::Float(y)) => Num::Float(x / y),
                (Num::Complex(x), Num::Complex(y)) => {
                    if y == Complex::ZERO {
                        if x == Complex::ZERO {
                            Num::Float(f64::NAN)
                        } else {
                            Num::Float(f64::INFINITY)
                        }
                    } else {
                        Num::Complex(x / y)
                    }
                }
                _ => unreachable!(),
            },
        )
    }
    pub fn pow(&self, a: Num, b: Num) -> AplResult<Num> {
        Ok(match self.same_arith(a, b) {
            (Num::Int(x), Num::Int(y)) => {
                if let Ok(e) = u32::try_from(y) {
                    match x.checked_pow(e) {
                        Some(z) => Num::Int(z),
                        None => Num::Float((x as f64).powf(y as f64)),
                    }
                } else {
                    Num::Float((x as f64).powf(y as f64))
                }
            }
            (Num::Float(x), Num::Float(y)) => {
                if x < 0.0 && y.fract() != 0.0 {
                    Num::Complex(Complex::from(x).powc(Complex::from(y)))
                } else {
                    Num::Float(x.powf(y))
                }
            }
            (Num::Complex(x), Num::Complex(y)) => Num::Complex(x.powc(y)),
            _ => unreachable!(),
        })
    }
    /// Dyadic logarithm `l⍟r`
    pub fn log(&self, a: Num, b: Num) -> AplResult<Num> {
        Ok(match self.same_arith(a, b) {
            (Num::Complex(x), Num::Complex(y)) => Num::Complex(y.log(x)),
            (x, y) => {
                let (base, v) = (x.float(), y.float());
                if base <= 0.0 || v <= 0.0 {
                    Num::Complex(Complex::from(v).log(Complex::from(base)))
                } else {
                    Num::Float(v.ln() / base.ln())
                }
            }
        })
    }
    /// Residue `l|r`: `r - l×⌊r÷l`, with `0|r` giving `r`
    pub fn residue(&self, a: Num, b: Num) -> AplResult<Num> {
        if a.is_zero() {
            return Ok(b);
        }
        Ok(match self.same_arith(a, b) {
            (Num::Int(l), Num::Int(r)) => Num::Int(r - l * floor_div(r, l)),
            (Num::Float(l), Num::Float(r)) => Num::Float(r - l * (r / l).floor()),
            (Num::Complex(l), Num::Complex(r)) => Num::Complex(r - l * (r / l).floor()),
            _ => unreachable!(),
        })
    }
    pub fn min(&self, a: Num, b: Num) -> AplResult<Num> {
        Ok(if self.lt(b, a)? { b } else { a })
    }
    pub fn max(&self, a: Num, b: Num) -> AplResult<Num> {
        Ok(if self.lt(a, b)? { b } else { a })
    }
    pub fn floor(&self, a: Num) -> AplResult<Num> {
        Ok(match a {
            Num::Float(f) => Num::Float(f.floor()),
            Num::Complex(z) => Num::Complex(z.floor()),
            n => n,
        })
    }
    pub fn ceil(&self, a: Num) -> AplResult<Num> {
        Ok(match a {
            Num::Float(f) => Num::Float(f.ceil()),
            Num::Complex(z) => Num::Complex(z.ceil()),
            n => n,
        })
    }
    /// Magnitude
    pub fn abs(&self, a: Num) -> AplResult<Num> {
        Ok(match a {
            Num::Bool(b) => Num::Bool(b),
            Num::Int(i) => Num::Int(i.abs()),
            Num::Float(f) => Num::Float(f.abs()),
            Num::Complex(z) => Num::Float(z.abs()),
        })
    }
    pub fn neg(&self, a: Num) -> AplResult<Num> {
        Ok(match a {
            Num::Bool(b) => Num::Int(-(b as i64)),
            Num::Int(i) => Num::Int(-i),
            Num::Float(f) => Num::Float(-f),
            Num::Complex(z) => Num::Complex(-z),
        })
    }
    /// Direction: sign for reals, unit complex for complex numbers
    pub fn signum(&self, a: Num) -> AplResult<Num> {
        Ok(match a {
            Num::Bool(b) => Num::Int(b as i64),
            Num::Int(i) => Num::Int(i.signum()),
            Num::Float(f) => Num::Int(if f > 0.0 {
                1
            } else if f < 0.0 {
                -1
            } else {
                0
            }),
            Num::Complex(z) => Num::Complex(z.signum()),
        })
    }
    /// Conjugate, the monadic form of `+`
    pub fn conj(&self, a: Num) -> AplResult<Num> {
        Ok(match a {
            Num::Complex(z) => Num::Complex(z.conj()),
            n => n,
        })
    }
    pub fn exp(&self, a: Num) -> AplResult<Num> {
        Ok(match a {
            Num::Complex(z) => Num::Complex(z.exp()),
            n => Num::Float(n.float().exp()),
        })
    }
    pub fn ln(&self, a: Num) -> AplResult<Num> {
        Ok(match a {
            Num::Complex(z) => Num::Complex(z.ln()),
            n => {
                let f = n.float();
                if f < 0.0 {
                    Num::Complex(Complex::from(f).ln())
                } else {
                    Num::Float(f.ln())
                }
            }
        })
    }
    /// Factorial for integers, `Γ(x+1)` otherwise
    pub fn factorial(&self, a: Num) -> AplResult<Num> {
        Ok(match a {
            Num::Bool(_) => Num::Int(1),
            Num::Int(i) if (0..=20).contains(&i) => Num::Int((1..=i).product()),
            Num::Int(i) if i >= 0 => {
                let g = Complex::new(i as f64 + 1.0, 0.0).gamma();
                Num::Float(g.re)
            }
            Num::Int(_) => Num::Float(f64::INFINITY),
            Num::Float(f) => Num::Float(Complex::new(f + 1.0, 0.0).gamma().re),
            Num::Complex(z) => Num::Complex((z + Complex::ONE).gamma()),
        })
    }
    /// Binomial `l!r`: `r` choose `l`, extended to negatives and to the
    /// gamma formula for non-integers
    pub fn binomial(&self, l: Num, r: Num) -> AplResult<Num> {
        match (l.to_index(), r.to_index()) {
            (Some(k), _) if k >= 0 => Ok(falling_product(self, r, k)?),
            (Some(k), Some(n)) => {
                // Negative L: use the symmetry l!r = (r-l)!r
                let j = n - k;
                if j >= 0 {
                    falling_product(self, r, j)
                } else {
                    Ok(Num::Int(0))
                }
            }
            _ => {
                let (l, r) = self.same_arith(l, r);
                let (zl, zr) = (l.complex(), r.complex());
                let g = (zr + Complex::ONE).gamma()
                    / ((zl + Complex::ONE).gamma() * (zr - zl + Complex::ONE).gamma());
                Ok(match (l, r) {
                    (Num::Complex(_), _) | (_, Num::Complex(_)) => Num::Complex(g),
                    _ => Num::Float(g.re),
                })
            }
        }
    }
    /// Least common multiple; on booleans it coincides with logical and
    pub fn and(&self, a: Num, b: Num) -> AplResult<Num> {
        Ok(match self.same_arith(a, b) {
            (Num::Int(x), Num::Int(y)) => {
                let g = gcd_i64(x, y);
                if g == 0 {
                    Num::Int(0)
                } else {
                    Num::Int((x / g * y).abs())
                }
            }
            (Num::Float(x), Num::Float(y)) => {
                let g = gcd_f64(x, y);
                if g == 0.0 {
                    Num::Float(0.0)
                } else {
                    Num::Float((x * y / g).abs())
                }
            }
            _ => return Err(AplError::domain("lcm of complex numbers")),
        })
    }
    /// Greatest common divisor; on booleans it coincides with logical or
    pub fn or(&self, a: Num, b: Num) -> AplResult<Num> {
        Ok(match self.same_arith(a, b) {
            (Num::Int(x), Num::Int(y)) => Num::Int(gcd_i64(x, y)),
            (Num::Float(x), Num::Float(y)) => Num::Float(gcd_f64(x, y)),
            _ => return Err(AplError::domain("gcd of complex numbers")),
        })
    }
    pub fn eq(&self, a: Num, b: Num) -> bool {
        match self.same_type(a, b) {
            (Num::Bool(x), Num::Bool(y)) => x == y,
            (Num::Int(x), Num::Int(y)) => x == y,
            (Num::Float(x), Num::Float(y)) => x == y,
            (Num::Complex(x), Num::Complex(y)) => x == y,
            _ => unreachable!(),
        }
    }
    pub fn lt(&self, a: Num, b: Num) -> AplResult<bool> {
        Ok(self.cmp(a, b)? == Ordering::Less)
    }
    /// Order two numbers; complex numbers are unordered
    pub fn cmp(&self, a: Num, b: Num) -> AplResult<Ordering> {
        match self.same_type(a, b) {
            (Num::Bool(x), Num::Bool(y)) => Ok(x.cmp(&y)),
            (Num::Int(x), Num::Int(y)) => Ok(x.cmp(&y)),
            (Num::Float(x), Num::Float(y)) => {
                Ok(x.partial_cmp(&y).unwrap_or(Ordering::Equal))
            }
            (Num::Complex(x), Num::Complex(y)) if x == y => Ok(Ordering::Equal),
            _ => Err(AplError::domain("complex numbers cannot be ordered")),
        }
    }
    /// Circle functions `k○x`
    pub fn circle(&self, k: i64, x: Num) -> AplResult<Num> {
        if let Num::Complex(z) = x {
            return match k {
                9 => Ok(Num::Float(z.re)),
                10 => Ok(Num::Float(z.abs())),
                11 => Ok(Num::Float(z.im)),
                12 => Ok(Num::Float(z.arg())),
                _ => Err(AplError::domain("circle function of a complex number")),
            };
        }
        let v = x.float();
        let r = match k {
            0 => (1.0 - v * v).sqrt(),
            1 => v.sin(),
            2 => v.cos(),
            3 => v.tan(),
            4 => (1.0 + v * v).sqrt(),
            5 => v.sinh(),
            6 => v.cosh(),
            7 => v.tanh(),
            -1 => v.asin(),
            -2 => v.acos(),
            -3 => v.atan(),
            -4 => (v * v - 1.0).sqrt(),
            -5 => v.asinh(),
            -6 => v.acosh(),
            -7 => v.atanh(),
            9 | 10 | 11 | 12 => match k {
                9 => v,
                10 => v.abs(),
                11 => 0.0,
                _ => {
                    if v < 0.0 {
                        std::f64::consts::PI
                    } else {
                        0.0
                    }
                }
            },
            _ => return Err(AplError::domain(format!("circle function {k}"))),
        };
        Ok(Num::Float(r))
    }

    /// Uptype for arithmetic: booleans count as integers
    fn same_arith(&self, a: Num, b: Num) -> (Num, Num) {
        self.same_type(a.uptype(Kind::Int.max(a.kind())), b.uptype(Kind::Int.max(b.kind())))
    }
}

/// `r` falling-factorial divided product: `l!r` for non-negative integer `l`
fn falling_product(tower: &Tower, r: Num, k: i64) -> AplResult<Num> {
    let mut acc = Num::Int(1);
    for i in 1..=k {
        let term = tower.sub(r, Num::Int(i - 1))?;
        acc = tower.mul(acc, term)?;
        acc = tower.div(acc, Num::Int(i))?;
    }
    // The running division keeps floats; integral results demote
    if let Some(i) = acc.to_index() {
        if !matches!(acc, Num::Complex(_)) {
            return Ok(Num::Int(i));
        }
        if let Num::Complex(z) = acc {
            if z.im == 0.0 {
                return Ok(Num::Complex(z));
            }
        }
    }
    Ok(acc)
}

fn floor_div(a: i64, b: i64) -> i64 {
    let d = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        d - 1
    } else {
        d
    }
}

fn gcd_i64(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn gcd_f64(a: f64, b: f64) -> f64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b > 1e-10 {
        (a, b) = (b, a - b * (a / b).floor());
    }
    a
}

fn parse_real(s: &str) -> Option<f64> {
    s.replace('¯', "-").parse().ok()
}

/// Polar form `mag a deg`; right angles come out exact
fn from_degrees(mag: f64, deg: f64) -> Complex {
    let d = deg.rem_euclid(360.0);
    let (c, s) = if d == 0.0 {
        (1.0, 0.0)
    } else if d == 90.0 {
        (0.0, 1.0)
    } else if d == 180.0 {
        (-1.0, 0.0)
    } else if d == 270.0 {
        (0.0, -1.0)
    } else {
        let rad = d.to_radians();
        (rad.cos(), rad.sin())
    };
    Complex::new(mag * c, mag * s)
}

/// Format a float with `pp` significant digits (0 for shortest), using
/// the high minus and an exponent form for extreme magnitudes
pub fn fmt_f64(x: f64, pp: usize) -> String {
    if x.is_nan() {
        return "NaN".into();
    }
    if x.is_infinite() {
        return if x < 0.0 { "¯∞".into() } else { "∞".into() };
    }
    let v = if pp > 0 { round_sig(x, pp) } else { x };
    let a = v.abs();
    let s = if a != 0.0 && (a >= 1e15 || a < 1e-5) {
        format!("{a:e}").replace('-', "¯")
    } else {
        format!("{a}")
    };
    if v < 0.0 && a != 0.0 {
        format!("¯{s}")
    } else {
        s
    }
}

fn round_sig(x: f64, pp: usize) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    let exp = x.abs().log10().floor() as i32;
    let d = pp as i32 - 1 - exp;
    if d.abs() > 300 {
        return x;
    }
    let m = 10f64.powi(d);
    (x * m).round() / m
}
