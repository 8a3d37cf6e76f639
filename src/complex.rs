use std::{
    f64::consts::E,
    ops::{Add, Div, Mul, Neg, Sub},
};

use serde::{Deserialize, Serialize};

/// A complex number, the most general kind of the standard numeric tower
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Complex {
    /// The real part
    pub re: f64,
    /// The imaginary part
    pub im: f64,
}

impl Complex {
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };
    pub const ONE: Self = Self { re: 1.0, im: 0.0 };
    pub const I: Self = Self { re: 0.0, im: 1.0 };
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
    /// The magnitude
    pub fn abs(self) -> f64 {
        self.re.hypot(self.im)
    }
    /// The principal argument
    pub fn arg(self) -> f64 {
        self.im.atan2(self.re)
    }
    pub fn to_polar(self) -> (f64, f64) {
        (self.abs(), self.arg())
    }
    pub fn from_polar(r: f64, theta: f64) -> Self {
        Self::new(r * theta.cos(), r * theta.sin())
    }
    pub fn conj(self) -> Self {
        Self::new(self.re, -self.im)
    }
    /// The unit direction, 0 for 0
    pub fn signum(self) -> Self {
        let m = self.abs();
        if m == 0.0 {
            Self::ZERO
        } else {
            self / m
        }
    }
    /// Complex floor after McDonnell: the lattice point nearest below
    ///
    /// The fractional parts of both components sum to less than 1 relative
    /// to the chosen lattice point.
    pub fn floor(self) -> Self {
        let a = self.re.floor();
        let b = self.im.floor();
        let x = self.re - a;
        let y = self.im - b;
        if x + y < 1.0 {
            Self::new(a, b)
        } else if x >= y {
            Self::new(a + 1.0, b)
        } else {
            Self::new(a, b + 1.0)
        }
    }
    pub fn ceil(self) -> Self {
        -(-self).floor()
    }
    pub fn exp(self) -> Self {
        Self::from_polar(E.powf(self.re), self.im)
    }
    pub fn ln(self) -> Self {
        let (r, theta) = self.to_polar();
        Self::new(r.ln(), theta)
    }
    pub fn log(self, base: Self) -> Self {
        self.ln() / base.ln()
    }
    /// Raise to a complex power
    pub fn powc(self, power: Self) -> Self {
        if self == Self::ZERO {
            return if power == Self::ZERO {
                Self::ONE
            } else {
                Self::ZERO
            };
        }
        (self.ln() * power).exp()
    }
    pub fn sin(self) -> Self {
        Self::new(
            self.re.sin() * self.im.cosh(),
            self.re.cos() * self.im.sinh(),
        )
    }
    /// The gamma function, by the Lanczos approximation
    pub fn gamma(self) -> Self {
        const G: f64 = 7.0;
        const COEF: [f64; 9] = [
            0.99999999999980993,
            676.5203681218851,
            -1259.1392167224028,
            771.32342877765313,
            -176.61502916214059,
            12.507343278686905,
            -0.13857109526572012,
            9.9843695780195716e-6,
            1.5056327351493116e-7,
        ];
        if self.re < 0.5 {
            // Reflection formula
            let pi = Self::new(std::f64::consts::PI, 0.0);
            return pi / ((pi * self).sin() * (Self::ONE - self).gamma());
        }
        let z = self - Self::ONE;
        let mut x = Self::new(COEF[0], 0.0);
        for (i, &c) in COEF.iter().enumerate().skip(1) {
            x = x + Self::new(c, 0.0) / (z + Self::new(i as f64, 0.0));
        }
        let t = z + Self::new(G + 0.5, 0.0);
        let sqrt_two_pi = (2.0 * std::f64::consts::PI).sqrt();
        Self::new(sqrt_two_pi, 0.0) * t.powc(z + Self::new(0.5, 0.0)) * (-t).exp() * x
    }
}

impl From<f64> for Complex {
    fn from(re: f64) -> Self {
        Self::new(re, 0.0)
    }
}

impl Add for Complex {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Mul<f64> for Complex {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.re * rhs, self.im * rhs)
    }
}

impl Div for Complex {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        let denom = rhs.re * rhs.re + rhs.im * rhs.im;
        Self::new(
            (self.re * rhs.re + self.im * rhs.im) / denom,
            (self.im * rhs.re - self.re * rhs.im) / denom,
        )
    }
}

impl Div<f64> for Complex {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self::new(self.re / rhs, self.im / rhs)
    }
}

impl Neg for Complex {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.re, -self.im)
    }
}
