//! Arbitrary precision numbers
//!
//! A `Number` is either an exact rational (dashu-ratio `RBig`) or an
//! arbitrary-precision decimal approximation (dashu-float `DBig`).
//! Arithmetic between exact values stays exact; any operation that cannot
//! be represented exactly (irrational roots, transcendentals) produces an
//! approximation, and approximateness is sticky: once a value is approximate
//! every derived value is too. The working precision of an approximate
//! result is the minimum of its operands' precisions, so computed precision
//! never silently increases.

use dashu_float::ops::{Abs, SquareRoot};
use dashu_float::DBig;
use dashu_int::ops::BitTest;
use dashu_int::{IBig, UBig};
use dashu_ratio::RBig;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use thiserror::Error;

/// Error type for number operations
#[derive(Debug, Clone, Error)]
pub enum NumberError {
    #[error("invalid number format: {0}")]
    ParseError(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("domain error: {0}")]
    DomainError(String),
}

/// Default working precision for approximations (decimal digits)
pub const DEFAULT_PRECISION: usize = 50;

/// Arbitrary precision number: exact rational or decimal approximation
#[derive(Debug, Clone)]
pub enum Number {
    Exact(RBig),
    Approx(DBig),
}

impl Number {
    // ========== Construction ==========

    pub fn zero() -> Self {
        Number::Exact(RBig::ZERO)
    }

    pub fn one() -> Self {
        Number::Exact(RBig::ONE)
    }

    pub fn from_i64(n: i64) -> Self {
        Number::Exact(RBig::from(n))
    }

    pub fn from_ratio(num: i64, den: i64) -> Result<Self, NumberError> {
        if den == 0 {
            return Err(NumberError::DivisionByZero);
        }
        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        Ok(Number::Exact(RBig::from_parts(
            IBig::from(num),
            UBig::from(den as u64),
        )))
    }

    /// Parse a decimal literal exactly: "123", "3.14", "1/3", "1.5e10", "-42".
    /// Every finite decimal is a rational, so the result is always `Exact`.
    pub fn parse(s: &str) -> Result<Self, NumberError> {
        Self::parse_radix(s, 10)
    }

    /// Parse a literal in the given radix (2..=36). Fractional digits and
    /// an `e` exponent are only accepted in radix 10.
    pub fn parse_radix(s: &str, radix: u32) -> Result<Self, NumberError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(NumberError::ParseError(s.to_string()));
        }

        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        // Rational format "a/b"
        if radix == 10 && body.contains('/') {
            let parts: Vec<&str> = body.split('/').collect();
            if parts.len() == 2 {
                let num = Self::parse_radix(parts[0], 10)?;
                let den = Self::parse_radix(parts[1], 10)?;
                let q = num.checked_div(&den)?;
                return if negative { Ok(q.neg()) } else { Ok(q) };
            }
            return Err(NumberError::ParseError(s.to_string()));
        }

        // Split off a decimal exponent ("1.5e10"); only meaningful in base 10
        let (mantissa, exp10) = if radix == 10 {
            match body.split_once(['e', 'E']) {
                Some((m, e)) => {
                    let exp: i64 = e
                        .parse()
                        .map_err(|_| NumberError::ParseError(s.to_string()))?;
                    (m, exp)
                }
                None => (body, 0),
            }
        } else {
            (body, 0)
        };

        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((i, f)) => (i, f),
            None => (mantissa, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(NumberError::ParseError(s.to_string()));
        }

        let mut digits = IBig::ZERO;
        let base = IBig::from(radix);
        for c in int_part.chars().chain(frac_part.chars()) {
            let d = c
                .to_digit(radix)
                .ok_or_else(|| NumberError::ParseError(s.to_string()))?;
            digits = &digits * &base + IBig::from(d);
        }

        // value = digits * radix^(exp10 - frac_len)
        let scale = exp10 - frac_part.len() as i64;
        let mut value = RBig::from_parts(digits, UBig::ONE);
        if scale != 0 {
            let power = pow_ubig(radix, scale.unsigned_abs());
            let factor = if scale > 0 {
                RBig::from_parts(IBig::from(power), UBig::ONE)
            } else {
                RBig::from_parts(IBig::ONE, power)
            };
            value = value * factor;
        }
        if negative {
            value = -value;
        }
        Ok(Number::Exact(value))
    }

    /// Wrap a decimal float at the given working precision.
    pub fn from_approx(value: DBig, precision: usize) -> Self {
        Number::Approx(value.with_precision(precision.max(1)).value())
    }

    pub fn from_f64(f: f64, precision: usize) -> Self {
        if !f.is_finite() {
            return Number::zero();
        }
        match format!("{:.15e}", f).parse::<DBig>() {
            Ok(d) => Self::from_approx(d, precision),
            Err(_) => Number::zero(),
        }
    }

    // ========== Predicates ==========

    pub fn is_exact(&self) -> bool {
        matches!(self, Number::Exact(_))
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Exact(r) => *r == RBig::ZERO,
            Number::Approx(d) => *d == DBig::ZERO,
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            Number::Exact(r) => *r == RBig::ONE,
            Number::Approx(d) => *d == DBig::ONE,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Number::Exact(r) => *r < RBig::ZERO,
            Number::Approx(d) => *d < DBig::ZERO,
        }
    }

    pub fn is_integer(&self) -> bool {
        match self {
            Number::Exact(r) => r.clone().into_parts().1 == UBig::ONE,
            Number::Approx(d) => {
                let floor = d.clone().floor();
                *d == floor
            }
        }
    }

    /// Exact non-integer whose numerator and denominator magnitudes both
    /// stay within `limit`. Such values read better as fractions than as
    /// rounded decimals.
    pub fn is_simple_fraction(&self, limit: u64) -> bool {
        match self {
            Number::Exact(r) => {
                let (num, den) = r.clone().into_parts();
                let bound = IBig::from(limit);
                den != UBig::ONE
                    && IBig::from(den) <= bound
                    && num <= bound
                    && num >= -bound
            }
            Number::Approx(_) => false,
        }
    }

    /// Working precision in decimal digits. Exact values report the default.
    pub fn precision(&self) -> usize {
        match self {
            Number::Exact(_) => DEFAULT_PRECISION,
            Number::Approx(d) => {
                let p = d.precision();
                if p == 0 {
                    DEFAULT_PRECISION
                } else {
                    p
                }
            }
        }
    }

    /// Decimal approximation of this value at the given precision.
    pub fn to_approx(&self, precision: usize) -> DBig {
        let precision = precision.max(1);
        match self {
            Number::Exact(r) => {
                let (num, den) = r.clone().into_parts();
                let n = DBig::from_parts(num, 0).with_precision(precision).value();
                let d = DBig::from_parts(IBig::from(den), 0)
                    .with_precision(precision)
                    .value();
                (n / d).with_precision(precision).value()
            }
            Number::Approx(d) => d.clone().with_precision(precision).value(),
        }
    }

    /// Exact numerator/denominator, if this value is exact.
    pub fn as_exact_parts(&self) -> Option<(IBig, UBig)> {
        match self {
            Number::Exact(r) => Some(r.clone().into_parts()),
            Number::Approx(_) => None,
        }
    }

    /// Precision that a result combining `self` and `other` may carry.
    fn joint_precision(&self, other: &Self) -> usize {
        self.precision().min(other.precision())
    }

    // ========== Basic Arithmetic ==========

    pub fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (Number::Exact(a), Number::Exact(b)) => Number::Exact(a + b),
            _ => {
                let p = self.joint_precision(other);
                Self::from_approx(self.to_approx(p) + other.to_approx(p), p)
            }
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        match (self, other) {
            (Number::Exact(a), Number::Exact(b)) => Number::Exact(a - b),
            _ => {
                let p = self.joint_precision(other);
                Self::from_approx(self.to_approx(p) - other.to_approx(p), p)
            }
        }
    }

    pub fn mul(&self, other: &Self) -> Self {
        match (self, other) {
            (Number::Exact(a), Number::Exact(b)) => Number::Exact(a * b),
            _ => {
                let p = self.joint_precision(other);
                Self::from_approx(self.to_approx(p) * other.to_approx(p), p)
            }
        }
    }

    pub fn checked_div(&self, other: &Self) -> Result<Self, NumberError> {
        if other.is_zero() {
            return Err(NumberError::DivisionByZero);
        }
        match (self, other) {
            (Number::Exact(a), Number::Exact(b)) => Ok(Number::Exact(a / b)),
            _ => {
                let p = self.joint_precision(other);
                Ok(Self::from_approx(
                    self.to_approx(p) / other.to_approx(p),
                    p,
                ))
            }
        }
    }

    pub fn neg(&self) -> Self {
        match self {
            Number::Exact(r) => Number::Exact(-r.clone()),
            Number::Approx(d) => Number::Approx(-d.clone()),
        }
    }

    pub fn abs(&self) -> Self {
        if self.is_negative() {
            self.neg()
        } else {
            self.clone()
        }
    }

    /// Integer power by repeated squaring; exactness is preserved.
    pub fn pow_int(&self, exp: i64) -> Result<Self, NumberError> {
        if exp == 0 {
            return Ok(Number::one());
        }
        if self.is_zero() && exp < 0 {
            return Err(NumberError::DivisionByZero);
        }

        let mut result = Number::one();
        let mut base = self.clone();
        let mut e = exp.unsigned_abs();
        while e > 0 {
            if e & 1 == 1 {
                result = result.mul(&base);
            }
            base = base.mul(&base);
            e >>= 1;
        }

        if exp < 0 {
            Number::one().checked_div(&result)
        } else {
            Ok(result)
        }
    }

    /// General power. Integer exponents stay exact; otherwise
    /// x^y = exp(y ln x), which requires a positive base.
    pub fn pow(&self, exp: &Self, precision: usize) -> Result<Self, NumberError> {
        if exp.is_integer() {
            if let Some(e) = exp.to_i64() {
                return self.pow_int(e);
            }
        }
        if self.is_zero() {
            if exp.is_negative() {
                return Err(NumberError::DivisionByZero);
            }
            return Ok(Number::zero());
        }
        if self.is_negative() {
            return Err(NumberError::DomainError(
                "negative base with non-integer exponent".to_string(),
            ));
        }
        let p = precision.min(self.joint_precision(exp));
        let ln_x = self.to_approx(p).ln();
        let product = &ln_x * &exp.to_approx(p);
        Ok(Self::from_approx(product.exp(), p))
    }

    // ========== Roots and Transcendentals ==========

    /// Square root. Perfect squares of exact rationals stay exact;
    /// everything else becomes approximate. Negative input is a domain
    /// error here; the evaluator decides whether to go complex.
    pub fn sqrt(&self, precision: usize) -> Result<Self, NumberError> {
        if self.is_negative() {
            return Err(NumberError::DomainError(
                "square root of negative number".to_string(),
            ));
        }
        if self.is_zero() {
            return Ok(Number::zero());
        }

        if let Number::Exact(r) = self {
            let (num, den) = r.clone().into_parts();
            let unum = UBig::try_from(num.clone()).unwrap_or(UBig::ZERO);
            let num_root = isqrt(&unum);
            let den_root = isqrt(&den);
            if &num_root * &num_root == unum && &den_root * &den_root == den {
                return Ok(Number::Exact(RBig::from_parts(
                    IBig::from(num_root),
                    den_root,
                )));
            }
        }

        let p = precision.min(self.precision());
        Ok(Self::from_approx(self.to_approx(p).sqrt(), p))
    }

    /// Natural logarithm
    pub fn ln(&self, precision: usize) -> Result<Self, NumberError> {
        if self.is_zero() || self.is_negative() {
            return Err(NumberError::DomainError(
                "logarithm of non-positive number".to_string(),
            ));
        }
        let p = precision.min(self.precision());
        Ok(Self::from_approx(self.to_approx(p).ln(), p))
    }

    /// Base-10 logarithm
    pub fn log10(&self, precision: usize) -> Result<Self, NumberError> {
        let ln = self.ln(precision)?;
        let ln10 = Number::from_i64(10).ln(precision)?;
        ln.checked_div(&ln10)
    }

    /// Base-2 logarithm
    pub fn log2(&self, precision: usize) -> Result<Self, NumberError> {
        let ln = self.ln(precision)?;
        let ln2 = Number::from_i64(2).ln(precision)?;
        ln.checked_div(&ln2)
    }

    /// Exponential function (e^x)
    pub fn exp(&self, precision: usize) -> Self {
        let p = precision.min(self.precision());
        Self::from_approx(self.to_approx(p).exp(), p)
    }

    /// Sine (Taylor series after reduction mod 2π)
    pub fn sin(&self, precision: usize) -> Self {
        let p = precision.min(self.precision());
        let x = reduce_mod_two_pi(self.to_approx(p + 10), p + 10);
        let x_squared = &x * &x;

        let mut sum = x.clone();
        let mut term = x;
        let iterations = (p / 3).clamp(12, 60) as i64;
        for k in 1..iterations {
            let denom = DBig::from((2 * k) * (2 * k + 1));
            term = -&term * &x_squared / denom;
            sum = &sum + &term;
        }

        Self::from_approx(sum, p)
    }

    /// Cosine (Taylor series after reduction mod 2π)
    pub fn cos(&self, precision: usize) -> Self {
        let p = precision.min(self.precision());
        let x = reduce_mod_two_pi(self.to_approx(p + 10), p + 10);
        let x_squared = &x * &x;

        let one = DBig::ONE.with_precision(p + 10).value();
        let mut sum = one.clone();
        let mut term = one;
        let iterations = (p / 3).clamp(12, 60) as i64;
        for k in 1..iterations {
            let denom = DBig::from((2 * k - 1) * (2 * k));
            term = -&term * &x_squared / denom;
            sum = &sum + &term;
        }

        Self::from_approx(sum, p)
    }

    /// Tangent (sin/cos)
    pub fn tan(&self, precision: usize) -> Result<Self, NumberError> {
        let cos_x = self.cos(precision);
        // A cosine this small means x is within rounding of an odd
        // multiple of π/2
        if cos_x.to_approx(precision).abs()
            < DBig::from_parts(IBig::ONE, -(precision as isize / 2))
        {
            return Err(NumberError::DomainError(
                "tan undefined at odd multiples of π/2".to_string(),
            ));
        }
        self.sin(precision).checked_div(&cos_x)
    }

    pub fn floor(&self) -> Self {
        match self {
            Number::Exact(r) => {
                let (num, den) = r.clone().into_parts();
                if den == UBig::ONE {
                    return self.clone();
                }
                let den = IBig::from(den);
                let mut q = &num / &den;
                if num < IBig::ZERO && &q * &den != num {
                    q -= IBig::ONE;
                }
                Number::Exact(RBig::from_parts(q, UBig::ONE))
            }
            Number::Approx(d) => Number::Approx(d.clone().floor()),
        }
    }

    pub fn ceil(&self) -> Self {
        let f = self.floor();
        if self.compare(&f) == Ordering::Equal {
            f
        } else {
            f.add(&Number::one())
        }
    }

    pub fn round(&self) -> Self {
        let half = Number::from_ratio(1, 2).unwrap_or_else(|_| Number::zero());
        self.add(&half).floor()
    }

    // ========== Constants ==========

    /// π from a high-precision decimal constant
    pub fn pi(precision: usize) -> Self {
        const PI_STR: &str = "3.14159265358979323846264338327950288419716939937510582097494459230781640628620899862803482534211706798214808651328230664709384460955058223172535940812848111745028410270193852110555964462294895493038196442881097566593344612847564823378678316527120190914564856692346034861045432664821339360726024914127372458700660631558817488152092096282925409171536436789259036001133053054882046652138414695194151160943305727036575959195309218611738193261179310511854807446237996274956735188575272489122793818301194912";
        let end = (precision + 2).min(PI_STR.len());
        match PI_STR[..end].parse::<DBig>() {
            Ok(d) => Self::from_approx(d, precision),
            Err(_) => Number::from_ratio(355, 113).unwrap_or_else(|_| Number::zero()),
        }
    }

    /// Euler's number e
    pub fn e(precision: usize) -> Self {
        Number::one().exp(precision)
    }

    /// Golden ratio φ = (1 + √5) / 2
    pub fn phi(precision: usize) -> Self {
        let sqrt5 = Number::from_i64(5)
            .sqrt(precision + 10)
            .unwrap_or_else(|_| Number::from_i64(2));
        let half_sum = Number::one().add(&sqrt5);
        half_sum
            .checked_div(&Number::from_i64(2))
            .unwrap_or_else(|_| Number::zero())
    }

    // ========== Comparison ==========

    /// Compare two numbers. Exact/exact comparison is exact; when either
    /// side is approximate, values within a precision-dependent epsilon
    /// compare equal.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Number::Exact(a), Number::Exact(b)) => a.cmp(b),
            _ => {
                let p = self.joint_precision(other);
                let a = self.to_approx(p);
                let b = other.to_approx(p);
                let diff = (&a - &b).abs();
                let abs_a = a.clone().abs();
                let abs_b = b.clone().abs();
                let mut scale = if abs_a > abs_b { abs_a } else { abs_b };
                if scale < DBig::ONE {
                    scale = DBig::ONE;
                }
                // epsilon = scale * 10^-(p-2)
                let eps = scale * DBig::from_parts(IBig::ONE, -((p.max(3) - 2) as isize));
                if diff <= eps {
                    Ordering::Equal
                } else if a < b {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
        }
    }

    pub fn eq_value(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }

    // ========== Conversion ==========

    pub fn to_i64(&self) -> Option<i64> {
        if !self.is_integer() {
            return None;
        }
        match self {
            Number::Exact(r) => {
                let (num, _) = r.clone().into_parts();
                num.try_into().ok()
            }
            Number::Approx(d) => dbig_to_f64(d).and_then(|f| {
                if f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                    Some(f as i64)
                } else {
                    None
                }
            }),
        }
    }

    /// Convert to f64 (may lose precision); used for plotting and display.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Number::Exact(_) => dbig_to_f64(&self.to_approx(30)),
            Number::Approx(d) => dbig_to_f64(d),
        }
    }
}

/// radix^exp as UBig
fn pow_ubig(radix: u32, exp: u64) -> UBig {
    let base = UBig::from(radix);
    let mut result = UBig::ONE;
    let mut b = base;
    let mut e = exp;
    while e > 0 {
        if e & 1 == 1 {
            result = &result * &b;
        }
        b = &b * &b;
        e >>= 1;
    }
    result
}

/// Integer square root by Newton iteration
fn isqrt(n: &UBig) -> UBig {
    if *n == UBig::ZERO {
        return UBig::ZERO;
    }
    let mut x = UBig::ONE << ((n.bit_len() + 1) / 2);
    loop {
        let y = (&x + n / &x) >> 1;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Reduce an angle into [-π, π] before running a Taylor series
fn reduce_mod_two_pi(x: DBig, precision: usize) -> DBig {
    let pi = Number::pi(precision).to_approx(precision);
    let two_pi = &pi + &pi;
    let turns = (&x / &two_pi).floor();
    let mut reduced = x - turns * &two_pi;
    if reduced > pi {
        reduced = reduced - two_pi;
    }
    reduced
}

/// Convert a DBig to f64 via its significand/exponent representation
fn dbig_to_f64(d: &DBig) -> Option<f64> {
    let (significand, exponent) = d.clone().into_repr().into_parts();

    let sig_f64: f64 = if significand.bit_len() <= 53 {
        let i: i64 = significand.try_into().ok()?;
        i as f64
    } else {
        let extra_bits = significand.bit_len() - 53;
        let shifted = &significand >> extra_bits;
        let shifted_i64: i64 = shifted.try_into().ok()?;
        shifted_i64 as f64 * 2_f64.powi(extra_bits as i32)
    };

    let result = if exponent == 0 {
        sig_f64
    } else if exponent > 0 && exponent <= 308 {
        sig_f64 * 10_f64.powi(exponent as i32)
    } else if exponent < 0 && exponent >= -308 {
        sig_f64 / 10_f64.powi((-exponent) as i32)
    } else {
        return None;
    };

    if result.is_finite() {
        Some(result)
    } else {
        None
    }
}

// ========== Trait Implementations ==========

impl std::fmt::Display for Number {
    /// Exact values print in an exactly re-parseable form ("42", "1/2");
    /// approximations print as decimals.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Exact(r) => {
                let (num, den) = r.clone().into_parts();
                if den == UBig::ONE {
                    write!(f, "{}", num)
                } else {
                    write!(f, "{}/{}", num, den)
                }
            }
            Number::Approx(d) => write!(f, "{}", d),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.eq_value(other)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer() {
        let n = Number::parse("123").unwrap();
        assert!(n.is_exact());
        assert_eq!(n.to_i64(), Some(123));
    }

    #[test]
    fn test_parse_decimal_is_exact() {
        // 3.14 = 157/50 exactly
        let n = Number::parse("3.14").unwrap();
        assert!(n.is_exact());
        let expected = Number::from_ratio(157, 50).unwrap();
        assert!(n.eq_value(&expected));
    }

    #[test]
    fn test_parse_fraction() {
        let n = Number::parse("1/3").unwrap();
        assert!(n.is_exact());
        assert!(!n.is_integer());
    }

    #[test]
    fn test_parse_scientific() {
        let n = Number::parse("1.5e2").unwrap();
        assert_eq!(n.to_i64(), Some(150));
        let tiny = Number::parse("25e-1").unwrap();
        assert!(tiny.eq_value(&Number::from_ratio(5, 2).unwrap()));
    }

    #[test]
    fn test_parse_radix() {
        assert_eq!(Number::parse_radix("ff", 16).unwrap().to_i64(), Some(255));
        assert_eq!(Number::parse_radix("101", 2).unwrap().to_i64(), Some(5));
        assert!(Number::parse_radix("2", 2).is_err());
    }

    #[test]
    fn test_exact_arithmetic_stays_exact() {
        let third = Number::parse("1/3").unwrap();
        let sixth = Number::parse("1/6").unwrap();
        let sum = third.add(&sixth);
        assert!(sum.is_exact());
        assert!(sum.eq_value(&Number::from_ratio(1, 2).unwrap()));
        assert_eq!(sum.to_string(), "1/2");
    }

    #[test]
    fn test_approximateness_is_sticky() {
        let root = Number::from_i64(2).sqrt(50).unwrap();
        assert!(!root.is_exact());
        let sum = root.add(&Number::one());
        assert!(!sum.is_exact());
    }

    #[test]
    fn test_precision_never_increases() {
        let a = Number::from_approx("1.5".parse().unwrap(), 10);
        let b = Number::from_approx("2.5".parse().unwrap(), 40);
        let product = a.mul(&b);
        assert!(product.precision() <= 10);
    }

    #[test]
    fn test_division_by_zero() {
        let err = Number::one().checked_div(&Number::zero());
        assert!(matches!(err, Err(NumberError::DivisionByZero)));
    }

    #[test]
    fn test_perfect_square_stays_exact() {
        let n = Number::from_i64(49).sqrt(50).unwrap();
        assert!(n.is_exact());
        assert_eq!(n.to_i64(), Some(7));

        // 9/4 -> 3/2
        let q = Number::from_ratio(9, 4).unwrap().sqrt(50).unwrap();
        assert!(q.is_exact());
        assert!(q.eq_value(&Number::from_ratio(3, 2).unwrap()));
    }

    #[test]
    fn test_irrational_sqrt_is_approx() {
        let n = Number::from_i64(2).sqrt(50).unwrap();
        assert!(!n.is_exact());
        let squared = n.mul(&n);
        assert!(squared.eq_value(&Number::from_i64(2)));
    }

    #[test]
    fn test_sqrt_negative_is_domain_error() {
        let err = Number::from_i64(-1).sqrt(50);
        assert!(matches!(err, Err(NumberError::DomainError(_))));
    }

    #[test]
    fn test_pow_int() {
        let n = Number::from_i64(2).pow_int(10).unwrap();
        assert_eq!(n.to_i64(), Some(1024));
        let inv = Number::from_i64(2).pow_int(-2).unwrap();
        assert!(inv.eq_value(&Number::from_ratio(1, 4).unwrap()));
    }

    #[test]
    fn test_sin_of_pi_over_two() {
        let pi = Number::pi(50);
        let half_pi = pi.checked_div(&Number::from_i64(2)).unwrap();
        let s = half_pi.sin(50);
        assert!(s.eq_value(&Number::one()));
    }

    #[test]
    fn test_cos_of_pi() {
        let c = Number::pi(50).cos(50);
        assert!(c.eq_value(&Number::from_i64(-1)));
    }

    #[test]
    fn test_large_angle_reduction() {
        // sin(2π·1000 + π/2) = 1
        let pi = Number::pi(50);
        let big = pi
            .mul(&Number::from_i64(2000))
            .add(&pi.checked_div(&Number::from_i64(2)).unwrap());
        assert!(big.sin(50).eq_value(&Number::one()));
    }

    #[test]
    fn test_ln_exp_inverse() {
        let x = Number::parse("2.5").unwrap();
        let back = x.exp(50).ln(50).unwrap();
        assert!(back.eq_value(&x));
    }

    #[test]
    fn test_floor_ceil_round() {
        let n = Number::parse("-3.5").unwrap();
        assert_eq!(n.floor().to_i64(), Some(-4));
        assert_eq!(n.ceil().to_i64(), Some(-3));
        assert_eq!(Number::parse("2.5").unwrap().round().to_i64(), Some(3));
    }

    #[test]
    fn test_compare_exact() {
        let a = Number::from_ratio(1, 3).unwrap();
        let b = Number::from_ratio(1, 2).unwrap();
        assert_eq!(a.compare(&b), Ordering::Less);
    }

    #[test]
    fn test_display_roundtrip() {
        let n = Number::parse("1/3").unwrap().add(&Number::parse("1/6").unwrap());
        let reparsed = Number::parse(&n.to_string()).unwrap();
        assert!(reparsed.eq_value(&n));
    }

    #[test]
    fn test_pi_value() {
        let pi = Number::pi(50);
        let f = pi.to_f64().unwrap();
        assert!((f - std::f64::consts::PI).abs() < 1e-12);
    }
}
