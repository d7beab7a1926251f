//! Output rendering
//!
//! Turns values and (possibly partially reduced) expression trees into
//! markup strings. Exact non-integer rationals always render as
//! fractions, approximations honor the configured significant digits
//! and decimal cap, unit exponents become superscripts, and error
//! values render as "undefined".

use reckon_core::Number;
use reckon_units::Unit;

use crate::ast::{BinOp, Expr, UnOp};
use crate::config::Settings;
use crate::value::Value;

pub fn render_value(value: &Value, settings: &Settings) -> String {
    match value {
        Value::Number(n) => render_number(n, settings),
        Value::Complex(re, im) => render_complex(re, im, settings),
        Value::Bool(b) => b.to_string(),
        Value::Quantity(q) => format!(
            "{} {}",
            render_number(&q.value, settings),
            render_unit(&q.unit)
        ),
        Value::Vector(elems) => {
            let parts: Vec<String> = elems.iter().map(|v| render_value(v, settings)).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Matrix(rows) => {
            let parts: Vec<String> = rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|v| render_value(v, settings))
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .collect();
            format!("[{}]", parts.join("; "))
        }
        Value::Error(_) => "undefined".to_string(),
    }
}

/// Largest numerator/denominator still rendered as a fraction; longer
/// exact rationals read better as decimals.
const FRACTION_LIMIT: u64 = 1000;

pub fn render_number(n: &Number, settings: &Settings) -> String {
    let digits = settings.digits.max(1) as usize;
    if n.is_exact() {
        if n.is_integer() || n.is_simple_fraction(FRACTION_LIMIT) {
            return n.to_string();
        }
        return n.to_approx(digits).to_string();
    }
    let shown = match settings.max_decimals {
        Some(cap) => round_to_decimals(n, cap),
        None => n.clone(),
    };
    shown.to_approx(digits).to_string()
}

/// Round to at most `decimals` decimal places.
fn round_to_decimals(n: &Number, decimals: u32) -> Number {
    let scale = match Number::from_i64(10).pow_int(decimals as i64) {
        Ok(s) => s,
        Err(_) => return n.clone(),
    };
    let scaled = n.mul(&scale).round();
    match scaled.checked_div(&scale) {
        Ok(r) => r,
        Err(_) => n.clone(),
    }
}

fn render_complex(re: &Number, im: &Number, settings: &Settings) -> String {
    let im_abs = render_number(&im.abs(), settings);
    let im_part = if im_abs == "1" {
        "i".to_string()
    } else {
        format!("{}i", im_abs)
    };
    if re.is_zero() {
        return if im.is_negative() {
            format!("-{}", im_part)
        } else {
            im_part
        };
    }
    let sign = if im.is_negative() { "-" } else { "+" };
    format!("{} {} {}", render_number(re, settings), sign, im_part)
}

/// Unit symbols with integer exponents become superscripts:
/// `m^2` renders as `m<sup>2</sup>`.
pub fn render_unit(unit: &Unit) -> String {
    let symbol = &unit.symbol;
    let mut out = String::with_capacity(symbol.len());
    let mut chars = symbol.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '^' {
            out.push_str("<sup>");
            if chars.peek() == Some(&'-') {
                out.push('-');
                chars.next();
            }
            while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                out.push(*d);
                chars.next();
            }
            out.push_str("</sup>");
        } else {
            out.push(c);
        }
    }
    out
}

/// Render an expression tree, parenthesizing children that bind looser
/// than their parent. Unresolved symbols render in italics.
pub fn render_expr(expr: &Expr, settings: &Settings) -> String {
    render_prec(expr, 0, settings)
}

fn binding(op: BinOp) -> u8 {
    match op {
        BinOp::Or => 1,
        BinOp::And => 2,
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => 3,
        BinOp::Add | BinOp::Sub => 4,
        BinOp::Mul | BinOp::Div => 5,
        BinOp::Pow => 7,
    }
}

fn render_prec(expr: &Expr, parent: u8, settings: &Settings) -> String {
    let (text, prec) = match expr {
        Expr::Literal(v) => (render_value(v, settings), 10),
        Expr::Symbol(name) => (format!("<i>{}</i>", name), 10),
        Expr::Binary(op, lhs, rhs) => {
            let p = binding(*op);
            let text = if *op == BinOp::Pow {
                // Exponent as superscript, right side binds tighter
                format!(
                    "{}<sup>{}</sup>",
                    render_prec(lhs, p + 1, settings),
                    render_prec(rhs, 0, settings)
                )
            } else {
                format!(
                    "{} {} {}",
                    render_prec(lhs, p, settings),
                    op.symbol(),
                    render_prec(rhs, p + 1, settings)
                )
            };
            (text, p)
        }
        Expr::Unary(op, operand) => {
            let sym = match op {
                UnOp::Neg => "-",
                UnOp::Not => "!",
            };
            (format!("{}{}", sym, render_prec(operand, 6, settings)), 6)
        }
        Expr::Call(name, args) => {
            let parts: Vec<String> = args.iter().map(|a| render_prec(a, 0, settings)).collect();
            (format!("{}({})", name, parts.join(", ")), 10)
        }
        Expr::WithUnit(inner, unit) => (
            format!("{} {}", render_prec(inner, 8, settings), render_unit(unit)),
            8,
        ),
        Expr::Convert(inner, unit) => (
            format!("{} to {}", render_prec(inner, 1, settings), render_unit(unit)),
            1,
        ),
        Expr::Assign(name, rhs) => (
            format!("{} := {}", name, render_prec(rhs, 0, settings)),
            0,
        ),
        Expr::Vector(elems) => {
            let parts: Vec<String> =
                elems.iter().map(|e| render_prec(e, 0, settings)).collect();
            (format!("[{}]", parts.join(", ")), 10)
        }
        Expr::Matrix(rows) => {
            let parts: Vec<String> = rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|e| render_prec(e, 0, settings))
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .collect();
            (format!("[{}]", parts.join("; ")), 10)
        }
    };
    if prec < parent {
        format!("({})", text)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reckon_core::DEFAULT_PRECISION;
    use reckon_units::Quantity;

    fn settings() -> Settings {
        Settings::default()
    }

    #[test]
    fn test_exact_fraction_renders_as_fraction() {
        let half = Number::from_ratio(1, 2).unwrap();
        assert_eq!(render_number(&half, &settings()), "1/2");
    }

    #[test]
    fn test_long_exact_rational_renders_as_decimal() {
        let n = Number::from_ratio(25146, 15625).unwrap();
        assert_eq!(render_number(&n, &settings()), "1.609344");
    }

    #[test]
    fn test_integer_renders_plain() {
        assert_eq!(render_number(&Number::from_i64(42), &settings()), "42");
    }

    #[test]
    fn test_approx_honors_digit_limit() {
        let third = Number::from_ratio(1, 3)
            .unwrap()
            .to_approx(DEFAULT_PRECISION);
        let n = Number::from_approx(third, DEFAULT_PRECISION);
        let mut s = settings();
        s.digits = 5;
        let rendered = render_number(&n, &s);
        // 5 significant digits of 1/3
        assert!(rendered.starts_with("0.33333"), "got {}", rendered);
        assert!(!rendered.contains("333333"), "got {}", rendered);
    }

    #[test]
    fn test_max_decimals_cap() {
        let n = Number::from_approx(
            Number::parse("3.14159").unwrap().to_approx(20),
            20,
        );
        let mut s = settings();
        s.max_decimals = Some(2);
        assert_eq!(render_number(&n, &s), "3.14");
    }

    #[test]
    fn test_unit_exponent_superscript() {
        let m2 = Unit::new(
            "m^2",
            "square meter",
            reckon_units::Dimension::AREA,
            Number::one(),
        );
        assert_eq!(render_unit(&m2), "m<sup>2</sup>");
    }

    #[test]
    fn test_plain_unit_untouched() {
        let m = Unit::new("m/s", "", reckon_units::Dimension::VELOCITY, Number::one());
        assert_eq!(render_unit(&m), "m/s");
    }

    #[test]
    fn test_quantity_rendering() {
        let q = Quantity::new(
            Number::from_i64(5),
            Unit::new("m", "meter", reckon_units::Dimension::LENGTH, Number::one()),
        );
        assert_eq!(render_value(&Value::Quantity(q), &settings()), "5 m");
    }

    #[test]
    fn test_error_renders_undefined() {
        let v = Value::Error(reckon_core::CalcError::div_zero());
        assert_eq!(render_value(&v, &settings()), "undefined");
    }

    #[test]
    fn test_complex_rendering() {
        let v = Value::Complex(Number::zero(), Number::from_i64(2));
        assert_eq!(render_value(&v, &settings()), "2i");
        let v = Value::Complex(Number::from_i64(1), Number::from_i64(-1));
        assert_eq!(render_value(&v, &settings()), "1 - i");
    }

    #[test]
    fn test_symbolic_expression() {
        let e = Expr::binary(
            BinOp::Add,
            Expr::Symbol("x".to_string()),
            Expr::literal(Number::from_i64(1)),
        );
        assert_eq!(render_expr(&e, &settings()), "<i>x</i> + 1");
    }

    #[test]
    fn test_parenthesization() {
        // (1 + 2) * 3 keeps its parentheses
        let e = Expr::binary(
            BinOp::Mul,
            Expr::binary(
                BinOp::Add,
                Expr::literal(Number::from_i64(1)),
                Expr::literal(Number::from_i64(2)),
            ),
            Expr::literal(Number::from_i64(3)),
        );
        assert_eq!(render_expr(&e, &settings()), "(1 + 2) * 3");
    }

    #[test]
    fn test_power_renders_superscript() {
        let e = Expr::binary(
            BinOp::Pow,
            Expr::Symbol("x".to_string()),
            Expr::literal(Number::from_i64(2)),
        );
        assert_eq!(render_expr(&e, &settings()), "<i>x</i><sup>2</sup>");
    }
}
