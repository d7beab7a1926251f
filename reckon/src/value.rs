//! Runtime values
//!
//! A value is a number, a complex number, a boolean, a unit-bearing
//! quantity, a vector/matrix, or an error. Errors are values: they stand
//! in for the failed subexpression, render as "undefined", and propagate
//! through every operation that touches them.

use reckon_core::{CalcError, Number};
use reckon_units::Quantity;
use serde::{Deserialize, Serialize};

/// Runtime value in the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Number(Number),
    /// re + im*i
    Complex(Number, Number),
    Bool(bool),
    Quantity(Quantity),
    Vector(Vec<Value>),
    Matrix(Vec<Vec<Value>>),
    Error(CalcError),
}

impl Value {
    // ========== Safe Accessors (never panic) ==========

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_quantity(&self) -> Option<&Quantity> {
        match self {
            Value::Quantity(q) => Some(q),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::Complex(..) => "Complex",
            Value::Bool(_) => "Bool",
            Value::Quantity(_) => "Quantity",
            Value::Vector(_) => "Vector",
            Value::Matrix(_) => "Matrix",
            Value::Error(_) => "Error",
        }
    }

    /// True when this value carries no approximation anywhere
    pub fn is_exact(&self) -> bool {
        match self {
            Value::Number(n) => n.is_exact(),
            Value::Complex(re, im) => re.is_exact() && im.is_exact(),
            Value::Bool(_) => true,
            Value::Quantity(q) => q.value.is_exact(),
            Value::Vector(items) => items.iter().all(Value::is_exact),
            Value::Matrix(rows) => rows.iter().flatten().all(Value::is_exact),
            Value::Error(_) => false,
        }
    }

    /// Semantic equality for tests and round-trip checks. A dimensionless
    /// quantity equals its bare number.
    pub fn eq_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.eq_value(b),
            (Value::Complex(ar, ai), Value::Complex(br, bi)) => {
                ar.eq_value(br) && ai.eq_value(bi)
            }
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Quantity(a), Value::Quantity(b)) => match b.convert_to(&a.unit) {
                Ok(converted) => a.value.eq_value(&converted.value),
                Err(_) => false,
            },
            (Value::Number(n), Value::Quantity(q)) | (Value::Quantity(q), Value::Number(n)) => {
                q.is_dimensionless() && q.value.eq_value(n)
            }
            (Value::Vector(a), Value::Vector(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_value(y))
            }
            (Value::Matrix(a), Value::Matrix(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(ra, rb)| {
                        ra.len() == rb.len() && ra.iter().zip(rb).all(|(x, y)| x.eq_value(y))
                    })
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Complex(re, im) => {
                if re.is_zero() {
                    write!(f, "{}i", im)
                } else if im.is_negative() {
                    write!(f, "{} - {}i", re, im.neg())
                } else {
                    write!(f, "{} + {}i", re, im)
                }
            }
            Value::Bool(b) => write!(f, "{}", b),
            Value::Quantity(q) => write!(f, "{}", q),
            Value::Vector(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Matrix(rows) => {
                let parts: Vec<String> = rows
                    .iter()
                    .map(|row| {
                        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                        cells.join(", ")
                    })
                    .collect();
                write!(f, "[{}]", parts.join("; "))
            }
            Value::Error(_) => write!(f, "undefined"),
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<CalcError> for Value {
    fn from(e: CalcError) -> Self {
        Value::Error(e)
    }
}
