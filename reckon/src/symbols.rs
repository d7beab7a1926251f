//! Built-in constants and functions
//!
//! Every builtin carries a primary name, a description, and zero or
//! more aliases. Aliases map one-to-one: an alias never points at two
//! different symbols.

use std::collections::HashMap;

use reckon_core::{CalcError, Number};

use crate::config::AngleUnit;
use crate::value::Value;

/// Descriptor returned by variable listings.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SymbolInfo {
    pub name: String,
    pub description: String,
    pub aliases: Vec<String>,
}

struct Constant {
    name: &'static str,
    description: &'static str,
    aliases: &'static [&'static str],
    eval: fn(usize) -> Number,
}

const CONSTANTS: &[Constant] = &[
    Constant {
        name: "pi",
        description: "Archimedes' constant, the ratio of a circle's circumference to its diameter",
        aliases: &["π"],
        eval: Number::pi,
    },
    Constant {
        name: "e",
        description: "Euler's number, the base of the natural logarithm",
        aliases: &[],
        eval: Number::e,
    },
    Constant {
        name: "golden",
        description: "The golden ratio",
        aliases: &["φ", "phi"],
        eval: Number::phi,
    },
];

struct Function {
    name: &'static str,
    description: &'static str,
    aliases: &'static [&'static str],
    min_args: usize,
    max_args: usize,
}

const FUNCTIONS: &[Function] = &[
    Function { name: "sin", description: "Sine of an angle", aliases: &[], min_args: 1, max_args: 1 },
    Function { name: "cos", description: "Cosine of an angle", aliases: &[], min_args: 1, max_args: 1 },
    Function { name: "tan", description: "Tangent of an angle", aliases: &[], min_args: 1, max_args: 1 },
    Function { name: "sqrt", description: "Square root", aliases: &["√"], min_args: 1, max_args: 1 },
    Function { name: "root", description: "nth root: root(x, n)", aliases: &[], min_args: 2, max_args: 2 },
    Function { name: "ln", description: "Natural logarithm", aliases: &[], min_args: 1, max_args: 1 },
    Function { name: "log", description: "Base-10 logarithm", aliases: &["log10"], min_args: 1, max_args: 1 },
    Function { name: "log2", description: "Base-2 logarithm", aliases: &[], min_args: 1, max_args: 1 },
    Function { name: "exp", description: "e raised to the given power", aliases: &[], min_args: 1, max_args: 1 },
    Function { name: "abs", description: "Absolute value", aliases: &[], min_args: 1, max_args: 1 },
    Function { name: "floor", description: "Largest integer not above the argument", aliases: &[], min_args: 1, max_args: 1 },
    Function { name: "ceil", description: "Smallest integer not below the argument", aliases: &["ceiling"], min_args: 1, max_args: 1 },
    Function { name: "round", description: "Round to the nearest integer", aliases: &[], min_args: 1, max_args: 1 },
];

/// Lookup for builtin constants and functions.
pub struct SymbolTable {
    constant_names: HashMap<&'static str, usize>,
    function_names: HashMap<&'static str, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut constant_names = HashMap::new();
        for (i, c) in CONSTANTS.iter().enumerate() {
            constant_names.insert(c.name, i);
            for alias in c.aliases {
                constant_names.insert(*alias, i);
            }
        }
        let mut function_names = HashMap::new();
        for (i, f) in FUNCTIONS.iter().enumerate() {
            function_names.insert(f.name, i);
            for alias in f.aliases {
                function_names.insert(*alias, i);
            }
        }
        SymbolTable {
            constant_names,
            function_names,
        }
    }

    pub fn constant(&self, name: &str, precision: usize) -> Option<Number> {
        let idx = *self.constant_names.get(name)?;
        Some((CONSTANTS[idx].eval)(precision))
    }

    pub fn is_function(&self, name: &str) -> bool {
        self.function_names.contains_key(name)
    }

    /// All names the parser should treat as symbols rather than units
    pub fn constant_name_set(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.constant_names.keys().copied()
    }

    /// Apply a builtin function. `angle` governs trigonometric argument
    /// interpretation, `precision` the working precision of forced
    /// approximations.
    pub fn call(
        &self,
        name: &str,
        args: &[Value],
        angle: AngleUnit,
        precision: usize,
    ) -> Result<Value, CalcError> {
        let idx = *self
            .function_names
            .get(name)
            .ok_or_else(|| CalcError::unknown_symbol(name))?;
        let func = &FUNCTIONS[idx];
        if args.len() < func.min_args || args.len() > func.max_args {
            return Err(CalcError::arg_count(func.name, func.min_args, args.len()));
        }
        for arg in args {
            if let Value::Error(e) = arg {
                return Err(e.clone());
            }
        }
        let x = numeric_arg(&args[0])?;
        let result = match func.name {
            "sin" => to_radians(x, angle, precision).sin(precision),
            "cos" => to_radians(x, angle, precision).cos(precision),
            "tan" => to_radians(x, angle, precision).tan(precision)?,
            "sqrt" => return sqrt_value(x, precision),
            "root" => {
                let n = numeric_arg(&args[1])?;
                return root_value(x, n, precision);
            }
            "ln" => x.ln(precision)?,
            "log" => x.log10(precision)?,
            "log2" => x.log2(precision)?,
            "exp" => x.exp(precision),
            "abs" => x.abs(),
            "floor" => x.floor(),
            "ceil" => x.ceil(),
            "round" => x.round(),
            _ => return Err(CalcError::internal(format!("unhandled builtin {}", func.name))),
        };
        Ok(Value::Number(result))
    }

    /// Listing for the variables API: constants sorted by primary name.
    pub fn list_constants(&self) -> Vec<SymbolInfo> {
        let mut infos: Vec<SymbolInfo> = CONSTANTS
            .iter()
            .map(|c| SymbolInfo {
                name: c.name.to_string(),
                description: c.description.to_string(),
                aliases: c.aliases.iter().map(|a| a.to_string()).collect(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Listing for the variables API: builtin functions sorted by
    /// primary name.
    pub fn list_functions(&self) -> Vec<SymbolInfo> {
        let mut infos: Vec<SymbolInfo> = FUNCTIONS
            .iter()
            .map(|f| SymbolInfo {
                name: f.name.to_string(),
                description: f.description.to_string(),
                aliases: f.aliases.iter().map(|a| a.to_string()).collect(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

fn numeric_arg(value: &Value) -> Result<Number, CalcError> {
    match value {
        Value::Number(n) => Ok(n.clone()),
        // Dimensionless units like deg still scale; take the base value
        Value::Quantity(q) if q.is_dimensionless() => Ok(q.unit.to_base(&q.value)),
        other => Err(CalcError::type_error("number", other.type_name())),
    }
}

fn to_radians(x: Number, angle: AngleUnit, precision: usize) -> Number {
    match angle {
        AngleUnit::Radians => x,
        AngleUnit::Degrees => {
            // x * π / 180
            match x.mul(&Number::pi(precision)).checked_div(&Number::from_i64(180)) {
                Ok(n) => n,
                Err(_) => x,
            }
        }
        AngleUnit::Gradians => {
            match x.mul(&Number::pi(precision)).checked_div(&Number::from_i64(200)) {
                Ok(n) => n,
                Err(_) => x,
            }
        }
    }
}

/// Square root that falls back to a complex pair for negative input.
fn sqrt_value(x: Number, precision: usize) -> Result<Value, CalcError> {
    if x.is_negative() {
        let im = x.neg().sqrt(precision)?;
        return Ok(Value::Complex(Number::zero(), im));
    }
    Ok(Value::Number(x.sqrt(precision)?))
}

/// x^(1/n) for integer n; odd roots of negatives stay real.
fn root_value(x: Number, n: Number, precision: usize) -> Result<Value, CalcError> {
    let n_int = n
        .to_i64()
        .filter(|v| *v != 0 && n.is_integer())
        .ok_or_else(|| CalcError::domain("root() degree must be a nonzero integer"))?;
    if x.is_negative() && n_int % 2 == 0 {
        return Err(CalcError::domain("even root of a negative number"));
    }
    let negate = x.is_negative();
    let base = x.abs();
    let inv = Number::from_ratio(1, n_int)?;
    let result = base.pow(&inv, precision)?;
    Ok(Value::Number(if negate { result.neg() } else { result }))
}
