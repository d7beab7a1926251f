//! Expression trees
//!
//! The parser produces an `Expr`; the evaluator reduces it to another
//! `Expr` with as many nodes folded into literals as the time budget
//! allowed. Error values appear as `Literal(Value::Error(..))` nodes so a
//! failed subexpression never takes the rest of the tree down with it.

use crate::value::Value;
use reckon_units::Unit;

/// Binary operators, loosest-binding last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "^",
            BinOp::Eq => "=",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

/// Expression node. Trees own their children and are acyclic by
/// construction.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Value),
    /// Reference to a constant, user variable, or unknown
    Symbol(String),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Unary(UnOp, Box<Expr>),
    Call(String, Vec<Expr>),
    /// Unit postfix application: `5 mm`
    WithUnit(Box<Expr>, Unit),
    /// Unit conversion: `1 USD to EUR`
    Convert(Box<Expr>, Unit),
    /// Session variable assignment: `x := 5`
    Assign(String, Box<Expr>),
    Vector(Vec<Expr>),
    Matrix(Vec<Vec<Expr>>),
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn unary(op: UnOp, operand: Expr) -> Self {
        Expr::Unary(op, Box::new(operand))
    }

    /// The folded value, if this node is fully reduced
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Expr::Literal(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reckon_core::Number;

    #[test]
    fn test_builders() {
        let e = Expr::binary(
            BinOp::Add,
            Expr::literal(Number::from_i64(1)),
            Expr::literal(Number::from_i64(2)),
        );
        match e {
            Expr::Binary(BinOp::Add, lhs, _) => {
                assert!(lhs.as_value().is_some());
            }
            _ => panic!("expected binary node"),
        }
    }
}
