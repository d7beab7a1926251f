//! Evaluator
//!
//! Reduces an expression tree bottom-up, folding every node it can into
//! a literal. Failures become `Value::Error` literals and a message, so
//! one bad subexpression never aborts the whole calculation. Reduction
//! runs on an explicit work stack, so input depth never translates into
//! call-stack depth. The time budget is enforced cooperatively: every
//! few reduction steps the clock is polled, and once the deadline passes
//! the remaining nodes are left unreduced.

use reckon_core::{CalcError, Clock, Number};
use reckon_units::{Quantity, Unit, UNITS};

use crate::ast::{BinOp, Expr, UnOp};
use crate::session::Snapshot;
use crate::symbols::SymbolTable;
use crate::value::Value;

/// Clock polls happen once per this many reduction steps.
const POLL_INTERVAL: u64 = 64;

/// Work item on the evaluation stack.
enum Task<'e> {
    /// Descend into a node
    Visit(&'e Expr),
    /// Fold the node's already-reduced children
    Combine(Frame),
}

/// Deferred fold of a node whose children are on the operand stack.
enum Frame {
    Binary(BinOp),
    Unary(UnOp),
    Call(String, usize),
    WithUnit(Unit),
    Convert(Unit),
    Assign(String),
    Vector(usize),
    /// Row widths; the elements arrive flattened in row-major order
    Matrix(Vec<usize>),
}

pub struct Evaluator<'a> {
    snapshot: &'a Snapshot,
    symbols: &'a SymbolTable,
    clock: &'a dyn Clock,
    deadline_ms: Option<u64>,
    started_ms: u64,
    steps: u64,
    timed_out: bool,
    pub messages: Vec<CalcError>,
    pub assignments: Vec<(String, Value)>,
    pub used_currency: bool,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        snapshot: &'a Snapshot,
        symbols: &'a SymbolTable,
        clock: &'a dyn Clock,
        timeout_ms: Option<u64>,
    ) -> Self {
        let started_ms = clock.now_ms();
        let deadline_ms = timeout_ms.map(|t| started_ms.saturating_add(t));
        Self::with_deadline(snapshot, symbols, clock, started_ms, deadline_ms)
    }

    /// Evaluator bound to an absolute deadline, so several evaluations
    /// (plot samples, for instance) can share one time budget.
    pub fn with_deadline(
        snapshot: &'a Snapshot,
        symbols: &'a SymbolTable,
        clock: &'a dyn Clock,
        started_ms: u64,
        deadline_ms: Option<u64>,
    ) -> Self {
        Evaluator {
            snapshot,
            symbols,
            clock,
            deadline_ms,
            started_ms,
            steps: 0,
            timed_out: false,
            messages: Vec::new(),
            assignments: Vec::new(),
            used_currency: false,
        }
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    fn precision(&self) -> usize {
        self.snapshot.settings.precision
    }

    /// One step consumed; returns true once the deadline has passed.
    fn out_of_time(&mut self) -> bool {
        if self.timed_out {
            return true;
        }
        self.steps += 1;
        if self.steps % POLL_INTERVAL != 0 {
            return false;
        }
        if let Some(deadline) = self.deadline_ms {
            let now = self.clock.now_ms();
            if now >= deadline {
                self.timed_out = true;
                self.messages
                    .push(CalcError::timeout(now.saturating_sub(self.started_ms)));
                return true;
            }
        }
        false
    }

    fn fail(&mut self, err: CalcError) -> Expr {
        self.messages.push(err.clone());
        Expr::Literal(Value::Error(err))
    }

    /// Reduce a tree as far as the time budget allows. Traversal is
    /// post-order over an explicit stack: `Visit` descends into a node's
    /// children, `Combine` folds their results once they are available on
    /// the operand stack.
    pub fn eval(&mut self, expr: &Expr) -> Expr {
        let mut tasks = vec![Task::Visit(expr)];
        let mut operands: Vec<Expr> = Vec::new();

        while let Some(task) = tasks.pop() {
            match task {
                Task::Visit(node) => self.visit(node, &mut tasks, &mut operands),
                Task::Combine(frame) => self.combine(frame, &mut operands),
            }
        }

        self.pop_operand(&mut operands)
    }

    fn visit<'e>(
        &mut self,
        node: &'e Expr,
        tasks: &mut Vec<Task<'e>>,
        operands: &mut Vec<Expr>,
    ) {
        if self.out_of_time() {
            // Past the deadline the subtree is carried over unreduced;
            // pending Combine frames still run and keep what did fold.
            operands.push(node.clone());
            return;
        }
        match node {
            Expr::Literal(_) => operands.push(node.clone()),
            Expr::Symbol(name) => {
                let r = self.eval_symbol(name);
                operands.push(r);
            }
            Expr::Binary(op, lhs, rhs) => {
                tasks.push(Task::Combine(Frame::Binary(*op)));
                tasks.push(Task::Visit(rhs.as_ref()));
                tasks.push(Task::Visit(lhs.as_ref()));
            }
            Expr::Unary(op, operand) => {
                tasks.push(Task::Combine(Frame::Unary(*op)));
                tasks.push(Task::Visit(operand.as_ref()));
            }
            Expr::Call(name, args) => {
                tasks.push(Task::Combine(Frame::Call(name.clone(), args.len())));
                for arg in args.iter().rev() {
                    tasks.push(Task::Visit(arg));
                }
            }
            Expr::WithUnit(inner, unit) => {
                self.note_currency(unit);
                tasks.push(Task::Combine(Frame::WithUnit(unit.clone())));
                tasks.push(Task::Visit(inner.as_ref()));
            }
            Expr::Convert(inner, target) => {
                self.note_currency(target);
                tasks.push(Task::Combine(Frame::Convert(target.clone())));
                tasks.push(Task::Visit(inner.as_ref()));
            }
            Expr::Assign(name, rhs) => {
                tasks.push(Task::Combine(Frame::Assign(name.clone())));
                tasks.push(Task::Visit(rhs.as_ref()));
            }
            Expr::Vector(elems) => {
                tasks.push(Task::Combine(Frame::Vector(elems.len())));
                for e in elems.iter().rev() {
                    tasks.push(Task::Visit(e));
                }
            }
            Expr::Matrix(rows) => {
                let widths = rows.iter().map(Vec::len).collect();
                tasks.push(Task::Combine(Frame::Matrix(widths)));
                for e in rows.iter().flatten().rev() {
                    tasks.push(Task::Visit(e));
                }
            }
        }
    }

    fn combine(&mut self, frame: Frame, operands: &mut Vec<Expr>) {
        let result = match frame {
            Frame::Binary(op) => {
                let rhs = self.pop_operand(operands);
                let lhs = self.pop_operand(operands);
                match (lhs.as_value(), rhs.as_value()) {
                    (Some(a), Some(b)) => {
                        let (a, b) = (a.clone(), b.clone());
                        self.apply_binary(op, a, b)
                    }
                    _ => simplify_partial(op, lhs, rhs),
                }
            }
            Frame::Unary(op) => {
                let operand = self.pop_operand(operands);
                match operand.as_value() {
                    Some(v) => {
                        let v = v.clone();
                        self.apply_unary(op, v)
                    }
                    None => Expr::Unary(op, Box::new(operand)),
                }
            }
            Frame::Call(name, arg_count) => {
                let args = self.pop_operands(operands, arg_count);
                self.apply_call(&name, args)
            }
            Frame::WithUnit(unit) => {
                let inner = self.pop_operand(operands);
                match inner.as_value() {
                    Some(v) => {
                        let v = v.clone();
                        self.attach_unit(v, &unit)
                    }
                    None => Expr::WithUnit(Box::new(inner), unit),
                }
            }
            Frame::Convert(target) => {
                let inner = self.pop_operand(operands);
                match inner.as_value() {
                    Some(v) => {
                        let v = v.clone();
                        self.convert(v, &target)
                    }
                    None => Expr::Convert(Box::new(inner), target),
                }
            }
            Frame::Assign(name) => {
                let rhs = self.pop_operand(operands);
                if let Some(v) = rhs.as_value() {
                    if !matches!(v, Value::Error(_)) {
                        self.assignments.push((name, v.clone()));
                    }
                }
                rhs
            }
            Frame::Vector(len) => {
                let elems = self.pop_operands(operands, len);
                self.fold_vector(elems)
            }
            Frame::Matrix(widths) => {
                let total = widths.iter().sum();
                let mut flat = self.pop_operands(operands, total).into_iter();
                let rows = widths
                    .iter()
                    .map(|w| flat.by_ref().take(*w).collect())
                    .collect();
                self.fold_matrix(rows)
            }
        };
        operands.push(result);
    }

    /// Operand stack discipline guarantees a result per frame; an empty
    /// pop is an evaluator bug surfaced as an internal error value.
    fn pop_operand(&mut self, operands: &mut Vec<Expr>) -> Expr {
        match operands.pop() {
            Some(e) => e,
            None => self.fail(CalcError::internal("operand stack underflow")),
        }
    }

    fn pop_operands(&mut self, operands: &mut Vec<Expr>, count: usize) -> Vec<Expr> {
        if operands.len() < count {
            let err = self.fail(CalcError::internal("operand stack underflow"));
            return vec![err];
        }
        operands.split_off(operands.len() - count)
    }

    // ========== Symbols ==========

    fn eval_symbol(&mut self, name: &str) -> Expr {
        if let Some(v) = self.snapshot.variables.get(name) {
            return Expr::Literal(v.clone());
        }
        if let Some(n) = self.symbols.constant(name, self.precision()) {
            return Expr::Literal(Value::Number(n));
        }
        if let Some(unit) = self.resolve_unit(name) {
            // Bare unit in operand position, e.g. the `s` in `20 m / s`
            self.note_currency(&unit);
            return Expr::Literal(Value::Quantity(Quantity::new(Number::one(), unit)));
        }
        if self.snapshot.settings.unknowns_enabled {
            return Expr::Symbol(name.to_string());
        }
        self.fail(CalcError::unknown_symbol(name))
    }

    fn resolve_unit(&self, name: &str) -> Option<Unit> {
        if let Some(unit) = UNITS.resolve(name) {
            return Some(unit.clone());
        }
        self.snapshot
            .rates
            .resolve(name)
            .or_else(|| self.snapshot.rates.resolve(&name.to_ascii_uppercase()))
    }

    fn note_currency(&mut self, unit: &Unit) {
        if unit.is_currency() {
            self.used_currency = true;
        }
    }

    // ========== Calls ==========

    fn apply_call(&mut self, name: &str, reduced: Vec<Expr>) -> Expr {
        if reduced.iter().any(|a| a.as_value().is_none()) {
            return Expr::Call(name.to_string(), reduced);
        }
        let values: Vec<Value> = reduced
            .iter()
            .filter_map(|a| a.as_value().cloned())
            .collect();

        // `x(2)` where x is a variable is multiplication, not a call
        if !self.symbols.is_function(name) && values.len() == 1 {
            let sym = self.eval_symbol(name);
            let arg = values.into_iter().next();
            return match (sym.as_value().cloned(), arg) {
                (Some(v), Some(arg)) => self.apply_binary(BinOp::Mul, v, arg),
                _ => {
                    let rhs = reduced.into_iter().next().unwrap_or(sym.clone());
                    Expr::Binary(BinOp::Mul, Box::new(sym), Box::new(rhs))
                }
            };
        }

        match self.symbols.call(
            name,
            &values,
            self.snapshot.settings.angle,
            self.precision(),
        ) {
            Ok(Value::Complex(..)) if !self.snapshot.settings.complex_enabled => {
                self.fail(CalcError::domain(format!(
                    "{}() has no real result here",
                    name
                )))
            }
            Ok(v) => Expr::Literal(v),
            Err(e) => self.fail(e),
        }
    }

    // ========== Unit handling ==========

    fn attach_unit(&mut self, value: Value, unit: &Unit) -> Expr {
        match value {
            Value::Number(n) => Expr::Literal(Value::Quantity(Quantity::new(n, unit.clone()))),
            Value::Quantity(q) => Expr::Literal(Value::Quantity(Quantity::new(
                q.value,
                q.unit.multiply(unit),
            ))),
            Value::Error(_) => Expr::Literal(value),
            other => self.fail(CalcError::type_error("number", other.type_name())),
        }
    }

    fn convert(&mut self, value: Value, target: &Unit) -> Expr {
        let quantity = match value {
            Value::Quantity(q) => q,
            Value::Number(n) => Quantity::dimensionless(n),
            Value::Error(_) => return Expr::Literal(value),
            other => return self.fail(CalcError::type_error("quantity", other.type_name())),
        };
        self.note_currency(&quantity.unit);
        match quantity.convert_to(target) {
            Ok(q) => Expr::Literal(Value::Quantity(q)),
            Err(e) => self.fail(e),
        }
    }

    // ========== Operators ==========

    fn apply_unary(&mut self, op: UnOp, value: Value) -> Expr {
        if let Value::Error(_) = value {
            return Expr::Literal(value);
        }
        match op {
            UnOp::Neg => match value {
                Value::Number(n) => Expr::Literal(Value::Number(n.neg())),
                Value::Quantity(q) => Expr::Literal(Value::Quantity(q.neg())),
                Value::Complex(re, im) => Expr::Literal(Value::Complex(re.neg(), im.neg())),
                Value::Vector(elems) => {
                    let negated = elems.into_iter().map(negate_value).collect::<Result<_, _>>();
                    match negated {
                        Ok(v) => Expr::Literal(Value::Vector(v)),
                        Err(e) => self.fail(e),
                    }
                }
                other => self.fail(CalcError::type_error("number", other.type_name())),
            },
            UnOp::Not => match value {
                Value::Bool(b) => Expr::Literal(Value::Bool(!b)),
                other => self.fail(CalcError::type_error("boolean", other.type_name())),
            },
        }
    }

    fn apply_binary(&mut self, op: BinOp, lhs: Value, rhs: Value) -> Expr {
        // Error values flow through untouched
        if let Value::Error(_) = lhs {
            return Expr::Literal(lhs);
        }
        if let Value::Error(_) = rhs {
            return Expr::Literal(rhs);
        }

        if op.is_comparison() {
            return self.apply_comparison(op, &lhs, &rhs);
        }
        match op {
            BinOp::And | BinOp::Or => {
                return match (&lhs, &rhs) {
                    (Value::Bool(a), Value::Bool(b)) => {
                        let r = if op == BinOp::And { *a && *b } else { *a || *b };
                        Expr::Literal(Value::Bool(r))
                    }
                    _ => {
                        let offender = if matches!(lhs, Value::Bool(_)) { rhs } else { lhs };
                        self.fail(CalcError::type_error("boolean", offender.type_name()))
                    }
                };
            }
            _ => {}
        }

        match self.arith(op, lhs, rhs) {
            Ok(v) => Expr::Literal(v),
            Err(e) => self.fail(e),
        }
    }

    fn arith(&mut self, op: BinOp, lhs: Value, rhs: Value) -> Result<Value, CalcError> {
        let precision = self.precision();
        match (lhs, rhs) {
            (Value::Number(a), Value::Number(b)) => {
                number_arith(op, &a, &b, precision).map(Value::Number)
            }
            (Value::Complex(ar, ai), Value::Complex(br, bi)) => {
                complex_arith(op, (&ar, &ai), (&br, &bi))
            }
            (Value::Complex(ar, ai), Value::Number(b)) => {
                complex_arith(op, (&ar, &ai), (&b, &Number::zero()))
            }
            (Value::Number(a), Value::Complex(br, bi)) => {
                complex_arith(op, (&a, &Number::zero()), (&br, &bi))
            }
            (Value::Quantity(a), Value::Quantity(b)) => self.quantity_arith(op, a, b),
            (Value::Quantity(a), Value::Number(b)) => {
                self.quantity_arith(op, a, Quantity::dimensionless(b))
            }
            (Value::Number(a), Value::Quantity(b)) => {
                self.quantity_arith(op, Quantity::dimensionless(a), b)
            }
            (Value::Vector(a), Value::Vector(b)) => self.vector_arith(op, a, b),
            (Value::Vector(a), Value::Number(b)) => self.vector_scale(op, a, b, false),
            (Value::Number(a), Value::Vector(b)) => self.vector_scale(op, b, a, true),
            (lhs, rhs) => Err(CalcError::type_error(lhs.type_name(), rhs.type_name())),
        }
    }

    /// Addition and subtraction express the result in the left operand's
    /// unit; multiplication and division combine dimensions.
    fn quantity_arith(&mut self, op: BinOp, a: Quantity, b: Quantity) -> Result<Value, CalcError> {
        let q = match op {
            BinOp::Add => a.add(&b)?,
            BinOp::Sub => a.sub(&b)?,
            BinOp::Mul => a.mul(&b),
            BinOp::Div => a.div(&b)?,
            BinOp::Pow => {
                let exp = b
                    .value
                    .to_i64()
                    .filter(|_| b.is_dimensionless() && b.value.is_integer())
                    .and_then(|v| i32::try_from(v).ok())
                    .ok_or_else(|| {
                        CalcError::domain("quantity exponent must be a small integer")
                    })?;
                a.pow(exp)?
            }
            _ => return Err(CalcError::type_error("number", "quantity")),
        };
        if q.is_dimensionless() {
            return Ok(Value::Number(q.unit.to_base(&q.value)));
        }
        Ok(Value::Quantity(q))
    }

    fn vector_arith(
        &mut self,
        op: BinOp,
        a: Vec<Value>,
        b: Vec<Value>,
    ) -> Result<Value, CalcError> {
        if !matches!(op, BinOp::Add | BinOp::Sub) {
            return Err(CalcError::type_error("number", "vector"));
        }
        if a.len() != b.len() {
            return Err(CalcError::domain(format!(
                "vector length mismatch: {} vs {}",
                a.len(),
                b.len()
            )));
        }
        let mut out = Vec::with_capacity(a.len());
        for (x, y) in a.into_iter().zip(b) {
            out.push(self.arith(op, x, y)?);
        }
        Ok(Value::Vector(out))
    }

    fn vector_scale(
        &mut self,
        op: BinOp,
        elems: Vec<Value>,
        scalar: Number,
        scalar_on_left: bool,
    ) -> Result<Value, CalcError> {
        if !matches!(op, BinOp::Mul | BinOp::Div) {
            return Err(CalcError::type_error("number", "vector"));
        }
        let mut out = Vec::with_capacity(elems.len());
        for v in elems {
            let r = if scalar_on_left {
                self.arith(op, Value::Number(scalar.clone()), v)?
            } else {
                self.arith(op, v, Value::Number(scalar.clone()))?
            };
            out.push(r);
        }
        Ok(Value::Vector(out))
    }

    fn apply_comparison(&mut self, op: BinOp, lhs: &Value, rhs: &Value) -> Expr {
        let ordering = match (lhs, rhs) {
            (Value::Number(a), Value::Number(b)) => Some(a.compare(b)),
            (Value::Quantity(a), Value::Quantity(b)) => match b.convert_to(&a.unit) {
                Ok(b) => Some(a.value.compare(&b.value)),
                Err(e) => return self.fail(e),
            },
            (Value::Quantity(a), Value::Number(b)) if a.is_dimensionless() => {
                Some(a.unit.to_base(&a.value).compare(b))
            }
            (Value::Number(a), Value::Quantity(b)) if b.is_dimensionless() => {
                Some(a.compare(&b.unit.to_base(&b.value)))
            }
            _ => None,
        };
        let result = match (op, ordering) {
            (BinOp::Eq, _) => lhs.eq_value(rhs),
            (BinOp::Ne, _) => !lhs.eq_value(rhs),
            (_, None) => {
                return self.fail(CalcError::type_error(lhs.type_name(), rhs.type_name()))
            }
            (BinOp::Lt, Some(o)) => o == std::cmp::Ordering::Less,
            (BinOp::Gt, Some(o)) => o == std::cmp::Ordering::Greater,
            (BinOp::Le, Some(o)) => o != std::cmp::Ordering::Greater,
            (BinOp::Ge, Some(o)) => o != std::cmp::Ordering::Less,
            _ => return self.fail(CalcError::internal("non-comparison in comparison path")),
        };
        Expr::Literal(Value::Bool(result))
    }

    // ========== Aggregates ==========

    fn fold_vector(&mut self, elems: Vec<Expr>) -> Expr {
        if elems.iter().all(|e| e.as_value().is_some()) {
            let values = elems
                .iter()
                .filter_map(|e| e.as_value().cloned())
                .collect();
            return Expr::Literal(Value::Vector(values));
        }
        Expr::Vector(elems)
    }

    fn fold_matrix(&mut self, rows: Vec<Vec<Expr>>) -> Expr {
        let all_reduced = rows
            .iter()
            .all(|row| row.iter().all(|e| e.as_value().is_some()));
        let widths_match = rows.windows(2).all(|w| w[0].len() == w[1].len());
        if !widths_match {
            return self.fail(CalcError::domain("matrix rows differ in length"));
        }
        if all_reduced {
            let values = rows
                .iter()
                .map(|row| row.iter().filter_map(|e| e.as_value().cloned()).collect())
                .collect();
            return Expr::Literal(Value::Matrix(values));
        }
        Expr::Matrix(rows)
    }
}

/// Identity elimination for nodes that could not be fully folded, so a
/// symbolic tree still shrinks: `x + 0`, `x * 1`, `x * 0`, `x ^ 1`,
/// `x ^ 0`, `x / 1`.
fn simplify_partial(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    let lhs_zero = literal_number(&lhs).is_some_and(Number::is_zero);
    let lhs_one = literal_number(&lhs).is_some_and(Number::is_one);
    let rhs_zero = literal_number(&rhs).is_some_and(Number::is_zero);
    let rhs_one = literal_number(&rhs).is_some_and(Number::is_one);
    match op {
        BinOp::Add if lhs_zero => rhs,
        BinOp::Add | BinOp::Sub if rhs_zero => lhs,
        BinOp::Mul if lhs_one => rhs,
        BinOp::Mul | BinOp::Div if rhs_one => lhs,
        BinOp::Mul if lhs_zero || rhs_zero => Expr::Literal(Value::Number(Number::zero())),
        BinOp::Pow if rhs_one => lhs,
        BinOp::Pow if rhs_zero => Expr::Literal(Value::Number(Number::one())),
        _ => Expr::Binary(op, Box::new(lhs), Box::new(rhs)),
    }
}

fn literal_number(e: &Expr) -> Option<&Number> {
    match e {
        Expr::Literal(Value::Number(n)) => Some(n),
        _ => None,
    }
}

fn negate_value(v: Value) -> Result<Value, CalcError> {
    match v {
        Value::Number(n) => Ok(Value::Number(n.neg())),
        Value::Quantity(q) => Ok(Value::Quantity(q.neg())),
        other => Err(CalcError::type_error("number", other.type_name())),
    }
}

fn number_arith(
    op: BinOp,
    a: &Number,
    b: &Number,
    precision: usize,
) -> Result<Number, CalcError> {
    let r = match op {
        BinOp::Add => a.add(b),
        BinOp::Sub => a.sub(b),
        BinOp::Mul => a.mul(b),
        BinOp::Div => a.checked_div(b)?,
        BinOp::Pow => {
            if b.is_integer() {
                match b.to_i64() {
                    Some(exp) => a.pow_int(exp)?,
                    None => a.pow(b, precision)?,
                }
            } else {
                a.pow(b, precision)?
            }
        }
        _ => return Err(CalcError::internal("non-arithmetic op in numeric path")),
    };
    Ok(r)
}

fn complex_arith(
    op: BinOp,
    (ar, ai): (&Number, &Number),
    (br, bi): (&Number, &Number),
) -> Result<Value, CalcError> {
    let v = match op {
        BinOp::Add => Value::Complex(ar.add(br), ai.add(bi)),
        BinOp::Sub => Value::Complex(ar.sub(br), ai.sub(bi)),
        BinOp::Mul => Value::Complex(
            ar.mul(br).sub(&ai.mul(bi)),
            ar.mul(bi).add(&ai.mul(br)),
        ),
        BinOp::Div => {
            // (a/b) = (a * conj(b)) / |b|^2
            let denom = br.mul(br).add(&bi.mul(bi));
            if denom.is_zero() {
                return Err(CalcError::div_zero());
            }
            let re = ar.mul(br).add(&ai.mul(bi)).checked_div(&denom)?;
            let im = ai.mul(br).sub(&ar.mul(bi)).checked_div(&denom)?;
            Value::Complex(re, im)
        }
        _ => {
            return Err(CalcError::domain("operation not defined for complex numbers"));
        }
    };
    Ok(normalize_complex(v))
}

/// A complex number with a zero imaginary part collapses to a real.
fn normalize_complex(v: Value) -> Value {
    match v {
        Value::Complex(re, im) if im.is_zero() => Value::Number(re),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, ParseContext, Statement};
    use crate::session::Session;
    use reckon_core::ManualClock;
    use std::sync::Arc;

    fn eval_str(session: &Session, input: &str) -> (Expr, Vec<CalcError>) {
        let snapshot = session.snapshot();
        let names = session.symbol_names();
        let ctx = ParseContext {
            rates: &snapshot.rates,
            known_symbols: &names,
            limit_implicit: snapshot.settings.limit_implicit_mult,
        };
        let (tokens, mut errors) = crate::lexer::tokenize(input, snapshot.settings.base);
        let (stmt, parse_errors) = parse(&tokens, &ctx);
        errors.extend(parse_errors);
        let expr = match stmt {
            Statement::Expr(e) => e,
            other => panic!("expected expression, got {:?}", other),
        };
        let mut ev = Evaluator::new(&snapshot, &session.symbols, session.clock.as_ref(), None);
        let reduced = ev.eval(&expr);
        errors.extend(ev.messages.clone());
        for (name, value) in ev.assignments.drain(..) {
            session.set_variable(&name, value);
        }
        (reduced, errors)
    }

    fn eval_number(session: &Session, input: &str) -> Number {
        let (expr, errors) = eval_str(session, input);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        match expr.as_value() {
            Some(Value::Number(n)) => n.clone(),
            other => panic!("expected number, got {:?}", other),
        }
    }

    #[test]
    fn test_exact_fraction_arithmetic() {
        let session = Session::new();
        let n = eval_number(&session, "1/3 + 1/6");
        assert!(n.is_exact());
        assert_eq!(n.compare(&Number::from_ratio(1, 2).unwrap()), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_unary_minus_vs_power() {
        let session = Session::new();
        assert_eq!(eval_number(&session, "-2^2").to_i64(), Some(-4));
        let quarter = eval_number(&session, "2^-2");
        assert_eq!(
            quarter.compare(&Number::from_ratio(1, 4).unwrap()),
            std::cmp::Ordering::Equal
        );
    }

    #[test]
    fn test_division_by_zero_is_error_value() {
        let session = Session::new();
        let (expr, errors) = eval_str(&session, "1/0");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, reckon_core::codes::DIV_ZERO);
        assert!(matches!(expr.as_value(), Some(Value::Error(_))));
    }

    #[test]
    fn test_error_does_not_poison_siblings() {
        // The failing branch becomes an error value, and the error value
        // propagates through the addition
        let session = Session::new();
        let (expr, errors) = eval_str(&session, "(1/0) + 2");
        assert_eq!(errors.len(), 1);
        assert!(matches!(expr.as_value(), Some(Value::Error(_))));
    }

    #[test]
    fn test_unit_conversion_in_addition() {
        let session = Session::new();
        let (expr, errors) = eval_str(&session, "1 m + 5 mm");
        assert!(errors.is_empty(), "{:?}", errors);
        match expr.as_value() {
            Some(Value::Quantity(q)) => {
                assert_eq!(q.unit.symbol, "m");
                let f = q.value.to_f64().unwrap();
                assert!((f - 1.005).abs() < 1e-12);
            }
            other => panic!("expected quantity, got {:?}", other),
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let session = Session::new();
        let (_, errors) = eval_str(&session, "1 m + 1 s");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, reckon_core::codes::DIMENSION_MISMATCH);
    }

    #[test]
    fn test_quantity_ratio_collapses_to_number() {
        let session = Session::new();
        let n = eval_number(&session, "(4 m) / (2 m)");
        assert_eq!(n.to_i64(), Some(2));
    }

    #[test]
    fn test_bare_unit_division() {
        let session = Session::new();
        let (expr, errors) = eval_str(&session, "20 m / s");
        assert!(errors.is_empty(), "{:?}", errors);
        match expr.as_value() {
            Some(Value::Quantity(q)) => assert_eq!(q.unit.symbol, "m/s"),
            other => panic!("expected quantity, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_symbol_errors_by_default() {
        let session = Session::new();
        let (_, errors) = eval_str(&session, "nonesuch + 1");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, reckon_core::codes::UNKNOWN_SYMBOL);
    }

    #[test]
    fn test_unknowns_stay_symbolic_when_enabled() {
        let session = Session::new();
        session.apply_option("unknowns on");
        let (expr, errors) = eval_str(&session, "x + 1");
        assert!(errors.is_empty(), "{:?}", errors);
        assert!(expr.as_value().is_none());
    }

    #[test]
    fn test_identity_elimination_on_symbolic_trees() {
        let session = Session::new();
        session.apply_option("unknowns on");
        let (expr, errors) = eval_str(&session, "x * 1 + 0");
        assert!(errors.is_empty(), "{:?}", errors);
        assert!(matches!(expr, Expr::Symbol(_)), "got {:?}", expr);
        let (expr, _) = eval_str(&session, "x^1");
        assert!(matches!(expr, Expr::Symbol(_)), "got {:?}", expr);
        let (expr, _) = eval_str(&session, "0 * x");
        match expr.as_value() {
            Some(Value::Number(n)) => assert!(n.is_zero()),
            other => panic!("expected zero, got {:?}", other),
        }
    }

    #[test]
    fn test_long_flat_sum_reduces_completely() {
        // Thousands of terms must reduce without exhausting the call
        // stack; depth lives on the evaluator's own work stack.
        let session = Session::new();
        let source = (0..3000)
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(" + ");
        let n = eval_number(&session, &source);
        assert_eq!(n.to_i64(), Some((0..3000).sum::<i64>()));
    }

    #[test]
    fn test_deep_unary_chain_reduces_completely() {
        let session = Session::new();
        let snapshot = session.snapshot();
        let mut expr = Expr::literal(Number::from_i64(7));
        for _ in 0..10_000 {
            expr = Expr::unary(UnOp::Neg, expr);
        }
        let mut ev = Evaluator::new(&snapshot, &session.symbols, session.clock.as_ref(), None);
        let reduced = ev.eval(&expr);
        match reduced.as_value() {
            Some(Value::Number(n)) => assert_eq!(n.to_i64(), Some(7)),
            other => panic!("expected number, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_commits() {
        let session = Session::new();
        let (_, errors) = eval_str(&session, "x := 2 + 3");
        assert!(errors.is_empty());
        let n = eval_number(&session, "x * 2");
        assert_eq!(n.to_i64(), Some(10));
    }

    #[test]
    fn test_comparison_and_logic() {
        let session = Session::new();
        let (expr, errors) = eval_str(&session, "1 < 2 && 3 >= 3");
        assert!(errors.is_empty());
        assert!(matches!(expr.as_value(), Some(Value::Bool(true))));
    }

    #[test]
    fn test_cross_unit_equality() {
        let session = Session::new();
        let (expr, errors) = eval_str(&session, "100 cm = 1 m");
        assert!(errors.is_empty(), "{:?}", errors);
        assert!(matches!(expr.as_value(), Some(Value::Bool(true))));
    }

    #[test]
    fn test_complex_square_root() {
        let session = Session::new();
        let (expr, errors) = eval_str(&session, "sqrt(-4) * sqrt(-4)");
        assert!(errors.is_empty(), "{:?}", errors);
        match expr.as_value() {
            Some(Value::Number(n)) => assert_eq!(n.to_i64(), Some(-4)),
            other => panic!("expected real number, got {:?}", other),
        }
    }

    #[test]
    fn test_complex_disabled() {
        let session = Session::new();
        session.apply_option("complex off");
        let (_, errors) = eval_str(&session, "sqrt(-1)");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, reckon_core::codes::DOMAIN_ERROR);
    }

    #[test]
    fn test_timeout_leaves_partial_tree() {
        let clock = Arc::new(ManualClock::new());
        let session = Session::with_clock(clock.clone());
        let snapshot = session.snapshot();
        let names = session.symbol_names();
        let ctx = ParseContext {
            rates: &snapshot.rates,
            known_symbols: &names,
            limit_implicit: false,
        };
        // Enough nodes to guarantee several clock polls
        let source = (0..400).map(|i| i.to_string()).collect::<Vec<_>>().join(" + ");
        let (tokens, _) = crate::lexer::tokenize(&source, 10);
        let (stmt, _) = parse(&tokens, &ctx);
        let expr = match stmt {
            Statement::Expr(e) => e,
            other => panic!("expected expression, got {:?}", other),
        };

        let mut ev = Evaluator::new(&snapshot, &session.symbols, session.clock.as_ref(), Some(10));
        // Push the clock past the deadline before the first poll
        clock.advance(100);
        let reduced = ev.eval(&expr);
        assert!(ev.timed_out());
        assert!(ev.messages.iter().any(|m| m.code == reckon_core::codes::TIMEOUT));
        assert!(reduced.as_value().is_none(), "tree should be partially reduced");
    }

    #[test]
    fn test_currency_usage_flagged() {
        use reckon_units::ExchangeRate;
        let session = Session::new();
        let table = reckon_units::ExchangeRateTable::build(
            &[ExchangeRate {
                name: "USD".to_string(),
                value: "1.1".to_string(),
            }],
            0,
            false,
        )
        .unwrap();
        session.replace_rates(table);
        let snapshot = session.snapshot();
        let names = session.symbol_names();
        let ctx = ParseContext {
            rates: &snapshot.rates,
            known_symbols: &names,
            limit_implicit: false,
        };
        let (tokens, _) = crate::lexer::tokenize("10 USD to EUR", 10);
        let (stmt, errors) = parse(&tokens, &ctx);
        assert!(errors.is_empty(), "{:?}", errors);
        let expr = match stmt {
            Statement::Expr(e) => e,
            other => panic!("expected expression, got {:?}", other),
        };
        let mut ev = Evaluator::new(&snapshot, &session.symbols, session.clock.as_ref(), None);
        let reduced = ev.eval(&expr);
        assert!(ev.used_currency);
        match reduced.as_value() {
            Some(Value::Quantity(q)) => {
                assert_eq!(q.unit.symbol, "EUR");
                let f = q.value.to_f64().unwrap();
                assert!((f - 10.0 / 1.1).abs() < 1e-9);
            }
            other => panic!("expected quantity, got {:?}", other),
        }
    }
}
