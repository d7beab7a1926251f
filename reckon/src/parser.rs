//! Recursive descent parser
//!
//! Produces a `Statement` from a token stream. Binding strength, tightest
//! first: unit postfix, `^` (right-associative, right operand admits a
//! leading minus), unary minus, implicit multiplication, explicit `*`
//! and `/`, `+` and `-`, comparisons, `&&`, `||`, the `to` conversion,
//! and assignment. A leading `plot` keyword switches to the plot
//! mini-grammar.
//!
//! Parsing is best-effort: problems are accumulated as messages and the
//! offending subtree degrades to an error literal so the rest of the
//! expression still reduces.

use std::collections::HashSet;

use reckon_core::CalcError;
use reckon_units::{ExchangeRateTable, Unit, UNITS};

use crate::ast::{BinOp, Expr, UnOp};
use crate::lexer::Token;
use crate::value::Value;

/// A parsed statement, ready for the evaluator.
#[derive(Debug, Clone)]
pub enum Statement {
    Expr(Expr),
    Plot(PlotSpec),
}

/// Plot request: one or more curves over a shared domain.
#[derive(Debug, Clone)]
pub struct PlotSpec {
    pub exprs: Vec<Expr>,
    pub from: Option<Expr>,
    pub to: Option<Expr>,
    pub title: Option<String>,
}

/// Name resolution inputs the parser needs up front: symbols shadow
/// units of the same spelling, and currency codes come from the live
/// rate table.
pub struct ParseContext<'a> {
    pub rates: &'a ExchangeRateTable,
    pub known_symbols: &'a HashSet<String>,
    pub limit_implicit: bool,
}

/// Deeper nesting than this degrades to a syntax error; the parser's
/// own call stack must not scale with the input.
const MAX_NESTING: u32 = 256;

pub fn parse(tokens: &[Token], ctx: &ParseContext) -> (Statement, Vec<CalcError>) {
    let mut p = Parser {
        tokens,
        pos: 0,
        depth: 0,
        errors: Vec::new(),
        ctx,
        in_plot: false,
        gave_up: false,
    };
    let stmt = p.statement();
    if p.pos < p.tokens.len() {
        p.errors
            .push(CalcError::syntax("unexpected trailing input"));
    }
    (stmt, p.errors)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// Current recursion depth, bounded by `MAX_NESTING`
    depth: u32,
    errors: Vec<CalcError>,
    ctx: &'a ParseContext<'a>,
    /// Inside a plot statement `from`, `to`, and `title` are keywords
    in_plot: bool,
    /// Set when nesting gave up; suppresses cascading recovery errors
    gave_up: bool,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn bump(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn peek_ident(&self) -> Option<&str> {
        match self.peek() {
            Some(Token::Ident(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    fn error_expr(&mut self, err: CalcError) -> Expr {
        let expr = Expr::Literal(Value::Error(err.clone()));
        self.errors.push(err);
        expr
    }

    fn enter(&mut self) -> bool {
        if self.depth >= MAX_NESTING {
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Give up on overly nested input: consume the rest so recovery
    /// does not cascade, and degrade to a single syntax error.
    fn too_deep(&mut self) -> Expr {
        self.pos = self.tokens.len();
        self.gave_up = true;
        self.error_expr(CalcError::syntax("expression nests too deeply"))
    }

    fn expect_closing(&mut self, token: &Token, message: &str) {
        if !self.eat(token) && !self.gave_up {
            self.errors.push(CalcError::syntax(message));
        }
    }

    // ========== Statements ==========

    fn statement(&mut self) -> Statement {
        if self.tokens.is_empty() {
            return Statement::Expr(self.error_expr(CalcError::syntax("empty expression")));
        }
        if self.peek_ident() == Some("plot") {
            self.pos += 1;
            return Statement::Plot(self.plot_spec());
        }
        // `name := expr`
        if let (Some(Token::Ident(name)), Some(Token::Assign)) = (self.peek(), self.peek_at(1)) {
            let name = name.clone();
            self.pos += 2;
            let rhs = self.conversion();
            return Statement::Expr(Expr::Assign(name, Box::new(rhs)));
        }
        Statement::Expr(self.conversion())
    }

    fn plot_spec(&mut self) -> PlotSpec {
        self.in_plot = true;
        let mut exprs = vec![self.conversion()];
        while self.eat(&Token::Comma) {
            exprs.push(self.conversion());
        }
        let mut from = None;
        let mut to = None;
        if self.peek_ident() == Some("from") {
            self.pos += 1;
            from = Some(self.or_expr());
            if self.peek_ident() == Some("to") {
                self.pos += 1;
                to = Some(self.or_expr());
            } else {
                self.errors
                    .push(CalcError::syntax("plot range needs \"to\" after \"from\""));
            }
        }
        let mut title = None;
        if self.peek_ident() == Some("title") {
            self.pos += 1;
            match self.bump() {
                Some(Token::Str(s)) => title = Some(s.clone()),
                Some(Token::Ident(s)) => title = Some(s.clone()),
                _ => self
                    .errors
                    .push(CalcError::syntax("plot title needs a string")),
            }
        }
        self.in_plot = false;
        PlotSpec {
            exprs,
            from,
            to,
            title,
        }
    }

    // ========== Expression ladder ==========

    /// `expr to unit` conversion, chainable
    fn conversion(&mut self) -> Expr {
        if !self.enter() {
            return self.too_deep();
        }
        let expr = self.conversion_inner();
        self.leave();
        expr
    }

    fn conversion_inner(&mut self) -> Expr {
        let mut lhs = self.or_expr();
        while !self.in_plot_bound() && self.peek_ident() == Some("to") {
            self.pos += 1;
            match self.unit_expr() {
                Some(unit) => lhs = Expr::Convert(Box::new(lhs), unit),
                None => {
                    lhs = self.error_expr(CalcError::syntax(
                        "expected a unit after \"to\"",
                    ));
                }
            }
        }
        lhs
    }

    /// In plot mode the `from` bound ends at the `to` keyword, so the
    /// conversion operator is unavailable there.
    fn in_plot_bound(&self) -> bool {
        self.in_plot
    }

    fn or_expr(&mut self) -> Expr {
        let mut lhs = self.and_expr();
        while self.eat(&Token::Or) {
            let rhs = self.and_expr();
            lhs = Expr::binary(BinOp::Or, lhs, rhs);
        }
        lhs
    }

    fn and_expr(&mut self) -> Expr {
        let mut lhs = self.comparison();
        while self.eat(&Token::And) {
            let rhs = self.comparison();
            lhs = Expr::binary(BinOp::And, lhs, rhs);
        }
        lhs
    }

    fn comparison(&mut self) -> Expr {
        let mut lhs = self.additive();
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => BinOp::Eq,
                Some(Token::Ne) => BinOp::Ne,
                Some(Token::Lt) => BinOp::Lt,
                Some(Token::Gt) => BinOp::Gt,
                Some(Token::Le) => BinOp::Le,
                Some(Token::Ge) => BinOp::Ge,
                _ => return lhs,
            };
            self.pos += 1;
            let rhs = self.additive();
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn additive(&mut self) -> Expr {
        let mut lhs = self.multiplicative();
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return lhs,
            };
            self.pos += 1;
            let rhs = self.multiplicative();
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn multiplicative(&mut self) -> Expr {
        let mut lhs = self.implicit();
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => return lhs,
            };
            self.pos += 1;
            let rhs = self.implicit();
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    /// Juxtaposition: `2x`, `2(3+4)`, `5 m`. A unit operand attaches to
    /// the accumulated expression instead of multiplying it.
    fn implicit(&mut self) -> Expr {
        let mut lhs = self.unary();
        let lhs_is_number = matches!(lhs, Expr::Literal(Value::Number(_)));
        let mut first = true;
        loop {
            // Unit attachment is always allowed; general juxtaposition
            // can be restricted to the number-times-operand form.
            match self.peek_operand_kind() {
                OperandKind::Unit => {
                    let unit = match self.unit_atom() {
                        Some(u) => u,
                        None => break,
                    };
                    lhs = Expr::WithUnit(Box::new(lhs), unit);
                }
                OperandKind::Other => {
                    if self.ctx.limit_implicit && !(first && lhs_is_number) {
                        break;
                    }
                    let rhs = self.unary_no_minus();
                    lhs = Expr::binary(BinOp::Mul, lhs, rhs);
                }
                OperandKind::None => break,
            }
            first = false;
        }
        lhs
    }

    fn peek_operand_kind(&self) -> OperandKind {
        match self.peek() {
            Some(Token::Number(_)) | Some(Token::LParen) | Some(Token::LBracket) => {
                OperandKind::Other
            }
            Some(Token::Ident(name)) => {
                if self.is_keyword(name) {
                    OperandKind::None
                } else if self.ctx.known_symbols.contains(name.as_str())
                    || self.peek_at(1) == Some(&Token::LParen)
                {
                    OperandKind::Other
                } else if self.resolve_unit(name).is_some() {
                    OperandKind::Unit
                } else {
                    OperandKind::Other
                }
            }
            _ => OperandKind::None,
        }
    }

    fn is_keyword(&self, name: &str) -> bool {
        name == "to" || (self.in_plot && (name == "from" || name == "title"))
    }

    fn unary(&mut self) -> Expr {
        if !self.enter() {
            return self.too_deep();
        }
        let expr = match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Expr::unary(UnOp::Neg, self.unary())
            }
            Some(Token::Not) => {
                self.pos += 1;
                Expr::unary(UnOp::Not, self.unary())
            }
            _ => self.power(),
        };
        self.leave();
        expr
    }

    /// Operand inside a juxtaposition chain; a leading minus there would
    /// have been subtraction, so it never reaches this point.
    fn unary_no_minus(&mut self) -> Expr {
        self.power()
    }

    fn power(&mut self) -> Expr {
        if !self.enter() {
            return self.too_deep();
        }
        let expr = self.power_inner();
        self.leave();
        expr
    }

    fn power_inner(&mut self) -> Expr {
        let base = self.postfix();
        if self.eat(&Token::Caret) {
            // Right-associative, exponent admits a leading minus
            let exp = if self.eat(&Token::Minus) {
                Expr::unary(UnOp::Neg, self.power())
            } else {
                self.power()
            };
            return Expr::binary(BinOp::Pow, base, exp);
        }
        base
    }

    /// Primary followed by unit postfixes, so `2 m` and `(1+1) s` bind
    /// before exponentiation of the whole quantity.
    fn postfix(&mut self) -> Expr {
        let mut expr = self.primary();
        while matches!(self.peek_operand_kind(), OperandKind::Unit) {
            match self.unit_atom() {
                Some(unit) => expr = Expr::WithUnit(Box::new(expr), unit),
                None => break,
            }
        }
        expr
    }

    fn primary(&mut self) -> Expr {
        match self.bump().cloned() {
            Some(Token::Number(n)) => Expr::literal(n),
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    let mut args = Vec::new();
                    if self.peek() != Some(&Token::RParen) {
                        args.push(self.conversion());
                        while self.eat(&Token::Comma) {
                            args.push(self.conversion());
                        }
                    }
                    self.expect_closing(&Token::RParen, "missing closing parenthesis");
                    Expr::Call(name, args)
                } else {
                    Expr::Symbol(name)
                }
            }
            Some(Token::LParen) => {
                let inner = self.conversion();
                self.expect_closing(&Token::RParen, "missing closing parenthesis");
                inner
            }
            Some(Token::LBracket) => self.bracket_literal(),
            Some(t) => self.error_expr(CalcError::syntax(format!(
                "unexpected token {:?}",
                t
            ))),
            None => self.error_expr(CalcError::syntax("unexpected end of expression")),
        }
    }

    /// `[1, 2, 3]` is a vector; semicolons split rows: `[1, 2; 3, 4]`.
    /// Nested brackets also form a matrix: `[[1, 2], [3, 4]]`.
    fn bracket_literal(&mut self) -> Expr {
        if self.peek() == Some(&Token::LBracket) {
            let mut rows = Vec::new();
            loop {
                if !self.eat(&Token::LBracket) {
                    break;
                }
                rows.push(self.element_list(&Token::RBracket));
                self.expect_closing(&Token::RBracket, "missing \"]\"");
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect_closing(&Token::RBracket, "missing \"]\"");
            return Expr::Matrix(rows);
        }

        let mut rows = vec![self.element_list_row()];
        while self.eat(&Token::Semicolon) {
            rows.push(self.element_list_row());
        }
        self.expect_closing(&Token::RBracket, "missing \"]\"");
        if rows.len() == 1 {
            Expr::Vector(rows.remove(0))
        } else {
            Expr::Matrix(rows)
        }
    }

    fn element_list_row(&mut self) -> Vec<Expr> {
        let mut elems = vec![self.conversion()];
        while self.eat(&Token::Comma) {
            elems.push(self.conversion());
        }
        elems
    }

    fn element_list(&mut self, terminator: &Token) -> Vec<Expr> {
        let mut elems = Vec::new();
        if self.peek() == Some(terminator) {
            return elems;
        }
        elems.push(self.conversion());
        while self.eat(&Token::Comma) {
            elems.push(self.conversion());
        }
        elems
    }

    // ========== Units ==========

    fn resolve_unit(&self, name: &str) -> Option<Unit> {
        if self.ctx.known_symbols.contains(name) {
            return None;
        }
        if let Some(unit) = UNITS.resolve(name) {
            return Some(unit.clone());
        }
        self.ctx
            .rates
            .resolve(name)
            .or_else(|| self.ctx.rates.resolve(&name.to_ascii_uppercase()))
    }

    /// One unit with optional integer exponent: `m`, `m^2`, `s^-1`
    fn unit_atom(&mut self) -> Option<Unit> {
        let name = self.peek_ident()?.to_string();
        let mut unit = self.resolve_unit(&name)?;
        self.pos += 1;
        if self.peek() == Some(&Token::Caret) {
            if let Some(exp) = self.peek_unit_exponent(1) {
                self.pos += if exp < 0 { 3 } else { 2 };
                match unit.power(exp) {
                    Ok(u) => unit = u,
                    Err(e) => self.errors.push(e),
                }
            }
        }
        Some(unit)
    }

    /// Exponent after a caret at `offset` tokens ahead, if it is a
    /// small integer literal (optionally negated)
    fn peek_unit_exponent(&self, offset: usize) -> Option<i32> {
        let negated = matches!(self.peek_at(offset), Some(Token::Minus));
        let tok = if negated {
            self.peek_at(offset + 1)
        } else {
            self.peek_at(offset)
        };
        match tok {
            Some(Token::Number(n)) if n.is_integer() => {
                let v = n.to_i64()?;
                let v = i32::try_from(v).ok()?;
                Some(if negated { -v } else { v })
            }
            _ => None,
        }
    }

    /// Compound unit target for `to`: atoms joined with `*`, `/`, or
    /// juxtaposition, with optional parentheses
    fn unit_expr(&mut self) -> Option<Unit> {
        if !self.enter() {
            self.too_deep();
            return None;
        }
        let unit = self.unit_expr_inner();
        self.leave();
        unit
    }

    fn unit_expr_inner(&mut self) -> Option<Unit> {
        let mut unit = self.unit_factor()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    let rhs = self.unit_factor()?;
                    unit = unit.multiply(&rhs);
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let rhs = self.unit_factor()?;
                    match unit.divide(&rhs) {
                        Ok(u) => unit = u,
                        Err(e) => {
                            self.errors.push(e);
                            return None;
                        }
                    }
                }
                Some(Token::Ident(name)) if self.resolve_unit(name).is_some() => {
                    let rhs = self.unit_factor()?;
                    unit = unit.multiply(&rhs);
                }
                _ => return Some(unit),
            }
        }
    }

    fn unit_factor(&mut self) -> Option<Unit> {
        if self.eat(&Token::LParen) {
            let unit = self.unit_expr()?;
            self.expect_closing(&Token::RParen, "missing closing parenthesis");
            return Some(unit);
        }
        self.unit_atom()
    }
}

enum OperandKind {
    /// Identifier that resolves to a unit and is not shadowed
    Unit,
    /// Any other operand start
    Other,
    None,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_str(input: &str) -> (Statement, Vec<CalcError>) {
        let rates = ExchangeRateTable::new();
        let mut symbols = HashSet::new();
        for s in ["pi", "π", "e", "x", "y", "ans"] {
            symbols.insert(s.to_string());
        }
        let ctx = ParseContext {
            rates: &rates,
            known_symbols: &symbols,
            limit_implicit: false,
        };
        let (tokens, mut errors) = tokenize(input, 10);
        let (stmt, parse_errors) = parse(&tokens, &ctx);
        errors.extend(parse_errors);
        (stmt, errors)
    }

    fn parse_expr(input: &str) -> Expr {
        match parse_str(input) {
            (Statement::Expr(e), errors) => {
                assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
                e
            }
            (other, _) => panic!("expected expression, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence_mul_over_add() {
        let e = parse_expr("1 + 2 * 3");
        match e {
            Expr::Binary(BinOp::Add, _, rhs) => {
                assert!(matches!(*rhs, Expr::Binary(BinOp::Mul, _, _)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_unary_minus_looser_than_power() {
        // -2^2 parses as -(2^2)
        let e = parse_expr("-2^2");
        match e {
            Expr::Unary(UnOp::Neg, inner) => {
                assert!(matches!(*inner, Expr::Binary(BinOp::Pow, _, _)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_power_right_associative() {
        let e = parse_expr("2^3^2");
        match e {
            Expr::Binary(BinOp::Pow, _, rhs) => {
                assert!(matches!(*rhs, Expr::Binary(BinOp::Pow, _, _)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_negative_exponent() {
        // 2^-2 keeps the minus inside the exponent
        let e = parse_expr("2^-2");
        match e {
            Expr::Binary(BinOp::Pow, _, rhs) => {
                assert!(matches!(*rhs, Expr::Unary(UnOp::Neg, _)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_implicit_multiplication_binds_looser_than_power() {
        // 2x^2 is 2*(x^2)
        let e = parse_expr("2x^2");
        match e {
            Expr::Binary(BinOp::Mul, lhs, rhs) => {
                assert!(matches!(*lhs, Expr::Literal(_)));
                assert!(matches!(*rhs, Expr::Binary(BinOp::Pow, _, _)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_unit_postfix() {
        let e = parse_expr("5 mm");
        match e {
            Expr::WithUnit(_, unit) => assert_eq!(unit.symbol, "mm"),
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_unit_with_exponent() {
        let e = parse_expr("2 m^2");
        match e {
            Expr::WithUnit(_, unit) => assert_eq!(unit.symbol, "m^2"),
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_conversion_operator() {
        let e = parse_expr("1 mi to km");
        match e {
            Expr::Convert(inner, unit) => {
                assert_eq!(unit.symbol, "km");
                assert!(matches!(*inner, Expr::WithUnit(_, _)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_compound_conversion_target() {
        let e = parse_expr("20 m/s to km/h");
        match e {
            Expr::Convert(_, unit) => assert_eq!(unit.symbol, "km/h"),
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_assignment() {
        let (stmt, errors) = parse_str("x := 2 + 3");
        assert!(errors.is_empty());
        match stmt {
            Statement::Expr(Expr::Assign(name, _)) => assert_eq!(name, "x"),
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_function_call() {
        let e = parse_expr("sin(x)");
        match e {
            Expr::Call(name, args) => {
                assert_eq!(name, "sin");
                assert_eq!(args.len(), 1);
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_plot_statement() {
        let (stmt, errors) = parse_str("plot sin(x), cos(x) from 0 to 6.28 title \"waves\"");
        assert!(errors.is_empty(), "{:?}", errors);
        match stmt {
            Statement::Plot(spec) => {
                assert_eq!(spec.exprs.len(), 2);
                assert!(spec.from.is_some());
                assert!(spec.to.is_some());
                assert_eq!(spec.title.as_deref(), Some("waves"));
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_plot_defaults() {
        let (stmt, errors) = parse_str("plot x^2");
        assert!(errors.is_empty());
        match stmt {
            Statement::Plot(spec) => {
                assert_eq!(spec.exprs.len(), 1);
                assert!(spec.from.is_none());
                assert!(spec.title.is_none());
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_vector_literal() {
        let e = parse_expr("[1, 2, 3]");
        match e {
            Expr::Vector(elems) => assert_eq!(elems.len(), 3),
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_matrix_literal() {
        let e = parse_expr("[1, 2; 3, 4]");
        match e {
            Expr::Matrix(rows) => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0].len(), 2);
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_limited_implicit_multiplication() {
        let rates = ExchangeRateTable::new();
        let mut symbols = HashSet::new();
        symbols.insert("x".to_string());
        symbols.insert("y".to_string());
        let ctx = ParseContext {
            rates: &rates,
            known_symbols: &symbols,
            limit_implicit: true,
        };
        // number-times-symbol still works
        let (tokens, _) = tokenize("2x", 10);
        let (stmt, errors) = parse(&tokens, &ctx);
        assert!(errors.is_empty());
        assert!(matches!(
            stmt,
            Statement::Expr(Expr::Binary(BinOp::Mul, _, _))
        ));
        // symbol-times-symbol does not
        let (tokens, _) = tokenize("x y", 10);
        let (_, errors) = parse(&tokens, &ctx);
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_unbalanced_paren_recovers() {
        let (stmt, errors) = parse_str("(1 + 2");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            stmt,
            Statement::Expr(Expr::Binary(BinOp::Add, _, _))
        ));
    }

    #[test]
    fn test_excessive_nesting_degrades_to_syntax_error() {
        let source = format!("{}1{}", "(".repeat(4000), ")".repeat(4000));
        let (stmt, errors) = parse_str(&source);
        assert_eq!(errors.len(), 1, "{:?}", errors);
        assert_eq!(errors[0].code, reckon_core::codes::SYNTAX_ERROR);
        assert!(errors[0].message.contains("nests"), "{}", errors[0].message);
        assert!(matches!(
            stmt,
            Statement::Expr(Expr::Literal(Value::Error(_)))
        ));
    }

    #[test]
    fn test_moderate_nesting_parses() {
        let source = format!("{}1 + 1{}", "(".repeat(40), ")".repeat(40));
        let e = parse_expr(&source);
        assert!(matches!(e, Expr::Binary(BinOp::Add, _, _)));
    }

    #[test]
    fn test_empty_input() {
        let (stmt, errors) = parse_str("");
        assert!(!errors.is_empty());
        match stmt {
            Statement::Expr(Expr::Literal(Value::Error(_))) => {}
            other => panic!("unexpected statement: {:?}", other),
        }
    }
}
