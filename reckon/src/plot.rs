//! Plot-data sampling
//!
//! Samples each requested curve over the shared domain and packages the
//! points with a gnuplot command preamble. Curves are sampled on scoped
//! threads so a multi-curve request costs roughly one curve's time.
//! Points where the expression fails to reduce to a real number are
//! skipped rather than reported.

use std::collections::BTreeMap;
use std::thread;

use reckon_core::{CalcError, Clock, Number};
use serde::Serialize;

use crate::ast::Expr;
use crate::eval::Evaluator;
use crate::parser::PlotSpec;
use crate::session::Snapshot;
use crate::symbols::SymbolTable;
use crate::value::Value;

/// Samples per curve, endpoints included.
const SAMPLE_COUNT: usize = 101;

/// The sampling variable every curve expression is evaluated against.
const PLOT_VARIABLE: &str = "x";

/// Time budget shared by every point of every curve in one request.
#[derive(Clone, Copy)]
struct Budget {
    started_ms: u64,
    deadline_ms: Option<u64>,
}

impl Budget {
    fn exhausted(&self, now_ms: u64) -> bool {
        self.deadline_ms.is_some_and(|d| now_ms >= d)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlotData {
    /// gnuplot command preamble, one command per line
    pub commands: String,
    /// curve id ("curve1", ...) to "x y" sample lines
    pub data: BTreeMap<String, String>,
}

pub fn sample(
    spec: &PlotSpec,
    snapshot: &Snapshot,
    symbols: &SymbolTable,
    clock: &dyn Clock,
    timeout_ms: Option<u64>,
) -> (PlotData, Vec<CalcError>) {
    let mut messages = Vec::new();

    // One deadline for the whole request; every point of every curve
    // draws on the same budget.
    let started_ms = clock.now_ms();
    let budget = Budget {
        started_ms,
        deadline_ms: timeout_ms.map(|t| started_ms.saturating_add(t)),
    };

    let from = bound(spec.from.as_ref(), 0, snapshot, symbols, clock, &mut messages);
    let to = bound(spec.to.as_ref(), 10, snapshot, symbols, clock, &mut messages);
    if from.compare(&to) != std::cmp::Ordering::Less {
        messages.push(CalcError::domain("plot range is empty"));
        return (PlotData::default(), messages);
    }
    let span = to.sub(&from);

    let mut data = BTreeMap::new();
    let results: Vec<(String, String, Vec<CalcError>)> = thread::scope(|scope| {
        let handles: Vec<_> = spec
            .exprs
            .iter()
            .enumerate()
            .map(|(i, expr)| {
                let from = from.clone();
                let span = span.clone();
                scope.spawn(move || {
                    let id = format!("curve{}", i + 1);
                    let (lines, errors) =
                        sample_curve(expr, &from, &span, snapshot, symbols, clock, budget);
                    (id, lines, errors)
                })
            })
            .collect();
        handles
            .into_iter()
            .filter_map(|h| h.join().ok())
            .collect()
    });
    for (id, lines, errors) in results {
        messages.extend(errors);
        data.insert(id, lines);
    }
    // Curves share one budget, so report its exhaustion once
    let mut timeouts = 0;
    messages.retain(|m| {
        if m.code == reckon_core::codes::TIMEOUT {
            timeouts += 1;
            timeouts == 1
        } else {
            true
        }
    });

    let commands = commands_for(spec, &data);
    (PlotData { commands, data }, messages)
}

fn bound(
    expr: Option<&Expr>,
    default: i64,
    snapshot: &Snapshot,
    symbols: &SymbolTable,
    clock: &dyn Clock,
    messages: &mut Vec<CalcError>,
) -> Number {
    let Some(expr) = expr else {
        return Number::from_i64(default);
    };
    let mut ev = Evaluator::new(snapshot, symbols, clock, None);
    let reduced = ev.eval(expr);
    messages.extend(ev.messages);
    match reduced.as_value() {
        Some(Value::Number(n)) => n.clone(),
        _ => {
            messages.push(CalcError::domain("plot range bound is not a number"));
            Number::from_i64(default)
        }
    }
}

fn sample_curve(
    expr: &Expr,
    from: &Number,
    span: &Number,
    snapshot: &Snapshot,
    symbols: &SymbolTable,
    clock: &dyn Clock,
    budget: Budget,
) -> (String, Vec<CalcError>) {
    let mut lines = String::new();
    let mut errors = Vec::new();
    let steps = Number::from_i64((SAMPLE_COUNT - 1) as i64);
    let mut scope = snapshot.clone();

    for i in 0..SAMPLE_COUNT {
        // Cheap expressions never trip the evaluator's step-counted
        // poll, so the deadline is also checked per point.
        if budget.deadline_ms.is_some() {
            let now = clock.now_ms();
            if budget.exhausted(now) {
                errors.push(CalcError::timeout(now.saturating_sub(budget.started_ms)));
                break;
            }
        }

        // x = from + span * i / (SAMPLE_COUNT - 1), kept exact
        let offset = match span
            .mul(&Number::from_i64(i as i64))
            .checked_div(&steps)
        {
            Ok(o) => o,
            Err(e) => {
                errors.push(e.into());
                break;
            }
        };
        let x = from.add(&offset);
        scope
            .variables
            .insert(PLOT_VARIABLE.to_string(), Value::Number(x.clone()));

        let mut ev = Evaluator::with_deadline(
            &scope,
            symbols,
            clock,
            budget.started_ms,
            budget.deadline_ms,
        );
        let reduced = ev.eval(expr);
        if ev.timed_out() {
            errors.extend(ev.messages);
            break;
        }
        let y = match reduced.as_value() {
            Some(Value::Number(n)) => n.clone(),
            Some(Value::Quantity(q)) if q.is_dimensionless() => q.unit.to_base(&q.value),
            // Undefined at this point (pole, domain edge): skip it
            _ => continue,
        };
        let (Some(xf), Some(yf)) = (x.to_f64(), y.to_f64()) else {
            continue;
        };
        if !yf.is_finite() {
            continue;
        }
        lines.push_str(&format!("{} {}\n", xf, yf));
    }
    (lines, errors)
}

fn commands_for(spec: &PlotSpec, data: &BTreeMap<String, String>) -> String {
    let mut commands = String::new();
    if let Some(title) = &spec.title {
        commands.push_str(&format!("set title \"{}\"\n", title.replace('"', "\\\"")));
    }
    let plots: Vec<String> = data
        .keys()
        .map(|id| format!("'-' title '{}' with lines", id))
        .collect();
    if !plots.is_empty() {
        commands.push_str(&format!("plot {}\n", plots.join(", ")));
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, ParseContext, Statement};
    use crate::session::Session;

    fn plot_spec(session: &Session, input: &str) -> PlotSpec {
        let snapshot = session.snapshot();
        let names = session.symbol_names();
        let ctx = ParseContext {
            rates: &snapshot.rates,
            known_symbols: &names,
            limit_implicit: false,
        };
        let (tokens, errors) = crate::lexer::tokenize(input, 10);
        assert!(errors.is_empty(), "{:?}", errors);
        let (stmt, errors) = parse(&tokens, &ctx);
        assert!(errors.is_empty(), "{:?}", errors);
        match stmt {
            Statement::Plot(spec) => spec,
            other => panic!("expected plot, got {:?}", other),
        }
    }

    #[test]
    fn test_default_domain_and_sample_count() {
        let session = Session::new();
        let spec = plot_spec(&session, "plot x");
        let snapshot = session.snapshot();
        let (data, messages) =
            sample(&spec, &snapshot, &session.symbols, session.clock.as_ref(), None);
        assert!(messages.is_empty(), "{:?}", messages);
        let curve = data.data.get("curve1").unwrap();
        let lines: Vec<&str> = curve.lines().collect();
        assert_eq!(lines.len(), SAMPLE_COUNT);
        assert!(lines[0].starts_with("0 "));
        assert!(lines.last().unwrap().starts_with("10 "));
    }

    #[test]
    fn test_explicit_domain() {
        let session = Session::new();
        let spec = plot_spec(&session, "plot x^2 from -1 to 1");
        let snapshot = session.snapshot();
        let (data, messages) =
            sample(&spec, &snapshot, &session.symbols, session.clock.as_ref(), None);
        assert!(messages.is_empty(), "{:?}", messages);
        let curve = data.data.get("curve1").unwrap();
        assert!(curve.lines().next().unwrap().starts_with("-1 "));
    }

    #[test]
    fn test_undefined_points_skipped() {
        // 1/x is undefined at x = 0, which is a sample point of the
        // default domain
        let session = Session::new();
        let spec = plot_spec(&session, "plot 1/x");
        let snapshot = session.snapshot();
        let (data, _) =
            sample(&spec, &snapshot, &session.symbols, session.clock.as_ref(), None);
        let curve = data.data.get("curve1").unwrap();
        assert_eq!(curve.lines().count(), SAMPLE_COUNT - 1);
    }

    #[test]
    fn test_multiple_curves_and_title() {
        let session = Session::new();
        let spec = plot_spec(&session, "plot sin(x), cos(x) from 0 to 6 title \"waves\"");
        let snapshot = session.snapshot();
        let (data, messages) =
            sample(&spec, &snapshot, &session.symbols, session.clock.as_ref(), None);
        assert!(messages.is_empty(), "{:?}", messages);
        assert_eq!(data.data.len(), 2);
        assert!(data.data.contains_key("curve1"));
        assert!(data.data.contains_key("curve2"));
        assert!(data.commands.contains("set title \"waves\""));
        assert!(data.commands.contains("'-' title 'curve1' with lines"));
    }

    /// Clock that jumps forward one millisecond per read.
    struct TickingClock {
        now: std::sync::atomic::AtomicU64,
    }

    impl reckon_core::Clock for TickingClock {
        fn now_ms(&self) -> u64 {
            self.now
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
        }
    }

    #[test]
    fn test_budget_spans_points_and_curves() {
        use std::sync::Arc;
        let clock = Arc::new(TickingClock {
            now: std::sync::atomic::AtomicU64::new(0),
        });
        let session = Session::with_clock(clock);
        let spec = plot_spec(&session, "plot x + 1, x + 2");
        let snapshot = session.snapshot();
        let (data, messages) = sample(
            &spec,
            &snapshot,
            &session.symbols,
            session.clock.as_ref(),
            Some(3),
        );
        // The tiny budget runs out after a few samples, well short of a
        // full curve, and its exhaustion is reported exactly once
        let timeouts = messages
            .iter()
            .filter(|m| m.code == reckon_core::codes::TIMEOUT)
            .count();
        assert_eq!(timeouts, 1, "{:?}", messages);
        let curve = data.data.get("curve1").unwrap();
        assert!(
            curve.lines().count() < SAMPLE_COUNT,
            "expected a truncated curve"
        );
    }

    #[test]
    fn test_empty_range_rejected() {
        let session = Session::new();
        let spec = plot_spec(&session, "plot x from 5 to 5");
        let snapshot = session.snapshot();
        let (data, messages) =
            sample(&spec, &snapshot, &session.symbols, session.clock.as_ref(), None);
        assert!(data.data.is_empty());
        assert_eq!(messages.len(), 1);
    }
}
