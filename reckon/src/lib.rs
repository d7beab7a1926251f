//! Reckon - single-expression calculation engine
//!
//! One `Calculator` owns a session (settings, user variables, currency
//! rates) and evaluates one expression per call: arithmetic that stays
//! exact as long as it can, unit and currency conversion, comparisons,
//! plot-data sampling, all under a cooperative time budget. Results
//! carry lightweight markup (`<sup>`, `<i>`) and a list of messages;
//! failed subexpressions render as "undefined" instead of aborting.

mod ast;
mod config;
mod eval;
mod lexer;
mod parser;
mod plot;
mod render;
mod session;
mod symbols;
mod value;

pub use ast::{BinOp, Expr, UnOp};
pub use config::{AngleUnit, Settings};
pub use plot::PlotData;
pub use symbols::SymbolInfo;
pub use value::Value;

pub use reckon_core::{CalcError, Clock, ManualClock, Severity, SystemClock};
pub use reckon_units::{ExchangeRate, ExchangeRateTable, BASE_CURRENCY, STALE_AFTER_MS};

use std::sync::Arc;

use reckon_core::Number;
use serde::Serialize;
use tracing::{debug, warn};

use eval::Evaluator;
use parser::{parse, ParseContext, Statement};
use session::Session;

/// Reasonable time budget for interactive callers.
pub const DEFAULT_TIMEOUT_MS: u64 = 500;

/// Engine API version, bumped on incompatible result-shape changes.
pub const API_VERSION: u32 = 1;

const MS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

/// Inputs longer than this are rejected up front; rendering depth and
/// parse-tree size stay proportional to the token count.
const MAX_TOKENS: usize = 8192;

/// Outcome of one calculation.
#[derive(Debug, Clone, Serialize)]
pub struct CalculationResult {
    /// The parsed input, echoed back in markup
    pub input: String,
    /// The reduced result in markup; "undefined" for error values
    pub output: String,
    /// Severity-prefixed messages ("Error: ...", "Warning: ...")
    pub messages: Vec<String>,
    /// Present only for plot statements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_data: Option<PlotData>,
}

/// Thread-safe calculation engine. Cheap to share behind an `Arc`;
/// every `calculate` call runs against a snapshot of the session, so
/// concurrent option changes never affect a calculation in flight.
pub struct Calculator {
    session: Session,
}

impl Calculator {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    /// Inject a clock; used to make time-dependent behavior
    /// (timeouts, rate staleness) deterministic.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let session = Session::with_clock(clock);
        session.set_variable("ans", Value::Number(Number::zero()));
        Calculator { session }
    }

    /// Evaluate one expression. `timeout_ms` of 0 disables the budget;
    /// `option_flags` is reserved for per-call overrides and currently
    /// ignored.
    pub fn calculate(&self, text: &str, timeout_ms: u64, option_flags: i32) -> CalculationResult {
        let _ = option_flags;
        debug!(input = %text, timeout_ms, "calculate");
        let timeout = if timeout_ms == 0 {
            None
        } else {
            Some(timeout_ms)
        };
        let snapshot = self.session.snapshot();
        let names = self.session.symbol_names();
        let ctx = ParseContext {
            rates: &snapshot.rates,
            known_symbols: &names,
            limit_implicit: snapshot.settings.limit_implicit_mult,
        };

        let (tokens, mut errors) = lexer::tokenize(text, snapshot.settings.base);
        if tokens.len() > MAX_TOKENS {
            let err = CalcError::syntax(format!(
                "expression too long ({} tokens, limit {})",
                tokens.len(),
                MAX_TOKENS
            ));
            return CalculationResult {
                input: text.trim().to_string(),
                output: "undefined".to_string(),
                messages: vec![err.to_message()],
                plot_data: None,
            };
        }
        let (stmt, parse_errors) = parse(&tokens, &ctx);
        errors.extend(parse_errors);

        let result = match stmt {
            Statement::Expr(expr) => self.run_expr(&expr, &snapshot, timeout, errors),
            Statement::Plot(spec) => self.run_plot(text, &spec, &snapshot, timeout, errors),
        };
        debug!(output = %result.output, messages = result.messages.len(), "calculated");
        result
    }

    fn run_expr(
        &self,
        expr: &Expr,
        snapshot: &session::Snapshot,
        timeout: Option<u64>,
        mut errors: Vec<CalcError>,
    ) -> CalculationResult {
        let input = render::render_expr(expr, &snapshot.settings);

        let mut ev = Evaluator::new(
            snapshot,
            &self.session.symbols,
            self.session.clock.as_ref(),
            timeout,
        );
        let reduced = ev.eval(expr);
        let used_currency = ev.used_currency;
        errors.extend(ev.messages);
        for (name, value) in ev.assignments {
            self.session.set_variable(&name, value);
        }

        if used_currency {
            if let Some(warning) = self.staleness_warning(snapshot) {
                errors.push(warning);
            }
        }

        let output = match reduced.as_value() {
            Some(v) => {
                if !matches!(v, Value::Error(_)) {
                    self.session.set_variable("ans", v.clone());
                }
                render::render_value(v, &snapshot.settings)
            }
            None => render::render_expr(&reduced, &snapshot.settings),
        };

        CalculationResult {
            input,
            output,
            messages: errors.iter().map(|e| e.to_message()).collect(),
            plot_data: None,
        }
    }

    fn run_plot(
        &self,
        text: &str,
        spec: &parser::PlotSpec,
        snapshot: &session::Snapshot,
        timeout: Option<u64>,
        mut errors: Vec<CalcError>,
    ) -> CalculationResult {
        let (data, plot_errors) = plot::sample(
            spec,
            snapshot,
            &self.session.symbols,
            self.session.clock.as_ref(),
            timeout,
        );
        errors.extend(plot_errors);
        CalculationResult {
            input: text.trim().to_string(),
            output: String::new(),
            messages: errors.iter().map(|e| e.to_message()).collect(),
            plot_data: Some(data),
        }
    }

    /// A warning the first time a calculation touches currency with a
    /// rate table past its staleness threshold.
    fn staleness_warning(&self, snapshot: &session::Snapshot) -> Option<CalcError> {
        let now = self.session.clock.now_ms();
        if !snapshot.rates.is_stale(now) {
            return None;
        }
        let age_days = snapshot
            .rates
            .updated_at_ms()
            .map(|t| now.saturating_sub(t) / MS_PER_DAY)
            .unwrap_or(0);
        self.session.mark_stale_warned();
        Some(CalcError::stale_rates(age_days))
    }

    /// Replace the exchange rate table. Returns false (keeping the old
    /// table) when `base` is unsupported or the rates fail validation.
    pub fn update_currency_values(
        &self,
        rates: &[ExchangeRate],
        base: &str,
        show_warning: bool,
    ) -> bool {
        if base != BASE_CURRENCY {
            warn!(base, "unsupported base currency in rate update");
            return false;
        }
        let now = self.session.clock.now_ms();
        match ExchangeRateTable::build(rates, now, show_warning) {
            Ok(table) => {
                debug!(count = rates.len(), "exchange rates replaced");
                self.session.replace_rates(table);
                true
            }
            Err(err) => {
                warn!(code = %err.code, message = %err.message, "rejected exchange rate update");
                false
            }
        }
    }

    /// Builtin constants and functions plus user variables, sorted by name.
    pub fn get_variables(&self) -> Vec<SymbolInfo> {
        let mut infos = self.session.symbols.list_constants();
        infos.extend(self.session.symbols.list_functions());
        for name in self.session.variable_names() {
            let description = self
                .session
                .variable(&name)
                .map(|v| render::render_value(&v, &self.session.settings()))
                .unwrap_or_default();
            infos.push(SymbolInfo {
                name,
                description,
                aliases: Vec::new(),
            });
        }
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Apply a settings command like "angle degrees". Returns false and
    /// changes nothing for unknown names or invalid values.
    pub fn set_option(&self, command: &str) -> bool {
        let applied = self.session.apply_option(command);
        if !applied {
            warn!(command, "rejected option command");
        }
        applied
    }

    pub fn settings(&self) -> Settings {
        self.session.settings()
    }

    /// Currency codes the current rate table can convert.
    pub fn currencies(&self) -> Vec<String> {
        self.session.rates().codes()
    }

    pub fn version() -> u32 {
        API_VERSION
    }

    pub fn info(&self) -> String {
        format!(
            "reckon {} (api {}, base currency {})",
            env!("CARGO_PKG_VERSION"),
            API_VERSION,
            BASE_CURRENCY
        )
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}
