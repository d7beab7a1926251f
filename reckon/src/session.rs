//! Session state
//!
//! One `Session` holds everything that outlives a single calculation:
//! settings, user variables, the currency snapshot, the builtin symbol
//! table, and the clock. Calculations run against an immutable
//! `Snapshot` taken at entry, so a concurrent settings change never
//! bleeds into a calculation already underway.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use reckon_core::{Clock, SystemClock};
use reckon_units::ExchangeRateTable;

use crate::config::Settings;
use crate::symbols::SymbolTable;
use crate::value::Value;

pub struct Session {
    settings: RwLock<Settings>,
    rates: RwLock<ExchangeRateTable>,
    variables: RwLock<HashMap<String, Value>>,
    pub symbols: SymbolTable,
    pub clock: Arc<dyn Clock>,
}

/// Immutable view of session state for one calculation.
#[derive(Clone)]
pub struct Snapshot {
    pub settings: Settings,
    pub rates: ExchangeRateTable,
    pub variables: HashMap<String, Value>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Session {
            settings: RwLock::new(Settings::default()),
            rates: RwLock::new(ExchangeRateTable::new()),
            variables: RwLock::new(HashMap::new()),
            symbols: SymbolTable::new(),
            clock,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            settings: self.settings.read().unwrap_or_else(|e| e.into_inner()).clone(),
            rates: self.rates.read().unwrap_or_else(|e| e.into_inner()).clone(),
            variables: self
                .variables
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .clone(),
        }
    }

    /// Names the parser must treat as symbols: builtin constants, user
    /// variables, and the implicit `ans`.
    pub fn symbol_names(&self) -> HashSet<String> {
        let mut names: HashSet<String> = self
            .symbols
            .constant_name_set()
            .map(|s| s.to_string())
            .collect();
        for name in self.variables.read().unwrap_or_else(|e| e.into_inner()).keys() {
            names.insert(name.clone());
        }
        names.insert("ans".to_string());
        names
    }

    pub fn apply_option(&self, command: &str) -> bool {
        self.settings
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .apply_option(command)
    }

    pub fn settings(&self) -> Settings {
        self.settings.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Replace the whole exchange rate table atomically.
    pub fn replace_rates(&self, table: ExchangeRateTable) {
        *self.rates.write().unwrap_or_else(|e| e.into_inner()) = table;
    }

    pub fn rates(&self) -> ExchangeRateTable {
        self.rates.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Disarm the staleness warning once it has been shown.
    pub fn mark_stale_warned(&self) {
        self.rates
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .disarm_stale_warning();
    }

    pub fn set_variable(&self, name: &str, value: Value) {
        self.variables
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), value);
    }

    pub fn variable(&self, name: &str) -> Option<Value> {
        self.variables
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    pub fn variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .variables
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
