use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::compiler::{CompileOptions, CompileWarning};
use crate::error::GrammarError;
use crate::grammar::Grammar;
use crate::universe::ClassUniverse;

/// Versioned history entry for a registered grammar.
#[derive(Debug, Clone)]
pub struct GrammarEntry {
    pub version: u32,
    pub grammar: Arc<Grammar>,
    pub warnings: Vec<CompileWarning>,
    /// Grammar text the entry was compiled from, kept for recompilation.
    pub source: String,
    pub compiled_at: DateTime<Utc>,
}

impl GrammarEntry {
    fn new(
        version: u32,
        grammar: Grammar,
        warnings: Vec<CompileWarning>,
        source: String,
    ) -> Self {
        Self {
            version,
            grammar: Arc::new(grammar),
            warnings,
            source,
            compiled_at: Utc::now(),
        }
    }
}

/// In-memory registry of compiled grammars with version tracking.
///
/// Cloning the store shares the same registry. Readers get `Arc<Grammar>`
/// snapshots that stay valid while newer versions are installed.
#[derive(Debug, Default, Clone)]
pub struct GrammarStore {
    inner: Arc<RwLock<HashMap<String, Vec<GrammarEntry>>>>,
}

impl GrammarStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every grammar with at least one version, sorted.
    pub fn names(&self) -> Vec<String> {
        let inner = self.inner.read();
        let mut names: Vec<String> = inner.keys().cloned().collect();
        names.sort();
        names
    }

    /// Compiles `source` and installs it as the newest version of `name`.
    ///
    /// On failure nothing is installed and the previous version stays current.
    pub fn install(
        &self,
        name: &str,
        source: &str,
        universe: &ClassUniverse,
        options: &CompileOptions,
    ) -> Result<GrammarEntry, GrammarError> {
        let compiled = Grammar::from_source(source, universe, options)?;

        let mut inner = self.inner.write();
        let history = inner.entry(name.to_string()).or_default();
        let version = history.last().map(|last| last.version + 1).unwrap_or(1);
        let entry = GrammarEntry::new(
            version,
            compiled.grammar,
            compiled.warnings,
            source.to_string(),
        );
        history.push(entry.clone());
        info!(grammar = name, version, "installed grammar");
        Ok(entry)
    }

    /// The current grammar for `name`.
    pub fn current(&self, name: &str) -> Result<Arc<Grammar>, GrammarError> {
        self.latest(name)
            .map(|entry| entry.grammar)
            .ok_or_else(|| GrammarError::NotFound(name.to_string()))
    }

    pub fn latest(&self, name: &str) -> Option<GrammarEntry> {
        let inner = self.inner.read();
        inner.get(name).and_then(|history| history.last().cloned())
    }

    /// Full history for a grammar, oldest first.
    pub fn history(&self, name: &str) -> Vec<GrammarEntry> {
        let inner = self.inner.read();
        inner.get(name).cloned().unwrap_or_default()
    }

    /// Recompiles the latest source of every grammar against a new class universe.
    ///
    /// Grammars compiled for the old universe are stale once the detector
    /// vocabulary changes. Each successful recompilation becomes a new
    /// version; a grammar that no longer compiles is removed so it can
    /// never be used with the wrong classes. Returns the outcome per name.
    pub fn rebind_universe(
        &self,
        universe: &ClassUniverse,
        options: &CompileOptions,
    ) -> Vec<(String, Result<u32, GrammarError>)> {
        let mut inner = self.inner.write();
        let mut names: Vec<String> = inner.keys().cloned().collect();
        names.sort();

        let mut outcomes = Vec::with_capacity(names.len());
        for name in names {
            let Some(latest) = inner.get(&name).and_then(|history| history.last().cloned()) else {
                continue;
            };
            match Grammar::from_source(&latest.source, universe, options) {
                Ok(compiled) => {
                    let version = latest.version + 1;
                    let entry =
                        GrammarEntry::new(version, compiled.grammar, compiled.warnings, latest.source);
                    inner.entry(name.clone()).or_default().push(entry);
                    outcomes.push((name, Ok(version)));
                }
                Err(err) => {
                    warn!(grammar = %name, error = %err, "grammar no longer compiles; removing it");
                    inner.remove(&name);
                    outcomes.push((name, Err(err)));
                }
            }
        }
        outcomes
    }

    /// Drops every version of `name`. Returns whether anything was removed.
    pub fn remove(&self, name: &str) -> bool {
        self.inner.write().remove(name).is_some()
    }
}
