use std::collections::BTreeMap;
use std::fmt;

use deprules_core::EngineConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cardinality::Cardinality;
use crate::error::{CompileError, GrammarError};
use crate::grammar::{AttachmentRelation, Grammar, Role, RoleKey};
use crate::rule::{PatternToken, RawRule, RuleBody, Side};
use crate::universe::{ClassId, ClassUniverse};

/// Knobs for [`compile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Treat patterns that match no known class as errors instead of warnings.
    pub strict_patterns: bool,
}

impl From<&EngineConfig> for CompileOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            strict_patterns: config.strict_patterns,
        }
    }
}

/// Non-fatal compile finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum CompileWarning {
    /// The pattern names no class of the current universe.
    UnmatchedPattern {
        line: usize,
        side: Side,
        pattern: String,
    },
    /// A lower aggregate bound in a direction no rule lets the class attach.
    /// Every node of the class will fail it.
    UnsatisfiableBound {
        line: usize,
        class: String,
        role: Role,
        bound: Cardinality,
    },
}

impl CompileWarning {
    pub fn line(&self) -> usize {
        match self {
            CompileWarning::UnmatchedPattern { line, .. }
            | CompileWarning::UnsatisfiableBound { line, .. } => *line,
        }
    }
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileWarning::UnmatchedPattern {
                line,
                side,
                pattern,
            } => write!(
                f,
                "line {}: {} pattern `{}` matches no known class",
                line, side, pattern
            ),
            CompileWarning::UnsatisfiableBound {
                line,
                class,
                role,
                bound,
            } => write!(
                f,
                "line {}: `{}` is bounded {} as {} but no rule lets it attach that way",
                line, class, bound, role
            ),
        }
    }
}

/// Successful compilation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    pub grammar: Grammar,
    pub warnings: Vec<CompileWarning>,
}

/// Compiles parsed rules against the class universe.
///
/// Either every rule resolves into a consistent model, or all compile errors
/// are returned and no model is produced.
pub fn compile(
    rules: &[RawRule],
    universe: &ClassUniverse,
    options: &CompileOptions,
) -> Result<Compiled, GrammarError> {
    let mut compiler = Compiler::new(universe, options);
    for rule in rules {
        compiler.add_rule(rule);
    }
    compiler.finish(rules.len())
}

struct BoundEntry {
    bound: Cardinality,
    lines: Vec<usize>,
}

struct Compiler<'a> {
    universe: &'a ClassUniverse,
    options: &'a CompileOptions,
    relation: AttachmentRelation,
    bounds: BTreeMap<(ClassId, RoleKey), BoundEntry>,
    warnings: Vec<CompileWarning>,
    errors: Vec<CompileError>,
}

impl<'a> Compiler<'a> {
    fn new(universe: &'a ClassUniverse, options: &'a CompileOptions) -> Self {
        Self {
            universe,
            options,
            relation: AttachmentRelation::new(universe.len()),
            bounds: BTreeMap::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn add_rule(&mut self, rule: &RawRule) {
        match &rule.body {
            RuleBody::Attachment { sources, targets } => {
                let lhs = self.expand_side(sources, Side::Left, rule.line);
                let rhs = self.expand_side(targets, Side::Right, rule.line);
                for &(source, source_bound) in &lhs {
                    for &(target, target_bound) in &rhs {
                        self.relation.insert(source, target);
                        if let Some(bound) = source_bound {
                            self.merge(source, RoleKey::SourceOf(target), bound, rule.line);
                        }
                        if let Some(bound) = target_bound {
                            self.merge(target, RoleKey::TargetOf(source), bound, rule.line);
                        }
                    }
                }
            }
            RuleBody::SourceAggregate { sources } => {
                for (class, bound) in self.expand_side(sources, Side::Left, rule.line) {
                    if let Some(bound) = bound {
                        self.merge(class, RoleKey::Source, bound, rule.line);
                    }
                }
            }
            RuleBody::TargetAggregate { targets } => {
                for (class, bound) in self.expand_side(targets, Side::Right, rule.line) {
                    if let Some(bound) = bound {
                        self.merge(class, RoleKey::Target, bound, rule.line);
                    }
                }
            }
        }
    }

    fn expand_side(
        &mut self,
        tokens: &[PatternToken],
        side: Side,
        line: usize,
    ) -> Vec<(ClassId, Option<Cardinality>)> {
        let mut expanded = Vec::new();
        for token in tokens {
            let classes = self.universe.expand(&token.pattern);
            debug!(line, pattern = %token.pattern, matches = classes.len(), "expanded pattern");
            if classes.is_empty() {
                self.unmatched(&token.pattern.to_string(), side, line);
                continue;
            }
            let bound = token.cardinality.filter(|bound| !bound.is_unbounded());
            expanded.extend(classes.into_iter().map(|class| (class, bound)));
        }
        expanded
    }

    fn unmatched(&mut self, pattern: &str, side: Side, line: usize) {
        if self.options.strict_patterns {
            self.errors.push(CompileError::UnmatchedPattern {
                line,
                side,
                pattern: pattern.to_string(),
            });
            return;
        }
        warn!(line, %side, pattern, "pattern matches no known class");
        self.warnings.push(CompileWarning::UnmatchedPattern {
            line,
            side,
            pattern: pattern.to_string(),
        });
    }

    fn merge(&mut self, class: ClassId, role: RoleKey, incoming: Cardinality, line: usize) {
        let Some(entry) = self.bounds.get_mut(&(class, role)) else {
            self.bounds.insert(
                (class, role),
                BoundEntry {
                    bound: incoming,
                    lines: vec![line],
                },
            );
            return;
        };

        match entry.bound.intersect(&incoming) {
            Some(tightened) => {
                entry.bound = tightened;
                if !entry.lines.contains(&line) {
                    entry.lines.push(line);
                }
            }
            None => {
                let error = CompileError::ConflictingCardinality {
                    class: self.universe.name(class).to_string(),
                    role: Role::from_key(self.universe, role),
                    existing: entry.bound,
                    existing_lines: entry.lines.clone(),
                    incoming,
                    incoming_line: line,
                };
                self.errors.push(error);
            }
        }
    }

    /// Bounds on classes outside the relation are errors. Aggregate bounds
    /// in a direction the class never attaches only warn, and only when the
    /// count 0 they always see falls outside them.
    fn check_orphans(&mut self) {
        for ((class, role), entry) in &self.bounds {
            let line = entry.lines.first().copied().unwrap_or_default();
            let outgoing = self.relation.has_outgoing(*class);
            let incoming = self.relation.has_incoming(*class);
            if !outgoing && !incoming {
                self.errors.push(CompileError::OrphanCardinality {
                    class: self.universe.name(*class).to_string(),
                    role: Role::from_key(self.universe, *role),
                    bound: entry.bound,
                    line,
                });
                continue;
            }
            let attaches = match role {
                RoleKey::Source => outgoing,
                RoleKey::Target => incoming,
                RoleKey::SourceOf(_) | RoleKey::TargetOf(_) => true,
            };
            if !attaches && !entry.bound.contains(0) {
                let warning = CompileWarning::UnsatisfiableBound {
                    line,
                    class: self.universe.name(*class).to_string(),
                    role: Role::from_key(self.universe, *role),
                    bound: entry.bound,
                };
                warn!(%warning, "bound can never be met");
                self.warnings.push(warning);
            }
        }
    }

    fn finish(mut self, rule_count: usize) -> Result<Compiled, GrammarError> {
        self.check_orphans();
        if !self.errors.is_empty() {
            warn!(errors = self.errors.len(), "grammar failed to compile");
            return Err(GrammarError::Compile(self.errors));
        }

        let aggregates = self
            .bounds
            .keys()
            .filter(|(_, role)| matches!(role, RoleKey::Source | RoleKey::Target))
            .count();
        debug!(aggregates, "aggregate bounds count all attachments in their direction");

        let bounds = self
            .bounds
            .into_iter()
            .map(|(key, entry)| (key, entry.bound))
            .collect::<BTreeMap<_, _>>();
        let grammar = Grammar::from_parts(self.universe.clone(), self.relation, bounds, rule_count);

        info!(
            rules = rule_count,
            classes = grammar.universe().len(),
            pairs = grammar.relation().len(),
            bounds = grammar.bound_count(),
            warnings = self.warnings.len(),
            "compiled dependency grammar"
        );

        Ok(Compiled {
            grammar,
            warnings: self.warnings,
        })
    }
}
