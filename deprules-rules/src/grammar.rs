use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cardinality::Cardinality;
use crate::compiler::{compile, CompileOptions, Compiled};
use crate::error::GrammarError;
use crate::parser::{load_grammar, parse_grammar};
use crate::universe::{ClassId, ClassUniverse};

/// Position a class occupies relative to its attachments, by class name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "role", content = "class", rename_all = "snake_case")]
pub enum Role {
    /// All outgoing attachments, whatever they point to.
    Source,
    /// All incoming attachments, wherever they come from.
    Target,
    /// Outgoing attachments towards the named class.
    SourceOf(String),
    /// Incoming attachments from the named class.
    TargetOf(String),
}

impl Role {
    pub(crate) fn from_key(universe: &ClassUniverse, key: RoleKey) -> Role {
        match key {
            RoleKey::Source => Role::Source,
            RoleKey::Target => Role::Target,
            RoleKey::SourceOf(class) => Role::SourceOf(universe.name(class).to_string()),
            RoleKey::TargetOf(class) => Role::TargetOf(universe.name(class).to_string()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Source => f.write_str("source"),
            Role::Target => f.write_str("target"),
            Role::SourceOf(class) => write!(f, "source of `{}`", class),
            Role::TargetOf(class) => write!(f, "target of `{}`", class),
        }
    }
}

/// [`Role`] keyed by class id, as stored in the compiled table.
///
/// The derived order (aggregates first, then scoped roles by class id) is
/// the order violations are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoleKey {
    Source,
    Target,
    SourceOf(ClassId),
    TargetOf(ClassId),
}

/// Allowed `(source, target)` class pairs as a dense bit matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRelation {
    size: usize,
    cells: Vec<bool>,
    pair_count: usize,
}

impl AttachmentRelation {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![false; size * size],
            pair_count: 0,
        }
    }

    /// Returns `true` if the pair was not present before.
    pub fn insert(&mut self, source: ClassId, target: ClassId) -> bool {
        let cell = &mut self.cells[source.index() * self.size + target.index()];
        if *cell {
            return false;
        }
        *cell = true;
        self.pair_count += 1;
        true
    }

    pub fn contains(&self, source: ClassId, target: ClassId) -> bool {
        source.index() < self.size
            && target.index() < self.size
            && self.cells[source.index() * self.size + target.index()]
    }

    pub fn len(&self) -> usize {
        self.pair_count
    }

    pub fn is_empty(&self) -> bool {
        self.pair_count == 0
    }

    pub fn has_outgoing(&self, source: ClassId) -> bool {
        let row = source.index() * self.size;
        self.cells[row..row + self.size].iter().any(|cell| *cell)
    }

    pub fn has_incoming(&self, target: ClassId) -> bool {
        (0..self.size).any(|row| self.cells[row * self.size + target.index()])
    }

    /// All pairs in (source, target) id order.
    pub fn pairs(&self) -> impl Iterator<Item = (ClassId, ClassId)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell)
            .map(move |(position, _)| {
                (
                    ClassId::from_index(position / size),
                    ClassId::from_index(position % size),
                )
            })
    }
}

/// Compiled, immutable dependency grammar.
///
/// Built once per grammar source and class universe; share it by reference
/// or behind an `Arc` between validations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    universe: ClassUniverse,
    relation: AttachmentRelation,
    bounds: BTreeMap<(ClassId, RoleKey), Cardinality>,
    rule_count: usize,
}

impl Grammar {
    pub(crate) fn from_parts(
        universe: ClassUniverse,
        relation: AttachmentRelation,
        bounds: BTreeMap<(ClassId, RoleKey), Cardinality>,
        rule_count: usize,
    ) -> Self {
        Self {
            universe,
            relation,
            bounds,
            rule_count,
        }
    }

    /// Parses and compiles grammar text against the given universe.
    pub fn from_source(
        source: &str,
        universe: &ClassUniverse,
        options: &CompileOptions,
    ) -> Result<Compiled, GrammarError> {
        let rules = parse_grammar(source)?;
        compile(&rules, universe, options)
    }

    /// Loads a grammar file and compiles it against the given universe.
    pub fn from_path(
        path: impl AsRef<Path>,
        universe: &ClassUniverse,
        options: &CompileOptions,
    ) -> Result<Compiled, GrammarError> {
        let rules = load_grammar(path)?;
        compile(&rules, universe, options)
    }

    /// Whether a `source` symbol may attach to (point to) a `target` symbol.
    pub fn is_allowed(&self, source: &str, target: &str) -> bool {
        match (self.universe.id(source), self.universe.id(target)) {
            (Some(source), Some(target)) => self.relation.contains(source, target),
            _ => false,
        }
    }

    pub fn is_allowed_id(&self, source: ClassId, target: ClassId) -> bool {
        self.relation.contains(source, target)
    }

    /// Merged range for the class in the given role; unbounded when unconstrained.
    pub fn cardinality_bound(&self, class: &str, role: &Role) -> Cardinality {
        let Some(class) = self.universe.id(class) else {
            return Cardinality::UNBOUNDED;
        };
        let key = match role {
            Role::Source => Some(RoleKey::Source),
            Role::Target => Some(RoleKey::Target),
            Role::SourceOf(other) => self.universe.id(other).map(RoleKey::SourceOf),
            Role::TargetOf(other) => self.universe.id(other).map(RoleKey::TargetOf),
        };
        key.and_then(|key| self.bound(class, key))
            .unwrap_or(Cardinality::UNBOUNDED)
    }

    /// Declared range for the class and role, `None` if nothing constrains it.
    pub fn bound(&self, class: ClassId, role: RoleKey) -> Option<Cardinality> {
        self.bounds.get(&(class, role)).copied()
    }

    pub fn role(&self, key: RoleKey) -> Role {
        Role::from_key(&self.universe, key)
    }

    pub fn universe(&self) -> &ClassUniverse {
        &self.universe
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.universe.id(name)
    }

    pub fn contains_class(&self, name: &str) -> bool {
        self.universe.contains(name)
    }

    pub fn relation(&self) -> &AttachmentRelation {
        &self.relation
    }

    /// Allowed pairs by name, in name order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.relation
            .pairs()
            .map(|(source, target)| (self.universe.name(source), self.universe.name(target)))
    }

    /// Every declared bound by name, in table order.
    pub fn bounds(&self) -> impl Iterator<Item = (&str, Role, Cardinality)> + '_ {
        self.bounds
            .iter()
            .map(|((class, key), bound)| (self.universe.name(*class), self.role(*key), *bound))
    }

    pub fn bound_count(&self) -> usize {
        self.bounds.len()
    }

    /// Classes a `source` symbol may point to.
    pub fn allowed_targets(&self, source: &str) -> Vec<&str> {
        let Some(source) = self.universe.id(source) else {
            return Vec::new();
        };
        self.universe
            .iter()
            .filter(|(target, _)| self.relation.contains(source, *target))
            .map(|(_, name)| name)
            .collect()
    }

    /// Classes that may point to a `target` symbol.
    pub fn allowed_sources(&self, target: &str) -> Vec<&str> {
        let Some(target) = self.universe.id(target) else {
            return Vec::new();
        };
        self.universe
            .iter()
            .filter(|(source, _)| self.relation.contains(*source, target))
            .map(|(_, name)| name)
            .collect()
    }

    /// Number of rule lines the grammar was compiled from.
    pub fn rule_count(&self) -> usize {
        self.rule_count
    }
}
