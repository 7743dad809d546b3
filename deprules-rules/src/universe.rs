use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pattern::ClassPattern;

/// Dense index of a class name inside a [`ClassUniverse`].
///
/// Ids follow the sorted order of the names, so ordering by id is ordering by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(u32);

impl ClassId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        ClassId(index as u32)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The set of symbol class names known to the detector, frozen for compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassUniverse {
    names: Vec<String>,
    index: HashMap<String, ClassId>,
}

impl ClassUniverse {
    /// Builds a universe from any collection of names. Duplicates and
    /// surrounding whitespace are dropped; empty names are ignored.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        names.sort();
        names.dedup();

        let index = names
            .iter()
            .enumerate()
            .map(|(position, name)| (name.clone(), ClassId::from_index(position)))
            .collect();

        Self { names, index }
    }

    /// Parses a plain class list: one name per line, `#` comments and blank lines skipped.
    pub fn from_class_list(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn id(&self, name: &str) -> Option<ClassId> {
        self.index.get(name).copied()
    }

    /// Name behind an id handed out by this universe.
    pub fn name(&self, id: ClassId) -> &str {
        &self.names[id.index()]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &str)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(|(position, name)| (ClassId::from_index(position), name.as_str()))
    }

    /// Every class the pattern denotes, in id order.
    pub fn expand(&self, pattern: &ClassPattern) -> Vec<ClassId> {
        if !pattern.has_wildcard() {
            return self.id(pattern.as_str()).into_iter().collect();
        }
        self.iter()
            .filter(|(_, name)| pattern.matches(name))
            .map(|(id, _)| id)
            .collect()
    }
}
