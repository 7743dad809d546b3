use std::fs;
use std::path::{Path, PathBuf};

use deprules_engine::{AttachmentGraph, GraphDocument, GraphError};
use deprules_rules::{ClassUniverse, GrammarError, PatternToken, RawRule, RuleBody};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("no {0} given; pass --{0} or set DEPRULES_{1}")]
    MissingInput(&'static str, &'static str),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid class list {}: {source}", path.display())]
    ClassList {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid graph document {}: {message}", path.display())]
    GraphDocument { path: PathBuf, message: String },
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error("grammar rejected")]
    GrammarRejected,
    #[error("graph has {0} violation(s)")]
    InvalidGraph(usize),
}

impl CliError {
    fn from_io(path: &Path, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|err| CliError::from_io(path, err))
}

fn has_extension(path: &Path, wanted: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| wanted.iter().any(|w| ext.eq_ignore_ascii_case(w)))
        .unwrap_or(false)
}

/// Reads a class list: a JSON array for `.json` files, one name per line otherwise.
pub fn load_universe(path: &Path) -> Result<ClassUniverse, CliError> {
    let text = read(path)?;
    let universe = if has_extension(path, &["json"]) {
        let names: Vec<String> =
            serde_json::from_str(&text).map_err(|source| CliError::ClassList {
                path: path.to_path_buf(),
                source,
            })?;
        ClassUniverse::new(names)
    } else {
        ClassUniverse::from_class_list(&text)
    };
    debug!(path = %path.display(), classes = universe.len(), "loaded class list");
    Ok(universe)
}

/// Universe made of every literal class name the rules mention.
///
/// Used when no class list is given; wildcards then only match those names.
pub fn universe_from_rules(rules: &[RawRule]) -> ClassUniverse {
    let tokens = rules.iter().flat_map(|rule| {
        let none: &[PatternToken] = &[];
        let (left, right) = match &rule.body {
            RuleBody::Attachment { sources, targets } => (sources.as_slice(), targets.as_slice()),
            RuleBody::SourceAggregate { sources } => (sources.as_slice(), none),
            RuleBody::TargetAggregate { targets } => (none, targets.as_slice()),
        };
        left.iter().chain(right.iter())
    });
    ClassUniverse::new(
        tokens
            .filter(|token| !token.pattern.has_wildcard())
            .map(|token| token.pattern.as_str().to_string()),
    )
}

/// Reads a graph document as YAML for `.yaml`/`.yml` files, JSON otherwise.
pub fn load_graph(path: &Path) -> Result<AttachmentGraph, CliError> {
    let text = read(path)?;
    let document: GraphDocument = if has_extension(path, &["yaml", "yml"]) {
        serde_yaml::from_str(&text).map_err(|err| CliError::GraphDocument {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?
    } else {
        serde_json::from_str(&text).map_err(|err| CliError::GraphDocument {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?
    };
    Ok(AttachmentGraph::from_document(document)?)
}
