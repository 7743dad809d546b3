//! Dependency grammars for notation attachment graphs.
//!
//! A grammar says which symbol classes may attach to which (`notehead-* |
//! stem beam`) and how many attachments of a kind a symbol may have
//! (`| stem{1,}`). This crate parses grammar text into raw rules, compiles
//! them against the class vocabulary of the detector (expanding `*`
//! wildcards once, up front) and exposes the immutable compiled [`Grammar`]
//! that validators query.

mod cardinality;
mod compiler;
mod error;
mod grammar;
mod parser;
mod pattern;
mod rule;
mod store;
mod universe;

pub use cardinality::Cardinality;
pub use compiler::{compile, CompileOptions, CompileWarning, Compiled};
pub use error::{CompileError, GrammarError, ParseError, ParseErrorKind};
pub use grammar::{AttachmentRelation, Grammar, Role, RoleKey};
pub use parser::{load_grammar, parse_grammar, parse_line, parse_token, render_rules};
pub use pattern::ClassPattern;
pub use rule::{PatternToken, RawRule, RuleBody, Side};
pub use store::{GrammarEntry, GrammarStore};
pub use universe::{ClassId, ClassUniverse};
