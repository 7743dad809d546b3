//! deprules: dependency grammars for notation attachment graphs.
//!
//! An optical music recognition editor lets users draw attachments between
//! detected symbols (a stem attached to a notehead, a beam to a stem). A
//! dependency grammar states which attachments make sense and how many of
//! them a symbol may have; this workspace parses and compiles such grammars
//! and validates attachment graphs against them.
//!
//! # Architecture
//!
//! * [`deprules_core`]: configuration, logging setup, shared error type
//! * [`deprules_rules`]: grammar parser, rule compiler, compiled grammar model and store
//! * [`deprules_engine`]: attachment graph, full and incremental validation, reports
//!
//! The `deprules` binary in `deprules-cli` wraps all three.

pub use deprules_core;
pub use deprules_engine;
pub use deprules_rules;

pub use deprules_engine::{
    validate, AttachmentGraph, ChangeSet, GraphValidator, IncrementalValidator, NodeId,
    ValidationReport,
};
pub use deprules_rules::{
    Cardinality, ClassUniverse, CompileOptions, Compiled, Grammar, GrammarError, Role,
};
