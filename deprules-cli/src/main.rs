use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use deprules_core::serde_utils::to_pretty_json;
use deprules_core::{init_tracing, EngineConfig};
use deprules_engine::GraphValidator;
use deprules_rules::{
    compile, load_grammar, render_rules, ClassUniverse, CompileOptions, Compiled, RawRule,
};
use tracing::info;

mod inputs;
mod output;

use inputs::{load_graph, load_universe, universe_from_rules, CliError};
use output::{print_bounds, print_compiled, print_grammar_error, print_report_summary, print_warnings};

#[derive(Parser)]
#[command(name = "deprules")]
#[command(about = "Dependency grammars for notation attachment graphs", long_about = None)]
struct Cli {
    /// Grammar file to load
    #[arg(long, global = true, env = "DEPRULES_GRAMMAR")]
    grammar: Option<PathBuf>,
    /// Class list (one name per line, or a JSON array in a `.json` file)
    #[arg(long, global = true, env = "DEPRULES_CLASSES")]
    classes: Option<PathBuf>,
    /// Fail on patterns that match no known class
    #[arg(long, global = true, default_value_t = false)]
    strict: bool,
    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, env = "DEPRULES_LOG")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the grammar and report warnings and errors
    Check {
        /// Also list every cardinality bound
        #[arg(long, default_value_t = false)]
        bounds: bool,
    },
    /// Print the grammar in canonical form
    Render,
    /// Validate an attachment graph (JSON or YAML) and print the report as JSON
    Validate {
        graph: PathBuf,
        /// Exit successfully even when the graph has violations
        #[arg(long, default_value_t = false)]
        allow_violations: bool,
    },
    /// Show version information
    Version,
}

struct Session {
    grammar: Option<PathBuf>,
    classes: Option<PathBuf>,
    options: CompileOptions,
}

impl Session {
    fn rules(&self) -> Result<Vec<RawRule>, CliError> {
        let path = self
            .grammar
            .as_ref()
            .ok_or(CliError::MissingInput("grammar", "GRAMMAR"))?;
        Ok(load_grammar(path)?)
    }

    fn universe(&self, rules: &[RawRule]) -> Result<ClassUniverse, CliError> {
        match &self.classes {
            Some(path) => load_universe(path),
            None => {
                info!("no class list given; using the class names the grammar mentions");
                Ok(universe_from_rules(rules))
            }
        }
    }

    fn compile(&self) -> Result<Compiled, CliError> {
        let rules = self.rules()?;
        let universe = self.universe(&rules)?;
        Ok(compile(&rules, &universe, &self.options)?)
    }
}

/// Prints grammar errors in full and leaves a short error for the exit path.
fn reported(err: CliError) -> CliError {
    match err {
        CliError::Grammar(grammar_err) => {
            print_grammar_error(&grammar_err);
            CliError::GrammarRejected
        }
        other => other,
    }
}

fn main() -> anyhow::Result<()> {
    let config = EngineConfig::from_env().context("invalid DEPRULES_* environment")?;
    let cli = Cli::parse();

    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    init_tracing(Some(&level))?;

    let mut options = CompileOptions::from(&config);
    options.strict_patterns |= cli.strict;
    let session = Session {
        grammar: cli.grammar.or(config.grammar_path),
        classes: cli.classes.or(config.classes_path),
        options,
    };

    match cli.command {
        Commands::Check { bounds } => {
            let compiled = session.compile().map_err(reported)?;
            print_compiled(&compiled.grammar, &compiled.warnings);
            if bounds {
                print_bounds(&compiled.grammar);
            }
        }
        Commands::Render => {
            let rules = session.rules().map_err(reported)?;
            print!("{}", render_rules(&rules));
        }
        Commands::Validate {
            graph,
            allow_violations,
        } => {
            let compiled = session.compile().map_err(reported)?;
            print_warnings(&compiled.warnings);
            let graph = load_graph(&graph)?;
            let report = GraphValidator::new(&compiled.grammar).validate(&graph);
            println!("{}", to_pretty_json(&report)?);
            print_report_summary(&report);
            if !report.is_valid() && !allow_violations {
                return Err(CliError::InvalidGraph(report.violation_count()).into());
            }
        }
        Commands::Version => {
            println!("deprules v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
