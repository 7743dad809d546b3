use colored::*;
use deprules_engine::ValidationReport;
use deprules_rules::{CompileWarning, Grammar, GrammarError};

pub fn print_compiled(grammar: &Grammar, warnings: &[CompileWarning]) {
    println!(
        "{} {} rule(s), {} class(es)",
        "✔ Grammar compiled:".green().bold(),
        grammar.rule_count(),
        grammar.universe().len()
    );
    println!("  Allowed pairs: {}", grammar.relation().len());
    println!("  Cardinality bounds: {}", grammar.bound_count());
    print_warnings(warnings);
}

pub fn print_warnings(warnings: &[CompileWarning]) {
    for warning in warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
}

/// Lists every collected syntax or compile error, one per line.
pub fn print_grammar_error(err: &GrammarError) {
    eprintln!("{} {}", "✘ Grammar rejected:".red().bold(), err);
    for error in err.syntax_errors() {
        eprintln!("  {}", error);
    }
    for error in err.compile_errors() {
        eprintln!("  {}", error);
    }
}

pub fn print_bounds(grammar: &Grammar) {
    for (class, role, bound) in grammar.bounds() {
        println!("  {} as {}: {}", class.bold(), role, bound);
    }
}

pub fn print_report_summary(report: &ValidationReport) {
    if report.is_valid() {
        eprintln!("{}", "✔ Graph is valid".green().bold());
        return;
    }
    eprintln!(
        "{} {} edge, {} cardinality, {} unknown class violation(s)",
        "✘ Graph has violations:".red().bold(),
        report.edge_violations.len(),
        report.cardinality_violations.len(),
        report.unknown_classes.len()
    );
    for message in report.messages() {
        eprintln!("  {}", message);
    }
}
