//! sift CLI: driving adapter for the sift filtering engine.
//!
//! Subcommands:
//! - `eval <document> [--options <file>] [--set name=value[:predicate]...]`: run a session over a YAML tree
//! - `check <options>`: validate an options file
//! - `predicates`: print built-in predicate names

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sift::prelude::*;
use sift::CandidateTrace;
use sift_test::{NodeId, TestDocument};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(about = "Filter attribute-tagged elements of a document tree", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start a session over a YAML document and print the classification
    Eval {
        /// YAML element list
        document: PathBuf,

        /// Options file (JSON or YAML by extension)
        #[arg(short, long)]
        options: Option<PathBuf>,

        /// Change a control: `name=value` or `name=value:predicate`
        #[arg(short, long = "set", value_name = "NAME=VALUE[:PREDICATE]")]
        set: Vec<String>,

        /// Trace one element (by `id`) against the final filters
        #[arg(long, value_name = "ID")]
        explain: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate an options file
    Check {
        /// Options file (JSON or YAML by extension)
        options: PathBuf,
    },

    /// Print built-in predicate names
    Predicates,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Eval {
            document,
            options,
            set,
            explain,
            json,
        } => cmd_eval(&document, options.as_deref(), &set, explain.as_deref(), json),
        Commands::Check { options } => cmd_check(&options),
        Commands::Predicates => {
            cmd_predicates();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_eval(
    document: &Path,
    options: Option<&Path>,
    set: &[String],
    explain: Option<&str>,
    json: bool,
) -> Result<(), String> {
    let options = match options {
        Some(path) => load_options(path)?,
        None => FilterOptions::default(),
    };
    let mut doc = load_document(document)?;
    let registry: Arc<PredicateRegistry<NodeId>> = Arc::new(
        PredicateRegistry::from_options(&options).map_err(|e| format!("options invalid: {e}"))?,
    );
    let predicates = registry.names();
    let mut session = Session::new(doc.root(), options, registry)
        .map_err(|e| format!("options invalid: {e}"))?;

    session.start(&doc);
    for arg in set {
        let assignment = parse_set(arg, &predicates)?;
        let control = find_control(&doc, session.options(), &assignment.filter)?;
        doc.set_value(control, assignment.value.as_str());
        if let Some(predicate) = &assignment.predicate {
            let attribute = session.options().predicate_attribute_name.clone();
            doc.set_attribute(control, attribute, predicate.as_str());
        }
        let changed = session
            .handle_change(&doc, &control)
            .map_err(|e| e.to_string())?;
        debug!(filter = %assignment.filter, changed = changed.is_some(), "control_set");
    }

    let results = session.evaluate(&doc);
    let trace = match explain {
        Some(id) => {
            let element = doc
                .find(id)
                .ok_or_else(|| format!("no element with id \"{id}\""))?;
            Some(session.explain(&doc, &element))
        }
        None => None,
    };

    if json {
        let report = json_report(&doc, &results, trace.as_ref());
        let text = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{text}");
    } else {
        print_report(&doc, &results, trace.as_ref());
    }
    Ok(())
}

fn cmd_check(path: &Path) -> Result<(), String> {
    let options = load_options(path)?;
    PredicateRegistry::<NodeId>::from_options(&options)
        .map_err(|e| format!("options invalid: {e}"))?;
    println!("Options valid");
    Ok(())
}

fn cmd_predicates() {
    let registry = PredicateRegistry::<NodeId>::with_builtins();
    for name in registry.names() {
        println!("{name}");
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════════════════════════

fn read(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{}\": {e}", path.display()))
}

fn load_options(path: &Path) -> Result<FilterOptions, String> {
    let content = read(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let options = if is_json {
        FilterOptions::from_json(&content)
    } else {
        // Default to YAML (handles .yaml and .yml)
        FilterOptions::from_yaml(&content)
    };
    options.map_err(|e| format!("options invalid: {e}"))
}

fn load_document(path: &Path) -> Result<TestDocument, String> {
    let content = read(path)?;
    let doc = TestDocument::from_yaml(&content).map_err(|e| format!("YAML parse error: {e}"))?;
    debug!(path = %path.display(), "document_loaded");
    Ok(doc)
}

fn find_control(doc: &TestDocument, options: &FilterOptions, filter: &str) -> Result<NodeId, String> {
    doc.query_attribute(&doc.root(), &options.attribute_name_prefix)
        .into_iter()
        .find(|control| doc.attribute(control, &options.attribute_name_prefix) == Some(filter))
        .ok_or_else(|| format!("no control for filter \"{filter}\""))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, PartialEq, Eq)]
struct Assignment {
    filter: String,
    value: String,
    predicate: Option<String>,
}

/// Parse `name=value[:predicate]`.
///
/// The suffix after the last `:` is taken as a predicate only when it names
/// one of `predicates`; otherwise it stays part of the value.
fn parse_set(arg: &str, predicates: &[String]) -> Result<Assignment, String> {
    let (filter, rest) = arg
        .split_once('=')
        .ok_or_else(|| format!("invalid assignment \"{arg}\", expected name=value[:predicate]"))?;
    if filter.trim().is_empty() {
        return Err(format!("invalid assignment \"{arg}\", filter name is empty"));
    }

    let (value, predicate) = match rest.rsplit_once(':') {
        Some((value, predicate)) if predicates.iter().any(|p| p == predicate) => {
            (value, Some(predicate.to_string()))
        }
        _ => (rest, None),
    };

    Ok(Assignment {
        filter: filter.to_string(),
        value: value.to_string(),
        predicate,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Output
// ═══════════════════════════════════════════════════════════════════════════════

fn json_report(
    doc: &TestDocument,
    results: &FilterResults<NodeId>,
    trace: Option<&CandidateTrace<NodeId>>,
) -> serde_json::Value {
    let mut report = serde_json::json!({
        "matched": doc.labels(&results.matched),
        "unmatched": doc.labels(&results.unmatched),
        "filters": results.state,
        "issues": results
            .issues
            .iter()
            .map(|issue| format!("{}: {}", issue.filter, issue.error))
            .collect::<Vec<_>>(),
    });
    if let Some(trace) = trace {
        report["explain"] = serde_json::json!({
            "element": doc.label(trace.element),
            "matched": trace.matched,
            "filters": trace
                .filters
                .iter()
                .map(|f| serde_json::json!({
                    "filter": f.filter,
                    "predicate": f.predicate,
                    "value": f.value,
                    "subValues": f.sub_values,
                    "outcome": f.outcome.to_string(),
                }))
                .collect::<Vec<_>>(),
        });
    }
    report
}

fn print_report(
    doc: &TestDocument,
    results: &FilterResults<NodeId>,
    trace: Option<&CandidateTrace<NodeId>>,
) {
    println!("filters:");
    for (name, filter) in results.state.iter() {
        match &filter.value {
            Some(value) => println!("  {name} = {value:?} ({})", filter.predicate),
            None => println!("  {name} (unconstrained)"),
        }
    }
    println!("matched:   {}", doc.labels(&results.matched).join(", "));
    println!("unmatched: {}", doc.labels(&results.unmatched).join(", "));
    for issue in &results.issues {
        println!("issue: {}: {}", issue.filter, issue.error);
    }

    if let Some(trace) = trace {
        let verdict = if trace.matched { "matched" } else { "unmatched" };
        println!("\n{} is {verdict}", doc.label(trace.element));
        for f in &trace.filters {
            println!("  {} [{}] {:?}: {}", f.filter, f.predicate, f.sub_values, f.outcome);
        }
    }
}
