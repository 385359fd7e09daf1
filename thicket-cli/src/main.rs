//! Thicket CLI
//!
//! Loads an object tree from JSON and runs a selector against it.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;
use serde::Serialize;
use thicket_selector::{Matcher, custom_pseudos};
use thicket_tree::{NodeData, NodeRef, Tree};

/// Thicket: query JSON object trees with CSS-like selectors
#[derive(Parser, Debug)]
#[command(name = "thicket")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Every button below a box
    thicket ui.json 'Box .Button'

    # The only visible entry, as JSON
    thicket ui.json 'Entry:visible' --mode unique --json

    # The box holding the OK button, read from stdin
    cat ui.json | thicket - '!Box > Button[label="OK"]'

    # Show how a selector was understood
    thicket ui.json 'A>B:NTH-CHILD(odd)' --chain

    # List the custom pseudo-selectors
    thicket --pseudos
"#)]
struct Cli {
    /// JSON tree description, or `-` for stdin
    #[arg(value_name = "TREE", required_unless_present = "pseudos")]
    tree: Option<PathBuf>,

    /// Selector to run
    #[arg(value_name = "SELECTOR", required_unless_present = "pseudos")]
    selector: Option<String>,

    /// What to report
    #[arg(short, long, value_enum, default_value_t = Mode::All)]
    mode: Mode,

    /// Print matches as JSON instead of paths
    #[arg(long)]
    json: bool,

    /// List the registered custom pseudo-selectors
    #[arg(long)]
    pseudos: bool,

    /// Print the canonical form of the parsed selector before the results
    #[arg(long)]
    chain: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Test the root node only
    Bool,
    /// First match in document order
    First,
    /// The match, if there is exactly one
    Unique,
    /// Every match in document order
    All,
}

/// One match in `--json` output.
#[derive(Serialize)]
struct Match<'a> {
    path: String,
    #[serde(flatten)]
    data: &'a NodeData,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    thicket_tree::pseudo::register();

    if cli.pseudos {
        print_pseudos();
        if cli.tree.is_none() {
            return Ok(ExitCode::SUCCESS);
        }
    }

    let (Some(path), Some(selector)) = (&cli.tree, &cli.selector) else {
        anyhow::bail!("a tree and a selector are required");
    };

    let matcher = Matcher::parse(selector).with_context(|| format!("invalid selector `{selector}`"))?;
    if cli.chain {
        print_chain(&matcher);
    }

    let tree = load_tree(path)?;
    let root = tree.root();

    if cli.mode == Mode::Bool {
        let hit = matcher.matches(&root);
        if cli.json {
            println!("{}", serde_json::to_string(&hit)?);
        } else if hit {
            println!("{}", "true".green());
        } else {
            println!("{}", "false".red());
        }
        return Ok(exit_code(hit));
    }

    let found = match cli.mode {
        Mode::First => matcher.query_first(&root).into_iter().collect(),
        Mode::Unique => matcher.query_unique(&root).into_iter().collect(),
        Mode::All | Mode::Bool => matcher.query_all(&root),
    };

    if cli.json {
        print_json(&found)?;
    } else {
        for node in &found {
            println!("{}", node.path());
        }
        let summary = format!("{} match(es)", found.len());
        eprintln!("{}", summary.dimmed());
    }
    Ok(exit_code(!found.is_empty()))
}

/// Read a tree from `path`, or from stdin for `-`.
fn load_tree(path: &Path) -> Result<Tree> {
    if path == Path::new("-") {
        return Tree::from_reader(io::stdin().lock()).context("failed to load tree from stdin");
    }
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    Tree::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to load tree from {}", path.display()))
}

fn print_chain(matcher: &Matcher) {
    println!("{} {}", "selector:".bold(), matcher.chain());
    println!(
        "{} subject at node {}, {} nodes",
        "chain:".bold(),
        matcher.subject_index(),
        matcher.chain().len()
    );
}

fn print_pseudos() {
    for pseudo in custom_pseudos() {
        println!("{} {}", format!("{:<12}", pseudo.ident).cyan(), pseudo.blurb);
    }
}

fn print_json(found: &[NodeRef<'_>]) -> Result<()> {
    let matches: Vec<Match<'_>> = found
        .iter()
        .map(|node| Match {
            path: node.path(),
            data: node.data(),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&matches)?);
    Ok(())
}

const fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
