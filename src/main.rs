mod config;
mod error;
mod index;
mod patterns;
mod render;
mod rewrite;
mod walk;

use clap::Parser;
use colored::Colorize;
use config::{ParsePolicy, RuleConfig};
use error::LinkError;
use index::{is_markdown, DocumentIndex};
use rewrite::DiagramRewriter;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// doclink - Link mermaid diagram nodes to the documents and sections they name
#[derive(Parser)]
#[command(name = "doclink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Root of the documentation tree
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Link rules file, relative to DIR
    #[arg(short, long, default_value = "link.json")]
    config: PathBuf,

    /// Fail on a link rules file that is not valid JSON instead of ignoring it
    #[arg(long)]
    strict_config: bool,

    /// Report documents that would change without writing them
    #[arg(long)]
    check: bool,

    /// Patterns to exclude, relative to DIR (can be repeated)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long)]
    quiet: bool,
}

struct LinkOptions {
    config: PathBuf,
    policy: ParsePolicy,
    exclude: Vec<String>,
    write: bool,
}

#[derive(Debug, Default)]
struct LinkSummary {
    files: usize,
    documents: usize,
    titles: usize,
    constants: usize,
    diagrams: usize,
    directives: usize,
    /// Relative paths of documents whose content changed (or would change).
    changed: Vec<String>,
    rules_enabled: bool,
    config_warning: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cmd_link(&cli) {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_link(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let root = std::path::absolute(&cli.dir).map_err(|source| LinkError::InvalidRoot {
        path: cli.dir.clone(),
        source,
    })?;

    if !cli.quiet {
        println!("{} {}", "Linking".cyan().bold(), root.display());
    }

    let options = LinkOptions {
        config: root.join(&cli.config),
        policy: if cli.strict_config {
            ParsePolicy::Strict
        } else {
            ParsePolicy::Lenient
        },
        exclude: cli.exclude.clone(),
        write: !cli.check,
    };
    let summary = link_tree(&root, &options)?;

    if !cli.quiet {
        if let Some(warning) = &summary.config_warning {
            eprintln!(
                "{}: ignoring {}: {}",
                "warning".yellow().bold(),
                options.config.display(),
                warning
            );
        }
        if !summary.rules_enabled {
            println!("{}", "No mermaid rule configured, diagrams left as is.".yellow());
        }

        let label = if cli.check { "stale" } else { "updated" };
        for path in &summary.changed {
            println!("  {} {}", label.dimmed(), path);
        }

        println!();
        println!("{}", "Link Statistics".green().bold());
        println!("  Files scanned:    {}", summary.files.to_string().cyan());
        println!("  Documents:        {}", summary.documents.to_string().cyan());
        println!("  Titles indexed:   {}", summary.titles.to_string().cyan());
        println!("  Constants:        {}", summary.constants.to_string().cyan());
        println!("  Diagrams:         {}", summary.diagrams.to_string().cyan());
        println!("  Click directives: {}", summary.directives.to_string().cyan());
        println!("  Documents {}: {}", label, summary.changed.len().to_string().cyan());
        println!("  Time elapsed:     {:.2?}", start.elapsed());
    }

    if cli.check && !summary.changed.is_empty() {
        return Err(format!("{} document(s) need relinking", summary.changed.len()).into());
    }

    Ok(())
}

/// Index every file under `root`, then regenerate the diagram links of each markdown
/// document. Documents are written back only when their content changes, and the first
/// failure stops the run.
fn link_tree(root: &Path, options: &LinkOptions) -> Result<LinkSummary, LinkError> {
    let rules = RuleConfig::load(&options.config, options.policy)?;
    let files = walk::collect_files(root, &options.exclude)?;
    let index = DocumentIndex::build(root, &files)?;
    let rewriter = DiagramRewriter::new(&index, rules.mermaid.as_ref());

    let mut summary = LinkSummary {
        files: index.node_count(),
        titles: index.title_count(),
        constants: rules.constants.len(),
        rules_enabled: rules.mermaid.is_some(),
        config_warning: rules.parse_error.clone(),
        ..LinkSummary::default()
    };

    for path in files.iter().filter(|p| is_markdown(p)) {
        let Some(id) = index.document(path) else {
            continue;
        };
        summary.documents += 1;

        let content = fs::read(path).map_err(|e| LinkError::io(path, e))?;
        let rewrite = rewriter.rewrite(&content, index.sections(id))?;
        summary.diagrams += rewrite.diagrams;
        summary.directives += rewrite.directives;

        if rewrite.text == content {
            continue;
        }
        if options.write {
            fs::write(path, &rewrite.text).map_err(|e| LinkError::io(path, e))?;
        }
        summary
            .changed
            .push(path.strip_prefix(root).unwrap_or(path).to_string_lossy().to_string());
    }

    Ok(summary)
}
