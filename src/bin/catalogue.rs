//! Feature Catalogue CLI
//!
//! Projects catalogue graphs into documents, checks them for cycles and
//! missing identifiers, and resolves documents back into graphs.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, ValueEnum};
use feature_catalogue::graph::analyze;
use feature_catalogue::{
    resolve_document, CatalogueConfig, CatalogueGraph, Document, GraphFile,
    MissingIdentifierPolicy, NodeKind, OutputFormat, ProjectionContext,
};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "catalogue")]
#[command(about = "Project feature catalogue graphs into reference-stubbed documents")]
#[command(version)]
struct Cli {
    /// Config file (defaults: catalogue.toml, .catalogue.toml, config/catalogue.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a graph file into a document
    Project {
        /// Graph file (JSON)
        #[arg(short, long)]
        input: PathBuf,
        /// Root node: identifier or name (defaults to the first catalogue)
        #[arg(short, long)]
        root: Option<String>,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override the configured missing-identifier policy
        #[arg(long, value_enum)]
        policy: Option<Policy>,
        /// Compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Report cycles and nodes that need identifiers
    Check {
        /// Graph files or directories (searched recursively for *.json)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Rebuild a graph file from a document
    Resolve {
        /// Document file (JSON)
        #[arg(short, long)]
        input: PathBuf,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export a graph file to GraphViz DOT
    Dot {
        #[arg(short, long)]
        input: PathBuf,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fuzzy-find nodes by name or identifier
    Find {
        #[arg(short, long)]
        input: PathBuf,
        query: String,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    Allow,
    Warn,
    Deny,
}

impl From<Policy> for MissingIdentifierPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Allow => MissingIdentifierPolicy::Allow,
            Policy::Warn => MissingIdentifierPolicy::Warn,
            Policy::Deny => MissingIdentifierPolicy::Deny,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the command ran but found problems
fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = CatalogueConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Commands::Project {
            input,
            root,
            output,
            policy,
            compact,
        } => {
            if let Some(policy) = policy {
                config.projection.missing_identifier = policy.into();
            }
            if compact {
                config.export.output_format = OutputFormat::Compact;
            }

            let graph = load_graph(&input)?;
            let root_index = match root.as_deref() {
                Some(query) => graph
                    .resolve(query)
                    .ok_or_else(|| anyhow!("no node matches root {:?}", query))?,
                None => graph
                    .first_of_kind(NodeKind::FeatureCatalogue)
                    .ok_or_else(|| anyhow!("graph has no feature catalogue; pass --root"))?,
            };

            let tree = ProjectionContext::new(&graph, config.projection_options())
                .project(root_index)
                .with_context(|| format!("failed to project from {}", graph.label(root_index)))?;
            let document = Document::new(tree)?;
            emit(output.as_deref(), &document.to_string(&config.export)?)?;

            eprintln!(
                "Projected {}: {} full, {} stubs",
                graph.label(root_index),
                document.stats.full,
                document.stats.stubs
            );
            Ok(true)
        }

        Commands::Check { paths } => {
            let mut all_ok = true;
            for file in collect_json_files(&paths) {
                match check_file(&file) {
                    Ok(ok) => all_ok &= ok,
                    Err(e) => {
                        println!("❌ {} - {:#}", file.display(), e);
                        all_ok = false;
                    }
                }
            }
            Ok(all_ok)
        }

        Commands::Resolve { input, output } => {
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let document = Document::parse(&content)?;
            let graph = resolve_document(&document.root)?;
            let file = GraphFile::from_graph(&graph);
            emit(output.as_deref(), &file.to_string(config.export.output_format)?)?;

            eprintln!(
                "Resolved {} nodes, {} links",
                graph.node_count(),
                graph.link_count()
            );
            Ok(true)
        }

        Commands::Dot { input, output } => {
            let graph = load_graph(&input)?;
            emit(output.as_deref(), &graph.to_dot())?;
            Ok(true)
        }

        Commands::Find {
            input,
            query,
            limit,
        } => {
            let graph = load_graph(&input)?;
            let results = graph.search(&query, limit);
            if results.is_empty() {
                println!("No matches for {:?}", query);
            }
            for hit in results {
                println!(
                    "{:>5}  {:<20} {:<24} {}",
                    hit.score,
                    hit.kind,
                    hit.name.as_deref().unwrap_or("-"),
                    graph.label(hit.index)
                );
            }
            Ok(true)
        }
    }
}

fn load_graph(path: &Path) -> anyhow::Result<CatalogueGraph> {
    let file = GraphFile::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let (graph, _) = file.into_graph()?;
    Ok(graph)
}

fn emit(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}

fn collect_json_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .map(|e| e.into_path())
                .filter(|p| p.is_file() && p.extension().map(|e| e == "json").unwrap_or(false))
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    files
}

fn check_file(path: &Path) -> anyhow::Result<bool> {
    let graph = load_graph(path)?;
    let analysis = analyze(&graph);

    if analysis.missing_identifiers.is_empty() {
        println!(
            "✅ {} - {} nodes, {} links, {} cycle groups, {} shared",
            path.display(),
            graph.node_count(),
            graph.link_count(),
            analysis.groups.len(),
            analysis.shared.len()
        );
        return Ok(true);
    }

    println!(
        "❌ {} - {} nodes need an identifier",
        path.display(),
        analysis.missing_identifiers.len()
    );
    for missing in &analysis.missing_identifiers {
        let name = graph
            .node(missing.index)
            .and_then(|n| n.name())
            .unwrap_or("-");
        let group = analysis
            .group_of(missing.index)
            .map(|g| format!(" [cycle group {}, {} members]", g.id, g.members.len()))
            .unwrap_or_default();
        println!(
            "  {} {} ({}): {}{}",
            missing.kind,
            graph.label(missing.index),
            name,
            missing.reason,
            group
        );
    }
    Ok(false)
}
