//! doi: rank the files of a project by degree of interest.
//!
//! Scans the root, replays activity and change commands read from stdin,
//! then prints the ranking.
//!
//! ```text
//! nav src/app.ts          edit src/util.ts        save src/app.ts
//! create src/new.ts       delete src/old.ts       rename src/a.ts src/b.ts
//! neighbors src/app.ts
//! ```

use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use doi_graph::view::{self, Band, BandFilter};
use doi_graph::{DoiConfig, DoiGraph, FileNode, GraphStore};

#[derive(Parser)]
#[command(name = "doi", about = "Degree-of-interest ranking for source files")]
#[command(version)]
struct Cli {
    /// Project source root
    root: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of rows to print (all when omitted)
    #[arg(short = 'n', long)]
    top: Option<usize>,

    /// Only print files at or above this band: low, medium, high
    #[arg(long, value_parser = parse_band_filter)]
    min_band: Option<BandFilter>,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    /// Do not read commands from stdin
    #[arg(long)]
    no_stdin: bool,
}

#[derive(Serialize)]
struct Row<'a> {
    path: &'a Path,
    weight: f64,
    band: Band,
}

#[derive(Serialize)]
struct Report<'a> {
    root: &'a Path,
    nodes: usize,
    edges: usize,
    files: Vec<Row<'a>>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("doi_graph=info".parse().expect("valid tracing directive")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DoiConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DoiConfig::default(),
    };

    let mut graph = DoiGraph::initialize(&cli.root, config).await?;

    if !cli.no_stdin {
        let stdin = std::io::stdin();
        for (lineno, line) in stdin.lock().lines().enumerate() {
            let line = line?;
            if let Err(e) = run_command(&mut graph, &line, cli.json).await {
                warn!(line = lineno + 1, error = %e, "command skipped");
            }
        }
    }

    let ranked = graph.query_sorted_by_weight();
    let filtered = view::filter_ranked(&ranked, cli.min_band.unwrap_or_default(), &graph.config().bands);
    let shown = &filtered[..cli.top.unwrap_or(filtered.len()).min(filtered.len())];

    if cli.json {
        let report = Report {
            root: graph.root(),
            nodes: graph.store().node_count(),
            edges: graph.store().edge_count(),
            files: rows(&graph, shown),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_rows(&rows(&graph, shown));
    }

    Ok(())
}

async fn run_command(graph: &mut DoiGraph, line: &str, json: bool) -> anyhow::Result<()> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(());
    };
    if verb.starts_with('#') {
        return Ok(());
    }
    let args: Vec<&str> = words.collect();

    match (verb, args.as_slice()) {
        ("nav" | "navigate", [path]) => {
            graph.record_navigation(path);
        }
        ("edit", [path]) => {
            graph.record_edit(path);
        }
        ("save", [path]) => {
            let outcome = graph.persist_dependencies(path).await;
            info!(path = %path, ?outcome, "saved");
        }
        ("create", [path]) => {
            graph.notify_file_created(path);
        }
        ("delete", [path]) => {
            graph.notify_file_deleted(path);
        }
        ("rename", [from, to]) => {
            graph.notify_file_renamed(from, to);
        }
        ("neighbors", [path]) => {
            let neighbors = graph.query_sorted_neighbors(path);
            let rows = rows(graph, &neighbors);
            if json {
                println!("{}", serde_json::to_string(&rows)?);
            } else {
                println!("neighbors of {path}:");
                print_rows(&rows);
            }
        }
        _ => bail!("unrecognized command: {line}"),
    }
    Ok(())
}

fn rows<'a>(graph: &'a DoiGraph, nodes: &'a [FileNode]) -> Vec<Row<'a>> {
    let bands = graph.config().bands;
    nodes
        .iter()
        .map(|node| Row {
            path: node.path.as_path().strip_prefix(graph.root()).unwrap_or(node.path.as_path()),
            weight: node.weight,
            band: bands.classify(node.weight),
        })
        .collect()
}

fn print_rows(rows: &[Row<'_>]) {
    for row in rows {
        println!("{:>6}  {:>9.2}  {}", row.band.to_string(), row.weight, row.path.display());
    }
}

fn parse_band_filter(s: &str) -> Result<BandFilter, String> {
    match s.to_ascii_lowercase().as_str() {
        "none" => Ok(BandFilter::None),
        "low" => Ok(BandFilter::Low),
        "medium" => Ok(BandFilter::Medium),
        "high" => Ok(BandFilter::High),
        other => Err(format!("unknown band '{other}', expected low, medium or high")),
    }
}
