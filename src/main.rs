use clap::{Parser, Subcommand};
use dataset_planner::{DatasetSpec, Issues, OperationGraph, Result, render};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dataset-planner")]
#[command(about = "Compile dataset descriptions into executable operation plans", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the operation plan and print it (validates while building).
    Plan {
        /// Dataset description JSON.
        #[arg(long)]
        metadata: String,

        /// Root folder for local files and the download/extract caches.
        #[arg(long, default_value = ".")]
        folder: String,

        /// Output format: "text" or "dot".
        #[arg(long, default_value = "text")]
        format: String,

        #[arg(short = 'o', long)]
        out: Option<String>,
    },

    /// Build and validate only; report issues without printing the plan.
    Check {
        /// Dataset description JSON.
        #[arg(long)]
        metadata: String,

        /// Root folder for local files and the download/extract caches.
        #[arg(long, default_value = ".")]
        folder: String,
    },
}

/// Load, validate, compile, and structurally check one description.
fn build_checked_graph(metadata: &str, folder: &str) -> Result<OperationGraph> {
    let text = std::fs::read_to_string(metadata)
        .map_err(|e| anyhow::anyhow!("read metadata file {}: {}", metadata, e))?;
    let dataset: DatasetSpec = serde_json::from_str(&text)
        .map_err(|e| anyhow::anyhow!("parse metadata file {}: {}", metadata, e))?;
    let structure = dataset.validate_and_build()?;

    let mut graph = OperationGraph::from_structure(&structure, Path::new(folder), Issues::new())?;
    graph.check_graph();
    Ok(graph)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Plan {
            metadata,
            folder,
            format,
            out,
        } => {
            let graph = build_checked_graph(&metadata, &folder)?;
            eprint!("{}", graph.issues().report());
            if graph.issues().has_errors() {
                anyhow::bail!(
                    "found {} error(s) in {}",
                    graph.issues().errors().len(),
                    metadata
                );
            }

            let rendered = match format.as_str() {
                "text" => render::render_text(graph.operations()),
                "dot" => render::render_dot(graph.operations()),
                other => anyhow::bail!("unknown format: {} (expected \"text\" or \"dot\")", other),
            };
            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    println!("Wrote {}", path);
                }
                None => print!("{}", rendered),
            }
        }
        Commands::Check { metadata, folder } => {
            let graph = build_checked_graph(&metadata, &folder)?;
            eprint!("{}", graph.issues().report());
            if graph.issues().has_errors() {
                anyhow::bail!(
                    "found {} error(s) in {}",
                    graph.issues().errors().len(),
                    metadata
                );
            }
            println!(
                "OK: {} operation(s), no issues found",
                graph.operations().len()
            );
        }
    }

    Ok(())
}
