use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;

mod aggregate;
mod load;
mod schema;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "lambstats")]
#[command(about = "Aggregate serverless job-runner timing stats", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mean end-to-end runtime per worker count.
    MeanRuntime {
        /// Root directory holding numeric worker-count subdirectories.
        #[arg(long)]
        data: PathBuf,

        /// Directory name to skip; repeatable.
        #[arg(long)]
        exclude: Vec<String>,

        /// Treat every line as a worker (no reducer line per file).
        #[arg(long)]
        no_map_reduce: bool,

        /// Emit a JSON array instead of a table.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::MeanRuntime {
            data,
            exclude,
            no_map_reduce,
            json,
        } => {
            let forbidden: BTreeSet<String> = exclude.into_iter().collect();

            let dataset = load::load_dataset(&data, &forbidden, !no_map_reduce)?;
            let rows = aggregate::mean_runtime_per_nlambdas(&dataset)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("{:>10}  {:>12}", "nlambdas", "time");
                for row in &rows {
                    println!("{:>10}  {:>12.3}", row.nlambdas, row.time);
                }
            }
        }
    }

    Ok(())
}
