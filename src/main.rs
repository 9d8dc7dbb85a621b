use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

mod artifacts;
mod classifier;
mod dataset;
mod error;
mod features;
mod form;
mod models;
mod page;
mod predict;
mod server;

use artifacts::Artifacts;
use classifier::Model;
use dataset::ReferenceDataset;

#[derive(Parser)]
#[command(name = "telco-churn-form")]
#[command(about = "Customer churn prediction form backed by a pre-trained classifier", long_about = None)]
struct Cli {
    /// Reference dataset the categorical encoding is derived from
    #[arg(long, global = true, env = "CHURN_DATA", default_value = "first_telc.csv")]
    data: PathBuf,
    /// Serialized model artifact
    #[arg(long, global = true, env = "CHURN_MODEL", default_value = "model.json")]
    model: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the prediction form over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,
        #[arg(long, default_value_t = 6060)]
        port: u16,
    },
    /// Score one customer described by a JSON file
    Predict {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the feature columns the reference dataset encodes to
    Columns,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("telco_churn_form=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    info!(cwd = %std::env::current_dir()?.display(), "Starting");

    match cli.command {
        Commands::Serve { host, port } => {
            let artifacts = Arc::new(Artifacts::load(&cli.data, &cli.model));
            server::serve(artifacts, SocketAddr::new(host, port)).await?;
        }
        Commands::Predict { input } => {
            let dataset = ReferenceDataset::from_path(&cli.data)?;
            let model = Model::from_path(&cli.model)?;
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let outcome = predict::predict_json(&raw, &dataset, &model)
                .with_context(|| format!("failed to score {}", input.display()))?;
            println!("{}", outcome.headline);
            println!("{}", outcome.detail);
        }
        Commands::Columns => {
            let dataset = ReferenceDataset::from_path(&cli.data)?;
            let summary = dataset.summary();
            println!(
                "{} reference rows, {} without a tenure bucket.",
                summary.rows, summary.unbucketed
            );
            if let (Some(monthly), Some(total)) =
                (summary.mean_monthly_charges, summary.mean_total_charges)
            {
                println!("Mean charges: {monthly:.2} monthly, {total:.2} total.");
            }
            for (label, count) in summary.buckets.iter() {
                println!("- tenure {label}: {count} rows");
            }
            println!("Encoded columns:");
            for column in features::expected_columns(&dataset) {
                println!("{column}");
            }
        }
    }

    Ok(())
}
