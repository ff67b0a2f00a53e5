mod wiring;

use clap::{Parser, Subcommand};
use georest_core::{GeoPoint, Location, RegionIdentifier};
use georest_suggest::EngineResultSet;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "georest")]
#[command(about = "Geo resolution and multi-engine suggestions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Suggest couriers, orders and regions for free text
    Suggest {
        text: String,
        /// Print per-engine hits and failures instead of the assembled suggestion
        #[arg(long)]
        raw: bool,
    },
    /// Fill in the missing address or coordinate of a location
    Resolve {
        #[arg(long, conflicts_with_all = ["lat", "lon"], required_unless_present = "lat")]
        address: Option<String>,
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },
    /// Show a region's display name and boundary
    Region {
        /// Entity kind, e.g. R for an OSM relation
        #[arg(long, default_value = "R")]
        kind: String,
        #[arg(long)]
        id: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = georest_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let components = wiring::build(&config)?;
    let output = match cli.command {
        Commands::Suggest { text, raw: false } => {
            let suggestion = components.suggestions.suggest_all(&text, &cancel).await?;
            serde_json::to_value(suggestion)?
        }
        Commands::Suggest { text, raw: true } => {
            let results = components.suggestions.suggest(&text, &cancel).await?;
            raw_report(&results)
        }
        Commands::Resolve { address, lat, lon } => {
            let location = match (address, lat, lon) {
                (Some(address), _, _) => Location::from_address(address),
                (None, Some(lat), Some(lon)) => Location::from_point(GeoPoint::new(lat, lon)),
                _ => anyhow::bail!("pass --address, or both --lat and --lon"),
            };
            let resolved = components.addresses.resolve(&location, &cancel).await?;
            serde_json::to_value(resolved)?
        }
        Commands::Region { kind, id } => {
            let region = RegionIdentifier::new(kind, id);
            let boundary = components.regions.resolve(&region, &cancel).await?;
            let name = components
                .regions
                .lookup_display_name(&region, &cancel)
                .await?;
            json!({ "region": region, "name": name, "boundary": boundary })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("interrupt received, cancelling");
        cancel.cancel();
    }
}

/// Per-engine view of a round: hit ids with their documents, and the
/// failure if the engine recorded one.
fn raw_report(results: &EngineResultSet) -> Value {
    let mut report = serde_json::Map::new();
    for (key, entry) in results {
        let hits: Vec<Value> = entry
            .hits
            .iter()
            .map(|hit| {
                let document = hit
                    .decode::<Value>()
                    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&hit.payload).into()));
                json!({ "id": hit.id, "document": document })
            })
            .collect();
        report.insert(
            key.to_string(),
            json!({
                "hits": hits,
                "failure": entry.failure.as_ref().map(ToString::to_string),
            }),
        );
    }
    Value::Object(report)
}
