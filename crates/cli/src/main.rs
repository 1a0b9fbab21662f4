use anyhow::Context;
use clap::{Parser, Subcommand};
use medrec_core::config::{data_dir_from_env_value, sequence_width_from_env_value};
use medrec_core::{CoreConfig, EntityKind, RegistryService};
use medrec_uhid::{Uhid, UhidGenerator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "medrec")]
#[command(about = "MedRec UHID assignment and record registry CLI")]
struct Cli {
    /// Record storage directory (overrides MEDREC_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive a UHID from a name and numeric identifier without storing anything
    Generate {
        /// Display name
        name: String,
        /// Numeric identifier (at least 6 digits; other characters are ignored)
        id: String,
    },
    /// Register a patient or doctor and assign a UHID
    Register {
        /// Entity kind: patient or doctor
        kind: EntityKind,
        /// Display name
        name: String,
    },
    /// List registered records
    List {
        /// Only list records of this kind
        #[arg(long)]
        kind: Option<EntityKind>,
    },
    /// Show the stored record for a UHID
    Show { uhid: Uhid },
    /// Change the display name of a record (the UHID is kept)
    Rename {
        uhid: Uhid,
        /// New display name
        name: String,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("medrec=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { name, id } => {
            let uhid = UhidGenerator::generate(&name, &id)?;
            println!("{}", uhid);
        }
        Commands::Register { kind, name } => {
            let registry = registry(cli.data_dir)?;
            let entity = registry.register(kind, &name)?;
            println!(
                "Registered {} '{}' with UHID: {} (record {})",
                entity.kind, entity.display_name, entity.uhid, entity.record_id
            );
        }
        Commands::List { kind } => {
            let registry = registry(cli.data_dir)?;
            let entities = registry.list(kind);
            if entities.is_empty() {
                println!("No records found.");
            } else {
                for entity in entities {
                    println!(
                        "UHID: {}, Kind: {}, Name: {}, Created: {}",
                        entity.uhid,
                        entity.kind,
                        entity.display_name,
                        entity.created_at.to_rfc3339()
                    );
                }
            }
        }
        Commands::Show { uhid } => {
            let registry = registry(cli.data_dir)?;
            let entity = registry.find(&uhid)?;
            print!("{}", entity.render()?);
        }
        Commands::Rename { uhid, name } => {
            let registry = registry(cli.data_dir)?;
            let entity = registry.rename(&uhid, &name)?;
            println!("Renamed {} to '{}'", entity.uhid, entity.display_name);
        }
    }

    Ok(())
}

/// Resolves configuration once and builds the registry.
///
/// `--data-dir` wins over `MEDREC_DATA_DIR`; `MEDREC_SEQUENCE_WIDTH` sets the padding width.
fn registry(data_dir: Option<PathBuf>) -> anyhow::Result<RegistryService> {
    let data_dir =
        data_dir.unwrap_or_else(|| data_dir_from_env_value(std::env::var("MEDREC_DATA_DIR").ok()));
    let sequence_width =
        sequence_width_from_env_value(std::env::var("MEDREC_SEQUENCE_WIDTH").ok())?;

    let cfg = CoreConfig::new(data_dir, sequence_width).context("invalid configuration")?;
    tracing::debug!(data_dir = %cfg.data_dir().display(), "using data directory");

    Ok(RegistryService::new(Arc::new(cfg)))
}
