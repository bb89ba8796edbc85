//! Sprout CLI entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sprout_core::{
    CapabilityRegistry, Engine, EngineConfig, Scenario, World,
    value::properties_to_json,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sprout")]
#[command(about = "Declarative entity and route construction")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct EngineArgs {
    /// Extra prototype documents, loaded in order
    #[arg(short, long = "prototypes")]
    prototypes: Vec<PathBuf>,

    /// Prototype fragment documents, applied after all prototypes
    #[arg(short, long)]
    fragments: Vec<PathBuf>,

    /// Engine config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip the built-in prototype catalogue
    #[arg(long)]
    no_defaults: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List prototypes, or show one prototype in detail
    Prototypes {
        #[command(flatten)]
        engine: EngineArgs,

        /// Prototype to show
        #[arg(long)]
        id: Option<String>,
    },

    /// Apply a scenario and print the resulting world as JSON
    Apply {
        /// Scenario file
        scenario: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
}

fn build_engine(args: &EngineArgs) -> Result<Engine, Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    let mut engine = if args.no_defaults {
        let mut engine = Engine::empty(config);
        *engine.capabilities_mut() = CapabilityRegistry::with_builtins();
        engine
    } else {
        Engine::new(config)?
    };

    for path in &args.prototypes {
        engine.prototypes_mut().load_file(path)?;
    }
    for path in &args.fragments {
        engine.prototypes_mut().load_fragments_file(path)?;
    }
    Ok(engine)
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<(), serde_json::Error> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{output}");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("sprout=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Prototypes { engine, id } => {
            let engine = build_engine(&engine)?;

            match id {
                Some(id) => {
                    let prototype = engine.prototypes().lookup(id.as_str())?;
                    let capabilities: Vec<&str> = prototype
                        .capabilities()
                        .iter()
                        .map(|c| c.type_name().unwrap_or("<factory>"))
                        .collect();
                    let detail = serde_json::json!({
                        "id": prototype.id(),
                        "parent": prototype.parent().map(|p| p.id()),
                        "ancestors": prototype.ancestors().skip(1).map(|p| p.id()).collect::<Vec<_>>(),
                        "domain": prototype.domain(),
                        "category": prototype.category(),
                        "subcategory": prototype.subcategory(),
                        "factory": prototype.factory(),
                        "abstract": prototype.is_abstract(),
                        "properties": properties_to_json(&prototype.resolved_properties()),
                        "capabilities": capabilities,
                    });
                    print_json(&detail, true)?;
                }
                None => {
                    for prototype in engine.prototypes().prototypes() {
                        let parent = prototype.parent().map(|p| p.id()).unwrap_or("-");
                        let marker = if prototype.is_abstract() { " (abstract)" } else { "" };
                        println!("{}\t{}{}", prototype.id(), parent, marker);
                    }
                }
            }
        }

        Commands::Apply {
            scenario,
            engine,
            pretty,
        } => {
            let mut engine = build_engine(&engine)?;
            let mut world = World::new();

            info!("Applying scenario {}", scenario.display());
            let report = Scenario::from_file(&scenario)?.apply(&mut engine, &mut world)?;
            info!(
                "Created {} prototypes, {} entities, {} polygons",
                report.prototypes.len(),
                report.entities.len(),
                report.polygons.len()
            );

            print_json(&world.snapshot(), pretty)?;
        }
    }

    Ok(())
}
