//! map-composer: inspect and re-save map documents against a demo facility
//!
//! Usage:
//!   map-composer list                  # List map documents
//!   map-composer load <name>           # Spawn a map and report what happened
//!   map-composer load <name> --resave  # ...then save it back

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use map_composer::editor::EditorEvents;
use map_composer::room::FacilityLayout;
use map_composer::scene::SceneWorld;
use map_composer::{MapEditor, MapEditorConfig, PlaceableKind};

/// Simulation step used while waiting for a deferred load
const STEP: Duration = Duration::from_millis(10);
/// Give up on a load that has not finished after this long
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "map-composer")]
#[command(about = "Room-relative map documents")]
struct Cli {
    /// Configuration file (RON); defaults apply when it is missing
    #[arg(long, default_value = "map-composer.ron")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the map documents in the maps directory
    List,
    /// Load a map into the demo facility and report the result
    Load {
        name: String,
        /// Save the map back after loading it
        #[arg(long)]
        resave: bool,
    },
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// The CLI has no operators or travelers; log what the editor reported and
/// keep the queues empty between steps
fn drain_events(events: &mut EditorEvents) {
    let spawned = events.spawned.drain().count();
    let deleted = events.deleted.drain().count();
    if spawned + deleted > 0 {
        debug!(spawned, deleted, "scene changed");
    }
    for loaded in events.map_loaded.drain() {
        debug!(map = %loaded.name, spawned = loaded.spawned, failed = loaded.failed, "map loaded");
    }
    events.clear();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = MapEditorConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;
    init_tracing(config.log_level());

    let mut editor = MapEditor::new(config, FacilityLayout::demo(), SceneWorld::new());
    match cli.command {
        Commands::List => {
            let names = editor.store().list()?;
            if names.is_empty() {
                println!("No maps in {}", editor.store().maps_dir().display());
            }
            for name in names {
                println!("{}", name);
            }
        }
        Commands::Load { name, resave } => {
            editor.load_by_name(&name).with_context(|| format!("Failed to load map {}", name))?;

            let mut waited = Duration::ZERO;
            while editor.is_loading() {
                if waited >= LOAD_TIMEOUT {
                    anyhow::bail!("Map {} did not finish loading", name);
                }
                editor.advance(STEP);
                drain_events(&mut editor.events);
                waited += STEP;
            }

            match editor.last_load_report() {
                Some(report) => {
                    for kind in PlaceableKind::LOAD_ORDER {
                        println!("{:>22}: {}", kind.display_name(), report.spawned_of(kind));
                    }
                    for failure in &report.failed {
                        warn!(kind = failure.kind.display_name(), index = failure.index, "{}", failure.message);
                    }
                    info!(map = %name, spawned = report.total_spawned(), failed = report.failed.len(), "done");
                }
                None => println!("Map {} is empty", name),
            }

            if resave {
                let report = editor.save(&name)?;
                drain_events(&mut editor.events);
                println!("Saved {} objects to {}", report.total_saved(), report.path.display());
                if !report.skipped.is_empty() {
                    warn!(count = report.skipped.len(), "some objects were outside every room");
                }
            }
        }
    }
    Ok(())
}
