//! graph-cli - Drive the node graph canvas from the command line.
//!
//! Loads a graph snapshot from JSON, routes its wires, replays scripted
//! input sessions and applies commands with the reference executor.

use anyhow::{bail, Context, Result};
use api::{execute_command, Command, CommandResult};
use canvas::{CanvasConfig, InputEvent, MenuContents, NodeGraphCanvas, ViewportTransform, NO_SEARCH_RESULTS};
use clap::{Parser, Subcommand};
use glam::DVec2;
use log::{debug, info};
use node::GraphSnapshot;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// graph-cli - inspect and script the node graph canvas
#[derive(Parser)]
#[command(name = "graph-cli")]
#[command(about = "Command-line interface for the node graph canvas")]
struct Cli {
    /// Canvas config file (JSON); unset fields keep their defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the routed wires of a snapshot
    Wires {
        /// Snapshot file (JSON)
        snapshot: PathBuf,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Replay a scripted input session against a snapshot
    Replay {
        /// Snapshot file (JSON)
        snapshot: PathBuf,

        /// Input events file (JSON array)
        events: PathBuf,

        /// Print the snapshot after every command has been applied
        #[arg(long)]
        print_snapshot: bool,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Apply commands to a snapshot and print the result
    Execute {
        /// Snapshot file (JSON)
        snapshot: PathBuf,

        /// JSON command, or a JSON array of commands
        json: String,
    },

    /// Print the search menu contents for a term
    Menu {
        /// Snapshot file (JSON) providing the node-type catalog
        snapshot: PathBuf,

        /// Search term
        #[arg(short, long, default_value = "")]
        term: String,
    },

    /// Print the dot grid for a zoom level
    Grid {
        #[command(flatten)]
        view: ViewArgs,
    },
}

#[derive(clap::Args)]
struct ViewArgs {
    /// Zoom scale
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Horizontal pan in graph units
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pan_x: f64,

    /// Vertical pan in graph units
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pan_y: f64,
}

impl ViewArgs {
    fn viewport(&self) -> Result<ViewportTransform> {
        ViewportTransform::with_transform(self.scale, DVec2::new(self.pan_x, self.pan_y)).context("Invalid view")
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Wires { snapshot, view } => print_wires(config, &snapshot, &view),
        Commands::Replay {
            snapshot,
            events,
            print_snapshot,
            view,
        } => replay(config, &snapshot, &events, &view, print_snapshot),
        Commands::Execute { snapshot, json } => execute(&snapshot, &json),
        Commands::Menu { snapshot, term } => print_menu(config, &snapshot, term),
        Commands::Grid { view } => print_grid(config, &view),
    }
}

fn load_config(path: Option<&Path>) -> Result<CanvasConfig> {
    let Some(path) = path else {
        return Ok(CanvasConfig::default());
    };
    let config: CanvasConfig = read_json(path)?;
    config
        .validate()
        .with_context(|| format!("Invalid config in {}", path.display()))?;
    debug!("loaded config from {}", path.display());
    Ok(config)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn canvas_for(config: CanvasConfig, snapshot: &Path, view: &ViewArgs) -> Result<NodeGraphCanvas> {
    let mut canvas = NodeGraphCanvas::new(config)?;
    canvas.set_snapshot(read_json(snapshot)?);
    canvas.set_viewport(view.viewport()?);
    Ok(canvas)
}

fn print_wires(config: CanvasConfig, snapshot: &Path, view: &ViewArgs) -> Result<()> {
    let mut canvas = canvas_for(config, snapshot, view)?;
    let wires = canvas.wires();
    info!("routed {} wires", wires.len());
    print_json(&wires)
}

/// One emitted command and what the executor made of it.
#[derive(Serialize)]
struct ReplayStep {
    event: usize,
    command: Command,
    result: CommandResult,
}

fn replay(config: CanvasConfig, snapshot: &Path, events: &Path, view: &ViewArgs, print_snapshot: bool) -> Result<()> {
    let mut canvas = canvas_for(config, snapshot, view)?;
    let events: Vec<InputEvent> = read_json(events)?;
    let mut steps = Vec::new();

    for (index, event) in events.iter().enumerate() {
        let commands = canvas.handle_event(event);
        if commands.is_empty() {
            continue;
        }
        let mut document = canvas.snapshot().clone();
        for command in commands {
            let result = execute_command(&mut document, command.clone());
            steps.push(ReplayStep {
                event: index,
                command,
                result,
            });
        }
        canvas.set_snapshot(document);
    }

    info!("replayed {} events, {} commands", events.len(), steps.len());
    print_json(&steps)?;
    if print_snapshot {
        print_json(canvas.snapshot())?;
    }
    Ok(())
}

fn execute(snapshot: &Path, json: &str) -> Result<()> {
    let mut document: GraphSnapshot = read_json(snapshot)?;
    let value: serde_json::Value = serde_json::from_str(json).context("Invalid JSON")?;
    let commands: Vec<Command> = if value.is_array() {
        serde_json::from_value(value).context("Invalid command list")?
    } else {
        vec![serde_json::from_value(value).context("Invalid command")?]
    };

    let results: Vec<CommandResult> = commands
        .into_iter()
        .map(|command| execute_command(&mut document, command))
        .collect();
    print_json(&results)?;
    print_json(&document)?;

    if results.iter().any(|result| !result.is_success()) {
        bail!("Some commands failed");
    }
    Ok(())
}

fn print_menu(config: CanvasConfig, snapshot: &Path, term: String) -> Result<()> {
    let mut canvas = NodeGraphCanvas::new(config)?;
    canvas.set_snapshot(read_json(snapshot)?);
    canvas.set_search_term(term);

    match canvas.menu_contents() {
        MenuContents::NoResults => println!("{NO_SEARCH_RESULTS}"),
        MenuContents::Sections(sections) => {
            for section in sections {
                let marker = if section.expanded { "v" } else { ">" };
                println!("{marker} {}", section.category);
                if section.expanded {
                    for entry in section.entries {
                        println!("    {entry}");
                    }
                }
            }
        }
    }
    Ok(())
}

fn print_grid(config: CanvasConfig, view: &ViewArgs) -> Result<()> {
    let mut canvas = NodeGraphCanvas::new(config)?;
    canvas.set_viewport(view.viewport()?);
    print_json(&canvas.grid())
}
