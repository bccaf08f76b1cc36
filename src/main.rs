use std::fs;
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use cast_layout::analysis::load_graph;
use cast_layout::sim::LayoutRng;
use cast_layout::util::{link_width, node_radius, short_name};
use cast_layout::{DriverStatus, Simulation, SimulationConfig};
use clap::Parser;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Run the layout to convergence and print final positions as JSON.
    Layout(SimArgs),
    /// Tick in the background and sample positions once per frame, the way a
    /// renderer would.
    Live {
        #[command(flatten)]
        sim: SimArgs,
        #[arg(long, default_value_t = 600)]
        frames: u32,
    },
}

#[derive(Debug, clap::Args)]
struct SimArgs {
    /// Book analysis or `{nodes, links}` graph JSON.
    file: PathBuf,
    #[arg(long, default_value_t = 1000.0)]
    width: f32,
    #[arg(long, default_value_t = 1000.0)]
    height: f32,
    /// Seed for the initial scatter; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// JSON file overriding simulation tunables.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct LayoutOutput<'a> {
    width: f32,
    height: f32,
    tick: u64,
    alpha: f32,
    nodes: Vec<PositionedNode<'a>>,
    links: Vec<PositionedLink<'a>>,
}

#[derive(Serialize)]
struct PositionedNode<'a> {
    id: &'a str,
    name: &'a str,
    x: f32,
    y: f32,
    radius: f32,
    pinned: bool,
}

#[derive(Serialize)]
struct PositionedLink<'a> {
    source: &'a str,
    target: &'a str,
    width: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Layout(sim) => {
            let simulation = build_simulation(&sim)?;
            let ticks = simulation.run_to_convergence();
            info!(ticks, alpha = simulation.alpha(), "layout converged");
            print_layout(&simulation, sim.pretty)
        }
        Command::Live { sim, frames } => {
            let simulation = build_simulation(&sim)?;
            run_live(&simulation, frames);
            print_layout(&simulation, sim.pretty)
        }
    }
}

fn build_simulation(args: &SimArgs) -> Result<Simulation> {
    let graph = load_graph(&args.file)?;
    let config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            serde_json::from_str::<SimulationConfig>(&raw)
                .with_context(|| format!("invalid config file {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };
    let rng = match args.seed {
        Some(seed) => LayoutRng::seed_from_u64(seed),
        None => LayoutRng::from_entropy(),
    };

    Simulation::with_config(graph, args.width, args.height, config, rng)
        .context("failed to create simulation")
}

fn run_live(simulation: &Simulation, frames: u32) {
    let frame_interval = simulation.config().tick_interval();
    let heaviest = simulation
        .graph()
        .nodes()
        .iter()
        .max_by(|a, b| a.weight.total_cmp(&b.weight))
        .map(|node| node.id.clone());

    simulation.start();
    for frame in 0..frames {
        thread::sleep(frame_interval);
        let snapshot = simulation.snapshot();

        if frame % 30 == 0 {
            let hub = heaviest.as_deref().and_then(|id| {
                let node = snapshot.graph().node(id)?;
                Some((short_name(&node.name).to_owned(), snapshot.position(id)?))
            });
            match hub {
                Some((name, position)) => info!(
                    frame,
                    tick = snapshot.tick,
                    alpha = snapshot.alpha,
                    hub = %name,
                    x = position.x,
                    y = position.y,
                    "frame"
                ),
                None => info!(frame, tick = snapshot.tick, alpha = snapshot.alpha, "frame"),
            }
        }

        if simulation.status() != DriverStatus::Running {
            info!(frame, tick = snapshot.tick, "simulation cooled down");
            break;
        }
    }
    simulation.stop();
}

fn print_layout(simulation: &Simulation, pretty: bool) -> Result<()> {
    let snapshot = simulation.snapshot();
    let viewport = simulation.viewport();
    let graph = snapshot.graph();
    let nodes = snapshot
        .nodes
        .iter()
        .zip(graph.nodes())
        .map(|(sim_node, node)| PositionedNode {
            id: &node.id,
            name: &node.name,
            x: sim_node.position.x,
            y: sim_node.position.y,
            radius: node_radius(node.weight),
            pinned: sim_node.anchor.is_pinned(),
        })
        .collect();
    let links = graph
        .links()
        .iter()
        .filter(|link| graph.resolve(link).is_some())
        .map(|link| PositionedLink {
            source: &link.source,
            target: &link.target,
            width: link_width(link.weight),
        })
        .collect();

    let output = LayoutOutput {
        width: viewport.width,
        height: viewport.height,
        tick: snapshot.tick,
        alpha: snapshot.alpha,
        nodes,
        links,
    };
    let json = if pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .context("failed to serialize layout")?;
    println!("{json}");
    Ok(())
}
