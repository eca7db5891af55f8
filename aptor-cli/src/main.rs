//! Aptor CLI - drive an ascent computation from the command line.
//!
//! This binary exercises the aptor library end to end: it aggregates the
//! bundled demo vessel and, for `compute`, runs the full computation
//! against a solver reachable over TCP.

mod demo;
mod error;
mod logging;

use std::net::SocketAddr;
use std::process;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};

use aptor::ascent::{
    AscentConfig, ComputationController, ComputationOutcome, ComputationState,
};
use aptor::rocket::aggregate;
use aptor::solver::{SolverEndpoint, TcpSessionFactory};

use demo::demo_vessel;
use error::CliError;

#[derive(Parser)]
#[command(name = "aptor")]
#[command(about = "Ascent trajectory computation via an external solver", long_about = None)]
#[command(version = aptor::VERSION)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the aggregated stage and engine tables of the demo vessel
    Rocket,
    /// Run a full ascent computation against a running solver
    Compute(ComputeArgs),
}

#[derive(clap::Args)]
struct ComputeArgs {
    /// Solver host name or address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Solver port
    #[arg(long, default_value = "12345")]
    port: u16,

    /// Local address:port to bind before connecting
    #[arg(long)]
    local: Option<SocketAddr>,

    /// Optimizer iteration budget
    #[arg(long, default_value = "200")]
    iterations: u32,

    /// Mesh node counts for the two trajectory phases
    #[arg(long, num_args = 2, value_names = ["FIRST", "SECOND"], default_values_t = [20u32, 20u32])]
    nodes: Vec<u32>,

    /// Target periapsis in meters
    #[arg(long, default_value = "75000")]
    periapsis: f64,

    /// Run name reported to the solver
    #[arg(long, default_value = "ascent")]
    name: String,

    /// Controller tick interval in milliseconds
    #[arg(long, default_value = "250")]
    tick_ms: u64,
}

fn main() {
    let args = Args::parse();

    let _guard = match logging::init_logging(logging::default_log_dir(), logging::default_log_file())
    {
        Ok(guard) => guard,
        Err(e) => CliError::LoggingInit(e).exit(),
    };

    match args.command {
        Command::Rocket => print_rocket(),
        Command::Compute(compute) => {
            if let Err(e) = run_compute(compute) {
                e.exit();
            }
        }
    }
}

fn print_rocket() {
    let (graph, root) = demo_vessel();
    let rocket = aggregate(&graph, root);

    println!("Stages (index 0 ignites first):");
    for (index, stage) in rocket.stages.iter().enumerate() {
        println!(
            "  stage {index}: mass {:.3} t, initial {:.3} t, fuel {:.3} t, drag {}",
            stage.stage_mass, stage.initial_mass, stage.fuel_mass, stage.drag
        );
    }

    println!("Engines:");
    for engine in &rocket.engines {
        println!(
            "  {:.0} kN, isp {:.0}/{:.0} s, stages [{}..{}]",
            engine.thrust, engine.isp_sea_level, engine.isp_vacuum,
            engine.burnout_stage, engine.ignition_stage
        );
    }

    println!();
    println!("Wire batch (firing order):");
    for index in (0..rocket.stages.len()).rev() {
        let stage = &rocket.stages[index];
        println!(
            "  ADD_STAGE {} {} {}",
            stage.initial_mass, stage.fuel_mass, stage.drag
        );
        for engine in rocket.engines_for_stage(index) {
            println!(
                "  ADD_ENGINE {} {} {}",
                engine.thrust, engine.isp_sea_level, engine.isp_vacuum
            );
        }
    }
}

fn run_compute(args: ComputeArgs) -> Result<(), CliError> {
    let mut endpoint = SolverEndpoint::new(args.host, args.port);
    if let Some(local) = args.local {
        endpoint = endpoint.with_local(local);
    }

    let mut config = AscentConfig {
        iterations: args.iterations,
        target_periapsis: args.periapsis,
        name: args.name,
        ..AscentConfig::default()
    };
    if let [first, second] = args.nodes[..] {
        config.nodes = (first, second);
    }

    let (graph, root) = demo_vessel();
    let rocket = aggregate(&graph, root);
    println!(
        "Computing ascent for {} stages / {} engines via {endpoint}",
        rocket.stages.len(),
        rocket.engines.len()
    );

    let factory = TcpSessionFactory::new(endpoint);
    let mut controller = ComputationController::new(config, Box::new(factory));
    controller.start(&rocket)?;

    let mut last_state = controller.state();
    loop {
        controller.tick();

        let state = controller.state();
        if state != last_state {
            println!("  [{state}]");
            last_state = state;
        }
        if state == ComputationState::Waiting {
            break;
        }
        thread::sleep(Duration::from_millis(args.tick_ms));
    }

    match controller.outcome() {
        Some(ComputationOutcome::Complete) => {
            println!("Ascent profile ({} samples):", controller.ascent().len());
            for point in controller.ascent() {
                println!("  {}", point.describe());
            }
            Ok(())
        }
        _ => {
            if let Some(error) = controller.last_error() {
                eprintln!("Computation aborted: {error}");
            } else {
                eprintln!("Computation aborted");
            }
            if !controller.ascent().is_empty() {
                eprintln!("Partial profile ({} samples) kept:", controller.ascent().len());
                for point in controller.ascent() {
                    eprintln!("  {}", point.describe());
                }
            }
            process::exit(1);
        }
    }
}
