// src/bin/sapfctl.rs
//
// Command-line driver for the sapf library.
//
// - add:     call `add` repeatedly and print each result
// - graph:   print the environment graph
// - episode: run one episode and print it as JSON
//
// Config precedence: defaults < --config file < SAPF_* env < flags.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sapf::{Accumulator, FixedNode, FollowNode, NativeLibrary, SapfConfig, Session};

#[derive(Debug, Parser)]
#[command(
    name = "sapfctl",
    about = "Drive the sapf native environment library",
    version
)]
struct Args {
    /// Path to the shared object (overrides config and SAPF_LIBRARY).
    #[arg(long, global = true)]
    library: Option<PathBuf>,

    /// JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity: -v, -vv, -vvv
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Call `add` repeatedly, printing one result per line.
    Add {
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        value: i32,

        #[arg(long, default_value_t = 4)]
        times: usize,
    },

    /// Print the environment graph.
    Graph {
        /// Re-render the graph as pretty JSON.
        #[arg(long)]
        pretty: bool,
    },

    /// Run one episode and print it as JSON.
    Episode {
        /// Argument passed to `init` before the first reset.
        #[arg(long)]
        init: Option<String>,

        /// Stop after this many steps.
        #[arg(long)]
        max_steps: Option<u64>,

        /// Always step to this node instead of following the last one.
        #[arg(long, allow_negative_numbers = true)]
        node: Option<i64>,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sapf={default_level},sapfctl={default_level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config<F>(args: &Args, lookup: F) -> Result<SapfConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &args.config {
        Some(path) => SapfConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => SapfConfig::default(),
    };
    config = config.apply_lookup(lookup).context("reading SAPF_* environment")?;

    if let Some(library) = &args.library {
        config.library_path = library.clone();
    }
    if let Command::Episode { init, max_steps, .. } = &args.command {
        if init.is_some() {
            config.init = init.clone();
        }
        if max_steps.is_some() {
            config.max_steps = *max_steps;
        }
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(&args, |key| std::env::var(key).ok())?;
    debug!(?config, "effective config");

    match args.command {
        Command::Add { value, times } => {
            let mut library = NativeLibrary::open(&config.library_path)
                .with_context(|| format!("opening {}", config.library_path.display()))?;
            for _ in 0..times {
                println!("{}", library.add(value)?);
            }
        }
        Command::Graph { pretty } => {
            let mut session = open_session(config)?;
            if pretty {
                let graph = session.graph_json()?;
                println!("{}", serde_json::to_string_pretty(&graph)?);
            } else {
                println!("{}", session.graph()?);
            }
        }
        Command::Episode { node, .. } => {
            let mut session = open_session(config)?;
            let episode = match node {
                Some(node) => session.run_episode(&mut FixedNode(node))?,
                None => session.run_episode(&mut FollowNode)?,
            };
            println!("{}", serde_json::to_string_pretty(&episode)?);
        }
    }

    Ok(())
}

fn open_session(config: SapfConfig) -> Result<Session> {
    let path = config.library_path.clone();
    Session::open(config).with_context(|| format!("opening {}", path.display()))
}
