//! maskjit CLI
//!
//! Query the typing layer from the command line: how an operator types over
//! masked operands, what a join unifies to, what a string method returns, and
//! which foreign routines the backend must link against.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use maskjit_typing::TypingConfig;

use crate::output::{resolve_color_choice, StyledOutput};

#[derive(Parser)]
#[command(name = "maskjit")]
#[command(about = "Type inference for nullable-column user functions", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "maskjit.toml")]
    config: PathBuf,

    /// Log typing decisions (same as MASKJIT_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// When to use colors: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Type an operator over operand types
    Op {
        /// Operator symbol, math function, or one of is, len, bool, Masked
        op: String,
        /// Operand types, e.g. "Masked(int32)" NA float64
        #[arg(required = true, num_args = 1..=2)]
        operands: Vec<String>,
    },

    /// Unify two types at a control-flow join
    Unify {
        /// First type
        a: String,
        /// Second type
        b: String,
    },

    /// Type an attribute or bound method on a receiver
    Method {
        /// Receiver type
        receiver: String,
        /// Attribute or method name
        name: String,
        /// Argument types
        args: Vec<String>,
    },

    /// Pack a function result type
    Pack {
        /// Type of the returned expression
        ty: String,
    },

    /// List the foreign string routines
    Bindings,

    /// Print the effective configuration
    Config,
}

fn init_logging(verbose: bool) {
    let env = env_logger::Env::new().filter_or("MASKJIT_LOG", "warn");
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = TypingConfig::load_or_default(&cli.config)?;
    let mut out = StyledOutput::new(resolve_color_choice(cli.color.as_deref()));

    match cli.command {
        Commands::Op { op, operands } => commands::op::execute(&mut out, &config, &op, &operands),
        Commands::Unify { a, b } => commands::unify::execute(&mut out, &a, &b),
        Commands::Method {
            receiver,
            name,
            args,
        } => commands::method::execute(&mut out, &config, &receiver, &name, &args),
        Commands::Pack { ty } => commands::pack::execute(&mut out, &config, &ty),
        Commands::Bindings => commands::bindings::execute(&mut out),
        Commands::Config => commands::config::execute(&mut out, &config),
    }
}
