use clap::Parser as ClapParser;
use std::path::PathBuf;
use tack::program::{self, Options, Output};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "tack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Evaluate Tack programs and print the final stack", long_about = None)]
struct Cli {
    /// Source files, evaluated in the given order
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Print only values, leaving out the <def NAME> placeholders
    #[arg(long)]
    values: bool,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tack=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = if cli.values { Output::Values } else { Output::Stack };
    info!(files = cli.files.len(), "loading sources");

    match program::run(&cli.files, &Options::default()) {
        Ok(stack) => {
            info!(depth = stack.len(), "evaluation finished");
            println!("{}", program::render(&stack, output));
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
