//! See <https://github.com/matklad/cargo-xtask/>
//!
//! Auxiliary commands for the kvsync workspace that plain `cargo` cannot
//! express.

use clap::Parser;

mod integration;
mod prelude;

/// Development tasks for the kvsync repository
#[derive(Debug, Parser)]
#[command(name = "xtask")]
#[command(about = "Development tasks for kvsync", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: Global,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Silence the command output
    #[clap(long, global = true)]
    pub silent: bool,
}

impl Global {
    pub fn is_silent(&self) -> bool {
        self.silent
    }
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Run the test suite against a real Redis server
    Integration(integration::IntegrationCommand),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Integration(integration_cmd) => {
            integration::run(integration_cmd, cli.global).await?;
        }
    }

    Ok(())
}
