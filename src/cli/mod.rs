pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "produksi-api")]
#[command(about = "Production metrics reporting API server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Listen port, overriding PORT / PRODUKSI_API_PORT")]
        port: Option<u16>,
    },

    #[command(about = "Print a bcrypt hash for seeding users.password")]
    HashPassword {
        #[arg(help = "Plain-text password")]
        password: String,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::handle(port).await,
        Commands::HashPassword { password } => commands::password::handle(&password),
    }
}
