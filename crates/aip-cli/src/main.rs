use clap::{Parser, Subcommand};

mod admin;
mod browse;
mod colors;
mod upload;

use admin::{AdminCommands, DbCommands};
use colors::ColorsCommands;

#[derive(Debug, Parser)]
#[command(name = "aip-cli")]
#[command(about = "Storefront catalog and admin command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Admin account management
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
    /// Browse the catalog of a running server
    Browse(browse::BrowseArgs),
    /// Encode or decode the stored color format
    Colors {
        #[command(subcommand)]
        command: ColorsCommands,
    },
    /// Upload a file to the media service and print its URL
    Upload(upload::UploadArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Db { command }) => admin::run_db(command).await?,
        Some(Commands::Admin { command }) => admin::run_admin(command).await?,
        Some(Commands::Browse(args)) => browse::run_browse(args).await?,
        Some(Commands::Colors { command }) => colors::run_colors(&command)?,
        Some(Commands::Upload(args)) => upload::run_upload(args).await?,
        None => println!("aip-cli ready; run with --help for commands"),
    }

    Ok(())
}
