use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod errors;
mod mcp;
mod models;
mod tickets;

use config::aliases::ProjectAliases;
use config::settings::Settings;
use tickets::TicketService;

#[derive(Parser)]
#[command(name = "jira-tools")]
#[command(version)]
#[command(about = "Jira ticket tools for MCP clients", long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server on stdin/stdout (default)
    Serve,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Print the document JSON that a block of text turns into
    Format {
        /// Text file to read (stdin when omitted)
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Display current configuration (with masked secrets)
    Show,

    /// Validate credentials by calling the Jira API
    Validate,

    /// Get the path to the config file
    Path,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("jira_tools=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jira_tools=info"))
    };

    // stdout belongs to the MCP transport
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => handle_serve().await,
        Commands::Config { action } => handle_config(action).await,
        Commands::Format { file } => handle_format(file.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("\n{}", e);
        std::process::exit(1);
    }
}

fn load_service() -> anyhow::Result<TicketService> {
    let settings = Settings::load()?;
    let aliases = ProjectAliases::with_extra(&settings.aliases)?;
    tracing::debug!(aliases = aliases.len(), base_url = %settings.base_url, "configuration loaded");
    Ok(TicketService::new(settings, aliases)?)
}

async fn handle_serve() -> anyhow::Result<()> {
    let service = load_service()?;
    mcp::serve(service).await
}

async fn handle_config(action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = Settings::load()?;
            println!("{}", "Current Configuration".cyan().bold());
            println!();
            println!("{}", toml::to_string_pretty(&settings.redacted())?);
        }

        ConfigAction::Validate => {
            let settings = Settings::load()?;
            let aliases = ProjectAliases::with_extra(&settings.aliases)?;
            println!("{}", "Validating configuration...".cyan().bold());
            println!();

            let client = api::jira::JiraClient::new(&settings)?;
            let me = client.myself().await?;

            println!("{}", "  ✓ Jira credentials are valid".green());
            println!(
                "    {} {}",
                "Account:".bold(),
                me.email_address.as_deref().unwrap_or(&settings.email)
            );
            println!("    {} {}", "Name:".bold(), me.display_name);
            if let Some(id) = me.account_id {
                println!("    {} {}", "Account ID:".bold(), id.dimmed());
            }
            match &settings.default_project {
                Some(project) => println!(
                    "    {} {}",
                    "Default project:".bold(),
                    aliases.resolve(project)
                ),
                None => println!(
                    "    {}",
                    "No default project (set JIRA_DEFAULT_PROJECT)".yellow()
                ),
            }
        }

        ConfigAction::Path => {
            println!("{}", Settings::config_path()?.display());
        }
    }

    Ok(())
}

fn handle_format(file: Option<&std::path::Path>) -> anyhow::Result<()> {
    use anyhow::Context;
    use std::io::Read;

    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let document = models::document::Document::format(&text);
    println!("{}", serde_json::to_string_pretty(&document.to_adf())?);
    Ok(())
}
