//! Circulo CLI
//!
//! Drives the page controllers against the backend and prints the rendered
//! HTML, plus session and configuration housekeeping.

use anyhow::{anyhow, bail, Context};
use circulo::{
    generate_default_config, token_from_redirect, ActionOutcome, AnnouncementTab, AnnouncementsPage,
    ApiClient, CommunitiesPage, Config, DashboardPage, FileTokenStore, LandingPage, LoggingConfig,
    NotificationCenter, ProfilePage, TokenStore, ViewController,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "circulo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for the Circulo university community network")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.config/circulo/config.toml, then ./circulo.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// API base URL, overriding the configuration
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a bearer token
    Login {
        #[arg(long)]
        token: String,
    },

    /// Store the token carried by an OAuth2 redirect URL
    Capture {
        /// Redirect URL ending in `?token=...`
        redirect_url: String,
    },

    /// Forget the stored token
    Logout,

    /// Render the dashboard
    Dashboard,

    /// Render the community directory
    Communities {
        /// Only show communities matching this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Render one community's detail view
    Community { id: String },

    /// Render your profile
    Profile,

    /// Render the announcement board
    Announcements {
        /// all, urgent, or a category
        #[arg(short, long)]
        tab: Option<String>,
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Render the public landing page
    Landing,

    /// Join a community
    Join { id: String },

    /// Leave a community
    Leave { id: String },

    /// Like or unlike a post in your feed
    Like { post_id: String },

    /// Print or write a default configuration file
    Config {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_default(),
    };
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }

    init_logging(&config.logging);
    tracing::debug!(api = %config.api.base_url, "Circulo v{}", env!("CARGO_PKG_VERSION"));

    let tokens = FileTokenStore::new(config.session.token_file.clone());

    match cli.command {
        Commands::Login { token } => {
            tokens.store(&token)?;
            println!("Session saved to {}", tokens.path().display());
        }
        Commands::Capture { redirect_url } => {
            let token = token_from_redirect(&redirect_url)?;
            tokens.store(&token)?;
            println!("Session saved to {}", tokens.path().display());
        }
        Commands::Logout => {
            tokens.clear()?;
            println!("Logged out");
        }
        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Configuration written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }

        Commands::Dashboard => {
            let mut page = DashboardPage::new(controller(&config, tokens)?, config.feed.clone());
            page.initialize().await;
            println!("{}", page.html().into_string());
        }
        Commands::Communities { search } => {
            let mut page = CommunitiesPage::new(controller(&config, tokens)?);
            page.initialize().await;
            if let Some(term) = search {
                page.filter(&term).await;
            }
            println!("{}", page.html().into_string());
        }
        Commands::Community { id } => {
            let mut page = CommunitiesPage::new(controller(&config, tokens)?);
            page.initialize().await;
            if !page.open_detail(&id).await {
                bail!("No community with id {}", id);
            }
            println!("{}", page.html().into_string());
        }
        Commands::Profile => {
            let mut page = ProfilePage::new(controller(&config, tokens)?, config.feed.clone());
            page.load().await;
            println!("{}", page.html().into_string());
        }
        Commands::Announcements { tab, search } => {
            let mut page = AnnouncementsPage::new(controller(&config, tokens)?);
            page.load().await;
            if let Some(tab) = tab {
                page.set_tab(AnnouncementTab::parse(&tab));
            }
            if let Some(term) = search {
                page.set_search(&term);
            }
            println!("{}", page.html().into_string());
        }
        Commands::Landing => {
            let mut page = LandingPage::new(controller(&config, tokens)?);
            page.load_featured().await;
            println!("{}", page.html().into_string());
        }

        Commands::Join { id } => {
            let mut page = CommunitiesPage::new(controller(&config, tokens)?);
            page.refresh().await;
            let outcome = page.join(&id).await;
            report(outcome, page.controller())?;
        }
        Commands::Leave { id } => {
            let mut page = CommunitiesPage::new(controller(&config, tokens)?);
            page.refresh().await;
            let outcome = page.leave(&id).await;
            report(outcome, page.controller())?;
        }
        Commands::Like { post_id } => {
            let mut page = DashboardPage::new(controller(&config, tokens)?, config.feed.clone());
            page.initialize().await;
            let outcome = page.toggle_like(&post_id).await;
            report(outcome, page.controller())?;
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("circulo={}", logging.level)));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries the rendered HTML
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn controller(config: &Config, tokens: FileTokenStore) -> anyhow::Result<ViewController> {
    if tokens.token().is_none() {
        tracing::info!("Not logged in, requests are sent without a token");
    }
    let client = ApiClient::new(&config.api, Arc::new(tokens))?;
    Ok(ViewController::new(
        Arc::new(client),
        NotificationCenter::new(config.notifications.clone()),
    ))
}

/// Print the notification an action produced, failing the command unless
/// the action succeeded
fn report<T>(outcome: ActionOutcome<T>, controller: &ViewController) -> anyhow::Result<()> {
    let message = controller.notifications().latest().map(|n| n.message);
    match outcome {
        ActionOutcome::Succeeded(_) => {
            println!("{}", message.unwrap_or_else(|| "Done".to_string()));
            Ok(())
        }
        ActionOutcome::Failed(err) => Err(anyhow!(message.unwrap_or_else(|| err.to_string()))),
        ActionOutcome::Ignored => Err(anyhow!(
            message.unwrap_or_else(|| "Nothing to do: no such control, or it is not available".to_string())
        )),
    }
}
