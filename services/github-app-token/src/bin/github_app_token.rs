//! GitHub App Installation Token Generator
//!
//! Generates a short-lived installation access token for a single repository
//! from GitHub App credentials. Signs an RS256 JWT as the App, looks up the
//! installation for the repository, then exchanges the JWT for a token.
//!
//! ## Usage
//! ```bash
//! # Credentials from the environment
//! GITHUB_APP_ID=123456 \
//! GITHUB_APP_PRIVATE_KEY="$(cat key.pem)" \
//! github-app-token --repo lornu-ai/lornu.ai
//!
//! # Key file, longer JWT lifetime, token written to a file
//! GITHUB_APP_ID=123456 \
//! GITHUB_APP_PRIVATE_KEY_PATH=./key.pem \
//! github-app-token -r lornu-ai/lornu.ai -e 9m -o token.txt
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use github_app_token::config::{load_private_key, parse_duration, GITHUB_API_URL};
use github_app_token::output::write_token_file;
use github_app_token::{
    issue_installation_token, AppCredential, ClientConfig, GitHubAppClient, TokenRequest,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// GitHub App Installation Token Generator
#[derive(Parser, Debug)]
#[command(name = "github-app-token")]
#[command(about = "Generate a GitHub App installation access token scoped to a repository")]
#[command(version)]
struct Args {
    /// The full repository name that the token is scoped for (e.g., lornu-ai/lornu.ai)
    #[arg(long, short, env = "GITHUB_REPOSITORY")]
    repo: Option<String>,

    /// Amount of time before the JWT expires, as a duration (e.g., 15m)
    #[arg(long, short, default_value = "5m", value_parser = parse_duration)]
    expiry: Duration,

    /// GitHub App ID
    #[arg(long, env = "GITHUB_APP_ID")]
    app_id: Option<String>,

    /// GitHub App private key in PEM format
    #[arg(long, env = "GITHUB_APP_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Path to the private key PEM file
    #[arg(long, env = "GITHUB_APP_PRIVATE_KEY_PATH")]
    private_key_path: Option<PathBuf>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = GITHUB_API_URL)]
    api_url: String,

    /// Timeout for each GitHub API request (e.g., 10s)
    #[arg(long, default_value = "10s", value_parser = parse_duration)]
    timeout: Duration,

    /// Output file path (optional, prints to stdout if not specified)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(args).await {
        eprintln!("ERROR {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let repo = args.repo.unwrap_or_default();
    let app_id = args.app_id.unwrap_or_default();
    let private_key = if repo.trim().is_empty() || app_id.trim().is_empty() {
        // Missing repo or app ID is reported before the key is looked at
        Vec::new()
    } else {
        load_private_key(args.private_key.as_deref(), args.private_key_path.as_deref())?
    };

    let request = TokenRequest::new(AppCredential::new(app_id, private_key), repo)
        .lifetime(args.expiry);
    request.validate()?;

    let config = ClientConfig::default()
        .api_url(args.api_url)
        .timeout(args.timeout);
    let client = GitHubAppClient::new(&config)?;

    info!(repo = %request.repository, "Requesting installation access token");
    let token = issue_installation_token(&client, &request).await?;

    match args.output {
        Some(output_path) => {
            write_token_file(&output_path, token.expose())
                .with_context(|| format!("Failed to write token to {}", output_path.display()))?;
            info!("Token saved to {}", output_path.display());
        }
        None => println!("{}", token.expose()),
    }

    Ok(())
}
