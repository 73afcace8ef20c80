use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use muses_client::config::Settings;
use muses_client::logging;
use muses_client::{MusesClient, RewardScanner, ScanPipeline, Session};

#[derive(Debug, Parser)]
#[command(name = "muses-client")]
#[command(about = "Scan MuSES task and reward QR codes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Complete the task behind a visitor QR code
    Scan {
        /// Scanned QR text, JSON `{"task_id": ...}` or a bare task id
        code: String,
    },

    /// Inspect (and optionally redeem) the reward behind a QR code
    Reward {
        /// Scanned QR text holding the reward id
        code: String,

        /// Mark the reward as used after showing it
        #[arg(long)]
        redeem: bool,
    },

    /// List the rewards owned by the logged-in visitor
    Rewards,

    /// List museums
    Museums {
        /// Also list the artworks of each museum
        #[arg(long)]
        artworks: bool,
    },
}

/// Builds the session from a pre-issued token or by logging in.
async fn authenticate(settings: &Settings, client: &MusesClient) -> Result<()> {
    if let Some(token) = &settings.token {
        client.session().establish(token.clone(), settings.user_id.clone());
        tracing::info!("Using pre-issued token");
        return Ok(());
    }

    let Some(credentials) = &settings.credentials else {
        tracing::warn!("No token or credentials configured, continuing without a session");
        return Ok(());
    };

    let login = client
        .login(&credentials.username, &credentials.password, &credentials.role)
        .await
        .context("Login failed")?;

    // Accounts without an EntityID header can still name their user explicitly.
    if login.entity_id.is_none() {
        if let Some(user_id) = &settings.user_id {
            client.session().establish(login.token, Some(user_id.clone()));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse before touching the environment so --help works anywhere
    let cli = Cli::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        api_url = %settings.api_url,
        "Starting MuSES client"
    );

    let session = Session::new();
    let client = MusesClient::new(&settings.api_url, session.clone(), settings.http_timeout_seconds)?;

    if let Err(e) = client.health_check().await {
        tracing::warn!(error = %e, "MuSES health check failed - trying anyway");
    }

    authenticate(&settings, &client).await?;
    let client = Arc::new(client);

    match cli.command {
        Command::Scan { code } => {
            let outcome = ScanPipeline::new(client).run_for_session(&session, &code).await;
            if !outcome.is_completed() {
                bail!(outcome.message());
            }
            println!("{}", outcome.message());
        }
        Command::Reward { code, redeem } => {
            let scanner = RewardScanner::new(client);
            let found = scanner.lookup(&code).await?;
            println!(
                "Reward {}: {} {} off ({}) at {}",
                found.reward_id,
                found.reward.amount,
                found.reward.reduction_type,
                found.reward.description,
                found.reward.museum_id
            );

            if redeem {
                let code = scanner.redeem(&found.reward_id).await?;
                println!("Redeemed, confirmation code {code}");
            }
        }
        Command::Rewards => {
            let Some(user_id) = session.entity_id() else {
                bail!("You need to log in to list your rewards");
            };

            let owned = client
                .owned_rewards(&user_id)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            for reward in &owned.rewards {
                let state = if reward.is_available() { "AVAILABLE" } else { "USED" };
                println!("{} reward {} {state}", reward.id, reward.reward_id);
            }
            println!("{} reward(s)", owned.count);
        }
        Command::Museums { artworks } => {
            let museums = client
                .list_museums()
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;

            for museum in &museums {
                println!("{} {} ({})", museum.id, museum.name, museum.hours);
                if !artworks {
                    continue;
                }

                match client.search_artworks(&museum.id).await {
                    Ok(found) => {
                        for artwork in found.iter().filter(|a| a.is_on_display()) {
                            println!("  {} {}", artwork.id, artwork.name);
                        }
                    }
                    Err(e) => tracing::warn!(museum_id = %museum.id, error = %e, "Failed to list artworks"),
                }
            }
        }
    }

    Ok(())
}
