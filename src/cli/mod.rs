//! Command-line front end - argument parsing, login and command dispatch.
//!
//! Each invocation loads the configuration, opens the configured store, logs in
//! with the supplied credentials and runs exactly one command as that user.

/// Command implementations (dashboard, product, sale, analytics, admin)
pub mod commands;

use crate::{
    config::{AppConfig, StorageBackend, VerifierKind, load_config_or_default},
    core::{
        seed,
        session::{self, Session, StaticCredentials, StoreCredentials},
    },
    errors::Result,
    store::{Store, open_store},
};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

/// QUBIC point-of-sale and inventory tool
#[derive(Debug, Parser)]
#[command(name = "qubic-pos", version, about)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml", env = "QUBIC_CONFIG")]
    pub config: PathBuf,

    /// Login name
    #[arg(short, long, env = "QUBIC_USERNAME")]
    pub username: Option<String>,

    /// Password
    #[arg(short, long, env = "QUBIC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show headline numbers and the most recent sales
    Dashboard,
    /// Manage products
    #[command(subcommand)]
    Product(commands::product::ProductCommand),
    /// Record, browse and delete sales
    #[command(subcommand)]
    Sale(commands::sale::SaleCommand),
    /// Show sales analytics
    Analytics {
        /// Days in the daily sales series
        #[arg(long, default_value_t = crate::core::analytics::DEFAULT_DAILY_SALES_DAYS)]
        days: u32,
    },
    /// Admin panel: employees, settings, backups
    #[command(subcommand)]
    Admin(commands::admin::AdminCommand),
}

/// Everything a command needs: the open store, the configuration and the
/// logged-in session.
pub struct AppContext {
    /// Open storage backend
    pub store: Box<dyn Store>,
    /// Loaded configuration
    pub config: AppConfig,
    /// The acting user
    pub session: Session,
}

impl AppContext {
    /// Bundles an open store, its configuration and a session.
    #[must_use]
    pub fn new(store: Box<dyn Store>, config: AppConfig, session: Session) -> Self {
        Self {
            store,
            config,
            session,
        }
    }

    /// The store as a trait object
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Username of the reserved admin account
    #[must_use]
    pub fn reserved_admin(&self) -> &str {
        &self.config.auth.reserved_admin
    }
}

/// Logs in with the verifier selected under `[auth]`.
pub async fn login(
    config: &AppConfig,
    store: &dyn Store,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<Session> {
    let username = username.unwrap_or_default();
    let password = password.unwrap_or_default();
    match config.auth.verifier {
        VerifierKind::Static => {
            let verifier = StaticCredentials::new(config.credentials.clone());
            session::authenticate(&verifier, username, password).await
        }
        VerifierKind::Store => {
            let verifier = StoreCredentials::new(store);
            session::authenticate(&verifier, username, password).await
        }
    }
}

/// Runs one parsed command line end to end, writing output to `out`.
pub async fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = load_config_or_default(&cli.config)
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    let store = open_store(&config)
        .await
        .inspect_err(|e| error!("Failed to open store: {}", e))?;
    info!("Store backend: {}", store.backend_name());

    if config.storage.backend == StorageBackend::Embedded {
        seed::seed_store(store.as_ref(), &config)
            .await
            .inspect_err(|e| error!("Failed to seed store: {}", e))?;
    }

    let mut session = login(
        &config,
        store.as_ref(),
        cli.username.as_deref(),
        cli.password.as_deref(),
    )
    .await?;
    session.touch();

    let ctx = AppContext::new(store, config, session);
    dispatch(&ctx, cli.command, out).await
}

/// Runs a command for an already logged-in user.
pub async fn dispatch(ctx: &AppContext, command: Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Dashboard => commands::general::dashboard(ctx, out).await,
        Command::Product(cmd) => commands::product::handle(ctx, cmd, out).await,
        Command::Sale(cmd) => commands::sale::handle(ctx, cmd, out).await,
        Command::Analytics { days } => commands::general::analytics(ctx, days, out).await,
        Command::Admin(cmd) => commands::admin::handle(ctx, cmd, out).await,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;
    use crate::test_utils::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_nested_subcommand() {
        let cli = Cli::try_parse_from([
            "qubic-pos",
            "--username",
            "emp",
            "--password",
            "emp@@",
            "sale",
            "record",
            "--product",
            "1",
            "--quantity",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.username.as_deref(), Some("emp"));
        assert!(matches!(cli.command, Command::Sale(_)));
    }

    #[tokio::test]
    async fn test_login_with_static_and_store_verifiers() -> Result<()> {
        let store = setup_test_store().await?;
        let mut config = AppConfig::default();

        let session = login(&config, &store, Some("qubic"), Some("##$@##")).await?;
        assert!(session.is_admin());

        config.auth.verifier = VerifierKind::Store;
        let result = login(&config, &store, Some("qubic"), Some("##$@##")).await;
        assert!(matches!(result, Err(Error::InvalidCredentials)));

        let result = login(&config, &store, None, None).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }
}
