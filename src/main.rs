use anyhow::Context;
use cloudflower::{
    api::routes::build_app,
    cli::{
        init::{self, InitConfig, InitResult},
        output::Output,
        Cli, Commands,
    },
    game::seed_catalog,
    AppState, AuthService, DatabaseProvider, GameConfig,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let Cli {
        config,
        verbose,
        no_color,
        command,
    } = Cli::parse_args();

    let output = if no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match command {
        Some(Commands::Init {
            path,
            force,
            no_catalog,
            host,
            port,
        }) => {
            let result = init::run(
                InitConfig {
                    path,
                    force,
                    no_catalog,
                    host,
                    port,
                },
                &output,
            );
            Ok(match result {
                InitResult::Success | InitResult::AlreadyExists => ExitCode::SUCCESS,
                InitResult::Error(_) => ExitCode::FAILURE,
            })
        }
        Some(Commands::Config { full, validate }) => Ok(show_config(&config, full, validate, &output)),
        None => {
            serve(&config, verbose).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn serve(config_path: &Path, verbose: bool) -> anyhow::Result<()> {
    let config = GameConfig::parse_file(config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;

    init_tracing(&config, verbose);

    let warnings = config
        .validate_with_warnings()
        .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    let auth_service = Arc::new(AuthService::new(config.jwt_secret()?, config.pepper()?));

    let provider = DatabaseProvider::from_config(&config);
    tracing::info!(database = %provider.describe(), "opening database");
    let db = provider
        .create_client()
        .await
        .context("Failed to open database")?;

    seed_catalog(db.as_ref(), &config.catalog)
        .await
        .context("Failed to seed catalog")?;

    let addr = config.bind_addr();
    let app = build_app(AppState::new(config, db, auth_service));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Game server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Game server stopped");
    Ok(())
}

/// `RUST_LOG` wins over the configured level; `--verbose` raises the default to debug.
fn init_tracing(config: &GameConfig, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else {
        config.server.log_level.as_str()
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if config.server.json_logs() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn show_config(path: &Path, full: bool, validate: bool, output: &Output) -> ExitCode {
    let config = match GameConfig::parse_file(path) {
        Ok(config) => config,
        Err(e) => {
            output.error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    output.header(&format!("Configuration ({})", path.display()));
    output.kv("listen", &config.bind_addr());
    output.kv("log_level", &config.server.log_level);
    output.kv("log_format", &config.server.log_format);
    output.kv("database", &DatabaseProvider::from_config(&config).describe());
    output.kv("jwt_secret_env", &config.auth.jwt_secret_env);
    output.kv("pepper_env", &config.auth.pepper_env);
    output.kv(
        "catalog",
        &format!(
            "{} items, {} quests",
            config.catalog.items.len(),
            config.catalog.quests.len()
        ),
    );

    if full {
        output.header("Items");
        output.table_header(&["Id", "Name", "Type"]);
        for item in &config.catalog.items {
            output.table_row(&[&item.id.to_string(), &item.name, &item.item_type]);
        }

        output.header("Quests");
        output.table_header(&["Id", "Name", "Reward XP"]);
        for quest in &config.catalog.quests {
            output.table_row(&[&quest.id.to_string(), &quest.name, &quest.reward_xp.to_string()]);
        }
    }

    if validate {
        output.header("Validation");
        match config.validate_with_warnings() {
            Ok(warnings) => {
                for warning in &warnings {
                    output.warning(&warning.to_string());
                }
                output.success("Configuration is valid");
            }
            Err(e) => {
                output.error(&e.to_string());
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
