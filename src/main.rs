use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use recursion_backend::{
    AppState,
    commands::{self, AdminOutcome, AdminSeed},
    config::{AppConfig, Env, StoreKind},
    create_router,
    repository::{MemoryRepository, PostgresRepository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// RECursion backend: REST API and operator commands
#[derive(Parser, Debug)]
#[command(name = "recursion-backend")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Create a staff superuser; an existing one is left untouched
    CreateAdmin {
        #[arg(long, env = "ADMIN_USERNAME", default_value = "admin")]
        username: String,

        #[arg(long, env = "ADMIN_EMAIL", default_value = "admin@recursion.com")]
        email: String,

        #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Print recent registrations and submissions
    ShowActivity {
        /// Number of days to look back
        #[arg(long, default_value_t = 7)]
        days: i64,

        /// Add the hint for periodic monitoring
        #[arg(long)]
        live: bool,
    },
}

/// main
///
/// Loads configuration, initializes logging and the store, then dispatches the selected
/// command.
#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let config = AppConfig::load().context("invalid configuration")?;

    // 2. Logging, selected by environment
    init_tracing(config.env);
    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Persistence
    let repo = connect_store(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(repo, config).await,
        Command::CreateAdmin {
            username,
            email,
            password,
        } => {
            let seed = AdminSeed {
                username,
                email,
                password,
            };
            match commands::create_admin(&repo, seed).await? {
                AdminOutcome::Created(account) => {
                    tracing::info!(user_id = %account.id, "superuser created");
                    println!("Successfully created superuser \"{}\"", account.username);
                }
                AdminOutcome::AlreadyExists { field } => {
                    tracing::warn!(field, "superuser not created: account already exists");
                    println!("Superuser not created: an account with this {field} already exists");
                }
            }
            Ok(())
        }
        Command::ShowActivity { days, live } => {
            let report = commands::activity_report(&repo, days).await?;
            print!("{}", report.render(Utc::now(), live));
            Ok(())
        }
    }
}

/// Pretty output locally, JSON for log aggregation in production.
fn init_tracing(env: Env) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "recursion_backend=debug,tower_http=info,axum=info".into());

    match env {
        Env::Local => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init(),
        Env::Production => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn connect_store(config: &AppConfig) -> Result<RepositoryState> {
    match config.store {
        StoreKind::Postgres => {
            let db_url = config.db_url.as_deref().context("DATABASE_URL is not set")?;
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(db_url)
                .await
                .context("failed to connect to Postgres, check DATABASE_URL")?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("failed to run migrations")?;
            tracing::info!("Connected to Postgres, migrations applied.");
            Ok(Arc::new(PostgresRepository::new(pool)) as RepositoryState)
        }
        StoreKind::Memory => {
            tracing::warn!("Using the in-memory store; all data is lost on exit.");
            Ok(Arc::new(MemoryRepository::new()) as RepositoryState)
        }
    }
}

async fn serve(repo: RepositoryState, config: AppConfig) -> Result<()> {
    let address = config.bind_address();
    let app = create_router(AppState { repo, config });

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on {address}");
    tracing::info!("API Documentation (Swagger UI) available at: http://{address}/swagger-ui");

    axum::serve(listener, app).await.context("server error")
}
