use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use gatecheck_api::config;
use gatecheck_api::handlers::{app, AppState};
use gatecheck_api::tickets::PgTicketRepository;
use gatecheck_api::verify::{AllowAll, VerificationController, VerifierAccess};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Gatecheck API in {:?} mode", config.environment);

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(&database_url)
        .await
        .expect("failed to connect to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("failed to run migrations");

    let repo = Arc::new(PgTicketRepository::new(pool.clone()));
    let access = VerifierAccess::new(
        Arc::new(AllowAll),
        Duration::from_secs(config.verification.access_ttl_secs),
    );
    let controller = Arc::new(
        VerificationController::new(repo, access).with_timeouts(
            Duration::from_millis(config.verification.lookup_timeout_ms),
            Duration::from_millis(config.verification.admit_timeout_ms),
        ),
    );

    let state = AppState {
        controller,
        db: Some(pool),
    };
    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("GATECHECK_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Gatecheck API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
