use dotenvy::dotenv;
use tracing::{error, info, warn};
use userhub::logging::init_tracing;
use userhub::metrics::{init_metrics, metrics_app};
use userhub::router::init_router;
use userhub::state::init_app_state;
use userhub_db::{init_db_pool, run_migrations};

#[tokio::main]
async fn main() {
    dotenv().ok();

    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let db = init_db_pool().await;
    if let Err(e) = run_migrations(&db).await {
        error!(error = %e, "Failed to run migrations");
        std::process::exit(1);
    }

    let state = init_app_state(db);
    let bind_address = state.server_config.bind_address();
    let metrics_address = format!(
        "{}:{}",
        state.server_config.host, state.server_config.metrics_port
    );

    match init_metrics() {
        Ok(Some(handle)) => match tokio::net::TcpListener::bind(&metrics_address).await {
            Ok(listener) => {
                info!(address = %metrics_address, "Metrics listener started");
                tokio::spawn(async move {
                    if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                        error!(error = %e, "Metrics server stopped");
                    }
                });
            }
            Err(e) => warn!(address = %metrics_address, error = %e, "Metrics listener not started"),
        },
        Ok(None) => info!("Observability disabled, metrics not exported"),
        Err(e) => warn!(error = %e, "Failed to install metrics recorder"),
    }

    let app = init_router(state);

    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(address = %bind_address, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };

    info!(address = %bind_address, "Server running");
    info!("Swagger UI available at /swagger-ui, Scalar at /scalar");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
