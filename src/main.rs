use assessment_backend::services::availability_service::AvailabilityService;
use assessment_backend::services::sweep_service::SweepService;
use assessment_backend::utils::clock::Clock;
use assessment_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool, Clock::system());

    {
        let state = app_state.clone();
        let interval = config.worker_interval_secs;
        tokio::spawn(async move {
            let sweep = SweepService::new(state.pool.clone(), state.clock.clone());
            loop {
                if let Err(e) = sweep.run_once().await {
                    tracing::error!("Expiry sweep error: {:?}", e);
                }
                tokio::time::sleep(Duration::from_secs(interval)).await;
            }
        });
    }

    {
        let state = app_state.clone();
        let interval = config.worker_interval_secs;
        tokio::spawn(async move {
            let scheduler = AvailabilityService::new(state.pool.clone(), state.clock.clone());
            loop {
                match scheduler.run_once().await {
                    Ok((0, 0)) => {}
                    Ok((enabled, disabled)) => {
                        info!(
                            "Availability pass enabled {} and disabled {} assessments",
                            enabled, disabled
                        );
                    }
                    Err(e) => tracing::error!("Availability pass error: {:?}", e),
                }
                tokio::time::sleep(Duration::from_secs(interval)).await;
            }
        });
    }

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let api = Router::new()
        .route(
            "/api/assessments",
            get(routes::assessment::list_assessments).post(routes::assessment::create_assessment),
        )
        .route(
            "/api/assessments/:id",
            get(routes::assessment::get_assessment).delete(routes::assessment::delete_assessment),
        )
        .route(
            "/api/assessments/:id/status",
            put(routes::assessment::update_assessment_status),
        )
        .route(
            "/api/assessments/:id/attempts",
            get(routes::assessment::list_assessment_attempts),
        )
        .route(
            "/api/assessments/:id/start",
            post(routes::attempt::start_attempt),
        )
        .route("/api/attempts", get(routes::attempt::list_my_attempts))
        .route("/api/attempts/:id/save", post(routes::attempt::save_answer))
        .route(
            "/api/attempts/:id/finish",
            post(routes::attempt::finish_attempt),
        )
        .route(
            "/api/violations",
            get(routes::proctoring::list_violations).post(routes::proctoring::report_violation),
        )
        .layer(axum::middleware::from_fn(
            assessment_backend::middleware::auth::require_bearer_auth,
        ));

    let app = base_routes
        .merge(api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
