use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::manager::EmployeeManager;

pub mod routes;

/// Server state. Every request opens its own connection to this file.
pub struct AppState {
    pub database_path: PathBuf,
}

impl AppState {
    pub fn new(database_path: PathBuf) -> Self {
        Self { database_path }
    }

    pub fn open_manager(&self) -> crate::Result<EmployeeManager> {
        EmployeeManager::open(&self.database_path)
    }
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::menu))
        .route(
            "/employees/",
            post(routes::create_employee).get(routes::list_employees),
        )
        .route("/employees/generate-test-data/", post(routes::generate_test_data))
        .route("/employees/male-f/", get(routes::male_f))
        .route("/employees/search/", get(routes::search))
        .route("/employees/optimize/", post(routes::optimize))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Ensure the table, bind `addr` and serve until the process is stopped
pub async fn start_server(addr: SocketAddr, database_path: PathBuf) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve(listener, database_path).await
}

/// Serve on an already-bound listener
pub async fn serve(listener: tokio::net::TcpListener, database_path: PathBuf) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(database_path));

    let init_state = state.clone();
    let status = tokio::task::spawn_blocking(move || {
        init_state.open_manager()?.ensure_table_exists()
    })
    .await??;
    tracing::info!(?status, database = %state.database_path.display(), "employees table ready");

    let app = router(state);
    let addr = listener.local_addr()?;
    tracing::info!("Starting server on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
