use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use crate::server::AppState;
use crate::employee::{EmployeeRecord, Gender, NewEmployee};
use crate::generator::{DEFAULT_COUNT, DEFAULT_SPECIAL};
use crate::manager::{EmployeeManager, OptimizationResults};
use crate::storage::IndexReport;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct GenerateParams {
    pub count: Option<usize>,
    pub special: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub gender: String,
    pub name_start: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub message: String,
    pub employee: EmployeeRecord,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub message: String,
    pub total: usize,
    pub special: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OptimizeResponse {
    pub message: String,
    pub optimization_results: OptimizationResults,
    pub indexes: IndexReport,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<T, ApiError>;

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { detail: detail.into() }))
}

impl From<crate::Error> for ErrorResponse {
    fn from(err: crate::Error) -> Self {
        Self { detail: err.to_string() }
    }
}

fn to_api_error(err: crate::Error) -> ApiError {
    let status = if err.is_validation() {
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!(error = %err, "request failed");
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(err.into()))
}

/// Open a connection for this request and run `f` on the blocking pool
async fn with_manager<T, F>(state: Arc<AppState>, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut EmployeeManager) -> crate::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut manager = state.open_manager()?;
        f(&mut manager)
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Worker failed: {}", e)))?
    .map_err(to_api_error)
}

pub async fn menu() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Employee Database API",
        "available_endpoints": {
            "GET /": "This menu",
            "POST /employees/": "Add an employee (JSON body: full_name, birth_date, gender)",
            "GET /employees/": "List all employees",
            "POST /employees/generate-test-data/": "Generate test data (query: count, special)",
            "GET /employees/male-f/": "Male employees whose name starts with F",
            "GET /employees/search/": "Search by gender and name prefix (query: gender, name_start)",
            "POST /employees/optimize/": "Create indexes and time the male/F query before and after",
        },
        "usage_examples": {
            "add_employee": {
                "url": "/employees/",
                "method": "POST",
                "body": {
                    "full_name": "Ivanov Ivan",
                    "birth_date": "1990-05-15",
                    "gender": "M",
                },
            },
            "generate_data": {
                "url": format!("/employees/generate-test-data/?count={}&special={}", DEFAULT_COUNT, DEFAULT_SPECIAL),
                "method": "POST",
            },
        },
    }))
}

pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewEmployee>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    // malformed or incomplete bodies get the same `{"detail"}` shape as validation errors
    let Json(body) = payload.map_err(|rejection| api_error(StatusCode::BAD_REQUEST, rejection.body_text()))?;
    let employee = with_manager(state, move |m| m.add_employee(&body)).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Employee added successfully".to_string(),
            employee,
        }),
    ))
}

pub async fn list_employees(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<EmployeeRecord>>> {
    let employees = with_manager(state, |m| m.list_employees()).await?;
    Ok(Json(employees))
}

pub async fn generate_test_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GenerateParams>,
) -> ApiResult<Json<GenerateResponse>> {
    let count = params.count.unwrap_or(DEFAULT_COUNT);
    let special = params.special.unwrap_or(DEFAULT_SPECIAL);

    let report = with_manager(state, move |m| m.generate_test_data(count, special, &mut |_| {})).await?;
    Ok(Json(GenerateResponse {
        message: format!("Generated {} test records", report.total),
        total: report.total,
        special: report.special,
    }))
}

pub async fn male_f(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<EmployeeRecord>>> {
    let timed = with_manager(state, |m| m.male_f()).await?;
    Ok(Json(timed.value))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<EmployeeRecord>>> {
    let gender: Gender = params.gender.parse().map_err(to_api_error)?;
    let name_start = params.name_start.unwrap_or_default();

    let timed = with_manager(state, move |m| m.search(gender, &name_start)).await?;
    Ok(Json(timed.value))
}

pub async fn optimize(State(state): State<Arc<AppState>>) -> ApiResult<Json<OptimizeResponse>> {
    let report = with_manager(state, |m| m.optimize()).await?;
    Ok(Json(OptimizeResponse {
        message: "Database optimized successfully".to_string(),
        optimization_results: report.results,
        indexes: report.indexes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::router;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    struct TestApp {
        dir: tempfile::TempDir,
        app: axum::Router,
    }

    fn app() -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(AppState::new(dir.path().join("employees.db")));
        TestApp { app: router(state), dir }
    }

    async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_menu_lists_endpoints() {
        let t = app();
        let (status, body) = send(&t.app, "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Employee Database API");
        assert!(body["available_endpoints"]["POST /employees/optimize/"].is_string());
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let t = app();
        let (status, body) = send(
            &t.app,
            "POST",
            "/employees/",
            Some(serde_json::json!({"full_name": "fedorov fedor", "birth_date": "1990-05-15", "gender": "m"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["employee"]["full_name"], "Fedorov Fedor");
        assert_eq!(body["employee"]["gender"], "Male");

        let (status, body) = send(&t.app, "GET", "/employees/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["birth_date"], "1990-05-15");
    }

    #[tokio::test]
    async fn test_create_rejects_bad_date_and_gender() {
        let t = app();
        let (status, body) = send(
            &t.app,
            "POST",
            "/employees/",
            Some(serde_json::json!({"full_name": "A B", "birth_date": "15.05.1990", "gender": "m"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("YYYY-MM-DD"));

        let (status, _) = send(
            &t.app,
            "POST",
            "/employees/",
            Some(serde_json::json!({"full_name": "A B", "birth_date": "1990-05-15", "gender": "robot"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_body_with_detail() {
        let t = app();
        let (status, body) = send(
            &t.app,
            "POST",
            "/employees/",
            Some(serde_json::json!({"full_name": "A B", "gender": "m"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("birth_date"), "{body}");

        let request = Request::builder()
            .method("POST")
            .uri("/employees/")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = t.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_unreadable_row_is_internal_error() {
        let t = app();
        let (status, _) = send(&t.app, "GET", "/employees/", None).await;
        assert_eq!(status, StatusCode::OK);

        let conn = rusqlite::Connection::open(t.dir.path().join("employees.db")).unwrap();
        conn.execute(
            "INSERT INTO employees (full_name, birth_date, gender) VALUES ('Broken Row', '1990-01-01', 'Robot')",
            [],
        )
        .unwrap();
        drop(conn);

        let (status, body) = send(&t.app, "GET", "/employees/", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.starts_with("Storage error"), "{detail}");
        assert!(detail.contains("Robot"), "{detail}");
    }

    #[tokio::test]
    async fn test_generate_then_male_f() {
        let t = app();
        let (status, body) = send(&t.app, "POST", "/employees/generate-test-data/?count=40&special=6", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 46);
        assert_eq!(body["special"], 6);
        assert_eq!(body["message"], "Generated 46 test records");

        let (status, body) = send(&t.app, "GET", "/employees/male-f/", None).await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert!(rows.len() >= 6);
        assert!(rows.iter().all(|r| r["gender"] == "Male" && r["full_name"].as_str().unwrap().starts_with('F')));
    }

    #[tokio::test]
    async fn test_search_validates_gender() {
        let t = app();
        let (status, _) = send(&t.app, "GET", "/employees/search/?gender=x&name_start=F", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&t.app, "GET", "/employees/search/?gender=female", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_optimize_twice() {
        let t = app();
        let (status, body) = send(&t.app, "POST", "/employees/optimize/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["indexes"]["created"].as_array().unwrap().len(), 3);
        assert!(body["optimization_results"]["time_before"].is_number());
        assert!(body["optimization_results"]["improvement"].is_number());

        let (status, body) = send(&t.app, "POST", "/employees/optimize/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["indexes"]["created"].as_array().unwrap().is_empty());
        assert_eq!(body["indexes"]["existing"].as_array().unwrap().len(), 3);
    }
}
