//! Blocking HTTP client for the employee API
//!
//! Implements [`EmployeeBackend`] so the CLI and the interactive menu work
//! unchanged against a remote server. Query timings are measured client-side
//! and therefore include the round trip.

use std::time::Duration;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use crate::{Error, Result};
use crate::backend::EmployeeBackend;
use crate::employee::{EmployeeRecord, Gender, NewEmployee};
use crate::manager::{GenerationReport, OptimizationReport, Timed};
use crate::server::routes::{CreatedResponse, ErrorResponse, GenerateResponse, OptimizeResponse};
use crate::storage::TableStatus;

/// Default server address, matching `serve`'s default bind
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            // generating a million rows takes a while
            .timeout(None)
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map non-2xx responses to [`Error::Api`] using the `detail` field
    fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json()?);
        }

        let body = response.text().unwrap_or_default();
        let detail = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.detail)
            .unwrap_or_else(|_| if body.is_empty() { status.to_string() } else { body });
        Err(Error::Api { status: status.as_u16(), detail })
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(url = %self.url(path), "GET");
        Self::decode(self.http.get(self.url(path)).send()?)
    }

    /// Check that the server answers its menu endpoint
    pub fn ping(&self) -> Result<()> {
        let _: serde_json::Value = self.get("/")?;
        Ok(())
    }
}

impl EmployeeBackend for ApiClient {
    fn describe(&self) -> String {
        format!("API {}", self.base_url)
    }

    /// The server ensures the table on startup; only check it is reachable
    fn ensure_table(&mut self) -> Result<TableStatus> {
        self.ping()?;
        Ok(TableStatus::ManagedByServer)
    }

    fn add_employee(&mut self, employee: &NewEmployee) -> Result<EmployeeRecord> {
        let response = self.http.post(self.url("/employees/")).json(employee).send()?;
        let created: CreatedResponse = Self::decode(response)?;
        Ok(created.employee)
    }

    fn list_employees(&mut self) -> Result<Vec<EmployeeRecord>> {
        self.get("/employees/")
    }

    fn generate_test_data(
        &mut self,
        count: usize,
        special: usize,
        progress: &mut dyn FnMut(usize),
    ) -> Result<GenerationReport> {
        let response = self
            .http
            .post(self.url("/employees/generate-test-data/"))
            .query(&[("count", count), ("special", special)])
            .send()?;
        let generated: GenerateResponse = Self::decode(response)?;
        progress(generated.total);
        Ok(GenerationReport { total: generated.total, special: generated.special })
    }

    fn male_f(&mut self) -> Result<Timed<Vec<EmployeeRecord>>> {
        Timed::measure(|| self.get("/employees/male-f/"))
    }

    fn search(&mut self, gender: Gender, name_start: &str) -> Result<Timed<Vec<EmployeeRecord>>> {
        Timed::measure(|| {
            let response = self
                .http
                .get(self.url("/employees/search/"))
                .query(&[("gender", gender.as_str()), ("name_start", name_start)])
                .send()?;
            Self::decode(response)
        })
    }

    fn optimize(&mut self) -> Result<OptimizationReport> {
        let response = self.http.post(self.url("/employees/optimize/")).send()?;
        let optimized: OptimizeResponse = Self::decode(response)?;
        Ok(OptimizationReport {
            results: optimized.optimization_results,
            indexes: optimized.indexes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Runs a real server on an ephemeral port for the lifetime of the test
    struct TestServer {
        _dir: tempfile::TempDir,
        url: String,
        _runtime: tokio::runtime::Runtime,
    }

    fn spawn_server() -> TestServer {
        let dir = tempfile::tempdir().unwrap();
        let db: PathBuf = dir.path().join("employees.db");

        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        std_listener.set_nonblocking(true).unwrap();
        let url = format!("http://{}", std_listener.local_addr().unwrap());

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        runtime.spawn(async move {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            crate::server::serve(listener, db).await.unwrap();
        });

        TestServer { _dir: dir, url, _runtime: runtime }
    }

    fn client(server: &TestServer) -> ApiClient {
        let client = ApiClient::new(format!("{}/", server.url)).unwrap();
        // the table is ensured before the server accepts requests
        for _ in 0..50 {
            if client.ping().is_ok() {
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        client
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8000///").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.describe(), "API http://localhost:8000");
    }

    #[test]
    fn test_default_url_matches_default_bind() {
        assert_eq!(DEFAULT_SERVER_URL, format!("http://{}", crate::config::DEFAULT_BIND));
    }

    #[test]
    fn test_end_to_end_against_server() {
        let server = spawn_server();
        let mut client = client(&server);

        assert_eq!(client.ensure_table().unwrap(), TableStatus::ManagedByServer);

        let added = client
            .add_employee(&NewEmployee::new("frolov oleg", "1988-02-03", "1"))
            .unwrap();
        assert_eq!(added.full_name, "Frolov Oleg");

        let mut progressed = 0;
        let report = client.generate_test_data(30, 4, &mut |n| progressed += n).unwrap();
        assert_eq!(report, GenerationReport { total: 34, special: 4 });
        assert_eq!(progressed, 34);

        assert_eq!(client.list_employees().unwrap().len(), 35);
        assert!(client.male_f().unwrap().value.len() >= 5);

        let found = client.search(Gender::Male, "Frolov O").unwrap();
        assert!(found.value.iter().any(|r| r.id == added.id));

        let optimized = client.optimize().unwrap();
        assert_eq!(optimized.indexes.created.len(), 3);
    }

    #[test]
    fn test_validation_error_carries_detail() {
        let server = spawn_server();
        let mut client = client(&server);

        let err = client
            .add_employee(&NewEmployee::new("A B", "not-a-date", "m"))
            .unwrap_err();
        match &err {
            Error::Api { status, detail } => {
                assert_eq!(*status, 400);
                assert!(detail.contains("YYYY-MM-DD"), "{detail}");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_validation());
    }

    #[test]
    fn test_unreachable_server_is_http_error() {
        // Bind then drop to get a port nobody listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let mut client = ApiClient::new(format!("http://127.0.0.1:{port}")).unwrap();
        assert!(matches!(client.list_employees(), Err(Error::Http(_))));
    }
}
