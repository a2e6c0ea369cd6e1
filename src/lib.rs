//! # employee-db - Employee record manager
//!
//! One entity, three surfaces:
//! - Local CLI and interactive menu over a SQLite file
//! - HTTP API (`serve`) exposing the same operations
//! - HTTP client that drives the API through the same CLI
//!
//! The functional core is small: normalize and store employees, list them,
//! run the canned "male, name starts with F" filter, bulk-generate synthetic
//! records and add indexes that speed the filter up.

pub mod employee;
pub mod storage;
pub mod generator;
pub mod manager;
pub mod backend;
pub mod server;
pub mod client;
pub mod cli;
pub mod ui;
pub mod config;
pub mod logging;

// Re-exports for convenient access
pub use employee::{Employee, EmployeeRecord, Gender, NewEmployee};
pub use storage::EmployeeStore;
pub use manager::EmployeeManager;
pub use backend::EmployeeBackend;
pub use client::ApiClient;

/// Result type alias for employee-db operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for employee-db operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid date format. Use YYYY-MM-DD (got {0:?})")]
    InvalidDate(String),

    #[error("Invalid gender value: {0:?}")]
    InvalidGender(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgument(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Connection to server failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server responded with {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Validation failures are the caller's fault and map to a 400-class
    /// response; everything else is infrastructure.
    pub fn is_validation(&self) -> bool {
        match self {
            Error::InvalidDate(_) | Error::InvalidGender(_) | Error::InvalidArgument(_) => true,
            Error::Api { status, .. } => (400..500).contains(status),
            _ => false,
        }
    }
}
