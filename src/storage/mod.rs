//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with a single table:
//! - employees(id, full_name, birth_date, gender, created_at)
//!
//! The table is ensured before every manager operation; the optimize step adds
//! three indexes that serve the "male, name starts with F" filter.

pub mod schema;
pub mod sqlite;

pub use sqlite::{EmployeeStore, IndexReport, TableStatus};
