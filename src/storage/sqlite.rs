//! SQLite storage implementation

use std::path::Path;
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::Result;
use crate::employee::{self, Employee, EmployeeRecord, Gender};
use super::schema;

const RECORD_COLUMNS: &str = "id, full_name, birth_date, gender";

/// Outcome of ensuring the employees table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Created,
    AlreadyExisted,
    /// The table lives behind an HTTP server that creates it on startup
    ManagedByServer,
}

/// Which optimize indexes were added by a call and which were already there
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    pub created: Vec<String>,
    pub existing: Vec<String>,
}

/// SQLite-backed storage for employee records.
///
/// Opening a store does not touch the schema; callers run
/// [`EmployeeStore::ensure_table`] before each operation.
pub struct EmployeeStore {
    conn: Connection,
}

impl EmployeeStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "opening employee store");
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Create the employees table if it is missing
    pub fn ensure_table(&self) -> Result<TableStatus> {
        let existed = self.table_exists()?;
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(if existed { TableStatus::AlreadyExisted } else { TableStatus::Created })
    }

    /// Check whether the employees table exists
    pub fn table_exists(&self) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [schema::EMPLOYEES_TABLE],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // ========== Write Operations ==========

    /// Insert one employee, returning its row id
    pub fn insert_employee(&self, employee: &Employee) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO employees (full_name, birth_date, gender) VALUES (?1, ?2, ?3)",
            params![
                employee.full_name,
                employee.birth_date.format(employee::DATE_FORMAT).to_string(),
                employee.gender.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert a batch of employees in a single transaction
    pub fn insert_batch(&mut self, employees: &[Employee]) -> Result<usize> {
        if employees.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO employees (full_name, birth_date, gender) VALUES (?1, ?2, ?3)",
            )?;
            for employee in employees {
                inserted += stmt.execute(params![
                    employee.full_name,
                    employee.birth_date.format(employee::DATE_FORMAT).to_string(),
                    employee.gender.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    // ========== Read Operations ==========

    /// All employees ordered by name
    pub fn all_employees(&self) -> Result<Vec<EmployeeRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM employees ORDER BY full_name, id");
        self.query_records(&sql, [])
    }

    /// The canned filter: male employees whose name starts with a capital F.
    ///
    /// Compares the first character instead of using `LIKE` so the match is
    /// case-sensitive and hits the optimize indexes.
    pub fn male_f(&self) -> Result<Vec<EmployeeRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM employees \
             WHERE gender = 'Male' AND substr(full_name, 1, 1) = 'F' \
             ORDER BY full_name, id"
        );
        self.query_records(&sql, [])
    }

    /// Employees of `gender` whose name starts with `name_start` (case-sensitive).
    /// An empty prefix matches every name.
    pub fn search(&self, gender: Gender, name_start: &str) -> Result<Vec<EmployeeRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM employees \
             WHERE gender = ?1 AND substr(full_name, 1, ?2) = ?3 \
             ORDER BY full_name, id"
        );
        let prefix_len = name_start.chars().count() as i64;
        self.query_records(&sql, params![gender.as_str(), prefix_len, name_start])
    }

    /// Count all employees
    pub fn count_employees(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn query_records<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<EmployeeRecord>> {
        let today = Local::now().date_naive();
        let mut stmt = self.conn.prepare(sql)?;
        let records = stmt
            .query_map(params, |row| row_to_record(row, today))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    // ========== Index Operations ==========

    /// Create the optimize indexes. Safe to call repeatedly.
    pub fn create_indexes(&self) -> Result<IndexReport> {
        let before = self.index_names()?;
        let mut report = IndexReport::default();

        for (name, stmt) in schema::OPTIMIZE_INDEXES {
            self.conn.execute(stmt, [])?;
            if before.iter().any(|existing| existing == name) {
                report.existing.push(name.to_string());
            } else {
                report.created.push(name.to_string());
            }
        }
        Ok(report)
    }

    /// Names of the explicit indexes on the employees table
    pub fn index_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'index' AND tbl_name = ?1 AND sql IS NOT NULL \
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([schema::EMPLOYEES_TABLE], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }
}

/// Helper to convert a row to an EmployeeRecord
fn row_to_record(row: &rusqlite::Row, today: NaiveDate) -> rusqlite::Result<EmployeeRecord> {
    let id: i64 = row.get(0)?;
    let full_name: String = row.get(1)?;
    let birth_str: String = row.get(2)?;
    let gender_str: String = row.get(3)?;

    let birth_date = employee::parse_birth_date(&birth_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let gender: Gender = gender_str.parse().map_err(|e: crate::Error| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(EmployeeRecord::new(id, Employee { full_name, birth_date, gender }, today))
}
