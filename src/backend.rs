//! The seam between the CLI and where the data lives.
//!
//! The same menu and mode handlers drive a local SQLite file through
//! [`EmployeeManager`] or a running HTTP API through [`crate::ApiClient`].

use crate::Result;
use crate::employee::{EmployeeRecord, Gender, NewEmployee};
use crate::manager::{EmployeeManager, GenerationReport, OptimizationReport, Timed};
use crate::storage::TableStatus;

pub trait EmployeeBackend {
    /// Human-readable location, e.g. the database path or server URL
    fn describe(&self) -> String;

    fn ensure_table(&mut self) -> Result<TableStatus>;

    fn add_employee(&mut self, employee: &NewEmployee) -> Result<EmployeeRecord>;

    fn list_employees(&mut self) -> Result<Vec<EmployeeRecord>>;

    /// `progress` receives the number of rows committed since the last call
    fn generate_test_data(
        &mut self,
        count: usize,
        special: usize,
        progress: &mut dyn FnMut(usize),
    ) -> Result<GenerationReport>;

    fn male_f(&mut self) -> Result<Timed<Vec<EmployeeRecord>>>;

    fn search(&mut self, gender: Gender, name_start: &str) -> Result<Timed<Vec<EmployeeRecord>>>;

    fn optimize(&mut self) -> Result<OptimizationReport>;
}

/// Local backend over a SQLite file
pub struct LocalBackend {
    manager: EmployeeManager,
    location: String,
}

impl LocalBackend {
    pub fn new(manager: EmployeeManager, location: impl Into<String>) -> Self {
        Self { manager, location: location.into() }
    }

    pub fn manager(&self) -> &EmployeeManager {
        &self.manager
    }
}

impl EmployeeBackend for LocalBackend {
    fn describe(&self) -> String {
        format!("SQLite {}", self.location)
    }

    fn ensure_table(&mut self) -> Result<TableStatus> {
        self.manager.ensure_table_exists()
    }

    fn add_employee(&mut self, employee: &NewEmployee) -> Result<EmployeeRecord> {
        self.manager.add_employee(employee)
    }

    fn list_employees(&mut self) -> Result<Vec<EmployeeRecord>> {
        self.manager.list_employees()
    }

    fn generate_test_data(
        &mut self,
        count: usize,
        special: usize,
        progress: &mut dyn FnMut(usize),
    ) -> Result<GenerationReport> {
        self.manager.generate_test_data(count, special, progress)
    }

    fn male_f(&mut self) -> Result<Timed<Vec<EmployeeRecord>>> {
        self.manager.male_f()
    }

    fn search(&mut self, gender: Gender, name_start: &str) -> Result<Timed<Vec<EmployeeRecord>>> {
        self.manager.search(gender, name_start)
    }

    fn optimize(&mut self) -> Result<OptimizationReport> {
        self.manager.optimize()
    }
}
