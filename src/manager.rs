//! Employee manager - the operations every surface exposes
//!
//! Wraps an [`EmployeeStore`], ensures the table before each operation,
//! validates input through the model and times the filter query.

use std::path::Path;
use std::time::{Duration, Instant};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use crate::Result;
use crate::employee::{EmployeeRecord, Gender, NewEmployee};
use crate::generator::{self, EmployeeGenerator};
use crate::storage::{EmployeeStore, IndexReport, TableStatus};

/// A query result together with its wall-clock duration
#[derive(Debug, Clone)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

impl<T> Timed<T> {
    pub fn measure(f: impl FnOnce() -> Result<T>) -> Result<Self> {
        let started = Instant::now();
        let value = f()?;
        Ok(Self { value, elapsed: started.elapsed() })
    }
}

/// Rows added by a generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub total: usize,
    pub special: usize,
}

/// Filter query timings around index creation, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResults {
    pub time_before: f64,
    pub time_after: f64,
    /// Percent of `time_before` saved; 0 when `time_before` is 0
    pub improvement: f64,
}

impl OptimizationResults {
    pub fn new(before: Duration, after: Duration) -> Self {
        let time_before = before.as_secs_f64();
        let time_after = after.as_secs_f64();
        let improvement = if time_before > 0.0 {
            (time_before - time_after) / time_before * 100.0
        } else {
            0.0
        };
        Self { time_before, time_after, improvement }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub results: OptimizationResults,
    pub indexes: IndexReport,
}

/// Business operations over a local SQLite store
pub struct EmployeeManager {
    store: EmployeeStore,
}

impl EmployeeManager {
    pub fn new(store: EmployeeStore) -> Self {
        Self { store }
    }

    /// Open the database file at `path`
    pub fn open(path: &Path) -> Result<Self> {
        let manager = Self::new(EmployeeStore::open(path)?);
        info!(database = %path.display(), "employee manager ready");
        Ok(manager)
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(EmployeeStore::open_in_memory()?))
    }

    pub fn ensure_table_exists(&self) -> Result<TableStatus> {
        let status = self.store.ensure_table()?;
        if status == TableStatus::Created {
            info!("created employees table");
        }
        Ok(status)
    }

    /// Validate, normalize and store one employee
    pub fn add_employee(&self, input: &NewEmployee) -> Result<EmployeeRecord> {
        self.ensure_table_exists()?;
        let employee = input.validate().inspect_err(|e| {
            warn!(error = %e, "rejected employee data");
        })?;
        let id = self.store.insert_employee(&employee)?;
        info!(id, name = %employee.full_name, "added employee");
        Ok(EmployeeRecord::new(id, employee, chrono::Local::now().date_naive()))
    }

    pub fn list_employees(&self) -> Result<Vec<EmployeeRecord>> {
        self.ensure_table_exists()?;
        let employees = self.store.all_employees()?;
        debug!(count = employees.len(), "fetched employees");
        Ok(employees)
    }

    /// The canned filter query, timed
    pub fn male_f(&self) -> Result<Timed<Vec<EmployeeRecord>>> {
        self.ensure_table_exists()?;
        let timed = Timed::measure(|| self.store.male_f())?;
        info!(
            count = timed.value.len(),
            elapsed_ms = timed.elapsed.as_millis() as u64,
            "male/F query finished"
        );
        Ok(timed)
    }

    /// Gender + case-sensitive name prefix search, timed
    pub fn search(&self, gender: Gender, name_start: &str) -> Result<Timed<Vec<EmployeeRecord>>> {
        self.ensure_table_exists()?;
        let timed = Timed::measure(|| self.store.search(gender, name_start))?;
        info!(
            %gender,
            name_start,
            count = timed.value.len(),
            elapsed_ms = timed.elapsed.as_millis() as u64,
            "search finished"
        );
        Ok(timed)
    }

    /// Insert `count` random employees plus `special` guaranteed filter
    /// matches, in batches. `progress` receives the size of every batch
    /// as it is committed.
    pub fn generate_test_data(
        &mut self,
        count: usize,
        special: usize,
        progress: &mut dyn FnMut(usize),
    ) -> Result<GenerationReport> {
        self.ensure_table_exists()?;
        info!(count, special, "generating test data");

        let mut generator = EmployeeGenerator::new();
        let mut total = 0;

        for size in generator::batch_sizes(count) {
            let batch = generator.random_batch(size);
            total += self.store.insert_batch(&batch)?;
            progress(size);
        }

        let mut special_added = 0;
        for size in generator::batch_sizes(special) {
            let batch = generator.special_batch(size);
            special_added += self.store.insert_batch(&batch)?;
            progress(size);
        }
        total += special_added;

        info!(total, special = special_added, "test data generation complete");
        Ok(GenerationReport { total, special: special_added })
    }

    /// Time the filter query, create the optimize indexes, time it again
    pub fn optimize(&self) -> Result<OptimizationReport> {
        self.ensure_table_exists()?;

        let before = Timed::measure(|| self.store.male_f())?.elapsed;
        let indexes = self.store.create_indexes()?;
        let after = Timed::measure(|| self.store.male_f())?.elapsed;

        let results = OptimizationResults::new(before, after);
        info!(
            time_before = results.time_before,
            time_after = results.time_after,
            improvement = results.improvement,
            created = indexes.created.len(),
            "database optimized"
        );
        Ok(OptimizationReport { results, indexes })
    }

    pub fn count_employees(&self) -> Result<usize> {
        self.ensure_table_exists()?;
        self.store.count_employees()
    }
}
