use crate::employee::EmployeeRecord;
use crate::manager::OptimizationReport;
use tabled::settings::{Alignment, Style, object::Columns};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct EmployeeRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Full name")]
    full_name: String,
    #[tabled(rename = "Birth date")]
    birth_date: String,
    #[tabled(rename = "Gender")]
    gender: String,
    #[tabled(rename = "Age")]
    age: i32,
}

impl From<&EmployeeRecord> for EmployeeRow {
    fn from(record: &EmployeeRecord) -> Self {
        Self {
            id: record.id,
            full_name: record.full_name.clone(),
            birth_date: record.birth_date.to_string(),
            gender: record.gender.to_string(),
            age: record.age,
        }
    }
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Render employees followed by a `Total: N employees` line.
/// An empty slice renders only the total.
pub fn employee_table(records: &[EmployeeRecord]) -> String {
    let total = format!("Total: {} employees", records.len());
    if records.is_empty() {
        return total;
    }

    let rows: Vec<EmployeeRow> = records.iter().map(EmployeeRow::from).collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .modify(Columns::single(4), Alignment::right())
        .to_string();

    format!("{table}\n{total}")
}

pub fn optimization_table(report: &OptimizationReport) -> String {
    let results = &report.results;
    let mut rows = vec![
        MetricRow {
            metric: "Before indexes".to_string(),
            value: format!("{:.4} s", results.time_before),
        },
        MetricRow {
            metric: "After indexes".to_string(),
            value: format!("{:.4} s", results.time_after),
        },
        MetricRow {
            metric: "Improvement".to_string(),
            value: format!("{:.1}%", results.improvement),
        },
    ];
    for name in &report.indexes.created {
        rows.push(MetricRow { metric: "Index created".to_string(), value: name.clone() });
    }
    for name in &report.indexes.existing {
        rows.push(MetricRow { metric: "Index present".to_string(), value: name.clone() });
    }

    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employee::{Employee, Gender};
    use crate::manager::OptimizationResults;
    use crate::storage::IndexReport;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn record(id: i64, name: &str) -> EmployeeRecord {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let employee = Employee::new(name, NaiveDate::from_ymd_opt(1990, 5, 15).unwrap(), Gender::Male);
        EmployeeRecord::new(id, employee, today)
    }

    #[test]
    fn test_employee_table_has_rows_and_total() {
        let out = employee_table(&[record(1, "Fedorov Fedor"), record(2, "Ivanov Ivan")]);
        assert!(out.contains("Full name"));
        assert!(out.contains("Fedorov Fedor"));
        assert!(out.contains("1990-05-15"));
        assert!(out.contains("Male"));
        assert!(out.contains("34"));
        assert!(out.ends_with("Total: 2 employees"));
    }

    #[test]
    fn test_empty_table_is_just_total() {
        assert_eq!(employee_table(&[]), "Total: 0 employees");
    }

    #[test]
    fn test_optimization_table() {
        let report = OptimizationReport {
            results: OptimizationResults::new(Duration::from_millis(200), Duration::from_millis(50)),
            indexes: IndexReport {
                created: vec!["idx_gender".to_string()],
                existing: vec!["idx_first_letter".to_string()],
            },
        };
        let out = optimization_table(&report);
        assert!(out.contains("0.2000 s"));
        assert!(out.contains("75.0%"));
        assert!(out.contains("idx_gender"));
        assert!(out.contains("Index present"));
    }
}
