//! Database schema definitions

/// Name of the single table
pub const EMPLOYEES_TABLE: &str = "employees";

/// SQL to create the employees table
pub const CREATE_EMPLOYEES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name TEXT NOT NULL,
    birth_date TEXT NOT NULL,
    gender TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

/// Indexes added by the optimize step, as `(name, statement)`.
///
/// The expression `substr(full_name, 1, 1)` must match the filter query
/// verbatim for SQLite to use the expression indexes.
pub const OPTIMIZE_INDEXES: &[(&str, &str)] = &[
    (
        "idx_gender_first_letter",
        "CREATE INDEX IF NOT EXISTS idx_gender_first_letter ON employees(gender, substr(full_name, 1, 1))",
    ),
    (
        "idx_gender",
        "CREATE INDEX IF NOT EXISTS idx_gender ON employees(gender)",
    ),
    (
        "idx_first_letter",
        "CREATE INDEX IF NOT EXISTS idx_first_letter ON employees(substr(full_name, 1, 1))",
    ),
];

/// Statements run by `EmployeeStore::ensure_table`
pub fn all_schema_statements() -> Vec<&'static str> {
    vec![CREATE_EMPLOYEES_TABLE]
}

/// Names of the indexes created by the optimize step
pub fn optimize_index_names() -> Vec<&'static str> {
    OPTIMIZE_INDEXES.iter().map(|(name, _)| *name).collect()
}
