use crate::backend::EmployeeBackend;
use crate::employee::{EmployeeRecord, Gender, NewEmployee};
use crate::generator::{DEFAULT_COUNT, DEFAULT_SPECIAL};
use crate::manager::Timed;
use crate::storage::TableStatus;
use crate::ui::{self, GenerationProgress, Spinner};
use crate::{Error, Result};

/// One operation, decoded from a mode number plus its arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateTable,
    AddEmployee(NewEmployee),
    List,
    Generate { count: usize, special: usize },
    MaleF,
    Optimize,
    Search { gender: Gender, name_start: String },
}

pub const MODES: &[(u8, &str)] = &[
    (1, "Create/check the employees table"),
    (2, "Add an employee"),
    (3, "List all employees"),
    (4, "Generate test data"),
    (5, "Query: male employees starting with 'F'"),
    (6, "Optimize the database"),
    (7, "Search by gender and name prefix"),
];

fn usage(text: &str) -> Error {
    Error::InvalidArgument(format!("usage: employee-db {text}"))
}

fn parse_count(value: &str, what: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("{what} must be a non-negative integer (got {value:?})")))
}

/// Rows a generation run will insert, rejecting totals that overflow
pub fn generation_total(count: usize, special: usize) -> Result<usize> {
    count.checked_add(special).ok_or_else(|| {
        Error::InvalidArgument(format!("count + special is too large ({count} + {special})"))
    })
}

impl Command {
    /// Decode `mode` (1-7) and its positional arguments
    pub fn parse(mode: u8, args: &[String]) -> Result<Self> {
        let command = match (mode, args) {
            (1, []) => Command::CreateTable,
            (1, _) => return Err(usage("1")),

            (2, [name, date, gender]) => Command::AddEmployee(NewEmployee::new(
                name.as_str(),
                date.as_str(),
                gender.as_str(),
            )),
            (2, _) => return Err(usage("2 \"<full name>\" <YYYY-MM-DD> <gender>")),

            (3, []) => Command::List,
            (3, _) => return Err(usage("3")),

            (4, []) => Command::Generate { count: DEFAULT_COUNT, special: DEFAULT_SPECIAL },
            (4, [count]) => Command::Generate {
                count: parse_count(count, "count")?,
                special: DEFAULT_SPECIAL,
            },
            (4, [count, special]) => Command::Generate {
                count: parse_count(count, "count")?,
                special: parse_count(special, "special")?,
            },
            (4, _) => return Err(usage("4 [count] [special]")),

            (5, []) => Command::MaleF,
            (5, _) => return Err(usage("5")),

            (6, []) => Command::Optimize,
            (6, _) => return Err(usage("6")),

            (7, [gender]) => Command::Search { gender: gender.parse()?, name_start: String::new() },
            (7, [gender, name_start]) => Command::Search {
                gender: gender.parse()?,
                name_start: name_start.clone(),
            },
            (7, _) => return Err(usage("7 <gender> [name_start]")),

            (other, _) => {
                return Err(Error::InvalidArgument(format!("unknown mode {other} (expected 0-7)")));
            }
        };
        if let Command::Generate { count, special } = &command {
            generation_total(*count, *special)?;
        }
        Ok(command)
    }

    /// Run against `backend` and print the outcome
    pub fn run(&self, backend: &mut dyn EmployeeBackend) -> Result<()> {
        tracing::debug!(command = ?self, backend = %backend.describe(), "running command");

        match self {
            Command::CreateTable => match backend.ensure_table()? {
                TableStatus::Created => ui::success("Employees table created"),
                TableStatus::AlreadyExisted => ui::success("Employees table already exists"),
                TableStatus::ManagedByServer => {
                    ui::success("Server reachable; it manages the employees table")
                }
            },

            Command::AddEmployee(input) => {
                let record = backend.add_employee(input)?;
                ui::success(&format!("Employee added: {}", record.full_name));
                ui::summary_row("ID", &record.id.to_string());
                ui::summary_row("Birth date", &record.birth_date.to_string());
                ui::summary_row("Gender", record.gender.as_str());
                ui::summary_row("Age", &record.age.to_string());
            }

            Command::List => {
                let records = backend.list_employees()?;
                print_records("Employees", &records);
            }

            Command::Generate { count, special } => {
                let progress = GenerationProgress::new(generation_total(*count, *special)?);
                let report = match backend.generate_test_data(*count, *special, &mut |rows| progress.inc(rows)) {
                    Ok(report) => report,
                    Err(e) => {
                        progress.abandon();
                        return Err(e);
                    }
                };
                progress.finish(report.total);
                ui::summary_row("Total records", &report.total.to_string());
                ui::summary_row("Male, starting with 'F'", &report.special.to_string());
            }

            Command::MaleF => {
                let timed = backend.male_f()?;
                print_timed("Male employees starting with 'F'", &timed);
            }

            Command::Optimize => {
                let spinner = Spinner::new("Creating indexes and timing the query...");
                let report = backend.optimize();
                spinner.finish_and_clear();
                let report = report?;

                ui::success("Database optimized");
                println!("{}", ui::optimization_table(&report));
            }

            Command::Search { gender, name_start } => {
                let timed = backend.search(*gender, name_start)?;
                let title = if name_start.is_empty() {
                    format!("{gender} employees")
                } else {
                    format!("{gender} employees starting with {name_start:?}")
                };
                print_timed(&title, &timed);
            }
        }
        Ok(())
    }
}

fn print_records(title: &str, records: &[EmployeeRecord]) {
    ui::section(title);
    if records.is_empty() {
        println!("{}", ui::muted("No employees found"));
    }
    println!("{}", ui::employee_table(records));
}

fn print_timed(title: &str, timed: &Timed<Vec<EmployeeRecord>>) {
    print_records(title, &timed.value);
    ui::timing("Query took", timed.elapsed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;
    use crate::manager::EmployeeManager;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn backend() -> LocalBackend {
        LocalBackend::new(EmployeeManager::open_in_memory().unwrap(), ":memory:")
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!(Command::parse(1, &[]).unwrap(), Command::CreateTable);
        assert_eq!(Command::parse(3, &[]).unwrap(), Command::List);
        assert_eq!(Command::parse(5, &[]).unwrap(), Command::MaleF);
        assert_eq!(Command::parse(6, &[]).unwrap(), Command::Optimize);
        assert_eq!(
            Command::parse(2, &args(&["Ivanov Ivan", "1990-05-15", "m"])).unwrap(),
            Command::AddEmployee(NewEmployee::new("Ivanov Ivan", "1990-05-15", "m"))
        );
    }

    #[test]
    fn test_parse_generate_defaults() {
        assert_eq!(
            Command::parse(4, &[]).unwrap(),
            Command::Generate { count: DEFAULT_COUNT, special: DEFAULT_SPECIAL }
        );
        assert_eq!(
            Command::parse(4, &args(&["500"])).unwrap(),
            Command::Generate { count: 500, special: DEFAULT_SPECIAL }
        );
        assert_eq!(
            Command::parse(4, &args(&["500", "7"])).unwrap(),
            Command::Generate { count: 500, special: 7 }
        );
        assert!(matches!(Command::parse(4, &args(&["-3"])), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_generate_total_overflow_is_rejected() {
        let max = usize::MAX.to_string();
        let err = Command::parse(4, &args(&[max.as_str(), "1"])).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)), "{err}");
        assert!(Command::parse(4, &args(&[max.as_str(), "0"])).is_ok());

        // a hand-built command fails before inserting anything
        let mut backend = backend();
        let err = Command::Generate { count: usize::MAX, special: 1 }
            .run(&mut backend)
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(backend.manager().count_employees().unwrap(), 0);
    }

    #[test]
    fn test_parse_search() {
        assert_eq!(
            Command::parse(7, &args(&["ж", "Pe"])).unwrap(),
            Command::Search { gender: Gender::Female, name_start: "Pe".to_string() }
        );
        assert_eq!(
            Command::parse(7, &args(&["male"])).unwrap(),
            Command::Search { gender: Gender::Male, name_start: String::new() }
        );
        assert!(matches!(Command::parse(7, &args(&["x"])), Err(Error::InvalidGender(_))));
    }

    #[test]
    fn test_parse_rejects_wrong_arity_and_mode() {
        assert!(matches!(Command::parse(2, &args(&["Only Name"])), Err(Error::InvalidArgument(_))));
        assert!(matches!(Command::parse(3, &args(&["extra"])), Err(Error::InvalidArgument(_))));
        assert!(matches!(Command::parse(8, &[]), Err(Error::InvalidArgument(_))));
        assert!(Command::parse(8, &[]).unwrap_err().is_validation());
    }

    #[test]
    fn test_run_against_local_backend() {
        let mut backend = backend();

        Command::CreateTable.run(&mut backend).unwrap();
        Command::parse(2, &args(&["fisher fedor", "1985-03-10", "M"]))
            .unwrap()
            .run(&mut backend)
            .unwrap();
        Command::Generate { count: 10, special: 2 }.run(&mut backend).unwrap();
        Command::MaleF.run(&mut backend).unwrap();
        Command::Optimize.run(&mut backend).unwrap();
        Command::List.run(&mut backend).unwrap();

        assert_eq!(backend.manager().count_employees().unwrap(), 13);
    }

    #[test]
    fn test_run_propagates_validation_error() {
        let mut backend = backend();
        let err = Command::parse(2, &args(&["A B", "1990/05/15", "m"]))
            .unwrap()
            .run(&mut backend)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDate(_)));
        assert_eq!(backend.manager().count_employees().unwrap(), 0);
    }
}
