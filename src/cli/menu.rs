use std::io::{self, BufRead};
use crate::backend::EmployeeBackend;
use crate::cli::command::{generation_total, Command, MODES};
use crate::employee::{self, Gender, NewEmployee};
use crate::generator::{DEFAULT_COUNT, DEFAULT_SPECIAL};
use crate::ui::{self, Icons};
use crate::{Error, Result};

/// Interactive loop over any line source. Errors from an action are printed
/// and the loop goes on; `0` or end of input leaves it.
pub struct Menu<'a, R: BufRead> {
    backend: &'a mut dyn EmployeeBackend,
    input: R,
}

fn end_of_input() -> Error {
    Error::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"))
}

fn is_end_of_input(err: &Error) -> bool {
    matches!(err, Error::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
}

impl<'a, R: BufRead> Menu<'a, R> {
    pub fn new(backend: &'a mut dyn EmployeeBackend, input: R) -> Self {
        Self { backend, input }
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            self.print_menu();
            let choice = match self.ask("Choose an action:") {
                Ok(choice) => choice,
                Err(e) if is_end_of_input(&e) => break,
                Err(e) => return Err(e),
            };

            let outcome = match choice.as_str() {
                "0" => {
                    println!("{} Bye", Icons::WAVE);
                    break;
                }
                "1" => Command::CreateTable.run(self.backend),
                "2" => self.add_employee(),
                "3" => Command::List.run(self.backend),
                "4" => self.generate(),
                "5" => Command::MaleF.run(self.backend),
                "6" => Command::Optimize.run(self.backend),
                "7" => self.search(),
                other => Err(Error::InvalidArgument(format!("unknown choice {other:?}"))),
            };

            match outcome {
                Ok(()) => {}
                Err(e) if is_end_of_input(&e) => break,
                Err(e) => {
                    tracing::warn!(error = %e, choice = %choice, "menu action failed");
                    ui::error(&e.to_string());
                }
            }

            if self.ask("\nPress Enter to continue...").is_err() {
                break;
            }
        }
        Ok(())
    }

    fn print_menu(&self) {
        ui::banner("EMPLOYEE MANAGEMENT", &self.backend.describe());
        for (mode, label) in MODES {
            ui::menu_item(&mode.to_string(), label);
        }
        ui::menu_item("0", "Exit");
    }

    /// Prompt and read one trimmed line
    fn ask(&mut self, prompt: &str) -> Result<String> {
        ui::prompt(prompt);
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            println!();
            return Err(end_of_input());
        }
        Ok(line.trim().to_string())
    }

    /// Prompt until `parse` accepts the answer
    fn ask_until<T>(&mut self, prompt: &str, parse: impl Fn(&str) -> Result<T>) -> Result<(String, T)> {
        loop {
            let answer = self.ask(prompt)?;
            match parse(&answer) {
                Ok(value) => return Ok((answer, value)),
                Err(e) => ui::warn(&e.to_string()),
            }
        }
    }

    fn add_employee(&mut self) -> Result<()> {
        ui::section("Add employee");
        let full_name = self.ask("Full name:")?;
        let (birth_date, _) = self.ask_until("Birth date (YYYY-MM-DD):", employee::parse_birth_date)?;
        let (gender, _) = self.ask_until("Gender (1/M = male, 2/F = female):", |s| s.parse::<Gender>())?;

        Command::AddEmployee(NewEmployee::new(full_name, birth_date, gender)).run(self.backend)
    }

    fn generate(&mut self) -> Result<()> {
        ui::section("Generate test data");
        let count = self.ask_count("Number of records", DEFAULT_COUNT)?;
        let special = self.ask_count("Guaranteed male 'F' records", DEFAULT_SPECIAL)?;
        let total = generation_total(count, special)?;

        let answer = self.ask(&format!("{} {} records will be generated. Continue? (y/n):", Icons::WARN, total))?;
        if !answer.eq_ignore_ascii_case("y") {
            println!("{}", ui::muted("Cancelled"));
            return Ok(());
        }

        Command::Generate { count, special }.run(self.backend)
    }

    fn ask_count(&mut self, label: &str, default: usize) -> Result<usize> {
        let (_, count) = self.ask_until(&format!("{label} [{default}]:"), |s| {
            if s.is_empty() {
                return Ok(default);
            }
            s.parse()
                .map_err(|_| Error::InvalidArgument(format!("expected a non-negative integer (got {s:?})")))
        })?;
        Ok(count)
    }

    fn search(&mut self) -> Result<()> {
        ui::section("Search employees");
        let (_, gender) = self.ask_until("Gender (1/M = male, 2/F = female):", |s| s.parse::<Gender>())?;
        let name_start = self.ask("Name starts with (empty for any):")?;

        Command::Search { gender, name_start }.run(self.backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;
    use crate::manager::EmployeeManager;
    use std::io::Cursor;

    fn backend() -> LocalBackend {
        LocalBackend::new(EmployeeManager::open_in_memory().unwrap(), ":memory:")
    }

    fn drive(backend: &mut LocalBackend, script: &str) {
        Menu::new(backend, Cursor::new(script.to_string())).run().unwrap();
    }

    #[test]
    fn test_add_reprompts_until_valid() {
        let mut backend = backend();
        // bad date, then bad gender, before the valid answers
        drive(&mut backend, "2\nfedorov  fedor\n15.05.1990\n1990-05-15\nrobot\nм\n\n0\n");

        let records = backend.manager().list_employees().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].full_name, "Fedorov Fedor");
        assert_eq!(records[0].gender, Gender::Male);
    }

    #[test]
    fn test_generate_requires_confirmation() {
        let mut backend = backend();
        drive(&mut backend, "4\n20\n3\nn\n\n4\n20\n3\ny\n\n0\n");
        assert_eq!(backend.manager().count_employees().unwrap(), 23);
    }

    #[test]
    fn test_generate_overflowing_total_is_reported() {
        let mut backend = backend();
        let script = format!("4\n{}\n1\n\n3\n\n0\n", usize::MAX);
        drive(&mut backend, &script);
        assert_eq!(backend.manager().count_employees().unwrap(), 0);
    }

    #[test]
    fn test_errors_do_not_leave_the_loop() {
        let mut backend = backend();
        // unknown choice, then a table check and a search, then exit
        drive(&mut backend, "9\n\n1\n\n7\nx\n2\nA\n\n2\nanna ivanova\n1992-01-02\nf\n\n0\n");
        assert_eq!(backend.manager().count_employees().unwrap(), 1);
    }

    #[test]
    fn test_end_of_input_exits_cleanly() {
        let mut backend = backend();
        drive(&mut backend, "");
        drive(&mut backend, "2\nHalf Entered\n");
        assert_eq!(backend.manager().count_employees().unwrap(), 0);
    }

    #[test]
    fn test_all_read_actions_run() {
        let mut backend = backend();
        drive(&mut backend, "4\n15\n2\ny\n\n3\n\n5\n\n6\n\n6\n\n7\n1\nF\n\n0\n");
        assert_eq!(backend.manager().count_employees().unwrap(), 17);
    }
}
