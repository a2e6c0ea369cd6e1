//! Numbered modes (one-shot) and the interactive menu, both driven through
//! an [`EmployeeBackend`](crate::backend::EmployeeBackend).

pub mod command;
pub mod menu;

pub use command::Command;
pub use menu::Menu;
