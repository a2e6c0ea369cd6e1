pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    banner, error, header, info, menu_item, muted, prompt, section, success, summary_row,
    timing, warn,
};
pub use progress::{GenerationProgress, Spinner};
pub use table::{employee_table, optimization_table};
pub use theme::{theme, Theme};
