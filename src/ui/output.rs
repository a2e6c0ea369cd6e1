use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;
use std::io::Write;
use std::time::Duration;

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(theme().header.clone()));
}

pub fn banner(title: &str, location: &str) {
    let rule = "=".repeat(50);
    println!();
    println!("{}", rule.style(theme().rule.clone()));
    println!("{} {}", Icons::DATABASE, title.style(theme().header.clone()));
    println!("  {}", muted(location));
    println!("{}", rule.style(theme().rule.clone()));
}

pub fn menu_item(key: &str, label: &str) {
    println!("  {} {}", format!("{key}.").style(theme().key.clone()), label);
}

/// Print a prompt without a trailing newline
pub fn prompt(text: &str) {
    print!("{} ", text.style(theme().key.clone()));
    std::io::stdout().flush().ok();
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn muted(text: &str) -> String {
    text.style(theme().muted.clone()).to_string()
}

pub fn timing(label: &str, elapsed: Duration) {
    println!(
        "{} {}: {:.4} s",
        Icons::CLOCK.style(theme().dim.clone()),
        label,
        elapsed.as_secs_f64()
    );
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}
