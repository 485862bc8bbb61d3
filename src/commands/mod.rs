/// Register files for tracking.
pub mod add;
/// Run the conversion orchestrator.
pub mod convert;
/// Create the tracked-file store.
pub mod init;
/// List tracked files.
pub mod ls;
/// Remove files from tracking.
pub mod rm;
/// Classify tracked files as up-to-date, changed, or missing.
pub mod status;

use colored::Colorize;

/// Prints a success line to stdout.
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error line to stderr.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints an informational line to stdout.
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Prints a warning line to stdout.
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}
