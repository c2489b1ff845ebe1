//! Colored message prefixes shared by the binary and printers.

use owo_colors::OwoColorize;

pub fn error_prefix(color: bool) -> String {
    if color {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn warn_prefix(color: bool) -> String {
    if color {
        "warning:".yellow().bold().to_string()
    } else {
        "warning:".to_string()
    }
}

pub fn note_prefix(color: bool) -> String {
    if color {
        "note:".cyan().bold().to_string()
    } else {
        "note:".to_string()
    }
}
