use crate::cli::io;
use crate::cli::output::section;
use crate::cli::registry::{CommandEntry, CommandRegistry};

pub fn print_overview(registry: &CommandRegistry) {
    section("Available commands");
    for entry in registry.list() {
        io::print_info(format!("  {:<10} {}", entry.name, entry.description));
    }
    io::print_hint("Use `help <command>` for details. Press Tab to complete command names.");
}

pub fn print_command(entry: &CommandEntry) {
    section(format!("Help: {}", entry.name));
    io::print_info(format!("  {}", entry.description));
    for (idx, usage) in entry.usage.lines().enumerate() {
        let label = if idx == 0 { "Usage:" } else { "" };
        io::print_info(format!("  {label:<6} {}", usage.trim()));
    }
}
