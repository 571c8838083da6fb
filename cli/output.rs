use byte_unit::{Byte, UnitType};
use colored::*;
use packcode_core::{RunLogger, RunReport};

/// Renders run events on the terminal. Warnings and errors go to stderr and
/// are never silenced.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLogger {
    silent: bool,
}

impl ConsoleLogger {
    pub fn new(silent: bool) -> Self {
        Self { silent }
    }
}

impl RunLogger for ConsoleLogger {
    fn info(&self, message: &str) {
        if !self.silent {
            println!("{} {}", "ℹ".blue(), message);
        }
    }

    fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message.yellow());
    }

    fn error(&self, message: &str) {
        eprintln!("{} {}", "✖".red().bold(), message.red());
    }

    fn success(&self, message: &str) {
        if !self.silent {
            println!("{} {}", "✔".green(), message);
        }
    }
}

pub fn human_size(bytes: u64) -> String {
    Byte::from_u128(bytes as u128)
        .unwrap_or_default()
        .get_appropriate_unit(UnitType::Binary)
        .to_string()
}

pub fn print_summary(report: &RunReport, logger: &dyn RunLogger) {
    if report.is_empty() {
        logger.warn(&format!(
            "Output file {} was created but contains no content.",
            report.output_path.display()
        ));
        return;
    }

    println!();
    println!("{}", "--- Summary ---".bold());
    println!(
        "{} Processed {} files.",
        "✔".green(),
        report.file_count.to_string().bold()
    );
    println!(
        "  Total lines written: {}",
        report.total_line_count.to_string().bold()
    );
    println!(
        "  Output file: {}",
        report.output_path.display().to_string().cyan()
    );
    println!("  File size: {}", human_size(report.byte_size).bold());
    println!("{}", "---------------".bold());
}
