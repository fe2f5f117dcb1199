use colored::Colorize;
use std::path::Path;
use typewiz_checker::TypeCoverage;

/// Human-readable output of the CLI commands.
pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    pub fn format_coverage(&self, coverage: &TypeCoverage) -> String {
        let percentage = format!("{:.2}%", coverage.percentage);
        let percentage = if !self.color {
            percentage
        } else if coverage.percentage >= 90.0 {
            percentage.green().bold().to_string()
        } else if coverage.percentage >= 50.0 {
            percentage.yellow().bold().to_string()
        } else {
            percentage.red().bold().to_string()
        };
        format!(
            "{} of {} identifiers have a known type ({})",
            coverage.known_types, coverage.total_types, percentage
        )
    }

    pub fn format_written(&self, path: &Path) -> String {
        let label = if self.color {
            "wrote".green().to_string()
        } else {
            "wrote".to_string()
        };
        format!("{} {}", label, path.display())
    }
}
