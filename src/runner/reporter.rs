use crate::config::Config;
use crate::runner::notifier::{Description, Failure, RunNotifier};
use crate::runner::types::{TestResult, TestSummary};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};
use std::time::Instant;

struct InFlight {
    description: Description,
    started: Instant,
    failure: Option<String>,
}

/// Notifier printing one line per child, like a terminal test harness
pub struct ConsoleNotifier {
    verbose: bool,
    current: Option<InFlight>,
    results: Vec<TestResult>,
}

impl ConsoleNotifier {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            current: None,
            results: Vec::new(),
        }
    }

    /// Console notifier honoring `[run] verbose`
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.run.verbose)
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn summary(&self) -> TestSummary {
        TestSummary::from_results(&self.results)
    }

    /// Print the run header
    pub fn print_header(&self, class_name: &str, total: usize) {
        println!("\nRunning {} tests from {}...\n", total, class_name.bold());
    }

    /// Print one finished child
    pub fn print_result(&self, result: &TestResult) {
        let symbol = if result.is_success() { "✓" } else { "✗" };
        let color = if result.is_success() { "green" } else { "red" };

        if self.verbose {
            println!(
                " {} {} {} ({}ms)",
                symbol.color(color),
                result.description.method_name,
                result.description.class_name.dimmed(),
                result.duration.as_millis()
            );
        } else {
            println!(
                " {} {} {}",
                symbol.color(color),
                result.description.method_name,
                result.description.class_name.dimmed()
            );
        }

        if let Some(message) = result.failure_message() {
            println!("   {}: {}", "Error".red().bold(), message);
            println!();
        }
    }

    /// Print totals and a table of failures
    pub fn print_summary(&self, summary: &TestSummary) {
        println!("\n{}", "━".repeat(50));
        println!("{}", "Summary".bold());
        println!("{}", "━".repeat(50));

        if summary.failed == 0 {
            println!(
                "  {}: {} passed, {} total",
                "Tests".bold(),
                summary.passed.to_string().green(),
                summary.total
            );
        } else {
            println!(
                "  {}: {} passed, {} failed, {} total",
                "Tests".bold(),
                summary.passed.to_string().green(),
                summary.failed.to_string().red(),
                summary.total
            );
        }

        println!(
            "  {}: {:.3}s",
            "Duration".bold(),
            summary.total_duration.as_secs_f64()
        );
        println!();

        if let Some(table) = self.failure_table() {
            println!("{}", table);
        }
    }

    fn failure_table(&self) -> Option<Table> {
        let failed: Vec<&TestResult> = self.results.iter().filter(|r| !r.is_success()).collect();
        if failed.is_empty() {
            return None;
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["Test", "Class", "Failure", "Duration"]);

        for result in failed {
            table.add_row(vec![
                Cell::new(&result.description.method_name).fg(Color::Red),
                Cell::new(&result.description.class_name).add_attribute(Attribute::Dim),
                Cell::new(result.failure_message().unwrap_or_default()),
                Cell::new(format!("{}ms", result.duration.as_millis())),
            ]);
        }

        Some(table)
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new(false)
    }
}

impl RunNotifier for ConsoleNotifier {
    fn fire_test_started(&mut self, description: &Description) {
        if self.verbose {
            println!(" {} {}", "▶".cyan(), description);
        }
        self.current = Some(InFlight {
            description: description.clone(),
            started: Instant::now(),
            failure: None,
        });
    }

    fn fire_test_failure(&mut self, failure: Failure) {
        match self.current.as_mut() {
            Some(current) if current.description == failure.description => {
                current.failure = Some(failure.message());
            }
            _ => tracing::warn!(test = %failure.description, "Failure reported outside of a started test"),
        }
    }

    fn fire_test_finished(&mut self, description: &Description) {
        let Some(current) = self.current.take() else {
            tracing::warn!(test = %description, "Finished reported for a test that never started");
            return;
        };

        let duration = current.started.elapsed();
        let result = match current.failure {
            None => TestResult::passed(current.description, duration),
            Some(message) => TestResult::failed(current.description, message, duration),
        };
        self.print_result(&result);
        self.results.push(result);
    }
}
