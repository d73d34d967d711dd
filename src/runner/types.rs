use crate::runner::notifier::Description;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    /// Failed with the reported cause rendered as text
    Failed(String),
}

/// Result of running one child
#[derive(Debug, Clone)]
pub struct TestResult {
    pub description: Description,

    pub outcome: TestOutcome,

    /// Wall time from started to finished
    pub duration: Duration,
}

impl TestResult {
    pub fn passed(description: Description, duration: Duration) -> Self {
        Self {
            description,
            outcome: TestOutcome::Passed,
            duration,
        }
    }

    pub fn failed(description: Description, message: String, duration: Duration) -> Self {
        Self {
            description,
            outcome: TestOutcome::Failed(message),
            duration,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == TestOutcome::Passed
    }

    pub fn failure_message(&self) -> Option<&str> {
        match &self.outcome {
            TestOutcome::Passed => None,
            TestOutcome::Failed(message) => Some(message),
        }
    }
}

/// Totals for one run
#[derive(Debug, Clone, Default)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub total_duration: Duration,
}

impl TestSummary {
    pub fn from_results(results: &[TestResult]) -> Self {
        let passed = results.iter().filter(|r| r.is_success()).count();
        let total_duration = results.iter().map(|r| r.duration).sum();

        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            total_duration,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}
