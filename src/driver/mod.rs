pub mod heap_page;

use std::fmt;

use thiserror::Error;
use tracing::{info, warn};

use crate::types::error::PageError;

pub use heap_page::{HeapPageCase, HeapPageDriver};

#[derive(Error, Debug)]
pub enum CaseFailure {
    #[error("check failed: {0}")]
    Check(String),

    #[error("unexpected page error: {0}")]
    Page(#[from] PageError),
}

/// Fail the current case with `message` unless `condition` holds.
pub fn ensure(condition: bool, message: impl Into<String>) -> Result<(), CaseFailure> {
    if condition {
        Ok(())
    } else {
        Err(CaseFailure::Check(message.into()))
    }
}

/// A suite of named test cases run one after another.
pub trait TestDriver {
    type Case: Copy + fmt::Display + 'static;

    /// Printed as the kind of testing being done.
    fn name(&self) -> &str;

    fn cases(&self) -> &'static [Self::Case];

    fn run_case(&mut self, case: Self::Case) -> Result<(), CaseFailure>;

    fn run_tests(&mut self) -> DriverReport {
        let mut outcomes = Vec::new();
        for &case in self.cases() {
            let result = self.run_case(case);
            match &result {
                Ok(()) => info!(driver = self.name(), %case, "case passed"),
                Err(err) => warn!(driver = self.name(), %case, error = %err, "case failed"),
            }
            outcomes.push(CaseOutcome {
                name: case.to_string(),
                failure: result.err().map(|err| err.to_string()),
            });
        }
        DriverReport {
            driver: self.name().to_string(),
            outcomes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CaseOutcome {
    pub name: String,
    pub failure: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DriverReport {
    pub driver: String,
    pub outcomes: Vec<CaseOutcome>,
}

impl DriverReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.failure.is_none()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

impl fmt::Display for DriverReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Running {} tests", self.driver)?;
        for outcome in &self.outcomes {
            match &outcome.failure {
                None => writeln!(f, "  {:<28} ok", outcome.name)?,
                Some(reason) => writeln!(f, "  {:<28} FAILED: {}", outcome.name, reason)?,
            }
        }
        write!(f, "{} passed, {} failed", self.passed(), self.failed())
    }
}
