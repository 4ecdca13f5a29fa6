/// Result store: the latest verdict plus the busy flag
///
/// Both live in one struct so an observer never sees busy cleared with a
/// stale verdict still in place. `settle` does both in one step.

use chrono::{DateTime, Local};
use std::fmt;

/// Verdict label returned by the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Real,
    Fake,
}

impl Label {
    /// Parse a service tag, ignoring case ("real", "FAKE", ...)
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_uppercase().as_str() {
            "REAL" => Some(Label::Real),
            "FAKE" => Some(Label::Fake),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Real => "REAL",
            Label::Fake => "FAKE",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated verdict
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub label: Label,
    /// Always in [0.0, 1.0]
    pub confidence: f64,
    /// Heatmap path relative to the service base URL
    pub heatmap_path: Option<String>,
    pub received_at: DateTime<Local>,
}

/// How the last submission ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Succeeded(AnalysisResult),
    /// Human-readable reason
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    busy: bool,
    outcome: Option<Outcome>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a submission as in flight. Any previous outcome is dropped.
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
        if busy {
            self.outcome = None;
        }
    }

    pub fn set_result(&mut self, result: Option<AnalysisResult>) {
        self.outcome = result.map(Outcome::Succeeded);
    }

    /// Clear busy and store the outcome together
    pub fn settle(&mut self, outcome: Outcome) {
        self.busy = false;
        self.outcome = Some(outcome);
    }

    /// Back to nothing: not busy, no outcome
    pub fn clear(&mut self) {
        self.busy = false;
        self.outcome = None;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// The current verdict, if the last submission succeeded
    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.outcome {
            Some(Outcome::Succeeded(result)) => Some(result),
            _ => None,
        }
    }
}
