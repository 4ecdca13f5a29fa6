/// Upload session: selection + result slot + request generation
///
/// Selecting a file and starting a submission both bump the generation,
/// and every submission carries it in its `Ticket`. A response or heatmap
/// carrying an older generation is discarded instead of landing in the
/// result slot.

use super::result::{AnalysisResult, Outcome, ResultStore};
use super::selection::{LoadedFile, SelectedFile, SelectionStore};
use crate::error::AnalysisError;

/// Where the upload workflow currently is (derived, never stored)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStatus {
    /// Nothing selected
    Idle,
    /// A file is selected, not submitted yet
    Selecting,
    Submitting,
    Succeeded,
    Failed,
}

/// Identifies one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Everything needed to send one upload. Built right before sending.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub ticket: Ticket,
    pub file_name: String,
    pub mime_type: &'static str,
    pub payload: Vec<u8>,
}

/// What `complete` did with a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The ticket was superseded; nothing changed
    Discarded,
}

#[derive(Debug, Default)]
pub struct Session {
    selection: SelectionStore,
    results: ResultStore,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(selection: SelectionStore) -> Self {
        Self {
            selection,
            ..Self::default()
        }
    }

    /// Select a file. Always resets: any verdict, error or in-flight
    /// submission is forgotten.
    pub fn select_file(&mut self, file: LoadedFile) -> &SelectedFile {
        if self.results.is_busy() {
            log::debug!(
                "Superseding in-flight submission (generation {})",
                self.generation
            );
        }
        self.generation += 1;
        self.results.clear();
        self.selection.select_file(file)
    }

    pub fn current_file(&self) -> Option<&SelectedFile> {
        self.selection.current_file()
    }

    /// Start a submission for the current file
    ///
    /// Refuses with `AlreadyInProgress` while busy and `NoFileSelected`
    /// with nothing picked; neither refusal changes any state.
    pub fn begin_submit(&mut self) -> Result<AnalysisRequest, AnalysisError> {
        if self.results.is_busy() {
            return Err(AnalysisError::AlreadyInProgress);
        }
        let file = self
            .selection
            .current_file()
            .ok_or(AnalysisError::NoFileSelected)?;

        // Each submission gets its own generation, even for the same file
        let generation = self.generation + 1;
        let request = AnalysisRequest {
            ticket: Ticket { generation },
            file_name: file.name.clone(),
            mime_type: file.mime_type(),
            payload: file.content.clone(),
        };

        self.generation = generation;
        self.results.set_busy(true);
        Ok(request)
    }

    /// Apply the response for `ticket`, unless it has been superseded
    pub fn complete(
        &mut self,
        ticket: &Ticket,
        response: Result<AnalysisResult, AnalysisError>,
    ) -> Completion {
        if ticket.generation != self.generation || !self.results.is_busy() {
            log::debug!(
                "Discarding late response (generation {}, current {})",
                ticket.generation,
                self.generation
            );
            return Completion::Discarded;
        }

        let outcome = match response {
            Ok(result) => Outcome::Succeeded(result),
            Err(err) => Outcome::Failed(err.to_string()),
        };
        self.results.settle(outcome);
        Completion::Applied
    }

    /// Whether `generation` still refers to the visible verdict
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation && self.results.result().is_some()
    }

    pub fn results(&self) -> &ResultStore {
        &self.results
    }

    pub fn status(&self) -> AnalysisStatus {
        if self.results.is_busy() {
            return AnalysisStatus::Submitting;
        }
        match self.results.outcome() {
            Some(Outcome::Succeeded(_)) => AnalysisStatus::Succeeded,
            Some(Outcome::Failed(_)) => AnalysisStatus::Failed,
            None if self.selection.current_file().is_some() => AnalysisStatus::Selecting,
            None => AnalysisStatus::Idle,
        }
    }

    /// Submit is offered only with a file and no request in flight
    pub fn can_submit(&self) -> bool {
        self.selection.current_file().is_some() && !self.results.is_busy()
    }
}
