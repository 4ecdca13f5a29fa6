/// State management module
///
/// This module holds all upload workflow state:
/// - The picked image and its preview (selection.rs)
/// - The latest verdict and the busy flag (result.rs)
/// - Submission tickets and derived status (session.rs)

pub mod result;
pub mod selection;
pub mod session;

pub use result::{AnalysisResult, Label, Outcome};
pub use selection::LoadedFile;
pub use session::{AnalysisRequest, AnalysisStatus, Completion, Session, Ticket};
