mod controller;
mod progress;
mod selection;
mod view;

// Public API of the quiz subsystem.
pub use crate::error::SessionError;
pub use controller::SessionController;
pub use progress::{CodeSet, ProgressTracker, ProgressView, percent};
pub use selection::{SelectionPolicy, SelectionState};
pub use view::{AnswerOutcome, QuizView, RunSummary};
