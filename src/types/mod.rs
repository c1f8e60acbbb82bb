pub mod error;
pub mod message;
pub mod report;

pub use error::{PathwiseError, Result, TierFailure};
pub use message::{Conversation, Message, Role};
pub use report::{CompletionReport, CourseSuggestion, NextStep};
