//! File moderation: upload validation, storage, and the status workflow.

pub mod store;
pub mod upload;
pub mod workflow;

pub use store::FileStore;
pub use upload::UploadRequest;
pub use workflow::{FileDecision, FileWorkflow, TransitionOutcome};
