//! Uploaded file entities.

pub mod model;
pub mod scan;
pub mod status;

pub use model::FileUpload;
pub use scan::{ScanReport, ScanVerdict};
pub use status::{FileStatus, ModerationMode};
