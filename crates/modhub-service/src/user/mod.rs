//! User directory.

pub mod directory;

pub use directory::UserDirectory;
