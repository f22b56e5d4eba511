//! Role-based access control for moderation operations.

pub mod enforcer;
pub mod policies;

pub use enforcer::RbacEnforcer;
pub use policies::{RbacPolicies, SystemPermission};
