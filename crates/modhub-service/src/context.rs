//! Request context carrying the acting user and the originating session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use modhub_core::types::{SessionId, UserId};
use modhub_realtime::SessionHandle;

/// Context for the current request.
///
/// Passed into every hub call so each operation knows *who* is acting and
/// from *which* session. The actor's role is not carried here: it is read
/// from the user directory at decision time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user's ID.
    pub user_id: UserId,
    /// The WebSocket session the request arrived on, if any.
    pub session_id: Option<SessionId>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Context for a REST call made on behalf of `user_id`.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            session_id: None,
            request_time: Utc::now(),
        }
    }

    /// Context for a frame received on a WebSocket session.
    pub fn for_session(session: &SessionHandle) -> Self {
        Self {
            user_id: session.user_id,
            session_id: Some(session.id),
            request_time: Utc::now(),
        }
    }
}
