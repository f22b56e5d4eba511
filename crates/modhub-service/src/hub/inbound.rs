//! Dispatch of raw WebSocket frames.

use tracing::{debug, warn};

use modhub_core::error::AppError;
use modhub_core::types::UserId;
use modhub_realtime::message::serializer::deserialize_inbound;
use modhub_realtime::message::types::InboundMessage;
use modhub_realtime::message::validator::validate_inbound;
use modhub_realtime::{OutboundMessage, SessionHandle};

use super::Hub;
use crate::context::RequestContext;

impl Hub {
    /// Handles one text frame received on `session`.
    ///
    /// Never fails: every problem is answered with an `error` frame on the
    /// same session, coded with the error kind.
    pub async fn handle_inbound(&self, session: &SessionHandle, raw: &str) {
        session.touch().await;

        if let Err(err) = validate_inbound(raw, self.sessions.config().max_frame_bytes) {
            session.send(OutboundMessage::error("INVALID_MESSAGE", err.message));
            return;
        }

        let frame = match deserialize_inbound(raw) {
            Ok(frame) => frame,
            Err(err) => {
                debug!(session_id = %session.id, error = %err, "Unparseable frame");
                session.send(OutboundMessage::error(
                    "INVALID_MESSAGE",
                    format!("Invalid message format: {err}"),
                ));
                return;
            }
        };

        let ctx = RequestContext::for_session(session);
        if let Err(err) = self.dispatch(&ctx, session, frame).await {
            debug!(
                session_id = %session.id,
                user_id = %session.user_id,
                kind = %err.kind,
                error = %err.message,
                "Inbound frame refused"
            );
            session.send(OutboundMessage::error(err.kind.to_string(), err.message));
        }
    }

    async fn dispatch(
        &self,
        ctx: &RequestContext,
        session: &SessionHandle,
        frame: InboundMessage,
    ) -> Result<(), AppError> {
        match frame {
            InboundMessage::Message { user_id, text, .. } => {
                check_identity(session, user_id)?;
                self.submit_message(ctx, &text).await?;
            }
            InboundMessage::File { user_id, file, .. } => {
                check_identity(session, user_id)?;
                self.announce_file(ctx, &file.id)?;
            }
            InboundMessage::Pong { .. } => {}
        }
        Ok(())
    }
}

/// Rejects frames that claim to come from someone other than the session's
/// user.
fn check_identity(session: &SessionHandle, claimed: Option<UserId>) -> Result<(), AppError> {
    match claimed {
        Some(claimed) if claimed != session.user_id => {
            warn!(
                session_id = %session.id,
                user_id = %session.user_id,
                claimed = %claimed,
                "Frame identity mismatch"
            );
            Err(AppError::authorization(
                "Frame user_id does not match the session",
            ))
        }
        _ => Ok(()),
    }
}
