//! Network infrastructure: the per-connection dispatch loop.
//!
//! One [`Session`] services one persistent connection with a sequential
//! read-decode-synthesize-deliver cycle. The blocking read of the next
//! record's bytes is the only suspension point; once a record is in,
//! synthesis runs to completion, so a gesture's events are emitted in
//! program order and never interleaved with another gesture's.
//!
//! There is deliberately no read timeout: a silent controller leaves the
//! loop suspended rather than producing a false disconnect. Closing the
//! transport fails the read and ends the session. Reconnection, if
//! wanted, belongs to whoever owns the socket.

use std::io::ErrorKind;

use tapcast_core::protocol::codec::{self, ProtocolError};
use tapcast_core::protocol::messages::{ControlMsg, MessageType};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info, warn};

use crate::application::controller::{Controller, DeviceMapper, EventSink, KeyComposer};

/// Errors that end a session. Both classes are fatal to the connection;
/// recoverable conditions never reach this type.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The inbound stream violated the wire protocol. No
    /// resynchronization is attempted.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The transport failed mid-record.
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, not yet reading.
    Connecting,
    /// Suspended on the next record's bytes.
    Reading,
    /// Decoding and synthesizing one record.
    Processing,
    /// The loop has exited; the connection is torn down.
    Closed,
}

/// The read-decode-synthesize-deliver loop for one connection.
///
/// Exclusively owns its controller (and through it the pointer table),
/// so no locking is involved; concurrent controllers each get their own
/// `Session`.
pub struct Session<R, D, S, C> {
    reader: R,
    controller: Controller<D, S, C>,
    state: SessionState,
}

impl<R, D, S, C> Session<R, D, S, C>
where
    R: AsyncRead + Unpin,
    D: DeviceMapper,
    S: EventSink,
    C: KeyComposer,
{
    pub fn new(reader: R, controller: Controller<D, S, C>) -> Self {
        Self {
            reader,
            controller,
            state: SessionState::Connecting,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the dispatch loop until the peer closes the connection or a
    /// fatal error occurs. The session is `Closed` afterwards either way.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] on a protocol violation or a transport
    /// failure. Sink delivery failures are logged and do not end the
    /// session.
    pub async fn run(&mut self) -> Result<(), SessionError> {
        info!("session started");
        let result = self.drive().await;
        self.state = SessionState::Closed;
        match &result {
            Ok(()) => info!("session closed by peer"),
            Err(e) => warn!("session closed: {e}"),
        }
        result
    }

    async fn drive(&mut self) -> Result<(), SessionError> {
        loop {
            self.state = SessionState::Reading;
            let Some(msg) = self.read_control_msg().await? else {
                // Clean EOF on a record boundary.
                return Ok(());
            };

            self.state = SessionState::Processing;
            debug!(ty = ?msg.message_type(), "processing control message");
            if let Err(e) = self.controller.process(msg) {
                // A failed delivery aborts its event sequence only; the
                // connection stays up.
                warn!("event delivery failed: {e}");
            }
        }
    }

    /// Reads exactly one framed record: the tag byte, then the fixed
    /// payload for the fixed-size kinds or the length prefix plus text
    /// bytes for `InjectText`.
    ///
    /// Returns `None` on a clean end-of-stream before the tag byte.
    async fn read_control_msg(&mut self) -> Result<Option<ControlMsg>, SessionError> {
        let mut tag = [0u8; 1];
        match self.reader.read_exact(&mut tag).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let ty = MessageType::try_from(tag[0])
            .map_err(|_| ProtocolError::UnknownMessageType(tag[0]))?;

        let payload = match ty.fixed_payload_len() {
            Some(len) => {
                let mut buf = vec![0u8; len];
                self.read_payload(&mut buf, 1 + len).await?;
                buf
            }
            None => {
                let mut len_buf = [0u8; 4];
                self.read_payload(&mut len_buf, 5).await?;
                let declared = i32::from_be_bytes(len_buf);
                let len = codec::check_text_length(declared)?;
                let mut buf = vec![0u8; len];
                self.read_payload(&mut buf, 5 + len).await?;
                buf
            }
        };

        let msg = codec::decode_payload(ty, &payload)?;
        Ok(Some(msg))
    }

    /// Like `read_exact`, but an end-of-stream inside a record is a
    /// protocol truncation rather than a clean close.
    async fn read_payload(
        &mut self,
        buf: &mut [u8],
        record_len: usize,
    ) -> Result<(), SessionError> {
        match self.reader.read_exact(buf).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(ProtocolError::Truncated {
                needed: record_len,
                available: record_len - buf.len(),
            }
            .into()),
            Err(e) => Err(e.into()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tapcast_core::domain::geometry::ScreenSize;
    use tapcast_core::domain::motion::action;
    use tapcast_core::protocol::codec::encode_message;
    use tapcast_core::protocol::messages::Position;

    use crate::infrastructure::composer::VirtualKeyboardComposer;
    use crate::infrastructure::device::ScreenGeometry;
    use crate::infrastructure::event_sink::mock::MockEventSink;

    fn session<'a>(
        bytes: &'a [u8],
        sink: &'a MockEventSink,
    ) -> Session<&'a [u8], ScreenGeometry, &'a MockEventSink, VirtualKeyboardComposer> {
        let controller = Controller::new(
            ScreenGeometry::new(ScreenSize::new(1080, 1920)),
            sink,
            VirtualKeyboardComposer::new(),
        );
        Session::new(bytes, controller)
    }

    #[tokio::test]
    async fn test_clean_eof_closes_without_error() {
        let sink = MockEventSink::new();
        let mut session = session(&[], &sink);
        assert_eq!(session.state(), SessionState::Connecting);

        session.run().await.unwrap();
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(sink.delivered(), 0);
    }

    #[tokio::test]
    async fn test_unknown_tag_closes_with_zero_events() {
        let sink = MockEventSink::new();
        let bytes = [0xFFu8, 1, 2, 3];
        let mut session = session(&bytes, &sink);

        let err = session.run().await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Protocol(ProtocolError::UnknownMessageType(0xFF))
        ));
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(sink.delivered(), 0);
    }

    #[tokio::test]
    async fn test_truncated_record_is_fatal() {
        let touch = ControlMsg::InjectTouch {
            action: action::DOWN,
            pointer_id: 1,
            position: Position::new(0, 0, 1080, 1920),
            pressure: 1.0,
            action_button: 0,
            buttons: 0,
        };
        let mut bytes = encode_message(&touch);
        bytes.truncate(bytes.len() - 4);

        let sink = MockEventSink::new();
        let mut session = session(&bytes, &sink);
        let err = session.run().await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Protocol(ProtocolError::Truncated { .. })
        ));
        assert_eq!(sink.delivered(), 0);
    }

    #[tokio::test]
    async fn test_processes_records_in_stream_order() {
        let mut bytes = encode_message(&ControlMsg::InjectTouch {
            action: action::DOWN,
            pointer_id: 1,
            position: Position::new(5, 5, 1080, 1920),
            pressure: 1.0,
            action_button: 0,
            buttons: 0,
        });
        bytes.extend(encode_message(&ControlMsg::InjectTouch {
            action: action::UP,
            pointer_id: 1,
            position: Position::new(5, 5, 1080, 1920),
            pressure: 0.0,
            action_button: 0,
            buttons: 0,
        }));

        let sink = MockEventSink::new();
        let mut session = session(&bytes, &sink);
        session.run().await.unwrap();

        let motions = sink.motions.lock().unwrap();
        assert_eq!(motions.len(), 2);
        assert_eq!(motions[0].action, action::DOWN);
        assert_eq!(motions[1].action, action::UP);
    }

    #[tokio::test]
    async fn test_sink_failure_does_not_close_session() {
        let mut bytes = encode_message(&ControlMsg::InjectKeycode {
            action: 0,
            keycode: 66,
            repeat: 0,
            metastate: 0,
        });
        bytes.extend(encode_message(&ControlMsg::InjectKeycode {
            action: 1,
            keycode: 66,
            repeat: 0,
            metastate: 0,
        }));

        let sink = MockEventSink::new();
        sink.fail_all.store(true, std::sync::atomic::Ordering::Relaxed);
        let mut session = session(&bytes, &sink);

        // Both records are consumed; the loop exits on clean EOF.
        session.run().await.unwrap();
        assert_eq!(sink.delivered(), 0);
    }
}
