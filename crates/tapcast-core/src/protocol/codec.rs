//! Binary codec for the inbound control-message stream.
//!
//! Wire format, per record:
//! ```text
//! [tag:1][payload]
//! ```
//! Three message kinds carry a fixed-size payload; `InjectText` carries a
//! 4-byte length prefix followed by that many UTF-8 bytes. All multi-byte
//! integers and floats are big-endian.
//!
//! The endpoint is receive-only: [`encode_message`] exists for the
//! controller side of the pair and for test fixtures.

use thiserror::Error;
use tracing::trace;

use crate::protocol::messages::{
    ControlMsg, MessageType, Position, INJECT_KEYCODE_PAYLOAD_LEN, INJECT_SCROLL_PAYLOAD_LEN,
    INJECT_TOUCH_PAYLOAD_LEN, TEXT_MAX_LENGTH,
};

/// Errors raised while decoding the control stream. All variants are fatal
/// to the connection; no resynchronization is attempted.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The leading tag byte is not a recognized message type.
    #[error("unknown message type: 0x{0:02X}")]
    UnknownMessageType(u8),

    /// Fewer bytes were available than the fixed or declared length.
    #[error("truncated stream: need {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },

    /// The declared text length is negative or exceeds [`TEXT_MAX_LENGTH`].
    #[error("malformed text length: {0}")]
    MalformedLength(i32),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes one [`ControlMsg`] from the beginning of `bytes`.
///
/// Returns the decoded message and the total number of bytes consumed
/// (tag + payload), so a caller holding a buffer can advance its cursor.
///
/// # Errors
///
/// Returns [`ProtocolError`] on an unknown tag, a truncated record, or a
/// malformed text length.
pub fn decode_message(bytes: &[u8]) -> Result<(ControlMsg, usize), ProtocolError> {
    let tag = *bytes.first().ok_or(ProtocolError::Truncated {
        needed: 1,
        available: 0,
    })?;
    let ty = MessageType::try_from(tag).map_err(|_| ProtocolError::UnknownMessageType(tag))?;

    match ty.fixed_payload_len() {
        Some(len) => {
            require_len(bytes, 1 + len)?;
            let msg = decode_payload(ty, &bytes[1..1 + len])?;
            Ok((msg, 1 + len))
        }
        None => {
            // InjectText: 4-byte big-endian length prefix, then raw bytes.
            require_len(bytes, 5)?;
            let declared = read_i32(bytes, 1);
            let len = check_text_length(declared)?;
            require_len(bytes, 5 + len)?;
            let msg = decode_payload(ty, &bytes[5..5 + len])?;
            Ok((msg, 5 + len))
        }
    }
}

/// Decodes a payload whose tag and length have already been consumed by the
/// framing layer. For `InjectText` the slice holds the raw text bytes (the
/// length prefix is not included).
///
/// # Errors
///
/// Returns [`ProtocolError::Truncated`] if the slice is shorter than the
/// kind's fixed layout.
pub fn decode_payload(ty: MessageType, payload: &[u8]) -> Result<ControlMsg, ProtocolError> {
    let msg = match ty {
        MessageType::InjectKeycode => decode_keycode(payload)?,
        MessageType::InjectText => decode_text(payload),
        MessageType::InjectTouch => decode_touch(payload)?,
        MessageType::InjectScroll => decode_scroll(payload)?,
    };
    trace!(?msg, "decoded control message");
    Ok(msg)
}

/// Validates a declared `InjectText` length against the protocol bounds.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedLength`] when the length is negative
/// or larger than [`TEXT_MAX_LENGTH`].
pub fn check_text_length(declared: i32) -> Result<usize, ProtocolError> {
    if declared < 0 || declared > TEXT_MAX_LENGTH {
        return Err(ProtocolError::MalformedLength(declared));
    }
    Ok(declared as usize)
}

/// Encodes a [`ControlMsg`] into the wire format, tag byte included.
///
/// The endpoint never encodes on its own connection; this is the
/// controller-side half of the codec and the fixture builder for tests.
pub fn encode_message(msg: &ControlMsg) -> Vec<u8> {
    let mut buf = Vec::with_capacity(1 + INJECT_TOUCH_PAYLOAD_LEN);
    buf.push(msg.message_type() as u8);
    match msg {
        ControlMsg::InjectKeycode {
            action,
            keycode,
            repeat,
            metastate,
        } => {
            buf.push(*action as u8);
            buf.extend_from_slice(&keycode.to_be_bytes());
            buf.extend_from_slice(&repeat.to_be_bytes());
            buf.extend_from_slice(&metastate.to_be_bytes());
        }
        ControlMsg::InjectText { text } => {
            let bytes = text.as_bytes();
            buf.extend_from_slice(&(bytes.len() as i32).to_be_bytes());
            buf.extend_from_slice(bytes);
        }
        ControlMsg::InjectTouch {
            action,
            pointer_id,
            position,
            pressure,
            action_button,
            buttons,
        } => {
            buf.push(*action as u8);
            buf.extend_from_slice(&pointer_id.to_be_bytes());
            encode_position(&mut buf, position);
            buf.extend_from_slice(&pressure.to_be_bytes());
            buf.extend_from_slice(&action_button.to_be_bytes());
            buf.extend_from_slice(&buttons.to_be_bytes());
        }
        ControlMsg::InjectScroll {
            position,
            hscroll,
            vscroll,
            buttons,
        } => {
            encode_position(&mut buf, position);
            buf.extend_from_slice(&hscroll.to_be_bytes());
            buf.extend_from_slice(&vscroll.to_be_bytes());
            buf.extend_from_slice(&buttons.to_be_bytes());
        }
    }
    buf
}

// ── Per-message decode helpers ────────────────────────────────────────────────

fn decode_keycode(p: &[u8]) -> Result<ControlMsg, ProtocolError> {
    require_len(p, INJECT_KEYCODE_PAYLOAD_LEN)?;
    Ok(ControlMsg::InjectKeycode {
        action: p[0] as i8 as i32,
        keycode: read_i32(p, 1),
        repeat: read_i32(p, 5),
        metastate: read_i32(p, 9),
    })
}

fn decode_text(p: &[u8]) -> ControlMsg {
    // The original decodes with a plain String(bytes) that never fails, so
    // invalid UTF-8 degrades to replacement characters rather than an error.
    ControlMsg::InjectText {
        text: String::from_utf8_lossy(p).into_owned(),
    }
}

fn decode_touch(p: &[u8]) -> Result<ControlMsg, ProtocolError> {
    require_len(p, INJECT_TOUCH_PAYLOAD_LEN)?;
    Ok(ControlMsg::InjectTouch {
        action: p[0] as i8 as i32,
        pointer_id: read_i64(p, 1),
        position: read_position(p, 9),
        pressure: read_f32(p, 21),
        action_button: read_i32(p, 25),
        buttons: read_i32(p, 29),
    })
}

fn decode_scroll(p: &[u8]) -> Result<ControlMsg, ProtocolError> {
    require_len(p, INJECT_SCROLL_PAYLOAD_LEN)?;
    Ok(ControlMsg::InjectScroll {
        position: read_position(p, 0),
        hscroll: read_f32(p, 12),
        vscroll: read_f32(p, 16),
        buttons: read_i32(p, 20),
    })
}

// ── Utility helpers ───────────────────────────────────────────────────────────

fn encode_position(buf: &mut Vec<u8>, position: &Position) {
    buf.extend_from_slice(&position.x.to_be_bytes());
    buf.extend_from_slice(&position.y.to_be_bytes());
    buf.extend_from_slice(&position.screen_width.to_be_bytes());
    buf.extend_from_slice(&position.screen_height.to_be_bytes());
}

fn read_position(p: &[u8], off: usize) -> Position {
    Position {
        x: read_i32(p, off),
        y: read_i32(p, off + 4),
        screen_width: read_u16(p, off + 8),
        screen_height: read_u16(p, off + 10),
    }
}

fn require_len(buf: &[u8], needed: usize) -> Result<(), ProtocolError> {
    if buf.len() < needed {
        Err(ProtocolError::Truncated {
            needed,
            available: buf.len(),
        })
    } else {
        Ok(())
    }
}

fn read_u16(p: &[u8], off: usize) -> u16 {
    u16::from_be_bytes([p[off], p[off + 1]])
}

fn read_i32(p: &[u8], off: usize) -> i32 {
    i32::from_be_bytes([p[off], p[off + 1], p[off + 2], p[off + 3]])
}

fn read_i64(p: &[u8], off: usize) -> i64 {
    i64::from_be_bytes([
        p[off],
        p[off + 1],
        p[off + 2],
        p[off + 3],
        p[off + 4],
        p[off + 5],
        p[off + 6],
        p[off + 7],
    ])
}

fn read_f32(p: &[u8], off: usize) -> f32 {
    f32::from_be_bytes([p[off], p[off + 1], p[off + 2], p[off + 3]])
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_empty_buffer_is_truncated() {
        assert_eq!(
            decode_message(&[]),
            Err(ProtocolError::Truncated {
                needed: 1,
                available: 0
            })
        );
    }

    #[test]
    fn test_decode_unknown_tag_fails() {
        assert_eq!(
            decode_message(&[0xFF]),
            Err(ProtocolError::UnknownMessageType(0xFF))
        );
    }

    #[test]
    fn test_decode_keycode_reads_big_endian_fields() {
        let mut bytes = vec![0u8]; // tag
        bytes.push(1); // action = UP
        bytes.extend_from_slice(&66i32.to_be_bytes()); // keycode
        bytes.extend_from_slice(&2i32.to_be_bytes()); // repeat
        bytes.extend_from_slice(&0x41i32.to_be_bytes()); // metastate

        let (msg, consumed) = decode_message(&bytes).unwrap();
        assert_eq!(consumed, 14);
        assert_eq!(
            msg,
            ControlMsg::InjectKeycode {
                action: 1,
                keycode: 66,
                repeat: 2,
                metastate: 0x41,
            }
        );
    }

    #[test]
    fn test_decode_keycode_truncated_payload_fails() {
        // tag plus only 4 of the 13 payload bytes
        let bytes = [0u8, 0, 0, 0, 0];
        assert_eq!(
            decode_message(&bytes),
            Err(ProtocolError::Truncated {
                needed: 14,
                available: 5
            })
        );
    }

    #[test]
    fn test_decode_text_negative_length_is_malformed() {
        let mut bytes = vec![1u8];
        bytes.extend_from_slice(&(-1i32).to_be_bytes());
        assert_eq!(
            decode_message(&bytes),
            Err(ProtocolError::MalformedLength(-1))
        );
    }

    #[test]
    fn test_decode_text_oversized_length_is_malformed() {
        let mut bytes = vec![1u8];
        bytes.extend_from_slice(&(TEXT_MAX_LENGTH + 1).to_be_bytes());
        assert_eq!(
            decode_message(&bytes),
            Err(ProtocolError::MalformedLength(TEXT_MAX_LENGTH + 1))
        );
    }

    #[test]
    fn test_decode_text_invalid_utf8_degrades_lossily() {
        let mut bytes = vec![1u8];
        bytes.extend_from_slice(&2i32.to_be_bytes());
        bytes.extend_from_slice(&[0xC3, 0x28]); // invalid sequence
        let (msg, _) = decode_message(&bytes).unwrap();
        match msg {
            ControlMsg::InjectText { text } => assert!(text.contains('\u{FFFD}')),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_decode_touch_missing_trailing_bytes_fails() {
        let msg = ControlMsg::InjectTouch {
            action: 0,
            pointer_id: 42,
            position: Position::new(10, 20, 1080, 1920),
            pressure: 1.0,
            action_button: 0,
            buttons: 0,
        };
        let mut bytes = encode_message(&msg);
        bytes.truncate(bytes.len() - 1);
        assert!(matches!(
            decode_message(&bytes),
            Err(ProtocolError::Truncated { .. })
        ));
    }

    #[test]
    fn test_consumed_accounts_for_text_length_prefix() {
        let msg = ControlMsg::InjectText {
            text: "hello".to_string(),
        };
        let bytes = encode_message(&msg);
        let (decoded, consumed) = decode_message(&bytes).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(consumed, 1 + 4 + 5);
    }
}
