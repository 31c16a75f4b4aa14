//! Integration tests for the control-message wire format.
//!
//! Byte buffers are built both by hand (field-by-field, matching the
//! protocol tables) and through the controller-side `encode_message`
//! helper, and must decode to equal messages.

use tapcast_core::domain::motion::{action, button, key_action};
use tapcast_core::protocol::codec::{decode_message, encode_message, ProtocolError};
use tapcast_core::protocol::messages::{
    ControlMsg, Position, POINTER_ID_MOUSE, TEXT_MAX_LENGTH,
};

fn round_trip(msg: &ControlMsg) -> ControlMsg {
    let bytes = encode_message(msg);
    let (decoded, consumed) = decode_message(&bytes).expect("decode failed");
    assert_eq!(consumed, bytes.len(), "consumed must equal encoded size");
    decoded
}

// ── Per-kind round trips ──────────────────────────────────────────────────────

#[test]
fn test_inject_keycode_round_trip() {
    let msg = ControlMsg::InjectKeycode {
        action: key_action::DOWN,
        keycode: 66,
        repeat: 3,
        metastate: 0x41,
    };
    assert_eq!(round_trip(&msg), msg);
}

#[test]
fn test_inject_text_round_trip() {
    let msg = ControlMsg::InjectText {
        text: "héllo wörld".to_string(),
    };
    assert_eq!(round_trip(&msg), msg);
}

#[test]
fn test_inject_text_empty_round_trip() {
    let msg = ControlMsg::InjectText {
        text: String::new(),
    };
    assert_eq!(round_trip(&msg), msg);
}

#[test]
fn test_inject_touch_round_trip() {
    let msg = ControlMsg::InjectTouch {
        action: action::DOWN,
        pointer_id: 42,
        position: Position::new(540, 960, 1080, 1920),
        pressure: 0.75,
        action_button: button::PRIMARY,
        buttons: button::PRIMARY,
    };
    assert_eq!(round_trip(&msg), msg);
}

#[test]
fn test_inject_touch_mouse_pointer_round_trip() {
    let msg = ControlMsg::InjectTouch {
        action: action::HOVER_MOVE,
        pointer_id: POINTER_ID_MOUSE,
        position: Position::new(-5, 12, 2400, 1080),
        pressure: 0.0,
        action_button: 0,
        buttons: button::SECONDARY | button::TERTIARY,
    };
    assert_eq!(round_trip(&msg), msg);
}

#[test]
fn test_inject_scroll_round_trip() {
    let msg = ControlMsg::InjectScroll {
        position: Position::new(100, 200, 1080, 1920),
        hscroll: -1.5,
        vscroll: 2.0,
        buttons: button::BACK,
    };
    assert_eq!(round_trip(&msg), msg);
}

// ── Hand-built buffers against the wire tables ────────────────────────────────

#[test]
fn test_touch_wire_layout_is_33_byte_payload() {
    let mut bytes = vec![2u8]; // InjectTouch tag
    bytes.push(0); // action = DOWN
    bytes.extend_from_slice(&42i64.to_be_bytes());
    bytes.extend_from_slice(&540i32.to_be_bytes());
    bytes.extend_from_slice(&960i32.to_be_bytes());
    bytes.extend_from_slice(&1080u16.to_be_bytes());
    bytes.extend_from_slice(&1920u16.to_be_bytes());
    bytes.extend_from_slice(&1.0f32.to_be_bytes());
    bytes.extend_from_slice(&button::PRIMARY.to_be_bytes());
    bytes.extend_from_slice(&button::PRIMARY.to_be_bytes());
    assert_eq!(bytes.len(), 34);

    let (msg, consumed) = decode_message(&bytes).unwrap();
    assert_eq!(consumed, 34);
    assert_eq!(
        msg,
        ControlMsg::InjectTouch {
            action: action::DOWN,
            pointer_id: 42,
            position: Position::new(540, 960, 1080, 1920),
            pressure: 1.0,
            action_button: button::PRIMARY,
            buttons: button::PRIMARY,
        }
    );
}

#[test]
fn test_scroll_wire_layout_is_24_byte_payload() {
    let mut bytes = vec![3u8]; // InjectScroll tag
    bytes.extend_from_slice(&10i32.to_be_bytes());
    bytes.extend_from_slice(&20i32.to_be_bytes());
    bytes.extend_from_slice(&1080u16.to_be_bytes());
    bytes.extend_from_slice(&1920u16.to_be_bytes());
    bytes.extend_from_slice(&0.5f32.to_be_bytes());
    bytes.extend_from_slice(&(-1.0f32).to_be_bytes());
    bytes.extend_from_slice(&0i32.to_be_bytes());
    assert_eq!(bytes.len(), 25);

    let (msg, _) = decode_message(&bytes).unwrap();
    assert_eq!(
        msg,
        ControlMsg::InjectScroll {
            position: Position::new(10, 20, 1080, 1920),
            hscroll: 0.5,
            vscroll: -1.0,
            buttons: 0,
        }
    );
}

#[test]
fn test_negative_action_byte_sign_extends() {
    // The action field is an i8 on the wire.
    let mut bytes = vec![0u8];
    bytes.push(0xFFu8); // action = -1
    bytes.extend_from_slice(&[0u8; 12]);
    let (msg, _) = decode_message(&bytes).unwrap();
    match msg {
        ControlMsg::InjectKeycode { action, .. } => assert_eq!(action, -1),
        other => panic!("unexpected message: {other:?}"),
    }
}

// ── Error conditions ──────────────────────────────────────────────────────────

#[test]
fn test_unknown_tag_is_fatal() {
    assert_eq!(
        decode_message(&[0xFF, 0, 0, 0]),
        Err(ProtocolError::UnknownMessageType(0xFF))
    );
}

#[test]
fn test_truncated_touch_is_reported_with_sizes() {
    let bytes = vec![2u8; 10]; // tag + 9 of 33 payload bytes
    assert_eq!(
        decode_message(&bytes),
        Err(ProtocolError::Truncated {
            needed: 34,
            available: 10
        })
    );
}

#[test]
fn test_text_length_at_cap_decodes() {
    let msg = ControlMsg::InjectText {
        text: "a".repeat(TEXT_MAX_LENGTH as usize),
    };
    assert_eq!(round_trip(&msg), msg);
}

#[test]
fn test_text_declared_longer_than_available_is_truncated() {
    let mut bytes = vec![1u8];
    bytes.extend_from_slice(&10i32.to_be_bytes());
    bytes.extend_from_slice(b"short");
    assert_eq!(
        decode_message(&bytes),
        Err(ProtocolError::Truncated {
            needed: 15,
            available: 10
        })
    );
}
