//! Control-message types received from the controlling peer.
//!
//! The stream is receive-only: the controller sends compact binary records
//! and this endpoint decodes them. Field values follow the Android input
//! constants in [`crate::domain::motion`].

// ── Protocol constants ────────────────────────────────────────────────────────

/// Payload size of an `InjectKeycode` record in bytes.
pub const INJECT_KEYCODE_PAYLOAD_LEN: usize = 13;

/// Payload size of an `InjectTouch` record in bytes.
pub const INJECT_TOUCH_PAYLOAD_LEN: usize = 33;

/// Payload size of an `InjectScroll` record in bytes.
pub const INJECT_SCROLL_PAYLOAD_LEN: usize = 24;

/// Upper bound on the declared length of an `InjectText` payload.
pub const TEXT_MAX_LENGTH: i32 = 300;

// ── Reserved pointer identifiers ──────────────────────────────────────────────

/// Pointer id of the controller's real mouse. Selects mouse synthesis when
/// combined with a hover move or a secondary button (see the controller).
pub const POINTER_ID_MOUSE: i64 = -1;

/// Pointer id used by controllers that simulate a finger from mouse input.
pub const POINTER_ID_GENERIC_FINGER: i64 = -2;

/// Pointer id of a simulated mouse (e.g. an on-screen virtual pointer).
pub const POINTER_ID_VIRTUAL_MOUSE: i64 = -3;

/// Pointer id of a simulated extra finger (pinch-to-zoom helpers).
pub const POINTER_ID_VIRTUAL_FINGER: i64 = -4;

// ── Message type tags ─────────────────────────────────────────────────────────

/// One-byte type tag leading every record on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    InjectKeycode = 0,
    InjectText = 1,
    InjectTouch = 2,
    InjectScroll = 3,
}

impl TryFrom<u8> for MessageType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0 => Ok(MessageType::InjectKeycode),
            1 => Ok(MessageType::InjectText),
            2 => Ok(MessageType::InjectTouch),
            3 => Ok(MessageType::InjectScroll),
            _ => Err(()),
        }
    }
}

impl MessageType {
    /// Payload length for the fixed-size message kinds; `None` for
    /// `InjectText`, whose payload carries its own 4-byte length prefix.
    pub fn fixed_payload_len(self) -> Option<usize> {
        match self {
            MessageType::InjectKeycode => Some(INJECT_KEYCODE_PAYLOAD_LEN),
            MessageType::InjectText => None,
            MessageType::InjectTouch => Some(INJECT_TOUCH_PAYLOAD_LEN),
            MessageType::InjectScroll => Some(INJECT_SCROLL_PAYLOAD_LEN),
        }
    }
}

// ── Positions ─────────────────────────────────────────────────────────────────

/// A point in the controller's coordinate space, together with the screen
/// size the controller observed when it produced the event.
///
/// Must be mapped to the local device's physical coordinate space before
/// use; the mapping may fail when the declared screen size no longer
/// matches the device (e.g. after a rotation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub screen_width: u16,
    pub screen_height: u16,
}

impl Position {
    pub fn new(x: i32, y: i32, screen_width: u16, screen_height: u16) -> Self {
        Self {
            x,
            y,
            screen_width,
            screen_height,
        }
    }
}

// ── Control messages ──────────────────────────────────────────────────────────

/// One decoded unit from the inbound stream describing a single intended
/// input action. Immutable once decoded; consumed once by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlMsg {
    /// Inject a single key event.
    InjectKeycode {
        action: i32,
        keycode: i32,
        repeat: i32,
        metastate: i32,
    },
    /// Type a string of text through the virtual keyboard.
    InjectText { text: String },
    /// One touch or mouse contact update for a single pointer.
    InjectTouch {
        action: i32,
        pointer_id: i64,
        position: Position,
        pressure: f32,
        action_button: i32,
        buttons: i32,
    },
    /// Mouse wheel scroll at a position, both axes at once.
    InjectScroll {
        position: Position,
        hscroll: f32,
        vscroll: f32,
        buttons: i32,
    },
}

impl ControlMsg {
    /// The wire tag corresponding to this message's kind.
    pub fn message_type(&self) -> MessageType {
        match self {
            ControlMsg::InjectKeycode { .. } => MessageType::InjectKeycode,
            ControlMsg::InjectText { .. } => MessageType::InjectText,
            ControlMsg::InjectTouch { .. } => MessageType::InjectTouch,
            ControlMsg::InjectScroll { .. } => MessageType::InjectScroll,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
