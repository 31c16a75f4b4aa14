//! Input-subsystem constants shared between the wire protocol and the
//! synthesized events.
//!
//! Values match the Android `MotionEvent`/`KeyEvent`/`InputDevice`
//! constants the controlling peer encodes, so they pass through the
//! endpoint unchanged.

/// Motion action codes carried in touch messages and synthesized events.
pub mod action {
    /// First pointer of a gesture touches down.
    pub const DOWN: i32 = 0;
    /// Last pointer of a gesture lifts.
    pub const UP: i32 = 1;
    /// A tracked pointer moved.
    pub const MOVE: i32 = 2;
    /// A secondary pointer touches down; ORed with the pointer index.
    pub const POINTER_DOWN: i32 = 5;
    /// A secondary pointer lifts; ORed with the pointer index.
    pub const POINTER_UP: i32 = 6;
    /// Mouse moved with no button held.
    pub const HOVER_MOVE: i32 = 7;
    /// Mouse wheel scroll.
    pub const SCROLL: i32 = 8;
    /// A mouse button transitioned to pressed.
    pub const BUTTON_PRESS: i32 = 11;
    /// A mouse button transitioned to released.
    pub const BUTTON_RELEASE: i32 = 12;

    /// Bit offset of the pointer index inside a `POINTER_DOWN`/`POINTER_UP`
    /// action code.
    pub const POINTER_INDEX_SHIFT: i32 = 8;
}

/// Key action codes carried in keycode messages.
pub mod key_action {
    pub const DOWN: i32 = 0;
    pub const UP: i32 = 1;
}

/// Mouse button bitmask values.
pub mod button {
    pub const PRIMARY: i32 = 1 << 0;
    pub const SECONDARY: i32 = 1 << 1;
    pub const TERTIARY: i32 = 1 << 2;
    pub const BACK: i32 = 1 << 3;
    pub const FORWARD: i32 = 1 << 4;
}

/// Tool types reported per pointer in a synthesized event.
pub mod tool_type {
    pub const FINGER: i32 = 1;
    pub const MOUSE: i32 = 3;
}

/// Raw input source codes.
pub mod source {
    pub const TOUCHSCREEN: u32 = 0x1002;
    pub const MOUSE: u32 = 0x2002;
}
