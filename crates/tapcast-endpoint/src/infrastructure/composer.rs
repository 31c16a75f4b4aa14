//! Virtual-keyboard key composer.
//!
//! Maps text characters onto strokes of a US-layout virtual keyboard
//! using the Android keycode values the rest of the event stream speaks.
//! Characters the layout cannot produce yield `None`; the controller
//! counts them as failed and moves on.

use tapcast_core::domain::motion::key_action;

use crate::application::controller::{KeyComposer, KeyStroke};

// Android KeyEvent keycodes for the virtual keyboard.
const KEYCODE_A: i32 = 29;
const KEYCODE_0: i32 = 7;
const KEYCODE_COMMA: i32 = 55;
const KEYCODE_PERIOD: i32 = 56;
const KEYCODE_TAB: i32 = 61;
const KEYCODE_SPACE: i32 = 62;
const KEYCODE_ENTER: i32 = 66;

// META_SHIFT_ON | META_SHIFT_LEFT_ON
const META_SHIFT: i32 = 0x41;

/// Composer typing on a US-layout virtual keyboard.
#[derive(Debug, Default)]
pub struct VirtualKeyboardComposer;

impl VirtualKeyboardComposer {
    pub fn new() -> Self {
        Self
    }

    fn keycode(c: char) -> Option<(i32, i32)> {
        match c {
            'a'..='z' => Some((KEYCODE_A + (c as i32 - 'a' as i32), 0)),
            'A'..='Z' => Some((KEYCODE_A + (c as i32 - 'A' as i32), META_SHIFT)),
            '0'..='9' => Some((KEYCODE_0 + (c as i32 - '0' as i32), 0)),
            ',' => Some((KEYCODE_COMMA, 0)),
            '.' => Some((KEYCODE_PERIOD, 0)),
            '\t' => Some((KEYCODE_TAB, 0)),
            ' ' => Some((KEYCODE_SPACE, 0)),
            '\n' => Some((KEYCODE_ENTER, 0)),
            _ => None,
        }
    }

    /// Strips the accent from a precomposed Latin letter, keeping case.
    fn base_letter(c: char) -> Option<char> {
        let base = match c.to_lowercase().next()? {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            'ý' | 'ÿ' => 'y',
            _ => return None,
        };
        if c.is_uppercase() {
            base.to_uppercase().next()
        } else {
            Some(base)
        }
    }
}

impl KeyComposer for VirtualKeyboardComposer {
    fn decompose(&self, c: char) -> Option<Vec<char>> {
        Self::base_letter(c).map(|base| vec![base])
    }

    fn strokes(&self, chars: &[char]) -> Option<Vec<KeyStroke>> {
        let mut strokes = Vec::with_capacity(chars.len() * 2);
        for &c in chars {
            let (keycode, metastate) = Self::keycode(c)?;
            strokes.push(KeyStroke {
                action: key_action::DOWN,
                keycode,
                metastate,
            });
            strokes.push(KeyStroke {
                action: key_action::UP,
                keycode,
                metastate,
            });
        }
        Some(strokes)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
