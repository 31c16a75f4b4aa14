//! The controller: turns decoded control messages into ordered sequences
//! of synthesized input events.
//!
//! This is the event-synthesis state machine of the endpoint. It owns the
//! pointer table and the gesture base timestamp, and delegates to three
//! collaborator traits for everything platform-specific: the
//! [`DeviceMapper`] (controller coordinates to device coordinates), the
//! [`EventSink`] (actual OS-level delivery), and the [`KeyComposer`]
//! (text to key strokes). The platform implementations live in the
//! infrastructure layer.

use std::time::Instant;

use tapcast_core::domain::event::{EventSource, PointerSnapshot, SynthesizedEvent};
use tapcast_core::domain::geometry::PhysicalPoint;
use tapcast_core::domain::motion::{action, button, tool_type};
use tapcast_core::domain::pointers::PointersState;
use tapcast_core::protocol::messages::{ControlMsg, Position, POINTER_ID_MOUSE};
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for event-sink delivery failures.
///
/// Sink failures abort the remaining steps of a multi-event sequence but
/// never close the connection; only protocol errors do that.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("platform rejected event: {0}")]
    Platform(String),
}

/// How the sink should wait on the platform when delivering.
///
/// The endpoint always injects asynchronously, as the original does; the
/// other modes exist for sinks that need to block on delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectMode {
    Async,
    WaitForResult,
    WaitForFinish,
}

/// One key event produced by decomposing a text character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    pub action: i32,
    pub keycode: i32,
    pub metastate: i32,
}

// ── Collaborator traits ───────────────────────────────────────────────────────

/// Maps controller-space positions onto the local device.
pub trait DeviceMapper {
    /// Returns the physical point for `position`, or `None` when the
    /// declared screen size no longer matches the device (e.g. after a
    /// rotation); the caller must then drop the event rather than inject
    /// a stale coordinate.
    fn to_physical(&self, position: Position) -> Option<PhysicalPoint>;
}

/// Delivers synthesized events to the operating input subsystem.
pub trait EventSink {
    /// Hands one motion event to the platform. Ownership of the event
    /// transfers to the sink; the controller never retains it.
    fn deliver(&self, event: &SynthesizedEvent) -> Result<(), SinkError>;

    /// Hands one key event to the platform.
    fn deliver_key(
        &self,
        action: i32,
        keycode: i32,
        repeat: i32,
        metastate: i32,
        mode: InjectMode,
    ) -> Result<(), SinkError>;
}

/// Decomposes text characters into base characters and key strokes on a
/// virtual keyboard.
pub trait KeyComposer {
    /// Splits a composed character (e.g. an accented letter) into base
    /// characters, or `None` when it needs no decomposition.
    fn decompose(&self, c: char) -> Option<Vec<char>>;

    /// Key strokes replaying `chars` on the virtual keyboard, or `None`
    /// when some character cannot be mapped.
    fn strokes(&self, chars: &[char]) -> Option<Vec<KeyStroke>>;
}

// ── Mouse button bracketing ───────────────────────────────────────────────────

/// One primitive step of a mouse event sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketStep {
    /// Emit `ACTION_DOWN` (first button of a bracket going down).
    Down,
    /// Emit `ACTION_BUTTON_PRESS` tagged with the transitioning button.
    ButtonPress,
    /// Emit `ACTION_BUTTON_RELEASE` tagged with the transitioning button.
    ButtonRelease,
    /// Emit `ACTION_UP` (last button of a bracket lifted).
    Up,
    /// Emit the already-computed action unchanged.
    Plain,
}

/// Ordered event steps required for one mouse transition.
///
/// Mice need every button transition wrapped in press/release events on
/// top of the overall down/up bracket, or downstream consumers misread
/// composite gestures:
/// - first button pressed: `DOWN` then `BUTTON_PRESS`;
/// - every further button pressed: `BUTTON_PRESS` alone;
/// - every button released: `BUTTON_RELEASE`;
/// - last button released: `BUTTON_RELEASE` then `UP`.
///
/// `buttons` is the mask after the transition, so "first button down" is
/// `action_button == buttons` and "last button up" is `buttons == 0`.
pub fn bracket_steps(action: i32, action_button: i32, buttons: i32) -> &'static [BracketStep] {
    use BracketStep::*;
    if action == action::DOWN {
        if action_button == buttons {
            &[Down, ButtonPress]
        } else {
            &[ButtonPress]
        }
    } else if action == action::UP {
        if buttons == 0 {
            &[ButtonRelease, Up]
        } else {
            &[ButtonRelease]
        }
    } else {
        &[Plain]
    }
}

// ── Controller ────────────────────────────────────────────────────────────────

/// Consumes decoded control messages and drives the event sink.
///
/// Exclusively owned by one dispatch loop; decode and synthesis are never
/// concurrent for a connection, so no internal locking is needed.
pub struct Controller<D, S, C> {
    device: D,
    sink: S,
    composer: C,
    pointers: PointersState,
    start: Instant,
    /// Base timestamp of the gesture in progress; reused by every event
    /// of a contiguous multi-touch gesture.
    last_touch_down: i64,
}

impl<D: DeviceMapper, S: EventSink, C: KeyComposer> Controller<D, S, C> {
    pub fn new(device: D, sink: S, composer: C) -> Self {
        Self {
            device,
            sink,
            composer,
            pointers: PointersState::new(),
            start: Instant::now(),
            last_touch_down: 0,
        }
    }

    /// Read-only view of the pointer table, for observability and tests.
    pub fn pointers(&self) -> &PointersState {
        &self.pointers
    }

    fn now_ms(&self) -> i64 {
        self.start.elapsed().as_millis() as i64
    }

    /// Dispatches one decoded message.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] only when the sink rejects a delivery;
    /// geometry mismatches and slot exhaustion are recovered locally by
    /// dropping the event.
    pub fn process(&mut self, msg: ControlMsg) -> Result<(), SinkError> {
        match msg {
            ControlMsg::InjectKeycode {
                action,
                keycode,
                repeat,
                metastate,
            } => self.inject_keycode(action, keycode, repeat, metastate),
            ControlMsg::InjectText { text } => {
                let injected = self.inject_text(&text);
                debug!(injected, total = text.chars().count(), "injected text");
                Ok(())
            }
            ControlMsg::InjectTouch {
                action,
                pointer_id,
                position,
                pressure,
                action_button,
                buttons,
            } => self.inject_touch(action, pointer_id, position, pressure, action_button, buttons),
            ControlMsg::InjectScroll {
                position,
                hscroll,
                vscroll,
                buttons,
            } => self.inject_scroll(position, hscroll, vscroll, buttons),
        }
    }

    /// Key path: a pure 1:1 forward to the sink.
    pub fn inject_keycode(
        &self,
        action: i32,
        keycode: i32,
        repeat: i32,
        metastate: i32,
    ) -> Result<(), SinkError> {
        self.sink
            .deliver_key(action, keycode, repeat, metastate, InjectMode::Async)
    }

    /// Text path: injects each character independently and returns the
    /// number that produced at least one key event. Failed characters are
    /// logged and skipped; the call itself never fails.
    pub fn inject_text(&self, text: &str) -> usize {
        let mut success = 0;
        for c in text.chars() {
            if self.inject_char(c) {
                success += 1;
            } else {
                warn!("could not inject char U+{:04X}", c as u32);
            }
        }
        success
    }

    fn inject_char(&self, c: char) -> bool {
        let chars = self.composer.decompose(c).unwrap_or_else(|| vec![c]);
        let Some(strokes) = self.composer.strokes(&chars) else {
            return false;
        };
        for stroke in strokes {
            let delivered = self.sink.deliver_key(
                stroke.action,
                stroke.keycode,
                0,
                stroke.metastate,
                InjectMode::Async,
            );
            if delivered.is_err() {
                return false;
            }
        }
        true
    }

    /// Touch/mouse path: the core synthesis algorithm.
    pub fn inject_touch(
        &mut self,
        mut action: i32,
        pointer_id: i64,
        position: Position,
        pressure: f32,
        action_button: i32,
        mut buttons: i32,
    ) -> Result<(), SinkError> {
        let now = self.now_ms();

        let Some(point) = self.device.to_physical(position) else {
            warn!("ignoring touch event, it was generated for a different device size");
            return Ok(());
        };

        let Ok(slot) = self.pointers.resolve_slot(pointer_id) else {
            warn!("too many pointers for touch event");
            return Ok(());
        };

        // Classify the event source. A real mouse event is one carrying
        // the mouse pointer id together with a hover move or any button a
        // finger cannot produce.
        let secondary_active = (action_button | buttons) & !button::PRIMARY != 0;
        let source;
        let is_up;
        if pointer_id == POINTER_ID_MOUSE && (action == action::HOVER_MOVE || secondary_active) {
            source = EventSource::Mouse;
            is_up = buttons == 0;
        } else {
            // Generic or virtual finger, or a primary-button mouse drag
            // rendered as touch. Buttons must not be set for touch events.
            source = EventSource::Touchscreen;
            buttons = 0;
            is_up = action == action::UP;
        }

        self.pointers.update(slot, point, pressure, is_up);
        let pointer_count = self.pointers.live_count();

        if pointer_count == 1 {
            if action == action::DOWN {
                self.last_touch_down = now;
            }
        } else {
            // Secondary pointers must use POINTER_DOWN/POINTER_UP ORed
            // with the slot index.
            if action == action::UP {
                action = action::POINTER_UP | ((slot as i32) << action::POINTER_INDEX_SHIFT);
            } else if action == action::DOWN {
                action = action::POINTER_DOWN | ((slot as i32) << action::POINTER_INDEX_SHIFT);
            }
        }

        let steps: &[BracketStep] = match source {
            EventSource::Mouse => bracket_steps(action, action_button, buttons),
            EventSource::Touchscreen => &[BracketStep::Plain],
        };

        let result = self.emit_steps(steps, action, action_button, buttons, pointer_count, slot, source, now);

        // The slot is freed only after the up-event has been produced, so
        // a new contact can reuse it without disturbing this gesture.
        if is_up {
            self.pointers.release(slot);
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_steps(
        &self,
        steps: &[BracketStep],
        action: i32,
        action_button: i32,
        buttons: i32,
        pointer_count: u8,
        slot: usize,
        source: EventSource,
        now: i64,
    ) -> Result<(), SinkError> {
        for step in steps {
            let (step_action, step_button) = match step {
                BracketStep::Down => (action::DOWN, 0),
                BracketStep::ButtonPress => (action::BUTTON_PRESS, action_button),
                BracketStep::ButtonRelease => (action::BUTTON_RELEASE, action_button),
                BracketStep::Up => (action::UP, 0),
                BracketStep::Plain => (action, 0),
            };
            let event = SynthesizedEvent {
                timestamp_base: self.last_touch_down,
                timestamp_now: now,
                action: step_action,
                pointer_count,
                pointers: self.snapshot(slot, source),
                buttons: buttons as u32,
                action_button: step_button as u32,
                hscroll: 0.0,
                vscroll: 0.0,
                source,
            };
            // A failed step aborts the rest of the sequence.
            self.sink.deliver(&event)?;
        }
        Ok(())
    }

    /// Snapshots all live pointers in slot order. The pointer the current
    /// message updated reports the source's tool type; the rest are
    /// fingers.
    fn snapshot(&self, updated_slot: usize, source: EventSource) -> Vec<PointerSnapshot> {
        self.pointers
            .live()
            .map(|(slot, p)| PointerSnapshot {
                slot: slot as u8,
                id: p.id,
                point: p.point,
                pressure: p.pressure,
                tool_type: if slot == updated_slot {
                    source.tool_type()
                } else {
                    tool_type::FINGER
                },
            })
            .collect()
    }

    /// Scroll path: always slot 0, always a mouse-sourced single event.
    pub fn inject_scroll(
        &mut self,
        position: Position,
        hscroll: f32,
        vscroll: f32,
        buttons: i32,
    ) -> Result<(), SinkError> {
        let now = self.now_ms();

        let Some(point) = self.device.to_physical(position) else {
            warn!("ignoring scroll event, it was generated for a different device size");
            return Ok(());
        };

        let event = SynthesizedEvent {
            timestamp_base: self.last_touch_down,
            timestamp_now: now,
            action: action::SCROLL,
            pointer_count: 1,
            pointers: vec![PointerSnapshot {
                slot: 0,
                id: 0,
                point,
                pressure: 0.0,
                tool_type: tool_type::MOUSE,
            }],
            buttons: buttons as u32,
            action_button: 0,
            hscroll,
            vscroll,
            source: EventSource::Mouse,
        };
        self.sink.deliver(&event)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
