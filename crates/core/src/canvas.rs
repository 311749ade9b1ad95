//! Pointer-driven scene positioning on the editor canvas.
//!
//! A [`DragMachine`] tracks one gesture per pointer device and decides whether a press/release
//! cycle was a click (open the scene editor) or a drag (move the scene).
//!
//! ```text
//! Idle -> Pressed -> Dragging -> Idle
//!            \-----------------> Idle  (click, or abort)
//! ```
//!
//! ## Contract
//!
//! 1. Only a primary-button press over a scene arms the machine.
//! 2. While `Pressed`, a pointer that travels strictly more than the threshold from the press
//!    point starts a drag. From then on every move emits `node_start + (pointer - press)`,
//!    computed from the press rather than the previous frame so rounding never accumulates.
//! 3. Release from `Pressed` is a click; release from `Dragging` commits the final position.
//!    Exactly one of the two happens per cycle.
//! 4. Losing pointer capture aborts: no click and no commit. If positions were already emitted
//!    the abort carries the start position so the host can put the scene back.
//! 5. A press while a gesture is active is ignored; one drag per device at a time.

use crate::constants::DRAG_THRESHOLD_PX;
use crate::error::{StoryError, StoryResult};
use crate::graph;
use crate::story::{Position, StoryNode};

/// Mouse/pen button that produced a press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Auxiliary,
}

/// Input to the machine, in screen coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerEvent {
    /// Press over a scene whose current canvas position is `node_position`.
    Down {
        node_id: String,
        node_position: Position,
        button: PointerButton,
        at: Position,
    },
    Move {
        at: Position,
    },
    Up {
        at: Position,
    },
    /// The pointer capture was taken away (window blur, touch cancel).
    CaptureLost,
}

/// Gesture lifecycle state.
#[derive(Clone, Debug, PartialEq)]
pub enum DragState {
    Idle,
    Pressed {
        node_id: String,
        press_point: Position,
        node_start: Position,
    },
    Dragging {
        node_id: String,
        press_point: Position,
        node_start: Position,
        current: Position,
    },
}

/// Why an event produced no effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragNoopReason {
    IdleWithoutPress,
    NonPrimaryButton,
    GestureAlreadyActive,
    ThresholdNotReached,
}

/// Outcome of one event.
#[derive(Clone, Debug, PartialEq)]
pub enum DragEffect {
    Pressed {
        node_id: String,
    },
    DragStarted {
        node_id: String,
        position: Position,
    },
    Moved {
        node_id: String,
        position: Position,
    },
    /// The gesture never became a drag: open the scene.
    Clicked {
        node_id: String,
    },
    /// The drag ended with the scene at `position`.
    Committed {
        node_id: String,
        position: Position,
    },
    Aborted {
        node_id: String,
        restore: Option<Position>,
    },
    Noop {
        reason: DragNoopReason,
    },
}

impl DragEffect {
    /// The scene position this effect asks the host to write, if any.
    pub fn position_update(&self) -> Option<(&str, Position)> {
        match self {
            DragEffect::DragStarted { node_id, position }
            | DragEffect::Moved { node_id, position }
            | DragEffect::Committed { node_id, position } => Some((node_id, *position)),
            DragEffect::Aborted {
                node_id,
                restore: Some(position),
            } => Some((node_id, *position)),
            _ => None,
        }
    }

    /// Applies the position update (if any) through [`graph::move_node`].
    pub fn apply_to(&self, nodes: &[StoryNode]) -> Vec<StoryNode> {
        match self.position_update() {
            Some((node_id, position)) => graph::move_node(nodes, node_id, position.x, position.y),
            None => nodes.to_vec(),
        }
    }

    pub fn is_click(&self) -> bool {
        matches!(self, DragEffect::Clicked { .. })
    }
}

/// Click-versus-drag state machine for one pointer device.
#[derive(Clone, Debug, PartialEq)]
pub struct DragMachine {
    state: DragState,
    threshold: f64,
}

impl Default for DragMachine {
    fn default() -> Self {
        Self {
            state: DragState::Idle,
            threshold: DRAG_THRESHOLD_PX,
        }
    }
}

impl DragMachine {
    /// Construct a machine with an explicit drag threshold.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::InvalidInput`] for negative or non-finite thresholds.
    pub fn with_threshold(threshold: f64) -> StoryResult<Self> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(StoryError::InvalidInput(format!(
                "drag threshold must be a finite, non-negative number (got {threshold})"
            )));
        }
        Ok(Self {
            state: DragState::Idle,
            threshold,
        })
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Id of the scene currently captured, if any.
    pub fn active_node(&self) -> Option<&str> {
        match &self.state {
            DragState::Idle => None,
            DragState::Pressed { node_id, .. } | DragState::Dragging { node_id, .. } => {
                Some(node_id)
            }
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Feeds one pointer event through the machine.
    pub fn apply(&mut self, event: PointerEvent) -> DragEffect {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        let (next, effect) = match (state, event) {
            (
                DragState::Idle,
                PointerEvent::Down {
                    node_id,
                    node_position,
                    button,
                    at,
                },
            ) => {
                if button == PointerButton::Primary {
                    (
                        DragState::Pressed {
                            node_id: node_id.clone(),
                            press_point: at,
                            node_start: node_position,
                        },
                        DragEffect::Pressed { node_id },
                    )
                } else {
                    (
                        DragState::Idle,
                        DragEffect::Noop {
                            reason: DragNoopReason::NonPrimaryButton,
                        },
                    )
                }
            }
            (DragState::Idle, _) => (
                DragState::Idle,
                DragEffect::Noop {
                    reason: DragNoopReason::IdleWithoutPress,
                },
            ),
            (active, PointerEvent::Down { .. }) => (
                active,
                DragEffect::Noop {
                    reason: DragNoopReason::GestureAlreadyActive,
                },
            ),
            (
                DragState::Pressed {
                    node_id,
                    press_point,
                    node_start,
                },
                PointerEvent::Move { at },
            ) => {
                if self.exceeds_threshold(press_point, at) {
                    let position = follow(node_start, press_point, at);
                    (
                        DragState::Dragging {
                            node_id: node_id.clone(),
                            press_point,
                            node_start,
                            current: at,
                        },
                        DragEffect::DragStarted { node_id, position },
                    )
                } else {
                    (
                        DragState::Pressed {
                            node_id,
                            press_point,
                            node_start,
                        },
                        DragEffect::Noop {
                            reason: DragNoopReason::ThresholdNotReached,
                        },
                    )
                }
            }
            (
                DragState::Dragging {
                    node_id,
                    press_point,
                    node_start,
                    ..
                },
                PointerEvent::Move { at },
            ) => {
                let position = follow(node_start, press_point, at);
                (
                    DragState::Dragging {
                        node_id: node_id.clone(),
                        press_point,
                        node_start,
                        current: at,
                    },
                    DragEffect::Moved { node_id, position },
                )
            }
            (
                DragState::Pressed {
                    node_id,
                    press_point,
                    node_start,
                },
                PointerEvent::Up { at },
            ) => {
                // A release far from the press with no intervening move still counts as a drag.
                if self.exceeds_threshold(press_point, at) {
                    let position = follow(node_start, press_point, at);
                    (DragState::Idle, DragEffect::Committed { node_id, position })
                } else {
                    (DragState::Idle, DragEffect::Clicked { node_id })
                }
            }
            (
                DragState::Dragging {
                    node_id,
                    press_point,
                    node_start,
                    ..
                },
                PointerEvent::Up { at },
            ) => {
                let position = follow(node_start, press_point, at);
                (DragState::Idle, DragEffect::Committed { node_id, position })
            }
            (DragState::Pressed { node_id, .. }, PointerEvent::CaptureLost) => (
                DragState::Idle,
                DragEffect::Aborted {
                    node_id,
                    restore: None,
                },
            ),
            (
                DragState::Dragging {
                    node_id,
                    node_start,
                    ..
                },
                PointerEvent::CaptureLost,
            ) => (
                DragState::Idle,
                DragEffect::Aborted {
                    node_id,
                    restore: Some(node_start),
                },
            ),
        };

        self.state = next;
        effect
    }

    fn exceeds_threshold(&self, press: Position, current: Position) -> bool {
        let dx = current.x - press.x;
        let dy = current.y - press.y;
        dx * dx + dy * dy > self.threshold * self.threshold
    }
}

fn follow(node_start: Position, press: Position, pointer: Position) -> Position {
    node_start.offset(pointer.x - press.x, pointer.y - press.y)
}

/// Runs a whole pointer trace through a fresh machine and folds the resulting position updates
/// into `nodes`. Returns the final node list and every effect produced.
pub fn replay_trace(
    nodes: &[StoryNode],
    events: impl IntoIterator<Item = PointerEvent>,
) -> (Vec<StoryNode>, Vec<DragEffect>) {
    let mut machine = DragMachine::default();
    let mut current = nodes.to_vec();
    let mut effects = Vec::new();
    for event in events {
        let effect = machine.apply(event);
        current = effect.apply_to(&current);
        effects.push(effect);
    }
    (current, effects)
}
