//! Input model: tools, modifier keys, mouse buttons, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `InteractionState` is the gesture in progress, carrying everything
//! needed to preview it, finish it on release, or undo it exactly on
//! `Escape`.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::doc::{Entity, EntityId, MeasurementType, ShapeKind, Snapshot};
use crate::geometry::Point;
use crate::hit::Handle;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Select,
    /// Drag to pan the view.
    Pan,
    /// Two clicks to measure a known distance for calibration.
    Calibrate,
    /// Two clicks to measure a straight distance.
    Length,
    /// Click vertices of a closed polygon.
    Area,
    /// Click vertices of an open polyline.
    Perimeter,
    /// Click to drop a counted marker.
    Count,
    /// Click a tip, then place a text box.
    Comment,
    Rectangle,
    Circle,
    Line,
    Arrow,
}

impl Tool {
    /// The shape a drag with this tool creates.
    #[must_use]
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            Self::Rectangle => Some(ShapeKind::Rectangle),
            Self::Circle => Some(ShapeKind::Circle),
            Self::Line => Some(ShapeKind::Line),
            Self::Arrow => Some(ShapeKind::Arrow),
            _ => None,
        }
    }

    /// The measurement this tool creates.
    #[must_use]
    pub fn measurement_type(self) -> Option<MeasurementType> {
        match self {
            Self::Length => Some(MeasurementType::Length),
            Self::Area => Some(MeasurementType::Area),
            Self::Perimeter => Some(MeasurementType::Perimeter),
            Self::Count => Some(MeasurementType::Count),
            Self::Comment => Some(MeasurementType::Comment),
            _ => None,
        }
    }

    /// Whether this tool captures a fixed pair of clicks.
    #[must_use]
    pub fn is_two_click(self) -> bool {
        matches!(self, Self::Length | Self::Calibrate)
    }

    /// Whether this tool captures an open-ended run of clicks.
    #[must_use]
    pub fn is_multi_click(self) -> bool {
        matches!(self, Self::Area | Self::Perimeter)
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Shift, Ctrl or Cmd: toggles selection membership instead of replacing.
    #[must_use]
    pub fn additive(self) -> bool {
        self.shift || self.ctrl || self.meta
    }

    /// Ctrl on most platforms, Cmd on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the host (e.g. `"Delete"`, `"Escape"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    /// Case-insensitive match for single-letter shortcuts.
    #[must_use]
    pub fn is_letter(&self, letter: char) -> bool {
        let mut chars = self.0.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c.eq_ignore_ascii_case(&letter))
    }
}

/// Persistent UI state visible to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// The comment whose text is being edited, if any.
    pub editing: Option<EntityId>,
}

/// Cursor the host should show for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    Crosshair,
    /// Hovering an entity body that can be dragged.
    Move,
    Grab,
    Grabbing,
    /// Hovering or dragging a resize or vertex handle.
    Resize(Handle),
    Rotate,
    Text,
}

/// The gesture in progress.
///
/// Drag states hold the document as it was at pointer-down so that a
/// cancelled gesture can put it back exactly.
#[derive(Debug, Clone, Default)]
pub enum InteractionState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Dragging out a new shape from an anchor.
    Drawing {
        tool: Tool,
        /// Page-space pointer-down position.
        anchor: Point,
        /// Latest pointer position, for the preview.
        current: Point,
    },
    /// Collecting clicked vertices for length, calibrate, area or perimeter.
    Capturing {
        tool: Tool,
        /// Vertices clicked so far, in order.
        points: Vec<Point>,
        /// Latest pointer position, for the rubber-band preview.
        hover: Option<Point>,
    },
    /// A comment tip has been placed; waiting for the box position.
    PlacingComment {
        tip: Point,
        /// Latest pointer position, for the leader preview.
        hover: Option<Point>,
        /// The confirming press is down; the box is created on its release.
        confirming: bool,
    },
    /// Dragging a marquee over empty space.
    SelectionDragging {
        anchor: Point,
        current: Point,
        /// Marquee hits toggle against this selection instead of replacing it.
        additive: bool,
        /// The selection when the marquee started.
        base_selection: Vec<EntityId>,
    },
    /// Moving every selected entity.
    DraggingItems {
        /// Page-space pointer-down position; deltas are measured from here.
        origin: Point,
        /// Document at pointer-down.
        base: Snapshot,
    },
    /// Dragging a resize, endpoint or vertex handle.
    Resizing {
        id: EntityId,
        handle: Handle,
        origin: Point,
        /// The entity as it was at pointer-down.
        original: Entity,
    },
    /// Dragging the rotate handle.
    Rotating {
        id: EntityId,
        /// Rotation pivot.
        center: Point,
        /// The entity as it was at pointer-down.
        original: Entity,
    },
    /// Panning the view; deltas are reported to the host.
    Panning {
        /// Page point grabbed at pointer-down. The host's pan keeps it under
        /// the pointer, so every delta is measured from here.
        anchor: Point,
        /// Click capture suspended by a middle-button pan, resumed on release.
        resume: Option<Box<InteractionState>>,
    },
}

impl InteractionState {
    /// Whether this is a press-drag-release gesture (as opposed to a click
    /// capture, which legitimately spans several presses).
    #[must_use]
    pub fn is_drag(&self) -> bool {
        matches!(
            self,
            Self::Drawing { .. }
                | Self::SelectionDragging { .. }
                | Self::DraggingItems { .. }
                | Self::Resizing { .. }
                | Self::Rotating { .. }
                | Self::Panning { .. }
        )
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
