//! Pointer and wheel events, normalised for the viewport controller.
//!
//! Coordinates are screen pixels relative to the canvas element.

/// Mouse button that started a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    Other(i16),
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` value.
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Button pressed.
    PointerDown {
        x: f64,
        y: f64,
        button: PointerButton,
    },

    PointerMove { x: f64, y: f64 },

    /// Button released.
    PointerUp { x: f64, y: f64 },

    /// Pointer left the canvas; ends any gesture.
    PointerLeave,

    /// Wheel scroll; positive `delta_y` scrolls down (zooms out).
    Wheel { delta_y: f64 },
}

impl InputEvent {
    pub fn from_pointer_down(x: f64, y: f64, button: i16) -> Self {
        Self::PointerDown {
            x,
            y,
            button: PointerButton::from_dom(button),
        }
    }

    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<(f64, f64)> {
        match self {
            Self::PointerDown { x, y, .. } | Self::PointerMove { x, y } | Self::PointerUp { x, y } => {
                Some((*x, *y))
            }
            _ => None,
        }
    }
}
