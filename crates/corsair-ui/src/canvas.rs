//! The rendering seam.
//!
//! The runtime never draws pixels itself; widget `draw` callbacks receive a
//! [`Canvas`] and the backend decides what a filled rect means. [`DrawList`]
//! is the bundled implementation: it records commands for a renderer to
//! replay, and doubles as the test double for draw-order assertions.

use corsair_core::{Color, Rect};

/// Render collaborator handed to widget draw callbacks.
///
/// Coordinates are absolute (root-space); widgets add their own offset to
/// the parent origin before drawing.
pub trait Canvas {
    /// Fill an axis-aligned rectangle with a solid color.
    fn fill_rect(&mut self, rect: Rect, color: Color);
}

/// A recorded draw command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCmd {
    Rect { rect: Rect, color: Color },
}

/// Canvas implementation that records commands in draw order.
#[derive(Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Canvas for DrawList {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCmd::Rect { rect, color });
    }
}
