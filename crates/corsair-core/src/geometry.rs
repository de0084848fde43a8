//! Integer screen-space geometry.
//!
//! All GUI coordinates are whole pixels. Widget bounds are stored relative
//! to the parent widget; conversion to root space walks parent links.

/// A position in screen units.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// A size in screen units. Negative extents are never meaningful; callers
/// clamp at the boundaries where they can arise.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub w: i32,
    pub h: i32,
}

impl Size {
    pub const ZERO: Self = Self { w: 0, h: 0 };

    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    /// Clamp both extents into `[0, max]`.
    pub fn clamp_to(self, max: Size) -> Self {
        Self {
            w: self.w.clamp(0, max.w.max(0)),
            h: self.h.clamp(0, max.h.max(0)),
        }
    }
}

/// A rectangle, position plus size.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.w, size.h)
    }

    pub const fn pos(&self) -> Pos {
        Pos::new(self.x, self.y)
    }

    pub const fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Point containment in the rect's own coordinate space.
    /// The right and bottom edges are exclusive.
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.w && y < self.y + self.h
    }
}
