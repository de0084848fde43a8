//! Core utilities shared by the Corsair GUI runtime.

pub mod color;
pub mod geometry;
pub mod logging;

pub use color::Color;
pub use geometry::{Pos, Rect, Size};
