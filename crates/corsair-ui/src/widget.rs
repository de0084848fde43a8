//! Widget behavior descriptors.
//!
//! Every widget in the tree carries a [`Behavior`]: the pluggable capability
//! set that gives the node its type. All callbacks are optional: an
//! unimplemented method falls back to a tree-supplied default (draw paints
//! the background then the children; pack fits every child to the widget's
//! full bounds; measure accepts the offered budget).
//!
//! Behaviors are stateful: the box owns whatever per-widget data the type
//! needs, so a concrete widget is just a `Behavior` implementation plus
//! the node geometry the tree already carries.

use std::any::Any;

use bitflags::bitflags;
use corsair_core::Pos;
use corsair_core::Size;

use crate::canvas::Canvas;
use crate::error::UiResult;
use crate::tree::{WidgetId, WidgetTree};

bitflags! {
    /// Capability flags controlling event eligibility.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WidgetFlags: u8 {
        /// Hit-testable: may become the hover or click target.
        const ACCEPTS_MOUSE = 1 << 0;
        /// May join the keyboard focus ring.
        const ACCEPTS_KEYBOARD = 1 << 1;
        /// While click-tracked, follows the pointer instead of
        /// receiving hover promotion.
        const DRAGGABLE = 1 << 2;
    }
}

/// Key addressing one integer-valued widget property.
///
/// The first six are built into every widget; `Custom` keys are resolved by
/// the widget's behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropKey {
    X,
    Y,
    W,
    H,
    Bg,
    Fg,
    Custom(u16),
}

/// Category of a property, used by the transition scheduler to pick an
/// interpolation strategy and to decide whether a write dirties layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropKind {
    /// Not a property of this widget.
    Undefined,
    /// Plain integer.
    Integer,
    /// Integer that feeds layout; writes force a repack.
    HotInteger,
    /// Packed color, interpolated per channel.
    Rgba,
    /// Discrete selector; interpolated like an integer.
    Enum,
}

/// Result of a property write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// Value already matched; nothing happened.
    Unchanged,
    /// Value stored.
    Changed,
    /// Value stored and the widget's layout is now stale.
    ChangedNeedsRepack,
}

/// The behavior descriptor: a widget type's optional-callback set.
///
/// Event and layout callbacks receive the owning tree mutably; during the
/// call the behavior box is temporarily detached from its node, so a
/// callback may freely mutate the tree (including removing its own widget).
#[allow(unused_variables)]
pub trait Behavior: Any {
    /// Widget type name, for logs and errors.
    fn name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Capability flags copied onto the node at spawn time.
    fn flags(&self) -> WidgetFlags {
        WidgetFlags::empty()
    }

    /// Type-specific construction, run by the factory after the node
    /// exists. Failure unwinds the spawn completely.
    fn init(&mut self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
        Ok(())
    }

    /// Type-specific cleanup. Runs strictly after all children have been
    /// destroyed; never observes live descendants.
    fn destroy(&mut self, id: WidgetId) {}

    /// Draw this widget given the parent's absolute origin.
    fn draw(
        &mut self,
        tree: &mut WidgetTree,
        id: WidgetId,
        origin: Pos,
        canvas: &mut dyn Canvas,
    ) -> UiResult<()> {
        tree.draw_background(id, origin, canvas)?;
        tree.draw_children(id, origin, canvas)
    }

    /// Preferred size under the given budget. Must not mutate geometry;
    /// the tree clamps the result into `[0, max]`.
    fn measure(&mut self, tree: &mut WidgetTree, id: WidgetId, max: Size) -> UiResult<Size> {
        Ok(max)
    }

    /// Assign children's bounds from this widget's own (already set)
    /// bounds, then recurse.
    fn pack(&mut self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
        tree.pack_fill_children(id)
    }

    /// Per-frame update hook.
    fn update(&mut self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
        tree.update_children(id)
    }

    // Primitive input, forwarded by the router. Coordinates are local.

    fn mouse_move(&mut self, tree: &mut WidgetTree, id: WidgetId, x: i32, y: i32) -> UiResult<()> {
        Ok(())
    }

    fn mouse_button(
        &mut self,
        tree: &mut WidgetTree,
        id: WidgetId,
        button: u8,
        pressed: bool,
    ) -> UiResult<()> {
        Ok(())
    }

    fn mouse_wheel(&mut self, tree: &mut WidgetTree, id: WidgetId, dx: i32, dy: i32) -> UiResult<()> {
        Ok(())
    }

    fn key(
        &mut self,
        tree: &mut WidgetTree,
        id: WidgetId,
        keycode: u32,
        codepoint: u32,
        pressed: bool,
    ) -> UiResult<()> {
        Ok(())
    }

    /// Abstracted per-player button input.
    fn player_button(
        &mut self,
        tree: &mut WidgetTree,
        id: WidgetId,
        player: u8,
        button: u16,
        value: i32,
    ) -> UiResult<()> {
        Ok(())
    }

    // Digested events, produced by the router and focus ring.

    fn mouse_enter(&mut self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
        Ok(())
    }

    fn mouse_exit(&mut self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
        Ok(())
    }

    fn activate(&mut self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
        Ok(())
    }

    fn cancel(&mut self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
        Ok(())
    }

    /// Relative adjustment, e.g. a slider nudged by a gamepad.
    fn adjust(&mut self, tree: &mut WidgetTree, id: WidgetId, d: i32) -> UiResult<()> {
        Ok(())
    }

    fn focus(&mut self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
        Ok(())
    }

    fn unfocus(&mut self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
        Ok(())
    }

    // Generic property hooks for type-specific keys. Built-in keys never
    // reach these.

    fn prop(&self, key: PropKey) -> Option<i32> {
        None
    }

    fn set_prop(&mut self, key: PropKey, v: i32) -> Option<SetOutcome> {
        None
    }

    fn prop_kind(&self, key: PropKey) -> PropKind {
        PropKind::Undefined
    }
}

/// The no-op behavior: default callbacks only. Useful as a plain container
/// or a spacer.
#[derive(Debug, Default)]
pub struct Skeleton;

impl Behavior for Skeleton {
    fn name(&self) -> &'static str {
        "skeleton"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
