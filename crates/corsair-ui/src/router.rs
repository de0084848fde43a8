//! The root input router.
//!
//! Single entry point for primitive device events. Pointer and keyboard
//! primitives come in; semantic enter/exit/activate/cancel and focus
//! traffic comes out, aimed at exactly the right widget. The router owns
//! the hover and click trackers and enforces click capture: from primary
//! press to release, no widget but the click target can receive pointer
//! events.
//!
//! Hit-testing only ever considers the topmost modal layer; widgets under
//! a blotter are dead to the pointer. All coordinates entering the router
//! are root-space.

use corsair_core::Pos;

use crate::error::UiResult;
use crate::focus::FocusRing;
use crate::root::active_layer;
use crate::tree::{WidgetId, WidgetTree};
use crate::widget::WidgetFlags;

/// Primary pointer button id.
pub const PRIMARY_BUTTON: u8 = 1;

const KEYCODE_LSHIFT: u32 = 0x0007_00e1;
const CODEPOINT_TAB: u32 = 0x09;
const CODEPOINT_LF: u32 = 0x0a;
const CODEPOINT_CR: u32 = 0x0d;
const CODEPOINT_ESC: u32 = 0x1b;

/// Pointer/keyboard state machine over one widget tree.
#[derive(Debug, Default)]
pub struct InputRouter {
    hover: Option<WidgetId>,
    click: Option<WidgetId>,
    mouse: Pos,
    /// Pointer position in the click target's local space at press time,
    /// used to keep a dragged widget glued under the cursor.
    grip: Pos,
    shift: bool,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current hover target, if any.
    pub fn hover(&self) -> Option<WidgetId> {
        self.hover
    }

    /// Current click-capture target, if any.
    pub fn click_target(&self) -> Option<WidgetId> {
        self.click
    }

    /// Last seen pointer position, root-space.
    pub fn pointer(&self) -> Pos {
        self.mouse
    }

    /// Pointer motion. While a click is tracked only the click target may
    /// hold hover; otherwise the widget under the pointer does.
    pub fn mouse_move(&mut self, tree: &mut WidgetTree, root: WidgetId, x: i32, y: i32) -> UiResult<()> {
        self.mouse = Pos::new(x, y);
        self.shed_stale(tree);

        if let Some(click) = self.click {
            if tree.flags(click).contains(WidgetFlags::DRAGGABLE) {
                return self.drag(tree, click);
            }
            if tree.contains_root_point(click, self.mouse) {
                if self.hover != Some(click) {
                    self.hover = Some(click);
                    tree.mouse_enter(click)?;
                }
            } else if let Some(hover) = self.hover.take() {
                tree.mouse_exit(hover)?;
            }
            return Ok(());
        }

        let next = self.widget_under_pointer(tree, root);

        if let Some(hover) = next {
            if self.hover == Some(hover) {
                let local = tree.from_root(hover, self.mouse)?;
                return tree.mouse_move(hover, local.x, local.y);
            }
        }

        if let Some(old) = self.hover.take() {
            tree.mouse_exit(old)?;
        }
        if let Some(new) = next {
            self.hover = Some(new);
            tree.mouse_enter(new)?;
        }
        Ok(())
    }

    /// Pointer button. The primary button drives click capture; any other
    /// button forwards straight to the current hover.
    pub fn mouse_button(
        &mut self,
        tree: &mut WidgetTree,
        root: WidgetId,
        button: u8,
        pressed: bool,
    ) -> UiResult<()> {
        self.shed_stale(tree);
        // Re-derive hover at the stored position if we lost it; a layer
        // may have appeared or vanished since the last motion event.
        if self.hover.is_none() && self.click.is_none() {
            self.mouse_move(tree, root, self.mouse.x, self.mouse.y)?;
        }

        if button != PRIMARY_BUTTON {
            if let Some(hover) = self.hover {
                tree.mouse_button(hover, button, pressed)?;
            }
            return Ok(());
        }

        if pressed {
            if let Some(hover) = self.hover {
                tree.mouse_button(hover, button, true)?;
                if tree.contains(hover) {
                    self.click = Some(hover);
                    self.grip = tree.from_root(hover, self.mouse)?;
                }
            }
            return Ok(());
        }

        // Release always ends capture, whether or not it activates.
        let Some(click) = self.click.take() else {
            return Ok(());
        };
        if !tree.is_rooted(click) {
            return Ok(());
        }
        tree.mouse_button(click, button, false)?;
        if self.hover == Some(click) && tree.contains(click) {
            tree.activate(click)?;
        }
        Ok(())
    }

    /// Wheel goes to the widget under the pointer, then a synthetic
    /// motion event re-derives hover in case content scrolled beneath
    /// the cursor.
    pub fn mouse_wheel(
        &mut self,
        tree: &mut WidgetTree,
        root: WidgetId,
        dx: i32,
        dy: i32,
    ) -> UiResult<()> {
        if let Some(target) = self.widget_under_pointer(tree, root) {
            tree.mouse_wheel(target, dx, dy)?;
            self.mouse_move(tree, root, self.mouse.x, self.mouse.y)?;
        }
        Ok(())
    }

    /// Raw keyboard. Tab cycles the focus ring, Enter activates and
    /// Escape cancels the active layer; anything else goes exclusively to
    /// the current keyboard focus, or is dropped.
    pub fn key(
        &mut self,
        tree: &mut WidgetTree,
        root: WidgetId,
        ring: &mut FocusRing,
        keycode: u32,
        codepoint: u32,
        pressed: bool,
    ) -> UiResult<()> {
        // Track shift without consuming the event.
        if keycode == KEYCODE_LSHIFT {
            self.shift = pressed;
        }

        match codepoint {
            CODEPOINT_TAB => {
                if pressed {
                    if self.shift {
                        ring.retreat(tree)?;
                    } else {
                        ring.advance(tree)?;
                    }
                }
                Ok(())
            }
            CODEPOINT_LF | CODEPOINT_CR => {
                if pressed {
                    if let Some(layer) = active_layer(tree, root) {
                        tree.activate(layer)?;
                    }
                }
                Ok(())
            }
            CODEPOINT_ESC => {
                if pressed {
                    if let Some(layer) = active_layer(tree, root) {
                        tree.cancel(layer)?;
                    }
                }
                Ok(())
            }
            _ => {
                if let Some(focus) = ring.focus(tree) {
                    tree.key(focus, keycode, codepoint, pressed)?;
                }
                Ok(())
            }
        }
    }

    /// Abstracted per-player button input, routed to the root widget
    /// (which forwards to the active layer).
    pub fn player_button(
        &mut self,
        tree: &mut WidgetTree,
        root: WidgetId,
        player: u8,
        button: u16,
        value: i32,
    ) -> UiResult<()> {
        tree.player_button(root, player, button, value)
    }

    /// Forget all tracked widgets without callbacks.
    pub fn reset(&mut self) {
        self.hover = None;
        self.click = None;
    }

    /// Drop trackers whose widget has died or left the rooted tree.
    fn shed_stale(&mut self, tree: &WidgetTree) {
        if self.hover.is_some_and(|w| !tree.is_rooted(w)) {
            tracing::trace!("dropping stale hover target");
            self.hover = None;
        }
        if self.click.is_some_and(|w| !tree.is_rooted(w)) {
            tracing::trace!("dropping stale click target");
            self.click = None;
        }
    }

    /// Depth-first, last-child-first hit test over the active layer only.
    fn widget_under_pointer(&self, tree: &WidgetTree, root: WidgetId) -> Option<WidgetId> {
        let layer = active_layer(tree, root)?;
        let local = tree.from_root(root, self.mouse).ok()?;
        Self::hit_test(tree, layer, local)
    }

    /// `p` is in `id`'s parent space. Returns the deepest mouse-accepting
    /// widget whose bounds contain the point, preferring later siblings.
    fn hit_test(tree: &WidgetTree, id: WidgetId, p: Pos) -> Option<WidgetId> {
        let rect = tree.rect(id).ok()?;
        let p = p.offset(-rect.x, -rect.y);
        if p.x < 0 || p.y < 0 || p.x >= rect.w || p.y >= rect.h {
            return None;
        }
        for &child in tree.children(id).iter().rev() {
            if let Some(found) = Self::hit_test(tree, child, p) {
                return Some(found);
            }
        }
        if tree.flags(id).contains(WidgetFlags::ACCEPTS_MOUSE) {
            Some(id)
        } else {
            None
        }
    }

    /// Move a draggable click target so the grip point stays under the
    /// pointer. Coordinates resolve in the target's parent space.
    fn drag(&self, tree: &mut WidgetTree, target: WidgetId) -> UiResult<()> {
        let rel = match tree.parent(target) {
            Some(parent) => tree.from_root(parent, self.mouse)?,
            None => self.mouse,
        };
        let mut rect = tree.rect(target)?;
        rect.x = rel.x - self.grip.x;
        rect.y = rel.y - self.grip.y;
        tree.set_rect(target, rect)
    }
}
