//! The toolkit context.
//!
//! [`Gui`] owns one widget tree rooted at a modal-stack [`Root`] widget,
//! one input router, one focus ring, and one transition scheduler, and
//! wires them together. The embedding application constructs one of these
//! at startup and threads it through its frame loop: push raw input in,
//! call [`Gui::update`] once per frame, then [`Gui::draw`].

use corsair_core::{Pos, Rect, Size};

use crate::canvas::Canvas;
use crate::error::UiResult;
use crate::focus::FocusRing;
use crate::root::{Root, active_layer};
use crate::router::InputRouter;
use crate::transition::{TransitionMode, TransitionScheduler};
use crate::tree::{WidgetId, WidgetTree};
use crate::widget::{Behavior, PropKey};

pub struct Gui {
    tree: WidgetTree,
    root: WidgetId,
    router: InputRouter,
    ring: FocusRing,
    scheduler: TransitionScheduler,
}

impl Gui {
    /// Build a context with an empty modal stack covering `screen`.
    pub fn new(screen: Size) -> UiResult<Self> {
        let mut tree = WidgetTree::new();
        let root = tree.spawn(None, Root::boxed())?;
        tree.set_root(root)?;
        tree.set_rect(root, Rect::from_size(screen))?;
        tracing::debug!(w = screen.w, h = screen.h, "gui context created");
        Ok(Self {
            tree,
            root,
            router: InputRouter::new(),
            ring: FocusRing::new(),
            scheduler: TransitionScheduler::new(),
        })
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    pub fn root(&self) -> WidgetId {
        self.root
    }

    /// Topmost layer of the modal stack.
    pub fn active_layer(&self) -> Option<WidgetId> {
        active_layer(&self.tree, self.root)
    }

    /// Current keyboard focus, if any.
    pub fn focus(&mut self) -> Option<WidgetId> {
        self.ring.focus(&self.tree)
    }

    /// Hand keyboard focus to a specific candidate widget.
    pub fn set_focus(&mut self, id: WidgetId) -> UiResult<()> {
        self.ring.set_focus(&mut self.tree, id)
    }

    // ------------------------------------------------------------------
    // Modal stack

    /// Push a new modal layer and lay it out.
    pub fn push_layer(&mut self, behavior: Box<dyn Behavior>) -> UiResult<WidgetId> {
        let layer = self.tree.spawn(Some(self.root), behavior)?;
        self.repack()?;
        Ok(layer)
    }

    /// Remove the topmost modal layer, if any. Focus falls back to the
    /// layer beneath.
    pub fn pop_layer(&mut self) -> UiResult<()> {
        if let Some(layer) = self.active_layer() {
            self.tree.remove_child(self.root, layer)?;
            self.repack()?;
        }
        Ok(())
    }

    /// Re-run layout from the root and re-derive keyboard focus for the
    /// active layer. Called on every stack change; harmless to call
    /// redundantly.
    pub fn repack(&mut self) -> UiResult<()> {
        self.tree.pack(self.root)?;
        let active = self.active_layer();
        self.ring.refresh(&mut self.tree, active)
    }

    /// Resize the whole UI.
    pub fn set_screen(&mut self, screen: Size) -> UiResult<()> {
        self.tree.set_rect(self.root, Rect::from_size(screen))?;
        self.repack()
    }

    // ------------------------------------------------------------------
    // Frame loop

    /// One frame step: widget update pass, then the transition tick.
    pub fn update(&mut self) -> UiResult<()> {
        self.tree.update(self.root)?;
        self.scheduler.tick(&mut self.tree)
    }

    pub fn draw(&mut self, canvas: &mut dyn Canvas) -> UiResult<()> {
        self.tree.draw(self.root, Pos::ZERO, canvas)
    }

    // ------------------------------------------------------------------
    // Input entry points

    pub fn mouse_move(&mut self, x: i32, y: i32) -> UiResult<()> {
        self.router.mouse_move(&mut self.tree, self.root, x, y)
    }

    pub fn mouse_button(&mut self, button: u8, pressed: bool) -> UiResult<()> {
        self.router
            .mouse_button(&mut self.tree, self.root, button, pressed)
    }

    pub fn mouse_wheel(&mut self, dx: i32, dy: i32) -> UiResult<()> {
        self.router.mouse_wheel(&mut self.tree, self.root, dx, dy)
    }

    pub fn key(&mut self, keycode: u32, codepoint: u32, pressed: bool) -> UiResult<()> {
        self.router.key(
            &mut self.tree,
            self.root,
            &mut self.ring,
            keycode,
            codepoint,
            pressed,
        )
    }

    pub fn player_button(&mut self, player: u8, button: u16, value: i32) -> UiResult<()> {
        self.router
            .player_button(&mut self.tree, self.root, player, button, value)
    }

    // ------------------------------------------------------------------
    // Transitions

    /// Animate `key` on `id` toward `end` over `duration` ticks.
    pub fn transition_property(
        &mut self,
        id: WidgetId,
        key: PropKey,
        end: i32,
        duration: i32,
        mode: TransitionMode,
    ) -> UiResult<()> {
        self.scheduler
            .begin(&self.tree, id, key, end, duration, mode)
    }

    /// Snap all in-flight transitions to their end values.
    pub fn finish_transitions(&mut self) -> UiResult<()> {
        self.scheduler.finish_all(&mut self.tree)
    }
}
