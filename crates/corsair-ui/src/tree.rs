//! The widget tree.
//!
//! Widgets live in a generational arena; [`WidgetId`] is an index +
//! generation key, so any subsystem may keep a handle across frames and a
//! plain liveness check replaces ancestry bookkeeping. The ownership graph
//! is a strict tree: every node has at most one parent and an ordered child
//! list, and insertion that would create a cycle is rejected.
//!
//! Layout is two passes with distinct contracts: `measure` is a pure
//! query of preferred size under a budget, `pack` assigns children's
//! bounds from the widget's own already-assigned bounds and recurses.
//!
//! Behavior callbacks are dispatched by temporarily detaching the behavior
//! box from its node, so a callback holds `&mut WidgetTree` and may mutate
//! anything, including removing its own widget. In that case the box is
//! simply dropped instead of reattached.

use corsair_core::{Color, Pos, Rect, Size};
use slotmap::{SlotMap, new_key_type};

use crate::canvas::Canvas;
use crate::error::{UiError, UiResult};
use crate::widget::{Behavior, PropKey, PropKind, SetOutcome, WidgetFlags};

new_key_type! {
    /// Stable widget handle: arena index plus generation.
    pub struct WidgetId;
}

struct WidgetNode {
    rect: Rect,
    bg: Color,
    fg: Color,
    flags: WidgetFlags,
    parent: Option<WidgetId>,
    children: Vec<WidgetId>,
    /// `None` only while a callback on this widget is in flight.
    behavior: Option<Box<dyn Behavior>>,
}

/// Arena of widgets plus the designated root.
#[derive(Default)]
pub struct WidgetTree {
    nodes: SlotMap<WidgetId, WidgetNode>,
    root: Option<WidgetId>,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live widgets.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Generation-checked liveness test.
    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    // ------------------------------------------------------------------
    // Lifecycle

    /// Create a widget and run its type-specific init. With a parent the
    /// widget is attached first, so init may already spawn children of its
    /// own. Init failure unwinds fully: the widget (and anything it
    /// spawned) is destroyed and the error propagates.
    pub fn spawn(
        &mut self,
        parent: Option<WidgetId>,
        behavior: Box<dyn Behavior>,
    ) -> UiResult<WidgetId> {
        if let Some(p) = parent {
            if !self.contains(p) {
                return Err(UiError::DeadWidget);
            }
        }
        let flags = behavior.flags();
        let id = self.nodes.insert(WidgetNode {
            rect: Rect::default(),
            bg: Color::TRANSPARENT,
            fg: Color::TRANSPARENT,
            flags,
            parent,
            children: Vec::new(),
            behavior: Some(behavior),
        });
        if let Some(p) = parent {
            self.nodes[p].children.push(id);
        }
        match self.dispatch(id, |b, tree| b.init(tree, id)) {
            Ok(()) => Ok(id),
            Err(e) => {
                self.detach(id);
                self.destroy_subtree(id);
                Err(e)
            }
        }
    }

    /// Designate the tree's root. The widget must be alive and parentless.
    pub fn set_root(&mut self, id: WidgetId) -> UiResult<()> {
        let node = self.node(id)?;
        if node.parent.is_some() {
            return Err(UiError::AlreadyParented);
        }
        self.root = Some(id);
        Ok(())
    }

    pub fn root(&self) -> Option<WidgetId> {
        self.root
    }

    /// Attach an existing parentless widget as the last child of `parent`.
    /// Rejected if the child already has a parent, or if `parent` is a
    /// descendant of `child` (which would close a cycle); on rejection
    /// neither subtree changes.
    pub fn add_child(&mut self, parent: WidgetId, child: WidgetId) -> UiResult<()> {
        let at = self.node(parent)?.children.len();
        self.insert_child(parent, at, child)
    }

    /// As [`add_child`](Self::add_child) at a specific position.
    pub fn insert_child(&mut self, parent: WidgetId, at: usize, child: WidgetId) -> UiResult<()> {
        if !self.contains(parent) || !self.contains(child) {
            return Err(UiError::DeadWidget);
        }
        if self.nodes[child].parent.is_some() {
            return Err(UiError::AlreadyParented);
        }
        if self.is_ancestor(child, parent) {
            return Err(UiError::CycleRejected);
        }
        let at = at.min(self.nodes[parent].children.len());
        self.nodes[parent].children.insert(at, child);
        self.nodes[child].parent = Some(parent);
        Ok(())
    }

    /// Detach `child` from `parent` and destroy its whole subtree,
    /// children first.
    pub fn remove_child(&mut self, parent: WidgetId, child: WidgetId) -> UiResult<()> {
        if !self.contains(parent) || !self.contains(child) {
            return Err(UiError::DeadWidget);
        }
        if self.nodes[child].parent != Some(parent) {
            return Err(UiError::DeadWidget);
        }
        self.detach(child);
        self.destroy_subtree(child);
        Ok(())
    }

    /// Destroy every child of `id`, in reverse order.
    pub fn remove_all_children(&mut self, id: WidgetId) -> UiResult<()> {
        let mut children = std::mem::take(&mut self.node_mut(id)?.children);
        while let Some(child) = children.pop() {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = None;
            }
            self.destroy_subtree(child);
        }
        Ok(())
    }

    /// Destroy a widget and its subtree, detaching from any parent first.
    pub fn remove(&mut self, id: WidgetId) -> UiResult<()> {
        if !self.contains(id) {
            return Err(UiError::DeadWidget);
        }
        self.detach(id);
        self.destroy_subtree(id);
        Ok(())
    }

    fn detach(&mut self, id: WidgetId) {
        let Some(parent) = self.nodes.get_mut(id).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(pnode) = self.nodes.get_mut(parent) {
            pnode.children.retain(|&c| c != id);
        }
    }

    /// Bottom-up destruction: all descendants go first (deepest first), so
    /// a behavior's `destroy` never observes live children.
    fn destroy_subtree(&mut self, id: WidgetId) {
        let children = self.children_snapshot(id);
        for child in children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = None;
            }
            self.destroy_subtree(child);
        }
        if self.root == Some(id) {
            self.root = None;
        }
        if let Some(mut node) = self.nodes.remove(id) {
            if let Some(mut behavior) = node.behavior.take() {
                tracing::trace!(widget = behavior.name(), "destroying widget");
                behavior.destroy(id);
            }
        }
    }

    // ------------------------------------------------------------------
    // Topology queries

    /// True if `ancestor` is `descendant` or appears on its parent chain.
    pub fn is_ancestor(&self, ancestor: WidgetId, descendant: WidgetId) -> bool {
        if !self.contains(ancestor) {
            return false;
        }
        let mut cursor = Some(descendant);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// True if the widget is alive and its parent chain ends at the root.
    pub fn is_rooted(&self, id: WidgetId) -> bool {
        match self.root {
            Some(root) => self.contains(id) && self.is_ancestor(root, id),
            None => false,
        }
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Ordered child list; empty for a dead handle.
    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Owned copy of the child list, for iteration across callbacks that
    /// may mutate the tree.
    pub fn children_snapshot(&self, id: WidgetId) -> Vec<WidgetId> {
        self.children(id).to_vec()
    }

    // ------------------------------------------------------------------
    // Geometry and style

    pub fn rect(&self, id: WidgetId) -> UiResult<Rect> {
        Ok(self.node(id)?.rect)
    }

    pub fn set_rect(&mut self, id: WidgetId, rect: Rect) -> UiResult<()> {
        self.node_mut(id)?.rect = rect;
        Ok(())
    }

    pub fn bg(&self, id: WidgetId) -> UiResult<Color> {
        Ok(self.node(id)?.bg)
    }

    pub fn set_bg(&mut self, id: WidgetId, color: Color) -> UiResult<()> {
        self.node_mut(id)?.bg = color;
        Ok(())
    }

    pub fn fg(&self, id: WidgetId) -> UiResult<Color> {
        Ok(self.node(id)?.fg)
    }

    pub fn set_fg(&mut self, id: WidgetId, color: Color) -> UiResult<()> {
        self.node_mut(id)?.fg = color;
        Ok(())
    }

    pub fn flags(&self, id: WidgetId) -> WidgetFlags {
        self.nodes.get(id).map(|n| n.flags).unwrap_or_default()
    }

    pub fn set_flags(&mut self, id: WidgetId, flags: WidgetFlags) -> UiResult<()> {
        self.node_mut(id)?.flags = flags;
        Ok(())
    }

    /// Convert a point in `id`'s local space to root space.
    pub fn to_root(&self, id: WidgetId, p: Pos) -> UiResult<Pos> {
        if !self.contains(id) {
            return Err(UiError::DeadWidget);
        }
        let mut p = p;
        let mut cursor = Some(id);
        while let Some(w) = cursor {
            let node = &self.nodes[w];
            p = p.offset(node.rect.x, node.rect.y);
            cursor = node.parent;
        }
        Ok(p)
    }

    /// Convert a point in root space to `id`'s local space.
    pub fn from_root(&self, id: WidgetId, p: Pos) -> UiResult<Pos> {
        if !self.contains(id) {
            return Err(UiError::DeadWidget);
        }
        let mut p = p;
        let mut cursor = Some(id);
        while let Some(w) = cursor {
            let node = &self.nodes[w];
            p = p.offset(-node.rect.x, -node.rect.y);
            cursor = node.parent;
        }
        Ok(p)
    }

    /// Does a root-space point fall inside the widget's bounds?
    pub fn contains_root_point(&self, id: WidgetId, p: Pos) -> bool {
        let Ok(local) = self.from_root(id, p) else {
            return false;
        };
        let Ok(rect) = self.rect(id) else {
            return false;
        };
        local.x >= 0 && local.y >= 0 && local.x < rect.w && local.y < rect.h
    }

    // ------------------------------------------------------------------
    // Generic properties

    /// Read one property. Built-in keys resolve here; anything else goes
    /// to the behavior, and an unsupported key is an explicit error.
    pub fn prop(&self, id: WidgetId, key: PropKey) -> UiResult<i32> {
        let node = self.node(id)?;
        match key {
            PropKey::X => Ok(node.rect.x),
            PropKey::Y => Ok(node.rect.y),
            PropKey::W => Ok(node.rect.w),
            PropKey::H => Ok(node.rect.h),
            PropKey::Bg => Ok(node.bg.packed() as i32),
            PropKey::Fg => Ok(node.fg.packed() as i32),
            PropKey::Custom(_) => node
                .behavior
                .as_ref()
                .and_then(|b| b.prop(key))
                .ok_or(UiError::UnknownProperty { key }),
        }
    }

    /// Write one property, reporting whether anything changed and whether
    /// the change dirties layout.
    pub fn set_prop(&mut self, id: WidgetId, key: PropKey, v: i32) -> UiResult<SetOutcome> {
        let node = self.node_mut(id)?;
        let outcome = match key {
            PropKey::X => Self::store(&mut node.rect.x, v),
            PropKey::Y => Self::store(&mut node.rect.y, v),
            PropKey::W => Self::store(&mut node.rect.w, v),
            PropKey::H => Self::store(&mut node.rect.h, v),
            PropKey::Bg => Self::store_color(&mut node.bg, v),
            PropKey::Fg => Self::store_color(&mut node.fg, v),
            PropKey::Custom(_) => node
                .behavior
                .as_mut()
                .and_then(|b| b.set_prop(key, v))
                .ok_or(UiError::UnknownProperty { key })?,
        };
        if outcome == SetOutcome::Changed && self.prop_kind(id, key) == PropKind::HotInteger {
            return Ok(SetOutcome::ChangedNeedsRepack);
        }
        Ok(outcome)
    }

    /// Property category, [`PropKind::Undefined`] for unknown keys or dead
    /// handles.
    pub fn prop_kind(&self, id: WidgetId, key: PropKey) -> PropKind {
        let Some(node) = self.nodes.get(id) else {
            return PropKind::Undefined;
        };
        match key {
            PropKey::X | PropKey::Y => PropKind::Integer,
            PropKey::W | PropKey::H => PropKind::HotInteger,
            PropKey::Bg | PropKey::Fg => PropKind::Rgba,
            PropKey::Custom(_) => node
                .behavior
                .as_ref()
                .map(|b| b.prop_kind(key))
                .unwrap_or(PropKind::Undefined),
        }
    }

    fn store(slot: &mut i32, v: i32) -> SetOutcome {
        if *slot == v {
            SetOutcome::Unchanged
        } else {
            *slot = v;
            SetOutcome::Changed
        }
    }

    fn store_color(slot: &mut Color, v: i32) -> SetOutcome {
        let color = Color::from_packed(v as u32);
        if *slot == color {
            SetOutcome::Unchanged
        } else {
            *slot = color;
            SetOutcome::Changed
        }
    }

    // ------------------------------------------------------------------
    // Layout

    /// Preferred size under the given budget. The budget is floored at
    /// zero and the behavior's answer is clamped into `[0, max]`; geometry
    /// is never mutated.
    pub fn measure(&mut self, id: WidgetId, max: Size) -> UiResult<Size> {
        let max = Size::new(max.w.max(0), max.h.max(0));
        let preferred = self.dispatch(id, |b, tree| b.measure(tree, id, max))?;
        Ok(preferred.clamp_to(max))
    }

    /// Accept the widget's assigned bounds: place children and recurse.
    pub fn pack(&mut self, id: WidgetId) -> UiResult<()> {
        self.dispatch(id, |b, tree| b.pack(tree, id))
    }

    /// Default pack: every child fills this widget's full bounds.
    pub fn pack_fill_children(&mut self, id: WidgetId) -> UiResult<()> {
        let size = self.rect(id)?.size();
        for child in self.children_snapshot(id) {
            self.set_rect(child, Rect::from_size(size))?;
            self.pack(child)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Per-frame update

    pub fn update(&mut self, id: WidgetId) -> UiResult<()> {
        self.dispatch(id, |b, tree| b.update(tree, id))
    }

    /// Default update: recurse over a snapshot of the child list.
    pub fn update_children(&mut self, id: WidgetId) -> UiResult<()> {
        for child in self.children_snapshot(id) {
            if self.contains(child) {
                self.update(child)?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Drawing

    /// Draw a widget given its parent's absolute origin.
    pub fn draw(&mut self, id: WidgetId, origin: Pos, canvas: &mut dyn Canvas) -> UiResult<()> {
        self.dispatch(id, |b, tree| b.draw(tree, id, origin, canvas))
    }

    /// Fill the widget's bounds with its background color.
    pub fn draw_background(
        &mut self,
        id: WidgetId,
        origin: Pos,
        canvas: &mut dyn Canvas,
    ) -> UiResult<()> {
        let node = self.node(id)?;
        let rect = Rect::new(
            origin.x + node.rect.x,
            origin.y + node.rect.y,
            node.rect.w,
            node.rect.h,
        );
        canvas.fill_rect(rect, node.bg);
        Ok(())
    }

    /// Draw all children in order, offset by this widget's position.
    pub fn draw_children(
        &mut self,
        id: WidgetId,
        origin: Pos,
        canvas: &mut dyn Canvas,
    ) -> UiResult<()> {
        let rect = self.rect(id)?;
        let origin = origin.offset(rect.x, rect.y);
        for child in self.children_snapshot(id) {
            if self.contains(child) {
                self.draw(child, origin, canvas)?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Event forwarding (primitive and digested)

    pub fn mouse_move(&mut self, id: WidgetId, x: i32, y: i32) -> UiResult<()> {
        self.dispatch(id, |b, tree| b.mouse_move(tree, id, x, y))
    }

    pub fn mouse_button(&mut self, id: WidgetId, button: u8, pressed: bool) -> UiResult<()> {
        self.dispatch(id, |b, tree| b.mouse_button(tree, id, button, pressed))
    }

    pub fn mouse_wheel(&mut self, id: WidgetId, dx: i32, dy: i32) -> UiResult<()> {
        self.dispatch(id, |b, tree| b.mouse_wheel(tree, id, dx, dy))
    }

    pub fn key(&mut self, id: WidgetId, keycode: u32, codepoint: u32, pressed: bool) -> UiResult<()> {
        self.dispatch(id, |b, tree| b.key(tree, id, keycode, codepoint, pressed))
    }

    pub fn player_button(
        &mut self,
        id: WidgetId,
        player: u8,
        button: u16,
        value: i32,
    ) -> UiResult<()> {
        self.dispatch(id, |b, tree| b.player_button(tree, id, player, button, value))
    }

    pub fn mouse_enter(&mut self, id: WidgetId) -> UiResult<()> {
        self.dispatch(id, |b, tree| b.mouse_enter(tree, id))
    }

    pub fn mouse_exit(&mut self, id: WidgetId) -> UiResult<()> {
        self.dispatch(id, |b, tree| b.mouse_exit(tree, id))
    }

    pub fn activate(&mut self, id: WidgetId) -> UiResult<()> {
        self.dispatch(id, |b, tree| b.activate(tree, id))
    }

    pub fn cancel(&mut self, id: WidgetId) -> UiResult<()> {
        self.dispatch(id, |b, tree| b.cancel(tree, id))
    }

    pub fn adjust(&mut self, id: WidgetId, d: i32) -> UiResult<()> {
        self.dispatch(id, |b, tree| b.adjust(tree, id, d))
    }

    pub fn focus(&mut self, id: WidgetId) -> UiResult<()> {
        self.dispatch(id, |b, tree| b.focus(tree, id))
    }

    pub fn unfocus(&mut self, id: WidgetId) -> UiResult<()> {
        self.dispatch(id, |b, tree| b.unfocus(tree, id))
    }

    /// Borrow the behavior for typed inspection (e.g. downcast to a
    /// concrete type). Unavailable while the widget is mid-dispatch.
    pub fn behavior(&self, id: WidgetId) -> Option<&dyn Behavior> {
        self.nodes.get(id).and_then(|n| n.behavior.as_deref())
    }

    pub fn behavior_mut(&mut self, id: WidgetId) -> Option<&mut dyn Behavior> {
        self.nodes.get_mut(id).and_then(|n| n.behavior.as_deref_mut())
    }

    // ------------------------------------------------------------------
    // Internals

    fn node(&self, id: WidgetId) -> UiResult<&WidgetNode> {
        self.nodes.get(id).ok_or(UiError::DeadWidget)
    }

    fn node_mut(&mut self, id: WidgetId) -> UiResult<&mut WidgetNode> {
        self.nodes.get_mut(id).ok_or(UiError::DeadWidget)
    }

    /// Detach the behavior box, run the callback with full tree access,
    /// and reattach. If the callback destroyed its own widget the box is
    /// dropped here instead.
    fn dispatch<R>(
        &mut self,
        id: WidgetId,
        f: impl FnOnce(&mut dyn Behavior, &mut WidgetTree) -> UiResult<R>,
    ) -> UiResult<R> {
        let node = self.node_mut(id)?;
        let mut behavior = node.behavior.take().ok_or(UiError::ReentrantDispatch {
            name: "unknown",
        })?;
        let out = f(behavior.as_mut(), self);
        if let Some(node) = self.nodes.get_mut(id) {
            node.behavior = Some(behavior);
        }
        out
    }
}
