//! The modal stack container.
//!
//! The tree's root hosts a stack of layer widgets. The first layer gets the
//! full bounds whether it wants them or not; each later layer is measured
//! and centered, making it a natural dialogue host. Only the topmost layer
//! is active: it alone receives update, activate, cancel, and player-button
//! traffic, and the input router hit-tests nothing below it. With more than
//! one layer, a blotter in the root's foreground color is drawn between the
//! topmost layer and everything beneath it.

use std::any::Any;

use corsair_core::{Color, Pos, Rect, Size};

use crate::canvas::Canvas;
use crate::error::UiResult;
use crate::tree::{WidgetId, WidgetTree};
use crate::widget::Behavior;

const DEFAULT_BG: Color = Color(0x40, 0x00, 0x00, 0xff);
const DEFAULT_BLOTTER: Color = Color(0x00, 0x00, 0x00, 0xc0);

/// Topmost layer of the modal stack, if any.
pub fn active_layer(tree: &WidgetTree, root: WidgetId) -> Option<WidgetId> {
    tree.children(root).last().copied()
}

/// Behavior of the singular root widget.
#[derive(Debug, Default)]
pub struct Root;

impl Root {
    pub fn boxed() -> Box<dyn Behavior> {
        Box::new(Self)
    }
}

impl Behavior for Root {
    fn name(&self) -> &'static str {
        "root"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn init(&mut self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
        tree.set_bg(id, DEFAULT_BG)?;
        tree.set_fg(id, DEFAULT_BLOTTER)?;
        Ok(())
    }

    /// Layers below the topmost are dimmed by the blotter. An empty stack
    /// draws nothing at all.
    fn draw(
        &mut self,
        tree: &mut WidgetTree,
        id: WidgetId,
        origin: Pos,
        canvas: &mut dyn Canvas,
    ) -> UiResult<()> {
        let rect = tree.rect(id)?;
        let origin = origin.offset(rect.x, rect.y);
        let layers = tree.children_snapshot(id);
        let Some((&top, rest)) = layers.split_last() else {
            return Ok(());
        };
        for &layer in rest {
            tree.draw(layer, origin, canvas)?;
        }
        if !rest.is_empty() {
            canvas.fill_rect(Rect::new(origin.x, origin.y, rect.w, rect.h), tree.fg(id)?);
        }
        tree.draw(top, origin, canvas)
    }

    fn pack(&mut self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
        let bounds = tree.rect(id)?;
        let layers = tree.children_snapshot(id);
        let Some((&first, rest)) = layers.split_first() else {
            return Ok(());
        };

        tree.set_rect(first, Rect::from_size(bounds.size()))?;
        tree.pack(first)?;

        for &layer in rest {
            let pref = tree.measure(layer, Size::new(bounds.w, bounds.h))?;
            tree.set_rect(
                layer,
                Rect::new(
                    bounds.w / 2 - pref.w / 2,
                    bounds.h / 2 - pref.h / 2,
                    pref.w,
                    pref.h,
                ),
            )?;
            tree.pack(layer)?;
        }
        Ok(())
    }

    /// Only the active layer runs.
    fn update(&mut self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
        match active_layer(tree, id) {
            Some(layer) => tree.update(layer),
            None => Ok(()),
        }
    }

    fn activate(&mut self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
        match active_layer(tree, id) {
            Some(layer) => tree.activate(layer),
            None => Ok(()),
        }
    }

    fn cancel(&mut self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
        match active_layer(tree, id) {
            Some(layer) => tree.cancel(layer),
            None => Ok(()),
        }
    }

    fn player_button(
        &mut self,
        tree: &mut WidgetTree,
        id: WidgetId,
        player: u8,
        button: u16,
        value: i32,
    ) -> UiResult<()> {
        match active_layer(tree, id) {
            Some(layer) => tree.player_button(layer, player, button, value),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCmd, DrawList};
    use crate::test_support::{Fixed, Probe, new_log};
    use crate::widget::Skeleton;

    fn root_tree(w: i32, h: i32) -> (WidgetTree, WidgetId) {
        let mut tree = WidgetTree::new();
        let root = tree.spawn(None, Root::boxed()).unwrap();
        tree.set_root(root).unwrap();
        tree.set_rect(root, Rect::new(0, 0, w, h)).unwrap();
        (tree, root)
    }

    #[test]
    fn test_first_layer_fills_later_layers_center() {
        let (mut tree, root) = root_tree(256, 144);
        let base = tree.spawn(Some(root), Box::new(Skeleton)).unwrap();
        let modal = tree
            .spawn(Some(root), Fixed::boxed(Size::new(100, 40)))
            .unwrap();

        tree.pack(root).unwrap();
        assert_eq!(tree.rect(base).unwrap(), Rect::new(0, 0, 256, 144));
        assert_eq!(tree.rect(modal).unwrap(), Rect::new(78, 52, 100, 40));
    }

    #[test]
    fn test_blotter_under_topmost_only() {
        let (mut tree, root) = root_tree(100, 100);
        let mut canvas = DrawList::new();

        // Empty stack draws nothing.
        tree.draw(root, Pos::ZERO, &mut canvas).unwrap();
        assert!(canvas.is_empty());

        tree.spawn(Some(root), Box::new(Skeleton)).unwrap();
        tree.pack(root).unwrap();
        tree.draw(root, Pos::ZERO, &mut canvas).unwrap();
        let single = canvas.len();

        tree.spawn(Some(root), Box::new(Skeleton)).unwrap();
        tree.pack(root).unwrap();
        canvas.clear();
        tree.draw(root, Pos::ZERO, &mut canvas).unwrap();
        // One blotter rect beyond the two layers' own output.
        assert_eq!(canvas.len(), single * 2 + 1);
        assert!(canvas.commands().contains(&DrawCmd::Rect {
            rect: Rect::new(0, 0, 100, 100),
            color: DEFAULT_BLOTTER,
        }));
    }

    #[test]
    fn test_update_reaches_active_layer_only() {
        let log = new_log();
        let (mut tree, root) = root_tree(100, 100);
        tree.spawn(Some(root), Probe::boxed("below", &log)).unwrap();
        tree.spawn(Some(root), Probe::boxed("top", &log)).unwrap();

        tree.update(root).unwrap();
        tree.activate(root).unwrap();
        tree.cancel(root).unwrap();
        assert_eq!(
            log.borrow().as_slice(),
            ["top:update", "top:activate", "top:cancel"]
        );
    }
}
