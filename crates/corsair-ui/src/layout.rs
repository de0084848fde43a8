//! Box-packing layout containers.
//!
//! [`Packer`] is the workhorse container: children are laid out along one
//! axis with independent alignment on the major and minor axes, uniform
//! padding around the border, and uniform spacing between children.
//! [`Dialogue`] wraps a single child and sizes it to a pleasant aspect by
//! measuring provisionally at half the screen width and widening in steps
//! when the result comes out too tall.

use std::any::Any;

use corsair_core::{Rect, Size};

use crate::error::{UiError, UiResult};
use crate::tree::{WidgetId, WidgetTree};
use crate::widget::Behavior;

/// Layout direction of a [`Packer`]'s major axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Per-axis alignment of packed children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Start,
    Center,
    End,
    /// Stretch to consume the full extent. On the major axis, leftover
    /// space is distributed evenly across all children with at most one
    /// unit of variance; remainder units go to the leading children.
    Fill,
}

/// Generic box-packing container.
#[derive(Debug)]
pub struct Packer {
    pub axis: Axis,
    pub major: Align,
    pub minor: Align,
    pub padding: i32,
    pub spacing: i32,
}

impl Default for Packer {
    fn default() -> Self {
        Self {
            axis: Axis::Vertical,
            major: Align::Start,
            minor: Align::Fill,
            padding: 0,
            spacing: 0,
        }
    }
}

impl Packer {
    pub fn new(axis: Axis) -> Self {
        Self { axis, ..Self::default() }
    }

    pub fn with_alignment(mut self, major: Align, minor: Align) -> Self {
        self.major = major;
        self.minor = minor;
        self
    }

    pub fn with_margins(mut self, padding: i32, spacing: i32) -> Self {
        self.padding = padding.max(0);
        self.spacing = spacing.max(0);
        self
    }

    pub fn boxed(self) -> Box<dyn Behavior> {
        Box::new(self)
    }

    /// Place children as if the major alignment were Start, resolving the
    /// minor alignment per child, and report the leftover major extent.
    fn prepack(&self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<i32> {
        let bounds = tree.rect(id)?;
        let mut x = self.padding;
        let mut y = self.padding;
        let mut avail_w = bounds.w - self.padding * 2;
        let mut avail_h = bounds.h - self.padding * 2;

        for child in tree.children_snapshot(id) {
            let pref = tree.measure(child, Size::new(avail_w, avail_h))?;
            let rect = match self.axis {
                Axis::Vertical => {
                    let (cx, cw) = Self::minor_place(self.minor, x, avail_w, pref.w);
                    let rect = Rect::new(cx, y, cw, pref.h);
                    y += pref.h + self.spacing;
                    avail_h -= pref.h + self.spacing;
                    rect
                }
                Axis::Horizontal => {
                    let (cy, ch) = Self::minor_place(self.minor, y, avail_h, pref.h);
                    let rect = Rect::new(x, cy, pref.w, ch);
                    x += pref.w + self.spacing;
                    avail_w -= pref.w + self.spacing;
                    rect
                }
            };
            tree.set_rect(child, rect)?;
        }

        // The loop subtracts a gap after every child, the last one
        // included, so spacing-worth of slack stays unredistributed.
        Ok(match self.axis {
            Axis::Vertical => avail_h,
            Axis::Horizontal => avail_w,
        })
    }

    fn minor_place(align: Align, start: i32, avail: i32, pref: i32) -> (i32, i32) {
        if pref >= avail {
            return (start, avail);
        }
        match align {
            Align::Start => (start, pref),
            Align::Center => (start + avail / 2 - pref / 2, pref),
            Align::End => (start + avail - pref, pref),
            Align::Fill => (start, avail),
        }
    }

    /// Grow every child's major extent so the leftover is consumed
    /// exactly, no two children differing by more than one unit.
    fn distribute(&self, tree: &mut WidgetTree, id: WidgetId, leftover: i32) -> UiResult<()> {
        let children = tree.children_snapshot(id);
        let n = children.len() as i32;
        let each = leftover / n;
        let mut extra = leftover % n;
        let mut offset = 0;
        for child in children {
            let mut rect = tree.rect(child)?;
            let grow = each + if extra > 0 { extra -= 1; 1 } else { 0 };
            match self.axis {
                Axis::Vertical => {
                    rect.y += offset;
                    rect.h += grow;
                }
                Axis::Horizontal => {
                    rect.x += offset;
                    rect.w += grow;
                }
            }
            offset += grow;
            tree.set_rect(child, rect)?;
        }
        Ok(())
    }

    fn shift(&self, tree: &mut WidgetTree, id: WidgetId, offset: i32) -> UiResult<()> {
        for child in tree.children_snapshot(id) {
            let mut rect = tree.rect(child)?;
            match self.axis {
                Axis::Vertical => rect.y += offset,
                Axis::Horizontal => rect.x += offset,
            }
            tree.set_rect(child, rect)?;
        }
        Ok(())
    }

    fn pack_children(&self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
        for child in tree.children_snapshot(id) {
            if tree.contains(child) {
                tree.pack(child)?;
            }
        }
        Ok(())
    }
}

impl Behavior for Packer {
    fn name(&self) -> &'static str {
        "packer"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn measure(&mut self, tree: &mut WidgetTree, id: WidgetId, max: Size) -> UiResult<Size> {
        let children = tree.children_snapshot(id);
        let mut size = Size::ZERO;
        if !children.is_empty() {
            let gaps = self.spacing * (children.len() as i32 - 1);
            let mut budget = Size::new(max.w - self.padding * 2, max.h - self.padding * 2);
            match self.axis {
                Axis::Vertical => budget.h -= gaps,
                Axis::Horizontal => budget.w -= gaps,
            }

            let (mut w_max, mut w_sum, mut h_max, mut h_sum) = (0, 0, 0, 0);
            for child in children {
                let pref = tree.measure(child, budget)?;
                w_max = w_max.max(pref.w);
                h_max = h_max.max(pref.h);
                w_sum += pref.w;
                h_sum += pref.h;
            }
            size = match self.axis {
                Axis::Vertical => Size::new(w_max, h_sum + gaps),
                Axis::Horizontal => Size::new(w_sum + gaps, h_max),
            };
        }
        Ok(Size::new(size.w + self.padding * 2, size.h + self.padding * 2))
    }

    fn pack(&mut self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
        if tree.children(id).is_empty() {
            return Ok(());
        }
        let leftover = self.prepack(tree, id)?;

        if leftover > 0 {
            match self.major {
                Align::Start => {}
                Align::Fill => self.distribute(tree, id, leftover)?,
                Align::Center => self.shift(tree, id, leftover / 2)?,
                Align::End => self.shift(tree, id, leftover)?,
            }
        }
        self.pack_children(tree, id)
    }
}

/// Modal dialogue frame: hosts exactly one content child and picks a
/// width that keeps the content from going tall and skinny.
#[derive(Debug)]
pub struct Dialogue {
    screen: Size,
}

impl Dialogue {
    pub fn new(screen: Size) -> Self {
        Self { screen }
    }

    pub fn boxed(screen: Size) -> Box<dyn Behavior> {
        Box::new(Self::new(screen))
    }

    fn sole_child(&self, tree: &WidgetTree, id: WidgetId) -> UiResult<WidgetId> {
        match tree.children(id) {
            [child] => Ok(*child),
            _ => Err(UiError::Behavior {
                name: "dialogue",
                message: "expected exactly one content child".into(),
            }),
        }
    }
}

impl Behavior for Dialogue {
    fn name(&self) -> &'static str {
        "dialogue"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn measure(&mut self, tree: &mut WidgetTree, id: WidgetId, max: Size) -> UiResult<Size> {
        let child = self.sole_child(tree, id)?;

        // Anything but a full-screen budget means some other container is
        // in charge; defer to the content.
        if max != self.screen {
            return tree.measure(child, max);
        }

        // Provisional pass at half width, widening when the content comes
        // out disproportionately tall.
        let mut size = tree.measure(child, Size::new(max.w / 2, max.h))?;
        if size.h > self.screen.h / 2 {
            size = tree.measure(child, Size::new(max.w * 2 / 3, max.h))?;
            if size.h >= self.screen.h {
                size = tree.measure(child, max)?;
            }
        }
        Ok(size)
    }

    fn pack(&mut self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
        let child = self.sole_child(tree, id)?;
        let bounds = tree.rect(id)?;
        tree.set_rect(child, Rect::from_size(bounds.size()))?;
        tree.pack(child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixed;
    use crate::widget::Skeleton;

    fn fixed(tree: &mut WidgetTree, parent: WidgetId, w: i32, h: i32) -> WidgetId {
        tree.spawn(Some(parent), Fixed::boxed(Size::new(w, h))).unwrap()
    }

    #[test]
    fn test_vertical_pack_concrete() {
        // Two children of 10x10 and 20x5 in a 40x40 vertical packer,
        // spacing 2, minor fill.
        let mut tree = WidgetTree::new();
        let packer = tree
            .spawn(None, Packer::new(Axis::Vertical).with_margins(0, 2).boxed())
            .unwrap();
        let a = fixed(&mut tree, packer, 10, 10);
        let b = fixed(&mut tree, packer, 20, 5);
        tree.set_rect(packer, Rect::new(0, 0, 40, 40)).unwrap();

        tree.pack(packer).unwrap();
        assert_eq!(tree.rect(a).unwrap(), Rect::new(0, 0, 40, 10));
        assert_eq!(tree.rect(b).unwrap(), Rect::new(0, 12, 40, 5));
    }

    #[test]
    fn test_pack_idempotent() {
        let mut tree = WidgetTree::new();
        let packer = tree
            .spawn(
                None,
                Packer::new(Axis::Horizontal)
                    .with_alignment(Align::Center, Align::Center)
                    .with_margins(3, 1)
                    .boxed(),
            )
            .unwrap();
        let a = fixed(&mut tree, packer, 10, 10);
        let b = fixed(&mut tree, packer, 7, 4);
        tree.set_rect(packer, Rect::new(5, 5, 50, 30)).unwrap();

        tree.pack(packer).unwrap();
        let first = (tree.rect(a).unwrap(), tree.rect(b).unwrap());
        tree.pack(packer).unwrap();
        let second = (tree.rect(a).unwrap(), tree.rect(b).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_fill_major_fairness() {
        // 3 children of height 5 in 40 units of height: leftover 25
        // splits 9/8/8.
        let mut tree = WidgetTree::new();
        let packer = tree
            .spawn(
                None,
                Packer::new(Axis::Vertical)
                    .with_alignment(Align::Fill, Align::Fill)
                    .boxed(),
            )
            .unwrap();
        let kids: Vec<_> = (0..3).map(|_| fixed(&mut tree, packer, 10, 5)).collect();
        tree.set_rect(packer, Rect::new(0, 0, 10, 40)).unwrap();

        tree.pack(packer).unwrap();
        let heights: Vec<i32> = kids.iter().map(|&k| tree.rect(k).unwrap().h).collect();
        assert_eq!(heights.iter().sum::<i32>(), 40);
        let (min, max) = (heights.iter().min().unwrap(), heights.iter().max().unwrap());
        assert!(max - min <= 1);
        assert_eq!(heights, [14, 13, 13]);
        // Children stay contiguous.
        assert_eq!(tree.rect(kids[1]).unwrap().y, 14);
        assert_eq!(tree.rect(kids[2]).unwrap().y, 27);
    }

    #[test]
    fn test_end_alignment_offsets_uniformly() {
        let mut tree = WidgetTree::new();
        let packer = tree
            .spawn(
                None,
                Packer::new(Axis::Horizontal)
                    .with_alignment(Align::End, Align::Start)
                    .boxed(),
            )
            .unwrap();
        let a = fixed(&mut tree, packer, 10, 5);
        let b = fixed(&mut tree, packer, 10, 5);
        tree.set_rect(packer, Rect::new(0, 0, 50, 20)).unwrap();

        tree.pack(packer).unwrap();
        assert_eq!(tree.rect(a).unwrap().x, 30);
        assert_eq!(tree.rect(b).unwrap().x, 40);
    }

    #[test]
    fn test_measure_sums_major_axis() {
        let mut tree = WidgetTree::new();
        let packer = tree
            .spawn(None, Packer::new(Axis::Vertical).with_margins(2, 3).boxed())
            .unwrap();
        fixed(&mut tree, packer, 10, 10);
        fixed(&mut tree, packer, 20, 5);

        let size = tree.measure(packer, Size::new(100, 100)).unwrap();
        // max width 20 + padding 4; heights 10+5 + spacing 3 + padding 4.
        assert_eq!(size, Size::new(24, 22));
    }

    #[test]
    fn test_measure_empty_is_padding_only() {
        let mut tree = WidgetTree::new();
        let packer = tree
            .spawn(None, Packer::new(Axis::Horizontal).with_margins(5, 9).boxed())
            .unwrap();
        assert_eq!(tree.measure(packer, Size::new(100, 100)).unwrap(), Size::new(10, 10));
    }

    #[test]
    fn test_dialogue_widens_tall_content() {
        let screen = Size::new(256, 144);
        let mut tree = WidgetTree::new();
        let dlg = tree.spawn(None, Dialogue::boxed(screen)).unwrap();
        // Content wants 200x100: at half width it gets clamped to 128
        // wide and stays 100 tall, which is over half the screen height,
        // so the dialogue retries at 2/3 width.
        tree.spawn(Some(dlg), Fixed::boxed(Size::new(200, 100))).unwrap();

        let size = tree.measure(dlg, screen).unwrap();
        assert_eq!(size, Size::new(170, 100));
    }

    #[test]
    fn test_dialogue_defers_on_partial_budget() {
        let screen = Size::new(256, 144);
        let mut tree = WidgetTree::new();
        let dlg = tree.spawn(None, Dialogue::boxed(screen)).unwrap();
        tree.spawn(Some(dlg), Fixed::boxed(Size::new(30, 20))).unwrap();

        assert_eq!(tree.measure(dlg, Size::new(100, 100)).unwrap(), Size::new(30, 20));
    }

    #[test]
    fn test_dialogue_requires_single_child() {
        let mut tree = WidgetTree::new();
        let dlg = tree.spawn(None, Dialogue::boxed(Size::new(256, 144))).unwrap();
        tree.spawn(Some(dlg), Box::new(Skeleton)).unwrap();
        tree.spawn(Some(dlg), Box::new(Skeleton)).unwrap();
        assert!(tree.pack(dlg).is_err());
    }
}
