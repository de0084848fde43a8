//! Per-frame property transitions.
//!
//! The scheduler advances time-boxed linear interpolations of widget
//! properties, one tick per frame. A transition targets one (widget, key)
//! pair; starting another on the same pair replaces it in place, re-reading
//! the widget's current live value as the new start so the motion never
//! jumps. Durations are frame ticks; there is no wall clock here.
//!
//! Writes go through the generic property interface. When a write reports
//! that layout went stale, the widget is repacked before the tick returns
//! (at most once per widget per tick, since width and height often move
//! together).

use corsair_core::color::lerp_packed;
use indexmap::IndexMap;

use crate::error::{UiError, UiResult};
use crate::tree::{WidgetId, WidgetTree};
use crate::widget::{PropKey, PropKind, SetOutcome};

/// How a transition behaves over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionMode {
    /// Play start to end over the duration, then stop and self-remove.
    Once,
    /// Ping-pong between start and end forever, folding at the midpoint
    /// of a double-length period.
    Repeat,
}

#[derive(Debug)]
struct Transition {
    start: i32,
    end: i32,
    elapsed: i32,
    duration: i32,
    mode: TransitionMode,
    kind: PropKind,
}

impl Transition {
    /// Normalized position after mode remapping, in `[0, duration]`.
    fn position(&self) -> i32 {
        match self.mode {
            TransitionMode::Once => self.elapsed,
            TransitionMode::Repeat => {
                let cycle = self.duration * 2;
                let phase = self.elapsed % cycle;
                if phase <= self.duration {
                    phase
                } else {
                    cycle - phase
                }
            }
        }
    }

    fn value_at(&self, p: i32) -> i32 {
        if self.kind == PropKind::Rgba {
            return lerp_packed(self.start, self.end, p, self.duration);
        }
        if p <= 0 {
            return self.start;
        }
        if p >= self.duration {
            return self.end;
        }
        let range = (self.end - self.start) as i64;
        (self.start as i64 + range * p as i64 / self.duration as i64) as i32
    }

    fn finished(&self) -> bool {
        self.mode == TransitionMode::Once && self.elapsed >= self.duration
    }
}

/// Owns all in-flight transitions, in insertion order.
#[derive(Debug, Default)]
pub struct TransitionScheduler {
    transitions: IndexMap<(WidgetId, PropKey), Transition>,
}

impl TransitionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Is a transition in flight for this (widget, key) pair?
    pub fn contains(&self, id: WidgetId, key: PropKey) -> bool {
        self.transitions.contains_key(&(id, key))
    }

    /// Schedule `key` on `id` to reach `end` over `duration` ticks. An
    /// in-flight transition on the same pair is replaced in place; the
    /// start value is always the widget's current live value.
    pub fn begin(
        &mut self,
        tree: &WidgetTree,
        id: WidgetId,
        key: PropKey,
        end: i32,
        duration: i32,
        mode: TransitionMode,
    ) -> UiResult<()> {
        if duration < 1 {
            return Err(UiError::InvalidDuration);
        }
        let kind = tree.prop_kind(id, key);
        if kind == PropKind::Undefined {
            if !tree.contains(id) {
                return Err(UiError::DeadWidget);
            }
            return Err(UiError::UnknownProperty { key });
        }
        let start = tree.prop(id, key)?;
        // IndexMap keeps an existing key's position on insert, so a
        // replacement still ticks in its original slot.
        self.transitions.insert(
            (id, key),
            Transition {
                start,
                end,
                elapsed: 0,
                duration,
                mode,
                kind,
            },
        );
        Ok(())
    }

    /// Drop the transition on one (widget, key) pair, leaving the
    /// property wherever it is now.
    pub fn cancel(&mut self, id: WidgetId, key: PropKey) {
        self.transitions.shift_remove(&(id, key));
    }

    /// Snap every transition to its end value and clear the table.
    pub fn finish_all(&mut self, tree: &mut WidgetTree) -> UiResult<()> {
        let drained: Vec<_> = self
            .transitions
            .drain(..)
            .map(|((id, key), t)| (id, key, t.end))
            .collect();
        for (id, key, end) in drained {
            if !tree.contains(id) {
                continue;
            }
            if tree.set_prop(id, key, end)? == SetOutcome::ChangedNeedsRepack {
                tree.pack(id)?;
            }
        }
        Ok(())
    }

    /// Advance every transition by one tick, in insertion order, applying
    /// the interpolated values. Finished Once transitions self-remove;
    /// transitions whose target left the rooted tree are collected.
    pub fn tick(&mut self, tree: &mut WidgetTree) -> UiResult<()> {
        let keys: Vec<(WidgetId, PropKey)> = self.transitions.keys().copied().collect();
        let mut repack: Vec<WidgetId> = Vec::new();

        for pair in &keys {
            let (id, key) = *pair;
            if !tree.is_rooted(id) {
                tracing::debug!(?key, "dropping transition for unrooted widget");
                self.transitions.shift_remove(pair);
                continue;
            }
            let Some(t) = self.transitions.get_mut(pair) else {
                continue;
            };
            if t.mode == TransitionMode::Once {
                t.elapsed = (t.elapsed + 1).min(t.duration);
            } else {
                t.elapsed += 1;
            }
            let value = t.value_at(t.position());
            if tree.set_prop(id, key, value)? == SetOutcome::ChangedNeedsRepack
                && !repack.contains(&id)
            {
                repack.push(id);
            }
        }

        for id in repack {
            if tree.contains(id) {
                tree.pack(id)?;
            }
        }

        self.transitions.retain(|_, t| !t.finished());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corsair_core::Rect;

    use crate::widget::Skeleton;

    fn rooted_pair() -> (WidgetTree, WidgetId, WidgetId) {
        let mut tree = WidgetTree::new();
        let root = tree.spawn(None, Box::new(Skeleton)).unwrap();
        tree.set_root(root).unwrap();
        let w = tree.spawn(Some(root), Box::new(Skeleton)).unwrap();
        (tree, root, w)
    }

    #[test]
    fn test_once_boundaries_and_monotonic() {
        let (mut tree, _root, w) = rooted_pair();
        let mut sched = TransitionScheduler::new();
        sched
            .begin(&tree, w, PropKey::X, 10, 5, TransitionMode::Once)
            .unwrap();

        // Untouched until the first tick.
        assert_eq!(tree.prop(w, PropKey::X).unwrap(), 0);

        let mut last = 0;
        for _ in 0..4 {
            sched.tick(&mut tree).unwrap();
            let v = tree.prop(w, PropKey::X).unwrap();
            assert!(v >= last);
            assert!(v < 10);
            last = v;
        }
        sched.tick(&mut tree).unwrap();
        assert_eq!(tree.prop(w, PropKey::X).unwrap(), 10);
        assert!(sched.is_empty());

        // Further ticks leave the property alone.
        sched.tick(&mut tree).unwrap();
        assert_eq!(tree.prop(w, PropKey::X).unwrap(), 10);
    }

    #[test]
    fn test_replace_in_place_rereads_live_value() {
        let (mut tree, _root, w) = rooted_pair();
        let mut sched = TransitionScheduler::new();
        sched
            .begin(&tree, w, PropKey::X, 10, 10, TransitionMode::Once)
            .unwrap();
        for _ in 0..5 {
            sched.tick(&mut tree).unwrap();
        }
        assert_eq!(tree.prop(w, PropKey::X).unwrap(), 5);

        // New transition restarts from 5, not 0.
        sched
            .begin(&tree, w, PropKey::X, 105, 10, TransitionMode::Once)
            .unwrap();
        assert_eq!(sched.len(), 1);
        sched.tick(&mut tree).unwrap();
        assert_eq!(tree.prop(w, PropKey::X).unwrap(), 15);
    }

    #[test]
    fn test_repeat_folds_at_midpoint() {
        let (mut tree, _root, w) = rooted_pair();
        let mut sched = TransitionScheduler::new();
        sched
            .begin(&tree, w, PropKey::Y, 10, 5, TransitionMode::Repeat)
            .unwrap();

        let mut seen = Vec::new();
        for _ in 0..10 {
            sched.tick(&mut tree).unwrap();
            seen.push(tree.prop(w, PropKey::Y).unwrap());
        }
        assert_eq!(seen, [2, 4, 6, 8, 10, 8, 6, 4, 2, 0]);
        assert_eq!(sched.len(), 1);
    }

    #[test]
    fn test_rgba_interpolates_per_channel() {
        let (mut tree, _root, w) = rooted_pair();
        tree.set_prop(w, PropKey::Bg, 0x000000ffu32 as i32).unwrap();
        let mut sched = TransitionScheduler::new();
        sched
            .begin(
                &tree,
                w,
                PropKey::Bg,
                0xff0000ffu32 as i32,
                4,
                TransitionMode::Once,
            )
            .unwrap();

        sched.tick(&mut tree).unwrap();
        sched.tick(&mut tree).unwrap();
        // Red at half scale, alpha pinned at full.
        assert_eq!(
            tree.prop(w, PropKey::Bg).unwrap() as u32,
            0x7f0000ff
        );
    }

    #[test]
    fn test_hot_property_triggers_repack() {
        let (mut tree, _root, w) = rooted_pair();
        let child = tree.spawn(Some(w), Box::new(Skeleton)).unwrap();
        tree.set_rect(w, Rect::new(0, 0, 10, 10)).unwrap();
        tree.pack(w).unwrap();

        let mut sched = TransitionScheduler::new();
        sched
            .begin(&tree, w, PropKey::W, 50, 2, TransitionMode::Once)
            .unwrap();
        sched.tick(&mut tree).unwrap();
        // Default pack fits the child to the widget's new bounds.
        assert_eq!(tree.rect(w).unwrap().w, 30);
        assert_eq!(tree.rect(child).unwrap().w, 30);
    }

    #[test]
    fn test_unrooted_target_is_collected() {
        let (mut tree, root, w) = rooted_pair();
        let mut sched = TransitionScheduler::new();
        sched
            .begin(&tree, w, PropKey::X, 10, 5, TransitionMode::Once)
            .unwrap();
        tree.remove_child(root, w).unwrap();

        sched.tick(&mut tree).unwrap();
        assert!(sched.is_empty());
    }

    #[test]
    fn test_begin_validates_arguments() {
        let (tree, _root, w) = rooted_pair();
        let mut sched = TransitionScheduler::new();
        assert_eq!(
            sched.begin(&tree, w, PropKey::X, 10, 0, TransitionMode::Once),
            Err(UiError::InvalidDuration)
        );
        assert_eq!(
            sched.begin(&tree, w, PropKey::Custom(9), 10, 5, TransitionMode::Once),
            Err(UiError::UnknownProperty { key: PropKey::Custom(9) })
        );
        assert!(sched.is_empty());
    }

    #[test]
    fn test_finish_all_snaps_to_end() {
        let (mut tree, _root, w) = rooted_pair();
        let mut sched = TransitionScheduler::new();
        sched
            .begin(&tree, w, PropKey::X, 40, 100, TransitionMode::Once)
            .unwrap();
        sched
            .begin(&tree, w, PropKey::Y, 7, 100, TransitionMode::Repeat)
            .unwrap();
        sched.finish_all(&mut tree).unwrap();
        assert!(sched.is_empty());
        assert_eq!(tree.prop(w, PropKey::X).unwrap(), 40);
        assert_eq!(tree.prop(w, PropKey::Y).unwrap(), 7);
    }
}
