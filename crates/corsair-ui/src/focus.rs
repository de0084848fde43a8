//! The keyboard focus ring.
//!
//! Tracks the keyboard-focusable widgets under the active container and
//! mediates the single current focus. Membership is rebuilt by `refresh`
//! whenever the container changes or its subtree is repacked; between
//! refreshes every read defends against candidates that have since left
//! the tree.
//!
//! Invariant: a focus change fires at most one unfocus-then-focus pair,
//! in that order.

use crate::error::{UiError, UiResult};
use crate::tree::{WidgetId, WidgetTree};
use crate::widget::WidgetFlags;

#[derive(Debug, Default)]
pub struct FocusRing {
    candidates: Vec<WidgetId>,
    current: Option<usize>,
}

impl FocusRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Rebuild the ring for `container`: drop candidates that are no
    /// longer eligible, add newly eligible descendants in depth-first
    /// order, and give focus to the first candidate if nothing holds it.
    /// `None` clears the ring with zero callbacks.
    pub fn refresh(&mut self, tree: &mut WidgetTree, container: Option<WidgetId>) -> UiResult<()> {
        let Some(container) = container else {
            self.candidates.clear();
            self.current = None;
            return Ok(());
        };

        let mut i = self.candidates.len();
        while i > 0 {
            i -= 1;
            let candidate = self.candidates[i];
            if !Self::eligible(tree, container, candidate) {
                self.remove_at(tree, i)?;
            }
        }

        Self::scan(tree, container, &mut self.candidates);

        if self.current.is_none() && !self.candidates.is_empty() {
            tree.focus(self.candidates[0])?;
            self.current = Some(0);
        }
        Ok(())
    }

    /// Current focus, verified still rooted. An orphaned focus is dropped
    /// from the ring and reported as no focus.
    pub fn focus(&mut self, tree: &WidgetTree) -> Option<WidgetId> {
        let p = self.current?;
        let id = self.candidates[p];
        if tree.is_rooted(id) {
            Some(id)
        } else {
            self.candidates.remove(p);
            self.current = None;
            None
        }
    }

    /// Move focus to the next candidate, wrapping. No-op on an empty ring.
    pub fn advance(&mut self, tree: &mut WidgetTree) -> UiResult<()> {
        self.step(tree, 1)
    }

    /// Move focus to the previous candidate, wrapping.
    pub fn retreat(&mut self, tree: &mut WidgetTree) -> UiResult<()> {
        self.step(tree, -1)
    }

    /// Release the current focus without choosing a successor.
    pub fn drop_focus(&mut self, tree: &mut WidgetTree) -> UiResult<()> {
        self.replace(tree, None)
    }

    /// Transfer focus to a known candidate.
    pub fn set_focus(&mut self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
        match self.candidates.iter().position(|&c| c == id) {
            Some(p) => self.replace(tree, Some(p)),
            None => Err(UiError::NotACandidate),
        }
    }

    fn step(&mut self, tree: &mut WidgetTree, d: isize) -> UiResult<()> {
        if self.candidates.is_empty() {
            return Ok(());
        }
        let n = self.candidates.len() as isize;
        let p = self.current.map(|p| p as isize).unwrap_or(-1) + d;
        let p = if p < 0 { n - 1 } else if p >= n { 0 } else { p };
        self.replace(tree, Some(p as usize))
    }

    /// The single choke point for focus changes; fires at most one
    /// unfocus and one focus, unfocus first.
    fn replace(&mut self, tree: &mut WidgetTree, np: Option<usize>) -> UiResult<()> {
        let np = np.filter(|&p| p < self.candidates.len());
        if np == self.current {
            return Ok(());
        }

        if let Some(p) = self.current.take() {
            let old = self.candidates[p];
            if tree.is_rooted(old) {
                tree.unfocus(old)?;
            }
        }

        if let Some(p) = np {
            let id = self.candidates[p];
            if !tree.is_rooted(id) {
                self.candidates.remove(p);
                return Ok(());
            }
            tree.focus(id)?;
            self.current = Some(p);
        }
        Ok(())
    }

    fn eligible(tree: &WidgetTree, container: WidgetId, candidate: WidgetId) -> bool {
        tree.contains(candidate)
            && tree.flags(candidate).contains(WidgetFlags::ACCEPTS_KEYBOARD)
            && tree.is_ancestor(container, candidate)
    }

    /// Drop the candidate at `i`, firing unfocus only if it held live
    /// focus; an already-orphaned focus leaves silently.
    fn remove_at(&mut self, tree: &mut WidgetTree, i: usize) -> UiResult<()> {
        let candidate = self.candidates.remove(i);
        match self.current {
            Some(p) if p == i => {
                self.current = None;
                if tree.is_rooted(candidate) {
                    tree.unfocus(candidate)?;
                }
            }
            Some(p) if p > i => self.current = Some(p - 1),
            _ => {}
        }
        Ok(())
    }

    fn scan(tree: &WidgetTree, id: WidgetId, out: &mut Vec<WidgetId>) {
        if tree.flags(id).contains(WidgetFlags::ACCEPTS_KEYBOARD) && !out.contains(&id) {
            out.push(id);
        }
        for &child in tree.children(id) {
            Self::scan(tree, child, out);
        }
    }
}
