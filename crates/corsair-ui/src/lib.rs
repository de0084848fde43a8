//! Retained-mode GUI runtime: a widget tree with measure/pack layout, a
//! root input router with click capture, a keyboard focus ring, and a
//! per-frame property transition scheduler.
//!
//! The crate specifies no concrete widget visuals; applications supply
//! [`Behavior`] implementations and a [`Canvas`] backend, push raw device
//! events into a [`Gui`], and step it once per frame.

pub mod canvas;
pub mod error;
pub mod focus;
pub mod gui;
pub mod layout;
pub mod root;
pub mod router;
pub mod transition;
pub mod tree;
pub mod widget;

pub use canvas::{Canvas, DrawCmd, DrawList};
pub use error::{UiError, UiResult};
pub use focus::FocusRing;
pub use gui::Gui;
pub use layout::{Align, Axis, Dialogue, Packer};
pub use root::Root;
pub use router::InputRouter;
pub use transition::{TransitionMode, TransitionScheduler};
pub use tree::{WidgetId, WidgetTree};
pub use widget::{Behavior, PropKey, PropKind, SetOutcome, Skeleton, WidgetFlags};

#[cfg(test)]
pub(crate) mod test_support {
    //! Instrumented behaviors shared by the unit tests.

    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    use corsair_core::Size;

    use crate::error::UiResult;
    use crate::tree::{WidgetId, WidgetTree};
    use crate::widget::{Behavior, WidgetFlags};

    pub type EventLog = Rc<RefCell<Vec<String>>>;

    pub fn new_log() -> EventLog {
        Rc::new(RefCell::new(Vec::new()))
    }

    /// Records every callback it receives as `"tag:event"` strings.
    pub struct Probe {
        tag: &'static str,
        log: EventLog,
        flags: WidgetFlags,
    }

    impl Probe {
        pub fn boxed(tag: &'static str, log: &EventLog) -> Box<dyn Behavior> {
            Self::with_flags(tag, log, WidgetFlags::empty())
        }

        pub fn with_flags(
            tag: &'static str,
            log: &EventLog,
            flags: WidgetFlags,
        ) -> Box<dyn Behavior> {
            Box::new(Self {
                tag,
                log: Rc::clone(log),
                flags,
            })
        }

        fn record(&self, event: impl AsRef<str>) {
            self.log
                .borrow_mut()
                .push(format!("{}:{}", self.tag, event.as_ref()));
        }
    }

    impl Behavior for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn flags(&self) -> WidgetFlags {
            self.flags
        }

        fn destroy(&mut self, _id: WidgetId) {
            self.record("destroy");
        }

        fn update(&mut self, tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
            self.record("update");
            tree.update_children(id)
        }

        fn mouse_move(
            &mut self,
            _tree: &mut WidgetTree,
            _id: WidgetId,
            x: i32,
            y: i32,
        ) -> UiResult<()> {
            self.record(format!("move@{},{}", x, y));
            Ok(())
        }

        fn mouse_button(
            &mut self,
            _tree: &mut WidgetTree,
            _id: WidgetId,
            button: u8,
            pressed: bool,
        ) -> UiResult<()> {
            self.record(format!(
                "button:{}:{}",
                button,
                if pressed { "down" } else { "up" }
            ));
            Ok(())
        }

        fn mouse_wheel(
            &mut self,
            _tree: &mut WidgetTree,
            _id: WidgetId,
            dx: i32,
            dy: i32,
        ) -> UiResult<()> {
            self.record(format!("wheel:{},{}", dx, dy));
            Ok(())
        }

        fn key(
            &mut self,
            _tree: &mut WidgetTree,
            _id: WidgetId,
            keycode: u32,
            codepoint: u32,
            pressed: bool,
        ) -> UiResult<()> {
            self.record(format!(
                "key:{}:{}:{}",
                keycode,
                codepoint,
                if pressed { "down" } else { "up" }
            ));
            Ok(())
        }

        fn mouse_enter(&mut self, _tree: &mut WidgetTree, _id: WidgetId) -> UiResult<()> {
            self.record("enter");
            Ok(())
        }

        fn mouse_exit(&mut self, _tree: &mut WidgetTree, _id: WidgetId) -> UiResult<()> {
            self.record("exit");
            Ok(())
        }

        fn activate(&mut self, _tree: &mut WidgetTree, _id: WidgetId) -> UiResult<()> {
            self.record("activate");
            Ok(())
        }

        fn cancel(&mut self, _tree: &mut WidgetTree, _id: WidgetId) -> UiResult<()> {
            self.record("cancel");
            Ok(())
        }

        fn focus(&mut self, _tree: &mut WidgetTree, _id: WidgetId) -> UiResult<()> {
            self.record("focus");
            Ok(())
        }

        fn unfocus(&mut self, _tree: &mut WidgetTree, _id: WidgetId) -> UiResult<()> {
            self.record("unfocus");
            Ok(())
        }
    }

    /// Reports a fixed preferred size from `measure`.
    pub struct Fixed {
        size: Size,
    }

    impl Fixed {
        pub fn boxed(size: Size) -> Box<dyn Behavior> {
            Box::new(Self { size })
        }
    }

    impl Behavior for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn measure(
            &mut self,
            _tree: &mut WidgetTree,
            _id: WidgetId,
            _max: Size,
        ) -> UiResult<Size> {
            Ok(self.size)
        }
    }
}
