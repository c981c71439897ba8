//! Terminal host runtime.
//!
//! Keeps the element instances the bridge creates and repaints them onto a
//! screen after each committed batch. Writing the screen to the terminal is
//! left to [`TerminalRenderer`](crate::renderer::TerminalRenderer) so the
//! host itself stays free of I/O.

use tracing::trace;

use bridge_tetris_bridge::{HostError, HostHandle, HostRuntime, InstanceTree};
use bridge_tetris_vdom::{PropChange, Props};

use crate::screen::Screen;
use crate::view::{HostView, Viewport};

pub struct TerminalHost {
    instances: InstanceTree,
    container: HostHandle,
    view: HostView,
    /// Set by `commit`, cleared once a frame has been painted
    dirty: bool,
}

impl Default for TerminalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalHost {
    /// A host with one root container to mount into
    pub fn new() -> Self {
        let mut instances = InstanceTree::new();
        let container = instances.create_container("screen");
        Self {
            instances,
            container,
            view: HostView::default(),
            dirty: true,
        }
    }

    pub fn container(&self) -> HostHandle {
        self.container
    }

    pub fn instances(&self) -> &InstanceTree {
        &self.instances
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Force a repaint on the next `paint` (e.g. after a resize)
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Repaint onto `screen` if anything changed since the last paint.
    ///
    /// Returns true if `screen` was repainted.
    pub fn paint(&mut self, viewport: Viewport, screen: &mut Screen) -> bool {
        if !self.dirty {
            return false;
        }
        self.view.paint(&self.instances, self.container, viewport, screen);
        self.dirty = false;
        true
    }
}

impl HostRuntime for TerminalHost {
    fn create_element(
        &mut self,
        tag: &str,
        key: Option<&str>,
        props: &Props,
    ) -> Result<HostHandle, HostError> {
        self.instances.create_element(tag, key, props)
    }

    fn create_text(&mut self, text: &str) -> Result<HostHandle, HostError> {
        self.instances.create_text(text)
    }

    fn insert_child(
        &mut self,
        parent: HostHandle,
        child: HostHandle,
        index: usize,
    ) -> Result<(), HostError> {
        self.instances.insert_child(parent, child, index)
    }

    fn move_child(
        &mut self,
        parent: HostHandle,
        child: HostHandle,
        index: usize,
    ) -> Result<(), HostError> {
        self.instances.move_child(parent, child, index)
    }

    fn set_props(&mut self, handle: HostHandle, changes: &[PropChange]) -> Result<(), HostError> {
        self.instances.set_props(handle, changes)
    }

    fn set_text(&mut self, handle: HostHandle, text: &str) -> Result<(), HostError> {
        self.instances.set_text(handle, text)
    }

    fn remove_child(&mut self, parent: HostHandle, child: HostHandle) -> Result<(), HostError> {
        self.instances.remove_child(parent, child)
    }

    fn commit(&mut self) -> Result<(), HostError> {
        self.dirty = true;
        trace!(instances = self.instances.len(), "terminal host commit");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_tetris_bridge::{App, Bridge, HostEvent, RecordingScheduler, Session};

    #[test]
    fn test_paint_only_after_commit() {
        let host = TerminalHost::new();
        let container = host.container();
        let mut bridge = Bridge::new();
        bridge.register_host(host).unwrap();

        let mut scheduler = RecordingScheduler::default();
        let mut session =
            Session::mount(App::new(10, 20), &mut bridge, container, &mut scheduler).unwrap();

        let mut screen = Screen::default();
        let viewport = Viewport::new(60, 24);
        let host = bridge.host_mut().unwrap();
        assert!(host.paint(viewport, &mut screen));
        assert!(!host.paint(viewport, &mut screen));

        session
            .dispatch(&HostEvent::key_down("ArrowLeft"), &mut bridge, &mut scheduler)
            .unwrap();
        assert!(bridge.host().unwrap().is_dirty());
        assert!(bridge.host_mut().unwrap().paint(viewport, &mut screen));
    }
}
