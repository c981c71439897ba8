//! In-memory host runtime
//!
//! [`InstanceTree`] is a plain element/text instance store implementing the
//! structural side of [`HostRuntime`]. [`RecordingHost`] wraps it and logs
//! every call, which makes it the substitute host for tests and for embedders
//! that want to inspect what the bridge did.

use std::collections::HashMap;

use bridge_tetris_vdom::{HostElement, PropChange, PropValue, Props, VNode};

use crate::host::{HostError, HostHandle, HostRuntime};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceKind {
    Element {
        tag: String,
        key: Option<String>,
        props: Props,
    },
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub kind: InstanceKind,
    pub parent: Option<HostHandle>,
    pub children: Vec<HostHandle>,
}

/// Handle-addressed instance store.
#[derive(Debug, Clone, Default)]
pub struct InstanceTree {
    next_handle: u64,
    instances: HashMap<HostHandle, Instance>,
}

impl InstanceTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self, kind: InstanceKind) -> HostHandle {
        self.next_handle += 1;
        let handle = HostHandle::new(self.next_handle);
        self.instances.insert(
            handle,
            Instance {
                kind,
                parent: None,
                children: Vec::new(),
            },
        );
        handle
    }

    /// A container element that exists before anything is mounted into it
    pub fn create_container(&mut self, tag: &str) -> HostHandle {
        self.allocate(InstanceKind::Element {
            tag: tag.to_string(),
            key: None,
            props: Props::new(),
        })
    }

    pub fn get(&self, handle: HostHandle) -> Option<&Instance> {
        self.instances.get(&handle)
    }

    fn get_mut(&mut self, handle: HostHandle) -> Result<&mut Instance, HostError> {
        self.instances
            .get_mut(&handle)
            .ok_or(HostError::UnknownHandle(handle))
    }

    /// Live instances, containers included
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn children(&self, handle: HostHandle) -> &[HostHandle] {
        self.instances
            .get(&handle)
            .map(|instance| instance.children.as_slice())
            .unwrap_or(&[])
    }

    /// Depth-first search for the first element with `key` below `from`
    pub fn find_by_key(&self, from: HostHandle, key: &str) -> Option<HostHandle> {
        let instance = self.instances.get(&from)?;
        if let InstanceKind::Element { key: Some(k), .. } = &instance.kind {
            if k == key {
                return Some(from);
            }
        }
        instance
            .children
            .iter()
            .find_map(|&child| self.find_by_key(child, key))
    }

    /// Concatenated text of every text instance below `handle`
    pub fn text_content(&self, handle: HostHandle) -> String {
        let mut out = String::new();
        self.collect_text(handle, &mut out);
        out
    }

    fn collect_text(&self, handle: HostHandle, out: &mut String) {
        let Some(instance) = self.instances.get(&handle) else {
            return;
        };
        match &instance.kind {
            InstanceKind::Text(text) => out.push_str(text),
            InstanceKind::Element { .. } => {
                for &child in &instance.children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    pub fn prop(&self, handle: HostHandle, name: &str) -> Option<&PropValue> {
        match &self.instances.get(&handle)?.kind {
            InstanceKind::Element { props, .. } => props.get(name),
            InstanceKind::Text(_) => None,
        }
    }

    /// Rebuild the element tree rooted at `handle`
    pub fn to_vnode(&self, handle: HostHandle) -> Option<VNode> {
        let instance = self.instances.get(&handle)?;
        let node = match &instance.kind {
            InstanceKind::Text(text) => VNode::Text(text.clone()),
            InstanceKind::Element { tag, key, props } => VNode::Host(HostElement {
                tag: tag.clone(),
                key: key.clone(),
                props: props.clone(),
                children: instance
                    .children
                    .iter()
                    .filter_map(|&child| self.to_vnode(child))
                    .collect(),
            }),
        };
        Some(node)
    }

    fn release(&mut self, handle: HostHandle) {
        if let Some(instance) = self.instances.remove(&handle) {
            for child in instance.children {
                self.release(child);
            }
        }
    }

    fn detach(&mut self, parent: HostHandle, child: HostHandle) -> Result<usize, HostError> {
        let siblings = &mut self.get_mut(parent)?.children;
        let position = siblings
            .iter()
            .position(|&c| c == child)
            .ok_or(HostError::NotAChild { parent, child })?;
        siblings.remove(position);
        Ok(position)
    }
}

impl HostRuntime for InstanceTree {
    fn create_element(
        &mut self,
        tag: &str,
        key: Option<&str>,
        props: &Props,
    ) -> Result<HostHandle, HostError> {
        Ok(self.allocate(InstanceKind::Element {
            tag: tag.to_string(),
            key: key.map(str::to_string),
            props: props.clone(),
        }))
    }

    fn create_text(&mut self, text: &str) -> Result<HostHandle, HostError> {
        Ok(self.allocate(InstanceKind::Text(text.to_string())))
    }

    fn insert_child(
        &mut self,
        parent: HostHandle,
        child: HostHandle,
        index: usize,
    ) -> Result<(), HostError> {
        let len = self.get_mut(parent)?.children.len();
        if index > len {
            return Err(HostError::IndexOutOfRange { parent, index, len });
        }
        self.get_mut(child)?.parent = Some(parent);
        self.get_mut(parent)?.children.insert(index, child);
        Ok(())
    }

    fn move_child(
        &mut self,
        parent: HostHandle,
        child: HostHandle,
        index: usize,
    ) -> Result<(), HostError> {
        let from = self.detach(parent, child)?;
        let siblings = &mut self.get_mut(parent)?.children;
        if index > siblings.len() {
            // Put it back where it was before reporting
            siblings.insert(from, child);
            return Err(HostError::IndexOutOfRange {
                parent,
                index,
                len: siblings.len() - 1,
            });
        }
        siblings.insert(index, child);
        Ok(())
    }

    fn set_props(&mut self, handle: HostHandle, changes: &[PropChange]) -> Result<(), HostError> {
        match &mut self.get_mut(handle)?.kind {
            InstanceKind::Element { props, .. } => {
                for change in changes {
                    match change {
                        PropChange::Set { name, value } => {
                            props.insert(name.clone(), value.clone());
                        }
                        PropChange::Remove { name } => {
                            props.remove(name);
                        }
                    }
                }
                Ok(())
            }
            InstanceKind::Text(_) => Err(HostError::Runtime(format!(
                "cannot set props on text instance {handle}"
            ))),
        }
    }

    fn set_text(&mut self, handle: HostHandle, text: &str) -> Result<(), HostError> {
        match &mut self.get_mut(handle)?.kind {
            InstanceKind::Text(current) => {
                *current = text.to_string();
                Ok(())
            }
            InstanceKind::Element { .. } => Err(HostError::Runtime(format!(
                "cannot set text on element instance {handle}"
            ))),
        }
    }

    fn remove_child(&mut self, parent: HostHandle, child: HostHandle) -> Result<(), HostError> {
        self.detach(parent, child)?;
        self.release(child);
        Ok(())
    }
}

/// One logged host call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    CreateElement { handle: HostHandle, tag: String },
    CreateText { handle: HostHandle, text: String },
    InsertChild { parent: HostHandle, child: HostHandle, index: usize },
    MoveChild { parent: HostHandle, child: HostHandle, index: usize },
    SetProps { handle: HostHandle, changes: Vec<PropChange> },
    SetText { handle: HostHandle, text: String },
    RemoveChild { parent: HostHandle, child: HostHandle },
    Commit,
}

/// Host runtime that records every call and keeps an inspectable tree.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    instances: InstanceTree,
    calls: Vec<HostCall>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mount target. Not logged: it is part of the host document.
    pub fn create_container(&mut self, tag: &str) -> HostHandle {
        self.instances.create_container(tag)
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn instances(&self) -> &InstanceTree {
        &self.instances
    }

    /// The tree mounted into `container`, if any
    pub fn tree(&self, container: HostHandle) -> Option<VNode> {
        let root = *self.instances.children(container).first()?;
        self.instances.to_vnode(root)
    }
}

impl HostRuntime for RecordingHost {
    fn create_element(
        &mut self,
        tag: &str,
        key: Option<&str>,
        props: &Props,
    ) -> Result<HostHandle, HostError> {
        let handle = self.instances.create_element(tag, key, props)?;
        self.calls.push(HostCall::CreateElement {
            handle,
            tag: tag.to_string(),
        });
        Ok(handle)
    }

    fn create_text(&mut self, text: &str) -> Result<HostHandle, HostError> {
        let handle = self.instances.create_text(text)?;
        self.calls.push(HostCall::CreateText {
            handle,
            text: text.to_string(),
        });
        Ok(handle)
    }

    fn insert_child(
        &mut self,
        parent: HostHandle,
        child: HostHandle,
        index: usize,
    ) -> Result<(), HostError> {
        self.calls.push(HostCall::InsertChild {
            parent,
            child,
            index,
        });
        self.instances.insert_child(parent, child, index)
    }

    fn move_child(
        &mut self,
        parent: HostHandle,
        child: HostHandle,
        index: usize,
    ) -> Result<(), HostError> {
        self.calls.push(HostCall::MoveChild {
            parent,
            child,
            index,
        });
        self.instances.move_child(parent, child, index)
    }

    fn set_props(&mut self, handle: HostHandle, changes: &[PropChange]) -> Result<(), HostError> {
        self.calls.push(HostCall::SetProps {
            handle,
            changes: changes.to_vec(),
        });
        self.instances.set_props(handle, changes)
    }

    fn set_text(&mut self, handle: HostHandle, text: &str) -> Result<(), HostError> {
        self.calls.push(HostCall::SetText {
            handle,
            text: text.to_string(),
        });
        self.instances.set_text(handle, text)
    }

    fn remove_child(&mut self, parent: HostHandle, child: HostHandle) -> Result<(), HostError> {
        self.calls.push(HostCall::RemoveChild { parent, child });
        self.instances.remove_child(parent, child)
    }

    fn commit(&mut self) -> Result<(), HostError> {
        self.calls.push(HostCall::Commit);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_move_remove() {
        let mut tree = InstanceTree::new();
        let root = tree.create_container("body");
        let a = tree.create_text("a").unwrap();
        let b = tree.create_text("b").unwrap();
        let c = tree.create_text("c").unwrap();

        tree.insert_child(root, a, 0).unwrap();
        tree.insert_child(root, c, 1).unwrap();
        tree.insert_child(root, b, 1).unwrap();
        assert_eq!(tree.text_content(root), "abc");

        tree.move_child(root, a, 2).unwrap();
        assert_eq!(tree.text_content(root), "bca");

        tree.remove_child(root, c).unwrap();
        assert_eq!(tree.text_content(root), "ba");
        assert!(tree.get(c).is_none());
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_remove_releases_subtree() {
        let mut tree = InstanceTree::new();
        let root = tree.create_container("body");
        let div = tree.create_element("div", Some("x"), &Props::new()).unwrap();
        let text = tree.create_text("hi").unwrap();
        tree.insert_child(root, div, 0).unwrap();
        tree.insert_child(div, text, 0).unwrap();

        assert_eq!(tree.find_by_key(root, "x"), Some(div));
        tree.remove_child(root, div).unwrap();
        assert!(tree.get(text).is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_index_errors() {
        let mut tree = InstanceTree::new();
        let root = tree.create_container("body");
        let a = tree.create_text("a").unwrap();
        assert!(matches!(
            tree.insert_child(root, a, 3),
            Err(HostError::IndexOutOfRange { index: 3, len: 0, .. })
        ));

        tree.insert_child(root, a, 0).unwrap();
        assert!(tree.move_child(root, a, 5).is_err());
        assert_eq!(tree.children(root), &[a]);
    }

    #[test]
    fn test_recording_host_logs_calls() {
        let mut host = RecordingHost::new();
        let container = host.create_container("div");
        assert!(host.calls().is_empty());

        let text = host.create_text("x").unwrap();
        host.insert_child(container, text, 0).unwrap();
        host.set_text(text, "y").unwrap();

        assert_eq!(host.calls().len(), 3);
        assert_eq!(host.tree(container), Some(VNode::text("y")));
        assert_eq!(host.take_calls().len(), 3);
        assert!(host.calls().is_empty());
    }
}
