//! Bridge runtime - applies patch batches against a registered host
//!
//! A [`Bridge`] is the process-scoped binding between reconciler output and
//! one host runtime. It is created once at start-up, handed explicitly to
//! whatever mounts or updates the UI, and owns the only `NodeId → HostHandle`
//! table in the system.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, error, trace, warn};

use bridge_tetris_vdom::{
    create_all, NodeId, NodeSpec, Patch, PropChange, PropValue, ReconcileError, VNode, TEXT_PROP,
};

use crate::host::{HostError, HostHandle, HostRuntime};

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("no host runtime registered; call register_host before mounting")]
    NotInitialized,

    #[error("a host runtime is already registered")]
    AlreadyRegistered,

    #[error("a tree is already mounted into {0}")]
    AlreadyMounted(HostHandle),

    #[error("nothing is mounted")]
    NotMounted,

    #[error("{op} patch targets {id}, which was never created")]
    UninitializedPatchTarget { op: &'static str, id: NodeId },

    #[error("create patch for {0}, which already exists")]
    DuplicateCreate(NodeId),

    #[error("index {index} out of range under {parent} ({len} children)")]
    InvalidIndex {
        parent: String,
        index: usize,
        len: usize,
    },

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("patch batch encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
struct Entry {
    handle: HostHandle,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    is_text: bool,
}

/// Patch applier bound to at most one host runtime and one mounted tree.
#[derive(Debug)]
pub struct Bridge<H> {
    host: Option<H>,
    container: Option<HostHandle>,
    root: Option<NodeId>,
    nodes: HashMap<NodeId, Entry>,
    batches: u64,
}

impl<H> Default for Bridge<H> {
    fn default() -> Self {
        Self {
            host: None,
            container: None,
            root: None,
            nodes: HashMap::new(),
            batches: 0,
        }
    }
}

impl<H: HostRuntime> Bridge<H> {
    /// An uninitialized bridge. Mounting fails until a host is registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the host runtime. Allowed exactly once.
    pub fn register_host(&mut self, host: H) -> Result<(), BridgeError> {
        if self.host.is_some() {
            return Err(BridgeError::AlreadyRegistered);
        }
        self.host = Some(host);
        debug!("host runtime registered");
        Ok(())
    }

    pub fn is_registered(&self) -> bool {
        self.host.is_some()
    }

    pub fn is_mounted(&self) -> bool {
        self.container.is_some()
    }

    pub fn host(&self) -> Option<&H> {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> Option<&mut H> {
        self.host.as_mut()
    }

    pub fn container(&self) -> Option<HostHandle> {
        self.container
    }

    pub fn root_id(&self) -> Option<&NodeId> {
        self.root.as_ref()
    }

    /// Host handle currently bound to `id`
    pub fn handle_of(&self, id: &NodeId) -> Option<HostHandle> {
        self.nodes.get(id).map(|entry| entry.handle)
    }

    /// Number of live nodes in the handle table
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Patch batches applied so far, mount included
    pub fn batches_applied(&self) -> u64 {
        self.batches
    }

    /// Create every node of `root` inside `container`.
    ///
    /// Returns the number of patches applied. No host call is made when the
    /// bridge is uninitialized or already mounted. If the host fails partway,
    /// whatever was inserted is detached again and the bridge is left
    /// unmounted, so a later mount starts from scratch.
    pub fn mount(&mut self, root: &VNode, container: HostHandle) -> Result<usize, BridgeError> {
        if self.host.is_none() {
            error!("mount attempted before host registration");
            return Err(BridgeError::NotInitialized);
        }
        if let Some(existing) = self.container {
            return Err(BridgeError::AlreadyMounted(existing));
        }

        let patches = create_all(root)?;
        self.container = Some(container);
        if let Err(err) = self.apply_patches(&patches) {
            self.discard_partial_mount(container);
            return Err(err);
        }

        debug!(%container, nodes = self.nodes.len(), "tree mounted");
        Ok(patches.len())
    }

    /// Detach the root of a mount that failed halfway and reset to unmounted
    fn discard_partial_mount(&mut self, container: HostHandle) {
        let root = self.root.take();
        let handle = root
            .as_ref()
            .and_then(|id| self.nodes.get(id))
            .map(|entry| entry.handle);
        if let (Some(host), Some(handle)) = (self.host.as_mut(), handle) {
            if let Err(err) = host.remove_child(container, handle).and_then(|()| host.commit()) {
                warn!(%container, %err, "could not detach partially mounted tree");
            }
        }
        self.nodes.clear();
        self.container = None;
    }

    /// Apply `patches` in order, then let the host commit.
    pub fn apply_patches(&mut self, patches: &[Patch]) -> Result<(), BridgeError> {
        let Some(mut host) = self.host.take() else {
            return Err(BridgeError::NotInitialized);
        };
        let result = self.apply_with(&mut host, patches);
        self.host = Some(host);
        result?;

        self.batches += 1;
        debug!(
            patches = patches.len(),
            nodes = self.nodes.len(),
            batch = self.batches,
            "patch batch applied"
        );
        Ok(())
    }

    fn apply_with(&mut self, host: &mut H, patches: &[Patch]) -> Result<(), BridgeError> {
        let container = self.container.ok_or(BridgeError::NotMounted)?;
        for patch in patches {
            trace!(op = patch.kind(), id = %patch.id(), "apply patch");
            self.apply_one(host, container, patch)?;
        }
        host.commit()?;
        Ok(())
    }

    /// Remove the mounted tree and forget every handle.
    pub fn unmount(&mut self) -> Result<(), BridgeError> {
        let container = self.container.ok_or(BridgeError::NotMounted)?;
        if let Some(root) = self.root.clone() {
            self.apply_patches(&[Patch::Remove { id: root }])?;
        }
        self.nodes.clear();
        self.container = None;
        debug!(%container, "tree unmounted");
        Ok(())
    }

    fn entry(&self, op: &'static str, id: &NodeId) -> Result<&Entry, BridgeError> {
        self.nodes.get(id).ok_or_else(|| {
            error!(op, %id, "patch targets a node that was never created");
            BridgeError::UninitializedPatchTarget { op, id: id.clone() }
        })
    }

    /// Host handle of a node's parent; the container for the root
    fn parent_handle(
        &self,
        op: &'static str,
        parent: Option<&NodeId>,
        container: HostHandle,
    ) -> Result<HostHandle, BridgeError> {
        match parent {
            Some(parent) => Ok(self.entry(op, parent)?.handle),
            None => Ok(container),
        }
    }

    fn sibling_count(&self, parent: Option<&NodeId>) -> usize {
        match parent {
            Some(parent) => self.nodes.get(parent).map_or(0, |entry| entry.children.len()),
            None => usize::from(self.root.is_some()),
        }
    }

    fn check_index(
        &self,
        parent: Option<&NodeId>,
        index: usize,
        len: usize,
    ) -> Result<(), BridgeError> {
        if index > len {
            return Err(BridgeError::InvalidIndex {
                parent: parent.map_or_else(|| "<container>".to_string(), NodeId::to_string),
                index,
                len,
            });
        }
        Ok(())
    }

    fn apply_one(
        &mut self,
        host: &mut H,
        container: HostHandle,
        patch: &Patch,
    ) -> Result<(), BridgeError> {
        match patch {
            Patch::Create {
                id,
                parent,
                index,
                node,
            } => {
                if self.nodes.contains_key(id) {
                    return Err(BridgeError::DuplicateCreate(id.clone()));
                }
                if parent.is_none() {
                    if let Some(root) = &self.root {
                        return Err(BridgeError::DuplicateCreate(root.clone()));
                    }
                }
                let parent_handle = self.parent_handle("create", parent.as_ref(), container)?;
                self.check_index(parent.as_ref(), *index, self.sibling_count(parent.as_ref()))?;

                let (handle, is_text) = match node {
                    NodeSpec::Element { tag, key, props } => {
                        (host.create_element(tag, key.as_deref(), props)?, false)
                    }
                    NodeSpec::Text { text } => (host.create_text(text)?, true),
                };
                host.insert_child(parent_handle, handle, *index)?;

                match parent {
                    Some(parent) => {
                        if let Some(entry) = self.nodes.get_mut(parent) {
                            entry.children.insert(*index, id.clone());
                        }
                    }
                    None => self.root = Some(id.clone()),
                }
                self.nodes.insert(
                    id.clone(),
                    Entry {
                        handle,
                        parent: parent.clone(),
                        children: Vec::new(),
                        is_text,
                    },
                );
            }
            Patch::Update { id, changes } => {
                let entry = self.entry("update", id)?;
                if entry.is_text {
                    for change in changes {
                        if let PropChange::Set {
                            name,
                            value: PropValue::Str(text),
                        } = change
                        {
                            if name == TEXT_PROP {
                                host.set_text(entry.handle, text)?;
                            }
                        }
                    }
                } else {
                    host.set_props(entry.handle, changes)?;
                }
            }
            Patch::Move { id, index } => {
                let entry = self.entry("move", id)?;
                let (handle, parent) = (entry.handle, entry.parent.clone());
                let parent_handle = self.parent_handle("move", parent.as_ref(), container)?;
                let len = self.sibling_count(parent.as_ref());
                self.check_index(parent.as_ref(), *index, len.saturating_sub(1))?;

                host.move_child(parent_handle, handle, *index)?;
                if let Some(siblings) = parent
                    .as_ref()
                    .and_then(|parent| self.nodes.get_mut(parent))
                    .map(|entry| &mut entry.children)
                {
                    siblings.retain(|sibling| sibling != id);
                    siblings.insert(*index, id.clone());
                }
            }
            Patch::Remove { id } => {
                let entry = self.entry("remove", id)?;
                let (handle, parent) = (entry.handle, entry.parent.clone());
                let parent_handle = self.parent_handle("remove", parent.as_ref(), container)?;

                host.remove_child(parent_handle, handle)?;
                match &parent {
                    Some(parent) => {
                        if let Some(entry) = self.nodes.get_mut(parent) {
                            entry.children.retain(|sibling| sibling != id);
                        }
                    }
                    None => self.root = None,
                }
                self.forget(id);
            }
        }
        Ok(())
    }

    /// Drop `id` and its descendants from the handle table
    fn forget(&mut self, id: &NodeId) {
        if let Some(entry) = self.nodes.remove(id) {
            for child in &entry.children {
                self.forget(child);
            }
        }
    }
}

/// Serialize a patch batch for a host on the far side of a process or
/// language boundary.
pub fn encode_batch(patches: &[Patch]) -> Result<String, BridgeError> {
    Ok(serde_json::to_string(patches)?)
}

pub fn decode_batch(json: &str) -> Result<Vec<Patch>, BridgeError> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{HostCall, RecordingHost};
    use bridge_tetris_vdom::{diff, HostElement};

    fn list(keys: &[&str]) -> VNode {
        HostElement::new("ul")
            .with_key("list")
            .with_children(
                keys.iter()
                    .map(|k| HostElement::new("li").with_key(*k).with_child(*k)),
            )
            .into()
    }

    fn mounted(tree: &VNode) -> (Bridge<RecordingHost>, HostHandle) {
        let mut host = RecordingHost::new();
        let container = host.create_container("body");
        let mut bridge = Bridge::new();
        bridge.register_host(host).unwrap();
        bridge.mount(tree, container).unwrap();
        (bridge, container)
    }

    #[test]
    fn test_mount_without_host_fails() {
        let mut bridge: Bridge<RecordingHost> = Bridge::new();
        let result = bridge.mount(&list(&["a"]), HostHandle::new(1));
        assert!(matches!(result, Err(BridgeError::NotInitialized)));
        assert!(!bridge.is_mounted());
        assert_eq!(bridge.node_count(), 0);
    }

    #[test]
    fn test_register_twice_fails() {
        let mut bridge = Bridge::new();
        bridge.register_host(RecordingHost::new()).unwrap();
        assert!(matches!(
            bridge.register_host(RecordingHost::new()),
            Err(BridgeError::AlreadyRegistered)
        ));
    }

    #[test]
    fn test_mount_creates_every_node() {
        let tree = list(&["a", "b", "c"]);
        let (bridge, container) = mounted(&tree);

        assert_eq!(bridge.node_count(), tree.node_count());
        let host = bridge.host().unwrap();
        assert_eq!(host.tree(container), Some(tree));
        assert_eq!(host.calls().last(), Some(&HostCall::Commit));
        assert!(bridge.handle_of(&NodeId::root("list").child("b")).is_some());
    }

    /// Delegates to a recording host but fails the n-th element creation
    struct FlakyHost {
        inner: RecordingHost,
        fail_at: Option<usize>,
        created: usize,
    }

    impl HostRuntime for FlakyHost {
        fn create_element(
            &mut self,
            tag: &str,
            key: Option<&str>,
            props: &bridge_tetris_vdom::Props,
        ) -> Result<HostHandle, HostError> {
            self.created += 1;
            if self.fail_at == Some(self.created) {
                return Err(HostError::Runtime(format!("cannot create <{tag}>")));
            }
            self.inner.create_element(tag, key, props)
        }

        fn create_text(&mut self, text: &str) -> Result<HostHandle, HostError> {
            self.inner.create_text(text)
        }

        fn insert_child(
            &mut self,
            parent: HostHandle,
            child: HostHandle,
            index: usize,
        ) -> Result<(), HostError> {
            self.inner.insert_child(parent, child, index)
        }

        fn move_child(
            &mut self,
            parent: HostHandle,
            child: HostHandle,
            index: usize,
        ) -> Result<(), HostError> {
            self.inner.move_child(parent, child, index)
        }

        fn set_props(
            &mut self,
            handle: HostHandle,
            changes: &[PropChange],
        ) -> Result<(), HostError> {
            self.inner.set_props(handle, changes)
        }

        fn set_text(&mut self, handle: HostHandle, text: &str) -> Result<(), HostError> {
            self.inner.set_text(handle, text)
        }

        fn remove_child(&mut self, parent: HostHandle, child: HostHandle) -> Result<(), HostError> {
            self.inner.remove_child(parent, child)
        }

        fn commit(&mut self) -> Result<(), HostError> {
            self.inner.commit()
        }
    }

    #[test]
    fn test_failed_mount_can_be_retried() {
        let tree = list(&["a", "b", "c"]);
        let mut inner = RecordingHost::new();
        let container = inner.create_container("body");
        let mut bridge = Bridge::new();
        // ul is the first element, so the first li fails
        bridge
            .register_host(FlakyHost {
                inner,
                fail_at: Some(2),
                created: 0,
            })
            .unwrap();

        assert!(matches!(
            bridge.mount(&tree, container),
            Err(BridgeError::Host(HostError::Runtime(_)))
        ));
        assert!(!bridge.is_mounted());
        assert_eq!(bridge.node_count(), 0);
        assert_eq!(bridge.root_id(), None);
        assert_eq!(bridge.host().unwrap().inner.tree(container), None);

        bridge.host_mut().unwrap().fail_at = None;
        assert_eq!(bridge.mount(&tree, container).unwrap(), tree.node_count());
        assert_eq!(bridge.node_count(), tree.node_count());
        assert_eq!(bridge.host().unwrap().inner.tree(container), Some(tree));
    }

    #[test]
    fn test_mount_twice_fails() {
        let tree = list(&["a"]);
        let (mut bridge, container) = mounted(&tree);
        assert!(matches!(
            bridge.mount(&tree, container),
            Err(BridgeError::AlreadyMounted(_))
        ));
    }

    #[test]
    fn test_diff_then_apply_matches_next_tree() {
        let before = list(&["a", "b", "c", "d"]);
        let after = list(&["d", "b", "e", "a"]);
        let (mut bridge, container) = mounted(&before);

        let patches = diff(&before, &after).unwrap();
        bridge.apply_patches(&patches).unwrap();

        assert_eq!(bridge.host().unwrap().tree(container), Some(after.clone()));
        assert_eq!(bridge.node_count(), after.node_count());
    }

    #[test]
    fn test_update_without_create_is_rejected() {
        let (mut bridge, _) = mounted(&list(&["a"]));
        let ghost = NodeId::root("list").child("zzz");

        let result = bridge.apply_patches(&[Patch::Update {
            id: ghost.clone(),
            changes: Vec::new(),
        }]);
        assert!(matches!(
            result,
            Err(BridgeError::UninitializedPatchTarget { op: "update", id }) if id == ghost
        ));
        assert!(matches!(
            bridge.apply_patches(&[Patch::Remove { id: ghost }]),
            Err(BridgeError::UninitializedPatchTarget { op: "remove", .. })
        ));
    }

    #[test]
    fn test_duplicate_create_is_rejected() {
        let tree = list(&["a"]);
        let (mut bridge, _) = mounted(&tree);
        let patches = create_all(&tree).unwrap();
        assert!(matches!(
            bridge.apply_patches(&patches[1..2]),
            Err(BridgeError::DuplicateCreate(_))
        ));
    }

    #[test]
    fn test_remove_forgets_subtree() {
        let before = list(&["a", "b"]);
        let (mut bridge, _) = mounted(&before);
        let patches = diff(&before, &list(&["b"])).unwrap();
        bridge.apply_patches(&patches).unwrap();

        let a = NodeId::root("list").child("a");
        assert!(bridge.handle_of(&a).is_none());
        assert!(bridge.handle_of(&a.child("#0")).is_none());
        assert_eq!(bridge.node_count(), 3);
    }

    #[test]
    fn test_unmount_clears_container() {
        let (mut bridge, container) = mounted(&list(&["a", "b"]));
        bridge.unmount().unwrap();

        assert!(!bridge.is_mounted());
        assert_eq!(bridge.node_count(), 0);
        let host = bridge.host().unwrap();
        assert_eq!(host.tree(container), None);
        // Only the container survives
        assert_eq!(host.instances().len(), 1);
        assert!(matches!(bridge.unmount(), Err(BridgeError::NotMounted)));
    }

    #[test]
    fn test_batch_encoding_round_trips_through_a_remote_host() {
        let before = list(&["a"]);
        let after = list(&["b", "a"]);
        let (mut bridge, container) = mounted(&before);

        let wire = encode_batch(&diff(&before, &after).unwrap()).unwrap();
        bridge.apply_patches(&decode_batch(&wire).unwrap()).unwrap();
        assert_eq!(bridge.host().unwrap().tree(container), Some(after));
    }
}
