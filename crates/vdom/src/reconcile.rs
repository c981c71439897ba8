//! Reconciler - keyed, level-by-level tree diff
//!
//! [`diff`] compares two trees and produces an ordered patch list. Children
//! are matched by slot (explicit key, component identity, or index). The walk
//! is linear in the number of children per level; it does not search for a
//! globally minimal edit script.
//!
//! Index semantics: `Create` and `Move` place a node at `index` in its
//! parent's current child list. Once a level has been processed the first
//! `n` children are exactly the new children in order, and stale children
//! trail behind them. Removes for a level are emitted last so earlier indices
//! stay coherent.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::node::{NodeId, PropValue, Props, VNode};

/// Reserved prop name carrying a text node's content in `Update` patches.
pub const TEXT_PROP: &str = "text";

/// Shallow description of a node to create; children arrive as their own
/// `Create` patches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeSpec {
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        props: Props,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PropChange {
    Set { name: String, value: PropValue },
    Remove { name: String },
}

/// One atomic host mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Patch {
    /// Create `node` and insert it at `index` under `parent` (or as the root)
    Create {
        id: NodeId,
        parent: Option<NodeId>,
        index: usize,
        node: NodeSpec,
    },
    Update {
        id: NodeId,
        changes: Vec<PropChange>,
    },
    Move {
        id: NodeId,
        index: usize,
    },
    /// Remove a node together with its whole subtree
    Remove {
        id: NodeId,
    },
}

impl Patch {
    pub fn id(&self) -> &NodeId {
        match self {
            Patch::Create { id, .. }
            | Patch::Update { id, .. }
            | Patch::Move { id, .. }
            | Patch::Remove { id } => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Patch::Create { .. } => "create",
            Patch::Update { .. } => "update",
            Patch::Move { .. } => "move",
            Patch::Remove { .. } => "remove",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("duplicate key {key:?} among the children of {parent}")]
    DuplicateKey { parent: NodeId, key: String },
}

/// Create patches for every node of `root`, pre-order.
pub fn create_all(root: &VNode) -> Result<Vec<Patch>, ReconcileError> {
    let mut out = Vec::new();
    let id = NodeId::root(&root.slot(0));
    create_subtree(root, id, None, 0, &mut out)?;
    Ok(out)
}

/// Ordered patches turning `prev` into `next`. Identical trees yield no
/// patches.
pub fn diff(prev: &VNode, next: &VNode) -> Result<Vec<Patch>, ReconcileError> {
    let mut out = Vec::new();
    let prev_slot = prev.slot(0);
    let next_slot = next.slot(0);

    if prev_slot == next_slot && same_kind(prev, next) {
        diff_node(prev, next, &NodeId::root(&next_slot), &mut out)?;
    } else {
        out.push(Patch::Remove {
            id: NodeId::root(&prev_slot),
        });
        create_subtree(next, NodeId::root(&next_slot), None, 0, &mut out)?;
    }

    trace!(patches = out.len(), "diff complete");
    Ok(out)
}

/// Whether an old node can be updated in place into a new one
fn same_kind(old: &VNode, new: &VNode) -> bool {
    match (old.resolve(), new.resolve()) {
        (VNode::Host(a), VNode::Host(b)) => a.tag == b.tag && a.key == b.key,
        (VNode::Text(_), VNode::Text(_)) => true,
        _ => false,
    }
}

fn spec_of(node: &VNode) -> NodeSpec {
    match node.resolve() {
        VNode::Host(element) => NodeSpec::Element {
            tag: element.tag.clone(),
            key: element.key.clone(),
            props: element.props.clone(),
        },
        VNode::Text(text) => NodeSpec::Text { text: text.clone() },
        // resolve() never stops on a component
        VNode::Component(_) => NodeSpec::Text {
            text: String::new(),
        },
    }
}

/// Slots of `children`, rejecting duplicates
fn child_slots(parent: &NodeId, children: &[VNode]) -> Result<Vec<String>, ReconcileError> {
    let mut seen = std::collections::HashSet::with_capacity(children.len());
    let mut slots = Vec::with_capacity(children.len());
    for (index, child) in children.iter().enumerate() {
        let slot = child.slot(index);
        if !seen.insert(slot.clone()) {
            return Err(ReconcileError::DuplicateKey {
                parent: parent.clone(),
                key: slot,
            });
        }
        slots.push(slot);
    }
    Ok(slots)
}

fn create_subtree(
    node: &VNode,
    id: NodeId,
    parent: Option<NodeId>,
    index: usize,
    out: &mut Vec<Patch>,
) -> Result<(), ReconcileError> {
    let node = node.resolve();
    out.push(Patch::Create {
        id: id.clone(),
        parent,
        index,
        node: spec_of(node),
    });

    let children = node.children();
    let slots = child_slots(&id, children)?;
    for (i, (child, slot)) in children.iter().zip(&slots).enumerate() {
        create_subtree(child, id.child(slot), Some(id.clone()), i, out)?;
    }
    Ok(())
}

fn diff_props(old: &Props, new: &Props) -> Vec<PropChange> {
    let mut changes = Vec::new();
    for (name, value) in new {
        if old.get(name) != Some(value) {
            changes.push(PropChange::Set {
                name: name.clone(),
                value: value.clone(),
            });
        }
    }
    for name in old.keys() {
        if !new.contains_key(name) {
            changes.push(PropChange::Remove { name: name.clone() });
        }
    }
    changes
}

/// Diff two nodes already known to share a slot and kind
fn diff_node(
    old: &VNode,
    new: &VNode,
    id: &NodeId,
    out: &mut Vec<Patch>,
) -> Result<(), ReconcileError> {
    match (old.resolve(), new.resolve()) {
        (VNode::Text(a), VNode::Text(b)) => {
            if a != b {
                out.push(Patch::Update {
                    id: id.clone(),
                    changes: vec![PropChange::Set {
                        name: TEXT_PROP.to_string(),
                        value: PropValue::Str(b.clone()),
                    }],
                });
            }
            Ok(())
        }
        (VNode::Host(a), VNode::Host(b)) => {
            let changes = diff_props(&a.props, &b.props);
            if !changes.is_empty() {
                out.push(Patch::Update {
                    id: id.clone(),
                    changes,
                });
            }
            diff_children(id, &a.children, &b.children, out)
        }
        _ => Ok(()),
    }
}

fn diff_children(
    parent: &NodeId,
    old: &[VNode],
    new: &[VNode],
    out: &mut Vec<Patch>,
) -> Result<(), ReconcileError> {
    let old_slots = child_slots(parent, old)?;
    let new_slots = child_slots(parent, new)?;

    let old_index: std::collections::HashMap<&str, usize> = old_slots
        .iter()
        .enumerate()
        .map(|(i, slot)| (slot.as_str(), i))
        .collect();

    // Old children already placed, updated in place, or replaced
    let mut consumed = vec![false; old.len()];
    // First old child not yet consumed; it sits right after the placed prefix
    let mut cursor = 0;

    for (i, (child, slot)) in new.iter().zip(&new_slots).enumerate() {
        while cursor < old.len() && consumed[cursor] {
            cursor += 1;
        }
        let id = parent.child(slot);

        match old_index.get(slot.as_str()).copied() {
            Some(j) if same_kind(&old[j], child) => {
                consumed[j] = true;
                if j != cursor {
                    out.push(Patch::Move {
                        id: id.clone(),
                        index: i,
                    });
                }
                diff_node(&old[j], child, &id, out)?;
            }
            Some(j) => {
                // Incompatible node under the same identity: replace it
                consumed[j] = true;
                out.push(Patch::Remove { id: id.clone() });
                create_subtree(child, id, Some(parent.clone()), i, out)?;
            }
            None => create_subtree(child, id, Some(parent.clone()), i, out)?,
        }
    }

    for (j, slot) in old_slots.iter().enumerate() {
        if !consumed[j] {
            out.push(Patch::Remove {
                id: parent.child(slot),
            });
        }
    }
    Ok(())
}
