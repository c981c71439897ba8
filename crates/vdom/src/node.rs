//! Virtual element tree
//!
//! A [`VNode`] is a closed tagged variant: host elements, text leaves, and
//! named components wrapping their rendered subtree. Trees are produced fresh
//! on every render and never mutated in place.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single prop value.
///
/// Listeners are referenced by event name; the closure side lives with the
/// component that rendered them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Listener(String),
}

impl PropValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

/// Ordered prop map; ordering keeps diffs and serialized output stable.
pub type Props = BTreeMap<String, PropValue>;

/// A host element: tag, optional sibling key, props and ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostElement {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub props: Props,
    #[serde(default)]
    pub children: Vec<VNode>,
}

impl HostElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            key: None,
            props: Props::new(),
            children: Vec::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    pub fn with_listener(mut self, name: impl Into<String>, event: impl Into<String>) -> Self {
        self.props
            .insert(name.into(), PropValue::Listener(event.into()));
        self
    }

    pub fn with_child(mut self, child: impl Into<VNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<VNode>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }
}

/// A component boundary. `identity` names the component; `rendered` is the
/// subtree it produced on this pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentNode {
    pub identity: String,
    pub rendered: Box<VNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum VNode {
    Host(HostElement),
    Text(String),
    Component(ComponentNode),
}

impl VNode {
    pub fn text(text: impl Into<String>) -> Self {
        VNode::Text(text.into())
    }

    pub fn component(identity: impl Into<String>, rendered: impl Into<VNode>) -> Self {
        VNode::Component(ComponentNode {
            identity: identity.into(),
            rendered: Box::new(rendered.into()),
        })
    }

    /// Follow component boundaries down to the first host or text node
    pub fn resolve(&self) -> &VNode {
        let mut node = self;
        while let VNode::Component(component) = node {
            node = &component.rendered;
        }
        node
    }

    pub fn as_element(&self) -> Option<&HostElement> {
        match self {
            VNode::Host(element) => Some(element),
            _ => None,
        }
    }

    /// Children of a host element; empty for text and components
    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Host(element) => &element.children,
            _ => &[],
        }
    }

    /// Sibling identity of this node at position `index` among its siblings.
    ///
    /// Explicit keys are used verbatim (escaped), components use their
    /// identity, everything else falls back to its index.
    pub fn slot(&self, index: usize) -> String {
        match self {
            VNode::Host(HostElement { key: Some(key), .. }) => escape_segment(key),
            VNode::Component(component) => format!("@{}", escape_segment(&component.identity)),
            _ => format!("#{index}"),
        }
    }

    /// The tree as a host runtime sees it: every component replaced by its
    /// rendered subtree.
    pub fn host_projection(&self) -> VNode {
        match self.resolve() {
            VNode::Host(element) => VNode::Host(HostElement {
                tag: element.tag.clone(),
                key: element.key.clone(),
                props: element.props.clone(),
                children: element.children.iter().map(VNode::host_projection).collect(),
            }),
            other => other.clone(),
        }
    }

    /// Number of host and text nodes in the tree
    pub fn node_count(&self) -> usize {
        match self.resolve() {
            VNode::Host(element) => {
                1 + element.children.iter().map(VNode::node_count).sum::<usize>()
            }
            _ => 1,
        }
    }
}

impl From<HostElement> for VNode {
    fn from(element: HostElement) -> Self {
        VNode::Host(element)
    }
}

impl From<&str> for VNode {
    fn from(text: &str) -> Self {
        VNode::Text(text.to_string())
    }
}

impl From<String> for VNode {
    fn from(text: String) -> Self {
        VNode::Text(text)
    }
}

/// Path-qualified node identity: the slots from the root down to a node,
/// joined with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Identity of a root node occupying `slot`
    pub fn root(slot: &str) -> Self {
        NodeId(slot.to_string())
    }

    pub fn child(&self, slot: &str) -> Self {
        NodeId(format!("{}/{}", self.0, slot))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of path segments (a root has depth 1)
    pub fn depth(&self) -> usize {
        self.0.split('/').count()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escape a key so it cannot collide with path separators or implicit slots.
fn escape_segment(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, ch) in key.chars().enumerate() {
        match ch {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '#' if i == 0 => out.push_str("%23"),
            '@' if i == 0 => out.push_str("%40"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots() {
        let keyed: VNode = HostElement::new("div").with_key("3,4").into();
        assert_eq!(keyed.slot(7), "3,4");

        let unkeyed: VNode = HostElement::new("div").into();
        assert_eq!(unkeyed.slot(7), "#7");
        assert_eq!(VNode::text("x").slot(2), "#2");

        let component = VNode::component("Sidebar", HostElement::new("div").with_key("sidebar"));
        assert_eq!(component.slot(1), "@Sidebar");
    }

    #[test]
    fn test_explicit_keys_cannot_collide_with_implicit_slots() {
        let tricky: VNode = HostElement::new("div").with_key("#0").into();
        assert_eq!(tricky.slot(0), "%230");

        let nested: VNode = HostElement::new("div").with_key("a/b").into();
        assert_eq!(nested.slot(0), "a%2Fb");
    }

    #[test]
    fn test_node_id_paths() {
        let root = NodeId::root("app");
        let cell = root.child("board").child("3,4");
        assert_eq!(cell.as_str(), "app/board/3,4");
        assert_eq!(cell.depth(), 3);
        assert_eq!(cell.to_string(), "app/board/3,4");
    }

    #[test]
    fn test_host_projection_inlines_components() {
        let tree: VNode = HostElement::new("div")
            .with_child(VNode::component(
                "Outer",
                VNode::component("Inner", HostElement::new("span").with_child("hi")),
            ))
            .into();

        let expected: VNode = HostElement::new("div")
            .with_child(HostElement::new("span").with_child("hi"))
            .into();
        assert_eq!(tree.host_projection(), expected);
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_serialized_shape() {
        let node: VNode = HostElement::new("div")
            .with_key("score")
            .with_prop("tabindex", 0i64)
            .with_child("Score: 0")
            .into();

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "host");
        assert_eq!(json["value"]["tag"], "div");
        assert_eq!(json["value"]["key"], "score");
        assert_eq!(json["value"]["props"]["tabindex"]["int"], 0);
        assert_eq!(json["value"]["children"][0]["type"], "text");

        let back: VNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }
}
