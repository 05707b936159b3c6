//! construct tree
//!
//! All nodes of one tree live in a single arena ([Tree]) shared by every handle ([Scope],
//! [Resource]) created from it. A node is either a grouping scope or an element. Children are kept
//! in insertion order, which is the order used for address assignment and emission.
//!
//! The tree is frozen by the first synthesis. Every later attempt to add children or change an
//! element fails with [Error::Frozen].
use crate::error::{Error, Result};
use crate::resource::{Resource, ResourceCore};
use crate::schema::is_identifier;
use crate::synth::Document;
use crate::token::{ElementId, TreeId};
use crate::AggregateValidationError;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Index of a node in its [Tree]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(pub(crate) usize);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);
}

#[derive(Debug)]
pub(crate) enum Content {
    Scope { prefix: Option<String> },
    Element(ResourceCore),
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) local_id: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: IndexMap<String, NodeId>,
    pub(crate) content: Content,
}

#[derive(Debug)]
pub(crate) struct Tree {
    pub(crate) id: TreeId,
    nodes: Vec<Node>,
    frozen: bool,
}

impl Tree {
    fn new() -> Self {
        Self {
            id: TreeId::next(),
            nodes: vec![Node {
                local_id: Scope::ROOT_ID.to_string(),
                parent: None,
                children: Default::default(),
                content: Content::Scope { prefix: None },
            }],
            frozen: false,
        }
    }

    /// Id the next inserted node will get
    pub(crate) fn next_node_id(&self) -> NodeId {
        NodeId(self.nodes.len())
    }

    /// Whether a child `local_id` may be added below `parent`
    pub(crate) fn check_insert(&self, parent: NodeId, local_id: &str) -> Result<()> {
        if self.frozen {
            return Err(Error::Frozen);
        }

        if !is_identifier(local_id) {
            return Err(Error::InvalidId(local_id.to_string()));
        }

        if self.node(parent).children.contains_key(local_id) {
            return Err(Error::DuplicateId {
                scope: self.display_path(parent),
                id: local_id.to_string(),
            });
        }

        Ok(())
    }

    pub(crate) fn insert(&mut self, parent: NodeId, local_id: &str, content: Content) -> Result<NodeId> {
        self.check_insert(parent, local_id)?;

        let id = self.next_node_id();
        self.nodes.push(Node {
            local_id: local_id.to_string(),
            parent: Some(parent),
            children: Default::default(),
            content,
        });
        self.nodes[parent.0].children.insert(local_id.to_string(), id);

        tracing::trace!(path = %self.path(id), "node added");
        Ok(id)
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub(crate) fn element(&self, id: NodeId) -> Option<&ResourceCore> {
        match &self.nodes.get(id.0)?.content {
            Content::Element(core) => Some(core),
            Content::Scope { .. } => None,
        }
    }

    /// Element `id` if it belongs to this tree
    pub(crate) fn lookup(&self, id: ElementId) -> Option<&ResourceCore> {
        if id.tree != self.id {
            return None;
        }
        self.element(id.node)
    }

    /// Local ids from below the root down to `id`, joined with `/`
    pub(crate) fn path(&self, id: NodeId) -> String {
        let mut ids: Vec<&str> = std::iter::once(id)
            .chain(self.ancestors(id))
            .filter(|node| *node != NodeId::ROOT)
            .map(|node| self.node(node).local_id.as_str())
            .collect();
        ids.reverse();
        ids.join("/")
    }

    /// [Tree::path], but the root is shown by its id
    pub(crate) fn display_path(&self, id: NodeId) -> String {
        if id == NodeId::ROOT {
            return Scope::ROOT_ID.to_string();
        }
        self.path(id)
    }

    /// Path a new child `local_id` of `parent` would get
    pub(crate) fn child_path(&self, parent: NodeId, local_id: &str) -> String {
        match self.path(parent) {
            parent_path if parent_path.is_empty() => local_id.to_string(),
            parent_path => format!("{parent_path}/{local_id}"),
        }
    }

    /// Parent, grandparent, ... up to and including the root
    pub(crate) fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.node(id).parent, |node| self.node(*node).parent)
    }

    /// All nodes, parents before children and siblings in insertion order
    pub(crate) fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![NodeId::ROOT];

        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id).children.values().rev().copied());
        }

        order
    }

    /// Name prefixes of the scopes around `id`, outermost first
    pub(crate) fn prefixes(&self, id: NodeId) -> Vec<&str> {
        let mut prefixes: Vec<&str> = self
            .ancestors(id)
            .filter_map(|node| match &self.node(node).content {
                Content::Scope {
                    prefix: Some(prefix),
                } => Some(prefix.as_str()),
                _ => None,
            })
            .collect();
        prefixes.reverse();
        prefixes
    }

    pub(crate) fn freeze(&mut self) {
        if !self.frozen {
            tracing::debug!(nodes = self.nodes.len(), "construct tree frozen");
        }
        self.frozen = true;
    }

    pub(crate) fn is_frozen(&self) -> bool {
        self.frozen
    }
}

/// Grouping node of a construct tree
///
/// Cloning a scope creates another handle to the same node.
#[derive(Clone)]
pub struct Scope {
    tree: Rc<RefCell<Tree>>,
    node: NodeId,
}

impl Scope {
    pub const ROOT_ID: &'static str = "root";

    /// Create a new tree and return its root
    pub fn root() -> Scope {
        Scope {
            tree: Rc::new(RefCell::new(Tree::new())),
            node: NodeId::ROOT,
        }
    }

    /// Add a grouping scope below `parent`
    pub fn new(parent: &Scope, id: &str) -> Result<Scope> {
        parent.add_scope(id, None)
    }

    /// Add a grouping scope whose `prefix` is prepended to the names of all elements below it
    pub fn with_prefix(parent: &Scope, id: &str, prefix: &str) -> Result<Scope> {
        if !is_identifier(prefix) {
            return Err(Error::InvalidId(prefix.to_string()));
        }
        parent.add_scope(id, Some(prefix.to_string()))
    }

    fn add_scope(&self, id: &str, prefix: Option<String>) -> Result<Scope> {
        let node = self
            .tree
            .borrow_mut()
            .insert(self.node, id, Content::Scope { prefix })?;

        Ok(Scope {
            tree: self.tree.clone(),
            node,
        })
    }

    pub(crate) fn from_parts(tree: Rc<RefCell<Tree>>, node: NodeId) -> Scope {
        Scope { tree, node }
    }

    pub(crate) fn tree(&self) -> &Rc<RefCell<Tree>> {
        &self.tree
    }

    pub(crate) fn node(&self) -> NodeId {
        self.node
    }

    pub fn id(&self) -> String {
        self.tree.borrow().node(self.node).local_id.clone()
    }

    /// Ids from below the root to this scope joined with `/`, empty for the root
    pub fn path(&self) -> String {
        self.tree.borrow().path(self.node)
    }

    pub fn prefix(&self) -> Option<String> {
        match &self.tree.borrow().node(self.node).content {
            Content::Scope { prefix } => prefix.clone(),
            Content::Element(_) => None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.node == NodeId::ROOT
    }

    pub fn parent(&self) -> Option<Scope> {
        let parent = self.tree.borrow().node(self.node).parent?;
        Some(Scope::from_parts(self.tree.clone(), parent))
    }

    /// Root of the tree this scope belongs to
    pub fn root_scope(&self) -> Scope {
        Scope::from_parts(self.tree.clone(), NodeId::ROOT)
    }

    pub fn is_frozen(&self) -> bool {
        self.tree.borrow().is_frozen()
    }

    /// Whether both handles point into the same tree
    pub fn same_tree(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree)
    }

    pub fn child(&self, id: &str) -> Option<Construct> {
        let node = *self.tree.borrow().node(self.node).children.get(id)?;
        Some(self.construct(node))
    }

    /// Direct children in insertion order
    pub fn children(&self) -> Vec<Construct> {
        let nodes: Vec<NodeId> = self
            .tree
            .borrow()
            .node(self.node)
            .children
            .values()
            .copied()
            .collect();

        nodes.into_iter().map(|node| self.construct(node)).collect()
    }

    /// Follow a `/` separated path of ids, starting at this scope
    pub fn find(&self, path: &str) -> Option<Construct> {
        let mut current = Construct::Scope(self.clone());
        for id in path.split('/').filter(|id| !id.is_empty()) {
            let Construct::Scope(scope) = current else {
                return None;
            };
            current = scope.child(id)?;
        }
        Some(current)
    }

    /// Every element below this scope, parents before children
    pub fn elements(&self) -> Vec<Resource> {
        let tree = self.tree.borrow();
        let nodes: Vec<NodeId> = tree
            .pre_order()
            .into_iter()
            .filter(|node| tree.element(*node).is_some())
            .filter(|node| tree.ancestors(*node).any(|ancestor| ancestor == self.node))
            .collect();
        drop(tree);

        nodes
            .into_iter()
            .map(|node| Resource::from_parts(self.tree.clone(), node))
            .collect()
    }

    /// Freeze the tree and turn it into a document, see [crate::synth]
    pub fn synthesize(&self) -> Result<Document, AggregateValidationError> {
        crate::synth::synthesize(self)
    }

    fn construct(&self, node: NodeId) -> Construct {
        if self.tree.borrow().element(node).is_some() {
            Construct::Element(Resource::from_parts(self.tree.clone(), node))
        } else {
            Construct::Scope(Scope::from_parts(self.tree.clone(), node))
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Scope")
            .field(&self.tree.borrow().display_path(self.node))
            .finish()
    }
}

/// Child of a [Scope]
#[derive(Debug, Clone)]
pub enum Construct {
    Scope(Scope),
    Element(Resource),
}

impl Construct {
    pub fn as_scope(&self) -> Option<&Scope> {
        match self {
            Construct::Scope(scope) => Some(scope),
            Construct::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&Resource> {
        match self {
            Construct::Element(element) => Some(element),
            Construct::Scope(_) => None,
        }
    }
}
