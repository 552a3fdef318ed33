//! Arena-backed program tree.
//!
//! Every node lives in one `Vec` owned by the [`Program`]; children and
//! parents are [`NodeId`] handles into it. Rewrites only rewire handles, so a
//! detached subtree simply becomes unreachable until the next [`Clone`], which
//! copies the reachable tree into a fresh, compact arena.

use crate::ast::node::{Category, NodeId, NodeKind};
use crate::error::{IndexError, ParentError};

/// One arena slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
}

impl Node {
    /// Payload of the node.
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Parent handle, `None` only for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// A critter genome: an ordered, first-match-wins list of rules.
#[derive(Debug)]
pub struct Program {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Program {
    /// Deep copy of the reachable tree with fresh parent links.
    fn clone(&self) -> Self {
        let mut out = Program {
            nodes: Vec::with_capacity(self.size()),
            root: NodeId(0),
        };
        out.root = out.copy_subtree(self, self.root);
        out
    }
}

impl Program {
    /// An empty program.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Program { rules: Vec::new() },
                parent: None,
            }],
            root: NodeId(0),
        }
    }

    /// Handle of the root node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Node behind a handle.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this program.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Payload behind a handle.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// Grammar category of a node.
    #[must_use]
    pub fn category(&self, id: NodeId) -> Category {
        self.kind(id).category()
    }

    /// Parent of a node. The root has none.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Parent of a node, failing for the root.
    ///
    /// # Errors
    ///
    /// Returns [`ParentError`] when `id` is the program root.
    pub fn parent_of(&self, id: NodeId) -> Result<NodeId, ParentError> {
        self.parent(id).ok_or(ParentError)
    }

    /// Rules in priority order.
    #[must_use]
    pub fn rules(&self) -> &[NodeId] {
        match self.kind(self.root) {
            NodeKind::Program { rules } => rules,
            _ => &[],
        }
    }

    /// Number of rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules().len()
    }

    /// Children of a node in addressing order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).children()
    }

    /// Node count of the whole program, root included.
    #[must_use]
    pub fn size(&self) -> usize {
        self.subtree_size(self.root)
    }

    /// Node count of the subtree rooted at `id`, `id` included.
    #[must_use]
    pub fn subtree_size(&self, id: NodeId) -> usize {
        1 + self
            .children(id)
            .into_iter()
            .map(|child| self.subtree_size(child))
            .sum::<usize>()
    }

    /// Pre-order addressing over the whole program.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] when `index` is not below [`size`](Self::size).
    pub fn node_at(&self, index: usize) -> Result<NodeId, IndexError> {
        self.subtree_node_at(self.root, index)
    }

    /// Pre-order addressing within the subtree rooted at `id`.
    ///
    /// Index 0 is `id` itself; each child's subtree occupies a contiguous
    /// range in child order.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] when `index` is outside `[0, subtree_size(id))`.
    pub fn subtree_node_at(&self, id: NodeId, index: usize) -> Result<NodeId, IndexError> {
        let size = self.subtree_size(id);
        if index >= size {
            return Err(IndexError { index, size });
        }
        let mut current = id;
        let mut remaining = index;
        'descend: while remaining > 0 {
            remaining -= 1;
            for child in self.children(current) {
                let child_size = self.subtree_size(child);
                if remaining < child_size {
                    current = child;
                    continue 'descend;
                }
                remaining -= child_size;
            }
            return Err(IndexError { index, size });
        }
        Ok(current)
    }

    /// Every node of the subtree in pre-order, so `descendants(id)[i]` is
    /// `subtree_node_at(id, i)`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    /// Deep copy a subtree of `src` into this arena. The copy is detached.
    pub fn copy_subtree(&mut self, src: &Program, id: NodeId) -> NodeId {
        let kind = src.kind(id).map_children(|child| self.copy_subtree(src, child));
        self.alloc(kind)
    }

    /// Deep copy a subtree of this program. The copy is detached.
    pub(crate) fn copy_within(&mut self, id: NodeId) -> NodeId {
        let kind = self.kind(id).clone();
        let kind = kind.map_children(|child| self.copy_within(child));
        self.alloc(kind)
    }

    /// Store a node and adopt its children.
    pub(crate) fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        for child in kind.children() {
            self.nodes[child.0].parent = Some(id);
        }
        self.nodes.push(Node { kind, parent: None });
        id
    }

    /// Append a detached rule to the program.
    pub fn push_rule(&mut self, rule: NodeId) {
        let root = self.root;
        if let NodeKind::Program { rules } = &mut self.nodes[root.0].kind {
            rules.push(rule);
            self.nodes[rule.0].parent = Some(root);
        }
    }

    /// Append a detached update to a rule.
    pub(crate) fn push_update(&mut self, rule: NodeId, update: NodeId) -> bool {
        if let NodeKind::Rule { updates, .. } = &mut self.nodes[rule.0].kind {
            updates.push(update);
            self.nodes[update.0].parent = Some(rule);
            true
        } else {
            false
        }
    }

    /// Drop `child` from a list or optional slot of `parent`.
    ///
    /// Only rules of a program, and updates or the action of a rule, live in
    /// such slots; any other pair is refused.
    pub(crate) fn detach(&mut self, parent: NodeId, child: NodeId) -> bool {
        let removed = match &mut self.nodes[parent.0].kind {
            NodeKind::Program { rules } => remove_from(rules, child),
            NodeKind::Rule {
                updates, action, ..
            } => {
                if *action == Some(child) {
                    *action = None;
                    true
                } else {
                    remove_from(updates, child)
                }
            }
            _ => false,
        };
        if removed {
            self.nodes[child.0].parent = None;
        }
        removed
    }

    /// Mutable payload, for rewrites that keep the child set intact.
    pub(crate) fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    /// Put `new` into the slot `old` occupies under `parent`.
    ///
    /// `old` is left detached. Returns `false` if `old` is not a child of `parent`.
    pub(crate) fn relink(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> bool {
        if !self.nodes[parent.0].kind.replace_child(old, new) {
            return false;
        }
        self.nodes[new.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
        true
    }

    /// Replace `old` by `new` in whatever slot it occupies.
    pub(crate) fn replace(&mut self, old: NodeId, new: NodeId) -> bool {
        match self.parent(old) {
            Some(parent) => self.relink(parent, old, new),
            None => false,
        }
    }

    /// Drop garbage left behind by rewrites.
    pub(crate) fn compact(&mut self) {
        *self = self.clone();
    }

    /// Number of arena slots, reachable or not.
    #[must_use]
    pub(crate) fn arena_len(&self) -> usize {
        self.nodes.len()
    }
}

fn remove_from(list: &mut Vec<NodeId>, id: NodeId) -> bool {
    match list.iter().position(|&item| item == id) {
        Some(at) => {
            list.remove(at);
            true
        }
        None => false,
    }
}
