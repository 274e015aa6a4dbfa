//! The in-memory mind-map document: an arena of nodes and edges addressed by
//! stable ids, plus every mutation the UI collaborator drives.
//!
//! All references between nodes (parent, children, peers, edge endpoints) are
//! arena indices, so there are no ownership cycles and serialization is a
//! straight index walk. Slots are never reused within a session, which keeps
//! insertion order stable for the on-disk index assignment.

use std::collections::HashSet;

use crate::config::NodeDefaults;
use crate::error::{DocumentError, Result};
use crate::geometry::{self, Point, Rect, Shape};
use crate::node::{Edge, EdgeId, EdgeKind, Node, NodeId};

/// How user gestures create edges. The document only stores the setting; the
/// UI reads it to decide which connect entry point to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    Automatic,
    Manual,
    Hierarchical,
}

impl ConnectionMode {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "automatic" => Some(Self::Automatic),
            "manual" => Some(Self::Manual),
            "hierarchical" => Some(Self::Hierarchical),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Manual => "manual",
            Self::Hierarchical => "hierarchical",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Option<Node>>,
    edges: Vec<Option<Edge>>,
    root: Option<NodeId>,
    pub connection_mode: ConnectionMode,
    defaults: NodeDefaults,
}

impl Document {
    pub fn new() -> Self {
        Self::with_defaults(NodeDefaults::default())
    }

    pub fn with_defaults(defaults: NodeDefaults) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            root: None,
            connection_mode: ConnectionMode::Automatic,
            defaults,
        }
    }

    pub fn defaults(&self) -> &NodeDefaults {
        &self.defaults
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0).and_then(|slot| slot.as_ref())
    }

    /// Live node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|_| NodeId(idx)))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|edge| (EdgeId(idx), edge)))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// Union of all node bounds, the content region for image export.
    pub fn content_bounds(&self) -> Option<Rect> {
        let mut bounds: Option<Rect> = None;
        for id in self.node_ids() {
            if let Some(node) = self.node(id) {
                let b = node.bounds();
                bounds = Some(match bounds {
                    Some(acc) => acc.union(&b),
                    None => b,
                });
            }
        }
        bounds
    }

    // ---- creation ----------------------------------------------------------

    /// Free-floating node at the given document position.
    pub fn add_node(&mut self, x: f32, y: f32) -> NodeId {
        let node = Node::new(
            x,
            y,
            &self.defaults.default_text,
            &self.defaults.default_color,
            Shape::Ellipse,
            self.defaults.width,
            self.defaults.height,
        );
        self.insert_node(node)
    }

    /// The "central topic" gesture: the first call creates the root with its
    /// distinguished size and color; later calls fall back to a plain node.
    pub fn add_central_topic(&mut self, x: f32, y: f32) -> NodeId {
        if self.root.is_some() {
            let id = self.add_node(x, y);
            let text = self.defaults.topic_text.clone();
            if let Some(node) = self.node_slot_mut(id) {
                node.text = text;
            }
            return id;
        }
        let node = Node::new(
            x,
            y,
            &self.defaults.root_text,
            &self.defaults.root_color,
            Shape::Ellipse,
            self.defaults.root_width,
            self.defaults.root_height,
        );
        let id = self.insert_node(node);
        self.root = Some(id);
        id
    }

    /// New child under `parent`: level is parent.level + 1, color comes from
    /// the level table, placement fans out horizontally under the root and
    /// cascades vertically below deeper parents. A collapsed parent hides the
    /// new child immediately.
    pub fn add_child(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        let (px, py, parent_level, sibling_count) = {
            let p = self.try_node(parent)?;
            (p.x, p.y, p.level, p.children.len())
        };

        let level = parent_level + 1;
        let k = sibling_count as f32;
        let (x, y) = if parent_level == 0 {
            (
                px + self.defaults.root_child_offset_x,
                py + k / 2.0 * self.defaults.root_child_spread_y,
            )
        } else {
            (
                px + self.defaults.branch_child_offset_x,
                py + self.defaults.branch_child_base_y + k * self.defaults.branch_child_step_y,
            )
        };

        let (width, height) = self.defaults.size_for_level(level);
        let color = self.defaults.color_for_level(level);
        let mut node = Node::new(x, y, text, &color, Shape::Ellipse, width, height);
        node.level = level;

        let id = self.insert_node(node);
        self.link_parent(parent, id);
        self.refresh_visibility();
        self.check_invariants();
        Ok(id)
    }

    // ---- peer connections --------------------------------------------------

    /// Manual-mode connect: exactly two selected nodes become peers.
    pub fn connect_selection(&mut self, selection: &[NodeId]) -> Result<EdgeId> {
        if selection.len() != 2 {
            return Err(DocumentError::SelectionArity(selection.len()));
        }
        self.create_peer_edge(selection[0], selection[1])
    }

    /// Automatic-mode connect: a drag that starts on one node and ends on
    /// another.
    pub fn connect_drag(&mut self, from: NodeId, to: NodeId) -> Result<EdgeId> {
        self.create_peer_edge(from, to)
    }

    fn create_peer_edge(&mut self, a: NodeId, b: NodeId) -> Result<EdgeId> {
        if a == b {
            return Err(DocumentError::SelfConnection);
        }
        self.try_node(a)?;
        self.try_node(b)?;
        let already = self
            .node(a)
            .map(|node| node.peers.iter().any(|(other, _)| *other == b))
            .unwrap_or(false);
        if already {
            return Err(DocumentError::DuplicateConnection);
        }

        let eid = self.alloc_edge(Edge {
            a,
            b,
            kind: EdgeKind::Peer,
            p1: Point::default(),
            p2: Point::default(),
            visible: true,
        });
        if let Some(node) = self.node_slot_mut(a) {
            node.peers.push((b, eid));
        }
        if let Some(node) = self.node_slot_mut(b) {
            node.peers.push((a, eid));
        }
        self.anchor_edge(eid);
        self.refresh_visibility();
        self.check_invariants();
        Ok(eid)
    }

    // ---- mutation ----------------------------------------------------------

    /// Rigid subtree drag: the node and every descendant shift by the same
    /// delta, and every edge touching the moved set is re-anchored.
    pub fn move_node(&mut self, id: NodeId, dx: f32, dy: f32) -> Result<()> {
        self.try_node(id)?;
        let moved = self.subtree(id);
        for &nid in &moved {
            if let Some(node) = self.node_slot_mut(nid) {
                node.x += dx;
                node.y += dy;
            }
        }
        let mut touched: HashSet<EdgeId> = HashSet::new();
        for &nid in &moved {
            for eid in self.incident_edges(nid) {
                touched.insert(eid);
            }
        }
        for eid in touched {
            self.anchor_edge(eid);
        }
        Ok(())
    }

    /// Place a single node at an absolute position, re-anchoring its incident
    /// edges. Used by the layout engine; does not drag descendants along.
    pub fn set_position(&mut self, id: NodeId, x: f32, y: f32) -> Result<()> {
        let node = self.try_node_mut(id)?;
        node.x = x;
        node.y = y;
        self.refresh_incident_edges(id);
        Ok(())
    }

    /// Toggle ellipse/rectangle. Size and topology are untouched; incident
    /// edges are re-anchored against the new outline.
    pub fn set_shape(&mut self, id: NodeId, shape: Shape) -> Result<()> {
        self.try_node_mut(id)?.shape = shape;
        self.refresh_incident_edges(id);
        Ok(())
    }

    pub fn resize(&mut self, id: NodeId, width: f32, height: f32) -> Result<()> {
        let node = self.try_node_mut(id)?;
        node.width = width;
        node.height = height;
        self.refresh_incident_edges(id);
        Ok(())
    }

    pub fn set_color(&mut self, id: NodeId, color: &str) -> Result<()> {
        self.try_node_mut(id)?.color = color.to_string();
        Ok(())
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<()> {
        self.try_node_mut(id)?.text = text.to_string();
        Ok(())
    }

    pub fn set_notes(&mut self, id: NodeId, notes: &str) -> Result<()> {
        self.try_node_mut(id)?.notes = notes.to_string();
        Ok(())
    }

    pub fn set_font(&mut self, id: NodeId, family: &str, size: f32) -> Result<()> {
        let node = self.try_node_mut(id)?;
        node.font_family = family.to_string();
        node.font_size = size;
        Ok(())
    }

    /// Flip the collapsed flag and recompute visibility for the whole
    /// document: a node is visible iff no strict ancestor is collapsed, and an
    /// edge is visible iff both endpoints are. A child's own collapsed flag
    /// survives the parent toggling, so re-expanding keeps its subtree hidden.
    pub fn toggle_collapse(&mut self, id: NodeId) -> Result<()> {
        let node = self.try_node_mut(id)?;
        node.collapsed = !node.collapsed;
        self.refresh_visibility();
        Ok(())
    }

    /// Depth-first cascade: the node, all descendants, and every edge touching
    /// any of them are removed. Deleting the root clears the root reference.
    pub fn delete_node(&mut self, id: NodeId) -> Result<()> {
        self.try_node(id)?;
        let doomed = self.subtree(id);

        for &nid in &doomed {
            let (peers, parent) = {
                let Some(node) = self.node(nid) else { continue };
                (node.peers.clone(), node.parent)
            };
            for (other, eid) in peers {
                self.edges[eid.0] = None;
                if let Some(other_node) = self.node_slot_mut(other) {
                    other_node.peers.retain(|(peer, _)| *peer != nid);
                }
            }
            if let Some((pid, eid)) = parent {
                self.edges[eid.0] = None;
                if let Some(parent_node) = self.node_slot_mut(pid) {
                    parent_node.children.retain(|child| *child != nid);
                }
            }
            self.nodes[nid.0] = None;
        }

        if let Some(root) = self.root
            && doomed.contains(&root)
        {
            self.root = None;
        }
        self.refresh_visibility();
        self.check_invariants();
        Ok(())
    }

    // ---- queries -----------------------------------------------------------

    /// The node and all its descendants in depth-first order (node first).
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(nid) = stack.pop() {
            let Some(node) = self.node(nid) else { continue };
            out.push(nid);
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    pub fn subtree_size(&self, id: NodeId) -> usize {
        self.subtree(id).len()
    }

    // ---- internals ---------------------------------------------------------

    pub(crate) fn insert_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(node));
        id
    }

    pub(crate) fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Wire a hierarchical edge from `parent` to `child`. The caller is
    /// responsible for the child's level.
    pub(crate) fn link_parent(&mut self, parent: NodeId, child: NodeId) -> EdgeId {
        let eid = self.alloc_edge(Edge {
            a: parent,
            b: child,
            kind: EdgeKind::Hierarchical,
            p1: Point::default(),
            p2: Point::default(),
            visible: true,
        });
        if let Some(parent_node) = self.node_slot_mut(parent) {
            parent_node.children.push(child);
        }
        if let Some(child_node) = self.node_slot_mut(child) {
            child_node.parent = Some((parent, eid));
        }
        self.anchor_edge(eid);
        eid
    }

    pub(crate) fn link_peers(&mut self, a: NodeId, b: NodeId) -> Result<EdgeId> {
        self.create_peer_edge(a, b)
    }

    fn try_node(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or(DocumentError::UnknownNode(id))
    }

    fn try_node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .ok_or(DocumentError::UnknownNode(id))
    }

    fn node_slot_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    fn alloc_edge(&mut self, edge: Edge) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(Some(edge));
        id
    }

    /// Every edge with `id` as an endpoint: the parent edge, peer edges, and
    /// each child's parent edge.
    fn incident_edges(&self, id: NodeId) -> Vec<EdgeId> {
        let mut out = Vec::new();
        let Some(node) = self.node(id) else {
            return out;
        };
        if let Some((_, eid)) = node.parent {
            out.push(eid);
        }
        for &(_, eid) in &node.peers {
            out.push(eid);
        }
        for &child in &node.children {
            if let Some(child_node) = self.node(child)
                && let Some((_, eid)) = child_node.parent
            {
                out.push(eid);
            }
        }
        out
    }

    pub(crate) fn refresh_incident_edges(&mut self, id: NodeId) {
        for eid in self.incident_edges(id) {
            self.anchor_edge(eid);
        }
    }

    /// Recompute both boundary anchor points of one edge.
    pub(crate) fn anchor_edge(&mut self, eid: EdgeId) {
        let Some(edge) = self.edges.get(eid.0).and_then(|slot| slot.as_ref()) else {
            return;
        };
        let (a, b) = (edge.a, edge.b);
        let (Some(na), Some(nb)) = (self.node(a), self.node(b)) else {
            return;
        };
        let (ca, cb) = (na.center(), nb.center());
        let (aw, ah) = na.half_extents();
        let (bw, bh) = nb.half_extents();
        let p1 = geometry::boundary_point(na.shape, ca, aw, ah, cb);
        let p2 = geometry::boundary_point(nb.shape, cb, bw, bh, ca);
        if let Some(edge) = self.edges.get_mut(eid.0).and_then(|slot| slot.as_mut()) {
            edge.p1 = p1;
            edge.p2 = p2;
        }
    }

    /// Whole-document visibility pass: node visibility is the AND of
    /// `!collapsed` along the ancestor path, edge visibility follows its
    /// endpoints.
    pub(crate) fn refresh_visibility(&mut self) {
        let ids: Vec<NodeId> = self.node_ids().collect();
        for id in ids {
            let mut visible = true;
            let mut cursor = self.node(id).and_then(|node| node.parent);
            while let Some((pid, _)) = cursor {
                let Some(ancestor) = self.node(pid) else { break };
                if ancestor.collapsed {
                    visible = false;
                    break;
                }
                cursor = ancestor.parent;
            }
            if let Some(node) = self.node_slot_mut(id) {
                node.visible = visible;
            }
        }

        for idx in 0..self.edges.len() {
            let Some(edge) = self.edges[idx].as_ref() else {
                continue;
            };
            let visible = self.node(edge.a).map(|n| n.visible).unwrap_or(false)
                && self.node(edge.b).map(|n| n.visible).unwrap_or(false);
            if let Some(edge) = self.edges[idx].as_mut() {
                edge.visible = visible;
            }
        }
    }

    /// Structural consistency checks. Violations are programming errors, so
    /// these are debug-build assertions, not recoverable results.
    #[cfg(debug_assertions)]
    pub(crate) fn check_invariants(&self) {
        for id in self.node_ids() {
            let Some(node) = self.node(id) else { continue };
            match node.parent {
                None => debug_assert_eq!(node.level, 0, "orphan node {id:?} must be level 0"),
                Some((pid, _)) => {
                    let parent = self.node(pid).expect("parent slot must be live");
                    debug_assert_eq!(
                        node.level,
                        parent.level + 1,
                        "level of {id:?} must be parent level + 1"
                    );
                    debug_assert!(
                        parent.children.contains(&id),
                        "{id:?} missing from parent {pid:?} children"
                    );
                }
            }
            debug_assert!(!node.children.contains(&id), "{id:?} is its own child");
            for &(peer, eid) in &node.peers {
                debug_assert_ne!(peer, id, "{id:?} is its own peer");
                let edge = self.edge(eid).expect("peer edge slot must be live");
                debug_assert_eq!(edge.kind, EdgeKind::Peer);
                let other = self.node(peer).expect("peer node slot must be live");
                debug_assert!(
                    other.peers.iter().any(|(n, e)| *n == id && *e == eid),
                    "peer edge {eid:?} not symmetric"
                );
            }
            for &child in &node.children {
                let child_node = self.node(child).expect("child slot must be live");
                debug_assert_eq!(child_node.parent.map(|(pid, _)| pid), Some(id));
            }
        }
        if let Some(root) = self.root {
            debug_assert!(self.node(root).is_some(), "root must be live");
            debug_assert_eq!(self.node(root).map(|n| n.level), Some(0));
        }
    }

    #[cfg(not(debug_assertions))]
    pub(crate) fn check_invariants(&self) {}
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
