//! Node and edge entities. All cross-references are arena ids owned by the
//! `Document`; the structs here carry no pointers.

use crate::geometry::{Point, Rect, Shape};

/// Stable handle into the document's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Stable handle into the document's edge arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Solid parent-to-child link, owned by the child's parent slot.
    Hierarchical,
    /// Dashed symmetric link, registered in both endpoints' peer lists.
    Peer,
}

/// A rendered line between two node boundaries. `p1`/`p2` are kept anchored
/// by the geometry module whenever either endpoint moves or changes shape.
/// For hierarchical edges `a` is the parent and `b` the child.
#[derive(Debug, Clone)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    pub kind: EdgeKind,
    pub p1: Point,
    pub p2: Point,
    pub visible: bool,
}

#[derive(Debug, Clone)]
pub struct Node {
    /// Top-left corner in document space.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub shape: Shape,
    pub text: String,
    pub notes: String,
    /// Fill color as `#rrggbb`.
    pub color: String,
    /// Display font. Carried for the UI collaborator, not persisted.
    pub font_family: String,
    pub font_size: f32,
    /// Depth from the root: 0 for the root, parent.level + 1 otherwise.
    pub level: usize,
    pub collapsed: bool,
    /// Derived: AND of `!collapsed` over all strict ancestors. Maintained by
    /// the document's visibility pass, never set directly.
    pub visible: bool,
    pub children: Vec<NodeId>,
    pub peers: Vec<(NodeId, EdgeId)>,
    pub parent: Option<(NodeId, EdgeId)>,
}

impl Node {
    pub fn new(x: f32, y: f32, text: &str, color: &str, shape: Shape, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            shape,
            text: text.to_string(),
            notes: String::new(),
            color: color.to_string(),
            font_family: "Arial".to_string(),
            font_size: 10.0,
            level: 0,
            collapsed: false,
            visible: true,
            children: Vec::new(),
            peers: Vec::new(),
            parent: None,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn half_extents(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_and_bounds() {
        let node = Node::new(10.0, 20.0, "idea", "#ffff00", Shape::Ellipse, 100.0, 60.0);
        let c = node.center();
        assert_eq!((c.x, c.y), (60.0, 50.0));
        let b = node.bounds();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (10.0, 20.0, 110.0, 80.0));
    }
}
