//! JSON persistence.
//!
//! The on-disk format is a flat node list with per-node child index lists,
//! peer connections stored once as `[i, j]` pairs with i < j, and the root's
//! index (or -1). Indices are assigned from the in-memory insertion order at
//! save time. Loading is atomic: the whole file is validated and a fresh
//! document built before anything is returned, so a failed load leaves the
//! caller's document untouched.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::{DocumentError, Result};
use crate::geometry::Shape;
use crate::node::{EdgeKind, Node, NodeId};

#[derive(Debug, Serialize, Deserialize)]
struct NodeRecord {
    id: usize,
    x: f32,
    y: f32,
    text: String,
    color: String,
    node_type: String,
    width: f32,
    height: f32,
    level: usize,
    notes: String,
    collapsed: bool,
    children: Vec<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DocumentRecord {
    nodes: Vec<NodeRecord>,
    connections: Vec<[usize; 2]>,
    root_node_index: i64,
}

pub fn to_json(doc: &Document) -> Result<String> {
    let record = build_record(doc);
    Ok(serde_json::to_string_pretty(&record)?)
}

pub fn save_document(doc: &Document, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let record = build_record(doc);
    serde_json::to_writer_pretty(writer, &record)?;
    Ok(())
}

pub fn from_json(input: &str) -> Result<Document> {
    let record: DocumentRecord = serde_json::from_str(input)?;
    build_document(record)
}

pub fn load_document(path: &Path) -> Result<Document> {
    let contents = std::fs::read_to_string(path)?;
    from_json(&contents)
}

fn build_record(doc: &Document) -> DocumentRecord {
    let ids: Vec<NodeId> = doc.node_ids().collect();
    let index_of: HashMap<NodeId, usize> =
        ids.iter().enumerate().map(|(idx, &id)| (id, idx)).collect();

    let mut nodes = Vec::with_capacity(ids.len());
    let mut root_node_index = -1;
    for (idx, &id) in ids.iter().enumerate() {
        let Some(node) = doc.node(id) else { continue };
        if doc.root() == Some(id) {
            root_node_index = idx as i64;
        }
        nodes.push(NodeRecord {
            id: idx,
            x: node.x,
            y: node.y,
            text: node.text.clone(),
            color: node.color.clone(),
            node_type: node.shape.token().to_string(),
            width: node.width,
            height: node.height,
            level: node.level,
            notes: node.notes.clone(),
            collapsed: node.collapsed,
            children: node
                .children
                .iter()
                .filter_map(|child| index_of.get(child).copied())
                .collect(),
        });
    }

    // Each peer edge lives in the arena exactly once, emitted as i < j.
    let mut connections = Vec::new();
    for (_, edge) in doc.edges() {
        if edge.kind != EdgeKind::Peer {
            continue;
        }
        if let (Some(&i), Some(&j)) = (index_of.get(&edge.a), index_of.get(&edge.b)) {
            connections.push([i.min(j), i.max(j)]);
        }
    }

    DocumentRecord {
        nodes,
        connections,
        root_node_index,
    }
}

fn build_document(record: DocumentRecord) -> Result<Document> {
    let len = record.nodes.len();

    if record.root_node_index < -1 || record.root_node_index >= len as i64 {
        return Err(DocumentError::IndexOutOfRange {
            context: "root",
            index: record.root_node_index.max(0) as usize,
            len,
        });
    }

    // Resolve and validate the hierarchy before touching any document state.
    let mut parent_of: Vec<Option<usize>> = vec![None; len];
    for (idx, node) in record.nodes.iter().enumerate() {
        for &child in &node.children {
            if child >= len {
                return Err(DocumentError::IndexOutOfRange {
                    context: "child",
                    index: child,
                    len,
                });
            }
            if child == idx {
                return Err(DocumentError::InvalidHierarchy {
                    index: child,
                    reason: "node listed as its own child",
                });
            }
            if parent_of[child].is_some() {
                return Err(DocumentError::InvalidHierarchy {
                    index: child,
                    reason: "node listed as a child of two parents",
                });
            }
            parent_of[child] = Some(idx);
        }
    }
    for (idx, node) in record.nodes.iter().enumerate() {
        match parent_of[idx] {
            Some(parent) => {
                if node.level != record.nodes[parent].level + 1 {
                    return Err(DocumentError::InvalidHierarchy {
                        index: idx,
                        reason: "level must be parent level + 1",
                    });
                }
            }
            None => {
                if node.level != 0 {
                    return Err(DocumentError::InvalidHierarchy {
                        index: idx,
                        reason: "unparented node must be level 0",
                    });
                }
            }
        }
    }

    // The levels are consistent at this point, so level 0 also means
    // unparented.
    if record.root_node_index >= 0 {
        let idx = record.root_node_index as usize;
        if record.nodes[idx].level != 0 {
            return Err(DocumentError::InvalidHierarchy {
                index: idx,
                reason: "root must be an unparented level 0 node",
            });
        }
    }

    let mut doc = Document::new();
    let mut ids = Vec::with_capacity(len);
    for node_record in &record.nodes {
        validate_color(&node_record.color)?;
        let shape = Shape::from_token(&node_record.node_type)
            .ok_or_else(|| DocumentError::InvalidShape(node_record.node_type.clone()))?;
        let mut node = Node::new(
            node_record.x,
            node_record.y,
            &node_record.text,
            &node_record.color,
            shape,
            node_record.width,
            node_record.height,
        );
        node.level = node_record.level;
        node.notes = node_record.notes.clone();
        node.collapsed = node_record.collapsed;
        ids.push(doc.insert_node(node));
    }

    if record.root_node_index >= 0 {
        doc.set_root(ids[record.root_node_index as usize]);
    }

    for (idx, node_record) in record.nodes.iter().enumerate() {
        for &child in &node_record.children {
            doc.link_parent(ids[idx], ids[child]);
        }
    }

    for [i, j] in &record.connections {
        if *i >= len || *j >= len {
            return Err(DocumentError::IndexOutOfRange {
                context: "connection",
                index: (*i).max(*j),
                len,
            });
        }
        if i == j {
            return Err(DocumentError::SelfConnection);
        }
        match doc.link_peers(ids[*i], ids[*j]) {
            Ok(_) => {}
            // A connection stored twice collapses to one edge.
            Err(DocumentError::DuplicateConnection) => {}
            Err(err) => return Err(err),
        }
    }

    doc.refresh_visibility();
    doc.check_invariants();
    Ok(doc)
}

fn validate_color(color: &str) -> Result<()> {
    let hex = color.strip_prefix('#').unwrap_or("");
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Ok(());
    }
    Err(DocumentError::InvalidColor(color.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;

    fn sample_doc() -> Document {
        let mut doc = Document::new();
        let root = doc.add_central_topic(12.5, -4.0);
        let a = doc.add_child(root, "alpha").unwrap();
        let b = doc.add_child(root, "beta").unwrap();
        let a1 = doc.add_child(a, "alpha one").unwrap();
        doc.set_shape(b, Shape::Rectangle).unwrap();
        doc.set_notes(a, "remember this").unwrap();
        doc.set_color(a1, "#123abc").unwrap();
        doc.toggle_collapse(a).unwrap();
        doc.connect_drag(b, a1).unwrap();
        doc
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let doc = sample_doc();
        let json = to_json(&doc).unwrap();
        let loaded = from_json(&json).unwrap();

        assert_eq!(loaded.node_count(), doc.node_count());
        let original: Vec<NodeId> = doc.node_ids().collect();
        let restored: Vec<NodeId> = loaded.node_ids().collect();
        for (&o, &r) in original.iter().zip(&restored) {
            let a = doc.node(o).unwrap();
            let b = loaded.node(r).unwrap();
            assert_eq!(a.text, b.text);
            assert_eq!(a.notes, b.notes);
            assert_eq!(a.color, b.color);
            assert_eq!(a.shape, b.shape);
            assert_eq!((a.x, a.y), (b.x, b.y));
            assert_eq!((a.width, a.height), (b.width, b.height));
            assert_eq!(a.level, b.level);
            assert_eq!(a.collapsed, b.collapsed);
            assert_eq!(a.children.len(), b.children.len());
            assert_eq!(a.peers.len(), b.peers.len());
        }

        let root_a = doc.root().map(|id| original.iter().position(|&n| n == id));
        let root_b = loaded.root().map(|id| restored.iter().position(|&n| n == id));
        assert_eq!(root_a, root_b);

        let count = |d: &Document, kind| d.edges().filter(|(_, e)| e.kind == kind).count();
        assert_eq!(
            count(&doc, EdgeKind::Hierarchical),
            count(&loaded, EdgeKind::Hierarchical)
        );
        assert_eq!(count(&doc, EdgeKind::Peer), count(&loaded, EdgeKind::Peer));
    }

    #[test]
    fn peer_connections_written_once_with_low_index_first() {
        let doc = sample_doc();
        let value: serde_json::Value = serde_json::from_str(&to_json(&doc).unwrap()).unwrap();
        let connections = value["connections"].as_array().unwrap();
        assert_eq!(connections.len(), 1);
        let pair = connections[0].as_array().unwrap();
        assert!(pair[0].as_u64().unwrap() < pair[1].as_u64().unwrap());
    }

    #[test]
    fn collapsed_state_propagates_on_load() {
        let doc = sample_doc();
        let loaded = from_json(&to_json(&doc).unwrap()).unwrap();
        let restored: Vec<NodeId> = loaded.node_ids().collect();
        // Node 3 ("alpha one") sits under the collapsed "alpha".
        assert!(!loaded.node(restored[3]).unwrap().visible);
        let parent_edge = loaded.node(restored[3]).unwrap().parent.unwrap().1;
        assert!(!loaded.edge(parent_edge).unwrap().visible);
    }

    #[test]
    fn out_of_range_child_is_malformed() {
        let json = r##"{
            "nodes": [{"id": 0, "x": 0, "y": 0, "text": "t", "color": "#ffffff",
                       "node_type": "ellipse", "width": 100, "height": 60,
                       "level": 0, "notes": "", "collapsed": false, "children": [7]}],
            "connections": [],
            "root_node_index": 0
        }"##;
        assert!(matches!(
            from_json(json),
            Err(DocumentError::IndexOutOfRange { context: "child", index: 7, .. })
        ));
    }

    #[test]
    fn out_of_range_connection_is_malformed() {
        let json = r##"{
            "nodes": [{"id": 0, "x": 0, "y": 0, "text": "t", "color": "#ffffff",
                       "node_type": "ellipse", "width": 100, "height": 60,
                       "level": 0, "notes": "", "collapsed": false, "children": []}],
            "connections": [[0, 5]],
            "root_node_index": -1
        }"##;
        assert!(matches!(
            from_json(json),
            Err(DocumentError::IndexOutOfRange { context: "connection", .. })
        ));
    }

    #[test]
    fn invalid_color_and_shape_are_malformed() {
        let bad_color = r#"{
            "nodes": [{"id": 0, "x": 0, "y": 0, "text": "t", "color": "chartreuse",
                       "node_type": "ellipse", "width": 100, "height": 60,
                       "level": 0, "notes": "", "collapsed": false, "children": []}],
            "connections": [],
            "root_node_index": -1
        }"#;
        assert!(matches!(from_json(bad_color), Err(DocumentError::InvalidColor(_))));

        let bad_shape = bad_color.replace("chartreuse", "#ffffff").replace("ellipse", "blob");
        assert!(matches!(
            from_json(&bad_shape),
            Err(DocumentError::InvalidShape(_))
        ));
    }

    #[test]
    fn missing_field_is_malformed() {
        let json = r#"{"nodes": [], "connections": []}"#;
        assert!(matches!(from_json(json), Err(DocumentError::Parse(_))));
    }

    #[test]
    fn level_mismatch_is_malformed() {
        let json = r##"{
            "nodes": [
                {"id": 0, "x": 0, "y": 0, "text": "r", "color": "#ffffff",
                 "node_type": "ellipse", "width": 100, "height": 60,
                 "level": 0, "notes": "", "collapsed": false, "children": [1]},
                {"id": 1, "x": 0, "y": 0, "text": "c", "color": "#ffffff",
                 "node_type": "ellipse", "width": 100, "height": 60,
                 "level": 5, "notes": "", "collapsed": false, "children": []}
            ],
            "connections": [],
            "root_node_index": 0
        }"##;
        assert!(matches!(
            from_json(json),
            Err(DocumentError::InvalidHierarchy { index: 1, .. })
        ));
    }

    #[test]
    fn root_pointing_at_a_child_is_malformed() {
        let json = r##"{
            "nodes": [
                {"id": 0, "x": 0, "y": 0, "text": "r", "color": "#ffffff",
                 "node_type": "ellipse", "width": 100, "height": 60,
                 "level": 0, "notes": "", "collapsed": false, "children": [1]},
                {"id": 1, "x": 0, "y": 0, "text": "c", "color": "#ffffff",
                 "node_type": "ellipse", "width": 100, "height": 60,
                 "level": 1, "notes": "", "collapsed": false, "children": []}
            ],
            "connections": [],
            "root_node_index": 1
        }"##;
        assert!(matches!(
            from_json(json),
            Err(DocumentError::InvalidHierarchy { index: 1, .. })
        ));
    }

    #[test]
    fn bad_root_index_is_malformed() {
        let json = r#"{"nodes": [], "connections": [], "root_node_index": 3}"#;
        assert!(matches!(
            from_json(json),
            Err(DocumentError::IndexOutOfRange { context: "root", .. })
        ));
    }

    #[test]
    fn non_finite_coordinates_never_serialize_to_nothing() {
        let mut doc = Document::new();
        let id = doc.add_node(0.0, 0.0);
        doc.set_position(id, f32::NAN, 4.0).unwrap();
        // Either a document comes out or an error does; never an empty string.
        match to_json(&doc) {
            Ok(json) => assert!(json.contains("\"nodes\"")),
            Err(err) => assert!(matches!(err, DocumentError::Parse(_))),
        }
    }

    #[test]
    fn save_and_load_through_a_file() {
        let doc = sample_doc();
        let path = std::env::temp_dir().join("mindkit-codec-roundtrip.json");
        save_document(&doc, &path).unwrap();
        let loaded = load_document(&path).unwrap();
        assert_eq!(loaded.node_count(), doc.node_count());
        assert_eq!(loaded.edges().count(), doc.edges().count());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn duplicate_connection_entries_collapse_to_one_edge() {
        let json = r##"{
            "nodes": [
                {"id": 0, "x": 0, "y": 0, "text": "a", "color": "#ffffff",
                 "node_type": "ellipse", "width": 100, "height": 60,
                 "level": 0, "notes": "", "collapsed": false, "children": []},
                {"id": 1, "x": 300, "y": 0, "text": "b", "color": "#ffffff",
                 "node_type": "rectangle", "width": 100, "height": 60,
                 "level": 0, "notes": "", "collapsed": false, "children": []}
            ],
            "connections": [[0, 1], [0, 1]],
            "root_node_index": -1
        }"##;
        let doc = from_json(json).unwrap();
        assert_eq!(doc.edges().count(), 1);
    }
}
