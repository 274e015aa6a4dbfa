use mindkit::config::{LayoutConfig, RenderConfig};
use mindkit::document::Document;
use mindkit::node::NodeId;
use mindkit::theme::Theme;
use mindkit::{arrange, from_json, load_document, render_svg, save_document, to_json};

/// Root with two branches, one of them two levels deep, plus a peer link.
fn build_session_document() -> Document {
    let mut doc = Document::new();
    let root = doc.add_central_topic(100.0, 100.0);
    let plans = doc.add_child(root, "Plans").unwrap();
    let ideas = doc.add_child(root, "Ideas").unwrap();
    let q1 = doc.add_child(plans, "Q1").unwrap();
    let q2 = doc.add_child(plans, "Q2").unwrap();
    doc.add_child(q1, "hiring").unwrap();
    doc.connect_drag(ideas, q2).unwrap();
    doc.set_notes(q1, "draft budget first").unwrap();
    doc.set_shape(ideas, mindkit::Shape::Rectangle).unwrap();
    doc
}

fn assert_levels_consistent(doc: &Document) {
    for id in doc.node_ids() {
        let node = doc.node(id).unwrap();
        match node.parent {
            None => assert_eq!(node.level, 0, "orphan {id:?} must be level 0"),
            Some((pid, _)) => {
                let parent = doc.node(pid).unwrap();
                assert_eq!(node.level, parent.level + 1, "bad level at {id:?}");
            }
        }
    }
}

#[test]
fn level_invariant_holds_through_a_session() {
    let mut doc = build_session_document();
    assert_levels_consistent(&doc);

    let ids: Vec<NodeId> = doc.node_ids().collect();
    doc.delete_node(ids[3]).unwrap(); // "Q1" subtree
    assert_levels_consistent(&doc);

    let root = doc.root().unwrap();
    doc.add_child(root, "fresh").unwrap();
    assert_levels_consistent(&doc);

    arrange(&mut doc, &LayoutConfig::default()).unwrap();
    assert_levels_consistent(&doc);
}

#[test]
fn delete_removes_exactly_the_subtree() {
    let mut doc = build_session_document();
    let ids: Vec<NodeId> = doc.node_ids().collect();
    let plans = ids[1];
    let before = doc.node_count();
    let subtree = doc.subtree_size(plans);
    assert_eq!(subtree, 4); // Plans, Q1, Q2, hiring

    doc.delete_node(plans).unwrap();
    assert_eq!(doc.node_count(), before - subtree);
}

#[test]
fn moving_a_branch_leaves_the_rest_untouched() {
    let mut doc = build_session_document();
    let ids: Vec<NodeId> = doc.node_ids().collect();
    let plans = ids[1];
    let moved: Vec<NodeId> = doc.subtree(plans);

    let before: Vec<(NodeId, f32, f32)> = doc
        .node_ids()
        .map(|id| {
            let n = doc.node(id).unwrap();
            (id, n.x, n.y)
        })
        .collect();

    doc.move_node(plans, -55.0, 210.0).unwrap();

    for (id, x, y) in before {
        let n = doc.node(id).unwrap();
        if moved.contains(&id) {
            assert_eq!((n.x, n.y), (x - 55.0, y + 210.0));
        } else {
            assert_eq!((n.x, n.y), (x, y));
        }
    }
}

#[test]
fn arrange_save_load_render_pipeline() {
    let mut doc = build_session_document();
    arrange(&mut doc, &LayoutConfig::default()).unwrap();

    let path = std::env::temp_dir().join("mindkit-suite-pipeline.json");
    save_document(&doc, &path).unwrap();
    let loaded = load_document(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.node_count(), doc.node_count());
    assert_eq!(loaded.edges().count(), doc.edges().count());
    assert_levels_consistent(&loaded);

    let original: Vec<NodeId> = doc.node_ids().collect();
    let restored: Vec<NodeId> = loaded.node_ids().collect();
    for (&o, &r) in original.iter().zip(&restored) {
        let a = doc.node(o).unwrap();
        let b = loaded.node(r).unwrap();
        assert_eq!((a.x, a.y), (b.x, b.y));
        assert_eq!(a.text, b.text);
        assert_eq!(a.shape, b.shape);
        assert_eq!(a.notes, b.notes);
    }

    let svg = render_svg(&loaded, &Theme::classic(), &RenderConfig::default());
    assert!(svg.contains("<svg"));
    assert!(svg.contains("</svg>"));
    assert!(svg.contains("Plans"));
}

#[test]
fn double_round_trip_is_stable() {
    let doc = build_session_document();
    let once = to_json(&doc).unwrap();
    let twice = to_json(&from_json(&once).unwrap()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn malformed_load_does_not_disturb_the_caller() {
    let doc = build_session_document();
    let count = doc.node_count();
    let result = from_json("{\"nodes\": \"oops\"}");
    assert!(result.is_err());
    // The original document is a separate value and stays intact.
    assert_eq!(doc.node_count(), count);
    assert_levels_consistent(&doc);
}
