//! Radial auto-arrange.
//!
//! Recursive placement from the root with a spacing factor that decays by a
//! fixed ratio per level, so deep branches converge instead of sprawling.
//! Root children snap into a horizontal semicircular arrangement split left
//! and right of the root; deeper children step sideways by the fan-angle sign
//! and cascade vertically. Each node's parent edge is re-anchored right after
//! the node lands.

use crate::config::LayoutConfig;
use crate::document::Document;
use crate::error::{DocumentError, Result};
use crate::node::NodeId;

/// Fan angles (degrees) for `count` children: evenly spread across the level's
/// fan, a single child straight ahead at 0.
pub fn fan_angles(count: usize, root_level: bool, config: &LayoutConfig) -> Vec<f32> {
    if count == 0 {
        return Vec::new();
    }
    let (start, end) = if root_level {
        (config.root_fan_start, config.root_fan_end)
    } else {
        (config.branch_fan_start, config.branch_fan_end)
    };
    if count == 1 {
        return vec![0.0];
    }
    let step = (end - start) / (count as f32 - 1.0);
    (0..count).map(|i| start + i as f32 * step).collect()
}

/// Re-lay-out the whole tree from the root, placing the root at the origin.
/// Centering the view afterwards is the UI collaborator's job.
pub fn arrange(doc: &mut Document, config: &LayoutConfig) -> Result<()> {
    let root = doc.root().ok_or(DocumentError::NoRoot)?;
    position_subtree(doc, root, 0.0, 0.0, 1.0, config)?;
    doc.check_invariants();
    Ok(())
}

fn position_subtree(
    doc: &mut Document,
    id: NodeId,
    x: f32,
    y: f32,
    spacing: f32,
    config: &LayoutConfig,
) -> Result<()> {
    doc.set_position(id, x, y)?;

    let (level, children) = {
        let node = doc.node(id).ok_or(DocumentError::UnknownNode(id))?;
        (node.level, node.children.clone())
    };
    if children.is_empty() {
        return Ok(());
    }

    let n = children.len();
    let root_level = level == 0;
    let angles = fan_angles(n, root_level, config);

    for (i, &child) in children.iter().enumerate() {
        let (child_x, child_y) = if root_level {
            // Semicircular split: earlier siblings go left of the root,
            // later ones right, stacked at fixed vertical spacing.
            let side = if i > n / 2 { 1.0 } else { -1.0 };
            let offset = (i as i32 - (n / 2) as i32) as f32;
            (
                x + config.root_radius * config.spacing_decay * side,
                y + offset * config.root_sibling_spacing,
            )
        } else {
            // Cascade: sideways by the fan-angle sign, downwards per index,
            // both scaled by the decayed spacing factor.
            let side = if angles[i] >= 0.0 { 1.0 } else { -1.0 };
            (
                x + config.branch_radius * spacing * side,
                y + (i as f32 + 1.0) * config.branch_sibling_spacing * spacing,
            )
        };

        position_subtree(doc, child, child_x, child_y, spacing * config.spacing_decay, config)?;
    }

    Ok(())
}
