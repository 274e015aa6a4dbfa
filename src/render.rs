//! SVG export, plus PNG rasterization behind the `png` feature.
//!
//! This is the delegated rendering surface of the core: the exported region
//! is the content bounding box (optionally unioned with a caller-supplied
//! viewport) on a white background. Hidden nodes and edges are skipped.

use crate::config::RenderConfig;
use crate::document::Document;
use crate::geometry::{Rect, Shape};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

pub fn render_svg(doc: &Document, theme: &Theme, config: &RenderConfig) -> String {
    render_svg_with_viewport(doc, theme, config, None)
}

/// Render with an explicit viewport rect unioned into the exported region,
/// mirroring the desktop behavior of exporting "everything plus what the user
/// currently sees".
pub fn render_svg_with_viewport(
    doc: &Document,
    theme: &Theme,
    config: &RenderConfig,
    viewport: Option<Rect>,
) -> String {
    let mut region = doc
        .content_bounds()
        .unwrap_or(Rect::new(0.0, 0.0, config.width, config.height));
    if let Some(viewport) = viewport {
        region = region.union(&viewport);
    }

    let pad = config.padding;
    let min_x = region.min_x - pad;
    let min_y = region.min_y - pad;
    let width = (region.width() + pad * 2.0).max(1.0);
    let height = (region.height() + pad * 2.0).max(1.0);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" viewBox=\"{min_x:.2} {min_y:.2} {width:.2} {height:.2}\">",
    ));

    svg.push_str(&format!(
        "<rect x=\"{min_x:.2}\" y=\"{min_y:.2}\" width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    // Edges first so nodes paint over the line ends.
    for (_, edge) in doc.edges() {
        if !edge.visible {
            continue;
        }
        let dash = match edge.kind {
            crate::node::EdgeKind::Hierarchical => String::new(),
            crate::node::EdgeKind::Peer => " stroke-dasharray=\"6 4\"".to_string(),
        };
        svg.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{}\"{}/>",
            edge.p1.x, edge.p1.y, edge.p2.x, edge.p2.y, theme.line_color, theme.line_width, dash
        ));
    }

    for id in doc.node_ids() {
        let Some(node) = doc.node(id) else { continue };
        if !node.visible {
            continue;
        }
        let center = node.center();
        match node.shape {
            Shape::Ellipse => {
                svg.push_str(&format!(
                    "<ellipse cx=\"{:.2}\" cy=\"{:.2}\" rx=\"{:.2}\" ry=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
                    center.x,
                    center.y,
                    node.width / 2.0,
                    node.height / 2.0,
                    node.color,
                    theme.node_stroke,
                    theme.node_stroke_width
                ));
            }
            Shape::Rectangle => {
                svg.push_str(&format!(
                    "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
                    node.x,
                    node.y,
                    node.width,
                    node.height,
                    node.color,
                    theme.node_stroke,
                    theme.node_stroke_width
                ));
            }
        }
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            center.x,
            center.y,
            escape_xml(&node.font_family),
            node.font_size,
            theme.text_color,
            escape_xml(&node.text)
        ));
    }

    svg.push_str("</svg>");
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).unwrap());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::theme::Theme;

    fn sample_doc() -> Document {
        let mut doc = Document::new();
        let root = doc.add_central_topic(0.0, 0.0);
        let a = doc.add_child(root, "Ideas & <plans>").unwrap();
        let b = doc.add_child(root, "Later").unwrap();
        doc.connect_drag(a, b).unwrap();
        doc
    }

    #[test]
    fn renders_nodes_edges_and_escaped_text() {
        let doc = sample_doc();
        let svg = render_svg(&doc, &Theme::classic(), &RenderConfig::default());
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains("<ellipse"));
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains("Ideas &amp; &lt;plans&gt;"));
    }

    #[test]
    fn hidden_subtree_is_not_rendered() {
        let mut doc = Document::new();
        let root = doc.add_central_topic(0.0, 0.0);
        let a = doc.add_child(root, "visible-branch").unwrap();
        doc.add_child(a, "hidden-leaf").unwrap();
        doc.toggle_collapse(a).unwrap();
        let svg = render_svg(&doc, &Theme::classic(), &RenderConfig::default());
        assert!(svg.contains("visible-branch"));
        assert!(!svg.contains("hidden-leaf"));
    }

    #[test]
    fn viewport_expands_export_region() {
        let doc = sample_doc();
        let config = RenderConfig::default();
        let plain = render_svg(&doc, &Theme::classic(), &config);
        let wide = render_svg_with_viewport(
            &doc,
            &Theme::classic(),
            &config,
            Some(Rect::new(-2000.0, -2000.0, 2000.0, 2000.0)),
        );
        assert!(wide.contains("width=\"4080\""));
        assert_ne!(plain, wide);
    }

    #[test]
    fn empty_document_still_renders_a_canvas() {
        let doc = Document::new();
        let svg = render_svg(&doc, &Theme::classic(), &RenderConfig::default());
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
    }
}
