#[cfg(feature = "cli")]
pub mod cli;
pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod node;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use codec::{from_json, load_document, save_document, to_json};
pub use config::{Config, LayoutConfig, NodeDefaults, RenderConfig, load_config};
pub use document::{ConnectionMode, Document};
pub use error::{DocumentError, Result};
pub use geometry::{Point, Rect, Shape, boundary_point};
pub use layout::{arrange, fan_angles};
pub use node::{Edge, EdgeId, EdgeKind, Node, NodeId};
pub use render::render_svg;
pub use theme::Theme;
