//! Boundary-intersection geometry for edge anchoring.
//!
//! Edges are drawn between the points where the center-to-center ray
//! crosses each node's outline, so lines never float inside or outside a
//! shape. Everything here is stateless.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box, used for content-bounds queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Rect {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Ellipse,
    Rectangle,
}

impl Shape {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "ellipse" => Some(Self::Ellipse),
            "rectangle" => Some(Self::Rectangle),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::Ellipse => "ellipse",
            Self::Rectangle => "rectangle",
        }
    }
}

/// Point on the outline of a shape centered at `center` with half-extents
/// `half_w`/`half_h`, along the ray toward `target`. Coincident centers
/// return the center itself.
pub fn boundary_point(shape: Shape, center: Point, half_w: f32, half_h: f32, target: Point) -> Point {
    match shape {
        Shape::Ellipse => ellipse_boundary(center, half_w, half_h, target),
        Shape::Rectangle => rectangle_boundary(center, half_w, half_h, target),
    }
}

fn ellipse_boundary(center: Point, a: f32, b: f32, target: Point) -> Point {
    let dx = target.x - center.x;
    let dy = target.y - center.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return center;
    }
    let dx = dx / length;
    let dy = dy / length;

    let tx = if dx != 0.0 { (a / dx).abs() } else { f32::INFINITY };
    let ty = if dy != 0.0 { (b / dy).abs() } else { f32::INFINITY };
    let t = tx.min(ty);

    Point::new(center.x + dx * t, center.y + dy * t)
}

fn rectangle_boundary(center: Point, half_w: f32, half_h: f32, target: Point) -> Point {
    let left = center.x - half_w;
    let right = center.x + half_w;
    let top = center.y - half_h;
    let bottom = center.y + half_h;

    let dx = target.x - center.x;
    let dy = target.y - center.y;

    // Axis-aligned rays hit the midpoint of the near side.
    if dx == 0.0 && dy == 0.0 {
        return center;
    }
    if dx == 0.0 {
        return Point::new(center.x, if dy < 0.0 { top } else { bottom });
    }
    if dy == 0.0 {
        return Point::new(if dx < 0.0 { left } else { right }, center.y);
    }

    let tx1 = (left - center.x) / dx;
    let tx2 = (right - center.x) / dx;
    let ty1 = (top - center.y) / dy;
    let ty2 = (bottom - center.y) / dy;

    let t = tx1.max(tx2).min(ty1.max(ty2));

    Point::new(center.x + dx * t, center.y + dy * t)
}
