use serde::{Deserialize, Serialize};

use crate::geom::Point2;

/// Closed annotation polygon in absolute pixel coordinates.
///
/// Vertex order is the boundary walk; the closing edge from the last vertex
/// back to the first is implicit. Polygons are assumed simple, nothing here
/// repairs self-intersections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    pub points: Vec<Point2>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point2,
    pub max: Point2,
}

impl Polygon {
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = [f64; 2]>,
    {
        Self {
            points: pairs.into_iter().map(Point2::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_finite(&self) -> bool {
        self.points.iter().all(|p| p.is_finite())
    }

    /// Number of vertices that differ from every earlier vertex.
    pub fn distinct_len(&self) -> usize {
        let mut seen: Vec<Point2> = Vec::with_capacity(self.points.len());
        for &p in &self.points {
            if !seen.contains(&p) {
                seen.push(p);
            }
        }
        seen.len()
    }

    /// Arithmetic mean of the vertices.
    ///
    /// This is not the area centroid: densely annotated stretches of the
    /// boundary pull it towards themselves.
    pub fn vertex_centroid(&self) -> Option<Point2> {
        if self.points.is_empty() {
            return None;
        }

        let n = self.points.len() as f64;
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Point2::new(sx / n, sy / n))
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = *self.points.first()?;
        let mut bb = BoundingBox {
            min: first,
            max: first,
        };
        for p in &self.points[1..] {
            bb.min.x = bb.min.x.min(p.x);
            bb.min.y = bb.min.y.min(p.y);
            bb.max.x = bb.max.x.max(p.x);
            bb.max.y = bb.max.y.max(p.y);
        }
        Some(bb)
    }

    /// Edges of the closed boundary, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[(i + n - 1) % n], self.points[i]))
    }
}

impl From<Vec<Point2>> for Polygon {
    fn from(points: Vec<Point2>) -> Self {
        Self { points }
    }
}
