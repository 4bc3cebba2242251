//! Area of interest: the fixed polygon that bounds and clips every product.

use geo::{BoundingRect, Centroid, Intersects};
use geo_types::{Coord, LineString, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Axis-aligned bounding box in map coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// From a STAC-style `[west, south, east, north]` slice
    pub fn from_slice(v: &[f64]) -> Option<Self> {
        match v {
            [w, s, e, n] => Some(Self::new(*w, *s, *e, *n)),
            // 3D bboxes carry elevation in positions 2 and 5
            [w, s, _, e, n, _] => Some(Self::new(*w, *s, *e, *n)),
            _ => None,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn intersects(&self, other: &BBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// As (min_x, min_y, max_x, max_y), the tuple form `Raster::bounds` uses
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.min_x, self.min_y, self.max_x, self.max_y)
    }

    fn to_rect(self) -> Rect<f64> {
        Rect::new(
            Coord { x: self.min_x, y: self.min_y },
            Coord { x: self.max_x, y: self.max_y },
        )
    }
}

/// A fixed, planar (non-geodesic) polygon, immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaOfInterest {
    name: String,
    polygon: Polygon<f64>,
    bbox: BBox,
}

impl AreaOfInterest {
    /// Build an AOI from an open or closed ring of `[x, y]` vertices.
    ///
    /// At least three distinct vertices are required.
    pub fn new(name: impl Into<String>, vertices: &[[f64; 2]]) -> Result<Self> {
        let mut coords: Vec<Coord<f64>> = vertices
            .iter()
            .map(|&[x, y]| Coord { x, y })
            .collect();
        if coords.len() > 1 && coords.first() == coords.last() {
            coords.pop();
        }
        if coords.len() < 3 {
            return Err(Error::InvalidGeometry(format!(
                "area of interest needs at least 3 vertices, got {}",
                coords.len()
            )));
        }
        if coords.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(Error::InvalidGeometry(
                "area of interest has non-finite coordinates".into(),
            ));
        }

        let polygon = Polygon::new(LineString::from(coords), vec![]);
        let rect = polygon
            .bounding_rect()
            .ok_or_else(|| Error::InvalidGeometry("empty polygon".into()))?;
        let bbox = BBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y);
        if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
            return Err(Error::InvalidGeometry(
                "area of interest has zero extent".into(),
            ));
        }

        Ok(Self {
            name: name.into(),
            polygon,
            bbox,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Exterior ring vertices without the closing duplicate
    pub fn vertices(&self) -> Vec<[f64; 2]> {
        let ring = &self.polygon.exterior().0;
        ring[..ring.len().saturating_sub(1)]
            .iter()
            .map(|c| [c.x, c.y])
            .collect()
    }

    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    /// Whether the point lies inside the polygon or on its boundary
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.polygon.intersects(&Point::new(x, y))
    }

    /// Whether a scene footprint overlaps the polygon
    pub fn intersects_bbox(&self, other: &BBox) -> bool {
        self.bbox.intersects(other) && self.polygon.intersects(&other.to_rect())
    }

    /// Polygon centroid, used as the initial map centre
    pub fn centroid(&self) -> (f64, f64) {
        self.polygon
            .centroid()
            .map(|p| (p.x(), p.y()))
            .unwrap_or((
                (self.bbox.min_x + self.bbox.max_x) / 2.0,
                (self.bbox.min_y + self.bbox.max_y) / 2.0,
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> AreaOfInterest {
        AreaOfInterest::new("square", &[[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0]])
            .unwrap()
    }

    #[test]
    fn rejects_degenerate_rings() {
        assert!(AreaOfInterest::new("line", &[[0.0, 0.0], [1.0, 1.0]]).is_err());
        assert!(AreaOfInterest::new(
            "closed-line",
            &[[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]
        )
        .is_err());
        assert!(AreaOfInterest::new(
            "flat",
            &[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]
        )
        .is_err());
    }

    #[test]
    fn contains_interior_and_boundary() {
        let aoi = square();
        assert!(aoi.contains(5.0, 5.0));
        assert!(aoi.contains(0.0, 5.0));
        assert!(!aoi.contains(10.5, 5.0));
    }

    #[test]
    fn bbox_and_centroid() {
        let aoi = square();
        assert_eq!(aoi.bbox(), BBox::new(0.0, 0.0, 10.0, 10.0));
        let (cx, cy) = aoi.centroid();
        assert_relative_eq!(cx, 5.0, epsilon = 1e-12);
        assert_relative_eq!(cy, 5.0, epsilon = 1e-12);
        assert_eq!(aoi.vertices().len(), 4);
    }

    #[test]
    fn footprint_intersection() {
        let aoi = square();
        assert!(aoi.intersects_bbox(&BBox::new(8.0, 8.0, 20.0, 20.0)));
        assert!(!aoi.intersects_bbox(&BBox::new(11.0, 11.0, 20.0, 20.0)));
    }

    #[test]
    fn bbox_from_stac_slice() {
        assert_eq!(
            BBox::from_slice(&[1.0, 2.0, 3.0, 4.0]),
            Some(BBox::new(1.0, 2.0, 3.0, 4.0))
        );
        assert_eq!(
            BBox::from_slice(&[1.0, 2.0, 0.0, 3.0, 4.0, 9.0]),
            Some(BBox::new(1.0, 2.0, 3.0, 4.0))
        );
        assert_eq!(BBox::from_slice(&[1.0]), None);
    }
}
