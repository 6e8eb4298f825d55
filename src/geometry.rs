//! GeoJSON geometries and the planar measures the builders need.
//!
//! Coordinates are taken to be in a projected system in metres (RD New,
//! EPSG:28992), so area and distance are plain Euclidean computations.

use serde::{Deserialize, Serialize};

/// A 2-D coordinate. A third (height) component in the input is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance(self, other: Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        match value.as_slice() {
            [x, y, ..] => Ok(Position::new(*x, *y)),
            _ => Err(format!("position needs at least two numbers, got {}", value.len())),
        }
    }
}

impl From<Position> for Vec<f64> {
    fn from(p: Position) -> Self {
        vec![p.x, p.y]
    }
}

pub type Ring = Vec<Position>;

/// The GeoJSON `geometry` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl Geometry {
    /// Enclosed area in square metres. Zero for points and lines.
    pub fn area(&self) -> f64 {
        self.polygons()
            .into_iter()
            .map(|rings| {
                let mut rings = rings.iter();
                let outer = rings.next().map(|r| ring_area(r)).unwrap_or(0.0);
                outer - rings.map(|r| ring_area(r)).sum::<f64>()
            })
            .sum()
    }

    /// Shortest distance between two geometries; zero when they touch,
    /// overlap, or one contains the other.
    pub fn distance(&self, other: &Geometry) -> f64 {
        let overlapping = self.vertices().iter().any(|p| other.contains(*p))
            || other.vertices().iter().any(|p| self.contains(*p));
        if overlapping {
            return 0.0;
        }

        let ours = self.segments();
        let theirs = other.segments();
        ours.iter()
            .flat_map(|a| theirs.iter().map(move |b| segment_distance(*a, *b)))
            .fold(f64::INFINITY, f64::min)
    }

    /// Whether `p` lies inside (or on the boundary of) a polygonal part.
    pub fn contains(&self, p: Position) -> bool {
        self.polygons().into_iter().any(|rings| {
            let mut rings = rings.iter();
            match rings.next() {
                Some(outer) => {
                    (in_ring(outer, p) || on_ring(outer, p))
                        && !rings.any(|hole| in_ring(hole, p) && !on_ring(hole, p))
                }
                None => false,
            }
        })
    }

    fn polygons(&self) -> Vec<&[Ring]> {
        match self {
            Geometry::Polygon(rings) => vec![rings.as_slice()],
            Geometry::MultiPolygon(polygons) => polygons.iter().map(Vec::as_slice).collect(),
            _ => Vec::new(),
        }
    }

    fn vertices(&self) -> Vec<Position> {
        match self {
            Geometry::Point(p) => vec![*p],
            Geometry::MultiPoint(points) | Geometry::LineString(points) => points.clone(),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter().flatten().copied().collect()
            }
            Geometry::MultiPolygon(polygons) => polygons.iter().flatten().flatten().copied().collect(),
        }
    }

    fn segments(&self) -> Vec<(Position, Position)> {
        fn chain(points: &[Position], out: &mut Vec<(Position, Position)>) {
            match points {
                [single] => out.push((*single, *single)),
                _ => out.extend(points.windows(2).map(|w| (w[0], w[1]))),
            }
        }

        let mut out = Vec::new();
        match self {
            Geometry::Point(p) => out.push((*p, *p)),
            Geometry::MultiPoint(points) => out.extend(points.iter().map(|p| (*p, *p))),
            Geometry::LineString(points) => chain(points, &mut out),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter().for_each(|l| chain(l, &mut out))
            }
            Geometry::MultiPolygon(polygons) => {
                polygons.iter().flatten().for_each(|l| chain(l, &mut out))
            }
        }
        out
    }
}

// Shoelace formula; orientation independent.
fn ring_area(ring: &[Position]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let twice: f64 = ring
        .iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    twice.abs() / 2.0
}

// Even-odd ray casting.
fn in_ring(ring: &[Position], p: Position) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn on_ring(ring: &[Position], p: Position) -> bool {
    ring.windows(2)
        .any(|w| point_segment_distance(p, (w[0], w[1])) < 1e-12)
}

fn point_segment_distance(p: Position, (a, b): (Position, Position)) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
    p.distance(Position::new(a.x + t * dx, a.y + t * dy))
}

fn orientation(a: Position, b: Position, c: Position) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn segments_cross(a: (Position, Position), b: (Position, Position)) -> bool {
    let d1 = orientation(b.0, b.1, a.0);
    let d2 = orientation(b.0, b.1, a.1);
    let d3 = orientation(a.0, a.1, b.0);
    let d4 = orientation(a.0, a.1, b.1);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

fn segment_distance(a: (Position, Position), b: (Position, Position)) -> f64 {
    if segments_cross(a, b) {
        return 0.0;
    }
    [
        point_segment_distance(a.0, b),
        point_segment_distance(a.1, b),
        point_segment_distance(b.0, a),
        point_segment_distance(b.1, a),
    ]
    .into_iter()
    .fold(f64::INFINITY, f64::min)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureTag {
    #[default]
    Feature,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureCollectionTag {
    #[default]
    FeatureCollection,
}

/// A GeoJSON feature with typed properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature<P> {
    #[serde(rename = "type", default)]
    pub tag: FeatureTag,
    pub geometry: Geometry,
    pub properties: P,
}

impl<P> Feature<P> {
    pub fn new(geometry: Geometry, properties: P) -> Self {
        Self {
            tag: FeatureTag::Feature,
            geometry,
            properties,
        }
    }
}

/// A GeoJSON feature collection with typed properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection<P> {
    #[serde(rename = "type", default)]
    pub tag: FeatureCollectionTag,
    pub features: Vec<Feature<P>>,
}

impl<P> FeatureCollection<P> {
    pub fn new(features: Vec<Feature<P>>) -> Self {
        Self {
            tag: FeatureCollectionTag::FeatureCollection,
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square(x0: f64, y0: f64, size: f64) -> Geometry {
        Geometry::Polygon(vec![vec![
            Position::new(x0, y0),
            Position::new(x0 + size, y0),
            Position::new(x0 + size, y0 + size),
            Position::new(x0, y0 + size),
            Position::new(x0, y0),
        ]])
    }

    #[test]
    fn geometry_serializes_as_geojson() {
        let point = Geometry::Point(Position::new(1.0, 2.0));
        assert_eq!(
            serde_json::to_value(&point).unwrap(),
            json!({"type": "Point", "coordinates": [1.0, 2.0]})
        );
    }

    #[test]
    fn geometry_accepts_three_dimensional_positions() {
        let g: Geometry =
            serde_json::from_value(json!({"type": "LineString", "coordinates": [[0, 0, 5], [3, 4, 5]]}))
                .unwrap();
        assert_eq!(
            g,
            Geometry::LineString(vec![Position::new(0.0, 0.0), Position::new(3.0, 4.0)])
        );
    }

    #[test]
    fn position_rejects_single_number() {
        let err = serde_json::from_value::<Geometry>(json!({"type": "Point", "coordinates": [1.0]}));
        assert!(err.is_err());
    }

    #[test]
    fn polygon_area_subtracts_holes() {
        let mut rings = match square(0.0, 0.0, 10.0) {
            Geometry::Polygon(rings) => rings,
            _ => unreachable!(),
        };
        rings.push(vec![
            Position::new(1.0, 1.0),
            Position::new(3.0, 1.0),
            Position::new(3.0, 3.0),
            Position::new(1.0, 3.0),
            Position::new(1.0, 1.0),
        ]);
        assert_eq!(Geometry::Polygon(rings).area(), 96.0);
        assert_eq!(Geometry::Point(Position::new(0.0, 0.0)).area(), 0.0);
    }

    #[test]
    fn distance_between_disjoint_polygons() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(4.0, 0.0, 1.0);
        assert!((a.distance(&b) - 3.0).abs() < 1e-12);
        assert!((b.distance(&a) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn distance_is_zero_when_contained_or_overlapping() {
        let outer = square(0.0, 0.0, 10.0);
        let inner = square(2.0, 2.0, 1.0);
        assert_eq!(outer.distance(&inner), 0.0);
        assert_eq!(outer.distance(&Geometry::Point(Position::new(5.0, 5.0))), 0.0);
        assert_eq!(outer.distance(&square(9.0, 9.0, 3.0)), 0.0);
    }

    #[test]
    fn distance_from_point_to_line() {
        let line = Geometry::LineString(vec![Position::new(0.0, 0.0), Position::new(10.0, 0.0)]);
        let point = Geometry::Point(Position::new(5.0, 3.0));
        assert!((line.distance(&point) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn crossing_lines_have_zero_distance() {
        let a = Geometry::LineString(vec![Position::new(-1.0, 0.0), Position::new(1.0, 0.0)]);
        let b = Geometry::LineString(vec![Position::new(0.0, -1.0), Position::new(0.0, 1.0)]);
        assert_eq!(a.distance(&b), 0.0);
    }

    #[test]
    fn feature_collection_round_trip() {
        let fc = FeatureCollection::new(vec![Feature::new(
            Geometry::Point(Position::new(1.0, 1.0)),
            json!({"name": "0"}),
        )]);
        let value = serde_json::to_value(&fc).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["type"], "Feature");
        let back: FeatureCollection<serde_json::Value> = serde_json::from_value(value).unwrap();
        assert_eq!(back, fc);
    }
}
