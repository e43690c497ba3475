/// A latitude/longitude pair, kept at full `f64` precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// A closed polygon boundary.
///
/// Only constructible through [`Ring::closed`], so every `Ring` has at least
/// three input vertices and its first vertex equals its last.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    vertices: Vec<Coordinate>,
}

impl Ring {
    /// Minimum number of vertices a polygon must carry before closure.
    pub const MIN_VERTICES: usize = 3;

    /// Builds a closed ring, appending the first vertex if the input is open.
    ///
    /// Returns `None` for degenerate input (fewer than three vertices).
    pub fn closed(mut vertices: Vec<Coordinate>) -> Option<Self> {
        if vertices.len() < Self::MIN_VERTICES {
            return None;
        }
        let first = vertices[0];
        if vertices.last() != Some(&first) {
            vertices.push(first);
        }
        Some(Self { vertices })
    }

    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    /// Arithmetic mean of every vertex, closing vertex included.
    ///
    /// This is a label anchor, not the area centroid of the polygon.
    pub fn vertex_mean(&self) -> Coordinate {
        let n = self.vertices.len() as f64;
        let (lat_sum, lon_sum) = self
            .vertices
            .iter()
            .fold((0.0, 0.0), |(lat, lon), c| (lat + c.lat, lon + c.lon));
        Coordinate::new(lat_sum / n, lon_sum / n)
    }
}

/// Spatial extent of an alert.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coordinate),
    Polygon(Ring),
}

/// One feed entry that carries usable geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEntry {
    /// Headline with semicolons already replaced by commas.
    pub title: String,
    pub geometry: Geometry,
}

/// Body of an upstream feed response.
///
/// The status is kept for logging; parsing only looks at the bytes.
#[derive(Debug, Clone)]
pub struct RawFeedDocument {
    pub bytes: Vec<u8>,
    pub status: u16,
}

impl RawFeedDocument {
    pub fn new(bytes: Vec<u8>, status: u16) -> Self {
        Self { bytes, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon)
    }

    #[test]
    fn test_ring_rejects_degenerate() {
        assert!(Ring::closed(vec![]).is_none());
        assert!(Ring::closed(vec![c(1.0, 2.0)]).is_none());
        assert!(Ring::closed(vec![c(1.0, 2.0), c(3.0, 4.0)]).is_none());
    }

    #[test]
    fn test_ring_closes_open_input() {
        let ring = Ring::closed(vec![c(0.0, 0.0), c(0.0, 1.0), c(1.0, 1.0)]).unwrap();
        assert_eq!(ring.vertices().len(), 4);
        assert_eq!(ring.vertices().first(), ring.vertices().last());
    }

    #[test]
    fn test_ring_keeps_closed_input() {
        let ring = Ring::closed(vec![c(0.0, 0.0), c(0.0, 1.0), c(1.0, 1.0), c(0.0, 0.0)]).unwrap();
        assert_eq!(ring.vertices().len(), 4);
    }

    #[test]
    fn test_vertex_mean_includes_closing_vertex() {
        // Closed ring: (0,0) (0,4) (4,4) (0,0) -> lat mean 1, lon mean 2
        let ring = Ring::closed(vec![c(0.0, 0.0), c(0.0, 4.0), c(4.0, 4.0)]).unwrap();
        let mean = ring.vertex_mean();
        assert_eq!(mean, c(1.0, 2.0));
    }

    #[test]
    fn test_coordinate_is_finite() {
        assert!(c(34.05, -118.25).is_finite());
        assert!(!c(f64::NAN, 0.0).is_finite());
        assert!(!c(0.0, f64::INFINITY).is_finite());
    }
}
