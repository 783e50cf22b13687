//! Map surface: viewport math, click translation and the single marker.
//!
//! The view uses a plain equirectangular projection. Longitude maps linearly
//! to columns and latitude to rows. At zoom `z` the view is
//! `720 / 2^z` degrees wide, and the height follows from the area's aspect
//! ratio. Terminal cells are roughly twice as tall as they are wide.

use crate::geo::GeoPoint;

pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 18;

/// Width of the view in degrees of longitude at zoom 0.
const BASE_LON_SPAN: f64 = 720.0;

/// Height/width ratio of a terminal cell.
const CELL_ASPECT: f64 = 2.0;

/// Keep the view away from the poles, where the projection degenerates.
const MAX_LATITUDE: f64 = 85.0;

/// Fraction of the view moved by one pan step.
const PAN_FRACTION: f64 = 0.1;

/// Identifies a placed marker. A new handle is issued for every placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub handle: MarkerHandle,
    pub point: GeoPoint,
}

/// What the interaction layer needs from a map widget.
pub trait MapSurface {
    /// Place a marker at `point`, removing any previously placed marker.
    fn place_marker(&mut self, point: GeoPoint) -> MarkerHandle;

    /// Move the view to `center` at the given zoom level.
    fn recenter(&mut self, center: GeoPoint, zoom: u8);
}

/// Visible region in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl Bounds {
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.west..=self.east).contains(&point.longitude)
            && (self.south..=self.north).contains(&point.latitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    North,
    South,
    East,
    West,
}

#[derive(Debug, Clone)]
pub struct MapView {
    center: GeoPoint,
    zoom: u8,
    marker: Option<Marker>,
    next_handle: u64,
}

impl MapView {
    pub fn initialize(center: GeoPoint, zoom: u8) -> Self {
        let mut view = Self {
            center,
            zoom: MIN_ZOOM,
            marker: None,
            next_handle: 1,
        };
        view.recenter(center, zoom);
        view
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    /// Degrees of longitude across the view.
    pub fn lon_span(&self) -> f64 {
        BASE_LON_SPAN / f64::from(1u32 << self.zoom)
    }

    /// Degrees of latitude across a `width` x `height` cell area.
    pub fn lat_span(&self, width: u16, height: u16) -> f64 {
        if width == 0 {
            return 0.0;
        }
        let span = self.lon_span() * f64::from(height) * CELL_ASPECT / f64::from(width);
        span.min(2.0 * MAX_LATITUDE)
    }

    pub fn bounds(&self, width: u16, height: u16) -> Bounds {
        let half_lon = self.lon_span() / 2.0;
        let half_lat = self.lat_span(width, height) / 2.0;
        Bounds {
            west: self.center.longitude - half_lon,
            east: self.center.longitude + half_lon,
            south: self.center.latitude - half_lat,
            north: self.center.latitude + half_lat,
        }
    }

    /// Translate a click on cell (`col`, `row`) of a `width` x `height` area
    /// into a coordinate. Returns `None` when the cell is outside the area.
    pub fn point_at(&self, width: u16, height: u16, col: u16, row: u16) -> Option<GeoPoint> {
        if col >= width || row >= height {
            return None;
        }
        let bounds = self.bounds(width, height);
        let lon = bounds.west
            + (f64::from(col) + 0.5) / f64::from(width) * (bounds.east - bounds.west);
        let lat = bounds.north
            - (f64::from(row) + 0.5) / f64::from(height) * (bounds.north - bounds.south);
        Some(GeoPoint::new(
            lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
            wrap_longitude(lon),
        ))
    }

    pub fn pan(&mut self, direction: PanDirection) {
        // Latitude step uses the lon span too, so steps feel even at any aspect
        let step = self.lon_span() * PAN_FRACTION;
        let (dlat, dlon) = match direction {
            PanDirection::North => (step, 0.0),
            PanDirection::South => (-step, 0.0),
            PanDirection::East => (0.0, step),
            PanDirection::West => (0.0, -step),
        };
        self.center = GeoPoint::new(
            (self.center.latitude + dlat).clamp(-MAX_LATITUDE, MAX_LATITUDE),
            wrap_longitude(self.center.longitude + dlon),
        );
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1).max(MIN_ZOOM);
    }
}

impl MapSurface for MapView {
    fn place_marker(&mut self, point: GeoPoint) -> MarkerHandle {
        let handle = MarkerHandle(self.next_handle);
        self.next_handle += 1;
        // Replacing the Option drops the old marker
        self.marker = Some(Marker { handle, point });
        handle
    }

    fn recenter(&mut self, center: GeoPoint, zoom: u8) {
        self.center = GeoPoint::new(
            center.latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE),
            wrap_longitude(center.longitude),
        );
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

/// Normalize a longitude into [-180, 180].
fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_single_marker_after_reselect() {
        let mut map = MapView::initialize(GeoPoint::new(54.0, -2.0), 6);
        let p = GeoPoint::new(51.75, -1.25);
        let q = GeoPoint::new(53.4, -2.99);

        let first = map.place_marker(p);
        let second = map.place_marker(q);

        assert_ne!(first, second);
        let marker = map.marker().unwrap();
        assert_eq!(marker.point, q);
        assert_eq!(marker.handle, second);
    }

    #[test]
    fn test_center_click_maps_to_center() {
        let map = MapView::initialize(GeoPoint::new(54.0, -2.0), 6);
        // Odd dimensions put the middle cell exactly on the centre
        let p = map.point_at(81, 41, 40, 20).unwrap();
        assert!((p.latitude - 54.0).abs() < EPS);
        assert!((p.longitude + 2.0).abs() < EPS);
    }

    #[test]
    fn test_click_corners() {
        let map = MapView::initialize(GeoPoint::new(0.0, 0.0), 4);
        let bounds = map.bounds(100, 50);
        assert!((bounds.east - bounds.west - 45.0).abs() < EPS);

        let nw = map.point_at(100, 50, 0, 0).unwrap();
        assert!(nw.longitude < 0.0 && nw.latitude > 0.0);
        let se = map.point_at(100, 50, 99, 49).unwrap();
        assert!(se.longitude > 0.0 && se.latitude < 0.0);
        assert!(bounds.contains(nw) && bounds.contains(se));

        assert!(map.point_at(100, 50, 100, 0).is_none());
        assert!(map.point_at(100, 50, 0, 50).is_none());
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut map = MapView::initialize(GeoPoint::new(0.0, 0.0), 30);
        assert_eq!(map.zoom(), MAX_ZOOM);
        map.zoom_in();
        assert_eq!(map.zoom(), MAX_ZOOM);

        map.recenter(GeoPoint::new(0.0, 0.0), 0);
        assert_eq!(map.zoom(), MIN_ZOOM);
        map.zoom_out();
        assert_eq!(map.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_pan_wraps_longitude() {
        let mut map = MapView::initialize(GeoPoint::new(0.0, 179.0), 2);
        map.pan(PanDirection::East);
        let lon = map.center().longitude;
        assert!((-180.0..=180.0).contains(&lon));
        assert!(lon < 0.0);
    }

    #[test]
    fn test_pan_stops_near_pole() {
        let mut map = MapView::initialize(GeoPoint::new(84.0, 0.0), 1);
        map.pan(PanDirection::North);
        assert_eq!(map.center().latitude, MAX_LATITUDE);
    }

    #[test]
    fn test_recenter_keeps_marker() {
        let mut map = MapView::initialize(GeoPoint::new(54.0, -2.0), 6);
        map.place_marker(GeoPoint::new(51.5, -0.1));
        map.recenter(GeoPoint::new(51.5, -0.1), 12);
        assert_eq!(map.zoom(), 12);
        assert_eq!(map.center(), GeoPoint::new(51.5, -0.1));
        assert!(map.marker().is_some());
    }

    #[test]
    fn test_wrap_longitude() {
        assert!((wrap_longitude(190.0) + 170.0).abs() < EPS);
        assert!((wrap_longitude(-190.0) - 170.0).abs() < EPS);
        assert_eq!(wrap_longitude(180.0), 180.0);
    }
}
