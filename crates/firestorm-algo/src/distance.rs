//! Geodesic surface distance on the WGS-84 ellipsoid.
//!
//! Uses Karney's algorithm via [`geo::Geodesic`], accurate to a few
//! nanometres. This is the only distance the acceptance decision looks at.

use firestorm_core::{CoordinateError, GeoPoint, Kilometers};
use geo::{Distance, Geodesic, Point};

/// Geodesic distance between two points.
///
/// Fails if either point is non-finite or outside the lat/lon domain;
/// callers attach the dataset and row to the returned error.
pub fn geodesic_km(a: GeoPoint, b: GeoPoint) -> Result<Kilometers, CoordinateError> {
    a.validate()?;
    b.validate()?;
    // geo points are (x = lon, y = lat)
    let pa = Point::new(a.lon, a.lat);
    let pb = Point::new(b.lon, b.lat);
    Ok(Kilometers::from_meters(Geodesic::distance(pa, pb)))
}
