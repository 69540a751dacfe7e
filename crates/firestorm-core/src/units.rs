//! Unit newtypes for geographic quantities.
//!
//! Raw `f64` values are easy to mix up here: the spatial index reports a
//! planar distance in coordinate degrees while the acceptance check works in
//! kilometres along the ellipsoid. Wrapping the kilometre value keeps the two
//! from being compared by accident.
//!
//! ```
//! use firestorm_core::units::Kilometers;
//!
//! let d = Kilometers(12.5);
//! assert!(d <= Kilometers(50.0));
//! assert_eq!(Kilometers::from_meters(1500.0), Kilometers(1.5));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Surface distance in kilometres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilometers(pub f64);

impl Kilometers {
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn from_meters(meters: f64) -> Self {
        Self(meters / 1000.0)
    }
}

impl fmt::Display for Kilometers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(precision) = f.precision() {
            write!(f, "{:.*} km", precision, self.0)
        } else {
            write!(f, "{} km", self.0)
        }
    }
}
