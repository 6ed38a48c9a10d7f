use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::DomainError;

/// Mean earth radius in meters, as used by the haversine formula.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinate {
    #[schema(example = 28.7041)]
    pub latitude: f64,
    #[schema(example = 77.1025)]
    pub longitude: f64,
}

impl Coordinate {
    /// Range-checks before the value crosses into the core or into storage.
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::validation(
                "latitude must be between -90 and 90",
            ));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::validation(
                "longitude must be between -180 and 180",
            ));
        }
        Ok(Coordinate {
            latitude,
            longitude,
        })
    }
}

/// A circular admissible region. The latest stored row wins; absent any row
/// the compiled-in default from configuration applies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Geofence {
    #[schema(example = 28.7041)]
    pub latitude: f64,
    #[schema(example = 77.1025)]
    pub longitude: f64,
    #[schema(example = 100.0)]
    pub radius_m: f64,
}

impl Geofence {
    pub fn validated(latitude: f64, longitude: f64, radius_m: f64) -> Result<Self, DomainError> {
        let center = Coordinate::validated(latitude, longitude)?;
        if radius_m <= 0.0 {
            return Err(DomainError::validation("radius must be greater than 0"));
        }
        Ok(Geofence {
            latitude: center.latitude,
            longitude: center.longitude,
            radius_m,
        })
    }

    pub fn center(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Great-circle distance in meters between two points.
pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    EARTH_RADIUS_M * 2.0 * h.sqrt().asin()
}

/// True iff `point` lies within `radius_m` meters of `center`, boundary
/// inclusive. Inputs are range-checked; out-of-range values are a caller
/// error, not a denial.
pub fn within_fence(
    point: Coordinate,
    center: Coordinate,
    radius_m: f64,
) -> Result<bool, DomainError> {
    Coordinate::validated(point.latitude, point.longitude)?;
    Coordinate::validated(center.latitude, center.longitude)?;
    if radius_m <= 0.0 {
        return Err(DomainError::validation("radius must be greater than 0"));
    }
    Ok(haversine_m(point, center) <= radius_m)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELHI: Coordinate = Coordinate {
        latitude: 28.7041,
        longitude: 77.1025,
    };

    #[test]
    fn zero_distance_is_inside() {
        assert_eq!(within_fence(DELHI, DELHI, 100.0), Ok(true));
    }

    #[test]
    fn nearby_point_is_inside_a_100m_fence() {
        // ~55m north of the center
        let point = Coordinate {
            latitude: 28.7046,
            longitude: 77.1025,
        };
        assert!(haversine_m(point, DELHI) < 100.0);
        assert_eq!(within_fence(point, DELHI, 100.0), Ok(true));
    }

    #[test]
    fn distant_point_is_outside() {
        // ~1.1km north
        let point = Coordinate {
            latitude: 28.7141,
            longitude: 77.1025,
        };
        assert!(haversine_m(point, DELHI) > 1_000.0);
        assert_eq!(within_fence(point, DELHI, 100.0), Ok(false));
    }

    #[test]
    fn boundary_distance_counts_as_inside() {
        let point = Coordinate {
            latitude: 28.7046,
            longitude: 77.1030,
        };
        let exact = haversine_m(point, DELHI);
        assert_eq!(within_fence(point, DELHI, exact), Ok(true));
    }

    #[test]
    fn haversine_matches_a_known_city_pair() {
        // Delhi -> Mumbai is roughly 1150km
        let mumbai = Coordinate {
            latitude: 19.0760,
            longitude: 72.8777,
        };
        let d = haversine_m(DELHI, mumbai);
        assert!((1_100_000.0..1_200_000.0).contains(&d), "got {d}");
    }

    #[test]
    fn out_of_range_inputs_are_rejected() {
        let bad_lat = Coordinate {
            latitude: 91.0,
            longitude: 0.0,
        };
        let bad_lon = Coordinate {
            latitude: 0.0,
            longitude: 181.0,
        };
        assert!(matches!(
            within_fence(bad_lat, DELHI, 100.0),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            within_fence(bad_lon, DELHI, 100.0),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            within_fence(DELHI, DELHI, 0.0),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn geofence_validation_covers_radius() {
        assert!(Geofence::validated(28.7041, 77.1025, 100.0).is_ok());
        assert!(Geofence::validated(28.7041, 77.1025, -5.0).is_err());
        assert!(Geofence::validated(99.0, 77.1025, 100.0).is_err());
    }
}
