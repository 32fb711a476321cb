//! Wire types for the backend and geocoder responses.
//!
//! The backend wraps every payload in `{"success": bool, "data": ..., "message": ...}`;
//! [`Envelope`] captures that pattern generically.

use serde::Deserialize;

use nearserve_core::{Coordinate, ProviderResult};

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// nearby-providers
// ---------------------------------------------------------------------------

/// `data` of the `nearby-providers` response. Records stay untyped so one
/// malformed provider does not fail the whole page.
#[derive(Debug, Deserialize)]
pub struct ProvidersData {
    #[serde(default)]
    pub providers: Vec<serde_json::Value>,
}

/// GeoJSON point: `coordinates` is `[longitude, latitude]`.
#[derive(Debug, Deserialize)]
pub struct GeoPoint {
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRecord {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lng")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default, alias = "averageRating")]
    pub rating_average: f64,
    #[serde(default, alias = "totalReviews")]
    pub rating_count: u32,
}

impl ProviderRecord {
    /// Flat `latitude`/`longitude` win over a GeoJSON `location`.
    fn coordinate(&self) -> Option<Coordinate> {
        let (lat, lng) = match (self.latitude, self.longitude, &self.location) {
            (Some(lat), Some(lng), _) => (lat, lng),
            (_, _, Some(point)) if point.coordinates.len() == 2 => {
                (point.coordinates[1], point.coordinates[0])
            }
            _ => return None,
        };
        Coordinate::new(lat, lng).ok()
    }

    /// Converts to a domain result, or `None` when the record has no valid
    /// location.
    #[must_use]
    pub fn into_result(self) -> Option<ProviderResult> {
        let coordinate = self.coordinate()?;
        Some(ProviderResult {
            id: self.id,
            name: self.name,
            category: self.category,
            description: self.description,
            coordinate,
            rating_average: self.rating_average,
            rating_count: self.rating_count,
            distance_km: None,
        })
    }
}

// ---------------------------------------------------------------------------
// reverse-geocode (backend)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PlaceRecord {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
}

// ---------------------------------------------------------------------------
// Nominatim
// ---------------------------------------------------------------------------

/// One hit from Nominatim `search`. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
pub struct NominatimHit {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct NominatimReverse {
    #[serde(default)]
    pub address: Option<NominatimAddress>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NominatimAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub county: Option<String>,
    pub state_district: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl NominatimAddress {
    /// Smallest populated settlement name, widening to district.
    #[must_use]
    pub fn locality(&self) -> Option<&str> {
        [
            &self.city,
            &self.town,
            &self.village,
            &self.county,
            &self.state_district,
        ]
        .into_iter()
        .find_map(|v| v.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: serde_json::Value) -> ProviderRecord {
        serde_json::from_value(value).expect("record should deserialize")
    }

    #[test]
    fn envelope_without_data_or_message_deserializes() {
        let envelope: Envelope<PlaceRecord> =
            serde_json::from_value(serde_json::json!({ "success": false })).unwrap();
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert!(envelope.message.is_none());

        let envelope: Envelope<ProvidersData> = serde_json::from_value(serde_json::json!({
            "success": true,
            "data": { "providers": [] }
        }))
        .unwrap();
        assert!(envelope.data.unwrap().providers.is_empty());
    }

    #[test]
    fn flat_coordinates_convert() {
        let result = record(serde_json::json!({
            "id": "p1",
            "name": "Meera",
            "category": "cooking",
            "latitude": 28.62,
            "longitude": 77.21,
            "ratingAverage": 4.5,
            "ratingCount": 10
        }))
        .into_result()
        .unwrap();
        assert_eq!(result.id, "p1");
        assert!((result.coordinate.latitude() - 28.62).abs() < 1e-9);
        assert_eq!(result.rating_count, 10);
        assert!(result.distance_km.is_none());
    }

    #[test]
    fn geojson_location_is_lng_lat() {
        let result = record(serde_json::json!({
            "_id": "p2",
            "location": { "type": "Point", "coordinates": [77.21, 28.62] },
            "averageRating": 3.0,
            "totalReviews": 2
        }))
        .into_result()
        .unwrap();
        assert_eq!(result.id, "p2");
        assert!((result.coordinate.latitude() - 28.62).abs() < 1e-9);
        assert!((result.coordinate.longitude() - 77.21).abs() < 1e-9);
        assert!((result.rating_average - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_or_invalid_location_is_dropped() {
        assert!(record(serde_json::json!({"id": "p3"})).into_result().is_none());
        assert!(record(serde_json::json!({"id": "p4", "latitude": 120.0, "longitude": 0.0}))
            .into_result()
            .is_none());
    }

    #[test]
    fn locality_prefers_city_then_town() {
        let address = NominatimAddress {
            town: Some("Sohna".to_owned()),
            county: Some("Gurgaon".to_owned()),
            ..NominatimAddress::default()
        };
        assert_eq!(address.locality(), Some("Sohna"));
    }
}
