//! HTTP clients for provider search and geocoding.
//!
//! [`GeoQueryClient`] talks to the backend's `nearby-providers` endpoint,
//! [`Geocoder`] to a Nominatim-compatible service, and [`LocationResolver`]
//! combines them with a [`PositionSource`] into the fallback-aware location
//! operations the discovery session relies on.

pub mod error;
pub mod geocoder;
mod http;
pub mod position;
pub mod providers;
pub mod resolver;
mod retry;
pub mod types;

pub use error::{ClientError, ErrorKind, LocationError};
pub use geocoder::{GeocodedPlace, Geocoder};
pub use position::{PositionSource, StaticPosition};
pub use providers::GeoQueryClient;
pub use resolver::{LocationResolver, ResolvedCenter};
