//! Seams between the session and the network-facing clients.
//!
//! The session is generic over these traits so it can be driven by the real
//! HTTP clients or by in-memory fakes.

use std::future::Future;

use nearserve_client::{ClientError, GeoQueryClient, LocationResolver};
use nearserve_core::{Coordinate, PlaceInfo, ProviderResult, SearchQuery};

pub trait ProviderSearch: Send + Sync {
    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<Vec<ProviderResult>, ClientError>> + Send;
}

pub trait PlaceLookup: Send + Sync {
    /// Never fails: implementations fall back to a sentinel place.
    fn reverse_geocode(&self, coordinate: Coordinate) -> impl Future<Output = PlaceInfo> + Send;

    fn forward_geocode(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Coordinate, ClientError>> + Send;
}

impl ProviderSearch for GeoQueryClient {
    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<Vec<ProviderResult>, ClientError>> + Send {
        GeoQueryClient::search(self, query)
    }
}

impl PlaceLookup for LocationResolver {
    fn reverse_geocode(&self, coordinate: Coordinate) -> impl Future<Output = PlaceInfo> + Send {
        LocationResolver::reverse_geocode(self, coordinate)
    }

    fn forward_geocode(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Coordinate, ClientError>> + Send {
        LocationResolver::forward_geocode(self, text)
    }
}
