//! Sources of the device's current position.

use std::future::Future;

use nearserve_core::Coordinate;

use crate::error::LocationError;

/// Platform location API seam.
pub trait PositionSource {
    fn current_position(&self) -> impl Future<Output = Result<Coordinate, LocationError>> + Send;
}

/// A position known up front, e.g. from command-line flags.
#[derive(Debug, Clone, PartialEq)]
pub enum StaticPosition {
    Known(Coordinate),
    Denied,
    Unavailable,
}

impl PositionSource for StaticPosition {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        match self {
            StaticPosition::Known(coordinate) => Ok(*coordinate),
            StaticPosition::Denied => Err(LocationError::PermissionDenied),
            StaticPosition::Unavailable => Err(LocationError::Unavailable(
                "no position source configured".to_owned(),
            )),
        }
    }
}
