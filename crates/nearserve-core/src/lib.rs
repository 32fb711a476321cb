//! Domain types and pure algorithms for progressive provider discovery.
//!
//! Nothing in this crate performs I/O: distance computation, result ranking
//! and the scope ladder are plain functions over the types defined here, so
//! they can be tested without a network or a runtime.

pub mod app_config;
pub mod config;
pub mod error;
pub mod geo;
pub mod query;
pub mod rank;
pub mod scope;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use geo::{Coordinate, PlaceInfo, UNKNOWN_CITY, UNKNOWN_STATE};
pub use query::{ProviderResult, SearchHistoryEntry, SearchQuery};
pub use rank::{rank, rank_by_rating, rank_for_scope};
pub use scope::{ScopeRung, ScopeSpec, SCOPE_LADDER};
