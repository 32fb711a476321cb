//! Geocoding and ladder inspection commands.

use nearserve_client::LocationResolver;
use nearserve_core::{scope, AppConfig, Coordinate};

/// Forward-geocode free text and print the best match.
///
/// # Errors
///
/// Returns an error if the resolver cannot be built, nothing matches
/// `query`, or the geocoder is unreachable.
pub(crate) async fn run_geocode(config: &AppConfig, query: &str) -> anyhow::Result<()> {
    let resolver = LocationResolver::new(config)?;
    let place = resolver.forward_geocode_place(query).await?;

    println!("{:<12}{}", "NAME", place.display_name);
    println!("{:<12}{}", "LATITUDE", place.coordinate.latitude());
    println!("{:<12}{}", "LONGITUDE", place.coordinate.longitude());
    Ok(())
}

/// Reverse-geocode a coordinate. Unresolvable parts print as sentinels.
///
/// # Errors
///
/// Returns an error if the coordinate is out of range or the resolver
/// cannot be built.
pub(crate) async fn run_reverse(config: &AppConfig, lat: f64, lng: f64) -> anyhow::Result<()> {
    let coordinate = Coordinate::new(lat, lng)?;
    let resolver = LocationResolver::new(config)?;
    let place = resolver.reverse_geocode(coordinate).await;

    println!("{:<10}{}", "CITY", place.city);
    println!("{:<10}{}", "STATE", place.state);
    println!("{:<10}{}", "COUNTRY", place.country);
    if !place.is_resolved() {
        println!();
        println!("(some parts could not be resolved; showing fallback values)");
    }
    Ok(())
}

/// Print the scope ladder bound to the place at `position`, or at the
/// configured default center.
///
/// # Errors
///
/// Returns an error if the coordinate is out of range or the resolver
/// cannot be built.
pub(crate) async fn run_ladder(
    config: &AppConfig,
    position: Option<(f64, f64)>,
) -> anyhow::Result<()> {
    let center = match position {
        Some((lat, lng)) => Coordinate::new(lat, lng)?,
        None => config.default_center,
    };
    let resolver = LocationResolver::new(config)?;
    let place = resolver.reverse_geocode(center).await;

    println!("Ladder for {place} {center}");
    println!();
    println!("{:<6}{:<9}SCOPE", "RUNG", "KIND");
    for (i, rung) in scope::ladder(&place).iter().enumerate() {
        println!("{:<6}{:<9}{}", i + 1, rung.kind(), rung);
    }
    Ok(())
}
