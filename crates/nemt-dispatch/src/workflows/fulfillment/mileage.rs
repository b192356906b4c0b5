use super::domain::Address;

const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Straight-line (haversine) miles between two addresses, rounded to a tenth of a mile.
///
/// Coordinate deltas are taken as absolute values so swapping the arguments yields the exact
/// same bits.
pub fn calculate_mileage(pickup: &Address, dropoff: &Address) -> f64 {
    if pickup == dropoff {
        return 0.0;
    }

    let from = pickup.location;
    let to = dropoff.location;

    let delta_lat = (to.latitude - from.latitude).abs().to_radians();
    let delta_lon = (to.longitude - from.longitude).abs().to_radians();
    let lat_product = from.latitude.to_radians().cos() * to.latitude.to_radians().cos();

    let half_chord =
        (delta_lat / 2.0).sin().powi(2) + lat_product * (delta_lon / 2.0).sin().powi(2);
    let arc = 2.0 * half_chord.sqrt().min(1.0).asin();

    round_tenths(EARTH_RADIUS_MILES * arc)
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
