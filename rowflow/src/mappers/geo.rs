const EARTH_RADIUS_KM: f64 = 6373.0;

/// Great-circle distance in kilometers between two `(longitude,
/// latitude)` points given in degrees.
pub fn haversine_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lon1, lat1) = (a.0.to_radians(), a.1.to_radians());
    let (lon2, lat2) = (b.0.to_radians(), b.1.to_radians());
    let chord = ((lat2 - lat1) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.0).sin().powi(2);
    2.0 * chord.sqrt().asin() * EARTH_RADIUS_KM
}
