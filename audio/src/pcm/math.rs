//! Sample grid arithmetic.
//!
//! Pure numeric helpers shared by the resamplers: fixed-precision rounding,
//! linear interpolation between integer samples, and gcd/lcm for rate math.

/// Number of decimal places kept on every fractional frame position.
///
/// Rounding the decimation rate, the frame pointer and the interpolation
/// weight to this precision keeps accumulated floating point error from
/// shifting the frame selection over long streams.
pub const DECIMAL_PLACES: u32 = 6;

/// Rounds `value` to `places` decimal places, ties away from zero.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Rounds to the nearest integer, ties toward positive infinity.
///
/// `-2.5` rounds to `-2` and `2.5` rounds to `3`.
#[inline]
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Interpolates linearly between samples `a` and `b`.
///
/// A `distance` at or below 0 returns `a` and at or above 1 returns `b`
/// unchanged, so neither endpoint is ever touched by rounding.
pub fn interpolate_linear(a: i32, b: i32, distance: f64) -> i32 {
    if distance <= 0.0 {
        return a;
    }
    if distance >= 1.0 {
        return b;
    }
    let a = f64::from(a);
    let b = f64::from(b);
    round_half_up(a + (b - a) * distance) as i32
}

/// Greatest common divisor (Euclid).
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Least common multiple. Returns 0 if either argument is 0.
pub fn lcm(a: u64, b: u64) -> u64 {
    if a == 0 || b == 0 {
        return 0;
    }
    a / gcd(a, b) * b
}
