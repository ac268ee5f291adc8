use time::{macros::datetime, OffsetDateTime};

/// Mean length of a lunation in days
pub const SYNODIC_MONTH_DAYS: f64 = 29.530_588_67;

/// A known new moon used as phase zero
pub const REFERENCE_NEW_MOON: OffsetDateTime = datetime!(2000-01-06 18:14 UTC);

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Fraction of the current lunation elapsed at `now`, in `[0, 1)`
///
/// Depends on nothing but the instant.
pub fn moon_phase(now: OffsetDateTime) -> f64 {
    let days = (now - REFERENCE_NEW_MOON).as_seconds_f64() / SECONDS_PER_DAY;
    let phase = days.rem_euclid(SYNODIC_MONTH_DAYS) / SYNODIC_MONTH_DAYS;
    // rem_euclid can round up to the modulus itself for tiny negative inputs
    if phase >= 1.0 {
        0.0
    } else {
        phase
    }
}

/// Conventional eight-way name for a phase value
pub fn moon_phase_name(phase: f64) -> &'static str {
    match phase {
        p if !(0.0625..0.9375).contains(&p) => "New Moon",
        p if p < 0.1875 => "Waxing Crescent",
        p if p < 0.3125 => "First Quarter",
        p if p < 0.4375 => "Waxing Gibbous",
        p if p < 0.5625 => "Full Moon",
        p if p < 0.6875 => "Waning Gibbous",
        p if p < 0.8125 => "Last Quarter",
        _ => "Waning Crescent",
    }
}
