pub mod logger;
pub mod month;

/// Round to two decimal places. Scores are reported at centi-point precision.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
