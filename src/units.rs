//! Standard-unit conversion
//!
//! Converts a drink's serving volume and strength into standard alcohol
//! units. One standard unit is 10 g of pure ethanol.

/// Density of ethanol, grams per milliliter
pub const ETHANOL_DENSITY_G_PER_ML: f64 = 0.8;

/// Grams of pure ethanol in one standard unit
pub const GRAMS_PER_UNIT: f64 = 10.0;

/// Compute standard units for one serving.
///
/// Pure alcohol volume (cl) is `volume_cl × strength_percent / 100`; at
/// 10 ml/cl and 0.8 g/ml that is `volume_cl × strength_percent × 8 / 100`
/// grams, and at 10 g per unit the closed form is
/// `volume_cl × strength_percent × 0.8 / 100`.
///
/// Non-finite or negative input yields 0, as does a product that overflows
/// out of the finite range. The result is rounded to two decimals and is
/// always finite and non-negative.
pub fn compute_units(volume_cl: f64, strength_percent: f64) -> f64 {
    if !volume_cl.is_finite()
        || !strength_percent.is_finite()
        || volume_cl < 0.0
        || strength_percent < 0.0
    {
        return 0.0;
    }

    let units = volume_cl * strength_percent * ETHANOL_DENSITY_G_PER_ML / 100.0;
    if !units.is_finite() {
        return 0.0;
    }

    round2(units)
}

/// Round to two decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_servings() {
        // 50 cl of 5% beer = 2.00 units
        assert_eq!(compute_units(50.0, 5.0), 2.0);
        // 12.5 cl of 12% wine = 1.20 units
        assert_eq!(compute_units(12.5, 12.0), 1.2);
        // 4 cl of 40% spirit ~ 1.28 units
        assert!((compute_units(4.0, 40.0) - 1.28).abs() < 0.01);
    }

    #[test]
    fn test_invalid_input_yields_zero() {
        assert_eq!(compute_units(f64::NAN, 5.0), 0.0);
        assert_eq!(compute_units(50.0, f64::NAN), 0.0);
        assert_eq!(compute_units(f64::INFINITY, 5.0), 0.0);
        assert_eq!(compute_units(50.0, f64::NEG_INFINITY), 0.0);
        assert_eq!(compute_units(-1.0, 5.0), 0.0);
        assert_eq!(compute_units(50.0, -0.1), 0.0);
    }

    #[test]
    fn test_overflowing_product_yields_zero() {
        assert_eq!(compute_units(f64::MAX, f64::MAX), 0.0);
    }

    #[test]
    fn test_large_and_fractional_inputs_stay_finite() {
        let huge = compute_units(1.0e6, 96.0);
        assert!(huge.is_finite());
        assert!(huge > 0.0);

        let tiny = compute_units(0.3, 0.5);
        assert!(tiny.is_finite());
        assert!(tiny >= 0.0);
    }

    #[test]
    fn test_monotonic_in_volume_and_strength() {
        assert!(compute_units(30.0, 5.0) < compute_units(50.0, 5.0));
        assert!(compute_units(50.0, 4.5) < compute_units(50.0, 5.5));
    }

    #[test]
    fn test_zero_inputs() {
        assert_eq!(compute_units(0.0, 40.0), 0.0);
        assert_eq!(compute_units(50.0, 0.0), 0.0);
    }
}
