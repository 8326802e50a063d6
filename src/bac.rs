//! Blood-alcohol estimation
//!
//! Widmark-style conversion of unmetabolized units into blood and breath
//! concentration. Two variants: a fixed-coefficient estimate, and a
//! personalized estimate that adjusts the distribution coefficient and the
//! elimination rate from the body profile. Both are total functions: any
//! malformed input degrades to a documented default instead of an error.

use crate::elimination::ELIMINATION_RATE_UNITS_PER_HOUR;
use crate::types::{
    ActivityLevel, AdvancedBacEstimate, BacEstimate, BodyProfile, Gender, MetabolismInfo,
    ResolvedProfile, DEFAULT_WEIGHT_KG,
};
use crate::units::{round2, GRAMS_PER_UNIT};

/// Widmark body-water distribution coefficients
pub const WIDMARK_FACTOR_MALE: f64 = 0.7;
pub const WIDMARK_FACTOR_FEMALE: f64 = 0.6;

/// Fixed blood:breath scaling for the mg/L breath figure
pub const BLOOD_TO_BREATH_RATIO: f64 = 0.5;

/// Bounds for the personalized elimination rate, units per hour
pub const MIN_ELIMINATION_RATE: f64 = 0.11;
pub const MAX_ELIMINATION_RATE: f64 = 0.22;

/// Simple Widmark estimate.
///
/// `blood = units × 10 g / (weight × widmark) × speed_factor` in g/L, with
/// breath at half that value in mg/L. A non-finite or non-positive weight
/// falls back to 70 kg, a non-finite or non-positive speed factor to 1.0,
/// and non-finite or negative units to 0.
pub fn estimate_bac(
    current_units: f64,
    weight_kg: f64,
    is_male: bool,
    speed_factor: f64,
) -> BacEstimate {
    let units = sanitize_units(current_units);
    let weight = if weight_kg.is_finite() && weight_kg > 0.0 {
        weight_kg
    } else {
        DEFAULT_WEIGHT_KG
    };
    let factor = if speed_factor.is_finite() && speed_factor > 0.0 {
        speed_factor
    } else {
        1.0
    };
    let widmark = if is_male {
        WIDMARK_FACTOR_MALE
    } else {
        WIDMARK_FACTOR_FEMALE
    };

    let alcohol_grams = units * GRAMS_PER_UNIT;
    let blood_alcohol = round2(alcohol_grams / (weight * widmark) * factor);

    BacEstimate {
        blood_alcohol,
        breath_alcohol: round2(blood_alcohol * BLOOD_TO_BREATH_RATIO),
    }
}

/// Personalized Widmark estimate.
///
/// The profile is resolved against defaults in one merge step, then the
/// distribution coefficient is adjusted for body composition and the
/// elimination rate for age and activity level. Never panics; every output
/// field is finite and non-negative regardless of how malformed the profile
/// is.
pub fn estimate_advanced_bac(
    current_units: f64,
    profile: Option<&BodyProfile>,
) -> AdvancedBacEstimate {
    let units = sanitize_units(current_units);
    let resolved = ResolvedProfile::from_partial(profile);
    let bmi = resolved.bmi();

    let widmark_factor = adjusted_widmark_factor(&resolved, bmi);
    let elimination_rate = adjusted_elimination_rate(&resolved, bmi);

    let blood_alcohol = round2(units * GRAMS_PER_UNIT / (resolved.weight_kg * widmark_factor));
    let time_to_sober_hours = if units > 0.0 {
        units / elimination_rate
    } else {
        0.0
    };

    AdvancedBacEstimate {
        blood_alcohol,
        breath_alcohol: round2(blood_alcohol * BLOOD_TO_BREATH_RATIO),
        elimination_rate,
        time_to_sober_hours,
        widmark_factor,
        metabolism: MetabolismInfo { bmi: round2(bmi) },
    }
}

fn sanitize_units(units: f64) -> f64 {
    if units.is_finite() && units > 0.0 {
        units
    } else {
        0.0
    }
}

/// Distribution coefficient adjusted for body composition.
///
/// Heavier-set subjects carry a smaller body-water fraction, lean subjects a
/// larger one. The sex base keeps the female coefficient below the male one,
/// so female blood alcohol stays at or above the male figure for equal
/// weight.
fn adjusted_widmark_factor(profile: &ResolvedProfile, bmi: f64) -> f64 {
    let base = match profile.gender {
        Gender::Male => WIDMARK_FACTOR_MALE,
        Gender::Female => WIDMARK_FACTOR_FEMALE,
    };
    let adjustment = if bmi >= 30.0 {
        -0.04
    } else if bmi < 20.0 {
        0.02
    } else {
        0.0
    };
    (base + adjustment).clamp(0.5, 0.75)
}

/// Personalized units/hour clearance.
///
/// Starts from the population-average rate and nudges it for activity level,
/// leanness, and age, clamped to a realistic band.
fn adjusted_elimination_rate(profile: &ResolvedProfile, bmi: f64) -> f64 {
    let mut rate = ELIMINATION_RATE_UNITS_PER_HOUR;

    rate += match profile.activity_level {
        ActivityLevel::Sedentary => -0.02,
        ActivityLevel::Light => -0.01,
        ActivityLevel::Moderate => 0.0,
        ActivityLevel::Active => 0.01,
        ActivityLevel::VeryActive => 0.02,
    };

    if bmi < 25.0 {
        rate += 0.005;
    }
    if profile.age > 50.0 {
        rate -= 0.01;
    } else if profile.age < 25.0 {
        rate += 0.005;
    }

    rate.clamp(MIN_ELIMINATION_RATE, MAX_ELIMINATION_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_reference_value() {
        // 4 units, 80 kg male: 40 g / (80 * 0.7) = 0.71 g/L
        let estimate = estimate_bac(4.0, 80.0, true, 1.0);
        assert_eq!(estimate.blood_alcohol, 0.71);
        assert_eq!(estimate.breath_alcohol, 0.35);
    }

    #[test]
    fn test_female_higher_than_male_for_equal_inputs() {
        let male = estimate_bac(3.0, 70.0, true, 1.0);
        let female = estimate_bac(3.0, 70.0, false, 1.0);
        assert!(female.blood_alcohol > male.blood_alcohol);
    }

    #[test]
    fn test_speed_factor_scales_result() {
        let neutral = estimate_bac(3.0, 70.0, true, 1.0);
        let binge = estimate_bac(3.0, 70.0, true, 1.4);
        assert!(binge.blood_alcohol > neutral.blood_alcohol);
    }

    #[test]
    fn test_simple_sanitizes_garbage_inputs() {
        let estimate = estimate_bac(f64::NAN, -10.0, true, f64::INFINITY);
        assert_eq!(estimate.blood_alcohol, 0.0);
        assert_eq!(estimate.breath_alcohol, 0.0);

        let estimate = estimate_bac(2.0, f64::NAN, true, 0.0);
        assert!(estimate.blood_alcohol.is_finite());
        assert!(estimate.blood_alcohol > 0.0);
    }

    #[test]
    fn test_advanced_defaults_match_simple_shape() {
        let estimate = estimate_advanced_bac(2.0, None);
        // Default profile: 70 kg male, BMI 24.2, moderate activity
        assert!(estimate.blood_alcohol > 0.0);
        assert_eq!(
            estimate.breath_alcohol,
            (estimate.blood_alcohol * 0.5 * 100.0).round() / 100.0
        );
        assert!((estimate.metabolism.bmi - 24.22).abs() < 0.01);
    }

    #[test]
    fn test_advanced_never_panics_on_malformed_profile() {
        let garbage = BodyProfile {
            age: Some(f64::NEG_INFINITY),
            gender: None,
            height_cm: Some(f64::NAN),
            weight_kg: Some(-80.0),
            activity_level: None,
        };
        let estimate = estimate_advanced_bac(f64::INFINITY, Some(&garbage));
        assert!(estimate.blood_alcohol.is_finite());
        assert!(estimate.blood_alcohol >= 0.0);
        assert!(estimate.breath_alcohol.is_finite());
        assert!(estimate.elimination_rate.is_finite());
        assert!(estimate.time_to_sober_hours.is_finite());
        assert!(estimate.time_to_sober_hours >= 0.0);
        assert!(estimate.widmark_factor.is_finite());
        assert!(estimate.metabolism.bmi.is_finite());
    }

    #[test]
    fn test_advanced_strictly_increasing_in_units() {
        let profile = BodyProfile {
            weight_kg: Some(75.0),
            ..Default::default()
        };
        let low = estimate_advanced_bac(1.0, Some(&profile));
        let mid = estimate_advanced_bac(3.0, Some(&profile));
        let high = estimate_advanced_bac(6.0, Some(&profile));
        assert!(low.blood_alcohol < mid.blood_alcohol);
        assert!(mid.blood_alcohol < high.blood_alcohol);
    }

    #[test]
    fn test_advanced_female_at_or_above_male_for_equal_weight() {
        let female = BodyProfile {
            gender: Some(Gender::Female),
            weight_kg: Some(70.0),
            ..Default::default()
        };
        let male = BodyProfile {
            gender: Some(Gender::Male),
            weight_kg: Some(70.0),
            ..Default::default()
        };
        let female_estimate = estimate_advanced_bac(3.0, Some(&female));
        let male_estimate = estimate_advanced_bac(3.0, Some(&male));
        assert!(female_estimate.blood_alcohol >= male_estimate.blood_alcohol);
    }

    #[test]
    fn test_advanced_differs_between_contrasting_profiles() {
        let light_female = BodyProfile {
            gender: Some(Gender::Female),
            weight_kg: Some(55.0),
            height_cm: Some(165.0),
            ..Default::default()
        };
        let heavy_male = BodyProfile {
            gender: Some(Gender::Male),
            weight_kg: Some(95.0),
            height_cm: Some(185.0),
            ..Default::default()
        };
        let hers = estimate_advanced_bac(3.0, Some(&light_female));
        let his = estimate_advanced_bac(3.0, Some(&heavy_male));
        assert!((hers.blood_alcohol - his.blood_alcohol).abs() > 0.1);
        assert!(hers.blood_alcohol > his.blood_alcohol);
    }

    #[test]
    fn test_elimination_rate_stays_in_realistic_band() {
        let profiles = [
            BodyProfile::default(),
            BodyProfile {
                age: Some(72.0),
                activity_level: Some(ActivityLevel::Sedentary),
                weight_kg: Some(110.0),
                height_cm: Some(165.0),
                ..Default::default()
            },
            BodyProfile {
                age: Some(21.0),
                activity_level: Some(ActivityLevel::VeryActive),
                weight_kg: Some(62.0),
                height_cm: Some(180.0),
                ..Default::default()
            },
        ];
        for profile in &profiles {
            let estimate = estimate_advanced_bac(2.0, Some(profile));
            assert!(estimate.elimination_rate > 0.1);
            assert!(estimate.elimination_rate < 0.25);
        }
    }

    #[test]
    fn test_time_to_sober_scales_with_units() {
        let two = estimate_advanced_bac(2.0, None);
        let four = estimate_advanced_bac(4.0, None);
        assert!(two.time_to_sober_hours > 0.0);
        assert!((four.time_to_sober_hours - 2.0 * two.time_to_sober_hours).abs() < 1e-9);
    }

    #[test]
    fn test_time_to_sober_zero_when_sober() {
        let estimate = estimate_advanced_bac(0.0, None);
        assert_eq!(estimate.time_to_sober_hours, 0.0);
    }

    #[test]
    fn test_more_active_profiles_clear_faster() {
        let sedentary = BodyProfile {
            activity_level: Some(ActivityLevel::Sedentary),
            ..Default::default()
        };
        let active = BodyProfile {
            activity_level: Some(ActivityLevel::VeryActive),
            ..Default::default()
        };
        let slow = estimate_advanced_bac(3.0, Some(&sedentary));
        let fast = estimate_advanced_bac(3.0, Some(&active));
        assert!(fast.elimination_rate > slow.elimination_rate);
        assert!(fast.time_to_sober_hours < slow.time_to_sober_hours);
    }
}
