//! Tolerance-aware comparison of live and stored values
//!
//! Diffing is exact. These helpers serve the looser "is the live value still
//! where we left it" question and the `IsClose` search predicate.

use crate::model::{EpicsData, EpicsValue};

/// Bounds accepted around `target`
///
/// `lower = target - target * rel_tol - abs_tol`,
/// `upper = target + target * rel_tol + abs_tol`.
///
/// A negative `target` with a positive `rel_tol` yields `lower > upper`; the
/// interval is returned as computed and no value falls inside it.
pub fn isclose_bounds(target: f64, rel_tol: f64, abs_tol: f64) -> (f64, f64) {
    let lower = target - target * rel_tol - abs_tol;
    let upper = target + target * rel_tol + abs_tol;
    (lower, upper)
}

/// Whether `value` lies in `[lower, upper]` for the given target and tolerances
pub fn is_close(value: f64, target: f64, rel_tol: f64, abs_tol: f64) -> bool {
    let (lower, upper) = isclose_bounds(target, rel_tol, abs_tol);
    lower <= value && value <= upper
}

/// Compare a live value against a stored one
///
/// Numeric pairs use `is_close` with the stored value as target; anything else
/// must match exactly.
pub fn within_tolerance(stored: &EpicsValue, live: &EpicsValue, rel_tol: f64, abs_tol: f64) -> bool {
    match (stored.as_f64(), live.as_f64()) {
        (Some(target), Some(value)) => is_close(value, target, rel_tol, abs_tol),
        _ => stored == live,
    }
}

/// Compare a live reading against a stored value, going through enum labels
///
/// Enum channels may be stored by label while the live reading carries the
/// index, or the other way round.
pub fn reading_within_tolerance(
    stored: &EpicsValue,
    live: &EpicsData,
    rel_tol: f64,
    abs_tol: f64,
) -> bool {
    if !live.enums.is_empty() {
        let live_label = live.enum_label(&live.data);
        let stored_label = match stored {
            EpicsValue::Str(s) => Some(s.as_str()),
            other => live.enum_label(other),
        };
        if let (Some(a), Some(b)) = (stored_label, live_label) {
            return a == b;
        }
    }
    within_tolerance(stored, &live.data, rel_tol, abs_tol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_bounds_for_positive_target() {
        let (lower, upper) = isclose_bounds(10.0, 0.1, 0.5);
        assert!(approx(lower, 8.5));
        assert!(approx(upper, 11.5));
    }

    #[test]
    fn test_negative_target_inverts_interval() {
        let (lower, upper) = isclose_bounds(-10.0, 0.1, 0.0);
        assert!(approx(lower, -9.0));
        assert!(approx(upper, -11.0));
        assert!(lower > upper);
        assert!(!is_close(-10.0, -10.0, 0.1, 0.0));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(is_close(11.5, 10.0, 0.1, 0.5));
        assert!(is_close(8.5, 10.0, 0.1, 0.5));
        assert!(!is_close(11.6, 10.0, 0.1, 0.5));
    }

    #[test]
    fn test_within_tolerance_mixed_types() {
        assert!(within_tolerance(&EpicsValue::Int(5), &EpicsValue::Float(5.2), 0.0, 0.5));
        assert!(within_tolerance(&"on".into(), &"on".into(), 0.1, 0.1));
        assert!(!within_tolerance(&"on".into(), &EpicsValue::Int(1), 0.1, 0.1));
    }

    #[test]
    fn test_reading_compares_enum_labels() {
        let live = EpicsData::new(1_i64).with_enums(vec!["Out".into(), "In".into()]);
        assert!(reading_within_tolerance(&"In".into(), &live, 0.0, 0.0));
        assert!(!reading_within_tolerance(&"Out".into(), &live, 0.0, 0.0));
        assert!(reading_within_tolerance(&EpicsValue::Int(1), &live, 0.0, 0.0));
    }

    proptest! {
        #[test]
        fn prop_target_is_close_to_itself_when_non_negative(
            target in 0.0f64..1e6,
            rel in 0.0f64..1.0,
            abs in 0.0f64..10.0,
        ) {
            prop_assert!(is_close(target, target, rel, abs));
        }

        #[test]
        fn prop_bounds_width_matches_tolerances(
            target in -1e6f64..1e6,
            rel in 0.0f64..1.0,
            abs in 0.0f64..10.0,
        ) {
            let (lower, upper) = isclose_bounds(target, rel, abs);
            let width = upper - lower;
            prop_assert!((width - 2.0 * (target * rel + abs)).abs() < 1e-6);
        }
    }
}
