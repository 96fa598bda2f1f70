//! Per-record and per-week scoring rules.
//!
//! Each week of records is folded into a small tally, and the tallies of the
//! current and previous week are turned into tiered percentages.

use wellness_store::fields::minutes_of;
use wellness_store::{DailyHealthRecord, DailySleepRecord, FieldValue};

/// Average efficiency at or above which sleep scores full marks.
pub const EFFICIENCY_TARGET: f64 = 85.0;
/// Weekly minutes of physical activity that score full marks.
pub const ACTIVITY_TARGET_MINUTES: f64 = 150.0;
/// A week counts as a regression when it drops to this share of the last.
pub const REGRESSION_RATIO: f64 = 0.95;

const DAYS_PER_WEEK: f64 = 7.0;

/// Round to 2 decimals from the exact binary value, halves going up.
///
/// `1.115` is stored just below the half and rounds to `1.11`; `0.125` is an
/// exact half and rounds to `0.13`.
pub fn round2(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let lower = (x * 100.0).floor();
    // exact tie: x * 100 is k + 0.5 with no rounding error
    if x.mul_add(100.0, -(lower + 0.5)) == 0.0 {
        return (lower + 1.0) / 100.0;
    }
    format!("{x:.2}").parse().unwrap_or(x)
}

/// Sleep efficiency of one night as a percentage rounded to 2 decimals.
///
/// Returns `Some(0.0)` when no time in bed was recorded and `None` when the
/// ratio is undefined (nothing recorded in the denominator).
///
/// The denominator is time to fall asleep + time asleep + number of
/// awakenings; time in bed only acts as the "was anything recorded" gate.
pub fn sleep_efficiency(record: &DailySleepRecord) -> Option<f64> {
    let fall_asleep = minutes_of(
        record.fall_asleep_hours.as_ref(),
        record.fall_asleep_minutes.as_ref(),
    );
    let in_bed = minutes_of(record.in_bed_hours.as_ref(), record.in_bed_minutes.as_ref());
    let asleep = minutes_of(
        record.time_asleep_hours.as_ref(),
        record.time_asleep_minutes.as_ref(),
    );
    let woke_up = record
        .times_woke_up
        .as_ref()
        .map(FieldValue::leading_int)
        .unwrap_or(0);

    if in_bed == 0 {
        return Some(0.0);
    }

    let denominator = fall_asleep.saturating_add(asleep).saturating_add(woke_up);
    let efficiency = asleep as f64 / denominator as f64 * 100.0;
    efficiency.is_finite().then(|| round2(efficiency))
}

/// Running sum of valid nightly efficiencies for one week.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SleepTally {
    pub total_efficiency: f64,
    pub nights: usize,
}

impl SleepTally {
    pub fn from_records(records: &[DailySleepRecord]) -> Self {
        records
            .iter()
            .filter_map(sleep_efficiency)
            .fold(Self::default(), |tally, efficiency| Self {
                total_efficiency: tally.total_efficiency + efficiency,
                nights: tally.nights + 1,
            })
    }

    pub fn average(&self) -> f64 {
        if self.nights == 0 {
            0.0
        } else {
            self.total_efficiency / self.nights as f64
        }
    }
}

/// Counters gathered from one week of health records.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HealthTally {
    pub activity_minutes: f64,
    pub diet_days: usize,
    pub stress_days: usize,
    pub caffeine_days: usize,
}

impl HealthTally {
    pub fn from_records(records: &[DailyHealthRecord]) -> Self {
        records.iter().fold(Self::default(), |tally, r| {
            let counts = |field: &Option<FieldValue>, rated: bool| {
                usize::from(field.as_ref().is_some_and(|v| {
                    if rated { v.is_rated() } else { v.is_present() }
                }))
            };
            Self {
                activity_minutes: tally.activity_minutes
                    + r.min_pa.as_ref().map(FieldValue::decimal).unwrap_or(0.0),
                diet_days: tally.diet_days + counts(&r.rate_diet, true),
                stress_days: tally.stress_days + counts(&r.stress_level, true),
                caffeine_days: tally.caffeine_days + counts(&r.caffeine, false),
            }
        })
    }
}

/// Tiered sleep score: 0, 66 or 100.
///
/// Rules are checked in order:
/// 1. no valid nights this week -> 0
/// 2. average at or above target, or better than last week -> 100
/// 3. below target and down at least 5% from a positive last-week average -> 66
/// 4. anything else -> 0
pub fn sleep_efficiency_score(nights: usize, average: f64, previous_average: f64) -> u8 {
    if nights == 0 {
        0
    } else if average >= EFFICIENCY_TARGET || average > previous_average {
        100
    } else if average < EFFICIENCY_TARGET
        && previous_average > 0.0
        && average <= previous_average * REGRESSION_RATIO
    {
        66
    } else {
        0
    }
}

/// Tiered activity percentage: 0, 50 or 100.
pub fn physical_activity_percentage(total_minutes: f64, previous_minutes: f64) -> u8 {
    if total_minutes >= ACTIVITY_TARGET_MINUTES || total_minutes > previous_minutes {
        100
    } else if total_minutes > 0.0
        && (total_minutes <= previous_minutes * REGRESSION_RATIO
            || total_minutes < ACTIVITY_TARGET_MINUTES)
    {
        50
    } else {
        0
    }
}

/// Step function over the number of days a question was answered.
pub fn days_tracked_percentage(days: usize) -> u8 {
    match days {
        0 => 0,
        1 => 33,
        2 => 66,
        _ => 100,
    }
}

/// Share of the week's days with an entry, rounded to 2 decimals.
pub fn coverage_percentage(days: usize) -> f64 {
    round2(days as f64 / DAYS_PER_WEEK * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn round2_follows_the_stored_value() {
        assert_eq!(round2(1.115), 1.11);
        assert_eq!(round2(1.005), 1.0);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(97.402_597), 97.4);
        assert_eq!(round2(100.0 / 7.0), 14.29);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(round2(0.0), 0.0);
    }

    fn sleep(v: Value) -> DailySleepRecord {
        serde_json::from_value(v).unwrap()
    }

    fn health(v: Value) -> DailyHealthRecord {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn efficiency_of_typical_night() {
        let r = sleep(json!({
            "fallAsleepHours": "0", "fallAsleepMinutes": "10",
            "inBedHours": "8", "inBedMinutes": "0",
            "timeAsleepHours": "7", "timeAsleepMinutes": "30",
            "timesWokeUp": "2"
        }));
        assert_eq!(sleep_efficiency(&r), Some(97.4));
    }

    #[test]
    fn zero_time_in_bed_is_exactly_zero() {
        let r = sleep(json!({
            "fallAsleepMinutes": "15",
            "timeAsleepHours": "6",
            "timesWokeUp": "1",
            "inBedHours": "0", "inBedMinutes": "abc"
        }));
        assert_eq!(sleep_efficiency(&r), Some(0.0));
        assert_eq!(sleep_efficiency(&DailySleepRecord::default()), Some(0.0));
    }

    #[test]
    fn undefined_ratio_is_excluded() {
        let r = sleep(json!({"inBedHours": "8"}));
        assert_eq!(sleep_efficiency(&r), None);
    }

    #[test]
    fn efficiency_stays_within_bounds_for_non_negative_inputs() {
        for fall in [0, 5, 45, 120] {
            for asleep in [0, 1, 60, 420, 720] {
                for woke in [0, 1, 10, 10_000] {
                    let r = sleep(json!({
                        "fallAsleepMinutes": fall,
                        "inBedMinutes": 480,
                        "timeAsleepMinutes": asleep,
                        "timesWokeUp": woke
                    }));
                    if let Some(e) = sleep_efficiency(&r) {
                        assert!((0.0..=100.0).contains(&e), "{fall}/{asleep}/{woke} -> {e}");
                    } else {
                        assert_eq!(fall + asleep + woke, 0);
                    }
                }
            }
        }
    }

    #[test]
    fn sleep_tally_averages_valid_nights_only() {
        let records = vec![
            sleep(json!({"inBedHours": "8", "timeAsleepHours": "8"})),
            sleep(json!({"inBedHours": "8", "timeAsleepHours": "6", "fallAsleepHours": "2"})),
            sleep(json!({"inBedHours": "8"})),
        ];
        let tally = SleepTally::from_records(&records);
        assert_eq!(tally.nights, 2);
        assert_eq!(tally.average(), 87.5);
        assert_eq!(SleepTally::default().average(), 0.0);
    }

    #[test]
    fn health_tally_counts_rated_days_and_minutes() {
        let records = vec![
            health(json!({"minPA": "30", "rateDiet": "Good", "stressLevel": "null", "caffeine": "2"})),
            health(json!({"minPA": 45, "rateDiet": "null", "stressLevel": "3", "caffeine": ""})),
            health(json!({"minPA": "lots", "rateDiet": "Okay"})),
            health(json!({})),
        ];
        let tally = HealthTally::from_records(&records);
        assert_eq!(tally.activity_minutes, 75.0);
        assert_eq!(tally.diet_days, 2);
        assert_eq!(tally.stress_days, 1);
        assert_eq!(tally.caffeine_days, 1);
    }

    #[test]
    fn days_tracked_is_a_step_function() {
        assert_eq!(days_tracked_percentage(0), 0);
        assert_eq!(days_tracked_percentage(1), 33);
        assert_eq!(days_tracked_percentage(2), 66);
        assert_eq!(days_tracked_percentage(3), 100);
        assert_eq!(days_tracked_percentage(7), 100);
        assert_eq!(days_tracked_percentage(12), 100);
    }

    #[test]
    fn activity_percentage_rules() {
        assert_eq!(physical_activity_percentage(200.0, 100.0), 100);
        assert_eq!(physical_activity_percentage(150.0, 400.0), 100);
        assert_eq!(physical_activity_percentage(60.0, 30.0), 100);
        assert_eq!(physical_activity_percentage(60.0, 60.0), 50);
        assert_eq!(physical_activity_percentage(60.0, 300.0), 50);
        assert_eq!(physical_activity_percentage(0.0, 0.0), 0);
        assert_eq!(physical_activity_percentage(0.0, 120.0), 0);
    }

    #[test]
    fn activity_percentage_is_always_a_tier() {
        let samples = [0.0, 0.5, 10.0, 94.9, 95.0, 100.0, 149.9, 150.0, 151.0, 1000.0];
        for total in samples {
            for prev in samples {
                let p = physical_activity_percentage(total, prev);
                assert!([0, 50, 100].contains(&p), "{total}/{prev} -> {p}");
            }
        }
    }

    #[test]
    fn sleep_score_priorities() {
        assert_eq!(sleep_efficiency_score(0, 0.0, 90.0), 0);
        assert_eq!(sleep_efficiency_score(3, 97.4, 0.0), 100);
        // regressed but still above target
        assert_eq!(sleep_efficiency_score(3, 86.0, 99.0), 100);
        assert_eq!(sleep_efficiency_score(3, 70.0, 65.0), 100);
        assert_eq!(sleep_efficiency_score(3, 70.0, 80.0), 66);
        // exactly a 5% drop
        assert_eq!(sleep_efficiency_score(3, 76.0, 80.0), 66);
        // a smaller drop matches no rule
        assert_eq!(sleep_efficiency_score(3, 78.0, 80.0), 0);
        assert_eq!(sleep_efficiency_score(3, 80.0, 80.0), 0);
        // flat at zero is not a drop
        assert_eq!(sleep_efficiency_score(1, 0.0, 0.0), 0);
        assert_eq!(sleep_efficiency_score(7, 0.0, 0.0), 0);
    }

    #[test]
    fn unchanged_average_below_target_scores_zero() {
        for avg in [0.0, 10.0, 50.0, 80.0, 84.99] {
            assert_eq!(sleep_efficiency_score(3, avg, avg), 0, "avg {avg}");
        }
        for avg in [85.0, 90.0, 100.0] {
            assert_eq!(sleep_efficiency_score(3, avg, avg), 100, "avg {avg}");
        }
    }

    #[test]
    fn empty_previous_week_never_scores_66() {
        for avg in [0.0, 40.0, 84.99] {
            let expected = if avg > 0.0 { 100 } else { 0 };
            assert_eq!(sleep_efficiency_score(2, avg, 0.0), expected, "avg {avg}");
        }
        // a drop to zero from a real average is still a regression
        assert_eq!(sleep_efficiency_score(1, 0.0, 80.0), 66);
    }

    #[test]
    fn sleep_score_is_always_a_tier() {
        let samples = [0.0, 10.0, 66.0, 80.0, 84.99, 85.0, 90.0, 100.0];
        for nights in [0, 1, 7] {
            for avg in samples {
                for prev in samples {
                    let s = sleep_efficiency_score(nights, avg, prev);
                    assert!([0, 66, 100].contains(&s));
                }
            }
        }
    }

    #[test]
    fn coverage_rounds_to_two_decimals() {
        assert_eq!(coverage_percentage(0), 0.0);
        assert_eq!(coverage_percentage(1), 14.29);
        assert_eq!(coverage_percentage(7), 100.0);
    }
}
