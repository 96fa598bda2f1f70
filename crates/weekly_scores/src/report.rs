use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The six progress metrics, in display order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum MetricLabel {
    #[serde(rename = "Sleep Efficiency")]
    SleepEfficiency,
    #[serde(rename = "Body Comp")]
    BodyComp,
    #[serde(rename = "Nutrition")]
    Nutrition,
    #[serde(rename = "Physical Activity")]
    PhysicalActivity,
    #[serde(rename = "Stress")]
    Stress,
    #[serde(rename = "Weekly Lesson")]
    WeeklyLesson,
}

impl MetricLabel {
    pub const ALL: [MetricLabel; 6] = [
        MetricLabel::SleepEfficiency,
        MetricLabel::BodyComp,
        MetricLabel::Nutrition,
        MetricLabel::PhysicalActivity,
        MetricLabel::Stress,
        MetricLabel::WeeklyLesson,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricLabel::SleepEfficiency => "Sleep Efficiency",
            MetricLabel::BodyComp => "Body Comp",
            MetricLabel::Nutrition => "Nutrition",
            MetricLabel::PhysicalActivity => "Physical Activity",
            MetricLabel::Stress => "Stress",
            MetricLabel::WeeklyLesson => "Weekly Lesson",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SleepEfficiency {
    /// 0, 66 or 100.
    pub score: u8,
    /// Mean nightly efficiency over the week's valid nights.
    pub avg_efficiency: f64,
}

/// How much of the week was logged at all.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct TrackingCoverage {
    /// Days with caffeine logged, as a percentage of 7.
    pub food_tracking: f64,
    /// Nights with a usable sleep entry, as a percentage of 7.
    pub sleep_tracking: f64,
}

/// Result of one weekly aggregation run. `Default` is the all-zero report
/// returned when nobody is signed in.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct WeeklyScoreReport {
    /// First day (Sunday) of the scored week, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_start: Option<String>,
    /// Last day (Saturday) of the scored week, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_end: Option<String>,
    pub sleep_efficiency: SleepEfficiency,
    pub body_comp: u8,
    pub nutrition: u8,
    pub physical_activity: u8,
    pub stress: u8,
    pub weekly_lesson: u8,
    pub coverage: TrackingCoverage,
}

/// One entry of the flat six-metric view.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ProgressItem {
    pub label: MetricLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "avgEfficiency")]
    pub avg_efficiency: Option<f64>,
}

impl WeeklyScoreReport {
    /// Flatten into the fixed list of six labelled entries. Sleep carries a
    /// score and average efficiency, every other metric a value.
    pub fn progress_items(&self) -> Vec<ProgressItem> {
        MetricLabel::ALL
            .iter()
            .map(|&label| {
                let value = |v: u8| ProgressItem {
                    label,
                    value: Some(v),
                    score: None,
                    avg_efficiency: None,
                };
                match label {
                    MetricLabel::SleepEfficiency => ProgressItem {
                        label,
                        value: None,
                        score: Some(self.sleep_efficiency.score),
                        avg_efficiency: Some(self.sleep_efficiency.avg_efficiency),
                    },
                    MetricLabel::BodyComp => value(self.body_comp),
                    MetricLabel::Nutrition => value(self.nutrition),
                    MetricLabel::PhysicalActivity => value(self.physical_activity),
                    MetricLabel::Stress => value(self.stress),
                    MetricLabel::WeeklyLesson => value(self.weekly_lesson),
                }
            })
            .collect()
    }
}
