use model::entities::crop_rule;
use serde::Serialize;
use tracing::trace;
use utoipa::ToSchema;

use crate::forecast::WeatherMetrics;

/// Qualitative suitability label derived from a numeric score. Thresholds
/// are inclusive lower bounds evaluated highest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum SuitabilityTag {
    Excellent,
    Good,
    Moderate,
    Low,
}

impl SuitabilityTag {
    pub fn for_score(score: f64) -> Self {
        if score >= 80.0 {
            SuitabilityTag::Excellent
        } else if score >= 60.0 {
            SuitabilityTag::Good
        } else if score >= 40.0 {
            SuitabilityTag::Moderate
        } else {
            SuitabilityTag::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SuitabilityTag::Excellent => "Excellent",
            SuitabilityTag::Good => "Good",
            SuitabilityTag::Moderate => "Moderate",
            SuitabilityTag::Low => "Low",
        }
    }
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Scores a crop rule against the observed weather, 0-100.
///
/// Temperature outside the tolerated band is penalized at 8 points per
/// degree; rainfall deficit at 2 points per millimetre and rainfall excess
/// at 1.2 points per millimetre. Sub-scores floor at 0 and combine 60/40.
/// A crop cannot be evaluated without both metrics and scores 0.0.
pub fn score_crop(rule: &crop_rule::Model, metrics: &WeatherMetrics) -> f64 {
    let (Some(avg_temp), Some(total_rain)) = (metrics.avg_temp_c, metrics.total_rain_mm) else {
        return 0.0;
    };

    let temp_score = if avg_temp < rule.temp_min {
        (100.0 - (rule.temp_min - avg_temp) * 8.0).max(0.0)
    } else if avg_temp > rule.temp_max {
        (100.0 - (avg_temp - rule.temp_max) * 8.0).max(0.0)
    } else {
        100.0
    };

    let rain_score = if total_rain < rule.rain_min {
        (100.0 - (rule.rain_min - total_rain) * 2.0).max(0.0)
    } else if total_rain > rule.rain_max {
        (100.0 - (total_rain - rule.rain_max) * 1.2).max(0.0)
    } else {
        100.0
    };

    trace!(
        crop = %rule.name,
        temp_score,
        rain_score,
        "scored crop rule"
    );

    round2(temp_score * 0.6 + rain_score * 0.4)
}

/// A rule scored and tagged for one location's weather.
#[derive(Debug)]
pub struct RankedCrop<'a> {
    pub rule: &'a crop_rule::Model,
    pub score: f64,
    pub tag: SuitabilityTag,
}

/// Scores every active rule whose season set contains `season` and sorts
/// descending by score. The sort is stable, so equal scores keep the
/// rules' original order.
pub fn rank_crops<'a>(
    rules: &'a [crop_rule::Model],
    season: &str,
    metrics: &WeatherMetrics,
) -> Vec<RankedCrop<'a>> {
    let mut ranked: Vec<RankedCrop<'a>> = rules
        .iter()
        .filter(|rule| rule.active && rule.applies_to(season))
        .map(|rule| {
            let score = score_crop(rule, metrics);
            RankedCrop {
                rule,
                score,
                tag: SuitabilityTag::for_score(score),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}
