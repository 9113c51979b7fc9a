use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::forecast::WeatherMetrics;

/// Indian agricultural cropping season labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Season {
    /// Monsoon-sown (roughly June through October).
    Kharif,
    /// Winter-sown (roughly November through March).
    Rabi,
    /// Dry season (April and May).
    Summer,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Kharif => "Kharif",
            Season::Rabi => "Rabi",
            Season::Summer => "Summer",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base season from the calendar month alone (1-12).
pub fn month_to_season(month: u32) -> Season {
    match month {
        6..=10 => Season::Kharif,
        11 | 12 | 1..=3 => Season::Rabi,
        _ => Season::Summer, // Apr-May
    }
}

/// Season biased by observed weather.
///
/// With either metric absent the month's base season stands. Otherwise the
/// overrides below are tried in order and the first match wins; overlapping
/// conditions are resolved by this order, not by closest fit.
pub fn classify(month: u32, metrics: &WeatherMetrics) -> Season {
    let base = month_to_season(month);
    let (Some(avg_temp), Some(total_rain)) = (metrics.avg_temp_c, metrics.total_rain_mm) else {
        return base;
    };

    if total_rain >= 40.0 && avg_temp >= 22.0 {
        return Season::Kharif;
    }
    if (10.0..=25.0).contains(&avg_temp) && total_rain <= 30.0 {
        return Season::Rabi;
    }
    if avg_temp >= 30.0 && total_rain <= 20.0 {
        return Season::Summer;
    }
    base
}
