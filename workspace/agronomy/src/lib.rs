//! Pure crop-guidance computations: forecast summarization, season
//! classification and crop suitability scoring. No I/O happens here; the
//! HTTP layer feeds weather samples and rules in and serializes the
//! results back out.

pub mod forecast;
pub mod scoring;
pub mod season;

pub use forecast::{summarize, ForecastSample, WeatherMetrics};
pub use scoring::{rank_crops, round2, score_crop, RankedCrop, SuitabilityTag};
pub use season::{classify, month_to_season, Season};
