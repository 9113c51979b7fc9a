use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

/// Number of 3-hour samples considered by the summary (~72 hours).
const FORECAST_WINDOW: usize = 24;

/// One timestamped reading from the upstream forecast. Fields the upstream
/// omitted (or reported unusably) arrive as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForecastSample {
    /// Air temperature in degrees Celsius.
    pub temp_c: Option<f64>,
    /// Precipitation accumulated over the 3-hour interval, in millimetres.
    pub rain_3h_mm: Option<f64>,
}

/// The two scalars the guidance logic runs on.
///
/// `avg_temp_c` is `None` when no sample carried a usable temperature;
/// `total_rain_mm` is `None` only when there were no samples at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct WeatherMetrics {
    pub avg_temp_c: Option<f64>,
    pub total_rain_mm: Option<f64>,
}

impl WeatherMetrics {
    /// Both metrics absent; produced when the upstream returned no samples.
    pub fn empty() -> Self {
        Self {
            avg_temp_c: None,
            total_rain_mm: None,
        }
    }
}

/// Reduces a raw forecast to average temperature and total rainfall over
/// the near-term window.
///
/// Only the first [`FORECAST_WINDOW`] samples are considered. Samples
/// without a temperature are skipped for the average; samples without a
/// rain volume contribute 0 to the total.
pub fn summarize(samples: &[ForecastSample]) -> WeatherMetrics {
    let window = &samples[..samples.len().min(FORECAST_WINDOW)];
    if window.is_empty() {
        debug!("forecast contained no samples, producing empty metrics");
        return WeatherMetrics::empty();
    }

    let temps: Vec<f64> = window.iter().filter_map(|s| s.temp_c).collect();
    let total_rain: f64 = window.iter().map(|s| s.rain_3h_mm.unwrap_or(0.0)).sum();

    let avg_temp = if temps.is_empty() {
        None
    } else {
        Some(temps.iter().sum::<f64>() / temps.len() as f64)
    };

    WeatherMetrics {
        avg_temp_c: avg_temp,
        total_rain_mm: Some(total_rain),
    }
}
