use std::fmt::Display;

use tracing::debug;

use crate::{
    ConfigError, Field, IndicatorSnapshot,
    slope::{field_slope, histogram_slope},
};

const DEFAULT_WINDOW: usize = 20;

/// Trend analysis configuration: the number of trailing snapshots the
/// slopes are fitted over (default 20, at least 2).
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "TrendConfigBuilder")
)]
pub struct TrendConfig {
    window: usize,
}

impl TrendConfig {
    /// Returns a new builder with default values.
    #[must_use]
    pub fn builder() -> TrendConfigBuilder {
        TrendConfigBuilder::new()
    }

    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
        }
    }
}

impl Display for TrendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TrendConfig({})", self.window)
    }
}

/// Builder for [`TrendConfig`].
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(default = "TrendConfigBuilder::new")
)]
pub struct TrendConfigBuilder {
    window: usize,
}

impl TrendConfigBuilder {
    fn new() -> Self {
        Self {
            window: DEFAULT_WINDOW,
        }
    }

    #[must_use]
    pub fn window(mut self, length: usize) -> Self {
        self.window = length;
        self
    }

    /// Builds the config.
    ///
    /// # Errors
    ///
    /// [`ConfigError::WindowTooShort`] for a window under two snapshots.
    pub fn build(self) -> Result<TrendConfig, ConfigError> {
        if self.window < 2 {
            return Err(ConfigError::WindowTooShort {
                name: "trend",
                length: self.window,
            });
        }
        Ok(TrendConfig {
            window: self.window,
        })
    }
}

impl TryFrom<TrendConfigBuilder> for TrendConfig {
    type Error = ConfigError;

    fn try_from(builder: TrendConfigBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

/// Near-term price direction.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    /// `Up` when both slopes are positive, `Down` when both are negative,
    /// `Flat` otherwise.
    fn classify(price: Option<f64>, sma: Option<f64>) -> Self {
        match (price, sma) {
            (Some(p), Some(s)) if p > 0.0 && s > 0.0 => Self::Up,
            (Some(p), Some(s)) if p < 0.0 && s < 0.0 => Self::Down,
            _ => Self::Flat,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Flat => "flat",
        })
    }
}

/// MACD histogram momentum, independent of [`Direction`].
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Momentum {
    Rising,
    Falling,
    Flat,
}

impl Momentum {
    pub(crate) fn from_slope(slope: Option<f64>) -> Self {
        match slope {
            Some(s) if s > 0.0 => Self::Rising,
            Some(s) if s < 0.0 => Self::Falling,
            _ => Self::Flat,
        }
    }
}

impl Display for Momentum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Rising => "rising",
            Self::Falling => "falling",
            Self::Flat => "flat",
        })
    }
}

/// Least-squares slopes over the trend window and the resulting
/// classification. A slope is `None` when any value of its series inside
/// the window is undefined, or the window is not yet full.
#[derive(PartialEq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrendResult {
    pub price_slope: Option<f64>,
    pub sma_slope: Option<f64>,
    pub macd_hist_slope: Option<f64>,
    pub rsi_slope: Option<f64>,
    /// MACD histogram of the latest snapshot.
    pub histogram: Option<f64>,
    pub direction: Direction,
    pub momentum: Momentum,
}

impl TrendResult {
    /// No slopes, flat direction and momentum.
    #[must_use]
    pub fn flat(histogram: Option<f64>) -> Self {
        Self {
            price_slope: None,
            sma_slope: None,
            macd_hist_slope: None,
            rsi_slope: None,
            histogram,
            direction: Direction::Flat,
            momentum: Momentum::Flat,
        }
    }
}

/// Fits slopes of price, SMA-short, MACD histogram and RSI over the
/// trailing [`window`](TrendConfig::window) snapshots and classifies them.
///
/// # Example
///
/// ```
/// use quantedge_advisor::{analyze_trend, Direction, IndicatorSnapshot, TrendConfig};
///
/// let window: Vec<_> = (0..20_u32)
///     .map(|i| IndicatorSnapshot {
///         timestamp: u64::from(i),
///         price: Some(0.60 + f64::from(i) * 0.001),
///         rsi: Some(60.0),
///         macd: Some(0.0),
///         macd_signal: Some(0.0),
///         sma_short: Some(0.59 + f64::from(i) * 0.0005),
///         sma_long: None,
///     })
///     .collect();
///
/// let trend = analyze_trend(&window, &TrendConfig::default());
/// assert_eq!(trend.direction, Direction::Up);
/// ```
#[must_use]
pub fn analyze_trend(window: &[IndicatorSnapshot], config: &TrendConfig) -> TrendResult {
    let histogram = window.last().and_then(|s| s.require_histogram().ok());

    let Some(start) = window.len().checked_sub(config.window) else {
        debug!(
            required = config.window,
            available = window.len(),
            "trend window incomplete"
        );
        return TrendResult::flat(histogram);
    };
    let window = &window[start..];

    let price_slope = field_slope(window, Field::Price).ok();
    let sma_slope = field_slope(window, Field::SmaShort).ok();
    let macd_hist_slope = histogram_slope(window).ok();

    TrendResult {
        price_slope,
        sma_slope,
        macd_hist_slope,
        rsi_slope: field_slope(window, Field::Rsi).ok(),
        histogram,
        direction: Direction::classify(price_slope, sma_slope),
        momentum: Momentum::from_slope(macd_hist_slope),
    }
}
