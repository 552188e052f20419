use std::fmt::Display;

use tracing::debug;

use crate::{
    ConfigError, Field, IndicatorSnapshot, Rule, ScoreResult, Unavailable,
    scoring::{check_threshold, check_weights},
    slope::{field_slope, histogram_slope},
};

const DEFAULT_WINDOW: usize = 5;
const DEFAULT_RSI_NEUTRAL: f64 = 50.0;

/// Weakening-probability configuration.
///
/// Slopes are fitted over the trailing `window` snapshots (default 5).
///
/// | Condition                | Fires when                                     | Default weight |
/// |--------------------------|------------------------------------------------|----------------|
/// | `macd_histogram_falling` | histogram slope < 0                            | 40             |
/// | `price_lagging_sma`      | price slope < SMA-short slope                  | 30             |
/// | `rsi_fading`             | latest RSI < `rsi_neutral` (50), RSI slope < 0 | 30             |
#[derive(PartialEq, Clone, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "WeakeningConfigBuilder")
)]
pub struct WeakeningConfig {
    window: usize,
    rsi_neutral: f64,
    histogram_falling: Rule,
    price_lagging: Rule,
    rsi_fading: Rule,
}

impl WeakeningConfig {
    /// Returns a new builder with default values.
    #[must_use]
    pub fn builder() -> WeakeningConfigBuilder {
        WeakeningConfigBuilder::new()
    }

    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    #[must_use]
    pub fn rsi_neutral(&self) -> f64 {
        self.rsi_neutral
    }

    #[must_use]
    pub fn histogram_falling(&self) -> &Rule {
        &self.histogram_falling
    }

    #[must_use]
    pub fn price_lagging(&self) -> &Rule {
        &self.price_lagging
    }

    #[must_use]
    pub fn rsi_fading(&self) -> &Rule {
        &self.rsi_fading
    }
}

impl Default for WeakeningConfig {
    fn default() -> Self {
        let b = WeakeningConfigBuilder::new();
        Self {
            window: b.window,
            rsi_neutral: b.rsi_neutral,
            histogram_falling: b.histogram_falling,
            price_lagging: b.price_lagging,
            rsi_fading: b.rsi_fading,
        }
    }
}

/// Builder for [`WeakeningConfig`].
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(default = "WeakeningConfigBuilder::new")
)]
pub struct WeakeningConfigBuilder {
    window: usize,
    rsi_neutral: f64,
    histogram_falling: Rule,
    price_lagging: Rule,
    rsi_fading: Rule,
}

impl WeakeningConfigBuilder {
    fn new() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            rsi_neutral: DEFAULT_RSI_NEUTRAL,
            histogram_falling: Rule::new("macd_histogram_falling", 40),
            price_lagging: Rule::new("price_lagging_sma", 30),
            rsi_fading: Rule::new("rsi_fading", 30),
        }
    }

    /// Number of trailing snapshots the slopes are fitted over.
    #[must_use]
    pub fn window(mut self, length: usize) -> Self {
        self.window = length;
        self
    }

    #[must_use]
    pub fn rsi_neutral(mut self, level: f64) -> Self {
        self.rsi_neutral = level;
        self
    }

    #[must_use]
    pub fn histogram_falling(mut self, rule: Rule) -> Self {
        self.histogram_falling = rule;
        self
    }

    #[must_use]
    pub fn price_lagging(mut self, rule: Rule) -> Self {
        self.price_lagging = rule;
        self
    }

    #[must_use]
    pub fn rsi_fading(mut self, rule: Rule) -> Self {
        self.rsi_fading = rule;
        self
    }

    /// Builds the config.
    ///
    /// # Errors
    ///
    /// [`ConfigError::WindowTooShort`] for a window under two snapshots,
    /// [`ConfigError::ThresholdOutOfRange`] for an RSI level outside
    /// `0..=100`, [`ConfigError::WeightOverflow`] if the weights sum past
    /// 100.
    pub fn build(self) -> Result<WeakeningConfig, ConfigError> {
        if self.window < 2 {
            return Err(ConfigError::WindowTooShort {
                name: "weakening",
                length: self.window,
            });
        }
        check_threshold("rsi_neutral", self.rsi_neutral)?;
        check_weights(&[&self.histogram_falling, &self.price_lagging, &self.rsi_fading])?;

        Ok(WeakeningConfig {
            window: self.window,
            rsi_neutral: self.rsi_neutral,
            histogram_falling: self.histogram_falling,
            price_lagging: self.price_lagging,
            rsi_fading: self.rsi_fading,
        })
    }
}

impl TryFrom<WeakeningConfigBuilder> for WeakeningConfig {
    type Error = ConfigError;

    fn try_from(builder: WeakeningConfigBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

/// Qualitative reading of a weakening score.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeakeningOutlook {
    Unclear,
    Possible,
    Likely,
}

impl WeakeningOutlook {
    /// `Likely` from 70, `Possible` from 40, `Unclear` below.
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        match score {
            70.. => Self::Likely,
            40.. => Self::Possible,
            _ => Self::Unclear,
        }
    }
}

impl Display for WeakeningOutlook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Unclear => "trend unclear",
            Self::Possible => "weakening possible",
            Self::Likely => "weakening likely",
        })
    }
}

fn conditions(
    window: &[IndicatorSnapshot],
    config: &WeakeningConfig,
) -> Result<Vec<crate::ConditionResult>, Field> {
    let histogram = histogram_slope(window)?;
    let price = field_slope(window, Field::Price)?;
    let sma = field_slope(window, Field::SmaShort)?;
    let rsi = field_slope(window, Field::Rsi)?;
    let rsi_level = window
        .last()
        .ok_or(Field::Rsi)
        .and_then(|s| s.require(Field::Rsi))?;

    Ok(vec![
        config.histogram_falling.evaluate(histogram < 0.0),
        config.price_lagging.evaluate(price < sma),
        config
            .rsi_fading
            .evaluate(rsi_level < config.rsi_neutral && rsi < 0.0),
    ])
}

/// Probability-style score that the current move is losing strength,
/// from slopes over the trailing [`window`](WeakeningConfig::window)
/// snapshots.
///
/// Fewer snapshots than the window, or any undefined value inside it,
/// yields score 0 with the cause in
/// [`unavailable`](ScoreResult::unavailable).
#[must_use]
pub fn weakening_score(window: &[IndicatorSnapshot], config: &WeakeningConfig) -> ScoreResult {
    let required = config.window;
    let Some(start) = window.len().checked_sub(required) else {
        debug!(
            required,
            available = window.len(),
            "weakening score unavailable"
        );
        return ScoreResult::unavailable_because(Unavailable::InsufficientHistory {
            required,
            available: window.len(),
        });
    };

    match conditions(&window[start..], config) {
        Ok(breakdown) => ScoreResult::from_conditions(breakdown),
        Err(field) => {
            debug!(%field, "weakening score unavailable");
            ScoreResult::unavailable_because(Unavailable::Undefined(field))
        }
    }
}
