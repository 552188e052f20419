use std::{borrow::Cow, fmt::Display};

use tracing::debug;

use crate::{ConfigError, Field, IndicatorSnapshot};

const DEFAULT_RSI_OVERBOUGHT: f64 = 70.0;
const SENTIMENT_SIGNALS: usize = 4;

/// Which side of the short SMA counts as the trend condition firing.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrendPolarity {
    /// Price above the short SMA (uptrend).
    #[default]
    Above,
    /// Price below the short SMA (downtrend).
    Below,
}

impl TrendPolarity {
    #[inline]
    fn holds(self, price: f64, sma: f64) -> bool {
        match self {
            Self::Above => price > sma,
            Self::Below => price < sma,
        }
    }
}

/// A named, weighted scoring condition.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    label: Cow<'static, str>,
    weight: u8,
}

impl Rule {
    #[must_use]
    pub fn new(label: impl Into<Cow<'static, str>>, weight: u8) -> Self {
        Self {
            label: label.into(),
            weight,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn weight(&self) -> u8 {
        self.weight
    }

    pub(crate) fn evaluate(&self, passed: bool) -> ConditionResult {
        ConditionResult {
            name: self.label.clone(),
            weight: self.weight,
            passed,
        }
    }
}

/// Rejects rule sets whose weights could push a score past 100.
pub(crate) fn check_weights(rules: &[&Rule]) -> Result<(), ConfigError> {
    let total: u32 = rules.iter().map(|r| u32::from(r.weight)).sum();
    if total > 100 {
        return Err(ConfigError::WeightOverflow { total });
    }
    Ok(())
}

/// Rejects thresholds that are not finite values in `0..=100`.
pub(crate) fn check_threshold(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ConfigError::ThresholdOutOfRange {
            name,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Composite strength score configuration.
///
/// Three conditions, each with a label and a weight:
///
/// | Condition           | Fires when                               | Default weight |
/// |---------------------|------------------------------------------|----------------|
/// | `overbought`        | RSI above `rsi_overbought` (70)          | 40             |
/// | `bearish_crossover` | MACD crosses below its signal line       | 30             |
/// | `trend`             | price on the `polarity` side of SMA-short | 30             |
///
/// With the defaults a score is one of {0, 30, 40, 60, 70, 100}.
#[derive(PartialEq, Clone, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "ScoringConfigBuilder")
)]
pub struct ScoringConfig {
    rsi_overbought: f64,
    polarity: TrendPolarity,
    overbought: Rule,
    crossover: Rule,
    trend: Rule,
}

impl ScoringConfig {
    /// Returns a new builder with default values.
    #[must_use]
    pub fn builder() -> ScoringConfigBuilder {
        ScoringConfigBuilder::new()
    }

    #[must_use]
    pub fn rsi_overbought(&self) -> f64 {
        self.rsi_overbought
    }

    #[must_use]
    pub fn polarity(&self) -> TrendPolarity {
        self.polarity
    }

    #[must_use]
    pub fn overbought(&self) -> &Rule {
        &self.overbought
    }

    #[must_use]
    pub fn crossover(&self) -> &Rule {
        &self.crossover
    }

    #[must_use]
    pub fn trend(&self) -> &Rule {
        &self.trend
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let b = ScoringConfigBuilder::new();
        Self {
            rsi_overbought: b.rsi_overbought,
            polarity: b.polarity,
            overbought: b.overbought,
            crossover: b.crossover,
            trend: b.trend,
        }
    }
}

/// Builder for [`ScoringConfig`].
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(default = "ScoringConfigBuilder::new")
)]
pub struct ScoringConfigBuilder {
    rsi_overbought: f64,
    polarity: TrendPolarity,
    overbought: Rule,
    crossover: Rule,
    trend: Rule,
}

impl ScoringConfigBuilder {
    fn new() -> Self {
        Self {
            rsi_overbought: DEFAULT_RSI_OVERBOUGHT,
            polarity: TrendPolarity::default(),
            overbought: Rule::new("overbought", 40),
            crossover: Rule::new("bearish_crossover", 30),
            trend: Rule::new("trend", 30),
        }
    }

    /// RSI level above which the overbought condition fires.
    #[must_use]
    pub fn rsi_overbought(mut self, level: f64) -> Self {
        self.rsi_overbought = level;
        self
    }

    #[must_use]
    pub fn polarity(mut self, polarity: TrendPolarity) -> Self {
        self.polarity = polarity;
        self
    }

    #[must_use]
    pub fn overbought(mut self, rule: Rule) -> Self {
        self.overbought = rule;
        self
    }

    #[must_use]
    pub fn crossover(mut self, rule: Rule) -> Self {
        self.crossover = rule;
        self
    }

    #[must_use]
    pub fn trend(mut self, rule: Rule) -> Self {
        self.trend = rule;
        self
    }

    /// Builds the config.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ThresholdOutOfRange`] for an RSI level outside
    /// `0..=100`, [`ConfigError::WeightOverflow`] if the weights sum past
    /// 100.
    pub fn build(self) -> Result<ScoringConfig, ConfigError> {
        check_threshold("rsi_overbought", self.rsi_overbought)?;
        check_weights(&[&self.overbought, &self.crossover, &self.trend])?;

        Ok(ScoringConfig {
            rsi_overbought: self.rsi_overbought,
            polarity: self.polarity,
            overbought: self.overbought,
            crossover: self.crossover,
            trend: self.trend,
        })
    }
}

impl TryFrom<ScoringConfigBuilder> for ScoringConfig {
    type Error = ConfigError;

    fn try_from(builder: ScoringConfigBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

/// Outcome of one condition in a [`ScoreResult`] breakdown.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionResult {
    pub name: Cow<'static, str>,
    pub weight: u8,
    pub passed: bool,
}

/// Why a score could not be computed.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Unavailable {
    /// A required snapshot value was undefined or non-finite.
    Undefined(Field),
    /// Fewer snapshots than the scoring window needs.
    InsufficientHistory { required: usize, available: usize },
}

impl Display for Unavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undefined(field) => write!(f, "{field} is undefined"),
            Self::InsufficientHistory {
                required,
                available,
            } => write!(f, "need {required} snapshots, have {available}"),
        }
    }
}

/// Qualitative reading of a 0–100 score.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strength {
    Weak,
    Fair,
    Strong,
}

impl Strength {
    /// `Strong` from 70, `Fair` from 40, `Weak` below.
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        match score {
            70.. => Self::Strong,
            40.. => Self::Fair,
            _ => Self::Weak,
        }
    }
}

impl Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Weak => "weak",
            Self::Fair => "fair",
            Self::Strong => "strong",
        })
    }
}

/// Bounded weighted score with the conditions that produced it.
///
/// `score` is the sum of the weights of passed conditions, clamped to 100.
/// When an input is missing the score is 0, the breakdown is empty and
/// [`unavailable`](Self::unavailable) names the cause.
#[derive(PartialEq, Eq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreResult {
    score: u8,
    breakdown: Vec<ConditionResult>,
    unavailable: Option<Unavailable>,
}

impl ScoreResult {
    pub(crate) fn from_conditions(breakdown: Vec<ConditionResult>) -> Self {
        let total: u32 = breakdown
            .iter()
            .filter(|c| c.passed)
            .map(|c| u32::from(c.weight))
            .sum();

        Self {
            score: u8::try_from(total.min(100)).unwrap_or(100),
            breakdown,
            unavailable: None,
        }
    }

    pub(crate) fn unavailable_because(reason: Unavailable) -> Self {
        Self {
            score: 0,
            breakdown: Vec::new(),
            unavailable: Some(reason),
        }
    }

    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    #[must_use]
    pub fn breakdown(&self) -> &[ConditionResult] {
        &self.breakdown
    }

    /// Why the score fell back to 0, if it did.
    #[must_use]
    pub fn unavailable(&self) -> Option<Unavailable> {
        self.unavailable
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.unavailable.is_none()
    }

    #[must_use]
    pub fn strength(&self) -> Strength {
        Strength::from_score(self.score)
    }
}

fn bearish_crossover(
    current: &IndicatorSnapshot,
    previous: &IndicatorSnapshot,
) -> Result<bool, Field> {
    let was_above = previous.require(Field::Macd)? > previous.require(Field::MacdSignal)?;
    let now_below = current.require(Field::Macd)? < current.require(Field::MacdSignal)?;
    Ok(was_above && now_below)
}

fn price_against(
    snapshot: &IndicatorSnapshot,
    sma: Field,
    polarity: TrendPolarity,
) -> Result<bool, Field> {
    Ok(polarity.holds(snapshot.require(Field::Price)?, snapshot.require(sma)?))
}

fn conditions(
    current: &IndicatorSnapshot,
    previous: &IndicatorSnapshot,
    config: &ScoringConfig,
) -> Result<Vec<ConditionResult>, Field> {
    let overbought = current.require(Field::Rsi)? > config.rsi_overbought;
    let crossover = bearish_crossover(current, previous)?;
    let trend = price_against(current, Field::SmaShort, config.polarity)?;

    Ok(vec![
        config.overbought.evaluate(overbought),
        config.crossover.evaluate(crossover),
        config.trend.evaluate(trend),
    ])
}

/// Composite strength score of `current` against `previous`.
///
/// Any required value that is undefined or non-finite yields score 0 with
/// an empty breakdown.
///
/// # Example
///
/// ```
/// use quantedge_advisor::{score, IndicatorSnapshot, ScoringConfig};
///
/// let previous = IndicatorSnapshot {
///     timestamp: 1,
///     price: Some(0.6500),
///     rsi: Some(55.0),
///     macd: Some(0.0002),
///     macd_signal: Some(0.0001),
///     sma_short: Some(0.6510),
///     sma_long: None,
/// };
/// let current = IndicatorSnapshot {
///     timestamp: 2,
///     macd: Some(-0.0001),
///     ..previous
/// };
///
/// let result = score(&current, &previous, &ScoringConfig::default());
/// assert_eq!(result.score(), 30);
/// assert!(result.breakdown()[1].passed);
/// ```
#[must_use]
pub fn score(
    current: &IndicatorSnapshot,
    previous: &IndicatorSnapshot,
    config: &ScoringConfig,
) -> ScoreResult {
    match conditions(current, previous, config) {
        Ok(breakdown) => ScoreResult::from_conditions(breakdown),
        Err(field) => {
            debug!(timestamp = current.timestamp, %field, "strength score unavailable");
            ScoreResult::unavailable_because(Unavailable::Undefined(field))
        }
    }
}

/// Share, in percent, of four signals that fire: the three score
/// conditions plus price above the long SMA.
///
/// An undefined input only stops its own signal from firing.
#[must_use]
pub fn sentiment_strength(
    current: &IndicatorSnapshot,
    previous: &IndicatorSnapshot,
    config: &ScoringConfig,
) -> u8 {
    let signals = [
        current
            .require(Field::Rsi)
            .is_ok_and(|rsi| rsi > config.rsi_overbought),
        bearish_crossover(current, previous).unwrap_or(false),
        price_against(current, Field::SmaShort, config.polarity).unwrap_or(false),
        price_against(current, Field::SmaLong, TrendPolarity::Above).unwrap_or(false),
    ];
    let fired = signals.iter().filter(|&&s| s).count();

    // Rounds half up
    u8::try_from((fired * 100 + SENTIMENT_SIGNALS / 2) / SENTIMENT_SIGNALS).unwrap_or(100)
}
