use std::fmt::Display;

use crate::{
    ConfigError, Direction, Momentum, ScoreResult, TrendResult, Unavailable,
    scoring::check_threshold,
};

const DEFAULT_STRONG: u8 = 80;
const DEFAULT_MODERATE: u8 = 60;
const DEFAULT_AVOID_BELOW: u8 = 40;
const DEFAULT_RSI_NEUTRAL: f64 = 50.0;

/// Recommendation tier, ordered from least to most favourable.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tier {
    Avoid,
    Hold,
    Moderate,
    StrongBuy,
}

impl Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Avoid => "avoid",
            Self::Hold => "hold",
            Self::Moderate => "moderate buy",
            Self::StrongBuy => "strong buy",
        })
    }
}

/// Thresholds of the recommendation decision table.
///
/// Defaults: strong 80, moderate 60, avoid below 40, and moderate scores
/// demoted to [`Tier::Hold`] in a downtrend. [`Tier::Avoid`] also requires
/// RSI under `rsi_neutral` (50) only when
/// [`avoid_requires_weak_rsi`](AdvisoryConfigBuilder::avoid_requires_weak_rsi)
/// is set.
#[derive(PartialEq, Clone, Copy, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "AdvisoryConfigBuilder")
)]
pub struct AdvisoryConfig {
    strong: u8,
    moderate: u8,
    avoid_below: u8,
    rsi_neutral: f64,
    demote_on_downtrend: bool,
    avoid_requires_weak_rsi: bool,
}

impl AdvisoryConfig {
    /// Returns a new builder with default values.
    #[must_use]
    pub fn builder() -> AdvisoryConfigBuilder {
        AdvisoryConfigBuilder::new()
    }

    #[must_use]
    pub fn strong(&self) -> u8 {
        self.strong
    }

    #[must_use]
    pub fn moderate(&self) -> u8 {
        self.moderate
    }

    #[must_use]
    pub fn avoid_below(&self) -> u8 {
        self.avoid_below
    }

    #[must_use]
    pub fn rsi_neutral(&self) -> f64 {
        self.rsi_neutral
    }

    #[must_use]
    pub fn demote_on_downtrend(&self) -> bool {
        self.demote_on_downtrend
    }

    #[must_use]
    pub fn avoid_requires_weak_rsi(&self) -> bool {
        self.avoid_requires_weak_rsi
    }
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        let b = AdvisoryConfigBuilder::new();
        Self {
            strong: b.strong,
            moderate: b.moderate,
            avoid_below: b.avoid_below,
            rsi_neutral: b.rsi_neutral,
            demote_on_downtrend: b.demote_on_downtrend,
            avoid_requires_weak_rsi: b.avoid_requires_weak_rsi,
        }
    }
}

/// Builder for [`AdvisoryConfig`].
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(default = "AdvisoryConfigBuilder::new")
)]
pub struct AdvisoryConfigBuilder {
    strong: u8,
    moderate: u8,
    avoid_below: u8,
    rsi_neutral: f64,
    demote_on_downtrend: bool,
    avoid_requires_weak_rsi: bool,
}

impl AdvisoryConfigBuilder {
    fn new() -> Self {
        Self {
            strong: DEFAULT_STRONG,
            moderate: DEFAULT_MODERATE,
            avoid_below: DEFAULT_AVOID_BELOW,
            rsi_neutral: DEFAULT_RSI_NEUTRAL,
            demote_on_downtrend: true,
            avoid_requires_weak_rsi: false,
        }
    }

    /// Minimum score for [`Tier::StrongBuy`].
    #[must_use]
    pub fn strong(mut self, threshold: u8) -> Self {
        self.strong = threshold;
        self
    }

    /// Minimum score for [`Tier::Moderate`].
    #[must_use]
    pub fn moderate(mut self, threshold: u8) -> Self {
        self.moderate = threshold;
        self
    }

    /// Scores under this may become [`Tier::Avoid`].
    #[must_use]
    pub fn avoid_below(mut self, threshold: u8) -> Self {
        self.avoid_below = threshold;
        self
    }

    #[must_use]
    pub fn rsi_neutral(mut self, level: f64) -> Self {
        self.rsi_neutral = level;
        self
    }

    #[must_use]
    pub fn demote_on_downtrend(mut self, demote: bool) -> Self {
        self.demote_on_downtrend = demote;
        self
    }

    /// Only call [`Tier::Avoid`] while RSI sits under `rsi_neutral`.
    /// Off by default.
    #[must_use]
    pub fn avoid_requires_weak_rsi(mut self, required: bool) -> Self {
        self.avoid_requires_weak_rsi = required;
        self
    }

    /// Builds the config.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ThresholdOutOfRange`] for a threshold outside
    /// `0..=100`, [`ConfigError::TierOrder`] unless
    /// `avoid_below <= moderate < strong`.
    pub fn build(self) -> Result<AdvisoryConfig, ConfigError> {
        for (name, value) in [
            ("strong", self.strong),
            ("moderate", self.moderate),
            ("avoid_below", self.avoid_below),
        ] {
            check_threshold(name, f64::from(value))?;
        }
        check_threshold("rsi_neutral", self.rsi_neutral)?;

        if !(self.avoid_below <= self.moderate && self.moderate < self.strong) {
            return Err(ConfigError::TierOrder {
                avoid_below: self.avoid_below,
                moderate: self.moderate,
                strong: self.strong,
            });
        }

        Ok(AdvisoryConfig {
            strong: self.strong,
            moderate: self.moderate,
            avoid_below: self.avoid_below,
            rsi_neutral: self.rsi_neutral,
            demote_on_downtrend: self.demote_on_downtrend,
            avoid_requires_weak_rsi: self.avoid_requires_weak_rsi,
        })
    }
}

impl TryFrom<AdvisoryConfigBuilder> for AdvisoryConfig {
    type Error = ConfigError;

    fn try_from(builder: AdvisoryConfigBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

/// One reason behind an [`Advice`].
#[derive(PartialEq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rationale {
    /// The score could not be computed, so no call is made on it.
    ScoreUnavailable(Unavailable),
    /// No RSI reading, so no directional call.
    RsiUndefined,
    StrongScore { score: u8, threshold: u8 },
    ModerateScore { score: u8, threshold: u8 },
    /// Moderate score held back by a falling price and SMA.
    DemotedOnDowntrend { score: u8 },
    /// Low score with RSI falling and MACD under its signal.
    BearishOverride { score: u8, rsi: f64 },
    BelowModerate { score: u8, threshold: u8 },
    Trend(Direction),
    Momentum(Momentum),
    /// Direction of the RSI slope.
    Rsi(Momentum),
}

impl Display for Rationale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ScoreUnavailable(reason) => write!(f, "score unavailable ({reason}), holding"),
            Self::RsiUndefined => f.write_str("RSI undefined, holding"),
            Self::StrongScore { score, threshold } => {
                write!(f, "score {score} reaches strong threshold {threshold}")
            }
            Self::ModerateScore { score, threshold } => {
                write!(f, "score {score} reaches moderate threshold {threshold}")
            }
            Self::DemotedOnDowntrend { score } => {
                write!(f, "score {score} is moderate but price is in a downtrend")
            }
            Self::BearishOverride { score, rsi } => write!(
                f,
                "score {score} is low with RSI {rsi:.2} falling and MACD below signal"
            ),
            Self::BelowModerate { score, threshold } => {
                write!(f, "score {score} is below moderate threshold {threshold}")
            }
            Self::Trend(Direction::Up) => f.write_str("price trend is up"),
            Self::Trend(Direction::Down) => f.write_str("price trend is down"),
            Self::Trend(Direction::Flat) => f.write_str("price trend is uncertain"),
            Self::Momentum(Momentum::Rising) => {
                f.write_str("MACD histogram rising, bullish pressure increasing")
            }
            Self::Momentum(Momentum::Falling) => {
                f.write_str("MACD histogram falling, bearish pressure increasing")
            }
            Self::Momentum(Momentum::Flat) => f.write_str("MACD histogram flat"),
            Self::Rsi(direction) => write!(f, "RSI {direction}"),
        }
    }
}

/// A tier and the reasons for it, the decisive one first.
#[derive(PartialEq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Advice {
    pub tier: Tier,
    pub rationale: Vec<Rationale>,
}

impl Display for Advice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tier)?;
        for reason in &self.rationale {
            write!(f, "\n- {reason}")?;
        }
        Ok(())
    }
}

fn decide(
    score: u8,
    trend: &TrendResult,
    rsi_level: Option<f64>,
    config: &AdvisoryConfig,
) -> (Tier, Rationale) {
    let Some(rsi) = rsi_level.filter(|r| r.is_finite()) else {
        return (Tier::Hold, Rationale::RsiUndefined);
    };

    if score >= config.strong {
        return (
            Tier::StrongBuy,
            Rationale::StrongScore {
                score,
                threshold: config.strong,
            },
        );
    }

    if score >= config.moderate {
        if config.demote_on_downtrend && trend.direction == Direction::Down {
            return (Tier::Hold, Rationale::DemotedOnDowntrend { score });
        }
        return (
            Tier::Moderate,
            Rationale::ModerateScore {
                score,
                threshold: config.moderate,
            },
        );
    }

    let rsi_falling = trend.rsi_slope.is_some_and(|s| s < 0.0);
    let macd_below_signal = trend.histogram.is_some_and(|h| h < 0.0);
    let rsi_weak = !config.avoid_requires_weak_rsi || rsi < config.rsi_neutral;
    if score < config.avoid_below && rsi_falling && macd_below_signal && rsi_weak {
        return (Tier::Avoid, Rationale::BearishOverride { score, rsi });
    }

    (
        Tier::Hold,
        Rationale::BelowModerate {
            score,
            threshold: config.moderate,
        },
    )
}

/// Maps a score, trend and RSI level to a recommendation tier.
///
/// Rules, first match wins:
///
/// 1. RSI undefined: [`Tier::Hold`].
/// 2. `score >= strong`: [`Tier::StrongBuy`].
/// 3. `score >= moderate`: [`Tier::Moderate`], or [`Tier::Hold`] in a
///    downtrend when `demote_on_downtrend` is set.
/// 4. `score < avoid_below` with RSI falling and the MACD histogram
///    negative: [`Tier::Avoid`]. With `avoid_requires_weak_rsi` set, RSI
///    must also be under `rsi_neutral`.
/// 5. Otherwise [`Tier::Hold`].
///
/// # Example
///
/// ```
/// use quantedge_advisor::{recommend, AdvisoryConfig, Tier, TrendResult};
///
/// let trend = TrendResult::flat(None);
/// let config = AdvisoryConfig::default();
///
/// assert_eq!(recommend(85, &trend, Some(55.0), &config), Tier::StrongBuy);
/// assert_eq!(recommend(85, &trend, None, &config), Tier::Hold);
/// ```
#[must_use]
pub fn recommend(
    score: u8,
    trend: &TrendResult,
    rsi_level: Option<f64>,
    config: &AdvisoryConfig,
) -> Tier {
    decide(score, trend, rsi_level, config).0
}

/// [`recommend`] with a human-readable rationale: the decisive rule, then
/// the trend direction, MACD momentum and RSI direction.
#[must_use]
pub fn advise(
    score: u8,
    trend: &TrendResult,
    rsi_level: Option<f64>,
    config: &AdvisoryConfig,
) -> Advice {
    let (tier, reason) = decide(score, trend, rsi_level, config);
    with_context(tier, reason, trend)
}

/// [`advise`] on a full [`ScoreResult`]. An unavailable score always
/// holds, whatever the trend says.
#[must_use]
pub fn advise_result(
    result: &ScoreResult,
    trend: &TrendResult,
    rsi_level: Option<f64>,
    config: &AdvisoryConfig,
) -> Advice {
    match result.unavailable() {
        Some(reason) => with_context(Tier::Hold, Rationale::ScoreUnavailable(reason), trend),
        None => advise(result.score(), trend, rsi_level, config),
    }
}

fn with_context(tier: Tier, reason: Rationale, trend: &TrendResult) -> Advice {
    Advice {
        tier,
        rationale: vec![
            reason,
            Rationale::Trend(trend.direction),
            Rationale::Momentum(trend.momentum),
            Rationale::Rsi(Momentum::from_slope(trend.rsi_slope)),
        ],
    }
}
