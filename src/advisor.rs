use tracing::debug;

use crate::{
    Advice, AdvisoryConfig, ConversionQuote, EngineConfig, IndicatorSnapshot, Observation,
    PriceSeries, ScoreResult, ScoringConfig, TrendConfig, TrendResult, Unavailable,
    WeakeningConfig, WeakeningOutlook, advise_result, analyze_trend, score, sentiment_strength,
    weakening_score,
};

const DEFAULT_CHANGE_LOOKBACK: usize = 5;

/// Configuration of every pipeline stage.
#[derive(PartialEq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdvisorConfig {
    pub engine: EngineConfig,
    pub scoring: ScoringConfig,
    pub weakening: WeakeningConfig,
    pub trend: TrendConfig,
    pub advisory: AdvisoryConfig,
    /// Observations back for [`Report::change`].
    pub change_lookback: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            scoring: ScoringConfig::default(),
            weakening: WeakeningConfig::default(),
            trend: TrendConfig::default(),
            advisory: AdvisoryConfig::default(),
            change_lookback: DEFAULT_CHANGE_LOOKBACK,
        }
    }
}

/// Everything one evaluation of a [`PriceSeries`] produces.
#[derive(PartialEq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Report {
    /// Snapshot of the latest observation.
    pub latest: Option<IndicatorSnapshot>,
    /// Strength score of the latest snapshot against the previous one.
    pub score: ScoreResult,
    /// Four-signal sentiment in percent.
    pub sentiment: u8,
    pub weakening: ScoreResult,
    pub outlook: WeakeningOutlook,
    pub trend: TrendResult,
    pub advice: Advice,
    /// Observation `change_lookback` steps before the latest.
    pub reference: Option<Observation>,
    /// Percent change from `reference` to the latest price.
    pub change: Option<f64>,
}

impl Report {
    /// Cost of buying `amount` of the quote currency now versus at the
    /// reference observation.
    #[must_use]
    pub fn conversion(&self, amount: f64) -> Option<ConversionQuote> {
        let now = self.latest?.price?;
        let then = self.reference?.price;
        ConversionQuote::new(amount, now, then)
    }
}

/// Runs the full pipeline over a price series: indicators, strength and
/// weakening scores, trend and advice.
///
/// Stateless between calls; evaluating the same series twice yields the
/// same [`Report`].
///
/// # Example
///
/// ```
/// use quantedge_advisor::{Advisor, AdvisorConfig, PriceSeries, Tier};
///
/// let series = PriceSeries::from_prices(1, [0.641, 0.644, 0.648, 0.650]);
/// let report = Advisor::new(AdvisorConfig::default()).evaluate(&series);
///
/// // Not enough history for RSI(14): no call is made
/// assert_eq!(report.score.score(), 0);
/// assert_eq!(report.advice.tier, Tier::Hold);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Advisor {
    config: AdvisorConfig,
}

impl Advisor {
    #[must_use]
    pub fn new(config: AdvisorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    #[must_use]
    pub fn evaluate(&self, series: &PriceSeries) -> Report {
        let config = &self.config;
        let snapshots: Vec<_> = series.snapshots(&config.engine).collect();
        let latest = snapshots.last().copied();

        let (score, sentiment) = match snapshots.as_slice() {
            [.., previous, current] => (
                score(current, previous, &config.scoring),
                sentiment_strength(current, previous, &config.scoring),
            ),
            _ => (
                ScoreResult::unavailable_because(Unavailable::InsufficientHistory {
                    required: 2,
                    available: snapshots.len(),
                }),
                0,
            ),
        };

        let weakening = weakening_score(&snapshots, &config.weakening);
        let outlook = WeakeningOutlook::from_score(weakening.score());
        let trend = analyze_trend(&snapshots, &config.trend);
        let advice = advise_result(
            &score,
            &trend,
            latest.and_then(|s| s.rsi),
            &config.advisory,
        );
        let reference = series.lookback(config.change_lookback).copied();
        let change = series.percent_change(config.change_lookback);

        debug!(
            observations = series.len(),
            score = score.score(),
            sentiment,
            weakening = weakening.score(),
            direction = %trend.direction,
            tier = %advice.tier,
            "evaluated price series"
        );

        Report {
            latest,
            score,
            sentiment,
            weakening,
            outlook,
            trend,
            advice,
            reference,
            change,
        }
    }
}
