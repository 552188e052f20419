use std::{fmt::Display, num::NonZero};

use tracing::{trace, warn};

use crate::{
    ConfigError, IndicatorConfig, IndicatorConfigBuilder, IndicatorSnapshot, Macd, MacdConfig,
    Quote, Rsi, RsiConfig, Sma, SmaConfig,
};

const DEFAULT_RSI: NonZero<usize> = NonZero::new(14).unwrap();
const DEFAULT_MACD_FAST: NonZero<usize> = NonZero::new(12).unwrap();
const DEFAULT_MACD_SLOW: NonZero<usize> = NonZero::new(26).unwrap();
const DEFAULT_MACD_SIGNAL: NonZero<usize> = NonZero::new(9).unwrap();
const DEFAULT_SMA_SHORT: NonZero<usize> = NonZero::new(50).unwrap();
const DEFAULT_SMA_LONG: NonZero<usize> = NonZero::new(200).unwrap();

/// Configuration for the [`IndicatorEngine`].
///
/// Defaults: RSI 14, MACD 12/26/9, SMA 50 (short) and 200 (long).
///
/// # Example
///
/// ```
/// use quantedge_advisor::EngineConfig;
/// use std::num::NonZero;
///
/// let config = EngineConfig::builder()
///     .sma_short(NonZero::new(3).unwrap())
///     .build()
///     .unwrap();
/// assert_eq!(config.sma_short().to_string(), "SmaConfig(3)");
///
/// let err = EngineConfig::builder()
///     .macd(
///         NonZero::new(26).unwrap(),
///         NonZero::new(12).unwrap(),
///         NonZero::new(9).unwrap(),
///     )
///     .build();
/// assert!(err.is_err());
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "EngineConfigFields")
)]
pub struct EngineConfig {
    rsi: RsiConfig,
    macd: MacdConfig,
    sma_short: SmaConfig,
    sma_long: SmaConfig,
}

impl EngineConfig {
    /// Returns a new builder with default values.
    #[must_use]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    #[must_use]
    pub fn rsi(&self) -> RsiConfig {
        self.rsi
    }

    #[must_use]
    pub fn macd(&self) -> MacdConfig {
        self.macd
    }

    #[must_use]
    pub fn sma_short(&self) -> SmaConfig {
        self.sma_short
    }

    #[must_use]
    pub fn sma_long(&self) -> SmaConfig {
        self.sma_long
    }
}

/// Deserialized [`EngineConfig`] before the SMA ordering is checked.
/// Nested indicator configs validate themselves.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(default)]
pub struct EngineConfigFields {
    rsi: RsiConfig,
    macd: MacdConfig,
    sma_short: SmaConfig,
    sma_long: SmaConfig,
}

#[cfg(feature = "serde")]
impl Default for EngineConfigFields {
    fn default() -> Self {
        let EngineConfig {
            rsi,
            macd,
            sma_short,
            sma_long,
        } = EngineConfig::default();
        Self {
            rsi,
            macd,
            sma_short,
            sma_long,
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<EngineConfigFields> for EngineConfig {
    type Error = ConfigError;

    fn try_from(fields: EngineConfigFields) -> Result<Self, Self::Error> {
        check_sma_lengths(fields.sma_short.length(), fields.sma_long.length())?;
        Ok(Self {
            rsi: fields.rsi,
            macd: fields.macd,
            sma_short: fields.sma_short,
            sma_long: fields.sma_long,
        })
    }
}

fn check_sma_lengths(short: usize, long: usize) -> Result<(), ConfigError> {
    if short >= long {
        return Err(ConfigError::SmaLengths { short, long });
    }
    Ok(())
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rsi: RsiConfig::new(DEFAULT_RSI),
            macd: MacdConfig::default(),
            sma_short: SmaConfig::new(DEFAULT_SMA_SHORT),
            sma_long: SmaConfig::new(DEFAULT_SMA_LONG),
        }
    }
}

impl Display for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EngineConfig({}, {}, {}, {})",
            self.rsi, self.macd, self.sma_short, self.sma_long
        )
    }
}

/// Builder for [`EngineConfig`].
///
/// Lengths are [`NonZero`], so non-positive periods cannot be expressed;
/// [`build`](Self::build) rejects orderings that make no sense.
pub struct EngineConfigBuilder {
    rsi: NonZero<usize>,
    macd_fast: NonZero<usize>,
    macd_slow: NonZero<usize>,
    macd_signal: NonZero<usize>,
    sma_short: NonZero<usize>,
    sma_long: NonZero<usize>,
}

impl EngineConfigBuilder {
    fn new() -> Self {
        Self {
            rsi: DEFAULT_RSI,
            macd_fast: DEFAULT_MACD_FAST,
            macd_slow: DEFAULT_MACD_SLOW,
            macd_signal: DEFAULT_MACD_SIGNAL,
            sma_short: DEFAULT_SMA_SHORT,
            sma_long: DEFAULT_SMA_LONG,
        }
    }

    /// Sets the number of price changes the RSI averages.
    #[must_use]
    pub fn rsi(mut self, length: NonZero<usize>) -> Self {
        self.rsi = length;
        self
    }

    /// Sets the MACD fast, slow and signal spans.
    #[must_use]
    pub fn macd(
        mut self,
        fast: NonZero<usize>,
        slow: NonZero<usize>,
        signal: NonZero<usize>,
    ) -> Self {
        self.macd_fast = fast;
        self.macd_slow = slow;
        self.macd_signal = signal;
        self
    }

    /// Sets the short SMA window.
    #[must_use]
    pub fn sma_short(mut self, length: NonZero<usize>) -> Self {
        self.sma_short = length;
        self
    }

    /// Sets the long SMA window.
    #[must_use]
    pub fn sma_long(mut self, length: NonZero<usize>) -> Self {
        self.sma_long = length;
        self
    }

    /// Builds the config.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MacdLengths`] if the fast span is not shorter than
    /// the slow one, [`ConfigError::SmaLengths`] if the short SMA is not
    /// shorter than the long one.
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        if self.macd_fast >= self.macd_slow {
            return Err(ConfigError::MacdLengths {
                fast: self.macd_fast.get(),
                slow: self.macd_slow.get(),
            });
        }
        check_sma_lengths(self.sma_short.get(), self.sma_long.get())?;

        Ok(EngineConfig {
            rsi: RsiConfig::new(self.rsi),
            macd: MacdConfig::builder()
                .fast(self.macd_fast)
                .slow(self.macd_slow)
                .signal(self.macd_signal)
                .build(),
            sma_short: SmaConfig::new(self.sma_short),
            sma_long: SmaConfig::new(self.sma_long),
        })
    }
}

/// Incremental indicator pipeline producing one [`IndicatorSnapshot`] per
/// observation.
///
/// Each [`push`](Self::push) does O(1) work: the engine keeps only the
/// rolling state of its indicators, never the full history.
///
/// Invalid observations (non-finite or non-positive price) produce a fully
/// undefined snapshot and are excluded from every rolling window; later
/// observations continue from the last valid state.
///
/// # Example
///
/// ```
/// use quantedge_advisor::{EngineConfig, IndicatorEngine, Observation};
///
/// let mut engine = IndicatorEngine::new(EngineConfig::default());
///
/// let snapshot = engine.push(&Observation::new(1, 0.641));
/// assert_eq!(snapshot.price, Some(0.641));
/// assert_eq!(snapshot.macd, Some(0.0));
/// assert_eq!(snapshot.rsi, None);
/// assert_eq!(snapshot.sma_long, None);
/// ```
#[derive(Clone, Debug)]
pub struct IndicatorEngine {
    config: EngineConfig,
    rsi: Rsi,
    macd: Macd,
    sma_short: Sma,
    sma_long: Sma,
    skipped: usize,
}

impl IndicatorEngine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            rsi: Rsi::new(config.rsi),
            macd: Macd::new(config.macd),
            sma_short: Sma::new(config.sma_short),
            sma_long: Sma::new(config.sma_long),
            skipped: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of invalid observations excluded so far.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Feeds one observation and returns its snapshot.
    pub fn push(&mut self, quote: &impl Quote) -> IndicatorSnapshot {
        let timestamp = quote.timestamp();

        if !quote.is_valid() {
            self.skipped += 1;
            warn!(
                timestamp,
                price = quote.price(),
                skipped = self.skipped,
                "excluding invalid observation from indicator windows"
            );
            return IndicatorSnapshot::undefined(timestamp);
        }

        let macd = self.macd.compute(quote);
        let snapshot = IndicatorSnapshot {
            timestamp,
            price: Some(quote.price()),
            rsi: self.rsi.compute(quote),
            macd: macd.map(|v| v.macd()),
            macd_signal: macd.map(|v| v.signal()),
            sma_short: self.sma_short.compute(quote),
            sma_long: self.sma_long.compute(quote),
        };
        trace!(?snapshot, "indicator snapshot");

        snapshot
    }

    /// Lazily maps `quotes` to snapshots, consuming this engine.
    pub fn snapshots<I>(self, quotes: I) -> Snapshots<I::IntoIter>
    where
        I: IntoIterator,
        I::Item: Quote,
    {
        Snapshots {
            quotes: quotes.into_iter(),
            engine: self,
        }
    }
}

/// Lazy iterator of [`IndicatorSnapshot`]s, one per input quote.
///
/// Cloning it forks the computation; creating a new one from the same
/// input restarts it from the first observation.
#[derive(Clone, Debug)]
pub struct Snapshots<I> {
    quotes: I,
    engine: IndicatorEngine,
}

impl<I> Iterator for Snapshots<I>
where
    I: Iterator,
    I::Item: Quote,
{
    type Item = IndicatorSnapshot;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let quote = self.quotes.next()?;
        Some(self.engine.push(&quote))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.quotes.size_hint()
    }
}

impl<I> ExactSizeIterator for Snapshots<I>
where
    I: ExactSizeIterator,
    I::Item: Quote,
{
}

/// Computes one snapshot per price, in order.
///
/// Pure: the same input always yields the same output.
///
/// # Example
///
/// ```
/// use quantedge_advisor::{compute_indicators, EngineConfig, Observation};
/// use std::num::NonZero;
///
/// let config = EngineConfig::builder()
///     .sma_short(NonZero::new(3).unwrap())
///     .build()
///     .unwrap();
/// let prices = [0.641, 0.644, 0.648]
///     .into_iter()
///     .zip(1..)
///     .map(|(price, t)| Observation::new(t, price));
///
/// let snapshots = compute_indicators(prices, &config);
/// assert_eq!(snapshots.len(), 3);
/// assert_eq!(snapshots[1].sma_short, None);
/// assert!(snapshots[2].sma_short.is_some());
/// ```
#[must_use]
pub fn compute_indicators<I>(prices: I, config: &EngineConfig) -> Vec<IndicatorSnapshot>
where
    I: IntoIterator,
    I::Item: Quote,
{
    IndicatorEngine::new(*config).snapshots(prices).collect()
}
