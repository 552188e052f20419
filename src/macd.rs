use std::{fmt::Display, num::NonZero};

use crate::{
    ConfigError, Ema, EmaConfig, Indicator, IndicatorConfig, IndicatorConfigBuilder, Price, Quote,
    Timestamp,
};

/// Configuration for the Moving Average Convergence Divergence
/// ([`Macd`]) indicator.
///
/// Defaults to the conventional 12/26/9 spans.
///
/// # Example
///
/// ```
/// use quantedge_advisor::{IndicatorConfig, MacdConfig};
///
/// let config = MacdConfig::default();
/// assert_eq!(config.fast(), 12);
/// assert_eq!(config.slow(), 26);
/// assert_eq!(config.signal(), 9);
/// assert_eq!(config.length(), 26);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "MacdConfigBuilder")
)]
pub struct MacdConfig {
    fast: NonZero<usize>,
    slow: NonZero<usize>,
    signal: NonZero<usize>,
}

impl IndicatorConfig for MacdConfig {
    type Builder = MacdConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        MacdConfigBuilder::new()
    }

    /// The slow EMA span.
    #[inline]
    fn length(&self) -> usize {
        self.slow.get()
    }
}

impl MacdConfig {
    /// Fast EMA span.
    #[inline]
    #[must_use]
    pub fn fast(&self) -> usize {
        self.fast.get()
    }

    /// Slow EMA span.
    #[inline]
    #[must_use]
    pub fn slow(&self) -> usize {
        self.slow.get()
    }

    /// Signal line EMA span.
    #[inline]
    #[must_use]
    pub fn signal(&self) -> usize {
        self.signal.get()
    }
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Display for MacdConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MacdConfig({}, {}, {})",
            self.fast, self.slow, self.signal
        )
    }
}

const DEFAULT_FAST: NonZero<usize> = NonZero::new(12).unwrap();
const DEFAULT_SLOW: NonZero<usize> = NonZero::new(26).unwrap();
const DEFAULT_SIGNAL: NonZero<usize> = NonZero::new(9).unwrap();

/// Builder for [`MacdConfig`].
///
/// Defaults: fast = 12, slow = 26, signal = 9.
/// Panics on [`build`](IndicatorConfigBuilder::build) if fast is not
/// shorter than slow. Converting with `MacdConfig::try_from` returns
/// [`ConfigError::MacdLengths`] instead.
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(default = "MacdConfigBuilder::new")
)]
pub struct MacdConfigBuilder {
    fast: NonZero<usize>,
    slow: NonZero<usize>,
    signal: NonZero<usize>,
}

impl MacdConfigBuilder {
    fn new() -> Self {
        Self {
            fast: DEFAULT_FAST,
            slow: DEFAULT_SLOW,
            signal: DEFAULT_SIGNAL,
        }
    }

    /// Sets the fast EMA span.
    #[inline]
    #[must_use]
    pub fn fast(mut self, length: NonZero<usize>) -> Self {
        self.fast = length;
        self
    }

    /// Sets the slow EMA span.
    #[inline]
    #[must_use]
    pub fn slow(mut self, length: NonZero<usize>) -> Self {
        self.slow = length;
        self
    }

    /// Sets the signal line EMA span.
    #[inline]
    #[must_use]
    pub fn signal(mut self, length: NonZero<usize>) -> Self {
        self.signal = length;
        self
    }
}

impl IndicatorConfigBuilder<MacdConfig> for MacdConfigBuilder {
    #[inline]
    fn build(self) -> MacdConfig {
        assert!(
            self.fast < self.slow,
            "fast length must be shorter than slow length"
        );

        MacdConfig {
            fast: self.fast,
            slow: self.slow,
            signal: self.signal,
        }
    }
}

impl TryFrom<MacdConfigBuilder> for MacdConfig {
    type Error = ConfigError;

    fn try_from(builder: MacdConfigBuilder) -> Result<Self, Self::Error> {
        if builder.fast >= builder.slow {
            return Err(ConfigError::MacdLengths {
                fast: builder.fast.get(),
                slow: builder.slow.get(),
            });
        }
        Ok(builder.build())
    }
}

/// MACD line and its signal line at one observation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MacdValue {
    macd: f64,
    signal: f64,
}

impl MacdValue {
    /// MACD line: `EMA(fast) − EMA(slow)`.
    #[inline]
    #[must_use]
    pub fn macd(&self) -> f64 {
        self.macd
    }

    /// Signal line: EMA of the MACD line.
    #[inline]
    #[must_use]
    pub fn signal(&self) -> f64 {
        self.signal
    }

    /// Histogram: `macd − signal`. Negative while MACD sits below its
    /// signal line.
    #[inline]
    #[must_use]
    pub fn histogram(&self) -> f64 {
        self.macd - self.signal
    }
}

impl Display for MacdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MacdValue(macd={}, signal={})", self.macd, self.signal)
    }
}

/// Moving Average Convergence Divergence (MACD).
///
/// Difference of a fast and a slow [`Ema`], paired with a signal line
/// that is itself an EMA of that difference. All three EMAs are seeded
/// with their first input, so a value exists from the first observation:
/// the first MACD and signal are both `0.0`.
///
/// # Example
///
/// ```
/// use quantedge_advisor::{Macd, MacdConfig, Observation};
///
/// let mut macd = Macd::new(MacdConfig::default());
///
/// let first = macd.compute(&Observation::new(1, 0.641)).unwrap();
/// assert_eq!(first.macd(), 0.0);
/// assert_eq!(first.signal(), 0.0);
///
/// // A rise pulls the fast EMA above the slow one.
/// let next = macd.compute(&Observation::new(2, 0.651)).unwrap();
/// assert!(next.macd() > 0.0);
/// assert!(next.histogram() > 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct Macd {
    config: MacdConfig,
    fast: Ema,
    slow: Ema,
    signal: Ema,
    current: Option<MacdValue>,
    last_timestamp: Option<Timestamp>,
}

impl Indicator for Macd {
    type Config = MacdConfig;
    type Output = MacdValue;

    fn new(config: Self::Config) -> Self {
        let ema = |length: NonZero<usize>| Ema::new(EmaConfig::new(length));

        Self {
            config,
            fast: ema(config.fast),
            slow: ema(config.slow),
            signal: ema(config.signal),
            current: None,
            last_timestamp: None,
        }
    }

    #[inline]
    fn compute(&mut self, quote: &impl Quote) -> Option<MacdValue> {
        debug_assert!(
            self.last_timestamp.is_none_or(|t| t < quote.timestamp()),
            "timestamp must be strictly increasing: last={}, got={}",
            self.last_timestamp.unwrap_or(0),
            quote.timestamp(),
        );
        self.last_timestamp = Some(quote.timestamp());

        let price: Price = quote.price();
        let macd = self.fast.update(price) - self.slow.update(price);
        let signal = self.signal.update(macd);

        self.current = Some(MacdValue { macd, signal });

        self.current
    }

    #[inline]
    fn value(&self) -> Option<MacdValue> {
        self.current
    }
}

impl Display for Macd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MACD({}, {}, {})",
            self.config.fast, self.config.slow, self.config.signal
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{nz, quote};

    fn macd(fast: usize, slow: usize, signal: usize) -> Macd {
        Macd::new(
            MacdConfig::builder()
                .fast(nz(fast))
                .slow(nz(slow))
                .signal(nz(signal))
                .build(),
        )
    }

    mod seeding {
        use super::*;

        #[test]
        fn defined_from_first_observation() {
            let mut macd = Macd::new(MacdConfig::default());
            let value = macd.compute(&quote(0.65, 1)).unwrap();
            assert_eq!(value.macd(), 0.0);
            assert_eq!(value.signal(), 0.0);
            assert_eq!(value.histogram(), 0.0);
        }

        #[test]
        fn none_before_any_observation() {
            assert_eq!(Macd::new(MacdConfig::default()).value(), None);
        }
    }

    mod values {
        use super::*;

        #[test]
        fn hand_computed_second_step() {
            // fast α = 2/4 = 0.5, slow α = 2/6 = 1/3, signal α = 2/3 = 2/3
            let mut macd = macd(3, 5, 2);
            macd.compute(&quote(10.0, 1));
            let value = macd.compute(&quote(16.0, 2)).unwrap();

            // fast = 10 + 0.5 × 6 = 13, slow = 10 + 6/3 = 12 → macd = 1
            assert!((value.macd() - 1.0).abs() < 1e-12);
            // signal = 0 + 2/3 × (1 − 0) = 2/3
            assert!((value.signal() - 2.0 / 3.0).abs() < 1e-12);
            assert!((value.histogram() - 1.0 / 3.0).abs() < 1e-12);
        }

        #[test]
        fn constant_series_has_zero_macd() {
            let mut macd = Macd::new(MacdConfig::default());
            for t in 1..=60 {
                macd.compute(&quote(0.65, t));
            }
            let value = macd.value().unwrap();
            assert!(value.macd().abs() < 1e-15);
            assert!(value.signal().abs() < 1e-15);
        }

        #[test]
        fn rising_series_never_crosses_down() {
            let mut macd = Macd::new(MacdConfig::default());
            let mut previous: Option<MacdValue> = None;
            for t in 1..=200_u32 {
                let current = macd
                    .compute(&quote(0.60 + 0.001 * f64::from(t), u64::from(t)))
                    .unwrap();
                if let Some(previous) = previous {
                    let crossed_down = previous.macd() > previous.signal()
                        && current.macd() < current.signal();
                    assert!(!crossed_down, "bearish crossover at t={t}");
                }
                previous = Some(current);
            }
        }
    }

    mod config {
        use super::*;

        #[test]
        fn defaults() {
            let config = MacdConfig::default();
            assert_eq!((config.fast(), config.slow(), config.signal()), (12, 26, 9));
        }

        #[test]
        #[should_panic(expected = "fast length must be shorter than slow length")]
        fn panics_when_fast_not_shorter() {
            let _ = MacdConfig::builder().fast(nz(26)).slow(nz(12)).build();
        }

        #[test]
        fn try_from_rejects_fast_not_shorter() {
            let builder = MacdConfig::builder().fast(nz(26)).slow(nz(26));
            assert_eq!(
                MacdConfig::try_from(builder),
                Err(ConfigError::MacdLengths { fast: 26, slow: 26 })
            );
        }

        #[test]
        fn try_from_accepts_valid_lengths() {
            let builder = MacdConfig::builder().fast(nz(5)).slow(nz(35)).signal(nz(5));
            let config = MacdConfig::try_from(builder).unwrap();
            assert_eq!((config.fast(), config.slow(), config.signal()), (5, 35, 5));
        }

        #[test]
        fn display_config() {
            assert_eq!(MacdConfig::default().to_string(), "MacdConfig(12, 26, 9)");
        }
    }

    mod display {
        use super::*;

        #[test]
        fn formats_correctly() {
            assert_eq!(Macd::new(MacdConfig::default()).to_string(), "MACD(12, 26, 9)");
        }
    }

    #[cfg(feature = "serde")]
    mod deserialize {
        use super::*;
        use crate::test_util::from_pairs;

        #[test]
        fn missing_spans_take_defaults() {
            let config: MacdConfig = from_pairs(&[("fast", 5_usize)]).unwrap();
            assert_eq!((config.fast(), config.slow(), config.signal()), (5, 26, 9));
        }

        #[test]
        fn rejects_fast_not_shorter() {
            assert!(from_pairs::<MacdConfig, _>(&[("fast", 30_usize)]).is_err());
            assert!(from_pairs::<MacdConfig, _>(&[("signal", 0_usize)]).is_err());
        }
    }
}
