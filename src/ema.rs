use std::{fmt::Display, num::NonZero};

#[cfg(feature = "serde")]
use crate::indicator::LengthConfig;
use crate::{Indicator, IndicatorConfig, IndicatorConfigBuilder, Price, Quote, Timestamp};

/// Configuration for the Exponential Moving Average ([`Ema`]) indicator.
///
/// # Example
///
/// ```
/// use quantedge_advisor::{EmaConfig, IndicatorConfig};
/// use std::num::NonZero;
///
/// let config = EmaConfig::new(NonZero::new(12).unwrap());
/// assert_eq!(config.length(), 12);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "LengthConfig")
)]
pub struct EmaConfig {
    length: usize,
}

impl IndicatorConfig for EmaConfig {
    type Builder = EmaConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        EmaConfigBuilder::new()
    }

    #[inline]
    fn length(&self) -> usize {
        self.length
    }
}

impl EmaConfig {
    /// EMA with span `length`.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self::builder().length(length).build()
    }
}

#[cfg(feature = "serde")]
impl TryFrom<LengthConfig> for EmaConfig {
    type Error = crate::ConfigError;

    fn try_from(raw: LengthConfig) -> Result<Self, Self::Error> {
        raw.non_zero("EMA").map(Self::new)
    }
}

impl Display for EmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EmaConfig({})", self.length)
    }
}

/// Builder for [`EmaConfig`].
///
/// Length must be set before calling
/// [`build`](IndicatorConfigBuilder::build).
pub struct EmaConfigBuilder {
    length: Option<usize>,
}

impl EmaConfigBuilder {
    fn new() -> Self {
        Self { length: None }
    }

    /// Sets the EMA span.
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length.replace(length.get());
        self
    }
}

impl IndicatorConfigBuilder<EmaConfig> for EmaConfigBuilder {
    #[inline]
    fn build(self) -> EmaConfig {
        EmaConfig {
            length: self.length.expect("length is required"),
        }
    }
}

/// Exponential Moving Average (EMA).
///
/// A recursively weighted moving average that gives more weight to
/// recent prices. Uses the smoothing factor `α = 2 / (length + 1)`:
///
/// ```text
/// EMA₀ = price₀
/// EMA  = α × price + (1 − α) × prev_EMA
/// ```
///
/// Seeded with the first price and never bias-adjusted, so a value is
/// available from the first observation on. Early values still carry the
/// seed's weight and should be read as low-confidence.
///
/// # Example
///
/// ```
/// use quantedge_advisor::{Ema, EmaConfig, Observation};
/// use std::num::NonZero;
///
/// let mut ema = Ema::new(EmaConfig::new(NonZero::new(3).unwrap()));
///
/// // Seed: first price
/// assert_eq!(ema.compute(&Observation::new(1, 2.0)), Some(2.0));
///
/// // EMA(3) α = 0.5: 4 × 0.5 + 2 × 0.5 = 3.0
/// assert_eq!(ema.compute(&Observation::new(2, 4.0)), Some(3.0));
/// ```
#[derive(Clone, Debug)]
pub struct Ema {
    config: EmaConfig,
    alpha: f64,
    current: Option<Price>,
    last_timestamp: Option<Timestamp>,
}

impl Indicator for Ema {
    type Config = EmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            #[allow(clippy::cast_precision_loss)]
            alpha: 2.0 / (config.length + 1) as f64,
            current: None,
            last_timestamp: None,
        }
    }

    #[inline]
    fn compute(&mut self, quote: &impl Quote) -> Option<Price> {
        debug_assert!(
            self.last_timestamp.is_none_or(|t| t < quote.timestamp()),
            "timestamp must be strictly increasing: last={}, got={}",
            self.last_timestamp.unwrap_or(0),
            quote.timestamp(),
        );
        self.last_timestamp = Some(quote.timestamp());

        Some(self.update(quote.price()))
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Ema {
    /// Folds `value` into the average. Also used to smooth derived series
    /// such as the MACD line.
    #[inline]
    pub(crate) fn update(&mut self, value: f64) -> f64 {
        let next = match self.current {
            Some(previous) => self.alpha.mul_add(value - previous, previous),
            None => value,
        };
        self.current = Some(next);

        next
    }
}

impl Display for Ema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EMA({})", self.config.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{assert_approx, nz, quote};

    fn ema(length: usize) -> Ema {
        Ema::new(EmaConfig::new(nz(length)))
    }

    mod seeding {
        use super::*;

        #[test]
        fn first_value_is_first_price() {
            let mut ema = ema(12);
            assert_eq!(ema.compute(&quote(0.641, 1)), Some(0.641));
        }

        #[test]
        fn none_before_any_observation() {
            assert_eq!(ema(12).value(), None);
        }
    }

    mod smoothing {
        use super::*;

        #[test]
        fn alpha_from_span() {
            // α = 2 / (3 + 1) = 0.5
            assert_approx!(ema(3).alpha, 0.5);
            // α = 2 / (9 + 1) = 0.2
            assert_approx!(ema(9).alpha, 0.2);
        }

        #[test]
        fn recursive_update() {
            let mut ema = ema(3);
            ema.compute(&quote(2.0, 1));
            ema.compute(&quote(4.0, 2)); // 3.0
            // 0.5 × 8 + 0.5 × 3 = 5.5
            assert_eq!(ema.compute(&quote(8.0, 3)), Some(5.5));
        }

        #[test]
        fn span_one_tracks_price() {
            let mut ema = ema(1);
            ema.compute(&quote(2.0, 1));
            assert_eq!(ema.compute(&quote(7.0, 2)), Some(7.0));
        }

        #[test]
        fn constant_series_stays_constant() {
            let mut ema = ema(26);
            for t in 1..=100 {
                ema.compute(&quote(0.65, t));
            }
            assert_approx!(ema.value().unwrap(), 0.65);
        }

        #[test]
        fn lags_a_rising_series() {
            let mut ema = ema(5);
            let mut last = None;
            for t in 1..=20_u32 {
                last = ema.compute(&quote(1.0 + f64::from(t) * 0.01, u64::from(t)));
            }
            let value = last.unwrap();
            assert!(value < 1.20);
            assert!(value > 1.15);
        }
    }

    mod display {
        use super::*;

        #[test]
        fn formats_correctly() {
            assert_eq!(ema(12).to_string(), "EMA(12)");
            assert_eq!(EmaConfig::new(nz(26)).to_string(), "EmaConfig(26)");
        }
    }

    mod config {
        use super::*;

        #[test]
        #[should_panic(expected = "length is required")]
        fn panics_without_length() {
            let _ = EmaConfig::builder().build();
        }
    }

    mod clone {
        use super::*;

        #[test]
        fn produces_independent_state() {
            let mut ema = ema(3);
            ema.compute(&quote(2.0, 1));

            let mut cloned = ema.clone();

            assert_eq!(ema.compute(&quote(4.0, 2)), Some(3.0));
            assert_eq!(cloned.compute(&quote(6.0, 2)), Some(4.0));
        }
    }
}
