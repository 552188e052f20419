use std::{
    fmt::{Debug, Display},
    num::NonZero,
};

#[cfg(feature = "serde")]
use crate::indicator::LengthConfig;
use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Price, Quote, Timestamp,
    ring_buffer::RingBuffer,
};

/// Configuration for the Simple Moving Average ([`Sma`]) indicator.
///
/// # Example
///
/// ```rust
/// use quantedge_advisor::{IndicatorConfig, SmaConfig};
/// use std::num::NonZero;
///
/// let config = SmaConfig::new(NonZero::new(50).unwrap());
/// assert_eq!(config.length(), 50);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "LengthConfig")
)]
pub struct SmaConfig {
    length: usize,
}

impl IndicatorConfig for SmaConfig {
    type Builder = SmaConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        SmaConfigBuilder::new()
    }

    #[inline]
    fn length(&self) -> usize {
        self.length
    }
}

impl SmaConfig {
    /// SMA over the last `length` prices.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self::builder().length(length).build()
    }
}

#[cfg(feature = "serde")]
impl TryFrom<LengthConfig> for SmaConfig {
    type Error = crate::ConfigError;

    fn try_from(raw: LengthConfig) -> Result<Self, Self::Error> {
        raw.non_zero("SMA").map(Self::new)
    }
}

impl Display for SmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SmaConfig({})", self.length)
    }
}

/// Builder for [`SmaConfig`].
///
/// Length must be set before calling [`build`](IndicatorConfigBuilder::build).
pub struct SmaConfigBuilder {
    length: Option<usize>,
}

impl SmaConfigBuilder {
    fn new() -> Self {
        Self { length: None }
    }

    /// Sets the indicator window length.
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length.replace(length.get());
        self
    }
}

impl IndicatorConfigBuilder<SmaConfig> for SmaConfigBuilder {
    #[inline]
    fn build(self) -> SmaConfig {
        SmaConfig {
            length: self.length.expect("length is required"),
        }
    }
}

/// Simple Moving Average (SMA).
///
/// Computes the unweighted mean of the last *n* prices, where *n* is the
/// configured window length. Returns `None` until the window is full; the
/// undefined prefix is never back-filled.
///
/// Uses a running sum for O(1) updates per observation.
///
/// # Example
///
/// ```rust
/// use quantedge_advisor::{Observation, Sma, SmaConfig};
/// use std::num::NonZero;
///
/// let mut sma = Sma::new(SmaConfig::new(NonZero::new(3).unwrap()));
///
/// assert_eq!(sma.compute(&Observation::new(1, 10.0)), None);
/// assert_eq!(sma.compute(&Observation::new(2, 20.0)), None);
/// assert_eq!(sma.compute(&Observation::new(3, 30.0)), Some(20.0));
/// ```
#[derive(Clone, Debug)]
pub struct Sma {
    config: SmaConfig,
    window: RingBuffer,
    /// Running sum of values in the window. Maintained incrementally via
    /// add/subtract, may accumulate FP rounding drift over very long runs,
    /// but negligible for typical window sizes on FX data.
    sum: Price,
    length_reciprocal: f64,
    current: Option<Price>,
    last_timestamp: Option<Timestamp>,
}

impl Indicator for Sma {
    type Config = SmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            window: RingBuffer::new(config.length),
            sum: 0.0,
            #[allow(clippy::cast_precision_loss)]
            length_reciprocal: 1.0 / config.length as f64,
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

        self.update(quote.price())
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Sma {
    #[inline]
    pub(crate) fn update(&mut self, price: Price) -> Option<Price> {
        if let Some(old) = self.window.push(price) {
            self.sum -= old;
        }
        self.sum += price;

        self.current = self
            .window
            .is_ready()
            .then_some(self.sum * self.length_reciprocal);

        self.current
    }
}

impl Display for Sma {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SMA({})", self.config.length)
    }
}
