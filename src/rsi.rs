use std::{fmt::Display, num::NonZero};

#[cfg(feature = "serde")]
use crate::indicator::LengthConfig;
use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Price, Quote, Timestamp,
    ring_buffer::RingBuffer,
};

/// Configuration for the Relative Strength Index ([`Rsi`]) indicator.
///
/// Output begins at observation `length + 1`, once `length` price changes
/// have been seen.
///
/// # Example
///
/// ```
/// use quantedge_advisor::{IndicatorConfig, RsiConfig};
/// use std::num::NonZero;
///
/// let config = RsiConfig::new(NonZero::new(14).unwrap());
/// assert_eq!(config.length(), 14);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "LengthConfig")
)]
pub struct RsiConfig {
    length: usize,
}

impl IndicatorConfig for RsiConfig {
    type Builder = RsiConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        RsiConfigBuilder::new()
    }

    #[inline]
    fn length(&self) -> usize {
        self.length
    }
}

impl RsiConfig {
    /// RSI averaging the last `length` price changes.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self::builder().length(length).build()
    }
}

#[cfg(feature = "serde")]
impl TryFrom<LengthConfig> for RsiConfig {
    type Error = crate::ConfigError;

    fn try_from(raw: LengthConfig) -> Result<Self, Self::Error> {
        raw.non_zero("RSI").map(Self::new)
    }
}

impl Display for RsiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RsiConfig({})", self.length)
    }
}

/// Builder for [`RsiConfig`].
///
/// Length must be set before calling
/// [`build`](IndicatorConfigBuilder::build).
pub struct RsiConfigBuilder {
    length: Option<usize>,
}

impl RsiConfigBuilder {
    #[must_use]
    fn new() -> Self {
        Self { length: None }
    }

    /// Sets the number of price changes averaged.
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length = Some(length.get());
        self
    }
}

impl IndicatorConfigBuilder<RsiConfig> for RsiConfigBuilder {
    #[inline]
    fn build(self) -> RsiConfig {
        RsiConfig {
            length: self.length.expect("length is required"),
        }
    }
}

/// Relative Strength Index (RSI) over simple moving averages of gains
/// and losses.
///
/// Measures the speed and magnitude of recent price changes on a 0–100
/// scale. Values above 70 are conventionally considered overbought; below
/// 30, oversold.
///
/// ```text
/// delta    = price − prev_price
/// avg_gain = mean(max(delta, 0))   over the last `length` deltas
/// avg_loss = mean(max(−delta, 0))  over the last `length` deltas
/// RSI      = 100 − 100 / (1 + avg_gain / avg_loss)
/// ```
///
/// A window without losses yields exactly 100 (no division by zero); a
/// window with neither gains nor losses yields 50.
///
/// Gains and losses are kept in fixed windows with running sums, so each
/// observation costs O(1).
///
/// # Example
///
/// ```
/// use quantedge_advisor::{Observation, Rsi, RsiConfig};
/// use std::num::NonZero;
///
/// let mut rsi = Rsi::new(RsiConfig::new(NonZero::new(3).unwrap()));
///
/// // Need 3 price changes (4 observations)
/// assert_eq!(rsi.compute(&Observation::new(1, 10.0)), None);
/// assert_eq!(rsi.compute(&Observation::new(2, 12.0)), None);
/// assert_eq!(rsi.compute(&Observation::new(3, 11.0)), None);
///
/// // changes = +2, −1, +2 → avg_gain=4/3, avg_loss=1/3 → RSI=80
/// let value = rsi.compute(&Observation::new(4, 13.0)).unwrap();
/// assert!((value - 80.0).abs() < 1e-10);
/// ```
#[derive(Clone, Debug)]
pub struct Rsi {
    config: RsiConfig,
    prev_price: Option<Price>,
    gains: RingBuffer,
    losses: RingBuffer,
    sum_gain: f64,
    sum_loss: f64,
    current: Option<Price>,
    last_timestamp: Option<Timestamp>,
    length_reciprocal: f64,
}

impl Indicator for Rsi {
    type Config = RsiConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            prev_price: None,
            gains: RingBuffer::new(config.length),
            losses: RingBuffer::new(config.length),
            sum_gain: 0.0,
            sum_loss: 0.0,
            current: None,
            last_timestamp: None,
            #[allow(clippy::cast_precision_loss)]
            length_reciprocal: 1.0 / config.length as f64,
        }
    }

    #[inline]
    fn compute(&mut self, quote: &impl Quote) -> Option<Self::Output> {
        debug_assert!(
            self.last_timestamp.is_none_or(|t| t < quote.timestamp()),
            "timestamp must be strictly increasing: last={}, got={}",
            self.last_timestamp.unwrap_or(0),
            quote.timestamp(),
        );
        self.last_timestamp = Some(quote.timestamp());

        let price = quote.price();

        if let Some(prev_price) = self.prev_price.replace(price) {
            let (gain, loss) = Self::gain_and_loss(prev_price, price);

            if let Some(old) = self.gains.push(gain) {
                self.sum_gain -= old;
            }
            self.sum_gain += gain;

            if let Some(old) = self.losses.push(loss) {
                self.sum_loss -= old;
            }
            self.sum_loss += loss;

            // Snap rounding residue back to zero once the window holds no moves.
            if !self.gains.has_non_zero() {
                self.sum_gain = 0.0;
            }
            if !self.losses.has_non_zero() {
                self.sum_loss = 0.0;
            }

            if self.gains.is_ready() {
                self.current = Some(Self::rsi_from_averages(
                    self.sum_gain.max(0.0) * self.length_reciprocal,
                    self.sum_loss.max(0.0) * self.length_reciprocal,
                ));
            }
        }

        self.current
    }

    #[inline]
    fn value(&self) -> Option<Self::Output> {
        self.current
    }
}

impl Rsi {
    #[inline]
    fn gain_and_loss(prev_price: Price, price: Price) -> (Price, Price) {
        let change = price - prev_price;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        (gain, loss)
    }

    #[inline]
    fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            if avg_gain == 0.0 { 50.0 } else { 100.0 }
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        }
    }
}

impl Display for Rsi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RSI({})", self.config.length)
    }
}
