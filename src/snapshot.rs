use std::fmt::Display;

use crate::{Price, Timestamp};

/// Names one value of an [`IndicatorSnapshot`]. Used to report which
/// input was undefined when a score cannot be computed.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Field {
    Price,
    Rsi,
    Macd,
    MacdSignal,
    SmaShort,
    SmaLong,
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Price => "price",
            Self::Rsi => "rsi",
            Self::Macd => "macd",
            Self::MacdSignal => "macd_signal",
            Self::SmaShort => "sma_short",
            Self::SmaLong => "sma_long",
        };
        f.write_str(name)
    }
}

/// Indicator values computed for one observation.
///
/// Every value is `None` while undefined: not enough history yet, or the
/// observation's price was invalid. Snapshots are plain values; the engine
/// produces a fresh one per observation and never revisits it.
#[derive(PartialEq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndicatorSnapshot {
    pub timestamp: Timestamp,
    pub price: Option<Price>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub sma_short: Option<Price>,
    pub sma_long: Option<Price>,
}

impl IndicatorSnapshot {
    /// Snapshot with every value undefined.
    #[must_use]
    pub fn undefined(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            price: None,
            rsi: None,
            macd: None,
            macd_signal: None,
            sma_short: None,
            sma_long: None,
        }
    }

    /// Value of `field`, or `None` if it is undefined.
    #[inline]
    #[must_use]
    pub fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::Price => self.price,
            Field::Rsi => self.rsi,
            Field::Macd => self.macd,
            Field::MacdSignal => self.macd_signal,
            Field::SmaShort => self.sma_short,
            Field::SmaLong => self.sma_long,
        }
    }

    /// Finite value of `field`, or the field itself as the error.
    ///
    /// Snapshots built by callers may carry NaN or infinities; those count
    /// as undefined.
    #[inline]
    pub(crate) fn require(&self, field: Field) -> Result<f64, Field> {
        self.get(field).filter(|v| v.is_finite()).ok_or(field)
    }

    /// MACD histogram: `macd − macd_signal`.
    #[inline]
    #[must_use]
    pub fn histogram(&self) -> Option<f64> {
        Some(self.macd? - self.macd_signal?)
    }

    pub(crate) fn require_histogram(&self) -> Result<f64, Field> {
        Ok(self.require(Field::Macd)? - self.require(Field::MacdSignal)?)
    }
}
