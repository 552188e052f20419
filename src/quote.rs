/// A price value.
///
/// Semantic alias for [`f64`]. Documents intent in function signatures
/// without introducing newtype construction overhead.
pub type Price = f64;

/// Observation timestamp or sequence number.
///
/// Must be strictly increasing between consecutive calls to
/// [`Indicator::compute`](crate::Indicator::compute).
pub type Timestamp = u64;

/// A single timestamped price used as input to all indicators.
///
/// Implement this on your own quote/rate type to avoid per-tick
/// conversion. Indicators and the [`IndicatorEngine`](crate::IndicatorEngine)
/// accept `&impl Quote`.
///
/// # Example
///
/// ```
/// use quantedge_advisor::{Price, Quote, Timestamp};
///
/// struct FxRate {
///     mid: f64,
///     at: u64,
/// }
///
/// impl Quote for FxRate {
///     fn timestamp(&self) -> Timestamp { self.at }
///     fn price(&self) -> Price { self.mid }
/// }
/// ```
pub trait Quote {
    /// Observation timestamp or sequence number.
    fn timestamp(&self) -> Timestamp;

    /// Observed (closing or latest) price.
    fn price(&self) -> Price;

    /// `true` when the price can feed rolling computations: finite and
    /// strictly positive.
    #[inline]
    fn is_valid(&self) -> bool {
        let price = self.price();
        price.is_finite() && price > 0.0
    }
}

/// Owned `(timestamp, price)` observation stored by
/// [`PriceSeries`](crate::PriceSeries).
#[derive(PartialEq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observation {
    pub timestamp: Timestamp,
    pub price: Price,
}

impl Observation {
    #[must_use]
    pub fn new(timestamp: Timestamp, price: Price) -> Self {
        Self { timestamp, price }
    }
}

impl Quote for Observation {
    #[inline]
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    #[inline]
    fn price(&self) -> Price {
        self.price
    }
}

impl Quote for (Timestamp, Price) {
    #[inline]
    fn timestamp(&self) -> Timestamp {
        self.0
    }

    #[inline]
    fn price(&self) -> Price {
        self.1
    }
}

impl<Q: Quote + ?Sized> Quote for &Q {
    #[inline]
    fn timestamp(&self) -> Timestamp {
        (**self).timestamp()
    }

    #[inline]
    fn price(&self) -> Price {
        (**self).price()
    }
}

impl From<(Timestamp, Price)> for Observation {
    fn from((timestamp, price): (Timestamp, Price)) -> Self {
        Self { timestamp, price }
    }
}
