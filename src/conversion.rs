use crate::Price;

#[inline]
fn is_rate(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Percent change from `then` to `now`: `(now − then) / then × 100`.
///
/// `None` unless both prices are finite and positive.
///
/// ```
/// use quantedge_advisor::percent_change;
///
/// let change = percent_change(0.6457, 0.6488).unwrap();
/// assert!((change - 0.48).abs() < 0.005);
/// ```
#[must_use]
pub fn percent_change(then: Price, now: Price) -> Option<f64> {
    (is_rate(then) && is_rate(now)).then(|| (now - then) / then * 100.0)
}

/// Cost, in the base currency, of buying `amount` of the quote currency
/// at the current rate versus an earlier one.
///
/// Rates are quoted as units of quote currency per unit of base currency,
/// as in AUD/USD = 0.6488, so the cost of `amount` is `amount / rate`.
#[derive(PartialEq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConversionQuote {
    amount: f64,
    cost_now: f64,
    cost_then: f64,
}

impl ConversionQuote {
    /// `None` unless `amount` and both rates are finite and positive.
    ///
    /// ```
    /// use quantedge_advisor::ConversionQuote;
    ///
    /// let quote = ConversionQuote::new(50_000.0, 0.6488, 0.6457).unwrap();
    /// assert_eq!(quote.cost_now().round(), 77_065.0);
    /// assert!(quote.saving() > 0.0);
    /// ```
    #[must_use]
    pub fn new(amount: f64, rate_now: Price, rate_then: Price) -> Option<Self> {
        if !(is_rate(amount) && is_rate(rate_now) && is_rate(rate_then)) {
            return None;
        }

        Some(Self {
            amount,
            cost_now: amount / rate_now,
            cost_then: amount / rate_then,
        })
    }

    /// Quote-currency amount being bought.
    #[must_use]
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Base-currency cost at the current rate.
    #[must_use]
    pub fn cost_now(&self) -> f64 {
        self.cost_now
    }

    /// Base-currency cost at the earlier rate.
    #[must_use]
    pub fn cost_then(&self) -> f64 {
        self.cost_then
    }

    /// `cost_then − cost_now`; positive when buying now is cheaper.
    #[must_use]
    pub fn saving(&self) -> f64 {
        self.cost_then - self.cost_now
    }
}
