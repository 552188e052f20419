use crate::{
    EngineConfig, IndicatorEngine, Observation, Price, Quote, SeriesError, Snapshots, Timestamp,
    conversion::percent_change,
};

/// Immutable, time-ordered sequence of price observations.
///
/// Timestamps are strictly increasing. Prices are stored as given: a
/// non-finite or non-positive price is kept in place and treated as an
/// invalid observation by the [`IndicatorEngine`].
///
/// # Example
///
/// ```
/// use quantedge_advisor::{EngineConfig, PriceSeries};
///
/// let series = PriceSeries::from_prices(1, [0.641, 0.644, 0.648]);
/// assert_eq!(series.len(), 3);
/// assert_eq!(series.tail(2).len(), 2);
///
/// let snapshots: Vec<_> = series.snapshots(&EngineConfig::default()).collect();
/// assert_eq!(snapshots.len(), 3);
/// ```
#[derive(PartialEq, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PriceSeries {
    observations: Vec<Observation>,
}

impl PriceSeries {
    /// Validates ordering and wraps `observations`.
    ///
    /// # Errors
    ///
    /// [`SeriesError::UnorderedTimestamp`] at the first timestamp that does
    /// not strictly follow its predecessor.
    pub fn new(observations: Vec<Observation>) -> Result<Self, SeriesError> {
        if let Some(index) = observations
            .windows(2)
            .position(|pair| pair[1].timestamp <= pair[0].timestamp)
        {
            return Err(SeriesError::UnorderedTimestamp {
                index: index + 1,
                previous: observations[index].timestamp,
                current: observations[index + 1].timestamp,
            });
        }

        Ok(Self { observations })
    }

    /// Collects any quotes into a series.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn from_quotes<I>(quotes: I) -> Result<Self, SeriesError>
    where
        I: IntoIterator,
        I::Item: Quote,
    {
        Self::new(
            quotes
                .into_iter()
                .map(|q| Observation::new(q.timestamp(), q.price()))
                .collect(),
        )
    }

    /// Series timestamped with consecutive sequence numbers from `first`.
    #[must_use]
    pub fn from_prices<I>(first: Timestamp, prices: I) -> Self
    where
        I: IntoIterator<Item = Price>,
    {
        Self {
            observations: (first..).zip(prices).map(Observation::from).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Full history, oldest first.
    #[must_use]
    pub fn as_slice(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// Trailing window of at most `n` observations.
    #[must_use]
    pub fn tail(&self, n: usize) -> &[Observation] {
        let start = self.observations.len().saturating_sub(n);
        &self.observations[start..]
    }

    /// Lazy snapshots over the full history. Each call starts afresh.
    #[must_use]
    pub fn snapshots(&self, config: &EngineConfig) -> Snapshots<std::slice::Iter<'_, Observation>> {
        IndicatorEngine::new(*config).snapshots(self.observations.iter())
    }

    /// Observation `n` steps before the latest one.
    #[must_use]
    pub fn lookback(&self, n: usize) -> Option<&Observation> {
        let index = self.observations.len().checked_sub(n.checked_add(1)?)?;
        self.observations.get(index)
    }

    /// Percent change of the latest price against the one `lookback`
    /// observations earlier. `None` if the history is too short or either
    /// price is invalid.
    #[must_use]
    pub fn percent_change(&self, lookback: usize) -> Option<f64> {
        if lookback == 0 {
            return None;
        }
        percent_change(self.lookback(lookback)?.price, self.last()?.price)
    }
}

impl TryFrom<Vec<Observation>> for PriceSeries {
    type Error = SeriesError;

    fn try_from(observations: Vec<Observation>) -> Result<Self, Self::Error> {
        Self::new(observations)
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::series;

    mod construction {
        use super::*;

        #[test]
        fn accepts_strictly_increasing() {
            let series = PriceSeries::new(vec![
                Observation::new(1, 0.641),
                Observation::new(5, 0.644),
            ])
            .unwrap();
            assert_eq!(series.len(), 2);
            assert!(!series.is_empty());
        }

        #[test]
        fn rejects_duplicate_timestamp() {
            let err = PriceSeries::new(vec![
                Observation::new(1, 0.641),
                Observation::new(2, 0.644),
                Observation::new(2, 0.648),
            ])
            .unwrap_err();
            assert_eq!(
                err,
                SeriesError::UnorderedTimestamp {
                    index: 2,
                    previous: 2,
                    current: 2,
                }
            );
        }

        #[test]
        fn rejects_decreasing_timestamp() {
            let err = PriceSeries::from_quotes([(3_u64, 0.65), (1, 0.66)]).unwrap_err();
            assert!(matches!(err, SeriesError::UnorderedTimestamp { index: 1, .. }));
        }

        #[test]
        fn keeps_invalid_prices() {
            let series = series(&[0.641, f64::NAN, 0.648]);
            assert_eq!(series.len(), 3);
            assert!(series.as_slice()[1].price.is_nan());
        }

        #[test]
        fn empty_is_valid() {
            assert!(PriceSeries::new(Vec::new()).unwrap().is_empty());
        }
    }

    mod views {
        use super::*;

        #[test]
        fn tail_returns_trailing_window() {
            let series = series(&[1.0, 2.0, 3.0, 4.0]);
            let prices: Vec<_> = series.tail(2).iter().map(|o| o.price).collect();
            assert_eq!(prices, vec![3.0, 4.0]);
        }

        #[test]
        fn tail_longer_than_series_returns_all() {
            assert_eq!(series(&[1.0, 2.0]).tail(10).len(), 2);
        }

        #[test]
        fn lookback_counts_back_from_latest() {
            let series = series(&[1.0, 2.0, 3.0, 4.0]);
            assert_eq!(series.lookback(0).unwrap().price, 4.0);
            assert_eq!(series.lookback(3).unwrap().price, 1.0);
            assert_eq!(series.lookback(4), None);
            assert_eq!(series.lookback(usize::MAX), None);
        }

        #[test]
        fn last_is_latest() {
            assert_eq!(series(&[1.0, 2.0]).last().unwrap().price, 2.0);
        }
    }

    mod snapshots {
        use super::*;

        #[test]
        fn restartable() {
            let series = series(&[0.641, 0.644, 0.648, 0.650]);
            let config = EngineConfig::default();
            let first: Vec<_> = series.snapshots(&config).collect();
            let second: Vec<_> = series.snapshots(&config).collect();
            assert_eq!(first, second);
        }
    }

    mod percent_change {
        use super::*;

        #[test]
        fn against_earlier_price() {
            let series = series(&[0.6457, 0.650, 0.652, 0.654, 0.650, 0.6488]);
            let change = series.percent_change(5).unwrap();
            assert!((change - (0.6488 - 0.6457) / 0.6457 * 100.0).abs() < 1e-12);
        }

        #[test]
        fn none_when_history_too_short() {
            assert_eq!(series(&[1.0, 1.1]).percent_change(2), None);
        }

        #[test]
        fn none_for_zero_lookback() {
            assert_eq!(series(&[1.0, 1.1]).percent_change(0), None);
        }

        #[test]
        fn none_when_price_invalid() {
            assert_eq!(series(&[f64::NAN, 1.1]).percent_change(1), None);
        }
    }
}
