use std::num::NonZero;

use crate::{IndicatorSnapshot, Observation, PriceSeries};

/// Asserts that two `f64` values are approximately equal using a
/// relative epsilon of `4 * f64::EPSILON`.
macro_rules! assert_approx {
    ($actual:expr, $expected:expr) => {{
        let (a, e) = ($actual, $expected);
        assert!(
            (a - e).abs() < e.abs() * 4.0 * f64::EPSILON,
            "assert_approx failed: actual={a}, expected={e}, diff={}",
            (a - e).abs(),
        );
    }};
}

pub(crate) use assert_approx;

pub fn nz(n: usize) -> NonZero<usize> {
    NonZero::new(n).unwrap()
}

/// Observation with a price and timestamp.
pub fn quote(price: f64, time: u64) -> Observation {
    Observation::new(time, price)
}

/// Series timestamped 1, 2, 3, ...
pub fn series(prices: &[f64]) -> PriceSeries {
    PriceSeries::from_prices(1, prices.iter().copied())
}

/// Fully defined snapshot on which no scoring condition fires: price on
/// its SMAs, neutral RSI, MACD on its signal. Override fields with struct
/// update syntax.
pub fn snapshot(timestamp: u64) -> IndicatorSnapshot {
    IndicatorSnapshot {
        timestamp,
        price: Some(1.0),
        rsi: Some(50.0),
        macd: Some(0.0),
        macd_signal: Some(0.0),
        sma_short: Some(1.0),
        sma_long: Some(1.0),
    }
}

/// Deserializes `T` from flat key/value pairs; absent keys take defaults
/// where `T` allows it.
#[cfg(feature = "serde")]
pub fn from_pairs<T, V>(pairs: &[(&'static str, V)]) -> Result<T, serde::de::value::Error>
where
    T: serde::de::DeserializeOwned,
    V: Copy + serde::de::IntoDeserializer<'static, serde::de::value::Error>,
{
    T::deserialize(serde::de::value::MapDeserializer::new(pairs.iter().copied()))
}
