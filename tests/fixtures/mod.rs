#![allow(dead_code)]

use quantedge_advisor::{Observation, PriceSeries, Price, Quote, Timestamp};
use serde::{Deserialize, de::DeserializeOwned};

/// AUD/USD 30-minute price parsed from CSV.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RefQuote {
    pub open_time: u64,
    pub price: f64,
}

impl Quote for RefQuote {
    fn timestamp(&self) -> Timestamp {
        self.open_time
    }

    fn price(&self) -> Price {
        self.price
    }
}

/// Reference value with timestamp.
#[derive(Debug, Deserialize)]
pub struct RefValue {
    pub open_time: u64,
    pub expected: f64,
}

/// Reference MACD line and signal with timestamp.
#[derive(Debug, Deserialize)]
pub struct RefMacdValue {
    pub open_time: u64,
    pub macd: f64,
    pub signal: f64,
}

/// Expected advisor report at one checkpoint of the price history.
#[derive(Debug, Deserialize)]
pub struct RefReport {
    pub open_time: u64,
    pub score: u8,
    pub sentiment: u8,
    pub weakening: u8,
    pub direction: String,
    pub momentum: String,
    pub tier: String,
}

const QUOTES_PATH: &str = "tests/fixtures/data/audusd-30m.csv";

/// Load reference AUD/USD quotes.
pub fn load_reference_quotes() -> Vec<RefQuote> {
    load_records(QUOTES_PATH, "invalid quote record")
}

/// Reference quotes as a validated series.
pub fn load_reference_series() -> PriceSeries {
    PriceSeries::from_quotes(load_reference_quotes()).expect("reference quotes are ordered")
}

/// Reference quotes up to and including `open_time`.
pub fn series_until(quotes: &[RefQuote], open_time: u64) -> PriceSeries {
    PriceSeries::new(
        quotes
            .iter()
            .take_while(|q| q.open_time <= open_time)
            .map(|q| Observation::new(q.open_time, q.price))
            .collect(),
    )
    .expect("reference quotes are ordered")
}

/// Load single-value reference data (SMA, EMA, RSI).
pub fn load_ref_values(path: &str) -> Vec<RefValue> {
    load_records(path, "invalid reference record")
}

/// Load MACD reference data (line, signal).
pub fn load_macd_ref(path: &str) -> Vec<RefMacdValue> {
    load_records(path, "invalid MACD reference record")
}

/// Load advisor checkpoints.
pub fn load_report_ref(path: &str) -> Vec<RefReport> {
    load_records(path, "invalid report record")
}

/// Assert two f64 values are within tolerance.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64, context: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{context}: expected {expected:.10}, got {actual:.10}, diff {diff:.2e} > tolerance {tolerance:.2e}"
    );
}

/// Generate a reference match test for a single-value indicator.
///
/// Usage: `reference_test!(sma_50, Sma, SmaConfig::new(nz(50)), "tests/fixtures/data/sma-50.csv", 1e-12);`
#[allow(unused_macros)]
macro_rules! reference_test {
    ($name:ident, $ind:ty, $config:expr, $ref_path:expr, $tolerance:expr) => {
        mod $name {
            use super::fixtures::*;
            use quantedge_advisor::*;
            use std::num::NonZero;

            fn nz(n: usize) -> NonZero<usize> {
                NonZero::new(n).unwrap()
            }

            #[test]
            fn matches_reference() {
                let quotes = load_reference_quotes();
                let reference = load_ref_values($ref_path);
                let mut ind = <$ind>::new($config);

                let mut ref_idx = 0;
                for quote in &quotes {
                    ind.compute(quote);

                    if ref_idx < reference.len()
                        && quote.open_time == reference[ref_idx].open_time
                    {
                        let value = ind.value().unwrap_or_else(|| {
                            panic!("{} returned None at t={}", stringify!($name), quote.open_time)
                        });
                        assert_near(
                            value,
                            reference[ref_idx].expected,
                            $tolerance,
                            &format!(
                                "{} at quote {ref_idx} (t={})",
                                stringify!($name),
                                quote.open_time
                            ),
                        );
                        ref_idx += 1;
                    } else {
                        assert!(
                            ind.value().is_none(),
                            "{} defined before reference at t={}",
                            stringify!($name),
                            quote.open_time
                        );
                    }
                }

                assert_eq!(
                    ref_idx,
                    reference.len(),
                    "not all reference values checked: {ref_idx}/{}",
                    reference.len()
                );
            }
        }
    };
}

#[allow(unused_imports)]
pub(crate) use reference_test;

fn load_records<D>(path: &str, expect_msg: &str) -> Vec<D>
where
    D: DeserializeOwned,
{
    let mut rdr =
        csv::Reader::from_path(path).unwrap_or_else(|e| panic!("failed to open {path}: {e}"));

    rdr.deserialize().map(|r| r.expect(expect_msg)).collect()
}
