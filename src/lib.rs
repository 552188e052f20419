//! Indicator, scoring and advisory pipeline for FX price series.
//!
//! A [`PriceSeries`] flows through the [`IndicatorEngine`] (RSI, MACD and
//! two SMAs) into per-observation [`IndicatorSnapshot`]s. Pure functions
//! then turn the latest snapshots into a composite [`score`], a
//! [`weakening_score`], a short-window [`analyze_trend`] classification and
//! a [`recommend`]ation [`Tier`]. [`Advisor`] runs every stage at once.
//!
//! Values are `None` until enough history has been received. Missing
//! inputs never panic: scores fall back to 0 and the tier to
//! [`Tier::Hold`].
//!
//! Each indicator type ([`Sma`], [`Ema`], [`Rsi`], [`Macd`]) exposes
//! [`new`](Sma::new), [`compute`](Sma::compute), and
//! [`value`](Sma::value) as inherent methods, no trait import needed.
//! Import [`Indicator`] only for generic code.
//!
//! The crate logs through [`tracing`] and never installs a subscriber.

mod advisor;
mod advisory;
mod conversion;
mod ema;
mod engine;
mod error;
mod indicator;
mod macd;
mod price_series;
mod quote;
mod ring_buffer;
mod rsi;
mod scoring;
mod slope;
mod sma;
mod snapshot;
mod trend;
mod weakening;

pub use crate::error::{ConfigError, SeriesError};
pub use crate::indicator::{Indicator, IndicatorConfig, IndicatorConfigBuilder};
pub use crate::quote::{Observation, Price, Quote, Timestamp};

pub use crate::ema::{Ema, EmaConfig, EmaConfigBuilder};
pub use crate::macd::{Macd, MacdConfig, MacdConfigBuilder, MacdValue};
pub use crate::rsi::{Rsi, RsiConfig, RsiConfigBuilder};
pub use crate::sma::{Sma, SmaConfig, SmaConfigBuilder};

pub use crate::engine::{
    EngineConfig, EngineConfigBuilder, IndicatorEngine, Snapshots, compute_indicators,
};
pub use crate::price_series::PriceSeries;
pub use crate::snapshot::{Field, IndicatorSnapshot};

pub use crate::advisory::{
    Advice, AdvisoryConfig, AdvisoryConfigBuilder, Rationale, Tier, advise, advise_result,
    recommend,
};
pub use crate::scoring::{
    ConditionResult, Rule, ScoreResult, ScoringConfig, ScoringConfigBuilder, Strength,
    TrendPolarity, Unavailable, score, sentiment_strength,
};
pub use crate::trend::{
    Direction, Momentum, TrendConfig, TrendConfigBuilder, TrendResult, analyze_trend,
};
pub use crate::weakening::{
    WeakeningConfig, WeakeningConfigBuilder, WeakeningOutlook, weakening_score,
};

pub use crate::advisor::{Advisor, AdvisorConfig, Report};
pub use crate::conversion::{ConversionQuote, percent_change};

macro_rules! impl_indicator_methods {
    ($type:ty, $config:ty, $output:ty) => {
        impl $type {
            /// See [`Indicator::new`].
            #[must_use]
            pub fn new(config: $config) -> Self {
                <Self as Indicator>::new(config)
            }

            /// See [`Indicator::compute`].
            #[inline]
            pub fn compute(&mut self, quote: &impl Quote) -> Option<$output> {
                <Self as Indicator>::compute(self, quote)
            }

            /// See [`Indicator::value`].
            #[must_use]
            #[inline]
            pub fn value(&self) -> Option<$output> {
                <Self as Indicator>::value(self)
            }
        }
    };
}

impl_indicator_methods!(Sma, SmaConfig, Price);
impl_indicator_methods!(Ema, EmaConfig, Price);
impl_indicator_methods!(Rsi, RsiConfig, f64);
impl_indicator_methods!(Macd, MacdConfig, MacdValue);

#[cfg(test)]
mod test_util;
