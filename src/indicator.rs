use crate::Quote;

use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

/// Configuration for a technical [`Indicator`].
///
/// Every indicator has a corresponding config type that holds its
/// parameters. Configs are value types: cheap to clone, compare, and hash.
pub trait IndicatorConfig: Sized + PartialEq + Eq + Hash + Display + Debug {
    /// Builder type for constructing this config.
    type Builder: IndicatorConfigBuilder<Self>;

    /// Returns a new builder with default values.
    fn builder() -> Self::Builder;

    /// Window length (number of observations). For composite indicators,
    /// the longest window involved.
    fn length(&self) -> usize;
}

/// Builder for an [`IndicatorConfig`].
pub trait IndicatorConfigBuilder<Config>
where
    Config: IndicatorConfig,
{
    /// Builds the config. Panics if required fields are missing.
    #[must_use]
    fn build(self) -> Config;
}

/// A streaming technical indicator.
///
/// Indicators maintain internal state and update incrementally on each call
/// to [`compute`](Indicator::compute), doing O(1) work per observation.
/// Output is `None` until enough data has been received.
///
/// Callers must feed finite, positive prices with strictly increasing
/// timestamps; the [`IndicatorEngine`](crate::IndicatorEngine) filters
/// invalid observations before they reach an indicator.
///
/// # Example
///
/// ```
/// use quantedge_advisor::{Indicator, Observation, Sma, SmaConfig};
/// use std::num::NonZero;
///
/// let mut sma = Sma::new(SmaConfig::new(NonZero::new(3).unwrap()));
///
/// assert_eq!(sma.compute(&Observation::new(1, 10.0)), None);
/// assert_eq!(sma.compute(&Observation::new(2, 20.0)), None);
/// assert_eq!(sma.compute(&Observation::new(3, 30.0)), Some(20.0));
/// ```
pub trait Indicator: Sized + Clone + Display + Debug {
    /// Configuration type for this indicator.
    type Config: IndicatorConfig;

    /// Computed output type. `f64` for simple indicators,
    /// a struct for composite ones (e.g. MACD).
    type Output: Send + Sync + Display + Debug;

    /// Creates a new indicator from the given config.
    fn new(config: Self::Config) -> Self;

    /// Feeds an observation and returns the updated indicator value,
    /// or `None` if not enough history has been seen.
    fn compute(&mut self, quote: &impl Quote) -> Option<Self::Output>;

    /// Returns the last computed indicator value without advancing state.
    ///
    /// This is a cached field read: O(1), no computation.
    fn value(&self) -> Option<Self::Output>;
}

/// Serialized form of a config holding a single window length.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
pub struct LengthConfig {
    length: usize,
}

#[cfg(feature = "serde")]
impl LengthConfig {
    pub(crate) fn non_zero(
        &self,
        name: &'static str,
    ) -> Result<std::num::NonZero<usize>, crate::ConfigError> {
        std::num::NonZero::new(self.length).ok_or(crate::ConfigError::ZeroLength { name })
    }
}
