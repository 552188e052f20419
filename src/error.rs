use crate::Timestamp;

/// Rejected configuration. Returned by the fallible `build` of the
/// pipeline config builders, before any computation runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// MACD fast EMA must be shorter than the slow one.
    #[error("MACD fast length ({fast}) must be shorter than slow length ({slow})")]
    MacdLengths { fast: usize, slow: usize },

    /// Short SMA must be shorter than the long one.
    #[error("SMA short length ({short}) must be shorter than long length ({long})")]
    SmaLengths { short: usize, long: usize },

    /// An indicator length of zero, only reachable through deserialization.
    #[error("{name} length must be non-zero")]
    ZeroLength { name: &'static str },

    /// Condition weights would let the score exceed 100.
    #[error("condition weights sum to {total}, exceeding 100")]
    WeightOverflow { total: u32 },

    /// A score or RSI threshold outside `0..=100`.
    #[error("{name} threshold {value} is outside 0..=100")]
    ThresholdOutOfRange { name: &'static str, value: String },

    /// Tier thresholds must satisfy `avoid_below <= moderate < strong`.
    #[error(
        "tier thresholds out of order: avoid_below={avoid_below}, moderate={moderate}, strong={strong}"
    )]
    TierOrder {
        avoid_below: u8,
        moderate: u8,
        strong: u8,
    },

    /// A slope window needs at least two points.
    #[error("{name} window of {length} is too short, need at least 2")]
    WindowTooShort { name: &'static str, length: usize },
}

/// Rejected price series.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeriesError {
    /// Timestamps must be strictly increasing.
    #[error("timestamp {current} at index {index} does not follow {previous}")]
    UnorderedTimestamp {
        index: usize,
        previous: Timestamp,
        current: Timestamp,
    },
}
