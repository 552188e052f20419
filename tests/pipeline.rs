mod fixtures;

use fixtures::{load_reference_quotes, load_reference_series, load_report_ref, series_until};
use quantedge_advisor::{
    Advisor, AdvisorConfig, EngineConfig, IndicatorSnapshot, Observation, PriceSeries,
    ScoringConfig, Tier, compute_indicators, score,
};
use std::num::NonZero;

const REPORT_PATH: &str = "tests/fixtures/data/pipeline.csv";

fn nz(n: usize) -> NonZero<usize> {
    NonZero::new(n).unwrap()
}

fn observations(prices: &[f64]) -> Vec<Observation> {
    (1..)
        .zip(prices)
        .map(|(t, &p)| Observation::new(t, p))
        .collect()
}

fn tier_name(tier: Tier) -> &'static str {
    match tier {
        Tier::Avoid => "avoid",
        Tier::Hold => "hold",
        Tier::Moderate => "moderate",
        Tier::StrongBuy => "strong_buy",
    }
}

#[test]
fn advisor_matches_reference_checkpoints() {
    let quotes = load_reference_quotes();
    let reference = load_report_ref(REPORT_PATH);
    assert!(!reference.is_empty());

    let advisor = Advisor::new(AdvisorConfig::default());

    for expected in &reference {
        let series = series_until(&quotes, expected.open_time);
        let report = advisor.evaluate(&series);
        let t = expected.open_time;

        assert_eq!(report.latest.map(|s| s.timestamp), Some(t));
        assert_eq!(report.score.score(), expected.score, "score at t={t}");
        assert_eq!(report.sentiment, expected.sentiment, "sentiment at t={t}");
        assert_eq!(report.weakening.score(), expected.weakening, "weakening at t={t}");
        assert_eq!(report.trend.direction.to_string(), expected.direction, "direction at t={t}");
        assert_eq!(report.trend.momentum.to_string(), expected.momentum, "momentum at t={t}");
        assert_eq!(tier_name(report.advice.tier), expected.tier, "tier at t={t}");
    }
}

#[test]
fn reference_checkpoints_cover_every_tier() {
    let reference = load_report_ref(REPORT_PATH);
    for tier in ["avoid", "hold", "moderate", "strong_buy"] {
        assert!(
            reference.iter().any(|r| r.tier == tier),
            "no checkpoint with tier {tier}"
        );
    }
}

#[test]
fn full_history_report() {
    let series = load_reference_series();
    let report = Advisor::default().evaluate(&series);

    let latest = report.latest.unwrap();
    assert!(latest.rsi.is_some());
    assert!(latest.sma_long.is_some());
    assert!(report.score.is_available());
    assert!(report.weakening.is_available());
    assert!(report.trend.price_slope.is_some());
    assert!(report.score.score() <= 100);
    assert!(report.sentiment <= 100);
    assert!(report.weakening.score() <= 100);
    assert_eq!(report.change, series.percent_change(5));
    assert!(report.conversion(50_000.0).is_some());
}

#[test]
fn three_point_sma_example() {
    let config = EngineConfig::builder().sma_short(nz(3)).build().unwrap();
    let prices = [0.641, 0.644, 0.648, 0.650, 0.652, 0.654, 0.648];
    let snapshots = compute_indicators(observations(&prices), &config);

    let expected = [None, None, Some(0.6443), Some(0.6473), Some(0.650), Some(0.652), Some(0.6513)];
    for (snapshot, expected) in snapshots.iter().zip(expected) {
        match (snapshot.sma_short, expected) {
            (None, None) => {}
            (Some(actual), Some(expected)) => {
                assert!((actual - expected).abs() < 5e-5, "{actual} vs {expected}");
            }
            (actual, expected) => panic!("SMA {actual:?}, expected {expected:?}"),
        }
    }

    let last = snapshots.last().unwrap();
    assert!(last.price.unwrap() < last.sma_short.unwrap());
}

#[test]
fn rsi_is_100_at_peak_of_steady_rise() {
    let mut prices: Vec<f64> = (0..15_u32).map(|i| 1.0 + f64::from(i) * 0.01).collect();
    prices.push(1.00);

    let snapshots = compute_indicators(observations(&prices), &EngineConfig::default());
    assert_eq!(snapshots[13].rsi, None);
    assert_eq!(snapshots[14].rsi, Some(100.0));
    assert!(snapshots[15].rsi.unwrap() < 100.0);
}

#[test]
fn monotonic_rise_never_crosses_down() {
    let prices: Vec<f64> = (0..300_u32).map(|i| 0.60 + f64::from(i) * 0.0005).collect();
    let config = EngineConfig::default();
    let snapshots = compute_indicators(observations(&prices), &config);
    let scoring = ScoringConfig::default();

    for pair in snapshots.windows(2) {
        let result = score(&pair[1], &pair[0], &scoring);
        if result.is_available() {
            assert!(!result.breakdown()[1].passed, "crossover at t={}", pair[1].timestamp);
        }
        if let Some(rsi) = pair[1].rsi {
            assert_eq!(rsi, 100.0);
        }
    }
}

#[test]
fn bearish_crossover_example() {
    let previous = IndicatorSnapshot {
        timestamp: 1,
        price: Some(0.65),
        rsi: Some(50.0),
        macd: Some(0.0002),
        macd_signal: Some(0.0001),
        sma_short: Some(0.66),
        sma_long: None,
    };
    let current = IndicatorSnapshot {
        timestamp: 2,
        macd: Some(-0.0001),
        ..previous
    };

    let result = score(&current, &previous, &ScoringConfig::default());
    assert!(result.breakdown()[1].passed);
    assert_eq!(result.score(), 30);
}

#[test]
fn compute_indicators_is_idempotent() {
    let quotes = load_reference_quotes();
    let config = EngineConfig::default();
    assert_eq!(
        compute_indicators(&quotes, &config),
        compute_indicators(&quotes, &config)
    );
}

#[test]
fn invalid_observation_is_skipped_not_zeroed() {
    let quotes = load_reference_quotes();
    let clean = PriceSeries::from_quotes(&quotes).unwrap();

    let mut with_gap: Vec<Observation> = quotes
        .iter()
        .map(|q| Observation::new(q.open_time, q.price))
        .collect();
    with_gap[300].price = f64::NAN;
    let with_gap = PriceSeries::new(with_gap).unwrap();

    let mut without: Vec<Observation> = clean.as_slice().to_vec();
    without.remove(300);
    let without = PriceSeries::new(without).unwrap();

    let config = EngineConfig::default();
    let gap: Vec<_> = with_gap.snapshots(&config).collect();
    let skipped: Vec<_> = without.snapshots(&config).collect();

    assert_eq!(gap[300], IndicatorSnapshot::undefined(quotes[300].open_time));
    assert_eq!(&gap[..300], &skipped[..300]);
    assert_eq!(&gap[301..], &skipped[300..]);
}

#[test]
fn weakening_and_sentiment_stay_in_bounds() {
    let quotes = load_reference_quotes();
    let advisor = Advisor::default();

    for end in (0..quotes.len()).step_by(37) {
        let series = series_until(&quotes, quotes[end].open_time);
        let report = advisor.evaluate(&series);
        assert!(report.sentiment <= 100);
        assert!(report.weakening.score() <= 100);
        if report.latest.and_then(|s| s.rsi).is_none() {
            assert_eq!(report.advice.tier, Tier::Hold);
        }
    }
}
