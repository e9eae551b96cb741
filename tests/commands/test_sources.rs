//! Tests for sources command

use forward_tracker::commands::sources::SourcesOptions;
use forward_tracker::SourceCounter;

#[test]
fn test_sources_options_default_is_online() {
    let options = SourcesOptions::default();
    assert!(!options.offline);
    assert!(!options.from_logs);
    assert!(options.output.is_none());
}

#[test]
fn test_counter_orders_ties_by_channel_id() {
    let mut counter = SourceCounter::new();
    counter.extend([20, 10, 20, 10, 5]);

    // Equal counts fall back to ascending channel ID
    assert_eq!(counter.most_common(), vec![(10, 2), (20, 2), (5, 1)]);
}

#[test]
fn test_counter_merge_accumulates() {
    let mut left = SourceCounter::new();
    left.extend([1, 1, 2]);
    let mut right = SourceCounter::new();
    right.extend([2, 3]);

    left.merge(right);
    assert_eq!(left.count(1), 2);
    assert_eq!(left.count(2), 2);
    assert_eq!(left.count(3), 1);
    assert_eq!(left.total(), 5);
}

#[tokio::test]
#[ignore] // Requires a live Telegram session
async fn test_sources_run() {
    use forward_tracker::commands::sources;

    let result = sources::run(SourcesOptions {
        limit: Some(10),
        ..Default::default()
    })
    .await;
    assert!(result.is_ok() || result.is_err());
}
