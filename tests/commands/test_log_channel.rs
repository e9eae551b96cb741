//! Tests for log command

use forward_tracker::commands::log_channel::{LogOutcome, LogSummary};

#[test]
fn test_log_summary_tallies_outcomes() {
    let mut summary = LogSummary::default();
    summary.record(&LogOutcome::Written {
        channel_id: 1,
        records: 10,
    });
    summary.record(&LogOutcome::KeptExisting { channel_id: 2 });
    summary.record(&LogOutcome::Unreachable);
    summary.record(&LogOutcome::Written {
        channel_id: 3,
        records: 0,
    });

    assert_eq!(summary.written, 2);
    assert_eq!(summary.kept, 1);
    assert_eq!(summary.unreachable, 1);
    assert_eq!(summary.channels(), 4);
}

#[test]
fn test_log_file_name_uses_bare_channel_id() {
    let path = forward_tracker::log_store::log_path(std::path::Path::new("logs"), 1234567);
    assert_eq!(path, std::path::PathBuf::from("logs/1234567.json"));
}

#[tokio::test]
#[ignore] // Requires a live Telegram session
async fn test_log_channel_run() {
    use forward_tracker::commands::log_channel;
    use forward_tracker::ChannelRef;

    let result = log_channel::run(Some(ChannelRef::username("durov")), Some(false), Some(10)).await;
    assert!(result.is_ok() || result.is_err());
}
