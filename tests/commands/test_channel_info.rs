//! Tests for info command

use forward_tracker::commands::channel_info::ChannelInfo;

#[test]
fn test_channel_info_accessible() {
    let info = ChannelInfo {
        channel_id: Some(123),
        title: "Some Channel".to_string(),
    };
    assert!(info.is_accessible());
}

#[test]
fn test_channel_info_inaccessible_placeholder() {
    let info = ChannelInfo {
        channel_id: None,
        title: forward_tracker::channel::INACCESSIBLE_TITLE.to_string(),
    };
    assert!(!info.is_accessible());
    assert!(info.title.starts_with('_'));
}

#[tokio::test]
#[ignore] // Requires a live Telegram session
async fn test_channel_info_run() {
    use forward_tracker::commands::channel_info;
    use forward_tracker::ChannelRef;

    let result = channel_info::run(&ChannelRef::username("telegram")).await;
    assert!(result.is_ok() || result.is_err());
}
