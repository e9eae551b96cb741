//! Confirmation-gate behavior of the init-session command.

use forward_tracker::commands::init_session;

#[test]
fn exact_uppercase_yes_confirms() {
    assert!(init_session::confirmed("YES"));
    assert!(init_session::confirmed("  YES\n"));
}

#[test]
fn anything_else_cancels() {
    for answer in ["yes", "Yes", "y", "", "NO", "YES!"] {
        assert!(
            !init_session::confirmed(answer),
            "{:?} must not confirm a session reset",
            answer
        );
    }
}

#[tokio::test]
#[ignore] // Requires user interaction
async fn interactive_login_flow() {
    let _ = init_session::run().await;
}
