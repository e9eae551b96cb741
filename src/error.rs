//! Error type shared by every tracker command.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing session file: {0}")]
    SessionNotFound(String),

    #[error("Another process is holding the session lock")]
    SessionLocked,

    #[error("Could not take the session lock: {0}")]
    LockError(String),

    #[error("Telegram request failed: {0}")]
    TelegramError(String),

    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Channel log not found: {0}")]
    LogNotFound(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    SerializationError(String),

    #[error("Bad argument: {0}")]
    InvalidArgument(String),

    #[error("Not signed in to Telegram")]
    AuthorizationRequired,
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<grammers_client::InvocationError> for Error {
    fn from(err: grammers_client::InvocationError) -> Self {
        Error::TelegramError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_keep_their_context() {
        let cases: Vec<(Error, &str)> = vec![
            (
                Error::SessionNotFound("tracker_session".into()),
                "tracker_session",
            ),
            (Error::LockError("timeout".into()), "timeout"),
            (Error::TelegramError("flood wait".into()), "flood wait"),
            (Error::ChannelNotFound("1363786367".into()), "1363786367"),
            (
                Error::LogNotFound("logs/1363786367.json".into()),
                "1363786367.json",
            ),
            (Error::SerializationError("bad json".into()), "bad json"),
            (
                Error::InvalidArgument("no channels configured".into()),
                "no channels",
            ),
        ];

        for (err, needle) in cases {
            let message = err.to_string();
            assert!(message.contains(needle), "{:?} lost its context", err);
        }
    }

    #[test]
    fn unit_variants_have_stable_messages() {
        assert!(Error::SessionLocked
            .to_string()
            .contains("holding the session lock"));
        assert!(Error::AuthorizationRequired
            .to_string()
            .contains("Not signed in"));
    }

    #[test]
    fn log_not_found_names_the_missing_path() {
        let err = Error::LogNotFound("logs/404.json".into());
        let msg = err.to_string();
        assert!(msg.contains("Channel log not found"));
        assert!(msg.contains("404.json"));
    }

    #[test]
    fn io_errors_convert_via_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file vanished");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::IoError(_)));
        assert!(err.to_string().contains("file vanished"));
    }

    #[test]
    fn serde_json_errors_convert_via_from() {
        let parse_err = serde_json::from_str::<Vec<i32>>("[1, 2,]").unwrap_err();
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::SerializationError(_)));
        assert!(err.to_string().contains("JSON error"));
    }

    #[test]
    fn variants_format_with_debug() {
        let debug = format!("{:?}", Error::SessionLocked);
        assert!(debug.contains("SessionLocked"));
    }

    #[test]
    fn result_alias_carries_the_error() {
        let outcome: Result<i32> = Err(Error::SessionLocked);
        assert!(outcome.is_err());
    }
}
