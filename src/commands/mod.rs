//! Command implementations
//!
//! All tracker CLI commands are implemented here.
//! Each module corresponds to a subcommand in the CLI.

pub mod channel_info;
pub mod init_session;
pub mod log_channel;
pub mod run;
pub mod sources;

// Re-export commonly used types
pub use channel_info::{run as channel_info_run, ChannelInfo};
pub use log_channel::{run as log_channel_run, LogOutcome, LogSummary};
pub use run::run as pipeline_run;
pub use sources::{run as sources_run, SourcesOptions, SourcesReport};
