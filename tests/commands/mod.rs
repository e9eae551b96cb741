//! Command-level tests

mod test_channel_info;
mod test_init_session;
mod test_log_channel;
mod test_sources;
