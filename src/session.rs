//! Telegram session plumbing.
//!
//! Covers the on-disk session file, the exclusive lock that serializes
//! runs against one account, and construction of a connected client.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use fs2::FileExt;
use grammers_client::client::updates::UpdatesLike;
use grammers_client::Client;
use grammers_mtsender::{SenderPool, SenderPoolHandle};
use grammers_session::storages::SqliteSession;
use tokio::sync::mpsc;

use crate::config::{Config, LOCK_FILE};
use crate::error::{Error, Result};

/// Exclusive-access guard for the Telegram session.
///
/// Telegram tolerates only one active consumer per session file, so every
/// command takes this lock before connecting.
pub struct SessionLock {
    file: Option<File>,
}

impl SessionLock {
    /// Take the lock, failing fast when another run already holds it.
    pub fn acquire() -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(LOCK_FILE)
            .map_err(|e| Error::LockError(format!("Cannot open {}: {}", LOCK_FILE, e)))?;

        if file.try_lock_exclusive().is_err() {
            eprintln!(
                r#"
⚠️  ERROR: the Telegram session is already in use by another process!

Operations on one session have to run sequentially. Two commands
running in parallel against the same session cause conflicts and
can get the account temporarily blocked.

Wait for the other process to finish, then retry.
"#
            );
            return Err(Error::SessionLocked);
        }

        Ok(Self { file: Some(file) })
    }

    /// Unlock and remove the lock file. Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
            let _ = std::fs::remove_file(LOCK_FILE);
        }
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        self.release();
    }
}

/// Session file path for the configured session name.
pub fn session_file_name(config: &Config) -> String {
    format!("{}.session", config.session_name)
}

/// Ensure the session file is present before trying to connect.
pub fn check_session_exists(config: &Config) -> Result<()> {
    let session_file = session_file_name(config);
    if Path::new(&session_file).exists() {
        return Ok(());
    }

    eprintln!(
        r#"
⚠️  ERROR: session file '{}' not found!

To create it:
1. Run: cargo run --bin init_session
2. Enter the code Telegram sends you
"#,
        session_file
    );
    Err(Error::SessionNotFound(session_file))
}

fn open_session(config: &Config, action: &str) -> Result<Arc<SqliteSession>> {
    let session_file = session_file_name(config);
    let session = SqliteSession::open(&session_file)
        .map_err(|e| Error::SessionNotFound(format!("Failed to {} session: {}", action, e)))?;
    Ok(Arc::new(session))
}

/// Open the stored session file.
pub fn load_session(config: &Config) -> Result<Arc<SqliteSession>> {
    open_session(config, "load")
}

/// Open the session file for first-time login, creating it if needed.
pub fn create_session(config: &Config) -> Result<Arc<SqliteSession>> {
    open_session(config, "create")
}

/// A connected client plus the background sender machinery keeping it alive.
pub struct TelegramClient {
    pub client: Client,
    pub handle: SenderPoolHandle,
    // The receiver stays alive so the runner never sees a closed updates channel
    _updates: mpsc::UnboundedReceiver<UpdatesLike>,
    _runner: tokio::task::JoinHandle<()>,
}

impl TelegramClient {
    /// Connect on top of a stored session.
    pub async fn connect(session: Arc<SqliteSession>, config: &Config) -> Result<Self> {
        let pool = SenderPool::new(session, config.api_id);
        // The client borrows the whole pool, so build it before taking the pool apart
        let client = Client::new(&pool);
        let SenderPool {
            runner,
            updates,
            handle,
        } = pool;

        let runner = tokio::spawn(async move {
            runner.run().await;
        });

        Ok(Self {
            client,
            handle,
            _updates: updates,
            _runner: runner,
        })
    }
}

// Commands mostly need the bare Client, so hand it out through Deref.
impl std::ops::Deref for TelegramClient {
    type Target = Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

/// Connect using the existing session, refusing to run without one.
pub async fn get_client(config: &Config) -> Result<TelegramClient> {
    check_session_exists(config)?;
    let session = load_session(config)?;
    TelegramClient::connect(session, config).await
}

/// Connect for first-time login; the session file may not exist yet.
pub async fn get_client_for_init(config: &Config) -> Result<TelegramClient> {
    let session = create_session(config)?;
    TelegramClient::connect(session, config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::path::PathBuf;
    use std::process::{self, Command};
    use std::sync::{LazyLock, Mutex};
    use tempfile::{tempdir, TempDir};

    // These tests chdir into a tempdir, so they must not interleave.
    static WORKDIR_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

    struct DirGuard {
        original: PathBuf,
    }

    impl Drop for DirGuard {
        fn drop(&mut self) {
            let _ = env::set_current_dir(&self.original);
        }
    }

    fn temp_workdir() -> (TempDir, DirGuard) {
        let temp = tempdir().expect("create tempdir");
        let original = env::current_dir().expect("current dir");
        env::set_current_dir(temp.path()).expect("enter tempdir");
        (temp, DirGuard { original })
    }

    fn lock_file_present() -> bool {
        PathBuf::from(LOCK_FILE).exists()
    }

    #[test]
    fn acquire_creates_and_release_removes_lock_file() {
        let _serial = WORKDIR_LOCK.lock().unwrap();
        let (_temp, _cwd) = temp_workdir();

        assert!(!lock_file_present());
        let mut lock = SessionLock::acquire().expect("lock");
        assert!(lock_file_present());
        lock.release();
        assert!(!lock_file_present());
    }

    #[test]
    fn drop_releases_the_lock() {
        let _serial = WORKDIR_LOCK.lock().unwrap();
        let (_temp, _cwd) = temp_workdir();

        {
            let _lock = SessionLock::acquire().expect("lock");
            assert!(lock_file_present());
        }
        assert!(!lock_file_present());
    }

    #[test]
    fn release_twice_is_harmless() {
        let _serial = WORKDIR_LOCK.lock().unwrap();
        let (_temp, _cwd) = temp_workdir();

        let mut lock = SessionLock::acquire().expect("lock");
        lock.release();
        lock.release();
    }

    #[test]
    #[ignore] // Timing-sensitive; the child process can race the parent in CI
    fn second_process_cannot_take_the_lock() {
        let _serial = WORKDIR_LOCK.lock().unwrap();
        let (temp, _cwd) = temp_workdir();

        let mut held = SessionLock::acquire().expect("first lock");

        let status = Command::new(env::current_exe().expect("current exe"))
            .env("TRACKER_LOCK_CHILD", "1")
            .env("TRACKER_LOCK_DIR", temp.path())
            .arg("--")
            .arg("session::tests::lock_contention_child")
            .status()
            .expect("spawn lock child");
        assert!(status.success(), "the held lock was acquired twice");

        held.release();
        assert!(SessionLock::acquire().is_ok());
    }

    // Runs only when re-executed as the child of the contention test above.
    #[test]
    fn lock_contention_child() {
        if env::var("TRACKER_LOCK_CHILD").is_err() {
            return;
        }
        if let Ok(dir) = env::var("TRACKER_LOCK_DIR") {
            let _ = env::set_current_dir(&dir);
        }

        match SessionLock::acquire() {
            Err(Error::SessionLocked) => process::exit(0),
            Ok(mut lock) => {
                lock.release();
                process::exit(2);
            }
            Err(_) => process::exit(1),
        }
    }

    #[test]
    fn missing_session_file_is_an_error() {
        let _serial = WORKDIR_LOCK.lock().unwrap();
        let (_temp, _cwd) = temp_workdir();

        // No config.yml in the tempdir, so defaults apply
        let config = Config::new();

        let err = check_session_exists(&config).unwrap_err();
        assert!(matches!(err, Error::SessionNotFound(_)));

        File::create(session_file_name(&config)).expect("create session file");
        check_session_exists(&config).expect("session should exist");
    }

    #[test]
    fn session_file_name_follows_configured_session() {
        let _serial = WORKDIR_LOCK.lock().unwrap();
        let (_temp, _cwd) = temp_workdir();

        let config = Config::new();
        assert_eq!(session_file_name(&config), "tracker_session.session");
    }
}
