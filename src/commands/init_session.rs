//! Interactive first-time login that creates the session file.

use std::io::{self, Write};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::{get_client_for_init, session_file_name};

fn prompt_line(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Only an exact uppercase YES confirms a session reset.
pub fn confirmed(answer: &str) -> bool {
    answer.trim() == "YES"
}

pub async fn run() -> Result<()> {
    let config = Config::new();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════════╗
║  TELEGRAM SESSION INITIALIZATION                              ║
╚═══════════════════════════════════════════════════════════════╝

⚠️  WARNING: this creates a NEW session for {}

   Telegram will log out every other device tied to this session,
   and any previously saved session file becomes invalid.
"#,
        config.phone
    );

    let answer = prompt_line("   Type 'YES' (uppercase) to continue: ")?;
    if !confirmed(&answer) {
        println!("\n❌ Cancelled. No session file was created.");
        return Ok(());
    }

    println!("\n🔄 Creating a new session for {}...", config.phone);
    println!("📱 Watch Telegram for the confirmation code...\n");

    let client = get_client_for_init(&config).await?;
    let token = client
        .request_login_code(&config.phone, &config.api_hash)
        .await
        .map_err(|e| Error::TelegramError(format!("Could not request a login code: {}", e)))?;

    let code = prompt_line("Enter the code from Telegram: ")?;
    let user = client
        .sign_in(&token, &code)
        .await
        .map_err(|e| Error::TelegramError(format!("Sign-in failed: {}", e)))?;

    // SqliteSession persists itself; nothing to flush here

    println!(
        r#"
╔═══════════════════════════════════════════════════════════════╗
║  ✅ SESSION CREATED                                           ║
╚═══════════════════════════════════════════════════════════════╝

Signed in as {} (@{})

Session file: {}

The logging and aggregation commands pick this session up
automatically. Do not run init-session again unless the session
breaks, and keep a backup copy of the session file.
"#,
        user.full_name(),
        user.username().unwrap_or("not set"),
        session_file_name(&config),
    );

    Ok(())
}
