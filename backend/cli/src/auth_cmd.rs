//! Sign-in, sign-out, and registration.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use tracing::warn;

use showroom_console::SessionContext;
use showroom_core::IdentityProvider;

use crate::config::AppContext;
use crate::terminal_output::{note_info, note_success, note_warn};

/// Password from the flag, the `SHOWROOM_PASSWORD` env var, or stdin.
fn password(flag: Option<String>) -> Result<String> {
    if let Some(password) = flag.or_else(|| std::env::var("SHOWROOM_PASSWORD").ok()) {
        return Ok(password);
    }
    print!("Password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn login(ctx: &AppContext, email: &str, password_flag: Option<String>) -> Result<()> {
    let password = password(password_flag)?;
    let identity = ctx.identity()?;
    let session = identity.sign_in(email.trim(), &password).await?;
    // The roster is read as the new user, not anonymously.
    let store = ctx.store_for(&session.access_token)?;
    let session = SessionContext::authorize(&identity, &store, session).await?;
    ctx.save_session(&session).await?;
    note_success(&format!("Signed in as {} ({})", session.actor(), session.role()));
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    match ctx.load_session().await {
        Ok(session) => {
            let identity = ctx.identity()?;
            if let Err(e) = session.sign_out(&identity).await {
                warn!(error = %e, "Token revocation failed");
                note_warn("Could not revoke the session remotely; removed it locally");
            }
        }
        Err(e) => note_info(&format!("{e:#}")),
    }
    ctx.clear_session().await?;
    note_success("Signed out");
    Ok(())
}

pub async fn whoami(ctx: &AppContext) -> Result<()> {
    let session = ctx.load_session().await?;
    let identity = ctx.identity()?;
    let user = session.verify(&identity).await?;
    println!("email:   {}", user.email.as_deref().unwrap_or("-"));
    println!("user id: {}", user.id);
    println!("role:    {}", session.role());
    Ok(())
}

pub async fn signup(ctx: &AppContext, email: &str, password_flag: Option<String>) -> Result<()> {
    let password = password(password_flag)?;
    let identity = ctx.identity()?;
    let user = SessionContext::sign_up(&identity, email, &password).await?;
    note_success(&format!(
        "Registered {}. Ask a superadmin to add you before signing in.",
        user.email.as_deref().unwrap_or(email)
    ));
    Ok(())
}
