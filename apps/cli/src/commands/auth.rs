//! Authentication commands.

use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use std::io::{self, Write};

fn prompt_email(email: Option<String>) -> Result<String> {
    let email = match email {
        Some(email) => email,
        None => {
            print!("Email: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
            line
        }
    };
    let email = email.trim().to_string();
    if email.is_empty() {
        anyhow::bail!("Email is required");
    }
    Ok(email)
}

fn prompt_password(prompt: &str) -> Result<String> {
    let password = rpassword::prompt_password(prompt)?;
    if password.is_empty() {
        anyhow::bail!("Password is required");
    }
    Ok(password)
}

/// Login with email and password.
pub async fn login(ctx: &Context, email: Option<String>) -> Result<()> {
    let session = ctx.session();

    if session.snapshot().is_authenticated {
        let who = session
            .display_user()
            .map(|u| u.email)
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        output::print_success(&format!("Already logged in as {}", who), &ctx.format);
        return Ok(());
    }

    let email = prompt_email(email)?;
    let password = prompt_password("Password: ")?;

    if let OutputFormat::Text = ctx.format {
        println!("Logging in...");
    }
    let snapshot = session.login_with_password(&email, &password).await?;

    let who = snapshot
        .user
        .map(|u| u.email)
        .filter(|e| !e.is_empty())
        .unwrap_or(email);
    output::print_success(&format!("Logged in as {}", who), &ctx.format);
    Ok(())
}

/// Create an account. Does not log in.
pub async fn register(ctx: &Context, email: Option<String>) -> Result<()> {
    let email = prompt_email(email)?;
    let password = prompt_password("Password: ")?;
    let confirm = prompt_password("Confirm password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }

    let created = ctx.session().auth_api().register(&email, &password).await?;
    match ctx.format {
        OutputFormat::Text => {
            println!("Account created for {}", email);
            println!("Run 'storefront login' to sign in.");
        }
        OutputFormat::Json => output::print_json(&created)?,
    }
    Ok(())
}

/// Logout: revoke on the backend when possible, always clear locally.
pub async fn logout(ctx: &Context) -> Result<()> {
    let outcome = ctx.session().sign_out().await;
    match ctx.format {
        OutputFormat::Text => {
            if outcome.skipped {
                println!("No active session. Local state cleared.");
            } else if outcome.ok {
                println!("Logged out successfully");
            } else {
                println!("Logged out locally (backend logout failed)");
            }
        }
        OutputFormat::Json => output::print_json(&outcome)?,
    }
    Ok(())
}

/// Check authentication status.
pub async fn status(ctx: &Context) -> Result<()> {
    let snapshot = ctx.session().snapshot();
    let user = ctx.session().display_user();

    match ctx.format {
        OutputFormat::Text => {
            if snapshot.is_authenticated {
                println!("Auth:     logged in");
                if let Some(user) = &user {
                    println!("User ID:  {}", user.user_id);
                    println!("Email:    {}", output::or_dash(Some(user.email.as_str())));
                    println!("Role:     {}", output::or_dash(user.role.as_deref()));
                }
            } else {
                println!("Auth:     not logged in");
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "bootstrap": ctx.bootstrap(),
                "is_authenticated": snapshot.is_authenticated,
                "user": user,
            });
            output::print_json(&json)?;
        }
    }
    Ok(())
}

/// Show the signed-in user's profile from the backend.
pub async fn whoami(ctx: &Context) -> Result<()> {
    ctx.require_login()?;
    let user = ctx.session().load_me().await?;

    match ctx.format {
        OutputFormat::Text => {
            output::print_heading("Account");
            output::print_row("User ID", &user.user_id);
            output::print_row("Email", output::or_dash(Some(user.email.as_str())));
            output::print_row("Name", output::or_dash(user.name.as_deref()));
            output::print_row("Role", output::or_dash(user.role.as_deref()));
        }
        OutputFormat::Json => output::print_json(&user)?,
    }
    Ok(())
}
