//! Auth command handlers.

use std::io::Read;

use anyhow::{Context, Result, bail};
use vidra_types::LoginRequest;

use crate::cli::App;

pub async fn login(app: &App, email: String, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => read_password_from_stdin()?,
    };

    let result = app
        .client
        .login(&LoginRequest { email, password })
        .await;

    match result {
        Ok(token) => {
            println!("Logged in ({} for {}s).", token.token_type, token.expires_in);
            Ok(())
        }
        Err(err) if err.is_unauthorized() => bail!("Login failed: invalid credentials."),
        Err(err) => bail!("Login failed: {}", err.user_message()),
    }
}

pub async fn logout(app: &App) -> Result<()> {
    if !app.client.session().is_authenticated() {
        println!("Not logged in.");
        return Ok(());
    }

    match app.client.logout().await {
        Ok(ack) => println!("{}", ack.message),
        Err(err) => {
            // The server call failed but the local session is still
            // discarded; persist_session removes the file afterwards.
            app.client.session().clear();
            eprintln!("Logout request failed ({}); local session discarded.", err.user_message());
        }
    }
    Ok(())
}

pub async fn users(app: &App) -> Result<()> {
    let page = app
        .client
        .list_users()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .context("list users")?;

    if page.users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    for user in &page.users {
        println!(
            "{}  {}  {}",
            user.id,
            user.email,
            user.created_at.format("%Y-%m-%d")
        );
    }
    println!("({} of {} users)", page.users.len(), page.total);
    Ok(())
}

fn read_password_from_stdin() -> Result<String> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("read password from stdin")?;
    let password = input.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("Password is empty. Pass --password or pipe it on stdin.");
    }
    Ok(password)
}
