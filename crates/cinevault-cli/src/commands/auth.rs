use super::context::{open_app, require_session};
use super::prompts;
use crate::output::Output;
use cinevault_core::{validate_email, LoginOutcome};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;

fn read_email(email: Option<String>, output: &Output) -> Result<String> {
    if let Some(email) = email {
        return Ok(email.trim().to_string());
    }
    loop {
        let input = prompts::prompt_string("Email", None)?;
        match validate_email(input.trim()) {
            Ok(()) => return Ok(input.trim().to_string()),
            Err(e) => output.error(format!("{}", e)),
        }
    }
}

pub async fn run_register(email: Option<String>, output: &Output) -> Result<()> {
    let app = open_app(output).await?;
    let email = read_email(email, output)?;
    let password = prompts::prompt_password("Password", true)?;

    app.session().register(&email, &password).await?;

    output.data(&json!({ "registered": true, "user": email }), || {
        println!("Account created. Signed in as {}", email);
    });
    Ok(())
}

pub async fn run_login(email: Option<String>, output: &Output) -> Result<()> {
    let app = open_app(output).await?;
    let email = read_email(email, output)?;
    let password = prompts::prompt_password("Password", false)?;

    match app.session().login(&email, &password).await? {
        LoginOutcome::Success => {
            output.data(&json!({ "outcome": LoginOutcome::Success, "user": email }), || {
                println!("Signed in as {}", email);
            });
            Ok(())
        }
        LoginOutcome::NoAccount => Err(eyre!("No account on this device. Run `cinevault register` to create one.")),
        LoginOutcome::InvalidCredentials => Err(eyre!("Email or password is incorrect")),
    }
}

pub async fn run_logout(output: &Output) -> Result<()> {
    let app = open_app(output).await?;
    let was = app.session().current_user();
    app.session().logout().await;

    match was {
        Some(user) => output.success(format!("Signed out {}", user)),
        None => output.info("Not signed in"),
    }
    Ok(())
}

pub async fn run_whoami(output: &Output) -> Result<()> {
    let app = open_app(output).await?;
    let user = require_session(&app)?;
    output.data(&json!({ "user": user }), || println!("{}", user));
    Ok(())
}
