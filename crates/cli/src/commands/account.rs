//! Account commands.

use std::path::Path;

use secrecy::SecretString;

use unishop_core::Email;
use unishop_storefront::api::ProfileUpdate;
use unishop_storefront::error::AppError;
use unishop_storefront::services::{AuthError, AuthService, RegistrationForm};

use super::Context;

pub async fn login(ctx: &mut Context, email: &str, password: String) -> Result<(), AppError> {
    let mut auth = AuthService::new(&ctx.api, &mut ctx.session);
    let user = auth.login(email, &SecretString::from(password)).await?;
    println!("Signed in as {}", user.username);
    Ok(())
}

pub async fn register(
    ctx: &mut Context,
    username: String,
    email: String,
    password: String,
    repeat_password: String,
) -> Result<(), AppError> {
    let form = RegistrationForm {
        username,
        email,
        password: SecretString::from(password),
        repeat_password: SecretString::from(repeat_password),
    };

    let mut auth = AuthService::new(&ctx.api, &mut ctx.session);
    let user = auth.register(&form).await?;
    println!("Welcome, {}! Your account is ready.", user.username);
    Ok(())
}

pub fn logout(ctx: &mut Context) -> Result<(), AppError> {
    AuthService::new(&ctx.api, &mut ctx.session).logout()?;
    println!("Signed out");
    Ok(())
}

pub fn whoami(ctx: &Context) {
    match ctx.session.credentials() {
        Some((user, _)) => {
            println!("{} <{}>", user.username, user.email);
            println!("Role:     {}", user.role);
            println!("Picture:  {}", user.profile_image);
        }
        None => println!("Not signed in"),
    }
}

pub async fn update_profile(
    ctx: &mut Context,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<(), AppError> {
    let email = email
        .as_deref()
        .map(Email::parse)
        .transpose()
        .map_err(AuthError::from)?;
    let update = ProfileUpdate {
        username,
        email,
        password: password.map(SecretString::from),
        profile_image: None,
    };

    let mut auth = AuthService::new(&ctx.api, &mut ctx.session);
    let user = auth.update_profile(update).await?;
    println!("Profile updated for {}", user.username);
    Ok(())
}

pub async fn upload_picture(ctx: &mut Context, path: &Path) -> Result<(), AppError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::BadRequest(format!("Cannot read {}: {e}", path.display())))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("profile");

    let mut auth = AuthService::new(&ctx.api, &mut ctx.session);
    let user = auth.upload_profile_image(file_name, bytes).await?;
    println!("Profile picture updated: {}", user.profile_image);
    Ok(())
}

pub async fn delete(ctx: &mut Context, confirmed: bool) -> Result<(), AppError> {
    if !confirmed {
        return Err(AppError::BadRequest(
            "Pass --yes to confirm account deletion".to_string(),
        ));
    }

    AuthService::new(&ctx.api, &mut ctx.session)
        .delete_account()
        .await?;
    println!("Account deleted successfully");
    Ok(())
}

pub async fn forgot_password(ctx: &mut Context, email: &str) -> Result<(), AppError> {
    let message = AuthService::new(&ctx.api, &mut ctx.session)
        .request_password_reset(email)
        .await?;
    println!("{message}");
    Ok(())
}
