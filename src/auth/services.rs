use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        account_token::{decode_uid, encode_uid},
        dto::{
            AuthResponse, ForgotPasswordRequest, LoginRequest, PublicUser, RegisterRequest,
            ResetPasswordRequest,
        },
        jwt::JwtKeys,
        password::{hash_password, password_problems, verify_password},
        repo_types::{NewUser, User},
    },
    error::{ApiError, FieldErrors},
    formats::parse_date,
    mail::{self, messages},
    state::AppState,
};

const REQUIRED: &str = "This field is required.";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[\w.@+-]{1,150}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

/// Creates an inactive account and mails its verification link.
pub async fn register(state: &AppState, req: RegisterRequest) -> Result<User, ApiError> {
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_lowercase();
    let first_name = req.first_name.trim().to_string();
    let last_name = req.last_name.trim().to_string();

    let mut errors = FieldErrors::default();

    if username.is_empty() {
        errors.add("username", REQUIRED);
    } else if !is_valid_username(&username) {
        errors.add(
            "username",
            "Enter a valid username. It may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    } else if state.users.find_by_username(&username).await?.is_some() {
        errors.add("username", "A user with that username already exists.");
    }

    if email.is_empty() {
        errors.add("email", REQUIRED);
    } else if !is_valid_email(&email) {
        errors.add("email", "Enter a valid email address.");
    } else if state.users.find_by_email(&email).await?.is_some() {
        errors.add("email", "A user with that email already exists.");
    }

    if let Some(confirm) = &req.confirm_password {
        if *confirm != req.password {
            errors.add("confirmPassword", "Passwords do not match");
        }
    }

    if req.password.is_empty() {
        errors.add("password", REQUIRED);
    } else {
        let attributes = [
            ("username", username.as_str()),
            ("first name", first_name.as_str()),
            ("last name", last_name.as_str()),
            ("email address", email.as_str()),
        ];
        for problem in password_problems(&req.password, &attributes) {
            errors.add("password", problem);
        }
    }

    let date_of_birth = match req.date_of_birth.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let parsed = parse_date(raw);
            if parsed.is_none() {
                errors.add("date_of_birth", "Date has wrong format. Use YYYY-MM-DD.");
            }
            parsed
        }
    };

    if !errors.is_empty() {
        warn!(%username, "registration rejected");
        return Err(ApiError::Validation(errors));
    }

    let password_hash = hash_password(&req.password)?;
    let user = state
        .users
        .create(&NewUser {
            username,
            email,
            first_name,
            last_name,
            password_hash: Some(password_hash),
            is_active: false,
            date_of_birth,
        })
        .await?;

    let link = account_link(state, "verify-email", &user)?;
    mail::spawn_send(
        state.mailer.clone(),
        messages::verification(&user.email, &user.username, &link),
    );

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user)
}

pub async fn login(state: &AppState, req: LoginRequest) -> Result<AuthResponse, ApiError> {
    let identifier = req.username.trim();
    if identifier.is_empty() || req.password.is_empty() {
        return Err(ApiError::InvalidCredentials);
    }

    // An email address resolves to the account that owns it.
    let user = match state.users.find_by_email(identifier).await? {
        Some(user) => Some(user),
        None => state.users.find_by_username(identifier).await?,
    };

    let Some(user) = user else {
        warn!(%identifier, "login unknown user");
        return Err(ApiError::InvalidCredentials);
    };

    let Some(hash) = user.password_hash.as_deref() else {
        warn!(user_id = %user.id, "login to account without password");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(&req.password, hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    if !user.is_active {
        warn!(user_id = %user.id, "login before email verification");
        return Err(ApiError::AccountNotVerified);
    }

    info!(user_id = %user.id, "user logged in");
    auth_response(state, &user)
}

pub async fn refresh(state: &AppState, refresh_token: &str) -> Result<AuthResponse, ApiError> {
    let keys = JwtKeys::from_ref(state);
    let claims = keys
        .verify_refresh(refresh_token)
        .map_err(|e| ApiError::Unauthenticated(e.to_string()))?;

    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("User not found".into()))?;

    auth_response(state, &user)
}

pub async fn verify_email(state: &AppState, uid: &str, token: &str) -> Result<(), ApiError> {
    let user = find_by_uid(state, uid)
        .await?
        .ok_or(ApiError::InvalidLink("verification"))?;

    if !state.account_tokens().check_token(&user, token) {
        warn!(user_id = %user.id, "verification token rejected");
        return Err(ApiError::InvalidOrExpiredToken);
    }

    state.users.mark_verified(user.id).await?;
    info!(user_id = %user.id, already_active = user.is_active, "email verified");
    Ok(())
}

/// Signs in with a Google authorization code, creating the account on first use.
pub async fn google_login(state: &AppState, code: Option<String>) -> Result<AuthResponse, ApiError> {
    let code = code
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No auth code provided".into()))?;

    let tokens = state
        .google
        .exchange_code(&code)
        .await
        .map_err(google_failure)?;

    if tokens.id_token.is_none() {
        warn!("google token response without id_token");
        return Err(ApiError::BadRequest("Google login failed".into()));
    }

    let info = state
        .google
        .user_info(tokens.access_token.as_deref().unwrap_or_default())
        .await
        .map_err(google_failure)?;

    let email = info
        .email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| is_valid_email(e))
        .ok_or_else(|| ApiError::BadRequest("Google login failed".into()))?;

    let user = match state.users.find_by_email(&email).await? {
        Some(mut user) => {
            if !user.is_active {
                // The address was never proven by the password's owner, so
                // the provider takes the account over and the password goes.
                state.users.activate_via_provider(user.id).await?;
                info!(user_id = %user.id, "unverified account claimed by google login");
                user.is_active = true;
                user.password_hash = None;
            }
            user
        }
        None => {
            let local_part = email.split('@').next().unwrap_or_default();
            let username = available_username(state, local_part).await?;
            let created = state
                .users
                .create(&NewUser {
                    username,
                    email: email.clone(),
                    first_name: info.given_name,
                    last_name: info.family_name,
                    password_hash: None,
                    is_active: true,
                    date_of_birth: None,
                })
                .await;
            match created {
                Ok(user) => {
                    info!(user_id = %user.id, "account created from google login");
                    user
                }
                // A concurrent login for the same address won the insert.
                Err(e) => match state.users.find_by_email(&email).await? {
                    Some(user) => user,
                    None => return Err(e.into()),
                },
            }
        }
    };

    auth_response(state, &user)
}

/// Mails a reset link when the address belongs to a password account.
/// Unknown addresses get the same answer.
pub async fn forgot_password(state: &AppState, req: ForgotPasswordRequest) -> Result<(), ApiError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::validation("email", REQUIRED));
    }
    if !is_valid_email(&email) {
        return Err(ApiError::validation("email", "Enter a valid email address."));
    }

    match state.users.find_by_email(&email).await? {
        Some(user) if user.password_hash.is_some() => {
            let link = account_link(state, "reset-password", &user)?;
            mail::spawn_send(
                state.mailer.clone(),
                messages::password_reset(&user.email, &user.username, &link),
            );
            info!(user_id = %user.id, "password reset requested");
        }
        _ => info!("password reset requested for unknown address"),
    }
    Ok(())
}

pub async fn reset_password(
    state: &AppState,
    uid: &str,
    token: &str,
    req: ResetPasswordRequest,
) -> Result<(), ApiError> {
    let user = find_by_uid(state, uid)
        .await?
        .ok_or(ApiError::InvalidLink("password reset"))?;

    if !state.account_tokens().check_token(&user, token) {
        warn!(user_id = %user.id, "reset token rejected");
        return Err(ApiError::InvalidOrExpiredToken);
    }

    let mut errors = FieldErrors::default();
    if let Some(confirm) = &req.confirm_password {
        if *confirm != req.password {
            errors.add("confirmPassword", "Passwords do not match");
        }
    }
    if req.password.is_empty() {
        errors.add("password", REQUIRED);
    } else {
        let attributes = [
            ("username", user.username.as_str()),
            ("first name", user.first_name.as_str()),
            ("last name", user.last_name.as_str()),
            ("email address", user.email.as_str()),
        ];
        for problem in password_problems(&req.password, &attributes) {
            errors.add("password", problem);
        }
    }
    errors.into_result()?;

    let hash = hash_password(&req.password)?;
    state.users.set_password(user.id, &hash).await?;
    info!(user_id = %user.id, "password reset");
    Ok(())
}

fn auth_response(state: &AppState, user: &User) -> Result<AuthResponse, ApiError> {
    let pair = JwtKeys::from_ref(state).issue_pair(user.id)?;
    Ok(AuthResponse {
        access: pair.access,
        refresh: pair.refresh,
        user: PublicUser::from(user),
    })
}

/// `{frontend}/{route}/{uid}/{token}/` for emailed account links.
fn account_link(state: &AppState, route: &str, user: &User) -> Result<String, ApiError> {
    let token = state.account_tokens().make_token(user)?;
    Ok(format!(
        "{}/{}/{}/{}/",
        state.config.frontend_url,
        route,
        encode_uid(user.id),
        token
    ))
}

async fn find_by_uid(state: &AppState, uid: &str) -> Result<Option<User>, ApiError> {
    match decode_uid(uid) {
        Some(id) => Ok(state.users.find_by_id(id).await?),
        None => Ok(None),
    }
}

/// The local part if free, otherwise the first free `{local_part}{n}`.
async fn available_username(state: &AppState, local_part: &str) -> Result<String, ApiError> {
    let base: String = local_part
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_'))
        .take(140)
        .collect();
    let base = if base.is_empty() { "user".to_string() } else { base };

    if state.users.find_by_username(&base).await?.is_none() {
        return Ok(base);
    }
    for n in 1..1000 {
        let candidate = format!("{base}{n}");
        if state.users.find_by_username(&candidate).await?.is_none() {
            return Ok(candidate);
        }
    }
    Err(ApiError::Internal(anyhow::anyhow!(
        "no free username derived from {base:?}"
    )))
}

fn google_failure(e: anyhow::Error) -> ApiError {
    warn!(error = %e, "google api failure");
    ApiError::ExternalService {
        message: "Google API failure".into(),
        details: format!("{e:#}"),
    }
}
