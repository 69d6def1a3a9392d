//! Auth service: register, authenticate, and verify sessions.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};
use validator::Validate;

use crate::auth::{PasswordHasher, TokenIssuer, TokenVerifier};
use crate::db::CredentialStore;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    pub name: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// A freshly issued session token and the user it is bound to.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub token: String,
    pub user: User,
}

/// Orchestrates the credential store, password hasher, and token issuer/verifier.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    verifier: TokenVerifier,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        issuer: TokenIssuer,
        verifier: TokenVerifier,
    ) -> Self {
        Self {
            store,
            hasher,
            issuer,
            verifier,
        }
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthOutcome> {
        let input = RegisterInput {
            name: input.name.trim().to_string(),
            email: normalize_email(&input.email),
            password: input.password,
        };
        input.validate()?;

        if self.store.find_public(&input.email).await?.is_some() {
            debug!(email = %input.email, "registration rejected: email taken");
            return Err(AppError::DuplicateUser);
        }

        let password_hash = self.hash_password(input.password).await?;
        let user = self
            .store
            .create(NewUser {
                name: input.name,
                email: input.email,
                password_hash,
            })
            .await?;
        let token = self.issuer.issue(user.id)?;

        info!(user_id = %user.id, "user registered");
        Ok(AuthOutcome { token, user })
    }

    pub async fn authenticate(&self, input: LoginInput) -> AppResult<AuthOutcome> {
        let input = LoginInput {
            email: normalize_email(&input.email),
            password: input.password,
        };
        input.validate()?;

        let Some(credentials) = self.store.find_with_secret(&input.email).await? else {
            // Same Argon2 cost as a real mismatch so response time does not reveal the account.
            let dummy = self.hasher.dummy_hash().to_string();
            self.verify_password(input.password, dummy).await?;
            debug!("login rejected: unknown email");
            return Err(AppError::InvalidCredentials);
        };

        if !self
            .verify_password(input.password, credentials.password_hash)
            .await?
        {
            debug!(user_id = %credentials.user.id, "login rejected: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let user = credentials.user;
        let token = self.issuer.issue(user.id)?;

        info!(user_id = %user.id, "user logged in");
        Ok(AuthOutcome { token, user })
    }

    pub async fn verify_session(&self, token: &str) -> AppResult<User> {
        let user_id = self.verifier.verify(token).map_err(|e| {
            debug!(error = %e, "session token rejected");
            AppError::Token(e)
        })?;

        self.store.find_by_id(user_id).await?.ok_or_else(|| {
            debug!(user_id = %user_id, "session user no longer exists");
            AppError::InvalidCredentials
        })
    }

    async fn hash_password(&self, password: String) -> AppResult<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("hash task: {}", e)))?
    }

    async fn verify_password(&self, password: String, hash: String) -> AppResult<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("verify task: {}", e)))
    }
}

const OUTLOOK_DOMAINS: &[&str] = &[
    "hotmail.at", "hotmail.be", "hotmail.ca", "hotmail.cl", "hotmail.co.il", "hotmail.co.nz",
    "hotmail.co.th", "hotmail.co.uk", "hotmail.com", "hotmail.com.ar", "hotmail.com.au",
    "hotmail.com.br", "hotmail.com.gr", "hotmail.com.mx", "hotmail.com.pe", "hotmail.com.tr",
    "hotmail.com.vn", "hotmail.cz", "hotmail.de", "hotmail.dk", "hotmail.es", "hotmail.fr",
    "hotmail.hu", "hotmail.id", "hotmail.ie", "hotmail.in", "hotmail.it", "hotmail.jp",
    "hotmail.kr", "hotmail.lv", "hotmail.my", "hotmail.ph", "hotmail.pt", "hotmail.sa",
    "hotmail.sg", "hotmail.sk", "live.be", "live.co.uk", "live.com", "live.com.ar",
    "live.com.mx", "live.de", "live.es", "live.eu", "live.fr", "live.it", "live.nl", "msn.com",
    "outlook.at", "outlook.be", "outlook.cl", "outlook.co.il", "outlook.co.nz", "outlook.co.th",
    "outlook.com", "outlook.com.ar", "outlook.com.au", "outlook.com.br", "outlook.com.gr",
    "outlook.com.pe", "outlook.com.tr", "outlook.com.vn", "outlook.cz", "outlook.de",
    "outlook.dk", "outlook.es", "outlook.fr", "outlook.hu", "outlook.id", "outlook.ie",
    "outlook.in", "outlook.it", "outlook.jp", "outlook.kr", "outlook.lv", "outlook.my",
    "outlook.ph", "outlook.pt", "outlook.sa", "outlook.sg", "outlook.sk", "passport.com",
];

const YAHOO_DOMAINS: &[&str] = &[
    "rocketmail.com", "yahoo.ca", "yahoo.co.uk", "yahoo.com", "yahoo.de", "yahoo.fr",
    "yahoo.in", "yahoo.it", "ymail.com",
];

const YANDEX_DOMAINS: &[&str] = &[
    "yandex.ru", "yandex.ua", "yandex.kz", "yandex.com", "yandex.by", "ya.ru",
];

const ICLOUD_DOMAINS: &[&str] = &["icloud.com", "me.com"];

/// Canonical form of an email used as the store key.
///
/// Trims and lowercases, then folds provider aliases onto one mailbox:
/// - Gmail: drop dots and `+tag`; `googlemail.com` becomes `gmail.com`.
/// - Outlook/Hotmail/Live and iCloud: drop `+tag`.
/// - Yahoo: drop the last `-tag`.
/// - Yandex: every Yandex domain becomes `yandex.ru`.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim().to_lowercase();
    let Some((local, domain)) = email.rsplit_once('@') else {
        return email;
    };

    let strip_plus = |local: &str| local.split('+').next().unwrap_or(local).to_string();

    if domain == "gmail.com" || domain == "googlemail.com" {
        return format!("{}@gmail.com", strip_plus(local).replace('.', ""));
    }
    if OUTLOOK_DOMAINS.contains(&domain) || ICLOUD_DOMAINS.contains(&domain) {
        return format!("{}@{}", strip_plus(local), domain);
    }
    if YAHOO_DOMAINS.contains(&domain) {
        let local = local.rsplit_once('-').map_or(local, |(head, _)| head);
        return format!("{}@{}", local, domain);
    }
    if YANDEX_DOMAINS.contains(&domain) {
        return format!("{}@yandex.ru", local);
    }

    email
}
