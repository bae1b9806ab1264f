use api_types::auth::{RegisterRequest, UserView};
use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, users};

use super::{Engine, with_tx};

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 60;
const PASSWORD_MIN: usize = 8;

fn user_from_model(model: users::Model) -> UserView {
    UserView {
        user_id: model.user_id,
        username: model.username,
        first_name: model.first_name,
        last_name: model.last_name,
        active_status: model.active_status,
    }
}

fn validate_username(username: &str) -> ResultEngine<String> {
    let username = username.trim();
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(EngineError::InvalidValue(format!(
            "username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(EngineError::InvalidValue(
            "username must not contain whitespace".to_string(),
        ));
    }
    Ok(username.to_string())
}

/// At least eight characters mixing upper case, lower case, digits and
/// symbols.
fn validate_password(password: &str) -> ResultEngine<()> {
    let long_enough = password.chars().count() >= PASSWORD_MIN;
    let upper = password.chars().any(char::is_uppercase);
    let lower = password.chars().any(char::is_lowercase);
    let digit = password.chars().any(|c| c.is_ascii_digit());
    let special = password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace());
    if long_enough && upper && lower && digit && special {
        Ok(())
    } else {
        Err(EngineError::InvalidValue(format!(
            "password must be at least {PASSWORD_MIN} characters and contain upper case, lower case, digit and special characters"
        )))
    }
}

fn required_text(value: &str, label: &str) -> ResultEngine<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(EngineError::InvalidValue(format!("{label} must not be empty")));
    }
    Ok(value.to_string())
}

impl Engine {
    /// Register a new user. The password is stored as a bcrypt hash.
    pub async fn register_user(&self, request: RegisterRequest) -> ResultEngine<UserView> {
        let username = validate_username(&request.username)?;
        validate_password(&request.password)?;
        let first_name = required_text(&request.first_name, "first name")?;
        let last_name = required_text(&request.last_name, "last name")?;
        let hash = bcrypt::hash(&request.password, self.bcrypt_cost)
            .map_err(|err| EngineError::InvalidValue(format!("cannot hash password: {err}")))?;

        with_tx!(self, |db_tx| {
            if find_user(&db_tx, &username).await?.is_some() {
                return Err(EngineError::ExistingKey(username));
            }
            let now = Utc::now();
            let model = users::ActiveModel {
                username: ActiveValue::Set(username),
                password: ActiveValue::Set(hash),
                first_name: ActiveValue::Set(first_name),
                last_name: ActiveValue::Set(last_name),
                active_status: ActiveValue::Set(true),
                date_added: ActiveValue::Set(now),
                date_updated: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;
            Ok(user_from_model(model))
        })
    }

    /// Check a username/password pair.
    ///
    /// Unknown users, inactive users and wrong passwords are all reported
    /// as the same `Unauthorized` error.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> ResultEngine<UserView> {
        let rejected = || EngineError::Unauthorized("invalid credentials".to_string());
        let model = find_user(&self.database, username.trim())
            .await?
            .filter(|model| model.active_status)
            .ok_or_else(rejected)?;
        match bcrypt::verify(password, &model.password) {
            Ok(true) => Ok(user_from_model(model)),
            _ => Err(rejected()),
        }
    }

    pub async fn user(&self, username: &str) -> ResultEngine<UserView> {
        find_user(&self.database, username)
            .await?
            .map(user_from_model)
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {username}")))
    }

    pub async fn set_user_active(
        &self,
        username: &str,
        active_status: bool,
    ) -> ResultEngine<UserView> {
        with_tx!(self, |db_tx| {
            let model = find_user(&db_tx, username)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("user {username}")))?;
            let mut active: users::ActiveModel = model.into();
            active.active_status = ActiveValue::Set(active_status);
            active.date_updated = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            Ok(user_from_model(model))
        })
    }
}

async fn find_user<C: ConnectionTrait>(db: &C, username: &str) -> ResultEngine<Option<users::Model>> {
    Ok(users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await?)
}
