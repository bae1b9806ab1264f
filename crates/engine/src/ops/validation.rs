//! Validation amounts and the account `validation_date` they drive.
//!
//! Every write here ends with [`Engine::sync_validation_date`] for each
//! account it touched, inside the same DB transaction.

use api_types::{
    Amount, TransactionState,
    validation::{ValidationAmount, ValidationAmountInput},
};
use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, validation_amounts};

use super::{Engine, with_tx};

fn validation_from_model(model: validation_amounts::Model) -> ResultEngine<ValidationAmount> {
    Ok(ValidationAmount {
        validation_id: model.validation_id,
        account_id: model.account_id,
        validation_date: model.validation_date,
        transaction_state: model.transaction_state.parse()?,
        amount: Amount::new(model.amount),
        active_status: model.active_status,
    })
}

fn ensure_checkpoint_state(state: TransactionState) -> ResultEngine<()> {
    match state {
        TransactionState::Cleared | TransactionState::Outstanding => Ok(()),
        other => Err(EngineError::InvalidValue(format!(
            "validation amount state must be cleared or outstanding, got {other}"
        ))),
    }
}

impl Engine {
    pub async fn validation_amounts_active(
        &self,
        owner: &str,
    ) -> ResultEngine<Vec<ValidationAmount>> {
        let models = validation_amounts::Entity::find()
            .filter(validation_amounts::Column::Owner.eq(owner))
            .filter(validation_amounts::Column::ActiveStatus.eq(true))
            .order_by_desc(validation_amounts::Column::ValidationDate)
            .all(&self.database)
            .await?;
        models.into_iter().map(validation_from_model).collect()
    }

    pub async fn validation_amount(&self, id: i64, owner: &str) -> ResultEngine<ValidationAmount> {
        let model = self.require_validation(id, owner).await?;
        validation_from_model(model)
    }

    /// Latest active validation amount for an account in the given state.
    pub async fn latest_validation_amount(
        &self,
        account_name_owner: &str,
        state: TransactionState,
        owner: &str,
    ) -> ResultEngine<ValidationAmount> {
        let account = self
            .require_account_by_name(&self.database, account_name_owner, owner)
            .await?;
        let model = validation_amounts::Entity::find()
            .filter(validation_amounts::Column::AccountId.eq(account.account_id))
            .filter(validation_amounts::Column::ActiveStatus.eq(true))
            .filter(validation_amounts::Column::TransactionState.eq(state.as_str()))
            .order_by_desc(validation_amounts::Column::ValidationDate)
            .one(&self.database)
            .await?
            .ok_or_else(|| {
                EngineError::KeyNotFound(format!(
                    "validation amount for {account_name_owner} ({state})"
                ))
            })?;
        validation_from_model(model)
    }

    /// Record a validation amount. The account is taken from
    /// `account_name_owner` when given, otherwise from `input.account_id`.
    pub async fn insert_validation_amount(
        &self,
        account_name_owner: Option<&str>,
        input: ValidationAmountInput,
        owner: &str,
    ) -> ResultEngine<ValidationAmount> {
        ensure_checkpoint_state(input.transaction_state)?;
        with_tx!(self, |db_tx| {
            let account = match (account_name_owner, input.account_id) {
                (Some(name), _) => self.require_account_by_name(&db_tx, name, owner).await?,
                (None, Some(id)) => self.require_account_by_id(&db_tx, id, owner).await?,
                (None, None) => {
                    return Err(EngineError::InvalidValue(
                        "validation amount requires an account".to_string(),
                    ));
                }
            };

            let now = Utc::now();
            let model = validation_amounts::ActiveModel {
                owner: ActiveValue::Set(owner.to_string()),
                account_id: ActiveValue::Set(account.account_id),
                validation_date: ActiveValue::Set(input.validation_date),
                transaction_state: ActiveValue::Set(input.transaction_state.as_str().to_string()),
                amount: ActiveValue::Set(input.amount.cents()),
                active_status: ActiveValue::Set(input.active_status.unwrap_or(true)),
                date_added: ActiveValue::Set(now),
                date_updated: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            self.sync_validation_date(&db_tx, account.account_id).await?;
            validation_from_model(model)
        })
    }

    pub async fn update_validation_amount(
        &self,
        id: i64,
        input: ValidationAmountInput,
        owner: &str,
    ) -> ResultEngine<ValidationAmount> {
        ensure_checkpoint_state(input.transaction_state)?;
        let existing = self.require_validation(id, owner).await?;
        with_tx!(self, |db_tx| {
            let previous_account = existing.account_id;
            let account_id = match input.account_id {
                Some(account_id) if account_id != previous_account => {
                    self.require_account_by_id(&db_tx, account_id, owner)
                        .await?
                        .account_id
                }
                _ => previous_account,
            };

            let mut active: validation_amounts::ActiveModel = existing.into();
            active.account_id = ActiveValue::Set(account_id);
            active.validation_date = ActiveValue::Set(input.validation_date);
            active.transaction_state =
                ActiveValue::Set(input.transaction_state.as_str().to_string());
            active.amount = ActiveValue::Set(input.amount.cents());
            if let Some(status) = input.active_status {
                active.active_status = ActiveValue::Set(status);
            }
            active.date_updated = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;

            self.sync_validation_date(&db_tx, account_id).await?;
            if previous_account != account_id {
                self.sync_validation_date(&db_tx, previous_account).await?;
            }
            validation_from_model(model)
        })
    }

    pub async fn delete_validation_amount(
        &self,
        id: i64,
        owner: &str,
    ) -> ResultEngine<ValidationAmount> {
        let existing = self.require_validation(id, owner).await?;
        with_tx!(self, |db_tx| {
            validation_amounts::Entity::delete_by_id(existing.validation_id)
                .exec(&db_tx)
                .await?;
            self.sync_validation_date(&db_tx, existing.account_id).await?;
            validation_from_model(existing)
        })
    }

    async fn require_validation(
        &self,
        id: i64,
        owner: &str,
    ) -> ResultEngine<validation_amounts::Model> {
        validation_amounts::Entity::find_by_id(id)
            .filter(validation_amounts::Column::Owner.eq(owner))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("validation amount {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cleared_and_outstanding_are_checkpoints() {
        assert!(ensure_checkpoint_state(TransactionState::Cleared).is_ok());
        assert!(ensure_checkpoint_state(TransactionState::Outstanding).is_ok());
        assert!(ensure_checkpoint_state(TransactionState::Future).is_err());
        assert!(ensure_checkpoint_state(TransactionState::Undefined).is_err());
    }
}
