use api_types::{
    Amount,
    pending::{PendingTransaction, PendingTransactionInput},
};
use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, pending_transactions,
    util::{normalize_account_name_owner, normalize_name, validate_transaction_date},
};

use super::{Engine, with_tx};

const DEFAULT_REVIEW_STATUS: &str = "pending";

fn pending_from_model(model: pending_transactions::Model) -> PendingTransaction {
    PendingTransaction {
        pending_transaction_id: model.pending_transaction_id,
        account_name_owner: model.account_name_owner,
        transaction_date: model.transaction_date,
        description: model.description,
        amount: Amount::new(model.amount),
        review_status: model.review_status,
        date_added: model.date_added,
    }
}

struct PendingFields {
    account_name_owner: String,
    description: String,
    review_status: String,
}

fn validate_pending(input: &PendingTransactionInput) -> ResultEngine<PendingFields> {
    validate_transaction_date(input.transaction_date)?;
    let review_status = input
        .review_status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_REVIEW_STATUS)
        .to_lowercase();
    Ok(PendingFields {
        account_name_owner: normalize_account_name_owner(&input.account_name_owner)?,
        description: normalize_name(&input.description, "description")?,
        review_status,
    })
}

impl Engine {
    /// Pending transactions, newest first.
    pub async fn pending_transactions(&self, owner: &str) -> ResultEngine<Vec<PendingTransaction>> {
        let models = pending_transactions::Entity::find()
            .filter(pending_transactions::Column::Owner.eq(owner))
            .order_by_desc(pending_transactions::Column::TransactionDate)
            .order_by_desc(pending_transactions::Column::PendingTransactionId)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(pending_from_model).collect())
    }

    pub async fn pending_transaction(&self, id: i64, owner: &str) -> ResultEngine<PendingTransaction> {
        self.require_pending(id, owner).await.map(pending_from_model)
    }

    pub async fn insert_pending_transaction(
        &self,
        input: PendingTransactionInput,
        owner: &str,
    ) -> ResultEngine<PendingTransaction> {
        let fields = validate_pending(&input)?;
        with_tx!(self, |db_tx| {
            let model = pending_transactions::ActiveModel {
                owner: ActiveValue::Set(owner.to_string()),
                account_name_owner: ActiveValue::Set(fields.account_name_owner),
                transaction_date: ActiveValue::Set(input.transaction_date),
                description: ActiveValue::Set(fields.description),
                amount: ActiveValue::Set(input.amount.cents()),
                review_status: ActiveValue::Set(fields.review_status),
                date_added: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;
            Ok(pending_from_model(model))
        })
    }

    pub async fn update_pending_transaction(
        &self,
        id: i64,
        input: PendingTransactionInput,
        owner: &str,
    ) -> ResultEngine<PendingTransaction> {
        let fields = validate_pending(&input)?;
        let existing = self.require_pending(id, owner).await?;
        with_tx!(self, |db_tx| {
            let mut active: pending_transactions::ActiveModel = existing.into();
            active.account_name_owner = ActiveValue::Set(fields.account_name_owner);
            active.transaction_date = ActiveValue::Set(input.transaction_date);
            active.description = ActiveValue::Set(fields.description);
            active.amount = ActiveValue::Set(input.amount.cents());
            active.review_status = ActiveValue::Set(fields.review_status);
            let model = active.update(&db_tx).await?;
            Ok(pending_from_model(model))
        })
    }

    pub async fn delete_pending_transaction(
        &self,
        id: i64,
        owner: &str,
    ) -> ResultEngine<PendingTransaction> {
        let existing = self.require_pending(id, owner).await?;
        with_tx!(self, |db_tx| {
            pending_transactions::Entity::delete_by_id(existing.pending_transaction_id)
                .exec(&db_tx)
                .await?;
            Ok(pending_from_model(existing))
        })
    }

    /// Remove every pending transaction of the owner. Returns how many were deleted.
    pub async fn delete_all_pending_transactions(&self, owner: &str) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            let result = pending_transactions::Entity::delete_many()
                .filter(pending_transactions::Column::Owner.eq(owner))
                .exec(&db_tx)
                .await?;
            Ok(result.rows_affected)
        })
    }

    async fn require_pending(
        &self,
        id: i64,
        owner: &str,
    ) -> ResultEngine<pending_transactions::Model> {
        pending_transactions::Entity::find_by_id(id)
            .filter(pending_transactions::Column::Owner.eq(owner))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("pending transaction {id}")))
    }
}
