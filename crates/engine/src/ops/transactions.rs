use api_types::{
    AccountType, Amount, ReoccurringType, TransactionState,
    account::Totals,
    transaction::{Transaction, TransactionAccountChange, TransactionInput},
};
use chrono::{Days, Months, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{
    EngineError, ResultEngine, medical_expenses, receipt_images, transactions,
    util::{
        normalize_account_name_owner, normalize_category_name, normalize_name, parse_uuid,
        validate_transaction_date,
    },
};

use super::{
    Engine,
    accounts::{DEFAULT_MONIKER, NewAccount},
    normalize_optional_text, with_tx,
};

/// Category used when a transaction arrives without one.
const DEFAULT_CATEGORY: &str = "none";

pub(super) fn transaction_from_model(model: transactions::Model) -> ResultEngine<Transaction> {
    Ok(Transaction {
        transaction_id: model.transaction_id,
        guid: parse_uuid(&model.guid, "transaction")?,
        account_id: model.account_id,
        account_type: model.account_type.parse()?,
        transaction_type: model.transaction_type.parse()?,
        account_name_owner: model.account_name_owner,
        transaction_date: model.transaction_date,
        description: model.description,
        category: model.category,
        amount: Amount::new(model.amount),
        transaction_state: model.transaction_state.parse()?,
        reoccurring_type: model.reoccurring_type.parse()?,
        active_status: model.active_status,
        notes: model.notes,
        receipt_image_id: model.receipt_image_id,
        date_added: model.date_added,
        date_updated: model.date_updated,
    })
}

fn transactions_from_models(models: Vec<transactions::Model>) -> ResultEngine<Vec<Transaction>> {
    models.into_iter().map(transaction_from_model).collect()
}

fn state_rank(state: TransactionState) -> u8 {
    match state {
        TransactionState::Cleared => 0,
        TransactionState::Outstanding => 1,
        TransactionState::Future => 2,
        TransactionState::Undefined => 3,
    }
}

/// Date of the next occurrence of a reoccurring transaction.
pub(super) fn next_occurrence(date: NaiveDate, reoccurring: ReoccurringType) -> ResultEngine<NaiveDate> {
    let next = match reoccurring {
        ReoccurringType::Monthly => date.checked_add_months(Months::new(1)),
        ReoccurringType::Quarterly => date.checked_add_months(Months::new(3)),
        ReoccurringType::BiAnnually => date.checked_add_months(Months::new(6)),
        ReoccurringType::Annually => date.checked_add_months(Months::new(12)),
        ReoccurringType::FortNightly => date.checked_add_days(Days::new(14)),
        ReoccurringType::Onetime | ReoccurringType::Undefined => {
            return Err(EngineError::InvalidValue(format!(
                "transaction with reoccurring type {reoccurring} has no next occurrence"
            )));
        }
    };
    next.ok_or_else(|| EngineError::InvalidValue(format!("date out of range: {date}")))
}

impl Engine {
    /// Active transactions, newest first.
    pub async fn transactions_active(&self, owner: &str) -> ResultEngine<Vec<Transaction>> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::Owner.eq(owner))
            .filter(transactions::Column::ActiveStatus.eq(true))
            .order_by_desc(transactions::Column::TransactionDate)
            .order_by_desc(transactions::Column::TransactionId)
            .all(&self.database)
            .await?;
        transactions_from_models(models)
    }

    pub async fn transaction(&self, guid: Uuid, owner: &str) -> ResultEngine<Transaction> {
        let model = self
            .require_transaction_by_guid(&self.database, guid, owner)
            .await?;
        transaction_from_model(model)
    }

    /// Active transactions of one account, cleared first, then outstanding,
    /// future and undefined; newest first within each state.
    pub async fn transactions_by_account(
        &self,
        account_name_owner: &str,
        owner: &str,
    ) -> ResultEngine<Vec<Transaction>> {
        let account = self
            .require_account_by_name(&self.database, account_name_owner, owner)
            .await?;
        let models = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account.account_id))
            .filter(transactions::Column::ActiveStatus.eq(true))
            .order_by_desc(transactions::Column::TransactionDate)
            .order_by_desc(transactions::Column::TransactionId)
            .all(&self.database)
            .await?;

        let mut result = transactions_from_models(models)?;
        // Stable sort keeps the date ordering inside each state.
        result.sort_by_key(|tx| state_rank(tx.transaction_state));
        Ok(result)
    }

    pub async fn account_transaction_totals(
        &self,
        account_name_owner: &str,
        owner: &str,
    ) -> ResultEngine<Totals> {
        let account = self
            .require_account_by_name(&self.database, account_name_owner, owner)
            .await?;
        let totals = self.state_totals(&self.database, account.account_id).await?;
        Ok(Totals {
            totals: Amount::new(totals.total()?),
            totals_cleared: Amount::new(totals.cleared),
            totals_outstanding: Amount::new(totals.outstanding),
            totals_future: Amount::new(totals.future),
        })
    }

    pub async fn transactions_by_category(
        &self,
        category: &str,
        owner: &str,
    ) -> ResultEngine<Vec<Transaction>> {
        let category = normalize_category_name(category)?;
        self.transactions_matching(transactions::Column::Category, &category, owner)
            .await
    }

    pub async fn transactions_by_description(
        &self,
        description: &str,
        owner: &str,
    ) -> ResultEngine<Vec<Transaction>> {
        let description = normalize_name(description, "description")?;
        self.transactions_matching(transactions::Column::Description, &description, owner)
            .await
    }

    /// Insert a transaction, creating its account, category and description
    /// when they do not exist yet.
    pub async fn insert_transaction(
        &self,
        input: TransactionInput,
        owner: &str,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self.insert_transaction_in(&db_tx, input, owner).await?;
            transaction_from_model(model)
        })
    }

    /// Replace a transaction's fields. Moving it to another account refreshes
    /// both accounts' balances.
    pub async fn update_transaction(
        &self,
        guid: Uuid,
        input: TransactionInput,
        owner: &str,
    ) -> ResultEngine<Transaction> {
        if let Some(body_guid) = input.guid
            && body_guid != guid
        {
            return Err(EngineError::InvalidValue(format!(
                "guid mismatch: path {guid}, body {body_guid}"
            )));
        }
        validate_transaction_date(input.transaction_date)?;
        let account_name = normalize_account_name_owner(&input.account_name_owner)?;

        with_tx!(self, |db_tx| {
            let existing = self.require_transaction_by_guid(&db_tx, guid, owner).await?;
            let previous_account = existing.account_id;
            let account = self
                .find_or_create_account(&db_tx, &account_name, input.account_type, owner)
                .await?;
            let category = self
                .ensure_category(
                    &db_tx,
                    input.category.as_deref().unwrap_or(DEFAULT_CATEGORY),
                    owner,
                )
                .await?;
            let description = self
                .ensure_description(&db_tx, &input.description, owner)
                .await?;

            let mut active: transactions::ActiveModel = existing.into();
            active.account_id = ActiveValue::Set(account.account_id);
            active.account_type = ActiveValue::Set(account.account_type.clone());
            active.account_name_owner = ActiveValue::Set(account.account_name_owner.clone());
            active.transaction_type = ActiveValue::Set(input.transaction_type.as_str().to_string());
            active.transaction_date = ActiveValue::Set(input.transaction_date);
            active.description = ActiveValue::Set(description);
            active.category = ActiveValue::Set(category);
            active.amount = ActiveValue::Set(input.amount.cents());
            active.transaction_state =
                ActiveValue::Set(input.transaction_state.as_str().to_string());
            active.reoccurring_type =
                ActiveValue::Set(input.reoccurring_type.as_str().to_string());
            if let Some(status) = input.active_status {
                active.active_status = ActiveValue::Set(status);
            }
            if let Some(notes) = input.notes {
                active.notes = ActiveValue::Set(notes.trim().to_string());
            }
            active.date_updated = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;

            self.refresh_account_totals(&db_tx, account.account_id)
                .await?;
            if previous_account != account.account_id {
                self.refresh_account_totals(&db_tx, previous_account)
                    .await?;
            }
            transaction_from_model(model)
        })
    }

    /// Delete a transaction together with its receipt image. Medical
    /// expenses pointing at it are unlinked, not deleted.
    pub async fn delete_transaction(&self, guid: Uuid, owner: &str) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let existing = self.require_transaction_by_guid(&db_tx, guid, owner).await?;
            self.delete_transaction_in(&db_tx, &existing).await?;
            transaction_from_model(existing)
        })
    }

    /// Change the state of a transaction. Clearing a transaction dated in
    /// the future is rejected.
    pub async fn update_transaction_state(
        &self,
        guid: Uuid,
        state: TransactionState,
        owner: &str,
    ) -> ResultEngine<Transaction> {
        let today = Utc::now().date_naive();
        with_tx!(self, |db_tx| {
            let existing = self.require_transaction_by_guid(&db_tx, guid, owner).await?;
            if state == TransactionState::Cleared && existing.transaction_date > today {
                return Err(EngineError::InvalidValue(format!(
                    "cannot clear a transaction dated in the future ({})",
                    existing.transaction_date
                )));
            }
            let account_id = existing.account_id;
            let mut active: transactions::ActiveModel = existing.into();
            active.transaction_state = ActiveValue::Set(state.as_str().to_string());
            active.date_updated = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            self.refresh_account_totals(&db_tx, account_id).await?;
            transaction_from_model(model)
        })
    }

    /// Insert the next occurrence of a reoccurring transaction as a new
    /// `future` transaction.
    pub async fn insert_future_transaction(
        &self,
        input: TransactionInput,
        owner: &str,
    ) -> ResultEngine<Transaction> {
        let next_date = next_occurrence(input.transaction_date, input.reoccurring_type)?;
        let draft = TransactionInput {
            guid: None,
            transaction_date: next_date,
            transaction_state: TransactionState::Future,
            active_status: Some(true),
            ..input
        };
        self.insert_transaction(draft, owner).await
    }

    /// Move a transaction to another (possibly new) account.
    pub async fn change_transaction_account(
        &self,
        change: TransactionAccountChange,
        owner: &str,
    ) -> ResultEngine<Transaction> {
        let account_name = normalize_account_name_owner(&change.account_name_owner)?;
        with_tx!(self, |db_tx| {
            let existing = self
                .require_transaction_by_guid(&db_tx, change.guid, owner)
                .await?;
            let previous_account = existing.account_id;
            let account_type: AccountType = existing.account_type.parse()?;
            let account = self
                .find_or_create_account(&db_tx, &account_name, account_type, owner)
                .await?;

            let mut active: transactions::ActiveModel = existing.into();
            active.account_id = ActiveValue::Set(account.account_id);
            active.account_name_owner = ActiveValue::Set(account.account_name_owner.clone());
            active.account_type = ActiveValue::Set(account.account_type.clone());
            active.date_updated = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;

            self.refresh_account_totals(&db_tx, account.account_id)
                .await?;
            if previous_account != account.account_id {
                self.refresh_account_totals(&db_tx, previous_account)
                    .await?;
            }
            transaction_from_model(model)
        })
    }

    async fn transactions_matching(
        &self,
        column: transactions::Column,
        value: &str,
        owner: &str,
    ) -> ResultEngine<Vec<Transaction>> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::Owner.eq(owner))
            .filter(transactions::Column::ActiveStatus.eq(true))
            .filter(column.eq(value))
            .order_by_desc(transactions::Column::TransactionDate)
            .order_by_desc(transactions::Column::TransactionId)
            .all(&self.database)
            .await?;
        transactions_from_models(models)
    }

    async fn find_or_create_account<C: ConnectionTrait>(
        &self,
        db: &C,
        account_name_owner: &str,
        account_type: AccountType,
        owner: &str,
    ) -> ResultEngine<crate::accounts::Model> {
        if let Some(account) = self.find_account_by_name(db, account_name_owner, owner).await? {
            return Ok(account);
        }
        self.create_account(
            db,
            NewAccount {
                name: account_name_owner,
                account_type,
                active_status: true,
                moniker: DEFAULT_MONIKER.to_string(),
                date_closed: None,
            },
            owner,
        )
        .await
    }

    /// Insert one transaction inside an open DB transaction and refresh its
    /// account's balances.
    pub(super) async fn insert_transaction_in<C: ConnectionTrait>(
        &self,
        db: &C,
        input: TransactionInput,
        owner: &str,
    ) -> ResultEngine<transactions::Model> {
        validate_transaction_date(input.transaction_date)?;
        let account_name = normalize_account_name_owner(&input.account_name_owner)?;
        let guid = input.guid.unwrap_or_else(Uuid::new_v4).to_string();

        let duplicate = transactions::Entity::find()
            .filter(transactions::Column::Guid.eq(guid.clone()))
            .one(db)
            .await?
            .is_some();
        if duplicate {
            return Err(EngineError::ExistingKey(guid));
        }

        let account = self
            .find_or_create_account(db, &account_name, input.account_type, owner)
            .await?;
        let category = self
            .ensure_category(
                db,
                input.category.as_deref().unwrap_or(DEFAULT_CATEGORY),
                owner,
            )
            .await?;
        let description = self
            .ensure_description(db, &input.description, owner)
            .await?;

        let now = Utc::now();
        let model = transactions::ActiveModel {
            owner: ActiveValue::Set(owner.to_string()),
            guid: ActiveValue::Set(guid),
            account_id: ActiveValue::Set(account.account_id),
            account_type: ActiveValue::Set(account.account_type),
            transaction_type: ActiveValue::Set(input.transaction_type.as_str().to_string()),
            account_name_owner: ActiveValue::Set(account.account_name_owner),
            transaction_date: ActiveValue::Set(input.transaction_date),
            description: ActiveValue::Set(description),
            category: ActiveValue::Set(category),
            amount: ActiveValue::Set(input.amount.cents()),
            transaction_state: ActiveValue::Set(input.transaction_state.as_str().to_string()),
            reoccurring_type: ActiveValue::Set(input.reoccurring_type.as_str().to_string()),
            active_status: ActiveValue::Set(input.active_status.unwrap_or(true)),
            notes: ActiveValue::Set(
                normalize_optional_text(input.notes.as_deref()).unwrap_or_default(),
            ),
            receipt_image_id: ActiveValue::Set(None),
            date_added: ActiveValue::Set(now),
            date_updated: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        self.refresh_account_totals(db, model.account_id).await?;
        Ok(model)
    }

    /// Delete a transaction row and everything hanging off it, then refresh
    /// the account's balances.
    pub(super) async fn delete_transaction_in<C: ConnectionTrait>(
        &self,
        db: &C,
        existing: &transactions::Model,
    ) -> ResultEngine<()> {
        receipt_images::Entity::delete_many()
            .filter(receipt_images::Column::TransactionId.eq(existing.transaction_id))
            .exec(db)
            .await?;
        medical_expenses::Entity::update_many()
            .col_expr(
                medical_expenses::Column::TransactionId,
                Expr::value(Option::<i64>::None),
            )
            .filter(medical_expenses::Column::TransactionId.eq(existing.transaction_id))
            .exec(db)
            .await?;
        transactions::Entity::delete_by_id(existing.transaction_id)
            .exec(db)
            .await?;
        self.refresh_account_totals(db, existing.account_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn next_occurrence_follows_reoccurring_type() {
        let start = date(2024, 1, 31);
        assert_eq!(
            next_occurrence(start, ReoccurringType::Monthly).unwrap(),
            date(2024, 2, 29)
        );
        assert_eq!(
            next_occurrence(start, ReoccurringType::Quarterly).unwrap(),
            date(2024, 4, 30)
        );
        assert_eq!(
            next_occurrence(start, ReoccurringType::BiAnnually).unwrap(),
            date(2024, 7, 31)
        );
        assert_eq!(
            next_occurrence(start, ReoccurringType::Annually).unwrap(),
            date(2025, 1, 31)
        );
        assert_eq!(
            next_occurrence(start, ReoccurringType::FortNightly).unwrap(),
            date(2024, 2, 14)
        );
    }

    #[test]
    fn one_time_transactions_do_not_repeat() {
        let start = date(2024, 1, 1);
        assert!(next_occurrence(start, ReoccurringType::Onetime).is_err());
        assert!(next_occurrence(start, ReoccurringType::Undefined).is_err());
    }

    #[test]
    fn states_sort_cleared_first() {
        let mut states = vec![
            TransactionState::Future,
            TransactionState::Undefined,
            TransactionState::Cleared,
            TransactionState::Outstanding,
        ];
        states.sort_by_key(|state| state_rank(*state));
        assert_eq!(
            states,
            vec![
                TransactionState::Cleared,
                TransactionState::Outstanding,
                TransactionState::Future,
                TransactionState::Undefined,
            ]
        );
    }
}
