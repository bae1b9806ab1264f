use api_types::{
    AccountType, Amount,
    account::{Account, AccountInput, Totals},
};
use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, ResultEngine, accounts, payments, pending_transactions, transactions, transfers,
    util::{normalize_account_name_owner, validate_moniker},
};

use super::{Engine, with_tx};

pub(super) const DEFAULT_MONIKER: &str = "0000";

pub(super) fn account_from_model(model: accounts::Model) -> ResultEngine<Account> {
    Ok(Account {
        account_id: model.account_id,
        account_name_owner: model.account_name_owner,
        account_type: model.account_type.parse()?,
        active_status: model.active_status,
        moniker: model.moniker,
        outstanding: Amount::new(model.outstanding),
        future: Amount::new(model.future),
        cleared: Amount::new(model.cleared),
        date_closed: model.date_closed,
        validation_date: model.validation_date,
        date_added: model.date_added,
        date_updated: model.date_updated,
    })
}

fn accounts_from_models(models: Vec<accounts::Model>) -> ResultEngine<Vec<Account>> {
    models.into_iter().map(account_from_model).collect()
}

impl Engine {
    /// Active accounts ordered by name.
    pub async fn accounts_active(&self, owner: &str) -> ResultEngine<Vec<Account>> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::Owner.eq(owner))
            .filter(accounts::Column::ActiveStatus.eq(true))
            .order_by_asc(accounts::Column::AccountNameOwner)
            .all(&self.database)
            .await?;
        accounts_from_models(models)
    }

    pub async fn account(&self, account_name_owner: &str, owner: &str) -> ResultEngine<Account> {
        let model = self
            .require_account_by_name(&self.database, account_name_owner, owner)
            .await?;
        account_from_model(model)
    }

    /// Create an account with zero balances.
    pub async fn insert_account(&self, input: AccountInput, owner: &str) -> ResultEngine<Account> {
        let name = normalize_account_name_owner(&input.account_name_owner)?;
        let moniker = input.moniker.unwrap_or_else(|| DEFAULT_MONIKER.to_string());
        validate_moniker(&moniker)?;

        with_tx!(self, |db_tx| {
            let model = self
                .create_account(
                    &db_tx,
                    NewAccount {
                        name: &name,
                        account_type: input.account_type,
                        active_status: input.active_status.unwrap_or(true),
                        moniker,
                        date_closed: input.date_closed,
                    },
                    owner,
                )
                .await?;
            account_from_model(model)
        })
    }

    /// Update type, moniker, status and closing date. A different
    /// `account_name_owner` in the payload renames the account.
    pub async fn update_account(
        &self,
        account_name_owner: &str,
        input: AccountInput,
        owner: &str,
    ) -> ResultEngine<Account> {
        let new_name = normalize_account_name_owner(&input.account_name_owner)?;
        if let Some(moniker) = input.moniker.as_deref() {
            validate_moniker(moniker)?;
        }

        with_tx!(self, |db_tx| {
            let existing = self
                .require_account_by_name(&db_tx, account_name_owner, owner)
                .await?;
            if new_name != existing.account_name_owner {
                self.rename_account_in(&db_tx, &existing, &new_name, owner)
                    .await?;
            }

            let account_type = input.account_type.as_str().to_string();
            if account_type != existing.account_type {
                transactions::Entity::update_many()
                    .col_expr(
                        transactions::Column::AccountType,
                        Expr::value(account_type.clone()),
                    )
                    .filter(transactions::Column::AccountId.eq(existing.account_id))
                    .exec(&db_tx)
                    .await?;
            }

            let mut active: accounts::ActiveModel = existing.into();
            active.account_type = ActiveValue::Set(account_type);
            if let Some(moniker) = input.moniker {
                active.moniker = ActiveValue::Set(moniker);
            }
            if let Some(status) = input.active_status {
                active.active_status = ActiveValue::Set(status);
            }
            active.date_closed = ActiveValue::Set(input.date_closed);
            active.date_updated = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            account_from_model(model)
        })
    }

    /// Delete an account with no transactions. Returns the deleted account.
    pub async fn delete_account(
        &self,
        account_name_owner: &str,
        owner: &str,
    ) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let existing = self
                .require_account_by_name(&db_tx, account_name_owner, owner)
                .await?;
            let referenced = transactions::Entity::find()
                .filter(transactions::Column::AccountId.eq(existing.account_id))
                .count(&db_tx)
                .await?;
            if referenced > 0 {
                return Err(EngineError::ExistingKey(format!(
                    "account {} still has {referenced} transactions",
                    existing.account_name_owner
                )));
            }
            accounts::Entity::delete_by_id(existing.account_id)
                .exec(&db_tx)
                .await?;
            account_from_model(existing)
        })
    }

    /// Rename an account and every row that refers to it by name.
    pub async fn rename_account(
        &self,
        old_name: &str,
        new_name: &str,
        owner: &str,
    ) -> ResultEngine<Account> {
        let new_name = normalize_account_name_owner(new_name)?;
        with_tx!(self, |db_tx| {
            let existing = self
                .require_account_by_name(&db_tx, old_name, owner)
                .await?;
            if existing.account_name_owner == new_name {
                return Err(EngineError::InvalidValue(
                    "new account name must differ from the old one".to_string(),
                ));
            }
            let model = self
                .rename_account_in(&db_tx, &existing, &new_name, owner)
                .await?;
            account_from_model(model)
        })
    }

    pub async fn set_account_active(
        &self,
        account_name_owner: &str,
        active_status: bool,
        owner: &str,
    ) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let existing = self
                .require_account_by_name(&db_tx, account_name_owner, owner)
                .await?;
            let mut active: accounts::ActiveModel = existing.into();
            active.active_status = ActiveValue::Set(active_status);
            active.date_updated = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            account_from_model(model)
        })
    }

    /// Grand totals over all active accounts.
    pub async fn account_totals(&self, owner: &str) -> ResultEngine<Totals> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::Owner.eq(owner))
            .filter(accounts::Column::ActiveStatus.eq(true))
            .all(&self.database)
            .await?;

        let mut totals = Totals::default();
        for model in models {
            totals.totals_cleared = totals.totals_cleared.try_add(Amount::new(model.cleared))?;
            totals.totals_outstanding = totals
                .totals_outstanding
                .try_add(Amount::new(model.outstanding))?;
            totals.totals_future = totals.totals_future.try_add(Amount::new(model.future))?;
        }
        totals.totals = Amount::try_sum([
            totals.totals_cleared,
            totals.totals_outstanding,
            totals.totals_future,
        ])?;
        Ok(totals)
    }

    /// Active credit accounts carrying an outstanding or future balance.
    pub async fn accounts_payment_required(&self, owner: &str) -> ResultEngine<Vec<Account>> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::Owner.eq(owner))
            .filter(accounts::Column::ActiveStatus.eq(true))
            .filter(accounts::Column::AccountType.eq(AccountType::Credit.as_str()))
            .filter(
                accounts::Column::Outstanding
                    .ne(0)
                    .or(accounts::Column::Future.ne(0)),
            )
            .order_by_asc(accounts::Column::AccountNameOwner)
            .all(&self.database)
            .await?;
        accounts_from_models(models)
    }

    pub(super) async fn create_account<C: ConnectionTrait>(
        &self,
        db: &C,
        account: NewAccount<'_>,
        owner: &str,
    ) -> ResultEngine<accounts::Model> {
        if self
            .find_account_by_name(db, account.name, owner)
            .await?
            .is_some()
        {
            return Err(EngineError::ExistingKey(account.name.to_string()));
        }

        let now = Utc::now();
        let model = accounts::ActiveModel {
            owner: ActiveValue::Set(owner.to_string()),
            account_name_owner: ActiveValue::Set(account.name.to_string()),
            account_type: ActiveValue::Set(account.account_type.as_str().to_string()),
            active_status: ActiveValue::Set(account.active_status),
            moniker: ActiveValue::Set(account.moniker),
            outstanding: ActiveValue::Set(0),
            future: ActiveValue::Set(0),
            cleared: ActiveValue::Set(0),
            date_closed: ActiveValue::Set(account.date_closed),
            validation_date: ActiveValue::Set(None),
            date_added: ActiveValue::Set(now),
            date_updated: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        Ok(model)
    }

    async fn rename_account_in<C: ConnectionTrait>(
        &self,
        db: &C,
        existing: &accounts::Model,
        new_name: &str,
        owner: &str,
    ) -> ResultEngine<accounts::Model> {
        if self.find_account_by_name(db, new_name, owner).await?.is_some() {
            return Err(EngineError::ExistingKey(new_name.to_string()));
        }
        let old_name = existing.account_name_owner.as_str();

        transactions::Entity::update_many()
            .col_expr(
                transactions::Column::AccountNameOwner,
                Expr::value(new_name.to_string()),
            )
            .filter(transactions::Column::AccountId.eq(existing.account_id))
            .exec(db)
            .await?;
        pending_transactions::Entity::update_many()
            .col_expr(
                pending_transactions::Column::AccountNameOwner,
                Expr::value(new_name.to_string()),
            )
            .filter(pending_transactions::Column::Owner.eq(owner))
            .filter(pending_transactions::Column::AccountNameOwner.eq(old_name))
            .exec(db)
            .await?;
        payments::Entity::update_many()
            .col_expr(
                payments::Column::SourceAccount,
                Expr::value(new_name.to_string()),
            )
            .filter(payments::Column::Owner.eq(owner))
            .filter(payments::Column::SourceAccount.eq(old_name))
            .exec(db)
            .await?;
        payments::Entity::update_many()
            .col_expr(
                payments::Column::DestinationAccount,
                Expr::value(new_name.to_string()),
            )
            .filter(payments::Column::Owner.eq(owner))
            .filter(payments::Column::DestinationAccount.eq(old_name))
            .exec(db)
            .await?;
        transfers::Entity::update_many()
            .col_expr(
                transfers::Column::SourceAccount,
                Expr::value(new_name.to_string()),
            )
            .filter(transfers::Column::Owner.eq(owner))
            .filter(transfers::Column::SourceAccount.eq(old_name))
            .exec(db)
            .await?;
        transfers::Entity::update_many()
            .col_expr(
                transfers::Column::DestinationAccount,
                Expr::value(new_name.to_string()),
            )
            .filter(transfers::Column::Owner.eq(owner))
            .filter(transfers::Column::DestinationAccount.eq(old_name))
            .exec(db)
            .await?;

        let active = accounts::ActiveModel {
            account_id: ActiveValue::Set(existing.account_id),
            account_name_owner: ActiveValue::Set(new_name.to_string()),
            date_updated: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        Ok(active.update(db).await?)
    }
}

pub(super) struct NewAccount<'a> {
    pub(super) name: &'a str,
    pub(super) account_type: AccountType,
    pub(super) active_status: bool,
    pub(super) moniker: String,
    pub(super) date_closed: Option<chrono::DateTime<Utc>>,
}
