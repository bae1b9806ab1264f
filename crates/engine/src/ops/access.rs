use api_types::{Amount, TransactionState};
use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, prelude::*,
};

use crate::{
    EngineError, ResultEngine, accounts, categories, descriptions, transactions,
    util::{normalize_category_name, normalize_name},
    validation_amounts,
};

use super::Engine;

/// Cleared/outstanding/future sums of an account's active transactions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) struct StateTotals {
    pub(super) cleared: i64,
    pub(super) outstanding: i64,
    pub(super) future: i64,
}

impl StateTotals {
    pub(super) fn add(&mut self, state: TransactionState, amount: i64) -> ResultEngine<()> {
        let slot = match state {
            TransactionState::Cleared => &mut self.cleared,
            TransactionState::Outstanding => &mut self.outstanding,
            TransactionState::Future => &mut self.future,
            TransactionState::Undefined => return Ok(()),
        };
        *slot = add_cents(*slot, amount)?;
        Ok(())
    }

    pub(super) fn total(self) -> ResultEngine<i64> {
        add_cents(add_cents(self.cleared, self.outstanding)?, self.future)
    }
}

/// Sum two cent values, rejecting totals outside the `i64` range.
pub(super) fn add_cents(lhs: i64, rhs: i64) -> ResultEngine<i64> {
    let sum = Amount::new(lhs).try_add(Amount::new(rhs))?;
    Ok(sum.cents())
}

impl Engine {
    pub(super) async fn find_account_by_name<C: ConnectionTrait>(
        &self,
        db: &C,
        account_name_owner: &str,
        owner: &str,
    ) -> ResultEngine<Option<accounts::Model>> {
        accounts::Entity::find()
            .filter(accounts::Column::Owner.eq(owner))
            .filter(accounts::Column::AccountNameOwner.eq(account_name_owner.trim().to_lowercase()))
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn require_account_by_name<C: ConnectionTrait>(
        &self,
        db: &C,
        account_name_owner: &str,
        owner: &str,
    ) -> ResultEngine<accounts::Model> {
        self.find_account_by_name(db, account_name_owner, owner)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(account_name_owner.to_string()))
    }

    pub(super) async fn require_account_by_id<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: i64,
        owner: &str,
    ) -> ResultEngine<accounts::Model> {
        accounts::Entity::find_by_id(account_id)
            .filter(accounts::Column::Owner.eq(owner))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("account {account_id}")))
    }

    pub(super) async fn require_transaction_by_guid<C: ConnectionTrait>(
        &self,
        db: &C,
        guid: Uuid,
        owner: &str,
    ) -> ResultEngine<transactions::Model> {
        transactions::Entity::find()
            .filter(transactions::Column::Owner.eq(owner))
            .filter(transactions::Column::Guid.eq(guid.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(guid.to_string()))
    }

    pub(super) async fn require_transaction_by_id<C: ConnectionTrait>(
        &self,
        db: &C,
        transaction_id: i64,
        owner: &str,
    ) -> ResultEngine<transactions::Model> {
        transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::Owner.eq(owner))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("transaction {transaction_id}")))
    }

    pub(super) async fn state_totals<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: i64,
    ) -> ResultEngine<StateTotals> {
        let rows = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account_id))
            .filter(transactions::Column::ActiveStatus.eq(true))
            .all(db)
            .await?;

        let mut totals = StateTotals::default();
        for row in rows {
            totals.add(row.transaction_state.parse::<TransactionState>()?, row.amount)?;
        }
        Ok(totals)
    }

    /// Recompute the derived balance columns of an account.
    ///
    /// Must run after every write that touches the account's transactions.
    pub(super) async fn refresh_account_totals<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: i64,
    ) -> ResultEngine<()> {
        let totals = self.state_totals(db, account_id).await?;
        let active = accounts::ActiveModel {
            account_id: ActiveValue::Set(account_id),
            cleared: ActiveValue::Set(totals.cleared),
            outstanding: ActiveValue::Set(totals.outstanding),
            future: ActiveValue::Set(totals.future),
            date_updated: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        active.update(db).await?;
        Ok(())
    }

    /// Point `accounts.validation_date` at the latest active cleared or
    /// outstanding validation amount, or clear it when there is none.
    pub(super) async fn sync_validation_date<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: i64,
    ) -> ResultEngine<()> {
        let latest = validation_amounts::Entity::find()
            .filter(validation_amounts::Column::AccountId.eq(account_id))
            .filter(validation_amounts::Column::ActiveStatus.eq(true))
            .filter(validation_amounts::Column::TransactionState.is_in([
                TransactionState::Cleared.as_str(),
                TransactionState::Outstanding.as_str(),
            ]))
            .order_by_desc(validation_amounts::Column::ValidationDate)
            .one(db)
            .await?;

        let active = accounts::ActiveModel {
            account_id: ActiveValue::Set(account_id),
            validation_date: ActiveValue::Set(latest.map(|model| model.validation_date)),
            date_updated: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        active.update(db).await?;
        Ok(())
    }

    /// Return the normalized category name, creating the category if missing.
    pub(super) async fn ensure_category<C: ConnectionTrait>(
        &self,
        db: &C,
        name: &str,
        owner: &str,
    ) -> ResultEngine<String> {
        let name = normalize_category_name(name)?;
        let exists = categories::Entity::find()
            .filter(categories::Column::Owner.eq(owner))
            .filter(categories::Column::CategoryName.eq(name.clone()))
            .one(db)
            .await?
            .is_some();
        if !exists {
            let now = Utc::now();
            categories::ActiveModel {
                owner: ActiveValue::Set(owner.to_string()),
                category_name: ActiveValue::Set(name.clone()),
                active_status: ActiveValue::Set(true),
                date_added: ActiveValue::Set(now),
                date_updated: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
        Ok(name)
    }

    /// Return the normalized description name, creating it if missing.
    pub(super) async fn ensure_description<C: ConnectionTrait>(
        &self,
        db: &C,
        name: &str,
        owner: &str,
    ) -> ResultEngine<String> {
        let name = normalize_name(name, "description")?;
        let exists = descriptions::Entity::find()
            .filter(descriptions::Column::Owner.eq(owner))
            .filter(descriptions::Column::DescriptionName.eq(name.clone()))
            .one(db)
            .await?
            .is_some();
        if !exists {
            let now = Utc::now();
            descriptions::ActiveModel {
                owner: ActiveValue::Set(owner.to_string()),
                description_name: ActiveValue::Set(name.clone()),
                active_status: ActiveValue::Set(true),
                date_added: ActiveValue::Set(now),
                date_updated: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
        Ok(name)
    }

    pub(super) async fn count_active_transactions<C: ConnectionTrait>(
        &self,
        db: &C,
        column: transactions::Column,
        value: &str,
        owner: &str,
    ) -> ResultEngine<u64> {
        transactions::Entity::find()
            .filter(transactions::Column::Owner.eq(owner))
            .filter(transactions::Column::ActiveStatus.eq(true))
            .filter(column.eq(value))
            .count(db)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_totals_ignore_undefined() {
        let mut totals = StateTotals::default();
        totals.add(TransactionState::Cleared, 1000).unwrap();
        totals.add(TransactionState::Outstanding, -250).unwrap();
        totals.add(TransactionState::Future, 75).unwrap();
        totals.add(TransactionState::Undefined, 9999).unwrap();
        assert_eq!(totals.cleared, 1000);
        assert_eq!(totals.outstanding, -250);
        assert_eq!(totals.future, 75);
        assert_eq!(totals.total().unwrap(), 825);
    }

    #[test]
    fn state_totals_reject_overflow() {
        let half = i64::MAX / 2 + 1;
        let mut totals = StateTotals::default();
        totals.add(TransactionState::Cleared, half).unwrap();
        assert!(matches!(
            totals.add(TransactionState::Cleared, half),
            Err(EngineError::InvalidValue(_))
        ));
        assert_eq!(totals.cleared, half);

        totals.add(TransactionState::Outstanding, half).unwrap();
        assert!(matches!(totals.total(), Err(EngineError::InvalidValue(_))));
    }
}
