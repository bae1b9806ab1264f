//! Payments move money from a debit account to a bill account.
//!
//! A payment row owns two transactions: the debit on the source account and
//! the matching entry on the destination. Credit destinations see the
//! payment as `-amount` (the balance owed shrinks), debit destinations as
//! `+amount`.

use api_types::{
    AccountType, Amount, ReoccurringType, TransactionState, TransactionType,
    payment::{Payment, PaymentInput},
    transaction::TransactionInput,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, ResultEngine, accounts, payments, transactions,
    util::{normalize_account_name_owner, parse_uuid, validate_transaction_date},
};

use super::{Engine, parameters::PAYMENT_ACCOUNT, with_tx};

const PAYMENT_CATEGORY: &str = "bill_pay";
const PAYMENT_DESCRIPTION: &str = "payment";

fn payment_from_model(model: payments::Model) -> ResultEngine<Payment> {
    Ok(Payment {
        payment_id: model.payment_id,
        source_account: model.source_account,
        destination_account: model.destination_account,
        transaction_date: model.transaction_date,
        amount: Amount::new(model.amount),
        guid_source: parse_uuid(&model.guid_source, "transaction")?,
        guid_destination: parse_uuid(&model.guid_destination, "transaction")?,
        active_status: model.active_status,
    })
}

/// The two sides of a payment or transfer.
pub(super) struct LegPair<'a> {
    pub(super) source: &'a accounts::Model,
    pub(super) destination: &'a accounts::Model,
    pub(super) transaction_date: NaiveDate,
    pub(super) source_amount: Amount,
    pub(super) destination_amount: Amount,
    pub(super) category: &'static str,
    pub(super) description: &'static str,
    pub(super) transaction_type: TransactionType,
}

pub(super) fn ensure_positive(amount: Amount) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidValue(format!(
            "amount must be greater than zero: {amount}"
        )));
    }
    Ok(())
}

pub(super) fn ensure_distinct(source: &str, destination: &str) -> ResultEngine<()> {
    if source == destination {
        return Err(EngineError::InvalidValue(format!(
            "source and destination must differ: {source}"
        )));
    }
    Ok(())
}

pub(super) fn ensure_debit(account: &accounts::Model, role: &str) -> ResultEngine<()> {
    if account.account_type != AccountType::Debit.as_str() {
        return Err(EngineError::InvalidValue(format!(
            "{role} account {} must be a debit account",
            account.account_name_owner
        )));
    }
    Ok(())
}

/// Amount booked on the destination of a payment.
fn destination_amount(destination: &accounts::Model, amount: Amount) -> Amount {
    if destination.account_type == AccountType::Credit.as_str() {
        -amount
    } else {
        amount
    }
}

fn leg_input(
    account: &accounts::Model,
    pair: &LegPair<'_>,
    amount: Amount,
    notes: String,
) -> ResultEngine<TransactionInput> {
    Ok(TransactionInput {
        guid: Some(Uuid::new_v4()),
        account_type: account.account_type.parse()?,
        transaction_type: pair.transaction_type,
        account_name_owner: account.account_name_owner.clone(),
        transaction_date: pair.transaction_date,
        description: pair.description.to_string(),
        category: Some(pair.category.to_string()),
        amount,
        transaction_state: TransactionState::Outstanding,
        reoccurring_type: ReoccurringType::Onetime,
        active_status: Some(true),
        notes: Some(notes),
    })
}

impl Engine {
    pub async fn payments_active(&self, owner: &str) -> ResultEngine<Vec<Payment>> {
        let models = payments::Entity::find()
            .filter(payments::Column::Owner.eq(owner))
            .filter(payments::Column::ActiveStatus.eq(true))
            .order_by_desc(payments::Column::TransactionDate)
            .order_by_desc(payments::Column::PaymentId)
            .all(&self.database)
            .await?;
        models.into_iter().map(payment_from_model).collect()
    }

    pub async fn payment(&self, id: i64, owner: &str) -> ResultEngine<Payment> {
        let model = self.require_payment(&self.database, id, owner).await?;
        payment_from_model(model)
    }

    /// Record a payment and book both of its transactions.
    ///
    /// Without `source_account` the `payment_account` parameter is used.
    pub async fn insert_payment(&self, input: PaymentInput, owner: &str) -> ResultEngine<Payment> {
        ensure_positive(input.amount)?;
        validate_transaction_date(input.transaction_date)?;
        let destination = normalize_account_name_owner(&input.destination_account)?;

        with_tx!(self, |db_tx| {
            let source = self
                .payment_source(&db_tx, input.source_account.as_deref(), owner)
                .await?;
            ensure_distinct(&source, &destination)?;
            let (guid_source, guid_destination, source, destination) = self
                .book_payment(
                    &db_tx,
                    &source,
                    &destination,
                    input.transaction_date,
                    input.amount,
                    owner,
                )
                .await?;

            let now = Utc::now();
            let model = payments::ActiveModel {
                owner: ActiveValue::Set(owner.to_string()),
                source_account: ActiveValue::Set(source),
                destination_account: ActiveValue::Set(destination),
                transaction_date: ActiveValue::Set(input.transaction_date),
                amount: ActiveValue::Set(input.amount.cents()),
                guid_source: ActiveValue::Set(guid_source.to_string()),
                guid_destination: ActiveValue::Set(guid_destination.to_string()),
                active_status: ActiveValue::Set(input.active_status.unwrap_or(true)),
                date_added: ActiveValue::Set(now),
                date_updated: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;
            payment_from_model(model)
        })
    }

    /// Update a payment. Its two transactions are replaced by fresh ones
    /// reflecting the new accounts, date and amount.
    pub async fn update_payment(
        &self,
        id: i64,
        input: PaymentInput,
        owner: &str,
    ) -> ResultEngine<Payment> {
        ensure_positive(input.amount)?;
        validate_transaction_date(input.transaction_date)?;
        let destination = normalize_account_name_owner(&input.destination_account)?;

        with_tx!(self, |db_tx| {
            let existing = self.require_payment(&db_tx, id, owner).await?;
            let source = match input.source_account.as_deref() {
                Some(name) => normalize_account_name_owner(name)?,
                None => existing.source_account.clone(),
            };
            ensure_distinct(&source, &destination)?;

            self.remove_legs(
                &db_tx,
                &[existing.guid_source.as_str(), existing.guid_destination.as_str()],
                owner,
            )
            .await?;
            let (guid_source, guid_destination, source, destination) = self
                .book_payment(
                    &db_tx,
                    &source,
                    &destination,
                    input.transaction_date,
                    input.amount,
                    owner,
                )
                .await?;

            let mut active: payments::ActiveModel = existing.into();
            active.source_account = ActiveValue::Set(source);
            active.destination_account = ActiveValue::Set(destination);
            active.transaction_date = ActiveValue::Set(input.transaction_date);
            active.amount = ActiveValue::Set(input.amount.cents());
            active.guid_source = ActiveValue::Set(guid_source.to_string());
            active.guid_destination = ActiveValue::Set(guid_destination.to_string());
            if let Some(status) = input.active_status {
                active.active_status = ActiveValue::Set(status);
            }
            active.date_updated = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            payment_from_model(model)
        })
    }

    /// Delete the payment record. Its transactions stay on the accounts.
    pub async fn delete_payment(&self, id: i64, owner: &str) -> ResultEngine<Payment> {
        with_tx!(self, |db_tx| {
            let existing = self.require_payment(&db_tx, id, owner).await?;
            payments::Entity::delete_by_id(existing.payment_id)
                .exec(&db_tx)
                .await?;
            payment_from_model(existing)
        })
    }

    async fn payment_source<C: ConnectionTrait>(
        &self,
        db: &C,
        source: Option<&str>,
        owner: &str,
    ) -> ResultEngine<String> {
        if let Some(name) = source.map(str::trim).filter(|name| !name.is_empty()) {
            return normalize_account_name_owner(name);
        }
        let parameter = self
            .find_parameter(db, PAYMENT_ACCOUNT, owner)
            .await?
            .ok_or_else(|| {
                EngineError::InvalidValue(format!(
                    "no source account given and parameter {PAYMENT_ACCOUNT} is not set"
                ))
            })?;
        normalize_account_name_owner(&parameter.parameter_value)
    }

    async fn book_payment<C: ConnectionTrait>(
        &self,
        db: &C,
        source: &str,
        destination: &str,
        transaction_date: NaiveDate,
        amount: Amount,
        owner: &str,
    ) -> ResultEngine<(Uuid, Uuid, String, String)> {
        let source = self.require_account_by_name(db, source, owner).await?;
        let destination = self.require_account_by_name(db, destination, owner).await?;
        ensure_debit(&source, "source")?;

        let pair = LegPair {
            source: &source,
            destination: &destination,
            transaction_date,
            source_amount: -amount,
            destination_amount: destination_amount(&destination, amount),
            category: PAYMENT_CATEGORY,
            description: PAYMENT_DESCRIPTION,
            transaction_type: TransactionType::Undefined,
        };
        let (guid_source, guid_destination) = self.insert_leg_pair(db, &pair, owner).await?;
        Ok((
            guid_source,
            guid_destination,
            source.account_name_owner.clone(),
            destination.account_name_owner.clone(),
        ))
    }

    /// Insert both legs and return their guids (source, destination).
    pub(super) async fn insert_leg_pair<C: ConnectionTrait>(
        &self,
        db: &C,
        pair: &LegPair<'_>,
        owner: &str,
    ) -> ResultEngine<(Uuid, Uuid)> {
        let source_leg = leg_input(
            pair.source,
            pair,
            pair.source_amount,
            format!("to {}", pair.destination.account_name_owner),
        )?;
        let destination_leg = leg_input(
            pair.destination,
            pair,
            pair.destination_amount,
            format!("from {}", pair.source.account_name_owner),
        )?;

        let source = self.insert_transaction_in(db, source_leg, owner).await?;
        let destination = self.insert_transaction_in(db, destination_leg, owner).await?;
        Ok((
            parse_uuid(&source.guid, "transaction")?,
            parse_uuid(&destination.guid, "transaction")?,
        ))
    }

    /// Delete leg transactions that still exist.
    pub(super) async fn remove_legs<C: ConnectionTrait>(
        &self,
        db: &C,
        guids: &[&str],
        owner: &str,
    ) -> ResultEngine<()> {
        for guid in guids {
            let leg = transactions::Entity::find()
                .filter(transactions::Column::Owner.eq(owner))
                .filter(transactions::Column::Guid.eq(*guid))
                .one(db)
                .await?;
            if let Some(leg) = leg {
                self.delete_transaction_in(db, &leg).await?;
            }
        }
        Ok(())
    }

    async fn require_payment<C: ConnectionTrait>(
        &self,
        db: &C,
        id: i64,
        owner: &str,
    ) -> ResultEngine<payments::Model> {
        payments::Entity::find_by_id(id)
            .filter(payments::Column::Owner.eq(owner))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("payment {id}")))
    }
}
