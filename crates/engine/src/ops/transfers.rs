use api_types::{
    Amount, TransactionType,
    transfer::{Transfer, TransferInput},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, ResultEngine, transfers,
    util::{normalize_account_name_owner, parse_uuid, validate_transaction_date},
};

use super::{
    Engine,
    payments::{LegPair, ensure_debit, ensure_distinct, ensure_positive},
    with_tx,
};

const TRANSFER_LABEL: &str = "transfer";

fn transfer_from_model(model: transfers::Model) -> ResultEngine<Transfer> {
    Ok(Transfer {
        transfer_id: model.transfer_id,
        source_account: model.source_account,
        destination_account: model.destination_account,
        transaction_date: model.transaction_date,
        amount: Amount::new(model.amount),
        guid_source: parse_uuid(&model.guid_source, "transaction")?,
        guid_destination: parse_uuid(&model.guid_destination, "transaction")?,
        active_status: model.active_status,
    })
}

struct TransferTarget {
    source: String,
    destination: String,
}

fn validate_transfer(input: &TransferInput) -> ResultEngine<TransferTarget> {
    ensure_positive(input.amount)?;
    validate_transaction_date(input.transaction_date)?;
    let source = normalize_account_name_owner(&input.source_account)?;
    let destination = normalize_account_name_owner(&input.destination_account)?;
    ensure_distinct(&source, &destination)?;
    Ok(TransferTarget {
        source,
        destination,
    })
}

impl Engine {
    pub async fn transfers_active(&self, owner: &str) -> ResultEngine<Vec<Transfer>> {
        let models = transfers::Entity::find()
            .filter(transfers::Column::Owner.eq(owner))
            .filter(transfers::Column::ActiveStatus.eq(true))
            .order_by_desc(transfers::Column::TransactionDate)
            .order_by_desc(transfers::Column::TransferId)
            .all(&self.database)
            .await?;
        models.into_iter().map(transfer_from_model).collect()
    }

    pub async fn transfer(&self, id: i64, owner: &str) -> ResultEngine<Transfer> {
        let model = self.require_transfer(&self.database, id, owner).await?;
        transfer_from_model(model)
    }

    /// Move `amount` between two debit accounts: `-amount` on the source,
    /// `+amount` on the destination.
    pub async fn insert_transfer(
        &self,
        input: TransferInput,
        owner: &str,
    ) -> ResultEngine<Transfer> {
        let target = validate_transfer(&input)?;
        with_tx!(self, |db_tx| {
            let (guid_source, guid_destination) = self
                .book_transfer(&db_tx, &target, input.transaction_date, input.amount, owner)
                .await?;

            let now = Utc::now();
            let model = transfers::ActiveModel {
                owner: ActiveValue::Set(owner.to_string()),
                source_account: ActiveValue::Set(target.source),
                destination_account: ActiveValue::Set(target.destination),
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
            transfer_from_model(model)
        })
    }

    pub async fn update_transfer(
        &self,
        id: i64,
        input: TransferInput,
        owner: &str,
    ) -> ResultEngine<Transfer> {
        let target = validate_transfer(&input)?;
        with_tx!(self, |db_tx| {
            let existing = self.require_transfer(&db_tx, id, owner).await?;
            self.remove_legs(
                &db_tx,
                &[existing.guid_source.as_str(), existing.guid_destination.as_str()],
                owner,
            )
            .await?;
            let (guid_source, guid_destination) = self
                .book_transfer(&db_tx, &target, input.transaction_date, input.amount, owner)
                .await?;

            let mut active: transfers::ActiveModel = existing.into();
            active.source_account = ActiveValue::Set(target.source);
            active.destination_account = ActiveValue::Set(target.destination);
            active.transaction_date = ActiveValue::Set(input.transaction_date);
            active.amount = ActiveValue::Set(input.amount.cents());
            active.guid_source = ActiveValue::Set(guid_source.to_string());
            active.guid_destination = ActiveValue::Set(guid_destination.to_string());
            if let Some(status) = input.active_status {
                active.active_status = ActiveValue::Set(status);
            }
            active.date_updated = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            transfer_from_model(model)
        })
    }

    /// Delete the transfer record. Its transactions stay on the accounts.
    pub async fn delete_transfer(&self, id: i64, owner: &str) -> ResultEngine<Transfer> {
        with_tx!(self, |db_tx| {
            let existing = self.require_transfer(&db_tx, id, owner).await?;
            transfers::Entity::delete_by_id(existing.transfer_id)
                .exec(&db_tx)
                .await?;
            transfer_from_model(existing)
        })
    }

    async fn book_transfer<C: ConnectionTrait>(
        &self,
        db: &C,
        target: &TransferTarget,
        transaction_date: NaiveDate,
        amount: Amount,
        owner: &str,
    ) -> ResultEngine<(Uuid, Uuid)> {
        let source = self
            .require_account_by_name(db, &target.source, owner)
            .await?;
        let destination = self
            .require_account_by_name(db, &target.destination, owner)
            .await?;
        ensure_debit(&source, "source")?;
        ensure_debit(&destination, "destination")?;

        let pair = LegPair {
            source: &source,
            destination: &destination,
            transaction_date,
            source_amount: -amount,
            destination_amount: amount,
            category: TRANSFER_LABEL,
            description: TRANSFER_LABEL,
            transaction_type: TransactionType::Transfer,
        };
        self.insert_leg_pair(db, &pair, owner).await
    }

    async fn require_transfer<C: ConnectionTrait>(
        &self,
        db: &C,
        id: i64,
        owner: &str,
    ) -> ResultEngine<transfers::Model> {
        transfers::Entity::find_by_id(id)
            .filter(transfers::Column::Owner.eq(owner))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("transfer {id}")))
    }
}
