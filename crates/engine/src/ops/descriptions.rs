use api_types::description::{Description, DescriptionInput};
use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{EngineError, ResultEngine, descriptions, transactions, util::normalize_name};

use super::{Engine, categories::retag_transactions, with_tx};

fn normalize_description(value: &str) -> ResultEngine<String> {
    normalize_name(value, "description")
}

impl Engine {
    pub async fn descriptions_active(&self, owner: &str) -> ResultEngine<Vec<Description>> {
        let models = descriptions::Entity::find()
            .filter(descriptions::Column::Owner.eq(owner))
            .filter(descriptions::Column::ActiveStatus.eq(true))
            .order_by_asc(descriptions::Column::DescriptionName)
            .all(&self.database)
            .await?;

        let mut result = Vec::with_capacity(models.len());
        for model in models {
            result.push(self.description_view(&self.database, model, owner).await?);
        }
        Ok(result)
    }

    pub async fn description(&self, name: &str, owner: &str) -> ResultEngine<Description> {
        let model = self
            .require_description(&self.database, &normalize_description(name)?, owner)
            .await?;
        self.description_view(&self.database, model, owner).await
    }

    pub async fn insert_description(
        &self,
        input: DescriptionInput,
        owner: &str,
    ) -> ResultEngine<Description> {
        let name = normalize_description(&input.description_name)?;
        with_tx!(self, |db_tx| {
            if self.find_description(&db_tx, &name, owner).await?.is_some() {
                return Err(EngineError::ExistingKey(name));
            }
            let now = Utc::now();
            let model = descriptions::ActiveModel {
                owner: ActiveValue::Set(owner.to_string()),
                description_name: ActiveValue::Set(name),
                active_status: ActiveValue::Set(input.active_status.unwrap_or(true)),
                date_added: ActiveValue::Set(now),
                date_updated: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;
            self.description_view(&db_tx, model, owner).await
        })
    }

    pub async fn update_description(
        &self,
        name: &str,
        input: DescriptionInput,
        owner: &str,
    ) -> ResultEngine<Description> {
        let name = normalize_description(name)?;
        let new_name = normalize_description(&input.description_name)?;
        with_tx!(self, |db_tx| {
            let existing = self.require_description(&db_tx, &name, owner).await?;
            let mut active: descriptions::ActiveModel = existing.into();

            if new_name != name {
                if self
                    .find_description(&db_tx, &new_name, owner)
                    .await?
                    .is_some()
                {
                    return Err(EngineError::ExistingKey(new_name));
                }
                retag_transactions(
                    &db_tx,
                    transactions::Column::Description,
                    &name,
                    &new_name,
                    owner,
                )
                .await?;
                active.description_name = ActiveValue::Set(new_name);
            }
            if let Some(status) = input.active_status {
                active.active_status = ActiveValue::Set(status);
            }
            active.date_updated = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            self.description_view(&db_tx, model, owner).await
        })
    }

    pub async fn delete_description(&self, name: &str, owner: &str) -> ResultEngine<Description> {
        let name = normalize_description(name)?;
        with_tx!(self, |db_tx| {
            let existing = self.require_description(&db_tx, &name, owner).await?;
            let view = self.description_view(&db_tx, existing, owner).await?;
            if view.description_count > 0 {
                return Err(EngineError::ExistingKey(format!(
                    "description {name} is used by {} transactions",
                    view.description_count
                )));
            }
            descriptions::Entity::delete_by_id(view.description_id)
                .exec(&db_tx)
                .await?;
            Ok(view)
        })
    }

    pub async fn merge_descriptions(
        &self,
        old: &str,
        new: &str,
        owner: &str,
    ) -> ResultEngine<Description> {
        let old = normalize_description(old)?;
        let new = normalize_description(new)?;
        if old == new {
            return Err(EngineError::InvalidValue(
                "cannot merge a description into itself".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let source = self.require_description(&db_tx, &old, owner).await?;
            let target = self.require_description(&db_tx, &new, owner).await?;
            retag_transactions(
                &db_tx,
                transactions::Column::Description,
                &old,
                &new,
                owner,
            )
            .await?;
            descriptions::Entity::delete_by_id(source.description_id)
                .exec(&db_tx)
                .await?;
            self.description_view(&db_tx, target, owner).await
        })
    }

    async fn find_description<C: ConnectionTrait>(
        &self,
        db: &C,
        name: &str,
        owner: &str,
    ) -> ResultEngine<Option<descriptions::Model>> {
        descriptions::Entity::find()
            .filter(descriptions::Column::Owner.eq(owner))
            .filter(descriptions::Column::DescriptionName.eq(name))
            .one(db)
            .await
            .map_err(Into::into)
    }

    async fn require_description<C: ConnectionTrait>(
        &self,
        db: &C,
        name: &str,
        owner: &str,
    ) -> ResultEngine<descriptions::Model> {
        self.find_description(db, name, owner)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(name.to_string()))
    }

    async fn description_view<C: ConnectionTrait>(
        &self,
        db: &C,
        model: descriptions::Model,
        owner: &str,
    ) -> ResultEngine<Description> {
        let description_count = self
            .count_active_transactions(
                db,
                transactions::Column::Description,
                &model.description_name,
                owner,
            )
            .await?;
        Ok(Description {
            description_id: model.description_id,
            description_name: model.description_name,
            active_status: model.active_status,
            description_count,
        })
    }
}
