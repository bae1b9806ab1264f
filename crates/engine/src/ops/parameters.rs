use api_types::parameter::{Parameter, ParameterInput};
use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{EngineError, ResultEngine, parameters, util::normalize_name};

use super::{Engine, with_tx};

/// Parameter naming the default source account of payments.
pub(super) const PAYMENT_ACCOUNT: &str = "payment_account";

fn parameter_from_model(model: parameters::Model) -> Parameter {
    Parameter {
        parameter_id: model.parameter_id,
        parameter_name: model.parameter_name,
        parameter_value: model.parameter_value,
        active_status: model.active_status,
    }
}

fn normalize_value(value: &str) -> ResultEngine<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(EngineError::InvalidValue(
            "parameter value must not be empty".to_string(),
        ));
    }
    Ok(value.to_string())
}

impl Engine {
    pub async fn parameters_active(&self, owner: &str) -> ResultEngine<Vec<Parameter>> {
        let models = parameters::Entity::find()
            .filter(parameters::Column::Owner.eq(owner))
            .filter(parameters::Column::ActiveStatus.eq(true))
            .order_by_asc(parameters::Column::ParameterName)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(parameter_from_model).collect())
    }

    pub async fn parameter(&self, name: &str, owner: &str) -> ResultEngine<Parameter> {
        let name = normalize_name(name, "parameter")?;
        self.find_parameter(&self.database, &name, owner)
            .await?
            .map(parameter_from_model)
            .ok_or(EngineError::KeyNotFound(name))
    }

    pub async fn insert_parameter(
        &self,
        input: ParameterInput,
        owner: &str,
    ) -> ResultEngine<Parameter> {
        let name = normalize_name(&input.parameter_name, "parameter")?;
        let value = normalize_value(&input.parameter_value)?;
        with_tx!(self, |db_tx| {
            if self.find_parameter(&db_tx, &name, owner).await?.is_some() {
                return Err(EngineError::ExistingKey(name));
            }
            let now = Utc::now();
            let model = parameters::ActiveModel {
                owner: ActiveValue::Set(owner.to_string()),
                parameter_name: ActiveValue::Set(name),
                parameter_value: ActiveValue::Set(value),
                active_status: ActiveValue::Set(input.active_status.unwrap_or(true)),
                date_added: ActiveValue::Set(now),
                date_updated: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;
            Ok(parameter_from_model(model))
        })
    }

    pub async fn update_parameter(
        &self,
        name: &str,
        input: ParameterInput,
        owner: &str,
    ) -> ResultEngine<Parameter> {
        let name = normalize_name(name, "parameter")?;
        let new_name = normalize_name(&input.parameter_name, "parameter")?;
        let value = normalize_value(&input.parameter_value)?;
        with_tx!(self, |db_tx| {
            let existing = self
                .find_parameter(&db_tx, &name, owner)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(name.clone()))?;
            if new_name != name && self.find_parameter(&db_tx, &new_name, owner).await?.is_some() {
                return Err(EngineError::ExistingKey(new_name));
            }

            let mut active: parameters::ActiveModel = existing.into();
            active.parameter_name = ActiveValue::Set(new_name);
            active.parameter_value = ActiveValue::Set(value);
            if let Some(status) = input.active_status {
                active.active_status = ActiveValue::Set(status);
            }
            active.date_updated = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            Ok(parameter_from_model(model))
        })
    }

    pub async fn delete_parameter(&self, name: &str, owner: &str) -> ResultEngine<Parameter> {
        let name = normalize_name(name, "parameter")?;
        with_tx!(self, |db_tx| {
            let existing = self
                .find_parameter(&db_tx, &name, owner)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(name.clone()))?;
            parameters::Entity::delete_by_id(existing.parameter_id)
                .exec(&db_tx)
                .await?;
            Ok(parameter_from_model(existing))
        })
    }

    pub(super) async fn find_parameter<C: ConnectionTrait>(
        &self,
        db: &C,
        name: &str,
        owner: &str,
    ) -> ResultEngine<Option<parameters::Model>> {
        parameters::Entity::find()
            .filter(parameters::Column::Owner.eq(owner))
            .filter(parameters::Column::ParameterName.eq(name))
            .filter(parameters::Column::ActiveStatus.eq(true))
            .one(db)
            .await
            .map_err(Into::into)
    }
}
