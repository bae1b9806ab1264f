use api_types::category::{Category, CategoryInput};
use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{EngineError, ResultEngine, categories, transactions, util::normalize_category_name};

use super::{Engine, with_tx};

impl Engine {
    /// Active categories with their usage count, ordered by name.
    pub async fn categories_active(&self, owner: &str) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .filter(categories::Column::Owner.eq(owner))
            .filter(categories::Column::ActiveStatus.eq(true))
            .order_by_asc(categories::Column::CategoryName)
            .all(&self.database)
            .await?;

        let mut result = Vec::with_capacity(models.len());
        for model in models {
            result.push(self.category_view(&self.database, model, owner).await?);
        }
        Ok(result)
    }

    pub async fn category(&self, name: &str, owner: &str) -> ResultEngine<Category> {
        let model = self
            .require_category(&self.database, &normalize_category_name(name)?, owner)
            .await?;
        self.category_view(&self.database, model, owner).await
    }

    pub async fn insert_category(
        &self,
        input: CategoryInput,
        owner: &str,
    ) -> ResultEngine<Category> {
        let name = normalize_category_name(&input.category_name)?;
        with_tx!(self, |db_tx| {
            if self.find_category(&db_tx, &name, owner).await?.is_some() {
                return Err(EngineError::ExistingKey(name));
            }
            let now = Utc::now();
            let model = categories::ActiveModel {
                owner: ActiveValue::Set(owner.to_string()),
                category_name: ActiveValue::Set(name),
                active_status: ActiveValue::Set(input.active_status.unwrap_or(true)),
                date_added: ActiveValue::Set(now),
                date_updated: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;
            self.category_view(&db_tx, model, owner).await
        })
    }

    /// Update the status of a category; a new name renames it and every
    /// transaction using it.
    pub async fn update_category(
        &self,
        name: &str,
        input: CategoryInput,
        owner: &str,
    ) -> ResultEngine<Category> {
        let name = normalize_category_name(name)?;
        let new_name = normalize_category_name(&input.category_name)?;
        with_tx!(self, |db_tx| {
            let existing = self.require_category(&db_tx, &name, owner).await?;
            let mut active: categories::ActiveModel = existing.into();

            if new_name != name {
                if self.find_category(&db_tx, &new_name, owner).await?.is_some() {
                    return Err(EngineError::ExistingKey(new_name));
                }
                retag_transactions(&db_tx, transactions::Column::Category, &name, &new_name, owner)
                    .await?;
                active.category_name = ActiveValue::Set(new_name);
            }
            if let Some(status) = input.active_status {
                active.active_status = ActiveValue::Set(status);
            }
            active.date_updated = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            self.category_view(&db_tx, model, owner).await
        })
    }

    /// Delete an unused category. Returns the deleted category.
    pub async fn delete_category(&self, name: &str, owner: &str) -> ResultEngine<Category> {
        let name = normalize_category_name(name)?;
        with_tx!(self, |db_tx| {
            let existing = self.require_category(&db_tx, &name, owner).await?;
            let view = self.category_view(&db_tx, existing, owner).await?;
            if view.category_count > 0 {
                return Err(EngineError::ExistingKey(format!(
                    "category {name} is used by {} transactions",
                    view.category_count
                )));
            }
            categories::Entity::delete_by_id(view.category_id)
                .exec(&db_tx)
                .await?;
            Ok(view)
        })
    }

    /// Move every transaction from `old` to `new` and drop `old`.
    pub async fn merge_categories(
        &self,
        old: &str,
        new: &str,
        owner: &str,
    ) -> ResultEngine<Category> {
        let old = normalize_category_name(old)?;
        let new = normalize_category_name(new)?;
        if old == new {
            return Err(EngineError::InvalidValue(
                "cannot merge a category into itself".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let source = self.require_category(&db_tx, &old, owner).await?;
            let target = self.require_category(&db_tx, &new, owner).await?;
            retag_transactions(&db_tx, transactions::Column::Category, &old, &new, owner).await?;
            categories::Entity::delete_by_id(source.category_id)
                .exec(&db_tx)
                .await?;
            self.category_view(&db_tx, target, owner).await
        })
    }

    async fn find_category<C: ConnectionTrait>(
        &self,
        db: &C,
        name: &str,
        owner: &str,
    ) -> ResultEngine<Option<categories::Model>> {
        categories::Entity::find()
            .filter(categories::Column::Owner.eq(owner))
            .filter(categories::Column::CategoryName.eq(name))
            .one(db)
            .await
            .map_err(Into::into)
    }

    async fn require_category<C: ConnectionTrait>(
        &self,
        db: &C,
        name: &str,
        owner: &str,
    ) -> ResultEngine<categories::Model> {
        self.find_category(db, name, owner)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(name.to_string()))
    }

    async fn category_view<C: ConnectionTrait>(
        &self,
        db: &C,
        model: categories::Model,
        owner: &str,
    ) -> ResultEngine<Category> {
        let category_count = self
            .count_active_transactions(
                db,
                transactions::Column::Category,
                &model.category_name,
                owner,
            )
            .await?;
        Ok(Category {
            category_id: model.category_id,
            category_name: model.category_name,
            active_status: model.active_status,
            category_count,
        })
    }
}

/// Rewrite a name-valued transaction column from `old` to `new`.
pub(super) async fn retag_transactions<C: ConnectionTrait>(
    db: &C,
    column: transactions::Column,
    old: &str,
    new: &str,
    owner: &str,
) -> ResultEngine<u64> {
    let result = transactions::Entity::update_many()
        .col_expr(column, Expr::value(new.to_string()))
        .col_expr(transactions::Column::DateUpdated, Expr::value(Utc::now()))
        .filter(transactions::Column::Owner.eq(owner))
        .filter(column.eq(old))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
