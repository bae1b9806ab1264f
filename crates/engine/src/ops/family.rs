use api_types::{
    FamilyRelationship,
    family::{FamilyMember, FamilyMemberInput},
};
use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{EngineError, ResultEngine, family_members, util::validate_ssn_last_four};

use super::{Engine, normalize_optional_text, with_tx};

fn member_from_model(model: family_members::Model) -> ResultEngine<FamilyMember> {
    Ok(FamilyMember {
        family_member_id: model.family_member_id,
        owner: model.owner,
        member_name: model.member_name,
        relationship: model.relationship.parse()?,
        date_of_birth: model.date_of_birth,
        insurance_member_id: model.insurance_member_id,
        ssn_last_four: model.ssn_last_four,
        medical_record_number: model.medical_record_number,
        active_status: model.active_status,
    })
}

fn members_from_models(models: Vec<family_members::Model>) -> ResultEngine<Vec<FamilyMember>> {
    models.into_iter().map(member_from_model).collect()
}

struct MemberFields {
    member_name: String,
    insurance_member_id: Option<String>,
    ssn_last_four: Option<String>,
    medical_record_number: Option<String>,
}

fn validate_member(input: &FamilyMemberInput) -> ResultEngine<MemberFields> {
    let member_name = input.member_name.trim();
    if member_name.is_empty() {
        return Err(EngineError::InvalidValue(
            "member name must not be empty".to_string(),
        ));
    }
    let ssn_last_four = normalize_optional_text(input.ssn_last_four.as_deref());
    if let Some(ssn) = ssn_last_four.as_deref() {
        validate_ssn_last_four(ssn)?;
    }
    Ok(MemberFields {
        member_name: member_name.to_string(),
        insurance_member_id: normalize_optional_text(input.insurance_member_id.as_deref()),
        ssn_last_four,
        medical_record_number: normalize_optional_text(input.medical_record_number.as_deref()),
    })
}

/// Callers may only address their own family.
fn ensure_same_owner(path_owner: &str, owner: &str) -> ResultEngine<()> {
    if path_owner != owner {
        return Err(EngineError::Forbidden(format!(
            "cannot access family members of {path_owner}"
        )));
    }
    Ok(())
}

impl Engine {
    pub async fn family_members(&self, owner: &str) -> ResultEngine<Vec<FamilyMember>> {
        let models = family_members::Entity::find()
            .filter(family_members::Column::Owner.eq(owner))
            .filter(family_members::Column::ActiveStatus.eq(true))
            .order_by_asc(family_members::Column::MemberName)
            .all(&self.database)
            .await?;
        members_from_models(models)
    }

    pub async fn family_member(&self, id: i64, owner: &str) -> ResultEngine<FamilyMember> {
        let model = self.require_family_member(&self.database, id, owner).await?;
        member_from_model(model)
    }

    pub async fn family_members_by_owner(
        &self,
        path_owner: &str,
        owner: &str,
    ) -> ResultEngine<Vec<FamilyMember>> {
        ensure_same_owner(path_owner, owner)?;
        self.family_members(owner).await
    }

    pub async fn family_members_by_relationship(
        &self,
        path_owner: &str,
        relationship: FamilyRelationship,
        owner: &str,
    ) -> ResultEngine<Vec<FamilyMember>> {
        ensure_same_owner(path_owner, owner)?;
        let models = family_members::Entity::find()
            .filter(family_members::Column::Owner.eq(owner))
            .filter(family_members::Column::ActiveStatus.eq(true))
            .filter(family_members::Column::Relationship.eq(relationship.as_str()))
            .order_by_asc(family_members::Column::MemberName)
            .all(&self.database)
            .await?;
        members_from_models(models)
    }

    pub async fn insert_family_member(
        &self,
        input: FamilyMemberInput,
        owner: &str,
    ) -> ResultEngine<FamilyMember> {
        let fields = validate_member(&input)?;
        with_tx!(self, |db_tx| {
            self.ensure_member_name_free(&db_tx, &fields.member_name, None, owner)
                .await?;
            let now = Utc::now();
            let model = family_members::ActiveModel {
                owner: ActiveValue::Set(owner.to_string()),
                member_name: ActiveValue::Set(fields.member_name),
                relationship: ActiveValue::Set(input.relationship.as_str().to_string()),
                date_of_birth: ActiveValue::Set(input.date_of_birth),
                insurance_member_id: ActiveValue::Set(fields.insurance_member_id),
                ssn_last_four: ActiveValue::Set(fields.ssn_last_four),
                medical_record_number: ActiveValue::Set(fields.medical_record_number),
                active_status: ActiveValue::Set(input.active_status.unwrap_or(true)),
                date_added: ActiveValue::Set(now),
                date_updated: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;
            member_from_model(model)
        })
    }

    pub async fn update_family_member(
        &self,
        id: i64,
        input: FamilyMemberInput,
        owner: &str,
    ) -> ResultEngine<FamilyMember> {
        let fields = validate_member(&input)?;
        with_tx!(self, |db_tx| {
            let existing = self.require_family_member(&db_tx, id, owner).await?;
            self.ensure_member_name_free(&db_tx, &fields.member_name, Some(id), owner)
                .await?;
            let mut active: family_members::ActiveModel = existing.into();
            active.member_name = ActiveValue::Set(fields.member_name);
            active.relationship = ActiveValue::Set(input.relationship.as_str().to_string());
            active.date_of_birth = ActiveValue::Set(input.date_of_birth);
            active.insurance_member_id = ActiveValue::Set(fields.insurance_member_id);
            active.ssn_last_four = ActiveValue::Set(fields.ssn_last_four);
            active.medical_record_number = ActiveValue::Set(fields.medical_record_number);
            if let Some(status) = input.active_status {
                active.active_status = ActiveValue::Set(status);
            }
            active.date_updated = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            member_from_model(model)
        })
    }

    pub async fn set_family_member_active(
        &self,
        id: i64,
        active_status: bool,
        owner: &str,
    ) -> ResultEngine<FamilyMember> {
        with_tx!(self, |db_tx| {
            let existing = self.require_family_member(&db_tx, id, owner).await?;
            let mut active: family_members::ActiveModel = existing.into();
            active.active_status = ActiveValue::Set(active_status);
            active.date_updated = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            member_from_model(model)
        })
    }

    /// Delete a family member. Expenses attributed to them are kept and
    /// lose the attribution.
    pub async fn delete_family_member(&self, id: i64, owner: &str) -> ResultEngine<FamilyMember> {
        with_tx!(self, |db_tx| {
            let existing = self.require_family_member(&db_tx, id, owner).await?;
            self.unlink_family_member(&db_tx, id).await?;
            family_members::Entity::delete_by_id(existing.family_member_id)
                .exec(&db_tx)
                .await?;
            member_from_model(existing)
        })
    }

    pub(super) async fn require_family_member<C: ConnectionTrait>(
        &self,
        db: &C,
        id: i64,
        owner: &str,
    ) -> ResultEngine<family_members::Model> {
        family_members::Entity::find_by_id(id)
            .filter(family_members::Column::Owner.eq(owner))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("family member {id}")))
    }

    async fn ensure_member_name_free<C: ConnectionTrait>(
        &self,
        db: &C,
        member_name: &str,
        except: Option<i64>,
        owner: &str,
    ) -> ResultEngine<()> {
        let mut query = family_members::Entity::find()
            .filter(family_members::Column::Owner.eq(owner))
            .filter(family_members::Column::MemberName.eq(member_name));
        if let Some(id) = except {
            query = query.filter(family_members::Column::FamilyMemberId.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(member_name.to_string()));
        }
        Ok(())
    }
}
