//! Medical expenses.
//!
//! The billed amount of an expense is split into insurance discount,
//! insurance payment and patient responsibility; what the patient has paid
//! so far can never exceed their responsibility.

use api_types::{
    Amount, ClaimStatus, DateRangeQuery,
    medical::{ClaimStatusCount, MedicalExpense, MedicalExpenseInput, MedicalTotals},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
    prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, ResultEngine, medical_expenses, transactions, util::validate_date_range,
};

use super::{Engine, normalize_optional_text, with_tx};

const ALL_CLAIM_STATUSES: [ClaimStatus; 6] = [
    ClaimStatus::Submitted,
    ClaimStatus::Processing,
    ClaimStatus::Approved,
    ClaimStatus::Denied,
    ClaimStatus::Paid,
    ClaimStatus::Closed,
];

const OPEN_CLAIM_STATUSES: [ClaimStatus; 3] = [
    ClaimStatus::Submitted,
    ClaimStatus::Processing,
    ClaimStatus::Approved,
];

fn expense_from_model(model: medical_expenses::Model) -> ResultEngine<MedicalExpense> {
    Ok(MedicalExpense {
        medical_expense_id: model.medical_expense_id,
        transaction_id: model.transaction_id,
        provider_id: model.provider_id,
        family_member_id: model.family_member_id,
        service_date: model.service_date,
        service_description: model.service_description,
        procedure_code: model.procedure_code,
        diagnosis_code: model.diagnosis_code,
        billed_amount: Amount::new(model.billed_amount),
        insurance_discount: Amount::new(model.insurance_discount),
        insurance_paid: Amount::new(model.insurance_paid),
        patient_responsibility: Amount::new(model.patient_responsibility),
        paid_amount: Amount::new(model.paid_amount),
        paid_date: model.paid_date,
        is_out_of_network: model.is_out_of_network,
        claim_number: model.claim_number,
        claim_status: model.claim_status.parse()?,
        active_status: model.active_status,
    })
}

/// Check the billing breakdown of an expense.
fn validate_amounts(input: &MedicalExpenseInput) -> ResultEngine<()> {
    let amounts = [
        ("billedAmount", input.billed_amount),
        ("insuranceDiscount", input.insurance_discount),
        ("insurancePaid", input.insurance_paid),
        ("patientResponsibility", input.patient_responsibility),
        ("paidAmount", input.paid_amount),
    ];
    if let Some((label, amount)) = amounts.iter().find(|(_, amount)| amount.is_negative()) {
        return Err(EngineError::InvalidValue(format!(
            "{label} must not be negative: {amount}"
        )));
    }

    let allocated = Amount::try_sum([
        input.insurance_discount,
        input.insurance_paid,
        input.patient_responsibility,
    ])?;
    if allocated > input.billed_amount {
        return Err(EngineError::InvalidValue(format!(
            "discount, insurance paid and patient responsibility ({allocated}) exceed billed amount ({})",
            input.billed_amount
        )));
    }
    if input.paid_amount > input.patient_responsibility {
        return Err(EngineError::InvalidValue(format!(
            "paid amount ({}) exceeds patient responsibility ({})",
            input.paid_amount, input.patient_responsibility
        )));
    }
    Ok(())
}

/// Procedure and diagnosis codes are stored upper case.
fn normalize_code(value: Option<&str>) -> Option<String> {
    normalize_optional_text(value).map(|code| code.to_uppercase())
}

fn year_bounds(year: i32) -> ResultEngine<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let end = NaiveDate::from_ymd_opt(year, 12, 31);
    start
        .zip(end)
        .ok_or_else(|| EngineError::InvalidValue(format!("invalid year: {year}")))
}

impl Engine {
    pub async fn medical_expenses(&self, owner: &str) -> ResultEngine<Vec<MedicalExpense>> {
        self.list_expenses(self.expenses_of(owner)).await
    }

    pub async fn medical_expense(&self, id: i64, owner: &str) -> ResultEngine<MedicalExpense> {
        let model = self.require_expense(&self.database, id, owner).await?;
        expense_from_model(model)
    }

    pub async fn medical_expense_by_transaction(
        &self,
        transaction_id: i64,
        owner: &str,
    ) -> ResultEngine<MedicalExpense> {
        let model = medical_expenses::Entity::find()
            .filter(medical_expenses::Column::Owner.eq(owner))
            .filter(medical_expenses::Column::TransactionId.eq(transaction_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| {
                EngineError::KeyNotFound(format!("medical expense for transaction {transaction_id}"))
            })?;
        expense_from_model(model)
    }

    /// Expenses linked to transactions of one account, optionally limited
    /// to a service date range.
    pub async fn medical_expenses_by_account(
        &self,
        account_id: i64,
        range: Option<DateRangeQuery>,
        owner: &str,
    ) -> ResultEngine<Vec<MedicalExpense>> {
        let account = self
            .require_account_by_id(&self.database, account_id, owner)
            .await?;
        let transaction_ids: Vec<i64> = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::TransactionId)
            .filter(transactions::Column::AccountId.eq(account.account_id))
            .into_tuple()
            .all(&self.database)
            .await?;

        let query = self
            .expenses_of(owner)
            .filter(medical_expenses::Column::TransactionId.is_in(transaction_ids));
        self.list_expenses(with_range(query, range)?).await
    }

    pub async fn medical_expenses_by_provider(
        &self,
        provider_id: i64,
        owner: &str,
    ) -> ResultEngine<Vec<MedicalExpense>> {
        let query = self
            .expenses_of(owner)
            .filter(medical_expenses::Column::ProviderId.eq(provider_id));
        self.list_expenses(query).await
    }

    pub async fn medical_expenses_by_family_member(
        &self,
        family_member_id: i64,
        range: Option<DateRangeQuery>,
        owner: &str,
    ) -> ResultEngine<Vec<MedicalExpense>> {
        self.require_family_member(&self.database, family_member_id, owner)
            .await?;
        let query = self
            .expenses_of(owner)
            .filter(medical_expenses::Column::FamilyMemberId.eq(family_member_id));
        self.list_expenses(with_range(query, range)?).await
    }

    pub async fn medical_expenses_by_claim_status(
        &self,
        status: ClaimStatus,
        owner: &str,
    ) -> ResultEngine<Vec<MedicalExpense>> {
        let query = self
            .expenses_of(owner)
            .filter(medical_expenses::Column::ClaimStatus.eq(status.as_str()));
        self.list_expenses(query).await
    }

    pub async fn medical_expenses_out_of_network(
        &self,
        owner: &str,
    ) -> ResultEngine<Vec<MedicalExpense>> {
        let query = self
            .expenses_of(owner)
            .filter(medical_expenses::Column::IsOutOfNetwork.eq(true));
        self.list_expenses(query).await
    }

    /// Expenses where the patient still owes money.
    pub async fn medical_expenses_outstanding(
        &self,
        owner: &str,
    ) -> ResultEngine<Vec<MedicalExpense>> {
        let query = self.expenses_of(owner).filter(
            Expr::col(medical_expenses::Column::PatientResponsibility)
                .gt(Expr::col(medical_expenses::Column::PaidAmount)),
        );
        self.list_expenses(query).await
    }

    /// Expenses whose claim is submitted, processing or approved.
    pub async fn medical_expenses_open_claims(
        &self,
        owner: &str,
    ) -> ResultEngine<Vec<MedicalExpense>> {
        let query = self.expenses_of(owner).filter(
            medical_expenses::Column::ClaimStatus
                .is_in(OPEN_CLAIM_STATUSES.iter().map(|status| status.as_str())),
        );
        self.list_expenses(query).await
    }

    pub async fn medical_expenses_by_procedure_code(
        &self,
        code: &str,
        owner: &str,
    ) -> ResultEngine<Vec<MedicalExpense>> {
        let query = self
            .expenses_of(owner)
            .filter(medical_expenses::Column::ProcedureCode.eq(code.trim().to_uppercase()));
        self.list_expenses(query).await
    }

    pub async fn medical_expenses_by_diagnosis_code(
        &self,
        code: &str,
        owner: &str,
    ) -> ResultEngine<Vec<MedicalExpense>> {
        let query = self
            .expenses_of(owner)
            .filter(medical_expenses::Column::DiagnosisCode.eq(code.trim().to_uppercase()));
        self.list_expenses(query).await
    }

    pub async fn medical_expenses_by_date_range(
        &self,
        range: DateRangeQuery,
        owner: &str,
    ) -> ResultEngine<Vec<MedicalExpense>> {
        let query = with_range(self.expenses_of(owner), Some(range))?;
        self.list_expenses(query).await
    }

    /// Sums of the active expenses serviced in `year`.
    pub async fn medical_totals_by_year(
        &self,
        year: i32,
        owner: &str,
    ) -> ResultEngine<MedicalTotals> {
        let (start, end) = year_bounds(year)?;
        let models = self
            .expenses_of(owner)
            .filter(medical_expenses::Column::ServiceDate.between(start, end))
            .all(&self.database)
            .await?;

        let mut totals = MedicalTotals {
            year,
            ..Default::default()
        };
        for model in models {
            totals.count += 1;
            totals.total_billed = totals.total_billed.try_add(Amount::new(model.billed_amount))?;
            totals.total_insurance_paid = totals
                .total_insurance_paid
                .try_add(Amount::new(model.insurance_paid))?;
            totals.total_patient_responsibility = totals
                .total_patient_responsibility
                .try_add(Amount::new(model.patient_responsibility))?;
            totals.total_paid = totals.total_paid.try_add(Amount::new(model.paid_amount))?;
        }
        Ok(totals)
    }

    /// Number of active expenses per claim status, every status included.
    pub async fn medical_claim_status_counts(
        &self,
        owner: &str,
    ) -> ResultEngine<Vec<ClaimStatusCount>> {
        let statuses: Vec<String> = self
            .expenses_of(owner)
            .select_only()
            .column(medical_expenses::Column::ClaimStatus)
            .into_tuple()
            .all(&self.database)
            .await?;

        let mut counts: Vec<ClaimStatusCount> = ALL_CLAIM_STATUSES
            .iter()
            .map(|status| ClaimStatusCount {
                claim_status: *status,
                count: 0,
            })
            .collect();
        for status in statuses {
            let status: ClaimStatus = status.parse()?;
            if let Some(entry) = counts.iter_mut().find(|entry| entry.claim_status == status) {
                entry.count += 1;
            }
        }
        Ok(counts)
    }

    pub async fn insert_medical_expense(
        &self,
        input: MedicalExpenseInput,
        owner: &str,
    ) -> ResultEngine<MedicalExpense> {
        validate_amounts(&input)?;
        with_tx!(self, |db_tx| {
            self.check_expense_links(&db_tx, &input, None, owner).await?;
            let now = Utc::now();
            let mut active = medical_expenses::ActiveModel {
                owner: ActiveValue::Set(owner.to_string()),
                active_status: ActiveValue::Set(input.active_status.unwrap_or(true)),
                date_added: ActiveValue::Set(now),
                ..Default::default()
            };
            apply_input(&mut active, input);
            let model = active.insert(&db_tx).await?;
            expense_from_model(model)
        })
    }

    pub async fn update_medical_expense(
        &self,
        id: i64,
        input: MedicalExpenseInput,
        owner: &str,
    ) -> ResultEngine<MedicalExpense> {
        validate_amounts(&input)?;
        with_tx!(self, |db_tx| {
            let existing = self.require_expense(&db_tx, id, owner).await?;
            self.check_expense_links(&db_tx, &input, Some(id), owner)
                .await?;
            let mut active: medical_expenses::ActiveModel = existing.into();
            if let Some(status) = input.active_status {
                active.active_status = ActiveValue::Set(status);
            }
            apply_input(&mut active, input);
            let model = active.update(&db_tx).await?;
            expense_from_model(model)
        })
    }

    pub async fn delete_medical_expense(
        &self,
        id: i64,
        owner: &str,
    ) -> ResultEngine<MedicalExpense> {
        with_tx!(self, |db_tx| {
            let existing = self.require_expense(&db_tx, id, owner).await?;
            medical_expenses::Entity::delete_by_id(existing.medical_expense_id)
                .exec(&db_tx)
                .await?;
            expense_from_model(existing)
        })
    }

    pub(super) async fn unlink_family_member<C: ConnectionTrait>(
        &self,
        db: &C,
        family_member_id: i64,
    ) -> ResultEngine<()> {
        medical_expenses::Entity::update_many()
            .col_expr(
                medical_expenses::Column::FamilyMemberId,
                Expr::value(Option::<i64>::None),
            )
            .filter(medical_expenses::Column::FamilyMemberId.eq(family_member_id))
            .exec(db)
            .await?;
        Ok(())
    }

    fn expenses_of(&self, owner: &str) -> Select<medical_expenses::Entity> {
        medical_expenses::Entity::find()
            .filter(medical_expenses::Column::Owner.eq(owner))
            .filter(medical_expenses::Column::ActiveStatus.eq(true))
    }

    async fn list_expenses(
        &self,
        query: Select<medical_expenses::Entity>,
    ) -> ResultEngine<Vec<MedicalExpense>> {
        let models = query
            .order_by_desc(medical_expenses::Column::ServiceDate)
            .order_by_desc(medical_expenses::Column::MedicalExpenseId)
            .all(&self.database)
            .await?;
        models.into_iter().map(expense_from_model).collect()
    }

    /// The linked transaction and family member must belong to the caller,
    /// and a transaction carries at most one expense.
    async fn check_expense_links<C: ConnectionTrait>(
        &self,
        db: &C,
        input: &MedicalExpenseInput,
        except: Option<i64>,
        owner: &str,
    ) -> ResultEngine<()> {
        if let Some(transaction_id) = input.transaction_id {
            self.require_transaction_by_id(db, transaction_id, owner)
                .await?;
            let mut query = medical_expenses::Entity::find()
                .filter(medical_expenses::Column::TransactionId.eq(transaction_id));
            if let Some(id) = except {
                query = query.filter(medical_expenses::Column::MedicalExpenseId.ne(id));
            }
            if query.one(db).await?.is_some() {
                return Err(EngineError::ExistingKey(format!(
                    "medical expense for transaction {transaction_id}"
                )));
            }
        }
        if let Some(family_member_id) = input.family_member_id {
            self.require_family_member(db, family_member_id, owner)
                .await?;
        }
        Ok(())
    }

    async fn require_expense<C: ConnectionTrait>(
        &self,
        db: &C,
        id: i64,
        owner: &str,
    ) -> ResultEngine<medical_expenses::Model> {
        medical_expenses::Entity::find_by_id(id)
            .filter(medical_expenses::Column::Owner.eq(owner))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("medical expense {id}")))
    }
}

fn with_range(
    query: Select<medical_expenses::Entity>,
    range: Option<DateRangeQuery>,
) -> ResultEngine<Select<medical_expenses::Entity>> {
    match range {
        Some(range) => {
            validate_date_range(range.start_date, range.end_date)?;
            Ok(query.filter(
                medical_expenses::Column::ServiceDate.between(range.start_date, range.end_date),
            ))
        }
        None => Ok(query),
    }
}

fn apply_input(active: &mut medical_expenses::ActiveModel, input: MedicalExpenseInput) {
    active.transaction_id = ActiveValue::Set(input.transaction_id);
    active.provider_id = ActiveValue::Set(input.provider_id);
    active.family_member_id = ActiveValue::Set(input.family_member_id);
    active.service_date = ActiveValue::Set(input.service_date);
    active.service_description =
        ActiveValue::Set(normalize_optional_text(input.service_description.as_deref()));
    active.procedure_code =
        ActiveValue::Set(normalize_code(input.procedure_code.as_deref()));
    active.diagnosis_code =
        ActiveValue::Set(normalize_code(input.diagnosis_code.as_deref()));
    active.billed_amount = ActiveValue::Set(input.billed_amount.cents());
    active.insurance_discount = ActiveValue::Set(input.insurance_discount.cents());
    active.insurance_paid = ActiveValue::Set(input.insurance_paid.cents());
    active.patient_responsibility = ActiveValue::Set(input.patient_responsibility.cents());
    active.paid_amount = ActiveValue::Set(input.paid_amount.cents());
    active.paid_date = ActiveValue::Set(input.paid_date);
    active.is_out_of_network = ActiveValue::Set(input.is_out_of_network);
    active.claim_number = ActiveValue::Set(normalize_optional_text(input.claim_number.as_deref()));
    active.claim_status = ActiveValue::Set(input.claim_status.as_str().to_string());
    active.date_updated = ActiveValue::Set(Utc::now());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(billed: i64, discount: i64, insurance: i64, patient: i64, paid: i64) -> MedicalExpenseInput {
        MedicalExpenseInput {
            transaction_id: None,
            provider_id: None,
            family_member_id: None,
            service_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            service_description: None,
            procedure_code: None,
            diagnosis_code: None,
            billed_amount: Amount::new(billed),
            insurance_discount: Amount::new(discount),
            insurance_paid: Amount::new(insurance),
            patient_responsibility: Amount::new(patient),
            paid_amount: Amount::new(paid),
            paid_date: None,
            is_out_of_network: false,
            claim_number: None,
            claim_status: ClaimStatus::Submitted,
            active_status: None,
        }
    }

    #[test]
    fn breakdown_must_fit_billed_amount() {
        assert!(validate_amounts(&input(10_000, 2_000, 5_000, 3_000, 3_000)).is_ok());
        assert!(validate_amounts(&input(10_000, 2_000, 5_000, 3_001, 0)).is_err());
    }

    #[test]
    fn paid_cannot_exceed_patient_responsibility() {
        assert!(validate_amounts(&input(10_000, 0, 0, 1_000, 1_001)).is_err());
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let err = validate_amounts(&input(10_000, -1, 0, 0, 0)).unwrap_err();
        assert!(err.to_string().contains("insuranceDiscount"));
    }

    #[test]
    fn overflowing_breakdown_is_rejected() {
        let half = i64::MAX / 2 + 1;
        let err = validate_amounts(&input(100, half, half, 0, 0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidValue(_)));
    }

    #[test]
    fn year_bounds_cover_the_calendar_year() {
        let (start, end) = year_bounds(2024).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }
}
