//! Medical expenses API endpoints.

use api_types::{
    ClaimStatus, DateRangeQuery,
    medical::{ClaimStatusCount, MedicalExpense, MedicalExpenseInput, MedicalTotals},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{ServerError, auth::CurrentUser, server::ServerState};

type Expenses = Result<Json<Vec<MedicalExpense>>, ServerError>;

pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Expenses {
    Ok(Json(state.engine.medical_expenses(&user.username).await?))
}

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<MedicalExpense>, ServerError> {
    Ok(Json(state.engine.medical_expense(id, &user.username).await?))
}

pub async fn by_transaction(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<i64>,
) -> Result<Json<MedicalExpense>, ServerError> {
    let expense = state
        .engine
        .medical_expense_by_transaction(transaction_id, &user.username)
        .await?;
    Ok(Json(expense))
}

pub async fn by_account(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(account_id): Path<i64>,
) -> Expenses {
    let expenses = state
        .engine
        .medical_expenses_by_account(account_id, None, &user.username)
        .await?;
    Ok(Json(expenses))
}

pub async fn by_account_date_range(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(account_id): Path<i64>,
    Query(range): Query<DateRangeQuery>,
) -> Expenses {
    let expenses = state
        .engine
        .medical_expenses_by_account(account_id, Some(range), &user.username)
        .await?;
    Ok(Json(expenses))
}

pub async fn by_provider(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(provider_id): Path<i64>,
) -> Expenses {
    let expenses = state
        .engine
        .medical_expenses_by_provider(provider_id, &user.username)
        .await?;
    Ok(Json(expenses))
}

pub async fn by_family_member(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(family_member_id): Path<i64>,
) -> Expenses {
    let expenses = state
        .engine
        .medical_expenses_by_family_member(family_member_id, None, &user.username)
        .await?;
    Ok(Json(expenses))
}

pub async fn by_family_member_date_range(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(family_member_id): Path<i64>,
    Query(range): Query<DateRangeQuery>,
) -> Expenses {
    let expenses = state
        .engine
        .medical_expenses_by_family_member(family_member_id, Some(range), &user.username)
        .await?;
    Ok(Json(expenses))
}

pub async fn by_claim_status(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(status): Path<String>,
) -> Expenses {
    let status: ClaimStatus = status.parse()?;
    let expenses = state
        .engine
        .medical_expenses_by_claim_status(status, &user.username)
        .await?;
    Ok(Json(expenses))
}

pub async fn out_of_network(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Expenses {
    Ok(Json(
        state
            .engine
            .medical_expenses_out_of_network(&user.username)
            .await?,
    ))
}

pub async fn outstanding_balances(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Expenses {
    Ok(Json(
        state.engine.medical_expenses_outstanding(&user.username).await?,
    ))
}

pub async fn open_claims(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Expenses {
    Ok(Json(
        state.engine.medical_expenses_open_claims(&user.username).await?,
    ))
}

pub async fn totals_by_year(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(year): Path<i32>,
) -> Result<Json<MedicalTotals>, ServerError> {
    Ok(Json(
        state
            .engine
            .medical_totals_by_year(year, &user.username)
            .await?,
    ))
}

pub async fn claim_status_counts(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ClaimStatusCount>>, ServerError> {
    Ok(Json(
        state.engine.medical_claim_status_counts(&user.username).await?,
    ))
}

pub async fn by_procedure_code(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> Expenses {
    let expenses = state
        .engine
        .medical_expenses_by_procedure_code(&code, &user.username)
        .await?;
    Ok(Json(expenses))
}

pub async fn by_diagnosis_code(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> Expenses {
    let expenses = state
        .engine
        .medical_expenses_by_diagnosis_code(&code, &user.username)
        .await?;
    Ok(Json(expenses))
}

pub async fn by_date_range(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(range): Query<DateRangeQuery>,
) -> Expenses {
    let expenses = state
        .engine
        .medical_expenses_by_date_range(range, &user.username)
        .await?;
    Ok(Json(expenses))
}

pub async fn insert(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<MedicalExpenseInput>,
) -> Result<(StatusCode, Json<MedicalExpense>), ServerError> {
    let expense = state
        .engine
        .insert_medical_expense(payload, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MedicalExpenseInput>,
) -> Result<Json<MedicalExpense>, ServerError> {
    let expense = state
        .engine
        .update_medical_expense(id, payload, &user.username)
        .await?;
    Ok(Json(expense))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<MedicalExpense>, ServerError> {
    Ok(Json(
        state.engine.delete_medical_expense(id, &user.username).await?,
    ))
}
