use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use std::sync::Arc;

use crate::{
    accounts,
    auth::{self, AuthKeys, TokenBlacklist},
    categories, descriptions, family, health, medical, parameters, payments, pending, receipts,
    transactions, transfers, validation,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub auth: Arc<AuthKeys>,
    pub blacklist: Arc<TokenBlacklist>,
}

impl ServerState {
    pub fn new(engine: Engine, auth: AuthKeys) -> Self {
        Self {
            engine: Arc::new(engine),
            auth: Arc::new(auth),
            blacklist: Arc::new(TokenBlacklist::default()),
        }
    }
}

fn account_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/account/active", get(accounts::active))
        .route("/api/account", post(accounts::insert))
        .route(
            "/api/account/{name}",
            get(accounts::get)
                .put(accounts::update)
                .delete(accounts::delete),
        )
        .route("/api/account/select/active", get(accounts::select_active))
        .route("/api/account/select/{name}", get(accounts::get))
        .route("/api/account/insert", post(accounts::insert))
        .route("/api/account/update/{name}", put(accounts::update))
        .route(
            "/api/account/delete/{name}",
            delete(accounts::delete),
        )
        .route("/api/account/totals", get(accounts::totals))
        .route("/api/account/payment/required", get(accounts::payment_required))
        .route("/api/account/rename", put(accounts::rename))
        .route("/api/account/activate/{name}", put(accounts::activate))
        .route("/api/account/deactivate/{name}", put(accounts::deactivate))
}

fn category_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/category/active", get(categories::active))
        .route("/api/category", post(categories::insert))
        .route(
            "/api/category/{name}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/api/category/select/active", get(categories::select_active))
        .route("/api/category/select/{name}", get(categories::get))
        .route("/api/category/insert", post(categories::insert))
        .route("/api/category/update/{name}", put(categories::update))
        .route(
            "/api/category/delete/{name}",
            delete(categories::delete),
        )
        .route("/api/category/merge", put(categories::merge))
        .route("/api/description/active", get(descriptions::active))
        .route("/api/description", post(descriptions::insert))
        .route(
            "/api/description/{name}",
            get(descriptions::get)
                .put(descriptions::update)
                .delete(descriptions::delete),
        )
        .route(
            "/api/description/select/active",
            get(descriptions::select_active),
        )
        .route("/api/description/select/{name}", get(descriptions::get))
        .route("/api/description/insert", post(descriptions::insert))
        .route("/api/description/update/{name}", put(descriptions::update))
        .route(
            "/api/description/delete/{name}",
            delete(descriptions::delete),
        )
        .route("/api/description/merge", put(descriptions::merge))
}

fn parameter_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/parameter/active", get(parameters::active))
        .route("/api/parameter", post(parameters::insert))
        .route(
            "/api/parameter/{name}",
            get(parameters::get)
                .put(parameters::update)
                .delete(parameters::delete),
        )
        .route("/api/parameter/select/active", get(parameters::select_active))
        .route("/api/parameter/select/{name}", get(parameters::get))
        .route("/api/parameter/insert", post(parameters::insert))
        .route("/api/parameter/update/{name}", put(parameters::update))
        .route(
            "/api/parameter/delete/{name}",
            delete(parameters::delete),
        )
}

fn transaction_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/transaction/active", get(transactions::active))
        .route("/api/transaction", post(transactions::insert))
        .route(
            "/api/transaction/{guid}",
            get(transactions::get)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        .route(
            "/api/transaction/select/active",
            get(transactions::select_active),
        )
        .route("/api/transaction/select/{guid}", get(transactions::get))
        .route("/api/transaction/insert", post(transactions::insert))
        .route("/api/transaction/update/{guid}", put(transactions::update))
        .route(
            "/api/transaction/delete/{guid}",
            delete(transactions::delete),
        )
        .route(
            "/api/transaction/account/select/{name}",
            get(transactions::by_account),
        )
        .route(
            "/api/transaction/account/totals/{name}",
            get(transactions::account_totals),
        )
        .route(
            "/api/transaction/category/{name}",
            get(transactions::by_category),
        )
        .route(
            "/api/transaction/description/{name}",
            get(transactions::by_description),
        )
        .route(
            "/api/transaction/state/update/{guid}/{state}",
            put(transactions::update_state),
        )
        .route(
            "/api/transaction/future/insert",
            post(transactions::insert_future),
        )
        .route(
            "/api/transaction/update/account",
            put(transactions::change_account),
        )
        .route(
            "/api/transaction/update/receipt/image/{guid}",
            put(transactions::update_receipt_image),
        )
}

fn payment_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/payment/active", get(payments::active))
        .route("/api/payment", post(payments::insert))
        .route(
            "/api/payment/{id}",
            get(payments::get)
                .put(payments::update)
                .delete(payments::delete),
        )
        .route("/api/payment/select", get(payments::select))
        .route("/api/payment/select/{id}", get(payments::get))
        .route("/api/payment/insert", post(payments::insert))
        .route("/api/payment/update/{id}", put(payments::update))
        .route(
            "/api/payment/delete/{id}",
            delete(payments::delete),
        )
        .route("/api/transfer/active", get(transfers::active))
        .route("/api/transfer", post(transfers::insert))
        .route(
            "/api/transfer/{id}",
            get(transfers::get)
                .put(transfers::update)
                .delete(transfers::delete),
        )
        .route("/api/transfer/select", get(transfers::select))
        .route("/api/transfer/select/{id}", get(transfers::get))
        .route("/api/transfer/insert", post(transfers::insert))
        .route("/api/transfer/update/{id}", put(transfers::update))
        .route(
            "/api/transfer/delete/{id}",
            delete(transfers::delete),
        )
}

fn pending_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/pending/transaction/active", get(pending::active))
        .route(
            "/api/pending/transaction/all",
            get(pending::all).delete(pending::delete_all),
        )
        .route("/api/pending/transaction", post(pending::insert))
        .route(
            "/api/pending/transaction/{id}",
            get(pending::get)
                .put(pending::update)
                .delete(pending::delete),
        )
        .route("/api/pending/transaction/insert", post(pending::insert))
        .route("/api/pending/transaction/update/{id}", put(pending::update))
        .route(
            "/api/pending/transaction/delete/all",
            delete(pending::delete_all),
        )
        .route(
            "/api/pending/transaction/delete/{id}",
            delete(pending::delete),
        )
}

fn receipt_and_validation_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/receipt/image", post(receipts::insert))
        .route("/api/receipt/image/{id}", get(receipts::get))
        .route("/api/receipt/image/select/{id}", get(receipts::get))
        .route("/api/receipt/image/insert", post(receipts::insert))
        .route("/api/validation/amount/active", get(validation::active))
        .route("/api/validation/amount", post(validation::insert))
        .route(
            "/api/validation/amount/{id}",
            get(validation::get)
                .put(validation::update)
                .delete(validation::delete),
        )
        .route(
            "/api/validation/amount/select/{name}/{state}",
            get(validation::latest),
        )
        .route("/api/validation/amount/insert", post(validation::insert))
        .route(
            "/api/validation/amount/insert/{name}",
            post(validation::insert_for_account),
        )
        .route("/api/validation/amount/update/{id}", put(validation::update))
        .route(
            "/api/validation/amount/delete/{id}",
            delete(validation::delete),
        )
}

fn medical_routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/family-members",
            get(family::list).post(family::insert),
        )
        .route(
            "/api/family-members/{id}",
            get(family::get)
                .put(family::update)
                .delete(family::delete),
        )
        .route("/api/family-members/{id}/activate", put(family::activate))
        .route(
            "/api/family-members/{id}/deactivate",
            put(family::deactivate),
        )
        .route("/api/family-members/owner/{owner}", get(family::by_owner))
        .route(
            "/api/family-members/owner/{owner}/relationship/{relationship}",
            get(family::by_owner_and_relationship),
        )
        .route(
            "/api/medical-expenses",
            get(medical::list).post(medical::insert),
        )
        .route(
            "/api/medical-expenses/{id}",
            get(medical::get)
                .put(medical::update)
                .delete(medical::delete),
        )
        .route(
            "/api/medical-expenses/transaction/{id}",
            get(medical::by_transaction),
        )
        .route("/api/medical-expenses/account/{id}", get(medical::by_account))
        .route(
            "/api/medical-expenses/account/{id}/date-range",
            get(medical::by_account_date_range),
        )
        .route(
            "/api/medical-expenses/provider/{id}",
            get(medical::by_provider),
        )
        .route(
            "/api/medical-expenses/family-member/{id}",
            get(medical::by_family_member),
        )
        .route(
            "/api/medical-expenses/family-member/{id}/date-range",
            get(medical::by_family_member_date_range),
        )
        .route(
            "/api/medical-expenses/claim-status/{status}",
            get(medical::by_claim_status),
        )
        .route(
            "/api/medical-expenses/out-of-network",
            get(medical::out_of_network),
        )
        .route(
            "/api/medical-expenses/outstanding-balances",
            get(medical::outstanding_balances),
        )
        .route(
            "/api/medical-expenses/open-claims",
            get(medical::open_claims),
        )
        .route(
            "/api/medical-expenses/totals/year/{year}",
            get(medical::totals_by_year),
        )
        .route(
            "/api/medical-expenses/claim-status-counts",
            get(medical::claim_status_counts),
        )
        .route(
            "/api/medical-expenses/procedure-code/{code}",
            get(medical::by_procedure_code),
        )
        .route(
            "/api/medical-expenses/diagnosis-code/{code}",
            get(medical::by_diagnosis_code),
        )
        .route(
            "/api/medical-expenses/date-range",
            get(medical::by_date_range),
        )
}

/// Build the full application router.
///
/// Health, login, register and logout are public; everything else goes
/// through [`auth::require_auth`].
pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/api/me", get(auth::me))
        .merge(account_routes())
        .merge(category_routes())
        .merge(parameter_routes())
        .merge(transaction_routes())
        .merge(payment_routes())
        .merge(pending_routes())
        .merge(receipt_and_validation_routes())
        .merge(medical_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/actuator/health", get(health::get))
        .route("/api/login", post(auth::login))
        .route("/api/register", post(auth::register))
        .route("/api/logout", post(auth::logout))
        .merge(protected)
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    auth: AuthKeys,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState::new(engine, auth);

    axum::serve(listener, router(state)).await
}
