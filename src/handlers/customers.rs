//! Customer data endpoints
//!
//! Point lookups by CPF and by account id. Missing keys answer 404 with a
//! `detail` message.

use crate::customers::{Account, Customer};
use crate::error::AppResult;
use crate::handlers::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub saldo: f64,
}

/// GET /clientes/{cpf}
pub async fn get_customer(
    State(state): State<AppState>,
    Path(cpf): Path<String>,
) -> AppResult<Json<Customer>> {
    let customer = state.customers().customer(&cpf)?;
    Ok(Json(customer.clone()))
}

/// GET /clientes/{cpf}/saldo
pub async fn get_balance(
    State(state): State<AppState>,
    Path(cpf): Path<String>,
) -> AppResult<Json<BalanceResponse>> {
    let customer = state.customers().customer(&cpf)?;
    Ok(Json(BalanceResponse {
        saldo: customer.saldo,
    }))
}

/// GET /clientes/{cpf}/contas/{conta_id}
pub async fn get_account(
    State(state): State<AppState>,
    Path((cpf, conta_id)): Path<(String, String)>,
) -> AppResult<Json<Account>> {
    let account = state.customers().account(&cpf, &conta_id)?;
    Ok(Json(account.clone()))
}
