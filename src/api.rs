// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! HTTP API.
//!
//! Exposes the [`LedgerService`] over JSON:
//!
//! ```bash
//! # Sign up
//! curl -X POST http://localhost:3001/api/signup \
//!   -H "Content-Type: application/json" \
//!   -d '{"accountNumber": "2001", "password": "secret", "name": "Asha"}'
//!
//! # Deposit
//! curl -X POST http://localhost:3001/api/transactions \
//!   -H "Content-Type: application/json" \
//!   -d '{"accountNumber": "2001", "description": "Salary", "amount": 1000, "type": "credit"}'
//!
//! # Transfer
//! curl -X POST http://localhost:3001/api/transactions \
//!   -H "Content-Type: application/json" \
//!   -d '{"accountNumber": "2001", "description": "Rent", "amount": 200, "type": "debit", "recipientAccount": "1001"}'
//!
//! # History
//! curl http://localhost:3001/api/transactions/2001
//! ```

use crate::account::Account;
use crate::base::AccountNumber;
use crate::error::LedgerError;
use crate::service::{LedgerService, Posting};
use crate::statement::write_statement;
use crate::transaction::{EntryType, TransactionEntry};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::debug;

// === Request/Response DTOs ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub account_number: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub account_number: String,
    pub password: String,
}

/// Request body for posting a transaction.
///
/// `amount` accepts a JSON number or a numeric string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub account_number: String,
    #[serde(default)]
    pub description: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default)]
    pub recipient_account: Option<String>,
}

impl TransactionRequest {
    fn into_posting(self) -> Posting {
        let recipient = self
            .recipient_account
            .filter(|r| !r.trim().is_empty())
            .map(AccountNumber::from);

        Posting {
            account_number: AccountNumber::from(self.account_number),
            description: self.description,
            amount: self.amount,
            entry_type: self.entry_type,
            recipient,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Public view of an account; never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub account_number: String,
    pub name: String,
}

impl From<&Account> for UserView {
    fn from(account: &Account) -> Self {
        Self {
            account_number: account.account_number.to_string(),
            name: account.display_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: UserView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub success: bool,
    pub transaction: TransactionEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub account_number: String,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub balance: Decimal,
}

/// Response body for errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

// === Application State ===

/// Shared application state containing the ledger service.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LedgerService>,
}

impl AppState {
    pub fn new(service: Arc<LedgerService>) -> Self {
        Self { service }
    }
}

// === Error Handling ===

/// Errors a handler can return.
#[derive(Debug)]
pub enum AppError {
    Ledger(LedgerError),
    BadRequest(String),
    Internal(String),
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        AppError::Ledger(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Ledger(err) => {
                let status = match &err {
                    LedgerError::DuplicateAccount => StatusCode::BAD_REQUEST,
                    LedgerError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                    LedgerError::InvalidAmount => StatusCode::BAD_REQUEST,
                    LedgerError::InsufficientFunds => StatusCode::BAD_REQUEST,
                    LedgerError::BalanceOverflow => StatusCode::BAD_REQUEST,
                    LedgerError::AccountNotFound => StatusCode::NOT_FOUND,
                    LedgerError::Corrupted { .. } | LedgerError::Persistence(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, err.to_string())
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

/// Runs a service call off the async runtime.
///
/// Every call takes the service lock, and writers hold it while the snapshot
/// is synced to disk.
async fn blocking<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&LedgerService) -> T + Send + 'static,
    T: Send + 'static,
{
    let service = Arc::clone(&state.service);
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))
}

// === Handlers ===

/// POST /api/signup - Create an account.
async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Json(request) = payload?;
    blocking(&state, move |service| {
        service.signup(
            request.account_number,
            request.name.unwrap_or_default(),
            request.password,
        )
    })
    .await??;
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/login - Check credentials.
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Json(request) = payload?;
    let account = blocking(&state, move |service| {
        service
            .login(&request.account_number, &request.password)
            .inspect_err(|_| debug!(account = %request.account_number, "login rejected"))
    })
    .await??;

    Ok(Json(UserResponse {
        success: true,
        user: UserView::from(&account),
    }))
}

/// GET /api/transactions/{account_number} - History, most recent first.
async fn list_transactions(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
) -> Result<Json<Vec<TransactionEntry>>, AppError> {
    let entries = blocking(&state, move |service| service.transactions(&account_number)).await?;
    Ok(Json(entries))
}

/// POST /api/transactions - Post a credit, debit or transfer.
async fn post_transaction(
    State(state): State<AppState>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> Result<Json<TransactionResponse>, AppError> {
    let Json(request) = payload?;
    let posting = request.into_posting();
    let transaction = blocking(&state, move |service| service.post_transaction(posting)).await??;

    Ok(Json(TransactionResponse {
        success: true,
        transaction,
    }))
}

/// GET /api/transactions/{account_number}/statement - CSV statement.
async fn statement(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
) -> Result<Response, AppError> {
    let entries = {
        let account_number = account_number.clone();
        blocking(&state, move |service| service.transactions(&account_number)).await?
    };
    let mut body = Vec::new();
    write_statement(&entries, &mut body).map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"statement-{}.csv\"", account_number),
            ),
        ],
        body,
    )
        .into_response())
}

/// GET /api/balance/{account_number} - Current balance.
async fn balance(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
) -> Result<Json<BalanceResponse>, AppError> {
    let (account_number, balance) = blocking(&state, move |service| {
        let balance = service.balance(&account_number);
        (account_number, balance)
    })
    .await?;
    Ok(Json(BalanceResponse {
        account_number,
        balance,
    }))
}

/// GET /api/admin/users - List accounts.
async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserView>>, AppError> {
    let accounts = blocking(&state, LedgerService::list_accounts).await?;
    Ok(Json(accounts.iter().map(UserView::from).collect()))
}

/// PUT /api/admin/users/{account_number} - Edit name and/or password.
async fn update_user(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Json(request) = payload?;
    let account = blocking(&state, move |service| {
        service.update_account(&account_number, request.name, request.password)
    })
    .await??;

    Ok(Json(UserResponse {
        success: true,
        user: UserView::from(&account),
    }))
}

/// DELETE /api/admin/users/{account_number} - Delete an account and its history.
async fn delete_user(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    blocking(&state, move |service| service.delete_account(&account_number)).await??;
    Ok(Json(SuccessResponse { success: true }))
}

// === Router ===

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/signup", post(signup))
        .route("/api/login", post(login))
        .route("/api/transactions", post(post_transaction))
        .route("/api/transactions/{account_number}", get(list_transactions))
        .route("/api/transactions/{account_number}/statement", get(statement))
        .route("/api/balance/{account_number}", get(balance))
        .route("/api/admin/users", get(list_users))
        .route(
            "/api/admin/users/{account_number}",
            put(update_user).delete(delete_user),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves files from `dir` for any path the API does not handle.
pub fn with_static_dir(router: Router, dir: PathBuf) -> Router {
    router.fallback_service(ServeDir::new(dir))
}
