use std::collections::BTreeMap;

use actix_web::{HttpResponse, web};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::directory::Directory;
use crate::leave::engine::{self, TypeBalance};
use crate::leave::error::LeaveError;
use crate::leave::store::MySqlLeaveStore;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct BalanceQuery {
    /// Calendar year to report on; defaults to the current year
    #[schema(example = 2026)]
    pub year: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct UserBalance {
    #[schema(example = 1000)]
    pub user_id: u64,
    /// Best available display name; empty when no source knows the user
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = 2026)]
    pub year: i32,
    /// Keyed by leave type (MEDICAL, SICK, PRIVILEGED)
    pub balances: BTreeMap<String, TypeBalance>,
}

async fn assemble(
    store: &MySqlLeaveStore,
    directory: &Directory,
    user_id: u64,
    year: i32,
) -> Result<UserBalance, LeaveError> {
    let name = directory.display_name(store, user_id).await;
    let balances = engine::balance_for_user(store, user_id, year)
        .await?
        .into_iter()
        .map(|(leave_type, balance)| (leave_type.to_string(), balance))
        .collect();
    Ok(UserBalance {
        user_id,
        name,
        year,
        balances,
    })
}

fn requested_year(query: &BalanceQuery) -> i32 {
    query.year.unwrap_or_else(|| Utc::now().year())
}

/* =========================
Own balance
========================= */
#[utoipa::path(
    get,
    path = "/leaves/balance",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Caller's per-type balances", body = UserBalance),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Balance"
)]
pub async fn my_balance(
    auth: AuthUser,
    store: web::Data<MySqlLeaveStore>,
    directory: web::Data<Directory>,
    query: web::Query<BalanceQuery>,
) -> Result<HttpResponse, LeaveError> {
    let year = requested_year(&query);
    let balance = assemble(store.get_ref(), directory.get_ref(), auth.user_id, year).await?;
    Ok(HttpResponse::Ok().json(balance))
}

/* =========================
One user's balance (manager)
========================= */
#[utoipa::path(
    get,
    path = "/leaves/balance/{user_id}",
    params(
        ("user_id" = u64, Path, description = "User to report on"),
        BalanceQuery
    ),
    responses(
        (status = 200, description = "Per-type balances for the user", body = UserBalance),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Balance"
)]
pub async fn user_balance(
    auth: AuthUser,
    store: web::Data<MySqlLeaveStore>,
    directory: web::Data<Directory>,
    path: web::Path<u64>,
    query: web::Query<BalanceQuery>,
) -> Result<HttpResponse, LeaveError> {
    auth.require_manager()?;
    let year = requested_year(&query);
    let balance = assemble(store.get_ref(), directory.get_ref(), path.into_inner(), year).await?;
    Ok(HttpResponse::Ok().json(balance))
}

/* =========================
All balances (manager)
========================= */
#[utoipa::path(
    get,
    path = "/leaves/balance/all",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Balances for every user that has filed a request", body = [UserBalance]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Balance"
)]
pub async fn balance_all(
    auth: AuthUser,
    store: web::Data<MySqlLeaveStore>,
    directory: web::Data<Directory>,
    query: web::Query<BalanceQuery>,
) -> Result<HttpResponse, LeaveError> {
    auth.require_manager()?;
    let year = requested_year(&query);

    let mut report = Vec::new();
    for (user_id, balances) in engine::balance_all(store.get_ref(), year).await? {
        // Name resolution is best-effort and never fails the report.
        let name = directory.display_name(store.get_ref(), user_id).await;
        report.push(UserBalance {
            user_id,
            name,
            year,
            balances: balances
                .into_iter()
                .map(|(leave_type, balance)| (leave_type.to_string(), balance))
                .collect(),
        });
    }
    Ok(HttpResponse::Ok().json(report))
}
