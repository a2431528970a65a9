use actix_web::{HttpResponse, http::header, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::directory::Directory;
use crate::leave::engine::{self, NewLeave};
use crate::leave::error::LeaveError;
use crate::leave::store::{LeaveStore, MySqlLeaveStore};
use crate::model::leave_request::LeaveRequest;
use crate::notify::{self, Notifier};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    /// One of MEDICAL, SICK, PRIVILEGED (case-insensitive)
    #[serde(rename = "type")]
    #[schema(example = "MEDICAL")]
    pub leave_type: String,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: String,
    #[schema(example = "2026-01-07", format = "date", value_type = String)]
    pub end_date: String,
    #[schema(example = "family visit")]
    pub reason: Option<String>,
}

#[derive(Deserialize, Default, ToSchema)]
pub struct DecisionBody {
    #[schema(example = "enjoy your trip")]
    pub remark: Option<String>,
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/leaves",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request created", body = LeaveRequest),
        (status = 400, description = "Invalid type, date, range, span, or quota exceeded"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Overlapping leave exists")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    store: web::Data<MySqlLeaveStore>,
    notifier: web::Data<Notifier>,
    config: web::Data<Config>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, LeaveError> {
    let payload = payload.into_inner();
    let created = engine::create(
        store.get_ref(),
        NewLeave {
            user_id: auth.user_id,
            employee_name: auth.name.clone(),
            leave_type: payload.leave_type,
            start_date: payload.start_date,
            end_date: payload.end_date,
            reason: payload.reason,
        },
    )
    .await?;

    // Manager heads-up goes out on a detached task; the creation result
    // does not depend on delivery.
    let (subject, body) =
        notify::creation_email(&created, auth.email.as_deref().unwrap_or(""));
    let notifier = notifier.get_ref().clone();
    let manager_email = config.manager_email.clone();
    actix_web::rt::spawn(async move {
        notifier.send_email(&manager_email, &subject, &body).await;
    });

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/leaves/{}", created.id)))
        .json(created))
}

/* =========================
Own request history
========================= */
#[utoipa::path(
    get,
    path = "/leaves/mine",
    responses(
        (status = 200, description = "Caller's leave requests, newest first", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_leaves(
    auth: AuthUser,
    store: web::Data<MySqlLeaveStore>,
) -> Result<HttpResponse, LeaveError> {
    let items = store.list_for_user(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(items))
}

/* =========================
Pending queue (manager)
========================= */
#[utoipa::path(
    get,
    path = "/leaves/pending",
    responses(
        (status = 200, description = "All PENDING requests, newest first", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn pending_leaves(
    auth: AuthUser,
    store: web::Data<MySqlLeaveStore>,
) -> Result<HttpResponse, LeaveError> {
    auth.require_manager()?;
    let items = store.list_pending().await?;
    Ok(HttpResponse::Ok().json(items))
}

/* =========================
Single request
========================= */
#[utoipa::path(
    get,
    path = "/leaves/{id}",
    params(
        ("id" = u64, Path, description = "Leave request id")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner and not a manager"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    store: web::Data<MySqlLeaveStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, LeaveError> {
    let id = path.into_inner();
    let request = store.find(id).await?.ok_or(LeaveError::NotFound(id))?;
    if request.user_id != auth.user_id && !auth.is_manager() {
        return Err(LeaveError::Forbidden);
    }
    Ok(HttpResponse::Ok().json(request))
}

/* =========================
Approve leave (manager)
========================= */
#[utoipa::path(
    post,
    path = "/leaves/{id}/approve",
    params(
        ("id" = u64, Path, description = "Leave request id")
    ),
    request_body(
        content = DecisionBody,
        description = "Optional decision remark",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave approved", body = Object, example = json!({"ok": true})),
        (status = 400, description = "Approval would exceed annual quota"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Overlap conflict or already decided")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    store: web::Data<MySqlLeaveStore>,
    notifier: web::Data<Notifier>,
    directory: web::Data<Directory>,
    path: web::Path<u64>,
    body: Option<web::Json<DecisionBody>>,
) -> Result<HttpResponse, LeaveError> {
    auth.require_manager()?;
    let id = path.into_inner();
    let remark = body.and_then(|b| b.into_inner().remark);

    let approved = engine::approve(store.get_ref(), id, auth.user_id, remark).await?;

    notify::spawn_decision_email(
        notifier.get_ref().clone(),
        directory.get_ref().clone(),
        approved,
    );
    Ok(HttpResponse::Ok().json(json!({"ok": true})))
}

/* =========================
Reject leave (manager)
========================= */
#[utoipa::path(
    post,
    path = "/leaves/{id}/reject",
    params(
        ("id" = u64, Path, description = "Leave request id")
    ),
    request_body(
        content = DecisionBody,
        description = "Optional decision remark",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave rejected", body = Object, example = json!({"ok": true})),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Already decided")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    store: web::Data<MySqlLeaveStore>,
    notifier: web::Data<Notifier>,
    directory: web::Data<Directory>,
    path: web::Path<u64>,
    body: Option<web::Json<DecisionBody>>,
) -> Result<HttpResponse, LeaveError> {
    auth.require_manager()?;
    let id = path.into_inner();
    let remark = body.and_then(|b| b.into_inner().remark);

    let rejected = engine::reject(store.get_ref(), id, auth.user_id, remark).await?;

    notify::spawn_decision_email(
        notifier.get_ref().clone(),
        directory.get_ref().clone(),
        rejected,
    );
    Ok(HttpResponse::Ok().json(json!({"ok": true})))
}
