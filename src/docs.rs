use crate::api::balance::{BalanceQuery, UserBalance};
use crate::api::leave_request::{CreateLeave, DecisionBody};
use crate::leave::engine::TypeBalance;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Management Service API",
        version = "0.1.0",
        description = r#"
## Leave Management Service (LMS)

Employees file leave requests, managers approve or reject them, and the
service tracks annual balances per employee and leave type.

### Rules
- Leave types: **MEDICAL**, **SICK**, **PRIVILEGED**
- Annual quota: **12 days per type**, accounted per calendar year
- A request never spans two calendar years
- A user's pending/approved requests never overlap
- Quota and overlap are re-checked at approval time

### Security
All `/leaves` endpoints expect a **JWT Bearer token** issued by the user
service. Approvals, rejections, the pending queue, and organization-wide
balance reports require the **MANAGER** role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::create_leave,
        crate::api::leave_request::my_leaves,
        crate::api::leave_request::pending_leaves,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::balance::my_balance,
        crate::api::balance::user_balance,
        crate::api::balance::balance_all,
    ),
    components(
        schemas(
            LeaveRequest,
            LeaveType,
            LeaveStatus,
            CreateLeave,
            DecisionBody,
            BalanceQuery,
            UserBalance,
            TypeBalance
        )
    ),
    tags(
        (name = "Leave", description = "Leave request lifecycle APIs"),
        (name = "Balance", description = "Annual leave balance reporting APIs"),
    )
)]
pub struct ApiDoc;
