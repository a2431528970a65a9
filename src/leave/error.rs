use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::leave::LEAVES_PER_YEAR;
use crate::model::leave_request::{LeaveStatus, LeaveType};

/// Deterministic validation failures of the leave engine, plus the fatal
/// store class. None of these is retried; each carries the detail the
/// caller needs to render a precise message.
#[derive(Debug, Error)]
pub enum LeaveError {
    #[error("Invalid leave type: {given}. Allowed: MEDICAL, PRIVILEGED, SICK")]
    InvalidType { given: String },
    #[error("start_date and end_date must be YYYY-MM-DD, got {given}")]
    InvalidDateFormat { given: String },
    #[error("end_date cannot be before start_date")]
    InvalidRange,
    #[error("Leave request cannot span multiple calendar years")]
    MultiYearSpan,
    #[error("Overlapping leave exists for these dates")]
    OverlapConflict,
    #[error("Insufficient balance for this leave type")]
    QuotaExceeded {
        leave_type: LeaveType,
        year: i32,
        allowed: i64,
        taken: i64,
        remaining: i64,
        requested: i64,
    },
    #[error("Leave request {0} not found")]
    NotFound(u64),
    #[error("Leave request {id} was already {status}")]
    AlreadyDecided { id: u64, status: LeaveStatus },
    #[error("Forbidden")]
    Forbidden,
    #[error("database error: {0}")]
    Store(#[from] sqlx::Error),
}

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::InvalidType { .. }
            | LeaveError::InvalidDateFormat { .. }
            | LeaveError::InvalidRange
            | LeaveError::MultiYearSpan
            | LeaveError::QuotaExceeded { .. } => StatusCode::BAD_REQUEST,
            LeaveError::OverlapConflict | LeaveError::AlreadyDecided { .. } => {
                StatusCode::CONFLICT
            }
            LeaveError::NotFound(_) => StatusCode::NOT_FOUND,
            LeaveError::Forbidden => StatusCode::FORBIDDEN,
            LeaveError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            LeaveError::QuotaExceeded {
                leave_type,
                year,
                allowed,
                taken,
                remaining,
                requested,
            } => json!({
                "message": self.to_string(),
                "type": leave_type,
                "year": year,
                "allowed": allowed,
                "taken": taken,
                "remaining": remaining,
                "requested": requested,
                "excess_by": (taken + requested - allowed).max(0),
            }),
            LeaveError::AlreadyDecided { id, status } => json!({
                "message": self.to_string(),
                "id": id,
                "status": status,
            }),
            LeaveError::Store(e) => {
                error!(error = %e, "store failure");
                json!({"message": "Internal Server Error"})
            }
            _ => json!({"message": self.to_string()}),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl LeaveError {
    pub fn quota_exceeded(leave_type: LeaveType, year: i32, taken: i64, requested: i64) -> Self {
        LeaveError::QuotaExceeded {
            leave_type,
            year,
            allowed: LEAVES_PER_YEAR,
            taken,
            remaining: (LEAVES_PER_YEAR - taken).max(0),
            requested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn status_codes() {
        assert_eq!(
            LeaveError::InvalidRange.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LeaveError::OverlapConflict.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(LeaveError::NotFound(7).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(LeaveError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            LeaveError::quota_exceeded(LeaveType::Sick, 2024, 5, 11).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn quota_body_reports_accounting_detail() {
        let err = LeaveError::quota_exceeded(LeaveType::Medical, 2024, 5, 11);
        let resp = err.error_response();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["type"], "MEDICAL");
        assert_eq!(body["allowed"], 12);
        assert_eq!(body["taken"], 5);
        assert_eq!(body["remaining"], 7);
        assert_eq!(body["requested"], 11);
        assert_eq!(body["excess_by"], 4);
    }

    #[test]
    fn messages() {
        assert_eq!(
            LeaveError::NotFound(42).to_string(),
            "Leave request 42 not found"
        );
        assert_eq!(
            LeaveError::AlreadyDecided {
                id: 3,
                status: LeaveStatus::Approved
            }
            .to_string(),
            "Leave request 3 was already APPROVED"
        );
    }
}
