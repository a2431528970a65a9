//! Leave request lifecycle: the single entry point that mutates the leave
//! store. Every state transition is validated here, and approval re-runs
//! the quota and overlap checks because the set of APPROVED requests can
//! change between creation and decision time.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;
use strum::IntoEnumIterator;
use utoipa::ToSchema;

use crate::leave::error::LeaveError;
use crate::leave::store::LeaveStore;
use crate::leave::{LEAVES_PER_YEAR, calendar};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType, NewLeaveRecord};

/// Raw creation input as received from the caller; dates and type are still
/// unvalidated strings.
#[derive(Debug, Clone)]
pub struct NewLeave {
    pub user_id: u64,
    pub employee_name: Option<String>,
    pub leave_type: String,
    pub start_date: String,
    pub end_date: String,
    pub reason: Option<String>,
}

/// Per-type quota standing for one user and year.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct TypeBalance {
    #[schema(example = 12)]
    pub allowed: i64,
    #[schema(example = 5)]
    pub taken: i64,
    #[schema(example = 7)]
    pub remaining: i64,
}

/// Validates and persists a new PENDING request.
///
/// Check order: type, date format, range, single calendar year, overlap
/// against the user's PENDING/APPROVED set, then quota for that type and
/// year.
pub async fn create<S: LeaveStore>(store: &S, new: NewLeave) -> Result<LeaveRequest, LeaveError> {
    let leave_type: LeaveType =
        new.leave_type
            .trim()
            .parse()
            .map_err(|_| LeaveError::InvalidType {
                given: new.leave_type.clone(),
            })?;

    let start = calendar::parse_date(&new.start_date)?;
    let end = calendar::parse_date(&new.end_date)?;
    if end < start {
        return Err(LeaveError::InvalidRange);
    }
    if start.year() != end.year() {
        return Err(LeaveError::MultiYearSpan);
    }

    if store.has_overlap(new.user_id, start, end, None).await? {
        return Err(LeaveError::OverlapConflict);
    }

    let year = start.year();
    let requested = calendar::inclusive_days(start, end);
    let taken = taken_days(store, new.user_id, year, leave_type).await?;
    let remaining = (LEAVES_PER_YEAR - taken).max(0);
    if requested > remaining {
        return Err(LeaveError::quota_exceeded(leave_type, year, taken, requested));
    }

    store
        .insert(&NewLeaveRecord {
            user_id: new.user_id,
            employee_name: new.employee_name,
            leave_type,
            start_date: start,
            end_date: end,
            reason: new.reason,
        })
        .await
}

/// Approves a PENDING request.
///
/// Quota and overlap are re-derived from current store state: other
/// approvals may have landed since this request was created, so the
/// creation-time validation cannot be trusted here. `taken_days` naturally
/// counts only other requests, since this one is still PENDING. On any
/// failure the request stays PENDING.
pub async fn approve<S: LeaveStore>(
    store: &S,
    id: u64,
    manager_id: u64,
    remark: Option<String>,
) -> Result<LeaveRequest, LeaveError> {
    let request = store.find(id).await?.ok_or(LeaveError::NotFound(id))?;
    if !request.is_pending() {
        return Err(LeaveError::AlreadyDecided {
            id,
            status: request.status,
        });
    }

    let year = request.start_date.year();
    let add_days = calendar::inclusive_days(request.start_date, request.end_date);
    let taken = taken_days(store, request.user_id, year, request.leave_type).await?;
    if taken + add_days > LEAVES_PER_YEAR {
        return Err(LeaveError::quota_exceeded(
            request.leave_type,
            year,
            taken,
            add_days,
        ));
    }

    if store
        .has_overlap(request.user_id, request.start_date, request.end_date, Some(id))
        .await?
    {
        return Err(LeaveError::OverlapConflict);
    }

    finalize(store, id, LeaveStatus::Approved, manager_id, remark).await
}

/// Rejects a PENDING request. No re-validation: a rejection cannot violate
/// quota or overlap.
pub async fn reject<S: LeaveStore>(
    store: &S,
    id: u64,
    manager_id: u64,
    remark: Option<String>,
) -> Result<LeaveRequest, LeaveError> {
    let request = store.find(id).await?.ok_or(LeaveError::NotFound(id))?;
    if !request.is_pending() {
        return Err(LeaveError::AlreadyDecided {
            id,
            status: request.status,
        });
    }
    finalize(store, id, LeaveStatus::Rejected, manager_id, remark).await
}

async fn finalize<S: LeaveStore>(
    store: &S,
    id: u64,
    status: LeaveStatus,
    manager_id: u64,
    remark: Option<String>,
) -> Result<LeaveRequest, LeaveError> {
    let remark = remark.unwrap_or_default();
    if !store.decide(id, status, manager_id, remark.trim()).await? {
        // Lost a race: someone else decided between our read and write.
        let current = store
            .find(id)
            .await?
            .map(|r| r.status)
            .unwrap_or(LeaveStatus::Pending);
        return Err(LeaveError::AlreadyDecided { id, status: current });
    }
    store.find(id).await?.ok_or(LeaveError::NotFound(id))
}

/// APPROVED days of `leave_type` consumed by `user_id` within `year`,
/// year-clipped per request.
pub async fn taken_days<S: LeaveStore>(
    store: &S,
    user_id: u64,
    year: i32,
    leave_type: LeaveType,
) -> Result<i64, LeaveError> {
    let approved = store.approved_of_type(user_id, leave_type).await?;
    Ok(approved
        .iter()
        .map(|r| calendar::year_overlap_days(r.start_date, r.end_date, year))
        .sum())
}

/// Quota standing for every leave type in the closed set.
pub async fn balance_for_user<S: LeaveStore>(
    store: &S,
    user_id: u64,
    year: i32,
) -> Result<BTreeMap<LeaveType, TypeBalance>, LeaveError> {
    let mut balances = BTreeMap::new();
    for leave_type in LeaveType::iter() {
        let taken = taken_days(store, user_id, year, leave_type).await?;
        balances.insert(
            leave_type,
            TypeBalance {
                allowed: LEAVES_PER_YEAR,
                taken,
                remaining: (LEAVES_PER_YEAR - taken).max(0),
            },
        );
    }
    Ok(balances)
}

/// Balances for every user that has ever filed a request. Users with no
/// rows in the leave table are invisible here by design.
pub async fn balance_all<S: LeaveStore>(
    store: &S,
    year: i32,
) -> Result<Vec<(u64, BTreeMap<LeaveType, TypeBalance>)>, LeaveError> {
    let mut out = Vec::new();
    for user_id in store.distinct_user_ids().await? {
        out.push((user_id, balance_for_user(store, user_id, year).await?));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leave::store::memory::MemoryLeaveStore;

    const USER: u64 = 1000;
    const MANAGER: u64 = 1;

    fn leave(leave_type: &str, start: &str, end: &str) -> NewLeave {
        NewLeave {
            user_id: USER,
            employee_name: Some("John Doe".into()),
            leave_type: leave_type.into(),
            start_date: start.into(),
            end_date: end.into(),
            reason: None,
        }
    }

    #[actix_web::test]
    async fn create_persists_a_pending_request() {
        let store = MemoryLeaveStore::new();
        let created = create(&store, leave("MEDICAL", "2024-01-01", "2024-01-05"))
            .await
            .unwrap();
        assert_eq!(created.status, LeaveStatus::Pending);
        assert_eq!(created.leave_type, LeaveType::Medical);
        assert_eq!(created.employee_name.as_deref(), Some("John Doe"));
        assert!(created.approver_id.is_none());
        assert!(store.find(created.id).await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn create_rejects_unknown_type() {
        let store = MemoryLeaveStore::new();
        let err = create(&store, leave("CASUAL", "2024-01-01", "2024-01-02"))
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::InvalidType { .. }));
    }

    #[actix_web::test]
    async fn create_rejects_malformed_dates() {
        let store = MemoryLeaveStore::new();
        let err = create(&store, leave("SICK", "01/05/2024", "2024-01-06"))
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::InvalidDateFormat { .. }));
    }

    #[actix_web::test]
    async fn create_accepts_timestamp_shaped_dates() {
        let store = MemoryLeaveStore::new();
        let created = create(
            &store,
            leave("SICK", "2024-01-05T00:00:00", "2024-01-06T00:00:00"),
        )
        .await
        .unwrap();
        assert_eq!(created.start_date.to_string(), "2024-01-05");
        assert_eq!(created.end_date.to_string(), "2024-01-06");
    }

    #[actix_web::test]
    async fn create_rejects_end_before_start() {
        let store = MemoryLeaveStore::new();
        let err = create(&store, leave("SICK", "2024-05-10", "2024-05-05"))
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::InvalidRange));
    }

    #[actix_web::test]
    async fn create_rejects_multi_year_spans() {
        let store = MemoryLeaveStore::new();
        let err = create(&store, leave("SICK", "2024-12-30", "2025-01-02"))
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::MultiYearSpan));
    }

    #[actix_web::test]
    async fn create_rejects_overlap_with_pending_request() {
        let store = MemoryLeaveStore::new();
        create(&store, leave("MEDICAL", "2024-02-01", "2024-02-05"))
            .await
            .unwrap();
        // shares 2024-02-05; different type does not matter for overlap
        let err = create(&store, leave("SICK", "2024-02-05", "2024-02-08"))
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::OverlapConflict));
        // disjoint span is fine
        create(&store, leave("SICK", "2024-02-06", "2024-02-08"))
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn overlap_ignores_rejected_requests() {
        let store = MemoryLeaveStore::new();
        let first = create(&store, leave("MEDICAL", "2024-02-01", "2024-02-05"))
            .await
            .unwrap();
        reject(&store, first.id, MANAGER, None).await.unwrap();
        create(&store, leave("MEDICAL", "2024-02-03", "2024-02-04"))
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn create_enforces_quota_against_approved_days() {
        let store = MemoryLeaveStore::new();
        let first = create(&store, leave("MEDICAL", "2024-01-01", "2024-01-05"))
            .await
            .unwrap();
        approve(&store, first.id, MANAGER, None).await.unwrap();

        // 5 approved + 11 requested = 16 > 12
        let err = create(&store, leave("MEDICAL", "2024-01-10", "2024-01-20"))
            .await
            .unwrap_err();
        match err {
            LeaveError::QuotaExceeded {
                allowed,
                taken,
                remaining,
                requested,
                ..
            } => {
                assert_eq!(allowed, 12);
                assert_eq!(taken, 5);
                assert_eq!(remaining, 7);
                assert_eq!(requested, 11);
            }
            other => panic!("expected QuotaExceeded, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn quota_buckets_are_per_type() {
        let store = MemoryLeaveStore::new();
        let first = create(&store, leave("MEDICAL", "2024-03-01", "2024-03-12"))
            .await
            .unwrap();
        approve(&store, first.id, MANAGER, None).await.unwrap();
        // MEDICAL is exhausted, SICK is untouched
        create(&store, leave("SICK", "2024-04-01", "2024-04-10"))
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn approve_sets_decision_fields() {
        let store = MemoryLeaveStore::new();
        let created = create(&store, leave("PRIVILEGED", "2024-06-03", "2024-06-07"))
            .await
            .unwrap();
        let approved = approve(&store, created.id, MANAGER, Some(" enjoy ".into()))
            .await
            .unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.approver_id, Some(MANAGER));
        assert_eq!(approved.decision_remark.as_deref(), Some("enjoy"));
    }

    #[actix_web::test]
    async fn approve_recheck_catches_quota_consumed_since_creation() {
        let store = MemoryLeaveStore::new();
        // Both pass creation-time validation: nothing is APPROVED yet.
        let a = create(&store, leave("MEDICAL", "2024-01-01", "2024-01-08"))
            .await
            .unwrap();
        let b = create(&store, leave("MEDICAL", "2024-02-01", "2024-02-08"))
            .await
            .unwrap();

        approve(&store, a.id, MANAGER, None).await.unwrap();

        // 8 approved + 8 more = 16 > 12
        let err = approve(&store, b.id, MANAGER, None).await.unwrap_err();
        match err {
            LeaveError::QuotaExceeded { taken, requested, .. } => {
                assert_eq!(taken, 8);
                assert_eq!(requested, 8);
            }
            other => panic!("expected QuotaExceeded, got {other:?}"),
        }
        // the failed approval must not have changed state
        assert!(store.find(b.id).await.unwrap().unwrap().is_pending());
    }

    #[actix_web::test]
    async fn approve_recheck_catches_overlap_not_visible_to_engine_validation() {
        let store = MemoryLeaveStore::new();
        let pending = create(&store, leave("MEDICAL", "2024-05-01", "2024-05-05"))
            .await
            .unwrap();

        // A conflicting row lands directly in the store, as a concurrent
        // writer would.
        let rival = store
            .insert(&NewLeaveRecord {
                user_id: USER,
                employee_name: None,
                leave_type: LeaveType::Sick,
                start_date: "2024-05-04".parse().unwrap(),
                end_date: "2024-05-10".parse().unwrap(),
                reason: None,
            })
            .await
            .unwrap();
        store
            .decide(rival.id, LeaveStatus::Approved, MANAGER, "")
            .await
            .unwrap();

        let err = approve(&store, pending.id, MANAGER, None).await.unwrap_err();
        assert!(matches!(err, LeaveError::OverlapConflict));
        assert!(store.find(pending.id).await.unwrap().unwrap().is_pending());
    }

    #[actix_web::test]
    async fn approve_does_not_conflict_with_itself() {
        let store = MemoryLeaveStore::new();
        let created = create(&store, leave("SICK", "2024-07-01", "2024-07-03"))
            .await
            .unwrap();
        // the exclude_id path: its own span must not count as overlap
        approve(&store, created.id, MANAGER, None).await.unwrap();
    }

    #[actix_web::test]
    async fn decisions_are_terminal() {
        let store = MemoryLeaveStore::new();
        let created = create(&store, leave("SICK", "2024-08-01", "2024-08-02"))
            .await
            .unwrap();
        reject(&store, created.id, MANAGER, Some("no cover".into()))
            .await
            .unwrap();

        let err = approve(&store, created.id, MANAGER, None).await.unwrap_err();
        assert!(matches!(
            err,
            LeaveError::AlreadyDecided {
                status: LeaveStatus::Rejected,
                ..
            }
        ));
        let err = reject(&store, created.id, MANAGER, None).await.unwrap_err();
        assert!(matches!(err, LeaveError::AlreadyDecided { .. }));
    }

    #[actix_web::test]
    async fn decisions_on_unknown_ids_fail() {
        let store = MemoryLeaveStore::new();
        assert!(matches!(
            approve(&store, 99, MANAGER, None).await.unwrap_err(),
            LeaveError::NotFound(99)
        ));
        assert!(matches!(
            reject(&store, 99, MANAGER, None).await.unwrap_err(),
            LeaveError::NotFound(99)
        ));
    }

    #[actix_web::test]
    async fn reject_succeeds_regardless_of_quota_state() {
        let store = MemoryLeaveStore::new();
        let a = create(&store, leave("MEDICAL", "2024-01-01", "2024-01-12"))
            .await
            .unwrap();
        approve(&store, a.id, MANAGER, None).await.unwrap();
        let b = create(&store, leave("SICK", "2024-02-01", "2024-02-10"))
            .await
            .unwrap();
        let rejected = reject(&store, b.id, MANAGER, None).await.unwrap();
        assert_eq!(rejected.status, LeaveStatus::Rejected);
    }

    #[actix_web::test]
    async fn balance_is_full_quota_for_a_user_with_no_requests() {
        let store = MemoryLeaveStore::new();
        let balances = balance_for_user(&store, USER, 2024).await.unwrap();
        assert_eq!(balances.len(), 3);
        for balance in balances.values() {
            assert_eq!(balance.allowed, 12);
            assert_eq!(balance.taken, 0);
            assert_eq!(balance.remaining, 12);
        }
    }

    #[actix_web::test]
    async fn taken_days_only_counts_the_queried_year() {
        let store = MemoryLeaveStore::new();
        let created = create(&store, leave("MEDICAL", "2024-03-01", "2024-03-05"))
            .await
            .unwrap();
        approve(&store, created.id, MANAGER, None).await.unwrap();

        assert_eq!(taken_days(&store, USER, 2024, LeaveType::Medical).await.unwrap(), 5);
        assert_eq!(taken_days(&store, USER, 2023, LeaveType::Medical).await.unwrap(), 0);
        assert_eq!(taken_days(&store, USER, 2024, LeaveType::Sick).await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn pending_requests_do_not_consume_balance() {
        let store = MemoryLeaveStore::new();
        create(&store, leave("MEDICAL", "2024-03-01", "2024-03-05"))
            .await
            .unwrap();
        let balances = balance_for_user(&store, USER, 2024).await.unwrap();
        assert_eq!(balances[&LeaveType::Medical].taken, 0);
    }

    #[actix_web::test]
    async fn balance_all_covers_only_users_seen_in_the_table() {
        let store = MemoryLeaveStore::new();
        create(&store, leave("MEDICAL", "2024-03-01", "2024-03-02"))
            .await
            .unwrap();
        let mut other = leave("SICK", "2024-03-01", "2024-03-02");
        other.user_id = 2000;
        create(&store, other).await.unwrap();

        let all = balance_all(&store, 2024).await.unwrap();
        let ids: Vec<u64> = all.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![USER, 2000]);
    }
}
