use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::leave::error::LeaveError;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType, NewLeaveRecord};

/// Persistence seam for the lifecycle engine. All mutation of leave rows
/// goes through this trait; the engine is generic over it so the validation
/// logic can be exercised against an in-memory store in tests.
#[allow(async_fn_in_trait)]
pub trait LeaveStore {
    async fn insert(&self, rec: &NewLeaveRecord) -> Result<LeaveRequest, LeaveError>;

    async fn find(&self, id: u64) -> Result<Option<LeaveRequest>, LeaveError>;

    /// Conditional decision write: flips a PENDING row to a terminal status
    /// and returns `false` when the row was absent or already decided, so a
    /// raced double-decision is never a silent double-apply.
    async fn decide(
        &self,
        id: u64,
        status: LeaveStatus,
        approver_id: u64,
        remark: &str,
    ) -> Result<bool, LeaveError>;

    async fn list_for_user(&self, user_id: u64) -> Result<Vec<LeaveRequest>, LeaveError>;

    async fn list_pending(&self) -> Result<Vec<LeaveRequest>, LeaveError>;

    /// True iff some PENDING/APPROVED request of `user_id` other than
    /// `exclude_id` shares at least one day with `[start, end]`.
    async fn has_overlap(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<u64>,
    ) -> Result<bool, LeaveError>;

    async fn approved_of_type(
        &self,
        user_id: u64,
        leave_type: LeaveType,
    ) -> Result<Vec<LeaveRequest>, LeaveError>;

    /// Users visible to wide balance reporting: everyone who ever filed.
    async fn distinct_user_ids(&self) -> Result<Vec<u64>, LeaveError>;

    /// Most recent `employee_name` snapshot for a user, if any.
    async fn latest_employee_name(&self, user_id: u64) -> Result<Option<String>, LeaveError>;
}

const COLUMNS: &str = "id, user_id, employee_name, `type`, start_date, end_date, \
                       reason, status, approver_id, created_at, decision_remark";

#[derive(Clone)]
pub struct MySqlLeaveStore {
    pool: MySqlPool,
}

impl MySqlLeaveStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

impl LeaveStore for MySqlLeaveStore {
    async fn insert(&self, rec: &NewLeaveRecord) -> Result<LeaveRequest, LeaveError> {
        let result = sqlx::query(
            r#"
            INSERT INTO leaves
                (user_id, employee_name, `type`, start_date, end_date, reason)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(rec.user_id)
        .bind(&rec.employee_name)
        .bind(rec.leave_type)
        .bind(rec.start_date)
        .bind(rec.end_date)
        .bind(&rec.reason)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id();
        self.find(id).await?.ok_or(LeaveError::NotFound(id))
    }

    async fn find(&self, id: u64) -> Result<Option<LeaveRequest>, LeaveError> {
        let sql = format!("SELECT {COLUMNS} FROM leaves WHERE id = ?");
        let row = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn decide(
        &self,
        id: u64,
        status: LeaveStatus,
        approver_id: u64,
        remark: &str,
    ) -> Result<bool, LeaveError> {
        let result = sqlx::query(
            r#"
            UPDATE leaves
            SET status = ?, approver_id = ?, decision_remark = ?
            WHERE id = ? AND status = 'PENDING'
            "#,
        )
        .bind(status)
        .bind(approver_id)
        .bind(remark)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(&self, user_id: u64) -> Result<Vec<LeaveRequest>, LeaveError> {
        let sql = format!("SELECT {COLUMNS} FROM leaves WHERE user_id = ? ORDER BY id DESC");
        let rows = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_pending(&self) -> Result<Vec<LeaveRequest>, LeaveError> {
        let sql = format!("SELECT {COLUMNS} FROM leaves WHERE status = 'PENDING' ORDER BY id DESC");
        let rows = sqlx::query_as::<_, LeaveRequest>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn has_overlap(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<u64>,
    ) -> Result<bool, LeaveError> {
        // Inclusive interval intersection: start <= existing.end AND
        // end >= existing.start.
        let mut sql = String::from(
            "SELECT COUNT(*) FROM leaves \
             WHERE user_id = ? AND status IN ('PENDING', 'APPROVED') \
             AND start_date <= ? AND end_date >= ?",
        );
        if exclude_id.is_some() {
            sql.push_str(" AND id <> ?");
        }

        let mut query = sqlx::query_scalar::<_, i64>(&sql)
            .bind(user_id)
            .bind(end)
            .bind(start);
        if let Some(id) = exclude_id {
            query = query.bind(id);
        }

        Ok(query.fetch_one(&self.pool).await? > 0)
    }

    async fn approved_of_type(
        &self,
        user_id: u64,
        leave_type: LeaveType,
    ) -> Result<Vec<LeaveRequest>, LeaveError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM leaves \
             WHERE user_id = ? AND `type` = ? AND status = 'APPROVED'"
        );
        let rows = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(user_id)
            .bind(leave_type)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn distinct_user_ids(&self) -> Result<Vec<u64>, LeaveError> {
        let ids = sqlx::query_scalar::<_, u64>("SELECT DISTINCT user_id FROM leaves ORDER BY user_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn latest_employee_name(&self, user_id: u64) -> Result<Option<String>, LeaveError> {
        let name = sqlx::query_scalar::<_, Option<String>>(
            "SELECT employee_name FROM leaves WHERE user_id = ? ORDER BY id DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(name.flatten())
    }
}
