use sqlx::MySqlPool;

pub async fn init_db(database_url: &str) -> MySqlPool {
    MySqlPool::connect(database_url)
        .await
        .expect("Failed to connect to database")
}

// Storage contract for a leave record; the column list is the wire shape.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS leaves (
    id              BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
    user_id         BIGINT UNSIGNED NOT NULL,
    employee_name   VARCHAR(120)    NULL,
    `type`          VARCHAR(20)     NOT NULL,
    start_date      DATE            NOT NULL,
    end_date        DATE            NOT NULL,
    reason          TEXT            NULL,
    status          VARCHAR(20)     NOT NULL DEFAULT 'PENDING',
    approver_id     BIGINT UNSIGNED NULL,
    created_at      TIMESTAMP       NOT NULL DEFAULT CURRENT_TIMESTAMP,
    decision_remark VARCHAR(255)    NULL,
    KEY idx_user_status (user_id, status),
    KEY idx_status (status)
)
"#;

pub async fn ensure_schema(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    sqlx::query(SCHEMA).execute(pool).await?;
    Ok(())
}
