// ==========================================
// 车间倒班排班系统 - 当日角色覆盖仓储
// ==========================================
// 职责: 管理 daily_role_override 表
// 唯一键: (employee_id, override_date, shift_scope)
// 说明: BOTH 行与具体班次行允许并存,优先级由 OverrideResolver 裁决
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::{Role, ShiftScope};
use crate::domain::DailyRoleOverride;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

pub struct OverrideRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OverrideRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        repo.ensure_table()?;
        Ok(repo)
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.ensure_table()?;
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 确保表存在（如果不存在则创建）
    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS daily_role_override (
              override_id TEXT PRIMARY KEY,
              employee_id TEXT NOT NULL REFERENCES employees(employee_id) ON DELETE CASCADE,
              original_role TEXT NOT NULL,
              override_role TEXT NOT NULL,
              override_date TEXT NOT NULL,
              shift_scope TEXT NOT NULL,
              assigned_by TEXT NOT NULL,
              notes TEXT,
              created_at TEXT NOT NULL,
              UNIQUE(employee_id, override_date, shift_scope)
            );

            CREATE INDEX IF NOT EXISTS idx_role_override_date
              ON daily_role_override(override_date);
            CREATE INDEX IF NOT EXISTS idx_role_override_employee_date
              ON daily_role_override(employee_id, override_date);
            "#,
        )?;
        Ok(())
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<DailyRoleOverride> {
        let original_role: String = row.get("original_role")?;
        let override_role: String = row.get("override_role")?;
        let shift_scope: String = row.get("shift_scope")?;
        let override_date: NaiveDate = row.get("override_date")?;
        let created_at: DateTime<Utc> = row.get("created_at")?;
        Ok(DailyRoleOverride {
            override_id: row.get("override_id")?,
            employee_id: row.get("employee_id")?,
            original_role: Role::from_str(&original_role).unwrap_or(Role::Operator),
            override_role: Role::from_str(&override_role).unwrap_or(Role::Operator),
            override_date,
            shift_scope: ShiftScope::from_str(&shift_scope).unwrap_or(ShiftScope::Both),
            assigned_by: row.get("assigned_by")?,
            notes: row.get("notes")?,
            created_at,
        })
    }

    /// 插入角色覆盖(唯一键冲突由调用方映射为业务错误)
    pub fn insert(&self, ovr: &DailyRoleOverride) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO daily_role_override (
                override_id, employee_id, original_role, override_role,
                override_date, shift_scope, assigned_by, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                ovr.override_id,
                ovr.employee_id,
                ovr.original_role.to_db_str(),
                ovr.override_role.to_db_str(),
                ovr.override_date,
                ovr.shift_scope.to_db_str(),
                ovr.assigned_by,
                ovr.notes,
                ovr.created_at,
            ],
        )?;
        Ok(())
    }

    /// 查询员工在指定日期的全部覆盖行
    pub fn list_for_employee_date(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<DailyRoleOverride>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT override_id, employee_id, original_role, override_role,
                    override_date, shift_scope, assigned_by, notes, created_at
             FROM daily_role_override
             WHERE employee_id = ?1 AND override_date = ?2",
        )?;
        let rows = stmt.query_map(params![employee_id, date], Self::map_row)?;

        let mut overrides = Vec::new();
        for row in rows {
            overrides.push(row?);
        }
        Ok(overrides)
    }

    /// 查询指定日期的全部覆盖行(人力汇总用)
    pub fn list_for_date(&self, date: NaiveDate) -> RepositoryResult<Vec<DailyRoleOverride>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT override_id, employee_id, original_role, override_role,
                    override_date, shift_scope, assigned_by, notes, created_at
             FROM daily_role_override
             WHERE override_date = ?1
             ORDER BY employee_id",
        )?;
        let rows = stmt.query_map(params![date], Self::map_row)?;

        let mut overrides = Vec::new();
        for row in rows {
            overrides.push(row?);
        }
        Ok(overrides)
    }
}
