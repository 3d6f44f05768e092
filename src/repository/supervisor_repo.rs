// ==========================================
// 车间倒班排班系统 - 班长指派仓储
// ==========================================
// 职责: 管理 shift_supervisor_assignment 表
// 唯一键: (supervisor_id, assignment_date, shift)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::Shift;
use crate::domain::ShiftSupervisorAssignment;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

pub struct SupervisorAssignmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SupervisorAssignmentRepository {
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
            CREATE TABLE IF NOT EXISTS shift_supervisor_assignment (
              assignment_id TEXT PRIMARY KEY,
              supervisor_id TEXT NOT NULL REFERENCES employees(employee_id) ON DELETE CASCADE,
              assignment_date TEXT NOT NULL,
              shift TEXT NOT NULL,
              created_by TEXT NOT NULL,
              created_at TEXT NOT NULL,
              UNIQUE(supervisor_id, assignment_date, shift)
            );

            CREATE INDEX IF NOT EXISTS idx_supervisor_assignment_date
              ON shift_supervisor_assignment(assignment_date);
            "#,
        )?;
        Ok(())
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<ShiftSupervisorAssignment> {
        let shift: String = row.get("shift")?;
        let assignment_date: NaiveDate = row.get("assignment_date")?;
        let created_at: DateTime<Utc> = row.get("created_at")?;
        Ok(ShiftSupervisorAssignment {
            assignment_id: row.get("assignment_id")?,
            supervisor_id: row.get("supervisor_id")?,
            assignment_date,
            shift: Shift::from_str(&shift).unwrap_or(Shift::Day),
            created_by: row.get("created_by")?,
            created_at,
        })
    }

    /// 插入班长指派(唯一键冲突由调用方映射为业务错误)
    pub fn insert(&self, assignment: &ShiftSupervisorAssignment) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO shift_supervisor_assignment (
                assignment_id, supervisor_id, assignment_date, shift, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                assignment.assignment_id,
                assignment.supervisor_id,
                assignment.assignment_date,
                assignment.shift.to_db_str(),
                assignment.created_by,
                assignment.created_at,
            ],
        )?;
        Ok(())
    }

    /// 查询指定日期的全部班长指派
    pub fn list_for_date(
        &self,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<ShiftSupervisorAssignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT assignment_id, supervisor_id, assignment_date, shift, created_by, created_at
             FROM shift_supervisor_assignment
             WHERE assignment_date = ?1
             ORDER BY shift, supervisor_id",
        )?;
        let rows = stmt.query_map(params![date], Self::map_row)?;

        let mut assignments = Vec::new();
        for row in rows {
            assignments.push(row?);
        }
        Ok(assignments)
    }

    /// 统计指定日期+班次的班长人数
    pub fn count_for_shift(&self, date: NaiveDate, shift: Shift) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM shift_supervisor_assignment
             WHERE assignment_date = ?1 AND shift = ?2",
            params![date, shift.to_db_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
