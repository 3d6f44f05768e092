// ==========================================
// 车间倒班排班系统 - 人力指派仓储
// ==========================================
// 职责: 管理 labor_assignment 表
// 唯一键: (employee_id, assignment_date, shift),库级约束,并发写入安全竞争
// 机台占用键 (machine_id, assignment_date, shift) 随策略可配,由守卫层裁决
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::{AssignmentStatus, Shift};
use crate::domain::LaborAssignment;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

pub struct LaborAssignmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LaborAssignmentRepository {
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
            CREATE TABLE IF NOT EXISTS labor_assignment (
              assignment_id TEXT PRIMARY KEY,
              employee_id TEXT NOT NULL REFERENCES employees(employee_id) ON DELETE CASCADE,
              machine_id TEXT NOT NULL REFERENCES machines(machine_id) ON DELETE CASCADE,
              assignment_date TEXT NOT NULL,
              shift TEXT NOT NULL,
              status TEXT NOT NULL DEFAULT 'PLANNED',
              created_by TEXT NOT NULL,
              created_at TEXT NOT NULL,
              updated_at TEXT NOT NULL,
              UNIQUE(employee_id, assignment_date, shift)
            );

            CREATE INDEX IF NOT EXISTS idx_labor_assignment_machine_slot
              ON labor_assignment(machine_id, assignment_date, shift);
            CREATE INDEX IF NOT EXISTS idx_labor_assignment_date
              ON labor_assignment(assignment_date);
            "#,
        )?;
        Ok(())
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<LaborAssignment> {
        let shift: String = row.get("shift")?;
        let status: String = row.get("status")?;
        let assignment_date: NaiveDate = row.get("assignment_date")?;
        let created_at: DateTime<Utc> = row.get("created_at")?;
        let updated_at: DateTime<Utc> = row.get("updated_at")?;
        Ok(LaborAssignment {
            assignment_id: row.get("assignment_id")?,
            employee_id: row.get("employee_id")?,
            machine_id: row.get("machine_id")?,
            assignment_date,
            shift: Shift::from_str(&shift).unwrap_or(Shift::Day),
            status: AssignmentStatus::from_str(&status).unwrap_or(AssignmentStatus::Planned),
            created_by: row.get("created_by")?,
            created_at,
            updated_at,
        })
    }

    /// 插入指派(员工唯一键冲突由调用方映射为业务错误)
    pub fn insert(&self, assignment: &LaborAssignment) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO labor_assignment (
                assignment_id, employee_id, machine_id, assignment_date,
                shift, status, created_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                assignment.assignment_id,
                assignment.employee_id,
                assignment.machine_id,
                assignment.assignment_date,
                assignment.shift.to_db_str(),
                assignment.status.to_db_str(),
                assignment.created_by,
                assignment.created_at,
                assignment.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 按ID查询指派
    pub fn find_by_id(&self, assignment_id: &str) -> RepositoryResult<Option<LaborAssignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT assignment_id, employee_id, machine_id, assignment_date,
                    shift, status, created_by, created_at, updated_at
             FROM labor_assignment WHERE assignment_id = ?1",
        )?;
        let mut rows = stmt.query_map(params![assignment_id], Self::map_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// 按ID查询,不存在则报 NotFound
    pub fn get_by_id(&self, assignment_id: &str) -> RepositoryResult<LaborAssignment> {
        self.find_by_id(assignment_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "LaborAssignment".to_string(),
                id: assignment_id.to_string(),
            })
    }

    /// 统计机台班次槽位上未取消的指派数(机台占用策略检查用)
    ///
    /// 说明: 已取消的指派不占用槽位
    pub fn count_for_machine_slot(
        &self,
        machine_id: &str,
        date: NaiveDate,
        shift: Shift,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM labor_assignment
             WHERE machine_id = ?1 AND assignment_date = ?2 AND shift = ?3
               AND status != 'CANCELLED'",
            params![machine_id, date, shift.to_db_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 更新指派状态(状态机校验在守卫层完成)
    pub fn update_status(
        &self,
        assignment_id: &str,
        status: AssignmentStatus,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE labor_assignment SET status = ?2, updated_at = ?3 WHERE assignment_id = ?1",
            params![assignment_id, status.to_db_str(), Utc::now()],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "LaborAssignment".to_string(),
                id: assignment_id.to_string(),
            });
        }
        Ok(())
    }

    /// 查询指定日期的全部指派
    pub fn list_for_date(&self, date: NaiveDate) -> RepositoryResult<Vec<LaborAssignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT assignment_id, employee_id, machine_id, assignment_date,
                    shift, status, created_by, created_at, updated_at
             FROM labor_assignment
             WHERE assignment_date = ?1
             ORDER BY machine_id, shift",
        )?;
        let rows = stmt.query_map(params![date], Self::map_row)?;

        let mut assignments = Vec::new();
        for row in rows {
            assignments.push(row?);
        }
        Ok(assignments)
    }

    /// 查询机台在日期范围内的指派
    pub fn list_for_machine_range(
        &self,
        machine_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<LaborAssignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT assignment_id, employee_id, machine_id, assignment_date,
                    shift, status, created_by, created_at, updated_at
             FROM labor_assignment
             WHERE machine_id = ?1 AND assignment_date >= ?2 AND assignment_date <= ?3
             ORDER BY assignment_date, shift",
        )?;
        let rows = stmt.query_map(params![machine_id, from, to], Self::map_row)?;

        let mut assignments = Vec::new();
        for row in rows {
            assignments.push(row?);
        }
        Ok(assignments)
    }
}
