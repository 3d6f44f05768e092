// ==========================================
// 车间倒班排班系统 - 员工仓储
// ==========================================
// 职责: 管理 employees 表
// 说明: 员工主数据由身份子系统写入;引擎侧主要做资格查询
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::Role;
use crate::domain::Employee;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

pub struct EmployeeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EmployeeRepository {
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
            CREATE TABLE IF NOT EXISTS employees (
              employee_id TEXT PRIMARY KEY,
              employee_code TEXT NOT NULL UNIQUE,
              name TEXT NOT NULL,
              role TEXT NOT NULL,
              active INTEGER NOT NULL DEFAULT 1,
              created_at TEXT NOT NULL,
              updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_employees_role
              ON employees(role);
            CREATE INDEX IF NOT EXISTS idx_employees_active
              ON employees(active);
            "#,
        )?;
        Ok(())
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
        let role_str: String = row.get("role")?;
        let created_at: DateTime<Utc> = row.get("created_at")?;
        let updated_at: DateTime<Utc> = row.get("updated_at")?;
        Ok(Employee {
            employee_id: row.get("employee_id")?,
            employee_code: row.get("employee_code")?,
            name: row.get("name")?,
            role: Role::from_str(&role_str).unwrap_or(Role::Operator),
            active: row.get::<_, i64>("active")? != 0,
            created_at,
            updated_at,
        })
    }

    /// 插入员工
    pub fn insert(&self, employee: &Employee) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO employees (
                employee_id, employee_code, name, role, active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                employee.employee_id,
                employee.employee_code,
                employee.name,
                employee.role.to_db_str(),
                employee.active as i64,
                employee.created_at,
                employee.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 按ID查询员工
    pub fn find_by_id(&self, employee_id: &str) -> RepositoryResult<Option<Employee>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT employee_id, employee_code, name, role, active, created_at, updated_at
             FROM employees WHERE employee_id = ?1",
        )?;
        let mut rows = stmt.query_map(params![employee_id], Self::map_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// 按ID查询,不存在则报 NotFound
    pub fn get_by_id(&self, employee_id: &str) -> RepositoryResult<Employee> {
        self.find_by_id(employee_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Employee".to_string(),
                id: employee_id.to_string(),
            })
    }

    /// 按工号查询员工
    pub fn find_by_code(&self, employee_code: &str) -> RepositoryResult<Option<Employee>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT employee_id, employee_code, name, role, active, created_at, updated_at
             FROM employees WHERE employee_code = ?1",
        )?;
        let mut rows = stmt.query_map(params![employee_code], Self::map_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// 批量查询员工(按ID集合)
    ///
    /// 说明: 班组成员展开用;集合为空直接返回空表,不发查询
    pub fn list_by_ids(&self, employee_ids: &[String]) -> RepositoryResult<Vec<Employee>> {
        if employee_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.get_conn()?;
        let placeholders = employee_ids
            .iter()
            .enumerate()
            .map(|(i, _)| format!("?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT employee_id, employee_code, name, role, active, created_at, updated_at
             FROM employees WHERE employee_id IN ({})",
            placeholders
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(employee_ids.iter()),
            Self::map_row,
        )?;

        let mut employees = Vec::new();
        for row in rows {
            employees.push(row?);
        }
        Ok(employees)
    }

    /// 更新在职标记
    pub fn set_active(&self, employee_id: &str, active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE employees SET active = ?2, updated_at = ?3 WHERE employee_id = ?1",
            params![employee_id, active as i64, Utc::now()],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Employee".to_string(),
                id: employee_id.to_string(),
            });
        }
        Ok(())
    }
}
