// ==========================================
// 车间倒班排班系统 - 班组仓储
// ==========================================
// 职责: 管理 crews 表与 crew_members 关联表
// 说明: 成员关系是多对多,员工可同时属于多个班组
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::Crew;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

pub struct CrewRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CrewRepository {
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
            CREATE TABLE IF NOT EXISTS crews (
              crew_id TEXT PRIMARY KEY,
              machine_id TEXT NOT NULL REFERENCES machines(machine_id) ON DELETE CASCADE,
              letter TEXT NOT NULL,
              cycle_offset INTEGER NOT NULL DEFAULT 0,
              active INTEGER NOT NULL DEFAULT 1,
              created_at TEXT NOT NULL,
              updated_at TEXT NOT NULL,
              UNIQUE(machine_id, letter)
            );

            CREATE TABLE IF NOT EXISTS crew_members (
              crew_id TEXT NOT NULL REFERENCES crews(crew_id) ON DELETE CASCADE,
              employee_id TEXT NOT NULL REFERENCES employees(employee_id) ON DELETE CASCADE,
              PRIMARY KEY (crew_id, employee_id)
            );

            CREATE INDEX IF NOT EXISTS idx_crews_machine
              ON crews(machine_id);
            CREATE INDEX IF NOT EXISTS idx_crew_members_employee
              ON crew_members(employee_id);
            "#,
        )?;
        Ok(())
    }

    fn map_crew_row(row: &Row<'_>) -> rusqlite::Result<Crew> {
        let created_at: DateTime<Utc> = row.get("created_at")?;
        let updated_at: DateTime<Utc> = row.get("updated_at")?;
        Ok(Crew {
            crew_id: row.get("crew_id")?,
            machine_id: row.get("machine_id")?,
            letter: row.get("letter")?,
            cycle_offset: row.get("cycle_offset")?,
            active: row.get::<_, i64>("active")? != 0,
            employee_ids: Vec::new(), // 由 load_members 填充
            created_at,
            updated_at,
        })
    }

    fn load_members(
        conn: &Connection,
        crew_id: &str,
    ) -> RepositoryResult<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT employee_id FROM crew_members WHERE crew_id = ?1 ORDER BY employee_id",
        )?;
        let rows = stmt.query_map(params![crew_id], |row| row.get::<_, String>(0))?;
        let mut members = Vec::new();
        for row in rows {
            members.push(row?);
        }
        Ok(members)
    }

    /// 插入班组(含成员)
    pub fn insert(&self, crew: &Crew) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            r#"
            INSERT INTO crews (
                crew_id, machine_id, letter, cycle_offset, active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                crew.crew_id,
                crew.machine_id,
                crew.letter,
                crew.cycle_offset,
                crew.active as i64,
                crew.created_at,
                crew.updated_at,
            ],
        )?;

        for employee_id in &crew.employee_ids {
            tx.execute(
                "INSERT INTO crew_members (crew_id, employee_id) VALUES (?1, ?2)",
                params![crew.crew_id, employee_id],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// 按ID查询班组(含成员)
    pub fn find_by_id(&self, crew_id: &str) -> RepositoryResult<Option<Crew>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT crew_id, machine_id, letter, cycle_offset, active, created_at, updated_at
             FROM crews WHERE crew_id = ?1",
        )?;
        let mut rows = stmt.query_map(params![crew_id], Self::map_crew_row)?;
        let crew = match rows.next() {
            Some(row) => row?,
            None => return Ok(None),
        };
        drop(rows);
        drop(stmt);

        let mut crew = crew;
        crew.employee_ids = Self::load_members(&conn, &crew.crew_id)?;
        Ok(Some(crew))
    }

    /// 列出机台下的班组(含成员)
    ///
    /// # 参数
    /// - machine_id: 机台ID
    /// - only_active: true 时仅返回激活班组
    pub fn list_for_machine(
        &self,
        machine_id: &str,
        only_active: bool,
    ) -> RepositoryResult<Vec<Crew>> {
        let conn = self.get_conn()?;
        let sql = if only_active {
            "SELECT crew_id, machine_id, letter, cycle_offset, active, created_at, updated_at
             FROM crews WHERE machine_id = ?1 AND active = 1 ORDER BY letter"
        } else {
            "SELECT crew_id, machine_id, letter, cycle_offset, active, created_at, updated_at
             FROM crews WHERE machine_id = ?1 ORDER BY letter"
        };
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![machine_id], Self::map_crew_row)?;

        let mut crews = Vec::new();
        for row in rows {
            crews.push(row?);
        }
        drop(stmt);

        for crew in &mut crews {
            crew.employee_ids = Self::load_members(&conn, &crew.crew_id)?;
        }
        Ok(crews)
    }

    /// 添加班组成员(幂等: 已存在则忽略)
    pub fn add_member(&self, crew_id: &str, employee_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO crew_members (crew_id, employee_id) VALUES (?1, ?2)",
            params![crew_id, employee_id],
        )?;
        conn.execute(
            "UPDATE crews SET updated_at = ?2 WHERE crew_id = ?1",
            params![crew_id, Utc::now()],
        )?;
        Ok(())
    }

    /// 移除班组成员
    pub fn remove_member(&self, crew_id: &str, employee_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "DELETE FROM crew_members WHERE crew_id = ?1 AND employee_id = ?2",
            params![crew_id, employee_id],
        )?;
        conn.execute(
            "UPDATE crews SET updated_at = ?2 WHERE crew_id = ?1",
            params![crew_id, Utc::now()],
        )?;
        Ok(())
    }

    /// 更新激活标记
    pub fn set_active(&self, crew_id: &str, active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE crews SET active = ?2, updated_at = ?3 WHERE crew_id = ?1",
            params![crew_id, active as i64, Utc::now()],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Crew".to_string(),
                id: crew_id.to_string(),
            });
        }
        Ok(())
    }

    /// 更新轮换偏移
    pub fn update_cycle_offset(&self, crew_id: &str, cycle_offset: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE crews SET cycle_offset = ?2, updated_at = ?3 WHERE crew_id = ?1",
            params![crew_id, cycle_offset, Utc::now()],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Crew".to_string(),
                id: crew_id.to_string(),
            });
        }
        Ok(())
    }
}
