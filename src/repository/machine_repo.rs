// ==========================================
// 车间倒班排班系统 - 机台仓储
// ==========================================
// 职责: 管理 machines 表 (定员配置 + 轮换锚定日期)
// 说明: cycle_start_date 修改是独立操作,会回溯性改变派生的历史视图
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::MachineStatus;
use crate::domain::Machine;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

pub struct MachineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MachineRepository {
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
            CREATE TABLE IF NOT EXISTS machines (
              machine_id TEXT PRIMARY KEY,
              machine_code TEXT NOT NULL UNIQUE,
              name TEXT NOT NULL,
              environment TEXT NOT NULL,
              operators_per_shift INTEGER NOT NULL DEFAULT 0,
              hopper_loaders_per_shift INTEGER NOT NULL DEFAULT 0,
              packers_per_shift INTEGER NOT NULL DEFAULT 0,
              shift_cycle_enabled INTEGER NOT NULL DEFAULT 0,
              cycle_start_date TEXT,
              crew_size INTEGER NOT NULL DEFAULT 0,
              status TEXT NOT NULL DEFAULT 'RUNNING',
              created_at TEXT NOT NULL,
              updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_machines_environment
              ON machines(environment);
            CREATE INDEX IF NOT EXISTS idx_machines_status
              ON machines(status);
            "#,
        )?;
        Ok(())
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Machine> {
        let status_str: String = row.get("status")?;
        let cycle_start_date: Option<NaiveDate> = row.get("cycle_start_date")?;
        let created_at: DateTime<Utc> = row.get("created_at")?;
        let updated_at: DateTime<Utc> = row.get("updated_at")?;
        Ok(Machine {
            machine_id: row.get("machine_id")?,
            machine_code: row.get("machine_code")?,
            name: row.get("name")?,
            environment: row.get("environment")?,
            operators_per_shift: row.get("operators_per_shift")?,
            hopper_loaders_per_shift: row.get("hopper_loaders_per_shift")?,
            packers_per_shift: row.get("packers_per_shift")?,
            shift_cycle_enabled: row.get::<_, i64>("shift_cycle_enabled")? != 0,
            cycle_start_date,
            crew_size: row.get("crew_size")?,
            status: MachineStatus::from_str(&status_str).unwrap_or(MachineStatus::Offline),
            created_at,
            updated_at,
        })
    }

    const SELECT_COLUMNS: &'static str = "machine_id, machine_code, name, environment, \
        operators_per_shift, hopper_loaders_per_shift, packers_per_shift, \
        shift_cycle_enabled, cycle_start_date, crew_size, status, created_at, updated_at";

    /// 插入机台
    pub fn insert(&self, machine: &Machine) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO machines (
                machine_id, machine_code, name, environment,
                operators_per_shift, hopper_loaders_per_shift, packers_per_shift,
                shift_cycle_enabled, cycle_start_date, crew_size, status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                machine.machine_id,
                machine.machine_code,
                machine.name,
                machine.environment,
                machine.operators_per_shift,
                machine.hopper_loaders_per_shift,
                machine.packers_per_shift,
                machine.shift_cycle_enabled as i64,
                machine.cycle_start_date,
                machine.crew_size,
                machine.status.to_db_str(),
                machine.created_at,
                machine.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 按ID查询机台
    pub fn find_by_id(&self, machine_id: &str) -> RepositoryResult<Option<Machine>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM machines WHERE machine_id = ?1",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params![machine_id], Self::map_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// 按ID查询,不存在则报 NotFound
    pub fn get_by_id(&self, machine_id: &str) -> RepositoryResult<Machine> {
        self.find_by_id(machine_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Machine".to_string(),
                id: machine_id.to_string(),
            })
    }

    /// 列出全部机台
    pub fn list_all(&self) -> RepositoryResult<Vec<Machine>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM machines ORDER BY machine_code",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::map_row)?;

        let mut machines = Vec::new();
        for row in rows {
            machines.push(row?);
        }
        Ok(machines)
    }

    /// 更新机台状态
    pub fn update_status(&self, machine_id: &str, status: MachineStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE machines SET status = ?2, updated_at = ?3 WHERE machine_id = ?1",
            params![machine_id, status.to_db_str(), Utc::now()],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Machine".to_string(),
                id: machine_id.to_string(),
            });
        }
        Ok(())
    }

    /// 更新轮换锚定日期
    ///
    /// 注意: 标签永不落库,修改锚定日期后所有历史/未来视图立即按新锚点重算
    pub fn update_cycle_start_date(
        &self,
        machine_id: &str,
        cycle_start_date: Option<NaiveDate>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE machines SET cycle_start_date = ?2, updated_at = ?3 WHERE machine_id = ?1",
            params![machine_id, cycle_start_date, Utc::now()],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Machine".to_string(),
                id: machine_id.to_string(),
            });
        }
        Ok(())
    }

    /// 更新每班定员配置
    pub fn update_role_quotas(
        &self,
        machine_id: &str,
        operators: i32,
        hopper_loaders: i32,
        packers: i32,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"
            UPDATE machines SET
                operators_per_shift = ?2,
                hopper_loaders_per_shift = ?3,
                packers_per_shift = ?4,
                updated_at = ?5
            WHERE machine_id = ?1
            "#,
            params![machine_id, operators, hopper_loaders, packers, Utc::now()],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Machine".to_string(),
                id: machine_id.to_string(),
            });
        }
        Ok(())
    }
}
