// ==========================================
// 车间倒班排班系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::workforce_config_trait::WorkforceConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::types::MachineSlotPolicy;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键
// ==========================================
pub const KEY_MACHINE_SLOT_POLICY: &str = "assignment.machine_slot_policy";
pub const KEY_PREVIEW_DEFAULT_DAYS: &str = "preview.default_days";
pub const KEY_PREVIEW_MAX_DAYS: &str = "preview.max_days";

// ==========================================
// 默认值
// ==========================================
pub const DEFAULT_MACHINE_SLOT_POLICY: MachineSlotPolicy = MachineSlotPolicy::Exclusive;
pub const DEFAULT_PREVIEW_DEFAULT_DAYS: u32 = 14;
pub const DEFAULT_PREVIEW_MAX_DAYS: u32 = 90;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let conn = open_sqlite_connection(db_path)?;
        let manager = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        manager.ensure_table()?;
        Ok(manager)
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致,会对传入连接再次应用统一 PRAGMA (幂等)
    pub fn from_connection(
        conn: Arc<Mutex<Connection>>,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }
        let manager = Self { conn };
        manager.ensure_table()?;
        Ok(manager)
    }

    /// 确保 config_kv 表存在
    fn ensure_table(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS config_kv (
              scope_id TEXT NOT NULL DEFAULT 'global',
              key TEXT NOT NULL,
              value TEXT NOT NULL,
              updated_at TEXT NOT NULL DEFAULT (datetime('now')),
              PRIMARY KEY (scope_id, key)
            );
            "#,
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值 (scope_id='global')
    fn get_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值 (scope_id='global', upsert)
    pub fn set_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    fn get_u32_or(&self, key: &str, default: u32) -> Result<u32, Box<dyn Error + Send + Sync>> {
        match self.get_value(key)? {
            Some(raw) => {
                let parsed = raw
                    .parse::<u32>()
                    .map_err(|e| format!("配置 {} 值非法: {} ({})", key, raw, e))?;
                Ok(parsed)
            }
            None => Ok(default),
        }
    }
}

#[async_trait]
impl WorkforceConfigReader for ConfigManager {
    async fn get_machine_slot_policy(
        &self,
    ) -> Result<MachineSlotPolicy, Box<dyn Error + Send + Sync>> {
        match self.get_value(KEY_MACHINE_SLOT_POLICY)? {
            Some(raw) => MachineSlotPolicy::from_str(&raw)
                .ok_or_else(|| format!("配置 {} 值非法: {}", KEY_MACHINE_SLOT_POLICY, raw).into()),
            None => Ok(DEFAULT_MACHINE_SLOT_POLICY),
        }
    }

    async fn get_preview_default_days(&self) -> Result<u32, Box<dyn Error + Send + Sync>> {
        self.get_u32_or(KEY_PREVIEW_DEFAULT_DAYS, DEFAULT_PREVIEW_DEFAULT_DAYS)
    }

    async fn get_preview_max_days(&self) -> Result<u32, Box<dyn Error + Send + Sync>> {
        self.get_u32_or(KEY_PREVIEW_MAX_DAYS, DEFAULT_PREVIEW_MAX_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn temp_manager() -> (NamedTempFile, ConfigManager) {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().to_str().unwrap().to_string();
        let manager = ConfigManager::new(&path).unwrap();
        (temp, manager)
    }

    #[tokio::test]
    async fn test_defaults_when_keys_missing() {
        let (_temp, manager) = temp_manager();
        assert_eq!(
            manager.get_machine_slot_policy().await.unwrap(),
            MachineSlotPolicy::Exclusive
        );
        assert_eq!(manager.get_preview_default_days().await.unwrap(), 14);
        assert_eq!(manager.get_preview_max_days().await.unwrap(), 90);
    }

    #[tokio::test]
    async fn test_set_and_read_back() {
        let (_temp, manager) = temp_manager();
        manager.set_value(KEY_MACHINE_SLOT_POLICY, "SHARED").unwrap();
        manager.set_value(KEY_PREVIEW_MAX_DAYS, "30").unwrap();

        assert_eq!(
            manager.get_machine_slot_policy().await.unwrap(),
            MachineSlotPolicy::Shared
        );
        assert_eq!(manager.get_preview_max_days().await.unwrap(), 30);
    }

    #[tokio::test]
    async fn test_invalid_value_is_error_not_silent_default() {
        let (_temp, manager) = temp_manager();
        manager
            .set_value(KEY_MACHINE_SLOT_POLICY, "WHATEVER")
            .unwrap();
        assert!(manager.get_machine_slot_policy().await.is_err());
    }
}
