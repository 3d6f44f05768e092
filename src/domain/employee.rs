// ==========================================
// 车间倒班排班系统 - 员工领域模型
// ==========================================
// 说明: 员工主数据由身份子系统维护,本引擎只读
// 引擎侧仅用于资格校验(在职标记/基础角色)
// ==========================================

use crate::domain::types::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Employee - 员工
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: String,       // 员工ID (UUID)
    pub employee_code: String,     // 工号 (唯一)
    pub name: String,              // 姓名
    pub role: Role,                // 基础岗位角色
    pub active: bool,              // 在职标记
    pub created_at: DateTime<Utc>, // 创建时间
    pub updated_at: DateTime<Utc>, // 更新时间
}

impl Employee {
    /// 创建新员工（自动生成 UUID 和时间戳）
    pub fn new(employee_code: String, name: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            employee_id: uuid::Uuid::new_v4().to_string(),
            employee_code,
            name,
            role,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// 是否可参与排班/指派
    pub fn is_assignable(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_employee_defaults() {
        let emp = Employee::new("E001".to_string(), "张三".to_string(), Role::Operator);
        assert!(emp.active);
        assert!(emp.is_assignable());
        assert_eq!(emp.role, Role::Operator);
        assert!(!emp.employee_id.is_empty());
    }
}
