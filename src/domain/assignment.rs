// ==========================================
// 车间倒班排班系统 - 指派/覆盖领域模型
// ==========================================
// 说明: 具体日指派独立于班组轮换模式,按日期+班次落库
// 唯一键: 指派 (employee, date, shift); 覆盖 (employee, date, scope);
//         班长指派 (supervisor, date, shift)
// ==========================================

use crate::domain::types::{AssignmentStatus, Role, Shift, ShiftScope};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// LaborAssignment - 人力指派
// ==========================================
// 红线: 所有写入必须经过 AssignmentGuard,不允许绕过守卫直写
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaborAssignment {
    pub assignment_id: String,       // 指派ID (UUID)
    pub employee_id: String,         // 员工ID
    pub machine_id: String,          // 机台ID
    pub assignment_date: NaiveDate,  // 指派日期
    pub shift: Shift,                // 班次
    pub status: AssignmentStatus,    // 生命周期状态
    pub created_by: String,          // 创建人
    pub created_at: DateTime<Utc>,   // 创建时间
    pub updated_at: DateTime<Utc>,   // 更新时间
}

impl LaborAssignment {
    /// 创建新的计划态指派（自动生成 UUID 和时间戳）
    pub fn new(
        employee_id: String,
        machine_id: String,
        assignment_date: NaiveDate,
        shift: Shift,
        created_by: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            assignment_id: uuid::Uuid::new_v4().to_string(),
            employee_id,
            machine_id,
            assignment_date,
            shift,
            status: AssignmentStatus::Planned,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

// ==========================================
// DailyRoleOverride - 当日角色覆盖
// ==========================================
// BOTH 行与具体班次行允许并存;解析优先级在 OverrideResolver 中显式编码
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRoleOverride {
    pub override_id: String,        // 覆盖ID (UUID)
    pub employee_id: String,        // 员工ID
    pub original_role: Role,        // 覆盖时的基础角色(快照,用于可解释性)
    pub override_role: Role,        // 覆盖后角色
    pub override_date: NaiveDate,   // 覆盖日期
    pub shift_scope: ShiftScope,    // 作用域 (白班/夜班/全天)
    pub assigned_by: String,        // 操作人
    pub notes: Option<String>,      // 备注
    pub created_at: DateTime<Utc>,  // 创建时间
}

impl DailyRoleOverride {
    /// 创建新的角色覆盖（自动生成 UUID 和时间戳）
    pub fn new(
        employee_id: String,
        original_role: Role,
        override_role: Role,
        override_date: NaiveDate,
        shift_scope: ShiftScope,
        assigned_by: String,
        notes: Option<String>,
    ) -> Self {
        Self {
            override_id: uuid::Uuid::new_v4().to_string(),
            employee_id,
            original_role,
            override_role,
            override_date,
            shift_scope,
            assigned_by,
            notes,
            created_at: Utc::now(),
        }
    }
}

// ==========================================
// ShiftSupervisorAssignment - 班长指派
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftSupervisorAssignment {
    pub assignment_id: String,      // 指派ID (UUID)
    pub supervisor_id: String,      // 班长员工ID
    pub assignment_date: NaiveDate, // 指派日期
    pub shift: Shift,               // 班次
    pub created_by: String,         // 操作人
    pub created_at: DateTime<Utc>,  // 创建时间
}

impl ShiftSupervisorAssignment {
    /// 创建新的班长指派（自动生成 UUID 和时间戳）
    pub fn new(
        supervisor_id: String,
        assignment_date: NaiveDate,
        shift: Shift,
        created_by: String,
    ) -> Self {
        Self {
            assignment_id: uuid::Uuid::new_v4().to_string(),
            supervisor_id,
            assignment_date,
            shift,
            created_by,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_assignment_starts_planned() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let assignment = LaborAssignment::new(
            "E001".to_string(),
            "M001".to_string(),
            date,
            Shift::Day,
            "admin".to_string(),
        );
        assert_eq!(assignment.status, AssignmentStatus::Planned);
        assert_eq!(assignment.shift, Shift::Day);
        assert!(!assignment.assignment_id.is_empty());
    }

    #[test]
    fn test_override_keeps_original_role_snapshot() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let ovr = DailyRoleOverride::new(
            "E001".to_string(),
            Role::Packer,
            Role::Operator,
            date,
            ShiftScope::Both,
            "admin".to_string(),
            Some("顶岗".to_string()),
        );
        assert_eq!(ovr.original_role, Role::Packer);
        assert_eq!(ovr.override_role, Role::Operator);
    }
}
