// ==========================================
// 车间倒班排班系统 - 角色权限表
// ==========================================
// 红线: 角色 → 操作能力映射是数据表,不是散落的条件判断
// 新增角色只需改数据,不改代码
// ==========================================

use crate::domain::types::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Capability - 操作能力
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    ViewSchedule,         // 查看排班/预览
    CreateAssignment,     // 创建人力指派
    TransitionAssignment, // 推进指派状态
    OverrideRole,         // 创建当日角色覆盖
    AssignSupervisor,     // 指派班长
    ManageWorkforce,      // 维护机台/班组配置
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::ViewSchedule => write!(f, "VIEW_SCHEDULE"),
            Capability::CreateAssignment => write!(f, "CREATE_ASSIGNMENT"),
            Capability::TransitionAssignment => write!(f, "TRANSITION_ASSIGNMENT"),
            Capability::OverrideRole => write!(f, "OVERRIDE_ROLE"),
            Capability::AssignSupervisor => write!(f, "ASSIGN_SUPERVISOR"),
            Capability::ManageWorkforce => write!(f, "MANAGE_WORKFORCE"),
        }
    }
}

// ==========================================
// 角色能力表
// ==========================================
// 一线岗位只读;班长可做日常指派与顶岗覆盖;管理员全量
const OPERATOR_CAPABILITIES: &[Capability] = &[Capability::ViewSchedule];
const LOADER_CAPABILITIES: &[Capability] = &[Capability::ViewSchedule];
const PACKER_CAPABILITIES: &[Capability] = &[Capability::ViewSchedule];
const SUPERVISOR_CAPABILITIES: &[Capability] = &[
    Capability::ViewSchedule,
    Capability::CreateAssignment,
    Capability::TransitionAssignment,
    Capability::OverrideRole,
];
const ADMIN_CAPABILITIES: &[Capability] = &[
    Capability::ViewSchedule,
    Capability::CreateAssignment,
    Capability::TransitionAssignment,
    Capability::OverrideRole,
    Capability::AssignSupervisor,
    Capability::ManageWorkforce,
];

/// 查询角色的能力集合
pub fn role_capabilities(role: Role) -> &'static [Capability] {
    match role {
        Role::Operator => OPERATOR_CAPABILITIES,
        Role::Loader => LOADER_CAPABILITIES,
        Role::Packer => PACKER_CAPABILITIES,
        Role::Supervisor => SUPERVISOR_CAPABILITIES,
        Role::Admin => ADMIN_CAPABILITIES,
    }
}

/// 判断角色是否具备指定能力
pub fn role_has_capability(role: Role, capability: Capability) -> bool {
    role_capabilities(role).contains(&capability)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontline_roles_are_read_only() {
        for role in [Role::Operator, Role::Loader, Role::Packer] {
            assert!(role_has_capability(role, Capability::ViewSchedule));
            assert!(!role_has_capability(role, Capability::CreateAssignment));
            assert!(!role_has_capability(role, Capability::AssignSupervisor));
        }
    }

    #[test]
    fn test_supervisor_can_assign_but_not_manage() {
        assert!(role_has_capability(Role::Supervisor, Capability::CreateAssignment));
        assert!(role_has_capability(Role::Supervisor, Capability::OverrideRole));
        assert!(!role_has_capability(Role::Supervisor, Capability::AssignSupervisor));
        assert!(!role_has_capability(Role::Supervisor, Capability::ManageWorkforce));
    }

    #[test]
    fn test_admin_has_all_capabilities() {
        for cap in [
            Capability::ViewSchedule,
            Capability::CreateAssignment,
            Capability::TransitionAssignment,
            Capability::OverrideRole,
            Capability::AssignSupervisor,
            Capability::ManageWorkforce,
        ] {
            assert!(role_has_capability(Role::Admin, cap));
        }
    }
}
