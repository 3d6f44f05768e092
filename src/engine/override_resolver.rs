// ==========================================
// 车间倒班排班系统 - 当日角色解析引擎
// ==========================================
// 职责: 在基础角色之上套用当日覆盖,得到有效角色
// 红线: 无状态、无副作用;覆盖行由调用方按 (员工,日期) 预先加载
// ==========================================
// 优先级: 具体班次作用域 > BOTH 作用域 > 基础角色
// 两类覆盖行允许并存(各自满足唯一键),裁决必须在此显式编码
// ==========================================

use crate::domain::types::{Role, Shift};
use crate::domain::{DailyRoleOverride, Employee};

// ==========================================
// OverrideResolver - 角色解析纯函数
// ==========================================
pub struct OverrideResolver;

impl OverrideResolver {
    /// 解析员工在指定班次的有效角色
    ///
    /// # 参数
    /// - base_role: 员工基础角色
    /// - shift: 请求的班次
    /// - overrides: 该员工当日的全部覆盖行
    pub fn effective_role(
        base_role: Role,
        shift: Shift,
        overrides: &[DailyRoleOverride],
    ) -> Role {
        // 1. 具体班次作用域优先
        if let Some(specific) = overrides.iter().find(|o| o.shift_scope.is_exactly(shift)) {
            return specific.override_role;
        }
        // 2. 其次 BOTH 作用域
        if let Some(both) = overrides
            .iter()
            .find(|o| o.shift_scope == crate::domain::types::ShiftScope::Both)
        {
            return both.override_role;
        }
        // 3. 无覆盖 → 基础角色
        base_role
    }

    /// 便捷入口: 直接取员工实体的有效角色
    pub fn effective_role_for(
        employee: &Employee,
        shift: Shift,
        overrides: &[DailyRoleOverride],
    ) -> Role {
        Self::effective_role(employee.role, shift, overrides)
    }
}
