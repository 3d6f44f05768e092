// ==========================================
// 车间倒班排班系统 - 人力写入 API
// ==========================================
// 职责: 面向操作端的写入接口,统一做操作人权限校验后委托守卫
// 红线: 权限判定查角色能力表,不散落条件判断
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::WorkforceConfigReader;
use crate::domain::permission::{role_has_capability, Capability};
use crate::domain::types::{AssignmentStatus, Role, Shift, ShiftScope};
use crate::domain::{DailyRoleOverride, Employee, LaborAssignment, ShiftSupervisorAssignment};
use crate::engine::assignment_guard::AssignmentGuard;
use crate::engine::cycle::CycleCore;
use crate::engine::events::{OptionalEventPublisher, WorkforceEvent, WorkforceEventType};
use crate::engine::rules::RuleFinding;
use crate::repository::{CrewRepository, EmployeeRepository, MachineRepository};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, instrument, warn};

// ==========================================
// WorkforceApi - 人力写入接口
// ==========================================
pub struct WorkforceApi<C>
where
    C: WorkforceConfigReader,
{
    guard: AssignmentGuard<C>,
    employee_repo: Arc<EmployeeRepository>,
    machine_repo: Arc<MachineRepository>,
    crew_repo: Arc<CrewRepository>,
    events: OptionalEventPublisher,
}

impl<C> WorkforceApi<C>
where
    C: WorkforceConfigReader,
{
    /// 创建新的写入接口实例
    pub fn new(
        guard: AssignmentGuard<C>,
        employee_repo: Arc<EmployeeRepository>,
        machine_repo: Arc<MachineRepository>,
        crew_repo: Arc<CrewRepository>,
        events: OptionalEventPublisher,
    ) -> Self {
        Self {
            guard,
            employee_repo,
            machine_repo,
            crew_repo,
            events,
        }
    }

    /// 校验操作人权限: 在职 + 角色能力表允许该操作
    fn check_actor(&self, actor_id: &str, capability: Capability) -> ApiResult<Employee> {
        let actor = self.employee_repo.get_by_id(actor_id)?;
        if !actor.active || !role_has_capability(actor.role, capability) {
            warn!(
                actor = %actor_id,
                role = %actor.role,
                operation = %capability,
                "操作被权限表拒绝"
            );
            return Err(ApiError::PermissionDenied {
                actor: actor_id.to_string(),
                operation: capability.to_string(),
            });
        }
        Ok(actor)
    }

    /// 创建人力指派
    #[instrument(skip(self), fields(actor = %actor_id))]
    pub async fn create_assignment(
        &self,
        actor_id: &str,
        employee_id: &str,
        machine_id: &str,
        date: NaiveDate,
        shift: Shift,
    ) -> ApiResult<LaborAssignment> {
        self.check_actor(actor_id, Capability::CreateAssignment)?;
        let assignment = self
            .guard
            .create_assignment(employee_id, machine_id, date, shift, actor_id)
            .await?;
        Ok(assignment)
    }

    /// 推进指派状态
    #[instrument(skip(self), fields(actor = %actor_id))]
    pub fn transition_assignment(
        &self,
        actor_id: &str,
        assignment_id: &str,
        new_status: AssignmentStatus,
    ) -> ApiResult<LaborAssignment> {
        self.check_actor(actor_id, Capability::TransitionAssignment)?;
        let assignment = self.guard.transition_assignment(assignment_id, new_status)?;
        Ok(assignment)
    }

    /// 创建班长指派
    #[instrument(skip(self), fields(actor = %actor_id))]
    pub fn create_supervisor_assignment(
        &self,
        actor_id: &str,
        supervisor_id: &str,
        date: NaiveDate,
        shift: Shift,
    ) -> ApiResult<ShiftSupervisorAssignment> {
        self.check_actor(actor_id, Capability::AssignSupervisor)?;
        let assignment = self
            .guard
            .create_supervisor_assignment(supervisor_id, date, shift, actor_id)?;
        Ok(assignment)
    }

    /// 创建当日角色覆盖
    #[instrument(skip(self, notes), fields(actor = %actor_id))]
    pub fn create_override(
        &self,
        actor_id: &str,
        employee_id: &str,
        override_role: Role,
        date: NaiveDate,
        scope: ShiftScope,
        notes: Option<String>,
    ) -> ApiResult<DailyRoleOverride> {
        self.check_actor(actor_id, Capability::OverrideRole)?;
        let ovr = self
            .guard
            .create_override(employee_id, override_role, date, scope, actor_id, notes)?;
        Ok(ovr)
    }

    /// 班长覆盖巡检报告 (只读,提醒性)
    pub fn get_supervisor_coverage_report(&self, date: NaiveDate) -> ApiResult<Vec<RuleFinding>> {
        let findings = self.guard.supervisor_coverage_report(date)?;
        Ok(findings)
    }

    // ==========================================
    // 人力配置维护 (ManageWorkforce)
    // ==========================================

    /// 修改机台轮换锚定日期
    ///
    /// 注意: 标签永不落库,修改后所有历史/未来视图立即按新锚点重算
    #[instrument(skip(self), fields(actor = %actor_id, machine_id = %machine_id))]
    pub fn update_cycle_start_date(
        &self,
        actor_id: &str,
        machine_id: &str,
        cycle_start_date: Option<NaiveDate>,
    ) -> ApiResult<()> {
        self.check_actor(actor_id, Capability::ManageWorkforce)?;
        self.machine_repo
            .update_cycle_start_date(machine_id, cycle_start_date)?;

        info!(new_anchor = ?cycle_start_date, "轮换锚定日期已修改");
        let _ = self.events.publish(WorkforceEvent::config(
            WorkforceEventType::CycleAnchorChanged,
            machine_id.to_string(),
        ));
        Ok(())
    }

    /// 修改班组轮换偏移
    #[instrument(skip(self), fields(actor = %actor_id, crew_id = %crew_id))]
    pub fn update_crew_offset(
        &self,
        actor_id: &str,
        crew_id: &str,
        cycle_offset: i64,
    ) -> ApiResult<()> {
        self.check_actor(actor_id, Capability::ManageWorkforce)?;
        CycleCore::validate_offset(cycle_offset)
            .map_err(|_| ApiError::InvalidOffset(cycle_offset))?;

        let crew = self
            .crew_repo
            .find_by_id(crew_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Crew(id={})不存在", crew_id)))?;
        self.crew_repo.update_cycle_offset(crew_id, cycle_offset)?;

        let _ = self.events.publish(WorkforceEvent::config(
            WorkforceEventType::CrewConfigChanged,
            crew.machine_id,
        ));
        Ok(())
    }

    /// 添加班组成员 (成员关系多对多,不独占员工)
    #[instrument(skip(self), fields(actor = %actor_id, crew_id = %crew_id))]
    pub fn add_crew_member(
        &self,
        actor_id: &str,
        crew_id: &str,
        employee_id: &str,
    ) -> ApiResult<()> {
        self.check_actor(actor_id, Capability::ManageWorkforce)?;
        let crew = self
            .crew_repo
            .find_by_id(crew_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Crew(id={})不存在", crew_id)))?;
        // 员工必须存在且在职
        let employee = self.employee_repo.get_by_id(employee_id)?;
        if !employee.active {
            return Err(ApiError::InactiveEmployee(employee_id.to_string()));
        }
        self.crew_repo.add_member(crew_id, employee_id)?;

        let _ = self.events.publish(WorkforceEvent::config(
            WorkforceEventType::CrewConfigChanged,
            crew.machine_id,
        ));
        Ok(())
    }

    /// 移除班组成员
    #[instrument(skip(self), fields(actor = %actor_id, crew_id = %crew_id))]
    pub fn remove_crew_member(
        &self,
        actor_id: &str,
        crew_id: &str,
        employee_id: &str,
    ) -> ApiResult<()> {
        self.check_actor(actor_id, Capability::ManageWorkforce)?;
        let crew = self
            .crew_repo
            .find_by_id(crew_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Crew(id={})不存在", crew_id)))?;
        self.crew_repo.remove_member(crew_id, employee_id)?;

        let _ = self.events.publish(WorkforceEvent::config(
            WorkforceEventType::CrewConfigChanged,
            crew.machine_id,
        ));
        Ok(())
    }
}
