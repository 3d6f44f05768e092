// ==========================================
// 车间倒班排班系统 - 指派守卫引擎
// ==========================================
// 职责: 所有指派/覆盖/班长写入的唯一入口,执行资格与冲突检查
// 红线: 唯一键冲突依赖库级约束裁决,并发同键写入恰好一个成功,
//       另一个收到冲突错误,引擎不加锁
// ==========================================
// 检查产出可区分的失败类别:
// - 资格类: InactiveEmployee / MachineUnavailable / SupervisorRoleRequired
// - 冲突类: DuplicateEmployeeAssignment / DuplicateMachineAssignment /
//           DuplicateOverride / DuplicateSupervisorAssignment
// - 状态机类: InvalidTransition
// ==========================================

use crate::config::WorkforceConfigReader;
use crate::domain::types::{AssignmentStatus, MachineSlotPolicy, Role, Shift, ShiftScope};
use crate::domain::{DailyRoleOverride, LaborAssignment, ShiftSupervisorAssignment};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::events::{OptionalEventPublisher, WorkforceEvent, WorkforceEventType};
use crate::engine::override_resolver::OverrideResolver;
use crate::engine::rules::{evaluate_daily_rules, DailyRuleContext, RuleFinding};
use crate::repository::{
    EmployeeRepository, LaborAssignmentRepository, MachineRepository, OverrideRepository,
    SupervisorAssignmentRepository,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

// ==========================================
// AssignmentGuard - 指派守卫
// ==========================================
pub struct AssignmentGuard<C>
where
    C: WorkforceConfigReader,
{
    config: Arc<C>,
    employee_repo: Arc<EmployeeRepository>,
    machine_repo: Arc<MachineRepository>,
    assignment_repo: Arc<LaborAssignmentRepository>,
    override_repo: Arc<OverrideRepository>,
    supervisor_repo: Arc<SupervisorAssignmentRepository>,
    events: OptionalEventPublisher,
}

impl<C> AssignmentGuard<C>
where
    C: WorkforceConfigReader,
{
    /// 创建新的守卫实例
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<C>,
        employee_repo: Arc<EmployeeRepository>,
        machine_repo: Arc<MachineRepository>,
        assignment_repo: Arc<LaborAssignmentRepository>,
        override_repo: Arc<OverrideRepository>,
        supervisor_repo: Arc<SupervisorAssignmentRepository>,
        events: OptionalEventPublisher,
    ) -> Self {
        Self {
            config,
            employee_repo,
            machine_repo,
            assignment_repo,
            override_repo,
            supervisor_repo,
            events,
        }
    }

    /// 创建人力指派
    ///
    /// # 检查顺序
    /// 1. 员工在职 → InactiveEmployee
    /// 2. 机台可指派 → MachineUnavailable
    /// 3. 机台槽位策略 (EXCLUSIVE 时一槽一人) → DuplicateMachineAssignment
    /// 4. 员工当日班次唯一 (库级约束) → DuplicateEmployeeAssignment
    ///
    /// 成功后指派落库为 PLANNED 状态
    #[instrument(skip(self), fields(employee_id = %employee_id, machine_id = %machine_id))]
    pub async fn create_assignment(
        &self,
        employee_id: &str,
        machine_id: &str,
        date: NaiveDate,
        shift: Shift,
        created_by: &str,
    ) -> EngineResult<LaborAssignment> {
        // === 步骤 1: 员工资格 ===
        let employee = self.employee_repo.get_by_id(employee_id)?;
        if !employee.active {
            return Err(EngineError::InactiveEmployee {
                employee_id: employee_id.to_string(),
            });
        }

        // === 步骤 2: 机台资格 ===
        let machine = self.machine_repo.get_by_id(machine_id)?;
        if !machine.is_assignable() {
            return Err(EngineError::MachineUnavailable {
                machine_id: machine_id.to_string(),
                status: machine.status.to_string(),
            });
        }

        // === 步骤 3: 机台槽位策略 ===
        // 策略运行时可配,无法压进库级约束,EXCLUSIVE 用占用计数预检裁决
        let policy = self
            .config
            .get_machine_slot_policy()
            .await
            .map_err(|e| EngineError::ConfigError(e.to_string()))?;
        if policy == MachineSlotPolicy::Exclusive {
            let occupied = self
                .assignment_repo
                .count_for_machine_slot(machine_id, date, shift)?;
            if occupied > 0 {
                return Err(EngineError::DuplicateMachineAssignment {
                    machine_id: machine_id.to_string(),
                    date: date.to_string(),
                    shift: shift.to_string(),
                });
            }
        }

        // === 步骤 4: 落库 (员工唯一键由库级约束裁决) ===
        let assignment = LaborAssignment::new(
            employee_id.to_string(),
            machine_id.to_string(),
            date,
            shift,
            created_by.to_string(),
        );
        self.assignment_repo.insert(&assignment).map_err(|e| {
            if e.is_unique_violation() {
                EngineError::DuplicateEmployeeAssignment {
                    employee_id: employee_id.to_string(),
                    date: date.to_string(),
                    shift: shift.to_string(),
                }
            } else {
                EngineError::Repository(e)
            }
        })?;

        info!(
            assignment_id = %assignment.assignment_id,
            date = %date,
            shift = %shift,
            "人力指派创建成功"
        );
        let _ = self.events.publish(WorkforceEvent::assignment(
            WorkforceEventType::AssignmentCreated,
            Some(machine_id.to_string()),
            employee_id.to_string(),
            date,
            shift,
        ));

        Ok(assignment)
    }

    /// 推进指派状态
    ///
    /// # 状态机
    /// PLANNED → {PRESENT, ABSENT, CANCELLED}, PRESENT → COMPLETED
    /// 其余转换失败 (InvalidTransition),终态不可再转换
    #[instrument(skip(self), fields(assignment_id = %assignment_id))]
    pub fn transition_assignment(
        &self,
        assignment_id: &str,
        new_status: AssignmentStatus,
    ) -> EngineResult<LaborAssignment> {
        let mut assignment = self.assignment_repo.get_by_id(assignment_id)?;

        if !assignment.status.can_transition_to(new_status) {
            return Err(EngineError::InvalidTransition {
                from: assignment.status.to_string(),
                to: new_status.to_string(),
            });
        }

        self.assignment_repo.update_status(assignment_id, new_status)?;
        let old_status = assignment.status;
        assignment.status = new_status;

        info!(
            from = %old_status,
            to = %new_status,
            "指派状态推进成功"
        );
        let _ = self.events.publish(WorkforceEvent::assignment(
            WorkforceEventType::AssignmentStatusChanged,
            Some(assignment.machine_id.clone()),
            assignment.employee_id.clone(),
            assignment.assignment_date,
            assignment.shift,
        ));

        Ok(assignment)
    }

    /// 创建班长指派
    ///
    /// # 前置条件
    /// - 员工在职
    /// - 当日该班次有效角色(基础角色或覆盖后)必须是班长
    /// - (supervisor, date, shift) 唯一 (库级约束)
    #[instrument(skip(self), fields(supervisor_id = %supervisor_id))]
    pub fn create_supervisor_assignment(
        &self,
        supervisor_id: &str,
        date: NaiveDate,
        shift: Shift,
        created_by: &str,
    ) -> EngineResult<ShiftSupervisorAssignment> {
        let employee = self.employee_repo.get_by_id(supervisor_id)?;
        if !employee.active {
            return Err(EngineError::InactiveEmployee {
                employee_id: supervisor_id.to_string(),
            });
        }

        // 基础角色不是班长时,当日覆盖可以临时授予
        let overrides = self.override_repo.list_for_employee_date(supervisor_id, date)?;
        let effective = OverrideResolver::effective_role(employee.role, shift, &overrides);
        if effective != Role::Supervisor {
            return Err(EngineError::SupervisorRoleRequired {
                employee_id: supervisor_id.to_string(),
                actual_role: effective.to_string(),
            });
        }

        let assignment = ShiftSupervisorAssignment::new(
            supervisor_id.to_string(),
            date,
            shift,
            created_by.to_string(),
        );
        self.supervisor_repo.insert(&assignment).map_err(|e| {
            if e.is_unique_violation() {
                EngineError::DuplicateSupervisorAssignment {
                    supervisor_id: supervisor_id.to_string(),
                    date: date.to_string(),
                    shift: shift.to_string(),
                }
            } else {
                EngineError::Repository(e)
            }
        })?;

        info!(date = %date, shift = %shift, "班长指派创建成功");
        let _ = self.events.publish(WorkforceEvent::assignment(
            WorkforceEventType::SupervisorAssigned,
            None,
            supervisor_id.to_string(),
            date,
            shift,
        ));

        Ok(assignment)
    }

    /// 创建当日角色覆盖
    ///
    /// # 前置条件
    /// - 员工在职
    /// - (employee, date, scope) 唯一 (库级约束);
    ///   BOTH 行与具体班次行允许并存,解析优先级见 OverrideResolver
    #[instrument(skip(self, notes), fields(employee_id = %employee_id))]
    pub fn create_override(
        &self,
        employee_id: &str,
        override_role: Role,
        date: NaiveDate,
        scope: ShiftScope,
        assigned_by: &str,
        notes: Option<String>,
    ) -> EngineResult<DailyRoleOverride> {
        let employee = self.employee_repo.get_by_id(employee_id)?;
        if !employee.active {
            return Err(EngineError::InactiveEmployee {
                employee_id: employee_id.to_string(),
            });
        }

        let ovr = DailyRoleOverride::new(
            employee_id.to_string(),
            employee.role,
            override_role,
            date,
            scope,
            assigned_by.to_string(),
            notes,
        );
        self.override_repo.insert(&ovr).map_err(|e| {
            if e.is_unique_violation() {
                EngineError::DuplicateOverride {
                    employee_id: employee_id.to_string(),
                    date: date.to_string(),
                    scope: scope.to_string(),
                }
            } else {
                EngineError::Repository(e)
            }
        })?;

        info!(
            date = %date,
            scope = %scope,
            from = %ovr.original_role,
            to = %override_role,
            "角色覆盖创建成功"
        );
        let _ = self.events.publish(WorkforceEvent {
            event_type: WorkforceEventType::OverrideCreated,
            source: Some("AssignmentGuard".to_string()),
            machine_id: None,
            employee_id: Some(employee_id.to_string()),
            date: Some(date),
            shift: None,
        });

        Ok(ovr)
    }

    /// 班长覆盖巡检 (提醒性检查,不阻断任何写入)
    ///
    /// 扫描指定日期的白/夜两班,任一班次没有班长指派即产出严重级发现
    pub fn supervisor_coverage_report(&self, date: NaiveDate) -> EngineResult<Vec<RuleFinding>> {
        let mut counts: HashMap<Shift, i64> = HashMap::new();
        for shift in Shift::all() {
            counts.insert(shift, self.supervisor_repo.count_for_shift(date, shift)?);
        }

        let ctx = DailyRuleContext {
            date,
            supervisor_counts: &counts,
            staffing: &[],
        };
        Ok(evaluate_daily_rules(&ctx))
    }
}
