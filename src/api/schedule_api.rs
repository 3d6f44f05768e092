// ==========================================
// 车间倒班排班系统 - 排班查询 API
// ==========================================
// 职责: 面向展示层的只读接口 (预览/人力/覆盖/有效角色)
// 说明: 全部实时推导,无缓存层;班组/锚点修改立即对后续查询生效
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::WorkforceConfigReader;
use crate::domain::types::{Role, Shift};
use crate::engine::coverage::{CoverageReport, CoverageValidator};
use crate::engine::override_resolver::OverrideResolver;
use crate::engine::preview::{PreviewDay, SchedulePreviewGenerator};
use crate::engine::workforce::{DailyStaffing, WorkforceResolver};
use crate::repository::{
    CrewRepository, EmployeeRepository, MachineRepository, OverrideRepository,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// ScheduleApi - 排班查询接口
// ==========================================
pub struct ScheduleApi<C>
where
    C: WorkforceConfigReader,
{
    config: Arc<C>,
    machine_repo: Arc<MachineRepository>,
    crew_repo: Arc<CrewRepository>,
    employee_repo: Arc<EmployeeRepository>,
    override_repo: Arc<OverrideRepository>,
}

impl<C> ScheduleApi<C>
where
    C: WorkforceConfigReader,
{
    /// 创建新的查询接口实例
    pub fn new(
        config: Arc<C>,
        machine_repo: Arc<MachineRepository>,
        crew_repo: Arc<CrewRepository>,
        employee_repo: Arc<EmployeeRepository>,
        override_repo: Arc<OverrideRepository>,
    ) -> Self {
        Self {
            config,
            machine_repo,
            crew_repo,
            employee_repo,
            override_repo,
        }
    }

    /// 查询机台排班预览
    ///
    /// # 参数
    /// - machine_id: 机台ID
    /// - start_date: 预览起始日期
    /// - days: 预览天数;None 用配置默认值,超过配置上限时截断
    #[instrument(skip(self), fields(machine_id = %machine_id))]
    pub async fn get_schedule_preview(
        &self,
        machine_id: &str,
        start_date: NaiveDate,
        days: Option<u32>,
    ) -> ApiResult<Vec<PreviewDay>> {
        let machine = self.machine_repo.get_by_id(machine_id)?;
        if !machine.shift_cycle_enabled {
            return Err(ApiError::InvalidInput(format!(
                "机台 {} 未启用轮换排班",
                machine.machine_code
            )));
        }
        let cycle_start = machine.cycle_start_date.ok_or_else(|| {
            ApiError::InvalidInput(format!("机台 {} 缺少轮换锚定日期", machine.machine_code))
        })?;

        let default_days = self
            .config
            .get_preview_default_days()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let max_days = self
            .config
            .get_preview_max_days()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let days = days.unwrap_or(default_days).min(max_days);

        let crews = self.crew_repo.list_for_machine(machine_id, true)?;
        let preview = SchedulePreviewGenerator::preview(cycle_start, &crews, start_date, days)?;
        Ok(preview.collect())
    }

    /// 查询机台在指定日期的白/夜班人力汇总
    #[instrument(skip(self), fields(machine_id = %machine_id))]
    pub fn get_staffing_for_date(
        &self,
        machine_id: &str,
        date: NaiveDate,
    ) -> ApiResult<DailyStaffing> {
        let machine = self.machine_repo.get_by_id(machine_id)?;
        let crews = self.crew_repo.list_for_machine(machine_id, true)?;

        // 展开全部班组成员
        let mut member_ids: Vec<String> = crews
            .iter()
            .flat_map(|c| c.employee_ids.iter().cloned())
            .collect();
        member_ids.sort();
        member_ids.dedup();
        let roster: HashMap<String, _> = self
            .employee_repo
            .list_by_ids(&member_ids)?
            .into_iter()
            .map(|e| (e.employee_id.clone(), e))
            .collect();

        let overrides = self.override_repo.list_for_date(date)?;

        let staffing =
            WorkforceResolver::resolve_staffing(&machine, &crews, &roster, &overrides, date)?;
        Ok(staffing)
    }

    /// 查询机台班组配置的覆盖校验报告 (提醒性,不阻断)
    pub fn get_coverage_report(&self, machine_id: &str) -> ApiResult<CoverageReport> {
        let machine = self.machine_repo.get_by_id(machine_id)?;
        let crews = self.crew_repo.list_for_machine(machine_id, false)?;
        Ok(CoverageValidator::validate(&machine, &crews))
    }

    /// 查询员工在指定日期/班次的有效角色
    pub fn get_effective_role(
        &self,
        employee_id: &str,
        date: NaiveDate,
        shift: Shift,
    ) -> ApiResult<Role> {
        let employee = self.employee_repo.get_by_id(employee_id)?;
        let overrides = self.override_repo.list_for_employee_date(employee_id, date)?;
        Ok(OverrideResolver::effective_role(
            employee.role,
            shift,
            &overrides,
        ))
    }
}
