// ==========================================
// 车间倒班排班系统 - 人力汇总引擎
// ==========================================
// 职责: 将机台定员与班组成员按轮换标签汇总为当日白/夜班人力
// 红线: 只读组合,无副作用;覆盖行经 OverrideResolver 折算为有效角色
// ==========================================

use crate::domain::types::{Role, Shift};
use crate::domain::{Crew, DailyRoleOverride, Employee, Machine};
use crate::engine::cycle::CycleCore;
use crate::engine::error::EngineResult;
use crate::engine::override_resolver::OverrideResolver;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// 人力结构
// ==========================================

/// 按岗位拆分的人数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBreakdown {
    pub operators: i32, // 操作工
    pub loaders: i32,   // 上料工
    pub packers: i32,   // 打包工
    pub total: i32,     // 三岗合计
}

impl RoleBreakdown {
    fn add(&mut self, role: Role) {
        match role {
            Role::Operator => self.operators += 1,
            Role::Loader => self.loaders += 1,
            Role::Packer => self.packers += 1,
            // 班长/管理员不计入三岗人力
            Role::Supervisor | Role::Admin => return,
        }
        self.total += 1;
    }

    /// 逐岗位缺员 = max(0, 定员 - 实际)
    fn shortfall_against(&self, required: &RoleBreakdown) -> RoleBreakdown {
        let operators = (required.operators - self.operators).max(0);
        let loaders = (required.loaders - self.loaders).max(0);
        let packers = (required.packers - self.packers).max(0);
        RoleBreakdown {
            operators,
            loaders,
            packers,
            total: operators + loaders + packers,
        }
    }
}

/// 单个班次的人力汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftStaffing {
    pub shift: Shift,
    pub crews: Vec<String>,       // 当班班组标识
    pub actual: RoleBreakdown,    // 实际人力
    pub required: RoleBreakdown,  // 定员
    pub shortfall: RoleBreakdown, // 缺员
}

impl ShiftStaffing {
    /// 是否满员
    pub fn is_fully_staffed(&self) -> bool {
        self.shortfall.total == 0
    }
}

/// 机台当日人力汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStaffing {
    pub machine_id: String,
    pub date: NaiveDate,
    pub day: ShiftStaffing,
    pub night: ShiftStaffing,
}

// ==========================================
// WorkforceResolver - 人力汇总引擎
// ==========================================
pub struct WorkforceResolver;

impl WorkforceResolver {
    /// 汇总机台在指定日期的白/夜班人力
    ///
    /// # 参数
    /// - machine: 机台(含定员与轮换锚点)
    /// - crews: 机台下的班组
    /// - roster: 员工ID → 员工实体 (班组成员展开)
    /// - overrides: 该日期的全部角色覆盖行
    /// - date: 目标日期
    ///
    /// # 说明
    /// - 未启用轮换或缺少锚定日期时,所有班组视为不当班,实际人力为零
    /// - 离职员工不计入人力
    pub fn resolve_staffing(
        machine: &Machine,
        crews: &[Crew],
        roster: &HashMap<String, Employee>,
        overrides: &[DailyRoleOverride],
        date: NaiveDate,
    ) -> EngineResult<DailyStaffing> {
        let required = RoleBreakdown {
            operators: machine.operators_per_shift,
            loaders: machine.hopper_loaders_per_shift,
            packers: machine.packers_per_shift,
            total: machine.required_per_shift(),
        };

        // 覆盖行按员工分组,避免逐成员线性扫描
        let mut overrides_by_employee: HashMap<&str, Vec<DailyRoleOverride>> = HashMap::new();
        for ovr in overrides {
            overrides_by_employee
                .entry(ovr.employee_id.as_str())
                .or_default()
                .push(ovr.clone());
        }

        let mut day_actual = RoleBreakdown::default();
        let mut night_actual = RoleBreakdown::default();
        let mut day_crews = Vec::new();
        let mut night_crews = Vec::new();

        if machine.shift_cycle_enabled {
            if let Some(cycle_start) = machine.cycle_start_date {
                for crew in crews.iter().filter(|c| c.active) {
                    let label = CycleCore::shift_label(date, cycle_start, crew.cycle_offset)?;
                    let Some(shift) = label.as_shift() else {
                        // 轮休班组不参与当日人力
                        continue;
                    };

                    let (bucket, crew_letters) = match shift {
                        Shift::Day => (&mut day_actual, &mut day_crews),
                        Shift::Night => (&mut night_actual, &mut night_crews),
                    };
                    crew_letters.push(crew.letter.clone());

                    for employee_id in &crew.employee_ids {
                        let Some(employee) = roster.get(employee_id) else {
                            continue;
                        };
                        if !employee.active {
                            continue;
                        }
                        let emp_overrides = overrides_by_employee
                            .get(employee_id.as_str())
                            .map(|rows| rows.as_slice())
                            .unwrap_or(&[]);
                        let role =
                            OverrideResolver::effective_role(employee.role, shift, emp_overrides);
                        bucket.add(role);
                    }
                }
            }
        }

        Ok(DailyStaffing {
            machine_id: machine.machine_id.clone(),
            date,
            day: ShiftStaffing {
                shift: Shift::Day,
                crews: day_crews,
                actual: day_actual,
                required,
                shortfall: day_actual.shortfall_against(&required),
            },
            night: ShiftStaffing {
                shift: Shift::Night,
                crews: night_crews,
                actual: night_actual,
                required,
                shortfall: night_actual.shortfall_against(&required),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{MachineStatus, ShiftScope};
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_machine() -> Machine {
        let now = Utc::now();
        Machine {
            machine_id: "M001".to_string(),
            machine_code: "JT-01".to_string(),
            name: "1号机台".to_string(),
            environment: "一车间".to_string(),
            operators_per_shift: 2,
            hopper_loaders_per_shift: 1,
            packers_per_shift: 1,
            shift_cycle_enabled: true,
            cycle_start_date: Some(date(2025, 7, 30)),
            crew_size: 4,
            status: MachineStatus::Running,
            created_at: now,
            updated_at: now,
        }
    }

    fn employee(id: &str, role: Role) -> Employee {
        let now = Utc::now();
        Employee {
            employee_id: id.to_string(),
            employee_code: format!("C-{}", id),
            name: id.to_string(),
            role,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// 三班各 4 人: 2 操作工 + 1 上料工 + 1 打包工
    fn standard_setup() -> (Machine, Vec<Crew>, HashMap<String, Employee>) {
        let machine = test_machine();
        let mut roster = HashMap::new();
        let mut crews = Vec::new();
        for (letter, offset) in [("A", 0_i64), ("B", 2), ("C", 4)] {
            let mut crew = Crew::new(machine.machine_id.clone(), letter.to_string(), offset);
            for (i, role) in [Role::Operator, Role::Operator, Role::Loader, Role::Packer]
                .iter()
                .enumerate()
            {
                let id = format!("E{}{}", letter, i);
                roster.insert(id.clone(), employee(&id, *role));
                crew.employee_ids.push(id);
            }
            crews.push(crew);
        }
        (machine, crews, roster)
    }

    #[test]
    fn test_fully_staffed_standard_day() {
        let (machine, crews, roster) = standard_setup();
        // 锚定日: A 白班, B 夜班, C 轮休
        let staffing =
            WorkforceResolver::resolve_staffing(&machine, &crews, &roster, &[], date(2025, 7, 30))
                .unwrap();

        assert_eq!(staffing.day.crews, vec!["A".to_string()]);
        assert_eq!(staffing.night.crews, vec!["B".to_string()]);
        assert_eq!(staffing.day.actual.operators, 2);
        assert_eq!(staffing.day.actual.loaders, 1);
        assert_eq!(staffing.day.actual.packers, 1);
        assert_eq!(staffing.day.actual.total, 4);
        assert!(staffing.day.is_fully_staffed());
        assert!(staffing.night.is_fully_staffed());
    }

    #[test]
    fn test_inactive_employee_creates_shortfall() {
        let (machine, crews, mut roster) = standard_setup();
        // A 班一名操作工离职
        roster.get_mut("EA0").unwrap().active = false;

        let staffing =
            WorkforceResolver::resolve_staffing(&machine, &crews, &roster, &[], date(2025, 7, 30))
                .unwrap();
        assert_eq!(staffing.day.actual.operators, 1);
        assert_eq!(staffing.day.shortfall.operators, 1);
        assert_eq!(staffing.day.shortfall.total, 1);
        assert!(!staffing.day.is_fully_staffed());
    }

    #[test]
    fn test_override_moves_headcount_between_buckets() {
        let (machine, crews, roster) = standard_setup();
        // A 班打包工当日全天顶操作工岗
        let overrides = vec![DailyRoleOverride::new(
            "EA3".to_string(),
            Role::Packer,
            Role::Operator,
            date(2025, 7, 30),
            ShiftScope::Both,
            "admin".to_string(),
            None,
        )];

        let staffing = WorkforceResolver::resolve_staffing(
            &machine,
            &crews,
            &roster,
            &overrides,
            date(2025, 7, 30),
        )
        .unwrap();
        assert_eq!(staffing.day.actual.operators, 3);
        assert_eq!(staffing.day.actual.packers, 0);
        assert_eq!(staffing.day.shortfall.packers, 1);
        // 覆盖只影响当事员工所在班次,夜班 B 不变
        assert!(staffing.night.is_fully_staffed());
    }

    #[test]
    fn test_cycle_disabled_yields_zero_actual() {
        let (mut machine, crews, roster) = standard_setup();
        machine.shift_cycle_enabled = false;

        let staffing =
            WorkforceResolver::resolve_staffing(&machine, &crews, &roster, &[], date(2025, 7, 30))
                .unwrap();
        assert_eq!(staffing.day.actual.total, 0);
        assert_eq!(staffing.day.shortfall.total, machine.required_per_shift());
        assert!(staffing.day.crews.is_empty());
    }

    #[test]
    fn test_supervisor_member_not_counted_in_buckets() {
        let (machine, mut crews, mut roster) = standard_setup();
        roster.insert("SUP1".to_string(), employee("SUP1", Role::Supervisor));
        crews[0].employee_ids.push("SUP1".to_string());

        let staffing =
            WorkforceResolver::resolve_staffing(&machine, &crews, &roster, &[], date(2025, 7, 30))
                .unwrap();
        // 班长随班但不占三岗人力
        assert_eq!(staffing.day.actual.total, 4);
    }
}
