// ==========================================
// 人力汇总与覆盖校验集成测试
// ==========================================
// 测试范围:
// 1. 标准三班配置下的人力汇总 (仓储 → 引擎全链路)
// 2. 角色覆盖改变人力口径
// 3. 覆盖校验报告 (配置问题只提醒,不阻断)
// ==========================================

mod test_helpers;

use crew_scheduling::domain::types::{Role, Shift, ShiftScope};
use crew_scheduling::domain::DailyRoleOverride;
use crew_scheduling::engine::coverage::CoverageFindingKind;
use crew_scheduling::engine::{CoverageValidator, OverrideResolver, WorkforceResolver};
use std::collections::HashMap;
use test_helpers::{
    date, insert_employee, insert_standard_crews, insert_standard_machine, setup_test_context,
};

/// 从仓储组装 WorkforceResolver 的输入并执行
fn resolve_from_db(
    ctx: &test_helpers::TestContext,
    machine_id: &str,
    day: chrono::NaiveDate,
) -> crew_scheduling::engine::DailyStaffing {
    let machine = ctx.machine_repo.get_by_id(machine_id).unwrap();
    let crews = ctx.crew_repo.list_for_machine(machine_id, true).unwrap();
    let mut member_ids: Vec<String> = crews
        .iter()
        .flat_map(|c| c.employee_ids.iter().cloned())
        .collect();
    member_ids.sort();
    member_ids.dedup();
    let roster: HashMap<String, _> = ctx
        .employee_repo
        .list_by_ids(&member_ids)
        .unwrap()
        .into_iter()
        .map(|e| (e.employee_id.clone(), e))
        .collect();
    let overrides = ctx.override_repo.list_for_date(day).unwrap();

    WorkforceResolver::resolve_staffing(&machine, &crews, &roster, &overrides, day).unwrap()
}

#[test]
fn test_standard_crews_fully_staffed_roundtrip() {
    let ctx = setup_test_context();
    let machine = insert_standard_machine(&ctx.machine_repo, "JT-01");
    insert_standard_crews(&ctx.crew_repo, &ctx.employee_repo, &machine.machine_id);

    // 锚定日: A 白班 / B 夜班 / C 轮休
    let staffing = resolve_from_db(&ctx, &machine.machine_id, date(2025, 7, 30));
    assert_eq!(staffing.day.crews, vec!["A".to_string()]);
    assert_eq!(staffing.night.crews, vec!["B".to_string()]);
    assert!(staffing.day.is_fully_staffed());
    assert!(staffing.night.is_fully_staffed());
    assert_eq!(staffing.day.actual.operators, 2);
    assert_eq!(staffing.day.actual.loaders, 1);
    assert_eq!(staffing.day.actual.packers, 1);

    // 两天后轮到 C 白班 / A 夜班
    let staffing = resolve_from_db(&ctx, &machine.machine_id, date(2025, 8, 1));
    assert_eq!(staffing.day.crews, vec!["C".to_string()]);
    assert_eq!(staffing.night.crews, vec!["A".to_string()]);
}

#[test]
fn test_persisted_override_changes_staffing() {
    let ctx = setup_test_context();
    let machine = insert_standard_machine(&ctx.machine_repo, "JT-01");
    let crews = insert_standard_crews(&ctx.crew_repo, &ctx.employee_repo, &machine.machine_id);

    // A 班的打包工 (第 4 名成员) 当日顶操作工岗
    let packer_id = crews[0].employee_ids[3].clone();
    let packer = ctx.employee_repo.get_by_id(&packer_id).unwrap();
    assert_eq!(packer.role, Role::Packer);

    let ovr = DailyRoleOverride::new(
        packer_id.clone(),
        packer.role,
        Role::Operator,
        date(2025, 7, 30),
        ShiftScope::Both,
        "admin".to_string(),
        None,
    );
    ctx.override_repo.insert(&ovr).unwrap();

    let staffing = resolve_from_db(&ctx, &machine.machine_id, date(2025, 7, 30));
    assert_eq!(staffing.day.actual.operators, 3);
    assert_eq!(staffing.day.actual.packers, 0);
    assert_eq!(staffing.day.shortfall.packers, 1);
    assert!(!staffing.day.is_fully_staffed());

    // 覆盖只作用当日,次日恢复
    let staffing = resolve_from_db(&ctx, &machine.machine_id, date(2025, 7, 31));
    assert!(staffing.day.is_fully_staffed());
}

#[test]
fn test_effective_role_resolution_from_persisted_rows() {
    let ctx = setup_test_context();
    let employee = insert_employee(&ctx.employee_repo, "E-1", "张三", Role::Packer, true);

    // 工号是唯一键,可按工号查回
    let by_code = ctx.employee_repo.find_by_code("E-1").unwrap().unwrap();
    assert_eq!(by_code.employee_id, employee.employee_id);

    // BOTH 行 + 白班具体行并存
    for (scope, role) in [(ShiftScope::Both, Role::Operator), (ShiftScope::Day, Role::Loader)] {
        let ovr = DailyRoleOverride::new(
            employee.employee_id.clone(),
            employee.role,
            role,
            date(2025, 8, 1),
            scope,
            "admin".to_string(),
            None,
        );
        ctx.override_repo.insert(&ovr).unwrap();
    }

    let overrides = ctx
        .override_repo
        .list_for_employee_date(&employee.employee_id, date(2025, 8, 1))
        .unwrap();
    assert_eq!(overrides.len(), 2);

    // 白班: 具体行胜出; 夜班: 回落 BOTH; 次日: 基础角色
    assert_eq!(
        OverrideResolver::effective_role(employee.role, Shift::Day, &overrides),
        Role::Loader
    );
    assert_eq!(
        OverrideResolver::effective_role(employee.role, Shift::Night, &overrides),
        Role::Operator
    );
    let next_day = ctx
        .override_repo
        .list_for_employee_date(&employee.employee_id, date(2025, 8, 2))
        .unwrap();
    assert_eq!(
        OverrideResolver::effective_role(employee.role, Shift::Day, &next_day),
        Role::Packer
    );
}

#[test]
fn test_coverage_report_from_persisted_config() {
    let ctx = setup_test_context();
    let machine = insert_standard_machine(&ctx.machine_repo, "JT-01");
    insert_standard_crews(&ctx.crew_repo, &ctx.employee_repo, &machine.machine_id);

    let crews = ctx
        .crew_repo
        .list_for_machine(&machine.machine_id, false)
        .unwrap();
    let report = CoverageValidator::validate(&machine, &crews);
    assert!(report.is_clean(), "findings={:?}", report.findings);

    // 把 B 班偏移改成 0: 与 A 班冲突
    let crew_b = crews.iter().find(|c| c.letter == "B").unwrap();
    ctx.crew_repo.update_cycle_offset(&crew_b.crew_id, 0).unwrap();

    let crews = ctx
        .crew_repo
        .list_for_machine(&machine.machine_id, false)
        .unwrap();
    let report = CoverageValidator::validate(&machine, &crews);
    assert!(report.has_critical());
    assert!(report
        .findings
        .iter()
        .any(|f| f.kind == CoverageFindingKind::DuplicateOffset));

    // 停用 B 班: 冲突消失,换成非标准班组数提醒
    ctx.crew_repo.set_active(&crew_b.crew_id, false).unwrap();
    let crews = ctx
        .crew_repo
        .list_for_machine(&machine.machine_id, false)
        .unwrap();
    let report = CoverageValidator::validate(&machine, &crews);
    assert!(!report.has_critical());
    assert!(report
        .findings
        .iter()
        .any(|f| f.kind == CoverageFindingKind::NonStandardCrewCount));
}

#[test]
fn test_quota_change_creates_shortfall() {
    let ctx = setup_test_context();
    let machine = insert_standard_machine(&ctx.machine_repo, "JT-01");
    insert_standard_crews(&ctx.crew_repo, &ctx.employee_repo, &machine.machine_id);

    assert_eq!(ctx.machine_repo.list_all().unwrap().len(), 1);

    // 定员上调到 3 操作工后,4 人班组缺 1 名操作工
    ctx.machine_repo
        .update_role_quotas(&machine.machine_id, 3, 1, 1)
        .unwrap();
    let staffing = resolve_from_db(&ctx, &machine.machine_id, date(2025, 7, 30));
    assert_eq!(staffing.day.required.operators, 3);
    assert_eq!(staffing.day.shortfall.operators, 1);
    assert!(!staffing.day.is_fully_staffed());
}

#[test]
fn test_cycle_anchor_change_rewrites_derived_views() {
    let ctx = setup_test_context();
    let machine = insert_standard_machine(&ctx.machine_repo, "JT-01");
    insert_standard_crews(&ctx.crew_repo, &ctx.employee_repo, &machine.machine_id);

    // 锚定 2025-07-30: 当日 A 白班
    let staffing = resolve_from_db(&ctx, &machine.machine_id, date(2025, 7, 30));
    assert_eq!(staffing.day.crews, vec!["A".to_string()]);

    // 锚点前移两天: 同一日期的视图立即重算,A 变夜班
    ctx.machine_repo
        .update_cycle_start_date(&machine.machine_id, Some(date(2025, 7, 28)))
        .unwrap();
    let staffing = resolve_from_db(&ctx, &machine.machine_id, date(2025, 7, 30));
    assert_eq!(staffing.night.crews, vec!["A".to_string()]);
    assert_eq!(staffing.day.crews, vec!["C".to_string()]);
}
