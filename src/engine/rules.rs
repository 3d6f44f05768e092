// ==========================================
// 车间倒班排班系统 - 业务规则表
// ==========================================
// 职责: 封闭的类型化规则谓词集合,带严重度标签注册在静态表中
// 红线: 规则是代码里的谓词函数,不是自由查询字符串;可静态检查
// 说明: 规则产出是报告数据("严重"级也只报告不阻断),写入守卫独立于此
// ==========================================

use crate::domain::types::{RuleSeverity, Shift};
use crate::engine::workforce::DailyStaffing;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// 规则编码
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleCode {
    SupervisorShiftCoverage, // 每个班次至少一名班长
    StaffingShortfall,       // 机台班次缺员
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCode::SupervisorShiftCoverage => write!(f, "SUPERVISOR_SHIFT_COVERAGE"),
            RuleCode::StaffingShortfall => write!(f, "STAFFING_SHORTFALL"),
        }
    }
}

// ==========================================
// 规则上下文与产出
// ==========================================

/// 当日规则评估上下文
pub struct DailyRuleContext<'a> {
    pub date: NaiveDate,
    /// 班次 → 班长指派数
    pub supervisor_counts: &'a HashMap<Shift, i64>,
    /// 各机台当日人力汇总 (可为空,不参与班长覆盖规则)
    pub staffing: &'a [DailyStaffing],
}

/// 单条规则发现
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleFinding {
    pub rule: RuleCode,
    pub severity: RuleSeverity,
    pub date: NaiveDate,
    pub shift: Option<Shift>,
    pub machine_id: Option<String>,
    pub message: String,
}

// ==========================================
// 规则表
// ==========================================

/// 类型化业务规则
pub struct BusinessRule {
    pub code: RuleCode,
    pub severity: RuleSeverity,
    pub check: fn(&DailyRuleContext<'_>, RuleSeverity) -> Vec<RuleFinding>,
}

/// 注册表: 新增规则 = 新增一行
static DAILY_RULES: &[BusinessRule] = &[
    BusinessRule {
        code: RuleCode::SupervisorShiftCoverage,
        severity: RuleSeverity::Critical,
        check: check_supervisor_coverage,
    },
    BusinessRule {
        code: RuleCode::StaffingShortfall,
        severity: RuleSeverity::Warning,
        check: check_staffing_shortfall,
    },
];

/// 当日规则全集
pub fn daily_rules() -> &'static [BusinessRule] {
    DAILY_RULES
}

/// 评估当日全部规则
pub fn evaluate_daily_rules(ctx: &DailyRuleContext<'_>) -> Vec<RuleFinding> {
    let mut findings = Vec::new();
    for rule in DAILY_RULES {
        findings.extend((rule.check)(ctx, rule.severity));
    }
    findings
}

// ==========================================
// 规则谓词
// ==========================================

fn check_supervisor_coverage(
    ctx: &DailyRuleContext<'_>,
    severity: RuleSeverity,
) -> Vec<RuleFinding> {
    let mut findings = Vec::new();
    for shift in Shift::all() {
        let count = ctx.supervisor_counts.get(&shift).copied().unwrap_or(0);
        if count == 0 {
            findings.push(RuleFinding {
                rule: RuleCode::SupervisorShiftCoverage,
                severity,
                date: ctx.date,
                shift: Some(shift),
                machine_id: None,
                message: format!("{} {} 班无班长指派", ctx.date, shift),
            });
        }
    }
    findings
}

fn check_staffing_shortfall(
    ctx: &DailyRuleContext<'_>,
    severity: RuleSeverity,
) -> Vec<RuleFinding> {
    let mut findings = Vec::new();
    for staffing in ctx.staffing {
        for shift_staffing in [&staffing.day, &staffing.night] {
            if shift_staffing.shortfall.total > 0 {
                findings.push(RuleFinding {
                    rule: RuleCode::StaffingShortfall,
                    severity,
                    date: ctx.date,
                    shift: Some(shift_staffing.shift),
                    machine_id: Some(staffing.machine_id.clone()),
                    message: format!(
                        "机台 {} {} 班缺员 {} 人 (操作工{}/上料工{}/打包工{})",
                        staffing.machine_id,
                        shift_staffing.shift,
                        shift_staffing.shortfall.total,
                        shift_staffing.shortfall.operators,
                        shift_staffing.shortfall.loaders,
                        shift_staffing.shortfall.packers,
                    ),
                });
            }
        }
    }
    findings
}
