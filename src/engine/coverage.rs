// ==========================================
// 车间倒班排班系统 - 覆盖校验引擎
// ==========================================
// 职责: 检查机台班组配置是否满足 24/7 覆盖不变量
// 红线: 校验结果仅用于展示提醒,永不阻断指派/覆盖写入
// ==========================================

use crate::domain::types::RuleSeverity;
use crate::domain::{Crew, Machine};
use crate::engine::cycle::CYCLE_LENGTH_DAYS;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 标准班组数 (三班两两错开偏移 2,模式的正确性只对该配置成立)
pub const STANDARD_CREW_COUNT: usize = 3;

// ==========================================
// 覆盖配置发现
// ==========================================

/// 发现类别
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoverageFindingKind {
    NoCrewsConfigured,    // 启用轮换但无激活班组
    NonStandardCrewCount, // 激活班组数不是 3
    DuplicateOffset,      // 两个激活班组偏移同余 (mod 6)
    EmptyCrew,            // 班组无成员
}

impl CoverageFindingKind {
    /// 发现对应的严重度
    pub fn severity(&self) -> RuleSeverity {
        match self {
            CoverageFindingKind::NoCrewsConfigured => RuleSeverity::Critical,
            CoverageFindingKind::NonStandardCrewCount => RuleSeverity::Warning,
            CoverageFindingKind::DuplicateOffset => RuleSeverity::Critical,
            CoverageFindingKind::EmptyCrew => RuleSeverity::Warning,
        }
    }
}

/// 单条覆盖发现
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageFinding {
    pub kind: CoverageFindingKind,
    pub severity: RuleSeverity,
    pub crew_letter: Option<String>,
    pub message: String,
}

/// 覆盖校验报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageReport {
    pub machine_id: String,
    pub findings: Vec<CoverageFinding>,
}

impl CoverageReport {
    /// 是否不存在任何发现
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// 是否存在严重级发现(覆盖保证已破坏)
    pub fn has_critical(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.severity == RuleSeverity::Critical)
    }
}

// ==========================================
// CoverageValidator - 覆盖校验引擎
// ==========================================
pub struct CoverageValidator;

impl CoverageValidator {
    /// 校验机台的班组配置
    ///
    /// # 检查顺序
    /// 1. 启用轮换但无激活班组 → NoCrewsConfigured (严重)
    /// 2. 激活班组数 ≠ 3 → NonStandardCrewCount (关注,接受但不默认可信)
    /// 3. 激活班组偏移同余 (mod 6) → DuplicateOffset (严重)
    /// 4. 班组无成员 → EmptyCrew (关注)
    pub fn validate(machine: &Machine, crews: &[Crew]) -> CoverageReport {
        let mut findings = Vec::new();
        let active_crews: Vec<&Crew> = crews.iter().filter(|c| c.active).collect();

        // === 检查 1: 无激活班组 ===
        if machine.shift_cycle_enabled && active_crews.is_empty() {
            findings.push(CoverageFinding {
                kind: CoverageFindingKind::NoCrewsConfigured,
                severity: CoverageFindingKind::NoCrewsConfigured.severity(),
                crew_letter: None,
                message: format!("机台 {} 启用了轮换但没有激活班组", machine.machine_code),
            });
        }

        // === 检查 2: 非标准班组数 ===
        if !active_crews.is_empty() && active_crews.len() != STANDARD_CREW_COUNT {
            findings.push(CoverageFinding {
                kind: CoverageFindingKind::NonStandardCrewCount,
                severity: CoverageFindingKind::NonStandardCrewCount.severity(),
                crew_letter: None,
                message: format!(
                    "激活班组数为 {} (标准为 {}),轮换模式正确性未经验证",
                    active_crews.len(),
                    STANDARD_CREW_COUNT
                ),
            });
        }

        // === 检查 3: 偏移同余冲突 ===
        let mut by_residue: HashMap<i64, Vec<&str>> = HashMap::new();
        for crew in &active_crews {
            by_residue
                .entry(crew.cycle_offset.rem_euclid(CYCLE_LENGTH_DAYS))
                .or_default()
                .push(crew.letter.as_str());
        }
        let mut residues: Vec<_> = by_residue.iter().collect();
        residues.sort_by_key(|(residue, _)| **residue);
        for (residue, letters) in residues {
            if letters.len() > 1 {
                findings.push(CoverageFinding {
                    kind: CoverageFindingKind::DuplicateOffset,
                    severity: CoverageFindingKind::DuplicateOffset.severity(),
                    crew_letter: None,
                    message: format!(
                        "班组 {} 的轮换偏移同余 (mod {} = {}),覆盖保证被破坏",
                        letters.join("/"),
                        CYCLE_LENGTH_DAYS,
                        residue
                    ),
                });
            }
        }

        // === 检查 4: 空班组 ===
        for crew in &active_crews {
            if crew.employee_ids.is_empty() {
                findings.push(CoverageFinding {
                    kind: CoverageFindingKind::EmptyCrew,
                    severity: CoverageFindingKind::EmptyCrew.severity(),
                    crew_letter: Some(crew.letter.clone()),
                    message: format!("班组 {} 没有成员", crew.letter),
                });
            }
        }

        CoverageReport {
            machine_id: machine.machine_id.clone(),
            findings,
        }
    }
}
