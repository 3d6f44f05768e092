// ==========================================
// 车间倒班排班系统 - 排班预览生成器
// ==========================================
// 职责: 生成未来 N 天的班组轮换预览序列
// 红线: 只回答"轮换模式说什么",不读取指派/覆盖状态
// 说明: 偏移在构造时一次性校验,迭代过程不再出错;
//       序列有限、可重启(Clone 后从头再走)
// ==========================================

use crate::domain::types::ShiftLabel;
use crate::domain::Crew;
use crate::engine::cycle::CycleCore;
use crate::engine::error::EngineResult;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

// ==========================================
// 预览条目
// ==========================================

/// 单日轮换预览
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewDay {
    pub date: NaiveDate,
    pub day: Option<String>,   // 白班班组标识 (覆盖缺口时为 None)
    pub night: Option<String>, // 夜班班组标识
    pub rest: Vec<String>,     // 轮休班组标识
}

// ==========================================
// SchedulePreview - 有限可重启惰性序列
// ==========================================
#[derive(Debug, Clone)]
pub struct SchedulePreview {
    cycle_start: NaiveDate,
    crews: Vec<(String, i64)>, // (班组标识, 偏移),构造时已校验
    next_date: NaiveDate,
    remaining: u32,
}

impl Iterator for SchedulePreview {
    type Item = PreviewDay;

    fn next(&mut self) -> Option<PreviewDay> {
        if self.remaining == 0 {
            return None;
        }
        let date = self.next_date;
        self.next_date = date + Duration::days(1);
        self.remaining -= 1;

        let mut day = None;
        let mut night = None;
        let mut rest = Vec::new();
        for (letter, offset) in &self.crews {
            // 偏移在构造时已经过 validate_offset,这里不会失败
            let label = CycleCore::shift_label(date, self.cycle_start, *offset)
                .unwrap_or(ShiftLabel::Rest);
            match label {
                ShiftLabel::Day => {
                    if day.is_none() {
                        day = Some(letter.clone());
                    }
                }
                ShiftLabel::Night => {
                    if night.is_none() {
                        night = Some(letter.clone());
                    }
                }
                ShiftLabel::Rest => rest.push(letter.clone()),
            }
        }

        Some(PreviewDay {
            date,
            day,
            night,
            rest,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SchedulePreview {}

// ==========================================
// SchedulePreviewGenerator - 预览入口
// ==========================================
pub struct SchedulePreviewGenerator;

impl SchedulePreviewGenerator {
    /// 构造机台的排班预览序列
    ///
    /// # 参数
    /// - cycle_start: 机台轮换锚定日期
    /// - crews: 班组集合 (仅激活班组参与)
    /// - start_date: 预览起始日期
    /// - days: 预览天数 (引擎不设上限,调用方应限定,如 14~90 天)
    ///
    /// # 错误
    /// - InvalidOffset: 任一激活班组偏移不在 [0,6)
    pub fn preview(
        cycle_start: NaiveDate,
        crews: &[Crew],
        start_date: NaiveDate,
        days: u32,
    ) -> EngineResult<SchedulePreview> {
        let mut validated = Vec::new();
        for crew in crews.iter().filter(|c| c.active) {
            CycleCore::validate_offset(crew.cycle_offset)?;
            validated.push((crew.letter.clone(), crew.cycle_offset));
        }
        validated.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(SchedulePreview {
            cycle_start,
            crews: validated,
            next_date: start_date,
            remaining: days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::EngineError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn standard_crews() -> Vec<Crew> {
        vec![
            Crew::new("M001".to_string(), "A".to_string(), 0),
            Crew::new("M001".to_string(), "B".to_string(), 2),
            Crew::new("M001".to_string(), "C".to_string(), 4),
        ]
    }

    #[test]
    fn test_preview_exact_length_and_increasing_dates() {
        let anchor = date(2025, 7, 30);
        let preview =
            SchedulePreviewGenerator::preview(anchor, &standard_crews(), anchor, 30).unwrap();
        let rows: Vec<PreviewDay> = preview.collect();
        assert_eq!(rows.len(), 30);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.date, anchor + Duration::days(i as i64));
        }
    }

    #[test]
    fn test_preview_first_week_pattern() {
        let anchor = date(2025, 7, 30);
        let rows: Vec<PreviewDay> =
            SchedulePreviewGenerator::preview(anchor, &standard_crews(), anchor, 6)
                .unwrap()
                .collect();

        // 6 天一个完整周期: A 白白夜夜休休 / B 夜夜休休白白 / C 休休白白夜夜
        let expect = [
            ("A", "B", vec!["C"]),
            ("A", "B", vec!["C"]),
            ("C", "A", vec!["B"]),
            ("C", "A", vec!["B"]),
            ("B", "C", vec!["A"]),
            ("B", "C", vec!["A"]),
        ];
        for (row, (day, night, rest)) in rows.iter().zip(expect.iter()) {
            assert_eq!(row.day.as_deref(), Some(*day), "date={}", row.date);
            assert_eq!(row.night.as_deref(), Some(*night), "date={}", row.date);
            let rest_expected: Vec<String> = rest.iter().map(|s| s.to_string()).collect();
            assert_eq!(row.rest, rest_expected, "date={}", row.date);
        }
    }

    #[test]
    fn test_preview_restartable() {
        let anchor = date(2025, 7, 30);
        let preview =
            SchedulePreviewGenerator::preview(anchor, &standard_crews(), anchor, 14).unwrap();
        let restart = preview.clone();

        let first: Vec<PreviewDay> = preview.collect();
        let second: Vec<PreviewDay> = restart.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_preview_zero_days_is_empty() {
        let anchor = date(2025, 7, 30);
        let mut preview =
            SchedulePreviewGenerator::preview(anchor, &standard_crews(), anchor, 0).unwrap();
        assert!(preview.next().is_none());
    }

    #[test]
    fn test_preview_rejects_invalid_offset() {
        let anchor = date(2025, 7, 30);
        let mut crews = standard_crews();
        crews[1].cycle_offset = 9;
        let result = SchedulePreviewGenerator::preview(anchor, &crews, anchor, 7);
        assert!(matches!(result, Err(EngineError::InvalidOffset { offset: 9 })));
    }

    #[test]
    fn test_preview_ignores_inactive_crews() {
        let anchor = date(2025, 7, 30);
        let mut crews = standard_crews();
        crews[2].active = false; // C 停用
        let rows: Vec<PreviewDay> =
            SchedulePreviewGenerator::preview(anchor, &crews, anchor, 6)
                .unwrap()
                .collect();
        // C 轮休的位置出现覆盖缺口
        assert!(rows.iter().any(|r| r.day.is_none() || r.night.is_none()));
        assert!(rows.iter().all(|r| !r.rest.contains(&"C".to_string())));
    }

    #[test]
    fn test_duplicate_offset_first_crew_wins_slot() {
        // 覆盖校验是另一条通道;预览对残缺配置仍须给出确定性输出
        let anchor = date(2025, 7, 30);
        let crews = vec![
            Crew::new("M001".to_string(), "A".to_string(), 0),
            Crew::new("M001".to_string(), "B".to_string(), 0),
        ];
        let rows: Vec<PreviewDay> = SchedulePreviewGenerator::preview(anchor, &crews, anchor, 2)
            .unwrap()
            .collect();
        // 同偏移时按字母序首个班组占槽
        assert_eq!(rows[0].day.as_deref(), Some("A"));
        assert_eq!(rows[0].night, None);
    }
}
