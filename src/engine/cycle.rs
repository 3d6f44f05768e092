// ==========================================
// 车间倒班排班系统 - 轮换计算纯函数库
// ==========================================
// 职责: "2-2-2" 班组轮换的当日标签推导
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================
// 模式: 两天白班 → 两天夜班 → 两天轮休,周期 6 天
// 三班偏移取 {0,2,4} 时,任意日期恰好一班白、一班夜、一班休
// ==========================================

use crate::domain::types::ShiftLabel;
use crate::engine::error::{EngineError, EngineResult};
use chrono::NaiveDate;

/// 轮换周期天数 (2白 + 2夜 + 2休)
pub const CYCLE_LENGTH_DAYS: i64 = 6;

// ==========================================
// CycleCore - 纯函数工具类
// ==========================================
pub struct CycleCore;

impl CycleCore {
    /// 校验轮换偏移合法性 (整数且落在 [0, 6) 区间)
    pub fn validate_offset(offset: i64) -> EngineResult<()> {
        if (0..CYCLE_LENGTH_DAYS).contains(&offset) {
            Ok(())
        } else {
            Err(EngineError::InvalidOffset { offset })
        }
    }

    /// 计算班组在周期中的位置 (0..6)
    ///
    /// # 规则
    /// - days_since_start = date - cycle_start (整天差,date 早于锚点时为负)
    /// - cycle_day = floor_mod(days_since_start + offset, 6)
    ///
    /// 注意: 负数取模必须用 rem_euclid 归一化到 [0,6),
    /// 截断取模会让锚点之前的日期算出负的周期位置
    pub fn cycle_day(date: NaiveDate, cycle_start: NaiveDate, offset: i64) -> EngineResult<i64> {
        Self::validate_offset(offset)?;
        let days_since_start = date.signed_duration_since(cycle_start).num_days();
        Ok((days_since_start + offset).rem_euclid(CYCLE_LENGTH_DAYS))
    }

    /// 计算班组当日标签
    ///
    /// # 映射
    /// - cycle_day ∈ {0,1} → 白班
    /// - cycle_day ∈ {2,3} → 夜班
    /// - cycle_day ∈ {4,5} → 轮休
    pub fn shift_label(
        date: NaiveDate,
        cycle_start: NaiveDate,
        offset: i64,
    ) -> EngineResult<ShiftLabel> {
        let cycle_day = Self::cycle_day(date, cycle_start, offset)?;
        Ok(match cycle_day {
            0 | 1 => ShiftLabel::Day,
            2 | 3 => ShiftLabel::Night,
            _ => ShiftLabel::Rest,
        })
    }
}
