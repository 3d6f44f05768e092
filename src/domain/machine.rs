// ==========================================
// 车间倒班排班系统 - 机台与班组领域模型
// ==========================================
// 红线: 班组当日标签永远由 cycle_start_date + cycle_offset 实时推导,不落库
// 修改 cycle_start_date 会回溯性地改变历史视图 (单一事实来源,有意为之)
// ==========================================

use crate::domain::types::MachineStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Machine - 机台
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub machine_id: String,              // 机台ID (UUID)
    pub machine_code: String,            // 机台编码 (唯一)
    pub name: String,                    // 机台名称
    pub environment: String,             // 环境标签 (车间/产线)
    pub operators_per_shift: i32,        // 每班操作工定员
    pub hopper_loaders_per_shift: i32,   // 每班上料工定员
    pub packers_per_shift: i32,          // 每班打包工定员
    pub shift_cycle_enabled: bool,       // 是否启用 2-2-2 轮换
    pub cycle_start_date: Option<NaiveDate>, // 轮换锚定日期
    pub crew_size: i32,                  // 班组目标人数(参考值)
    pub status: MachineStatus,           // 机台状态
    pub created_at: DateTime<Utc>,       // 创建时间
    pub updated_at: DateTime<Utc>,       // 更新时间
}

impl Machine {
    /// 机台是否可接受人员指派
    pub fn is_assignable(&self) -> bool {
        self.status.is_assignable()
    }

    /// 每班定员总数
    pub fn required_per_shift(&self) -> i32 {
        self.operators_per_shift + self.hopper_loaders_per_shift + self.packers_per_shift
    }
}

// ==========================================
// Crew - 班组
// ==========================================
// 班组隶属唯一机台;成员关系是多对多,不独占员工
// 不变量: 同一机台激活班组的 offset 两两互异 (mod 6)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crew {
    pub crew_id: String,             // 班组ID (UUID)
    pub machine_id: String,          // 所属机台
    pub letter: String,              // 班组标识 (甲=A/乙=B/丙=C,可扩展)
    pub cycle_offset: i64,           // 轮换偏移 (0..6,常规三班取 0/2/4)
    pub active: bool,                // 激活标记
    pub employee_ids: Vec<String>,   // 成员员工ID集合
    pub created_at: DateTime<Utc>,   // 创建时间
    pub updated_at: DateTime<Utc>,   // 更新时间
}

impl Crew {
    /// 创建新班组（自动生成 UUID 和时间戳）
    pub fn new(machine_id: String, letter: String, cycle_offset: i64) -> Self {
        let now = Utc::now();
        Self {
            crew_id: uuid::Uuid::new_v4().to_string(),
            machine_id,
            letter,
            cycle_offset,
            active: true,
            employee_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 成员数
    pub fn member_count(&self) -> usize {
        self.employee_ids.len()
    }

    /// 是否包含指定员工
    pub fn has_member(&self, employee_id: &str) -> bool {
        self.employee_ids.iter().any(|id| id == employee_id)
    }
}
