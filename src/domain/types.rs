// ==========================================
// 车间倒班排班系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 岗位角色 (Role)
// ==========================================
// 红线: 角色 → 权限映射是数据表,不是散落的条件判断
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Operator,   // 操作工
    Loader,     // 上料工
    Packer,     // 打包工
    Supervisor, // 班长/值班长
    Admin,      // 管理员
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Operator => write!(f, "OPERATOR"),
            Role::Loader => write!(f, "LOADER"),
            Role::Packer => write!(f, "PACKER"),
            Role::Supervisor => write!(f, "SUPERVISOR"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

impl Role {
    /// 从字符串解析角色
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "OPERATOR" => Some(Role::Operator),
            "LOADER" => Some(Role::Loader),
            "PACKER" => Some(Role::Packer),
            "SUPERVISOR" => Some(Role::Supervisor),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::Operator => "OPERATOR",
            Role::Loader => "LOADER",
            Role::Packer => "PACKER",
            Role::Supervisor => "SUPERVISOR",
            Role::Admin => "ADMIN",
        }
    }
}

// ==========================================
// 班次 (Shift)
// ==========================================
// 只有白班/夜班两个可指派班次,休息不是班次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shift {
    Day,   // 白班
    Night, // 夜班
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shift::Day => write!(f, "DAY"),
            Shift::Night => write!(f, "NIGHT"),
        }
    }
}

impl Shift {
    /// 从字符串解析班次
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DAY" => Some(Shift::Day),
            "NIGHT" => Some(Shift::Night),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Shift::Day => "DAY",
            Shift::Night => "NIGHT",
        }
    }

    /// 全部班次（按报表展示顺序）
    pub fn all() -> [Shift; 2] {
        [Shift::Day, Shift::Night]
    }
}

// ==========================================
// 班组当日标签 (Shift Label)
// ==========================================
// 派生值: 由 cycle_start_date + cycle_offset 实时计算,永不落库
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftLabel {
    Day,   // 上白班
    Night, // 上夜班
    Rest,  // 轮休
}

impl fmt::Display for ShiftLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftLabel::Day => write!(f, "DAY"),
            ShiftLabel::Night => write!(f, "NIGHT"),
            ShiftLabel::Rest => write!(f, "REST"),
        }
    }
}

impl ShiftLabel {
    /// 标签是否对应某个可指派班次
    pub fn as_shift(&self) -> Option<Shift> {
        match self {
            ShiftLabel::Day => Some(Shift::Day),
            ShiftLabel::Night => Some(Shift::Night),
            ShiftLabel::Rest => None,
        }
    }
}

// ==========================================
// 角色覆盖作用域 (Shift Scope)
// ==========================================
// BOTH 行与具体班次行允许并存,解析时具体班次优先
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftScope {
    Day,   // 仅白班
    Night, // 仅夜班
    Both,  // 全天
}

impl fmt::Display for ShiftScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftScope::Day => write!(f, "DAY"),
            ShiftScope::Night => write!(f, "NIGHT"),
            ShiftScope::Both => write!(f, "BOTH"),
        }
    }
}

impl ShiftScope {
    /// 从字符串解析作用域
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DAY" => Some(ShiftScope::Day),
            "NIGHT" => Some(ShiftScope::Night),
            "BOTH" => Some(ShiftScope::Both),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ShiftScope::Day => "DAY",
            ShiftScope::Night => "NIGHT",
            ShiftScope::Both => "BOTH",
        }
    }

    /// 作用域是否覆盖指定班次
    pub fn covers(&self, shift: Shift) -> bool {
        match self {
            ShiftScope::Both => true,
            ShiftScope::Day => shift == Shift::Day,
            ShiftScope::Night => shift == Shift::Night,
        }
    }

    /// 作用域是否精确等于指定班次（非 BOTH）
    pub fn is_exactly(&self, shift: Shift) -> bool {
        match self {
            ShiftScope::Day => shift == Shift::Day,
            ShiftScope::Night => shift == Shift::Night,
            ShiftScope::Both => false,
        }
    }
}

impl From<Shift> for ShiftScope {
    fn from(shift: Shift) -> Self {
        match shift {
            Shift::Day => ShiftScope::Day,
            Shift::Night => ShiftScope::Night,
        }
    }
}

// ==========================================
// 指派状态 (Assignment Status)
// ==========================================
// 状态机: PLANNED → {PRESENT, ABSENT, CANCELLED}, PRESENT → COMPLETED
// 其余转换一律拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Planned,   // 已计划
    Present,   // 已到岗
    Absent,    // 缺勤
    Completed, // 已完成
    Cancelled, // 已取消
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentStatus::Planned => write!(f, "PLANNED"),
            AssignmentStatus::Present => write!(f, "PRESENT"),
            AssignmentStatus::Absent => write!(f, "ABSENT"),
            AssignmentStatus::Completed => write!(f, "COMPLETED"),
            AssignmentStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl AssignmentStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PLANNED" => Some(AssignmentStatus::Planned),
            "PRESENT" => Some(AssignmentStatus::Present),
            "ABSENT" => Some(AssignmentStatus::Absent),
            "COMPLETED" => Some(AssignmentStatus::Completed),
            "CANCELLED" => Some(AssignmentStatus::Cancelled),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Planned => "PLANNED",
            AssignmentStatus::Present => "PRESENT",
            AssignmentStatus::Absent => "ABSENT",
            AssignmentStatus::Completed => "COMPLETED",
            AssignmentStatus::Cancelled => "CANCELLED",
        }
    }

    /// 状态机转换表
    pub fn can_transition_to(&self, next: AssignmentStatus) -> bool {
        matches!(
            (self, next),
            (AssignmentStatus::Planned, AssignmentStatus::Present)
                | (AssignmentStatus::Planned, AssignmentStatus::Absent)
                | (AssignmentStatus::Planned, AssignmentStatus::Cancelled)
                | (AssignmentStatus::Present, AssignmentStatus::Completed)
        )
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, AssignmentStatus::Completed | AssignmentStatus::Cancelled)
    }
}

// ==========================================
// 机台状态 (Machine Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MachineStatus {
    Running,     // 运行中
    Maintenance, // 检修中(仍可排人)
    Offline,     // 停机
    Retired,     // 报废
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineStatus::Running => write!(f, "RUNNING"),
            MachineStatus::Maintenance => write!(f, "MAINTENANCE"),
            MachineStatus::Offline => write!(f, "OFFLINE"),
            MachineStatus::Retired => write!(f, "RETIRED"),
        }
    }
}

impl MachineStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "RUNNING" => Some(MachineStatus::Running),
            "MAINTENANCE" => Some(MachineStatus::Maintenance),
            "OFFLINE" => Some(MachineStatus::Offline),
            "RETIRED" => Some(MachineStatus::Retired),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            MachineStatus::Running => "RUNNING",
            MachineStatus::Maintenance => "MAINTENANCE",
            MachineStatus::Offline => "OFFLINE",
            MachineStatus::Retired => "RETIRED",
        }
    }

    /// 机台是否可接受人员指派
    pub fn is_assignable(&self) -> bool {
        matches!(self, MachineStatus::Running | MachineStatus::Maintenance)
    }
}

// ==========================================
// 机台班次占用策略 (Machine Slot Policy)
// ==========================================
// 同一 (机台, 日期, 班次) 允许一条还是多条指派,由配置决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MachineSlotPolicy {
    Exclusive, // 单人占用(默认)
    Shared,    // 多人共用
}

impl fmt::Display for MachineSlotPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineSlotPolicy::Exclusive => write!(f, "EXCLUSIVE"),
            MachineSlotPolicy::Shared => write!(f, "SHARED"),
        }
    }
}

impl MachineSlotPolicy {
    /// 从字符串解析策略
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "EXCLUSIVE" => Some(MachineSlotPolicy::Exclusive),
            "SHARED" => Some(MachineSlotPolicy::Shared),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            MachineSlotPolicy::Exclusive => "EXCLUSIVE",
            MachineSlotPolicy::Shared => "SHARED",
        }
    }
}

// ==========================================
// 规则严重度 (Rule Severity)
// ==========================================
// 顺序: Info < Warning < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleSeverity {
    Info,     // 提示
    Warning,  // 关注
    Critical, // 严重
}

impl fmt::Display for RuleSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSeverity::Info => write!(f, "INFO"),
            RuleSeverity::Warning => write!(f, "WARNING"),
            RuleSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
