// ==========================================
// 车间倒班排班系统 - 引擎层错误类型
// ==========================================
// 职责: 定义可区分的失败类别
// 分类: 资格类(硬失败,改参重试) / 冲突类(硬失败,同参重试必败) /
//       状态机类(硬失败,不重试) / 输入类(调用方缺陷)
// 说明: 配置类发现(班组配置问题)是报告数据,不是错误
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 输入错误 =====
    #[error("无效的轮换偏移: offset={offset} (合法范围 0..6)")]
    InvalidOffset { offset: i64 },

    // ===== 资格错误 =====
    #[error("员工已离职/停用: employee_id={employee_id}")]
    InactiveEmployee { employee_id: String },

    #[error("机台不可指派: machine_id={machine_id}, status={status}")]
    MachineUnavailable { machine_id: String, status: String },

    #[error("需要班长角色: employee_id={employee_id}, 当日有效角色={actual_role}")]
    SupervisorRoleRequired {
        employee_id: String,
        actual_role: String,
    },

    // ===== 冲突错误 =====
    #[error("员工当日班次已有指派: employee_id={employee_id}, date={date}, shift={shift}")]
    DuplicateEmployeeAssignment {
        employee_id: String,
        date: String,
        shift: String,
    },

    #[error("机台班次槽位已占用: machine_id={machine_id}, date={date}, shift={shift}")]
    DuplicateMachineAssignment {
        machine_id: String,
        date: String,
        shift: String,
    },

    #[error("角色覆盖已存在: employee_id={employee_id}, date={date}, scope={scope}")]
    DuplicateOverride {
        employee_id: String,
        date: String,
        scope: String,
    },

    #[error("班长指派已存在: supervisor_id={supervisor_id}, date={date}, shift={shift}")]
    DuplicateSupervisorAssignment {
        supervisor_id: String,
        date: String,
        shift: String,
    },

    // ===== 状态机错误 =====
    #[error("无效的状态转换: from={from} to={to}")]
    InvalidTransition { from: String, to: String },

    // ===== 底层错误透传 =====
    #[error("配置读取失败: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
