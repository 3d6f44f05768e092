// ==========================================
// 车间倒班排班系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,转换 Repository/Engine 错误为用户可读的错误
// 红线: 每个失败类别保持可区分,调用方能按类别决定是否/如何重试
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 权限错误
    // ==========================================
    #[error("无操作权限: actor={actor}, 操作={operation}")]
    PermissionDenied { actor: String, operation: String },

    // ==========================================
    // 资格错误 (改参重试)
    // ==========================================
    #[error("员工已离职/停用: {0}")]
    InactiveEmployee(String),

    #[error("机台不可指派: {machine_id} (状态={status})")]
    MachineUnavailable { machine_id: String, status: String },

    #[error("需要班长角色: {employee_id} 当日有效角色为 {actual_role}")]
    SupervisorRoleRequired {
        employee_id: String,
        actual_role: String,
    },

    // ==========================================
    // 冲突错误 (同参重试必败)
    // ==========================================
    #[error("员工当日班次已有指派: {0}")]
    DuplicateEmployeeAssignment(String),

    #[error("机台班次槽位已占用: {0}")]
    DuplicateMachineAssignment(String),

    #[error("角色覆盖已存在: {0}")]
    DuplicateOverride(String),

    #[error("班长指派已存在: {0}")]
    DuplicateSupervisorAssignment(String),

    // ==========================================
    // 状态机错误 (不重试)
    // ==========================================
    #[error("无效的状态转换: from={from} to={to}")]
    InvalidTransition { from: String, to: String },

    // ==========================================
    // 输入错误 (调用方缺陷)
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("无效的轮换偏移: {0}")]
    InvalidOffset(i64),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::UniqueConstraintViolation(msg) => {
                // 仓储层冲突未被守卫映射时的兜底
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::InvalidInput(format!("外键约束违反: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// 目的: 守卫层已经把冲突/资格/状态机错误分类完毕,逐类透传
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidOffset { offset } => ApiError::InvalidOffset(offset),
            EngineError::InactiveEmployee { employee_id } => {
                ApiError::InactiveEmployee(employee_id)
            }
            EngineError::MachineUnavailable { machine_id, status } => {
                ApiError::MachineUnavailable { machine_id, status }
            }
            EngineError::SupervisorRoleRequired {
                employee_id,
                actual_role,
            } => ApiError::SupervisorRoleRequired {
                employee_id,
                actual_role,
            },
            EngineError::DuplicateEmployeeAssignment {
                employee_id,
                date,
                shift,
            } => ApiError::DuplicateEmployeeAssignment(format!(
                "employee={}, date={}, shift={}",
                employee_id, date, shift
            )),
            EngineError::DuplicateMachineAssignment {
                machine_id,
                date,
                shift,
            } => ApiError::DuplicateMachineAssignment(format!(
                "machine={}, date={}, shift={}",
                machine_id, date, shift
            )),
            EngineError::DuplicateOverride {
                employee_id,
                date,
                scope,
            } => ApiError::DuplicateOverride(format!(
                "employee={}, date={}, scope={}",
                employee_id, date, scope
            )),
            EngineError::DuplicateSupervisorAssignment {
                supervisor_id,
                date,
                shift,
            } => ApiError::DuplicateSupervisorAssignment(format!(
                "supervisor={}, date={}, shift={}",
                supervisor_id, date, shift
            )),
            EngineError::InvalidTransition { from, to } => {
                ApiError::InvalidTransition { from, to }
            }
            EngineError::ConfigError(msg) => ApiError::ConfigError(msg),
            EngineError::Repository(repo_err) => repo_err.into(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
