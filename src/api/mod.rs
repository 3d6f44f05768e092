// ==========================================
// 车间倒班排班系统 - API 层
// ==========================================
// 职责: 面向协作方(展示层/报表)的业务接口
// 红线: 查询接口无副作用;写入统一经守卫 + 权限表
// ==========================================

pub mod error;
pub mod schedule_api;
pub mod workforce_api;

pub use error::{ApiError, ApiResult};
pub use schedule_api::ScheduleApi;
pub use workforce_api::WorkforceApi;
