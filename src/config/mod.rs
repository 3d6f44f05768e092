// ==========================================
// 车间倒班排班系统 - 配置层
// ==========================================
// 职责: 配置存取与引擎配置读取接口
// ==========================================

pub mod config_manager;
pub mod workforce_config_trait;

pub use config_manager::{
    ConfigManager, DEFAULT_MACHINE_SLOT_POLICY, DEFAULT_PREVIEW_DEFAULT_DAYS,
    DEFAULT_PREVIEW_MAX_DAYS, KEY_MACHINE_SLOT_POLICY, KEY_PREVIEW_DEFAULT_DAYS,
    KEY_PREVIEW_MAX_DAYS,
};
pub use workforce_config_trait::WorkforceConfigReader;
