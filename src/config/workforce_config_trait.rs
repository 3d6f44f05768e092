// ==========================================
// 车间倒班排班系统 - 配置读取 Trait
// ==========================================
// 职责: 定义引擎所需的配置读取接口
// 红线: 配置是显式注入的不可变值(Arc),不是模块级单例;
//       同一进程可携带多套配置并行测试
// ==========================================

use crate::domain::types::MachineSlotPolicy;
use async_trait::async_trait;
use std::error::Error;

/// 排班引擎配置读取接口
///
/// # 实现
/// - ConfigManager: 从 config_kv 表读取
/// - 测试中可用内存 Mock 实现
#[async_trait]
pub trait WorkforceConfigReader: Send + Sync {
    /// 机台班次槽位占用策略 (默认 EXCLUSIVE)
    async fn get_machine_slot_policy(
        &self,
    ) -> Result<MachineSlotPolicy, Box<dyn Error + Send + Sync>>;

    /// 预览默认天数 (默认 14)
    async fn get_preview_default_days(&self) -> Result<u32, Box<dyn Error + Send + Sync>>;

    /// 预览最大天数 (默认 90)
    async fn get_preview_max_days(&self) -> Result<u32, Box<dyn Error + Send + Sync>>;
}
