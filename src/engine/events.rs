// ==========================================
// 车间倒班排班系统 - 引擎层事件发布
// ==========================================
// 职责: 定义排班变更事件发布 trait,实现依赖倒置
// 说明: Engine 层定义 trait,推送/分发由外部系统实现适配器
// ==========================================

use crate::domain::types::Shift;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// 排班事件类型
// ==========================================

/// 排班变更事件类型
///
/// Engine 层定义的事件类型,用于通知下游系统(推送分发在引擎之外)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkforceEventType {
    /// 人力指派创建
    AssignmentCreated,
    /// 指派状态推进
    AssignmentStatusChanged,
    /// 当日角色覆盖创建
    OverrideCreated,
    /// 班长指派创建
    SupervisorAssigned,
    /// 班组配置变更
    CrewConfigChanged,
    /// 轮换锚定日期变更
    CycleAnchorChanged,
}

impl WorkforceEventType {
    /// 转换为字符串标识
    pub fn as_str(&self) -> &str {
        match self {
            WorkforceEventType::AssignmentCreated => "AssignmentCreated",
            WorkforceEventType::AssignmentStatusChanged => "AssignmentStatusChanged",
            WorkforceEventType::OverrideCreated => "OverrideCreated",
            WorkforceEventType::SupervisorAssigned => "SupervisorAssigned",
            WorkforceEventType::CrewConfigChanged => "CrewConfigChanged",
            WorkforceEventType::CycleAnchorChanged => "CycleAnchorChanged",
        }
    }
}

/// 排班变更事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkforceEvent {
    /// 事件类型
    pub event_type: WorkforceEventType,
    /// 事件来源描述
    pub source: Option<String>,
    /// 受影响机台 (None 表示与机台无关,如班长指派)
    pub machine_id: Option<String>,
    /// 受影响员工
    pub employee_id: Option<String>,
    /// 受影响日期
    pub date: Option<NaiveDate>,
    /// 受影响班次
    pub shift: Option<Shift>,
}

impl WorkforceEvent {
    /// 创建指派类事件
    pub fn assignment(
        event_type: WorkforceEventType,
        machine_id: Option<String>,
        employee_id: String,
        date: NaiveDate,
        shift: Shift,
    ) -> Self {
        Self {
            event_type,
            source: Some("AssignmentGuard".to_string()),
            machine_id,
            employee_id: Some(employee_id),
            date: Some(date),
            shift: Some(shift),
        }
    }

    /// 创建配置类事件
    pub fn config(event_type: WorkforceEventType, machine_id: String) -> Self {
        Self {
            event_type,
            source: Some("WorkforceConfig".to_string()),
            machine_id: Some(machine_id),
            employee_id: None,
            date: None,
            shift: None,
        }
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 排班事件发布者 Trait
///
/// Engine 层定义,分发层(推送/消息队列)实现
/// 通过 trait 实现依赖倒置,引擎不依赖任何传输机制
pub trait WorkforceEventPublisher: Send + Sync {
    /// 发布排班变更事件
    ///
    /// # 返回
    /// - `Ok(())`: 已交付分发层
    /// - `Err`: 发布失败(调用方自行决定是否忽略)
    fn publish(&self, event: WorkforceEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
///
/// 用于不需要事件发布的场景(如单元测试)
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl WorkforceEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: WorkforceEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpEventPublisher: 跳过事件发布 - event_type={}",
            event.event_type.as_str()
        );
        Ok(())
    }
}

/// 可选的事件发布者包装
///
/// 简化 Option<Arc<dyn WorkforceEventPublisher>> 的使用
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn WorkforceEventPublisher>>,
}

impl OptionalEventPublisher {
    /// 创建带发布者的实例
    pub fn with_publisher(publisher: Arc<dyn WorkforceEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    /// 创建空实例（不发布事件）
    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 发布事件（如果有发布者）
    pub fn publish(&self, event: WorkforceEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        match &self.inner {
            Some(publisher) => publisher.publish(event),
            None => {
                tracing::debug!(
                    "OptionalEventPublisher: 未配置发布者,跳过事件 - event_type={}",
                    event.event_type.as_str()
                );
                Ok(())
            }
        }
    }

    /// 检查是否配置了发布者
    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalEventPublisher {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// 记录型发布者,测试事件是否被发出
    #[derive(Default)]
    struct RecordingPublisher {
        events: Mutex<Vec<WorkforceEvent>>,
    }

    impl WorkforceEventPublisher for RecordingPublisher {
        fn publish(&self, event: WorkforceEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    #[test]
    fn test_noop_publisher() {
        let publisher = NoOpEventPublisher;
        let event = WorkforceEvent::config(
            WorkforceEventType::CrewConfigChanged,
            "M001".to_string(),
        );
        assert!(publisher.publish(event).is_ok());
    }

    #[test]
    fn test_optional_publisher_none() {
        let publisher = OptionalEventPublisher::none();
        assert!(!publisher.is_configured());
        let event = WorkforceEvent::config(
            WorkforceEventType::CycleAnchorChanged,
            "M001".to_string(),
        );
        assert!(publisher.publish(event).is_ok());
    }

    #[test]
    fn test_optional_publisher_delegates() {
        let recorder = Arc::new(RecordingPublisher::default());
        let publisher =
            OptionalEventPublisher::with_publisher(recorder.clone() as Arc<dyn WorkforceEventPublisher>);
        assert!(publisher.is_configured());

        let date = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let event = WorkforceEvent::assignment(
            WorkforceEventType::AssignmentCreated,
            Some("M001".to_string()),
            "E001".to_string(),
            date,
            Shift::Day,
        );
        publisher.publish(event).unwrap();

        let recorded = recorder.events.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].event_type, WorkforceEventType::AssignmentCreated);
        assert_eq!(recorded[0].employee_id.as_deref(), Some("E001"));
    }
}
