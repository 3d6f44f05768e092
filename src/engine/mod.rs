// ==========================================
// 车间倒班排班系统 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: 轮换/覆盖/人力解析全部无副作用;写入只走 AssignmentGuard
// ==========================================

pub mod assignment_guard;
pub mod coverage;
pub mod cycle;
pub mod error;
pub mod events;
pub mod override_resolver;
pub mod preview;
pub mod rules;
pub mod workforce;

// 重导出核心引擎
pub use assignment_guard::AssignmentGuard;
pub use coverage::{CoverageFinding, CoverageFindingKind, CoverageReport, CoverageValidator};
pub use cycle::{CycleCore, CYCLE_LENGTH_DAYS};
pub use error::{EngineError, EngineResult};
pub use events::{
    NoOpEventPublisher, OptionalEventPublisher, WorkforceEvent, WorkforceEventPublisher,
    WorkforceEventType,
};
pub use override_resolver::OverrideResolver;
pub use preview::{PreviewDay, SchedulePreview, SchedulePreviewGenerator};
pub use rules::{evaluate_daily_rules, DailyRuleContext, RuleCode, RuleFinding};
pub use workforce::{DailyStaffing, RoleBreakdown, ShiftStaffing, WorkforceResolver};
