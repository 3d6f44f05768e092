// ==========================================
// 车间倒班排班系统 - 数据仓储层
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod assignment_repo;
pub mod crew_repo;
pub mod employee_repo;
pub mod error;
pub mod machine_repo;
pub mod override_repo;
pub mod supervisor_repo;

// 重导出核心仓储
pub use assignment_repo::LaborAssignmentRepository;
pub use crew_repo::CrewRepository;
pub use employee_repo::EmployeeRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use machine_repo::MachineRepository;
pub use override_repo::OverrideRepository;
pub use supervisor_repo::SupervisorAssignmentRepository;
