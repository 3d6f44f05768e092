// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

use chrono::NaiveDate;
use crew_scheduling::config::ConfigManager;
use crew_scheduling::domain::types::{MachineStatus, Role};
use crew_scheduling::domain::{Crew, Employee, Machine};
use crew_scheduling::repository::{
    CrewRepository, EmployeeRepository, LaborAssignmentRepository, MachineRepository,
    OverrideRepository, SupervisorAssignmentRepository,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 测试上下文: 临时数据库 + 全套仓储 + 配置管理器
pub struct TestContext {
    // 临时文件需要保持存活,否则数据库被删除
    pub _temp_file: NamedTempFile,
    pub conn: Arc<Mutex<Connection>>,
    pub employee_repo: Arc<EmployeeRepository>,
    pub machine_repo: Arc<MachineRepository>,
    pub crew_repo: Arc<CrewRepository>,
    pub override_repo: Arc<OverrideRepository>,
    pub supervisor_repo: Arc<SupervisorAssignmentRepository>,
    pub assignment_repo: Arc<LaborAssignmentRepository>,
    pub config: Arc<ConfigManager>,
}

/// 创建临时测试数据库并初始化全部仓储
///
/// 说明: 各仓储的 ensure_table 负责建表;按外键依赖顺序构造
pub fn setup_test_context() -> TestContext {
    let temp_file = NamedTempFile::new().expect("创建临时数据库失败");
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = crew_scheduling::db::open_sqlite_connection(&db_path).expect("打开数据库失败");
    let conn = Arc::new(Mutex::new(conn));

    let employee_repo =
        Arc::new(EmployeeRepository::from_connection(conn.clone()).expect("员工仓储初始化失败"));
    let machine_repo =
        Arc::new(MachineRepository::from_connection(conn.clone()).expect("机台仓储初始化失败"));
    let crew_repo =
        Arc::new(CrewRepository::from_connection(conn.clone()).expect("班组仓储初始化失败"));
    let override_repo =
        Arc::new(OverrideRepository::from_connection(conn.clone()).expect("覆盖仓储初始化失败"));
    let supervisor_repo = Arc::new(
        SupervisorAssignmentRepository::from_connection(conn.clone())
            .expect("班长指派仓储初始化失败"),
    );
    let assignment_repo = Arc::new(
        LaborAssignmentRepository::from_connection(conn.clone()).expect("指派仓储初始化失败"),
    );
    let config =
        Arc::new(ConfigManager::from_connection(conn.clone()).expect("配置管理器初始化失败"));

    TestContext {
        _temp_file: temp_file,
        conn,
        employee_repo,
        machine_repo,
        crew_repo,
        override_repo,
        supervisor_repo,
        assignment_repo,
        config,
    }
}

/// 插入测试员工并返回实体
pub fn insert_employee(
    repo: &EmployeeRepository,
    code: &str,
    name: &str,
    role: Role,
    active: bool,
) -> Employee {
    let mut employee = Employee::new(code.to_string(), name.to_string(), role);
    employee.active = active;
    repo.insert(&employee).expect("插入员工失败");
    employee
}

/// 插入标准测试机台 (定员 2操作工/1上料工/1打包工,锚定 2025-07-30)
pub fn insert_standard_machine(repo: &MachineRepository, machine_code: &str) -> Machine {
    let now = chrono::Utc::now();
    let machine = Machine {
        machine_id: uuid::Uuid::new_v4().to_string(),
        machine_code: machine_code.to_string(),
        name: format!("{} 号机台", machine_code),
        environment: "一车间".to_string(),
        operators_per_shift: 2,
        hopper_loaders_per_shift: 1,
        packers_per_shift: 1,
        shift_cycle_enabled: true,
        cycle_start_date: NaiveDate::from_ymd_opt(2025, 7, 30),
        crew_size: 4,
        status: MachineStatus::Running,
        created_at: now,
        updated_at: now,
    };
    repo.insert(&machine).expect("插入机台失败");
    machine
}

/// 为机台插入标准三班 (偏移 0/2/4),每班 2操作工+1上料工+1打包工
///
/// # 返回
/// - Vec<Crew>: 班组 (含成员ID)
pub fn insert_standard_crews(
    crew_repo: &CrewRepository,
    employee_repo: &EmployeeRepository,
    machine_id: &str,
) -> Vec<Crew> {
    let mut crews = Vec::new();
    for (letter, offset) in [("A", 0_i64), ("B", 2), ("C", 4)] {
        let mut crew = Crew::new(machine_id.to_string(), letter.to_string(), offset);
        let roles = [Role::Operator, Role::Operator, Role::Loader, Role::Packer];
        for (i, role) in roles.iter().enumerate() {
            let employee = insert_employee(
                employee_repo,
                &format!("{}-{}{}", machine_id_short(machine_id), letter, i),
                &format!("{}班成员{}", letter, i),
                *role,
                true,
            );
            crew.employee_ids.push(employee.employee_id);
        }
        crew_repo.insert(&crew).expect("插入班组失败");
        crews.push(crew);
    }
    crews
}

fn machine_id_short(machine_id: &str) -> &str {
    &machine_id[..machine_id.len().min(8)]
}

/// 常用测试日期
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
