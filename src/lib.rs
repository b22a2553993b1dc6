// ==========================================
// 考场排座系统 - 核心库
// ==========================================
// 系统定位: 纯函数式分配引擎, 每次调用只依赖输入
// 边界: HTTP 路由、认证、文件解析、持久化、PDF 渲染
//       均为外部协作方, 不在本库范围内
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 分配规则
pub mod engine;

// 配置层 - 构造期校验
pub mod config;

// 名册提供方边界
pub mod provider;

// 错误类型
pub mod error;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{BlockOrientation, SeatStatus, SerialMode, ViolationKind};

// 领域实体
pub use domain::{
    Batch, BatchRegistry, FeasibilityReport, Grid, LabelRule, LabelWarning, Seat, SeatPos,
    Violation,
};

// 配置
pub use config::{AllocationConfig, AllocationConfigBuilder, LayoutParams};

// 引擎
pub use engine::{
    AdjacencyResolver, AllocationRun, ConstraintValidator, GridBuilder, Projector,
    RollSynthesizer, SeatingEngine, SeatingProjection,
};

// 名册边界
pub use provider::{BatchRoster, InMemoryRosterProvider, RosterProvider};

// 错误
pub use error::{EngineError, EngineResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "考场排座系统";
