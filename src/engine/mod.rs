// ==========================================
// 考场排座系统 - 引擎层
// ==========================================
// 职责: 座位分配的核心规则引擎
// 红线: 引擎不做 I/O, 不持有跨运行状态;
//       所有约束违规必须输出结构化条目
// ==========================================

pub mod adjacency;
pub mod grid_builder;
pub mod orchestrator;
pub mod projection;
pub mod roll_synthesizer;
pub mod validator;

// 重导出核心引擎
pub use adjacency::AdjacencyResolver;
pub use grid_builder::{AllocationOrder, GridBuilder};
pub use orchestrator::{AllocationRun, SeatingEngine};
pub use projection::{BatchSummary, Projector, SeatView, SeatingProjection};
pub use roll_synthesizer::RollSynthesizer;
pub use validator::ConstraintValidator;
