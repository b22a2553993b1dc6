// ==========================================
// 考场排座系统 - 领域模型层
// ==========================================
// 职责: 定义座位、网格、批次等领域实体与类型
// 红线: 不含分配算法, 不含投影逻辑
// ==========================================

pub mod batch;
pub mod grid;
pub mod seat;
pub mod types;
pub mod violation;

// 重导出核心类型
pub use batch::{split_numeric_suffix, Batch, BatchRegistry, LabelRule};
pub use grid::Grid;
pub use seat::{Seat, SeatPos};
pub use types::{BlockOrientation, SeatStatus, SerialMode, ViolationKind};
pub use violation::{FeasibilityReport, LabelWarning, Violation};
