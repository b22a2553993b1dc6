// ==========================================
// 考场排座系统 - 领域类型定义
// ==========================================
// 职责: 定义座位状态、分块方向、学号序号模式、违规类型
// 红线: 类型不含业务逻辑, 仅表达状态与语义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 座位状态 (Seat Status)
// ==========================================
// 不变量: Broken 座位永远不能变为 Allocated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    Unallocated, // 未分配
    Allocated,   // 已分配
    Broken,      // 坏座位(永久排除)
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeatStatus::Unallocated => write!(f, "UNALLOCATED"),
            SeatStatus::Allocated => write!(f, "ALLOCATED"),
            SeatStatus::Broken => write!(f, "BROKEN"),
        }
    }
}

// ==========================================
// 分块方向 (Block Orientation)
// ==========================================
// ColumnMajor: 块为连续的列组(batch_by_column = true, 默认)
// RowMajor: 块为连续的行组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockOrientation {
    ColumnMajor,
    RowMajor,
}

impl BlockOrientation {
    /// 从调用方的 batch_by_column 标志转换
    pub fn from_batch_by_column(batch_by_column: bool) -> Self {
        if batch_by_column {
            BlockOrientation::ColumnMajor
        } else {
            BlockOrientation::RowMajor
        }
    }
}

impl fmt::Display for BlockOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockOrientation::ColumnMajor => write!(f, "COLUMN_MAJOR"),
            BlockOrientation::RowMajor => write!(f, "ROW_MAJOR"),
        }
    }
}

// ==========================================
// 学号序号模式 (Serial Mode)
// ==========================================
// per_batch: 每个批次独立计数, 从该批次的起始序号开始
// global: 全场共用一个计数器, 按最终网格行优先顺序递增
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerialMode {
    PerBatch,
    Global,
}

impl Default for SerialMode {
    fn default() -> Self {
        SerialMode::PerBatch
    }
}

impl fmt::Display for SerialMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerialMode::PerBatch => write!(f, "per_batch"),
            SerialMode::Global => write!(f, "global"),
        }
    }
}

// ==========================================
// 违规类型 (Violation Kind)
// ==========================================
// 约束违规不是致命错误, 始终作为结构化条目返回给调用方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// 相邻座位属于同一批次(仅在启用相邻约束时检查)
    AdjacentSameBatch,
    /// 某批次的已分配座位数超过配置人数
    CapacityExceeded,
    /// 坏座位被标记为已分配(不应发生, 出现即为缺陷)
    BrokenSeatAllocated,
    /// 可用座位数不足以容纳全部批次人数
    InsufficientCapacity,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::AdjacentSameBatch => write!(f, "adjacent_same_batch"),
            ViolationKind::CapacityExceeded => write!(f, "capacity_exceeded"),
            ViolationKind::BrokenSeatAllocated => write!(f, "broken_seat_allocated"),
            ViolationKind::InsufficientCapacity => write!(f, "insufficient_capacity"),
        }
    }
}
