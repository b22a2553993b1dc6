// ==========================================
// 考场排座系统 - 座位实体
// ==========================================
// 职责: 定义座位坐标与座位实体
// 不变量: 坐标 0 基, 在网格内唯一
// ==========================================

use crate::domain::types::SeatStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// SeatPos - 座位坐标 (0 基)
// ==========================================
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SeatPos {
    pub row: usize,
    pub col: usize,
}

impl SeatPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for SeatPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

// ==========================================
// Seat - 座位实体
// ==========================================
// 归属: 在一次分配运行的生命周期内由 Grid 独占持有
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    /// 座位坐标
    pub pos: SeatPos,

    /// 座位状态
    pub status: SeatStatus,

    /// 所属批次 ID (未分配/坏座位为 None)
    pub batch_id: Option<u32>,

    /// 学号/显示标签 (名册耗尽时为 None)
    pub roll_number: Option<String>,

    /// 批次颜色
    pub color: Option<String>,
}

impl Seat {
    /// 创建未分配座位
    pub fn new(pos: SeatPos) -> Self {
        Self {
            pos,
            status: SeatStatus::Unallocated,
            batch_id: None,
            roll_number: None,
            color: None,
        }
    }

    /// 创建坏座位
    pub fn broken(pos: SeatPos) -> Self {
        Self {
            pos,
            status: SeatStatus::Broken,
            batch_id: None,
            roll_number: None,
            color: None,
        }
    }

    /// 是否已分配
    pub fn is_allocated(&self) -> bool {
        self.status == SeatStatus::Allocated
    }

    /// 是否坏座位
    pub fn is_broken(&self) -> bool {
        self.status == SeatStatus::Broken
    }
}
