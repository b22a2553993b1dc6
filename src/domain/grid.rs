// ==========================================
// 考场排座系统 - 网格实体
// ==========================================
// 职责: R×C 座位矩阵 + 坏座位列表 + 布局参数
// 不变量: 每个座位坐标唯一且在界内; 坏座位永不参与分配
// 归属: 每次分配运行独占一个 Grid, 运行之间不共享
// ==========================================

use crate::domain::seat::{Seat, SeatPos};
use crate::domain::types::{BlockOrientation, SeatStatus};
use serde::{Deserialize, Serialize};

// ==========================================
// Grid - 座位网格
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    block_width: usize,
    orientation: BlockOrientation,
    /// 行优先存储的座位矩阵
    seats: Vec<Seat>,
    /// 坏座位列表(有序, 入参顺序)
    broken: Vec<SeatPos>,
}

impl Grid {
    /// 创建网格并标记坏座位
    ///
    /// 前置条件: 尺寸与坏座位已由 AllocationConfig 校验
    pub fn new(
        rows: usize,
        cols: usize,
        block_width: usize,
        orientation: BlockOrientation,
        broken: &[SeatPos],
    ) -> Self {
        let mut seats = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                seats.push(Seat::new(SeatPos::new(row, col)));
            }
        }
        let mut grid = Self {
            rows,
            cols,
            block_width,
            orientation,
            seats,
            broken: broken.to_vec(),
        };
        for pos in broken {
            if grid.contains(*pos) {
                *grid.seat_mut(*pos) = Seat::broken(*pos);
            }
        }
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn block_width(&self) -> usize {
        self.block_width
    }

    pub fn orientation(&self) -> BlockOrientation {
        self.orientation
    }

    pub fn broken(&self) -> &[SeatPos] {
        &self.broken
    }

    /// 坐标是否在界内
    pub fn contains(&self, pos: SeatPos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    fn index(&self, pos: SeatPos) -> usize {
        pos.row * self.cols + pos.col
    }

    pub fn seat(&self, pos: SeatPos) -> &Seat {
        &self.seats[self.index(pos)]
    }

    pub fn seat_mut(&mut self, pos: SeatPos) -> &mut Seat {
        let idx = self.index(pos);
        &mut self.seats[idx]
    }

    /// 行优先遍历全部坐标
    pub fn positions_row_major(&self) -> impl Iterator<Item = SeatPos> {
        let rows = self.rows;
        let cols = self.cols;
        (0..rows).flat_map(move |row| (0..cols).map(move |col| SeatPos::new(row, col)))
    }

    /// 可用(非坏)座位总数
    pub fn usable_seats(&self) -> usize {
        self.rows * self.cols - self.broken.len()
    }

    /// 已分配座位总数
    pub fn allocated_seats(&self) -> usize {
        self.seats
            .iter()
            .filter(|s| s.status == SeatStatus::Allocated)
            .count()
    }

    /// 分块方向上的长度(列组方向为列数, 行组方向为行数)
    pub fn extent(&self) -> usize {
        match self.orientation {
            BlockOrientation::ColumnMajor => self.cols,
            BlockOrientation::RowMajor => self.rows,
        }
    }

    /// 块数(末块允许不足 block_width)
    pub fn block_count(&self) -> usize {
        self.extent().div_ceil(self.block_width)
    }

    /// 第 block 个块覆盖的坐标, 按块内分配顺序排列
    ///
    /// 列组方向: 逐列、列内自上而下; 行组方向: 逐行、行内自左向右
    pub fn block_positions(&self, block: usize) -> Vec<SeatPos> {
        let start = block * self.block_width;
        let end = (start + self.block_width).min(self.extent());
        let mut positions = Vec::new();
        match self.orientation {
            BlockOrientation::ColumnMajor => {
                for col in start..end {
                    for row in 0..self.rows {
                        positions.push(SeatPos::new(row, col));
                    }
                }
            }
            BlockOrientation::RowMajor => {
                for row in start..end {
                    for col in 0..self.cols {
                        positions.push(SeatPos::new(row, col));
                    }
                }
            }
        }
        positions
    }

    /// 上/下/左/右四邻(不含对角线)
    pub fn edge_neighbors(&self, pos: SeatPos) -> Vec<SeatPos> {
        let mut neighbors = Vec::with_capacity(4);
        if pos.row > 0 {
            neighbors.push(SeatPos::new(pos.row - 1, pos.col));
        }
        if pos.row + 1 < self.rows {
            neighbors.push(SeatPos::new(pos.row + 1, pos.col));
        }
        if pos.col > 0 {
            neighbors.push(SeatPos::new(pos.row, pos.col - 1));
        }
        if pos.col + 1 < self.cols {
            neighbors.push(SeatPos::new(pos.row, pos.col + 1));
        }
        neighbors
    }
}
