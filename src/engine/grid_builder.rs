// ==========================================
// 考场排座系统 - 网格构建引擎
// ==========================================
// 职责: 按块轮转把批次填入网格
// 输入: 空网格 + 批次注册表
// 输出: 座位→批次映射 + 分配顺序记录
// 红线: 坏座位跳过且不计入任何批次配额;
//       已分配座位总数 = min(总需求, 可用座位数)
// ==========================================

use crate::domain::batch::BatchRegistry;
use crate::domain::grid::Grid;
use crate::domain::seat::SeatPos;
use crate::domain::types::SeatStatus;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

// ==========================================
// AllocationOrder - 分配顺序记录
// ==========================================
// 每个批次按分配先后排列的座位坐标;
// 名册标签按这个顺序消费, 不按最终网格顺序
#[derive(Debug, Clone, Default)]
pub struct AllocationOrder {
    per_batch: BTreeMap<u32, Vec<SeatPos>>,
    /// 网格耗尽后未满足的座位需求
    shortfall: usize,
}

impl AllocationOrder {
    /// 某批次按分配顺序排列的座位
    pub fn batch_order(&self, batch_id: u32) -> &[SeatPos] {
        self.per_batch
            .get(&batch_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn record(&mut self, batch_id: u32, pos: SeatPos) {
        self.per_batch.entry(batch_id).or_default().push(pos);
    }

    pub fn shortfall(&self) -> usize {
        self.shortfall
    }

    pub fn allocated_total(&self) -> usize {
        self.per_batch.values().map(|v| v.len()).sum()
    }

    /// 相邻消解交换后同步顺序记录: 两个座位在各自批次
    /// 顺序表中的位置互换, 保持原有序号不变
    pub fn swap_positions(
        &mut self,
        batch_a: u32,
        pos_a: SeatPos,
        batch_b: u32,
        pos_b: SeatPos,
    ) {
        if let Some(list) = self.per_batch.get_mut(&batch_a) {
            if let Some(slot) = list.iter_mut().find(|p| **p == pos_a) {
                *slot = pos_b;
            }
        }
        if let Some(list) = self.per_batch.get_mut(&batch_b) {
            if let Some(slot) = list.iter_mut().find(|p| **p == pos_b) {
                *slot = pos_a;
            }
        }
    }
}

// ==========================================
// GridBuilder - 网格构建引擎
// ==========================================
pub struct GridBuilder {
    // 无状态引擎, 不需要注入依赖
}

impl GridBuilder {
    pub fn new() -> Self {
        Self {}
    }

    /// 分块轮转填充
    ///
    /// 规则:
    /// 1) 按块顺序遍历网格, 块内逐列(或逐行)填充
    /// 2) 每进入一个新块, 轮转到下一个仍有需求的批次
    /// 3) 当前批次在块中途填满时, 就地切换到下一个仍有
    ///    需求的批次继续填同一块(保证可用座位不被浪费)
    /// 4) 坏座位跳过, 不计入配额
    ///
    /// # 返回
    /// 分配顺序记录(含未满足需求数)
    #[instrument(skip(self, grid, batches), fields(
        rows = grid.rows(),
        cols = grid.cols(),
        block_width = grid.block_width(),
        batch_count = batches.len(),
    ))]
    pub fn build(&self, grid: &mut Grid, batches: &BatchRegistry) -> AllocationOrder {
        let mut remaining: Vec<(u32, usize)> =
            batches.iter().map(|b| (b.id, b.seat_count)).collect();
        let batch_slots = remaining.len();
        let mut order = AllocationOrder::default();

        // cursor: 下一个块应从哪个批次槽位开始轮转
        let mut cursor = 0usize;
        'blocks: for block in 0..grid.block_count() {
            let Some(mut current) = next_needing(&remaining, cursor) else {
                break;
            };
            cursor = (current + 1) % batch_slots;

            for pos in grid.block_positions(block) {
                if grid.seat(pos).status == SeatStatus::Broken {
                    continue;
                }
                if remaining[current].1 == 0 {
                    match next_needing(&remaining, (current + 1) % batch_slots) {
                        Some(next) => {
                            current = next;
                            cursor = (current + 1) % batch_slots;
                        }
                        None => break 'blocks,
                    }
                }
                let batch_id = remaining[current].0;
                let seat = grid.seat_mut(pos);
                seat.status = SeatStatus::Allocated;
                seat.batch_id = Some(batch_id);
                remaining[current].1 -= 1;
                order.record(batch_id, pos);
            }
        }

        order.shortfall = remaining.iter().map(|(_, need)| need).sum();
        debug!(
            allocated = order.allocated_total(),
            shortfall = order.shortfall,
            "网格构建完成"
        );
        order
    }
}

impl Default for GridBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 从 start 开始环形查找下一个仍有需求的批次槽位
fn next_needing(remaining: &[(u32, usize)], start: usize) -> Option<usize> {
    let len = remaining.len();
    (0..len)
        .map(|offset| (start + offset) % len)
        .find(|idx| remaining[*idx].1 > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::batch::{Batch, LabelRule};
    use crate::domain::types::BlockOrientation;

    fn count_batches(counts: &[usize]) -> BatchRegistry {
        BatchRegistry::new(
            counts
                .iter()
                .enumerate()
                .map(|(idx, count)| Batch {
                    id: idx as u32 + 1,
                    label: format!("BATCH{}", idx + 1),
                    seat_count: *count,
                    color: "#4e79a7".to_string(),
                    label_rule: LabelRule::Template {
                        prefix: format!("B{}", idx + 1),
                        year: None,
                        start_serial: None,
                        start_roll: None,
                    },
                })
                .collect(),
        )
    }

    fn batch_at(grid: &Grid, row: usize, col: usize) -> Option<u32> {
        grid.seat(SeatPos::new(row, col)).batch_id
    }

    #[test]
    fn test_two_batches_two_blocks() {
        // 2x4, 块宽 2: 列 0-1 批次 1, 列 2-3 批次 2
        let mut grid = Grid::new(2, 4, 2, BlockOrientation::ColumnMajor, &[]);
        let batches = count_batches(&[4, 4]);
        let order = GridBuilder::new().build(&mut grid, &batches);

        for row in 0..2 {
            assert_eq!(batch_at(&grid, row, 0), Some(1));
            assert_eq!(batch_at(&grid, row, 1), Some(1));
            assert_eq!(batch_at(&grid, row, 2), Some(2));
            assert_eq!(batch_at(&grid, row, 3), Some(2));
        }
        assert_eq!(grid.allocated_seats(), 8);
        assert_eq!(order.shortfall(), 0);
    }

    #[test]
    fn test_broken_seat_causes_shortfall() {
        let broken = vec![SeatPos::new(0, 1)];
        let mut grid = Grid::new(2, 4, 2, BlockOrientation::ColumnMajor, &broken);
        let batches = count_batches(&[4, 4]);
        let order = GridBuilder::new().build(&mut grid, &batches);

        assert!(grid.seat(SeatPos::new(0, 1)).is_broken());
        assert_eq!(order.batch_order(1).len(), 3);
        assert_eq!(order.batch_order(2).len(), 4);
        assert_eq!(order.shortfall(), 1);
        assert_eq!(grid.allocated_seats(), 7);
    }

    #[test]
    fn test_mid_block_continuation_uses_all_seats() {
        // 批次 1 在块中途填满, 剩余座位交给批次 2
        let mut grid = Grid::new(2, 4, 2, BlockOrientation::ColumnMajor, &[]);
        let batches = count_batches(&[2, 6]);
        let order = GridBuilder::new().build(&mut grid, &batches);

        assert_eq!(grid.allocated_seats(), 8);
        assert_eq!(order.batch_order(1).len(), 2);
        assert_eq!(order.batch_order(2).len(), 6);
        // 批次 1 占据块 0 的第一列
        assert_eq!(batch_at(&grid, 0, 0), Some(1));
        assert_eq!(batch_at(&grid, 1, 0), Some(1));
        assert_eq!(batch_at(&grid, 0, 1), Some(2));
    }

    #[test]
    fn test_single_seat_blocks_alternate_batches() {
        // 1x4, 块宽 1, 4 个批次各 1 人: 每列一个批次
        let mut grid = Grid::new(1, 4, 1, BlockOrientation::ColumnMajor, &[]);
        let batches = count_batches(&[1, 1, 1, 1]);
        GridBuilder::new().build(&mut grid, &batches);

        for col in 0..4 {
            assert_eq!(batch_at(&grid, 0, col), Some(col as u32 + 1));
        }
    }

    #[test]
    fn test_row_major_blocks() {
        // 4x2, 行组方向, 块宽 2: 行 0-1 批次 1, 行 2-3 批次 2
        let mut grid = Grid::new(4, 2, 2, BlockOrientation::RowMajor, &[]);
        let batches = count_batches(&[4, 4]);
        GridBuilder::new().build(&mut grid, &batches);

        assert_eq!(batch_at(&grid, 0, 0), Some(1));
        assert_eq!(batch_at(&grid, 1, 1), Some(1));
        assert_eq!(batch_at(&grid, 2, 0), Some(2));
        assert_eq!(batch_at(&grid, 3, 1), Some(2));
    }

    #[test]
    fn test_allocation_order_is_block_order() {
        let mut grid = Grid::new(2, 4, 2, BlockOrientation::ColumnMajor, &[]);
        let batches = count_batches(&[4, 4]);
        let order = GridBuilder::new().build(&mut grid, &batches);

        // 块内逐列、列内自上而下
        assert_eq!(
            order.batch_order(1),
            &[
                SeatPos::new(0, 0),
                SeatPos::new(1, 0),
                SeatPos::new(0, 1),
                SeatPos::new(1, 1),
            ]
        );
    }

    #[test]
    fn test_demand_below_capacity_leaves_unallocated() {
        let mut grid = Grid::new(2, 4, 2, BlockOrientation::ColumnMajor, &[]);
        let batches = count_batches(&[2, 2]);
        let order = GridBuilder::new().build(&mut grid, &batches);

        assert_eq!(grid.allocated_seats(), 4);
        assert_eq!(order.shortfall(), 0);
        assert_eq!(
            grid.seat(SeatPos::new(0, 3)).status,
            SeatStatus::Unallocated
        );
    }
}
