// ==========================================
// 考场排座系统 - 相邻消解引擎
// ==========================================
// 职责: 消除共边(上下左右, 不含对角)的同批次座位对
// 输入: 构建完成的网格 + 分配顺序记录
// 输出: 是否完全消解; 网格中批次归属被成对交换
// 红线: 交换只换批次归属不换座位, 每个批次的
//       已分配座位总数必须严格不变
// ==========================================

use crate::domain::grid::Grid;
use crate::domain::seat::SeatPos;
use crate::engine::grid_builder::AllocationOrder;
use tracing::{debug, instrument};

/// 轮次上限系数: 最多 3 × 网格面积 轮
const MAX_PASS_FACTOR: usize = 3;

// ==========================================
// AdjacencyResolver - 相邻消解引擎
// ==========================================
pub struct AdjacencyResolver {
    // 无状态引擎, 不需要注入依赖
}

impl AdjacencyResolver {
    pub fn new() -> Self {
        Self {}
    }

    /// 就近交换消解
    ///
    /// 行优先扫描: 座位与左邻或上邻同批次时, 向前(同行
    /// 列增, 再后续行)找最近的异批次座位, 交换两者的批次
    /// 归属。整轮零冲突则消解完成; 有冲突但无可交换对象,
    /// 或轮次耗尽, 则判定不可行, 返回 false 交给校验器报告
    ///
    /// # 返回
    /// true = 完全消解; false = 尽力而为, 留有残余冲突
    #[instrument(skip(self, grid, order), fields(rows = grid.rows(), cols = grid.cols()))]
    pub fn resolve(&self, grid: &mut Grid, order: &mut AllocationOrder) -> bool {
        let max_passes = MAX_PASS_FACTOR * grid.rows() * grid.cols();
        for pass in 0..max_passes {
            let (conflicts, swaps) = self.resolve_pass(grid, order);
            if conflicts == 0 {
                debug!(pass, "相邻消解完成");
                return true;
            }
            if swaps == 0 {
                // 有冲突但找不到任何可交换的异批次座位(单批次等)
                debug!(pass, conflicts, "相邻消解不可行");
                return false;
            }
        }
        !Self::has_conflict(grid)
    }

    /// 单轮扫描, 返回 (发现的冲突数, 完成的交换数)
    fn resolve_pass(&self, grid: &mut Grid, order: &mut AllocationOrder) -> (usize, usize) {
        let mut conflicts = 0;
        let mut swaps = 0;
        let positions: Vec<SeatPos> = grid.positions_row_major().collect();
        for pos in positions {
            let Some(batch_id) = allocated_batch(grid, pos) else {
                continue;
            };
            if !Self::conflicts_with_visited(grid, pos, batch_id) {
                continue;
            }
            conflicts += 1;
            if let Some((other_pos, other_batch)) = Self::find_forward_swap(grid, pos, batch_id)
            {
                grid.seat_mut(pos).batch_id = Some(other_batch);
                grid.seat_mut(other_pos).batch_id = Some(batch_id);
                order.swap_positions(batch_id, pos, other_batch, other_pos);
                swaps += 1;
            }
        }
        (conflicts, swaps)
    }

    /// 座位是否与已访问的左邻/上邻同批次
    fn conflicts_with_visited(grid: &Grid, pos: SeatPos, batch_id: u32) -> bool {
        if pos.col > 0 {
            if allocated_batch(grid, SeatPos::new(pos.row, pos.col - 1)) == Some(batch_id) {
                return true;
            }
        }
        if pos.row > 0 {
            if allocated_batch(grid, SeatPos::new(pos.row - 1, pos.col)) == Some(batch_id) {
                return true;
            }
        }
        false
    }

    /// 向前找最近的异批次已分配座位
    fn find_forward_swap(grid: &Grid, from: SeatPos, batch_id: u32) -> Option<(SeatPos, u32)> {
        grid.positions_row_major()
            .skip(from.row * grid.cols() + from.col + 1)
            .find_map(|pos| match allocated_batch(grid, pos) {
                Some(other) if other != batch_id => Some((pos, other)),
                _ => None,
            })
    }

    /// 全网格是否仍存在共边同批次对
    fn has_conflict(grid: &Grid) -> bool {
        grid.positions_row_major().any(|pos| {
            let Some(batch_id) = allocated_batch(grid, pos) else {
                return false;
            };
            Self::conflicts_with_visited(grid, pos, batch_id)
        })
    }
}

impl Default for AdjacencyResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn allocated_batch(grid: &Grid, pos: SeatPos) -> Option<u32> {
    let seat = grid.seat(pos);
    if seat.is_allocated() {
        seat.batch_id
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::batch::{Batch, BatchRegistry, LabelRule};
    use crate::domain::types::BlockOrientation;
    use crate::engine::grid_builder::GridBuilder;
    use std::collections::HashMap;

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

    fn per_batch_counts(grid: &Grid) -> HashMap<u32, usize> {
        let mut counts = HashMap::new();
        for pos in grid.positions_row_major() {
            if let Some(batch_id) = allocated_batch(grid, pos) {
                *counts.entry(batch_id).or_insert(0) += 1;
            }
        }
        counts
    }

    #[test]
    fn test_resolves_two_batch_grid() {
        // 块宽 2 导致同批次列内相邻, 消解后应无冲突
        let mut grid = Grid::new(2, 4, 2, BlockOrientation::ColumnMajor, &[]);
        let batches = count_batches(&[4, 4]);
        let mut order = GridBuilder::new().build(&mut grid, &batches);

        let before = per_batch_counts(&grid);
        let resolved = AdjacencyResolver::new().resolve(&mut grid, &mut order);

        assert!(resolved);
        assert!(!AdjacencyResolver::has_conflict(&grid));
        // 交换必须保持每批次座位总数不变
        assert_eq!(per_batch_counts(&grid), before);
    }

    #[test]
    fn test_single_batch_is_infeasible() {
        let mut grid = Grid::new(1, 4, 1, BlockOrientation::ColumnMajor, &[]);
        let batches = count_batches(&[4]);
        let mut order = GridBuilder::new().build(&mut grid, &batches);

        let resolved = AdjacencyResolver::new().resolve(&mut grid, &mut order);

        assert!(!resolved);
        assert!(AdjacencyResolver::has_conflict(&grid));
        // 尽力而为: 批次计数仍然不变
        assert_eq!(order.batch_order(1).len(), 4);
    }

    #[test]
    fn test_already_clean_grid_is_untouched() {
        // 块宽 1 交替批次, 本来就无冲突
        let mut grid = Grid::new(1, 4, 1, BlockOrientation::ColumnMajor, &[]);
        let batches = count_batches(&[1, 1, 1, 1]);
        let mut order = GridBuilder::new().build(&mut grid, &batches);
        let before: Vec<Option<u32>> = grid
            .positions_row_major()
            .map(|pos| grid.seat(pos).batch_id)
            .collect();

        let resolved = AdjacencyResolver::new().resolve(&mut grid, &mut order);

        assert!(resolved);
        let after: Vec<Option<u32>> = grid
            .positions_row_major()
            .map(|pos| grid.seat(pos).batch_id)
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_swap_updates_allocation_order() {
        let mut grid = Grid::new(2, 4, 2, BlockOrientation::ColumnMajor, &[]);
        let batches = count_batches(&[4, 4]);
        let mut order = GridBuilder::new().build(&mut grid, &batches);

        AdjacencyResolver::new().resolve(&mut grid, &mut order);

        // 顺序记录与网格归属保持一致
        for batch_id in [1u32, 2u32] {
            for pos in order.batch_order(batch_id) {
                assert_eq!(grid.seat(*pos).batch_id, Some(batch_id));
            }
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let run = || {
            let mut grid = Grid::new(3, 6, 3, BlockOrientation::ColumnMajor, &[]);
            let batches = count_batches(&[9, 9]);
            let mut order = GridBuilder::new().build(&mut grid, &batches);
            AdjacencyResolver::new().resolve(&mut grid, &mut order);
            grid.positions_row_major()
                .map(|pos| grid.seat(pos).batch_id)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
