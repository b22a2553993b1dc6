// ==========================================
// 考场排座系统 - 约束校验引擎
// ==========================================
// 职责: 仅凭完成的网格重新推导并检查全部不变量
// 输入: 完成的网格 + 批次注册表 + 相邻约束开关
// 输出: (是否有效, 有序违规列表)
// 红线: 不依赖构建器的中间状态; 违规是数据不是异常
// ==========================================

use crate::domain::batch::BatchRegistry;
use crate::domain::grid::Grid;
use crate::domain::seat::SeatPos;
use crate::domain::types::{SeatStatus, ViolationKind};
use crate::domain::violation::Violation;
use std::collections::HashMap;
use tracing::instrument;

// ==========================================
// ConstraintValidator - 约束校验引擎
// ==========================================
pub struct ConstraintValidator {
    // 无状态引擎, 不需要注入依赖
}

impl ConstraintValidator {
    pub fn new() -> Self {
        Self {}
    }

    /// 全量校验
    ///
    /// 检查顺序(决定违规列表顺序):
    /// 1) insufficient_capacity: 可用座位 < 总需求
    /// 2) broken_seat_allocated: 坏座位被标记为已分配(缺陷)
    /// 3) capacity_exceeded: 批次已分配数超过配置人数
    /// 4) adjacent_same_batch: 共边同批次对(仅启用约束时,
    ///    只向右/向下扫描避免重复条目)
    ///
    /// # 返回
    /// (is_valid, violations); is_valid 当且仅当列表为空
    #[instrument(skip(self, grid, batches), fields(
        rows = grid.rows(),
        cols = grid.cols(),
        enforce_adjacency,
    ))]
    pub fn validate(
        &self,
        grid: &Grid,
        batches: &BatchRegistry,
        enforce_adjacency: bool,
    ) -> (bool, Vec<Violation>) {
        let mut violations = Vec::new();

        // 1) 容量不足
        let usable = grid.usable_seats();
        let demand = batches.total_demand();
        if usable < demand {
            violations.push(Violation::new(
                ViolationKind::InsufficientCapacity,
                Vec::new(),
                format!("可用座位 {} 少于总需求 {}", usable, demand),
            ));
        }

        // 2) 坏座位被分配
        for pos in grid.broken() {
            if grid.seat(*pos).status == SeatStatus::Allocated {
                violations.push(Violation::new(
                    ViolationKind::BrokenSeatAllocated,
                    vec![*pos],
                    format!("坏座位 {} 被标记为已分配", pos),
                ));
            }
        }

        // 3) 批次超额
        let mut allocated: HashMap<u32, usize> = HashMap::new();
        for pos in grid.positions_row_major() {
            let seat = grid.seat(pos);
            if seat.is_allocated() {
                if let Some(batch_id) = seat.batch_id {
                    *allocated.entry(batch_id).or_insert(0) += 1;
                }
            }
        }
        for batch in batches.iter() {
            let count = allocated.get(&batch.id).copied().unwrap_or(0);
            if count > batch.seat_count {
                violations.push(Violation::new(
                    ViolationKind::CapacityExceeded,
                    Vec::new(),
                    format!(
                        "批次 {} 已分配 {} 座, 超过配置人数 {}",
                        batch.id, count, batch.seat_count
                    ),
                ));
            }
        }

        // 4) 共边同批次
        if enforce_adjacency {
            for pos in grid.positions_row_major() {
                let seat = grid.seat(pos);
                if !seat.is_allocated() {
                    continue;
                }
                let Some(batch_id) = seat.batch_id else {
                    continue;
                };
                for other in [
                    SeatPos::new(pos.row, pos.col + 1),
                    SeatPos::new(pos.row + 1, pos.col),
                ] {
                    if !grid.contains(other) {
                        continue;
                    }
                    let neighbor = grid.seat(other);
                    if neighbor.is_allocated() && neighbor.batch_id == Some(batch_id) {
                        violations.push(Violation::new(
                            ViolationKind::AdjacentSameBatch,
                            vec![pos, other],
                            format!("座位 {} 与 {} 同属批次 {}", pos, other, batch_id),
                        ));
                    }
                }
            }
        }

        (violations.is_empty(), violations)
    }
}

impl Default for ConstraintValidator {
    fn default() -> Self {
        Self::new()
    }
}
