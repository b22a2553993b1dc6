// ==========================================
// 考场排座系统 - 投影引擎
// ==========================================
// 职责: 把完成的网格序列化为外部响应形状
// 输出: 行优先座位记录矩阵 + 运行元数据
// 红线: 投影只读网格, 不改变任何状态
// ==========================================

use crate::domain::batch::BatchRegistry;
use crate::domain::grid::Grid;
use crate::domain::seat::SeatPos;
use crate::domain::types::SeatStatus;
use crate::domain::violation::LabelWarning;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ==========================================
// SeatView - 单座位投影记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatView {
    pub roll_number: Option<String>,
    /// 批次 ID
    pub batch: Option<u32>,
    pub batch_label: Option<String>,
    pub color: Option<String>,
    pub is_broken: bool,
    pub is_unallocated: bool,
}

// ==========================================
// BatchSummary - 批次分配摘要
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub id: u32,
    pub label: String,
    pub color: String,
    /// 配置需求座位数
    pub requested: usize,
    /// 实际分配座位数
    pub allocated: usize,
}

// ==========================================
// SeatingProjection - 完整投影
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatingProjection {
    /// 行优先座位矩阵
    pub seating: Vec<Vec<SeatView>>,
    pub rows: usize,
    pub cols: usize,
    pub block_width: usize,
    pub block_count: usize,
    pub batch_summaries: Vec<BatchSummary>,
    /// 标签短缺等非致命警告
    pub warnings: Vec<LabelWarning>,
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
}

// ==========================================
// Projector - 投影引擎
// ==========================================
pub struct Projector {
    // 无状态引擎, 不需要注入依赖
}

impl Projector {
    pub fn new() -> Self {
        Self {}
    }

    /// 完整投影
    pub fn project(
        &self,
        grid: &Grid,
        batches: &BatchRegistry,
        warnings: &[LabelWarning],
        run_id: Uuid,
        generated_at: DateTime<Utc>,
    ) -> SeatingProjection {
        let labels: HashMap<u32, String> = batches
            .iter()
            .map(|b| (b.id, b.label.clone()))
            .collect();

        let mut allocated: HashMap<u32, usize> = HashMap::new();
        let mut seating = Vec::with_capacity(grid.rows());
        for row in 0..grid.rows() {
            let mut row_views = Vec::with_capacity(grid.cols());
            for col in 0..grid.cols() {
                let seat = grid.seat(SeatPos::new(row, col));
                if seat.is_allocated() {
                    if let Some(batch_id) = seat.batch_id {
                        *allocated.entry(batch_id).or_insert(0) += 1;
                    }
                }
                row_views.push(SeatView {
                    roll_number: seat.roll_number.clone(),
                    batch: seat.batch_id,
                    batch_label: seat
                        .batch_id
                        .and_then(|batch_id| labels.get(&batch_id).cloned()),
                    color: seat.color.clone(),
                    is_broken: seat.is_broken(),
                    is_unallocated: seat.status == SeatStatus::Unallocated,
                });
            }
            seating.push(row_views);
        }

        let batch_summaries = batches
            .iter()
            .map(|b| BatchSummary {
                id: b.id,
                label: b.label.clone(),
                color: b.color.clone(),
                requested: b.seat_count,
                allocated: allocated.get(&b.id).copied().unwrap_or(0),
            })
            .collect();

        SeatingProjection {
            seating,
            rows: grid.rows(),
            cols: grid.cols(),
            block_width: grid.block_width(),
            block_count: grid.block_count(),
            batch_summaries,
            warnings: warnings.to_vec(),
            run_id,
            generated_at,
        }
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self::new()
    }
}
