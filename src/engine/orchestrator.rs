// ==========================================
// 考场排座系统 - 引擎编排器
// ==========================================
// 职责: 协调五个引擎的执行顺序:
//       网格构建 → 相邻消解 → 学号合成 → 约束校验 → 投影
// 红线: 每次运行独占自己的 Grid 与批次注册表,
//       运行之间不共享任何可变状态;
//       约束不可行不抛错误, 返回尽力而为的网格 + 违规报告
// ==========================================

use crate::config::{AllocationConfig, AllocationConfigBuilder, LayoutParams};
use crate::domain::batch::BatchRegistry;
use crate::domain::grid::Grid;
use crate::domain::violation::{FeasibilityReport, LabelWarning, Violation};
use crate::engine::adjacency::AdjacencyResolver;
use crate::engine::grid_builder::{AllocationOrder, GridBuilder};
use crate::engine::projection::{Projector, SeatingProjection};
use crate::engine::roll_synthesizer::RollSynthesizer;
use crate::engine::validator::ConstraintValidator;
use crate::error::EngineResult;
use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

// ==========================================
// SeatingEngine - 排座引擎
// ==========================================
pub struct SeatingEngine {
    config: AllocationConfig,
    builder: GridBuilder,
    resolver: AdjacencyResolver,
    synthesizer: RollSynthesizer,
    validator: ConstraintValidator,
    projector: Projector,
}

impl SeatingEngine {
    /// 构造引擎(配置已在 AllocationConfigBuilder::build 校验)
    pub fn new(config: AllocationConfig) -> Self {
        Self {
            config,
            builder: GridBuilder::new(),
            resolver: AdjacencyResolver::new(),
            synthesizer: RollSynthesizer::new(),
            validator: ConstraintValidator::new(),
            projector: Projector::new(),
        }
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// 生成分配运行
    ///
    /// 约束不可行(容量不足/相邻无解)不会失败,
    /// 结果网格与违规一起交给调用方决策
    #[instrument(skip(self), fields(
        rows = self.config.layout.rows,
        cols = self.config.layout.cols,
        num_batches = self.config.layout.num_batches,
    ))]
    pub fn generate(&self) -> AllocationRun {
        let layout = &self.config.layout;
        let mut grid = Grid::new(
            layout.rows,
            layout.cols,
            layout.block_width,
            layout.orientation(),
            &layout.broken_seats,
        );

        let mut order = self.builder.build(&mut grid, &self.config.batches);

        let adjacency_resolved = if layout.enforce_no_adjacent_batches {
            self.resolver.resolve(&mut grid, &mut order)
        } else {
            true
        };

        let warnings = self.synthesizer.synthesize(&mut grid, &self.config, &order);

        info!(
            allocated = grid.allocated_seats(),
            shortfall = order.shortfall(),
            adjacency_resolved,
            warning_count = warnings.len(),
            "分配运行完成"
        );

        AllocationRun {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            grid,
            batches: self.config.batches.clone(),
            enforce_no_adjacent_batches: layout.enforce_no_adjacent_batches,
            adjacency_resolved,
            order,
            warnings,
        }
    }

    /// 可行性预检: 只凭布局参数验证房间布局
    ///
    /// 用等分的合成批次跑一遍构建 + 消解 + 校验,
    /// 不合成任何标签, 违规形状与 validate() 一致
    #[instrument(skip(layout), fields(
        rows = layout.rows,
        cols = layout.cols,
        num_batches = layout.num_batches,
    ))]
    pub fn feasibility_check(layout: &LayoutParams) -> EngineResult<FeasibilityReport> {
        let config = AllocationConfigBuilder::from_layout(layout).build()?;
        let engine = SeatingEngine::new(config);

        let engine_layout = &engine.config.layout;
        let mut grid = Grid::new(
            engine_layout.rows,
            engine_layout.cols,
            engine_layout.block_width,
            engine_layout.orientation(),
            &engine_layout.broken_seats,
        );
        let mut order = engine.builder.build(&mut grid, &engine.config.batches);
        if engine_layout.enforce_no_adjacent_batches {
            engine.resolver.resolve(&mut grid, &mut order);
        }
        let (is_valid, violations) = engine.validator.validate(
            &grid,
            &engine.config.batches,
            engine_layout.enforce_no_adjacent_batches,
        );
        Ok(FeasibilityReport {
            is_valid,
            violations,
        })
    }
}

// ==========================================
// AllocationRun - 分配运行(每请求一个, 用完即弃)
// ==========================================
pub struct AllocationRun {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    grid: Grid,
    batches: BatchRegistry,
    enforce_no_adjacent_batches: bool,
    /// 相邻消解是否干净完成(false = 尽力而为, 留有残余冲突)
    adjacency_resolved: bool,
    order: AllocationOrder,
    warnings: Vec<LabelWarning>,
}

impl AllocationRun {
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn warnings(&self) -> &[LabelWarning] {
        &self.warnings
    }

    pub fn adjacency_resolved(&self) -> bool {
        self.adjacency_resolved
    }

    /// 网格耗尽后未满足的座位需求
    pub fn shortfall(&self) -> usize {
        self.order.shortfall()
    }

    /// 仅凭完成的网格重新推导全部不变量
    pub fn validate(&self) -> (bool, Vec<Violation>) {
        ConstraintValidator::new().validate(
            &self.grid,
            &self.batches,
            self.enforce_no_adjacent_batches,
        )
    }

    /// 完整投影
    pub fn project(&self) -> SeatingProjection {
        Projector::new().project(
            &self.grid,
            &self.batches,
            &self.warnings,
            self.run_id,
            self.generated_at,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::seat::SeatPos;
    use crate::domain::types::ViolationKind;

    #[test]
    fn test_generate_validate_project_pipeline() {
        let config = AllocationConfig::builder(2, 4)
            .block_width(2)
            .batch_count(1, 4)
            .batch_count(2, 4)
            .build()
            .unwrap();
        let run = SeatingEngine::new(config).generate();

        let (is_valid, violations) = run.validate();
        assert!(is_valid, "violations: {:?}", violations);

        let projection = run.project();
        assert_eq!(projection.rows, 2);
        assert_eq!(projection.batch_summaries.len(), 2);
        assert!(projection.warnings.is_empty());
    }

    #[test]
    fn test_feasibility_check_single_batch_adjacency() {
        let layout = LayoutParams {
            rows: 1,
            cols: 4,
            num_batches: 1,
            block_width: 1,
            batch_by_column: true,
            enforce_no_adjacent_batches: true,
            broken_seats: Vec::new(),
        };
        let report = SeatingEngine::feasibility_check(&layout).unwrap();
        assert!(!report.is_valid);
        assert!(report
            .violations
            .iter()
            .all(|v| v.kind == ViolationKind::AdjacentSameBatch));
        assert_eq!(report.violations.len(), 3);
    }

    #[test]
    fn test_feasibility_check_multi_batch_ok() {
        let layout = LayoutParams {
            rows: 1,
            cols: 4,
            num_batches: 4,
            block_width: 1,
            batch_by_column: true,
            enforce_no_adjacent_batches: true,
            broken_seats: Vec::new(),
        };
        let report = SeatingEngine::feasibility_check(&layout).unwrap();
        assert!(report.is_valid, "violations: {:?}", report.violations);
    }

    #[test]
    fn test_runs_are_independent_and_deterministic() {
        let config = AllocationConfig::builder(3, 6)
            .block_width(2)
            .batch_count(1, 9)
            .batch_count(2, 9)
            .enforce_no_adjacent_batches(true)
            .build()
            .unwrap();
        let engine = SeatingEngine::new(config);
        let first = engine.generate();
        let second = engine.generate();

        assert_ne!(first.run_id, second.run_id);
        for pos in first.grid().positions_row_major() {
            assert_eq!(
                first.grid().seat(pos).batch_id,
                second.grid().seat(pos).batch_id
            );
            assert_eq!(
                first.grid().seat(pos).roll_number,
                second.grid().seat(pos).roll_number
            );
        }
    }

    #[test]
    fn test_broken_seat_never_allocated() {
        let config = AllocationConfig::builder(2, 4)
            .block_width(2)
            .batch_count(1, 4)
            .batch_count(2, 4)
            .broken_seats(vec![SeatPos::new(0, 1)])
            .build()
            .unwrap();
        let run = SeatingEngine::new(config).generate();

        assert!(run.grid().seat(SeatPos::new(0, 1)).is_broken());
        let (is_valid, violations) = run.validate();
        assert!(!is_valid);
        assert!(violations
            .iter()
            .any(|v| v.kind == ViolationKind::InsufficientCapacity));
        assert!(violations
            .iter()
            .all(|v| v.kind != ViolationKind::BrokenSeatAllocated));
    }
}
