// ==========================================
// 考场排座系统 - 分配配置
// ==========================================
// 职责: 把调用方的松散参数面(人数/名册/标签/颜色等四套并行映射)
//       收敛为一份构造期校验完成的配置记录
// 红线: 矛盾组合(同批次既有名册又有人数)在边界拒绝, 不做静默取舍
// 红线: 输入错误快速失败, 不产生部分运行
// ==========================================

use crate::domain::batch::{split_numeric_suffix, Batch, BatchRegistry, LabelRule};
use crate::domain::seat::SeatPos;
use crate::domain::types::{BlockOrientation, SerialMode};
use crate::error::{EngineError, EngineResult};
use crate::provider::RosterProvider;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;

/// 未指定批次颜色时循环使用的调色板
const DEFAULT_COLORS: &[&str] = &[
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

/// 批次数量上限
const MAX_BATCHES: usize = 200;

// ==========================================
// LayoutParams - 布局参数
// ==========================================
// 可行性预检只需要这部分(无名册/人数)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutParams {
    pub rows: usize,
    pub cols: usize,
    pub num_batches: usize,
    pub block_width: usize,
    pub batch_by_column: bool,
    pub enforce_no_adjacent_batches: bool,
    pub broken_seats: Vec<SeatPos>,
}

impl LayoutParams {
    pub fn orientation(&self) -> BlockOrientation {
        BlockOrientation::from_batch_by_column(self.batch_by_column)
    }

    /// 分块方向上的长度
    pub fn extent(&self) -> usize {
        match self.orientation() {
            BlockOrientation::ColumnMajor => self.cols,
            BlockOrientation::RowMajor => self.rows,
        }
    }

    /// 可用(非坏)座位总数
    pub fn usable_seats(&self) -> usize {
        self.rows * self.cols - self.broken_seats.len()
    }
}

// ==========================================
// AllocationConfig - 分配配置(构造期已校验)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConfig {
    pub layout: LayoutParams,
    pub batches: BatchRegistry,
    pub serial_mode: SerialMode,
    /// 序号零填充位数, 0 = 不填充
    pub serial_width: usize,
    /// 运行级起始序号(global 模式的计数起点, per_batch 模式的默认起点)
    pub start_serial: u64,
}

impl AllocationConfig {
    pub fn builder(rows: usize, cols: usize) -> AllocationConfigBuilder {
        AllocationConfigBuilder::new(rows, cols)
    }
}

// ==========================================
// AllocationConfigBuilder - 配置构建器
// ==========================================
// 接收原有调用面的批次键控映射, build() 时统一校验并
// 归并为按 ID 有序的 Batch 记录
#[derive(Debug, Clone)]
pub struct AllocationConfigBuilder {
    rows: usize,
    cols: usize,
    num_batches: usize,
    block_width: usize,
    batch_by_column: bool,
    enforce_no_adjacent_batches: bool,
    broken_seats: Vec<SeatPos>,
    batch_student_counts: BTreeMap<u32, usize>,
    batch_roll_numbers: BTreeMap<u32, Vec<String>>,
    batch_labels: BTreeMap<u32, String>,
    batch_colors: BTreeMap<u32, String>,
    batch_prefixes: BTreeMap<u32, String>,
    roll_template: Option<String>,
    year: Option<i32>,
    start_serial: u64,
    start_serials: BTreeMap<u32, u64>,
    start_rolls: BTreeMap<u32, String>,
    serial_width: usize,
    serial_mode: SerialMode,
}

impl AllocationConfigBuilder {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            num_batches: 1,
            block_width: 1,
            batch_by_column: true,
            enforce_no_adjacent_batches: false,
            broken_seats: Vec::new(),
            batch_student_counts: BTreeMap::new(),
            batch_roll_numbers: BTreeMap::new(),
            batch_labels: BTreeMap::new(),
            batch_colors: BTreeMap::new(),
            batch_prefixes: BTreeMap::new(),
            roll_template: None,
            year: None,
            start_serial: 1,
            start_serials: BTreeMap::new(),
            start_rolls: BTreeMap::new(),
            serial_width: 0,
            serial_mode: SerialMode::default(),
        }
    }

    /// 从布局参数构建(可行性预检入口)
    pub fn from_layout(layout: &LayoutParams) -> Self {
        Self::new(layout.rows, layout.cols)
            .num_batches(layout.num_batches)
            .block_width(layout.block_width)
            .batch_by_column(layout.batch_by_column)
            .enforce_no_adjacent_batches(layout.enforce_no_adjacent_batches)
            .broken_seats(layout.broken_seats.clone())
    }

    /// 批次数量(提供显式人数/名册时被忽略)
    pub fn num_batches(mut self, num_batches: usize) -> Self {
        self.num_batches = num_batches;
        self
    }

    pub fn block_width(mut self, block_width: usize) -> Self {
        self.block_width = block_width;
        self
    }

    pub fn batch_by_column(mut self, batch_by_column: bool) -> Self {
        self.batch_by_column = batch_by_column;
        self
    }

    pub fn enforce_no_adjacent_batches(mut self, enforce: bool) -> Self {
        self.enforce_no_adjacent_batches = enforce;
        self
    }

    pub fn broken_seats(mut self, broken_seats: Vec<SeatPos>) -> Self {
        self.broken_seats = broken_seats;
        self
    }

    pub fn batch_count(mut self, batch_id: u32, count: usize) -> Self {
        self.batch_student_counts.insert(batch_id, count);
        self
    }

    pub fn batch_roster(mut self, batch_id: u32, rolls: Vec<String>) -> Self {
        self.batch_roll_numbers.insert(batch_id, rolls);
        self
    }

    pub fn batch_label(mut self, batch_id: u32, label: impl Into<String>) -> Self {
        self.batch_labels.insert(batch_id, label.into());
        self
    }

    pub fn batch_color(mut self, batch_id: u32, color: impl Into<String>) -> Self {
        self.batch_colors.insert(batch_id, color.into());
        self
    }

    pub fn batch_prefix(mut self, batch_id: u32, prefix: impl Into<String>) -> Self {
        self.batch_prefixes.insert(batch_id, prefix.into());
        self
    }

    /// 全局默认前缀(批次无自有前缀时使用)
    pub fn roll_template(mut self, template: impl Into<String>) -> Self {
        self.roll_template = Some(template.into());
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn start_serial(mut self, start_serial: u64) -> Self {
        self.start_serial = start_serial;
        self
    }

    pub fn batch_start_serial(mut self, batch_id: u32, start_serial: u64) -> Self {
        self.start_serials.insert(batch_id, start_serial);
        self
    }

    pub fn batch_start_roll(mut self, batch_id: u32, start_roll: impl Into<String>) -> Self {
        self.start_rolls.insert(batch_id, start_roll.into());
        self
    }

    pub fn serial_width(mut self, serial_width: usize) -> Self {
        self.serial_width = serial_width;
        self
    }

    pub fn serial_mode(mut self, serial_mode: SerialMode) -> Self {
        self.serial_mode = serial_mode;
        self
    }

    /// 从名册提供方拉取批次名册
    ///
    /// 批次 ID 按提供方顺序取 1..=N, 标签与人数来自名册
    pub fn rosters_from_provider(
        mut self,
        provider: &dyn RosterProvider,
    ) -> Result<Self, Box<dyn Error>> {
        for (idx, roster) in provider.fetch_rosters()?.into_iter().enumerate() {
            let batch_id = idx as u32 + 1;
            self.batch_labels.insert(batch_id, roster.label);
            self.batch_roll_numbers.insert(batch_id, roster.rolls);
        }
        Ok(self)
    }

    // ==========================================
    // 构造期校验
    // ==========================================

    /// 校验并产出配置
    pub fn build(self) -> EngineResult<AllocationConfig> {
        // 网格尺寸
        if self.rows < 1 || self.cols < 1 {
            return Err(EngineError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }

        // 块宽: 1..=分块方向长度(不整除允许, 末块截断)
        let extent = if self.batch_by_column {
            self.cols
        } else {
            self.rows
        };
        if self.block_width < 1 || self.block_width > extent {
            return Err(EngineError::InvalidBlockWidth {
                block_width: self.block_width,
                extent,
            });
        }

        // 坏座位: 界内且唯一
        let mut seen = BTreeSet::new();
        for pos in &self.broken_seats {
            if pos.row >= self.rows || pos.col >= self.cols || !seen.insert(*pos) {
                return Err(EngineError::InvalidBrokenSeat {
                    row: pos.row,
                    col: pos.col,
                });
            }
        }

        // 矛盾组合: 同批次既有名册又有人数
        for batch_id in self.batch_student_counts.keys() {
            if self.batch_roll_numbers.contains_key(batch_id) {
                return Err(EngineError::ContradictoryBatchSpec {
                    batch_id: *batch_id,
                });
            }
        }

        // 有效批次数: 有显式数据时以数据为准, 否则取 num_batches
        let explicit =
            !self.batch_student_counts.is_empty() || !self.batch_roll_numbers.is_empty();
        let num_batches = if explicit {
            let max_id = self
                .batch_student_counts
                .keys()
                .chain(self.batch_roll_numbers.keys())
                .max()
                .copied()
                .unwrap_or(0);
            // 批次 ID 必须为连续的 1..=N
            for batch_id in 1..=max_id {
                if !self.batch_student_counts.contains_key(&batch_id)
                    && !self.batch_roll_numbers.contains_key(&batch_id)
                {
                    return Err(EngineError::NonContiguousBatchIds { missing: batch_id });
                }
            }
            max_id as usize
        } else {
            self.num_batches
        };
        if num_batches < 1 || num_batches > MAX_BATCHES {
            return Err(EngineError::InvalidBatchCount(num_batches));
        }

        // 显示元数据不得引用不存在的批次
        let metadata_ids = self
            .batch_labels
            .keys()
            .chain(self.batch_colors.keys())
            .chain(self.batch_prefixes.keys())
            .chain(self.start_serials.keys())
            .chain(self.start_rolls.keys());
        for batch_id in metadata_ids {
            if *batch_id as usize > num_batches || *batch_id == 0 {
                return Err(EngineError::UnknownBatchId {
                    batch_id: *batch_id,
                });
            }
        }

        // 起始学号必须可递增(有数字后缀)
        for (batch_id, start_roll) in &self.start_rolls {
            if split_numeric_suffix(start_roll).is_none() {
                return Err(EngineError::MalformedStartRoll {
                    batch_id: *batch_id,
                    start_roll: start_roll.clone(),
                });
            }
        }

        // 归并为有序 Batch 记录
        let usable = self.rows * self.cols - self.broken_seats.len();
        let mut batches = Vec::with_capacity(num_batches);
        for batch_id in 1..=num_batches as u32 {
            let label = self
                .batch_labels
                .get(&batch_id)
                .cloned()
                .unwrap_or_else(|| format!("BATCH{}", batch_id));
            let color = self
                .batch_colors
                .get(&batch_id)
                .cloned()
                .unwrap_or_else(|| {
                    DEFAULT_COLORS[(batch_id as usize - 1) % DEFAULT_COLORS.len()].to_string()
                });

            let (seat_count, label_rule) =
                if let Some(rolls) = self.batch_roll_numbers.get(&batch_id) {
                    (rolls.len(), LabelRule::Roster(rolls.clone()))
                } else {
                    let count = match self.batch_student_counts.get(&batch_id) {
                        Some(count) => *count,
                        // 无显式数据: 可用座位等分, 余数给低 ID 批次
                        None => equal_share(usable, num_batches, batch_id as usize),
                    };
                    let prefix = self
                        .batch_prefixes
                        .get(&batch_id)
                        .cloned()
                        .or_else(|| self.roll_template.clone())
                        .unwrap_or_else(|| label.clone());
                    (
                        count,
                        LabelRule::Template {
                            prefix,
                            year: self.year,
                            start_serial: self.start_serials.get(&batch_id).copied(),
                            start_roll: self.start_rolls.get(&batch_id).cloned(),
                        },
                    )
                };

            batches.push(Batch {
                id: batch_id,
                label,
                seat_count,
                color,
                label_rule,
            });
        }

        Ok(AllocationConfig {
            layout: LayoutParams {
                rows: self.rows,
                cols: self.cols,
                num_batches,
                block_width: self.block_width,
                batch_by_column: self.batch_by_column,
                enforce_no_adjacent_batches: self.enforce_no_adjacent_batches,
                broken_seats: self.broken_seats,
            },
            batches: BatchRegistry::new(batches),
            serial_mode: self.serial_mode,
            serial_width: self.serial_width,
            start_serial: self.start_serial,
        })
    }
}

/// 等分可用座位: 前 remainder 个批次多拿一个
fn equal_share(usable: usize, num_batches: usize, batch_id: usize) -> usize {
    let per = usable / num_batches;
    let remainder = usable % num_batches;
    if batch_id <= remainder {
        per + 1
    } else {
        per
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_dimensions() {
        let err = AllocationConfig::builder(0, 4).build().unwrap_err();
        assert!(matches!(err, EngineError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_rejects_block_width_over_extent() {
        let err = AllocationConfig::builder(2, 4)
            .block_width(5)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidBlockWidth {
                block_width: 5,
                extent: 4
            }
        );
    }

    #[test]
    fn test_block_width_extent_follows_orientation() {
        // 行组方向: 块宽以行数为上限
        let err = AllocationConfig::builder(2, 4)
            .batch_by_column(false)
            .block_width(3)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidBlockWidth {
                block_width: 3,
                extent: 2
            }
        );
    }

    #[test]
    fn test_rejects_batch_count_out_of_range() {
        let err = AllocationConfig::builder(10, 10)
            .num_batches(201)
            .build()
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidBatchCount(201));

        let err = AllocationConfig::builder(10, 10)
            .num_batches(0)
            .build()
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidBatchCount(0));
    }

    #[test]
    fn test_rejects_out_of_bounds_broken_seat() {
        let err = AllocationConfig::builder(2, 4)
            .broken_seats(vec![SeatPos::new(2, 0)])
            .build()
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidBrokenSeat { row: 2, col: 0 });
    }

    #[test]
    fn test_rejects_duplicate_broken_seat() {
        let err = AllocationConfig::builder(2, 4)
            .broken_seats(vec![SeatPos::new(0, 1), SeatPos::new(0, 1)])
            .build()
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidBrokenSeat { row: 0, col: 1 });
    }

    #[test]
    fn test_rejects_roster_and_count_for_same_batch() {
        let err = AllocationConfig::builder(2, 4)
            .batch_count(1, 4)
            .batch_roster(1, vec!["A1".to_string()])
            .build()
            .unwrap_err();
        assert_eq!(err, EngineError::ContradictoryBatchSpec { batch_id: 1 });
    }

    #[test]
    fn test_rejects_non_contiguous_batch_ids() {
        let err = AllocationConfig::builder(2, 4)
            .batch_count(1, 2)
            .batch_count(3, 2)
            .build()
            .unwrap_err();
        assert_eq!(err, EngineError::NonContiguousBatchIds { missing: 2 });
    }

    #[test]
    fn test_rejects_metadata_for_unknown_batch() {
        let err = AllocationConfig::builder(2, 4)
            .batch_count(1, 8)
            .batch_label(2, "CSE")
            .build()
            .unwrap_err();
        assert_eq!(err, EngineError::UnknownBatchId { batch_id: 2 });
    }

    #[test]
    fn test_rejects_start_roll_without_numeric_suffix() {
        let err = AllocationConfig::builder(2, 4)
            .batch_count(1, 8)
            .batch_start_roll(1, "ROLL")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::MalformedStartRoll {
                batch_id: 1,
                start_roll: "ROLL".to_string()
            }
        );
    }

    #[test]
    fn test_roster_length_drives_seat_count() {
        let config = AllocationConfig::builder(2, 4)
            .batch_roster(1, vec!["A1".to_string(), "A2".to_string()])
            .batch_roster(2, vec!["B1".to_string()])
            .build()
            .unwrap();
        assert_eq!(config.layout.num_batches, 2);
        assert_eq!(config.batches.get(1).map(|b| b.seat_count), Some(2));
        assert_eq!(config.batches.get(2).map(|b| b.seat_count), Some(1));
    }

    #[test]
    fn test_synthetic_equal_split_without_explicit_data() {
        // 7 个可用座位分 3 批: 3/2/2
        let config = AllocationConfig::builder(2, 4)
            .num_batches(3)
            .broken_seats(vec![SeatPos::new(0, 0)])
            .build()
            .unwrap();
        let counts: Vec<usize> = config.batches.iter().map(|b| b.seat_count).collect();
        assert_eq!(counts, vec![3, 2, 2]);
    }

    #[test]
    fn test_prefix_fallback_chain() {
        let config = AllocationConfig::builder(2, 4)
            .batch_count(1, 2)
            .batch_count(2, 2)
            .batch_count(3, 2)
            .batch_prefix(1, "CS")
            .roll_template("EN")
            .batch_label(3, "MECH")
            .build()
            .unwrap();
        let prefix_of = |id: u32| match &config.batches.get(id).unwrap().label_rule {
            LabelRule::Template { prefix, .. } => prefix.clone(),
            _ => unreachable!(),
        };
        assert_eq!(prefix_of(1), "CS");
        assert_eq!(prefix_of(2), "EN"); // roll_template 兜底
        assert_eq!(prefix_of(3), "EN"); // roll_template 优先于标签
    }

    #[test]
    fn test_default_labels_and_palette_colors() {
        let config = AllocationConfig::builder(2, 4)
            .num_batches(2)
            .build()
            .unwrap();
        let first = config.batches.get(1).unwrap();
        assert_eq!(first.label, "BATCH1");
        assert_eq!(first.color, DEFAULT_COLORS[0]);
    }
}
