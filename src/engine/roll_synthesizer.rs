// ==========================================
// 考场排座系统 - 学号合成引擎
// ==========================================
// 职责: 为每个已分配座位生成学号标签并携带批次颜色
// 输入: 构建/消解完成的网格 + 配置 + 分配顺序记录
// 输出: 座位标签 + 名册短缺警告
// 红线: 名册按分配顺序消费, 不按最终网格顺序;
//       名册耗尽降级为警告, 运行仍然成功
// ==========================================

use crate::config::AllocationConfig;
use crate::domain::batch::{split_numeric_suffix, LabelRule};
use crate::domain::grid::Grid;
use crate::domain::seat::SeatPos;
use crate::domain::types::SerialMode;
use crate::domain::violation::LabelWarning;
use crate::engine::grid_builder::AllocationOrder;
use std::collections::HashMap;
use tracing::{instrument, warn};

// ==========================================
// RollSynthesizer - 学号合成引擎
// ==========================================
pub struct RollSynthesizer {
    // 无状态引擎, 不需要注入依赖
}

impl RollSynthesizer {
    pub fn new() -> Self {
        Self {}
    }

    /// 合成全部座位标签
    ///
    /// 规则:
    /// 1) 名册批次: 名册条目按分配顺序逐座消费; 名册短于
    ///    座位数时剩余座位留空标签并产生警告
    /// 2) 模板批次: prefix[+year][+零填充序号]
    ///    - per_batch: 序号从批次自有起始序号(缺省为运行级
    ///      start_serial)开始, 只在本批次内递增
    ///    - global: 单一计数器按最终网格行优先顺序为每个
    ///      已分配座位递增
    /// 3) 起始学号(start_roll): 批次首座位原样使用, 后续
    ///    座位从数字后缀递增并保持后缀位宽
    /// 4) 每个已分配座位携带所属批次颜色
    #[instrument(skip_all, fields(serial_mode = %config.serial_mode))]
    pub fn synthesize(
        &self,
        grid: &mut Grid,
        config: &AllocationConfig,
        order: &AllocationOrder,
    ) -> Vec<LabelWarning> {
        // 颜色: 按批次归属统一着色
        let colors: HashMap<u32, String> = config
            .batches
            .iter()
            .map(|b| (b.id, b.color.clone()))
            .collect();
        let positions: Vec<SeatPos> = grid.positions_row_major().collect();
        for pos in &positions {
            let seat = grid.seat(*pos);
            if let Some(batch_id) = seat.batch_id.filter(|_| seat.is_allocated()) {
                grid.seat_mut(*pos).color = colors.get(&batch_id).cloned();
            }
        }

        // global 模式: 先按最终网格顺序给每个已分配座位定序号
        let global_serials: HashMap<SeatPos, u64> = match config.serial_mode {
            SerialMode::Global => {
                let mut serials = HashMap::new();
                let mut counter = config.start_serial;
                for pos in &positions {
                    if grid.seat(*pos).is_allocated() {
                        serials.insert(*pos, counter);
                        counter += 1;
                    }
                }
                serials
            }
            SerialMode::PerBatch => HashMap::new(),
        };

        let mut warnings = Vec::new();
        for batch in config.batches.iter() {
            let seats = order.batch_order(batch.id);
            match &batch.label_rule {
                LabelRule::Roster(rolls) => {
                    for (pos, roll) in seats.iter().zip(rolls.iter()) {
                        grid.seat_mut(*pos).roll_number = Some(roll.clone());
                    }
                    if rolls.len() < seats.len() {
                        let unlabeled: Vec<SeatPos> = seats[rolls.len()..].to_vec();
                        warn!(
                            batch_id = batch.id,
                            missing = unlabeled.len(),
                            "名册短于批次已分配座位数"
                        );
                        warnings.push(LabelWarning {
                            batch_id: batch.id,
                            missing: unlabeled.len(),
                            detail: format!(
                                "批次 {} 名册只有 {} 条, 已分配 {} 座, {} 座留空标签",
                                batch.id,
                                rolls.len(),
                                seats.len(),
                                unlabeled.len()
                            ),
                            seats: unlabeled,
                        });
                    }
                }
                LabelRule::Template {
                    prefix,
                    year,
                    start_serial,
                    start_roll,
                } => {
                    if let Some(start_roll) = start_roll {
                        // 构造期已校验数字后缀存在
                        if let Some((stem, number, width)) = split_numeric_suffix(start_roll) {
                            for (offset, pos) in seats.iter().enumerate() {
                                let label =
                                    format!("{}{:0w$}", stem, number + offset as u64, w = width);
                                grid.seat_mut(*pos).roll_number = Some(label);
                            }
                        }
                        continue;
                    }
                    match config.serial_mode {
                        SerialMode::PerBatch => {
                            let base = start_serial.unwrap_or(config.start_serial);
                            for (offset, pos) in seats.iter().enumerate() {
                                let label = compose_label(
                                    prefix,
                                    *year,
                                    base + offset as u64,
                                    config.serial_width,
                                );
                                grid.seat_mut(*pos).roll_number = Some(label);
                            }
                        }
                        SerialMode::Global => {
                            for pos in seats {
                                if let Some(serial) = global_serials.get(pos) {
                                    let label = compose_label(
                                        prefix,
                                        *year,
                                        *serial,
                                        config.serial_width,
                                    );
                                    grid.seat_mut(*pos).roll_number = Some(label);
                                }
                            }
                        }
                    }
                }
            }
        }
        warnings
    }
}

impl Default for RollSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

/// prefix[+year][+零填充序号]
fn compose_label(prefix: &str, year: Option<i32>, serial: u64, serial_width: usize) -> String {
    let serial_part = if serial_width > 0 {
        format!("{:0w$}", serial, w = serial_width)
    } else {
        serial.to_string()
    };
    match year {
        Some(year) => format!("{}{}{}", prefix, year, serial_part),
        None => format!("{}{}", prefix, serial_part),
    }
}
