// ==========================================
// 考场排座系统 - 命令行入口
// ==========================================
// 职责: 读取 JSON 请求文件, 调用引擎, 打印投影结果
// 边界: 仅做参数面转换, 不含任何分配逻辑
// ==========================================

use anyhow::{Context, Result};
use exam_seating::config::{AllocationConfig, AllocationConfigBuilder};
use exam_seating::domain::SeatPos;
use exam_seating::engine::SeatingEngine;
use exam_seating::logging;
use exam_seating::SerialMode;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;

// ==========================================
// SeatingRequest - 请求参数面
// ==========================================
// 与原有调用面保持兼容: 坏座位为 1 基 "r-c,r-c",
// 人数/颜色为 "k:v,k:v", 前缀为按批次顺序的 CSV
#[derive(Debug, Deserialize)]
#[serde(default)]
struct SeatingRequest {
    rows: usize,
    cols: usize,
    num_batches: usize,
    block_width: usize,
    batch_by_column: bool,
    enforce_no_adjacent_batches: bool,
    broken_seats: String,
    batch_student_counts: String,
    batch_roll_numbers: BTreeMap<String, Vec<String>>,
    batch_labels: BTreeMap<String, String>,
    batch_colors: String,
    batch_prefixes: String,
    roll_template: Option<String>,
    year: Option<i32>,
    start_serial: u64,
    start_serials: BTreeMap<String, u64>,
    start_rolls: BTreeMap<String, String>,
    serial_width: usize,
    serial_mode: SerialMode,
}

impl Default for SeatingRequest {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 15,
            num_batches: 3,
            block_width: 3,
            batch_by_column: true,
            enforce_no_adjacent_batches: false,
            broken_seats: String::new(),
            batch_student_counts: String::new(),
            batch_roll_numbers: BTreeMap::new(),
            batch_labels: BTreeMap::new(),
            batch_colors: String::new(),
            batch_prefixes: String::new(),
            roll_template: None,
            year: None,
            start_serial: 1,
            start_serials: BTreeMap::new(),
            start_rolls: BTreeMap::new(),
            serial_width: 0,
            serial_mode: SerialMode::default(),
        }
    }
}

impl SeatingRequest {
    fn into_config(self) -> Result<AllocationConfig> {
        let mut builder = AllocationConfigBuilder::new(self.rows, self.cols)
            .num_batches(self.num_batches)
            .block_width(self.block_width)
            .batch_by_column(self.batch_by_column)
            .enforce_no_adjacent_batches(self.enforce_no_adjacent_batches)
            .broken_seats(parse_broken_seats(&self.broken_seats, self.rows, self.cols))
            .start_serial(self.start_serial)
            .serial_width(self.serial_width)
            .serial_mode(self.serial_mode);

        for (batch_id, count) in parse_keyed_csv(&self.batch_student_counts) {
            if let Ok(count) = count.parse::<usize>() {
                builder = builder.batch_count(batch_id, count);
            }
        }
        for (batch_id, color) in parse_keyed_csv(&self.batch_colors) {
            builder = builder.batch_color(batch_id, color);
        }
        for (idx, prefix) in csv_parts(&self.batch_prefixes).into_iter().enumerate() {
            builder = builder.batch_prefix(idx as u32 + 1, prefix);
        }
        for (batch_id, rolls) in numeric_keys(self.batch_roll_numbers) {
            builder = builder.batch_roster(batch_id, rolls);
        }
        for (batch_id, label) in numeric_keys(self.batch_labels) {
            builder = builder.batch_label(batch_id, label);
        }
        for (batch_id, serial) in numeric_keys(self.start_serials) {
            builder = builder.batch_start_serial(batch_id, serial);
        }
        for (batch_id, roll) in numeric_keys(self.start_rolls) {
            builder = builder.batch_start_roll(batch_id, roll);
        }
        if let Some(template) = self.roll_template {
            builder = builder.roll_template(template);
        }
        if let Some(year) = self.year {
            builder = builder.year(year);
        }

        Ok(builder.build()?)
    }
}

fn csv_parts(text: &str) -> Vec<String> {
    text.split(',')
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_string())
        .collect()
}

/// 解析 "k:v,k:v", 跳过格式错误的片段
fn parse_keyed_csv(text: &str) -> Vec<(u32, String)> {
    csv_parts(text)
        .into_iter()
        .filter_map(|part| {
            let (key, value) = part.split_once(':')?;
            let batch_id = key.trim().parse::<u32>().ok()?;
            Some((batch_id, value.trim().to_string()))
        })
        .collect()
}

/// 解析 1 基 "r-c,r-c" 坏座位, 越界或格式错误的片段跳过
fn parse_broken_seats(text: &str, rows: usize, cols: usize) -> Vec<SeatPos> {
    csv_parts(text)
        .into_iter()
        .filter_map(|part| {
            let (row, col) = part.split_once('-')?;
            let row = row.trim().parse::<usize>().ok()?.checked_sub(1)?;
            let col = col.trim().parse::<usize>().ok()?.checked_sub(1)?;
            (row < rows && col < cols).then_some(SeatPos::new(row, col))
        })
        .collect()
}

/// 字符串键映射转数字批次键, 非数字键跳过
fn numeric_keys<V>(map: BTreeMap<String, V>) -> Vec<(u32, V)> {
    map.into_iter()
        .filter_map(|(key, value)| Some((key.trim().parse::<u32>().ok()?, value)))
        .collect()
}

fn main() -> Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 座位分配引擎", exam_seating::APP_NAME);
    tracing::info!("系统版本: {}", exam_seating::VERSION);
    tracing::info!("==================================================");

    let path = std::env::args()
        .nth(1)
        .context("用法: exam-seating <request.json>")?;
    let text =
        fs::read_to_string(&path).with_context(|| format!("无法读取请求文件: {}", path))?;
    let request: SeatingRequest =
        serde_json::from_str(&text).context("请求 JSON 解析失败")?;

    let config = request.into_config()?;
    let engine = SeatingEngine::new(config);
    let run = engine.generate();

    let (is_valid, violations) = run.validate();
    let mut output = serde_json::to_value(run.project())?;
    output["validation"] = json!({
        "is_valid": is_valid,
        "violations": violations,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
