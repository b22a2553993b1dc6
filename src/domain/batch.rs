// ==========================================
// 考场排座系统 - 批次实体
// ==========================================
// 职责: 批次身份、人数、标签生成配置; 批次注册表
// 不变量: 批次 ID 为 1..=N 且在一次运行内稳定;
//         运行开始后批次不可变
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// LabelRule - 标签生成规则
// ==========================================
// 每个批次二选一: 显式名册 或 生成模板
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelRule {
    /// 显式名册: 按分配顺序消费的学号列表
    Roster(Vec<String>),
    /// 生成模板: prefix[+year][+零填充序号]
    Template {
        prefix: String,
        year: Option<i32>,
        /// 批次自有起始序号(per_batch 模式下覆盖运行级 start_serial)
        start_serial: Option<u64>,
        /// 起始学号字符串, 首座位原样使用, 后续从数字后缀递增
        start_roll: Option<String>,
    },
}

// ==========================================
// Batch - 批次实体
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    /// 数字 ID, 1..=N
    pub id: u32,

    /// 显示标签
    pub label: String,

    /// 需要的座位数(名册批次 = 名册长度)
    pub seat_count: usize,

    /// 批次颜色
    pub color: String,

    /// 标签生成规则
    pub label_rule: LabelRule,
}

// ==========================================
// BatchRegistry - 批次注册表
// ==========================================
// 每次请求构建一次, 按 ID 升序排列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRegistry {
    batches: Vec<Batch>,
}

impl BatchRegistry {
    pub fn new(mut batches: Vec<Batch>) -> Self {
        batches.sort_by_key(|b| b.id);
        Self { batches }
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Batch> {
        self.batches.iter()
    }

    pub fn get(&self, id: u32) -> Option<&Batch> {
        self.batches.iter().find(|b| b.id == id)
    }

    /// 全部批次的座位总需求
    pub fn total_demand(&self) -> usize {
        self.batches.iter().map(|b| b.seat_count).sum()
    }
}

// ==========================================
// 数字后缀拆分
// ==========================================

/// 拆分起始学号的尾部数字后缀
///
/// 后缀取全部尾部数字, 返回 (词干, 数字, 后缀位数);
/// 无数字后缀或数字溢出时返回 None
///
/// 例: "CS2024007" -> ("CS", 2024007, 7)
pub fn split_numeric_suffix(roll: &str) -> Option<(String, u64, usize)> {
    let digits = roll.chars().rev().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let split_at = roll.len() - digits;
    let (stem, suffix) = roll.split_at(split_at);
    let number: u64 = suffix.parse().ok()?;
    Some((stem.to_string(), number, digits))
}
