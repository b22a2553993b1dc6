// ==========================================
// 考场排座系统 - 违规与警告条目
// ==========================================
// 职责: 约束违规、标签短缺警告、可行性报告的结构化表达
// 红线: 违规是数据不是异常; 调用方按严重度自行决策
// ==========================================

use crate::domain::seat::SeatPos;
use crate::domain::types::ViolationKind;
use serde::{Deserialize, Serialize};

// ==========================================
// Violation - 约束违规条目
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// 违规类型
    pub kind: ViolationKind,

    /// 涉及座位坐标(可为空, 如容量类违规)
    pub locations: Vec<SeatPos>,

    /// 人类可读的违规描述
    pub detail: String,
}

impl Violation {
    pub fn new(kind: ViolationKind, locations: Vec<SeatPos>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            locations,
            detail: detail.into(),
        }
    }
}

// ==========================================
// LabelWarning - 标签短缺警告
// ==========================================
// 名册短于批次已分配座位数时产生; 非致命, 运行仍然成功
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelWarning {
    /// 受影响批次
    pub batch_id: u32,

    /// 缺少标签的座位数
    pub missing: usize,

    /// 留空标签的座位坐标
    pub seats: Vec<SeatPos>,

    /// 警告描述
    pub detail: String,
}

// ==========================================
// FeasibilityReport - 可行性报告
// ==========================================
// 仅凭布局参数(无真实名册)预检房间布局
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeasibilityReport {
    pub is_valid: bool,
    pub violations: Vec<Violation>,
}
