// ==========================================
// 考场排座系统 - 引擎错误类型
// ==========================================
// 职责: 输入错误的快速失败表达
// 红线: 所有错误信息必须点名违规参数(可解释性);
//       约束违规不走错误路径, 见 domain::violation
// ==========================================

use thiserror::Error;

/// 引擎输入错误
///
/// 输入错误中止运行, 不产生部分网格
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// 网格尺寸非法
    #[error("无效的网格尺寸: rows={rows}, cols={cols} (均须 >=1)")]
    InvalidDimensions { rows: usize, cols: usize },

    /// 批次数量越界
    #[error("无效的批次数量: {0} (允许范围 1..=200)")]
    InvalidBatchCount(usize),

    /// 块宽超出分块方向长度或小于 1
    #[error("无效的块宽: block_width={block_width} (允许范围 1..={extent})")]
    InvalidBlockWidth { block_width: usize, extent: usize },

    /// 坏座位越界或重复
    #[error("无效的坏座位: ({row},{col}) 越界或重复")]
    InvalidBrokenSeat { row: usize, col: usize },

    /// 批次 ID 不连续(必须为 1..=N)
    #[error("批次 ID 不连续: 缺少批次 {missing} (批次 ID 必须为 1..=N)")]
    NonContiguousBatchIds { missing: u32 },

    /// 同一批次既给名册又给人数
    #[error("批次 {batch_id} 同时提供了名册和人数, 配置矛盾")]
    ContradictoryBatchSpec { batch_id: u32 },

    /// 标签/颜色/前缀引用了没有人数或名册的批次
    #[error("批次 {batch_id} 只有显示元数据, 缺少人数或名册")]
    UnknownBatchId { batch_id: u32 },

    /// 起始学号无尾部数字后缀
    #[error("批次 {batch_id} 的起始学号无法递增: {start_roll:?} 缺少数字后缀")]
    MalformedStartRoll { batch_id: u32, start_roll: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
