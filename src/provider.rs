// ==========================================
// 考场排座系统 - 名册提供方边界
// ==========================================
// 职责: 定义引擎消费的名册读取接口(不包含实现细节)
// 红线: 引擎内部不做任何 I/O; 数据库/文件解析
//       由外部协作方在引擎调用前完成
// ==========================================

use serde::{Deserialize, Serialize};
use std::error::Error;

// ==========================================
// BatchRoster - 一个批次的名册
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRoster {
    /// 批次显示标签(如 "CSE")
    pub label: String,

    /// 有序的学号列表(入库顺序)
    pub rolls: Vec<String>,
}

// ==========================================
// RosterProvider Trait
// ==========================================
// 用途: 配置层从持久化的上传数据拉取批次名册
// 实现者: 外部协作方(数据库/文件); 测试用 InMemoryRosterProvider
pub trait RosterProvider: Send + Sync {
    /// 拉取全部批次名册
    ///
    /// # 返回
    /// 按稳定顺序排列的名册列表; 批次 ID 按该顺序取 1..=N
    fn fetch_rosters(&self) -> Result<Vec<BatchRoster>, Box<dyn Error>>;
}

// ==========================================
// InMemoryRosterProvider - 内存名册提供方
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct InMemoryRosterProvider {
    rosters: Vec<BatchRoster>,
}

impl InMemoryRosterProvider {
    pub fn new(rosters: Vec<BatchRoster>) -> Self {
        Self { rosters }
    }
}

impl RosterProvider for InMemoryRosterProvider {
    fn fetch_rosters(&self) -> Result<Vec<BatchRoster>, Box<dyn Error>> {
        Ok(self.rosters.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AllocationConfig;
    use crate::domain::batch::LabelRule;

    #[test]
    fn test_config_from_provider() {
        let provider = InMemoryRosterProvider::new(vec![
            BatchRoster {
                label: "CSE".to_string(),
                rolls: vec!["CS001".to_string(), "CS002".to_string()],
            },
            BatchRoster {
                label: "ECE".to_string(),
                rolls: vec!["EC001".to_string()],
            },
        ]);
        let config = AllocationConfig::builder(2, 4)
            .rosters_from_provider(&provider)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.layout.num_batches, 2);
        let first = config.batches.get(1).unwrap();
        assert_eq!(first.label, "CSE");
        assert_eq!(first.seat_count, 2);
        assert!(matches!(first.label_rule, LabelRule::Roster(_)));
    }
}
