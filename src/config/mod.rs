// ==========================================
// 考场排座系统 - 配置层
// ==========================================
// 职责: 分配配置的构建与构造期校验
// 红线: 配置一经 build 即不可变
// ==========================================

pub mod allocation_config;

pub use allocation_config::{AllocationConfig, AllocationConfigBuilder, LayoutParams};
