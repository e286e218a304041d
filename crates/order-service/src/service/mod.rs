//! 业务服务层
//!
//! 订单工作流与积分兑换的核心规则都在这里，处理器只做参数解析和权限检查

pub mod loyalty;
pub mod workflow;

pub use workflow::OrderWorkflow;
