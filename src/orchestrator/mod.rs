//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `page_pool` - 页面调度器
//! - 以有界并发（Semaphore）下载并解析每页 ALTO
//! - 单页失败只标记该页，不中断整本书
//! - 按原始页序返回结果
//!
//! ### `record_processor` - 单条记录处理器
//! - 获取并解析 METS（失败则终止）
//! - 委托 `page_pool` 处理所有页面
//! - 统计、出图、生成报告
//!
//! ## 层次关系
//!
//! ```text
//! record_processor (处理一条记录)
//!     ↓
//! page_pool (处理 Vec<PageRef>)
//!     ↓
//! parsers (METS / ALTO)  +  services (统计 / 渲染 / 存储)
//!     ↓
//! clients (Fetcher)
//! ```

pub mod page_pool;
pub mod record_processor;

pub use page_pool::{worker_count, PagePool};
pub use record_processor::{process_record, RecordSummary};
