//! # OCA - OCR Confidence Analysis
//!
//! 下载数字化图书的 METS/ALTO，统计每个单词的 OCR 置信度，
//! 按页和按书汇总，并生成图表、热力图与 HTML 报告。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层
//! - `clients/` - `Fetcher` 下载能力（reqwest / file://）
//! - `parsers/` - METS 与 ALTO 的流式解析
//!
//! ### ② 业务能力层（Services）
//! - `locator` - 记录ID → METS URL
//! - `aggregator` - 置信度统计
//! - `renderer` - 图表、热力图、HTML
//! - `store` - 输出目录与本地缓存
//! - `failure_writer` - 记录失败页面
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/page_pool` - 有界并发的页面调度器
//! - `orchestrator/record_processor` - 单条记录的完整流程

pub mod app;
pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod parsers;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use app::App;
pub use clients::{Fetcher, HttpFetcher};
pub use config::Config;
pub use error::{AppResult, OcaError};
pub use models::{PageRef, PageResult, Record};
pub use orchestrator::{process_record, PagePool, RecordSummary};
pub use services::{locate, Library};
