use crate::clients::HttpFetcher;
use crate::config::Config;
use crate::orchestrator::{process_record, RecordSummary};
use crate::services::{locate, Library};
use crate::utils::logging::{log_startup, print_final_stats};
use anyhow::Result;
use std::sync::Arc;

/// 应用主结构
pub struct App {
    config: Config,
    library: Library,
    fetcher: Arc<HttpFetcher>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let library = Library::from_name(&config.library)?;
        let fetcher = Arc::new(HttpFetcher::new(&config)?);

        Ok(Self {
            config,
            library,
            fetcher,
        })
    }

    /// 分析一条记录并生成报告
    pub async fn run(&self, record_id: &str) -> Result<RecordSummary> {
        let record = locate(record_id, self.config.mets_url.as_deref(), self.library)?;
        log_startup(&record, self.config.threads);

        let summary =
            process_record(self.fetcher.clone(), &record, self.library, &self.config).await?;

        print_final_stats(&summary);
        Ok(summary)
    }
}
