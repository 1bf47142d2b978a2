//! 页面调度器 - 编排层
//!
//! ## 核心功能
//!
//! 1. **并发控制**：Semaphore 限制同时运行的 worker 数为
//!    `min(请求数, 页数, CPU核数)`
//! 2. **失败隔离**：下载/解析失败或任务 panic 只影响该页
//! 3. **顺序还原**：无论完成顺序如何，结果按页序返回

use crate::clients::Fetcher;
use crate::error::AppResult;
use crate::models::{AltoPage, PageRef, PageResult};
use crate::parsers::parse_alto;
use crate::services::store::{CachedFetch, OutputLayout};
use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// 实际 worker 数：`min(requested, pages, cores)`，有页面时至少为 1
pub fn worker_count(requested: usize, pages: usize) -> usize {
    if pages == 0 {
        return 0;
    }
    requested.max(1).min(pages).min(num_cpus::get().max(1))
}

/// 页面调度器
pub struct PagePool<F: Fetcher> {
    fetcher: Arc<F>,
    requested_workers: usize,
    cache: Option<Arc<OutputLayout>>,
    refresh: bool,
}

impl<F: Fetcher> PagePool<F> {
    pub fn new(fetcher: Arc<F>, requested_workers: usize) -> Self {
        Self {
            fetcher,
            requested_workers,
            cache: None,
            refresh: false,
        }
    }

    /// 把下载的 ALTO 缓存到 `layout` 的 `alto/` 目录
    pub fn with_cache(mut self, layout: OutputLayout, refresh: bool) -> Self {
        self.cache = Some(Arc::new(layout));
        self.refresh = refresh;
        self
    }

    /// 处理所有页面
    ///
    /// # 返回
    /// 与输入等长、按 `PageRef::index` 排序的结果
    pub async fn run(&self, pages: Vec<PageRef>) -> Result<Vec<PageResult>> {
        let total = pages.len();
        let workers = worker_count(self.requested_workers, total);
        if total == 0 {
            return Ok(Vec::new());
        }
        info!("⚙️ 使用 {} 个 worker 处理 {} 页", workers, total);

        let semaphore = Arc::new(Semaphore::new(workers));
        let finished = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::with_capacity(total);

        for page in pages {
            let permit = semaphore.clone().acquire_owned().await?;
            let fetcher = self.fetcher.clone();
            let cache = self.cache.clone();
            let refresh = self.refresh;
            let finished = finished.clone();
            let task_page = page.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let result = process_page(fetcher.as_ref(), cache.as_deref(), refresh, task_page).await;
                let done = finished.fetch_add(1, Ordering::SeqCst) + 1;
                debug!("进度: {}/{}", done, total);
                result
            });
            handles.push((page, handle));
        }

        let mut results = Vec::with_capacity(total);
        for (page, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!("{} 任务执行失败: {}", page, e);
                    results.push(PageResult::failed(page, format!("任务执行失败: {}", e)));
                }
            }
        }

        results.sort_by_key(|r| r.page.index);
        Ok(results)
    }
}

/// 下载并解析单页 ALTO；任何错误都转为该页的失败结果
async fn process_page<F: Fetcher>(
    fetcher: &F,
    cache: Option<&OutputLayout>,
    refresh: bool,
    page: PageRef,
) -> PageResult {
    let parsed = match cache {
        Some(layout) => {
            CachedFetch::new(fetcher, refresh)
                .get_parsed(&page.alto_url, &layout.alto_file(&page), parse_alto_bytes)
                .await
        }
        None => match fetcher.fetch(&page.alto_url).await {
            Ok(bytes) => parse_alto_bytes(&bytes),
            Err(e) => Err(e),
        },
    };

    match parsed {
        Ok(alto) => {
            debug!("{} ✓ 解析完成: {} 行, {} 个单词", page, alto.lines.len(), alto.word_count());
            PageResult::parsed(page, alto)
        }
        Err(e) => {
            warn!("{} ❌ 处理失败: {}", page, e);
            PageResult::failed(page, e.to_string())
        }
    }
}

fn parse_alto_bytes(bytes: &[u8]) -> AppResult<AltoPage> {
    parse_alto(&String::from_utf8_lossy(bytes))
}
