//! 单条记录处理器 - 编排层
//!
//! ## 核心功能
//!
//! 1. **METS**：下载（或读取本地副本）并解析，失败则终止本次运行
//! 2. **页面**：委托 `PagePool` 并发处理 ALTO
//! 3. **统计**：单页与整本书的置信度统计
//! 4. **输出**：热力图、总览图表、可选叠加图、JSON 统计、HTML 报告

use crate::clients::Fetcher;
use crate::config::Config;
use crate::models::{DocumentMetadata, PageResult, Record};
use crate::orchestrator::page_pool::{worker_count, PagePool};
use crate::parsers::parse_mets;
use crate::services::renderer::{self, charts, heatmap, HtmlReport};
use crate::services::{aggregate, CachedFetch, ConfidenceReport, FailureWriter, Library, OutputLayout};
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// 单条记录的处理结果
#[derive(Debug, Clone)]
pub struct RecordSummary {
    pub record: Record,
    pub metadata: DocumentMetadata,
    pub report: ConfidenceReport,
    pub report_path: PathBuf,
    pub stats_path: PathBuf,
    pub overlay_pages: Vec<usize>,
}

/// 处理一条记录
///
/// # 参数
/// - `fetcher`: 下载客户端
/// - `record`: 已定位的记录
/// - `library`: 图书馆预设（用于页面图像 URL）
/// - `config`: 配置
///
/// # 返回
/// METS 无法获取或解析时返回错误；单页失败不会导致错误
pub async fn process_record<F: Fetcher>(
    fetcher: Arc<F>,
    record: &Record,
    library: Library,
    config: &Config,
) -> Result<RecordSummary> {
    let layout = OutputLayout::new(&config.output_dir, &record.id);
    layout.create_dirs(config.overlay).await?;

    // ========== METS ==========
    let mets = CachedFetch::new(fetcher.as_ref(), config.refresh)
        .get_parsed(&record.mets_url, &layout.mets_file(), |bytes| {
            parse_mets(&String::from_utf8_lossy(bytes))
        })
        .await
        .with_context(|| format!("无法获取或解析记录 {} 的 METS: {}", record.id, record.mets_url))?;

    let workers = worker_count(config.threads, mets.pages.len());
    crate::utils::logging::log_pages_loaded(mets.pages.len(), workers);
    if mets.pages.is_empty() {
        warn!("⚠️ METS 中没有任何 FULLTEXT 页面");
    }

    // ========== 页面 ==========
    let results = PagePool::new(fetcher.clone(), config.threads)
        .with_cache(layout.clone(), config.refresh)
        .run(mets.pages)
        .await?;

    // ========== 统计 ==========
    let report = aggregate(&results);

    // ========== 输出 ==========
    render_images(&layout, &results, &report)?;

    let overlay_pages = if config.overlay {
        render_overlays(fetcher.as_ref(), &layout, record, library, &results, workers).await
    } else {
        Vec::new()
    };

    let stats_path = layout.stats_file();
    let json = serde_json::to_string_pretty(&report)?;
    tokio::fs::write(&stats_path, json)
        .await
        .with_context(|| format!("无法写入 {}", stats_path.display()))?;

    let html = HtmlReport {
        record,
        metadata: &mets.metadata,
        report: &report,
        overlay_pages: &overlay_pages,
        library,
        config,
    }
    .render();
    let report_path = layout.report_file();
    tokio::fs::write(&report_path, html)
        .await
        .with_context(|| format!("无法写入 {}", report_path.display()))?;

    let failures = FailureWriter::new(layout.failures_file());
    let failed = failures.write_all(&results)?;
    if failed > 0 {
        warn!("⚠️ {} 页处理失败，详见 {}", failed, failures.path().display());
    }

    info!("📝 报告已生成: {}", report_path.display());

    Ok(RecordSummary {
        record: record.clone(),
        metadata: mets.metadata,
        report,
        report_path,
        stats_path,
        overlay_pages,
    })
}

/// 单页热力图 + 总览条纹 + 直方图 + 趋势图
fn render_images(layout: &OutputLayout, results: &[PageResult], report: &ConfidenceReport) -> Result<()> {
    for result in results {
        let img = heatmap::page_heatmap(result.alto(), renderer::THUMBNAIL_SIZE);
        renderer::save_png(&img, &layout.heatmap_file(&result.page))?;
    }

    let overview = charts::overview_stripes(&report.pages, renderer::OVERVIEW_SIZE);
    renderer::save_png(&overview, &layout.overview_file())?;

    let histogram = charts::histogram_chart(report, renderer::CHART_SIZE);
    renderer::save_png(&histogram, &layout.histogram_file())?;

    let trend = charts::trend_chart(&report.pages, renderer::CHART_SIZE);
    renderer::save_png(&trend, &layout.trend_file())?;

    Ok(())
}

/// 下载页面图像并叠加热力图；失败的页面只记录日志
///
/// # 返回
/// 成功生成叠加图的页面索引
async fn render_overlays<F: Fetcher>(
    fetcher: &F,
    layout: &OutputLayout,
    record: &Record,
    library: Library,
    results: &[PageResult],
    workers: usize,
) -> Vec<usize> {
    let jobs = results.iter().filter_map(|r| r.alto().map(|alto| (&r.page, alto)));

    let done: Vec<Option<usize>> = stream::iter(jobs)
        .map(|(page, alto)| async move {
            let url = library.page_image_url(&record.id, page.number());
            let bytes = match fetcher.fetch(&url).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("{} 页面图像下载失败: {}", page, e);
                    return None;
                }
            };
            let saved = heatmap::overlay_on_image(&bytes, &url, alto)
                .and_then(|img| renderer::save_png(&img, &layout.overlay_file(page)));
            match saved {
                Ok(()) => Some(page.index),
                Err(e) => {
                    warn!("{} 叠加图生成失败: {}", page, e);
                    None
                }
            }
        })
        .buffered(workers.max(1))
        .collect()
        .await;

    done.into_iter().flatten().collect()
}
