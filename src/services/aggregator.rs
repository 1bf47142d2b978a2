//! 置信度统计 - 业务能力层
//!
//! 单页统计与原先的 `describe()` 口径一致：样本标准差 (n-1)，
//! 分位数使用线性插值。

use crate::models::{PageOutcome, PageResult};
use serde::Serialize;

/// 直方图分箱数（覆盖 [0, 1]）
pub const HISTOGRAM_BINS: usize = 20;

/// 单页统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageStats {
    /// 页码（从1开始）
    pub page: usize,
    pub page_id: String,
    /// 带置信度的单词数
    pub words: usize,
    pub lines: usize,
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl PageStats {
    pub fn has_data(&self) -> bool {
        self.mean.is_some()
    }
}

/// 整本书的统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentStats {
    pub total_pages: usize,
    pub failed_pages: usize,
    pub total_words: usize,
    pub total_lines: usize,
    /// 所有单词的均值/中位数
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// 各页指标的平均值（只计有数据的页）
    pub avg_page_mean: Option<f64>,
    pub avg_page_std: Option<f64>,
    pub avg_page_q25: Option<f64>,
    pub avg_page_median: Option<f64>,
    pub avg_page_q75: Option<f64>,
    /// 置信度分布，`HISTOGRAM_BINS` 个等宽分箱
    pub histogram: Vec<usize>,
}

/// 统计结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfidenceReport {
    pub pages: Vec<PageStats>,
    pub document: DocumentStats,
}

/// 计算单页统计
pub fn page_stats(result: &PageResult) -> PageStats {
    let mut stats = PageStats {
        page: result.page.number(),
        page_id: result.page.id.clone(),
        ..Default::default()
    };

    match &result.outcome {
        PageOutcome::Failed { reason } => {
            stats.failed = true;
            stats.failure = Some(reason.clone());
        }
        PageOutcome::Parsed(alto) => {
            let mut values = alto.confidences();
            stats.lines = alto.lines.len();
            stats.words = values.len();
            fill_distribution(&mut stats, &mut values);
        }
    }

    stats
}

fn fill_distribution(stats: &mut PageStats, values: &mut [f64]) {
    if values.is_empty() {
        return;
    }
    values.sort_by(f64::total_cmp);

    stats.mean = mean(values);
    stats.std = sample_std(values);
    stats.min = values.first().copied();
    stats.max = values.last().copied();
    stats.q25 = percentile(values, 0.25);
    stats.median = percentile(values, 0.5);
    stats.q75 = percentile(values, 0.75);
}

/// 汇总所有页面（输入须已按页序排列）
pub fn aggregate(results: &[PageResult]) -> ConfidenceReport {
    let pages: Vec<PageStats> = results.iter().map(page_stats).collect();

    let mut all: Vec<f64> = results
        .iter()
        .filter_map(PageResult::alto)
        .flat_map(|alto| alto.confidences())
        .collect();
    all.sort_by(f64::total_cmp);

    let document = DocumentStats {
        total_pages: pages.len(),
        failed_pages: pages.iter().filter(|p| p.failed).count(),
        total_words: pages.iter().map(|p| p.words).sum(),
        total_lines: pages.iter().map(|p| p.lines).sum(),
        mean: mean(&all),
        median: percentile(&all, 0.5),
        avg_page_mean: average_of(&pages, |p| p.mean),
        avg_page_std: average_of(&pages, |p| p.std),
        avg_page_q25: average_of(&pages, |p| p.q25),
        avg_page_median: average_of(&pages, |p| p.median),
        avg_page_q75: average_of(&pages, |p| p.q75),
        histogram: histogram(&all, HISTOGRAM_BINS),
    };

    ConfidenceReport { pages, document }
}

fn average_of(pages: &[PageStats], field: impl Fn(&PageStats) -> Option<f64>) -> Option<f64> {
    let values: Vec<f64> = pages.iter().filter_map(field).collect();
    mean(&values)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// 样本标准差；少于两个值时没有定义
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// 线性插值分位数，`sorted` 须为升序
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    match sorted.len() {
        0 => None,
        1 => Some(sorted[0]),
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let frac = pos - lower as f64;
            Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
        }
    }
}

/// [0,1] 上的等宽直方图，最后一个分箱包含 1.0
pub fn histogram(values: &[f64], bins: usize) -> Vec<usize> {
    let mut counts = vec![0; bins];
    if bins == 0 {
        return counts;
    }
    for v in values {
        let bin = ((v.clamp(0.0, 1.0) * bins as f64) as usize).min(bins - 1);
        counts[bin] += 1;
    }
    counts
}
