/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use crate::models::Record;
use crate::orchestrator::RecordSummary;
use tracing::info;

/// 记录程序启动信息
///
/// # 参数
/// - `record`: 待处理的记录
/// - `requested_threads`: 请求的并发数
pub fn log_startup(record: &Record, requested_threads: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 OCR 置信度分析 - {}", record.id);
    info!("📄 METS: {}", record.mets_url);
    info!("📊 请求并发数: {} (CPU核数: {})", requested_threads, num_cpus::get());
    info!("{}", "=".repeat(60));
}

/// 记录页面加载信息
///
/// # 参数
/// - `total`: 页面总数
/// - `workers`: 实际 worker 数
pub fn log_pages_loaded(total: usize, workers: usize) {
    info!("✓ METS 中找到 {} 个页面", total);
    info!("📋 将以 {} 个 worker 并发处理", workers);
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &RecordSummary) {
    let doc = &summary.report.document;
    info!("{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!(
        "📖 {}: {}",
        summary.metadata.author_or_default(),
        truncate_text(summary.metadata.title_or_default(), 60)
    );
    info!("✅ 成功: {}/{}", doc.total_pages - doc.failed_pages, doc.total_pages);
    info!("❌ 失败: {}", doc.failed_pages);
    info!("🔤 单词: {} / 行: {}", doc.total_words, doc.total_lines);
    if let Some(mean) = doc.mean {
        info!("🎯 平均置信度: {:.3}", mean);
    }
    info!("{}", "=".repeat(60));
    info!("报告已保存至: {}", summary.report_path.display());
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
