//! 下载能力抽象
//!
//! 调度器只依赖 `Fetcher`，便于离线测试时替换为内存实现

use crate::error::AppResult;
use std::future::Future;

/// 按 URL 下载原始字节
pub trait Fetcher: Send + Sync + 'static {
    /// 下载 `url` 指向的资源
    ///
    /// # 返回
    /// 成功时返回响应体；网络错误或非 2xx 状态码返回 `FetchError`
    fn fetch(&self, url: &str) -> impl Future<Output = AppResult<Vec<u8>>> + Send;
}
