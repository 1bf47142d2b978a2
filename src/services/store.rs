//! 输出目录与下载缓存
//!
//! 每条记录写入 `<output_dir>/<record_id>/`：
//!
//! ```text
//! <record_id>/
//!   mets/<record_id>.xml
//!   alto/00000001.xml ...
//!   images/<index>.png, images/<record_id>.png, images/overlay/<index>.png
//!   <record_id>_report.html
//!   <record_id>_stats.json
//!   failed_pages.txt
//! ```

use crate::clients::Fetcher;
use crate::error::{AppResult, OcaError};
use crate::models::PageRef;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 单条记录的输出目录结构
#[derive(Debug, Clone)]
pub struct OutputLayout {
    record_id: String,
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(output_dir: impl AsRef<Path>, record_id: &str) -> Self {
        Self {
            record_id: record_id.to_string(),
            root: output_dir.as_ref().join(record_id),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mets_file(&self) -> PathBuf {
        self.root.join("mets").join(format!("{}.xml", self.record_id))
    }

    pub fn alto_file(&self, page: &PageRef) -> PathBuf {
        self.root.join("alto").join(format!("{}.xml", page.padded_number()))
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    pub fn overlay_dir(&self) -> PathBuf {
        self.images_dir().join("overlay")
    }

    pub fn heatmap_file(&self, page: &PageRef) -> PathBuf {
        self.images_dir().join(format!("{}.png", page.index))
    }

    pub fn overlay_file(&self, page: &PageRef) -> PathBuf {
        self.overlay_dir().join(format!("{}.png", page.index))
    }

    pub fn overview_file(&self) -> PathBuf {
        self.images_dir().join(format!("{}.png", self.record_id))
    }

    pub fn histogram_file(&self) -> PathBuf {
        self.images_dir().join(format!("{}_displot.png", self.record_id))
    }

    pub fn trend_file(&self) -> PathBuf {
        self.images_dir().join(format!("{}_trend.png", self.record_id))
    }

    pub fn report_file(&self) -> PathBuf {
        self.root.join(format!("{}_report.html", self.record_id))
    }

    pub fn stats_file(&self) -> PathBuf {
        self.root.join(format!("{}_stats.json", self.record_id))
    }

    pub fn failures_file(&self) -> PathBuf {
        self.root.join("failed_pages.txt")
    }

    /// 创建所有子目录
    pub async fn create_dirs(&self, with_overlay: bool) -> AppResult<()> {
        let mut dirs = vec![
            self.root.join("mets"),
            self.root.join("alto"),
            self.images_dir(),
        ];
        if with_overlay {
            dirs.push(self.overlay_dir());
        }
        for dir in dirs {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| OcaError::create_dir_failed(dir.display().to_string(), e))?;
        }
        Ok(())
    }
}

/// 带本地缓存的下载
///
/// 本地文件已存在、能通过解析且不要求刷新时直接使用；否则重新下载，
/// 只有解析成功的内容才会写入本地
pub struct CachedFetch<'a, F: Fetcher> {
    fetcher: &'a F,
    refresh: bool,
}

impl<'a, F: Fetcher> CachedFetch<'a, F> {
    pub fn new(fetcher: &'a F, refresh: bool) -> Self {
        Self { fetcher, refresh }
    }

    /// 读取（或下载）并解析
    pub async fn get_parsed<T>(
        &self,
        url: &str,
        path: &Path,
        parse: impl Fn(&[u8]) -> AppResult<T>,
    ) -> AppResult<T> {
        if !self.refresh {
            if let Ok(bytes) = tokio::fs::read(path).await {
                match parse(&bytes) {
                    Ok(value) => {
                        info!("📂 使用本地副本: {}", path.display());
                        return Ok(value);
                    }
                    Err(e) => warn!("⚠️ 本地副本无效，重新下载 {}: {}", path.display(), e),
                }
            }
        }

        info!("⬇️ 正在下载: {}", url);
        let bytes = self.fetcher.fetch(url).await?;
        let value = parse(&bytes)?;
        write_atomic(path, &bytes).await?;
        debug!("已缓存 {} 字节到 {}", bytes.len(), path.display());

        Ok(value)
    }
}

/// 先写入同目录下的 `.part` 文件再重命名，中断时不会留下半个文件
async fn write_atomic(path: &Path, bytes: &[u8]) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| OcaError::create_dir_failed(parent.display().to_string(), e))?;
    }

    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    tokio::fs::write(&part, bytes)
        .await
        .map_err(|e| OcaError::file_write_failed(part.display().to_string(), e))?;
    if let Err(e) = tokio::fs::rename(&part, path).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(OcaError::file_write_failed(path.display().to_string(), e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, XmlError};
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: AtomicUsize,
    }

    impl Fetcher for CountingFetcher {
        fn fetch(&self, url: &str) -> impl Future<Output = AppResult<Vec<u8>>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result: AppResult<Vec<u8>> = if url.contains("missing") {
                Err(FetchError::NotFound {
                    url: url.to_string(),
                }
                .into())
            } else {
                Ok(format!("body of {url}").into_bytes())
            };
            async move { result }
        }
    }

    #[test]
    fn test_layout_paths() {
        let layout = OutputLayout::new("/out", "PPN1");
        let page = PageRef {
            index: 2,
            id: "FILE_3".to_string(),
            alto_url: String::new(),
        };

        assert_eq!(layout.root(), Path::new("/out/PPN1"));
        assert_eq!(layout.alto_file(&page), Path::new("/out/PPN1/alto/00000003.xml"));
        assert_eq!(layout.heatmap_file(&page), Path::new("/out/PPN1/images/2.png"));
        assert_eq!(layout.report_file(), Path::new("/out/PPN1/PPN1_report.html"));
        assert_eq!(layout.mets_file(), Path::new("/out/PPN1/mets/PPN1.xml"));
    }

    fn accept(bytes: &[u8]) -> AppResult<String> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    fn reject(bytes: &[u8]) -> AppResult<String> {
        Err(XmlError::NotAlto {
            root: String::from_utf8_lossy(bytes).into_owned(),
        }
        .into())
    }

    #[tokio::test]
    async fn test_cached_fetch_reuses_local_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alto").join("00000001.xml");
        let fetcher = CountingFetcher {
            calls: AtomicUsize::new(0),
        };

        let first = CachedFetch::new(&fetcher, false)
            .get_parsed("https://example.org/1.xml", &path, accept)
            .await
            .unwrap();
        let second = CachedFetch::new(&fetcher, false)
            .get_parsed("https://example.org/1.xml", &path, accept)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(!dir.path().join("alto").join("00000001.xml.part").exists());

        CachedFetch::new(&fetcher, true)
            .get_parsed("https://example.org/1.xml", &path, accept)
            .await
            .unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cached_fetch_does_not_write_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.xml");
        let fetcher = CountingFetcher {
            calls: AtomicUsize::new(0),
        };

        let result = CachedFetch::new(&fetcher, false)
            .get_parsed("https://example.org/missing.xml", &path, accept)
            .await;

        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_unparsable_download_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.xml");
        let fetcher = CountingFetcher {
            calls: AtomicUsize::new(0),
        };

        let result = CachedFetch::new(&fetcher, false)
            .get_parsed("https://example.org/1.xml", &path, reject)
            .await;

        assert!(matches!(result, Err(OcaError::Xml(XmlError::NotAlto { .. }))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_invalid_local_copy_is_downloaded_again() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.xml");
        std::fs::write(&path, "<html><body>502</body></html>").unwrap();
        let fetcher = CountingFetcher {
            calls: AtomicUsize::new(0),
        };

        let body = CachedFetch::new(&fetcher, false)
            .get_parsed("https://example.org/1.xml", &path, |bytes| {
                let text = accept(bytes)?;
                if text.starts_with("<html>") {
                    reject(bytes)
                } else {
                    Ok(text)
                }
            })
            .await
            .unwrap();

        assert_eq!(body, "body of https://example.org/1.xml");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), body);
    }
}
