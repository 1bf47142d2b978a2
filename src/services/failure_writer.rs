//! 失败页面记录 - 业务能力层
//!
//! 只负责把本次运行失败的页面写入 `failed_pages.txt`

use crate::error::{AppResult, OcaError};
use crate::models::PageResult;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 失败页面写入服务
pub struct FailureWriter {
    path: PathBuf,
}

impl FailureWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 写入本次运行的所有失败页面，返回写入条数
    ///
    /// 每次运行覆盖旧文件；没有失败页面时删除旧文件
    pub fn write_all(&self, results: &[PageResult]) -> AppResult<usize> {
        let failed: Vec<&PageResult> = results.iter().filter(|r| r.is_failed()).collect();
        if failed.is_empty() {
            match std::fs::remove_file(&self.path) {
                Ok(()) => debug!("已删除旧的失败记录: {}", self.path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(OcaError::file_write_failed(self.path.display().to_string(), e))
                }
            }
            return Ok(0);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| OcaError::file_write_failed(self.path.display().to_string(), e))?;

        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        for result in &failed {
            debug!("记录失败页面: {}", result.page);
            let line = format!(
                "{} | 第 {} 页 | {} | {} | {}\n",
                stamp,
                result.page.number(),
                result.page.id,
                result.page.alto_url,
                result.failure_reason().unwrap_or_default()
            );
            file.write_all(line.as_bytes())
                .map_err(|e| OcaError::file_write_failed(self.path.display().to_string(), e))?;
        }

        Ok(failed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AltoPage, PageRef};

    fn page_ref(index: usize) -> PageRef {
        PageRef {
            index,
            id: format!("FILE_{index}"),
            alto_url: format!("https://example.org/{index}.xml"),
        }
    }

    #[test]
    fn test_writes_only_failed_pages() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FailureWriter::new(dir.path().join("failed_pages.txt"));
        let results = vec![
            PageResult::parsed(page_ref(0), AltoPage::default()),
            PageResult::failed(page_ref(1), "服务器返回状态码 404"),
        ];

        let written = writer.write_all(&results).unwrap();

        assert_eq!(written, 1);
        let content = std::fs::read_to_string(writer.path()).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("第 2 页"));
        assert!(content.contains("404"));
    }

    #[test]
    fn test_no_file_without_failures() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FailureWriter::new(dir.path().join("failed_pages.txt"));

        let written = writer
            .write_all(&[PageResult::parsed(page_ref(0), AltoPage::default())])
            .unwrap();

        assert_eq!(written, 0);
        assert!(!writer.path().exists());
    }

    #[test]
    fn test_each_run_replaces_previous_failures() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FailureWriter::new(dir.path().join("failed_pages.txt"));
        let failing = vec![
            PageResult::parsed(page_ref(0), AltoPage::default()),
            PageResult::failed(page_ref(1), "服务器返回状态码 502"),
        ];

        writer.write_all(&failing).unwrap();
        writer.write_all(&failing).unwrap();
        let content = std::fs::read_to_string(writer.path()).unwrap();
        assert_eq!(content.lines().count(), 1);

        let written = writer
            .write_all(&[
                PageResult::parsed(page_ref(0), AltoPage::default()),
                PageResult::parsed(page_ref(1), AltoPage::default()),
            ])
            .unwrap();
        assert_eq!(written, 0);
        assert!(!writer.path().exists());
    }
}
