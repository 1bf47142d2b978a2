//! METS 定位 - 业务能力层
//!
//! 根据记录ID和图书馆预设（或显式模板）生成 METS 的 URL

use crate::error::{AppResult, ConfigError};
use crate::models::Record;
use regex::Regex;
use std::sync::OnceLock;

/// 已知的数字图书馆
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Library {
    /// 汉堡州立与大学图书馆（Kitodo）
    Hamburg,
}

impl Library {
    pub const ALL: [Library; 1] = [Library::Hamburg];

    pub fn name(&self) -> &'static str {
        match self {
            Library::Hamburg => "hamburg",
        }
    }

    pub fn from_name(name: &str) -> AppResult<Self> {
        Self::ALL
            .into_iter()
            .find(|lib| lib.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| {
                ConfigError::UnknownLibrary {
                    name: name.to_string(),
                    known: Self::ALL.map(|l| l.name()).join(", "),
                }
                .into()
            })
    }

    /// METS 模板
    pub fn mets_template(&self) -> &'static str {
        match self {
            Library::Hamburg => "https://mets.sub.uni-hamburg.de/kitodo/{record_id}",
        }
    }

    /// 展示页模板
    pub fn resolver_template(&self) -> &'static str {
        match self {
            Library::Hamburg => "https://resolver.sub.uni-hamburg.de/kitodo/{record_id}",
        }
    }

    /// 页面图像模板，`{page}` 为8位补零的页码
    pub fn page_image_template(&self) -> &'static str {
        match self {
            Library::Hamburg => "https://pic.sub.uni-hamburg.de/kitodo/{record_id}/{page}.tif",
        }
    }

    /// 某页图像的 URL，`page_number` 从1开始
    pub fn page_image_url(&self, record_id: &str, page_number: usize) -> String {
        self.page_image_template()
            .replace("{record_id}", record_id)
            .replace("{page}", &format!("{:08}", page_number))
    }
}

fn record_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("record id pattern is valid"))
}

/// 校验记录ID（会被用作目录名）
pub fn validate_record_id(record_id: &str) -> AppResult<()> {
    if record_id_pattern().is_match(record_id) && record_id != "." && record_id != ".." {
        Ok(())
    } else {
        Err(ConfigError::InvalidRecordId {
            record_id: record_id.to_string(),
        }
        .into())
    }
}

/// 生成记录
///
/// # 参数
/// - `record_id`: 记录ID
/// - `explicit_mets`: 显式 METS URL；含 `{record_id}` 时按模板处理
/// - `library`: 图书馆预设
pub fn locate(record_id: &str, explicit_mets: Option<&str>, library: Library) -> AppResult<Record> {
    validate_record_id(record_id)?;

    let mets_url = match explicit_mets {
        Some(url) => url.replace("{record_id}", record_id),
        None => library.mets_template().replace("{record_id}", record_id),
    };

    Ok(Record {
        id: record_id.to_string(),
        mets_url,
        resolver_url: Some(library.resolver_template().replace("{record_id}", record_id)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcaError;

    #[test]
    fn test_library_default_template() {
        let record = locate("PPN86268370X", None, Library::Hamburg).unwrap();

        assert_eq!(record.mets_url, "https://mets.sub.uni-hamburg.de/kitodo/PPN86268370X");
        assert_eq!(
            record.resolver_url.as_deref(),
            Some("https://resolver.sub.uni-hamburg.de/kitodo/PPN86268370X")
        );
    }

    #[test]
    fn test_explicit_template_and_literal() {
        let templated = locate(
            "PPN872169685_0021",
            Some("https://example.org/oai/{record_id}.xml"),
            Library::Hamburg,
        )
        .unwrap();
        assert_eq!(templated.mets_url, "https://example.org/oai/PPN872169685_0021.xml");

        let literal = locate("rec1", Some("file:///tmp/mets.xml"), Library::Hamburg).unwrap();
        assert_eq!(literal.mets_url, "file:///tmp/mets.xml");
    }

    #[test]
    fn test_invalid_record_ids() {
        for bad in ["", "..", "a/b", "PPN 1", "../etc"] {
            let err = locate(bad, None, Library::Hamburg).unwrap_err();
            assert!(
                matches!(err, OcaError::Config(ConfigError::InvalidRecordId { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_library_from_name() {
        assert_eq!(Library::from_name("Hamburg").unwrap(), Library::Hamburg);
        assert!(Library::from_name("nowhere").is_err());
    }

    #[test]
    fn test_page_image_url() {
        assert_eq!(
            Library::Hamburg.page_image_url("PPN1", 53),
            "https://pic.sub.uni-hamburg.de/kitodo/PPN1/00000053.tif"
        );
    }
}
