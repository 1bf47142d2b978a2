use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::alto::AltoPage;

/// 一条数字化记录（一本书）
///
/// 解析完成后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// 记录ID，例如 `PPN86268370X`
    pub id: String,
    /// 顶层 METS 文档的 URL
    pub mets_url: String,
    /// 图书馆的展示页（resolver）URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolver_url: Option<String>,
}

/// METS 中 MODS 部分的描述性元数据
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<String>,
}

impl DocumentMetadata {
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or("Undefined Title")
    }

    pub fn author_or_default(&self) -> &str {
        self.author.as_deref().unwrap_or("Undefined Author")
    }

    pub fn year_or_default(&self) -> &str {
        self.year.as_deref().unwrap_or("Undefined Year")
    }
}

/// METS 中的一页
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    /// 在文档中的位置（从0开始）
    pub index: usize,
    /// 页面标识（mets:file 的 ID）
    pub id: String,
    /// 该页 ALTO 文件的 URL
    pub alto_url: String,
}

impl PageRef {
    /// 页码（从1开始）
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// 8位补零的页码，例如 `00000001`
    pub fn padded_number(&self) -> String {
        format!("{:08}", self.number())
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[第 {} 页 {}]", self.number(), self.id)
    }
}

/// 单页的下载/解析结果
#[derive(Debug, Clone)]
pub enum PageOutcome {
    /// 解析成功
    Parsed(AltoPage),
    /// 下载或解析失败，只影响本页
    Failed { reason: String },
}

/// 调度器返回的单页结果
#[derive(Debug, Clone)]
pub struct PageResult {
    pub page: PageRef,
    pub outcome: PageOutcome,
}

impl PageResult {
    pub fn parsed(page: PageRef, alto: AltoPage) -> Self {
        Self {
            page,
            outcome: PageOutcome::Parsed(alto),
        }
    }

    pub fn failed(page: PageRef, reason: impl Into<String>) -> Self {
        Self {
            page,
            outcome: PageOutcome::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, PageOutcome::Failed { .. })
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.outcome {
            PageOutcome::Failed { reason } => Some(reason),
            PageOutcome::Parsed(_) => None,
        }
    }

    pub fn alto(&self) -> Option<&AltoPage> {
        match &self.outcome {
            PageOutcome::Parsed(alto) => Some(alto),
            PageOutcome::Failed { .. } => None,
        }
    }
}
