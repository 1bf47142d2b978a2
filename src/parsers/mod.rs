//! METS / ALTO 解析器
//!
//! 基于 `quick-xml` 的流式解析，按本地名匹配元素（忽略命名空间前缀），
//! 因此 `mets:fileGrp` 与 `fileGrp` 均可识别。

pub mod alto;
pub mod mets;

pub use alto::parse_alto;
pub use mets::{parse_mets, MetsDocument};

use crate::error::{AppResult, OcaError};
use quick_xml::events::BytesStart;
use std::borrow::Cow;

/// 按本地名读取属性值
fn attr_value<'a>(
    element: &'a BytesStart<'a>,
    local_name: &[u8],
    document: &'static str,
    position: usize,
) -> AppResult<Option<Cow<'a, str>>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| OcaError::malformed(document, position, e))?;
        if attr.key.local_name().as_ref() == local_name {
            let value = attr
                .unescape_value()
                .map_err(|e| OcaError::malformed(document, position, e))?;
            return Ok(Some(value));
        }
    }
    Ok(None)
}
