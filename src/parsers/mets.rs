//! METS 解析
//!
//! 提取 `USE="FULLTEXT"` 文件组中每个 `FLocat` 的 `xlink:href`，
//! 以及 MODS 中的标题、作者、年份。

use crate::error::{AppResult, OcaError, XmlError};
use crate::models::{DocumentMetadata, PageRef};
use crate::parsers::attr_value;
use quick_xml::events::Event;
use quick_xml::Reader;

const DOCUMENT: &str = "METS";

/// METS 解析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetsDocument {
    /// 按文档顺序排列的页面
    pub pages: Vec<PageRef>,
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone, Copy)]
enum MetadataField {
    Title,
    Author,
    Year,
}

/// 解析 METS 文本
///
/// # 返回
/// 文档顺序的页面列表；没有 FULLTEXT 文件组时返回 `XmlError::MissingFulltext`
pub fn parse_mets(xml: &str) -> AppResult<MetsDocument> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut doc = MetsDocument::default();
    let mut depth = 0usize;
    let mut fulltext_depth: Option<usize> = None;
    let mut seen_fulltext = false;
    let mut current_file_id: Option<String> = None;
    let mut mods_depth: Option<usize> = None;
    let mut capture: Option<MetadataField> = None;

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| OcaError::malformed(DOCUMENT, position, e))?;

        match event {
            Event::Start(e) => {
                depth += 1;
                match e.local_name().as_ref() {
                    b"fileGrp" if !seen_fulltext => {
                        let is_fulltext = attr_value(&e, b"USE", DOCUMENT, position)?
                            .is_some_and(|v| v.eq_ignore_ascii_case("FULLTEXT"));
                        if is_fulltext {
                            fulltext_depth = Some(depth);
                            seen_fulltext = true;
                        }
                    }
                    b"file" if fulltext_depth.is_some() => {
                        current_file_id =
                            attr_value(&e, b"ID", DOCUMENT, position)?.map(|v| v.into_owned());
                    }
                    b"FLocat" if fulltext_depth.is_some() => {
                        push_page(&mut doc, &e, current_file_id.as_deref(), position)?;
                    }
                    b"mods" => mods_depth = mods_depth.or(Some(depth)),
                    name if mods_depth.is_some() => {
                        capture = metadata_field(name).filter(|f| is_unset(&doc.metadata, *f));
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => match e.local_name().as_ref() {
                b"FLocat" if fulltext_depth.is_some() => {
                    push_page(&mut doc, &e, current_file_id.as_deref(), position)?;
                }
                b"fileGrp" if !seen_fulltext => {
                    let is_fulltext = attr_value(&e, b"USE", DOCUMENT, position)?
                        .is_some_and(|v| v.eq_ignore_ascii_case("FULLTEXT"));
                    seen_fulltext |= is_fulltext;
                }
                _ => {}
            },
            Event::Text(t) => {
                if let Some(field) = capture {
                    let text = t
                        .unescape()
                        .map_err(|e| OcaError::malformed(DOCUMENT, position, e))?;
                    set_field(&mut doc.metadata, field, text.trim());
                }
            }
            Event::End(e) => {
                capture = None;
                if e.local_name().as_ref() == b"file" {
                    current_file_id = None;
                }
                if fulltext_depth == Some(depth) {
                    fulltext_depth = None;
                }
                if mods_depth == Some(depth) {
                    mods_depth = None;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth > 0 {
        return Err(XmlError::Truncated {
            document: DOCUMENT,
            open: depth,
        }
        .into());
    }
    if !seen_fulltext {
        return Err(XmlError::MissingFulltext.into());
    }

    Ok(doc)
}

fn push_page(
    doc: &mut MetsDocument,
    element: &quick_xml::events::BytesStart<'_>,
    file_id: Option<&str>,
    position: usize,
) -> AppResult<()> {
    let Some(href) = attr_value(element, b"href", DOCUMENT, position)? else {
        tracing::warn!("FLocat 缺少 xlink:href 属性 (位置 {})，已忽略", position);
        return Ok(());
    };

    let index = doc.pages.len();
    doc.pages.push(PageRef {
        index,
        id: file_id
            .map(str::to_string)
            .unwrap_or_else(|| format!("PAGE_{}", index + 1)),
        alto_url: href.trim().to_string(),
    });
    Ok(())
}

fn metadata_field(local_name: &[u8]) -> Option<MetadataField> {
    match local_name {
        b"title" => Some(MetadataField::Title),
        b"displayForm" => Some(MetadataField::Author),
        b"dateIssued" => Some(MetadataField::Year),
        _ => None,
    }
}

fn is_unset(metadata: &DocumentMetadata, field: MetadataField) -> bool {
    match field {
        MetadataField::Title => metadata.title.is_none(),
        MetadataField::Author => metadata.author.is_none(),
        MetadataField::Year => metadata.year.is_none(),
    }
}

fn set_field(metadata: &mut DocumentMetadata, field: MetadataField, text: &str) {
    if text.is_empty() {
        return;
    }
    let slot = match field {
        MetadataField::Title => &mut metadata.title,
        MetadataField::Author => &mut metadata.author,
        MetadataField::Year => &mut metadata.year,
    };
    match slot {
        Some(existing) => existing.push_str(text),
        None => *slot = Some(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:mods="http://www.loc.gov/mods/v3" xmlns:xlink="http://www.w3.org/1999/xlink">
  <mets:dmdSec ID="DMDLOG_0000">
    <mets:mdWrap MDTYPE="MODS">
      <mets:xmlData>
        <mods:mods>
          <mods:titleInfo><mods:title>Hamburgisches Adressbuch</mods:title></mods:titleInfo>
          <mods:name><mods:displayForm>Meyer, Johann</mods:displayForm></mods:name>
          <mods:originInfo><mods:dateIssued>1896</mods:dateIssued></mods:originInfo>
          <mods:relatedItem><mods:titleInfo><mods:title>Reihe</mods:title></mods:titleInfo></mods:relatedItem>
        </mods:mods>
      </mets:xmlData>
    </mets:mdWrap>
  </mets:dmdSec>
  <mets:fileSec>
    <mets:fileGrp USE="DEFAULT">
      <mets:file ID="FILE_0001_DEFAULT"><mets:FLocat LOCTYPE="URL" xlink:href="https://img.example.org/1.jpg"/></mets:file>
    </mets:fileGrp>
    <mets:fileGrp USE="FULLTEXT">
      <mets:file ID="FILE_0001_FULLTEXT" MIMETYPE="text/xml"><mets:FLocat LOCTYPE="URL" xlink:href="https://img.example.org/00000001.xml"/></mets:file>
      <mets:file ID="FILE_0002_FULLTEXT" MIMETYPE="text/xml"><mets:FLocat LOCTYPE="URL" xlink:href="https://img.example.org/00000002.xml"/></mets:file>
      <mets:file ID="FILE_0003_FULLTEXT" MIMETYPE="text/xml"><mets:FLocat LOCTYPE="URL" xlink:href="https://img.example.org/00000003.xml"/></mets:file>
    </mets:fileGrp>
  </mets:fileSec>
</mets:mets>"#;

    #[test]
    fn test_pages_in_document_order() {
        let doc = parse_mets(METS).unwrap();

        let urls: Vec<&str> = doc.pages.iter().map(|p| p.alto_url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://img.example.org/00000001.xml",
                "https://img.example.org/00000002.xml",
                "https://img.example.org/00000003.xml",
            ]
        );
        for (i, page) in doc.pages.iter().enumerate() {
            assert_eq!(page.index, i);
        }
        assert_eq!(doc.pages[1].id, "FILE_0002_FULLTEXT");
    }

    #[test]
    fn test_ignores_other_file_groups() {
        let doc = parse_mets(METS).unwrap();
        assert!(doc.pages.iter().all(|p| p.alto_url.ends_with(".xml")));
    }

    #[test]
    fn test_extracts_first_mods_metadata() {
        let doc = parse_mets(METS).unwrap();

        assert_eq!(doc.metadata.title.as_deref(), Some("Hamburgisches Adressbuch"));
        assert_eq!(doc.metadata.author.as_deref(), Some("Meyer, Johann"));
        assert_eq!(doc.metadata.year.as_deref(), Some("1896"));
    }

    #[test]
    fn test_unprefixed_elements() {
        let xml = r#"<mets xmlns:xlink="http://www.w3.org/1999/xlink"><fileSec>
            <fileGrp USE="FULLTEXT"><file><FLocat xlink:href="a.xml"/></file><file><FLocat xlink:href="b.xml"/></file></fileGrp>
        </fileSec></mets>"#;

        let doc = parse_mets(xml).unwrap();

        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[0].id, "PAGE_1");
        assert_eq!(doc.pages[1].alto_url, "b.xml");
        assert_eq!(doc.metadata.title_or_default(), "Undefined Title");
    }

    #[test]
    fn test_missing_fulltext_group() {
        let xml = r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/"><mets:fileSec>
            <mets:fileGrp USE="DEFAULT"/></mets:fileSec></mets:mets>"#;

        let err = parse_mets(xml).unwrap_err();
        assert!(matches!(err, OcaError::Xml(XmlError::MissingFulltext)));
    }

    #[test]
    fn test_empty_fulltext_group_has_no_pages() {
        let xml = r#"<mets><fileSec><fileGrp USE="FULLTEXT"></fileGrp></fileSec></mets>"#;

        let doc = parse_mets(xml).unwrap();
        assert!(doc.pages.is_empty());
    }

    #[test]
    fn test_only_first_fulltext_group_is_read() {
        let xml = r#"<mets><fileSec>
            <fileGrp USE="FULLTEXT"><file ID="A"><FLocat href="a.xml"/></file></fileGrp>
            <fileGrp USE="FULLTEXT"><file ID="B"><FLocat href="b.xml"/></file></fileGrp>
        </fileSec></mets>"#;

        let doc = parse_mets(xml).unwrap();

        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].id, "A");
        assert_eq!(doc.pages[0].alto_url, "a.xml");
    }

    #[test]
    fn test_malformed_xml() {
        let xml = r#"<mets><fileSec><fileGrp USE="FULLTEXT"></fileSec></mets>"#;

        let err = parse_mets(xml).unwrap_err();
        assert!(matches!(err, OcaError::Xml(XmlError::Malformed { .. })));
    }

    #[test]
    fn test_truncated_xml() {
        let xml = r#"<mets><fileSec><fileGrp USE="FULLTEXT"><file>"#;

        let err = parse_mets(xml).unwrap_err();
        assert!(matches!(
            err,
            OcaError::Xml(XmlError::Truncated { .. } | XmlError::Malformed { .. })
        ));
    }
}
