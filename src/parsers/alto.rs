//! ALTO 解析
//!
//! 每个 `String` 元素对应一个单词；`WC` 为 OCR 引擎给出的置信度。

use crate::error::{AppResult, OcaError, XmlError};
use crate::models::{AltoPage, BBox, TextLine, Word};
use crate::parsers::attr_value;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

const DOCUMENT: &str = "ALTO";

/// 解析 ALTO 文本
pub fn parse_alto(xml: &str) -> AppResult<AltoPage> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut page = AltoPage::default();
    let mut depth = 0usize;
    let mut root_checked = false;
    let mut block_id: Option<String> = None;
    let mut line: Option<TextLine> = None;

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| OcaError::malformed(DOCUMENT, position, e))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_start = matches!(event, Event::Start(_));
                if !root_checked {
                    check_root(e)?;
                    root_checked = true;
                }
                if is_start {
                    depth += 1;
                }

                match e.local_name().as_ref() {
                    b"Page" if page.width.is_none() => {
                        page.width = number_attr(e, b"WIDTH", position)?;
                        page.height = number_attr(e, b"HEIGHT", position)?;
                    }
                    b"TextBlock" if is_start => {
                        block_id = attr_value(e, b"ID", DOCUMENT, position)?.map(|v| v.into_owned());
                    }
                    b"TextLine" => {
                        let new_line = TextLine {
                            id: attr_value(e, b"ID", DOCUMENT, position)?.map(|v| v.into_owned()),
                            block_id: block_id.clone(),
                            words: Vec::new(),
                        };
                        if is_start {
                            line = Some(new_line);
                        } else {
                            page.lines.push(new_line);
                        }
                    }
                    b"String" => match line.as_mut() {
                        Some(line) => line.words.push(parse_word(e, position)?),
                        None => debug!("TextLine 之外的 String 元素 (位置 {})，已忽略", position),
                    },
                    _ => {}
                }
            }
            Event::End(e) => {
                match e.local_name().as_ref() {
                    b"TextLine" => {
                        if let Some(done) = line.take() {
                            page.lines.push(done);
                        }
                    }
                    b"TextBlock" => block_id = None,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !root_checked {
        return Err(XmlError::NotAlto {
            root: "(空文档)".to_string(),
        }
        .into());
    }
    if depth > 0 {
        return Err(XmlError::Truncated {
            document: DOCUMENT,
            open: depth,
        }
        .into());
    }

    Ok(page)
}

fn check_root(element: &BytesStart<'_>) -> AppResult<()> {
    let name = element.local_name();
    if name.as_ref().eq_ignore_ascii_case(b"alto") {
        Ok(())
    } else {
        Err(XmlError::NotAlto {
            root: String::from_utf8_lossy(name.as_ref()).into_owned(),
        }
        .into())
    }
}

fn parse_word(element: &BytesStart<'_>, position: usize) -> AppResult<Word> {
    let text = attr_value(element, b"CONTENT", DOCUMENT, position)?
        .map(|v| v.into_owned())
        .unwrap_or_default();
    let confidence = attr_value(element, b"WC", DOCUMENT, position)?
        .and_then(|raw| parse_confidence(&raw));

    Ok(Word {
        text,
        confidence,
        bbox: BBox {
            x: number_attr(element, b"HPOS", position)?.unwrap_or(0.0),
            y: number_attr(element, b"VPOS", position)?.unwrap_or(0.0),
            width: number_attr(element, b"WIDTH", position)?.unwrap_or(0.0),
            height: number_attr(element, b"HEIGHT", position)?.unwrap_or(0.0),
        },
    })
}

fn number_attr(element: &BytesStart<'_>, name: &[u8], position: usize) -> AppResult<Option<f64>> {
    Ok(attr_value(element, name, DOCUMENT, position)?
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite()))
}

/// 解析 `WC` 属性；接受 `"1."` 这类写法，超出 [0,1] 视为无效
pub fn parse_confidence(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Some(value)
    } else {
        debug!("无效的置信度值: '{}'", raw);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALTO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<alto xmlns="http://www.loc.gov/standards/alto/ns-v4#">
  <Description><MeasurementUnit>pixel</MeasurementUnit></Description>
  <Layout>
    <Page ID="PAGE_1" WIDTH="2000" HEIGHT="3000" PHYSICAL_IMG_NR="1">
      <PrintSpace>
        <TextBlock ID="BLOCK_1">
          <TextLine ID="LINE_1" HPOS="100" VPOS="100" WIDTH="800" HEIGHT="40">
            <String CONTENT="Hamburg" WC="0.97" HPOS="100" VPOS="100" WIDTH="200" HEIGHT="40"/>
            <SP WIDTH="10"/>
            <String CONTENT="&amp;" WC="1." HPOS="320" VPOS="100" WIDTH="20" HEIGHT="40"/>
            <SP WIDTH="10"/>
            <String CONTENT="Altona" WC="0.5" HPOS="350" VPOS="100" WIDTH="200" HEIGHT="40"/>
          </TextLine>
          <TextLine ID="LINE_2">
            <String CONTENT="ohne" HPOS="100" VPOS="160" WIDTH="100" HEIGHT="40"/>
            <String CONTENT="kaputt" WC="abc"/>
          </TextLine>
        </TextBlock>
        <TextBlock ID="BLOCK_2">
          <TextLine ID="LINE_3"><String CONTENT="Ende" WC="0.2"/></TextLine>
        </TextBlock>
      </PrintSpace>
    </Page>
  </Layout>
</alto>"#;

    #[test]
    fn test_parse_words_and_lines() {
        let page = parse_alto(ALTO).unwrap();

        assert_eq!(page.width, Some(2000.0));
        assert_eq!(page.height, Some(3000.0));
        assert_eq!(page.lines.len(), 3);
        assert_eq!(page.lines[0].words.len(), 3);
        assert_eq!(page.lines[0].id.as_deref(), Some("LINE_1"));
        assert_eq!(page.lines[0].block_id.as_deref(), Some("BLOCK_1"));
        assert_eq!(page.lines[2].block_id.as_deref(), Some("BLOCK_2"));
        assert_eq!(page.word_count(), 6);
    }

    #[test]
    fn test_word_attributes() {
        let page = parse_alto(ALTO).unwrap();
        let word = &page.lines[0].words[0];

        assert_eq!(word.text, "Hamburg");
        assert_eq!(word.confidence, Some(0.97));
        assert_eq!(
            word.bbox,
            BBox {
                x: 100.0,
                y: 100.0,
                width: 200.0,
                height: 40.0
            }
        );
        assert_eq!(page.lines[0].words[1].text, "&");
    }

    #[test]
    fn test_trailing_dot_confidence() {
        let page = parse_alto(ALTO).unwrap();
        assert_eq!(page.lines[0].words[1].confidence, Some(1.0));
    }

    #[test]
    fn test_missing_or_invalid_confidence_is_kept_without_value() {
        let page = parse_alto(ALTO).unwrap();

        assert_eq!(page.lines[1].words.len(), 2);
        assert!(page.lines[1].words.iter().all(|w| w.confidence.is_none()));
        assert_eq!(page.confidences(), vec![0.97, 1.0, 0.5, 0.2]);
    }

    #[test]
    fn test_parse_confidence() {
        assert_eq!(parse_confidence("0.75"), Some(0.75));
        assert_eq!(parse_confidence(" 1. "), Some(1.0));
        assert_eq!(parse_confidence("0"), Some(0.0));
        assert_eq!(parse_confidence("1.5"), None);
        assert_eq!(parse_confidence("-0.1"), None);
        assert_eq!(parse_confidence("NaN"), None);
        assert_eq!(parse_confidence(""), None);
    }

    #[test]
    fn test_empty_page() {
        let xml = r#"<alto><Layout><Page WIDTH="100" HEIGHT="100"><PrintSpace/></Page></Layout></alto>"#;

        let page = parse_alto(xml).unwrap();
        assert!(page.lines.is_empty());
        assert!(page.confidences().is_empty());
    }

    #[test]
    fn test_not_alto() {
        let err = parse_alto("<html><body/></html>").unwrap_err();
        assert!(matches!(err, OcaError::Xml(XmlError::NotAlto { .. })));
    }

    #[test]
    fn test_malformed_alto() {
        let xml = r#"<alto><Layout><Page></Layout></alto>"#;

        let err = parse_alto(xml).unwrap_err();
        assert!(matches!(err, OcaError::Xml(XmlError::Malformed { .. })));
    }
}
