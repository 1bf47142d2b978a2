//! HTML 报告
//!
//! 总览卡片 + 每页一张卡片（每行6张），样式来自 Bootstrap

use crate::config::Config;
use crate::models::{DocumentMetadata, Record};
use crate::services::aggregator::{ConfidenceReport, PageStats};
use crate::services::locator::Library;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write as _;

/// 每行卡片数（Bootstrap 12 栅格中每张占 2）
const CARDS_PER_ROW: usize = 6;

/// 生成 HTML 报告所需的数据
pub struct HtmlReport<'a> {
    pub record: &'a Record,
    pub metadata: &'a DocumentMetadata,
    pub report: &'a ConfidenceReport,
    /// 已生成叠加图的页面（0起始索引）
    pub overlay_pages: &'a [usize],
    /// 页面标题链接到图书馆的页面图像
    pub library: Library,
    pub config: &'a Config,
}

impl HtmlReport<'_> {
    pub fn render(&self) -> String {
        let mut html = String::with_capacity(16 * 1024);

        let _ = write!(
            html,
            r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>OCA Report - {id}</title>
  <link href="{css}" rel="stylesheet">
</head>
<body>
<script src="{js}"></script>
"#,
            id = text(&self.record.id),
            css = attr(&self.config.bootstrap_css_url),
            js = attr(&self.config.bootstrap_js_url),
        );

        self.write_overview(&mut html);
        self.write_pages(&mut html);

        html.push_str("</body>\n</html>\n");
        html
    }

    fn write_overview(&self, html: &mut String) {
        let id = text(&self.record.id);
        let id_attr = attr(&self.record.id);
        let doc = &self.report.document;
        let heading_link = self
            .record
            .resolver_url
            .as_deref()
            .unwrap_or(&self.record.mets_url);

        let _ = write!(
            html,
            r#"<div class="container">
  <h1><a href="{link}" class="link-dark">Result for {id}</a></h1>
</div>
<div class="container">
  <div class="row gx-2 m-1">
    <div class="col-lg-12 col-md-12 h-100">
      <div class="card mb-3">
        <div class="row g-0">
          <div class="col-md-4">
            <a href="{mets}"><img src="images/{id_attr}.png" class="img-fluid rounded-start" alt="Overview of {id_attr}"></a>
          </div>
          <div class="col-md-8">
            <div class="card-body">
              <h5 class="card-title">{author} ({year}): <em>{title}</em></h5><br>
              <h6 class="card-subtitle mb-2 text-muted">Page Stats</h6>
              <p class="font-monospace">
                Total Pages: {pages}<br>
                Failed Pages: {failed}<br>
                Total Words: {words}<br>
                Total Lines: {lines}<br>
              </p>
              <h6 class="card-subtitle mb-2 text-muted">Word Confidence</h6>
              <p class="font-monospace">
                mean:&nbsp;&nbsp;&nbsp;{mean}<br>
                median:&nbsp;{median}<br>
                <br>
                &#8709;&nbsp;mean:&nbsp;{avg_mean}<br>
                &#8709;&nbsp;std:&nbsp;&nbsp;{avg_std}<br>
                &#8709;&nbsp;25%:&nbsp;&nbsp;{avg_q25}<br>
                &#8709;&nbsp;50%:&nbsp;&nbsp;{avg_q50}<br>
                &#8709;&nbsp;75%:&nbsp;&nbsp;{avg_q75}<br>
              </p>
              <img src="images/{id_attr}_displot.png" class="img-fluid" alt="Confidence distribution">
              <img src="images/{id_attr}_trend.png" class="img-fluid" alt="Mean confidence per page">
            </div>
          </div>
        </div>
      </div>
    </div>
  </div>
</div>
"#,
            link = attr(heading_link),
            mets = attr(&self.record.mets_url),
            author = text(self.metadata.author_or_default()),
            year = text(self.metadata.year_or_default()),
            title = text(self.metadata.title_or_default()),
            pages = doc.total_pages,
            failed = doc.failed_pages,
            words = doc.total_words,
            lines = doc.total_lines,
            mean = fmt_value(doc.mean),
            median = fmt_value(doc.median),
            avg_mean = fmt_value(doc.avg_page_mean),
            avg_std = fmt_value(doc.avg_page_std),
            avg_q25 = fmt_value(doc.avg_page_q25),
            avg_q50 = fmt_value(doc.avg_page_median),
            avg_q75 = fmt_value(doc.avg_page_q75),
        );
    }

    fn write_pages(&self, html: &mut String) {
        html.push_str("<div class=\"container\">\n");
        for (counter, page) in self.report.pages.iter().enumerate() {
            if counter % CARDS_PER_ROW == 0 {
                if counter != 0 {
                    html.push_str("  </div>\n");
                }
                html.push_str("  <div class=\"row gx-2 m-1\">\n");
            }
            self.write_page_card(html, counter, page);
        }
        if !self.report.pages.is_empty() {
            html.push_str("  </div>\n");
        }
        html.push_str("</div>\n");
    }

    fn write_page_card(&self, html: &mut String, index: usize, page: &PageStats) {
        let border = if page.failed { "border-danger" } else { "border-dark" };
        let padded = format!("{:08}", page.page);

        // 失败的页面没有本地 ALTO 副本，不加链接
        let thumbnail = format!(
            r#"<img src="images/{index}.png" class="card-img-top" alt="Page {page}">"#,
            page = page.page
        );
        let thumbnail = if page.failed {
            thumbnail
        } else {
            format!(r#"<a href="alto/{padded}.xml">{thumbnail}</a>"#)
        };

        let status = if let Some(reason) = &page.failure {
            format!(
                r#"<span class="badge bg-danger page-failed">failed</span>
        <p class="small text-danger">{}</p>"#,
                text(reason)
            )
        } else if !page.has_data() {
            r#"<span class="badge bg-secondary">no words</span>"#.to_string()
        } else {
            String::new()
        };

        let image_url = self.library.page_image_url(&self.record.id, page.page);

        let overlay = if self.overlay_pages.contains(&index) {
            format!(r#"<a href="images/overlay/{index}.png" class="card-link">Overlay</a>"#)
        } else {
            String::new()
        };

        let _ = write!(
            html,
            r#"    <div class="col-lg-2 col-md-12 h-100 page-card" id="page-{page}">
      <div class="card {border}">
        {thumbnail}
        <div class="card-body">
        <h5 class="card-title"><a href="{image}" class="link-dark">Page {page}</a></h5>
        {status}
        <h6 class="card-subtitle mb-2 text-muted">Page Stats</h6>
        <p class="font-monospace">
          Words: {words}<br>
          Lines: {lines}<br>
        </p>
        <h6 class="card-subtitle mb-2 text-muted">Word Confidence</h6>
        <p class="font-monospace">
          mean:&nbsp;{mean}<br>
          std:&nbsp;&nbsp;{std}<br>
          <br>
          <!--min:&nbsp;&nbsp;{min}<br>-->
          25%:&nbsp;&nbsp;{q25}<br>
          50%:&nbsp;&nbsp;{q50}<br>
          75%:&nbsp;&nbsp;{q75}<br>
          <!--max:&nbsp;&nbsp;{max}-->
        </p>
        {overlay}
        </div>
      </div>
    </div>
"#,
            page = page.page,
            image = attr(&image_url),
            words = page.words,
            lines = page.lines,
            mean = fmt_value(page.mean),
            std = fmt_value(page.std),
            min = fmt_value(page.min),
            q25 = fmt_value(page.q25),
            q50 = fmt_value(page.median),
            q75 = fmt_value(page.q75),
            max = fmt_value(page.max),
        );
    }
}

fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}
