//! 单页热力图
//!
//! 每个文本行为一行，每个单词为一格，颜色取其置信度。

use crate::error::{AppResult, RenderError};
use crate::models::AltoPage;
use crate::services::renderer::charts::{fill_span, placeholder, split};
use crate::services::renderer::colormap::{blend, confidence_color};
use image::imageops::FilterType;
use image::RgbImage;

/// 叠加色块的不透明度
const OVERLAY_ALPHA: f32 = 0.45;
/// 叠加图的最大宽度
const OVERLAY_MAX_WIDTH: u32 = 1000;

/// 渲染单页热力图；没有数据时返回空白占位图
pub fn page_heatmap(alto: Option<&AltoPage>, size: (u32, u32)) -> RgbImage {
    let rows: Vec<Vec<f64>> = alto
        .map(|page| {
            page.lines
                .iter()
                .map(|line| line.confidences().collect::<Vec<f64>>())
                .filter(|values| !values.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if rows.is_empty() {
        return placeholder(size);
    }

    let mut img = RgbImage::new(size.0, size.1);
    for (r, values) in rows.iter().enumerate() {
        let (y0, y1) = split(size.1, rows.len(), r);
        for (c, value) in values.iter().enumerate() {
            let (x0, x1) = split(size.0, values.len(), c);
            fill_span(&mut img, x0, y0, x1, y1, confidence_color(*value));
        }
    }
    img
}

/// 在页面图像上叠加单词置信度
///
/// ALTO 坐标按页面尺寸缩放到图像尺寸；结果宽度不超过 `OVERLAY_MAX_WIDTH`
pub fn overlay_on_image(image_bytes: &[u8], image_url: &str, alto: &AltoPage) -> AppResult<RgbImage> {
    let decoded = image::load_from_memory(image_bytes).map_err(|e| RenderError::ImageDecodeFailed {
        url: image_url.to_string(),
        source: Box::new(e),
    })?;
    let mut img = decoded.to_rgb8();
    paint_words(&mut img, alto);

    if img.width() > OVERLAY_MAX_WIDTH {
        let height =
            (img.height() as f64 * OVERLAY_MAX_WIDTH as f64 / img.width() as f64).round() as u32;
        img = image::imageops::resize(&img, OVERLAY_MAX_WIDTH, height.max(1), FilterType::Triangle);
    }
    Ok(img)
}

fn paint_words(img: &mut RgbImage, alto: &AltoPage) {
    let (page_w, page_h) = alto.extent();
    if page_w <= 0.0 || page_h <= 0.0 {
        return;
    }
    let sx = img.width() as f64 / page_w;
    let sy = img.height() as f64 / page_h;

    for word in alto.words() {
        let Some(confidence) = word.confidence else {
            continue;
        };
        let color = confidence_color(confidence);
        let x0 = (word.bbox.x * sx).floor().max(0.0) as u32;
        let y0 = (word.bbox.y * sy).floor().max(0.0) as u32;
        let x1 = (((word.bbox.x + word.bbox.width) * sx).ceil() as u32).min(img.width());
        let y1 = (((word.bbox.y + word.bbox.height) * sy).ceil() as u32).min(img.height());

        for y in y0..y1 {
            for x in x0..x1 {
                let pixel = img.get_pixel_mut(x, y);
                *pixel = blend(*pixel, color, OVERLAY_ALPHA);
            }
        }
    }
}
