//! 总览图表
//!
//! 图表只画色块和线条，不含文字；数值在 HTML 报告中给出。

use crate::services::aggregator::{ConfidenceReport, PageStats};
use crate::services::renderer::colormap::confidence_color;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GRID: Rgb<u8> = Rgb([220, 220, 220]);
const AXIS: Rgb<u8> = Rgb([90, 90, 90]);
const BAR: Rgb<u8> = Rgb([70, 130, 180]);
const FAILED: Rgb<u8> = Rgb([220, 53, 69]);
const PLACEHOLDER: Rgb<u8> = Rgb([240, 240, 240]);

/// 填充 [x0, x1) × [y0, y1)，空区域直接忽略
pub(crate) fn fill_span(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    let x1 = x1.min(img.width());
    let y1 = y1.min(img.height());
    if x1 <= x0 || y1 <= y0 {
        return;
    }
    draw_filled_rect_mut(
        img,
        Rect::at(x0 as i32, y0 as i32).of_size(x1 - x0, y1 - y0),
        color,
    );
}

/// 把 [0, total) 等分为 `parts` 份，返回第 `i` 份的边界
pub(crate) fn split(total: u32, parts: usize, i: usize) -> (u32, u32) {
    let start = (i as f64 * total as f64 / parts as f64).round() as u32;
    let end = ((i + 1) as f64 * total as f64 / parts as f64).round() as u32;
    (start, end)
}

/// 空白占位图（无数据或失败的页面）
pub fn placeholder(size: (u32, u32)) -> RgbImage {
    RgbImage::from_pixel(size.0, size.1, PLACEHOLDER)
}

/// 总览条纹：每个有数据的页面一条竖纹，颜色为该页均值
pub fn overview_stripes(pages: &[PageStats], size: (u32, u32)) -> RgbImage {
    let means: Vec<f64> = pages.iter().filter_map(|p| p.mean).collect();
    if means.is_empty() {
        return placeholder(size);
    }

    let mut img = RgbImage::from_pixel(size.0, size.1, BACKGROUND);
    for (i, mean) in means.iter().enumerate() {
        let (x0, x1) = split(size.0, means.len(), i);
        fill_span(&mut img, x0, 0, x1, size.1, confidence_color(*mean));
    }
    img
}

/// 置信度分布直方图
pub fn histogram_chart(report: &ConfidenceReport, size: (u32, u32)) -> RgbImage {
    let (width, height) = size;
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    let margin = 10u32;
    let plot_h = height.saturating_sub(2 * margin);
    let baseline = height - margin;

    draw_grid(&mut img, margin);

    let bins = &report.document.histogram;
    let max = bins.iter().copied().max().unwrap_or(0);
    if max > 0 {
        let plot_w = width.saturating_sub(2 * margin);
        for (i, count) in bins.iter().enumerate() {
            let (x0, x1) = split(plot_w, bins.len(), i);
            let bar_h = (*count as f64 / max as f64 * plot_h as f64).round() as u32;
            let center = (i as f64 + 0.5) / bins.len() as f64;
            let color = if *count > 0 { confidence_color(center) } else { BAR };
            fill_span(
                &mut img,
                margin + x0 + 1,
                baseline - bar_h,
                margin + x1.saturating_sub(1),
                baseline,
                color,
            );
        }
    }

    draw_line_segment_mut(
        &mut img,
        (margin as f32, baseline as f32),
        ((width - margin) as f32, baseline as f32),
        AXIS,
    );
    img
}

/// 逐页趋势图：横轴为页码，纵轴为页均值；失败页在底部标红
pub fn trend_chart(pages: &[PageStats], size: (u32, u32)) -> RgbImage {
    let (width, height) = size;
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    let margin = 10u32;
    draw_grid(&mut img, margin);

    if pages.is_empty() {
        return img;
    }

    let plot_w = width.saturating_sub(2 * margin) as f32;
    let plot_h = height.saturating_sub(2 * margin) as f32;
    let x_of = |i: usize| {
        if pages.len() == 1 {
            margin as f32 + plot_w / 2.0
        } else {
            margin as f32 + plot_w * i as f32 / (pages.len() - 1) as f32
        }
    };
    let y_of = |v: f64| margin as f32 + plot_h * (1.0 - v.clamp(0.0, 1.0) as f32);

    let mut previous: Option<(f32, f32)> = None;
    for (i, page) in pages.iter().enumerate() {
        let x = x_of(i);
        if page.failed {
            let xi = x.round() as u32;
            fill_span(&mut img, xi.saturating_sub(1), height - margin, xi + 2, height, FAILED);
        }
        match page.mean {
            Some(mean) => {
                let point = (x, y_of(mean));
                if let Some(prev) = previous {
                    draw_line_segment_mut(&mut img, prev, point, AXIS);
                }
                let (px, py) = (point.0.round() as u32, point.1.round() as u32);
                fill_span(
                    &mut img,
                    px.saturating_sub(2),
                    py.saturating_sub(2),
                    px + 3,
                    py + 3,
                    confidence_color(mean),
                );
                previous = Some(point);
            }
            // 缺失的页面打断折线
            None => previous = None,
        }
    }
    img
}

/// 0, 0.25, 0.5, 0.75, 1.0 的水平网格线
fn draw_grid(img: &mut RgbImage, margin: u32) {
    let (width, height) = img.dimensions();
    let plot_h = height.saturating_sub(2 * margin) as f32;
    for step in 0..=4 {
        let y = margin as f32 + plot_h * step as f32 / 4.0;
        draw_line_segment_mut(img, (margin as f32, y), ((width - margin) as f32, y), GRID);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(mean: Option<f64>, failed: bool) -> PageStats {
        PageStats {
            mean,
            failed,
            ..Default::default()
        }
    }

    #[test]
    fn test_split_covers_whole_range() {
        let parts: Vec<(u32, u32)> = (0..3).map(|i| split(100, 3, i)).collect();
        assert_eq!(parts[0].0, 0);
        assert_eq!(parts[2].1, 100);
        assert_eq!(parts[0].1, parts[1].0);
        assert_eq!(parts[1].1, parts[2].0);
    }

    #[test]
    fn test_overview_stripes_skip_pages_without_data() {
        let pages = vec![stats(Some(1.0), false), stats(None, true), stats(Some(0.0), false)];

        let img = overview_stripes(&pages, (100, 10));

        assert_eq!(img.dimensions(), (100, 10));
        assert_eq!(*img.get_pixel(10, 5), confidence_color(1.0));
        assert_eq!(*img.get_pixel(90, 5), confidence_color(0.0));
    }

    #[test]
    fn test_overview_without_data_is_placeholder() {
        let img = overview_stripes(&[stats(None, true)], (20, 20));
        assert_eq!(*img.get_pixel(0, 0), PLACEHOLDER);
    }

    #[test]
    fn test_trend_chart_marks_failed_page() {
        let pages = vec![stats(Some(0.9), false), stats(None, true), stats(Some(0.8), false)];

        let img = trend_chart(&pages, (200, 100));

        assert_eq!(*img.get_pixel(100, 99), FAILED);
    }

    #[test]
    fn test_fill_span_ignores_empty() {
        let mut img = RgbImage::from_pixel(4, 4, BACKGROUND);
        fill_span(&mut img, 2, 2, 2, 4, AXIS);
        fill_span(&mut img, 5, 0, 9, 4, AXIS);
        assert!(img.pixels().all(|p| *p == BACKGROUND));
    }
}
