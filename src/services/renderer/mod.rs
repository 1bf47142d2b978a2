//! 报告渲染 - 业务能力层
//!
//! - `colormap`: 置信度 → 颜色（蓝 0.0 → 红 0.5 → 绿 1.0）
//! - `charts`: 总览条纹、分布直方图、逐页趋势图
//! - `heatmap`: 单页热力图与页面图像叠加
//! - `html`: Bootstrap 风格的 HTML 报告

pub mod charts;
pub mod colormap;
pub mod heatmap;
pub mod html;

pub use html::HtmlReport;

use crate::error::{AppResult, OcaError};
use image::RgbImage;
use std::path::Path;

/// 缩略图尺寸（DIN A7，72dpi）
pub const THUMBNAIL_SIZE: (u32, u32) = (210, 298);
/// 总览条纹尺寸（DIN A5，72dpi）
pub const OVERVIEW_SIZE: (u32, u32) = (420, 595);
/// 直方图/趋势图尺寸
pub const CHART_SIZE: (u32, u32) = (1200, 300);

/// 保存为 PNG
pub fn save_png(img: &RgbImage, path: &Path) -> AppResult<()> {
    img.save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| OcaError::image_save_failed(path.display().to_string(), e))
}
