use serde::{Deserialize, Serialize};

/// ALTO 坐标系中的矩形（HPOS/VPOS/WIDTH/HEIGHT）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// ALTO 中的一个 `String` 元素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    /// `WC` 属性，缺失或无效时为 None
    pub confidence: Option<f64>,
    pub bbox: BBox,
}

/// ALTO 中的一个 `TextLine`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub id: Option<String>,
    /// 所属 `TextBlock` 的 ID
    pub block_id: Option<String>,
    pub words: Vec<Word>,
}

impl TextLine {
    /// 本行中带有置信度的值
    pub fn confidences(&self) -> impl Iterator<Item = f64> + '_ {
        self.words.iter().filter_map(|w| w.confidence)
    }
}

/// 一页 ALTO 的解析结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AltoPage {
    /// `Page` 元素的宽高（ALTO 坐标单位）
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub lines: Vec<TextLine>,
}

impl AltoPage {
    pub fn words(&self) -> impl Iterator<Item = &Word> + '_ {
        self.lines.iter().flat_map(|l| l.words.iter())
    }

    /// 本页所有有效置信度（按阅读顺序）
    pub fn confidences(&self) -> Vec<f64> {
        self.lines.iter().flat_map(|l| l.confidences()).collect()
    }

    pub fn word_count(&self) -> usize {
        self.words().count()
    }

    /// 页面尺寸；缺失时用所有单词的外接范围代替
    pub fn extent(&self) -> (f64, f64) {
        let (mut max_x, mut max_y) = (0.0_f64, 0.0_f64);
        for w in self.words() {
            max_x = max_x.max(w.bbox.x + w.bbox.width);
            max_y = max_y.max(w.bbox.y + w.bbox.height);
        }
        (
            self.width.filter(|w| *w > 0.0).unwrap_or(max_x),
            self.height.filter(|h| *h > 0.0).unwrap_or(max_y),
        )
    }
}
