use image::Rgb;

/// 线性 "brg" 色表：0.0 蓝，0.5 红，1.0 绿
pub fn confidence_color(value: f64) -> Rgb<u8> {
    let v = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
    let (r, g, b) = if v <= 0.5 {
        let t = v * 2.0;
        (t, 0.0, 1.0 - t)
    } else {
        let t = (v - 0.5) * 2.0;
        (1.0 - t, t, 0.0)
    };
    Rgb([to_u8(r), to_u8(g), to_u8(b)])
}

fn to_u8(channel: f64) -> u8 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}

/// 按 alpha 混合两种颜色
pub fn blend(base: Rgb<u8>, over: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |b: u8, o: u8| (b as f32 * (1.0 - a) + o as f32 * a).round() as u8;
    Rgb([
        mix(base[0], over[0]),
        mix(base[1], over[1]),
        mix(base[2], over[2]),
    ])
}
