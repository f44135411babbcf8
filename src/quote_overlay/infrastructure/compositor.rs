use image::RgbaImage;

use crate::domain::color::Color;
use crate::domain::overlay_box::OverlayBox;

/// Blends `color` over every pixel of `area`:
/// `out = src * (1 - a) + color * a` with `a = opacity * color.a / 255`.
/// The alpha channel is blended toward fully opaque the same way.
pub fn fill_translucent_rect(img: &mut RgbaImage, area: &OverlayBox, color: Color, opacity: f32) {
    let alpha = opacity.clamp(0.0, 1.0) * (color.a as f32 / 255.0);
    if alpha <= 0.0 {
        return;
    }
    let inv = 1.0 - alpha;
    let blend = |src: u8, dst: u8| (src as f32 * inv + dst as f32 * alpha).round() as u8;

    let x_end = area.x.saturating_add(area.width).min(img.width());
    let y_end = area.y.saturating_add(area.height).min(img.height());
    for y in area.y..y_end {
        for x in area.x..x_end {
            let pixel = img.get_pixel_mut(x, y);
            let [r, g, b, a] = pixel.0;
            pixel.0 = [
                blend(r, color.r),
                blend(g, color.g),
                blend(b, color.b),
                blend(a, 255),
            ];
        }
    }
}
