/// Fraction of the image width covered by the overlay box.
pub const BOX_WIDTH_RATIO: f32 = 0.80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl OverlayBox {
    pub fn box_width_for(image_width: u32) -> u32 {
        ((image_width as f32 * BOX_WIDTH_RATIO).round() as u32).min(image_width)
    }

    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        self.x as u64 + self.width as u64 <= image_width as u64
            && self.y as u64 + self.height as u64 <= image_height as u64
    }
}
