use image::{DynamicImage, Rgba, RgbaImage};

/// Distinct opaque colors, one per input slot.
const PALETTE: [[u8; 4]; 8] = [
    [255, 0, 0, 255],
    [0, 255, 0, 255],
    [0, 0, 255, 255],
    [255, 255, 0, 255],
    [255, 0, 255, 255],
    [0, 255, 255, 255],
    [128, 64, 32, 255],
    [32, 64, 128, 255],
];

fn solid(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
}

fn solids(count: usize, width: u32, height: u32) -> Vec<DynamicImage> {
    PALETTE[..count]
        .iter()
        .map(|&color| solid(width, height, color))
        .collect()
}

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    }))
}

fn opaque_pixels(canvas: &RgbaImage) -> usize {
    canvas.pixels().filter(|p| p[3] == 255).count()
}
