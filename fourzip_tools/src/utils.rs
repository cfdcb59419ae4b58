use std::path::Path;

use image::{imageops, GrayImage};
use text_io::read;

#[derive(Debug, Clone, Copy)]
pub enum Assume {
    Yes,
    No,
}

/// Percentage of space saved by storing `compressed` tree nodes instead of
/// `raw` pixels. Negative when the tree is larger than the image.
pub fn size_reduction(raw: usize, compressed: usize) -> f64 {
    if raw == 0 {
        return 0.0
    }

    100.0 * (1.0 - compressed as f64 / raw as f64)
}

/// Crop the image to the largest power of two square that fits in its
/// upper left corner.
pub fn largest_square(image: &GrayImage) -> Option<GrayImage> {
    let shortest = image.width().min(image.height());
    if shortest == 0 {
        return None
    }

    let side = 1 << shortest.ilog2();

    Some(imageops::crop_imm(image, 0, 0, side, side).to_image())
}

pub fn exists_decision<P: AsRef<Path>>(place: &str, action: &str, path: &P, assume: Option<Assume>) -> bool {
    let path = path.as_ref();

    match assume {
        Some(Assume::Yes) => return true,
        Some(Assume::No) => return false,
        None => (),
    }

    loop {
        print!("{place} file {path:?} already exists. {action}? [y/N] ");

        let opt: String = read!("{}\n");
        let opt = opt.trim().to_lowercase();

        match opt.as_str() {
            "y" | "yes" => return true,
            "" | "n" | "no" => return false,
            _ => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduction() {
        assert_eq!(size_reduction(4, 1), 75.0);
        assert_eq!(size_reduction(4, 5), -25.0);
        assert_eq!(size_reduction(0, 0), 0.0);
    }

    #[test]
    fn square_crop() {
        let input = GrayImage::from_fn(300, 130, |x, y| image::Luma([(x + y) as u8]));
        let square = largest_square(&input).unwrap();

        assert_eq!(square.dimensions(), (128, 128));
        assert_eq!(square.get_pixel(5, 7), input.get_pixel(5, 7));

        assert!(largest_square(&GrayImage::new(0, 4)).is_none());
    }
}
