use super::PlacedBox;
use crate::error::InjexError;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

const CHECKED: Rgb<u8> = Rgb([0, 200, 0]);
const UNCHECKED: Rgb<u8> = Rgb([220, 0, 0]);

/// Copy of `page` with its boxes outlined, green when checked and red
/// when not. Outlines are drawn twice, one pixel apart, to survive
/// downscaled viewing.
pub fn render_overlay(page: &RgbImage, page_index: usize, boxes: &[PlacedBox]) -> RgbImage {
    let mut canvas = page.clone();
    for placed in boxes.iter().filter(|b| b.page == page_index) {
        let r = placed.detected.rect;
        let color = if placed.detected.checked { CHECKED } else { UNCHECKED };
        draw_hollow_rect_mut(&mut canvas, Rect::at(r.x as i32, r.y as i32).of_size(r.w.max(1), r.h.max(1)), color);
        if r.x > 0 && r.y > 0 {
            let outer = Rect::at(r.x as i32 - 1, r.y as i32 - 1).of_size(r.w + 2, r.h + 2);
            draw_hollow_rect_mut(&mut canvas, outer, color);
        }
    }
    canvas
}

/// Write one overlay PNG per page as `{stem}_page{n}.png` under `dir`.
pub fn write_overlays(
    dir: &Path,
    stem: &str,
    pages: &[RgbImage],
    boxes: &[PlacedBox],
) -> Result<Vec<PathBuf>, InjexError> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(pages.len());
    for (i, page) in pages.iter().enumerate() {
        let path = dir.join(format!("{stem}_page{}.png", i + 1));
        render_overlay(page, i, boxes).save(&path)?;
        tracing::debug!(path = %path.display(), "wrote checkbox overlay");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkbox::geometry::BoxRect;
    use crate::checkbox::DetectedBox;

    fn placed(page: usize, x: u32, checked: bool) -> PlacedBox {
        PlacedBox {
            page,
            position: 1,
            detected: DetectedBox {
                rect: BoxRect::new(x, 10, 20, 20),
                fill_ratio: 0.0,
                checked,
            },
        }
    }

    #[test]
    fn test_overlay_colors_by_state() {
        let page = RgbImage::from_pixel(100, 50, Rgb([255, 255, 255]));
        let out = render_overlay(&page, 0, &[placed(0, 10, true), placed(0, 50, false), placed(1, 80, true)]);
        assert_eq!(out.get_pixel(10, 10), &CHECKED);
        assert_eq!(out.get_pixel(50, 10), &UNCHECKED);
        // Box from another page is not drawn.
        assert_eq!(out.get_pixel(80, 10), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_write_overlays() {
        let dir = tempfile::tempdir().unwrap();
        let pages = vec![RgbImage::new(40, 40), RgbImage::new(40, 40)];
        let written = write_overlays(&dir.path().join("debug"), "card", &pages, &[]).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[1].ends_with("card_page2.png"));
        assert!(written.iter().all(|p| p.exists()));
    }
}
