use super::geometry::{approximate_closed, closed_perimeter, is_convex, max_corner_cosine, BoxRect, Vertex};
use super::{Binarization, ContourMode, DetectedBox, DetectorConfig};
use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::definitions::Image;
use imageproc::integral_image::integral_image;

/// Find square checkbox glyphs on one rendered page.
///
/// Returned boxes are in page coordinates, sorted by (y, x), with
/// overlapping duplicates removed.
pub fn detect_checkboxes(page: &RgbImage, config: &DetectorConfig) -> Vec<DetectedBox> {
    let Some(bw) = binarize_page(page, config) else {
        return Vec::new();
    };

    let mut candidates = Vec::new();
    for contour in find_contours::<u32>(&bw) {
        if config.contours == ContourMode::External && !is_external(&contour) {
            continue;
        }
        let Some(rect) = BoxRect::enclosing(&contour.points) else {
            continue;
        };
        if !within_window(&rect, config) || !is_square_outline(&contour, config) {
            continue;
        }
        let fill_ratio = fill_ratio(&bw, &rect, config.border_divisor);
        candidates.push(DetectedBox {
            rect: rect.offset(config.crop_left, config.crop_top),
            fill_ratio,
            checked: fill_ratio > config.fill_threshold,
        });
    }

    suppress_duplicates(candidates, config.iou_threshold)
}

/// Crop, grayscale, blur, and threshold so ink becomes 255 and paper 0.
/// `None` when the crop margins leave nothing of the page.
pub fn binarize_page(page: &RgbImage, config: &DetectorConfig) -> Option<GrayImage> {
    let (w, h) = page.dimensions();
    let crop_w = w.checked_sub(config.crop_left + config.crop_right)?;
    let crop_h = h.checked_sub(config.crop_top + config.crop_bottom)?;
    if crop_w == 0 || crop_h == 0 {
        return None;
    }

    let cropped = image::imageops::crop_imm(page, config.crop_left, config.crop_top, crop_w, crop_h)
        .to_image();
    let gray = image::imageops::grayscale(&cropped);
    let blurred = if config.blur_sigma > 0.0 {
        imageproc::filter::gaussian_blur_f32(&gray, config.blur_sigma)
    } else {
        gray
    };

    Some(match config.binarization {
        Binarization::Otsu => {
            let level = otsu_level(&blurred);
            threshold(&blurred, level, ThresholdType::BinaryInverted)
        }
        Binarization::AdaptiveMean => {
            let sums = integral_image::<_, u32>(&blurred);
            let radius = config.adaptive_block / 2;
            let c = f64::from(config.adaptive_c);
            GrayImage::from_fn(blurred.width(), blurred.height(), |x, y| {
                let level = window_mean(&sums, x, y, radius) - c;
                if f64::from(blurred.get_pixel(x, y)[0]) > level {
                    Luma([0])
                } else {
                    Luma([255])
                }
            })
        }
    })
}

/// Mean of the square window of `radius` around (x, y), read from an
/// integral image. Windows are clipped at the image edge.
fn window_mean(sums: &Image<Luma<u32>>, x: u32, y: u32, radius: u32) -> f64 {
    let (width, height) = (sums.width() - 1, sums.height() - 1);
    let (x0, y0) = (x.saturating_sub(radius), y.saturating_sub(radius));
    let (x1, y1) = ((x + radius + 1).min(width), (y + radius + 1).min(height));
    let at = |x, y| i64::from(sums.get_pixel(x, y)[0]);
    let total = at(x1, y1) - at(x0, y1) - at(x1, y0) + at(x0, y0);
    total as f64 / f64::from((x1 - x0) * (y1 - y0))
}

fn is_external(contour: &Contour<u32>) -> bool {
    contour.border_type == BorderType::Outer && contour.parent.is_none()
}

fn within_window(rect: &BoxRect, config: &DetectorConfig) -> bool {
    let side = config.min_side..=config.max_side;
    let aspect = rect.aspect_ratio();
    side.contains(&rect.w)
        && side.contains(&rect.h)
        && aspect >= config.min_aspect
        && aspect <= config.max_aspect
}

fn is_square_outline(contour: &Contour<u32>, config: &DetectorConfig) -> bool {
    let points: Vec<Vertex> = contour.points.iter().map(Vertex::from).collect();
    let epsilon = config.epsilon_factor * closed_perimeter(&points);
    let poly = approximate_closed(&points, epsilon);
    (config.min_vertices..=config.max_vertices).contains(&poly.len())
        && is_convex(&poly)
        && max_corner_cosine(&poly) <= config.max_cosine
}

/// Mean foreground share of the box interior, inset to skip the outline.
fn fill_ratio(bw: &GrayImage, rect: &BoxRect, border_divisor: u32) -> f64 {
    let border = (rect.w.min(rect.h) / border_divisor.max(1)).max(1);
    let (mut x0, mut y0, mut x1, mut y1) = (
        rect.x + border,
        rect.y + border,
        (rect.x + rect.w).saturating_sub(border),
        (rect.y + rect.h).saturating_sub(border),
    );
    if x1 <= x0 || y1 <= y0 {
        (x0, y0, x1, y1) = (rect.x, rect.y, rect.x + rect.w, rect.y + rect.h);
    }
    x1 = x1.min(bw.width());
    y1 = y1.min(bw.height());
    if x1 <= x0 || y1 <= y0 {
        return 0.0;
    }

    let mut sum = 0u64;
    for y in y0..y1 {
        for x in x0..x1 {
            sum += u64::from(bw.get_pixel(x, y)[0]);
        }
    }
    let count = u64::from(x1 - x0) * u64::from(y1 - y0);
    sum as f64 / count as f64 / 255.0
}

/// Keep boxes in (y, x) order, dropping any that overlap a kept box by
/// more than `threshold` IoU.
pub fn suppress_duplicates(mut boxes: Vec<DetectedBox>, threshold: f64) -> Vec<DetectedBox> {
    boxes.sort_by_key(|b| (b.rect.y, b.rect.x));
    let mut kept: Vec<DetectedBox> = Vec::with_capacity(boxes.len());
    for candidate in boxes {
        if kept.iter().all(|k| k.rect.iou(&candidate.rect) <= threshold) {
            kept.push(candidate);
        }
    }
    kept
}
