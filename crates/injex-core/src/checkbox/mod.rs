//! Optical checkbox detection for scanned PDF forms.
//!
//! Pages are scanned independently by [`detect::detect_checkboxes`], then
//! [`order::assign_positions`] numbers the boxes across the whole document
//! so position N here means the same checkbox as field N on the Word path.

pub mod detect;
pub mod geometry;
pub mod order;
pub mod overlay;

use crate::model::ExtractionWarning;
use geometry::BoxRect;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binarization {
    #[default]
    Otsu,
    AdaptiveMean,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContourMode {
    /// Every border, holes included.
    #[default]
    All,
    /// Outer borders that are not nested in anything.
    External,
}

/// Detector tuning. The size window assumes pages rendered at `dpi`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub dpi: u32,
    pub crop_top: u32,
    pub crop_bottom: u32,
    pub crop_left: u32,
    pub crop_right: u32,
    pub blur_sigma: f32,
    pub binarization: Binarization,
    pub adaptive_block: u32,
    pub adaptive_c: i32,
    pub contours: ContourMode,
    pub min_side: u32,
    pub max_side: u32,
    pub min_aspect: f64,
    pub max_aspect: f64,
    pub epsilon_factor: f64,
    pub min_vertices: usize,
    pub max_vertices: usize,
    pub max_cosine: f64,
    pub border_divisor: u32,
    pub fill_threshold: f64,
    pub iou_threshold: f64,
    pub row_tolerance: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            dpi: 300,
            crop_top: 0,
            crop_bottom: 0,
            crop_left: 0,
            crop_right: 0,
            blur_sigma: 0.8,
            binarization: Binarization::Otsu,
            adaptive_block: 31,
            adaptive_c: 10,
            contours: ContourMode::All,
            min_side: 20,
            max_side: 60,
            min_aspect: 0.92,
            max_aspect: 1.08,
            epsilon_factor: 0.03,
            min_vertices: 4,
            max_vertices: 6,
            max_cosine: 0.35,
            border_divisor: 7,
            fill_threshold: 0.2,
            iou_threshold: 0.5,
            row_tolerance: 25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectedBox {
    pub rect: BoxRect,
    pub fill_ratio: f64,
    pub checked: bool,
}

/// A detected box with its page (0-based) and document position (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacedBox {
    pub page: usize,
    pub position: usize,
    #[serde(flatten)]
    pub detected: DetectedBox,
}

/// Document position → checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckboxMap(BTreeMap<usize, bool>);

impl CheckboxMap {
    pub fn from_placed(boxes: &[PlacedBox]) -> CheckboxMap {
        CheckboxMap(
            boxes
                .iter()
                .map(|b| (b.position, b.detected.checked))
                .collect(),
        )
    }

    pub fn get(&self, position: usize) -> Option<bool> {
        self.0.get(&position).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        self.0.iter().map(|(&k, &v)| (k, v))
    }
}

impl FromIterator<(usize, bool)> for CheckboxMap {
    fn from_iter<I: IntoIterator<Item = (usize, bool)>>(iter: I) -> Self {
        CheckboxMap(iter.into_iter().collect())
    }
}

/// Result of scanning every page of one document.
#[derive(Debug, Clone, Default)]
pub struct PageScan {
    /// Every box found, in document order, even when the count check failed.
    pub boxes: Vec<PlacedBox>,
    pub map: CheckboxMap,
    pub warning: Option<ExtractionWarning>,
}

/// Detect, order and number the checkboxes of a rendered document.
///
/// When `expected` is set and the total differs, the map comes back empty
/// so no checkbox column is filled from a misaligned numbering.
pub fn scan_pages(
    pages: &[RgbImage],
    config: &DetectorConfig,
    swaps: &[[usize; 2]],
    expected: Option<usize>,
) -> PageScan {
    let per_page: Vec<Vec<DetectedBox>> = pages
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let found = detect::detect_checkboxes(page, config);
            tracing::debug!(page = i + 1, boxes = found.len(), "detected checkboxes");
            found
        })
        .collect();

    let boxes = order::assign_positions(per_page, swaps, config.row_tolerance);
    let found = boxes.len();

    match expected {
        Some(expected) if expected != found => {
            tracing::warn!(expected, found, "checkbox count mismatch, ignoring checkboxes");
            PageScan {
                boxes,
                map: CheckboxMap::default(),
                warning: Some(ExtractionWarning::CheckboxCount { expected, found }),
            }
        }
        _ => PageScan {
            map: CheckboxMap::from_placed(&boxes),
            boxes,
            warning: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
    use imageproc::rect::Rect;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn page_with_boxes(boxes: &[(i32, i32, bool)]) -> RgbImage {
        let mut img = RgbImage::from_pixel(400, 300, Rgb([255, 255, 255]));
        for &(x, y, checked) in boxes {
            for inset in 0..3 {
                let side = 30 - 2 * inset as u32;
                draw_hollow_rect_mut(
                    &mut img,
                    Rect::at(x + inset, y + inset).of_size(side, side),
                    BLACK,
                );
            }
            if checked {
                draw_filled_rect_mut(&mut img, Rect::at(x + 8, y + 8).of_size(14, 14), BLACK);
            }
        }
        img
    }

    #[test]
    fn test_default_config_values() {
        let c = DetectorConfig::default();
        assert_eq!((c.min_side, c.max_side), (20, 60));
        assert_eq!(c.fill_threshold, 0.2);
        assert_eq!(c.row_tolerance, 25);
        assert_eq!(c.binarization, Binarization::Otsu);
    }

    #[test]
    fn test_config_partial_override_from_json() {
        let c: DetectorConfig =
            serde_json::from_str(r#"{"fill_threshold": 0.25, "contours": "external"}"#).unwrap();
        assert_eq!(c.fill_threshold, 0.25);
        assert_eq!(c.contours, ContourMode::External);
        assert_eq!(c.dpi, 300);
    }

    #[test]
    fn test_scan_pages_numbers_across_pages() {
        let p1 = page_with_boxes(&[(50, 50, true), (150, 50, false)]);
        let p2 = page_with_boxes(&[(50, 50, false)]);
        let scan = scan_pages(&[p1, p2], &DetectorConfig::default(), &[], Some(3));
        assert!(scan.warning.is_none());
        assert_eq!(scan.map.get(1), Some(true));
        assert_eq!(scan.map.get(2), Some(false));
        assert_eq!(scan.map.get(3), Some(false));
        assert_eq!(scan.boxes[2].page, 1);
    }

    #[test]
    fn test_scan_pages_count_mismatch_empties_map() {
        let p1 = page_with_boxes(&[(50, 50, true)]);
        let scan = scan_pages(&[p1], &DetectorConfig::default(), &[], Some(96));
        assert!(scan.map.is_empty());
        assert_eq!(scan.boxes.len(), 1);
        assert_eq!(
            scan.warning,
            Some(ExtractionWarning::CheckboxCount {
                expected: 96,
                found: 1
            })
        );
    }
}
