use super::{DetectedBox, PlacedBox};

/// Reading order on one page: rows top to bottom, boxes left to right.
///
/// Boxes join the current row while their center is within `tolerance`
/// pixels of the row's first center, which keeps slightly skewed scans
/// from splitting a row.
pub fn order_page(boxes: Vec<DetectedBox>, tolerance: u32) -> Vec<DetectedBox> {
    let mut keyed: Vec<(u32, u32, DetectedBox)> = boxes
        .into_iter()
        .map(|b| {
            let (cx, cy) = b.rect.center();
            (cy, cx, b)
        })
        .collect();
    keyed.sort_by_key(|&(cy, cx, _)| (cy, cx));

    let mut rows: Vec<Vec<(u32, u32, DetectedBox)>> = Vec::new();
    for entry in keyed {
        match rows.last_mut() {
            Some(row) if row[0].0.abs_diff(entry.0) <= tolerance => row.push(entry),
            _ => rows.push(vec![entry]),
        }
    }

    rows.into_iter()
        .flat_map(|mut row| {
            row.sort_by_key(|&(_, cx, b)| (cx, b.rect.x));
            row.into_iter().map(|(_, _, b)| b)
        })
        .collect()
}

/// Number boxes 1..N across the document.
///
/// Pages are ordered individually and concatenated, then `swaps`
/// (`[position, takes_from]`, 1-based) rearrange the sequence so that
/// known layout quirks line up with the Word field order.
pub fn assign_positions(
    pages: Vec<Vec<DetectedBox>>,
    swaps: &[[usize; 2]],
    tolerance: u32,
) -> Vec<PlacedBox> {
    let sequence: Vec<(usize, DetectedBox)> = pages
        .into_iter()
        .enumerate()
        .flat_map(|(page, boxes)| {
            order_page(boxes, tolerance)
                .into_iter()
                .map(move |b| (page, b))
        })
        .collect();

    let mut ordered = sequence.clone();
    for &[position, takes_from] in swaps {
        let in_range = |p: usize| p >= 1 && p <= sequence.len();
        if !in_range(position) || !in_range(takes_from) {
            tracing::warn!(position, takes_from, found = sequence.len(), "swap out of range, skipped");
            continue;
        }
        ordered[position - 1] = sequence[takes_from - 1];
    }

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, (page, detected))| PlacedBox {
            page,
            position: i + 1,
            detected,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkbox::geometry::BoxRect;

    fn b(x: u32, y: u32) -> DetectedBox {
        DetectedBox {
            rect: BoxRect::new(x, y, 30, 30),
            fill_ratio: 0.0,
            checked: false,
        }
    }

    fn xs(boxes: &[DetectedBox]) -> Vec<u32> {
        boxes.iter().map(|b| b.rect.x).collect()
    }

    #[test]
    fn test_rows_tolerate_skew() {
        // Second box sits 20px lower but belongs to the same row.
        let ordered = order_page(vec![b(300, 120), b(100, 100), b(200, 300)], 25);
        assert_eq!(xs(&ordered), vec![100, 300, 200]);
    }

    #[test]
    fn test_row_tolerance_measured_from_first_box() {
        // 140 is within 25 of 120 but 40 from the row's first box at 100.
        let ordered = order_page(vec![b(50, 140), b(200, 120), b(300, 100)], 25);
        assert_eq!(xs(&ordered), vec![200, 300, 50]);
    }

    #[test]
    fn test_pages_are_concatenated() {
        let placed = assign_positions(vec![vec![b(200, 10), b(10, 10)], vec![b(10, 10)]], &[], 25);
        let got: Vec<(usize, usize, u32)> = placed
            .iter()
            .map(|p| (p.position, p.page, p.detected.rect.x))
            .collect();
        assert_eq!(got, vec![(1, 0, 10), (2, 0, 200), (3, 1, 10)]);
    }

    #[test]
    fn test_swaps_read_from_original_sequence() {
        let row: Vec<DetectedBox> = (0..5).map(|i| b(10 + i * 50, 10)).collect();
        let placed = assign_positions(vec![row], &[[2, 4], [3, 2], [4, 3]], 25);
        let got: Vec<u32> = placed.iter().map(|p| p.detected.rect.x).collect();
        assert_eq!(got, vec![10, 160, 60, 110, 210]);
        assert_eq!(placed[1].position, 2);
    }

    #[test]
    fn test_out_of_range_swap_ignored() {
        let placed = assign_positions(vec![vec![b(10, 10), b(60, 10)]], &[[1, 9]], 25);
        assert_eq!(placed[0].detected.rect.x, 10);
    }
}
