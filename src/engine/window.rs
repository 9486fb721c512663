//! Turning a scroll offset into the records to draw.

use crate::record::RecordId;

use super::height_index::HeightIndex;

/// Default overscan multiplier applied to the viewport height.
pub const DEFAULT_OVERSCAN: u64 = 3;

/// Inputs for one window computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowParams {
    pub scroll_offset: u64,
    pub viewport_height: u64,
    /// Smallest possible item height; bounds the rendered-item cap.
    pub field_height: u64,
    pub overscan: u64,
}

impl WindowParams {
    /// Hard cap on emitted items: `ceil(viewport / field_height) * overscan`.
    pub fn max_items(&self) -> usize {
        let per_screen = self.viewport_height.div_ceil(self.field_height.max(1));
        usize::try_from(per_screen.saturating_mul(self.overscan)).unwrap_or(usize::MAX)
    }

    /// Content offset past which no new item is started.
    pub const fn overscan_limit(&self) -> u64 {
        self.scroll_offset
            .saturating_add(self.viewport_height.saturating_mul(self.overscan))
    }
}

/// One record to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowItem {
    /// Position in the filtered view.
    pub position: usize,
    pub id: RecordId,
    /// Top edge relative to the viewport top; negative when the record is
    /// partly scrolled off.
    pub top: i64,
    pub height: u64,
}

impl WindowItem {
    /// Bottom edge relative to the viewport top.
    pub fn bottom(&self) -> i64 {
        self.top.saturating_add(i64::try_from(self.height).unwrap_or(i64::MAX))
    }
}

/// First filtered position whose bottom edge lies past `scroll_offset`,
/// i.e. the record straddling or starting at the viewport top. Returns
/// `len` when the offset is past the end. O(log n).
pub fn first_visible(index: &HeightIndex, len: usize, scroll_offset: u64) -> usize {
    index.position_at(scroll_offset).min(len)
}

/// The minimal contiguous run of filtered records that can intersect the
/// overscanned viewport, each with its offset relative to the viewport top.
///
/// Heights come from the committed index leaves, which hold the memoized
/// per-record heights for exactly this id list.
pub fn window(params: &WindowParams, ids: &[RecordId], index: &HeightIndex) -> Vec<WindowItem> {
    let len = ids.len().min(index.capacity());
    let max_items = params.max_items();
    if len == 0 || max_items == 0 {
        return Vec::new();
    }

    let start = first_visible(index, len, params.scroll_offset);
    let limit = params.overscan_limit();
    let scroll = i64::try_from(params.scroll_offset).unwrap_or(i64::MAX);
    let mut cumulative = index.offset_of(start);
    let mut items = Vec::with_capacity(max_items.min(len - start));

    for (position, &id) in ids.iter().enumerate().take(len).skip(start) {
        let height = index.get(position);
        let top = i64::try_from(cumulative).unwrap_or(i64::MAX) - scroll;
        items.push(WindowItem {
            position,
            id,
            top,
            height,
        });
        cumulative += height;
        if items.len() >= max_items || cumulative > limit {
            break;
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<RecordId> {
        (0..n)
            .map(|i| {
                let mut bytes = [0u8; 16];
                bytes[..8].copy_from_slice(&(i as u64).to_le_bytes());
                RecordId::from_random_bytes(bytes)
            })
            .collect()
    }

    fn params(scroll_offset: u64, viewport_height: u64) -> WindowParams {
        WindowParams {
            scroll_offset,
            viewport_height,
            field_height: 10,
            overscan: DEFAULT_OVERSCAN,
        }
    }

    #[test]
    fn test_first_visible_picks_straddling_item() {
        let index = HeightIndex::from_heights(&[30, 30, 30]);
        assert_eq!(first_visible(&index, 3, 0), 0);
        assert_eq!(first_visible(&index, 3, 29), 0);
        assert_eq!(first_visible(&index, 3, 30), 1);
        assert_eq!(first_visible(&index, 3, 45), 1);
        assert_eq!(first_visible(&index, 3, 90), 3);
    }

    #[test]
    fn test_window_positions_relative_to_scroll() {
        let index = HeightIndex::from_heights(&[30, 20, 40, 10]);
        let items = window(&params(35, 20), &ids(4), &index);
        let summary: Vec<_> = items.iter().map(|i| (i.position, i.top)).collect();
        assert_eq!(summary, vec![(1, -5), (2, 15), (3, 55)]);
    }

    #[test]
    fn test_window_stops_past_overscan_limit() {
        let index = HeightIndex::from_heights(&[10; 100]);
        let p = WindowParams {
            field_height: 5,
            ..params(0, 20)
        };
        assert_eq!(p.max_items(), 12);
        let items = window(&p, &ids(100), &index);
        // limit = 60: the item starting at 60 is the last one drawn
        assert_eq!(items.len(), 7);
        assert_eq!(items.last().map(|i| i.top), Some(60));
    }

    #[test]
    fn test_window_respects_item_cap() {
        let index = HeightIndex::from_heights(&[1; 100]);
        let p = WindowParams {
            scroll_offset: 0,
            viewport_height: 20,
            field_height: 10,
            overscan: 3,
        };
        assert_eq!(p.max_items(), 6);
        assert_eq!(window(&p, &ids(100), &index).len(), 6);
    }

    #[test]
    fn test_degenerate_inputs_render_nothing() {
        let index = HeightIndex::from_heights(&[10, 10]);
        assert!(window(&params(0, 0), &ids(2), &index).is_empty());
        assert!(window(&params(0, 50), &[], &HeightIndex::new(0)).is_empty());
        assert!(window(&params(500, 50), &ids(2), &index).is_empty());
    }

    #[test]
    fn test_window_is_contiguous_and_ascending() {
        let heights: Vec<u64> = (0..50).map(|i| 10 * (1 + i % 4)).collect();
        let index = HeightIndex::from_heights(&heights);
        let items = window(&params(333, 40), &ids(50), &index);
        assert!(!items.is_empty());
        for pair in items.windows(2) {
            assert_eq!(pair[1].position, pair[0].position + 1);
            assert_eq!(pair[1].top, pair[0].bottom());
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn items_stay_inside_overscanned_viewport(
                units in proptest::collection::vec(1..6u64, 0..300),
                scroll in 0..5000u64,
                viewport in 0..400u64,
            ) {
                let heights: Vec<u64> = units.iter().map(|u| u * 10).collect();
                let index = HeightIndex::from_heights(&heights);
                let p = params(scroll, viewport);
                let items = window(&p, &ids(heights.len()), &index);
                let limit = i64::try_from(viewport * p.overscan).unwrap();
                for item in &items {
                    prop_assert!(item.bottom() > 0, "bottom edge above viewport top");
                    prop_assert!(item.top <= limit, "top edge beyond overscan");
                }
                prop_assert!(items.len() <= p.max_items());
            }

            #[test]
            fn first_item_covers_scroll_offset(
                units in proptest::collection::vec(1..6u64, 1..300),
                scroll in 0..5000u64,
            ) {
                let heights: Vec<u64> = units.iter().map(|u| u * 10).collect();
                let index = HeightIndex::from_heights(&heights);
                let items = window(&params(scroll, 100), &ids(heights.len()), &index);
                if scroll < index.total_height() {
                    let first = items.first().copied().unwrap();
                    prop_assert!(first.top <= 0 && first.bottom() > 0);
                } else {
                    prop_assert!(items.is_empty());
                }
            }
        }
    }
}
