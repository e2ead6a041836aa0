//! Viewport packing for fullscreen mode
//!
//! Given measured surface sizes and the viewport, decide which surfaces
//! are visible and where they go. Surfaces are ordered by how recently
//! their content changed; when everything no longer fits, the
//! least-recently-updated surfaces are shed first. The packer is a pure
//! function of its inputs; all state (sequence counters, measurement
//! cache) is owned by the caller and handed in explicitly.

use crate::measure::Size;
use ratatui::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PackOptions {
    /// Column count is `viewport.width / min_column_width`, floored, at
    /// least one.
    pub min_column_width: u16,
    /// Vertical gap charged between two surfaces in the same column.
    pub gap: u16,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            min_column_width: 40,
            gap: 1,
        }
    }
}

impl PackOptions {
    pub fn column_count(&self, viewport: Viewport) -> u16 {
        (viewport.width / self.min_column_width.max(1)).max(1)
    }
}

/// One surface offered to the packer.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub name: String,
    /// Monotonic sequence assigned by the store when the surface's forest
    /// reference last changed.
    pub seq: u64,
    /// Last known off-screen measurement; `None` means not yet measured
    /// (or invalidated by a newer seq), which makes the surface
    /// ineligible.
    pub measurement: Option<Size>,
}

/// Decide the visible set, ordered oldest update first.
///
/// Candidates without a measurement, or whose measurement exceeds the
/// viewport in either dimension on its own, are excluded regardless of
/// recency. The rest are walked oldest to newest; whenever the running set
/// stops fitting, the oldest member is dropped, and if the set is down to
/// only the newcomer and still does not fit, the newcomer goes too.
pub fn pack(candidates: &[Candidate], viewport: Viewport, options: &PackOptions) -> Vec<String> {
    let mut eligible: Vec<(&str, Size, u64)> = candidates
        .iter()
        .filter_map(|c| {
            let m = c.measurement?;
            if m.width <= viewport.width && m.height <= viewport.height {
                Some((c.name.as_str(), m, c.seq))
            } else {
                None
            }
        })
        .collect();
    eligible.sort_by_key(|(_, _, seq)| *seq);

    let columns = options.column_count(viewport) as usize;
    let mut visible: std::collections::VecDeque<(&str, Size)> = std::collections::VecDeque::new();
    for (name, size, _) in eligible {
        visible.push_back((name, size));
        while !fits(visible.iter().map(|(_, s)| *s), columns, viewport, options) {
            visible.pop_front();
            if visible.is_empty() {
                break;
            }
        }
    }
    visible.into_iter().map(|(name, _)| name.to_string()).collect()
}

/// Simulate greedy shortest-column-first placement; true when no column
/// overruns the viewport height.
fn fits(
    sizes: impl Iterator<Item = Size>,
    columns: usize,
    viewport: Viewport,
    options: &PackOptions,
) -> bool {
    let mut heights = vec![0u32; columns];
    for size in sizes {
        let column = shortest_column(&heights);
        let mut total = heights[column];
        if total > 0 {
            total += options.gap as u32;
        }
        total += size.height as u32;
        if total > viewport.height as u32 {
            return false;
        }
        heights[column] = total;
    }
    true
}

/// First index holding the minimum accumulated height.
fn shortest_column(heights: &[u32]) -> usize {
    let mut best = 0;
    for (index, height) in heights.iter().enumerate() {
        if *height < heights[best] {
            best = index;
        }
    }
    best
}

/// Assign screen rectangles to an already-packed visible set, using the
/// same greedy placement the fit check simulated.
pub fn place(
    visible: &[(String, Size)],
    viewport: Viewport,
    options: &PackOptions,
) -> Vec<(String, Rect)> {
    let columns = options.column_count(viewport);
    let column_width = viewport.width / columns;
    let mut heights = vec![0u32; columns as usize];
    let mut placed = Vec::with_capacity(visible.len());
    for (name, size) in visible {
        let column = shortest_column(&heights);
        let mut y = heights[column];
        if y > 0 {
            y += options.gap as u32;
        }
        let height = size.height.min(viewport.height.saturating_sub(y as u16));
        placed.push((
            name.clone(),
            Rect::new(column as u16 * column_width, y as u16, column_width, height),
        ));
        heights[column] = y + size.height as u32;
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, seq: u64, size: Option<(u16, u16)>) -> Candidate {
        Candidate {
            name: name.to_string(),
            seq,
            measurement: size.map(|(w, h)| Size::new(w, h)),
        }
    }

    #[test]
    fn test_sheds_oldest_until_fit() {
        // Heights 300/400/500, gap 16, one column of height 700: 300+400
        // already needs 716, 400+500 needs 916, so only the most recent
        // surface survives.
        let candidates = vec![
            candidate("a", 1, Some((50, 300))),
            candidate("b", 2, Some((50, 400))),
            candidate("c", 3, Some((50, 500))),
        ];
        let options = PackOptions { min_column_width: 100, gap: 16 };
        let visible = pack(&candidates, Viewport::new(100, 700), &options);
        assert_eq!(visible, vec!["c"]);
    }

    #[test]
    fn test_all_fit_in_recency_order() {
        let candidates = vec![
            candidate("newest", 9, Some((50, 100))),
            candidate("oldest", 1, Some((50, 100))),
        ];
        let options = PackOptions { min_column_width: 100, gap: 1 };
        let visible = pack(&candidates, Viewport::new(100, 300), &options);
        assert_eq!(visible, vec!["oldest", "newest"]);
    }

    #[test]
    fn test_oversized_width_never_included() {
        let candidates = vec![
            candidate("wide", 10, Some((200, 10))),
            candidate("tall", 11, Some((50, 999))),
            candidate("ok", 1, Some((50, 10))),
        ];
        let options = PackOptions::default();
        let visible = pack(&candidates, Viewport::new(100, 50), &options);
        assert_eq!(visible, vec!["ok"]);
    }

    #[test]
    fn test_unmeasured_is_ineligible() {
        let candidates = vec![
            candidate("pending", 5, None),
            candidate("ready", 1, Some((10, 10))),
        ];
        let visible = pack(&candidates, Viewport::new(100, 50), &PackOptions::default());
        assert_eq!(visible, vec!["ready"]);
    }

    #[test]
    fn test_two_columns_balance_greedily() {
        // 100-wide viewport with min column width 50 gives two columns.
        let candidates = vec![
            candidate("a", 1, Some((40, 30))),
            candidate("b", 2, Some((40, 10))),
            candidate("c", 3, Some((40, 10))),
        ];
        let options = PackOptions { min_column_width: 50, gap: 1 };
        let viewport = Viewport::new(100, 40);
        let visible = pack(&candidates, viewport, &options);
        assert_eq!(visible, vec!["a", "b", "c"]);

        let sized: Vec<(String, Size)> = vec![
            ("a".into(), Size::new(40, 30)),
            ("b".into(), Size::new(40, 10)),
            ("c".into(), Size::new(40, 10)),
        ];
        let placed = place(&sized, viewport, &options);
        // a fills column 0; b goes to the empty column 1; c lands below b
        // because column 1 is now the shorter one.
        assert_eq!(placed[0].1, Rect::new(0, 0, 50, 30));
        assert_eq!(placed[1].1, Rect::new(50, 0, 50, 10));
        assert_eq!(placed[2].1, Rect::new(50, 11, 50, 10));
    }

    #[test]
    fn test_empty_input() {
        assert!(pack(&[], Viewport::new(80, 24), &PackOptions::default()).is_empty());
    }

    #[test]
    fn test_degenerate_viewport_sheds_everything() {
        let candidates = vec![candidate("a", 1, Some((10, 10)))];
        let visible = pack(&candidates, Viewport::new(20, 0), &PackOptions::default());
        assert!(visible.is_empty());
    }
}
