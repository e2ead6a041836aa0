//! Draw routines for resolved nodes
//!
//! A total mapping from node kind to buffer drawing. Recursion goes
//! through a caller-supplied child callback, so subtrees can be embedded
//! (or stubbed in tests) without any global coupling. Unresolved bindings
//! draw as empty/fallback markers, never as errors.

use crate::forest::{Alignment, Distribution, NodeKind, ResolvedNode};
use crate::binding::Display;
use crate::measure::{measure_node, wrap_lines, ICON_GLYPH};
use crate::theme::Theme;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::{Block, Widget};

pub const EMPTY_CARD_MARKER: &str = "(empty)";

/// Callback used to draw a child subtree.
pub type ChildRender<'a> = dyn Fn(&ResolvedNode, Rect, &mut Buffer) + 'a;

/// Render a surface's forest into an area, roots stacked top to bottom.
pub fn render_forest(forest: &[ResolvedNode], area: Rect, buf: &mut Buffer, theme: &Theme) {
    let mut y = area.y;
    for node in forest {
        if y >= area.bottom() {
            break;
        }
        let size = measure_node(node, area.width);
        let height = size.height.min(area.bottom() - y);
        render_tree(node, Rect::new(area.x, y, area.width, height), buf, theme);
        y = y.saturating_add(height);
    }
}

/// Render a node and its whole subtree with the default recursion.
pub fn render_tree(node: &ResolvedNode, area: Rect, buf: &mut Buffer, theme: &Theme) {
    render_node(node, area, buf, theme, &|child, child_area, child_buf| {
        render_tree(child, child_area, child_buf, theme);
    });
}

/// Render one node, delegating children to `child_render`.
pub fn render_node(
    node: &ResolvedNode,
    area: Rect,
    buf: &mut Buffer,
    theme: &Theme,
    child_render: &ChildRender,
) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    match &node.kind {
        NodeKind::Column { gap, alignment } => {
            let mut y = area.y;
            for (index, child) in node.children.iter().enumerate() {
                if y >= area.bottom() {
                    break;
                }
                let size = measure_node(child, area.width);
                let height = size.height.min(area.bottom() - y);
                let width = match alignment {
                    Alignment::Stretch => area.width,
                    _ => size.width.min(area.width).max(1),
                };
                let x = match alignment {
                    Alignment::Center => area.x + (area.width - width) / 2,
                    Alignment::End => area.x + area.width - width,
                    _ => area.x,
                };
                child_render(child, Rect::new(x, y, width, height), buf);
                y = y.saturating_add(height);
                if index + 1 < node.children.len() {
                    y = y.saturating_add(gap.cells());
                }
            }
        }
        NodeKind::Row { gap, alignment, distribution } => {
            let sizes: Vec<_> = node
                .children
                .iter()
                .map(|c| measure_node(c, area.width))
                .collect();
            let count = sizes.len() as u16;
            let content: u16 = sizes
                .iter()
                .map(|s| s.width)
                .fold(0u16, |acc, w| acc.saturating_add(w))
                .saturating_add(gap.cells().saturating_mul(count.saturating_sub(1)));
            let leftover = area.width.saturating_sub(content);
            let (lead, between) = match distribution {
                Distribution::Start => (0, 0),
                Distribution::Center => (leftover / 2, 0),
                Distribution::End => (leftover, 0),
                Distribution::SpaceBetween => (0, leftover.checked_div(count.saturating_sub(1)).unwrap_or(0)),
                Distribution::SpaceAround => (
                    leftover.checked_div(count * 2).unwrap_or(0),
                    leftover.checked_div(count).unwrap_or(0),
                ),
                Distribution::SpaceEvenly => {
                    let share = leftover / (count + 1);
                    (share, share)
                }
            };
            let mut x = area.x.saturating_add(lead);
            for (index, (child, size)) in node.children.iter().zip(&sizes).enumerate() {
                if x >= area.right() {
                    break;
                }
                let width = size.width.min(area.right() - x).max(1);
                let height = match alignment {
                    Alignment::Stretch => area.height,
                    _ => size.height.min(area.height),
                };
                let y = match alignment {
                    Alignment::Center => area.y + (area.height - height) / 2,
                    Alignment::End => area.y + area.height - height,
                    _ => area.y,
                };
                child_render(child, Rect::new(x, y, width, height), buf);
                x = x.saturating_add(width);
                if index + 1 < node.children.len() {
                    x = x.saturating_add(gap.cells()).saturating_add(between);
                }
            }
        }
        NodeKind::Card => {
            let block = Block::bordered().border_style(theme.card_border);
            let inner = block.inner(area);
            block.render(area, buf);
            match node.children.first() {
                Some(child) if inner.width > 0 && inner.height > 0 => {
                    child_render(child, inner, buf);
                }
                Some(_) => {}
                None => {
                    if inner.width > 0 && inner.height > 0 {
                        buf.set_stringn(
                            inner.x,
                            inner.y,
                            EMPTY_CARD_MARKER,
                            inner.width as usize,
                            theme.fallback,
                        );
                    }
                }
            }
        }
        NodeKind::Divider => {
            let rule = "\u{2500}".repeat(area.width as usize);
            buf.set_stringn(area.x, area.y, &rule, area.width as usize, theme.divider);
        }
        NodeKind::Text { text, hint } => {
            // An unresolved binding is shown as empty, not as an error.
            let content = text.resolved().unwrap_or("");
            let style = theme.text_style(*hint);
            for (row, line) in wrap_lines(content, area.width).iter().enumerate() {
                if row as u16 >= area.height {
                    break;
                }
                buf.set_stringn(area.x, area.y + row as u16, line, area.width as usize, style);
            }
        }
        NodeKind::Icon { name, .. } => {
            let label = name.as_ref().and_then(|n| n.resolved());
            match label {
                Some(text) => {
                    let line = format!("{} {}", ICON_GLYPH, text);
                    buf.set_stringn(area.x, area.y, &line, area.width as usize, theme.icon);
                }
                None => {
                    buf.set_stringn(area.x, area.y, ICON_GLYPH, area.width as usize, theme.fallback);
                }
            }
        }
        NodeKind::Image { source, alt, .. } => {
            let block = Block::bordered().border_style(theme.image_frame);
            let inner = block.inner(area);
            block.render(area, buf);
            if inner.width == 0 || inner.height == 0 {
                return;
            }
            let mut alt_drawn = false;
            if let Some(text) = alt.as_ref().and_then(|a| a.resolved()) {
                buf.set_stringn(inner.x, inner.y, text, inner.width as usize, theme.fallback);
                alt_drawn = true;
            }
            // The source line keeps the bottom row; with a single inner row
            // the alt text wins.
            if !alt_drawn || inner.height > 1 {
                let (line, style) = match source {
                    Display::Resolved(url) => (url.as_str(), theme.image_url),
                    Display::Unresolved(pointer) => (pointer.as_str(), theme.fallback),
                };
                let last_row = inner.y + inner.height - 1;
                buf.set_stringn(inner.x, last_row, line, inner.width as usize, style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::build;
    use crate::schema::parse_components;
    use serde_json::{json, Value};

    fn forest(raw: Value) -> Vec<ResolvedNode> {
        let list = raw.as_array().expect("array fixture").clone();
        build(&parse_components(&list), &Value::Null)
    }

    fn draw(nodes: &[ResolvedNode], width: u16, height: u16) -> Buffer {
        let mut buf = Buffer::empty(Rect::new(0, 0, width, height));
        render_forest(nodes, buf.area, &mut buf, &Theme::default());
        buf
    }

    fn row(buf: &Buffer, y: u16) -> String {
        let area = buf.area;
        let mut text = String::new();
        for x in area.x..area.right() {
            text.push_str(buf.cell((x, y)).expect("cell in range").symbol());
        }
        text.trim_end().to_string()
    }

    #[test]
    fn test_text_renders_wrapped() {
        let nodes = forest(json!([
            {"id": "t", "component": {"Text": {"text": "alpha beta"}}}
        ]));
        let buf = draw(&nodes, 6, 2);
        assert_eq!(row(&buf, 0), "alpha");
        assert_eq!(row(&buf, 1), "beta");
    }

    #[test]
    fn test_unresolved_text_renders_empty() {
        let nodes = forest(json!([
            {"id": "t", "component": {"Text": {"text": {"path": "/nope"}}}}
        ]));
        let buf = draw(&nodes, 10, 1);
        assert_eq!(row(&buf, 0), "");
    }

    #[test]
    fn test_empty_card_shows_marker() {
        let nodes = forest(json!([
            {"id": "card", "component": {"Card": {}}}
        ]));
        let buf = draw(&nodes, 12, 3);
        assert!(row(&buf, 1).contains(EMPTY_CARD_MARKER));
    }

    #[test]
    fn test_divider_draws_rule() {
        let nodes = forest(json!([
            {"id": "d", "component": {"Divider": {}}}
        ]));
        let buf = draw(&nodes, 4, 1);
        assert_eq!(row(&buf, 0), "────");
    }

    #[test]
    fn test_column_stacks_children_in_order() {
        let nodes = forest(json!([
            {"id": "col", "component": {"Column": {"children": {"explicitList": ["a", "b"]}}}},
            {"id": "a", "component": {"Text": {"text": "first"}}},
            {"id": "b", "component": {"Text": {"text": "second"}}}
        ]));
        let buf = draw(&nodes, 10, 2);
        assert_eq!(row(&buf, 0), "first");
        assert_eq!(row(&buf, 1), "second");
    }

    #[test]
    fn test_row_places_children_left_to_right() {
        let nodes = forest(json!([
            {"id": "row", "component": {"Row": {"children": {"explicitList": ["a", "b"]}, "gap": "small"}}},
            {"id": "a", "component": {"Text": {"text": "ab"}}},
            {"id": "b", "component": {"Text": {"text": "cd"}}}
        ]));
        let buf = draw(&nodes, 10, 1);
        assert_eq!(row(&buf, 0), "ab cd");
    }

    #[test]
    fn test_icon_renders_glyph_and_name() {
        let nodes = forest(json!([
            {"id": "i", "component": {"Icon": {"name": {"literal": "sun"}}}}
        ]));
        let buf = draw(&nodes, 10, 1);
        assert_eq!(row(&buf, 0), format!("{} sun", ICON_GLYPH));
    }

    #[test]
    fn test_image_shows_url_and_alt() {
        let nodes = forest(json!([
            {"id": "img", "component": {"Image": {
                "url": "pic.png", "altText": "a cat", "usageHint": "icon"}}}
        ]));
        let buf = draw(&nodes, 12, 3);
        assert!(row(&buf, 1).contains("a cat"));
    }

    #[test]
    fn test_child_render_callback_is_used() {
        let nodes = forest(json!([
            {"id": "col", "component": {"Column": {"children": {"explicitList": ["a"]}}}},
            {"id": "a", "component": {"Text": {"text": "ignored"}}}
        ]));
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 2));
        let seen = std::cell::RefCell::new(Vec::new());
        render_node(
            &nodes[0],
            buf.area,
            &mut buf,
            &Theme::default(),
            &|child, _, _| seen.borrow_mut().push(child.id.clone()),
        );
        assert_eq!(seen.into_inner(), vec!["a"]);
        // Nothing was drawn because the stub swallowed the child.
        assert_eq!(row(&buf, 0), "");
    }
}
