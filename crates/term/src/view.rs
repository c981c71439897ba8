//! HostView: paints the mounted element tree onto a screen.
//!
//! The view only knows the element conventions of the top-level component
//! (a keyed `board` element carrying `data-cols`/`data-rows`, one child per
//! cell with an optional `data-kind`, and a keyed `sidebar` of text lines).
//! It never sees game state. This module is pure (no I/O).

use bridge_tetris_bridge::{HostHandle, InstanceTree};
use bridge_tetris_types::PieceKind;
use bridge_tetris_vdom::PropValue;

use crate::screen::{Ink, Rgb, Screen, Weight};

/// Terminal viewport dimensions.
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

const BOARD_BG: Rgb = Rgb(30, 30, 40);
const BORDER: Ink = Ink::fg(Rgb(128, 128, 128));

/// Lays out the board with a border and the sidebar to its right.
#[derive(Debug, Clone, Copy)]
pub struct HostView {
    /// Board cell width in terminal columns
    cell_w: u16,
}

impl Default for HostView {
    fn default() -> Self {
        // 2 columns per cell compensates for the usual glyph aspect ratio
        Self { cell_w: 2 }
    }
}

impl HostView {
    pub fn new(cell_w: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
        }
    }

    /// Paint everything mounted under `container` onto `screen`, which is
    /// first reset to the viewport size.
    pub fn paint(
        &self,
        tree: &InstanceTree,
        container: HostHandle,
        viewport: Viewport,
        screen: &mut Screen,
    ) {
        screen.reset(viewport.width, viewport.height);

        let Some(board) = tree.find_by_key(container, "board") else {
            return;
        };
        let cols = int_prop(tree, board, "data-cols").unwrap_or(0);
        let rows = int_prop(tree, board, "data-rows").unwrap_or(0);

        let frame_w = cols.saturating_mul(self.cell_w).saturating_add(2);
        let frame_h = rows.saturating_add(2);
        let start_x = viewport.width.saturating_sub(frame_w) / 2;
        let start_y = viewport.height.saturating_sub(frame_h) / 2;

        draw_border(screen, start_x, start_y, frame_w, frame_h);

        for (i, &cell) in tree.children(board).iter().enumerate() {
            let (x, y) = cell_position(tree, cell, i, cols);
            let px = start_x
                .saturating_add(1)
                .saturating_add(x.saturating_mul(self.cell_w));
            let py = start_y.saturating_add(1).saturating_add(y);

            let kind = match tree.prop(cell, "data-kind") {
                Some(PropValue::Str(letter)) => PieceKind::from_str(letter),
                _ => None,
            };
            let (ch, ink) = match kind {
                Some(kind) if class_has(tree, cell, "active") => {
                    ('█', Ink::on(piece_color(kind), BOARD_BG).weight(Weight::Bold))
                }
                Some(kind) => ('█', Ink::on(piece_color(kind), BOARD_BG)),
                None => ('·', Ink::on(Rgb(90, 90, 100), BOARD_BG).weight(Weight::Dim)),
            };
            screen.hline(px, py, self.cell_w, ch, ink);
        }

        if let Some(sidebar) = tree.find_by_key(container, "sidebar") {
            let x = start_x.saturating_add(frame_w).saturating_add(2);
            self.paint_sidebar(tree, sidebar, x, start_y, screen);
        }
    }

    fn paint_sidebar(
        &self,
        tree: &InstanceTree,
        sidebar: HostHandle,
        x: u16,
        mut y: u16,
        screen: &mut Screen,
    ) {
        let value = Ink::fg(Rgb(200, 200, 200));
        let status = Ink::fg(Rgb(255, 255, 255)).weight(Weight::Bold);

        for &line in tree.children(sidebar) {
            let ink = if class_has(tree, line, "status") {
                status
            } else {
                value
            };
            screen.write(x, y, &tree.text_content(line), ink);
            y = y.saturating_add(2);
        }
    }
}

fn int_prop(tree: &InstanceTree, handle: HostHandle, name: &str) -> Option<u16> {
    match tree.prop(handle, name)? {
        PropValue::Int(value) => u16::try_from(*value).ok(),
        _ => None,
    }
}

fn class_has(tree: &InstanceTree, handle: HostHandle, class: &str) -> bool {
    match tree.prop(handle, "class") {
        Some(PropValue::Str(classes)) => classes.split_whitespace().any(|c| c == class),
        _ => false,
    }
}

/// Board position from an `"x,y"` key, falling back to row-major order
fn cell_position(tree: &InstanceTree, cell: HostHandle, index: usize, cols: u16) -> (u16, u16) {
    use bridge_tetris_bridge::InstanceKind;

    let from_key = tree.get(cell).and_then(|instance| match &instance.kind {
        InstanceKind::Element { key: Some(key), .. } => {
            let (x, y) = key.split_once(',')?;
            Some((x.parse().ok()?, y.parse().ok()?))
        }
        _ => None,
    });
    from_key.unwrap_or_else(|| {
        let cols = usize::from(cols.max(1));
        ((index % cols) as u16, (index / cols) as u16)
    })
}

fn draw_border(screen: &mut Screen, x: u16, y: u16, w: u16, h: u16) {
    if w < 2 || h < 2 {
        return;
    }
    let (right, bottom) = (x.saturating_add(w - 1), y.saturating_add(h - 1));
    let (inner_x, inner_y) = (x.saturating_add(1), y.saturating_add(1));

    screen.hline(inner_x, y, w - 2, '─', BORDER);
    screen.hline(inner_x, bottom, w - 2, '─', BORDER);
    screen.vline(x, inner_y, h - 2, '│', BORDER);
    screen.vline(right, inner_y, h - 2, '│', BORDER);
    screen.plot(x, y, '┌', BORDER);
    screen.plot(right, y, '┐', BORDER);
    screen.plot(x, bottom, '└', BORDER);
    screen.plot(right, bottom, '┘', BORDER);
}

fn piece_color(kind: PieceKind) -> Rgb {
    match kind {
        PieceKind::I => Rgb(80, 220, 220),
        PieceKind::O => Rgb(240, 220, 80),
        PieceKind::T => Rgb(200, 120, 220),
        PieceKind::S => Rgb(100, 220, 120),
        PieceKind::Z => Rgb(220, 80, 80),
        PieceKind::J => Rgb(80, 120, 220),
        PieceKind::L => Rgb(255, 165, 0),
    }
}
