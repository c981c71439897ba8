//! Top-level component render
//!
//! [`render_app`] is a pure function from a game state to a fresh element
//! tree. Board cells are keyed `"x,y"` so their identity is stable across
//! renders and the reconciler only touches cells whose contents changed.

use bridge_tetris_core::GameState;
use bridge_tetris_types::Cell;

use crate::node::{HostElement, VNode};

/// Key of the root element
pub const APP_KEY: &str = "app";
/// Key of the board container
pub const BOARD_KEY: &str = "board";
/// Identity of the sidebar component
pub const SIDEBAR: &str = "Sidebar";

/// Listener names used by the root element
pub const KEY_DOWN_EVENT: &str = "keydown";
pub const KEY_UP_EVENT: &str = "keyup";

/// Key of the board cell at (x, y)
pub fn cell_key(x: i16, y: i16) -> String {
    format!("{x},{y}")
}

/// Render the whole application for the current game state.
pub fn render_app(state: &GameState) -> VNode {
    HostElement::new("div")
        .with_key(APP_KEY)
        .with_prop("id", APP_KEY)
        .with_prop("class", "tetris")
        .with_prop("tabindex", 0i64)
        .with_listener("onKeyDown", KEY_DOWN_EVENT)
        .with_listener("onKeyUp", KEY_UP_EVENT)
        .with_child(render_board(state))
        .with_child(VNode::component(SIDEBAR, render_sidebar(state)))
        .into()
}

fn render_board(state: &GameState) -> HostElement {
    let (width, height) = (state.width(), state.height());
    let active = state.active().map(|piece| piece.cells());

    let cells = (0..height).flat_map(|y| (0..width).map(move |x| (x, y)));
    let cells = cells.map(|(x, y)| {
        let is_active = active.is_some_and(|cells| cells.contains(&(x, y)));
        // Coordinates come from the board's own dimensions
        let cell = state.visible_cell(x, y).unwrap_or(Cell::Empty);
        render_cell(x, y, cell, is_active)
    });

    HostElement::new("div")
        .with_key(BOARD_KEY)
        .with_prop("class", "board")
        .with_prop("data-cols", width as i64)
        .with_prop("data-rows", height as i64)
        .with_prop(
            "style",
            format!(
                "display: grid; grid-template: repeat({height}, 1em) / repeat({width}, 1em); \
                 border: 1px solid grey"
            ),
        )
        .with_children(cells)
}

fn render_cell(x: i16, y: i16, cell: Cell, is_active: bool) -> HostElement {
    let class = match (cell, is_active) {
        (Cell::Empty, _) => "cell",
        (Cell::Filled(_), false) => "cell filled",
        (Cell::Filled(_), true) => "cell active",
    };
    let letter = cell.kind().map(|kind| kind.letter()).unwrap_or("");

    let element = HostElement::new("div")
        .with_key(cell_key(x, y))
        .with_prop("class", class);
    let element = match cell.kind() {
        Some(kind) => element.with_prop("data-kind", kind.letter()),
        None => element,
    };
    element.with_child(letter)
}

fn render_sidebar(state: &GameState) -> HostElement {
    let next = state.next_piece().map(|kind| kind.letter()).unwrap_or("-");
    let line = |key: &str, text: String| HostElement::new("div").with_key(key).with_child(text);

    let sidebar = HostElement::new("div")
        .with_key("sidebar")
        .with_prop("class", "sidebar")
        .with_child(line("score", format!("Score: {}", state.score())))
        .with_child(line("level", format!("Level: {}", state.level())))
        .with_child(line("lines", format!("Lines: {}", state.lines())))
        .with_child(line("next", format!("Next: {next}")));

    let status = if state.is_game_over() {
        Some("GAME OVER")
    } else if state.paused() {
        Some("PAUSED")
    } else {
        None
    };
    match status {
        Some(text) => sidebar.with_child(
            line("status", text.to_string()).with_prop("class", "status"),
        ),
        None => sidebar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_tetris_core::{Board, PieceQueue, Rules};
    use bridge_tetris_types::{GameAction, PieceKind};

    fn scripted(pieces: &[PieceKind]) -> GameState {
        let board = Board::new(10, 25).unwrap();
        GameState::from_parts(board, PieceQueue::scripted(3, pieces), Rules::default())
    }

    fn board_cells(tree: &VNode) -> &[VNode] {
        tree.children()[0].children()
    }

    fn find<'a>(tree: &'a VNode, key: &str) -> Option<&'a HostElement> {
        let element = tree.resolve().as_element()?;
        if element.key.as_deref() == Some(key) {
            return Some(element);
        }
        element.children.iter().find_map(|child| find(child, key))
    }

    #[test]
    fn test_one_keyed_cell_per_board_position() {
        let state = scripted(&[PieceKind::I]);
        let tree = render_app(&state);

        let cells = board_cells(&tree);
        assert_eq!(cells.len(), 250);
        assert_eq!(cells[0].as_element().unwrap().key.as_deref(), Some("0,0"));
        assert_eq!(cells[13].as_element().unwrap().key.as_deref(), Some("3,1"));
    }

    #[test]
    fn test_active_piece_is_overlaid() {
        let state = scripted(&[PieceKind::I]);
        let tree = render_app(&state);

        let cell = find(&tree, "3,0").unwrap();
        assert_eq!(cell.props["class"].as_str(), Some("cell active"));
        assert_eq!(cell.props["data-kind"].as_str(), Some("I"));
        assert_eq!(cell.children, vec![VNode::text("I")]);

        let empty = find(&tree, "3,1").unwrap();
        assert_eq!(empty.props["class"].as_str(), Some("cell"));
        assert_eq!(empty.children, vec![VNode::text("")]);
    }

    #[test]
    fn test_sidebar_shows_stats_and_status() {
        let mut state = scripted(&[PieceKind::T, PieceKind::O]);
        let tree = render_app(&state);

        assert!(matches!(&tree.children()[1], VNode::Component(c) if c.identity == SIDEBAR));
        assert_eq!(find(&tree, "score").unwrap().children, vec![VNode::text("Score: 0")]);
        assert_eq!(find(&tree, "next").unwrap().children, vec![VNode::text("Next: O")]);
        assert!(find(&tree, "status").is_none());

        state.apply(GameAction::Pause).unwrap();
        let tree = render_app(&state);
        assert_eq!(find(&tree, "status").unwrap().children, vec![VNode::text("PAUSED")]);
    }

    #[test]
    fn test_render_is_pure() {
        let state = GameState::new(10, 25, 77).unwrap();
        assert_eq!(render_app(&state), render_app(&state));
    }

    #[test]
    fn test_root_carries_listeners() {
        let state = GameState::new(6, 8, 1).unwrap();
        let tree = render_app(&state);
        let root = tree.as_element().unwrap();

        assert_eq!(root.key.as_deref(), Some(APP_KEY));
        assert_eq!(
            root.props["onKeyDown"],
            crate::PropValue::Listener(KEY_DOWN_EVENT.to_string())
        );
        let board = find(&tree, BOARD_KEY).unwrap();
        assert_eq!(board.props["data-cols"], crate::PropValue::Int(6));
        assert_eq!(board.children.len(), 48);
    }
}
