//! Pieces module - Tetromino shapes and rotation with wall kicks
//!
//! Shapes are expressed as mino offsets from the piece anchor in board
//! coordinates (y grows downward). Rotation uses the Super Rotation System
//! (SRS) kick tables by default.
//! Reference: https://tetris.wiki/SRS

use arrayvec::ArrayVec;

use crate::types::{PieceKind, Rotation};

/// Offset of a single mino relative to the piece anchor
pub type MinoOffset = (i16, i16);

/// Shape of a piece - 4 mino offsets from the piece anchor
pub type PieceShape = [MinoOffset; 4];

/// Get the shape (mino offsets) for a piece kind and rotation
pub fn get_shape(kind: PieceKind, rotation: Rotation) -> PieceShape {
    match kind {
        PieceKind::I => get_i_shape(rotation),
        PieceKind::O => get_o_shape(rotation),
        PieceKind::T => get_t_shape(rotation),
        PieceKind::S => get_s_shape(rotation),
        PieceKind::Z => get_z_shape(rotation),
        PieceKind::J => get_j_shape(rotation),
        PieceKind::L => get_l_shape(rotation),
    }
}

fn get_i_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        // N: horizontal, on row 1 of the 4x4 box
        Rotation::North => [(0, 1), (1, 1), (2, 1), (3, 1)],
        Rotation::East => [(2, 0), (2, 1), (2, 2), (2, 3)],
        Rotation::South => [(0, 2), (1, 2), (2, 2), (3, 2)],
        Rotation::West => [(1, 0), (1, 1), (1, 2), (1, 3)],
    }
}

fn get_o_shape(_rotation: Rotation) -> PieceShape {
    [(1, 0), (2, 0), (1, 1), (2, 1)]
}

fn get_t_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(1, 0), (0, 1), (1, 1), (2, 1)],
        Rotation::East => [(1, 0), (1, 1), (2, 1), (1, 2)],
        Rotation::South => [(0, 1), (1, 1), (2, 1), (1, 2)],
        Rotation::West => [(1, 0), (0, 1), (1, 1), (1, 2)],
    }
}

fn get_s_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(1, 0), (2, 0), (0, 1), (1, 1)],
        Rotation::East => [(1, 0), (1, 1), (2, 1), (2, 2)],
        Rotation::South => [(1, 1), (2, 1), (0, 2), (1, 2)],
        Rotation::West => [(0, 0), (0, 1), (1, 1), (1, 2)],
    }
}

fn get_z_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(0, 0), (1, 0), (1, 1), (2, 1)],
        Rotation::East => [(2, 0), (1, 1), (2, 1), (1, 2)],
        Rotation::South => [(0, 1), (1, 1), (1, 2), (2, 2)],
        Rotation::West => [(1, 0), (0, 1), (1, 1), (0, 2)],
    }
}

fn get_j_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(0, 0), (0, 1), (1, 1), (2, 1)],
        Rotation::East => [(1, 0), (2, 0), (1, 1), (1, 2)],
        Rotation::South => [(0, 1), (1, 1), (2, 1), (2, 2)],
        Rotation::West => [(1, 0), (1, 1), (0, 2), (1, 2)],
    }
}

fn get_l_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(2, 0), (0, 1), (1, 1), (2, 1)],
        Rotation::East => [(1, 0), (1, 1), (1, 2), (2, 2)],
        Rotation::South => [(0, 1), (1, 1), (2, 1), (0, 2)],
        Rotation::West => [(0, 0), (1, 0), (1, 1), (1, 2)],
    }
}

/// Which wall-kick offsets are tried when a naive rotation collides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KickSet {
    /// SRS tables (JLSTZ, I, O)
    #[default]
    Srs,
    /// Only the naive rotation; no alternate offsets
    None,
}

impl KickSet {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "srs" => Some(KickSet::Srs),
            "none" | "off" => Some(KickSet::None),
            _ => None,
        }
    }
}

/// SRS wall kick data, 5 offsets per transition.
///
/// Offsets are written in the y-up notation of the published tables and are
/// flipped vertically when applied to the board.
pub type KickTable = [[(i16, i16); 5]; 8];

/// O piece rotates in place
const O_KICKS: KickTable = [[(0, 0); 5]; 8];

/// JLSTZ kick table (shared by J, L, S, T, Z)
const JLSTZ_KICKS: KickTable = [
    // 0->R
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // 0->L
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // R->0
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // R->2
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // 2->R
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // 2->L
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // L->2
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // L->0
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
];

/// I piece kick table
const I_KICKS: KickTable = [
    // 0->R
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    // 0->L
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    // R->0
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    // R->2
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    // 2->R
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
    // 2->L
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    // L->2
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    // L->0
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
];

/// Get kick table for a piece kind
pub fn get_kick_table(kind: PieceKind) -> &'static KickTable {
    match kind {
        PieceKind::O => &O_KICKS,
        PieceKind::I => &I_KICKS,
        _ => &JLSTZ_KICKS,
    }
}

/// Get the kick index for a rotation transition
fn get_kick_index(from: Rotation, clockwise: bool) -> usize {
    match (from, clockwise) {
        (Rotation::North, true) => 0,
        (Rotation::North, false) => 1,
        (Rotation::East, false) => 2,
        (Rotation::East, true) => 3,
        (Rotation::South, false) => 4,
        (Rotation::South, true) => 5,
        (Rotation::West, false) => 6,
        (Rotation::West, true) => 7,
    }
}

/// Ordered board-space offsets to try for one rotation, naive position first.
pub fn kick_offsets(
    kind: PieceKind,
    from: Rotation,
    clockwise: bool,
    kicks: KickSet,
) -> ArrayVec<(i16, i16), 5> {
    let mut offsets = ArrayVec::new();
    match kicks {
        KickSet::None => offsets.push((0, 0)),
        KickSet::Srs => {
            let row = &get_kick_table(kind)[get_kick_index(from, clockwise)];
            offsets.extend(row.iter().map(|&(dx, dy)| (dx, -dy)));
        }
    }
    offsets
}

/// Try to rotate a piece with wall kicks.
///
/// Returns `Some((new_rotation, kick_offset))` for the first offset whose
/// minos are all free, `None` if every offset collides.
pub fn try_rotate(
    kind: PieceKind,
    rotation: Rotation,
    x: i16,
    y: i16,
    clockwise: bool,
    kicks: KickSet,
    is_free: impl Fn(i16, i16) -> bool,
) -> Option<(Rotation, (i16, i16))> {
    let new_rotation = if clockwise {
        rotation.rotate_cw()
    } else {
        rotation.rotate_ccw()
    };
    let new_shape = get_shape(kind, new_rotation);

    kick_offsets(kind, rotation, clockwise, kicks)
        .into_iter()
        .find(|&(dx, dy)| {
            new_shape
                .iter()
                .all(|&(mx, my)| is_free(x + dx + mx, y + dy + my))
        })
        .map(|offset| (new_rotation, offset))
}

/// Spawn anchor for a piece on a board of the given width.
///
/// The 4-wide bounding box is centred horizontally and the topmost occupied
/// row of the spawn orientation lands on board row 0.
pub fn spawn_anchor(kind: PieceKind, board_width: i16) -> (i16, i16) {
    let shape = get_shape(kind, Rotation::North);
    let top = shape.iter().map(|&(_, dy)| dy).min().unwrap_or(0);
    ((board_width - 4) / 2, -top)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_shape_has_four_distinct_minos() {
        for kind in PieceKind::ALL {
            for rotation in [
                Rotation::North,
                Rotation::East,
                Rotation::South,
                Rotation::West,
            ] {
                let shape = get_shape(kind, rotation);
                for (i, a) in shape.iter().enumerate() {
                    for b in &shape[i + 1..] {
                        assert_ne!(a, b, "{:?} {:?} repeats a mino", kind, rotation);
                    }
                }
            }
        }
    }

    #[test]
    fn test_kick_offsets_flip_vertical_axis() {
        let offsets = kick_offsets(PieceKind::T, Rotation::North, true, KickSet::Srs);
        assert_eq!(offsets.as_slice(), &[(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)]);

        let naive = kick_offsets(PieceKind::T, Rotation::North, true, KickSet::None);
        assert_eq!(naive.as_slice(), &[(0, 0)]);
    }

    #[test]
    fn test_rotate_in_open_space_uses_naive_position() {
        let open = |_: i16, _: i16| true;
        let result = try_rotate(PieceKind::T, Rotation::North, 3, 3, true, KickSet::Srs, open);
        assert_eq!(result, Some((Rotation::East, (0, 0))));
    }

    #[test]
    fn test_rotate_kicks_off_wall() {
        // 10-wide field, T in East orientation with its stem column on x = 0.
        let is_free = |x: i16, y: i16| (0..10).contains(&x) && (0..20).contains(&y);
        let result = try_rotate(PieceKind::T, Rotation::East, -1, 5, true, KickSet::Srs, is_free);
        assert_eq!(result, Some((Rotation::South, (1, 0))));

        // Without kicks the same rotation is rejected.
        assert!(
            try_rotate(PieceKind::T, Rotation::East, -1, 5, true, KickSet::None, is_free).is_none()
        );
    }

    #[test]
    fn test_spawn_anchor_puts_top_row_on_board_row_zero() {
        assert_eq!(spawn_anchor(PieceKind::I, 10), (3, -1));
        assert_eq!(spawn_anchor(PieceKind::T, 10), (3, 0));
        assert_eq!(spawn_anchor(PieceKind::O, 10), (3, 0));
    }
}
