use blockfall_engine::{
    Board, Cell, GameCommand, GameSession, PieceKind, PieceSeed, Position, Shape, collides,
    shape_of,
};
use proptest::prelude::*;

fn kind_strategy() -> impl Strategy<Value = PieceKind> {
    (0..PieceKind::LEN).prop_map(|i| PieceKind::ALL[i])
}

fn command_strategy() -> impl Strategy<Value = GameCommand> {
    prop_oneof![
        Just(GameCommand::MoveLeft),
        Just(GameCommand::MoveRight),
        Just(GameCommand::Rotate),
        Just(GameCommand::SoftDrop),
        Just(GameCommand::HardDrop),
    ]
}

fn rotated(kind: PieceKind, turns: usize) -> Shape {
    let mut shape = shape_of(kind);
    for _ in 0..turns {
        shape.rotate_right();
    }
    shape
}

fn absolute_cells(shape: &Shape, position: Position) -> Vec<(i32, i32)> {
    shape
        .occupied_cells()
        .map(|(dx, dy, _)| {
            (
                position.x + i32::try_from(dx).unwrap(),
                position.y + i32::try_from(dy).unwrap(),
            )
        })
        .collect()
}

fn random_board(width: usize, height: usize, fill: &[bool]) -> Board {
    let mut board = Board::new(width, height).unwrap();
    for (i, &filled) in fill.iter().enumerate().take(width * height) {
        if filled {
            board.set_cell(i % width, i / width, Cell::Piece(PieceKind::Z));
        }
    }
    board
}

proptest! {
    #[test]
    fn test_in_bounds_shapes_do_not_collide_on_empty_board(
        kind in kind_strategy(),
        turns in 0usize..4,
        x in -2i32..10,
        y in -3i32..20,
    ) {
        let board = Board::standard();
        let shape = rotated(kind, turns);
        let position = Position::new(x, y);
        let cells = absolute_cells(&shape, position);
        prop_assume!(cells.iter().all(|&(cx, cy)| (0..10).contains(&cx) && cy < 20));
        prop_assert!(!collides(&shape, position, &board));
    }

    #[test]
    fn test_out_of_range_shapes_collide(
        kind in kind_strategy(),
        turns in 0usize..4,
        x in -5i32..15,
        y in -3i32..25,
    ) {
        let board = Board::standard();
        let shape = rotated(kind, turns);
        let position = Position::new(x, y);
        let cells = absolute_cells(&shape, position);
        prop_assume!(cells.iter().any(|&(cx, cy)| !(0..10).contains(&cx) || cy >= 20));
        prop_assert!(collides(&shape, position, &board));
    }

    #[test]
    fn test_four_rotations_restore_shape(kind in kind_strategy()) {
        prop_assert_eq!(rotated(kind, 4), shape_of(kind));
    }

    #[test]
    fn test_clear_row_preserves_dimensions(
        fill in prop::collection::vec(any::<bool>(), 60),
        y in 0usize..6,
    ) {
        let mut board = random_board(10, 6, &fill);
        let above = board.row(0).clone();
        board.clear_row(y);
        prop_assert_eq!(board.height(), 6);
        prop_assert_eq!(board.width(), 10);
        prop_assert!(board.row(0).is_empty());
        if y > 0 {
            prop_assert_eq!(board.row(1), &above);
        }
    }

    #[test]
    fn test_clear_full_rows_leaves_no_full_row(
        fill in prop::collection::vec(prop::bool::weighted(0.9), 40),
    ) {
        let mut board = random_board(4, 10, &fill);
        let full_before = (0..10).filter(|&y| board.is_row_full(y)).count();
        let occupied_before = board.occupied_count();
        let kept: Vec<_> = board
            .rows()
            .filter(|row| !row.iter().all(|c| c.is_occupied()))
            .map(<[Cell]>::to_vec)
            .collect();

        let cleared = board.clear_full_rows();
        prop_assert_eq!(cleared, full_before);
        prop_assert_eq!(board.height(), 10);
        prop_assert!((0..10).all(|y| !board.is_row_full(y)));
        prop_assert_eq!(board.occupied_count(), occupied_before - cleared * 4);

        // surviving rows keep their order, shifted to the bottom
        let bottom: Vec<_> = board.rows().skip(cleared).map(<[Cell]>::to_vec).collect();
        prop_assert_eq!(bottom, kept);
    }

    #[test]
    fn test_active_piece_never_collides_while_running(
        seed in any::<u128>(),
        commands in prop::collection::vec(command_strategy(), 1..200),
        elapsed in prop::collection::vec(0u64..1500, 1..200),
    ) {
        let mut session = GameSession::with_seed(PieceSeed::from_u128(seed));
        session.start();
        for (i, command) in commands.into_iter().enumerate() {
            session.apply(command);
            session.advance(elapsed[i % elapsed.len()]);
            let piece = session.active_piece();
            prop_assert!(piece.is_some());
            let piece = piece.unwrap();
            if session.state().is_running() {
                prop_assert!(!piece.collides(session.board()));
            } else {
                prop_assert!(session.state().is_game_over());
                break;
            }
            prop_assert!(session.board().rows().all(|row| !row.iter().all(|c| c.is_occupied())));
        }
    }
}
