//! Integration tests for the move selector, driven by scripted draws.

use rand::SeedableRng;
use rand::rngs::StdRng;
use velha_engine::{Board, Difficulty, Mark, RandomSource, Rules, ScriptedRandom, select_move};

/// Builds a board from a 9-character layout: `X`, `O`, anything else empty.
/// Whitespace is ignored so rows can be spaced out.
fn board(layout: &str) -> Board {
    let mut board = Board::new();
    let cells = layout.chars().filter(|c| !c.is_whitespace());
    for (pos, ch) in cells.enumerate() {
        match ch {
            'X' => board.set_cell(pos, Mark::X).unwrap(),
            'O' => board.set_cell(pos, Mark::O).unwrap(),
            _ => {}
        }
    }
    board
}

fn level(n: u8) -> Difficulty {
    Difficulty::new(n).unwrap()
}

// =========================================================================
// Attack and defense
// =========================================================================

#[test]
fn test_attack_completes_own_line() {
    // X on 0 and 4, O on 1: X wins on 8.
    let mut rng = ScriptedRandom::default();
    let pick = select_move(&board("XO. .X. ..."), Mark::X, Difficulty::MAX, &mut rng);
    assert_eq!(pick, Some(8));
    assert_eq!(rng.consumed(), 0, "attack must not draw");
}

#[test]
fn test_attack_takes_lowest_winning_cell() {
    // X can win on 2 (row) and on 6 (column).
    let mut rng = ScriptedRandom::default();
    let pick = select_move(&board("XX. X.. .OO"), Mark::X, Difficulty::MIN, &mut rng);
    assert_eq!(pick, Some(2));
}

#[test]
fn test_attack_beats_defense() {
    // Both sides threaten; the selector wins rather than blocks.
    let mut rng = ScriptedRandom::default();
    let pick = select_move(&board("OO. XX. ..."), Mark::X, Difficulty::MAX, &mut rng);
    assert_eq!(pick, Some(5));
}

#[test]
fn test_max_difficulty_always_blocks() {
    // O threatens row 0; X has nothing of its own.
    for draw in 0..10 {
        let mut rng = ScriptedRandom::new([draw]);
        let pick = select_move(&board("OO. .X. ..."), Mark::X, Difficulty::MAX, &mut rng);
        assert_eq!(pick, Some(2), "gate draw {draw}");
    }
}

#[test]
fn test_min_difficulty_never_blocks() {
    // Both gates stay shut. The corner tie-break list is [6, 2]: 6 reads
    // E,E,X along the anti-diagonal, 2 reads E,X,E.
    let mut rng = ScriptedRandom::new([9, 9, 0]);
    let pick = select_move(&board("OO. .X. ..."), Mark::X, Difficulty::MIN, &mut rng);
    assert_eq!(pick, Some(6));
    assert_eq!(rng.consumed(), 3);
}

#[test]
fn test_gate_follows_difficulty() {
    // Level 4 opens on draws 6..=9 only.
    let threat = board("OO. .X. ...");
    let mut rng = ScriptedRandom::new([6]);
    assert_eq!(select_move(&threat, Mark::X, level(4), &mut rng), Some(2));

    // Closed gates: the corner tie-break over [6, 2] takes 6.
    let mut rng = ScriptedRandom::new([5, 0, 0]);
    assert_eq!(select_move(&threat, Mark::X, level(4), &mut rng), Some(6));
}

// =========================================================================
// Opening
// =========================================================================

#[test]
fn test_opening_corner_on_heads() {
    // Gate draw, coin = heads, then index 4 of the empty-line list
    // [0,0,0, 2,2,2, 6,6,6, 8,8,8].
    let mut rng = ScriptedRandom::new([0, 1, 4]);
    let pick = select_move(&Board::new(), Mark::X, Difficulty::MAX, &mut rng);
    assert_eq!(pick, Some(2));
    assert_eq!(rng.consumed(), 3);
}

#[test]
fn test_opening_center_on_tails() {
    // Gate draw, coin = tails, second gate draw, then center.
    let mut rng = ScriptedRandom::new([0, 0, 0]);
    let pick = select_move(&Board::new(), Mark::O, Difficulty::MAX, &mut rng);
    assert_eq!(pick, Some(4));
    assert_eq!(rng.consumed(), 3);
}

#[test]
fn test_no_coin_on_non_empty_board() {
    // Only the two gate draws are taken, then center.
    let mut rng = ScriptedRandom::new([0, 0]);
    let pick = select_move(&board("X.. ... ..."), Mark::O, Difficulty::MAX, &mut rng);
    assert_eq!(pick, Some(4));
    assert_eq!(rng.consumed(), 2);
}

// =========================================================================
// Triangles
// =========================================================================

#[test]
fn test_attack_triangle_takes_opposite_corner() {
    let cases = [
        ("X.. .O. ...", 8),
        ("..X .O. ...", 6),
        ("... .O. X..", 2),
        ("... .O. ..X", 0),
    ];
    for (layout, expected) in cases {
        let mut rng = ScriptedRandom::new([0]);
        let pick = select_move(&board(layout), Mark::X, Difficulty::MAX, &mut rng);
        assert_eq!(pick, Some(expected), "layout {layout}");
    }
}

#[test]
fn test_attack_triangle_needs_lone_corner() {
    // Two X corners are not a triangle. The corner tie-break runs over
    // [2, 6, 2, 6] (each free corner builds on two lines) and draw 1 takes 6.
    let mut rng = ScriptedRandom::new([0, 0, 1]);
    let pick = select_move(&board("X.. .O. ..X"), Mark::X, Difficulty::MAX, &mut rng);
    assert_eq!(pick, Some(6));
    assert_eq!(rng.consumed(), 3);
}

#[test]
fn test_defense_triangle_fixed_replies() {
    // X holds the center, O holds the two listed cells.
    let cases = [
        ([1, 5], 2),
        ([5, 7], 8),
        ([3, 7], 6),
        ([1, 3], 0),
        ([0, 5], 2),
        ([2, 7], 8),
        ([3, 8], 6),
        ([1, 6], 0),
    ];
    for (opponent, expected) in cases {
        let mut position = Board::new();
        position.set_cell(4, Mark::X).unwrap();
        for pos in opponent {
            position.set_cell(pos, Mark::O).unwrap();
        }
        let mut rng = ScriptedRandom::new([0, 0]);
        let pick = select_move(&position, Mark::X, Difficulty::MAX, &mut rng);
        assert_eq!(pick, Some(expected), "opponent on {opponent:?}");
    }
}

#[test]
fn test_defense_triangle_opposite_corners_take_an_edge() {
    // Every edge builds towards a line through the center. 5 and 7 read
    // E,E,X, 1 and 3 read E,X,E, so the list is [5, 7, 1, 3].
    let mut rng = ScriptedRandom::new([0, 0, 0]);
    let pick = select_move(&board("O.. .X. ..O"), Mark::X, Difficulty::MAX, &mut rng);
    assert_eq!(pick, Some(5));

    let mut rng = ScriptedRandom::new([0, 0, 2]);
    let pick = select_move(&board("..O .X. O.."), Mark::X, Difficulty::MAX, &mut rng);
    assert_eq!(pick, Some(1));
}

#[test]
fn test_defense_triangle_missing_rotation_falls_through() {
    // O on 0 and 7 has no catalogue entry. Center is taken, so the corner
    // tie-break runs over [6, 2]; the third draw shows it was reached.
    let mut rng = ScriptedRandom::new([0, 0, 0]);
    let pick = select_move(&board("O.. .X. .O."), Mark::X, Difficulty::MAX, &mut rng);
    assert_eq!(pick, Some(6));
    assert_eq!(rng.consumed(), 3);

    let mut rng = ScriptedRandom::new([0, 0, 1]);
    let pick = select_move(&board("O.. .X. .O."), Mark::X, Difficulty::MAX, &mut rng);
    assert_eq!(pick, Some(2));
}

#[test]
fn test_defense_triangle_gated_at_min_difficulty() {
    // Same as the {1, 5} fork, but the gate stays shut. Center is taken,
    // every corner is free and builds on a diagonal, so the corner
    // tie-break runs over [6, 8, 0, 2] and draw 0 picks 6.
    let mut rng = ScriptedRandom::new([9, 9, 0]);
    let pick = select_move(&board(".O. .XO ..."), Mark::X, Difficulty::MIN, &mut rng);
    assert_eq!(pick, Some(6));
    assert_eq!(rng.consumed(), 3);
}

// =========================================================================
// Center, corner, edge, none
// =========================================================================

#[test]
fn test_center_when_free() {
    let mut rng = ScriptedRandom::new([0, 0]);
    let pick = select_move(&board("... ... ..X"), Mark::O, Difficulty::MAX, &mut rng);
    assert_eq!(pick, Some(4));
}

#[test]
fn test_edge_is_last_resort() {
    // Corners and center are taken; only edge 3 is left, and a single
    // candidate is returned without drawing.
    let mut rng = ScriptedRandom::new([0, 0]);
    let pick = select_move(&board("XOX .OX OXO"), Mark::X, Difficulty::MAX, &mut rng);
    assert_eq!(pick, Some(3));
    assert_eq!(rng.consumed(), 2);
}

#[test]
fn test_full_board_has_no_move() {
    let mut rng = ScriptedRandom::default();
    let pick = select_move(&board("XOX OXO OXO"), Mark::X, Difficulty::MAX, &mut rng);
    assert_eq!(pick, None);
}

// =========================================================================
// Properties over random play
// =========================================================================

/// Every non-terminal position reached by random play, with the side to move.
fn random_positions(seed: u64, games: usize) -> Vec<(Board, Mark)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions = Vec::new();
    for _ in 0..games {
        let mut rules = Rules::new();
        let mut to_move = if rng.coin() { Mark::X } else { Mark::O };
        while !rules.is_game_over() {
            positions.push((*rules.board(), to_move));
            let vacant = rules.board().vacant_cells();
            let pos = vacant[rng.below(vacant.len())];
            rules.play(pos, to_move).unwrap();
            to_move = to_move.opponent();
        }
    }
    positions
}

#[test]
fn test_selected_cell_is_always_vacant() {
    let mut rng = StdRng::seed_from_u64(99);
    for (position, player) in random_positions(1, 200) {
        for n in [0, 5, 10] {
            let pick = select_move(&position, player, level(n), &mut rng)
                .expect("non-terminal position has a free cell");
            assert!(position.is_vacant(pick), "{position} -> {pick}");
        }
    }
}

#[test]
fn test_max_difficulty_blocks_every_single_threat() {
    let mut rng = StdRng::seed_from_u64(5);
    for (position, player) in random_positions(2, 300) {
        let threats = winning_cells(&position, player.opponent());
        if threats.is_empty() || !winning_cells(&position, player).is_empty() {
            continue;
        }
        let pick = select_move(&position, player, Difficulty::MAX, &mut rng).unwrap();
        assert!(threats.contains(&pick), "{position}: {pick} does not block {threats:?}");
    }
}

#[test]
fn test_always_takes_a_win() {
    let mut rng = StdRng::seed_from_u64(11);
    for (position, player) in random_positions(3, 300) {
        let wins = winning_cells(&position, player);
        if wins.is_empty() {
            continue;
        }
        let pick = select_move(&position, player, Difficulty::MIN, &mut rng).unwrap();
        assert_eq!(pick, wins[0], "{position}");
    }
}

fn winning_cells(position: &Board, mark: Mark) -> Vec<usize> {
    position
        .vacant_cells()
        .into_iter()
        .filter(|&pos| {
            let mut rules = Rules::with_board(*position);
            rules.play(pos, mark).unwrap().is_over() && rules.winner().mark() == Some(mark)
        })
        .collect()
}
