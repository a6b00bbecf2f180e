use std::collections::VecDeque;

use proptest::prelude::*;
use sweep::engine::{Board, CellContent, GameConfig, Status};

fn around(w: usize, h: usize, x: usize, y: usize) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
        for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
            out.push((nx, ny));
        }
    }
    out
}

fn game() -> impl Strategy<Value = (GameConfig, (usize, usize), Vec<(usize, usize)>)> {
    (1usize..12, 1usize..12, 1u64..u64::MAX)
        .prop_flat_map(|(w, h, seed)| {
            let capacity = w * h - w.min(3) * h.min(3);
            (
                Just(GameConfig::new(w, h, 0).with_seed(seed)),
                0..=capacity,
                (0..w, 0..h),
                prop::collection::vec((0..w, 0..h), 0..6),
            )
        })
        .prop_map(|(config, mines, click, flags)| (GameConfig { mines, ..config }, click, flags))
}

proptest! {
    #[test]
    fn first_reveal_places_exact_count_outside_safe_zone((config, (cx, cy), _) in game()) {
        let mut b = Board::new(config).unwrap();
        b.reveal(cx, cy);
        prop_assert!(!b.first_move());
        prop_assert_ne!(b.status(), Status::Lost);
        prop_assert_eq!(b.unflagged_mines().count(), config.mines);
        for (x, y) in around(config.width, config.height, cx, cy) {
            prop_assert!(!b.cell(x, y).unwrap().is_mine());
        }
    }

    #[test]
    fn numbers_count_neighbouring_mines((config, (cx, cy), _) in game()) {
        let mut b = Board::new(config).unwrap();
        b.reveal(cx, cy);
        let (w, h) = (config.width, config.height);
        for y in 0..h {
            for x in 0..w {
                let c = b.cell(x, y).unwrap();
                if c.is_mine() { continue; }
                let n = around(w, h, x, y).into_iter().filter(|&(nx, ny)| b.cell(nx, ny).unwrap().is_mine()).count();
                let expected = if n == 0 { CellContent::Empty } else { CellContent::Number(n as u8) };
                prop_assert_eq!(c.content(), expected);
            }
        }
    }

    #[test]
    fn flood_fill_opens_exactly_the_connected_region((config, (cx, cy), flags) in game()) {
        let (w, h) = (config.width, config.height);
        let mut b = Board::new(config).unwrap();
        for &(x, y) in &flags {
            if (x, y) != (cx, cy) && !b.cell(x, y).unwrap().flagged() {
                b.toggle_flag(x, y);
            }
        }
        b.reveal(cx, cy);

        let mut expected = vec![false; w * h];
        expected[cy * w + cx] = true;
        let mut queue = VecDeque::from([(cx, cy)]);
        while let Some((x, y)) = queue.pop_front() {
            if b.cell(x, y).unwrap().content() != CellContent::Empty { continue; }
            for (nx, ny) in around(w, h, x, y) {
                let c = b.cell(nx, ny).unwrap();
                if expected[ny * w + nx] || c.flagged() || c.is_mine() { continue; }
                expected[ny * w + nx] = true;
                queue.push_back((nx, ny));
            }
        }

        for y in 0..h {
            for x in 0..w {
                let c = b.cell(x, y).unwrap();
                prop_assert_eq!(c.revealed(), expected[y * w + x], "cell ({}, {})", x, y);
                prop_assert!(!(c.revealed() && c.flagged()));
            }
        }
        prop_assert_eq!(b.status() == Status::Won, b.remaining_safe() == 0);
    }
}
