/**
 * Property tests over whole games played by the knowledge-base player.
 *
 * Invariants covered:
 * - Confirmed mines and safe cells only ever grow and never overlap.
 * - Every confirmed cell agrees with the hidden board.
 * - The closure of each observation stays within its pass bound.
 * - The player never loses on a move it inferred to be safe.
 * - The SAT oracle agrees with every confirmed cell.
 * - Observations confirm exactly what a plain every-pair closure confirms.
 */
use minesweeper_ai::{
    Board, Cell, Constraint, Dimensions, GameConfig, GameState, KnowledgeBase, MineField,
    Outcome, Session,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeSet;

fn board_config() -> impl Strategy<Value = GameConfig> {
    (1usize..=9, 2usize..=9)
        .prop_flat_map(|(height, width)| {
            let area = height * width;
            (Just(height), Just(width), 0..area)
        })
        .prop_map(|(height, width, mines)| GameConfig {
            height,
            width,
            mines,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn knowledge_grows_monotonically_and_stays_sound(
        config in board_config(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut session = Session::new(Board::generate(&config, &mut rng).unwrap());

        let mut mines: BTreeSet<Cell> = BTreeSet::new();
        let mut safes: BTreeSet<Cell> = BTreeSet::new();

        while session.state() == GameState::Playing {
            let Some(turn) = session.step(&mut rng).unwrap() else {
                break;
            };
            let kb = session.knowledge();

            prop_assert!(kb.mines().is_superset(&mines));
            prop_assert!(kb.safes().is_superset(&safes));
            prop_assert!(kb.mines().is_disjoint(kb.safes()));
            prop_assert!(kb.is_consistent());

            for &cell in kb.mines() {
                prop_assert!(session.board().is_mine(cell));
            }
            for &cell in kb.safes() {
                prop_assert!(!session.board().is_mine(cell));
            }

            match turn.outcome {
                Outcome::Exploded => {
                    prop_assert_eq!(turn.strategy, minesweeper_ai::Strategy::Guess);
                    prop_assert_eq!(session.state(), GameState::Lost);
                }
                Outcome::Revealed { propagation, .. } => {
                    prop_assert!(propagation.passes as u128 <= propagation.pass_bound);
                }
            }

            mines = kb.mines().clone();
            safes = kb.safes().clone();
        }

        prop_assert_ne!(session.state(), GameState::Playing);
        if session.state() == GameState::Won {
            prop_assert_eq!(session.knowledge().mines(), session.board().mines());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn oracle_agrees_with_confirmed_cells(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let config = GameConfig { height: 6, width: 6, mines: 6 };
        let mut session = Session::new(Board::generate(&config, &mut rng).unwrap());

        while session.state() == GameState::Playing {
            if session.step(&mut rng).unwrap().is_none() {
                break;
            }
            // Fails on any confirmed cell the clues do not force.
            session.audit().unwrap();
        }
    }
}

proptest! {
    #[test]
    fn nested_chains_stay_within_the_pass_bound(
        len in 2usize..24,
        mine_at in any::<prop::sample::Index>(),
    ) {
        // Every prefix of a single row holds the one mine placed at `mine_at`,
        // or none if the prefix stops short of it.
        let mine = mine_at.index(len);
        let mut kb = KnowledgeBase::new(Dimensions::new(1, len));
        for end in 1..=len {
            let count = usize::from(mine < end);
            kb.add_constraint(Constraint::new((0..end).map(|col| Cell::new(0, col)), count));
        }

        let bound = kb.pass_bound();
        let passes = kb.propagate();

        prop_assert!(passes as u128 <= bound);
        prop_assert_eq!(kb.mines(), &BTreeSet::from([Cell::new(0, mine)]));
        prop_assert_eq!(kb.safes().len(), len - 1);
    }
}

/// The closure written out directly over a list of constraints, sharing
/// nothing with the knowledge base beyond `Constraint` itself.
#[derive(Default)]
struct PlainClosure {
    mines: BTreeSet<Cell>,
    safes: BTreeSet<Cell>,
    constraints: Vec<Constraint>,
}

impl PlainClosure {
    fn confirm(&mut self, mines: &BTreeSet<Cell>, safes: &BTreeSet<Cell>) {
        self.mines.extend(mines);
        self.safes.extend(safes);
        for constraint in &mut self.constraints {
            for &cell in mines {
                constraint.reduce_mine(cell);
            }
            for &cell in safes {
                constraint.reduce_safe(cell);
            }
        }
        self.constraints.retain(|constraint| !constraint.is_empty());
    }

    fn observe(&mut self, dimensions: Dimensions, cell: Cell, count: usize) {
        self.confirm(&BTreeSet::new(), &BTreeSet::from([cell]));

        let unknown: BTreeSet<Cell> = dimensions
            .neighbors(cell)
            .filter(|n| !self.mines.contains(n) && !self.safes.contains(n))
            .collect();
        let known_mines = dimensions
            .neighbors(cell)
            .filter(|n| self.mines.contains(n))
            .count();
        let constraint = Constraint::new(unknown, count - known_mines);
        if !constraint.is_empty() {
            self.constraints.push(constraint);
        }

        loop {
            let before: BTreeSet<Constraint> = self.constraints.iter().cloned().collect();

            let mut mines = BTreeSet::new();
            let mut safes = BTreeSet::new();
            for constraint in &self.constraints {
                mines.extend(constraint.known_mines());
                safes.extend(constraint.known_safe());
            }
            self.constraints
                .retain(|c| c.known_mines().is_empty() && c.known_safe().is_empty());
            self.confirm(&mines, &safes);

            let mut derived = Vec::new();
            for outer in &self.constraints {
                let mut contains_any = false;
                for inner in &self.constraints {
                    if inner.is_strict_subset_of(outer) {
                        derived.push(outer.without(inner));
                        contains_any = true;
                    }
                }
                if !contains_any {
                    derived.push(outer.clone());
                }
            }
            derived.sort();
            derived.dedup();
            self.constraints = derived;

            let after: BTreeSet<Constraint> = self.constraints.iter().cloned().collect();
            if after == before {
                break;
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn observations_match_a_plain_every_pair_closure(
        height in 4usize..=6,
        width in 4usize..=6,
        mines in 3usize..=8,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let config = GameConfig { height, width, mines };
        let mut session = Session::new(Board::generate(&config, &mut rng).unwrap());
        let mut plain = PlainClosure::default();

        while session.state() == GameState::Playing {
            let Some(turn) = session.step(&mut rng).unwrap() else {
                break;
            };
            if let Outcome::Revealed { count, .. } = turn.outcome {
                plain.observe(config.dimensions(), turn.cell, count);
            }

            let kb = session.knowledge();
            prop_assert_eq!(kb.mines(), &plain.mines);
            prop_assert_eq!(kb.safes(), &plain.safes);
            let constraints: BTreeSet<Constraint> = plain.constraints.iter().cloned().collect();
            prop_assert_eq!(kb.constraints(), &constraints);
        }
    }
}
