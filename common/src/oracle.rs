//! Exact entailment over a set of constraints, backed by a SAT solver.
//!
//! The subset rule used by the knowledge base is fast but incomplete. The
//! oracle decides every cell exactly, which makes it a reference to audit the
//! knowledge base against: anything it confirms must be forced here.

use itertools::Itertools;
use std::collections::BTreeMap;
use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

use crate::constraint::Constraint;
use crate::grid::Cell;

/// The possible outcomes of the oracle's analysis for a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deduction {
    ForcedMine,   // Every assignment satisfying the constraints has a mine here.
    ForcedSafe,   // No satisfying assignment has a mine here.
    Undetermined, // Satisfying assignments exist either way.
}

/// Decides every cell mentioned by `constraints`.
///
/// Fails if the constraints contradict each other.
pub fn deduce(constraints: &[Constraint]) -> anyhow::Result<BTreeMap<Cell, Deduction>> {
    let mut solver = Solver::new();
    let mut var_map: BTreeMap<Cell, Var> = BTreeMap::new();

    // 1. One SAT variable per cell, true meaning "mine".
    for constraint in constraints {
        for &cell in constraint.cells() {
            var_map.entry(cell).or_insert_with(|| solver.new_var());
        }
    }

    // 2. Encode each constraint as CNF.
    let mut formula = CnfFormula::new();
    for constraint in constraints {
        let lits: Vec<Lit> = constraint
            .cells()
            .iter()
            .map(|cell| Lit::from_var(var_map[cell], true))
            .collect();
        encode_exactly_k(&mut formula, &lits, constraint.count());
    }
    solver.add_formula(&formula);

    // 3. The constraints must be satisfiable at all.
    if !solver.solve()? {
        anyhow::bail!("constraints are contradictory");
    }

    // 4. Test both polarities of every variable under assumptions.
    let mut deductions = BTreeMap::new();
    for (&cell, &var) in &var_map {
        let mine_possible = solve_assuming(&mut solver, Lit::from_var(var, true))?;
        let safe_possible = solve_assuming(&mut solver, Lit::from_var(var, false))?;

        let deduction = match (mine_possible, safe_possible) {
            (true, true) => Deduction::Undetermined,
            (true, false) => Deduction::ForcedMine,
            (false, true) => Deduction::ForcedSafe,
            (false, false) => {
                anyhow::bail!("{cell} can be neither a mine nor safe under these clues")
            }
        };
        deductions.insert(cell, deduction);
    }

    Ok(deductions)
}

fn solve_assuming(solver: &mut Solver, lit: Lit) -> anyhow::Result<bool> {
    solver.assume(&[lit]);
    let result = solver.solve();
    // Clear assumptions for the next test.
    solver.assume(&[]);
    Ok(result?)
}

/// Encodes an "exactly k" constraint into the CNF formula.
fn encode_exactly_k(formula: &mut CnfFormula, vars: &[Lit], k: usize) {
    encode_at_most_k(formula, vars, k);
    encode_at_least_k(formula, vars, k);
}

/// Every (k+1)-subset must contain a safe cell.
fn encode_at_most_k(formula: &mut CnfFormula, vars: &[Lit], k: usize) {
    if k >= vars.len() {
        return;
    }
    for combo in vars.iter().copied().combinations(k + 1) {
        let clause: Vec<Lit> = combo.iter().map(|&lit| !lit).collect();
        formula.add_clause(&clause);
    }
}

/// Every (n-k+1)-subset must contain a mine.
fn encode_at_least_k(formula: &mut CnfFormula, vars: &[Lit], k: usize) {
    if k == 0 {
        return;
    }
    if k > vars.len() {
        formula.add_clause(&[]);
        return;
    }
    for combo in vars.iter().copied().combinations(vars.len() - k + 1) {
        formula.add_clause(&combo);
    }
}
