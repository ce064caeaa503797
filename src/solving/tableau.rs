use std::fmt;
use std::ops::Index;

use crate::solving::linear_program::{Direction, LinearProgram, Relation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariableKind {
    Original,
    Slack,
    Surplus,
    Artificial,
}

/// A column of the augmented tableau together with the role it plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Variable {
    pub kind: VariableKind,
    pub column: usize,
}

impl Variable {
    pub fn new(kind: VariableKind, column: usize) -> Variable {
        Variable { kind, column }
    }

    pub fn is_artificial(&self) -> bool {
        self.kind == VariableKind::Artificial
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            VariableKind::Original => 'x',
            VariableKind::Slack => 's',
            VariableKind::Surplus => 'e',
            VariableKind::Artificial => 'a',
        };
        write!(f, "{}{}", prefix, self.column + 1)
    }
}

/// Big-M augmented tableau of a linear program.
///
/// Constraint coefficients live in one row-major buffer of `height * width`
/// entries. `rhs` holds the current basic solution and `cost` the reduced-cost
/// row, which is always minimized.
#[derive(Clone, Debug, PartialEq)]
pub struct Tableau {
    height: usize,
    width: usize,
    decision_cols: usize,
    entries: Vec<f64>,
    rhs: Vec<f64>,
    cost: Vec<f64>,
    basis: Vec<Variable>,
    columns: Vec<Variable>,
    artificial_count: usize,
    big_m: f64,
}

impl Tableau {
    pub fn augment(program: &LinearProgram, direction: Direction) -> Tableau {
        let height = program.rows();
        let decision_cols = program.cols();

        // every rhs must be non-negative so the synthetic columns form a feasible start
        let mut coefficients = program.coefficients().to_vec();
        let mut rhs = program.rhs().to_vec();
        let mut relations = program.relations().to_vec();
        for row in 0..height {
            if rhs[row] < 0.0 {
                rhs[row] = -rhs[row];
                coefficients[row].iter_mut().for_each(|v| *v = -*v);
                relations[row] = relations[row].flipped();
            }
        }

        let extras: usize = relations.iter().map(|r| r.extra_columns()).sum();
        let big_m = if relations.iter().any(|r| r.needs_artificial()) {
            big_m_penalty(&coefficients, &rhs, program.costs())
        } else {
            0.0
        };

        let width = decision_cols + extras;
        let mut cost: Vec<f64> = program
            .costs()
            .iter()
            .map(|&c| match direction {
                Direction::Minimize => c,
                Direction::Maximize => -c,
            })
            .collect();
        cost.resize(width, 0.0);

        let mut columns: Vec<Variable> = (0..decision_cols)
            .map(|j| Variable::new(VariableKind::Original, j))
            .collect();
        let mut basis = Vec::with_capacity(height);
        let mut entries = vec![0.0; height * width];
        let mut artificial_count = 0;

        let mut next = decision_cols;
        for (row, relation) in relations.iter().enumerate() {
            let offset = row * width;
            entries[offset..offset + decision_cols].copy_from_slice(&coefficients[row]);

            if relation.needs_artificial() {
                for (j, value) in coefficients[row].iter().enumerate() {
                    cost[j] -= value * big_m;
                }
                artificial_count += 1;
            }

            match relation {
                Relation::LessEq => {
                    entries[offset + next] = 1.0;
                    let slack = Variable::new(VariableKind::Slack, next);
                    columns.push(slack);
                    basis.push(slack);
                    next += 1;
                }
                Relation::Equal => {
                    entries[offset + next] = 1.0;
                    let artificial = Variable::new(VariableKind::Artificial, next);
                    columns.push(artificial);
                    basis.push(artificial);
                    next += 1;
                }
                Relation::GreaterEq => {
                    // reduced costs M and 0 over (-1, +1) are those of a basis holding the +1 column at cost M
                    entries[offset + next] = -1.0;
                    cost[next] = big_m;
                    columns.push(Variable::new(VariableKind::Surplus, next));

                    entries[offset + next + 1] = 1.0;
                    let artificial = Variable::new(VariableKind::Artificial, next + 1);
                    columns.push(artificial);
                    basis.push(artificial);
                    next += 2;
                }
            }
        }

        Tableau {
            height,
            width,
            decision_cols,
            entries,
            rhs,
            cost,
            basis,
            columns,
            artificial_count,
            big_m,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_raw(rows: Vec<Vec<f64>>, rhs: Vec<f64>, cost: Vec<f64>, basis: Vec<Variable>) -> Tableau {
        let height = rows.len();
        let width = cost.len();
        let artificial_count = basis.iter().filter(|v| v.is_artificial()).count();
        Tableau {
            height,
            width,
            decision_cols: width,
            entries: rows.into_iter().flatten().collect(),
            rhs,
            cost,
            basis,
            columns: (0..width).map(|j| Variable::new(VariableKind::Original, j)).collect(),
            artificial_count,
            big_m: 0.0,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn decision_cols(&self) -> usize {
        self.decision_cols
    }

    pub fn big_m(&self) -> f64 {
        self.big_m
    }

    pub fn rhs(&self) -> &[f64] {
        &self.rhs
    }

    pub fn cost(&self) -> &[f64] {
        &self.cost
    }

    pub fn basis(&self) -> &[Variable] {
        &self.basis
    }

    pub fn columns(&self) -> &[Variable] {
        &self.columns
    }

    pub fn artificial_count(&self) -> usize {
        self.artificial_count
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let offset = row * self.width;
        &self.entries[offset..offset + self.width]
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.height && col < self.width {
            Some(self.entries[row * self.width + col])
        } else {
            None
        }
    }

    /// Most negative reduced cost, first column on ties. `None` means optimal.
    pub fn entering_column(&self, tolerance: f64) -> Option<usize> {
        let mut entering = None;
        let mut lowest = -tolerance;
        for (col, &value) in self.cost.iter().enumerate() {
            if value < lowest {
                lowest = value;
                entering = Some(col);
            }
        }
        entering
    }

    /// Minimum ratio test on `col`, earliest row on ties. `None` means unbounded.
    pub fn leaving_row(&self, col: usize, tolerance: f64) -> Option<usize> {
        let mut leaving: Option<(usize, f64)> = None;
        for row in 0..self.height {
            let entry = self[(row, col)];
            if entry <= tolerance {
                continue;
            }
            let ratio = self.rhs[row] / entry;
            match leaving {
                Some((_, best)) if ratio >= best => (),
                _ => leaving = Some((row, ratio)),
            }
        }
        leaving.map(|(row, _)| row)
    }

    /// Gauss-Jordan elimination around `(pivot_row, pivot_col)`; the column
    /// enters the basis in place of the row's current basic variable.
    pub fn pivot(&mut self, pivot_row: usize, pivot_col: usize) {
        let pivot = self[(pivot_row, pivot_col)];
        let offset = pivot_row * self.width;
        self.entries[offset..offset + self.width]
            .iter_mut()
            .for_each(|v| *v /= pivot);
        self.rhs[pivot_row] /= pivot;

        let normalized = self.row(pivot_row).to_vec();
        let normalized_rhs = self.rhs[pivot_row];

        let factor = self.cost[pivot_col];
        for (value, p) in self.cost.iter_mut().zip(&normalized) {
            *value -= factor * p;
        }

        for row in 0..self.height {
            let factor = self[(row, pivot_col)];
            if row == pivot_row || factor == 0.0 {
                continue;
            }
            let offset = row * self.width;
            for (value, p) in self.entries[offset..offset + self.width].iter_mut().zip(&normalized) {
                *value -= factor * p;
            }
            self.rhs[row] -= factor * normalized_rhs;
        }

        let leaving = self.basis[pivot_row];
        let entering = self.columns[pivot_col];
        match (leaving.is_artificial(), entering.is_artificial()) {
            (true, false) => self.artificial_count -= 1,
            (false, true) => self.artificial_count += 1,
            _ => (),
        }
        self.basis[pivot_row] = entering;
    }

    /// True when some row is still basic in an artificial variable with a positive value.
    pub fn has_positive_artificial(&self, tolerance: f64) -> bool {
        self.basis
            .iter()
            .zip(&self.rhs)
            .any(|(variable, &value)| variable.is_artificial() && value > tolerance)
    }
}

fn big_m_penalty(coefficients: &[Vec<f64>], rhs: &[f64], costs: &[f64]) -> f64 {
    let largest = coefficients
        .iter()
        .flatten()
        .chain(rhs)
        .chain(costs)
        .fold(1.0_f64, |acc, v| acc.max(v.abs()));
    2.0 * largest
}

impl Index<(usize, usize)> for Tableau {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(
            row < self.height && col < self.width,
            "tableau index ({}, {}) out of range for {}x{}",
            row,
            col,
            self.height,
            self.width
        );
        &self.entries[row * self.width + col]
    }
}

impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for value in &self.cost {
            write!(f, "{:8.2} ", value)?;
        }
        writeln!(f, " cost")?;

        for row in 0..self.height {
            for value in self.row(row) {
                write!(f, "{:8.2} ", value)?;
            }
            writeln!(f, " = {:8.2}", self.rhs[row])?;
        }

        for variable in &self.basis {
            write!(f, "{:>8} ", variable.to_string())?;
        }
        writeln!(f, " basic vars")?;

        for variable in &self.columns {
            write!(f, "{:>8} ", variable.to_string())?;
        }
        writeln!(f, " columns")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn program(rows: Vec<(Vec<f64>, Relation, f64)>, costs: Vec<f64>) -> LinearProgram {
        let mut a = Vec::new();
        let mut b = Vec::new();
        let mut relations = Vec::new();
        for (coefficients, relation, rhs) in rows {
            a.push(coefficients);
            relations.push(relation);
            b.push(rhs);
        }
        LinearProgram::from_parts(a, b, relations, costs).unwrap()
    }

    #[test]
    fn test_augment_less_eq_only() {
        let lp = program(vec![(vec![1.0, 1.0], Relation::LessEq, 4.0)], vec![3.0, 2.0]);
        let tableau = Tableau::augment(&lp, Direction::Maximize);
        assert_eq!(tableau.width(), 3);
        assert_eq!(tableau.big_m(), 0.0);
        assert_eq!(tableau.row(0), &[1.0, 1.0, 1.0]);
        assert_eq!(tableau.cost(), &[-3.0, -2.0, 0.0]);
        assert_eq!(tableau.basis(), &[Variable::new(VariableKind::Slack, 2)]);
        assert_eq!(tableau.artificial_count(), 0);
    }

    #[test]
    fn test_augment_mixed_relations() {
        let lp = program(
            vec![
                (vec![1.0, 2.0], Relation::Equal, 3.0),
                (vec![1.0, 0.0], Relation::GreaterEq, 1.0),
                (vec![0.0, 1.0], Relation::LessEq, 5.0),
            ],
            vec![1.0, 1.0],
        );
        let tableau = Tableau::augment(&lp, Direction::Minimize);
        // x1 x2 | a3 | e4 a5 | s6
        assert_eq!(tableau.width(), 6);
        assert_eq!(tableau.big_m(), 10.0);
        assert_eq!(tableau.row(0), &[1.0, 2.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(tableau.row(1), &[1.0, 0.0, 0.0, -1.0, 1.0, 0.0]);
        assert_eq!(tableau.row(2), &[0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(tableau.cost(), &[1.0 - 10.0 - 10.0, 1.0 - 20.0, 0.0, 10.0, 0.0, 0.0]);
        assert_eq!(
            tableau.basis(),
            &[
                Variable::new(VariableKind::Artificial, 2),
                Variable::new(VariableKind::Artificial, 4),
                Variable::new(VariableKind::Slack, 5),
            ]
        );
        assert_eq!(tableau.columns()[3].kind, VariableKind::Surplus);
        assert_eq!(tableau.artificial_count(), 2);
    }

    #[test]
    fn test_big_m_has_floor_of_one() {
        let lp = program(vec![(vec![0.0], Relation::Equal, 0.0)], vec![0.0]);
        let tableau = Tableau::augment(&lp, Direction::Minimize);
        assert_eq!(tableau.big_m(), 2.0);
    }

    #[test]
    fn test_negative_rhs_flips_row() {
        let lp = program(vec![(vec![1.0, -2.0], Relation::LessEq, -3.0)], vec![1.0, 1.0]);
        let tableau = Tableau::augment(&lp, Direction::Minimize);
        assert_eq!(tableau.rhs(), &[3.0]);
        assert_eq!(tableau.width(), 4);
        assert_eq!(tableau.row(0), &[-1.0, 2.0, -1.0, 1.0]);
        assert_eq!(tableau.basis()[0].kind, VariableKind::Artificial);
        // the program itself is left alone
        assert_eq!(lp.rhs(), &[-3.0]);
        assert_eq!(lp.relations(), &[Relation::LessEq]);
    }

    #[test]
    fn test_pivot_selection_ties_pick_first() {
        let tableau = Tableau::from_raw(
            vec![vec![1.0, 1.0, 1.0, 0.0], vec![2.0, 1.0, 0.0, 1.0]],
            vec![4.0, 8.0],
            vec![-1.0, -1.0, 0.0, 0.0],
            vec![Variable::new(VariableKind::Slack, 2), Variable::new(VariableKind::Slack, 3)],
        );
        assert_eq!(tableau.entering_column(1e-9), Some(0));
        // ratios 4 and 4
        assert_eq!(tableau.leaving_row(0, 1e-9), Some(0));
    }

    #[test]
    fn test_no_entering_column_when_costs_non_negative() {
        let tableau = Tableau::from_raw(
            vec![vec![1.0, 1.0]],
            vec![1.0],
            vec![0.0, 2.0],
            vec![Variable::new(VariableKind::Slack, 0)],
        );
        assert_eq!(tableau.entering_column(1e-9), None);
    }

    #[test]
    fn test_no_leaving_row_without_positive_entry() {
        let tableau = Tableau::from_raw(
            vec![vec![-1.0, 1.0], vec![0.0, 1.0]],
            vec![1.0, 1.0],
            vec![-1.0, 0.0],
            vec![Variable::new(VariableKind::Slack, 1), Variable::new(VariableKind::Slack, 1)],
        );
        assert_eq!(tableau.leaving_row(0, 1e-9), None);
    }

    #[test]
    fn test_pivot_updates_rows_cost_and_basis() {
        let lp = program(vec![(vec![1.0], Relation::Equal, 3.0)], vec![1.0]);
        let mut tableau = Tableau::augment(&lp, Direction::Minimize);
        assert_eq!(tableau.cost(), &[-5.0, 0.0]);
        tableau.pivot(0, 0);
        assert_eq!(tableau.row(0), &[1.0, 1.0]);
        assert_eq!(tableau.rhs(), &[3.0]);
        assert_eq!(tableau.cost(), &[0.0, 5.0]);
        assert_eq!(tableau.basis(), &[Variable::new(VariableKind::Original, 0)]);
        assert_eq!(tableau.artificial_count(), 0);
        assert!(!tableau.has_positive_artificial(1e-9));
    }

    #[test]
    fn test_checked_indexing() {
        let lp = program(vec![(vec![2.0], Relation::LessEq, 3.0)], vec![1.0]);
        let tableau = Tableau::augment(&lp, Direction::Minimize);
        assert_eq!(tableau[(0, 0)], 2.0);
        assert_eq!(tableau.get(0, 2), None);
        assert_eq!(tableau.get(1, 0), None);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_index_past_row_end_panics() {
        let lp = program(vec![(vec![2.0], Relation::LessEq, 3.0)], vec![1.0]);
        let tableau = Tableau::augment(&lp, Direction::Minimize);
        let _ = tableau[(0, 2)];
    }

    #[test]
    fn test_display_labels_variables() {
        let lp = program(vec![(vec![1.0], Relation::GreaterEq, 1.0)], vec![1.0]);
        let text = Tableau::augment(&lp, Direction::Minimize).to_string();
        assert!(text.contains("a3"));
        assert!(text.contains("e2"));
        assert!(text.lines().any(|l| l.ends_with("basic vars")));
    }

    fn row_strategy() -> impl Strategy<Value = (Vec<f64>, Relation, f64)> {
        (
            prop::collection::vec(-5i32..=5, 3),
            prop_oneof![Just(Relation::LessEq), Just(Relation::Equal), Just(Relation::GreaterEq)],
            -10i32..=10,
        )
            .prop_map(|(a, r, b)| (a.into_iter().map(f64::from).collect(), r, f64::from(b)))
    }

    proptest! {
        #[test]
        fn normalized_rows_are_left_alone(rows in prop::collection::vec(row_strategy(), 1..5)) {
            let lp = program(rows.clone(), vec![1.0, 1.0, 1.0]);
            let first = Tableau::augment(&lp, Direction::Minimize);

            // feed the normalized system back in: no row may change sign again
            let normalized: Vec<(Vec<f64>, Relation, f64)> = rows
                .into_iter()
                .map(|(a, r, b)| if b < 0.0 {
                    (a.into_iter().map(|v| -v).collect(), r.flipped(), -b)
                } else {
                    (a, r, b)
                })
                .collect();
            let lp2 = program(normalized.clone(), vec![1.0, 1.0, 1.0]);
            let second = Tableau::augment(&lp2, Direction::Minimize);

            prop_assert_eq!(&first, &second);
            for (row, (a, _, b)) in normalized.iter().enumerate() {
                prop_assert_eq!(&second.row(row)[..3], &a[..]);
                prop_assert_eq!(second.rhs()[row], *b);
            }
        }
    }
}
