use log::{debug, trace};

use crate::error::{LpError, LpResult};
use crate::solving::linear_program::{Direction, LinearProgram};
use crate::solving::settings::SolverSettings;
use crate::solving::tableau::{Tableau, VariableKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveStatus {
    Solution,
    Unbounded,
    NoSolution,
}

/// Big-M simplex solver bound to one program.
///
/// The engine holds the program mutably for its whole lifetime, so nothing
/// else can touch the coefficients while a solve is in progress. The solution
/// is written back onto the program.
pub struct SimplexEngine<'a> {
    program: &'a mut LinearProgram,
    settings: SolverSettings,
    tableau: Option<Tableau>,
    iterations: usize,
}

impl<'a> SimplexEngine<'a> {
    pub fn new(program: &'a mut LinearProgram) -> SimplexEngine<'a> {
        SimplexEngine::with_settings(program, SolverSettings::default())
    }

    pub fn with_settings(program: &'a mut LinearProgram, settings: SolverSettings) -> SimplexEngine<'a> {
        SimplexEngine {
            program,
            settings,
            tableau: None,
            iterations: 0,
        }
    }

    pub fn program(&self) -> &LinearProgram {
        &*self.program
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    pub fn tableau(&self) -> Option<&Tableau> {
        self.tableau.as_ref()
    }

    /// Pivots performed by the last call to [`SimplexEngine::solve`].
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn optimize(&mut self, direction: Direction) -> LpResult<SolveStatus> {
        self.program.set_direction(direction);
        self.setup(direction);
        let status = self.solve()?;
        let status = self.classify(status);
        debug!("classified as {:?} after {} pivots", status, self.iterations);
        self.extract(status);
        Ok(status)
    }

    /// Builds a fresh augmented tableau and clears any previous solution.
    pub fn setup(&mut self, direction: Direction) -> &Tableau {
        self.program.clear_solution();
        self.iterations = 0;
        let tableau = Tableau::augment(&*self.program, direction);
        debug!(
            "setup {}: {} extra columns, augmented {}x{}, M = {}",
            direction,
            tableau.width() - tableau.decision_cols(),
            tableau.height(),
            tableau.width(),
            tableau.big_m()
        );
        #[cfg(feature = "trace_tableau")]
        trace!("initial tableau\n{}", tableau);
        self.tableau.insert(tableau)
    }

    /// Runs the pivot loop. The result is tentative until classified: an
    /// artificial variable left positive in the basis is only detected by
    /// [`SimplexEngine::optimize`].
    pub fn solve(&mut self) -> LpResult<SolveStatus> {
        let direction = self.program.direction();
        let program = &*self.program;
        let tableau = self
            .tableau
            .get_or_insert_with(|| Tableau::augment(program, direction));
        let settings = self.settings;

        if tableau.width() <= tableau.height() {
            debug!(
                "augmented system {}x{} has no non-basic column",
                tableau.height(),
                tableau.width()
            );
            self.iterations = 0;
            return Ok(SolveStatus::NoSolution);
        }

        let mut iterations = 0;
        let status = loop {
            let Some(col) = tableau.entering_column(settings.tolerance) else {
                break SolveStatus::Solution;
            };
            let Some(row) = tableau.leaving_row(col, settings.tolerance) else {
                trace!("column {} has no positive entry", col);
                break SolveStatus::Unbounded;
            };
            if let Some(limit) = settings.max_iterations {
                if iterations >= limit {
                    self.iterations = iterations;
                    return Err(LpError::IterationLimitExceeded(limit));
                }
            }

            trace!("pivot=({},{}) {} leaves, {} enters", row, col, tableau.basis()[row], tableau.columns()[col]);
            tableau.pivot(row, col);
            iterations += 1;
            #[cfg(feature = "trace_tableau")]
            trace!("\n{}", tableau);
        };

        self.iterations = iterations;
        Ok(status)
    }

    fn classify(&self, status: SolveStatus) -> SolveStatus {
        let Some(tableau) = self.tableau.as_ref() else {
            return status;
        };
        if status == SolveStatus::NoSolution || !tableau.has_positive_artificial(self.settings.tolerance) {
            return status;
        }
        if tableau.artificial_count() > 0 {
            SolveStatus::NoSolution
        } else {
            SolveStatus::Unbounded
        }
    }

    fn extract(&mut self, status: SolveStatus) {
        if status == SolveStatus::NoSolution {
            self.program.clear_solution();
            return;
        }
        let Some(tableau) = self.tableau.as_ref() else {
            return;
        };
        let mut x = vec![0.0; self.program.cols()];
        for (variable, &value) in tableau.basis().iter().zip(tableau.rhs()) {
            if variable.kind == VariableKind::Original {
                x[variable.column] = value;
            }
        }
        self.program.store_solution(x);
    }
}
