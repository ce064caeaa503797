#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverSettings {
    /// Upper bound on pivots; `None` runs until the tableau is classified.
    pub max_iterations: Option<usize>,
    /// Epsilon for the optimality, ratio and artificial-positivity tests.
    pub tolerance: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            max_iterations: None,
            tolerance: 1e-9,
        }
    }
}
