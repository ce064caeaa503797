pub mod error;

pub mod parsing {
    pub mod parser;
    pub mod writer;
}

pub mod solving {
    pub mod linear_program;
    pub mod settings;
    pub mod simplex;
    pub mod tableau;
}

pub use error::{LpError, LpResult};
pub use parsing::parser::{parse, read_file};
pub use parsing::writer::{to_lp_string, write_file, write_lp};
pub use solving::linear_program::{Column, Constraint, Direction, LinearProgram, Relation};
pub use solving::settings::SolverSettings;
pub use solving::simplex::{SimplexEngine, SolveStatus};
pub use solving::tableau::{Tableau, Variable, VariableKind};
