use std::fmt;
use std::str::FromStr;

use crate::error::{check_index, check_len, LpError, LpResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    Minimize,
    #[default]
    Maximize,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Minimize => write!(f, "minimize"),
            Direction::Maximize => write!(f, "maximize"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minimize" => Ok(Direction::Minimize),
            "maximize" => Ok(Direction::Maximize),
            other => Err(format!("{} is not an optimization direction", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Relation {
    #[default]
    LessEq,
    Equal,
    GreaterEq,
}

impl Relation {
    /// The relation obtained by multiplying both sides of the row by -1.
    pub fn flipped(self) -> Relation {
        match self {
            Relation::LessEq => Relation::GreaterEq,
            Relation::Equal => Relation::Equal,
            Relation::GreaterEq => Relation::LessEq,
        }
    }

    /// Number of synthetic columns the row contributes to the augmented tableau.
    pub fn extra_columns(self) -> usize {
        match self {
            Relation::LessEq => 1,
            Relation::Equal => 1,
            Relation::GreaterEq => 2,
        }
    }

    pub fn needs_artificial(self) -> bool {
        self != Relation::LessEq
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::LessEq => write!(f, "<="),
            Relation::Equal => write!(f, "=="),
            Relation::GreaterEq => write!(f, ">="),
        }
    }
}

impl FromStr for Relation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<=" => Ok(Relation::LessEq),
            "==" | "=" => Ok(Relation::Equal),
            ">=" => Ok(Relation::GreaterEq),
            other => Err(format!("{} is not a relation", other)),
        }
    }
}

/// One constraint row, used to grow a program with [`LinearProgram::insert_row`].
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub coefficients: Vec<f64>,
    pub relation: Relation,
    pub rhs: f64,
    pub label: Option<String>,
}

/// One decision variable, used to grow a program with [`LinearProgram::insert_column`].
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub coefficients: Vec<f64>,
    pub cost: f64,
    pub label: Option<String>,
}

/// `optimize c·x subject to a·x {<=,==,>=} b, x >= 0`
#[derive(Clone, Debug, PartialEq)]
pub struct LinearProgram {
    direction: Direction,
    rows: usize,
    cols: usize,
    a: Vec<Vec<f64>>,
    b: Vec<f64>,
    relations: Vec<Relation>,
    c: Vec<f64>,
    x: Vec<f64>,
    objective_value: f64,
    row_labels: Vec<Option<String>>,
    col_labels: Vec<Option<String>>,
    objective_label: Option<String>,
}

impl LinearProgram {
    pub fn new(rows: usize, cols: usize) -> LpResult<LinearProgram> {
        if rows == 0 || cols == 0 {
            return Err(LpError::InvalidDimensions {
                rows: rows as i64,
                cols: cols as i64,
            });
        }
        Ok(LinearProgram {
            direction: Direction::default(),
            rows,
            cols,
            a: vec![vec![0.0; cols]; rows],
            b: vec![0.0; rows],
            relations: vec![Relation::LessEq; rows],
            c: vec![0.0; cols],
            x: vec![0.0; cols],
            objective_value: 0.0,
            row_labels: vec![None; rows],
            col_labels: vec![None; cols],
            objective_label: None,
        })
    }

    pub fn from_parts(
        a: Vec<Vec<f64>>,
        b: Vec<f64>,
        relations: Vec<Relation>,
        c: Vec<f64>,
    ) -> LpResult<LinearProgram> {
        let mut program = LinearProgram::new(a.len(), c.len())?;
        check_len("right-hand side", program.rows, b.len())?;
        check_len("relations", program.rows, relations.len())?;
        for row in &a {
            check_len("constraint row", program.cols, row.len())?;
        }
        program.a = a;
        program.b = b;
        program.relations = relations;
        program.c = c;
        Ok(program)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) -> Direction {
        std::mem::replace(&mut self.direction, direction)
    }

    pub fn a(&self, row: usize, col: usize) -> LpResult<f64> {
        check_index("row", row, self.rows)?;
        check_index("column", col, self.cols)?;
        Ok(self.a[row][col])
    }

    pub fn set_a(&mut self, row: usize, col: usize, value: f64) -> LpResult<f64> {
        check_index("row", row, self.rows)?;
        check_index("column", col, self.cols)?;
        Ok(std::mem::replace(&mut self.a[row][col], value))
    }

    pub fn b(&self, row: usize) -> LpResult<f64> {
        check_index("row", row, self.rows)?;
        Ok(self.b[row])
    }

    pub fn set_b(&mut self, row: usize, value: f64) -> LpResult<f64> {
        check_index("row", row, self.rows)?;
        Ok(std::mem::replace(&mut self.b[row], value))
    }

    pub fn c(&self, col: usize) -> LpResult<f64> {
        check_index("column", col, self.cols)?;
        Ok(self.c[col])
    }

    pub fn set_c(&mut self, col: usize, value: f64) -> LpResult<f64> {
        check_index("column", col, self.cols)?;
        Ok(std::mem::replace(&mut self.c[col], value))
    }

    pub fn relation(&self, row: usize) -> LpResult<Relation> {
        check_index("row", row, self.rows)?;
        Ok(self.relations[row])
    }

    pub fn set_relation(&mut self, row: usize, relation: Relation) -> LpResult<Relation> {
        check_index("row", row, self.rows)?;
        Ok(std::mem::replace(&mut self.relations[row], relation))
    }

    /// Fills a whole constraint row at once.
    pub fn set_row(&mut self, row: usize, coefficients: &[f64], relation: Relation, rhs: f64) -> LpResult<()> {
        check_index("row", row, self.rows)?;
        check_len("constraint row", self.cols, coefficients.len())?;
        self.a[row].copy_from_slice(coefficients);
        self.relations[row] = relation;
        self.b[row] = rhs;
        Ok(())
    }

    pub fn set_objective(&mut self, coefficients: &[f64]) -> LpResult<()> {
        check_len("objective", self.cols, coefficients.len())?;
        self.c.copy_from_slice(coefficients);
        Ok(())
    }

    pub fn row_label(&self, row: usize) -> LpResult<Option<&str>> {
        check_index("row", row, self.rows)?;
        Ok(self.row_labels[row].as_deref())
    }

    pub fn set_row_label(&mut self, row: usize, label: impl Into<String>) -> LpResult<Option<String>> {
        check_index("row", row, self.rows)?;
        Ok(self.row_labels[row].replace(label.into()))
    }

    pub fn col_label(&self, col: usize) -> LpResult<Option<&str>> {
        check_index("column", col, self.cols)?;
        Ok(self.col_labels[col].as_deref())
    }

    pub fn set_col_label(&mut self, col: usize, label: impl Into<String>) -> LpResult<Option<String>> {
        check_index("column", col, self.cols)?;
        Ok(self.col_labels[col].replace(label.into()))
    }

    pub fn objective_label(&self) -> Option<&str> {
        self.objective_label.as_deref()
    }

    pub fn set_objective_label(&mut self, label: impl Into<String>) -> Option<String> {
        self.objective_label.replace(label.into())
    }

    pub fn coefficients(&self) -> &[Vec<f64>] {
        &self.a
    }

    pub fn rhs(&self) -> &[f64] {
        &self.b
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn costs(&self) -> &[f64] {
        &self.c
    }

    /// Solution vector of the last solve, all zero before one has succeeded.
    pub fn solution(&self) -> &[f64] {
        &self.x
    }

    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }

    pub(crate) fn clear_solution(&mut self) {
        self.x.iter_mut().for_each(|v| *v = 0.0);
        self.objective_value = 0.0;
    }

    pub(crate) fn store_solution(&mut self, x: Vec<f64>) {
        self.objective_value = self.c.iter().zip(&x).map(|(c, x)| c * x).sum();
        self.x = x;
    }

    /// Inserts a constraint so that it ends up at `index`; `index == rows()` appends.
    pub fn insert_row(&mut self, index: usize, constraint: Constraint) -> LpResult<()> {
        check_index("row", index, self.rows + 1)?;
        check_len("constraint row", self.cols, constraint.coefficients.len())?;
        self.a.insert(index, constraint.coefficients);
        self.b.insert(index, constraint.rhs);
        self.relations.insert(index, constraint.relation);
        self.row_labels.insert(index, constraint.label);
        self.rows += 1;
        self.clear_solution();
        Ok(())
    }

    /// Inserts a variable so that it ends up at `index`; `index == cols()` appends.
    pub fn insert_column(&mut self, index: usize, column: Column) -> LpResult<()> {
        check_index("column", index, self.cols + 1)?;
        check_len("column", self.rows, column.coefficients.len())?;
        for (row, value) in self.a.iter_mut().zip(column.coefficients) {
            row.insert(index, value);
        }
        self.c.insert(index, column.cost);
        self.col_labels.insert(index, column.label);
        self.cols += 1;
        self.x = vec![0.0; self.cols];
        self.objective_value = 0.0;
        Ok(())
    }
}

impl fmt::Display for LinearProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.direction)?;

        write!(f, "{:10}", "")?;
        for label in &self.col_labels {
            write!(f, " {:>10.10}", label.as_deref().unwrap_or(""))?;
        }
        writeln!(f)?;

        for row in 0..self.rows {
            write!(f, "{:>10.10}", self.row_labels[row].as_deref().unwrap_or(""))?;
            for value in &self.a[row] {
                write!(f, " {:10.2}", value)?;
            }
            writeln!(f, " {} {:10.2}", self.relations[row], self.b[row])?;
        }

        write!(f, "{:>10.10}", self.objective_label.as_deref().unwrap_or(""))?;
        for value in &self.c {
            write!(f, " {:10.2}", value)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let program = LinearProgram::new(2, 3).unwrap();
        assert_eq!(program.rows(), 2);
        assert_eq!(program.cols(), 3);
        assert!(program.coefficients().iter().flatten().all(|v| *v == 0.0));
        assert!(program.rhs().iter().all(|v| *v == 0.0));
        assert!(program.relations().iter().all(|r| *r == Relation::LessEq));
        assert_eq!(program.solution(), &[0.0, 0.0, 0.0]);
        assert_eq!(program.row_label(1).unwrap(), None);
        assert_eq!(program.objective_label(), None);
    }

    #[test]
    fn test_new_rejects_empty_dimensions() {
        assert!(matches!(
            LinearProgram::new(0, 3),
            Err(LpError::InvalidDimensions { rows: 0, cols: 3 })
        ));
        assert!(matches!(
            LinearProgram::new(2, 0),
            Err(LpError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_setters_return_previous_value() {
        let mut program = LinearProgram::new(2, 2).unwrap();
        assert_eq!(program.set_a(1, 0, 4.0).unwrap(), 0.0);
        assert_eq!(program.set_a(1, 0, 5.0).unwrap(), 4.0);
        assert_eq!(program.a(1, 0).unwrap(), 5.0);
        assert_eq!(program.set_relation(0, Relation::GreaterEq).unwrap(), Relation::LessEq);
        assert_eq!(program.set_col_label(1, "x2").unwrap(), None);
        assert_eq!(program.set_col_label(1, "y").unwrap(), Some("x2".to_string()));
        assert_eq!(program.set_direction(Direction::Minimize), Direction::Maximize);
    }

    #[test]
    fn test_out_of_range_access_fails() {
        let mut program = LinearProgram::new(2, 3).unwrap();
        assert!(matches!(
            program.a(2, 0),
            Err(LpError::IndexOutOfRange { axis: "row", index: 2, len: 2 })
        ));
        assert!(matches!(
            program.set_c(3, 1.0),
            Err(LpError::IndexOutOfRange { axis: "column", index: 3, len: 3 })
        ));
        assert!(program.set_row_label(5, "r").is_err());
    }

    #[test]
    fn test_from_parts_checks_shapes() {
        let program = LinearProgram::from_parts(
            vec![vec![1.0, 1.0], vec![1.0, -1.0]],
            vec![4.0, 1.0],
            vec![Relation::LessEq, Relation::GreaterEq],
            vec![3.0, 2.0],
        )
        .unwrap();
        assert_eq!(program.b(1).unwrap(), 1.0);

        let ragged = LinearProgram::from_parts(
            vec![vec![1.0, 1.0], vec![1.0]],
            vec![4.0, 1.0],
            vec![Relation::LessEq, Relation::LessEq],
            vec![3.0, 2.0],
        );
        assert!(matches!(ragged, Err(LpError::ShapeMismatch { what: "constraint row", .. })));

        let short_b = LinearProgram::from_parts(
            vec![vec![1.0]],
            vec![],
            vec![Relation::LessEq],
            vec![3.0],
        );
        assert!(matches!(short_b, Err(LpError::ShapeMismatch { what: "right-hand side", .. })));
    }

    #[test]
    fn test_insert_row_and_column() {
        let mut program = LinearProgram::new(1, 1).unwrap();
        program.set_row(0, &[2.0], Relation::LessEq, 8.0).unwrap();
        program.set_row_label(0, "first").unwrap();

        program
            .insert_row(
                0,
                Constraint {
                    coefficients: vec![1.0],
                    relation: Relation::GreaterEq,
                    rhs: 1.0,
                    label: Some("zeroth".to_string()),
                },
            )
            .unwrap();
        assert_eq!(program.rows(), 2);
        assert_eq!(program.row_label(0).unwrap(), Some("zeroth"));
        assert_eq!(program.row_label(1).unwrap(), Some("first"));
        assert_eq!(program.b(1).unwrap(), 8.0);

        program
            .insert_column(
                1,
                Column {
                    coefficients: vec![5.0, 6.0],
                    cost: 7.0,
                    label: Some("y".to_string()),
                },
            )
            .unwrap();
        assert_eq!(program.cols(), 2);
        assert_eq!(program.coefficients(), &[vec![1.0, 5.0], vec![2.0, 6.0]]);
        assert_eq!(program.c(1).unwrap(), 7.0);
        assert_eq!(program.solution().len(), 2);

        let too_short = Column {
            coefficients: vec![1.0],
            cost: 0.0,
            label: None,
        };
        assert!(program.insert_column(0, too_short).is_err());
        assert!(program
            .insert_row(
                4,
                Constraint {
                    coefficients: vec![0.0, 0.0],
                    relation: Relation::LessEq,
                    rhs: 0.0,
                    label: None
                }
            )
            .is_err());
    }

    #[test]
    fn test_clone_is_deep() {
        let mut program = LinearProgram::new(1, 1).unwrap();
        program.set_col_label(0, "x").unwrap();
        let copy = program.clone();
        program.set_a(0, 0, 9.0).unwrap();
        program.set_col_label(0, "changed").unwrap();
        assert_eq!(copy.a(0, 0).unwrap(), 0.0);
        assert_eq!(copy.col_label(0).unwrap(), Some("x"));
    }

    #[test]
    fn test_relation_and_direction_text() {
        assert_eq!("<=".parse::<Relation>().unwrap(), Relation::LessEq);
        assert_eq!("=".parse::<Relation>().unwrap(), Relation::Equal);
        assert_eq!(Relation::GreaterEq.to_string(), ">=");
        assert!("=>".parse::<Relation>().is_err());
        assert_eq!("MiniMize".parse::<Direction>().unwrap(), Direction::Minimize);
        assert_eq!(Relation::LessEq.flipped(), Relation::GreaterEq);
        assert_eq!(Relation::Equal.flipped(), Relation::Equal);
    }

    #[test]
    fn test_display_lists_rows() {
        let mut program = LinearProgram::new(1, 2).unwrap();
        program.set_row(0, &[1.0, 2.0], Relation::GreaterEq, 3.0).unwrap();
        program.set_row_label(0, "cap").unwrap();
        program.set_objective_label("Z");
        let text = program.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "maximize");
        assert!(lines[2].starts_with("       cap"));
        assert!(lines[2].contains(">="));
        assert!(lines[3].trim_start().starts_with('Z'));
    }
}
