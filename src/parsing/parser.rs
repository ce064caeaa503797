use std::fs;
use std::path::Path;

use pest::error::LineColLocation;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::error::{LpError, LpResult};
use crate::solving::linear_program::{Direction, LinearProgram, Relation};

#[derive(Parser)]
#[grammar = "src/parsing/lp.pest"]
struct LPParser;

struct Row {
    label: String,
    coefficients: Vec<f64>,
    relation: Relation,
    rhs: f64,
}

pub fn read_file(path: impl AsRef<Path>) -> LpResult<LinearProgram> {
    let content = fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> LpResult<LinearProgram> {
    let mut lp_file = LPParser::parse(Rule::lp_file, content).map_err(|e| {
        let line = match e.line_col {
            LineColLocation::Pos((line, _)) => line,
            LineColLocation::Span((line, _), _) => line,
        };
        LpError::MalformedInput {
            line,
            message: e.variant.message().to_string(),
        }
    })?;
    match lp_file.next() {
        None => Err(malformed(1, "empty file")),
        Some(t) => parse_lp_file(t),
    }
}

fn parse_lp_file(rule: Pair<Rule>) -> LpResult<LinearProgram> {
    let mut direction = None;
    let mut dimensions = None;
    let mut column_labels = Vec::new();
    let mut rows = Vec::new();
    let mut objective = None;

    for inner_rule in rule.into_inner() {
        match inner_rule.as_rule() {
            Rule::direction => direction = Some(parse_direction(inner_rule)?),
            Rule::dimensions => dimensions = Some(parse_dimensions(inner_rule)?),
            Rule::column_labels => column_labels = parse_column_labels(inner_rule),
            Rule::constraint => rows.push(parse_constraint(inner_rule)?),
            Rule::objective => objective = Some(parse_objective(inner_rule)?),
            Rule::EOI => (),
            _ => return Err(malformed(line_of(&inner_rule), format!("{} is not part of an LP file", inner_rule.as_str()))),
        }
    }

    let (direction, (rows_expected, cols_expected, header_line), (objective_label, costs, objective_line)) =
        match (direction, dimensions, objective) {
            (Some(d), Some(s), Some(o)) => (d, s, o),
            _ => return Err(malformed(1, "incomplete LP file")),
        };

    // counts are checked against the file before anything is sized from the header
    if column_labels.len() != cols_expected {
        return Err(malformed(
            header_line + 1,
            format!("expected {} column labels, found {}", cols_expected, column_labels.len()),
        ));
    }
    if rows.len() != rows_expected {
        return Err(malformed(
            objective_line,
            format!("expected {} constraint rows, found {}", rows_expected, rows.len()),
        ));
    }
    if let Some((row, line)) = rows.iter().find(|(row, _)| row.coefficients.len() != cols_expected) {
        return Err(malformed(
            *line,
            format!("expected {} coefficients, found {}", cols_expected, row.coefficients.len()),
        ));
    }
    if costs.len() != cols_expected {
        return Err(malformed(
            objective_line,
            format!("expected {} objective coefficients, found {}", cols_expected, costs.len()),
        ));
    }

    let mut program = LinearProgram::new(rows_expected, cols_expected)?;
    program.set_direction(direction);
    for (col, label) in column_labels.into_iter().enumerate() {
        program.set_col_label(col, label)?;
    }
    for (index, (row, _)) in rows.into_iter().enumerate() {
        program.set_row(index, &row.coefficients, row.relation, row.rhs)?;
        program.set_row_label(index, row.label)?;
    }
    program.set_objective(&costs)?;
    program.set_objective_label(objective_label);

    Ok(program)
}

fn parse_direction(rule: Pair<Rule>) -> LpResult<Direction> {
    let line = line_of(&rule);
    match rule.into_inner().next().map(|r| r.as_rule()) {
        Some(Rule::minimize) => Ok(Direction::Minimize),
        Some(Rule::maximize) => Ok(Direction::Maximize),
        _ => Err(malformed(line, "expected minimize or maximize")),
    }
}

fn parse_dimensions(rule: Pair<Rule>) -> LpResult<(usize, usize, usize)> {
    let line = line_of(&rule);
    let mut values = Vec::new();
    for inner_rule in rule.into_inner() {
        let value: i64 = inner_rule
            .as_str()
            .parse()
            .map_err(|_| malformed(line, format!("{} is not a dimension", inner_rule.as_str())))?;
        values.push(value);
    }
    match values[..] {
        [rows, cols] if rows > 0 && cols > 0 => Ok((rows as usize, cols as usize, line)),
        [rows, cols] => Err(LpError::InvalidDimensions { rows, cols }),
        _ => Err(malformed(line, "expected <rows>,<cols>")),
    }
}

fn parse_column_labels(rule: Pair<Rule>) -> Vec<String> {
    rule.into_inner().map(parse_label).collect()
}

fn parse_constraint(rule: Pair<Rule>) -> LpResult<(Row, usize)> {
    let line = line_of(&rule);
    let mut label = None;
    let mut numbers = Vec::new();
    let mut relation = None;

    for inner_rule in rule.into_inner() {
        match inner_rule.as_rule() {
            Rule::label => label = Some(parse_label(inner_rule)),
            Rule::number => numbers.push(parse_number(inner_rule)?),
            Rule::relation => {
                relation = Some(inner_rule.as_str().parse::<Relation>().map_err(|e| malformed(line, e))?)
            }
            _ => return Err(malformed(line, format!("{} is not part of a constraint", inner_rule.as_str()))),
        }
    }

    // the grammar puts the rhs after the relation, so it is the last number
    let rhs = numbers.pop();
    match (label, relation, rhs) {
        (Some(label), Some(relation), Some(rhs)) => Ok((
            Row {
                label,
                coefficients: numbers,
                relation,
                rhs,
            },
            line,
        )),
        _ => Err(malformed(line, "incomplete constraint")),
    }
}

fn parse_objective(rule: Pair<Rule>) -> LpResult<(String, Vec<f64>, usize)> {
    let line = line_of(&rule);
    let mut label = None;
    let mut costs = Vec::new();
    for inner_rule in rule.into_inner() {
        match inner_rule.as_rule() {
            Rule::label => label = Some(parse_label(inner_rule)),
            Rule::number => costs.push(parse_number(inner_rule)?),
            _ => return Err(malformed(line, format!("{} is not part of an objective", inner_rule.as_str()))),
        }
    }
    match label {
        Some(label) => Ok((label, costs, line)),
        None => Err(malformed(line, "objective has no label")),
    }
}

fn parse_label(rule: Pair<Rule>) -> String {
    rule.into_inner()
        .next()
        .map(|text| text.as_str().to_string())
        .unwrap_or_default()
}

fn parse_number(rule: Pair<Rule>) -> LpResult<f64> {
    rule.as_str()
        .parse()
        .map_err(|_| malformed(line_of(&rule), format!("{} is not a number", rule.as_str())))
}

fn line_of(rule: &Pair<Rule>) -> usize {
    rule.as_span().start_pos().line_col().0
}

fn malformed(line: usize, message: impl Into<String>) -> LpError {
    LpError::MalformedInput {
        line,
        message: message.into(),
    }
}
