//! CPLEX LP export.
//!
//! Renders a [`ConstraintModel`] in the LP text format read by most MIP
//! solvers. Variables are named after their keys, constraints after their
//! labels, and every variable is declared binary. Constraint constants are
//! moved to the right-hand side.
//!
//! LP readers only accept quadratic constraints as inequalities, so every
//! product `a * b` of two binaries is replaced by an auxiliary binary `w<n>`
//! tied to its factors by `w <= a`, `w <= b` and `w >= a + b - 1`. The output
//! is a pure linear model.

use std::collections::BTreeMap;
use std::io::{self, Write};

use super::{ConstraintModel, Expression, VariableId};

/// Write `model` to `writer` in LP format.
///
/// # Examples
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use airspace_core::builder::{DenseAircraft, DenseConfig, DenseProblem, build_dense};
/// use airspace_core::cost::UniformCellCost;
/// use airspace_core::{Cell, FlightNumber, RegularGrid};
///
/// let problem = DenseProblem {
///     grid: RegularGrid::new(2, 1, 1)?,
///     aircraft: vec![DenseAircraft {
///         flight: FlightNumber(1),
///         start: Cell::new(0, 0, 0),
///         destination: Cell::new(1, 0, 0),
///     }],
///     cost: &UniformCellCost(1),
/// };
/// let model = build_dense(&DenseConfig { horizon: 2, destination_reward: 10 }, &problem)?;
/// let mut out = Vec::new();
/// airspace_core::model::lp::write_lp(&model, &mut out)?;
/// let text = String::from_utf8(out)?;
/// assert!(text.starts_with("\\ dense model"));
/// assert!(text.contains(" start_a0: + 1 q_t0_a0_x0_y0_z0_level = 1"));
/// assert!(text.trim_end().ends_with("End"));
/// # Ok(())
/// # }
/// ```
pub fn write_lp<W: Write + ?Sized>(model: &ConstraintModel, writer: &mut W) -> io::Result<()> {
    let products = Products::collect(model);
    writeln!(
        writer,
        "\\ {} model: {} variables, {} constraints",
        model.formulation(),
        model.variable_count(),
        model.constraints().len()
    )?;
    if !products.is_empty() {
        writeln!(
            writer,
            "\\ {} variable products linearised with auxiliary binaries",
            products.len()
        )?;
    }
    writeln!(writer, "Minimize")?;
    writeln!(writer, " obj:{}", render_objective(model, &products))?;

    writeln!(writer, "Subject To")?;
    for constraint in model.constraints() {
        writeln!(
            writer,
            " {}:{} {} {}",
            constraint.label,
            render_terms(model, &products, &constraint.lhs),
            constraint.sense.symbol(),
            number(rhs_without_constant(constraint.rhs, &constraint.lhs))
        )?;
    }
    for (aux, (a, b)) in products.iter() {
        let (first, second) = (name(model, a), name(model, b));
        writeln!(writer, " {aux}_first: + 1 {aux} - 1 {first} <= 0")?;
        writeln!(writer, " {aux}_second: + 1 {aux} - 1 {second} <= 0")?;
        writeln!(writer, " {aux}_both: + 1 {aux} - 1 {first} - 1 {second} >= -1")?;
    }

    writeln!(writer, "Binary")?;
    for (_, key) in model.registry().iter() {
        writeln!(writer, " {key}")?;
    }
    for (aux, _) in products.iter() {
        writeln!(writer, " {aux}")?;
    }
    writeln!(writer, "End")
}

/// Render `model` to an LP-format string.
pub fn to_lp_string(model: &ConstraintModel) -> io::Result<String> {
    let mut out = Vec::new();
    write_lp(model, &mut out)?;
    String::from_utf8(out).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

/// Distinct variable products, numbered in order of first appearance.
#[derive(Debug, Default)]
struct Products {
    pairs: Vec<(VariableId, VariableId)>,
    numbers: BTreeMap<(VariableId, VariableId), usize>,
}

impl Products {
    fn collect(model: &ConstraintModel) -> Self {
        let mut products = Self::default();
        let expressions = model
            .constraints()
            .iter()
            .map(|constraint| &constraint.lhs)
            .chain([model.objective()]);
        for expr in expressions {
            for (a, b, _) in expr.quadratic_terms() {
                products.insert(a, b);
            }
        }
        products
    }

    fn insert(&mut self, a: VariableId, b: VariableId) {
        let pair = if a <= b { (a, b) } else { (b, a) };
        if !self.numbers.contains_key(&pair) {
            self.numbers.insert(pair, self.pairs.len());
            self.pairs.push(pair);
        }
    }

    fn aux(&self, a: VariableId, b: VariableId) -> String {
        let pair = if a <= b { (a, b) } else { (b, a) };
        self.numbers
            .get(&pair)
            .map_or_else(|| format!("{a}_{b}"), |&number| aux_name(number))
    }

    fn iter(&self) -> impl Iterator<Item = (String, (VariableId, VariableId))> + '_ {
        self.pairs
            .iter()
            .enumerate()
            .map(|(number, &pair)| (aux_name(number), pair))
    }

    fn len(&self) -> usize {
        self.pairs.len()
    }

    fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn aux_name(number: usize) -> String {
    format!("w{number}")
}

#[expect(clippy::float_arithmetic, reason = "constant moves across the relation")]
fn rhs_without_constant(rhs: f64, lhs: &Expression) -> f64 {
    rhs - lhs.constant_term()
}

fn render_objective(model: &ConstraintModel, products: &Products) -> String {
    let objective = model.objective();
    let mut out = render_terms(model, products, objective);
    let constant = objective.constant_term();
    if constant.abs() > f64::EPSILON {
        push_coefficient(&mut out, constant);
    }
    out
}

/// Linear terms followed by the auxiliaries standing in for products.
fn render_terms(model: &ConstraintModel, products: &Products, expr: &Expression) -> String {
    let mut out = String::new();
    for (id, coefficient) in expr.linear_terms() {
        push_term(&mut out, coefficient, &name(model, id));
    }
    for (a, b, coefficient) in expr.quadratic_terms() {
        push_term(&mut out, coefficient, &products.aux(a, b));
    }
    if out.is_empty() {
        out.push_str(" 0");
    }
    out
}

fn push_term(out: &mut String, coefficient: f64, variable: &str) {
    push_coefficient(out, coefficient);
    out.push(' ');
    out.push_str(variable);
}

fn push_coefficient(out: &mut String, coefficient: f64) {
    let sign = if coefficient.is_sign_negative() { '-' } else { '+' };
    out.push_str(&format!(" {sign} {}", number(coefficient.abs())));
}

fn number(value: f64) -> String {
    format!("{value}")
}

fn name(model: &ConstraintModel, id: VariableId) -> String {
    model
        .registry()
        .key(id)
        .map_or_else(|| id.to_string(), ToString::to_string)
}
