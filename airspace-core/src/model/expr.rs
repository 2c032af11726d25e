//! Linear and quadratic expressions over binary variables.

use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Assignment, VariableId};

/// A constant plus linear and pairwise-product terms.
///
/// Repeated terms accumulate their coefficients. Products are stored with the
/// lower id first, so `a·b` and `b·a` are the same term.
///
/// # Examples
/// ```
/// use airspace_core::model::{Assignment, Expression, VariableRegistry};
/// # use airspace_core::model::{EdgeKey, VariableKey};
/// # use airspace_core::{FlightNumber, VoxelIndex};
///
/// # let edge = |to| VariableKey::Edge(EdgeKey { flight: FlightNumber(1), from: VoxelIndex(0), to: VoxelIndex(to) });
/// let mut registry = VariableRegistry::default();
/// let a = registry.intern(edge(1));
/// let b = registry.intern(edge(2));
/// let expr = Expression::constant(1.0).with_term(a, -1.0).with_product(a, b, 1.0);
/// let assignment = Assignment::from_active([a]);
/// assert_eq!(expr.evaluate(&assignment), 0.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(into = "ExpressionRepr", from = "ExpressionRepr")
)]
pub struct Expression {
    constant: f64,
    linear: BTreeMap<VariableId, f64>,
    quadratic: BTreeMap<(VariableId, VariableId), f64>,
}

impl Expression {
    /// An expression with no terms and a zero constant.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            constant: 0.0,
            linear: BTreeMap::new(),
            quadratic: BTreeMap::new(),
        }
    }

    /// A constant expression.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self {
            constant: value,
            ..Self::default()
        }
    }

    /// Sum of `ids`, each with coefficient one.
    #[must_use]
    pub fn sum<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = VariableId>,
    {
        let mut expr = Self::default();
        for id in ids {
            expr.add_term(id, 1.0);
        }
        expr
    }

    /// Add `coefficient · id`.
    #[expect(clippy::float_arithmetic, reason = "coefficients accumulate")]
    pub fn add_term(&mut self, id: VariableId, coefficient: f64) -> &mut Self {
        *self.linear.entry(id).or_insert(0.0) += coefficient;
        self
    }

    /// Add `coefficient · a · b`.
    #[expect(clippy::float_arithmetic, reason = "coefficients accumulate")]
    pub fn add_product(&mut self, a: VariableId, b: VariableId, coefficient: f64) -> &mut Self {
        let pair = if a <= b { (a, b) } else { (b, a) };
        *self.quadratic.entry(pair).or_insert(0.0) += coefficient;
        self
    }

    /// Add `value` to the constant.
    #[expect(clippy::float_arithmetic, reason = "constants accumulate")]
    pub fn add_constant(&mut self, value: f64) -> &mut Self {
        self.constant += value;
        self
    }

    /// Add every term of `other`.
    pub fn add_expression(&mut self, other: &Self) -> &mut Self {
        self.add_constant(other.constant);
        for (&id, &coefficient) in &other.linear {
            self.add_term(id, coefficient);
        }
        for (&(a, b), &coefficient) in &other.quadratic {
            self.add_product(a, b, coefficient);
        }
        self
    }

    /// Builder form of [`Expression::add_term`].
    #[must_use]
    pub fn with_term(mut self, id: VariableId, coefficient: f64) -> Self {
        self.add_term(id, coefficient);
        self
    }

    /// Builder form of [`Expression::add_product`].
    #[must_use]
    pub fn with_product(mut self, a: VariableId, b: VariableId, coefficient: f64) -> Self {
        self.add_product(a, b, coefficient);
        self
    }

    /// The constant term.
    #[must_use]
    pub const fn constant_term(&self) -> f64 {
        self.constant
    }

    /// Linear terms ordered by variable id.
    pub fn linear_terms(&self) -> impl Iterator<Item = (VariableId, f64)> + '_ {
        self.linear.iter().map(|(&id, &coefficient)| (id, coefficient))
    }

    /// Product terms ordered by variable ids.
    pub fn quadratic_terms(&self) -> impl Iterator<Item = (VariableId, VariableId, f64)> + '_ {
        self.quadratic
            .iter()
            .map(|(&(a, b), &coefficient)| (a, b, coefficient))
    }

    /// Whether any product term is present.
    #[must_use]
    pub fn is_quadratic(&self) -> bool {
        !self.quadratic.is_empty()
    }

    /// Every variable the expression mentions.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<VariableId> {
        self.linear
            .keys()
            .copied()
            .chain(self.quadratic.keys().flat_map(|&(a, b)| [a, b]))
            .collect()
    }

    /// Value under `assignment`.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "expression evaluation")]
    pub fn evaluate(&self, assignment: &Assignment) -> f64 {
        let linear: f64 = self
            .linear
            .iter()
            .filter(|(id, _)| assignment.is_active(**id))
            .map(|(_, coefficient)| coefficient)
            .sum();
        let quadratic: f64 = self
            .quadratic
            .iter()
            .filter(|((a, b), _)| assignment.is_active(*a) && assignment.is_active(*b))
            .map(|(_, coefficient)| coefficient)
            .sum();
        self.constant + linear + quadratic
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct ExpressionRepr {
    constant: f64,
    linear: Vec<(VariableId, f64)>,
    quadratic: Vec<(VariableId, VariableId, f64)>,
}

#[cfg(feature = "serde")]
impl From<Expression> for ExpressionRepr {
    fn from(expr: Expression) -> Self {
        Self {
            constant: expr.constant,
            linear: expr.linear.into_iter().collect(),
            quadratic: expr
                .quadratic
                .into_iter()
                .map(|((a, b), coefficient)| (a, b, coefficient))
                .collect(),
        }
    }
}

#[cfg(feature = "serde")]
impl From<ExpressionRepr> for Expression {
    fn from(repr: ExpressionRepr) -> Self {
        let mut expr = Self::constant(repr.constant);
        for (id, coefficient) in repr.linear {
            expr.add_term(id, coefficient);
        }
        for (a, b, coefficient) in repr.quadratic {
            expr.add_product(a, b, coefficient);
        }
        expr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn repeated_terms_accumulate() {
        let a = VariableId(0);
        let expr = Expression::sum([a, a, VariableId(1)]);
        let terms: Vec<(VariableId, f64)> = expr.linear_terms().collect();
        assert_eq!(terms, vec![(a, 2.0), (VariableId(1), 1.0)]);
    }

    #[rstest]
    fn products_are_unordered() {
        let (a, b) = (VariableId(3), VariableId(1));
        let expr = Expression::new()
            .with_product(a, b, 1.0)
            .with_product(b, a, 2.0);
        let terms: Vec<(VariableId, VariableId, f64)> = expr.quadratic_terms().collect();
        assert_eq!(terms, vec![(b, a, 3.0)]);
        assert!(expr.is_quadratic());
    }

    #[rstest]
    #[case(&[], 1.0)]
    #[case(&[0], 0.0)]
    #[case(&[0, 1], 1.0)]
    #[case(&[1], 1.0)]
    fn continuation_shape_evaluates(#[case] active: &[usize], #[case] expected: f64) {
        let (uv, vw) = (VariableId(0), VariableId(1));
        let expr = Expression::constant(1.0)
            .with_term(uv, -1.0)
            .with_product(uv, vw, 1.0);
        let assignment = Assignment::from_active(active.iter().copied().map(VariableId));
        assert_eq!(expr.evaluate(&assignment), expected);
    }

    #[rstest]
    fn variables_cover_products() {
        let expr = Expression::sum([VariableId(2)]).with_product(VariableId(5), VariableId(7), 1.0);
        let vars: Vec<VariableId> = expr.variables().into_iter().collect();
        assert_eq!(vars, vec![VariableId(2), VariableId(5), VariableId(7)]);
    }
}
