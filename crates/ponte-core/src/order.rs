//! NL index ordering.
//!
//! NL readers require a strict layout: nonlinear variables before linear
//! ones, with integrality partitions inside each group, and nonlinear
//! constraints before linear ones. This module builds the forward and
//! reverse permutations between user indices and 0-based NL positions.

use crate::types::{VarCategory, VarLinearity};
use ponte_expr::{Linearity, VariableId};
use std::collections::BTreeMap;

/// Forward/reverse permutations for variables and constraints.
#[derive(Debug, Clone)]
pub struct IndexMapper {
    /// Variable id -> 0-based NL column.
    pub var_forward: BTreeMap<VariableId, usize>,
    /// NL column -> variable id.
    pub var_reverse: Vec<VariableId>,
    /// Constraint position (0-based user order) -> NL row.
    pub con_forward: Vec<usize>,
    /// NL row -> constraint position.
    pub con_reverse: Vec<usize>,
}

impl IndexMapper {
    /// Build the permutations from per-variable and per-constraint tags.
    ///
    /// Variable buckets, in NL order: nonlinear continuous, nonlinear
    /// integer (binary counts as integer here), linear continuous, linear
    /// binary, linear integer. A variable is nonlinear if it is tagged
    /// nonlinear in the objective or any constraint. Original order is
    /// preserved inside each bucket.
    pub fn build(
        categories: &[VarCategory],
        var_linearities: &[VarLinearity],
        con_linearities: &[Linearity],
    ) -> Self {
        let nvar = categories.len();
        let mut var_reverse = Vec::with_capacity(nvar);

        let buckets: [&dyn Fn(VarCategory, VarLinearity) -> bool; 5] = [
            &|cat, lin| lin.is_nonlinear() && cat == VarCategory::Continuous,
            &|cat, lin| lin.is_nonlinear() && cat.is_discrete(),
            &|cat, lin| !lin.is_nonlinear() && cat == VarCategory::Continuous,
            &|cat, lin| !lin.is_nonlinear() && cat == VarCategory::Binary,
            &|cat, lin| !lin.is_nonlinear() && cat == VarCategory::Integer,
        ];
        for bucket in buckets {
            for position in 0..nvar {
                if bucket(categories[position], var_linearities[position]) {
                    var_reverse.push(VariableId::new(position as u32 + 1));
                }
            }
        }

        let var_forward = var_reverse
            .iter()
            .enumerate()
            .map(|(nl, id)| (*id, nl))
            .collect();

        let mut con_reverse = Vec::with_capacity(con_linearities.len());
        for (position, linearity) in con_linearities.iter().enumerate() {
            if *linearity == Linearity::Nonlinear {
                con_reverse.push(position);
            }
        }
        for (position, linearity) in con_linearities.iter().enumerate() {
            if *linearity != Linearity::Nonlinear {
                con_reverse.push(position);
            }
        }

        let mut con_forward = vec![0; con_reverse.len()];
        for (nl, position) in con_reverse.iter().enumerate() {
            con_forward[*position] = nl;
        }

        IndexMapper {
            var_forward,
            var_reverse,
            con_forward,
            con_reverse,
        }
    }

    /// NL column of a variable.
    pub fn var_to_nl(&self, id: VariableId) -> usize {
        self.var_forward[&id]
    }

    /// Variable at an NL column.
    pub fn var_from_nl(&self, nl: usize) -> VariableId {
        self.var_reverse[nl]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lin(in_constraints: Linearity, in_objective: Linearity) -> VarLinearity {
        VarLinearity {
            in_constraints,
            in_objective,
        }
    }

    #[test]
    fn all_linear_continuous_keeps_order() {
        let mapper = IndexMapper::build(
            &[VarCategory::Continuous; 3],
            &[VarLinearity::linear(); 3],
            &[Linearity::Linear, Linearity::Linear],
        );
        assert_eq!(
            mapper.var_reverse,
            vec![VariableId::new(1), VariableId::new(2), VariableId::new(3)]
        );
        assert_eq!(mapper.con_forward, vec![0, 1]);
    }

    #[test]
    fn nonlinear_variables_come_first() {
        // x1 linear, x2 nonlinear in objective, x3 nonlinear in constraints.
        let mapper = IndexMapper::build(
            &[VarCategory::Continuous; 3],
            &[
                VarLinearity::linear(),
                lin(Linearity::Linear, Linearity::Nonlinear),
                lin(Linearity::Nonlinear, Linearity::Linear),
            ],
            &[],
        );
        assert_eq!(
            mapper.var_reverse,
            vec![VariableId::new(2), VariableId::new(3), VariableId::new(1)]
        );
        assert_eq!(mapper.var_to_nl(VariableId::new(1)), 2);
        assert_eq!(mapper.var_to_nl(VariableId::new(2)), 0);
    }

    #[test]
    fn bucket_order_with_all_categories() {
        // x1 linear integer, x2 nonlinear binary, x3 linear binary,
        // x4 nonlinear continuous, x5 linear continuous.
        let categories = [
            VarCategory::Integer,
            VarCategory::Binary,
            VarCategory::Binary,
            VarCategory::Continuous,
            VarCategory::Continuous,
        ];
        let linearities = [
            VarLinearity::linear(),
            lin(Linearity::Nonlinear, Linearity::Linear),
            VarLinearity::linear(),
            lin(Linearity::Linear, Linearity::Nonlinear),
            VarLinearity::linear(),
        ];
        let mapper = IndexMapper::build(&categories, &linearities, &[]);
        let order: Vec<u32> = mapper.var_reverse.iter().map(|id| id.inner()).collect();
        // nonlinear cont (4), nonlinear discrete (2), linear cont (5),
        // linear binary (3), linear integer (1)
        assert_eq!(order, vec![4, 2, 5, 3, 1]);
    }

    #[test]
    fn forward_and_reverse_are_inverse_bijections() {
        let categories = [
            VarCategory::Continuous,
            VarCategory::Binary,
            VarCategory::Integer,
            VarCategory::Continuous,
        ];
        let linearities = [
            lin(Linearity::Nonlinear, Linearity::Linear),
            VarLinearity::linear(),
            VarLinearity::linear(),
            VarLinearity::linear(),
        ];
        let mapper = IndexMapper::build(&categories, &linearities, &[]);
        assert_eq!(mapper.var_forward.len(), 4);
        assert_eq!(mapper.var_reverse.len(), 4);
        for (id, nl) in &mapper.var_forward {
            assert_eq!(mapper.var_from_nl(*nl), *id);
        }
        let mut nls: Vec<usize> = mapper.var_forward.values().copied().collect();
        nls.sort_unstable();
        assert_eq!(nls, vec![0, 1, 2, 3]);
    }

    #[test]
    fn nonlinear_constraints_come_first() {
        let mapper = IndexMapper::build(
            &[VarCategory::Continuous],
            &[VarLinearity::linear()],
            &[Linearity::Linear, Linearity::Nonlinear, Linearity::Linear],
        );
        assert_eq!(mapper.con_reverse, vec![1, 0, 2]);
        assert_eq!(mapper.con_forward, vec![1, 0, 2]);
    }
}
