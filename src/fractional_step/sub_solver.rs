//! Sub-solvers of the momentum and continuity step
use super::assembly::Assemble;
use crate::field::{FieldStore, Variable};
use crate::process::{Model, ProcessInfo};
use crate::solver::{LinearSolve, Solver};
use crate::types::TimeLevel;
use ndarray::{Array1, Array2};

/// Solve operation of one sub-problem of the fractional step.
pub trait SubSolver {
    /// Prepare the solver for a new time step, called once
    /// before the first [`SubSolver::solve`] of every step.
    fn initialize_step(&mut self, model: &Model, process: &ProcessInfo);

    /// Update the owned field in place. Returns the L2 norm
    /// of the update, NaN if the solve broke down.
    fn solve(&mut self, model: &mut Model, process: &ProcessInfo) -> f64;

    /// Release degrees of freedom and system storage
    fn clear(&mut self);
}

/// Free (node, component) pairs of a variable, numbered
/// consecutively.
#[derive(Debug, Clone)]
pub struct DofSet {
    components: usize,
    equation_id: Vec<Option<usize>>,
    dofs: Vec<(usize, usize)>,
}

impl DofSet {
    /// Collect the free components `0..components` of `var`
    pub fn new(fields: &FieldStore, var: Variable, components: usize) -> Self {
        let n_nodes = fields.n_nodes();
        let mut equation_id = vec![None; n_nodes * components];
        let mut dofs = Vec::new();
        for node in 0..n_nodes {
            for comp in 0..components {
                if !fields.is_fixed(node, var, comp) {
                    equation_id[node * components + comp] = Some(dofs.len());
                    dofs.push((node, comp));
                }
            }
        }
        Self {
            components,
            equation_id,
            dofs,
        }
    }

    /// Number of equations
    pub fn len(&self) -> usize {
        self.dofs.len()
    }

    /// No free dof
    pub fn is_empty(&self) -> bool {
        self.dofs.is_empty()
    }

    /// Number of components per node
    pub fn components(&self) -> usize {
        self.components
    }

    /// Equation of a component, `None` if fixed
    pub fn equation_id(&self, node: usize, component: usize) -> Option<usize> {
        self.equation_id[node * self.components + component]
    }

    /// (node, component) pairs in equation order
    pub fn iter(&self) -> impl Iterator<Item = &(usize, usize)> {
        self.dofs.iter()
    }
}

/// Residual based linear sub-solver.
///
/// Assembles `lhs dx = rhs` at the free dofs, solves it with the
/// linear backend and adds `dx` to the current level.
#[derive(Debug, Clone)]
pub struct LinearStrategy<A> {
    variable: Variable,
    components: usize,
    assembler: A,
    solver: Solver,
    increment: Option<Variable>,
    dofs: Option<DofSet>,
    lhs: Array2<f64>,
    rhs: Array1<f64>,
    dx: Array1<f64>,
}

impl<A: Assemble> LinearStrategy<A> {
    /// Solve for components `0..components` of `variable`
    pub fn new(variable: Variable, components: usize, assembler: A, solver: Solver) -> Self {
        Self {
            variable,
            components,
            assembler,
            solver,
            increment: None,
            dofs: None,
            lhs: Array2::zeros((0, 0)),
            rhs: Array1::zeros(0),
            dx: Array1::zeros(0),
        }
    }

    /// Store every update also in `increment` (zero at fixed dofs)
    pub fn with_increment(mut self, increment: Variable) -> Self {
        self.increment = Some(increment);
        self
    }

    /// Current dof set, if built
    pub fn dofs(&self) -> Option<&DofSet> {
        self.dofs.as_ref()
    }

    fn setup(&mut self, fields: &FieldStore) {
        let dofs = DofSet::new(fields, self.variable, self.components);
        let n = dofs.len();
        log::debug!("{}: {} free dofs", self.variable.name(), n);
        self.lhs = Array2::zeros((n, n));
        self.rhs = Array1::zeros(n);
        self.dx = Array1::zeros(n);
        self.dofs = Some(dofs);
    }
}

impl<A: Assemble> SubSolver for LinearStrategy<A> {
    fn initialize_step(&mut self, model: &Model, _process: &ProcessInfo) {
        if self.dofs.is_none() {
            self.setup(&model.fields);
        }
    }

    fn solve(&mut self, model: &mut Model, process: &ProcessInfo) -> f64 {
        if self.dofs.is_none() {
            self.setup(&model.fields);
        }
        let dofs = match &self.dofs {
            Some(dofs) => dofs,
            None => return f64::NAN,
        };
        self.lhs.fill(0.);
        self.rhs.fill(0.);
        self.dx.fill(0.);
        if let Err(e) = self
            .assembler
            .assemble(model, process, dofs, &mut self.lhs, &mut self.rhs)
        {
            log::error!("{}: assembly failed: {}", self.variable.name(), e);
            return f64::NAN;
        }
        if let Err(e) = self.solver.solve(&self.lhs, &self.rhs, &mut self.dx) {
            log::error!("{}: linear solver failed: {}", self.variable.name(), e);
            return f64::NAN;
        }

        let field = model.fields.field_mut(self.variable);
        for (&(node, comp), dx) in dofs.iter().zip(self.dx.iter()) {
            field.v[[node, comp]] += dx;
        }
        if let Some(increment) = self.increment {
            model.fields.set_to_zero(increment);
            let field = model.fields.field_mut(increment);
            for (&(node, comp), dx) in dofs.iter().zip(self.dx.iter()) {
                field.v[[node, comp]] = *dx;
            }
        }
        self.dx.dot(&self.dx).sqrt()
    }

    fn clear(&mut self) {
        self.dofs = None;
        self.lhs = Array2::zeros((0, 0));
        self.rhs = Array1::zeros(0);
        self.dx = Array1::zeros(0);
    }
}
