//! # Nodal fields
//! The field store holds every nodal quantity of the simulation
//! at two time levels, the step being solved (`v`) and the
//! converged last step (`v_old`). Vector quantities carry a fixed
//! (Dirichlet) flag per component.
//!
//! All node loops run in parallel, writers always own
//! disjoint rows.
pub mod io;
use crate::mpi::Communicator;
use crate::types::TimeLevel;
use ndarray::{Array2, ArrayViewMut1, Zip};
use serde::{Deserialize, Serialize};

/// Named nodal quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variable {
    /// Velocity (x, y, z)
    Velocity,
    /// Pressure
    Pressure,
    /// Acceleration (x, y, z)
    Acceleration,
    /// Accumulated elemental flux of the projection step (x, y, z)
    FractionalVelocity,
    /// Lumped nodal area (2-D) or volume (3-D)
    NodalVolume,
    /// Last increment of the pressure solve
    PressureIncrement,
}

impl Variable {
    /// All variables, in storage order
    pub const ALL: [Variable; 6] = [
        Variable::Velocity,
        Variable::Pressure,
        Variable::Acceleration,
        Variable::FractionalVelocity,
        Variable::NodalVolume,
        Variable::PressureIncrement,
    ];

    /// Number of components
    pub fn components(self) -> usize {
        match self {
            Self::Velocity | Self::Acceleration | Self::FractionalVelocity => 3,
            Self::Pressure | Self::NodalVolume | Self::PressureIncrement => 1,
        }
    }

    /// Name used in output files
    pub fn name(self) -> &'static str {
        match self {
            Self::Velocity => "velocity",
            Self::Pressure => "pressure",
            Self::Acceleration => "acceleration",
            Self::FractionalVelocity => "fract_vel",
            Self::NodalVolume => "nodal_volume",
            Self::PressureIncrement => "pressure_increment",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Velocity => 0,
            Self::Pressure => 1,
            Self::Acceleration => 2,
            Self::FractionalVelocity => 3,
            Self::NodalVolume => 4,
            Self::PressureIncrement => 5,
        }
    }
}

/// Variables restored when a step is frozen
pub const ROLLBACK_VARIABLES: [Variable; 3] = [
    Variable::Velocity,
    Variable::Pressure,
    Variable::Acceleration,
];

/// Values of one variable, one row per node
#[derive(Debug, Clone)]
pub struct NodalField {
    /// Current time level
    pub v: Array2<f64>,
    /// Previous time level
    pub v_old: Array2<f64>,
    /// Fixed (Dirichlet) flag per component
    pub fixed: Array2<bool>,
}

impl NodalField {
    fn new(n_nodes: usize, components: usize) -> Self {
        Self {
            v: Array2::zeros((n_nodes, components)),
            v_old: Array2::zeros((n_nodes, components)),
            fixed: Array2::from_elem((n_nodes, components), false),
        }
    }

    /// Values at time level
    pub fn level(&self, level: TimeLevel) -> &Array2<f64> {
        match level {
            TimeLevel::Current => &self.v,
            TimeLevel::Previous => &self.v_old,
        }
    }

    /// Mutable values at time level
    pub fn level_mut(&mut self, level: TimeLevel) -> &mut Array2<f64> {
        match level {
            TimeLevel::Current => &mut self.v,
            TimeLevel::Previous => &mut self.v_old,
        }
    }
}

/// Mesh indexed table of nodal quantities
///
/// # Example
/// ```
/// use fracstep::field::{FieldStore, Variable};
/// use fracstep::types::TimeLevel;
/// let mut fields = FieldStore::new(3);
/// fields.set(1, Variable::Velocity, 0, TimeLevel::Current, 2.0);
/// assert_eq!(fields.get(1, Variable::Velocity, 0, TimeLevel::Current), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct FieldStore {
    n_nodes: usize,
    fields: Vec<NodalField>,
}

impl FieldStore {
    /// Allocate all variables for `n_nodes` nodes, initialized with zero
    pub fn new(n_nodes: usize) -> Self {
        let fields = Variable::ALL
            .iter()
            .map(|var| NodalField::new(n_nodes, var.components()))
            .collect();
        Self { n_nodes, fields }
    }

    /// Number of nodes
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Nodal field of a variable
    pub fn field(&self, var: Variable) -> &NodalField {
        &self.fields[var.index()]
    }

    /// Mutable nodal field of a variable
    pub fn field_mut(&mut self, var: Variable) -> &mut NodalField {
        &mut self.fields[var.index()]
    }

    /// Component of a nodal value
    pub fn get(&self, node: usize, var: Variable, component: usize, level: TimeLevel) -> f64 {
        self.field(var).level(level)[[node, component]]
    }

    /// Set component of a nodal value
    pub fn set(&mut self, node: usize, var: Variable, component: usize, level: TimeLevel, value: f64) {
        self.field_mut(var).level_mut(level)[[node, component]] = value;
    }

    /// Is component fixed (Dirichlet)
    pub fn is_fixed(&self, node: usize, var: Variable, component: usize) -> bool {
        self.field(var).fixed[[node, component]]
    }

    /// Prescribe a component, sets the current value and marks it fixed
    pub fn fix(&mut self, node: usize, var: Variable, component: usize, value: f64) {
        let field = self.field_mut(var);
        field.v[[node, component]] = value;
        field.fixed[[node, component]] = true;
    }

    /// Release a fixed component
    pub fn free(&mut self, node: usize, var: Variable, component: usize) {
        self.field_mut(var).fixed[[node, component]] = false;
    }

    /// Set current level of a variable to zero
    pub fn set_to_zero(&mut self, var: Variable) {
        self.field_mut(var).v.par_mapv_inplace(|_| 0.);
    }

    /// Apply `f` to every node of the current level of a variable
    pub fn par_for_each_node<F>(&mut self, var: Variable, f: F)
    where
        F: Fn(usize, ArrayViewMut1<f64>) + Sync + Send,
    {
        Zip::indexed(self.field_mut(var).v.rows_mut()).par_for_each(|node, row| f(node, row));
    }

    /// Sum of squared components over local nodes
    pub fn sum_of_squares(&self, var: Variable, level: TimeLevel) -> f64 {
        self.field(var)
            .level(level)
            .as_slice_memory_order()
            .map_or_else(
                || self.field(var).level(level).iter().map(|x| x * x).sum(),
                |s| {
                    use rayon::prelude::*;
                    s.par_iter().map(|x| x * x).sum()
                },
            )
    }

    /// Global L2 norm, squared sums are reduced across all
    /// partitions before taking the square root.
    pub fn norm_l2(&self, var: Variable, level: TimeLevel, comm: &dyn Communicator) -> f64 {
        comm.sum_all(self.sum_of_squares(var, level)).sqrt()
    }

    /// Copy the previous time level onto the current one.
    ///
    /// Undoes every update of the current step, applying it
    /// twice is the same as applying it once.
    pub fn restore_previous(&mut self, vars: &[Variable]) {
        for &var in vars {
            let field = self.field_mut(var);
            Zip::from(&mut field.v)
                .and(&field.v_old)
                .par_for_each(|v, &v_old| *v = v_old);
        }
    }

    /// Start a new time step: previous level becomes a copy of the
    /// current one, the current level is kept as predictor.
    pub fn clone_time_level(&mut self) {
        for field in &mut self.fields {
            Zip::from(&mut field.v_old)
                .and(&field.v)
                .par_for_each(|v_old, &v| *v_old = v);
        }
    }
}
