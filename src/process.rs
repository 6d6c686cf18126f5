//! Process context and the model handed to every collaborator
use crate::field::FieldStore;
use crate::mesh::Mesh;
use crate::types::DomainSize;

/// Phase of the fractional step, set by the iteration
/// controller before each collaborator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FractionalStep {
    /// Momentum (velocity) solve
    Momentum,
    /// Continuity (pressure) solve
    Continuity,
    /// End of step velocity correction
    Projection,
    /// Stress and strain update of the elements
    StateUpdate,
}

/// Shared process context
#[derive(Debug, Clone)]
pub struct ProcessInfo {
    /// Current time
    pub time: f64,
    /// Time step size
    pub delta_time: f64,
    /// Time step counter
    pub step: usize,
    /// Current phase of the fractional step
    pub fractional_step: FractionalStep,
    /// Last momentum solve was bad
    pub bad_velocity_convergence: bool,
    /// Last continuity solve was bad
    pub bad_pressure_convergence: bool,
}

impl ProcessInfo {
    /// Context at time zero
    pub fn new(delta_time: f64) -> Self {
        Self {
            time: 0.,
            delta_time,
            step: 0,
            fractional_step: FractionalStep::Momentum,
            bad_velocity_convergence: false,
            bad_pressure_convergence: false,
        }
    }

    /// Move to the next time step
    pub fn advance(&mut self) {
        self.time += self.delta_time;
        self.step += 1;
    }

    /// True while `time < steps * delta_time`
    pub fn is_warm_up(&self, steps: usize) -> bool {
        self.time < steps as f64 * self.delta_time
    }
}

/// Mesh together with its nodal fields
#[derive(Debug, Clone)]
pub struct Model {
    /// Geometry and connectivity
    pub mesh: Mesh,
    /// Nodal values
    pub fields: FieldStore,
}

impl Model {
    /// Allocate the fields of every node and initialize
    /// the nodal volume from the mesh.
    pub fn new(mesh: Mesh) -> Self {
        let mut fields = FieldStore::new(mesh.n_nodes());
        let volume = mesh.nodal_volume();
        fields
            .field_mut(crate::field::Variable::NodalVolume)
            .v
            .column_mut(0)
            .assign(&volume);
        Self { mesh, fields }
    }

    /// Spatial dimension
    pub fn domain_size(&self) -> DomainSize {
        self.mesh.domain_size()
    }
}
