//! Reduction across mesh partitions
//!
//! A serial run uses [`Serial`], where every reduction is the
//! identity. With the `mpi` feature, [`MpiCommunicator`] sums
//! over all processors of the universe.
use ndarray::Array2;

/// Collective operations needed by the iteration controller.
///
/// Both calls are blocking and must be entered by every partition.
pub trait Communicator {
    /// Sum a scalar over all partitions
    fn sum_all(&self, local: f64) -> f64;

    /// Sum contributions of nodes shared between partitions,
    /// one row per node.
    fn assemble(&self, data: &mut Array2<f64>);
}

/// Single partition, reductions are no-ops
#[derive(Debug, Clone, Copy, Default)]
pub struct Serial;

impl Communicator for Serial {
    fn sum_all(&self, local: f64) -> f64 {
        local
    }

    fn assemble(&self, _data: &mut Array2<f64>) {}
}

#[cfg(feature = "mpi")]
pub use self::parallel::MpiCommunicator;
#[cfg(feature = "mpi")]
pub use funspace::mpi::{initialize, Universe};

#[cfg(feature = "mpi")]
mod parallel {
    use super::Communicator;
    use funspace::mpi::{all_gather_sum, Universe};
    use ndarray::Array2;

    /// Communicator over all processors of an mpi universe
    ///
    /// `shared_nodes` lists the local indices of nodes on partition
    /// boundaries, in an order which is identical on every processor.
    pub struct MpiCommunicator {
        universe: Universe,
        shared_nodes: Vec<usize>,
    }

    impl MpiCommunicator {
        /// New communicator
        pub fn new(universe: Universe, shared_nodes: Vec<usize>) -> Self {
            Self {
                universe,
                shared_nodes,
            }
        }

        /// Mpi universe
        pub fn universe(&self) -> &Universe {
            &self.universe
        }
    }

    impl Communicator for MpiCommunicator {
        fn sum_all(&self, local: f64) -> f64 {
            let mut global = 0.;
            all_gather_sum(&self.universe, &local, &mut global);
            global
        }

        fn assemble(&self, data: &mut Array2<f64>) {
            for &node in &self.shared_nodes {
                for x in data.row_mut(node).iter_mut() {
                    let local = *x;
                    all_gather_sum(&self.universe, &local, x);
                }
            }
        }
    }
}
