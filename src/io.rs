//! # Input / Output
//! Thin `hdf5` helpers to write and read ndarrays and scalars.
//! Every snapshot of the simulation is one `hdf5` file; nodal
//! fields are stored as groups, see [`crate::field::io`].
pub mod read_write_hdf5;
pub use hdf5::H5Type;
pub use read_write_hdf5::{
    read_from_hdf5, read_scalar_from_hdf5, write_scalar_to_hdf5, write_to_hdf5,
};

/// Result of hdf5 routines
pub type Result<T> = hdf5::Result<T>;
