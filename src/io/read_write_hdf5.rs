//! `Hdf5` functions to write ndarrays
use super::H5Type;
use super::Result;
use ndarray::{Array, Array1, ArrayBase, ArrayD, Dimension};
use std::path::Path;

/// Read scalar from hdf5
///
/// # Errors
/// When file or variable does not exists, or when the
/// variable is not of dimensionality 1.
pub fn read_scalar_from_hdf5<T>(filename: &str, name: &str) -> Result<T>
where
    T: H5Type + Copy,
{
    let scalar: Array1<T> = read_from_hdf5(filename, name)?;
    scalar
        .iter()
        .next()
        .copied()
        .ok_or_else(|| hdf5::Error::Internal(format!("{} is empty", name)))
}

/// Interface to write scalar to hdf5 file
///
/// # Errors
/// When file can not be created.
pub fn write_scalar_to_hdf5<T>(filename: &str, name: &str, scalar: T) -> Result<()>
where
    T: H5Type + Copy,
{
    let x = Array1::<T>::from_elem(1, scalar);
    write_to_hdf5(filename, name, &x)
}

/// Read ndarray from hdf5 file
///
/// # Errors
/// Errors when file/variable does not exist and
/// when the stored dimensionality differs from `D`.
pub fn read_from_hdf5<A, D>(filename: &str, varname: &str) -> Result<Array<A, D>>
where
    A: H5Type,
    D: Dimension,
{
    let file = hdf5::File::open(filename)?;
    let data = file.dataset(varname)?;
    let y: ArrayD<A> = data.read_dyn::<A>()?;

    // Dyn to static
    y.into_dimensionality::<D>().map_err(|e| {
        hdf5::Error::Internal(format!("{}: {}", varname, e))
    })
}

/// Write ndarray to hdf5 file
///
/// Appends to existing files, existing variables are overwritten.
///
/// # Errors
/// When file can not be created or when the variable
/// exists with a different shape than `array`.
pub fn write_to_hdf5<A, S, D>(filename: &str, varname: &str, array: &ArrayBase<S, D>) -> Result<()>
where
    A: H5Type,
    S: ndarray::Data<Elem = A>,
    D: Dimension,
{
    let file = if Path::new(filename).exists() {
        hdf5::File::append(filename)?
    } else {
        hdf5::File::create(filename)?
    };

    let dset = match file.dataset(varname) {
        Ok(dset) => dset,
        Err(..) => file
            .new_dataset::<A>()
            .no_chunk()
            .shape(array.shape())
            .create(varname)?,
    };
    dset.write(&array.view())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_write_read_array_and_scalar() {
        let dir = std::env::temp_dir().join("fracstep_test_io.h5");
        let filename = dir.to_str().unwrap();
        let _ = std::fs::remove_file(filename);
        let x = array![[1., 2.], [3., 4.], [5., 6.]];
        write_to_hdf5(filename, "group/x", &x).unwrap();
        write_scalar_to_hdf5(filename, "time", 0.25).unwrap();
        let y: Array2<f64> = read_from_hdf5(filename, "group/x").unwrap();
        assert_eq!(x, y);
        let t: f64 = read_scalar_from_hdf5(filename, "time").unwrap();
        assert_eq!(t, 0.25);
        assert!(read_from_hdf5::<f64, ndarray::Ix1>(filename, "group/x").is_err());
        std::fs::remove_file(filename).unwrap();
    }
}
