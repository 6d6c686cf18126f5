//! Snapshot io of the [`FieldStore`]
//!
//! Each variable is stored as group `<prefix>/<name>` holding
//! both time levels (`v`, `v_old`) and the fixed mask (`fixed`,
//! stored as `u8`).
use super::{FieldStore, Variable};
use crate::io::{read_from_hdf5, write_to_hdf5, Result};
use ndarray::{Array2, Ix2};

impl FieldStore {
    /// Write all variables to hdf5 file
    ///
    /// # Errors
    /// Can't write file
    pub fn write(&self, filename: &str, prefix: &str) -> Result<()> {
        for var in Variable::ALL {
            let field = self.field(var);
            let group = format!("{}/{}", prefix, var.name());
            write_to_hdf5(filename, &format!("{}/v", group), &field.v)?;
            write_to_hdf5(filename, &format!("{}/v_old", group), &field.v_old)?;
            let fixed = field.fixed.mapv(u8::from);
            write_to_hdf5(filename, &format!("{}/fixed", group), &fixed)?;
        }
        Ok(())
    }

    /// Read all variables from hdf5 file
    ///
    /// The store is only modified if every variable could be
    /// read.
    ///
    /// # Errors
    /// Can't read file, or the number of nodes of the
    /// file differs from this store.
    pub fn read(&mut self, filename: &str, prefix: &str) -> Result<()> {
        let mut snapshot = Vec::with_capacity(Variable::ALL.len());
        for var in Variable::ALL {
            let group = format!("{}/{}", prefix, var.name());
            let v: Array2<f64> = read_from_hdf5::<f64, Ix2>(filename, &format!("{}/v", group))?;
            let v_old: Array2<f64> =
                read_from_hdf5::<f64, Ix2>(filename, &format!("{}/v_old", group))?;
            let fixed: Array2<u8> =
                read_from_hdf5::<u8, Ix2>(filename, &format!("{}/fixed", group))?;
            let field = self.field(var);
            if v.shape() != field.v.shape()
                || v_old.shape() != field.v_old.shape()
                || fixed.shape() != field.fixed.shape()
            {
                return Err(hdf5::Error::Internal(format!(
                    "Shape mismatch while reading {}.",
                    group
                )));
            }
            snapshot.push((var, v, v_old, fixed));
        }
        for (var, v, v_old, fixed) in snapshot {
            let field = self.field_mut(var);
            field.v = v;
            field.v_old = v_old;
            field.fixed = fixed.mapv(|x| x != 0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeLevel;

    #[test]
    fn test_write_read_fields() {
        let path = std::env::temp_dir().join("fracstep_test_fields.h5");
        let filename = path.to_str().unwrap();
        let _ = std::fs::remove_file(filename);
        let mut fields = FieldStore::new(3);
        fields.fix(2, Variable::Velocity, 1, 0.5);
        fields.set(1, Variable::Pressure, 0, TimeLevel::Previous, -3.);
        fields.write(filename, "fields").unwrap();

        let mut other = FieldStore::new(3);
        other.read(filename, "fields").unwrap();
        assert!(other.is_fixed(2, Variable::Velocity, 1));
        assert_eq!(other.get(2, Variable::Velocity, 1, TimeLevel::Current), 0.5);
        assert_eq!(other.get(1, Variable::Pressure, 0, TimeLevel::Previous), -3.);

        let mut wrong_size = FieldStore::new(4);
        assert!(wrong_size.read(filename, "fields").is_err());
        std::fs::remove_file(filename).unwrap();
    }

    #[test]
    fn test_failed_read_keeps_store() {
        let path = std::env::temp_dir().join("fracstep_test_fields_truncated.h5");
        let filename = path.to_str().unwrap();
        let _ = std::fs::remove_file(filename);
        let mut fields = FieldStore::new(3);
        fields.set(0, Variable::Velocity, 0, TimeLevel::Current, 7.);
        fields.write(filename, "fields").unwrap();
        // pressure increment holds one node less
        let short = Array2::<f64>::zeros((2, 1));
        for var in Variable::ALL {
            let group = format!("truncated/{}", var.name());
            let field = fields.field(var);
            if var == Variable::PressureIncrement {
                write_to_hdf5(filename, &format!("{}/v", group), &short).unwrap();
            } else {
                write_to_hdf5(filename, &format!("{}/v", group), &field.v).unwrap();
            }
            write_to_hdf5(filename, &format!("{}/v_old", group), &field.v_old).unwrap();
            write_to_hdf5(filename, &format!("{}/fixed", group), &field.fixed.mapv(u8::from))
                .unwrap();
        }

        let mut other = FieldStore::new(3);
        other.set(0, Variable::Velocity, 0, TimeLevel::Current, -1.);
        other.fix(1, Variable::Pressure, 0, 2.);
        let before = other.clone();
        assert!(other.read(filename, "truncated").is_err());
        for var in Variable::ALL {
            assert_eq!(other.field(var).v, before.field(var).v);
            assert_eq!(other.field(var).v_old, before.field(var).v_old);
            assert_eq!(other.field(var).fixed, before.field(var).fixed);
        }
        std::fs::remove_file(filename).unwrap();
    }
}
