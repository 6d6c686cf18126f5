//! # Simplex mesh
//! Node coordinates and element connectivity.
//!
//! Elements are linear triangles (2-D) or linear tetrahedra (3-D).
//! The mesh is read-only for the iteration controller, all mutable
//! nodal data lives in the [`crate::field::FieldStore`].
pub mod geometry;
use crate::types::DomainSize;
use crate::{Error, Result};
use ndarray::{Array1, Array2};

/// Element of the mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Identity
    pub id: usize,
    /// Ordered incident nodes
    pub nodes: Vec<usize>,
}

/// Mesh of simplex elements
#[derive(Debug, Clone)]
pub struct Mesh {
    domain_size: DomainSize,
    /// Node coordinates (x, y, z), one row per node
    coords: Array2<f64>,
    elements: Vec<Element>,
}

impl Mesh {
    /// Create mesh from coordinates and connectivity.
    /// Element ids are the positions in `connectivity`.
    ///
    /// Use [`Mesh::check`] to validate the input.
    pub fn new(domain_size: DomainSize, coords: Array2<f64>, connectivity: Vec<Vec<usize>>) -> Self {
        let elements = connectivity
            .into_iter()
            .enumerate()
            .map(|(id, nodes)| Element { id, nodes })
            .collect();
        Self {
            domain_size,
            coords,
            elements,
        }
    }

    /// Structured triangulation of the rectangle \[0, lx\] x \[0, ly\]
    /// with `nx` x `ny` cells, each split into two triangles.
    ///
    /// Nodes are numbered row by row, starting at the origin.
    pub fn rectangle(nx: usize, ny: usize, lx: f64, ly: f64) -> Self {
        let mut coords = Array2::<f64>::zeros(((nx + 1) * (ny + 1), 3));
        for j in 0..=ny {
            for i in 0..=nx {
                let n = j * (nx + 1) + i;
                coords[[n, 0]] = lx * i as f64 / nx as f64;
                coords[[n, 1]] = ly * j as f64 / ny as f64;
            }
        }
        let mut connectivity = Vec::with_capacity(2 * nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let n0 = j * (nx + 1) + i;
                let n1 = n0 + 1;
                let n2 = n0 + nx + 1;
                let n3 = n2 + 1;
                connectivity.push(vec![n0, n1, n3]);
                connectivity.push(vec![n0, n3, n2]);
            }
        }
        Self::new(DomainSize::Two, coords, connectivity)
    }

    /// Spatial dimension
    pub fn domain_size(&self) -> DomainSize {
        self.domain_size
    }

    /// Number of nodes
    pub fn n_nodes(&self) -> usize {
        self.coords.nrows()
    }

    /// Number of elements
    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    /// Node coordinates
    pub fn coordinates(&self) -> &Array2<f64> {
        &self.coords
    }

    /// All elements
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Coordinates of the element nodes, one row per node
    pub fn element_coordinates(&self, element: &Element) -> Array2<f64> {
        self.coords.select(ndarray::Axis(0), &element.nodes)
    }

    /// Area (2-D) or volume (3-D) of an element
    pub fn measure(&self, element: &Element) -> f64 {
        geometry::measure(self.domain_size, &self.element_coordinates(element))
    }

    /// Gradients of the linear shape functions of an element
    ///
    /// # Errors
    /// Degenerate element
    pub fn shape_gradients(&self, element: &Element) -> Result<Array2<f64>> {
        geometry::shape_gradients(self.domain_size, &self.element_coordinates(element))
    }

    /// Lumped nodal measure (area / volume share of surrounding elements).
    pub fn nodal_volume(&self) -> Array1<f64> {
        let share = self.domain_size.nodal_share();
        let mut volume = Array1::<f64>::zeros(self.n_nodes());
        for element in &self.elements {
            let m = self.measure(element) * share;
            for &node in &element.nodes {
                volume[node] += m;
            }
        }
        volume
    }

    /// Check consistency of the mesh: coordinate layout, number of
    /// element nodes, node indices, element measure and orphan nodes.
    ///
    /// # Errors
    /// First inconsistency found
    pub fn check(&self) -> Result<()> {
        if self.coords.ncols() != 3 {
            return Err(Error::SizeMismatch {
                name: "coordinates columns".to_owned(),
                expected: 3,
                actual: self.coords.ncols(),
            });
        }
        let n_nodes = self.n_nodes();
        let nodes_per_element = self.domain_size.nodes_per_element();
        for element in &self.elements {
            if element.nodes.len() != nodes_per_element {
                return Err(Error::InvalidMesh(format!(
                    "element {} has {} nodes, expected {}",
                    element.id,
                    element.nodes.len(),
                    nodes_per_element
                )));
            }
            if let Some(node) = element.nodes.iter().find(|&&n| n >= n_nodes) {
                return Err(Error::InvalidMesh(format!(
                    "element {} references node {} of {}",
                    element.id, node, n_nodes
                )));
            }
            if self.measure(element) <= 0. {
                return Err(Error::InvalidMesh(format!(
                    "element {} has zero measure",
                    element.id
                )));
            }
        }
        if let Some(node) = self.nodal_volume().iter().position(|&v| v <= 0.) {
            return Err(Error::InvalidMesh(format!(
                "node {} is not connected to any element",
                node
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle() {
        let mesh = Mesh::rectangle(2, 3, 2., 3.);
        assert_eq!(mesh.n_nodes(), 12);
        assert_eq!(mesh.n_elements(), 12);
        assert!(mesh.check().is_ok());
        let total: f64 = mesh.elements().iter().map(|e| mesh.measure(e)).sum();
        assert!((total - 6.).abs() < 1e-12);
        // lumped measure adds up to the total area
        assert!((mesh.nodal_volume().sum() - 6.).abs() < 1e-12);
    }

    #[test]
    fn test_check_orphan_node() {
        let mut coords = Array2::<f64>::zeros((4, 3));
        coords[[1, 0]] = 1.;
        coords[[2, 1]] = 1.;
        coords[[3, 0]] = 5.;
        let mesh = Mesh::new(DomainSize::Two, coords, vec![vec![0, 1, 2]]);
        assert!(matches!(mesh.check(), Err(Error::InvalidMesh(_))));
    }

    #[test]
    fn test_check_bad_connectivity() {
        let mesh = Mesh::rectangle(1, 1, 1., 1.);
        let coords = mesh.coordinates().clone();
        let mesh = Mesh::new(DomainSize::Two, coords.clone(), vec![vec![0, 1, 7]]);
        assert!(mesh.check().is_err());
        let mesh = Mesh::new(DomainSize::Two, coords, vec![vec![0, 1]]);
        assert!(mesh.check().is_err());
    }
}
