//! Cubic B-spline free-form deformation.
//!
//! The displacement at a point is a tensor-product cubic B-spline over a
//! regular grid of control points. Each point is influenced by the `4^D`
//! surrounding control points only, so the parameter Jacobian is sparse.

use crate::spatial::{Point, Spacing, Vector};
use super::trait_::{Transform, TransformJacobian};

/// Cubic B-spline transform `T(x) = x + sum_k w_k(x) c_k`.
///
/// Parameters: control point displacements stored dimension-major, i.e. all
/// `x` components for every control point, then all `y` components, and so
/// on. Control points are ordered with grid index 0 varying fastest.
///
/// Points whose cubic support would reach past the control grid are outside
/// the transform's support and are not mapped.
#[derive(Debug, Clone, PartialEq)]
pub struct BSplineTransform<const D: usize> {
    grid_size: [usize; D],
    grid_strides: [usize; D],
    grid_origin: Point<D>,
    grid_spacing: Spacing<D>,
    coefficients: Vec<f64>,
}

/// Control points touched along one axis.
const SUPPORT: usize = 4;

/// Cubic B-spline basis weights for the local coordinate `t` in `[0, 1]`.
fn cubic_weights(t: f64) -> [f64; SUPPORT] {
    let t2 = t * t;
    let t3 = t2 * t;
    let s = 1.0 - t;
    [
        s * s * s / 6.0,
        (3.0 * t3 - 6.0 * t2 + 4.0) / 6.0,
        (-3.0 * t3 + 3.0 * t2 + 3.0 * t + 1.0) / 6.0,
        t3 / 6.0,
    ]
}

impl<const D: usize> BSplineTransform<D> {
    /// Zero-displacement transform on an explicit control grid.
    ///
    /// # Panics
    /// Panics if any grid axis has fewer than 4 control points.
    pub fn new(grid_size: [usize; D], grid_origin: Point<D>, grid_spacing: Spacing<D>) -> Self {
        assert!(
            grid_size.iter().all(|&n| n >= SUPPORT),
            "B-spline grid needs at least {} control points per axis, got {:?}",
            SUPPORT,
            grid_size
        );
        assert!(grid_spacing.is_valid_spacing(), "Grid spacing must be positive");
        let mut grid_strides = [0usize; D];
        let mut stride = 1;
        for d in 0..D {
            grid_strides[d] = stride;
            stride *= grid_size[d];
        }
        Self {
            grid_size,
            grid_strides,
            grid_origin,
            grid_spacing,
            coefficients: vec![0.0; D * stride],
        }
    }

    /// Grid covering the box `[origin, origin + extent]` with `mesh_size`
    /// B-spline patches per axis (`mesh_size + 3` control points).
    pub fn covering(origin: Point<D>, extent: [f64; D], mesh_size: [usize; D]) -> Self {
        let spacing = Spacing::new(std::array::from_fn(|d| extent[d] / mesh_size[d].max(1) as f64));
        let grid_origin = origin - spacing;
        let grid_size = mesh_size.map(|m| m.max(1) + 3);
        Self::new(grid_size, grid_origin, spacing)
    }

    /// Control points per axis.
    pub fn grid_size(&self) -> [usize; D] {
        self.grid_size
    }

    /// Physical spacing between control points.
    pub fn grid_spacing(&self) -> &Spacing<D> {
        &self.grid_spacing
    }

    /// Number of control points.
    pub fn number_of_control_points(&self) -> usize {
        self.grid_size.iter().product()
    }

    /// Control point displacements (the parameter vector).
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Number of parameters influencing any single point.
    pub fn number_of_nonzero_jacobian_indices(&self) -> usize {
        D * SUPPORT.pow(D as u32)
    }

    /// First control point index and per-axis weights of the support region
    /// containing `point`.
    fn support(&self, point: &Point<D>) -> Option<([usize; D], [[f64; SUPPORT]; D])> {
        let mut base = [0usize; D];
        let mut weights = [[0.0; SUPPORT]; D];
        for d in 0..D {
            let u = (point[d] - self.grid_origin[d]) / self.grid_spacing[d];
            let upper = (self.grid_size[d] - 2) as f64;
            if !(u >= 1.0 && u <= upper) {
                return None;
            }
            let cell = u.floor().min(upper - 1.0);
            base[d] = cell as usize - 1;
            weights[d] = cubic_weights(u - cell);
        }
        Some((base, weights))
    }

    /// Visit every control point in the support of a point with its global
    /// node index and tensor-product weight.
    fn for_each_node(&self, base: &[usize; D], weights: &[[f64; SUPPORT]; D], mut f: impl FnMut(usize, usize, f64)) {
        let count = SUPPORT.pow(D as u32);
        for k in 0..count {
            let mut rest = k;
            let mut node = 0;
            let mut weight = 1.0;
            for d in 0..D {
                let offset = rest % SUPPORT;
                rest /= SUPPORT;
                node += (base[d] + offset) * self.grid_strides[d];
                weight *= weights[d][offset];
            }
            f(k, node, weight);
        }
    }
}

impl<const D: usize> Transform<D> for BSplineTransform<D> {
    fn number_of_parameters(&self) -> usize {
        self.coefficients.len()
    }

    fn parameters(&self) -> Vec<f64> {
        self.coefficients.clone()
    }

    fn set_parameters(&mut self, parameters: &[f64]) {
        assert_eq!(
            parameters.len(),
            self.coefficients.len(),
            "B-spline expects {} parameters",
            self.coefficients.len()
        );
        self.coefficients.copy_from_slice(parameters);
    }

    fn transform_point(&self, point: &Point<D>) -> Option<Point<D>> {
        let (base, weights) = self.support(point)?;
        let nodes = self.number_of_control_points();
        let mut displacement = Vector::<D>::zeros();
        self.for_each_node(&base, &weights, |_, node, weight| {
            for d in 0..D {
                displacement[d] += weight * self.coefficients[d * nodes + node];
            }
        });
        Some(*point + displacement)
    }

    fn jacobian(&self, point: &Point<D>) -> TransformJacobian<D> {
        let Some((base, weights)) = self.support(point) else {
            return TransformJacobian::zeros(Vec::new());
        };
        let nodes = self.number_of_control_points();
        let per_dim = SUPPORT.pow(D as u32);

        let mut node_indices = vec![0usize; per_dim];
        let mut node_weights = vec![0.0; per_dim];
        self.for_each_node(&base, &weights, |k, node, weight| {
            node_indices[k] = node;
            node_weights[k] = weight;
        });

        let mut indices = Vec::with_capacity(D * per_dim);
        for d in 0..D {
            indices.extend(node_indices.iter().map(|&node| d * nodes + node));
        }
        let mut jacobian = TransformJacobian::zeros(indices);
        let matrix = jacobian.matrix_mut();
        for d in 0..D {
            for (k, &weight) in node_weights.iter().enumerate() {
                matrix[(d, d * per_dim + k)] = weight;
            }
        }
        jacobian
    }
}
