//! Radial wavenumber grid construction.

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle};
use crate::spectral::traits::RadialGrid3D;
use ndarray::{ArrayBase, DataMut, Ix3};
use num_traits::Float;
use rustfft::FftNum;

#[cfg(feature = "alloc")]
use ndarray::Array3;

/// Per-axis center indices of a zero-frequency-centered grid.
///
/// For an axis of extent `n` the center is `(n - 1) / 2`, which is not an
/// integer for even `n`; the zero frequency then sits between two cells.
fn grid_centers<F>(shape: [usize; 3]) -> [F; 3]
where
    F: Float + FftNum,
{
    let two = F::from(2.0).unwrap();
    shape.map(|n| (F::from(n).unwrap() - F::one()) / two)
}

fn radial_at<F>(centers: &[F; 3], index: (usize, usize, usize)) -> F
where
    F: Float + FftNum,
{
    let dx = F::from(index.0).unwrap() - centers[0];
    let dy = F::from(index.1).unwrap() - centers[1];
    let dz = F::from(index.2).unwrap() - centers[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Constructor config for [`RadialGridKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadialGridConfig {
    /// Extents of the 3D grid, one per spatial axis.
    pub shape: [usize; 3],
}

/// Trait-first radial wavenumber grid kernel.
///
/// Produces a grid in which every cell holds its Euclidean distance, in
/// index units, from the geometric center of the grid. The grid must be
/// built with the exact shape of the power grid it is paired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadialGridKernel {
    shape: [usize; 3],
}

impl RadialGridKernel {
    /// Return the configured grid shape.
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }
}

impl KernelLifecycle for RadialGridKernel {
    type Config = RadialGridConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.shape.iter().any(|&n| n == 0) {
            return Err(ConfigError::InvalidArgument {
                arg: "shape",
                reason: "every grid extent must be greater than zero",
            });
        }
        Ok(Self {
            shape: config.shape,
        })
    }
}

impl<F> RadialGrid3D<F> for RadialGridKernel
where
    F: Float + FftNum,
{
    fn run_into<S>(&self, out: &mut ArrayBase<S, Ix3>) -> Result<(), ExecInvariantViolation>
    where
        S: DataMut<Elem = F>,
    {
        let (d0, d1, d2) = out.dim();
        let got = [d0, d1, d2];
        if got != self.shape {
            return Err(ExecInvariantViolation::ShapeMismatch {
                arg: "out",
                expected: self.shape,
                got,
            });
        }
        let centers = grid_centers::<F>(self.shape);
        for (index, value) in out.indexed_iter_mut() {
            *value = radial_at(&centers, index);
        }
        Ok(())
    }

    #[cfg(feature = "alloc")]
    fn run_alloc(&self) -> Array3<F> {
        let centers = grid_centers::<F>(self.shape);
        Array3::from_shape_fn(
            (self.shape[0], self.shape[1], self.shape[2]),
            |index| radial_at(&centers, index),
        )
    }
}

/// Euclidean distance of every grid cell from the centered spectral origin.
///
/// Returns an empty grid for shapes with a zero extent.
#[cfg(feature = "alloc")]
pub fn radial_grid<F>(shape: [usize; 3]) -> Array3<F>
where
    F: Float + FftNum,
{
    match RadialGridKernel::try_new(RadialGridConfig { shape }) {
        Ok(kernel) => kernel.run_alloc(),
        Err(_) => Array3::zeros((0, 0, 0)),
    }
}
