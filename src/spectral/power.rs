//! Centered 3D spectral power grids of N-dimensional fields.

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle};
use crate::spectral::fft;
use crate::spectral::traits::PowerGrid3D;
use ndarray::{Array3, ArrayBase, ArrayD, Axis, Data, Dimension, Ix3};
use num_traits::Float;
use rustfft::{num_complex::Complex, FftNum};

/// Trailing three extents of a field, or an invariant violation for fields
/// of lower rank.
pub(crate) fn spatial_shape_of<F, S, D>(
    field: &ArrayBase<S, D>,
) -> Result<[usize; 3], ExecInvariantViolation>
where
    S: Data<Elem = F>,
    D: Dimension,
{
    let ndim = field.ndim();
    if ndim < 3 {
        return Err(ExecInvariantViolation::InvalidState {
            reason: "field must have at least 3 trailing spatial axes",
        });
    }
    let shape = field.shape();
    Ok([shape[ndim - 3], shape[ndim - 2], shape[ndim - 1]])
}

fn power_grid_impl<F, S, D>(
    field: &ArrayBase<S, D>,
    spatial_shape: [usize; 3],
) -> Result<Array3<F>, ExecInvariantViolation>
where
    F: Float + FftNum,
    S: Data<Elem = F>,
    D: Dimension,
{
    let mut spectrum: ArrayD<Complex<F>> =
        field.map(|&v| Complex::new(v, F::zero())).into_dyn();
    let ndim = spectrum.ndim();

    // Transform the trailing spatial axes, then center the zero frequency
    // on each of them.
    for axis in ndim - 3..ndim {
        fft::fft_axis_inplace(&mut spectrum, Axis(axis));
    }
    for axis in ndim - 3..ndim {
        spectrum = fft::fftshift_axis(&spectrum, Axis(axis));
    }

    let volume = F::from(spatial_shape[0] * spatial_shape[1] * spatial_shape[2]).unwrap();
    let amplitude_norm = volume.sqrt();
    let mut power: ArrayD<F> = spectrum.mapv(|c| (c / amplitude_norm).norm_sqr());

    // Collapse every leading non-spatial axis by summation.
    while power.ndim() > 3 {
        power = power.sum_axis(Axis(0));
    }
    power
        .into_dimensionality::<Ix3>()
        .map_err(|_| ExecInvariantViolation::InvalidState {
            reason: "collapsed power grid was not 3-dimensional",
        })
}

/// Constructor config for [`PowerGridKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerGridConfig {
    /// Extents of the trailing three spatial axes.
    pub spatial_shape: [usize; 3],
}

/// Trait-first spectral power grid kernel.
///
/// Applies a forward DFT over the trailing three axes of a field, centers
/// the zero frequency, normalizes amplitudes by the square root of the
/// spatial volume, and collapses any leading axes by summing squared
/// magnitudes. Non-finite input values propagate into the output
/// unsanitized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerGridKernel {
    spatial_shape: [usize; 3],
}

impl PowerGridKernel {
    /// Return the configured spatial shape.
    pub fn spatial_shape(&self) -> [usize; 3] {
        self.spatial_shape
    }
}

impl KernelLifecycle for PowerGridKernel {
    type Config = PowerGridConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.spatial_shape.iter().any(|&n| n == 0) {
            return Err(ConfigError::InvalidArgument {
                arg: "spatial_shape",
                reason: "every spatial extent must be greater than zero",
            });
        }
        Ok(Self {
            spatial_shape: config.spatial_shape,
        })
    }
}

impl<F> PowerGrid3D<F> for PowerGridKernel
where
    F: Float + FftNum,
{
    fn run_alloc<S, D>(&self, field: &ArrayBase<S, D>) -> Result<Array3<F>, ExecInvariantViolation>
    where
        S: Data<Elem = F>,
        D: Dimension,
    {
        let got = spatial_shape_of(field)?;
        if got != self.spatial_shape {
            return Err(ExecInvariantViolation::ShapeMismatch {
                arg: "field",
                expected: self.spatial_shape,
                got,
            });
        }
        power_grid_impl(field, self.spatial_shape)
    }
}

/// Centered 3D spectral power grid of an N-dimensional field.
///
/// The trailing three axes are treated as spatial; any leading axes are
/// collapsed by summing squared magnitudes. Fails before any computation
/// when the field has fewer than 3 axes.
pub fn power_grid<F, S, D>(field: &ArrayBase<S, D>) -> Result<Array3<F>, ExecInvariantViolation>
where
    F: Float + FftNum,
    S: Data<Elem = F>,
    D: Dimension,
{
    let spatial_shape = spatial_shape_of(field)?;
    let kernel = PowerGridKernel::try_new(PowerGridConfig { spatial_shape })
        .map_err(ExecInvariantViolation::from)?;
    kernel.run_alloc(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array4, ArrayD, IxDyn};

    fn test_field(shape: [usize; 3]) -> Array3<f64> {
        Array3::from_shape_fn((shape[0], shape[1], shape[2]), |(x, y, z)| {
            (0.7 * x as f64 + 0.3).sin() + (1.3 * y as f64).cos() * (0.5 * z as f64 + 0.1).sin()
        })
    }

    /// Mirror of a zero-frequency-centered index under wavenumber negation.
    fn mirror(index: usize, n: usize) -> usize {
        let shift = n / 2;
        let unshifted = (index + n - shift) % n;
        let negated = (n - unshifted) % n;
        (negated + shift) % n
    }

    #[test]
    fn rejects_fields_with_fewer_than_three_axes() {
        let flat = ArrayD::<f64>::zeros(IxDyn(&[4, 4]));
        let err = power_grid::<f64, _, _>(&flat).expect_err("2D field should error");
        assert!(matches!(err, ExecInvariantViolation::InvalidState { .. }));
    }

    #[test]
    fn kernel_checks_spatial_shape() {
        let kernel = PowerGridKernel::try_new(PowerGridConfig {
            spatial_shape: [4, 4, 4],
        })
        .expect("valid config");
        let field = test_field([4, 4, 5]);
        let err = kernel
            .run_alloc(&field)
            .expect_err("mismatched trailing shape should error");
        assert!(matches!(err, ExecInvariantViolation::ShapeMismatch { .. }));
    }

    #[test]
    fn total_power_matches_sum_of_squares() {
        // With amplitude normalization by sqrt(volume), Parseval's theorem
        // makes the power-grid total equal the field's sum of squares.
        let field = test_field([4, 5, 6]);
        let power: Array3<f64> = power_grid(&field).expect("valid field");
        let total: f64 = power.sum();
        let expected: f64 = field.iter().map(|v| v * v).sum();
        assert_abs_diff_eq!(total, expected, epsilon = 1e-9);
    }

    #[test]
    fn constant_field_concentrates_power_at_center() {
        let field = Array3::from_elem((5, 5, 5), 2.0f64);
        let power: Array3<f64> = power_grid(&field).expect("valid field");
        assert_abs_diff_eq!(power[(2, 2, 2)], 500.0, epsilon = 1e-9);
        let off_center: f64 = power.sum() - power[(2, 2, 2)];
        assert_abs_diff_eq!(off_center, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn real_input_yields_hermitian_power_grid() {
        for shape in [[4, 4, 4], [5, 5, 5], [4, 5, 6]] {
            let field = test_field(shape);
            let power: Array3<f64> = power_grid(&field).expect("valid field");
            for ((x, y, z), &value) in power.indexed_iter() {
                let mirrored = power[(
                    mirror(x, shape[0]),
                    mirror(y, shape[1]),
                    mirror(z, shape[2]),
                )];
                assert_abs_diff_eq!(value, mirrored, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn leading_axes_collapse_by_summation() {
        let a = test_field([4, 4, 4]);
        let b = a.mapv(|v| 0.5 * v + 0.1);
        let mut stacked = Array4::<f64>::zeros((2, 4, 4, 4));
        stacked.index_axis_mut(Axis(0), 0).assign(&a);
        stacked.index_axis_mut(Axis(0), 1).assign(&b);

        let combined: Array3<f64> = power_grid(&stacked).expect("valid field");
        let separate = {
            let pa: Array3<f64> = power_grid(&a).expect("valid field");
            let pb: Array3<f64> = power_grid(&b).expect("valid field");
            pa + pb
        };
        for (c, s) in combined.iter().zip(separate.iter()) {
            assert_abs_diff_eq!(*c, *s, epsilon = 1e-9);
        }
    }

    #[test]
    fn five_axis_fields_collapse_to_three() {
        let field = ArrayD::from_shape_fn(IxDyn(&[2, 2, 3, 3, 3]), |idx| {
            (idx[0] + 2 * idx[1] + idx[2] + idx[3] + idx[4]) as f64 * 0.25
        });
        let power: Array3<f64> = power_grid(&field).expect("valid field");
        assert_eq!(power.dim(), (3, 3, 3));
    }

    #[test]
    fn single_cell_field_passes_through() {
        let field = Array3::from_elem((1, 1, 1), 3.0f64);
        let power: Array3<f64> = power_grid(&field).expect("valid field");
        assert_eq!(power.dim(), (1, 1, 1));
        assert_abs_diff_eq!(power[(0, 0, 0)], 9.0, epsilon = 1e-12);
    }
}
