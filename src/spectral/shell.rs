//! Spherical shell reduction of 3D power grids.
//!
//! Power is accumulated into radial bins whose edges run from `0.5` to the
//! Nyquist mode count of the smallest grid axis. Cells whose radial
//! distance falls past the second-to-last edge are dropped, not binned;
//! corner cells of a cube always exceed that range.

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Write1D};
use crate::spectral::power::{spatial_shape_of, PowerGridConfig, PowerGridKernel};
use crate::spectral::radial::{RadialGridConfig, RadialGridKernel};
use crate::spectral::traits::{PowerGrid3D, PowerSpectrum1D, RadialGrid3D, ShellSum1D};
use alloc::vec;
use alloc::vec::Vec;
use ndarray::{Array3, ArrayBase, Data, Dimension, Ix3, Zip};
use num_traits::Float;
use rustfft::FftNum;

use crate::spectral::traits::ShellSpectrum;

/// Bin edges for `num_k_modes` shells: `num_k_modes + 1` values evenly
/// spaced over `[0.5, num_k_modes]`, endpoint pinned exactly.
fn shell_edges<F>(num_k_modes: usize) -> Vec<F>
where
    F: Float + FftNum,
{
    let start = F::from(0.5).unwrap();
    let stop = F::from(num_k_modes).unwrap();
    let step = (stop - start) / F::from(num_k_modes).unwrap();
    let mut edges: Vec<F> = (0..=num_k_modes)
        .map(|i| start + step * F::from(i).unwrap())
        .collect();
    if let Some(last) = edges.last_mut() {
        *last = stop;
    }
    edges
}

/// Bin centers as the ceiling of each edge midpoint; evaluates to
/// `1, 2, ..., num_k_modes`.
fn shell_centers<F>(edges: &[F]) -> Vec<F>
where
    F: Float + FftNum,
{
    let two = F::from(2.0).unwrap();
    edges
        .windows(2)
        .map(|pair| ((pair[0] + pair[1]) / two).ceil())
        .collect()
}

/// 0-based position of the first edge not less than `radius`.
///
/// A radius equal to an edge lands on that edge's own position
/// (right-closed shells); a radius of zero lands in the first shell; a
/// radius beyond every edge yields `edges.len()`. Positions at or past
/// `num_k_modes` are dropped by the accumulator.
fn shell_position<F>(edges: &[F], radius: F) -> usize
where
    F: Float,
{
    edges.partition_point(|edge| *edge < radius)
}

/// Constructor config for [`ShellSumKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellSumConfig {
    /// Extents of the 3D power grid to be reduced.
    pub shape: [usize; 3],
}

/// Trait-first spherical shell reduction kernel.
///
/// Bin edges, centers, and the mode count are fixed by the grid shape at
/// construction; `run_*` only accumulates.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellSumKernel<F> {
    shape: [usize; 3],
    num_k_modes: usize,
    edges: Vec<F>,
    centers: Vec<F>,
}

impl<F> ShellSumKernel<F>
where
    F: Float + FftNum,
{
    /// Number of radial shells, the Nyquist limit of the smallest axis.
    pub fn num_k_modes(&self) -> usize {
        self.num_k_modes
    }

    /// Shell bin edges.
    pub fn bin_edges(&self) -> &[F] {
        &self.edges
    }

    /// Shell bin centers.
    pub fn bin_centers(&self) -> &[F] {
        &self.centers
    }

    fn check_shape<S>(&self, power: &ArrayBase<S, Ix3>) -> Result<(), ExecInvariantViolation>
    where
        S: Data<Elem = F>,
    {
        let (d0, d1, d2) = power.dim();
        let got = [d0, d1, d2];
        if got != self.shape {
            return Err(ExecInvariantViolation::ShapeMismatch {
                arg: "power",
                expected: self.shape,
                got,
            });
        }
        Ok(())
    }

    fn accumulate<S>(
        &self,
        power: &ArrayBase<S, Ix3>,
        spectrum: &mut [F],
    ) -> Result<(), ExecInvariantViolation>
    where
        S: Data<Elem = F>,
    {
        let radial = RadialGridKernel::try_new(RadialGridConfig { shape: self.shape })?;
        let radii: Array3<F> = radial.run_alloc();
        Zip::from(&radii).and(power).for_each(|&radius, &value| {
            let position = shell_position(&self.edges, radius);
            if position < self.num_k_modes {
                spectrum[position] = spectrum[position] + value;
            }
        });
        Ok(())
    }
}

impl<F> KernelLifecycle for ShellSumKernel<F>
where
    F: Float + FftNum,
{
    type Config = ShellSumConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.shape.iter().any(|&n| n == 0) {
            return Err(ConfigError::InvalidArgument {
                arg: "shape",
                reason: "every grid extent must be greater than zero",
            });
        }
        let smallest = config.shape.iter().copied().min().unwrap_or(0);
        let num_k_modes = smallest / 2;
        let (edges, centers) = if num_k_modes == 0 {
            (Vec::new(), Vec::new())
        } else {
            let edges = shell_edges(num_k_modes);
            let centers = shell_centers(&edges);
            (edges, centers)
        };
        Ok(Self {
            shape: config.shape,
            num_k_modes,
            edges,
            centers,
        })
    }
}

impl<F> ShellSum1D<F> for ShellSumKernel<F>
where
    F: Float + FftNum,
{
    fn run_into<S, OK, OP>(
        &self,
        power: &ArrayBase<S, Ix3>,
        k_centers: &mut OK,
        spectrum: &mut OP,
    ) -> Result<(), ExecInvariantViolation>
    where
        S: Data<Elem = F>,
        OK: Write1D<F> + ?Sized,
        OP: Write1D<F> + ?Sized,
    {
        self.check_shape(power)?;

        let expected = self.num_k_modes;
        let centers_out = k_centers
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if centers_out.len() != expected {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "k_centers",
                expected,
                got: centers_out.len(),
            });
        }
        let spectrum_out = spectrum
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if spectrum_out.len() != expected {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "spectrum",
                expected,
                got: spectrum_out.len(),
            });
        }
        if expected == 0 {
            return Ok(());
        }

        centers_out.copy_from_slice(&self.centers);
        for value in spectrum_out.iter_mut() {
            *value = F::zero();
        }
        self.accumulate(power, spectrum_out)
    }

    #[cfg(feature = "alloc")]
    fn run_alloc<S>(
        &self,
        power: &ArrayBase<S, Ix3>,
    ) -> Result<ShellSpectrum<F>, ExecInvariantViolation>
    where
        S: Data<Elem = F>,
    {
        self.check_shape(power)?;
        if self.num_k_modes == 0 {
            return Ok((Vec::new(), Vec::new()));
        }
        let mut spectrum = vec![F::zero(); self.num_k_modes];
        self.accumulate(power, &mut spectrum)?;
        Ok((self.centers.clone(), spectrum))
    }
}

/// Constructor config for [`PowerSpectrumKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerSpectrumConfig {
    /// Extents of the trailing three spatial axes.
    pub spatial_shape: [usize; 3],
}

/// Trait-first isotropic power spectrum kernel.
///
/// Composes the power grid transform with the spherical shell reduction.
/// No state is retained between runs.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSpectrumKernel<F> {
    power: PowerGridKernel,
    shell: ShellSumKernel<F>,
}

impl<F> PowerSpectrumKernel<F>
where
    F: Float + FftNum,
{
    /// Number of radial shells in the output.
    pub fn num_k_modes(&self) -> usize {
        self.shell.num_k_modes()
    }
}

impl<F> KernelLifecycle for PowerSpectrumKernel<F>
where
    F: Float + FftNum,
{
    type Config = PowerSpectrumConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        let power = PowerGridKernel::try_new(PowerGridConfig {
            spatial_shape: config.spatial_shape,
        })?;
        let shell = ShellSumKernel::try_new(ShellSumConfig {
            shape: config.spatial_shape,
        })?;
        Ok(Self { power, shell })
    }
}

impl<F> PowerSpectrum1D<F> for PowerSpectrumKernel<F>
where
    F: Float + FftNum,
{
    fn run_into<S, D, OK, OP>(
        &self,
        field: &ArrayBase<S, D>,
        k_centers: &mut OK,
        spectrum: &mut OP,
    ) -> Result<(), ExecInvariantViolation>
    where
        S: Data<Elem = F>,
        D: Dimension,
        OK: Write1D<F> + ?Sized,
        OP: Write1D<F> + ?Sized,
    {
        let grid = self.power.run_alloc(field)?;
        self.shell.run_into(&grid, k_centers, spectrum)
    }

    #[cfg(feature = "alloc")]
    fn run_alloc<S, D>(
        &self,
        field: &ArrayBase<S, D>,
    ) -> Result<ShellSpectrum<F>, ExecInvariantViolation>
    where
        S: Data<Elem = F>,
        D: Dimension,
    {
        let grid = self.power.run_alloc(field)?;
        self.shell.run_alloc(&grid)
    }
}

/// Reduce a 3D power grid into shell centers and per-shell power sums.
///
/// Returns empty sequences when the smallest axis yields no usable shells.
pub fn shell_sum<F, S>(power: &ArrayBase<S, Ix3>) -> ShellSpectrum<F>
where
    F: Float + FftNum,
    S: Data<Elem = F>,
{
    let (d0, d1, d2) = power.dim();
    let kernel = match ShellSumKernel::try_new(ShellSumConfig {
        shape: [d0, d1, d2],
    }) {
        Ok(kernel) => kernel,
        Err(_) => return (Vec::new(), Vec::new()),
    };
    kernel.run_alloc(power).unwrap_or_default()
}

/// Isotropic 1D power spectrum of an N-dimensional field.
///
/// The trailing three axes are spatial; leading axes are collapsed by
/// summing squared spectral magnitudes. Returns the shell centers
/// (`1, 2, ..., num_k_modes`) and the per-shell power sums. Fields of
/// rank below 3 fail before any computation; degenerate spatial shapes
/// (smallest axis below 2) yield empty sequences.
pub fn power_spectrum<F, S, D>(
    field: &ArrayBase<S, D>,
) -> Result<ShellSpectrum<F>, ExecInvariantViolation>
where
    F: Float + FftNum,
    S: Data<Elem = F>,
    D: Dimension,
{
    let spatial_shape = spatial_shape_of(field)?;
    let kernel: PowerSpectrumKernel<F> =
        PowerSpectrumKernel::try_new(PowerSpectrumConfig { spatial_shape })
            .map_err(ExecInvariantViolation::from)?;
    kernel.run_alloc(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::f64::consts::PI;
    use ndarray::{Array3, ArrayD, IxDyn};

    #[test]
    fn edges_span_half_to_nyquist() {
        let edges: Vec<f64> = shell_edges(2);
        assert_eq!(edges.len(), 3);
        assert_abs_diff_eq!(edges[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(edges[1], 1.25, epsilon = 1e-12);
        assert_abs_diff_eq!(edges[2], 2.0, epsilon = 1e-12);

        let edges: Vec<f64> = shell_edges(4);
        assert_eq!(edges.len(), 5);
        assert_abs_diff_eq!(edges[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(edges[4], 4.0, epsilon = 1e-12);
        assert!(edges.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn centers_are_consecutive_integers() {
        for num_k_modes in 1..9usize {
            let edges: Vec<f64> = shell_edges(num_k_modes);
            let centers = shell_centers(&edges);
            let expected: Vec<f64> = (1..=num_k_modes).map(|k| k as f64).collect();
            assert_eq!(centers, expected);
        }
    }

    #[test]
    fn position_search_is_right_closed() {
        let edges: Vec<f64> = shell_edges(2);
        // Zero radius lands in the first shell.
        assert_eq!(shell_position(&edges, 0.0), 0);
        // A radius equal to an edge lands on that edge's own position.
        assert_eq!(shell_position(&edges, 0.5), 0);
        assert_eq!(shell_position(&edges, 1.25), 1);
        // Just past an edge moves to the next position.
        assert_eq!(shell_position(&edges, 0.51), 1);
        // At or past the second-to-last edge the accumulator drops the cell.
        assert_eq!(shell_position(&edges, 1.26), 2);
        assert_eq!(shell_position(&edges, 2.0), 2);
        assert_eq!(shell_position(&edges, 99.0), 3);
    }

    #[test]
    fn uniform_grid_shell_counts_odd_cube() {
        // On a 5^3 grid only the center cell (radius 0) and the six
        // face-neighbors (radius 1) survive the edge range.
        let power = Array3::from_elem((5, 5, 5), 1.0f64);
        let (centers, spectrum) = shell_sum::<f64, _>(&power);
        assert_eq!(centers, vec![1.0, 2.0]);
        assert_abs_diff_eq!(spectrum[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(spectrum[1], 6.0, epsilon = 1e-12);
    }

    #[test]
    fn uniform_grid_shell_counts_even_cube() {
        // On a 4^3 grid the eight innermost cells sit at radius
        // sqrt(0.75) ~ 0.866 and land in the second shell; everything else
        // is dropped.
        let power = Array3::from_elem((4, 4, 4), 1.0f64);
        let (centers, spectrum) = shell_sum::<f64, _>(&power);
        assert_eq!(centers, vec![1.0, 2.0]);
        assert_abs_diff_eq!(spectrum[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(spectrum[1], 8.0, epsilon = 1e-12);
    }

    #[test]
    fn binned_total_never_exceeds_grid_total() {
        let power = Array3::from_shape_fn((6, 6, 6), |(x, y, z)| {
            ((x * 37 + y * 17 + z * 5) % 11) as f64 * 0.25
        });
        let (_, spectrum) = shell_sum::<f64, _>(&power);
        let binned: f64 = spectrum.iter().sum();
        let total = power.sum();
        assert!(binned <= total + 1e-9);
    }

    #[test]
    fn degenerate_grid_yields_empty_outputs() {
        let power = Array3::from_elem((1, 1, 1), 4.0f64);
        let (centers, spectrum) = shell_sum::<f64, _>(&power);
        assert!(centers.is_empty());
        assert!(spectrum.is_empty());
    }

    #[test]
    fn kernel_checks_grid_shape_and_output_lengths() {
        let kernel: ShellSumKernel<f64> =
            ShellSumKernel::try_new(ShellSumConfig { shape: [4, 4, 4] }).expect("valid config");
        assert_eq!(kernel.num_k_modes(), 2);

        let wrong = Array3::from_elem((4, 4, 5), 1.0f64);
        let err = kernel
            .run_alloc(&wrong)
            .expect_err("mismatched grid shape should error");
        assert!(matches!(err, ExecInvariantViolation::ShapeMismatch { .. }));

        let power = Array3::from_elem((4, 4, 4), 1.0f64);
        let mut centers = vec![0.0f64; 1];
        let mut spectrum = vec![0.0f64; 2];
        let err = kernel
            .run_into(&power, &mut centers, &mut spectrum)
            .expect_err("mismatched output length should error");
        assert!(matches!(err, ExecInvariantViolation::LengthMismatch { .. }));

        let mut centers = vec![0.0f64; 2];
        let mut spectrum = vec![0.0f64; 2];
        kernel
            .run_into(&power, &mut centers, &mut spectrum)
            .expect("matching buffers");
        assert_eq!(centers, vec![1.0, 2.0]);
        assert_abs_diff_eq!(spectrum[1], 8.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_field_spectrum_lands_in_first_shell() {
        let field = Array3::from_elem((5, 5, 5), 2.0f64);
        let (centers, spectrum) = power_spectrum::<f64, _, _>(&field).expect("valid field");
        assert_eq!(centers, vec![1.0, 2.0]);
        assert_abs_diff_eq!(spectrum[0], 500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(spectrum[1], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn single_cosine_mode_lands_in_its_shell() {
        let field = Array3::from_shape_fn((5, 5, 5), |(x, _, _)| {
            (2.0 * PI * x as f64 / 5.0).cos()
        });
        let (centers, spectrum) = power_spectrum::<f64, _, _>(&field).expect("valid field");
        assert_eq!(centers, vec![1.0, 2.0]);
        assert_abs_diff_eq!(spectrum[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(spectrum[1], 62.5, epsilon = 1e-9);
    }

    #[test]
    fn even_grid_keeps_only_the_negative_frequency_cell() {
        // On a 4^3 grid the +1 and -1 frequency cells of a single cosine
        // sit at different radial distances from the (1.5, 1.5, 1.5)
        // center; only the -1 cell falls inside the covered edge range, so
        // half of the mode's power survives.
        let field = Array3::from_shape_fn((4, 4, 4), |(x, _, _)| {
            (2.0 * PI * x as f64 / 4.0).cos()
        });
        let (centers, spectrum) = power_spectrum::<f64, _, _>(&field).expect("valid field");
        assert_eq!(centers, vec![1.0, 2.0]);
        assert_abs_diff_eq!(spectrum[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(spectrum[1], 16.0, epsilon = 1e-9);
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let field = Array3::from_shape_fn((4, 4, 4), |(x, y, z)| {
            (0.9 * x as f64).sin() + (0.4 * y as f64 + 0.2).cos() * (1.7 * z as f64).sin()
        });
        let first = power_spectrum::<f64, _, _>(&field).expect("valid field");
        let second = power_spectrum::<f64, _, _>(&field).expect("valid field");
        assert_eq!(first, second);
    }

    #[test]
    fn mode_count_follows_smallest_axis() {
        let field = ArrayD::from_shape_fn(IxDyn(&[6, 8, 10]), |idx| {
            (idx[0] + idx[1] * 2 + idx[2]) as f64 * 0.125
        });
        let (centers, spectrum) = power_spectrum::<f64, _, _>(&field).expect("valid field");
        assert_eq!(centers, vec![1.0, 2.0, 3.0]);
        assert_eq!(spectrum.len(), 3);
        assert!(spectrum.iter().all(|value| *value >= 0.0));
    }

    #[test]
    fn low_rank_fields_fail_loudly() {
        let flat = ArrayD::<f64>::zeros(IxDyn(&[8, 8]));
        let err = power_spectrum::<f64, _, _>(&flat).expect_err("2D field should error");
        assert!(matches!(err, ExecInvariantViolation::InvalidState { .. }));
    }

    #[test]
    fn degenerate_field_yields_empty_outputs_without_error() {
        let field = Array3::from_elem((1, 1, 1), 7.0f64);
        let (centers, spectrum) = power_spectrum::<f64, _, _>(&field).expect("degenerate field");
        assert!(centers.is_empty());
        assert!(spectrum.is_empty());
    }
}
