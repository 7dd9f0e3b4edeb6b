//! Trait interfaces for spectral-reduction capabilities.
//!
//! These traits define the trait-first API shape used by the spectral
//! kernels: construct a validated kernel from config, then `run_into` a
//! caller-provided buffer or `run_alloc` a fresh result.

use crate::kernel::{ExecInvariantViolation, Write1D};
use ndarray::{ArrayBase, Data, DataMut, Dimension, Ix3};

#[cfg(feature = "alloc")]
use alloc::vec::Vec;
#[cfg(feature = "alloc")]
use ndarray::Array3;

/// Output pair of shell reductions: bin centers and per-bin power sums.
#[cfg(feature = "alloc")]
pub type ShellSpectrum<F> = (Vec<F>, Vec<F>);

/// Radial wavenumber grid generation capability.
pub trait RadialGrid3D<F> {
    /// Fill a caller-provided 3D grid with centered radial distances.
    fn run_into<S>(&self, out: &mut ArrayBase<S, Ix3>) -> Result<(), ExecInvariantViolation>
    where
        S: DataMut<Elem = F>;

    /// Allocate and fill the radial grid.
    #[cfg(feature = "alloc")]
    fn run_alloc(&self) -> Array3<F>;
}

/// Centered 3D spectral power grid capability over N-dimensional fields.
pub trait PowerGrid3D<F> {
    /// Transform a field into its centered 3D power grid, collapsing any
    /// leading non-spatial axes.
    #[cfg(feature = "alloc")]
    fn run_alloc<S, D>(&self, field: &ArrayBase<S, D>) -> Result<Array3<F>, ExecInvariantViolation>
    where
        S: Data<Elem = F>,
        D: Dimension;
}

/// Spherical shell reduction of a 3D power grid into a 1D spectrum.
pub trait ShellSum1D<F> {
    /// Run the shell reduction into caller-provided center/spectrum buffers.
    fn run_into<S, OK, OP>(
        &self,
        power: &ArrayBase<S, Ix3>,
        k_centers: &mut OK,
        spectrum: &mut OP,
    ) -> Result<(), ExecInvariantViolation>
    where
        S: Data<Elem = F>,
        OK: Write1D<F> + ?Sized,
        OP: Write1D<F> + ?Sized;

    /// Run the shell reduction and allocate the output pair.
    #[cfg(feature = "alloc")]
    fn run_alloc<S>(
        &self,
        power: &ArrayBase<S, Ix3>,
    ) -> Result<ShellSpectrum<F>, ExecInvariantViolation>
    where
        S: Data<Elem = F>;
}

/// End-to-end isotropic 1D power spectrum capability.
pub trait PowerSpectrum1D<F> {
    /// Run the full pipeline into caller-provided center/spectrum buffers.
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
        OP: Write1D<F> + ?Sized;

    /// Run the full pipeline and allocate the output pair.
    #[cfg(feature = "alloc")]
    fn run_alloc<S, D>(
        &self,
        field: &ArrayBase<S, D>,
    ) -> Result<ShellSpectrum<F>, ExecInvariantViolation>
    where
        S: Data<Elem = F>,
        D: Dimension;
}
