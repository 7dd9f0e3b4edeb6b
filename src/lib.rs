#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

//! Isotropic power spectra for 3D scalar fields.
//!
//! Given a real-valued field sampled on a regular 3D grid, optionally with
//! leading non-spatial axes (vector components, time slices), this crate
//! produces a 1D profile of spectral power as a function of radial
//! wavenumber magnitude `k`.
//!
//! The pipeline has three stages, composed by [`spectral::power_spectrum`]:
//!
//! 1. a centered 3D power grid from the field (FFT over the trailing three
//!    axes, zero-frequency centering, amplitude normalization, squared
//!    magnitude, channel collapse),
//! 2. a radial wavenumber grid measuring each cell's distance from the
//!    spectral center,
//! 3. a shell sum that accumulates the power grid into integer-`k` bins up
//!    to the Nyquist limit of the smallest spatial axis.
//!
//! Each stage is also exposed as a trait-first kernel (`*Config` validated
//! into a `*Kernel` via [`kernel::KernelLifecycle`]) for callers that reuse
//! a configuration across many fields.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod kernel;

#[cfg(feature = "alloc")]
pub mod spectral;

#[cfg(feature = "std")]
pub mod synth;
