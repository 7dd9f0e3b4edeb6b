//! Isotropic spectral reduction of 3D scalar fields.
//!
//! The pipeline runs in three stages: [`power_grid`] transforms a field
//! into a centered 3D spectral power grid, [`radial_grid`] measures each
//! cell's distance from the spectral center, and [`shell_sum`] accumulates
//! the power grid into radial shells. [`power_spectrum`] composes the
//! stages end to end.

pub(crate) mod fft;
mod power;
mod radial;
mod shell;
pub mod traits;

pub use power::{power_grid, PowerGridConfig, PowerGridKernel};
pub use radial::{radial_grid, RadialGridConfig, RadialGridKernel};
pub use shell::{
    power_spectrum, shell_sum, PowerSpectrumConfig, PowerSpectrumKernel, ShellSumConfig,
    ShellSumKernel,
};
