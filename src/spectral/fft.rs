//! Lane-wise FFT helpers over `ndarray` axes.
//!
//! The transforms here are unscaled; normalization conventions are applied
//! by the callers.

use alloc::vec;
use alloc::vec::Vec;
use ndarray::{Array, Axis, Dimension, Slice};
use rustfft::{num_complex::Complex, FftNum, FftPlanner};

/// Forward DFT of every lane along `axis`, in place, unscaled.
pub(crate) fn fft_axis_inplace<F, D>(data: &mut Array<Complex<F>, D>, axis: Axis)
where
    F: FftNum,
    D: Dimension,
{
    process_axis_inplace(data, axis, true)
}

/// Inverse DFT of every lane along `axis`, in place, unscaled.
pub(crate) fn ifft_axis_inplace<F, D>(data: &mut Array<Complex<F>, D>, axis: Axis)
where
    F: FftNum,
    D: Dimension,
{
    process_axis_inplace(data, axis, false)
}

fn process_axis_inplace<F, D>(data: &mut Array<Complex<F>, D>, axis: Axis, forward: bool)
where
    F: FftNum,
    D: Dimension,
{
    let n = data.len_of(axis);
    if n < 2 {
        // A length-0 or length-1 transform is the identity.
        return;
    }
    let mut planner = FftPlanner::<F>::new();
    let fft = if forward {
        planner.plan_fft_forward(n)
    } else {
        planner.plan_fft_inverse(n)
    };
    let zero = Complex::new(F::zero(), F::zero());
    let mut lane_buf = vec![zero; n];
    let mut scratch = vec![zero; fft.get_inplace_scratch_len()];
    for mut lane in data.lanes_mut(axis) {
        for (dst, src) in lane_buf.iter_mut().zip(lane.iter()) {
            *dst = *src;
        }
        fft.process_with_scratch(&mut lane_buf, &mut scratch);
        for (dst, src) in lane.iter_mut().zip(lane_buf.iter()) {
            *dst = *src;
        }
    }
}

/// Circularly shift `axis` so the zero-frequency lane lands at index `n / 2`.
pub(crate) fn fftshift_axis<F, D>(data: &Array<Complex<F>, D>, axis: Axis) -> Array<Complex<F>, D>
where
    F: FftNum,
    D: Dimension,
{
    let n = data.len_of(axis) as isize;
    let shift = n / 2;
    if shift == 0 {
        return data.clone();
    }
    let zero = Complex::new(F::zero(), F::zero());
    let mut out = Array::from_elem(data.raw_dim(), zero);
    out.slice_axis_mut(axis, Slice::from(..shift))
        .assign(&data.slice_axis(axis, Slice::from(n - shift..)));
    out.slice_axis_mut(axis, Slice::from(shift..))
        .assign(&data.slice_axis(axis, Slice::from(..n - shift)));
    out
}

/// Sample frequencies of an `n`-point DFT, in cycles per sample, with the
/// zero frequency at index 0.
pub(crate) fn fftfreq(n: usize) -> Vec<f64> {
    let nf = n as f64;
    (0..n)
        .map(|i| {
            if i <= (n - 1) / 2 {
                i as f64 / nf
            } else {
                (i as f64 - nf) / nf
            }
        })
        .collect()
}
