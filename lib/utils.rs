//! Miscellaneous tools.

use ndarray::{ self as nd, Ix1 };
use num_traits::Float;
use crate::{ Arr1, error::LengthError };

/// Integrate using the trapezoidal rule over an evenly spaced grid.
///
/// *Panics if `y` has length less than 2*.
pub fn trapz<S, A>(y: &nd::ArrayBase<S, Ix1>, dx: A) -> A
where
    S: nd::Data<Elem = A>,
    A: Float,
{
    let n: usize = y.len();
    let two = A::one() + A::one();
    let inner = y.slice(nd::s![1..n - 1]).iter()
        .fold(A::zero(), |acc, yk| acc + *yk);
    (dx / two) * (y[0] + two * inner + y[n - 1])
}

/// Integrate using the trapezoidal rule over an arbitrary (ordered) grid.
pub fn trapz_x<S, T, A>(x: &nd::ArrayBase<S, Ix1>, y: &nd::ArrayBase<T, Ix1>)
    -> Result<A, LengthError>
where
    S: nd::Data<Elem = A>,
    T: nd::Data<Elem = A>,
    A: Float,
{
    LengthError::check(x, y)?;
    let two = A::one() + A::one();
    let res: A
        = x.iter().zip(x.iter().skip(1))
        .zip(y.iter().zip(y.iter().skip(1)))
        .fold(A::zero(), |acc, ((xk, xkp1), (yk, ykp1))| {
            acc + (*xkp1 - *xk) * (*yk + *ykp1) / two
        });
    Ok(res)
}

/// Return an array of differences between adjacent elements of a source
/// array.
pub fn array_diff<S, A>(a: &Arr1<S>) -> nd::Array1<A>
where
    S: nd::Data<Elem = A>,
    A: std::ops::Sub<A, Output = A> + Copy,
{
    a.iter().zip(a.iter().skip(1))
        .map(|(ak, akp1)| *akp1 - *ak)
        .collect()
}

// perform the operation `a + v * b` succinctly
pub(crate) fn array_step<S, T>(a: &Arr1<S>, v: f64, b: &Arr1<T>)
    -> nd::Array1<f64>
where
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
{
    nd::Zip::from(a).and(b)
        .map_collect(|ak, bk| ak + v * bk)
}

/// Return `true` if every element of `a` is finite.
pub fn all_finite<S>(a: &Arr1<S>) -> bool
where S: nd::Data<Elem = f64>
{
    a.iter().all(|ak| ak.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn trapz_is_exact_for_lines() {
        let x: nd::Array1<f64> = nd::Array1::linspace(0.0, 1.0, 11);
        let y = x.mapv(|xk| 3.0 * xk + 1.0);
        assert_relative_eq!(trapz(&y, x[1] - x[0]), 2.5, epsilon = 1e-12);
        assert_relative_eq!(trapz_x(&x, &y).unwrap(), 2.5, epsilon = 1e-12);
    }

    #[test]
    fn trapz_x_uneven() {
        let x = nd::array![0.0, 0.1, 0.5, 1.0];
        let y = nd::array![1.0, 1.0, 1.0, 1.0];
        assert_relative_eq!(trapz_x(&x, &y).unwrap(), 1.0, epsilon = 1e-15);
        assert!(trapz_x(&x, &nd::array![1.0, 2.0]).is_err());
    }

    #[test]
    fn diffs() {
        let a = nd::array![0.0, 1.0, 3.0, 6.0];
        assert_eq!(array_diff(&a), nd::array![1.0, 2.0, 3.0]);
        assert_eq!(
            array_step(&a, 2.0, &nd::array![1.0, 1.0, 1.0, 1.0]),
            nd::array![2.0, 3.0, 5.0, 8.0],
        );
        assert!(all_finite(&a));
        assert!(!all_finite(&nd::array![0.0, f64::INFINITY]));
    }
}
