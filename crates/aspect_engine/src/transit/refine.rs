//! Golden-section search for the exact instant of an aspect.

/// 1/phi
const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Minimize `f` over `[lo, hi]`, assuming it is unimodal there.
///
/// Stops once the bracket is narrower than `tolerance` or after
/// `max_iterations` narrowings. Returns the best interior point that was
/// evaluated and its value. Errors from `f` abort the search.
pub(crate) fn golden_section_min<F, E>(
    mut lo: f64,
    mut hi: f64,
    tolerance: f64,
    max_iterations: u32,
    mut f: F,
) -> Result<(f64, f64), E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let mut c = hi - INV_PHI * (hi - lo);
    let mut d = lo + INV_PHI * (hi - lo);
    let mut fc = f(c)?;
    let mut fd = f(d)?;

    for _ in 0..max_iterations {
        if hi - lo <= tolerance {
            break;
        }
        if fc < fd {
            hi = d;
            d = c;
            fd = fc;
            c = hi - INV_PHI * (hi - lo);
            fc = f(c)?;
        } else {
            lo = c;
            c = d;
            fc = fd;
            d = lo + INV_PHI * (hi - lo);
            fd = f(d)?;
        }
    }

    Ok(if fc < fd { (c, fc) } else { (d, fd) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_vertex_of_abs() {
        let (x, fx) =
            golden_section_min::<_, ()>(0.0, 10.0, 1e-6, 200, |x| Ok((x - 3.7_f64).abs())).unwrap();
        assert!((x - 3.7).abs() < 1e-5);
        assert!(fx < 1e-5);
    }

    #[test]
    fn stays_inside_bracket() {
        // minimum lies left of the bracket: search hugs the lower edge
        let (x, _) =
            golden_section_min::<_, ()>(5.0, 6.0, 1e-9, 200, |x| Ok(x * x)).unwrap();
        assert!((5.0..=6.0).contains(&x));
        assert!(x - 5.0 < 1e-6);
    }

    #[test]
    fn propagates_errors() {
        let mut calls = 0;
        let res = golden_section_min(0.0, 1.0, 1e-9, 50, |_| {
            calls += 1;
            if calls > 3 {
                Err("boom")
            } else {
                Ok(1.0)
            }
        });
        assert_eq!(res, Err("boom"));
    }
}
