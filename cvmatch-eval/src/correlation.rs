//! Rank correlation: Kendall tau and Spearman rho.
//!
//! Both operate on two rank vectors over the same items: `a[i]` and `b[i]`
//! are the positions item `i` received in the two orderings.

/// Kendall tau-a over two rank vectors.
///
/// Counts concordant minus discordant pairs over all pairs. Returns `None`
/// for mismatched lengths or fewer than two items.
pub fn kendall_tau(a: &[usize], b: &[usize]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    let n = a.len();
    let mut concordant = 0i64;
    let mut discordant = 0i64;
    for i in 0..n {
        for j in (i + 1)..n {
            let da = a[i] as i64 - a[j] as i64;
            let db = b[i] as i64 - b[j] as i64;
            let product = da * db;
            if product > 0 {
                concordant += 1;
            } else if product < 0 {
                discordant += 1;
            }
        }
    }
    let pairs = (n * (n - 1) / 2) as f64;
    Some((concordant - discordant) as f64 / pairs)
}

/// Spearman rho over two rank vectors (no tie correction).
///
/// Uses the rank-difference formula `1 - 6 Σd² / (n(n²-1))`. Returns `None`
/// for mismatched lengths or fewer than two items.
pub fn spearman_rho(a: &[usize], b: &[usize]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    let n = a.len() as f64;
    let d_squared: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum();
    Some(1.0 - 6.0 * d_squared / (n * (n * n - 1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_rankings_correlate_perfectly() {
        let ranks = [0, 1, 2, 3, 4];
        assert_eq!(kendall_tau(&ranks, &ranks), Some(1.0));
        assert_eq!(spearman_rho(&ranks, &ranks), Some(1.0));
    }

    #[test]
    fn reversed_rankings_anticorrelate() {
        let a = [0, 1, 2, 3, 4];
        let b = [4, 3, 2, 1, 0];
        assert_eq!(kendall_tau(&a, &b), Some(-1.0));
        assert_eq!(spearman_rho(&a, &b), Some(-1.0));
    }

    #[test]
    fn single_swap_is_close_to_one() {
        let a = [0, 1, 2, 3, 4];
        let b = [1, 0, 2, 3, 4];
        let tau = kendall_tau(&a, &b).unwrap();
        assert!((tau - 0.8).abs() < 1e-9);
        let rho = spearman_rho(&a, &b).unwrap();
        assert!(rho > 0.8 && rho < 1.0);
    }

    #[test]
    fn mismatched_lengths_yield_none() {
        assert_eq!(kendall_tau(&[0, 1], &[0, 1, 2]), None);
        assert_eq!(spearman_rho(&[0], &[0]), None);
    }
}
