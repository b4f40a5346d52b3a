/// Rank a set of post-assignment free-space values.
///
/// `trunc(min + median + mean)`, where the median of an even-length set is the
/// mean of its two middle values. The min term penalizes starving a single
/// datastore, the median tracks the typical one and the mean the cluster as a
/// whole. An empty set scores 0.
///
/// Computed over a common denominator of `2n` so the result is exact.
pub fn balance_score(free_space: &[i64]) -> i64 {
    if free_space.is_empty() {
        return 0;
    }

    let mut sorted = free_space.to_vec();
    sorted.sort_unstable();

    let n = sorted.len();
    let min = i128::from(sorted[0]);
    let twice_median = if n % 2 == 1 {
        2 * i128::from(sorted[n / 2])
    } else {
        i128::from(sorted[n / 2 - 1]) + i128::from(sorted[n / 2])
    };
    let sum: i128 = sorted.iter().copied().map(i128::from).sum();

    let n = n as i128;
    let numerator = 2 * n * min + n * twice_median + 2 * sum;
    let score = numerator / (2 * n);

    i64::try_from(score).unwrap_or(if score < 0 { i64::MIN } else { i64::MAX })
}
