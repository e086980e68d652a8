pub struct StatsHelper;

impl StatsHelper {
    /// Index of the element at fraction `p` of a sorted sequence of `len` items,
    /// truncated toward zero.
    pub fn percentile_index(len: usize, p: f64) -> usize {
        if len == 0 {
            return 0;
        }
        (((len - 1) as f64) * p) as usize
    }

    /// Lower median of an already sorted slice.
    pub fn lower_median<T: Copy>(sorted: &[T]) -> Option<T> {
        sorted.get(Self::percentile_index(sorted.len(), 0.5)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_median_of_even_sequence_takes_lower_middle() {
        assert_eq!(StatsHelper::lower_median(&[1, 2, 3, 4]), Some(2));
        assert_eq!(StatsHelper::lower_median(&[1, 2, 3]), Some(2));
        assert_eq!(StatsHelper::lower_median::<i64>(&[]), None);
    }

    #[test]
    fn percentile_index_truncates() {
        assert_eq!(StatsHelper::percentile_index(4, 0.9), 2);
        assert_eq!(StatsHelper::percentile_index(4, 0.1), 0);
        assert_eq!(StatsHelper::percentile_index(11, 0.9), 9);
    }
}
