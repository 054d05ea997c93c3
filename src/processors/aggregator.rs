use crate::models::{LocalSeries, TimestampExtrema, VariableExtrema};

/// Folds per-timestamp chunk extrema into one variable's result
pub struct Aggregator {
    min_global: f32,
    max_global: f32,
    min_local: LocalSeries,
    max_local: LocalSeries,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            min_global: f32::INFINITY,
            max_global: f32::NEG_INFINITY,
            min_local: Vec::new(),
            max_local: Vec::new(),
        }
    }

    pub fn add(&mut self, extrema: TimestampExtrema) {
        for chunk in &extrema.chunks {
            self.min_global = self.min_global.min(chunk.min);
            self.max_global = self.max_global.max(chunk.max);
        }

        let key = extrema.timestamp.key();
        self.min_local.push((key.clone(), widen(extrema.min_seq())));
        self.max_local.push((key, widen(extrema.max_seq())));
    }

    pub fn timestamp_count(&self) -> usize {
        self.min_local.len()
    }

    /// Global extrema stay `None` if nothing was added
    pub fn finish(self) -> VariableExtrema {
        let empty = self.min_local.is_empty();
        VariableExtrema {
            min_global: (!empty).then_some(self.min_global as f64),
            max_global: (!empty).then_some(self.max_global as f64),
            min_local: self.min_local,
            max_local: self.max_local,
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn aggregate<I>(results: I) -> VariableExtrema
where
    I: IntoIterator<Item = TimestampExtrema>,
{
    let mut aggregator = Aggregator::new();
    for result in results {
        aggregator.add(result);
    }
    aggregator.finish()
}

fn widen(values: Vec<f32>) -> Vec<f64> {
    values.into_iter().map(f64::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChunkExtrema, Timestamp};
    use pretty_assertions::assert_eq;

    fn timestamp_extrema(hour: u32, pairs: &[(f32, f32)]) -> TimestampExtrema {
        TimestampExtrema {
            timestamp: Timestamp::new(2011, 9, 13, hour).unwrap(),
            chunks: pairs.iter().map(|&(lo, hi)| ChunkExtrema::new(lo, hi)).collect(),
        }
    }

    #[test]
    fn test_aggregate_globals_and_locals() {
        let result = aggregate(vec![
            timestamp_extrema(0, &[(1.0, 2.0), (-4.0, 3.0)]),
            timestamp_extrema(6, &[(0.5, 9.5), (0.0, 1.0)]),
        ]);

        assert_eq!(result.min_global, Some(-4.0));
        assert_eq!(result.max_global, Some(9.5));
        assert_eq!(result.local_min("2011-9-13-0"), Some(&[1.0, -4.0][..]));
        assert_eq!(result.local_max("2011-9-13-6"), Some(&[9.5, 1.0][..]));
    }

    #[test]
    fn test_globals_match_flattened_locals() {
        let result = aggregate(vec![
            timestamp_extrema(0, &[(3.0, 4.0), (2.0, 8.0), (5.0, 5.0)]),
            timestamp_extrema(12, &[(-1.25, 0.0), (7.0, 11.0)]),
            timestamp_extrema(18, &[(0.0, 0.0)]),
        ]);

        let flat_min = result
            .min_local
            .iter()
            .flat_map(|(_, v)| v.iter().copied())
            .fold(f64::INFINITY, f64::min);
        let flat_max = result
            .max_local
            .iter()
            .flat_map(|(_, v)| v.iter().copied())
            .fold(f64::NEG_INFINITY, f64::max);

        assert_eq!(result.min_global, Some(flat_min));
        assert_eq!(result.max_global, Some(flat_max));
    }

    #[test]
    fn test_order_does_not_change_globals() {
        let inputs = vec![
            timestamp_extrema(0, &[(3.0, 4.0)]),
            timestamp_extrema(6, &[(-2.0, 1.0)]),
            timestamp_extrema(12, &[(0.5, 12.0)]),
        ];
        let forward = aggregate(inputs.clone());
        let reversed = aggregate(inputs.into_iter().rev());

        assert_eq!(forward.min_global, reversed.min_global);
        assert_eq!(forward.max_global, reversed.max_global);
        assert_eq!(forward.min_local[0].0, "2011-9-13-0");
        assert_eq!(reversed.min_local[0].0, "2011-9-13-12");
    }

    #[test]
    fn test_empty_aggregate() {
        let result = aggregate(Vec::new());
        assert_eq!(result.min_global, None);
        assert_eq!(result.max_global, None);
        assert_eq!(result.timestamp_count(), 0);
    }
}
