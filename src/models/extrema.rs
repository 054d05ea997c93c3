use serde::{Deserialize, Serialize};

use crate::models::Timestamp;

/// Min/max of one chunk after NaN filtering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkExtrema {
    pub min: f32,
    pub max: f32,
}

impl ChunkExtrema {
    /// Used for an all-NaN chunk with nothing earlier in the timestamp to copy
    pub const ZERO: ChunkExtrema = ChunkExtrema { min: 0.0, max: 0.0 };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Extrema of the non-NaN values, or `None` if there are none
    pub fn from_values(values: &[f32]) -> Option<Self> {
        values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc: Option<ChunkExtrema>, v| match acc {
                Some(e) => Some(ChunkExtrema::new(e.min.min(v), e.max.max(v))),
                None => Some(ChunkExtrema::new(v, v)),
            })
    }
}

/// Per-chunk extrema for every chunk index of one timestamp, in index order
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampExtrema {
    pub timestamp: Timestamp,
    pub chunks: Vec<ChunkExtrema>,
}

impl TimestampExtrema {
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            chunks: Vec::new(),
        }
    }

    pub fn min_seq(&self) -> Vec<f32> {
        self.chunks.iter().map(|c| c.min).collect()
    }

    pub fn max_seq(&self) -> Vec<f32> {
        self.chunks.iter().map(|c| c.max).collect()
    }

    pub fn last(&self) -> Option<ChunkExtrema> {
        self.chunks.last().copied()
    }
}

/// Per-timestamp sequences keyed by `Timestamp::key`, kept in insertion order
pub type LocalSeries = Vec<(String, Vec<f64>)>;

/// One variable's entry in the metadata document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableExtrema {
    /// `None` (JSON `null`) when no timestamps were found
    pub min_global: Option<f64>,
    pub max_global: Option<f64>,
    #[serde(with = "ordered_map")]
    pub min_local: LocalSeries,
    #[serde(with = "ordered_map")]
    pub max_local: LocalSeries,
}

impl VariableExtrema {
    pub fn timestamp_count(&self) -> usize {
        self.min_local.len()
    }

    pub fn local_min(&self, key: &str) -> Option<&[f64]> {
        lookup(&self.min_local, key)
    }

    pub fn local_max(&self, key: &str) -> Option<&[f64]> {
        lookup(&self.max_local, key)
    }
}

fn lookup<'a>(series: &'a LocalSeries, key: &str) -> Option<&'a [f64]> {
    series
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_slice())
}

/// Serialises `LocalSeries` as a JSON object without reordering its keys
mod ordered_map {
    use serde::de::{MapAccess, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    use super::LocalSeries;

    pub fn serialize<S: Serializer>(series: &LocalSeries, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(series.iter().map(|(k, v)| (k, v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LocalSeries, D::Error> {
        struct SeriesVisitor;

        impl<'de> Visitor<'de> for SeriesVisitor {
            type Value = LocalSeries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of timestamp keys to number arrays")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<LocalSeries, A::Error> {
                let mut series = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, values)) = map.next_entry::<String, Vec<f64>>()? {
                    series.push((key, values));
                }
                Ok(series)
            }
        }

        deserializer.deserialize_map(SeriesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values_ignores_nan() {
        let e = ChunkExtrema::from_values(&[f32::NAN, 3.0, -1.5, f32::NAN, 7.25]).unwrap();
        assert_eq!(e, ChunkExtrema::new(-1.5, 7.25));
    }

    #[test]
    fn test_from_values_empty() {
        assert!(ChunkExtrema::from_values(&[]).is_none());
        assert!(ChunkExtrema::from_values(&[f32::NAN, f32::NAN]).is_none());
    }

    #[test]
    fn test_local_series_keeps_order() {
        let extrema = VariableExtrema {
            min_global: Some(1.0),
            max_global: Some(2.0),
            min_local: vec![
                ("2011-9-13-0".to_string(), vec![1.0]),
                ("2011-10-1-0".to_string(), vec![1.5]),
            ],
            max_local: vec![
                ("2011-9-13-0".to_string(), vec![2.0]),
                ("2011-10-1-0".to_string(), vec![1.75]),
            ],
        };

        let json = serde_json::to_string(&extrema).unwrap();
        assert!(json.find("2011-9-13-0").unwrap() < json.find("2011-10-1-0").unwrap());

        let back: VariableExtrema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, extrema);
        assert_eq!(back.local_max("2011-10-1-0"), Some(&[1.75][..]));
        assert_eq!(back.timestamp_count(), 2);
    }

    #[test]
    fn test_null_globals() {
        let json = r#"{"min_global": null, "max_global": null, "min_local": {}, "max_local": {}}"#;
        let extrema: VariableExtrema = serde_json::from_str(json).unwrap();
        assert_eq!(extrema.min_global, None);
        assert_eq!(extrema.timestamp_count(), 0);
    }
}
