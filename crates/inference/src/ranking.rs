use crate::backend::InferenceError;
use serde::Serialize;

/// A label the network is confident about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelConfidence {
    pub label: String,
    pub probability: f32,
}

pub struct ResultRanker {
    pub threshold: f32,
}

impl ResultRanker {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Pair `probabilities` with `labels` by index, keep those at or above the
    /// threshold, highest first.
    ///
    /// Equal probabilities come out in no guaranteed order. NaN never passes
    /// the threshold.
    #[tracing::instrument(skip_all, fields(threshold = self.threshold))]
    pub fn rank(
        &self,
        probabilities: &[f32],
        labels: &[String],
    ) -> Result<Vec<LabelConfidence>, InferenceError> {
        if probabilities.len() != labels.len() {
            return Err(InferenceError::LabelCountMismatch {
                probabilities: probabilities.len(),
                labels: labels.len(),
            });
        }

        let mut ranked: Vec<LabelConfidence> = labels
            .iter()
            .zip(probabilities)
            .filter(|&(_, &probability)| probability >= self.threshold)
            .map(|(label, &probability)| LabelConfidence {
                label: label.clone(),
                probability,
            })
            .collect();

        ranked.sort_by(|a, b| b.probability.total_cmp(&a.probability));

        tracing::trace!(
            candidates = probabilities.len(),
            kept = ranked.len(),
            "Ranked predictions"
        );

        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_threshold_filtering() {
        let ranker = ResultRanker::new(0.9);
        let ranked = ranker.rank(&[0.95, 0.2], &labels(&["cat", "dog"])).unwrap();

        assert_eq!(
            ranked,
            vec![LabelConfidence {
                label: "cat".to_string(),
                probability: 0.95
            }]
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let ranker = ResultRanker::new(0.5);
        let ranked = ranker.rank(&[0.5, 0.49999], &labels(&["a", "b"])).unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].label, "a");
    }

    #[test]
    fn test_nothing_clears_threshold() {
        let ranker = ResultRanker::new(0.9);
        let ranked = ranker.rank(&[0.5, 0.3], &labels(&["cat", "dog"])).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_sorted_descending() {
        let ranker = ResultRanker::new(0.1);
        let ranked = ranker
            .rank(
                &[0.2, 0.9, 0.05, 0.6, 0.35],
                &labels(&["a", "b", "c", "d", "e"]),
            )
            .unwrap();

        let order: Vec<&str> = ranked.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(order, vec!["b", "d", "e", "a"]);
        assert!(ranked.windows(2).all(|w| w[0].probability >= w[1].probability));
        assert!(ranked.iter().all(|r| r.probability >= 0.1));
    }

    /// Ties have no guaranteed order, so only membership is checked
    #[test]
    fn test_ties_keep_both_labels() {
        let ranker = ResultRanker::new(0.5);
        let ranked = ranker
            .rank(&[0.7, 0.7, 0.9], &labels(&["x", "y", "z"]))
            .unwrap();

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].label, "z");
        let mut tied: Vec<&str> = ranked[1..].iter().map(|r| r.label.as_str()).collect();
        tied.sort();
        assert_eq!(tied, vec!["x", "y"]);
    }

    #[test]
    fn test_nan_is_dropped() {
        let ranker = ResultRanker::new(0.0);
        let ranked = ranker
            .rank(&[f32::NAN, 0.4], &labels(&["broken", "ok"]))
            .unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].label, "ok");
    }

    #[test]
    fn test_label_count_mismatch() {
        let ranker = ResultRanker::new(0.9);
        let result = ranker.rank(&[0.95, 0.2, 0.1], &labels(&["cat", "dog"]));

        match result {
            Err(InferenceError::LabelCountMismatch {
                probabilities,
                labels,
            }) => {
                assert_eq!(probabilities, 3);
                assert_eq!(labels, 2);
            }
            other => panic!("Expected LabelCountMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_serializes_as_label_probability_pairs() {
        let pair = LabelConfidence {
            label: "cat".to_string(),
            probability: 0.5,
        };
        assert_eq!(
            serde_json::to_string(&pair).unwrap(),
            r#"{"label":"cat","probability":0.5}"#
        );
    }
}
