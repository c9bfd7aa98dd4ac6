//! Statistical legitimacy classifier for announcement language
//!
//! A deliberately small demo classifier: bag of unigrams+bigrams weighted by
//! tf-idf, fed to a logistic regression trained once (lazily, per process)
//! on a fixed exemplar corpus. Its whole contract is: given any text, return
//! a probability of the "legit" class in [0, 1] and a binary label, never
//! failing on unseen vocabulary (unseen n-grams contribute zero weight).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use crate::DEFAULT_LEGIT_THRESHOLD;

/// Fixed labeled exemplars; 1 = legit announcement language, 0 = suspicious
const TRAIN_CORPUS: &[(&str, f64)] = &[
    ("pump huge buy now", 0.0),
    ("this is a scam", 0.0),
    ("fake news about company", 0.0),
    ("official regulatory filing", 1.0),
    ("results announced genuine", 1.0),
    ("insider tip buy", 0.0),
    ("sell off rumor", 0.0),
    ("company confirms acquisition", 1.0),
];

const TRAIN_EPOCHS: usize = 1000;
const LEARNING_RATE: f64 = 1.0;

/// Binary label of the legitimacy classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialLabel {
    Legit,
    Suspicious,
}

/// Classifier output for one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialReading {
    /// Probability of the legit class, in [0, 1]
    pub score: f64,
    pub label: SocialLabel,
}

fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Unigrams plus adjacent bigrams
fn ngrams(text: &str) -> Vec<String> {
    let toks = tokens(text);
    let mut grams = toks.clone();
    grams.extend(toks.windows(2).map(|w| format!("{} {}", w[0], w[1])));
    grams
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Tf-idf + logistic regression over a fixed corpus
#[derive(Debug, Clone)]
pub struct SocialClassifier {
    /// n-gram -> column index, in deterministic (sorted) order
    vocab: HashMap<String, usize>,
    /// Smoothed inverse document frequency per column
    idf: Vec<f64>,
    weights: Vec<f64>,
    bias: f64,
}

impl SocialClassifier {
    /// Train on the fixed exemplar corpus. Deterministic: zero-initialised
    /// weights, sorted vocabulary, fixed epoch count.
    pub fn train() -> Self {
        let docs: Vec<Vec<String>> = TRAIN_CORPUS.iter().map(|(t, _)| ngrams(t)).collect();

        // Document frequencies, sorted for a stable column order
        let mut df: BTreeMap<String, usize> = BTreeMap::new();
        for doc in &docs {
            let mut seen: Vec<&String> = doc.iter().collect();
            seen.sort();
            seen.dedup();
            for gram in seen {
                *df.entry(gram.clone()).or_insert(0) += 1;
            }
        }

        let n_docs = docs.len() as f64;
        let mut vocab = HashMap::new();
        let mut idf = Vec::with_capacity(df.len());
        for (col, (gram, count)) in df.into_iter().enumerate() {
            vocab.insert(gram, col);
            idf.push(((1.0 + n_docs) / (1.0 + count as f64)).ln() + 1.0);
        }

        let mut classifier = Self {
            vocab,
            weights: vec![0.0; idf.len()],
            idf,
            bias: 0.0,
        };

        let rows: Vec<Vec<f64>> = TRAIN_CORPUS
            .iter()
            .map(|(t, _)| classifier.vectorize(t))
            .collect();
        let labels: Vec<f64> = TRAIN_CORPUS.iter().map(|(_, y)| *y).collect();

        // Full-batch gradient descent on the logistic loss
        for _ in 0..TRAIN_EPOCHS {
            let mut grad_w = vec![0.0; classifier.weights.len()];
            let mut grad_b = 0.0;
            for (x, &y) in rows.iter().zip(&labels) {
                let z: f64 = x
                    .iter()
                    .zip(&classifier.weights)
                    .map(|(xi, wi)| xi * wi)
                    .sum::<f64>()
                    + classifier.bias;
                let err = sigmoid(z) - y;
                for (g, xi) in grad_w.iter_mut().zip(x) {
                    *g += err * xi;
                }
                grad_b += err;
            }
            let scale = LEARNING_RATE / rows.len() as f64;
            for (w, g) in classifier.weights.iter_mut().zip(&grad_w) {
                *w -= scale * g;
            }
            classifier.bias -= scale * grad_b;
        }

        classifier
    }

    /// L2-normalised tf-idf vector; n-grams outside the vocabulary drop out
    fn vectorize(&self, text: &str) -> Vec<f64> {
        let mut vec = vec![0.0; self.idf.len()];
        for gram in ngrams(text) {
            if let Some(&col) = self.vocab.get(&gram) {
                vec[col] += self.idf[col];
            }
        }
        let norm = vec.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }

    /// Probability of the legit class plus the thresholded label
    pub fn classify(&self, text: &str, threshold: f64) -> SocialReading {
        let x = self.vectorize(text);
        let z: f64 = x.iter().zip(&self.weights).map(|(xi, wi)| xi * wi).sum::<f64>() + self.bias;
        let score = sigmoid(z);
        SocialReading {
            score,
            label: if score >= threshold {
                SocialLabel::Legit
            } else {
                SocialLabel::Suspicious
            },
        }
    }

    /// Classify with the default 0.5 threshold
    pub fn classify_default(&self, text: &str) -> SocialReading {
        self.classify(text, DEFAULT_LEGIT_THRESHOLD)
    }

    /// Process-wide classifier, trained once on first use
    pub fn shared() -> &'static SocialClassifier {
        static SHARED: LazyLock<SocialClassifier> = LazyLock::new(SocialClassifier::train);
        &SHARED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separates_training_exemplars() {
        let clf = SocialClassifier::shared();
        assert_eq!(
            clf.classify_default("official regulatory filing").label,
            SocialLabel::Legit
        );
        assert_eq!(
            clf.classify_default("pump huge buy now").label,
            SocialLabel::Suspicious
        );
    }

    #[test]
    fn test_probability_bounded_on_unseen_text() {
        let clf = SocialClassifier::shared();
        for text in ["", "völlig unbekannte wörter", "zzz qqq xxx", "🦀🦀🦀"] {
            let reading = clf.classify_default(text);
            assert!((0.0..=1.0).contains(&reading.score), "score out of bounds");
        }
    }

    #[test]
    fn test_deterministic_across_instances() {
        let a = SocialClassifier::train();
        let b = SocialClassifier::train();
        let text = "company announces official results";
        assert_eq!(a.classify_default(text), b.classify_default(text));
    }

    #[test]
    fn test_threshold_controls_label() {
        let clf = SocialClassifier::shared();
        let reading = clf.classify("official regulatory filing", 1.1);
        // probability can never reach an impossible threshold
        assert_eq!(reading.label, SocialLabel::Suspicious);
    }
}
