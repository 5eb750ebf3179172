//! Gradient-boosted decision trees for binary classification
//!
//! LightGBM-style boosting on the binary log-loss:
//! - Leaf-wise (best-first) tree growth bounded by `num_leaves` and `max_depth`
//! - Per-tree row subsampling and column subsampling from a seeded RNG
//! - Split search parallelised over features with rayon; results are reduced
//!   in feature order so the fitted model does not depend on thread scheduling

use super::models::BinaryClassifier;
use crate::error::{ClaimBoostError, Result};
use crate::optimizer::{ParameterValue, TrialParams};
use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::path::Path;

/// Identifies model documents written by [`GbdtClassifier::save_model`]
const MODEL_FORMAT: &str = "claimboost-gbdt";
const MODEL_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    /// Maximum number of leaves per tree
    pub num_leaves: usize,
    /// `None` means unlimited depth
    pub max_depth: Option<usize>,
    pub min_child_samples: usize,
    /// Fraction of rows used to grow each tree
    pub subsample: f64,
    /// Fraction of features considered by each tree
    pub colsample_bytree: f64,
    pub reg_lambda: f64,
    pub reg_alpha: f64,
    pub random_state: u64,
}

impl Default for GbdtConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            num_leaves: 31,
            max_depth: None,
            min_child_samples: 20,
            subsample: 1.0,
            colsample_bytree: 1.0,
            reg_lambda: 0.0,
            reg_alpha: 0.0,
            random_state: 42,
        }
    }
}

impl GbdtConfig {
    /// Build a config from a sampled assignment.
    ///
    /// Parameters not present keep their defaults. `max_depth <= 0` means
    /// unlimited depth. A `random_state` entry overrides `random_state`.
    pub fn from_params(params: &TrialParams, random_state: u64) -> Result<Self> {
        let mut config = Self {
            random_state,
            ..Self::default()
        };

        for (name, value) in params {
            match name.as_str() {
                "n_estimators" => config.n_estimators = count_param(name, value)?,
                "learning_rate" => config.learning_rate = float_param(name, value)?,
                "max_depth" => {
                    let depth = int_param(name, value)?;
                    config.max_depth = if depth <= 0 { None } else { Some(depth as usize) };
                }
                "num_leaves" => config.num_leaves = count_param(name, value)?,
                "min_child_samples" => config.min_child_samples = count_param(name, value)?,
                "subsample" => config.subsample = float_param(name, value)?,
                "colsample_bytree" => config.colsample_bytree = float_param(name, value)?,
                "reg_lambda" => config.reg_lambda = float_param(name, value)?,
                "reg_alpha" => config.reg_alpha = float_param(name, value)?,
                "random_state" => config.random_state = count_param(name, value)? as u64,
                other => {
                    return Err(invalid(other, value, "unknown parameter"));
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check parameter constraints
    pub fn validate(&self) -> Result<()> {
        let fail = |name: &str, value: String, reason: &str| ClaimBoostError::InvalidParameter {
            name: name.to_string(),
            value,
            reason: reason.to_string(),
        };

        if self.n_estimators == 0 {
            return Err(fail("n_estimators", "0".into(), "must be at least 1"));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(fail(
                "learning_rate",
                self.learning_rate.to_string(),
                "must be positive",
            ));
        }
        if self.num_leaves < 2 {
            return Err(fail(
                "num_leaves",
                self.num_leaves.to_string(),
                "must be at least 2",
            ));
        }
        for (name, v) in [
            ("subsample", self.subsample),
            ("colsample_bytree", self.colsample_bytree),
        ] {
            if !(v > 0.0 && v <= 1.0) {
                return Err(fail(name, v.to_string(), "must be in (0, 1]"));
            }
        }
        for (name, v) in [("reg_lambda", self.reg_lambda), ("reg_alpha", self.reg_alpha)] {
            if !(v >= 0.0 && v.is_finite()) {
                return Err(fail(name, v.to_string(), "must be non-negative"));
            }
        }
        Ok(())
    }
}

fn invalid(name: &str, value: &ParameterValue, reason: &str) -> ClaimBoostError {
    ClaimBoostError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn int_param(name: &str, value: &ParameterValue) -> Result<i64> {
    value
        .as_int()
        .ok_or_else(|| invalid(name, value, "expected an integer"))
}

fn count_param(name: &str, value: &ParameterValue) -> Result<usize> {
    usize::try_from(int_param(name, value)?)
        .map_err(|_| invalid(name, value, "must be non-negative"))
}

fn float_param(name: &str, value: &ParameterValue) -> Result<f64> {
    value
        .as_float()
        .ok_or_else(|| invalid(name, value, "expected a number"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Leaf { value: f64 },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A regression tree stored as a flat node array, root at index 0.
/// Children always sit after their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn predict(&self, sample: &ArrayView1<f64>) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split { feature, threshold, left, right } => {
                    idx = if sample[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }

    fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        let mut max_depth = 0;
        for (idx, node) in self.nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = node {
                depths[*left] = depths[idx] + 1;
                depths[*right] = depths[idx] + 1;
                max_depth = max_depth.max(depths[idx] + 1);
            }
        }
        max_depth
    }

    /// Structural check for trees read from disk
    fn check(&self, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(ClaimBoostError::SerializationError("empty tree".to_string()));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if let Node::Split { feature, left, right, .. } = node {
                let in_range = |child: usize| child > idx && child < self.nodes.len();
                if *feature >= n_features || !in_range(*left) || !in_range(*right) {
                    return Err(ClaimBoostError::SerializationError(format!(
                        "malformed split node {}",
                        idx
                    )));
                }
            }
        }
        Ok(())
    }
}

// ---- Tree building utilities ----

fn compute_leaf_weight(g: f64, h: f64, lambda: f64, alpha: f64) -> f64 {
    let g_adj = if g.abs() <= alpha { 0.0 } else { g - alpha * g.signum() };
    -g_adj / (h + lambda)
}

fn compute_gain_single(g: f64, h: f64, lambda: f64) -> f64 {
    g * g / (h + lambda)
}

fn make_leaf(gradients: &[f64], hessians: &[f64], indices: &[usize], lambda: f64, alpha: f64) -> Node {
    let g: f64 = indices.iter().map(|&i| gradients[i]).sum();
    let h: f64 = indices.iter().map(|&i| hessians[i]).sum();
    Node::Leaf { value: compute_leaf_weight(g, h, lambda, alpha) }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
    left_indices: Vec<usize>,
    right_indices: Vec<usize>,
}

/// Gradient statistics shared by every tree of one boosting round
struct GradientStats<'a> {
    x: &'a Array2<f64>,
    gradients: &'a [f64],
    hessians: &'a [f64],
}

impl GradientStats<'_> {
    fn best_split_for_feature(
        &self,
        indices: &[usize],
        feature: usize,
        reg_lambda: f64,
        min_child_samples: usize,
    ) -> Option<SplitCandidate> {
        if indices.len() < 2 {
            return None;
        }
        let (x, gradients, hessians) = (self.x, self.gradients, self.hessians);

        let mut sorted: Vec<(usize, f64)> = indices.iter().map(|&i| (i, x[[i, feature]])).collect();
        sorted.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

        let total_g: f64 = indices.iter().map(|&i| gradients[i]).sum();
        let total_h: f64 = indices.iter().map(|&i| hessians[i]).sum();
        let base_score = compute_gain_single(total_g, total_h, reg_lambda);

        let mut left_g = 0.0;
        let mut left_h = 0.0;
        let mut best_gain = 0.0;
        let mut best: Option<(f64, usize)> = None;

        for i in 0..sorted.len() - 1 {
            left_g += gradients[sorted[i].0];
            left_h += hessians[sorted[i].0];

            if i + 1 < min_child_samples || sorted.len() - i - 1 < min_child_samples {
                continue;
            }
            if sorted[i].1 == sorted[i + 1].1 {
                continue;
            }

            let right_g = total_g - left_g;
            let right_h = total_h - left_h;
            let gain = compute_gain_single(left_g, left_h, reg_lambda)
                + compute_gain_single(right_g, right_h, reg_lambda)
                - base_score;

            if gain > best_gain {
                best_gain = gain;
                best = Some(((sorted[i].1 + sorted[i + 1].1) / 2.0, i + 1));
            }
        }

        let (threshold, pos) = best?;
        Some(SplitCandidate {
            feature,
            threshold,
            gain: best_gain,
            left_indices: sorted[..pos].iter().map(|&(i, _)| i).collect(),
            right_indices: sorted[pos..].iter().map(|&(i, _)| i).collect(),
        })
    }

    /// Best split over `features`; on equal gain the earlier feature wins
    fn best_split(
        &self,
        indices: &[usize],
        features: &[usize],
        config: &GbdtConfig,
        min_child_samples: usize,
    ) -> Option<SplitCandidate> {
        let candidates: Vec<SplitCandidate> = features
            .par_iter()
            .filter_map(|&feat| {
                self.best_split_for_feature(indices, feat, config.reg_lambda, min_child_samples)
            })
            .collect();

        candidates.into_iter().fold(None, |best, c| match best {
            Some(b) if b.gain >= c.gain => Some(b),
            _ => Some(c),
        })
    }
}

struct PendingSplit {
    gain: f64,
    /// Creation order; breaks gain ties so older leaves split first
    seq: usize,
    node_id: usize,
    split: SplitCandidate,
}

impl PartialEq for PendingSplit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for PendingSplit {}
impl PartialOrd for PendingSplit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for PendingSplit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.gain
            .partial_cmp(&other.gain)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

enum NodeSlot {
    Leaf(Vec<usize>),
    Split { feature: usize, threshold: f64, left: usize, right: usize },
}

/// Build one tree using leaf-wise (best-first) growth
fn build_tree(
    stats: &GradientStats,
    indices: Vec<usize>,
    features: &[usize],
    config: &GbdtConfig,
) -> Tree {
    let min_child = config.min_child_samples.max(1);
    let max_depth = config.max_depth.unwrap_or(usize::MAX);

    let mut heap: BinaryHeap<PendingSplit> = BinaryHeap::new();
    let mut seq = 0usize;
    if max_depth > 0 && indices.len() >= min_child * 2 {
        if let Some(split) = stats.best_split(&indices, features, config, min_child) {
            heap.push(PendingSplit { gain: split.gain, seq, node_id: 0, split });
            seq += 1;
        }
    }

    let mut nodes: Vec<NodeSlot> = vec![NodeSlot::Leaf(indices)];
    let mut depths: Vec<usize> = vec![0];
    let mut n_leaves = 1usize;

    while n_leaves < config.num_leaves {
        let Some(pending) = heap.pop() else {
            break;
        };
        let depth = depths[pending.node_id];
        let SplitCandidate { feature, threshold, left_indices, right_indices, .. } = pending.split;

        let left_id = nodes.len();
        let right_id = left_id + 1;
        nodes[pending.node_id] = NodeSlot::Split { feature, threshold, left: left_id, right: right_id };
        nodes.push(NodeSlot::Leaf(left_indices));
        nodes.push(NodeSlot::Leaf(right_indices));
        depths.push(depth + 1);
        depths.push(depth + 1);
        n_leaves += 1;

        if depth + 1 >= max_depth {
            continue;
        }
        for child_id in [left_id, right_id] {
            let NodeSlot::Leaf(child_indices) = &nodes[child_id] else {
                continue;
            };
            if child_indices.len() < min_child * 2 {
                continue;
            }
            if let Some(split) = stats.best_split(child_indices, features, config, min_child) {
                heap.push(PendingSplit { gain: split.gain, seq, node_id: child_id, split });
                seq += 1;
            }
        }
    }

    let nodes = nodes
        .into_iter()
        .map(|slot| match slot {
            NodeSlot::Leaf(indices) => make_leaf(
                stats.gradients,
                stats.hessians,
                &indices,
                config.reg_lambda,
                config.reg_alpha,
            ),
            NodeSlot::Split { feature, threshold, left, right } => {
                Node::Split { feature, threshold, left, right }
            }
        })
        .collect();
    Tree { nodes }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Number of items kept when sampling `fraction` of `n`
fn sample_size(n: usize, fraction: f64) -> usize {
    ((n as f64 * fraction).ceil() as usize).clamp(1, n)
}

/// `k` distinct items of `0..n` in random order, or all of them in order when `k >= n`
fn sample_indices(n: usize, k: usize, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..n).collect();
    if k < n {
        idx.shuffle(rng);
        idx.truncate(k);
    }
    idx
}

/// Gradient-boosted tree classifier for labels in {0, 1}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbdtClassifier {
    pub config: GbdtConfig,
    trees: Vec<Tree>,
    base_score: f64,
    n_features: Option<usize>,
}

#[derive(Serialize, Deserialize)]
struct ModelDocument {
    format: String,
    version: u32,
    model: GbdtClassifier,
}

impl GbdtClassifier {
    pub fn new(config: GbdtConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            base_score: 0.0,
            n_features: None,
        }
    }

    /// Build an unfitted classifier from a sampled assignment
    pub fn from_params(params: &TrialParams, random_state: u64) -> Result<Self> {
        Ok(Self::new(GbdtConfig::from_params(params, random_state)?))
    }

    pub fn is_fitted(&self) -> bool {
        self.n_features.is_some()
    }

    /// Feature count seen during `fit`
    pub fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    pub fn config(&self) -> &GbdtConfig {
        &self.config
    }

    /// Number of trees grown
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Leaves per tree
    pub fn leaf_counts(&self) -> Vec<usize> {
        self.trees.iter().map(Tree::n_leaves).collect()
    }

    /// Depth per tree
    pub fn tree_depths(&self) -> Vec<usize> {
        self.trees.iter().map(Tree::depth).collect()
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.config.validate()?;

        let n = x.nrows();
        if n == 0 || x.ncols() == 0 {
            return Err(ClaimBoostError::TrainingError("Empty dataset".into()));
        }
        if y.len() != n {
            return Err(ClaimBoostError::TrainingError(format!(
                "x has {} rows but y has {} labels",
                n,
                y.len()
            )));
        }
        if let Some(bad) = y.iter().find(|&&v| v != 0.0 && v != 1.0) {
            return Err(ClaimBoostError::TrainingError(format!(
                "labels must be 0 or 1, found {}",
                bad
            )));
        }

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.random_state);
        let pos = y.iter().filter(|&&v| v > 0.5).count() as f64;
        let p = (pos / n as f64).clamp(1e-15, 1.0 - 1e-15);
        self.base_score = (p / (1.0 - p)).ln();
        self.trees.clear();

        let n_features = x.ncols();
        let n_rows_per_tree = sample_size(n, self.config.subsample);
        let n_features_per_tree = sample_size(n_features, self.config.colsample_bytree);
        let mut raw = Array1::from_elem(n, self.base_score);

        for _ in 0..self.config.n_estimators {
            let probs: Vec<f64> = raw.iter().map(|&r| sigmoid(r)).collect();
            let gradients: Vec<f64> = probs.iter().zip(y.iter()).map(|(&p, &yi)| p - yi).collect();
            let hessians: Vec<f64> = probs.iter().map(|&p| (p * (1.0 - p)).max(1e-16)).collect();

            let indices = sample_indices(n, n_rows_per_tree, &mut rng);
            let mut features = sample_indices(n_features, n_features_per_tree, &mut rng);
            features.sort_unstable();

            let stats = GradientStats { x, gradients: &gradients, hessians: &hessians };
            let tree = build_tree(&stats, indices, &features, &self.config);

            for (r, row) in raw.iter_mut().zip(x.rows()) {
                *r += self.config.learning_rate * tree.predict(&row);
            }
            self.trees.push(tree);
        }

        self.n_features = Some(n_features);
        Ok(())
    }

    /// Class 1 only when P(y=1) is strictly above 0.5
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let raw = self.predict_raw(x)?;
        Ok(raw.mapv(|r| if sigmoid(r) > 0.5 { 1.0 } else { 0.0 }))
    }

    /// Class probabilities, columns `[P(y=0), P(y=1)]`
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let raw = self.predict_raw(x)?;
        let mut proba = Array2::zeros((x.nrows(), 2));
        for (i, &r) in raw.iter().enumerate() {
            let p = sigmoid(r);
            proba[[i, 0]] = 1.0 - p;
            proba[[i, 1]] = p;
        }
        Ok(proba)
    }

    fn predict_raw(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let n_features = self.n_features.ok_or(ClaimBoostError::ModelNotFitted)?;
        if x.ncols() != n_features {
            return Err(ClaimBoostError::ShapeError {
                expected: format!("{} features", n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let lr = self.config.learning_rate;
        Ok(x.rows()
            .into_iter()
            .map(|row| {
                self.base_score + self.trees.iter().map(|t| lr * t.predict(&row)).sum::<f64>()
            })
            .collect())
    }

    /// Write the fitted model as a JSON document
    pub fn save_model(&self, path: impl AsRef<Path>) -> Result<()> {
        if !self.is_fitted() {
            return Err(ClaimBoostError::ModelNotFitted);
        }
        let doc = ModelDocument {
            format: MODEL_FORMAT.to_string(),
            version: MODEL_VERSION,
            model: self.clone(),
        };
        crate::utils::write_json(path.as_ref(), &doc)
    }

    /// Read a model written by [`save_model`](Self::save_model)
    pub fn load_model(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let doc: ModelDocument = serde_json::from_str(&json)?;
        if doc.format != MODEL_FORMAT || doc.version != MODEL_VERSION {
            return Err(ClaimBoostError::SerializationError(format!(
                "{} is not a {} v{} model (found {} v{})",
                path.display(),
                MODEL_FORMAT,
                MODEL_VERSION,
                doc.format,
                doc.version
            )));
        }
        let n_features = doc.model.n_features.ok_or(ClaimBoostError::ModelNotFitted)?;
        for tree in &doc.model.trees {
            tree.check(n_features)?;
        }
        Ok(doc.model)
    }
}

impl BinaryClassifier for GbdtClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        GbdtClassifier::fit(self, x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        GbdtClassifier::predict(self, x)
    }

    fn save_model(&self, path: &Path) -> Result<()> {
        GbdtClassifier::save_model(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_classification_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_vec((100, 2), (0..200).map(|i| (i as f64) / 100.0).collect()).unwrap();
        let y = Array1::from_vec((0..100).map(|i| if i < 50 { 0.0 } else { 1.0 }).collect());
        (x, y)
    }

    fn small_config() -> GbdtConfig {
        GbdtConfig { n_estimators: 30, num_leaves: 8, min_child_samples: 2, ..Default::default() }
    }

    #[test]
    fn test_gbdt_classifier() {
        let (x, y) = make_classification_data();
        let mut model = GbdtClassifier::new(small_config());
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&x).unwrap();
        let acc = preds.iter().zip(y.iter()).filter(|(&p, &t)| p == t).count() as f64 / 100.0;
        assert!(acc > 0.95, "Accuracy too low: {}", acc);
        assert_eq!(model.n_trees(), 30);
    }

    #[test]
    fn test_gbdt_predict_proba() {
        let (x, y) = make_classification_data();
        let mut model = GbdtClassifier::new(GbdtConfig { n_estimators: 10, ..small_config() });
        model.fit(&x, &y).unwrap();
        let proba = model.predict_proba(&x).unwrap();
        assert_eq!(proba.ncols(), 2);
        for i in 0..proba.nrows() {
            assert!((proba[[i, 0]] + proba[[i, 1]] - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_even_probability_predicts_negative() {
        // Constant features and balanced labels leave every score at log-odds 0
        let x = Array2::from_elem((10, 2), 1.0);
        let y = Array1::from_shape_fn(10, |i| (i % 2) as f64);
        let mut model = GbdtClassifier::new(GbdtConfig { n_estimators: 3, ..small_config() });
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        assert!(proba.column(1).iter().all(|&p| p == 0.5));
        assert!(model.predict(&x).unwrap().iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_tree_limits_respected() {
        let (x, y) = make_classification_data();
        let config = GbdtConfig { num_leaves: 4, max_depth: Some(2), ..small_config() };
        let mut model = GbdtClassifier::new(config);
        model.fit(&x, &y).unwrap();
        assert!(model.leaf_counts().iter().all(|&n| n <= 4));
        assert!(model.tree_depths().iter().all(|&d| d <= 2));
    }

    #[test]
    fn test_subsampling_is_seeded() {
        let (x, y) = make_classification_data();
        let config = GbdtConfig { subsample: 0.7, colsample_bytree: 0.5, random_state: 3, ..small_config() };

        let mut a = GbdtClassifier::new(config.clone());
        let mut b = GbdtClassifier::new(config);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }

    #[test]
    fn test_unfitted_and_shape_errors() {
        let (x, y) = make_classification_data();
        let mut model = GbdtClassifier::new(small_config());
        assert!(matches!(model.predict(&x), Err(ClaimBoostError::ModelNotFitted)));

        model.fit(&x, &y).unwrap();
        let wrong = Array2::zeros((3, 5));
        assert!(matches!(model.predict(&wrong), Err(ClaimBoostError::ShapeError { .. })));
    }

    #[test]
    fn test_invalid_training_data() {
        let (x, _) = make_classification_data();
        let mut model = GbdtClassifier::new(small_config());

        let short = Array1::zeros(10);
        assert!(matches!(model.fit(&x, &short), Err(ClaimBoostError::TrainingError(_))));

        let not_binary = Array1::from_elem(100, 2.0);
        assert!(matches!(model.fit(&x, &not_binary), Err(ClaimBoostError::TrainingError(_))));

        let empty = Array2::zeros((0, 2));
        assert!(model.fit(&empty, &Array1::zeros(0)).is_err());
    }

    #[test]
    fn test_config_validation() {
        let bad = [
            GbdtConfig { n_estimators: 0, ..Default::default() },
            GbdtConfig { learning_rate: 0.0, ..Default::default() },
            GbdtConfig { num_leaves: 1, ..Default::default() },
            GbdtConfig { subsample: 0.0, ..Default::default() },
            GbdtConfig { colsample_bytree: 1.5, ..Default::default() },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(ClaimBoostError::InvalidParameter { .. })),
                "{:?} should be rejected",
                config
            );
        }
        assert!(GbdtConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_params() {
        let mut params = TrialParams::new();
        params.insert("n_estimators".into(), ParameterValue::Int(50));
        params.insert("learning_rate".into(), ParameterValue::Float(0.05));
        params.insert("max_depth".into(), ParameterValue::Int(-1));
        params.insert("num_leaves".into(), ParameterValue::Int(15));
        params.insert("subsample".into(), ParameterValue::Float(0.8));

        let config = GbdtConfig::from_params(&params, 7).unwrap();
        assert_eq!(config.n_estimators, 50);
        assert_eq!(config.max_depth, None);
        assert_eq!(config.num_leaves, 15);
        assert_eq!(config.random_state, 7);
        assert_eq!(config.min_child_samples, 20);

        params.insert("random_state".into(), ParameterValue::Int(11));
        assert_eq!(GbdtConfig::from_params(&params, 7).unwrap().random_state, 11);

        params.insert("booster".into(), ParameterValue::Int(1));
        assert!(GbdtConfig::from_params(&params, 7).is_err());
    }

    #[test]
    fn test_from_params_rejects_fractional_count() {
        let mut params = TrialParams::new();
        params.insert("n_estimators".into(), ParameterValue::Float(10.5));
        assert!(matches!(
            GbdtConfig::from_params(&params, 0),
            Err(ClaimBoostError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let (x, y) = make_classification_data();
        let mut model = GbdtClassifier::new(small_config());
        model.fit(&x, &y).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("model.json");
        model.save_model(&path).unwrap();

        let loaded = GbdtClassifier::load_model(&path).unwrap();
        assert_eq!(loaded.config, model.config);
        assert_eq!(loaded.n_trees(), model.n_trees());
        let diff = (&loaded.predict_proba(&x).unwrap() - &model.predict_proba(&x).unwrap())
            .mapv(f64::abs)
            .fold(0.0f64, |a, &b| a.max(b));
        assert!(diff < 1e-9, "max probability difference {}", diff);
    }

    #[test]
    fn test_save_unfitted_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = GbdtClassifier::new(GbdtConfig::default());
        assert!(matches!(model.save_model(&path), Err(ClaimBoostError::ModelNotFitted)));
        assert!(!path.exists());
    }

    #[test]
    fn test_load_rejects_foreign_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.json");
        std::fs::write(&path, r#"{"format":"other","version":1,"model":null}"#).unwrap();
        assert!(GbdtClassifier::load_model(&path).is_err());
    }
}
