use serde::{Deserialize, Serialize};

use super::ModelError;

/// One node of a fitted decision tree, stored in a flat array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Go to `left` when `row[feature] <= threshold`, else `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Per-class weights (sample counts or fractions).
    Leaf { value: Vec<f64> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self, feature_count: usize, class_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= feature_count {
                        return Err(format!("node {i} splits on feature {feature}"));
                    }
                    if *left >= self.nodes.len() || *right >= self.nodes.len() {
                        return Err(format!("node {i} has a child out of range"));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {i} has a NaN threshold"));
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != class_count {
                        return Err(format!(
                            "leaf {i} has {} values for {class_count} classes",
                            value.len()
                        ));
                    }
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                        return Err(format!("leaf {i} has a negative or non-finite value"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walks from the root to a leaf and normalises its weights. A walk
    /// longer than the node count means the tree has a cycle.
    pub fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], ModelError> {
        let mut index = 0;
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = row.get(*feature).copied().ok_or_else(|| {
                        ModelError::Inference(format!("feature {feature} out of range"))
                    })?;
                    index = if x <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) => {
                    let total: f64 = value.iter().sum();
                    if total <= 0.0 || value.len() != 2 {
                        return Err(ModelError::Inference(format!(
                            "leaf {index} has no usable class weights"
                        )));
                    }
                    return Ok([value[0] / total, value[1] / total]);
                }
                None => {
                    return Err(ModelError::Inference(format!("node {index} does not exist")));
                }
            }
        }
        Err(ModelError::Inference(
            "tree walk exceeded the node count".to_string(),
        ))
    }
}

/// Mean of the tree probabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub(super) fn validate(&self, feature_count: usize, class_count: usize) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::InvalidArtifact("forest has no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(feature_count, class_count)
                .map_err(|reason| ModelError::InvalidArtifact(format!("tree {i}: {reason}")))?;
        }
        Ok(())
    }

    pub fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], ModelError> {
        let mut sum = [0.0; 2];
        for tree in &self.trees {
            let [a, b] = tree.predict_proba(row)?;
            sum[0] += a;
            sum[1] += b;
        }
        let n = self.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(threshold: f64) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    value: vec![3.0, 1.0],
                },
                TreeNode::Leaf {
                    value: vec![0.0, 2.0],
                },
            ],
        }
    }

    #[test]
    fn test_tree_walk() {
        let tree = stump(5.0);
        assert_eq!(tree.predict_proba(&[5.0]).unwrap(), [0.75, 0.25]);
        assert_eq!(tree.predict_proba(&[5.1]).unwrap(), [0.0, 1.0]);
    }

    #[test]
    fn test_forest_mean() {
        let forest = RandomForest {
            trees: vec![stump(5.0), stump(10.0)],
        };
        forest.validate(1, 2).unwrap();
        let [negative, positive] = forest.predict_proba(&[7.0]).unwrap();
        assert!((positive - 0.625).abs() < 1e-12);
        assert!((negative - 0.375).abs() < 1e-12);
    }

    #[test]
    fn test_cycle_detected() {
        let tree = DecisionTree {
            nodes: vec![TreeNode::Split {
                feature: 0,
                threshold: 0.0,
                left: 0,
                right: 0,
            }],
        };
        assert!(tree.validate(1, 2).is_ok());
        assert!(matches!(
            tree.predict_proba(&[1.0]),
            Err(ModelError::Inference(_))
        ));
    }

    #[test]
    fn test_validate() {
        let forest = RandomForest {
            trees: vec![stump(1.0)],
        };
        assert!(forest.validate(0, 2).is_err());
        assert!(forest.validate(1, 3).is_err());
        assert!(RandomForest { trees: vec![] }.validate(1, 2).is_err());
    }

    #[test]
    fn test_json_shape() {
        let node: TreeNode =
            serde_json::from_str(r#"{"kind": "split", "feature": 2, "threshold": 1.5, "left": 1, "right": 2}"#)
                .unwrap();
        assert_eq!(
            node,
            TreeNode::Split {
                feature: 2,
                threshold: 1.5,
                left: 1,
                right: 2
            }
        );
    }
}
