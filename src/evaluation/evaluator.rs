//! Baseline evaluation on the holdout and on walk-forward folds.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::{info, warn};

use crate::features::SupervisedTable;
use crate::split::{ExpandingFolds, ExpandingFoldsConfig, TrainTestSplit};

use super::baselines::Baseline;
use super::metrics::RegressionMetrics;
use super::EvaluationError;

/// Evaluation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Number of walk-forward folds over the training rows.
    pub folds: usize,
    /// Baseline names, e.g. `persistence`, `rolling_mean_7`, `seasonal_7`.
    pub baselines: Vec<String>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            folds: 5,
            baselines: vec![
                "persistence".to_string(),
                "rolling_mean_7".to_string(),
                "seasonal_7".to_string(),
            ],
        }
    }
}

/// Score of one baseline on one fold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldScore {
    pub fold_num: usize,
    pub train_rows: usize,
    pub metrics: RegressionMetrics,
}

/// MAE across all walk-forward folds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkForwardSummary {
    pub folds: Vec<FoldScore>,
    pub mae_mean: f64,
    pub mae_std: f64,
}

/// All results for one baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineScore {
    pub baseline: String,
    pub holdout: Option<RegressionMetrics>,
    pub walk_forward: Option<WalkForwardSummary>,
}

/// Results written to `metrics.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub train_rows: usize,
    pub test_rows: usize,
    pub scores: Vec<BaselineScore>,
}

impl EvaluationReport {
    /// Baseline with the lowest holdout MAE.
    pub fn best_holdout(&self) -> Option<&BaselineScore> {
        self.scores
            .iter()
            .filter(|s| s.holdout.is_some())
            .min_by(|a, b| {
                let mae = |s: &BaselineScore| s.holdout.as_ref().map(|m| m.mae).unwrap_or(f64::MAX);
                mae(a).total_cmp(&mae(b))
            })
    }

    pub fn summary(&self) -> String {
        let mut out = format!(
            "Baseline Evaluation ({} train rows, {} test rows)\n",
            self.train_rows, self.test_rows
        );
        for score in &self.scores {
            out.push_str(&format!("\n{}\n", score.baseline));
            match &score.holdout {
                Some(m) => out.push_str(&format!("  holdout:      {}\n", m.summary())),
                None => out.push_str("  holdout:      n/a\n"),
            }
            match &score.walk_forward {
                Some(wf) => out.push_str(&format!(
                    "  walk-forward: MAE {:.3} ± {:.3} over {} folds\n",
                    wf.mae_mean,
                    wf.mae_std,
                    wf.folds.len()
                )),
                None => out.push_str("  walk-forward: n/a\n"),
            }
        }
        out
    }

    /// Write the report as pretty JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> Result<(), EvaluationError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Runs a set of baselines over a train/test split.
pub struct Evaluator {
    baselines: Vec<Baseline>,
    folds: ExpandingFoldsConfig,
}

impl Evaluator {
    pub fn new(config: &EvaluationConfig) -> Result<Self, EvaluationError> {
        let baselines = config
            .baselines
            .iter()
            .map(|name| {
                Baseline::parse(name).ok_or_else(|| EvaluationError::UnknownBaseline(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            baselines,
            folds: ExpandingFoldsConfig {
                folds: config.folds,
                min_train: 1,
            },
        })
    }

    pub fn baselines(&self) -> &[Baseline] {
        &self.baselines
    }

    /// Fit on train, score on test.
    pub fn evaluate_holdout(
        &self,
        baseline: Baseline,
        split: &TrainTestSplit,
    ) -> Result<RegressionMetrics, EvaluationError> {
        let fitted = baseline.fit(&split.train)?;
        let predicted = fitted.predict_table(&split.test);
        Ok(RegressionMetrics::calculate(&split.test.targets(), &predicted))
    }

    /// Score a baseline on expanding folds over the training table.
    pub fn evaluate_walk_forward(
        &self,
        baseline: Baseline,
        train: &SupervisedTable,
    ) -> Result<WalkForwardSummary, EvaluationError> {
        let folds = ExpandingFolds::new(self.folds.clone()).generate(train.len())?;

        let mut scores = Vec::with_capacity(folds.len());
        for fold in folds {
            let (fold_train, fold_validate) = fold.apply(train);
            let fitted = baseline.fit(&fold_train)?;
            let predicted = fitted.predict_table(&fold_validate);
            scores.push(FoldScore {
                fold_num: fold.fold_num,
                train_rows: fold.train_len(),
                metrics: RegressionMetrics::calculate(&fold_validate.targets(), &predicted),
            });
        }

        let maes: Vec<f64> = scores.iter().map(|s| s.metrics.mae).collect();
        let mae_mean = maes.iter().mean();
        let mae_std = if maes.len() < 2 {
            0.0
        } else {
            maes.iter().std_dev()
        };

        Ok(WalkForwardSummary {
            folds: scores,
            mae_mean,
            mae_std,
        })
    }

    /// Evaluate every baseline. Holdout is skipped when test is empty;
    /// walk-forward is skipped with a warning when train is too short.
    pub fn evaluate(&self, split: &TrainTestSplit) -> Result<EvaluationReport, EvaluationError> {
        let mut scores = Vec::with_capacity(self.baselines.len());

        for &baseline in &self.baselines {
            let holdout = if split.test.is_empty() {
                None
            } else {
                match self.evaluate_holdout(baseline, split) {
                    Ok(metrics) => Some(metrics),
                    Err(EvaluationError::EmptyTrain) => {
                        warn!(baseline = %baseline, "skipping holdout: training table is empty");
                        None
                    }
                    Err(e) => return Err(e),
                }
            };

            let walk_forward = match self.evaluate_walk_forward(baseline, &split.train) {
                Ok(summary) => Some(summary),
                Err(EvaluationError::Split(e)) => {
                    warn!(baseline = %baseline, error = %e, "skipping walk-forward evaluation");
                    None
                }
                Err(e) => return Err(e),
            };

            if let Some(m) = &holdout {
                info!(baseline = %baseline, mae = m.mae, rmse = m.rmse, "holdout evaluated");
            }

            scores.push(BaselineScore {
                baseline: baseline.to_string(),
                holdout,
                walk_forward,
            });
        }

        Ok(EvaluationReport {
            train_rows: split.train.len(),
            test_rows: split.test.len(),
            scores,
        })
    }
}
