//! Analysis runner for composing and executing statistics steps.

use crate::association::{correlate_against, AssociationSet};
use crate::correlation::{correlation_matrix_with, CorrelationMatrix, CorrelationMethod, MatrixOptions};
use crate::data::{CorrelationResult, RegressionResult, SeriesTable};
use crate::error::{Result, StatsError};
use crate::regression::linregress;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A step in an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnalysisStep {
    /// Pearson correlation between two columns.
    Pearson { x: String, y: String },
    /// Spearman correlation between two columns.
    Spearman { x: String, y: String },
    /// Linear regression of `y` on `x`.
    LinRegress { x: String, y: String },
    /// Correlation matrix over some or all columns.
    CorrelationMatrix {
        #[serde(default)]
        columns: Option<Vec<String>>,
        #[serde(default)]
        method: CorrelationMethod,
        #[serde(default)]
        cluster: bool,
    },
    /// Correlate one column against all others.
    Associations {
        target: String,
        #[serde(default)]
        method: CorrelationMethod,
        #[serde(default)]
        top: Option<usize>,
    },
}

/// Output of a single step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisOutput {
    /// Pairwise correlation.
    Correlation {
        x: String,
        y: String,
        method: CorrelationMethod,
        result: CorrelationResult,
    },
    /// Linear regression fit.
    Regression {
        x: String,
        y: String,
        result: RegressionResult,
    },
    /// Correlation matrix.
    Matrix {
        method: CorrelationMethod,
        clustered: bool,
        result: CorrelationMatrix,
    },
    /// Ranked associations.
    Associations { result: AssociationSet },
}

/// Outputs of a full analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Name of the analysis.
    pub name: String,
    /// One output per step, in step order.
    pub outputs: Vec<AnalysisOutput>,
}

impl AnalysisReport {
    /// Number of outputs.
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Serialize to pretty JSON. NaN values become `null`.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(StatsError::from)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(StatsError::from)
    }
}

/// Analysis configuration for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Name of the analysis.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Steps to execute.
    pub steps: Vec<AnalysisStep>,
}

impl AnalysisConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(StatsError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(StatsError::from)
    }
}

/// Builder for constructing and running analyses.
#[derive(Debug, Clone)]
pub struct Analysis {
    steps: Vec<AnalysisStep>,
    name: String,
}

impl Default for Analysis {
    fn default() -> Self {
        Self::new()
    }
}

impl Analysis {
    /// Create a new empty analysis.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            name: "unnamed".to_string(),
        }
    }

    /// Create from a config.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            steps: config.steps.clone(),
            name: config.name.clone(),
        }
    }

    /// Set the analysis name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Add a Pearson correlation.
    pub fn pearson(mut self, x: &str, y: &str) -> Self {
        self.steps.push(AnalysisStep::Pearson {
            x: x.to_string(),
            y: y.to_string(),
        });
        self
    }

    /// Add a Spearman correlation.
    pub fn spearman(mut self, x: &str, y: &str) -> Self {
        self.steps.push(AnalysisStep::Spearman {
            x: x.to_string(),
            y: y.to_string(),
        });
        self
    }

    /// Add a linear regression of `y` on `x`.
    pub fn linregress(mut self, x: &str, y: &str) -> Self {
        self.steps.push(AnalysisStep::LinRegress {
            x: x.to_string(),
            y: y.to_string(),
        });
        self
    }

    /// Add a correlation matrix. `None` uses every column.
    pub fn correlation_matrix(
        mut self,
        columns: Option<&[&str]>,
        method: CorrelationMethod,
        cluster: bool,
    ) -> Self {
        self.steps.push(AnalysisStep::CorrelationMatrix {
            columns: columns.map(|c| c.iter().map(|s| s.to_string()).collect()),
            method,
            cluster,
        });
        self
    }

    /// Add a ranking of all columns by correlation with `target`.
    pub fn associations(mut self, target: &str, method: CorrelationMethod, top: Option<usize>) -> Self {
        self.steps.push(AnalysisStep::Associations {
            target: target.to_string(),
            method,
            top,
        });
        self
    }

    /// Steps added so far.
    pub fn steps(&self) -> &[AnalysisStep] {
        &self.steps
    }

    /// Convert to config for serialization.
    pub fn to_config(&self, description: Option<&str>) -> AnalysisConfig {
        AnalysisConfig {
            name: self.name.clone(),
            description: description.map(String::from),
            steps: self.steps.clone(),
        }
    }

    /// Run every step against a table.
    pub fn run(&self, table: &SeriesTable) -> Result<AnalysisReport> {
        let mut outputs = Vec::with_capacity(self.steps.len());

        for (i, step) in self.steps.iter().enumerate() {
            info!(analysis = %self.name, step = i + 1, "running {:?}", step);
            let output = run_step(step, table).map_err(|e| {
                StatsError::Pipeline(format!("Step {} ({:?}) failed: {}", i + 1, step, e))
            })?;
            outputs.push(output);
        }

        Ok(AnalysisReport {
            name: self.name.clone(),
            outputs,
        })
    }
}

fn run_step(step: &AnalysisStep, table: &SeriesTable) -> Result<AnalysisOutput> {
    match step {
        AnalysisStep::Pearson { x, y } => correlation_output(table, x, y, CorrelationMethod::Pearson),
        AnalysisStep::Spearman { x, y } => {
            correlation_output(table, x, y, CorrelationMethod::Spearman)
        }
        AnalysisStep::LinRegress { x, y } => {
            let result = linregress(table.require(x)?, table.require(y)?)?;
            Ok(AnalysisOutput::Regression {
                x: x.clone(),
                y: y.clone(),
                result,
            })
        }
        AnalysisStep::CorrelationMatrix {
            columns,
            method,
            cluster,
        } => {
            let selected = match columns {
                Some(names) => table.select(names)?,
                None => table.clone(),
            };
            let options = MatrixOptions {
                method: *method,
                cluster: *cluster,
            };
            let result = correlation_matrix_with(selected.series(), &options)?;
            Ok(AnalysisOutput::Matrix {
                method: *method,
                clustered: *cluster,
                result,
            })
        }
        AnalysisStep::Associations {
            target,
            method,
            top,
        } => {
            let mut result = correlate_against(table, target, *method)?;
            if let Some(k) = top {
                result.truncate(*k);
            }
            Ok(AnalysisOutput::Associations { result })
        }
    }
}

fn correlation_output(
    table: &SeriesTable,
    x: &str,
    y: &str,
    method: CorrelationMethod,
) -> Result<AnalysisOutput> {
    let result = method.correlate(table.require(x)?, table.require(y)?)?;
    Ok(AnalysisOutput::Correlation {
        x: x.to_string(),
        y: y.to_string(),
        method,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    fn create_test_table() -> SeriesTable {
        let tsv = "\
cell_line\tA\tB\tC\tD
ACH-1\t1.0\t2.0\t5.0\t0.3
ACH-2\t2.0\t4.1\t4.0\t0.1
ACH-3\t3.0\t5.9\t3.0\tNA
ACH-4\t4.0\t8.2\t2.0\t0.4
ACH-5\t5.0\t9.8\t1.0\t0.2
";
        SeriesTable::from_reader(Cursor::new(tsv)).unwrap()
    }

    #[test]
    fn test_run_all_step_kinds() {
        let table = create_test_table();
        let report = Analysis::new()
            .name("smoke")
            .pearson("A", "B")
            .spearman("A", "C")
            .linregress("A", "B")
            .correlation_matrix(None, CorrelationMethod::Pearson, true)
            .associations("A", CorrelationMethod::Pearson, Some(2))
            .run(&table)
            .unwrap();

        assert_eq!(report.name, "smoke");
        assert_eq!(report.len(), 5);

        match &report.outputs[1] {
            AnalysisOutput::Correlation { result, method, .. } => {
                assert_eq!(*method, CorrelationMethod::Spearman);
                assert_eq!(result.statistic, -1.0);
            }
            other => panic!("unexpected output: {:?}", other),
        }
        match &report.outputs[2] {
            AnalysisOutput::Regression { result, .. } => {
                assert_relative_eq!(result.slope, 1.97, epsilon = 1e-10);
            }
            other => panic!("unexpected output: {:?}", other),
        }
        match &report.outputs[3] {
            AnalysisOutput::Matrix { result, clustered, .. } => {
                assert!(*clustered);
                assert_eq!(result.len(), 4);
            }
            other => panic!("unexpected output: {:?}", other),
        }
        match &report.outputs[4] {
            AnalysisOutput::Associations { result } => {
                assert_eq!(result.len(), 2);
                assert_eq!(result.target, "A");
            }
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[test]
    fn test_matrix_column_subset() {
        let table = create_test_table();
        let report = Analysis::new()
            .correlation_matrix(Some(&["C", "A"]), CorrelationMethod::Spearman, false)
            .run(&table)
            .unwrap();
        match &report.outputs[0] {
            AnalysisOutput::Matrix { result, .. } => {
                assert_eq!(result.columns, vec!["C", "A"]);
                assert_eq!(result.matrix[(0, 1)], -1.0);
            }
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[test]
    fn test_failing_step_names_step() {
        let table = create_test_table();
        let result = Analysis::new()
            .pearson("A", "B")
            .pearson("A", "missing")
            .run(&table);
        match result {
            Err(StatsError::Pipeline(msg)) => {
                assert!(msg.starts_with("Step 2"), "{}", msg);
                assert!(msg.contains("missing"), "{}", msg);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_config_yaml_roundtrip() {
        let analysis = Analysis::new()
            .name("melanoma")
            .pearson("SOX10", "MITF")
            .correlation_matrix(None, CorrelationMethod::Spearman, true);
        let yaml = analysis.to_config(Some("lineage markers")).to_yaml().unwrap();

        let config = AnalysisConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config.name, "melanoma");
        assert_eq!(config.description.as_deref(), Some("lineage markers"));
        assert_eq!(config.steps, analysis.steps());
    }

    #[test]
    fn test_config_defaults() {
        let yaml = "\
name: defaults
steps:
  - CorrelationMatrix: {}
  - Associations:
      target: A
";
        let config = AnalysisConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            config.steps[0],
            AnalysisStep::CorrelationMatrix {
                columns: None,
                method: CorrelationMethod::Pearson,
                cluster: false,
            }
        );
        let report = Analysis::from_config(&config).run(&create_test_table()).unwrap();
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_report_json_nan_is_null() {
        let table = create_test_table();
        let report = Analysis::new().pearson("A", "D").run(&table).unwrap();
        // D has 4 values; still defined
        let json = report.to_json().unwrap();
        assert!(json.contains("\"kind\": \"correlation\""));

        let mut columns = indexmap::IndexMap::new();
        columns.insert("x".to_string(), vec![Some(1.0), None, Some(2.0)]);
        columns.insert("y".to_string(), vec![Some(1.0), Some(2.0), Some(3.0)]);
        let sparse = SeriesTable::from_columns(columns).unwrap();
        let report = Analysis::new().pearson("x", "y").run(&sparse).unwrap();
        let json = report.to_json().unwrap();
        assert!(json.contains("\"statistic\": null"));
    }
}
