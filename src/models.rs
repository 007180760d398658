use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Number, Value};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub file_name: String,
}

impl SelectedFile {
    pub fn new(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        SelectedFile {
            path: path.to_path_buf(),
            file_name,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct UploadState {
    pub selected_file: Option<SelectedFile>,
    pub is_submitting: bool,
}

/// Response body of the prediction endpoint.
///
/// A deployment answers with exactly one of the two layouts. Objects carrying a
/// `success` key are decoded as [`NestedResult`], everything else as [`FlatResult`].
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "Value")]
pub enum PredictionResult {
    Flat(FlatResult),
    Nested(NestedResult),
}

impl TryFrom<Value> for PredictionResult {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if !value.is_object() {
            return Err(serde_json::Error::invalid_type(
                unexpected(&value),
                &"a JSON object",
            ));
        }
        if value.get("success").is_some() {
            serde_json::from_value(value).map(PredictionResult::Nested)
        } else {
            serde_json::from_value(value).map(PredictionResult::Flat)
        }
    }
}

impl PredictionResult {
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    pub fn shape(&self) -> &'static str {
        match self {
            PredictionResult::Flat(_) => "flat",
            PredictionResult::Nested(_) => "nested",
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct FlatResult {
    pub sample_name: Value,
    pub prediction: Value,
    pub log_info: Value,
    #[serde(deserialize_with = "lenient_gene_list")]
    pub gene_expression_data: Vec<GeneExpression>,
    #[serde(deserialize_with = "lenient_object")]
    pub chart_image_url: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct GeneExpression {
    pub gene: Value,
    pub value: Value,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct NestedResult {
    pub success: bool,
    #[serde(default, deserialize_with = "lenient_object")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    prediction: Option<NestedPrediction>,
    #[serde(default, deserialize_with = "lenient_object")]
    visualizations: Option<Visualizations>,
}

/// Borrowed view of a [`NestedResult`] that only exposes the payload on success.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NestedOutcome<'a> {
    Failure {
        message: Option<&'a str>,
    },
    Success {
        prediction: Option<&'a NestedPrediction>,
        visualizations: Option<&'a Visualizations>,
    },
}

impl NestedResult {
    pub fn failure(message: Option<&str>) -> Self {
        NestedResult {
            success: false,
            message: message.map(str::to_string),
            prediction: None,
            visualizations: None,
        }
    }

    pub fn outcome(&self) -> NestedOutcome<'_> {
        if self.success {
            NestedOutcome::Success {
                prediction: self.prediction.as_ref(),
                visualizations: self.visualizations.as_ref(),
            }
        } else {
            NestedOutcome::Failure {
                message: self.message.as_deref(),
            }
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct NestedPrediction {
    pub sample_name: Value,
    pub predicted_class: Value,
    #[serde(deserialize_with = "lenient_f64")]
    pub cancer_probability: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub confidence_score: Option<f64>,
    pub top_genes_expression: Map<String, Value>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Visualizations {
    pub bar_chart_data: Option<Value>,
    pub line_chart_data: Option<Value>,
    #[serde(deserialize_with = "lenient_object")]
    pub expression_summary: Option<ExpressionSummary>,
}

impl Visualizations {
    pub fn has_chart_data(&self) -> bool {
        let present = |data: &Option<Value>| matches!(data, Some(v) if !v.is_null());
        present(&self.bar_chart_data) || present(&self.line_chart_data)
    }
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct ExpressionSummary {
    #[serde(deserialize_with = "lenient_f64")]
    pub mean_expression: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub median_expression: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub std_expression: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub min_expression: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub max_expression: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub total_genes: Option<Number>,
    #[serde(deserialize_with = "lenient_number")]
    pub selected_genes_count: Option<Number>,
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Number(_) => Unexpected::Other("number"),
        Value::Object(_) => Unexpected::Map,
    }
}

// A list of the wrong type is empty; entries that are not objects keep their slot with
// gene and value unset.
fn lenient_gene_list<'de, D>(deserializer: D) -> Result<Vec<GeneExpression>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(entries)) => entries,
        _ => return Ok(Vec::new()),
    };
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            Value::Object(_) => serde_json::from_value(entry).unwrap_or_default(),
            _ => GeneExpression::default(),
        })
        .collect())
}

// Anything that is not a JSON number decodes to None instead of failing the payload.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => Some(n),
        _ => None,
    })
}

// Sections of the wrong JSON type are dropped rather than failing the whole body.
fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?.and_then(|n| n.as_f64()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_key_selects_nested_shape() {
        let result: PredictionResult = serde_json::from_value(json!({
            "success": true,
            "prediction": { "predicted_class": "LUAD", "cancer_probability": 0.92 }
        }))
        .unwrap();

        let PredictionResult::Nested(nested) = result else {
            panic!("expected nested shape");
        };
        let NestedOutcome::Success { prediction, .. } = nested.outcome() else {
            panic!("expected success outcome");
        };
        let prediction = prediction.unwrap();
        assert_eq!(prediction.predicted_class, json!("LUAD"));
        assert_eq!(prediction.cancer_probability, Some(0.92));
        assert_eq!(prediction.confidence_score, None);
    }

    #[test]
    fn missing_success_key_selects_flat_shape() {
        let result = PredictionResult::from_slice(
            br#"{"sample_name":"S1","prediction":"Tumor","gene_expression_data":[{"gene":"TP53","value":2.5}]}"#,
        )
        .unwrap();

        assert_eq!(result.shape(), "flat");
        let PredictionResult::Flat(flat) = result else {
            unreachable!();
        };
        assert_eq!(flat.gene_expression_data.len(), 1);
        assert_eq!(flat.gene_expression_data[0].gene, json!("TP53"));
        assert!(flat.chart_image_url.is_none());
    }

    #[test]
    fn failure_outcome_hides_payload() {
        let result: PredictionResult = serde_json::from_value(json!({
            "success": false,
            "message": "bad input",
            "prediction": { "predicted_class": "LUAD" }
        }))
        .unwrap();

        let PredictionResult::Nested(nested) = result else {
            panic!("expected nested shape");
        };
        assert_eq!(
            nested.outcome(),
            NestedOutcome::Failure {
                message: Some("bad input")
            }
        );
    }

    #[test]
    fn non_numeric_fields_decode_as_absent() {
        let summary: ExpressionSummary = serde_json::from_value(json!({
            "mean_expression": "n/a",
            "median_expression": null,
            "max_expression": 3,
            "total_genes": 20000,
            "selected_genes_count": "fifty"
        }))
        .unwrap();

        assert_eq!(summary.mean_expression, None);
        assert_eq!(summary.median_expression, None);
        assert_eq!(summary.std_expression, None);
        assert_eq!(summary.max_expression, Some(3.0));
        assert_eq!(summary.total_genes, Some(Number::from(20000)));
        assert_eq!(summary.selected_genes_count, None);
    }

    #[test]
    fn top_genes_keep_server_order() {
        let prediction: NestedPrediction = serde_json::from_value(json!({
            "top_genes_expression": { "ZNF1": 1.0, "BRCA1": 2.0, "MYC": 3.0 }
        }))
        .unwrap();

        let genes: Vec<&str> = prediction
            .top_genes_expression
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(genes, ["ZNF1", "BRCA1", "MYC"]);
    }

    #[test]
    fn non_object_body_is_a_decode_error() {
        assert!(PredictionResult::from_slice(b"[1, 2, 3]").is_err());
        assert!(PredictionResult::from_slice(b"[]").is_err());
        assert!(PredictionResult::from_slice(b"null").is_err());
        assert!(PredictionResult::from_slice(br#""ok""#).is_err());
        assert!(PredictionResult::from_slice(b"<html>502</html>").is_err());
        assert!(PredictionResult::from_slice(br#"{"success":"yes"}"#).is_err());
    }

    #[test]
    fn malformed_sections_decode_as_absent() {
        let result = PredictionResult::from_slice(
            br#"{"success":true,"prediction":[1],"visualizations":{"expression_summary":"none"}}"#,
        )
        .unwrap();

        let PredictionResult::Nested(nested) = result else {
            panic!("expected nested shape");
        };
        let NestedOutcome::Success {
            prediction,
            visualizations,
        } = nested.outcome()
        else {
            panic!("expected success outcome");
        };
        assert!(prediction.is_none());
        assert_eq!(visualizations.unwrap().expression_summary, None);
    }

    #[test]
    fn mistyped_flat_fields_decode_as_absent() {
        let result = PredictionResult::from_slice(
            br#"{"sample_name":"S1","gene_expression_data":null,"chart_image_url":42}"#,
        )
        .unwrap();
        let PredictionResult::Flat(flat) = result else {
            panic!("expected flat shape");
        };
        assert_eq!(flat.sample_name, json!("S1"));
        assert!(flat.gene_expression_data.is_empty());
        assert_eq!(flat.chart_image_url, None);

        let flat: FlatResult = serde_json::from_value(json!({
            "gene_expression_data": [7, { "gene": "TP53", "value": 1.5 }, ["A", 2]]
        }))
        .unwrap();
        assert_eq!(
            flat.gene_expression_data,
            [
                GeneExpression::default(),
                GeneExpression {
                    gene: json!("TP53"),
                    value: json!(1.5)
                },
                GeneExpression::default(),
            ]
        );
    }

    #[test]
    fn chart_data_presence_ignores_null() {
        let viz: Visualizations = serde_json::from_value(json!({
            "bar_chart_data": null,
            "line_chart_data": [1, 2]
        }))
        .unwrap();
        assert!(viz.has_chart_data());
        assert!(!Visualizations::default().has_chart_data());
    }

    #[test]
    fn selected_file_takes_name_from_path() {
        let file = SelectedFile::new(Path::new("/data/runs/sample.tsv"));
        assert_eq!(file.file_name, "sample.tsv");
    }
}
