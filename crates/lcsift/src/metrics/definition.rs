//! Metric definitions: one row of an info table per output column.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ConfigError, LcSiftError, Result};
use crate::rules::{literal, ResolvedRule, Rule};

/// How a metric is evaluated against one light curve.
///
/// Points are sub-selected with `colsel opa thresha` (and, when given,
/// `colsel opb threshb`), then the selected `col` values are counted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    /// Output column name.
    pub name: String,
    /// Column whose selected values are counted.
    pub col: String,
    /// Column used for sub-selection.
    pub colsel: String,
    /// Type of the sub-selection thresholds.
    pub typesel: String,
    #[serde(deserialize_with = "literal")]
    pub thresha: String,
    pub opa: String,
    #[serde(default, deserialize_with = "optional_literal")]
    pub threshb: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub opb: Option<String>,
}

impl MetricDefinition {
    /// A definition with a single selection bound.
    pub fn new(
        name: impl Into<String>,
        col: impl Into<String>,
        colsel: impl Into<String>,
        typesel: impl Into<String>,
        opa: impl Into<String>,
        thresha: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            col: col.into(),
            colsel: colsel.into(),
            typesel: typesel.into(),
            thresha: thresha.into(),
            opa: opa.into(),
            threshb: None,
            opb: None,
        }
    }

    /// Add the second bound, e.g. the upper edge of a half-open interval.
    pub fn with_second_bound(mut self, opb: impl Into<String>, threshb: impl Into<String>) -> Self {
        self.opb = Some(opb.into());
        self.threshb = Some(threshb.into());
        self
    }

    /// Distinct-value metrics count unique nights or bands rather than points.
    pub fn counts_unique(&self) -> bool {
        self.name.contains("epochs") || self.name.contains("bands")
    }

    /// The selection rules of this definition, resolved.
    pub fn selection(&self) -> std::result::Result<Vec<ResolvedRule>, ConfigError> {
        let malformed = |message: &str| ConfigError::MetricDefinition {
            name: self.name.clone(),
            message: message.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(malformed("empty name"));
        }
        if self.col.trim().is_empty() || self.colsel.trim().is_empty() {
            return Err(malformed("empty source or selection column"));
        }

        let mut rules = vec![
            Rule::new(&self.colsel, &self.opa, &self.thresha, &self.typesel).resolve()?,
        ];
        match (&self.opb, &self.threshb) {
            (Some(op), Some(thresh)) => {
                rules.push(Rule::new(&self.colsel, op, thresh, &self.typesel).resolve()?);
            }
            (None, None) => {}
            _ => return Err(malformed("opb and threshb must be given together")),
        }
        Ok(rules)
    }
}

/// An ordered list of metric definitions with unique names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricDefinitions {
    pub definitions: Vec<MetricDefinition>,
}

impl MetricDefinitions {
    pub fn new(definitions: Vec<MetricDefinition>) -> Self {
        Self { definitions }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetricDefinition> {
        self.definitions.iter()
    }

    /// Output column names, in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(|d| d.name.as_str())
    }

    /// Resolve every definition, checking names are unique.
    pub fn resolve(&self) -> Result<Vec<(&MetricDefinition, Vec<ResolvedRule>)>> {
        let mut seen = HashSet::new();
        self.definitions
            .iter()
            .map(|def| {
                if !seen.insert(def.name.as_str()) {
                    return Err(ConfigError::MetricDefinition {
                        name: def.name.clone(),
                        message: "duplicate metric name".to_string(),
                    }
                    .into());
                }
                Ok((def, def.selection()?))
            })
            .collect()
    }

    /// Load an info table from CSV.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| LcSiftError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_csv_reader(file)
    }

    /// Load an info table from any CSV reader.
    pub fn from_csv_reader(reader: impl std::io::Read) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let definitions = reader
            .deserialize::<DefinitionRow>()
            .map(|row| row.map(MetricDefinition::from))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { definitions })
    }
}

impl<'a> IntoIterator for &'a MetricDefinitions {
    type Item = &'a MetricDefinition;
    type IntoIter = std::slice::Iter<'a, MetricDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.definitions.iter()
    }
}

/// An info table row read verbatim, so thresholds keep their spelling.
#[derive(Deserialize)]
struct DefinitionRow {
    name: String,
    col: String,
    colsel: String,
    typesel: String,
    thresha: String,
    opa: String,
    #[serde(default)]
    threshb: Option<String>,
    #[serde(default)]
    opb: Option<String>,
}

impl From<DefinitionRow> for MetricDefinition {
    fn from(row: DefinitionRow) -> Self {
        let present = |cell: Option<String>| cell.filter(|s| !s.trim().is_empty());
        Self {
            name: row.name,
            col: row.col,
            colsel: row.colsel,
            typesel: row.typesel,
            thresha: row.thresha,
            opa: row.opa,
            threshb: present(row.threshb),
            opb: present(row.opb),
        }
    }
}

/// Optional threshold literal; empty cells read as absent.
fn optional_literal<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "literal")] String);

    let value = Option::<Wrapped>::deserialize(deserializer)?;
    Ok(value.map(|w| w.0).filter(|s| !s.trim().is_empty()))
}

fn optional_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_unique_by_name() {
        let epochs = MetricDefinition::new("n_epochs_bef", "night", "phase", "float", "<=", "0");
        let points = MetricDefinition::new("n_bef", "night", "phase", "float", "<=", "0");
        let bands = MetricDefinition::new("n_bands", "band", "phase", "float", ">=", "-10");
        assert!(epochs.counts_unique());
        assert!(!points.counts_unique());
        assert!(bands.counts_unique());
    }

    #[test]
    fn test_selection_with_two_bounds() {
        let def = MetricDefinition::new("n_epochs_m10_p30", "night", "phase", "float", ">=", "-10")
            .with_second_bound("<=", "30");
        let rules = def.selection().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].column, "phase");
    }

    #[test]
    fn test_half_specified_second_bound_is_malformed() {
        let mut def = MetricDefinition::new("n_bef", "night", "phase", "float", "<", "0");
        def.opb = Some("<".into());
        assert!(matches!(
            def.selection(),
            Err(ConfigError::MetricDefinition { .. })
        ));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let def = MetricDefinition::new("n_bef", "night", "phase", "float", "<", "0");
        let defs = MetricDefinitions::new(vec![def.clone(), def]);
        assert!(defs.resolve().is_err());
    }

    #[test]
    fn test_info_table_from_csv() {
        let csv = "name,col,colsel,typesel,thresha,opa,threshb,opb\n\
                   n_epochs_bef,night,phase,float,-100,>=,0,<\n\
                   n_phmin,night,phase,float,-10,<=,,\n";
        let defs = MetricDefinitions::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs.definitions[0].threshb.as_deref(), Some("0"));
        assert_eq!(defs.definitions[1].threshb, None);
        assert_eq!(defs.definitions[1].opb, None);
        assert_eq!(defs.names().collect::<Vec<_>>(), vec!["n_epochs_bef", "n_phmin"]);
    }

    #[test]
    fn test_info_table_thresholds_keep_spelling() {
        let csv = "name,col,colsel,typesel,thresha,opa,threshb,opb\n\
                   n_filt,night,band,str,007,==,1.50,!=\n";
        let defs = MetricDefinitions::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(defs.definitions[0].thresha, "007");
        assert_eq!(defs.definitions[0].threshb.as_deref(), Some("1.50"));
    }

    #[test]
    fn test_json_definition_accepts_numeric_thresholds() {
        let json = r#"{"name": "n_bef", "col": "night", "colsel": "phase",
                       "typesel": "float", "thresha": 0, "opa": "<"}"#;
        let def: MetricDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.thresha, "0");
        assert_eq!(def.threshb, None);
    }
}
