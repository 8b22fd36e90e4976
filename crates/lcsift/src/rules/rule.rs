//! Rules, rule sets and their evaluation against tables.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ConfigError, LcSiftError, Result};
use crate::table::{Column, Table, Value, ValueType};

use super::operator::Operator;

/// One row of a rule table: `column operator threshold`, with the threshold
/// given as a literal of `value_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Column the rule is evaluated on.
    #[serde(alias = "name")]
    pub column: String,
    /// Operator symbol or name.
    pub op: String,
    /// Threshold literal.
    #[serde(alias = "thresh", alias = "lim", deserialize_with = "literal")]
    pub threshold: String,
    /// Declared type of the threshold.
    #[serde(rename = "type")]
    pub value_type: String,
}

impl Rule {
    pub fn new(
        column: impl Into<String>,
        op: impl Into<String>,
        threshold: impl Into<String>,
        value_type: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            op: op.into(),
            threshold: threshold.into(),
            value_type: value_type.into(),
        }
    }

    /// Parse the operator and coerce the threshold.
    pub fn resolve(&self) -> std::result::Result<ResolvedRule, ConfigError> {
        let op: Operator = self.op.parse()?;
        let value_type: ValueType = self.value_type.parse()?;
        let threshold = value_type.coerce(&self.threshold)?;
        Ok(ResolvedRule {
            column: self.column.clone(),
            op,
            threshold,
        })
    }
}

/// A rule with its operator and threshold resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRule {
    pub column: String,
    pub op: Operator,
    pub threshold: Value,
}

impl ResolvedRule {
    pub fn new(column: impl Into<String>, op: Operator, threshold: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op,
            threshold: threshold.into(),
        }
    }

    /// Evaluate against every row of `table`.
    ///
    /// Int and float are one numeric family: an int column compares with a
    /// float threshold (and the reverse) after widening to f64. A threshold
    /// of any other type than the column's is `ConfigError::TypeMismatch`.
    pub fn evaluate(&self, table: &Table) -> Result<Vec<bool>> {
        let column = table.column(&self.column)?;
        compare(&self.column, column, self.op, &self.threshold)
    }
}

/// Compare every cell of a column with a threshold.
///
/// Numeric columns accept numeric thresholds of either type; any other
/// pairing of types is a configuration error.
fn compare(name: &str, column: &Column, op: Operator, threshold: &Value) -> Result<Vec<bool>> {
    let mask = match (column, threshold) {
        (Column::Int(values), Value::Int(t)) => values.iter().map(|v| op.apply(v, t)).collect(),
        (Column::Int(values), Value::Float(t)) => values
            .iter()
            .map(|v| op.apply(&(*v as f64), t))
            .collect(),
        (Column::Float(values), Value::Float(t)) => {
            values.iter().map(|v| op.apply(v, t)).collect()
        }
        (Column::Float(values), Value::Int(t)) => {
            let t = *t as f64;
            values.iter().map(|v| op.apply(v, &t)).collect()
        }
        (Column::Str(values), Value::Str(t)) => values
            .iter()
            .map(|v| op.apply(v.as_str(), t.as_str()))
            .collect(),
        (Column::Bool(values), Value::Bool(t)) => values.iter().map(|v| op.apply(v, t)).collect(),
        _ => {
            return Err(ConfigError::TypeMismatch {
                column: name.to_string(),
                column_type: column.value_type().to_string(),
                threshold_type: threshold.value_type().to_string(),
            }
            .into());
        }
    };
    Ok(mask)
}

/// Evaluate a single rule given as loose configuration strings.
///
/// Numeric thresholds match int and float columns alike; see
/// [`ResolvedRule::evaluate`].
pub fn evaluate(
    table: &Table,
    column: &str,
    op: &str,
    threshold: &str,
    value_type: &str,
) -> Result<Vec<bool>> {
    Rule::new(column, op, threshold, value_type)
        .resolve()?
        .evaluate(table)
}

/// AND of every rule. An empty rule list selects every row.
///
/// Every rule is evaluated, so a configuration error in a later rule is
/// reported even when earlier rules already reject every row.
pub fn evaluate_conjunction(table: &Table, rules: &[ResolvedRule]) -> Result<Vec<bool>> {
    let mut mask = vec![true; table.row_count()];
    for rule in rules {
        let rule_mask = rule.evaluate(table)?;
        for (acc, hit) in mask.iter_mut().zip(rule_mask) {
            *acc &= hit;
        }
    }
    Ok(mask)
}

/// Number of `column` values selected by `mask`, or the number of distinct
/// selected values when `unique` is set.
pub fn count_where(table: &Table, column: &str, mask: &[bool], unique: bool) -> Result<usize> {
    let column = table.column(column)?;
    Ok(if unique {
        column.unique_selected(mask)
    } else {
        column.count_selected(mask)
    })
}

/// An ordered list of rules, always combined by AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Append a rule.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve every rule, failing on the first bad one.
    pub fn resolve(&self) -> Result<Vec<ResolvedRule>> {
        self.rules
            .iter()
            .map(|r| r.resolve().map_err(LcSiftError::from))
            .collect()
    }

    /// Conjunction mask over `table`.
    pub fn evaluate(&self, table: &Table) -> Result<Vec<bool>> {
        evaluate_conjunction(table, &self.resolve()?)
    }

    /// Load a rule table from CSV (`name,op,thresh,type` or
    /// `column,op,threshold,type` headers).
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| LcSiftError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_csv_reader(file)
    }

    /// Load a rule table from any CSV reader.
    pub fn from_csv_reader(reader: impl std::io::Read) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let rules = reader
            .deserialize::<RuleRow>()
            .map(|row| row.map(Rule::from))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }
}

/// A rule table row with every cell kept verbatim, so a `str` threshold
/// such as `007` is not read back as a number.
#[derive(Deserialize)]
struct RuleRow {
    #[serde(alias = "name")]
    column: String,
    op: String,
    #[serde(alias = "thresh", alias = "lim")]
    threshold: String,
    #[serde(rename = "type")]
    value_type: String,
}

impl From<RuleRow> for Rule {
    fn from(row: RuleRow) -> Self {
        Rule::new(row.column, row.op, row.threshold, row.value_type)
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Accept thresholds written as strings, numbers or booleans.
///
/// Self-describing formats only; CSV cells go through [`RuleRow`].
pub(crate) fn literal<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Literal {
        Str(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Literal::deserialize(deserializer)? {
        Literal::Str(s) => s,
        Literal::Int(v) => v.to_string(),
        Literal::Float(v) => v.to_string(),
        Literal::Bool(v) => v.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Table {
        Table::from_columns([
            ("z", Column::from(vec![0.015, 0.025, 0.12, f64::NAN])),
            ("sel", Column::from(vec![1_i64, 0, 1, 1])),
            ("band", Column::from(vec!["ztfg", "ztfr", "ztfi", "ztfg"])),
            ("ok", Column::from(vec![true, true, false, true])),
        ])
        .unwrap()
    }

    #[test]
    fn test_evaluate_float_rule() {
        let mask = evaluate(&catalog(), "z", "<", "0.1", "float").unwrap();
        assert_eq!(mask, vec![true, true, false, false]);
    }

    #[test]
    fn test_int_column_with_float_threshold() {
        let mask = evaluate(&catalog(), "sel", ">=", "0.5", "float").unwrap();
        assert_eq!(mask, vec![true, false, true, true]);

        let mask = evaluate(&catalog(), "z", "<", "1", "int").unwrap();
        assert_eq!(mask, vec![true, true, true, false]);
    }

    #[test]
    fn test_string_and_bool_rules() {
        let table = catalog();
        assert_eq!(
            evaluate(&table, "band", "!=", "ztfg", "str").unwrap(),
            vec![false, true, true, false]
        );
        assert_eq!(
            evaluate(&table, "ok", "==", "false", "bool").unwrap(),
            vec![false, false, true, false]
        );
    }

    #[test]
    fn test_type_mismatch_is_surfaced() {
        let err = evaluate(&catalog(), "band", "==", "1", "int").unwrap_err();
        assert!(matches!(
            err,
            LcSiftError::Config(ConfigError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_unknown_operator_is_config_error() {
        let err = evaluate(&catalog(), "z", "~=", "0.1", "float").unwrap_err();
        assert!(matches!(
            err,
            LcSiftError::Config(ConfigError::UnknownOperator(_))
        ));
    }

    #[test]
    fn test_conjunction_matches_each_rule() {
        let table = catalog();
        let rules = RuleSet::new(vec![
            Rule::new("sel", "==", "1", "int"),
            Rule::new("z", ">=", "0.01", "float"),
            Rule::new("z", "<", "0.1", "float"),
        ]);
        assert_eq!(rules.evaluate(&table).unwrap(), vec![true, false, false, false]);
        assert_eq!(
            RuleSet::default().evaluate(&table).unwrap(),
            vec![true; 4]
        );
    }

    #[test]
    fn test_conjunction_reports_late_errors() {
        let rules = RuleSet::new(vec![
            Rule::new("z", ">", "10", "float"),
            Rule::new("missing", "==", "1", "int"),
        ]);
        assert!(matches!(
            rules.evaluate(&catalog()),
            Err(LcSiftError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_count_where() {
        let table = catalog();
        let mask = vec![true, true, false, true];
        assert_eq!(count_where(&table, "band", &mask, false).unwrap(), 3);
        assert_eq!(count_where(&table, "band", &mask, true).unwrap(), 2);
    }

    #[test]
    fn test_rule_table_from_csv() {
        let csv = "name,op,thresh,type\nsel,==,1,int\nchi2,<=,2.,float\n";
        let rules = RuleSet::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.rules[1].column, "chi2");
        assert_eq!(rules.rules[1].op, "<=");
        assert_eq!(
            rules.resolve().unwrap()[1].threshold,
            Value::Float(2.0)
        );
    }

    #[test]
    fn test_csv_str_thresholds_are_not_renumbered() {
        let csv = "name,op,thresh,type\nfield,==,007,str\nid,==,1.50,str\n";
        let rules = RuleSet::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(rules.rules[0].threshold, "007");
        assert_eq!(rules.rules[1].threshold, "1.50");

        let table = Table::from_columns([
            ("field", Column::from(vec!["007", "7"])),
            ("id", Column::from(vec!["1.50", "1.5"])),
        ])
        .unwrap();
        assert_eq!(rules.evaluate(&table).unwrap(), vec![true, false]);
    }

    #[test]
    fn test_rule_table_from_json_numbers() {
        let json = r#"[{"column": "z", "op": ">=", "threshold": 0.01, "type": "float"}]"#;
        let rules: RuleSet = serde_json::from_str(json).unwrap();
        assert_eq!(rules.rules[0].threshold, "0.01");
    }
}
