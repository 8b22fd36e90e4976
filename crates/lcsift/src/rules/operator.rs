//! Comparison operators.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A comparison operator from a rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operator {
    /// All operators, in symbol order.
    pub const ALL: [Operator; 6] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Lt,
        Operator::Le,
        Operator::Gt,
        Operator::Ge,
    ];

    /// Apply the operator to `lhs op rhs`.
    ///
    /// Unordered pairs (any NaN operand) never satisfy an operator,
    /// including `!=`.
    pub fn apply<T: PartialOrd + ?Sized>(&self, lhs: &T, rhs: &T) -> bool {
        let Some(ordering) = lhs.partial_cmp(rhs) else {
            return false;
        };
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Ne => ordering != Ordering::Equal,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Le => ordering != Ordering::Greater,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Ge => ordering != Ordering::Less,
        }
    }

    /// The canonical symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
        }
    }
}

impl FromStr for Operator {
    type Err = ConfigError;

    /// Accepts symbols (`>=`), names (`ge`) and the `operator.ge` spelling
    /// used by older rule tables.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let name = trimmed.strip_prefix("operator.").unwrap_or(trimmed);
        match name {
            "==" | "eq" => Ok(Operator::Eq),
            "!=" | "ne" => Ok(Operator::Ne),
            "<" | "lt" => Ok(Operator::Lt),
            "<=" | "le" => Ok(Operator::Le),
            ">" | "gt" => Ok(Operator::Gt),
            ">=" | "ge" => Ok(Operator::Ge),
            _ => Err(ConfigError::UnknownOperator(s.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
