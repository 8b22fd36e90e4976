//! Rule engine: table-driven row selection.
//!
//! Rules are plain data, `(column, operator, threshold, type)` rows read from
//! configuration. Each rule is resolved once into a closed [`Operator`] and a
//! typed threshold, then evaluated into a boolean mask.
//!
//! ```
//! use lcsift::rules::{Rule, RuleSet};
//! use lcsift::table::{Column, Table};
//!
//! let catalog = Table::from_columns([("z", Column::from(vec![0.02, 0.2]))]).unwrap();
//! let rules = RuleSet::new(vec![Rule::new("z", "<", "0.1", "float")]);
//! assert_eq!(rules.evaluate(&catalog).unwrap(), vec![true, false]);
//! ```

mod operator;
mod rule;

pub use operator::Operator;
pub use rule::{count_where, evaluate, evaluate_conjunction, ResolvedRule, Rule, RuleSet};

pub(crate) use rule::literal;
