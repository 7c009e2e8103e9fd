use crate::policy::{Error, PolicyContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

const ALTERNATIVE_SEPARATOR: char = '|';

/// A requirement as written in the client registry.
///
/// Either a field map such as `{"group": "admins"}`, or a formula string such as
/// `"group=admins"` or `"group=admins|group=staff"`. Any other shape is kept as written and
/// rejected when the client's policy is parsed, so it does not spoil the rest of the registry.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ClauseSpec {
    Formula(String),
    Fields(BTreeMap<String, String>),
    Raw(Value),
}

impl ClauseSpec {
    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        ClauseSpec::Formula(format!("{}={}", key.into(), value.into()))
    }

    /// Flattens a disjunction of equality tests into the `k1=v1|k2=v2` form.
    pub fn any_of<I, K, V>(conditions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: fmt::Display,
        V: fmt::Display,
    {
        let formula = conditions
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(&ALTERNATIVE_SEPARATOR.to_string());

        ClauseSpec::Formula(formula)
    }
}

impl fmt::Display for ClauseSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequireClause {
    Group(String),
    AnyOf(Vec<RequireClause>),
}

type Constructor = fn(&BTreeMap<String, String>) -> Option<RequireClause>;

/// Clause kinds, keyed by the exact set of fields they accept.
const CLAUSE_CONSTRUCTORS: &[(&[&str], Constructor)] = &[(&["group"], group_clause)];

fn group_clause(fields: &BTreeMap<String, String>) -> Option<RequireClause> {
    fields.get("group").cloned().map(RequireClause::Group)
}

impl RequireClause {
    pub fn from_spec(spec: &ClauseSpec) -> Result<Self, Error> {
        match spec {
            ClauseSpec::Fields(fields) => Self::from_fields(fields)
                .ok_or_else(|| Error::UnknownClause(spec.to_string())),
            ClauseSpec::Formula(formula) => Self::from_formula(formula),
            ClauseSpec::Raw(_) => Err(Error::UnknownClause(spec.to_string())),
        }
    }

    fn from_fields(fields: &BTreeMap<String, String>) -> Option<Self> {
        CLAUSE_CONSTRUCTORS
            .iter()
            .find(|(keys, _)| {
                keys.len() == fields.len() && keys.iter().all(|key| fields.contains_key(*key))
            })
            .and_then(|(_, construct)| construct(fields))
    }

    fn from_formula(formula: &str) -> Result<Self, Error> {
        let mut alternatives = formula
            .split(ALTERNATIVE_SEPARATOR)
            .map(|alternative| {
                let Some((key, value)) = alternative.split_once('=') else {
                    return Err(Error::MalformedPolicy(format!(
                        "expected key=value in '{formula}', got '{alternative}'"
                    )));
                };
                if key.is_empty() {
                    return Err(Error::MalformedPolicy(format!(
                        "empty key in '{formula}'"
                    )));
                }

                let fields = BTreeMap::from([(key.to_string(), value.to_string())]);
                Self::from_fields(&fields)
                    .ok_or_else(|| Error::UnknownClause(format!("\"{alternative}\"")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if alternatives.len() == 1 {
            Ok(alternatives.remove(0))
        } else {
            Ok(RequireClause::AnyOf(alternatives))
        }
    }

    pub fn holds(&self, context: &PolicyContext) -> bool {
        match self {
            RequireClause::Group(group) => context.groups.contains(group),
            RequireClause::AnyOf(clauses) => clauses.iter().any(|clause| clause.holds(context)),
        }
    }
}

impl fmt::Display for RequireClause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RequireClause::Group(group) => write!(f, "group={group}"),
            RequireClause::AnyOf(clauses) => {
                for (index, clause) in clauses.iter().enumerate() {
                    if index > 0 {
                        write!(f, "{ALTERNATIVE_SEPARATOR}")?;
                    }
                    write!(f, "{clause}")?;
                }
                Ok(())
            }
        }
    }
}
