//! Tequila-style `require` clauses attached to relying-party clients.
//!
//! A [`PolicyFormula`] is a conjunction: every clause must hold for access to be granted. Each
//! clause is either a single test (today: membership in a named group) or a disjunction of
//! tests written as `group=a|group=b`.

use std::collections::HashSet;
use std::fmt;
use tracing::debug;

mod clause;
mod error;

pub use clause::{ClauseSpec, RequireClause};
pub use error::Error;

/// What is known about the user when a formula is evaluated.
#[derive(Clone, Debug, Default)]
pub struct PolicyContext {
    pub groups: HashSet<String>,
}

impl PolicyContext {
    pub fn with_groups<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PolicyFormula {
    clauses: Vec<RequireClause>,
}

impl PolicyFormula {
    pub fn parse(specs: &[ClauseSpec]) -> Result<Self, Error> {
        let clauses = specs
            .iter()
            .map(RequireClause::from_spec)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { clauses })
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[RequireClause] {
        &self.clauses
    }

    /// Stops at the first clause that does not hold. An empty formula always holds.
    pub fn evaluate(&self, context: &PolicyContext) -> bool {
        for clause in &self.clauses {
            if !clause.holds(context) {
                debug!("Failed clause: {clause}");
                return false;
            }
        }
        true
    }
}

impl fmt::Display for PolicyFormula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let clauses = self
            .clauses
            .iter()
            .map(|clause| format!("({clause})"))
            .collect::<Vec<_>>();
        write!(f, "{}", clauses.join(" & "))
    }
}
