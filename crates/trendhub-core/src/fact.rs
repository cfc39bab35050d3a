//! Fact records: the atomic unit of the trend store.
//!
//! A fact is one observation: on business date `date`, under accounting
//! `scope`, branch `branch` reported `value` for `metric`. The tuple
//! `(date, scope, branch, metric)` is a natural key; re-ingesting the same key
//! overwrites the value and provenance.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Scope;

/// One normalised observation extracted from a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
  pub date:        NaiveDate,
  pub scope:       Scope,
  pub branch:      String,
  pub metric:      String,
  /// `None` when the report printed the slot but carried no number.
  pub value:       Option<f64>,
  /// Name of the file the fact was last ingested from.
  pub source_file: String,
}

/// The natural key of a [`Fact`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FactKey {
  pub date:   NaiveDate,
  pub scope:  Scope,
  pub branch: String,
  pub metric: String,
}

impl Fact {
  pub fn key(&self) -> FactKey {
    FactKey {
      date:   self.date,
      scope:  self.scope,
      branch: self.branch.clone(),
      metric: self.metric.clone(),
    }
  }
}

/// Collapse records sharing a natural key, keeping the last one written.
///
/// The surviving records stay in order of each key's first appearance, so
/// the output is deterministic regardless of hashing.
pub fn dedup_last_write_wins(facts: Vec<Fact>) -> Vec<Fact> {
  let mut slot_by_key: HashMap<FactKey, usize> = HashMap::with_capacity(facts.len());
  let mut out: Vec<Fact> = Vec::with_capacity(facts.len());

  for fact in facts {
    match slot_by_key.get(&fact.key()) {
      Some(&slot) => out[slot] = fact,
      None => {
        slot_by_key.insert(fact.key(), out.len());
        out.push(fact);
      }
    }
  }
  out
}
