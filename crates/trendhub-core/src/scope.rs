//! Accounting scope, the face-value / adjusted partition of loan figures.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// One of the two accounting views a report distinguishes.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
pub enum Scope {
  /// Face value, as booked ("纯账面").
  #[default]
  #[serde(rename = "PHY")]
  #[strum(serialize = "PHY")]
  Phy,
  /// Adjusted for write-offs and reinstated transfers ("还原剔转").
  #[serde(rename = "ADJ")]
  #[strum(serialize = "ADJ")]
  Adj,
}

/// Revision of [`SCOPE_ALIASES`]; bump when the table changes.
pub const SCOPE_ALIAS_VERSION: u32 = 1;

/// Label spellings seen in report headers and request parameters, in the
/// folded form produced by [`fold_label`].
pub const SCOPE_ALIASES: &[(&str, Scope)] = &[
  ("PHY", Scope::Phy),
  ("实体贷款", Scope::Phy),
  ("实体贷款(纯账面)", Scope::Phy),
  ("纯账面", Scope::Phy),
  ("FACE", Scope::Phy),
  ("FACEVALUE", Scope::Phy),
  ("ADJ", Scope::Adj),
  ("实体贷款(还原剔转)", Scope::Adj),
  ("还原剔转", Scope::Adj),
  ("还原", Scope::Adj),
  ("ADJUSTED", Scope::Adj),
];

impl Scope {
  /// The storage / wire code (`PHY` or `ADJ`).
  pub fn code(self) -> &'static str { self.into() }

  /// Human-readable label used by report consumers.
  pub fn display_name(self) -> &'static str {
    match self {
      Self::Phy => "实体贷款（纯账面）",
      Self::Adj => "实体贷款（还原剔转）",
    }
  }

  /// Strict decode of a stored code. Unlike [`normalize`], unknown input is
  /// an error.
  pub fn from_code(code: &str) -> Result<Self> {
    code.parse().map_err(|_| Error::UnknownScope(code.to_owned()))
  }
}

/// Strip all whitespace, fold full-width parentheses, upper-case.
fn fold_label(text: &str) -> String {
  text
    .chars()
    .filter(|c| !c.is_whitespace())
    .map(|c| match c {
      '（' => '(',
      '）' => ')',
      other => other,
    })
    .collect::<String>()
    .to_uppercase()
}

/// Map a free-text scope label onto [`Scope`].
///
/// Unrecognised or empty labels fall back to [`Scope::Phy`]: reports omit the
/// label for the default partition.
pub fn normalize(text: &str) -> Scope {
  let folded = fold_label(text);
  SCOPE_ALIASES
    .iter()
    .find(|(alias, _)| *alias == folded)
    .map(|&(_, scope)| scope)
    .unwrap_or_default()
}
