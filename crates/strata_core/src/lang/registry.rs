//! Shareable metadata for `strata_core::lang` registries.
//!
//! Every kind vocabulary in [`crate::lang`] is a `const` table of info records keyed by a stable id enum. This
//! submodule holds the small, dependency-free metadata types those tables share.
//!
//! ## Notes
//! - These types are `Copy` so registries can live in `const` tables.
//! - Tables are ordered by id discriminant; `info_for` lookups index directly and the guardrail tests in
//!   `crates/strata_core/tests` keep the ordering honest.

/// Format version a vocabulary item is available since, as `(major, minor)`.
///
/// ## Examples
/// ```rust
/// use strata_core::lang::registry::Since;
///
/// assert_eq!(Since(0, 1).to_string(), "0.1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Since(pub u16, pub u16);

impl std::fmt::Display for Since {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.0, self.1)
    }
}

/// Describe the lifecycle status of a vocabulary item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stability {
    Stable,
    Draft,
    Deprecated,
}

/// Shared metadata shape for registry items.
///
/// - stable identity (`id`)
/// - accepted spellings (`canonical` + `aliases`)
/// - documentation (`description`)
/// - provenance (`since`, `stability`)
///
/// Registries that need extra per-item data wrap this struct or define their own info type.
#[derive(Debug, Clone, Copy)]
pub struct LangItemInfo<Id> {
    pub id: Id,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub since: Since,
    pub stability: Stability,
}

/// Resolve `s` against a table of [`LangItemInfo`] entries, canonical spellings first.
pub(crate) fn lookup<Id: Copy>(table: &[LangItemInfo<Id>], s: &str) -> Option<Id> {
    if let Some(item) = table.iter().find(|item| item.canonical == s) {
        return Some(item.id);
    }
    table
        .iter()
        .find(|item| {
            let aliases: &[&str] = item.aliases;
            aliases.contains(&s)
        })
        .map(|item| item.id)
}

/// Build a stable [`LangItemInfo`] entry available since format 0.1.
pub(crate) const fn item<Id>(
    id: Id,
    canonical: &'static str,
    aliases: &'static [&'static str],
    description: &'static str,
) -> LangItemInfo<Id> {
    LangItemInfo {
        id,
        canonical,
        aliases,
        description,
        since: Since(0, 1),
        stability: Stability::Stable,
    }
}
