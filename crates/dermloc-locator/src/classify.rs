//! Tag heuristics for specialty relevance and ownership.
//!
//! These are fuzzy matches over free-text metadata and are allowed to be
//! wrong. They are deterministic: identical tags always give identical output.
//! Ownership is an ordered rule list evaluated top to bottom, first match wins.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use dermloc_core::Ownership;
use regex::Regex;

type Tags = BTreeMap<String, String>;

static NAME_ROOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)dermato|dermatolog").expect("valid regex"));

static SPECIALTY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)dermatology|dermatologia|skin|pele").expect("valid regex"));

static DEPARTMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)dermatolog(y|ia)").expect("valid regex"));

static DERM_OR_SKIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)dermato|dermatolog|skin|pele").expect("valid regex"));

/// Name-only dermatology match used when structured specialty tags are absent.
static NAME_FALLBACK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)dermato|dermatolog|pele|skin").expect("valid regex"));

const SPECIALTY_KEYS: [&str; 3] = [
    "healthcare:speciality",
    "healthcare:specialty",
    "medical_specialty",
];

/// Tags consulted by [`has_dermatology_specialty`], name last.
const SPECIALTY_FAMILY_KEYS: [&str; 7] = [
    "healthcare:speciality",
    "healthcare:specialty",
    "medical_specialty",
    "department",
    "speciality",
    "specialty",
    "name",
];

struct OwnershipRule {
    tag: &'static str,
    pattern: Regex,
    verdict: Ownership,
}

static OWNERSHIP_RULES: LazyLock<Vec<OwnershipRule>> = LazyLock::new(|| {
    let rule = |tag: &'static str, pattern: &str, verdict: Ownership| OwnershipRule {
        tag,
        pattern: Regex::new(&format!("(?i){pattern}")).expect("valid regex"),
        verdict,
    };
    vec![
        rule(
            "operator:type",
            r"^(public|government|municipal|state|federal)$",
            Ownership::Public,
        ),
        rule("operator:type", r"^private$", Ownership::Private),
        rule(
            "ownership",
            r"\b(public|government|municipal|state|federal)\b",
            Ownership::Public,
        ),
        rule("ownership", r"private", Ownership::Private),
        rule(
            "operator",
            r"prefeitura|municipal|estadual|federal|secretaria|sus|ubs|posto de sa[úu]de|hospital universit[aá]rio",
            Ownership::Public,
        ),
        rule(
            "operator",
            r"santa casa|miseric[óo]rdia|irmandade|filant|benefic|unimed|hapvida|amil|bradesco|prevent senior",
            Ownership::Private,
        ),
    ]
});

fn tag<'a>(tags: &'a Tags, key: &str) -> Option<&'a str> {
    tags.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Additive specialty relevance; ties are broken by distance downstream.
#[must_use]
pub fn specialty_score(tags: &Tags) -> u32 {
    let mut score = 0;

    if tag(tags, "name").is_some_and(|name| NAME_ROOT_RE.is_match(name)) {
        score += 3;
    }
    if SPECIALTY_KEYS
        .iter()
        .filter_map(|key| tag(tags, key))
        .any(|value| SPECIALTY_RE.is_match(value))
    {
        score += 4;
    }
    if tag(tags, "department").is_some_and(|dept| DEPARTMENT_RE.is_match(dept)) {
        score += 2;
    }
    if tag(tags, "healthcare").is_some_and(|role| role.eq_ignore_ascii_case("doctor")) {
        score += 1;
    }

    score
}

/// True if any specialty-family tag or the name matches dermatology or skin.
#[must_use]
pub fn has_dermatology_specialty(tags: &Tags) -> bool {
    SPECIALTY_FAMILY_KEYS
        .iter()
        .filter_map(|key| tag(tags, key))
        .any(|value| DERM_OR_SKIN_RE.is_match(value))
}

/// True if the record carries any structured specialty tag at all.
#[must_use]
pub fn has_specialty_tags(tags: &Tags) -> bool {
    SPECIALTY_FAMILY_KEYS
        .iter()
        .filter(|key| **key != "name")
        .any(|key| tag(tags, key).is_some())
}

/// Name-only dermatology match.
#[must_use]
pub fn name_suggests_dermatology(tags: &Tags) -> bool {
    tag(tags, "name").is_some_and(|name| NAME_FALLBACK_RE.is_match(name))
}

/// Best-effort ownership from operator metadata.
#[must_use]
pub fn infer_ownership(tags: &Tags) -> Ownership {
    OWNERSHIP_RULES
        .iter()
        .find(|rule| tag(tags, rule.tag).is_some_and(|value| rule.pattern.is_match(value)))
        .map_or(Ownership::Unknown, |rule| rule.verdict)
}
