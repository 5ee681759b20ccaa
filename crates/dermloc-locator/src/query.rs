//! Tag query construction for the geodata service.
//!
//! Each selector is emitted once per entity kind (node, way, relation) and the
//! whole union is wrapped in a JSON output header with `out center`, so area
//! and relation entities come back with a representative centre point.

use std::fmt;

use dermloc_core::{Category, Coordinate};

const ENTITY_KINDS: [&str; 3] = ["node", "way", "relation"];
const SERVER_TIMEOUT_SECS: u32 = 40;

const HOSPITAL: &str = "[amenity=hospital]";
const CLINIC_AMENITY: &str = "[amenity=clinic]";
const CLINIC_HEALTHCARE: &str = "[healthcare=clinic]";
const DOCTOR_SPECIALITY: &str = r#"[healthcare=doctor]["healthcare:speciality"~"dermatology",i]"#;
const DOCTOR_SPECIALTY: &str = r#"[healthcare=doctor]["healthcare:specialty"~"dermatology",i]"#;
const MEDICAL_SPECIALTY: &str = r#"["medical_specialty"~"dermatology",i]"#;
const DEPARTMENT: &str = "[department=dermatology]";
const NAME_FALLBACK: &str = r#"["name"~"Dermatolog|Dermato|Pele",i]"#;

/// A ready-to-send query body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryText(String);

impl QueryText {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Selectors targeted by each category, in emission order.
fn selectors(category: Category) -> &'static [&'static str] {
    match category {
        Category::Hospital => &[HOSPITAL],
        Category::Clinic => &[CLINIC_AMENITY, CLINIC_HEALTHCARE],
        Category::Dermatology => &[
            DOCTOR_SPECIALITY,
            DOCTOR_SPECIALTY,
            MEDICAL_SPECIALTY,
            DEPARTMENT,
            NAME_FALLBACK,
        ],
        // Broader net: the dermatology sub-match here skips the department
        // and name selectors.
        Category::All => &[
            HOSPITAL,
            CLINIC_AMENITY,
            CLINIC_HEALTHCARE,
            DOCTOR_SPECIALITY,
            MEDICAL_SPECIALTY,
        ],
    }
}

/// Builds the query selecting entities within `radius_meters` of `center`.
///
/// Deterministic for identical inputs. The radius is rounded to whole meters.
#[must_use]
pub fn build_query(center: Coordinate, radius_meters: f64, category: Category) -> QueryText {
    // Rounded and clamped non-negative, so the cast cannot wrap.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let radius = radius_meters.max(0.0).round() as u64;
    let around = format!("(around:{radius},{},{})", center.lat, center.lon);

    let blocks: Vec<String> = selectors(category)
        .iter()
        .map(|selector| {
            ENTITY_KINDS
                .iter()
                .map(|kind| format!("{kind}{selector}{around};"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();

    QueryText(format!(
        "[out:json][timeout:{SERVER_TIMEOUT_SECS}];\n(\n{}\n);\nout center;",
        blocks.join("\n")
    ))
}
