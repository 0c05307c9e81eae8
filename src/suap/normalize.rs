//! Profile normalization
//!
//! SUAP answers "my data" requests with different layouts depending on the
//! endpoint and API version: a flat person record, a record with a single
//! `vinculo` object, or one with a list of affiliations. Everything here is a
//! pure function of the raw JSON; absent or mistyped fields simply produce
//! absent normalized fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Origin used to absolutize relative photo paths
pub const DEFAULT_PROVIDER_ORIGIN: &str = "https://suap.ifrn.edu.br";

const NAME_FIELDS: &[&str] = &["nome_usual", "nome_social", "nome", "nome_registro"];

const PHOTO_FIELDS: &[&str] = &[
    "foto",
    "url_foto",
    "url_foto_150x200",
    "foto_150x200",
    "url_foto_75x100",
    "foto_75x100",
];

const PASS_THROUGH_SCHEMES: &[&str] = &["http", "https", "data"];

/// One affiliation entry with nested provider objects flattened to names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affiliation {
    pub kind: Option<String>,
    pub status: Option<String>,
    pub course_name: Option<String>,
    pub campus_name: Option<String>,
    /// The entry carried a course or campus value, even one without a name
    pub has_placement: bool,
}

impl Affiliation {
    fn from_map(map: &Map<String, Value>) -> Self {
        let course = map.get("curso");
        let campus = map.get("campus");

        Self {
            kind: label_field(map, "tipo_vinculo").or_else(|| label_field(map, "tipo")),
            status: label_field(map, "situacao"),
            course_name: course.and_then(label_of),
            campus_name: campus.and_then(label_of),
            has_placement: course.is_some_and(is_truthy) || campus.is_some_and(is_truthy),
        }
    }
}

/// The provider's `vinculo` field, resolved once
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "entries", rename_all = "snake_case")]
pub enum AffiliationField {
    #[default]
    Absent,
    Single(Affiliation),
    Many(Vec<Affiliation>),
}

impl AffiliationField {
    fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Object(map)) => AffiliationField::Single(Affiliation::from_map(map)),
            Some(Value::Array(items)) => AffiliationField::Many(
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(Affiliation::from_map)
                    .collect(),
            ),
            _ => AffiliationField::Absent,
        }
    }

    /// Entries regardless of shape
    #[must_use]
    pub fn entries(&self) -> &[Affiliation] {
        match self {
            AffiliationField::Absent => &[],
            AffiliationField::Single(entry) => std::slice::from_ref(entry),
            AffiliationField::Many(entries) => entries,
        }
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, AffiliationField::Absent)
    }
}

/// Canonical profile built from whatever the provider returned
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedProfile {
    pub registration: Option<String>,
    pub display_name: String,
    pub course_name: Option<String>,
    pub campus_name: Option<String>,
    pub photo_url: Option<String>,
    pub raw_affiliation_status: Option<String>,
    /// Top-level `tipo_vinculo`
    pub affiliation_type: Option<String>,
    pub affiliation: AffiliationField,
    /// Every affiliation known for display purposes
    pub affiliations: Vec<Affiliation>,
}

/// Normalize a raw profile against the default provider origin
#[must_use]
pub fn normalize(raw: &Value) -> NormalizedProfile {
    normalize_with_origin(raw, DEFAULT_PROVIDER_ORIGIN)
}

/// Normalize a raw profile, absolutizing photo paths against `origin`
#[must_use]
pub fn normalize_with_origin(raw: &Value, origin: &str) -> NormalizedProfile {
    let empty = Map::new();
    let record = raw.as_object().unwrap_or(&empty);

    let affiliation = AffiliationField::from_value(record.get("vinculo"));
    let affiliations = display_affiliations(record, &affiliation);

    let course_name = affiliations
        .iter()
        .find_map(|a| a.course_name.clone())
        .or_else(|| record.get("curso").and_then(label_of));
    let campus_name = affiliations
        .iter()
        .find_map(|a| a.campus_name.clone())
        .or_else(|| record.get("campus").and_then(label_of));
    let raw_affiliation_status = affiliations
        .iter()
        .find_map(|a| a.status.clone())
        .or_else(|| label_field(record, "situacao"));

    NormalizedProfile {
        registration: text_field(record, "matricula").or_else(|| text_field(record, "identificacao")),
        display_name: resolve_display_name(record),
        course_name,
        campus_name,
        photo_url: resolve_photo_url(record, origin),
        raw_affiliation_status,
        affiliation_type: label_field(record, "tipo_vinculo"),
        affiliation,
        affiliations,
    }
}

fn resolve_display_name(record: &Map<String, Value>) -> String {
    if let Some(name) = NAME_FIELDS.iter().find_map(|key| string_field(record, key)) {
        return name;
    }

    let first = string_field(record, "primeiro_nome").unwrap_or_default();
    let last = string_field(record, "ultimo_nome").unwrap_or_default();
    format!("{first} {last}").trim().to_string()
}

fn resolve_photo_url(record: &Map<String, Value>, origin: &str) -> Option<String> {
    PHOTO_FIELDS
        .iter()
        .find_map(|key| string_field(record, key))
        .map(|photo| absolute_url(origin, &photo))
}

/// Rewrite relative or bare paths against the provider origin
fn absolute_url(origin: &str, location: &str) -> String {
    if let Ok(parsed) = url::Url::parse(location) {
        if PASS_THROUGH_SCHEMES.contains(&parsed.scheme()) {
            return location.to_string();
        }
    }
    if let Some(rest) = location.strip_prefix("//") {
        return format!("https://{rest}");
    }

    let origin = origin.trim_end_matches('/');
    let path = location.trim_start_matches('/');
    format!("{origin}/{path}")
}

fn display_affiliations(record: &Map<String, Value>, affiliation: &AffiliationField) -> Vec<Affiliation> {
    let listed: Vec<Affiliation> = match record.get("vinculos") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .map(Affiliation::from_map)
            .collect(),
        Some(Value::Object(map)) => vec![Affiliation::from_map(map)],
        _ => Vec::new(),
    };
    if !listed.is_empty() {
        return listed;
    }

    if !affiliation.entries().is_empty() {
        return affiliation.entries().to_vec();
    }

    // Flat records (e.g. the student "my data" endpoint) carry course and
    // campus at the top level
    let top_level = Affiliation::from_map(record);
    if top_level.has_placement {
        vec![top_level]
    } else {
        Vec::new()
    }
}

/// Non-empty trimmed string value
fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// String or number value, for identifiers the provider sometimes sends as numbers
fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::Number(n) => Some(n.to_string()),
        _ => string_field(map, key),
    }
}

fn label_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(label_of)
}

/// Flat label for a value that may be a plain string or a nested object
fn label_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Object(map) => string_field(map, "nome").or_else(|| string_field(map, "descricao")),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > f64::EPSILON),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
