//! Upstream job normalizer
//!
//! Maps one raw job object from the jobs API into a [`Job`]. The mapping is
//! total: anything missing, null or empty upstream resolves to a default, so
//! callers never see a half-filled record.
//!
//! Each field group has its own function with its own resolution order.

use crate::{AdditionalInfo, Attribute, CompanyDetails, Image, Job, JobId, Media, Tag};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

pub const NOT_SPECIFIED: &str = "Not specified";
pub const UNTITLED: &str = "Untitled Position";
pub const COMPANY_NOT_LISTED: &str = "Company Not Listed";
pub const LOCATION_NOT_SPECIFIED: &str = "Location Not Specified";
pub const CONTACT_NOT_AVAILABLE: &str = "Contact Not Available";
pub const NO_FEES: &str = "No fees";

/// Builds a canonical job from one raw upstream object. Never fails.
pub fn normalize(raw: &Value) -> Job {
    let role = role_details(raw);
    let times = timestamps(raw);

    Job {
        id: job_id(raw),
        title: first_text(raw, &[&["title"]]).unwrap_or_else(|| UNTITLED.to_string()),
        company: first_text(raw, &[&["company_name"]])
            .unwrap_or_else(|| COMPANY_NOT_LISTED.to_string()),
        location: location(raw),
        salary: salary(raw),
        phone: phone(raw),
        description: first_text(raw, &[&["other_details"]]).unwrap_or_default(),
        requirements: role.requirements,
        experience: role.experience,
        job_type: role.job_type,
        openings: role.openings,
        role: role.role,
        category: role.category,
        created_on: times.created_on,
        updated_on: times.updated_on,
        expires_on: times.expires_on,
        fees: fees(raw),
        company_details: company_details(raw),
        additional_info: additional_info(raw),
        media: media(raw),
    }
}

/// Integer ids stay integers; anything else usable becomes text. A job
/// without an id gets the empty id rather than failing.
pub fn job_id(raw: &Value) -> JobId {
    match raw.get("id") {
        Some(Value::Number(n)) => match n.as_i64().or_else(|| integral(n)) {
            Some(i) => JobId::Number(i),
            None => JobId::Text(number_text(n)),
        },
        Some(Value::String(s)) => JobId::Text(s.clone()),
        _ => JobId::default(),
    }
}

/// Place name from primary details, then the location slug.
pub fn location(raw: &Value) -> String {
    first_text(raw, &[&["primary_details", "Place"], &["job_location_slug"]])
        .unwrap_or_else(|| LOCATION_NOT_SPECIFIED.to_string())
}

/// Upstream display string first, then a range built from both bounds.
/// A missing bound never gets interpolated.
pub fn salary(raw: &Value) -> String {
    if let Some(display) = first_text(raw, &[&["primary_details", "Salary"]]) {
        return display;
    }

    match (bound(raw.get("salary_min")), bound(raw.get("salary_max"))) {
        (Some(min), Some(max)) => format!("₹{min} - ₹{max}"),
        _ => NOT_SPECIFIED.to_string(),
    }
}

/// WhatsApp number, then the custom contact link without its `tel:` scheme.
pub fn phone(raw: &Value) -> String {
    if let Some(number) = first_text(raw, &[&["whatsapp_no"]]) {
        return number;
    }

    first_text(raw, &[&["custom_link"]])
        .map(|link| link.strip_prefix("tel:").unwrap_or(&link).to_string())
        .filter(|link| !link.is_empty())
        .unwrap_or_else(|| CONTACT_NOT_AVAILABLE.to_string())
}

pub fn fees(raw: &Value) -> String {
    first_text(raw, &[&["fees_text"], &["primary_details", "Fees_Charged"]])
        .unwrap_or_else(|| NO_FEES.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleDetails {
    pub requirements: String,
    pub experience: String,
    pub job_type: String,
    pub openings: String,
    pub role: String,
    pub category: String,
}

pub fn role_details(raw: &Value) -> RoleDetails {
    let or_default = |paths: &[&[&str]]| {
        first_text(raw, paths).unwrap_or_else(|| NOT_SPECIFIED.to_string())
    };

    RoleDetails {
        requirements: or_default(&[&["primary_details", "Qualification"]]),
        experience: or_default(&[&["primary_details", "Experience"]]),
        job_type: or_default(&[&["primary_details", "Job_Type"], &["job_hours"]]),
        openings: or_default(&[&["openings_count"]]),
        role: or_default(&[&["job_role"]]),
        category: or_default(&[&["job_category"]]),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timestamps {
    pub created_on: String,
    pub updated_on: String,
    pub expires_on: String,
}

pub fn timestamps(raw: &Value) -> Timestamps {
    Timestamps {
        created_on: first_text(raw, &[&["created_on"]]).unwrap_or_default(),
        updated_on: first_text(raw, &[&["updated_on"]]).unwrap_or_default(),
        expires_on: first_text(raw, &[&["expire_on"]]).unwrap_or_default(),
    }
}

pub fn company_details(raw: &Value) -> CompanyDetails {
    let contact_preference = match raw.get("contact_preference") {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    let preference = |key: &str| {
        first_text(raw, &[&["contact_preference", key]]).unwrap_or_default()
    };

    CompanyDetails {
        name: first_text(raw, &[&["company_name"]]).unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        whatsapp_link: preference("whatsapp_link"),
        call_start_time: preference("preferred_call_start_time"),
        call_end_time: preference("preferred_call_end_time"),
        button_text: first_text(raw, &[&["button_text"]]).unwrap_or_default(),
        contact_preference,
    }
}

pub fn additional_info(raw: &Value) -> AdditionalInfo {
    let tags = items(raw.get("job_tags"))
        .map(|tag| Tag {
            value: scalar(tag.get("value")).unwrap_or_default(),
            background_color: scalar(tag.get("bg_color")).unwrap_or_default(),
            text_color: scalar(tag.get("text_color")).unwrap_or_default(),
        })
        .collect();

    let mut attributes = BTreeMap::new();
    for item in items(field(raw, &["contentV3", "V3"])) {
        // Entries without a key have nowhere to go in the mapping.
        let Some(key) = scalar(item.get("field_key")).filter(|k| !k.is_empty()) else {
            continue;
        };
        attributes.insert(
            key,
            Attribute {
                name: scalar(item.get("field_name")).unwrap_or_default(),
                value: scalar(item.get("field_value")).unwrap_or_default(),
            },
        );
    }

    AdditionalInfo {
        views: counter(raw.get("views")),
        shares: counter(raw.get("shares")),
        fb_shares: counter(raw.get("fb_shares")),
        applications: counter(raw.get("num_applications")),
        is_premium: raw.get("is_premium").and_then(Value::as_bool).unwrap_or(false),
        tags,
        attributes,
    }
}

pub fn media(raw: &Value) -> Media {
    let images = items(raw.get("creatives"))
        .map(|creative| Image {
            image_url: scalar(creative.get("file")).unwrap_or_default(),
            thumbnail_url: scalar(creative.get("thumb_url")).unwrap_or_default(),
        })
        .collect();
    let videos = items(raw.get("videos")).cloned().collect();

    Media { images, videos }
}

fn field<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(raw, |value, key| value.get(*key))
}

/// First path whose value counts as present text. Empty strings, zero,
/// booleans, null and containers are all treated as absent.
fn first_text(raw: &Value, paths: &[&[&str]]) -> Option<String> {
    paths.iter().find_map(|path| match field(raw, path)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(number_text(n)),
        _ => None,
    })
}

// Salary bounds: zero is a real bound, only absence counts as missing.
fn bound(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(number_text(n)),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn scalar(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Whole floats such as `4.0` as an integer; anything else stays `None`.
fn integral(n: &Number) -> Option<i64> {
    let f = n.as_f64()?;
    (f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0).then_some(f as i64)
}

// Render numbers the way the API's own clients show them: `4.0` reads "4".
fn number_text(n: &Number) -> String {
    match integral(n) {
        Some(i) if n.is_f64() => i.to_string(),
        _ => n.to_string(),
    }
}

fn counter(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn items(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|item| item.is_object())
}
