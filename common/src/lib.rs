//! Shared job model
//!
//! The canonical `Job` record handed to every consumer (list screens,
//! bookmarks, detail views) plus the normalizer that builds it from the
//! upstream API shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

pub mod normalize;

pub use normalize::normalize;

/// Upstream job identifier. The API sends either integers or strings and we
/// write back whichever shape we received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    Number(i64),
    Text(String),
}

impl JobId {
    /// Canonical key used for de-duplication and bookmark membership, so that
    /// `42` and `"42"` name the same job.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl Default for JobId {
    fn default() -> Self {
        JobId::Text(String::new())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobId::Number(n) => write!(f, "{n}"),
            JobId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for JobId {
    fn from(value: i64) -> Self {
        JobId::Number(value)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        JobId::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub location: String,
    /// Display string, e.g. "₹15000 - ₹20000".
    pub salary: String,
    pub phone: String,
    pub description: String,
    pub requirements: String,
    pub experience: String,
    pub job_type: String,
    pub openings: String,
    pub role: String,
    pub category: String,
    // Opaque upstream date strings, never parsed.
    pub created_on: String,
    pub updated_on: String,
    pub expires_on: String,
    pub fees: String,
    pub company_details: CompanyDetails,
    pub additional_info: AdditionalInfo,
    pub media: Media,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetails {
    pub name: String,
    pub contact_preference: Map<String, Value>,
    pub whatsapp_link: String,
    pub call_start_time: String,
    pub call_end_time: String,
    pub button_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalInfo {
    pub views: u64,
    pub shares: u64,
    pub fb_shares: u64,
    pub applications: u64,
    pub is_premium: bool,
    pub tags: Vec<Tag>,
    /// Supplemental structured attributes keyed by upstream field key.
    pub attributes: BTreeMap<String, Attribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub value: String,
    pub background_color: String,
    pub text_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Media {
    pub images: Vec<Image>,
    pub videos: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub image_url: String,
    pub thumbnail_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_key_matches_across_shapes() {
        assert_eq!(JobId::Number(42).key(), JobId::from("42").key());
        assert_ne!(JobId::Number(42), JobId::from("42"));
    }

    #[test]
    fn test_job_id_keeps_upstream_shape_in_json() {
        let number: JobId = serde_json::from_str("7").unwrap();
        let text: JobId = serde_json::from_str("\"abc\"").unwrap();

        assert_eq!(number, JobId::Number(7));
        assert_eq!(text, JobId::Text("abc".to_string()));
        assert_eq!(serde_json::to_string(&number).unwrap(), "7");
    }

    #[test]
    fn test_job_round_trips_through_json() {
        let raw = serde_json::json!({
            "id": 11,
            "title": "Driver",
            "contact_preference": { "preference": 2, "whatsapp_link": "https://wa.me/1" },
            "job_tags": [{ "value": "Urgent", "bg_color": "#fff", "text_color": "#000" }],
            "contentV3": { "V3": [{ "field_key": "Gender", "field_name": "Gender", "field_value": "Any" }] },
            "creatives": [{ "file": "a.jpg", "thumb_url": "a_t.jpg" }],
            "videos": [{ "url": "v.mp4" }]
        });
        let job = normalize(&raw);

        let encoded = serde_json::to_string(&job).unwrap();
        let decoded: Job = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, job);
    }
}
