use std::fmt;

use async_trait::async_trait;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::client::ServiceError;

pub mod extractor;
pub mod normalizer;

/// Title and body of one article submitted for analysis.
///
/// Constructed through [`AnalysisRequest::new`], which rejects blank fields;
/// the values cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    #[serde(rename = "article_title")]
    title: String,
    #[serde(rename = "article_body")]
    body: String,
}

impl AnalysisRequest {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Self, RequestValidationError> {
        let request = Self {
            title: title.into(),
            body: body.into(),
        };
        request.validate()?;
        Ok(request)
    }

    /// Whether a title/body pair would be accepted for submission.
    pub fn is_submittable(title: &str, body: &str) -> bool {
        !title.trim().is_empty() && !body.trim().is_empty()
    }

    fn validate(&self) -> Result<(), RequestValidationError> {
        if self.title.trim().is_empty() {
            return Err(RequestValidationError::EmptyTitle);
        }
        if self.body.trim().is_empty() {
            return Err(RequestValidationError::EmptyBody);
        }
        Ok(())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Reasons an analysis request is refused before anything is sent.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RequestValidationError {
    #[error("article title must not be blank")]
    EmptyTitle,
    #[error("article body must not be blank")]
    EmptyBody,
}

/// Risk assessment returned by the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub final_risk_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub final_risk_level: String,
    #[serde(default)]
    pub breakdown: Breakdown,
}

impl AnalysisResponse {
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_label(&self.final_risk_level)
    }

    /// Label to show for the overall verdict: the service's own text, or the
    /// bucket name when the service sent none.
    pub fn display_level_label(&self) -> String {
        match self.final_risk_level.trim() {
            "" => self.risk_level().label().to_string(),
            label => label.to_string(),
        }
    }
}

/// Per-category result inside a response breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendation: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub found_urls: Vec<FoundUrl>,
}

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Related article surfaced by the service, with similarity in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundUrl {
    pub url: String,
    pub similarity: f64,
}

/// Category reports keyed by category, in the order the service sent them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Breakdown {
    entries: Vec<(String, CategoryReport)>,
}

impl Breakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, replacing the report in place if the key already exists.
    pub fn insert(&mut self, key: impl Into<String>, report: CategoryReport) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = report,
            None => self.entries.push((key, report)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&CategoryReport> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, report)| report)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryReport)> {
        self.entries
            .iter()
            .map(|(key, report)| (key.as_str(), report))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, CategoryReport)> for Breakdown {
    fn from_iter<I: IntoIterator<Item = (K, CategoryReport)>>(iter: I) -> Self {
        let mut breakdown = Self::new();
        for (key, report) in iter {
            breakdown.insert(key, report);
        }
        breakdown
    }
}

impl Serialize for Breakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, report) in &self.entries {
            map.serialize_entry(key, report)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Breakdown {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BreakdownVisitor;

        impl<'de> Visitor<'de> for BreakdownVisitor {
            type Value = Breakdown;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category keys to category reports")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Breakdown, E> {
                Ok(Breakdown::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Breakdown, A::Error> {
                let mut breakdown = Breakdown::new();
                while let Some((key, report)) =
                    access.next_entry::<String, CategoryReport>()?
                {
                    breakdown.insert(key, report);
                }
                Ok(breakdown)
            }
        }

        deserializer.deserialize_any(BreakdownVisitor)
    }
}

/// Overall verdict label as supplied by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Danger,
    Warning,
    Safe,
}

impl RiskLevel {
    /// Map the service's label; anything unrecognised counts as safe.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "위험" => Self::Danger,
            "주의" | "경고" => Self::Warning,
            _ => Self::Safe,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Danger => "위험",
            Self::Warning => "주의",
            Self::Safe => "안전",
        }
    }
}

/// Remote backend that turns an article into a risk assessment.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, ServiceError>;
}
