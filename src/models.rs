//! Data models for the prediction API.
//!
//! The request mirrors what the form sends; the response is a bare JSON
//! array of `{ name, impact }` objects, one per locality.

use serde::{Deserialize, Serialize};

use crate::errors::PredictError;

/// Body of `POST /api/predict`.
///
/// Coordinates are sent as the raw text the user typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictRequest {
    /// Cyclone latitude, as entered
    pub lat: String,

    /// Cyclone longitude, as entered
    pub lon: String,

    /// Storm severity. Only sent when explicitly set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

impl PredictRequest {
    #[must_use]
    pub fn new(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Self {
            lat: lat.into(),
            lon: lon.into(),
            severity: None,
        }
    }
}

/// Predicted impact for one locality.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PredictionRecord {
    /// Locality name
    pub name: String,

    /// Impact score
    pub impact: f64,
}

impl PredictionRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, impact: f64) -> Self {
        Self {
            name: name.into(),
            impact,
        }
    }
}

/// Ordered result of one prediction request.
///
/// Order is the order the service returned; nothing re-sorts it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PredictionSet(pub Vec<PredictionRecord>);

impl PredictionSet {
    /// Validate the response structure.
    ///
    /// Parsed responses never hold NaN or infinities since serde_json
    /// rejects them; this catches sets assembled in code.
    ///
    /// # Errors
    ///
    /// Returns an error if any impact is not finite.
    pub fn validate(&self) -> Result<(), PredictError> {
        if let Some(bad) = self.0.iter().find(|r| !r.impact.is_finite()) {
            return Err(PredictError::InvalidResponse(format!(
                "non-finite impact for locality '{}'",
                bad.name
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn records(&self) -> &[PredictionRecord] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<PredictionRecord>> for PredictionSet {
    fn from(records: Vec<PredictionRecord>) -> Self {
        Self(records)
    }
}
