//! Input form controller.
//!
//! Holds the two coordinate fields and the current prediction results.
//! Submitting is split into [`FormController::begin_submit`] and
//! [`FormController::complete`] so the state transitions can be driven
//! without a network, and so the network call can run without holding
//! a lock on the controller.
//!
//! Overlapping submits are resolved by request identity: only the most
//! recently issued request may change the results. A response to an
//! older request is dropped as stale, whatever order they arrive in.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::client::PredictClient;
use crate::errors::PredictError;
use crate::models::{PredictRequest, PredictionRecord, PredictionSet};

/// What happens to a failed request beyond logging it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Log and keep the failure reason for display
    #[default]
    Visible,
    /// Log only; nothing user-visible changes
    Silent,
}

/// Identity of an issued request. Strictly increasing per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestId(u64);

/// A request that has been issued but not yet completed.
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: RequestId,
    pub request: PredictRequest,
}

/// Result of feeding a response back into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Results were replaced
    Applied,
    /// Request failed; results untouched
    Failed,
    /// A newer request was issued since; response dropped
    Stale,
}

/// State holder behind the prediction form.
#[derive(Debug, Default)]
pub struct FormController {
    latitude: String,
    longitude: String,
    severity: Option<String>,
    results: PredictionSet,
    last_error: Option<String>,
    last_updated: Option<DateTime<Utc>>,
    policy: ErrorPolicy,
    /// Id of the most recently issued request
    latest: Option<RequestId>,
    /// Whether `latest` has completed
    latest_done: bool,
}

impl FormController {
    #[must_use]
    pub fn new(policy: ErrorPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn set_latitude(&mut self, text: impl Into<String>) {
        self.latitude = text.into();
    }

    pub fn set_longitude(&mut self, text: impl Into<String>) {
        self.longitude = text.into();
    }

    /// Set or clear the storm severity. Unset by default, and left out of
    /// the request body while unset.
    pub fn set_severity(&mut self, severity: Option<String>) {
        self.severity = severity;
    }

    #[must_use]
    pub fn latitude(&self) -> &str {
        &self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> &str {
        &self.longitude
    }

    #[must_use]
    pub fn results(&self) -> &[PredictionRecord] {
        self.results.records()
    }

    /// Reason of the last failed request, if it is still current.
    /// Always `None` under [`ErrorPolicy::Silent`].
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// When the results were last replaced.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Whether the most recently issued request is still outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.latest.is_some() && !self.latest_done
    }

    /// Issue a new request from the current field values, as entered.
    pub fn begin_submit(&mut self) -> Submission {
        let next = self.latest.map_or(1, |RequestId(n)| n + 1);
        let id = RequestId(next);
        self.latest = Some(id);
        self.latest_done = false;

        let mut request = PredictRequest::new(self.latitude.clone(), self.longitude.clone());
        request.severity.clone_from(&self.severity);

        debug!(request_id = next, "issuing prediction request");
        Submission { id, request }
    }

    /// Feed the response for `id` back into the form.
    pub fn complete(
        &mut self,
        id: RequestId,
        response: Result<PredictionSet, PredictError>,
    ) -> SubmitOutcome {
        if self.latest != Some(id) {
            debug!(request_id = id.0, "dropping stale prediction response");
            return SubmitOutcome::Stale;
        }
        self.latest_done = true;

        match response {
            Ok(predictions) => {
                if predictions.is_empty() {
                    debug!(request_id = id.0, "service returned no localities");
                }
                info!(
                    request_id = id.0,
                    localities = predictions.len(),
                    "prediction results updated"
                );
                self.results = predictions;
                self.last_error = None;
                self.last_updated = Some(Utc::now());
                SubmitOutcome::Applied
            }
            Err(e) => {
                warn!(request_id = id.0, "prediction request failed: {e}");
                if self.policy == ErrorPolicy::Visible {
                    self.last_error = Some(e.reason());
                }
                SubmitOutcome::Failed
            }
        }
    }
}

/// Run one submit against `client`, start to finish.
pub async fn submit(form: &mut FormController, client: &PredictClient) -> SubmitOutcome {
    let submission = form.begin_submit();
    let response = client.predict(&submission.request).await;
    form.complete(submission.id, response)
}
