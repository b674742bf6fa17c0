//! CareRunner – glues a [`SessionStorage`] to the normalizer, the signal
//! extractor and the recommendation engines.
//!
//! Every mutating operation follows the same _load → modify → save_ pattern:
//! the session is fetched (or created on first reference), updated in memory
//! and written back with one `save`. There is no locking across requests, so
//! two concurrent requests on the same session may interleave and the last
//! `save` wins.
//!
//! Read-only operations ([`CareRunner::summarize`], [`CareRunner::document`])
//! never create sessions: an unknown or missing key reads as "no document yet".
//!
//! ```rust,ignore
//! let runner = CareRunner::new(Arc::new(InMemorySessionStorage::new()));
//! let outcome = runner.ingest(Some("sess_1"), upload).await?;
//! let summary = runner.summarize(Some(&outcome.session_id)).await?;
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::{
    document::{DocumentUpload, ParsedDocument},
    error::Result,
    normalizer::Normalizer,
    recommend::{
        FitnessEngine, FitnessRecommendation, MedicineEngine, MedicineRecommendation,
        RecommendationEngine,
    },
    session::{EmergencyNotice, EmergencyRequest, SessionState, UploadMeta},
    signals::{self, HealthSummary},
    storage::SessionStorage,
};

/// Result of [`CareRunner::ingest`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestOutcome {
    pub session_id: String,
    pub parsed_data: ParsedDocument,
}

#[derive(Clone)]
pub struct CareRunner {
    storage: Arc<dyn SessionStorage>,
    normalizer: Normalizer,
    medicine: MedicineEngine,
    fitness: FitnessEngine,
}

impl CareRunner {
    /// Create a runner over any `SessionStorage`, decoding with the default readers.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self::with_normalizer(storage, Normalizer::default())
    }

    pub fn with_normalizer(storage: Arc<dyn SessionStorage>, normalizer: Normalizer) -> Self {
        Self {
            storage,
            normalizer,
            medicine: MedicineEngine,
            fitness: FitnessEngine,
        }
    }

    pub fn storage(&self) -> Arc<dyn SessionStorage> {
        self.storage.clone()
    }

    /// The caller's key, verbatim, when present and non-empty, otherwise a
    /// fresh one. Keys are opaque: no trimming or case folding.
    pub fn resolve_session_id(session_key: Option<&str>) -> String {
        match session_key {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => SessionState::generate_id(),
        }
    }

    /// Normalizes an upload and stores it as the session's current document.
    pub async fn ingest(
        &self,
        session_key: Option<&str>,
        upload: DocumentUpload,
    ) -> Result<IngestOutcome> {
        let session_id = Self::resolve_session_id(session_key);
        let kind = upload.kind();
        let meta = UploadMeta::from(&upload);

        info!(
            session_id = %session_id,
            filename = %meta.filename,
            mimetype = %meta.mimetype,
            size = meta.size,
            ?kind,
            "Ingesting document"
        );

        let parsed_data = self.normalizer.normalize_blocking(upload.bytes, kind).await;

        let mut session = self.storage.get_or_create(&session_id).await?;
        session.attach_document(meta, parsed_data.clone());
        self.storage.save(session).await?;

        info!(
            session_id = %session_id,
            sections = parsed_data.sections().len(),
            raw_chars = parsed_data.raw().len(),
            "Document stored on session"
        );

        Ok(IngestOutcome {
            session_id,
            parsed_data,
        })
    }

    /// The session's current document, if any.
    pub async fn document(&self, session_key: Option<&str>) -> Result<Option<ParsedDocument>> {
        let Some(session_id) = session_key else {
            return Ok(None);
        };
        Ok(self
            .storage
            .get(session_id)
            .await?
            .and_then(|session| session.parsed_data))
    }

    /// Health summary of the session's current document; `None` without one.
    pub async fn summarize(&self, session_key: Option<&str>) -> Result<Option<HealthSummary>> {
        let document = self.document(session_key).await?;
        match &document {
            Some(doc) => info!(
                session_id = session_key.unwrap_or_default(),
                sections = doc.sections().len(),
                "Summarizing session document"
            ),
            None => info!(
                session_id = session_key.unwrap_or_default(),
                "No document found for summary"
            ),
        }
        Ok(document.as_ref().map(signals::extract))
    }

    /// Recomputes the medicine list and caches it on the session.
    pub async fn recommend_medicines(
        &self,
        session_key: Option<&str>,
    ) -> Result<Vec<MedicineRecommendation>> {
        let session_id = Self::resolve_session_id(session_key);
        let mut session = self.storage.get_or_create(&session_id).await?;

        let items = self.medicine.recommend(session.parsed_data.as_ref());
        info!(
            session_id = %session_id,
            engine = self.medicine.id(),
            count = items.len(),
            "Generated medicine recommendations"
        );

        session.medicines = Some(items.clone());
        self.storage.save(session).await?;
        Ok(items)
    }

    /// Recomputes the exercise list and caches it on the session.
    pub async fn recommend_fitness(
        &self,
        session_key: Option<&str>,
    ) -> Result<Vec<FitnessRecommendation>> {
        let session_id = Self::resolve_session_id(session_key);
        let mut session = self.storage.get_or_create(&session_id).await?;

        let exercises = self.fitness.recommend(session.parsed_data.as_ref());
        info!(
            session_id = %session_id,
            engine = self.fitness.id(),
            count = exercises.len(),
            "Generated fitness recommendations"
        );

        session.fitness = Some(exercises.clone());
        self.storage.save(session).await?;
        Ok(exercises)
    }

    /// Sets the fall monitor flag and echoes the new state. Idempotent.
    pub async fn set_fall_monitor(&self, session_key: Option<&str>, running: bool) -> Result<bool> {
        let session_id = Self::resolve_session_id(session_key);
        let mut session = self.storage.get_or_create(&session_id).await?;

        session.fall.running = running;
        self.storage.save(session).await?;

        info!(session_id = %session_id, running, "Fall monitor updated");
        Ok(running)
    }

    /// Records an emergency notification request and echoes its parameters.
    pub async fn notify_emergency(
        &self,
        session_key: Option<&str>,
        request: EmergencyRequest,
    ) -> Result<EmergencyNotice> {
        let session_id = Self::resolve_session_id(session_key);
        let mut session = self.storage.get_or_create(&session_id).await?;

        let notice = EmergencyNotice::from(request);
        info!(
            session_id = %session_id,
            mode = %notice.mode,
            message = %notice.message,
            contacts = notice.contacts.len(),
            "Emergency notification requested"
        );

        session.emergency = Some(notice.clone());
        self.storage.save(session).await?;
        Ok(notice)
    }

    /// Full session state, without creating it.
    pub async fn session(&self, session_id: &str) -> Result<Option<SessionState>> {
        self.storage.get(session_id).await
    }
}
