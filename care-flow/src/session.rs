use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    document::{DocumentUpload, ParsedDocument},
    recommend::{FitnessRecommendation, MedicineRecommendation},
};

pub const DEFAULT_EMERGENCY_MODE: &str = "sms";
pub const DEFAULT_EMERGENCY_MESSAGE: &str = "Emergency alert";

/// Metadata of the last uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMeta {
    pub filename: String,
    pub mimetype: String,
    pub size: usize,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&DocumentUpload> for UploadMeta {
    fn from(upload: &DocumentUpload) -> Self {
        Self {
            filename: upload.filename.clone(),
            mimetype: upload.mimetype.clone(),
            size: upload.bytes.len(),
            uploaded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallMonitor {
    pub running: bool,
}

/// An emergency notification as requested by the caller. Missing fields take
/// the defaults when recorded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmergencyRequest {
    pub mode: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub contacts: Vec<String>,
}

/// The parameters of the last emergency notification recorded on a session.
/// Delivery happens outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyNotice {
    pub mode: String,
    pub message: String,
    pub contacts: Vec<String>,
    pub requested_at: DateTime<Utc>,
}

impl From<EmergencyRequest> for EmergencyNotice {
    fn from(request: EmergencyRequest) -> Self {
        Self {
            mode: request
                .mode
                .unwrap_or_else(|| DEFAULT_EMERGENCY_MODE.to_string()),
            message: request
                .message
                .unwrap_or_else(|| DEFAULT_EMERGENCY_MESSAGE.to_string()),
            contacts: request.contacts,
            requested_at: Utc::now(),
        }
    }
}

/// Everything known about one session.
///
/// The document part only ever moves from empty to holding a document; the
/// fall monitor flag toggles independently of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub id: String,
    pub uploaded: Option<UploadMeta>,
    pub parsed_data: Option<ParsedDocument>,
    pub medicines: Option<Vec<MedicineRecommendation>>,
    pub fitness: Option<Vec<FitnessRecommendation>>,
    pub emergency: Option<EmergencyNotice>,
    pub fall: FallMonitor,
    pub created_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uploaded: None,
            parsed_data: None,
            medicines: None,
            fitness: None,
            emergency: None,
            fall: FallMonitor::default(),
            created_at: Utc::now(),
        }
    }

    pub fn generate_id() -> String {
        format!("sess_{}", Uuid::new_v4().simple())
    }

    pub fn has_document(&self) -> bool {
        self.parsed_data.is_some()
    }

    /// Stores a freshly parsed upload. Cached recommendations belong to the
    /// previous document and are dropped.
    pub fn attach_document(&mut self, meta: UploadMeta, document: ParsedDocument) {
        self.uploaded = Some(meta);
        self.parsed_data = Some(document);
        self.medicines = None;
        self.fitness = None;
    }
}
