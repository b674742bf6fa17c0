use care_flow::{
    EmergencyNotice, EmergencyRequest, FitnessRecommendation, HealthSummary,
    MedicineRecommendation, ParsedDocument,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// JSON body accepted by the session-scoped POST endpoints. Every field is
/// optional and an absent or unreadable body counts as empty. `sessionId` is
/// read on its own, so malformed emergency fields never lose the session.
#[derive(Debug, Default)]
pub struct ActionBody {
    pub session_id: Option<String>,
    pub emergency: EmergencyRequest,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub ok: bool,
    pub session: String,
    pub parsed_data: ParsedDocument,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub ok: bool,
    pub summary: Option<HealthSummary>,
    pub parsed_data: Option<ParsedDocument>,
}

#[derive(Debug, Serialize)]
pub struct MedicinesResponse {
    pub ok: bool,
    pub items: Vec<MedicineRecommendation>,
}

#[derive(Debug, Serialize)]
pub struct FitnessResponse {
    pub ok: bool,
    pub exercises: Vec<FitnessRecommendation>,
}

#[derive(Debug, Serialize)]
pub struct EmergencyDetails {
    pub mode: String,
    pub message: String,
    pub contacts: Vec<String>,
}

impl From<EmergencyNotice> for EmergencyDetails {
    fn from(notice: EmergencyNotice) -> Self {
        Self {
            mode: notice.mode,
            message: notice.message,
            contacts: notice.contacts,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmergencyResponse {
    pub ok: bool,
    pub status: String,
    pub details: EmergencyDetails,
}

#[derive(Debug, Serialize)]
pub struct FallResponse {
    pub ok: bool,
    pub running: bool,
}
