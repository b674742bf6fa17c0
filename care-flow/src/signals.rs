//! Health signal extraction from a [`ParsedDocument`].
//!
//! Each field is resolved by three tiers, in order, until one succeeds:
//! 1. a scan over every section (last matching section wins),
//! 2. a regex scan over the lower-cased raw text,
//! 3. a fixed placeholder value.
//!
//! Temperature and SpO2 have no placeholder and may stay `None`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::{ParsedDocument, Section};

const HEART_RATE_KEYS: &[&str] = &["heart rate", "pulse", "bpm", "hr"];
const BLOOD_PRESSURE_KEYS: &[&str] = &["blood pressure", "bp", "systolic", "diastolic"];
const STEPS_KEYS: &[&str] = &["steps", "walking", "activity"];
const VITALITY_KEYS: &[&str] = &["vitality", "health", "score", "fitness"];
const TEMPERATURE_KEYS: &[&str] = &["temperature", "temp"];
const SPO2_KEYS: &[&str] = &["spo2", "oxygen saturation", "o2 sat"];

pub const FALLBACK_HEART_RATE: &str = "72";
pub const FALLBACK_STEPS: &str = "4,281";
pub const FALLBACK_VITALITY_SCORE: &str = "88";
pub const FALLBACK_STEPS_CHANGE: &str = "+12%";

const SAMPLE_SIZE: usize = 5;

// Digits are ASCII only; `\d` in `regex` would also match other scripts.
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

static RAW_HEART_RATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(heart rate|pulse|bpm|hr)[:\s]*([0-9]+)").expect("valid regex")
});

static RAW_BLOOD_PRESSURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(blood pressure|bp)[:\s]*([0-9]+/[0-9]+)").expect("valid regex")
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    pub heart_rate: Option<String>,
    pub bp: Option<String>,
    pub temp: Option<String>,
    pub spo2: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub vitality_score: Option<String>,
    pub steps: Option<String>,
    pub steps_change: Option<String>,
}

/// Fields that may be filled with a placeholder by the last tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignalField {
    HeartRate,
    Steps,
    VitalityScore,
    StepsChange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSummary {
    pub sections_count: usize,
    pub vital_signs: VitalSigns,
    pub metrics: Metrics,
    pub sample: Vec<Section>,
    /// Fields holding a placeholder rather than a value read from the document.
    pub fallback_fields: Vec<SignalField>,
}

/// Builds the [`HealthSummary`] for a document. Total and deterministic.
pub fn extract(doc: &ParsedDocument) -> HealthSummary {
    let mut vital_signs = VitalSigns::default();
    let mut metrics = Metrics::default();

    scan_sections(doc.sections(), &mut vital_signs, &mut metrics);
    scan_raw(doc.raw(), &mut vital_signs);
    let fallback_fields = apply_fallbacks(&mut vital_signs, &mut metrics);

    debug!(
        sections = doc.sections().len(),
        fallbacks = fallback_fields.len(),
        "Extracted health signals"
    );

    HealthSummary {
        sections_count: doc.sections().len(),
        vital_signs,
        metrics,
        sample: doc.sections().iter().take(SAMPLE_SIZE).cloned().collect(),
        fallback_fields,
    }
}

fn scan_sections(sections: &[Section], vital_signs: &mut VitalSigns, metrics: &mut Metrics) {
    for section in sections {
        let key = section.key.to_lowercase();
        let value = section.value.to_lowercase();

        if matches_any(&key, HEART_RATE_KEYS) {
            vital_signs.heart_rate = Some(
                first_digits(&section.value).unwrap_or_else(|| section.value.clone()),
            );
        }
        if matches_any(&key, BLOOD_PRESSURE_KEYS) {
            vital_signs.bp = Some(section.value.clone());
        }
        if matches_any(&key, TEMPERATURE_KEYS) {
            vital_signs.temp = Some(section.value.clone());
        }
        if matches_any(&key, SPO2_KEYS) {
            vital_signs.spo2 = Some(section.value.clone());
        }
        if matches_any(&key, STEPS_KEYS) {
            metrics.steps = Some(section.value.clone());
        }
        if matches_any(&key, VITALITY_KEYS) || value.contains("score") {
            if let Some(score) = first_digits(&format!("{} {}", section.value, section.key)) {
                metrics.vitality_score = Some(score);
            }
        }
    }
}

fn scan_raw(raw: &str, vital_signs: &mut VitalSigns) {
    if raw.is_empty() {
        return;
    }
    let raw = raw.to_lowercase();

    if is_unset(&vital_signs.heart_rate) {
        if let Some(caps) = RAW_HEART_RATE.captures(&raw) {
            vital_signs.heart_rate = Some(caps[2].to_string());
        }
    }
    if is_unset(&vital_signs.bp) {
        if let Some(caps) = RAW_BLOOD_PRESSURE.captures(&raw) {
            vital_signs.bp = Some(caps[2].to_string());
        }
    }
}

fn apply_fallbacks(vital_signs: &mut VitalSigns, metrics: &mut Metrics) -> Vec<SignalField> {
    let mut filled = Vec::new();
    let slots = [
        (&mut vital_signs.heart_rate, FALLBACK_HEART_RATE, SignalField::HeartRate),
        (&mut metrics.steps, FALLBACK_STEPS, SignalField::Steps),
        (&mut metrics.vitality_score, FALLBACK_VITALITY_SCORE, SignalField::VitalityScore),
        (&mut metrics.steps_change, FALLBACK_STEPS_CHANGE, SignalField::StepsChange),
    ];

    for (slot, fallback, field) in slots {
        if is_unset(slot) {
            *slot = Some(fallback.to_string());
            filled.push(field);
        }
    }
    filled
}

fn matches_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn first_digits(text: &str) -> Option<String> {
    DIGITS.find(text).map(|m| m.as_str().to_string())
}

// An empty string found by the section scan does not count as resolved.
fn is_unset(field: &Option<String>) -> bool {
    field.as_deref().is_none_or(str::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(sections: &[(&str, &str)], raw: &str) -> ParsedDocument {
        ParsedDocument::new(
            sections.iter().map(|(k, v)| Section::new(*k, *v)).collect(),
            raw,
        )
    }

    #[test]
    fn test_heart_rate_from_section_digits() {
        let summary = extract(&doc(&[("Heart Rate", "101 bpm")], ""));
        assert_eq!(summary.vital_signs.heart_rate.as_deref(), Some("101"));
        assert!(!summary.fallback_fields.contains(&SignalField::HeartRate));
    }

    #[test]
    fn test_heart_rate_without_digits_keeps_raw_value() {
        let summary = extract(&doc(&[("Pulse", "Regular")], ""));
        assert_eq!(summary.vital_signs.heart_rate.as_deref(), Some("Regular"));
    }

    #[test]
    fn test_blood_pressure_from_section() {
        let summary = extract(&doc(&[("Blood Pressure", "130/85")], ""));
        assert_eq!(summary.vital_signs.bp.as_deref(), Some("130/85"));
    }

    #[test]
    fn test_last_matching_section_wins() {
        let summary = extract(&doc(&[("Pulse", "60"), ("Heart Rate", "90")], ""));
        assert_eq!(summary.vital_signs.heart_rate.as_deref(), Some("90"));
    }

    #[test]
    fn test_vitality_score_from_value_containing_score() {
        let summary = extract(&doc(&[("Assessment", "Wellness score 93 of 100")], ""));
        assert_eq!(summary.metrics.vitality_score.as_deref(), Some("93"));
    }

    #[test]
    fn test_vitality_score_digits_may_come_from_key() {
        let summary = extract(&doc(&[("Fitness 2024", "good")], ""));
        assert_eq!(summary.metrics.vitality_score.as_deref(), Some("2024"));
    }

    #[test]
    fn test_steps_and_temperature_from_sections() {
        let summary = extract(&doc(
            &[("Daily Steps", "6,120"), ("Body Temperature", "98.6 F"), ("SpO2", "97%")],
            "",
        ));
        assert_eq!(summary.metrics.steps.as_deref(), Some("6,120"));
        assert_eq!(summary.vital_signs.temp.as_deref(), Some("98.6 F"));
        assert_eq!(summary.vital_signs.spo2.as_deref(), Some("97%"));
    }

    #[test]
    fn test_raw_scan_recovers_free_text_vitals() {
        let raw = "On arrival the patient's Pulse 84 and Blood Pressure: 142/91 were noted.";
        let summary = extract(&doc(&[], raw));
        assert_eq!(summary.vital_signs.heart_rate.as_deref(), Some("84"));
        assert_eq!(summary.vital_signs.bp.as_deref(), Some("142/91"));
    }

    #[test]
    fn test_only_ascii_digits_are_extracted() {
        let raw = "pulse \u{668}\u{660} bp \u{661}\u{662}\u{660}/\u{668}\u{660}";
        let summary = extract(&doc(&[], raw));
        assert_eq!(summary.vital_signs.heart_rate.as_deref(), Some(FALLBACK_HEART_RATE));
        assert_eq!(summary.vital_signs.bp, None);

        let summary = extract(&doc(&[("Heart Rate", "\u{668}\u{660} then 75")], ""));
        assert_eq!(summary.vital_signs.heart_rate.as_deref(), Some("75"));
    }

    #[test]
    fn test_raw_scan_does_not_override_sections() {
        let summary = extract(&doc(&[("BP", "120/80")], "bp 150/95"));
        assert_eq!(summary.vital_signs.bp.as_deref(), Some("120/80"));
    }

    #[test]
    fn test_empty_section_value_falls_through() {
        let summary = extract(&doc(&[("Heart Rate", "")], ""));
        assert_eq!(summary.vital_signs.heart_rate.as_deref(), Some(FALLBACK_HEART_RATE));
        assert!(summary.fallback_fields.contains(&SignalField::HeartRate));
    }

    #[test]
    fn test_fallbacks_fill_unresolved_fields() {
        let summary = extract(&doc(&[("Name", "Jane")], ""));

        assert_eq!(summary.vital_signs.heart_rate.as_deref(), Some("72"));
        assert_eq!(summary.metrics.steps.as_deref(), Some("4,281"));
        assert_eq!(summary.metrics.vitality_score.as_deref(), Some("88"));
        assert_eq!(summary.metrics.steps_change.as_deref(), Some("+12%"));
        assert_eq!(summary.vital_signs.bp, None);
        assert_eq!(summary.vital_signs.temp, None);
        assert_eq!(summary.vital_signs.spo2, None);
        assert_eq!(
            summary.fallback_fields,
            vec![
                SignalField::HeartRate,
                SignalField::Steps,
                SignalField::VitalityScore,
                SignalField::StepsChange,
            ]
        );
    }

    #[test]
    fn test_sample_is_first_five_sections() {
        let sections: Vec<(String, String)> =
            (0..8).map(|i| (format!("k{i}"), format!("v{i}"))).collect();
        let doc = ParsedDocument::new(
            sections.iter().map(|(k, v)| Section::new(k, v)).collect(),
            "",
        );
        let summary = extract(&doc);

        assert_eq!(summary.sections_count, 8);
        assert_eq!(summary.sample.len(), 5);
        assert_eq!(summary.sample[4].key, "k4");
    }

    #[test]
    fn test_extract_is_deterministic() {
        let d = doc(&[("HR", "77"), ("Score", "x")], "bp 120/70");
        assert_eq!(extract(&d), extract(&d));
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = extract(&doc(&[("Heart Rate", "65")], ""));
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["sectionsCount"], 1);
        assert_eq!(json["vitalSigns"]["heartRate"], "65");
        assert!(json["vitalSigns"]["temp"].is_null());
        assert_eq!(json["metrics"]["stepsChange"], "+12%");
        assert_eq!(json["fallbackFields"][0], "steps");
    }
}
