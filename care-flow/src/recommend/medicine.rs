use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{KeywordRule, Named, RecommendationEngine, dedup_by_name, evaluate_rules};
use crate::document::ParsedDocument;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineRecommendation {
    pub name: String,
    pub form: String,
    pub usage: String,
    pub time: String,
    pub ml: u32,
    pub rationale: String,
}

impl MedicineRecommendation {
    fn new(name: &str, form: &str, usage: &str, time: &str, ml: u32, rationale: &str) -> Self {
        Self {
            name: name.to_string(),
            form: form.to_string(),
            usage: usage.to_string(),
            time: time.to_string(),
            ml,
            rationale: rationale.to_string(),
        }
    }
}

impl Named for MedicineRecommendation {
    fn name(&self) -> &str {
        &self.name
    }
}

fn lisinopril() -> MedicineRecommendation {
    MedicineRecommendation::new(
        "Lisinopril",
        "Tablet",
        "Oral ingestion daily",
        "08:00 AM",
        10,
        "Management of hypertension detected in report.",
    )
}

fn atorvastatin() -> MedicineRecommendation {
    MedicineRecommendation::new(
        "Atorvastatin",
        "Tablet",
        "Take before bedtime",
        "09:00 PM",
        20,
        "Lipid-lowering therapy suggested by cholesterol profile.",
    )
}

fn wellness_tablet() -> MedicineRecommendation {
    MedicineRecommendation::new(
        "Wellness Tablet",
        "Supplement",
        "Once daily",
        "09:00 AM",
        0,
        "General wellness support based on your health profile.",
    )
}

static MEDICINE_RULES: &[KeywordRule<MedicineRecommendation>] = &[
    KeywordRule {
        keywords: &["blood pressure", "bp", "hypertension"],
        item: lisinopril,
    },
    KeywordRule {
        keywords: &["cholesterol", "lipid", "ldl"],
        item: atorvastatin,
    },
];

/// Suggests medicines for the conditions named in a document.
///
/// Once any document has been uploaded the list is never empty: when no rule
/// fires, a generic wellness item is returned instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct MedicineEngine;

impl RecommendationEngine for MedicineEngine {
    type Item = MedicineRecommendation;

    fn recommend(&self, document: Option<&ParsedDocument>) -> Vec<MedicineRecommendation> {
        let Some(document) = document else {
            return Vec::new();
        };

        let mut items = if document.has_content() {
            evaluate_rules(MEDICINE_RULES, &document.corpus())
        } else {
            Vec::new()
        };

        if items.is_empty() {
            items.push(wellness_tablet());
        }

        let items = dedup_by_name(items);
        debug!(count = items.len(), "Medicine rules evaluated");
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Section;

    fn names(items: &[MedicineRecommendation]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_no_document_yields_nothing() {
        assert!(MedicineEngine.recommend(None).is_empty());
    }

    #[test]
    fn test_hypertension_and_cholesterol_in_rule_order() {
        let doc = ParsedDocument::new(vec![], "Cholesterol elevated; known Hypertension");
        let items = MedicineEngine.recommend(Some(&doc));
        assert_eq!(names(&items), vec!["Lisinopril", "Atorvastatin"]);
    }

    #[test]
    fn test_keywords_found_in_sections() {
        let doc = ParsedDocument::new(vec![Section::new("LDL", "190 mg/dL")], "");
        let items = MedicineEngine.recommend(Some(&doc));
        assert_eq!(names(&items), vec!["Atorvastatin"]);
        assert_eq!(items[0].ml, 20);
    }

    #[test]
    fn test_baseline_when_no_rule_fires() {
        let doc = ParsedDocument::new(vec![Section::new("Name", "Jane")], "routine visit");
        let items = MedicineEngine.recommend(Some(&doc));
        assert_eq!(names(&items), vec!["Wellness Tablet"]);
    }

    #[test]
    fn test_baseline_for_uploaded_but_empty_document() {
        let items = MedicineEngine.recommend(Some(&ParsedDocument::empty()));
        assert_eq!(names(&items), vec!["Wellness Tablet"]);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(lisinopril()).unwrap();
        assert_eq!(json["name"], "Lisinopril");
        assert_eq!(json["time"], "08:00 AM");
        assert_eq!(json["ml"], 10);
    }
}
