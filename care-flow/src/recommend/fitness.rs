use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{KeywordRule, Named, RecommendationEngine, dedup_by_name, evaluate_rules};
use crate::document::ParsedDocument;

const MIN_EXERCISES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessRecommendation {
    pub name: String,
    pub sets_or_duration: String,
    pub timer: String,
    pub video_url: String,
    pub rationale: String,
}

impl FitnessRecommendation {
    fn new(name: &str, sets_or_duration: &str, timer: &str, video_url: &str, rationale: &str) -> Self {
        Self {
            name: name.to_string(),
            sets_or_duration: sets_or_duration.to_string(),
            timer: timer.to_string(),
            video_url: video_url.to_string(),
            rationale: rationale.to_string(),
        }
    }
}

impl Named for FitnessRecommendation {
    fn name(&self) -> &str {
        &self.name
    }
}

fn seated_marching() -> FitnessRecommendation {
    FitnessRecommendation::new(
        "Seated Marching",
        "3 sets x 1 min",
        "60s",
        "https://www.youtube.com/watch?v=KZ7w7mG5q2o",
        "Improves circulation safely for hypertension management.",
    )
}

fn wall_push_ups() -> FitnessRecommendation {
    FitnessRecommendation::new(
        "Wall Push-ups",
        "2 sets x 12 reps",
        "45s",
        "https://www.youtube.com/watch?v=a6YITB1YFf0",
        "Resistance training helps improve insulin sensitivity.",
    )
}

fn chair_squats() -> FitnessRecommendation {
    FitnessRecommendation::new(
        "Chair Squats",
        "2 sets x 10 reps",
        "60s",
        "https://www.youtube.com/watch?v=1PZ_n-T8Ksg",
        "Builds functional leg strength for mobility.",
    )
}

fn brisk_walking() -> FitnessRecommendation {
    FitnessRecommendation::new(
        "Brisk Walking",
        "20 minutes",
        "1200s",
        "https://www.youtube.com/watch?v=3kYzeh6m5I0",
        "Aerobic activity helps maintain healthy lipid levels.",
    )
}

fn ankle_circles() -> FitnessRecommendation {
    FitnessRecommendation::new(
        "Ankle Circles",
        "1 min per foot",
        "30s",
        "https://www.youtube.com/watch?v=0_u6eCHtSBA",
        "Improves joint mobility and prevents stiffness.",
    )
}

static FITNESS_RULES: &[KeywordRule<FitnessRecommendation>] = &[
    KeywordRule {
        keywords: &["blood pressure", "bp", "hypertension"],
        item: seated_marching,
    },
    KeywordRule {
        keywords: &["glucose", "diabetes", "sugar"],
        item: wall_push_ups,
    },
];

/// Suggests exercises for the conditions named in a document.
///
/// Whenever the document has content, the result holds the matched exercises
/// followed by a mobility baseline, and at least two entries.
#[derive(Debug, Default, Clone, Copy)]
pub struct FitnessEngine;

impl RecommendationEngine for FitnessEngine {
    type Item = FitnessRecommendation;

    fn recommend(&self, document: Option<&ParsedDocument>) -> Vec<FitnessRecommendation> {
        let Some(document) = document.filter(|d| d.has_content()) else {
            return Vec::new();
        };

        let mut exercises = evaluate_rules(FITNESS_RULES, &document.corpus());
        exercises.push(chair_squats());

        // Unreachable while the baseline above is unconditional.
        if exercises.is_empty() {
            exercises.push(brisk_walking());
        }

        if exercises.len() < MIN_EXERCISES {
            exercises.push(ankle_circles());
        }

        let exercises = dedup_by_name(exercises);
        debug!(count = exercises.len(), "Fitness rules evaluated");
        exercises
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Section;

    fn names(items: &[FitnessRecommendation]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_no_document_yields_nothing() {
        assert!(FitnessEngine.recommend(None).is_empty());
    }

    #[test]
    fn test_empty_document_yields_nothing() {
        assert!(FitnessEngine.recommend(Some(&ParsedDocument::empty())).is_empty());
    }

    #[test]
    fn test_hypertension_and_diabetes_from_raw_text() {
        let doc = ParsedDocument::new(vec![], "patient has hypertension and diabetes");
        let items = FitnessEngine.recommend(Some(&doc));
        assert_eq!(
            names(&items),
            vec!["Seated Marching", "Wall Push-ups", "Chair Squats"]
        );
    }

    #[test]
    fn test_single_condition_gets_baseline_only() {
        let doc = ParsedDocument::new(vec![Section::new("Glucose", "140 mg/dL")], "");
        let items = FitnessEngine.recommend(Some(&doc));
        assert_eq!(names(&items), vec!["Wall Push-ups", "Chair Squats"]);
    }

    #[test]
    fn test_no_condition_pads_to_two() {
        let doc = ParsedDocument::new(vec![Section::new("Name", "Jane")], "");
        let items = FitnessEngine.recommend(Some(&doc));
        assert_eq!(names(&items), vec!["Chair Squats", "Ankle Circles"]);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(chair_squats()).unwrap();
        assert_eq!(json["setsOrDuration"], "2 sets x 10 reps");
        assert_eq!(json["videoUrl"], "https://www.youtube.com/watch?v=1PZ_n-T8Ksg");
    }
}
