//! Category definitions: keyword tiers, weights and thresholds

use crate::error::{Result, TalentFitError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Threshold at or above which a category counts as a strength
pub const DEFAULT_THRESHOLD: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordTier {
    Core,
    Primary,
    Secondary,
    Phrase,
}

impl fmt::Display for KeywordTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            KeywordTier::Core => "core",
            KeywordTier::Primary => "primary",
            KeywordTier::Secondary => "secondary",
            KeywordTier::Phrase => "phrase",
        };
        write!(f, "{}", label)
    }
}

/// Keyword lists grouped by weight tier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordGroups {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub core: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phrase: Vec<String>,
}

impl KeywordGroups {
    pub fn group(&self, tier: KeywordTier) -> &[String] {
        match tier {
            KeywordTier::Core => &self.core,
            KeywordTier::Primary => &self.primary,
            KeywordTier::Secondary => &self.secondary,
            KeywordTier::Phrase => &self.phrase,
        }
    }

    /// Non-blank keywords in tier order (core first), trimmed
    pub fn iter(&self) -> impl Iterator<Item = (KeywordTier, &str)> + '_ {
        [
            KeywordTier::Core,
            KeywordTier::Primary,
            KeywordTier::Secondary,
            KeywordTier::Phrase,
        ]
        .into_iter()
        .flat_map(move |tier| {
            self.group(tier)
                .iter()
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .map(move |k| (tier, k))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub name: String,
    pub weight: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    pub keywords: KeywordGroups,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl CategoryDefinition {
    pub fn new(name: &str, keywords: KeywordGroups, weight: f64, threshold: f64) -> Self {
        Self {
            name: name.to_string(),
            weight,
            threshold,
            keywords,
        }
    }

    /// Distinct keywords (case-insensitive), keeping the first tier a keyword appears in
    pub fn keywords(&self) -> Vec<(KeywordTier, &str)> {
        let mut seen = HashSet::new();
        self.keywords
            .iter()
            .filter(|(_, k)| seen.insert(k.to_lowercase()))
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(TalentFitError::Configuration(
                "Category name must not be empty".to_string(),
            ));
        }

        if self.keywords.is_empty() {
            return Err(TalentFitError::Configuration(format!(
                "Category '{}' has no keywords",
                self.name
            )));
        }

        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(TalentFitError::Configuration(format!(
                "Category '{}' has invalid weight {} (must be a positive number)",
                self.name, self.weight
            )));
        }

        if !(0.0..=100.0).contains(&self.threshold) {
            return Err(TalentFitError::Configuration(format!(
                "Category '{}' has threshold {} outside [0, 100]",
                self.name, self.threshold
            )));
        }

        Ok(())
    }
}

/// Fail fast on a category table that would produce meaningless scores
pub fn validate_categories(categories: &[CategoryDefinition]) -> Result<()> {
    if categories.is_empty() {
        return Err(TalentFitError::Configuration(
            "At least one category must be defined".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for category in categories {
        category.validate()?;
        if !names.insert(category.name.trim().to_lowercase()) {
            return Err(TalentFitError::Configuration(format!(
                "Duplicate category name: {}",
                category.name
            )));
        }
    }

    Ok(())
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Category table for the healthcare compliance role shipped as the default job
pub fn default_categories() -> Vec<CategoryDefinition> {
    vec![
        CategoryDefinition::new(
            "Compliance & Risk Management",
            KeywordGroups {
                core: words(&["compliance", "risk"]),
                primary: words(&["governance", "ethics", "framework"]),
                secondary: words(&["sustainability"]),
                phrase: words(&["technical compliance"]),
            },
            1.0,
            DEFAULT_THRESHOLD,
        ),
        CategoryDefinition::new(
            "Digitalization",
            KeywordGroups {
                core: words(&["digitalization", "digital"]),
                primary: words(&["automation", "technology", "innovation", "modernize"]),
                secondary: words(&["software", "tool", "data"]),
                phrase: Vec::new(),
            },
            1.0,
            DEFAULT_THRESHOLD,
        ),
        CategoryDefinition::new(
            "M&A & Due Diligence",
            KeywordGroups {
                core: words(&["merger", "acquisition"]),
                primary: words(&["integration", "transaction"]),
                secondary: Vec::new(),
                phrase: words(&["due diligence"]),
            },
            1.0,
            DEFAULT_THRESHOLD,
        ),
        CategoryDefinition::new(
            "Global Experience",
            KeywordGroups {
                core: words(&["global", "international"]),
                primary: words(&["cross-border", "regional", "collaboration"]),
                secondary: words(&["headquarters"]),
                phrase: Vec::new(),
            },
            1.0,
            DEFAULT_THRESHOLD,
        ),
        CategoryDefinition::new(
            "Project Management",
            KeywordGroups {
                core: words(&["project", "program"]),
                primary: words(&["coordination", "initiative", "implementation"]),
                secondary: words(&["ownership", "priorities"]),
                phrase: words(&["dynamic environment"]),
            },
            1.0,
            DEFAULT_THRESHOLD,
        ),
        CategoryDefinition::new(
            "Training",
            KeywordGroups {
                core: words(&["training", "workshop", "education"]),
                primary: words(&[
                    "teach",
                    "teaching",
                    "instructor",
                    "facilitation",
                    "coaching",
                    "mentor",
                    "mentoring",
                    "curriculum",
                    "upskilling",
                ]),
                secondary: words(&["learning", "development", "onboard", "onboarding"]),
                phrase: words(&[
                    "knowledge exchange",
                    "program design",
                    "skill development",
                    "capacity building",
                    "knowledge transfer",
                    "knowledge sharing",
                    "train the trainer",
                ]),
            },
            1.5,
            DEFAULT_THRESHOLD,
        ),
        CategoryDefinition::new(
            "Regulatory Knowledge",
            KeywordGroups {
                core: words(&["regulation", "regulatory"]),
                primary: words(&["FCPA", "sanctions", "laws", "medtech"]),
                secondary: words(&["compliance", "framework"]),
                phrase: Vec::new(),
            },
            1.0,
            DEFAULT_THRESHOLD,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::text_processor::TextProcessor;

    fn training() -> CategoryDefinition {
        CategoryDefinition::new(
            "Training",
            KeywordGroups {
                core: words(&["training", "workshop"]),
                phrase: words(&["train the trainer", "  "]),
                ..Default::default()
            },
            1.5,
            65.0,
        )
    }

    #[test]
    fn test_default_categories_are_valid() {
        let categories = default_categories();
        assert_eq!(categories.len(), 7);
        assert!(validate_categories(&categories).is_ok());

        let training = categories.iter().find(|c| c.name == "Training").unwrap();
        assert_eq!(training.weight, 1.5);
    }

    #[test]
    fn test_default_keywords_survive_tokenization() {
        let processor = TextProcessor::new();

        for category in default_categories() {
            for (_, keyword) in category.keywords() {
                assert!(
                    !processor.tokenize(keyword).is_empty(),
                    "{} keyword {:?} is all stop words",
                    category.name,
                    keyword
                );
            }
        }
    }

    #[test]
    fn test_blank_keywords_are_skipped() {
        let category = training();
        let keywords: Vec<&str> = category.keywords().into_iter().map(|(_, k)| k).collect();

        assert_eq!(keywords, vec!["training", "workshop", "train the trainer"]);
    }

    #[test]
    fn test_duplicate_keywords_keep_first_tier() {
        let category = CategoryDefinition::new(
            "Regulatory",
            KeywordGroups {
                core: words(&["Compliance"]),
                secondary: words(&["compliance", "laws"]),
                ..Default::default()
            },
            1.0,
            70.0,
        );

        let keywords = category.keywords();
        assert_eq!(keywords.len(), 2);
        assert_eq!(keywords[0], (KeywordTier::Core, "Compliance"));
    }

    #[test]
    fn test_empty_keyword_groups_rejected() {
        let category = CategoryDefinition::new(
            "Empty",
            KeywordGroups {
                core: words(&["", " "]),
                ..Default::default()
            },
            1.0,
            70.0,
        );

        let err = category.validate().unwrap_err();
        assert!(err.to_string().contains("no keywords"));
    }

    #[test]
    fn test_invalid_weight_and_threshold_rejected() {
        let mut category = training();
        category.weight = 0.0;
        assert!(category.validate().is_err());

        category.weight = f64::NAN;
        assert!(category.validate().is_err());

        category.weight = 1.0;
        category.threshold = 120.0;
        assert!(category.validate().is_err());
    }

    #[test]
    fn test_duplicate_category_names_rejected() {
        let categories = vec![training(), training()];
        let err = validate_categories(&categories).unwrap_err();
        assert!(err.to_string().contains("Duplicate category name"));

        assert!(validate_categories(&[]).is_err());
    }
}
