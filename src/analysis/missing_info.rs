//! Missing-information detection
//!
//! A pitch that never mentions its team, market or finances is flagged
//! before anyone reads the scores. Detection is a case-insensitive keyword
//! search with English and Russian vocabularies; no model is involved.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Product,
    Team,
    Finances,
    Market,
    BusinessModel,
    Traction,
    Competition,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Product,
        Section::Team,
        Section::Finances,
        Section::Market,
        Section::BusinessModel,
        Section::Traction,
        Section::Competition,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Section::Product => "product",
            Section::Team => "team",
            Section::Finances => "finances",
            Section::Market => "market",
            Section::BusinessModel => "business_model",
            Section::Traction => "traction",
            Section::Competition => "competition",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Section::Product => "Product or technology description",
            Section::Team => "Team information",
            Section::Finances => "Financial information",
            Section::Market => "Market information",
            Section::BusinessModel => "Business model",
            Section::Traction => "Traction and progress",
            Section::Competition => "Competitors",
        }
    }

    /// Lowercase keywords; any hit counts the section as present
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Section::Product => &[
                "продукт",
                "product",
                "решение",
                "solution",
                "технология",
                "technology",
            ],
            Section::Team => &[
                "команда",
                "team",
                "основатель",
                "founder",
                "сооснователь",
                "co-founder",
            ],
            Section::Finances => &[
                "финансы",
                "finance",
                "доход",
                "revenue",
                "прибыль",
                "profit",
                "инвестиции",
                "investment",
            ],
            Section::Market => &[
                "рынок",
                "market",
                "аудитория",
                "audience",
                "целевая группа",
                "target",
            ],
            Section::BusinessModel => &[
                "бизнес-модель",
                "business model",
                "монетизация",
                "monetization",
                "доходы",
                "revenue model",
            ],
            Section::Traction => &[
                "тракшн",
                "traction",
                "пользователи",
                "users",
                "клиенты",
                "clients",
                "прогресс",
                "progress",
            ],
            Section::Competition => &[
                "конкуренты",
                "competition",
                "конкуренция",
                "конкурент",
                "competitor",
            ],
        }
    }

    fn mentioned_in(&self, lowered: &str) -> bool {
        self.keywords().iter().any(|kw| lowered.contains(kw))
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingInfo {
    pub section: Section,
    pub description: String,
    pub recommendation: String,
}

impl MissingInfo {
    fn for_section(section: Section) -> Self {
        Self {
            section,
            description: section.description().to_string(),
            recommendation: format!(
                "Add information about: {}",
                section.description().to_lowercase()
            ),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MissingInfoAnalyzer;

impl MissingInfoAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Sections with no keyword hit, in fixed order. Blank text yields nothing.
    pub fn analyze(&self, text: &str) -> Vec<MissingInfo> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let lowered = text.to_lowercase();
        Section::ALL
            .into_iter()
            .filter(|section| !section.mentioned_in(&lowered))
            .map(MissingInfo::for_section)
            .collect()
    }
}
