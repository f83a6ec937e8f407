use serde::{Deserialize, Serialize};

/// Response of `/career_guidance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerGuidance {
    pub key_skills: Vec<String>,
    pub career_paths: Vec<String>,
    pub certifications: Vec<String>,
    pub industry_trends: Vec<String>,
}

/// One card of `/get_recommendations`. Only the title is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerRecommendation {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub outlook: String,
    #[serde(default)]
    pub salary: String,
}

/// `/get_recommendations` answers with a bare array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CareerRecommendations(pub Vec<CareerRecommendation>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    #[serde(default)]
    pub tips: Vec<String>,
}

/// Response of `/interview-questions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewQuestionSet {
    pub questions: Vec<InterviewQuestion>,
}
