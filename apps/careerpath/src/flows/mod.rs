//! Flow catalogue: one `FlowConfig` per form-to-endpoint pairing.
//!
//! A flow names the endpoint, the JSON field carrying the user's input, the
//! label used in validation messages, and the shape a usable response must
//! have. Controllers are generic over the payload type, and each payload type
//! names its own flow through `FlowPayload`.

pub mod models;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::errors::{ErrorInfo, MSG_INCOMPLETE, MSG_INVALID_FORMAT, MSG_NO_DATA};

pub use models::{
    CareerGuidance, CareerRecommendation, CareerRecommendations, InterviewQuestion,
    InterviewQuestionSet,
};

/// What a successful response body must look like before it is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// A JSON object whose listed fields are all non-empty arrays.
    Object {
        required_fields: &'static [&'static str],
    },
    /// A non-empty top-level JSON array.
    NonEmptyArray,
}

impl ResponseShape {
    /// Checks the raw body against the shape.
    ///
    /// `null` is no data, a wrong top-level type is an invalid format, and
    /// missing or empty required arrays are incomplete data.
    pub fn check(&self, body: &Value) -> Result<(), ErrorInfo> {
        if body.is_null() {
            return Err(ErrorInfo::server(MSG_NO_DATA));
        }

        match self {
            ResponseShape::Object { required_fields } => {
                let Some(object) = body.as_object() else {
                    return Err(ErrorInfo::server(MSG_INVALID_FORMAT));
                };

                let missing: Vec<&str> = required_fields
                    .iter()
                    .copied()
                    .filter(|field| {
                        !object
                            .get(*field)
                            .and_then(Value::as_array)
                            .is_some_and(|items| !items.is_empty())
                    })
                    .collect();

                if !missing.is_empty() {
                    warn!("Response missing required fields: {}", missing.join(", "));
                    return Err(ErrorInfo::server(MSG_INCOMPLETE));
                }
                Ok(())
            }
            ResponseShape::NonEmptyArray => match body.as_array() {
                None => Err(ErrorInfo::server(MSG_INVALID_FORMAT)),
                Some(items) if items.is_empty() => {
                    warn!("Response array is empty");
                    Err(ErrorInfo::server(MSG_INCOMPLETE))
                }
                Some(_) => Ok(()),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowConfig {
    /// Short name used in logs and on the command line.
    pub name: &'static str,
    pub endpoint: &'static str,
    /// JSON field the trimmed input is sent under.
    pub field_name: &'static str,
    /// Human name of the input, e.g. "field of study".
    pub input_label: &'static str,
    /// Shown when the input is blank.
    pub empty_input_message: &'static str,
    pub shape: ResponseShape,
}

pub const GUIDANCE_FIELDS: &[&str] = &["keySkills", "careerPaths", "certifications", "industryTrends"];

impl FlowConfig {
    pub const fn career_guidance() -> Self {
        FlowConfig {
            name: "career-guidance",
            endpoint: "/career_guidance",
            field_name: "program",
            input_label: "field of study",
            empty_input_message: "Please enter a field of study to get career guidance.",
            shape: ResponseShape::Object {
                required_fields: GUIDANCE_FIELDS,
            },
        }
    }

    pub const fn career_recommendations() -> Self {
        FlowConfig {
            name: "recommendations",
            endpoint: "/get_recommendations",
            field_name: "program",
            input_label: "program or field of study",
            empty_input_message: "Please enter a program or field of study.",
            shape: ResponseShape::NonEmptyArray,
        }
    }

    pub const fn interview_questions() -> Self {
        FlowConfig {
            name: "interview-questions",
            endpoint: "/interview-questions",
            field_name: "role",
            input_label: "role",
            empty_input_message: "Please enter a role.",
            shape: ResponseShape::Object {
                required_fields: &["questions"],
            },
        }
    }
}

/// A typed response payload tied to the flow that produces it.
pub trait FlowPayload: DeserializeOwned + Clone + Send + 'static {
    fn flow() -> FlowConfig;
}

impl FlowPayload for CareerGuidance {
    fn flow() -> FlowConfig {
        FlowConfig::career_guidance()
    }
}

impl FlowPayload for CareerRecommendations {
    fn flow() -> FlowConfig {
        FlowConfig::career_recommendations()
    }
}

impl FlowPayload for InterviewQuestionSet {
    fn flow() -> FlowConfig {
        FlowConfig::interview_questions()
    }
}
