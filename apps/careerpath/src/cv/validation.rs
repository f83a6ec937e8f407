use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::cv::form::CvForm;

/// Field-keyed validation messages, e.g. `"education[0].degree"` maps to `"Degree is required"`.
pub type FieldErrors = BTreeMap<String, String>;

pub const MSG_SUMMARY_NOT_READY: &str =
    "Please fill in some education, experience, or skills information first";

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern is valid"))
}

/// Validates a CV form before `/generate-cv`. An empty map means valid.
pub fn validate_form(form: &CvForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    require(&mut errors, "name", &form.name, "Name is required");
    if form.email.trim().is_empty() {
        errors.insert("email".to_string(), "Email is required".to_string());
    } else if !email_pattern().is_match(&form.email) {
        errors.insert("email".to_string(), "Invalid email format".to_string());
    }
    require(&mut errors, "phone", &form.phone, "Phone number is required");
    require(&mut errors, "summary", &form.summary, "Summary is required");

    if form.education.is_empty() {
        errors.insert("education".to_string(), "Add at least one education entry".to_string());
    }
    for (i, edu) in form.education.iter().enumerate() {
        for (field, value, message) in [
            ("institution", &edu.institution, "Institution is required"),
            ("degree", &edu.degree, "Degree is required"),
            ("year", &edu.year, "Year is required"),
        ] {
            require(&mut errors, &format!("education[{i}].{field}"), value, message);
        }
    }

    if form.experience.is_empty() {
        errors.insert("experience".to_string(), "Add at least one experience entry".to_string());
    }
    for (i, exp) in form.experience.iter().enumerate() {
        for (field, value, message) in [
            ("company", &exp.company, "Company is required"),
            ("position", &exp.position, "Position is required"),
            ("startDate", &exp.start_date, "Start date is required"),
        ] {
            require(&mut errors, &format!("experience[{i}].{field}"), value, message);
        }
    }

    if form.skills.is_empty() || form.skills.iter().any(|skill| skill.trim().is_empty()) {
        errors.insert("skills".to_string(), "All skills must be filled".to_string());
    }

    errors
}

/// Whether there is enough material for the backend to write a summary:
/// one complete education entry, one complete experience entry, or one skill.
pub fn summary_ready(form: &CvForm) -> bool {
    form.education.iter().any(|edu| edu.is_complete())
        || form.experience.iter().any(|exp| exp.is_complete())
        || form.skills.iter().any(|skill| !skill.trim().is_empty())
}

fn require(errors: &mut FieldErrors, key: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(key.to_string(), message.to_string());
    }
}
