//! Plain-text rendering of payloads and errors for the terminal.

use std::fmt::Write;

use crate::cv::{CvForm, FieldErrors, GeneratedCv};
use crate::errors::ErrorInfo;
use crate::flows::{CareerGuidance, CareerRecommendations, InterviewQuestionSet};

pub trait Render {
    fn render(&self) -> String;
}

fn section(out: &mut String, title: &str, items: &[String]) {
    let _ = writeln!(out, "{title}");
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
}

impl Render for CareerGuidance {
    fn render(&self) -> String {
        let mut out = String::new();
        section(&mut out, "Key skills", &self.key_skills);
        section(&mut out, "Career paths", &self.career_paths);
        section(&mut out, "Certifications", &self.certifications);
        section(&mut out, "Industry trends", &self.industry_trends);
        out
    }
}

impl Render for CareerRecommendations {
    fn render(&self) -> String {
        let mut out = String::new();
        for (i, rec) in self.0.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = writeln!(out, "{}. {}", i + 1, rec.title);
            if !rec.description.is_empty() {
                let _ = writeln!(out, "   {}", rec.description);
            }
            if !rec.skills.is_empty() {
                let _ = writeln!(out, "   Skills: {}", rec.skills.join(", "));
            }
            for (label, value) in [
                ("Education", &rec.education),
                ("Outlook", &rec.outlook),
                ("Salary", &rec.salary),
            ] {
                if !value.is_empty() {
                    let _ = writeln!(out, "   {label}: {value}");
                }
            }
        }
        out
    }
}

impl Render for InterviewQuestionSet {
    fn render(&self) -> String {
        let mut out = String::new();
        for (i, q) in self.questions.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, q.question);
            for tip in &q.tips {
                let _ = writeln!(out, "   tip: {tip}");
            }
        }
        out
    }
}

impl Render for GeneratedCv {
    fn render(&self) -> String {
        format!("CV generated: {}\nDownload: {}\n", self.filename, self.download_url)
    }
}

/// Text preview of the CV before it is generated.
impl Render for CvForm {
    fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.name);
        let _ = writeln!(out, "{} \u{2022} {}", self.email, self.phone);

        let _ = writeln!(out, "\nEDUCATION");
        for edu in &self.education {
            let _ = writeln!(out, "{} ({})", edu.institution, edu.year);
            let _ = writeln!(out, "  {}", edu.degree);
            indented(&mut out, &edu.description);
        }

        let _ = writeln!(out, "\nWORK EXPERIENCE");
        for exp in &self.experience {
            let end = if exp.end_date.trim().is_empty() {
                "Present"
            } else {
                exp.end_date.as_str()
            };
            let _ = writeln!(out, "{} ({} - {})", exp.company, exp.start_date, end);
            let _ = writeln!(out, "  {}", exp.position);
            indented(&mut out, &exp.description);
        }

        let skills: Vec<&str> = self
            .skills
            .iter()
            .map(|skill| skill.trim())
            .filter(|skill| !skill.is_empty())
            .collect();
        let _ = writeln!(out, "\nSKILLS\n{}", skills.join(", "));

        let _ = writeln!(out, "\nPROFESSIONAL SUMMARY\n{}", self.summary);
        out
    }
}

fn indented(out: &mut String, text: &str) {
    for line in text.lines().filter(|line| !line.trim().is_empty()) {
        let _ = writeln!(out, "  {line}");
    }
}

impl Render for ErrorInfo {
    fn render(&self) -> String {
        let hint = if self.retryable { " (you can retry)" } else { "" };
        format!("error [{}]: {}{}", self.kind.as_str(), self.message, hint)
    }
}

impl Render for FieldErrors {
    fn render(&self) -> String {
        let mut out = String::from("The CV form has problems:\n");
        for (field, message) in self {
            let _ = writeln!(out, "  {field}: {message}");
        }
        out
    }
}
