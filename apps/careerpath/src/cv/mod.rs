//! CV builder: form bookkeeping, local validation, and the generation calls.

pub mod client;
pub mod form;
pub mod store;
pub mod validation;

pub use client::{CvClient, CvError, GeneratedCv};
pub use form::{CvForm, EducationField, EducationItem, ExperienceField, ExperienceItem, FormEditError};
pub use store::{load_form, save_form};
pub use validation::{summary_ready, validate_form, FieldErrors};
