use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationItem {
    pub institution: String,
    pub degree: String,
    pub year: String,
    pub description: String,
}

impl EducationItem {
    /// Institution, degree and year all filled in.
    pub fn is_complete(&self) -> bool {
        !self.institution.trim().is_empty()
            && !self.degree.trim().is_empty()
            && !self.year.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceItem {
    pub company: String,
    pub position: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

impl ExperienceItem {
    /// Company, position and start date all filled in.
    pub fn is_complete(&self) -> bool {
        !self.company.trim().is_empty()
            && !self.position.trim().is_empty()
            && !self.start_date.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EducationField {
    Institution,
    Degree,
    Year,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceField {
    Company,
    Position,
    StartDate,
    EndDate,
    Description,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormEditError {
    #[error("{list} item {index} does not exist (list has {len} items)")]
    OutOfRange {
        list: &'static str,
        index: usize,
        len: usize,
    },
}

/// The CV form sent as-is to `/generate-cv` and `/generate-summary`.
///
/// Every list keeps at least one item: new forms start with one blank entry
/// per list, removing the last entry is refused, and a missing or empty list
/// in JSON reads back as one blank entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default = "blank_education", deserialize_with = "at_least_one")]
    pub education: Vec<EducationItem>,
    #[serde(default = "blank_experience", deserialize_with = "at_least_one")]
    pub experience: Vec<ExperienceItem>,
    #[serde(default = "blank_skills", deserialize_with = "at_least_one")]
    pub skills: Vec<String>,
}

fn blank_education() -> Vec<EducationItem> {
    vec![EducationItem::default()]
}

fn blank_experience() -> Vec<ExperienceItem> {
    vec![ExperienceItem::default()]
}

fn blank_skills() -> Vec<String> {
    vec![String::new()]
}

fn at_least_one<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let mut items = Vec::<T>::deserialize(deserializer)?;
    if items.is_empty() {
        items.push(T::default());
    }
    Ok(items)
}

impl Default for CvForm {
    fn default() -> Self {
        Self::new()
    }
}

impl CvForm {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            summary: String::new(),
            education: blank_education(),
            experience: blank_experience(),
            skills: blank_skills(),
        }
    }

    pub fn add_education(&mut self) {
        self.education.push(EducationItem::default());
    }

    pub fn add_experience(&mut self) {
        self.experience.push(ExperienceItem::default());
    }

    pub fn add_skill(&mut self) {
        self.skills.push(String::new());
    }

    /// Removes an education entry. Returns `false` when it is the only one.
    pub fn remove_education(&mut self, index: usize) -> Result<bool, FormEditError> {
        remove_keeping_one(&mut self.education, "education", index)
    }

    pub fn remove_experience(&mut self, index: usize) -> Result<bool, FormEditError> {
        remove_keeping_one(&mut self.experience, "experience", index)
    }

    pub fn remove_skill(&mut self, index: usize) -> Result<bool, FormEditError> {
        remove_keeping_one(&mut self.skills, "skills", index)
    }

    pub fn set_education(
        &mut self,
        index: usize,
        field: EducationField,
        value: impl Into<String>,
    ) -> Result<(), FormEditError> {
        let len = self.education.len();
        let item = self
            .education
            .get_mut(index)
            .ok_or(FormEditError::OutOfRange {
                list: "education",
                index,
                len,
            })?;
        let slot = match field {
            EducationField::Institution => &mut item.institution,
            EducationField::Degree => &mut item.degree,
            EducationField::Year => &mut item.year,
            EducationField::Description => &mut item.description,
        };
        *slot = value.into();
        Ok(())
    }

    pub fn set_experience(
        &mut self,
        index: usize,
        field: ExperienceField,
        value: impl Into<String>,
    ) -> Result<(), FormEditError> {
        let len = self.experience.len();
        let item = self
            .experience
            .get_mut(index)
            .ok_or(FormEditError::OutOfRange {
                list: "experience",
                index,
                len,
            })?;
        let slot = match field {
            ExperienceField::Company => &mut item.company,
            ExperienceField::Position => &mut item.position,
            ExperienceField::StartDate => &mut item.start_date,
            ExperienceField::EndDate => &mut item.end_date,
            ExperienceField::Description => &mut item.description,
        };
        *slot = value.into();
        Ok(())
    }

    pub fn set_skill(&mut self, index: usize, value: impl Into<String>) -> Result<(), FormEditError> {
        let len = self.skills.len();
        let skill = self.skills.get_mut(index).ok_or(FormEditError::OutOfRange {
            list: "skills",
            index,
            len,
        })?;
        *skill = value.into();
        Ok(())
    }

    /// Stores a generated summary in the form.
    pub fn apply_summary(&mut self, summary: impl Into<String>) {
        self.summary = summary.into();
    }
}

fn remove_keeping_one<T>(
    items: &mut Vec<T>,
    list: &'static str,
    index: usize,
) -> Result<bool, FormEditError> {
    if index >= items.len() {
        return Err(FormEditError::OutOfRange {
            list,
            index,
            len: items.len(),
        });
    }
    if items.len() == 1 {
        return Ok(false);
    }
    items.remove(index);
    Ok(true)
}
