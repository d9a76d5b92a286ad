use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::{TutorError, TutorResult},
    models::session::Session,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub tutor_id: Uuid,
    pub name: String,
    pub parent_name: String,
    pub parent_email: String,
    pub parent_phone: String,
    pub grade_level: String,
    pub subject: String,
    pub notes: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentInput {
    pub name: String,
    #[serde(default)]
    pub parent_name: String,
    #[serde(default)]
    pub parent_email: String,
    #[serde(default)]
    pub parent_phone: String,
    #[serde(default)]
    pub grade_level: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub notes: String,
}

impl StudentInput {
    /// Trims every field and requires a name.
    pub fn validated(self) -> TutorResult<Self> {
        let input = StudentInput {
            name: self.name.trim().to_string(),
            parent_name: self.parent_name.trim().to_string(),
            parent_email: self.parent_email.trim().to_string(),
            parent_phone: self.parent_phone.trim().to_string(),
            grade_level: self.grade_level.trim().to_string(),
            subject: self.subject.trim().to_string(),
            notes: self.notes.trim().to_string(),
        };
        if input.name.is_empty() {
            return Err(TutorError::Validation("Student name is required".to_string()));
        }
        Ok(input)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentDetailResponse {
    pub student: Student,
    pub sessions: Vec<Session>,
}
