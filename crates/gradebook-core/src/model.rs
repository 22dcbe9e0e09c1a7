//! Core data model types for the gradebook.
//!
//! These are the records the store owns: students, exams and grades, plus the
//! partial-update patches applied to them. Grades carry denormalized copies of
//! the exam name and subject rather than an exam identifier, so editing or
//! deleting an exam never rewrites grade history.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generates a fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Stable identifier of a [`Student`].
    StudentId
);
string_id!(
    /// Stable identifier of an [`Exam`].
    ExamId
);
string_id!(
    /// Stable identifier of a [`Grade`].
    GradeId
);

/// The three record collections held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Student,
    Exam,
    Grade,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Student => write!(f, "student"),
            EntityKind::Exam => write!(f, "exam"),
            EntityKind::Grade => write!(f, "grade"),
        }
    }
}

/// A field constraint violated by a record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required text field is empty or whitespace.
    #[error("{entity} {field} must not be empty")]
    EmptyField {
        entity: EntityKind,
        field: &'static str,
    },

    /// Maximum score is zero, negative or not a finite number.
    #[error("{entity} max score must be a positive number, got {value}")]
    InvalidMaxScore { entity: EntityKind, value: f64 },

    /// Score is negative or not a finite number.
    #[error("grade score must be a non-negative number, got {0}")]
    InvalidScore(f64),

    /// `score / max_score * 100` does not fit in an `f64`.
    #[error("grade percentage of {score}/{max_score} is out of range")]
    PercentageOutOfRange { score: f64, max_score: f64 },
}

fn require_text(
    value: &str,
    entity: EntityKind,
    field: &'static str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { entity, field });
    }
    Ok(())
}

fn require_max_score(value: f64, entity: EntityKind) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidMaxScore { entity, value });
    }
    Ok(())
}

/// An enrolled student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    /// Full display name.
    pub name: String,
    /// Expected to be unique across students, not enforced by the store.
    pub email: String,
    pub enrollment_date: NaiveDate,
}

impl Student {
    pub fn new(
        id: impl Into<StudentId>,
        name: impl Into<String>,
        email: impl Into<String>,
        enrollment_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            enrollment_date,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(self.id.as_str(), EntityKind::Student, "id")?;
        require_text(&self.name, EntityKind::Student, "name")
    }
}

/// A scheduled exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    pub id: ExamId,
    pub name: String,
    /// Free-form subject label, matched exactly when grouping.
    pub subject: String,
    pub max_score: f64,
    pub date: NaiveDate,
    /// Length of the sitting in minutes.
    #[serde(default)]
    pub duration_minutes: u32,
}

impl Exam {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(self.id.as_str(), EntityKind::Exam, "id")?;
        require_text(&self.name, EntityKind::Exam, "name")?;
        require_text(&self.subject, EntityKind::Exam, "subject")?;
        require_max_score(self.max_score, EntityKind::Exam)
    }
}

/// A recorded score for one student on one exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub id: GradeId,
    /// Owning student; checked against the store only when the grade is written.
    pub student_id: StudentId,
    /// Copied from the exam at grading time.
    pub exam_name: String,
    /// Copied from the exam at grading time.
    pub subject: String,
    pub score: f64,
    /// Expected to be at least `score`, not enforced.
    pub max_score: f64,
    pub date: NaiveDate,
}

impl Grade {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(self.id.as_str(), EntityKind::Grade, "id")?;
        require_text(&self.exam_name, EntityKind::Grade, "exam name")?;
        require_text(&self.subject, EntityKind::Grade, "subject")?;
        if !self.score.is_finite() || self.score < 0.0 {
            return Err(ValidationError::InvalidScore(self.score));
        }
        require_max_score(self.max_score, EntityKind::Grade)?;
        if self.percentage().is_none() {
            return Err(ValidationError::PercentageOutOfRange {
                score: self.score,
                max_score: self.max_score,
            });
        }
        Ok(())
    }

    /// Score as a percentage of the maximum, or `None` when the maximum is not
    /// positive or the ratio overflows.
    pub fn percentage(&self) -> Option<f64> {
        crate::statistics::percentage(self.score, self.max_score)
    }
}

/// Partial update for a [`Student`].
///
/// `id` exists only so that a patch naming an identifier can be rejected
/// instead of silently ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudentPatch {
    pub id: Option<StudentId>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub enrollment_date: Option<NaiveDate>,
}

impl StudentPatch {
    /// Returns `student` with every field set in this patch overwritten.
    pub fn apply_to(&self, student: &Student) -> Student {
        Student {
            id: student.id.clone(),
            name: self.name.clone().unwrap_or_else(|| student.name.clone()),
            email: self.email.clone().unwrap_or_else(|| student.email.clone()),
            enrollment_date: self.enrollment_date.unwrap_or(student.enrollment_date),
        }
    }
}

/// Partial update for an [`Exam`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExamPatch {
    pub id: Option<ExamId>,
    pub name: Option<String>,
    pub subject: Option<String>,
    pub max_score: Option<f64>,
    pub date: Option<NaiveDate>,
    pub duration_minutes: Option<u32>,
}

impl ExamPatch {
    pub fn apply_to(&self, exam: &Exam) -> Exam {
        Exam {
            id: exam.id.clone(),
            name: self.name.clone().unwrap_or_else(|| exam.name.clone()),
            subject: self.subject.clone().unwrap_or_else(|| exam.subject.clone()),
            max_score: self.max_score.unwrap_or(exam.max_score),
            date: self.date.unwrap_or(exam.date),
            duration_minutes: self.duration_minutes.unwrap_or(exam.duration_minutes),
        }
    }
}

/// Partial update for a [`Grade`].
///
/// Changing `student_id` re-runs the student reference check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GradePatch {
    pub id: Option<GradeId>,
    pub student_id: Option<StudentId>,
    pub exam_name: Option<String>,
    pub subject: Option<String>,
    pub score: Option<f64>,
    pub max_score: Option<f64>,
    pub date: Option<NaiveDate>,
}

impl GradePatch {
    pub fn apply_to(&self, grade: &Grade) -> Grade {
        Grade {
            id: grade.id.clone(),
            student_id: self
                .student_id
                .clone()
                .unwrap_or_else(|| grade.student_id.clone()),
            exam_name: self
                .exam_name
                .clone()
                .unwrap_or_else(|| grade.exam_name.clone()),
            subject: self.subject.clone().unwrap_or_else(|| grade.subject.clone()),
            score: self.score.unwrap_or(grade.score),
            max_score: self.max_score.unwrap_or(grade.max_score),
            date: self.date.unwrap_or(grade.date),
        }
    }
}
