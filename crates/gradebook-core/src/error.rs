//! Store error types.
//!
//! Every variant describes a mutation that was refused. A refused mutation
//! never changes the store, so callers can report the error and keep going.

use thiserror::Error;

use crate::model::{EntityKind, GradeId, StudentId, ValidationError};

/// Errors returned by store mutations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Insert with an identifier that is already present.
    #[error("{entity} with id `{id}` already exists")]
    DuplicateId { entity: EntityKind, id: String },

    /// The targeted identifier does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    /// A grade names a student that is not in the store.
    #[error("grade `{grade_id}` references unknown student `{student_id}`")]
    InvalidReference {
        grade_id: GradeId,
        student_id: StudentId,
    },

    /// A patch tried to set the record identifier.
    #[error("{entity} `{id}` cannot change its id")]
    ImmutableId { entity: EntityKind, id: String },

    /// The record violates a field constraint.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl StoreError {
    pub(crate) fn duplicate(entity: EntityKind, id: impl ToString) -> Self {
        StoreError::DuplicateId {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn immutable(entity: EntityKind, id: impl ToString) -> Self {
        StoreError::ImmutableId {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns `true` if the error is a missing-identifier failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// The collection the failed operation targeted.
    pub fn entity(&self) -> EntityKind {
        match self {
            StoreError::DuplicateId { entity, .. }
            | StoreError::NotFound { entity, .. }
            | StoreError::ImmutableId { entity, .. } => *entity,
            StoreError::InvalidReference { .. } => EntityKind::Grade,
            StoreError::Validation(err) => match err {
                ValidationError::EmptyField { entity, .. }
                | ValidationError::InvalidMaxScore { entity, .. } => *entity,
                ValidationError::InvalidScore(_) | ValidationError::PercentageOutOfRange { .. } => {
                    EntityKind::Grade
                }
            },
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_entity() {
        let err = StoreError::not_found(EntityKind::Exam, "7");
        assert_eq!(err.to_string(), "exam not found: 7");
        assert!(err.is_not_found());
    }

    #[test]
    fn invalid_reference_belongs_to_grades() {
        let err = StoreError::InvalidReference {
            grade_id: "g1".into(),
            student_id: "ghost".into(),
        };
        assert_eq!(err.entity(), EntityKind::Grade);
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn validation_errors_convert() {
        let err: StoreError = ValidationError::InvalidScore(-1.0).into();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(err.entity(), EntityKind::Grade);
    }
}
