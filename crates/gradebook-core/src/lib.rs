//! gradebook-core: in-memory gradebook store and grade analytics.
//!
//! This crate owns the student, exam and grade records, the mutation rules
//! that keep them consistent, and the pure statistics computed from them.

pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod statistics;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use model::{
    EntityKind, Exam, ExamId, ExamPatch, Grade, GradeId, GradePatch, Student, StudentId,
    StudentPatch, ValidationError,
};
pub use statistics::{Dashboard, GradeBand};
pub use store::{Gradebook, Snapshot};
