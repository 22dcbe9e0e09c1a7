//! Immutable snapshots and the owned store that swaps between them.
//!
//! A [`Snapshot`] never changes after construction. Every mutation builds the
//! next snapshot, copying only the collection it touches and sharing the rest
//! through `Arc`, so a reader holding an older snapshot keeps a consistent view
//! for as long as it likes.
//!
//! Integrity rules enforced here:
//! - identifiers are unique within a collection and never change;
//! - a grade may only be written for a student that exists at that moment;
//! - deleting a student removes that student's grades in the same step;
//! - deleting an exam leaves grades alone (grades copy exam name/subject).

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::model::{
    EntityKind, Exam, ExamId, ExamPatch, Grade, GradeId, GradePatch, Student, StudentId,
    StudentPatch,
};

/// A consistent, read-only view of all three collections.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    students: Arc<Vec<Student>>,
    exams: Arc<Vec<Exam>>,
    grades: Arc<Vec<Grade>>,
}

impl Snapshot {
    /// A snapshot with no records.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Students in insertion order.
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// Exams in insertion order.
    pub fn exams(&self) -> &[Exam] {
        &self.exams
    }

    /// Grades in insertion order.
    pub fn grades(&self) -> &[Grade] {
        &self.grades
    }

    pub fn student(&self, id: &StudentId) -> Option<&Student> {
        self.students.iter().find(|s| &s.id == id)
    }

    pub fn exam(&self, id: &ExamId) -> Option<&Exam> {
        self.exams.iter().find(|e| &e.id == id)
    }

    pub fn grade(&self, id: &GradeId) -> Option<&Grade> {
        self.grades.iter().find(|g| &g.id == id)
    }

    /// Grades owned by one student, in insertion order.
    pub fn grades_for_student<'a>(
        &'a self,
        id: &'a StudentId,
    ) -> impl Iterator<Item = &'a Grade> + 'a {
        self.grades.iter().filter(move |g| &g.student_id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty() && self.exams.is_empty() && self.grades.is_empty()
    }

    // --- Students ---

    /// Inserts a student.
    pub fn add_student(&self, student: Student) -> StoreResult<Snapshot> {
        student.validate()?;
        if self.student(&student.id).is_some() {
            return Err(StoreError::duplicate(EntityKind::Student, &student.id));
        }

        debug!(student_id = %student.id, "student added");
        let mut students = Vec::clone(&self.students);
        students.push(student);
        Ok(Snapshot {
            students: Arc::new(students),
            ..self.clone()
        })
    }

    /// Merges `patch` into an existing student.
    pub fn update_student(&self, id: &StudentId, patch: &StudentPatch) -> StoreResult<Snapshot> {
        if patch.id.is_some() {
            return Err(StoreError::immutable(EntityKind::Student, id));
        }
        let index = self
            .students
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Student, id))?;

        let updated = patch.apply_to(&self.students[index]);
        updated.validate()?;

        debug!(student_id = %id, "student updated");
        let mut students = Vec::clone(&self.students);
        students[index] = updated;
        Ok(Snapshot {
            students: Arc::new(students),
            ..self.clone()
        })
    }

    /// Removes a student together with every grade that references it.
    pub fn delete_student(&self, id: &StudentId) -> StoreResult<Snapshot> {
        if self.student(id).is_none() {
            return Err(StoreError::not_found(EntityKind::Student, id));
        }

        let students: Vec<Student> = self
            .students
            .iter()
            .filter(|s| &s.id != id)
            .cloned()
            .collect();
        let grades: Vec<Grade> = self
            .grades
            .iter()
            .filter(|g| &g.student_id != id)
            .cloned()
            .collect();

        debug!(
            student_id = %id,
            grades_removed = self.grades.len() - grades.len(),
            "student deleted"
        );
        Ok(Snapshot {
            students: Arc::new(students),
            exams: Arc::clone(&self.exams),
            grades: Arc::new(grades),
        })
    }

    // --- Exams ---

    pub fn add_exam(&self, exam: Exam) -> StoreResult<Snapshot> {
        exam.validate()?;
        if self.exam(&exam.id).is_some() {
            return Err(StoreError::duplicate(EntityKind::Exam, &exam.id));
        }

        debug!(exam_id = %exam.id, subject = %exam.subject, "exam added");
        let mut exams = Vec::clone(&self.exams);
        exams.push(exam);
        Ok(Snapshot {
            exams: Arc::new(exams),
            ..self.clone()
        })
    }

    pub fn update_exam(&self, id: &ExamId, patch: &ExamPatch) -> StoreResult<Snapshot> {
        if patch.id.is_some() {
            return Err(StoreError::immutable(EntityKind::Exam, id));
        }
        let index = self
            .exams
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Exam, id))?;

        let updated = patch.apply_to(&self.exams[index]);
        updated.validate()?;

        debug!(exam_id = %id, "exam updated");
        let mut exams = Vec::clone(&self.exams);
        exams[index] = updated;
        Ok(Snapshot {
            exams: Arc::new(exams),
            ..self.clone()
        })
    }

    /// Removes an exam. Grades recorded against it are kept.
    pub fn delete_exam(&self, id: &ExamId) -> StoreResult<Snapshot> {
        if self.exam(id).is_none() {
            return Err(StoreError::not_found(EntityKind::Exam, id));
        }

        debug!(exam_id = %id, "exam deleted");
        let exams: Vec<Exam> = self.exams.iter().filter(|e| &e.id != id).cloned().collect();
        Ok(Snapshot {
            exams: Arc::new(exams),
            ..self.clone()
        })
    }

    // --- Grades ---

    /// Inserts a grade after checking its student exists.
    pub fn add_grade(&self, grade: Grade) -> StoreResult<Snapshot> {
        grade.validate()?;
        if self.grade(&grade.id).is_some() {
            return Err(StoreError::duplicate(EntityKind::Grade, &grade.id));
        }
        self.check_student_reference(&grade)?;

        debug!(grade_id = %grade.id, student_id = %grade.student_id, "grade added");
        let mut grades = Vec::clone(&self.grades);
        grades.push(grade);
        Ok(Snapshot {
            grades: Arc::new(grades),
            ..self.clone()
        })
    }

    /// Merges `patch` into an existing grade.
    pub fn update_grade(&self, id: &GradeId, patch: &GradePatch) -> StoreResult<Snapshot> {
        if patch.id.is_some() {
            return Err(StoreError::immutable(EntityKind::Grade, id));
        }
        let index = self
            .grades
            .iter()
            .position(|g| &g.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Grade, id))?;

        let updated = patch.apply_to(&self.grades[index]);
        updated.validate()?;
        if patch.student_id.is_some() {
            self.check_student_reference(&updated)?;
        }

        debug!(grade_id = %id, "grade updated");
        let mut grades = Vec::clone(&self.grades);
        grades[index] = updated;
        Ok(Snapshot {
            grades: Arc::new(grades),
            ..self.clone()
        })
    }

    pub fn delete_grade(&self, id: &GradeId) -> StoreResult<Snapshot> {
        if self.grade(id).is_none() {
            return Err(StoreError::not_found(EntityKind::Grade, id));
        }

        debug!(grade_id = %id, "grade deleted");
        let grades: Vec<Grade> = self.grades.iter().filter(|g| &g.id != id).cloned().collect();
        Ok(Snapshot {
            grades: Arc::new(grades),
            ..self.clone()
        })
    }

    fn check_student_reference(&self, grade: &Grade) -> StoreResult<()> {
        if self.student(&grade.student_id).is_none() {
            return Err(StoreError::InvalidReference {
                grade_id: grade.id.clone(),
                student_id: grade.student_id.clone(),
            });
        }
        Ok(())
    }
}

/// Owned gradebook state.
///
/// Holds the current snapshot and replaces it wholesale on every successful
/// mutation. Handing out `Arc<Snapshot>` lets renderers keep reading a version
/// while the owner moves on.
#[derive(Debug, Clone, Default)]
pub struct Gradebook {
    current: Arc<Snapshot>,
    revision: u64,
}

impl Gradebook {
    /// An empty gradebook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing snapshot, e.g. one produced by the loader.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            current: Arc::new(snapshot),
            revision: 0,
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current)
    }

    /// Number of successful mutations applied since construction.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn add_student(&mut self, student: Student) -> StoreResult<Arc<Snapshot>> {
        self.apply("add_student", |s| s.add_student(student))
    }

    pub fn update_student(
        &mut self,
        id: &StudentId,
        patch: &StudentPatch,
    ) -> StoreResult<Arc<Snapshot>> {
        self.apply("update_student", |s| s.update_student(id, patch))
    }

    pub fn delete_student(&mut self, id: &StudentId) -> StoreResult<Arc<Snapshot>> {
        self.apply("delete_student", |s| s.delete_student(id))
    }

    pub fn add_exam(&mut self, exam: Exam) -> StoreResult<Arc<Snapshot>> {
        self.apply("add_exam", |s| s.add_exam(exam))
    }

    pub fn update_exam(&mut self, id: &ExamId, patch: &ExamPatch) -> StoreResult<Arc<Snapshot>> {
        self.apply("update_exam", |s| s.update_exam(id, patch))
    }

    pub fn delete_exam(&mut self, id: &ExamId) -> StoreResult<Arc<Snapshot>> {
        self.apply("delete_exam", |s| s.delete_exam(id))
    }

    pub fn add_grade(&mut self, grade: Grade) -> StoreResult<Arc<Snapshot>> {
        self.apply("add_grade", |s| s.add_grade(grade))
    }

    pub fn update_grade(
        &mut self,
        id: &GradeId,
        patch: &GradePatch,
    ) -> StoreResult<Arc<Snapshot>> {
        self.apply("update_grade", |s| s.update_grade(id, patch))
    }

    pub fn delete_grade(&mut self, id: &GradeId) -> StoreResult<Arc<Snapshot>> {
        self.apply("delete_grade", |s| s.delete_grade(id))
    }

    fn apply(
        &mut self,
        operation: &'static str,
        op: impl FnOnce(&Snapshot) -> StoreResult<Snapshot>,
    ) -> StoreResult<Arc<Snapshot>> {
        match op(&self.current) {
            Ok(next) => {
                self.current = Arc::new(next);
                self.revision += 1;
                Ok(self.snapshot())
            }
            Err(e) => {
                warn!(operation, error = %e, "mutation rejected");
                Err(e)
            }
        }
    }
}
