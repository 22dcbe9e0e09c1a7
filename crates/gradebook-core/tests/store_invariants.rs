//! Store integrity and analytics integration tests.
//!
//! Drives the public `Gradebook` API through mixed operation sequences and
//! checks the referential rules and aggregation results after every step.

use chrono::NaiveDate;

use gradebook_core::statistics::{
    grade_distribution, overall_stats, student_averages, subject_averages, GradeBand,
};
use gradebook_core::{
    Dashboard, Exam, ExamPatch, Grade, GradeId, Gradebook, Snapshot, StoreError, Student,
    StudentId, StudentPatch,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn student(id: &str, name: &str) -> Student {
    Student::new(
        id,
        name,
        format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        date(2024, 1, 15),
    )
}

fn grade(id: &str, student_id: &str, subject: &str, score: f64, max_score: f64) -> Grade {
    Grade {
        id: id.into(),
        student_id: student_id.into(),
        exam_name: format!("{subject} exam"),
        subject: subject.into(),
        score,
        max_score,
        date: date(2024, 3, 15),
    }
}

fn assert_no_dangling(snapshot: &Snapshot) {
    for g in snapshot.grades() {
        assert!(
            snapshot.student(&g.student_id).is_some(),
            "grade {} dangles on student {}",
            g.id,
            g.student_id
        );
    }
}

#[test]
fn referential_integrity_holds_across_operation_sequence() {
    let mut book = Gradebook::new();

    for i in 0..6 {
        book.add_student(student(&format!("s{i}"), &format!("Student {i}")))
            .unwrap();
    }

    // Interleave grades, deletes and rejected writes.
    let mut next_grade = 0;
    for round in 0..6 {
        for i in round..6 {
            let id = format!("g{next_grade}");
            next_grade += 1;
            book.add_grade(grade(&id, &format!("s{i}"), "Mathematics", (i * 10) as f64, 100.0))
                .unwrap();
            assert_no_dangling(&book.snapshot());
        }

        let victim = StudentId::from(format!("s{round}"));
        book.delete_student(&victim).unwrap();
        assert_no_dangling(&book.snapshot());

        let err = book
            .add_grade(grade("late", victim.as_str(), "Mathematics", 1.0, 10.0))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidReference { .. }));
        assert_no_dangling(&book.snapshot());
    }

    assert!(book.snapshot().students().is_empty());
    assert!(book.snapshot().grades().is_empty());
}

#[test]
fn cascade_removes_exactly_the_students_grades() {
    let mut book = Gradebook::new();
    book.add_student(student("a", "Alice Johnson")).unwrap();
    book.add_student(student("b", "Bob Smith")).unwrap();
    book.add_grade(grade("1", "a", "Mathematics", 85.0, 100.0)).unwrap();
    book.add_grade(grade("2", "b", "Mathematics", 78.0, 100.0)).unwrap();
    book.add_grade(grade("3", "a", "Physics", 45.0, 50.0)).unwrap();
    book.add_grade(grade("4", "b", "Physics", 88.0, 100.0)).unwrap();

    let before = book.snapshot();
    let owned_by_a = before
        .grades_for_student(&StudentId::from("a"))
        .count();

    let after = book.delete_student(&"a".into()).unwrap();

    assert_eq!(after.grades().len(), before.grades().len() - owned_by_a);
    let remaining: Vec<&str> = after.grades().iter().map(|g| g.id.as_str()).collect();
    assert_eq!(remaining, vec!["2", "4"]);
    assert_eq!(before.grades().len(), 4);
}

#[test]
fn failed_delete_changes_nothing() {
    let mut book = Gradebook::new();
    book.add_student(student("a", "Alice Johnson")).unwrap();
    let before = book.snapshot();

    let err = book.delete_student(&"zzz".into()).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(book.snapshot().students(), before.students());
    assert_eq!(book.revision(), 1);
}

#[test]
fn end_to_end_delete_removes_subject_contribution() {
    let mut book = Gradebook::new();
    book.add_student(student("A", "Ada Lovelace")).unwrap();
    book.add_student(student("B", "Brian Kernighan")).unwrap();
    book.add_grade(grade("g-a", "A", "Math", 80.0, 100.0)).unwrap();
    book.add_grade(grade("g-b", "B", "Math", 40.0, 50.0)).unwrap();

    let with_a = subject_averages(book.snapshot().grades());
    assert_eq!(with_a[0].total_score, 120.0);

    let snapshot = book.delete_student(&"A".into()).unwrap();
    assert!(snapshot.grade(&GradeId::from("g-a")).is_none());

    let math = subject_averages(snapshot.grades());
    assert_eq!(math.len(), 1);
    assert_eq!(math[0].grade_count, 1);
    assert_eq!(math[0].total_score, 40.0);
    assert_eq!(math[0].total_max_score, 50.0);

    let emptied = book.delete_student(&"B".into()).unwrap();
    assert!(subject_averages(emptied.grades()).is_empty());
}

#[test]
fn exam_deletion_does_not_touch_grades() {
    let mut book = Gradebook::new();
    book.add_student(student("1", "Alice Johnson")).unwrap();
    book.add_exam(Exam {
        id: "e1".into(),
        name: "Mathematics exam".into(),
        subject: "Mathematics".into(),
        max_score: 100.0,
        date: date(2024, 3, 15),
        duration_minutes: 120,
    })
    .unwrap();
    book.add_grade(grade("1", "1", "Mathematics", 85.0, 100.0)).unwrap();

    let renamed = ExamPatch {
        name: Some("Renamed".into()),
        subject: Some("Algebra".into()),
        ..Default::default()
    };
    book.update_exam(&"e1".into(), &renamed).unwrap();
    let snapshot = book.snapshot();
    assert_eq!(snapshot.grades()[0].exam_name, "Mathematics exam");
    assert_eq!(snapshot.grades()[0].subject, "Mathematics");

    let snapshot = book.delete_exam(&"e1".into()).unwrap();
    assert!(snapshot.exams().is_empty());
    assert_eq!(snapshot.grades().len(), 1);
}

#[test]
fn update_student_patch_rejects_identifier() {
    let mut book = Gradebook::new();
    book.add_student(student("1", "Alice Johnson")).unwrap();

    let patch: StudentPatch = serde_json::from_str(r#"{"id": "2", "name": "Alice"}"#).unwrap();
    let err = book.update_student(&"1".into(), &patch).unwrap_err();
    assert!(matches!(err, StoreError::ImmutableId { .. }));
    assert_eq!(book.snapshot().students()[0].name, "Alice Johnson");

    let patch: StudentPatch = serde_json::from_str(r#"{"name": "Alice J."}"#).unwrap();
    book.update_student(&"1".into(), &patch).unwrap();
    assert_eq!(book.snapshot().students()[0].name, "Alice J.");
}

#[test]
fn aggregation_is_referentially_transparent() {
    let mut book = Gradebook::new();
    book.add_student(student("1", "Alice Johnson")).unwrap();
    book.add_student(student("2", "Bob Smith")).unwrap();
    book.add_grade(grade("1", "1", "Mathematics", 85.0, 100.0)).unwrap();
    book.add_grade(grade("2", "1", "Mathematics", 45.0, 50.0)).unwrap();
    book.add_grade(grade("3", "2", "Physics", 88.0, 100.0)).unwrap();

    let snapshot = book.snapshot();
    let first = Dashboard::compute(&snapshot);
    book.delete_student(&"1".into()).unwrap();
    let second = Dashboard::compute(&snapshot);

    assert_eq!(first, second);
    assert_ne!(first, Dashboard::compute(&book.snapshot()));
}

#[test]
fn partition_sums_to_grade_count() {
    let mut book = Gradebook::new();
    book.add_student(student("1", "Alice Johnson")).unwrap();
    assert_eq!(grade_distribution(book.snapshot().grades()).banded(), 0);

    let scores = [100.0, 90.0, 89.999, 80.0, 75.5, 70.0, 69.9, 60.0, 59.99, 0.0];
    for (i, score) in scores.iter().enumerate() {
        book.add_grade(grade(&i.to_string(), "1", "Mathematics", *score, 100.0))
            .unwrap();
        let snapshot = book.snapshot();
        let dist = grade_distribution(snapshot.grades());
        assert_eq!(dist.banded(), snapshot.grades().len());
        assert_eq!(dist.undefined, 0);
    }

    let dist = grade_distribution(book.snapshot().grades());
    assert_eq!(dist.count(GradeBand::A), 2);
    assert_eq!(dist.count(GradeBand::B), 2);
    assert_eq!(dist.count(GradeBand::C), 2);
    assert_eq!(dist.count(GradeBand::D), 2);
    assert_eq!(dist.count(GradeBand::F), 2);
}

#[test]
fn empty_state_statistics() {
    let mut book = Gradebook::new();
    book.add_student(student("1", "Alice Johnson")).unwrap();
    let snapshot = book.snapshot();

    let overall = overall_stats(&snapshot);
    assert_eq!(overall.total_students, 1);
    assert_eq!(overall.average_percentage, 0.0);

    let students = student_averages(&snapshot);
    assert_eq!(students[0].grade_count, 0);
    assert_eq!(students[0].average_percentage, None);
}

#[test]
fn overall_average_is_rounded_mean_of_ratios() {
    let mut book = Gradebook::new();
    book.add_student(student("1", "Alice Johnson")).unwrap();
    book.add_grade(grade("1", "1", "Mathematics", 50.0, 100.0)).unwrap();
    book.add_grade(grade("2", "1", "Mathematics", 10.0, 10.0)).unwrap();
    book.add_grade(grade("3", "1", "Physics", 2.0, 3.0)).unwrap();

    // (50 + 100 + 66.666..) / 3 = 72.222..
    assert_eq!(overall_stats(&book.snapshot()).average_percentage, 72.2);

    let subjects = subject_averages(book.snapshot().grades());
    let math = subjects.iter().find(|s| s.subject == "Mathematics").unwrap();
    let pct = math.average_percentage.unwrap();
    assert!((pct - 54.545_454).abs() < 1e-4, "got {pct}");
}
