//! Aggregate statistics over a gradebook snapshot.
//!
//! Every function here is pure: it reads a snapshot (or a slice of grades)
//! and returns plain values. Calling it twice on the same input gives equal
//! output.
//!
//! Percentages are undefined when a maximum score is not positive. Such grades
//! never reach the store, but the functions accept raw slices too, so they
//! report `None` instead of producing NaN.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Grade, StudentId};
use crate::store::Snapshot;

/// `score / max_score * 100`, or `None` when the ratio is undefined.
pub fn percentage(score: f64, max_score: f64) -> Option<f64> {
    if !max_score.is_finite() || max_score <= 0.0 {
        return None;
    }
    let pct = score / max_score * 100.0;
    pct.is_finite().then_some(pct)
}

/// Round to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Head counts and the overall mean percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_students: usize,
    pub total_exams: usize,
    pub total_grades: usize,
    /// Mean of per-grade percentages, rounded to one decimal. `0.0` when there
    /// are no grades.
    pub average_percentage: f64,
}

/// Compute head counts and the mean percentage across all grades.
pub fn overall_stats(snapshot: &Snapshot) -> OverallStats {
    let average = mean_percentage(snapshot.grades()).unwrap_or(0.0);

    OverallStats {
        total_students: snapshot.students().len(),
        total_exams: snapshot.exams().len(),
        total_grades: snapshot.grades().len(),
        average_percentage: round_to_tenth(average),
    }
}

fn mean_percentage<'a>(grades: impl IntoIterator<Item = &'a Grade>) -> Option<f64> {
    let values: Vec<(f64, f64)> = grades
        .into_iter()
        .filter_map(Grade::percentage)
        .map(|pct| (1.0, pct))
        .collect();
    weighted_mean(&values)
}

/// Weighted mean of `(weight, value)` pairs with positive weights.
///
/// Weights and values are scaled by their largest magnitude before summing,
/// so the result is finite whenever every input is, even when the plain sums
/// would overflow.
fn weighted_mean(pairs: &[(f64, f64)]) -> Option<f64> {
    let max_weight = pairs.iter().map(|&(w, _)| w).fold(0.0, f64::max);
    if max_weight <= 0.0 {
        return None;
    }
    let max_value = pairs.iter().map(|&(_, v)| v.abs()).fold(0.0, f64::max);
    if max_value == 0.0 {
        return Some(0.0);
    }

    let (num, den) = pairs.iter().fold((0.0, 0.0), |(num, den), &(w, v)| {
        let w = w / max_weight;
        (num + w * (v / max_value), den + w)
    });
    Some(max_value * (num / den))
}

/// Pooled average for one subject label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectAverage {
    pub subject: String,
    /// Grades that contributed to the sums.
    pub grade_count: usize,
    pub total_score: f64,
    pub total_max_score: f64,
    /// `total_score / total_max_score * 100`, computed without overflowing
    /// even when the sums themselves do; `None` if nothing contributed.
    pub average_percentage: Option<f64>,
}

/// Group grades by exact subject label and compute a ratio-of-sums average
/// for each, in order of first appearance.
///
/// Pooling the sums weights each grade by its maximum score, so a 10-point
/// quiz moves the average less than a 100-point exam.
pub fn subject_averages(grades: &[Grade]) -> Vec<SubjectAverage> {
    let mut order: Vec<SubjectAverage> = Vec::new();
    let mut weighted: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for grade in grades {
        let slot = *index.entry(grade.subject.as_str()).or_insert_with(|| {
            order.push(SubjectAverage {
                subject: grade.subject.clone(),
                grade_count: 0,
                total_score: 0.0,
                total_max_score: 0.0,
                average_percentage: None,
            });
            weighted.push(Vec::new());
            order.len() - 1
        });

        let Some(pct) = grade.percentage() else {
            continue;
        };
        let entry = &mut order[slot];
        entry.grade_count += 1;
        entry.total_score += grade.score;
        entry.total_max_score += grade.max_score;
        // Weighting each percentage by its max score equals the ratio of sums.
        weighted[slot].push((grade.max_score, pct));
    }

    for (entry, pairs) in order.iter_mut().zip(&weighted) {
        entry.average_percentage = weighted_mean(pairs);
    }
    order
}

/// Mean percentage for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAverage {
    pub student_id: StudentId,
    pub name: String,
    /// All grades recorded for the student.
    pub grade_count: usize,
    /// Mean of per-grade percentages; `None` means "no data", which is not
    /// the same as scoring zero.
    pub average_percentage: Option<f64>,
}

impl StudentAverage {
    /// Performance band of the average, if there is one.
    pub fn band(&self) -> Option<GradeBand> {
        self.average_percentage.map(GradeBand::from_percentage)
    }
}

/// Per-student mean-of-ratios averages, in student insertion order.
pub fn student_averages(snapshot: &Snapshot) -> Vec<StudentAverage> {
    let mut per_student: HashMap<&StudentId, Vec<&Grade>> = HashMap::new();
    for grade in snapshot.grades() {
        per_student.entry(&grade.student_id).or_default().push(grade);
    }

    snapshot
        .students()
        .iter()
        .map(|student| {
            let grades = per_student.remove(&student.id).unwrap_or_default();
            StudentAverage {
                student_id: student.id.clone(),
                name: student.name.clone(),
                grade_count: grades.len(),
                average_percentage: mean_percentage(grades),
            }
        })
        .collect()
}

/// Fixed percentage bands used for distribution reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GradeBand {
    /// 90 and above.
    A,
    /// 80 up to 90.
    B,
    /// 70 up to 80.
    C,
    /// 60 up to 70.
    D,
    /// Below 60.
    F,
}

impl GradeBand {
    /// All bands, best first.
    pub const ALL: [GradeBand; 5] = [
        GradeBand::A,
        GradeBand::B,
        GradeBand::C,
        GradeBand::D,
        GradeBand::F,
    ];

    /// Band for a percentage. Lower bounds are inclusive, so exactly 90.0 is
    /// an A. Anything above 100 stays in A and anything below 0 in F.
    pub fn from_percentage(pct: f64) -> Self {
        if pct >= 90.0 {
            GradeBand::A
        } else if pct >= 80.0 {
            GradeBand::B
        } else if pct >= 70.0 {
            GradeBand::C
        } else if pct >= 60.0 {
            GradeBand::D
        } else {
            GradeBand::F
        }
    }

    /// Percentage range as shown to users.
    pub fn range_label(self) -> &'static str {
        match self {
            GradeBand::A => "90-100",
            GradeBand::B => "80-89",
            GradeBand::C => "70-79",
            GradeBand::D => "60-69",
            GradeBand::F => "<60",
        }
    }
}

impl fmt::Display for GradeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.range_label())
    }
}

/// Number of grades in one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandCount {
    pub band: GradeBand,
    pub count: usize,
}

/// Partition of all grades into the five bands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeDistribution {
    /// One entry per band, best first.
    pub bands: Vec<BandCount>,
    /// Grades whose percentage is undefined. Always zero for store snapshots,
    /// since the store refuses grades without a finite percentage.
    pub undefined: usize,
    pub total: usize,
}

impl GradeDistribution {
    pub fn count(&self, band: GradeBand) -> usize {
        self.bands
            .iter()
            .find(|b| b.band == band)
            .map(|b| b.count)
            .unwrap_or(0)
    }

    /// Sum of the five band counts.
    pub fn banded(&self) -> usize {
        self.bands.iter().map(|b| b.count).sum()
    }
}

/// Count grades per band. `banded() + undefined == total` always holds.
pub fn grade_distribution(grades: &[Grade]) -> GradeDistribution {
    let mut counts = [0usize; 5];
    let mut undefined = 0;

    for grade in grades {
        match grade.percentage() {
            Some(pct) => {
                let band = GradeBand::from_percentage(pct);
                counts[band as usize] += 1;
            }
            None => undefined += 1,
        }
    }

    GradeDistribution {
        bands: GradeBand::ALL
            .iter()
            .zip(counts)
            .map(|(&band, count)| BandCount { band, count })
            .collect(),
        undefined,
        total: grades.len(),
    }
}

/// Everything the dashboard shows, computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub overall: OverallStats,
    pub subjects: Vec<SubjectAverage>,
    pub students: Vec<StudentAverage>,
    pub distribution: GradeDistribution,
}

impl Dashboard {
    pub fn compute(snapshot: &Snapshot) -> Self {
        Self {
            overall: overall_stats(snapshot),
            subjects: subject_averages(snapshot.grades()),
            students: student_averages(snapshot),
            distribution: grade_distribution(snapshot.grades()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Student;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn grade(id: &str, student: &str, subject: &str, score: f64, max: f64) -> Grade {
        Grade {
            id: id.into(),
            student_id: student.into(),
            exam_name: "Exam".into(),
            subject: subject.into(),
            score,
            max_score: max,
            date: date(),
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn percentage_handles_zero_max() {
        assert_eq!(percentage(5.0, 0.0), None);
        assert_eq!(percentage(0.0, 0.0), None);
        assert_eq!(percentage(5.0, -1.0), None);
        assert_eq!(percentage(5.0, 10.0), Some(50.0));
    }

    #[test]
    fn round_to_tenth_rounds_half_away() {
        assert!(approx(round_to_tenth(83.25), 83.3));
        assert!(approx(round_to_tenth(54.5454), 54.5));
    }

    #[test]
    fn subject_average_is_ratio_of_sums() {
        let grades = vec![
            grade("1", "a", "X", 50.0, 100.0),
            grade("2", "a", "X", 10.0, 10.0),
        ];
        let subjects = subject_averages(&grades);
        assert_eq!(subjects.len(), 1);
        let avg = subjects[0].average_percentage.unwrap();
        assert!(approx(avg, 60.0 / 110.0 * 100.0));
        assert!(!approx(avg, 75.0));
    }

    #[test]
    fn subjects_keep_first_seen_order_and_exact_labels() {
        let grades = vec![
            grade("1", "a", "Physics", 1.0, 2.0),
            grade("2", "a", "Mathematics", 1.0, 2.0),
            grade("3", "a", "physics", 1.0, 2.0),
        ];
        let labels: Vec<_> = subject_averages(&grades)
            .into_iter()
            .map(|s| s.subject)
            .collect();
        assert_eq!(labels, vec!["Physics", "Mathematics", "physics"]);
    }

    #[test]
    fn subject_with_only_undefined_grades_has_no_average() {
        let grades = vec![grade("1", "a", "Art", 3.0, 0.0)];
        let subjects = subject_averages(&grades);
        assert_eq!(subjects[0].grade_count, 0);
        assert_eq!(subjects[0].average_percentage, None);
    }

    #[test]
    fn huge_scores_do_not_overflow_averages() {
        let grades = vec![
            grade("1", "a", "M", 1e308, 1e308),
            grade("2", "a", "M", 1e308, 1e308),
            grade("3", "a", "M", 0.5e308, 1e308),
        ];
        let subjects = subject_averages(&grades);
        assert!(subjects[0].total_score.is_infinite());
        let avg = subjects[0].average_percentage.unwrap();
        assert!((avg - 250.0 / 3.0).abs() < 1e-9, "got {avg}");

        let near_max = vec![
            grade("1", "a", "M", 1e306, 1.0),
            grade("2", "a", "M", 1e306, 1.0),
        ];
        let pct = mean_percentage(&near_max).unwrap();
        assert!(pct.is_finite());
        assert!((pct / 1e308 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn weighted_mean_matches_plain_formula() {
        let pairs = [(100.0, 50.0), (10.0, 100.0)];
        let mean = weighted_mean(&pairs).unwrap();
        assert!(approx(mean, 6000.0 / 110.0));
        assert_eq!(weighted_mean(&[]), None);
        assert_eq!(weighted_mean(&[(5.0, 0.0)]), Some(0.0));
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(GradeBand::from_percentage(90.0), GradeBand::A);
        assert_eq!(GradeBand::from_percentage(100.0), GradeBand::A);
        assert_eq!(GradeBand::from_percentage(89.999), GradeBand::B);
        assert_eq!(GradeBand::from_percentage(80.0), GradeBand::B);
        assert_eq!(GradeBand::from_percentage(79.99), GradeBand::C);
        assert_eq!(GradeBand::from_percentage(60.0), GradeBand::D);
        assert_eq!(GradeBand::from_percentage(59.9), GradeBand::F);
        assert_eq!(GradeBand::from_percentage(0.0), GradeBand::F);
    }

    #[test]
    fn band_display() {
        assert_eq!(GradeBand::A.to_string(), "A (90-100)");
        assert_eq!(GradeBand::F.to_string(), "F (<60)");
    }

    #[test]
    fn distribution_of_empty_set_is_all_zero() {
        let dist = grade_distribution(&[]);
        assert_eq!(dist.total, 0);
        assert_eq!(dist.banded(), 0);
        assert!(dist.bands.iter().all(|b| b.count == 0));
        assert_eq!(dist.bands.len(), 5);
    }

    #[test]
    fn distribution_is_exhaustive() {
        let grades = vec![
            grade("1", "a", "M", 90.0, 100.0),
            grade("2", "a", "M", 89.999, 100.0),
            grade("3", "a", "M", 45.0, 50.0),
            grade("4", "a", "M", 10.0, 100.0),
            grade("5", "a", "M", 65.0, 100.0),
            grade("6", "a", "M", 1.0, 0.0),
        ];
        let dist = grade_distribution(&grades);
        assert_eq!(dist.count(GradeBand::A), 2);
        assert_eq!(dist.count(GradeBand::B), 1);
        assert_eq!(dist.count(GradeBand::D), 1);
        assert_eq!(dist.count(GradeBand::F), 1);
        assert_eq!(dist.undefined, 1);
        assert_eq!(dist.banded() + dist.undefined, dist.total);
    }

    #[test]
    fn empty_snapshot_overall_average_is_zero() {
        let stats = overall_stats(&Snapshot::empty());
        assert_eq!(stats.total_grades, 0);
        assert_eq!(stats.average_percentage, 0.0);
        assert!(!stats.average_percentage.is_nan());
    }

    #[test]
    fn student_without_grades_reports_no_data() {
        let snap = Snapshot::empty()
            .add_student(Student::new("1", "Alice", "a@example.com", date()))
            .unwrap()
            .add_student(Student::new("2", "Bob", "b@example.com", date()))
            .unwrap()
            .add_grade(grade("g1", "2", "M", 0.0, 100.0))
            .unwrap();

        let averages = student_averages(&snap);
        assert_eq!(averages[0].average_percentage, None);
        assert_eq!(averages[0].band(), None);
        assert_eq!(averages[1].average_percentage, Some(0.0));
        assert_eq!(averages[1].band(), Some(GradeBand::F));
    }

    #[test]
    fn student_average_is_mean_of_ratios() {
        let snap = Snapshot::empty()
            .add_student(Student::new("1", "Alice", "a@example.com", date()))
            .unwrap()
            .add_grade(grade("g1", "1", "M", 50.0, 100.0))
            .unwrap()
            .add_grade(grade("g2", "1", "M", 10.0, 10.0))
            .unwrap();
        let averages = student_averages(&snap);
        assert!(approx(averages[0].average_percentage.unwrap(), 75.0));
        assert_eq!(averages[0].grade_count, 2);
    }

    #[test]
    fn dashboard_is_deterministic() {
        let snap = Snapshot::empty()
            .add_student(Student::new("1", "Alice", "a@example.com", date()))
            .unwrap()
            .add_grade(grade("g1", "1", "M", 85.0, 100.0))
            .unwrap();
        assert_eq!(Dashboard::compute(&snap), Dashboard::compute(&snap));
    }
}
