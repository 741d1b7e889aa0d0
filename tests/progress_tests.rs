use chrono::NaiveDate;
use site_schedule::{Task, TaskStatus, calculate_project_progress, status_counts};

fn task(id: &str, status: TaskStatus) -> Task {
    Task::new(id, id, NaiveDate::from_ymd_opt(2025, 8, 4).unwrap(), 2).with_status(status)
}

#[test]
fn weighted_rollup_rounds_to_nearest_percent() {
    let tasks = vec![
        task("a", TaskStatus::Completed),
        task("b", TaskStatus::Completed),
        task("c", TaskStatus::InProgress),
        task("d", TaskStatus::NotStarted),
    ];
    assert_eq!(calculate_project_progress(&tasks), 63);
}

#[test]
fn empty_list_is_zero_percent() {
    assert_eq!(calculate_project_progress(&[]), 0);
    assert_eq!(status_counts(&[]).total(), 0);
}

#[test]
fn in_progress_only_is_half_done() {
    let tasks = vec![task("a", TaskStatus::InProgress), task("b", TaskStatus::InProgress)];
    assert_eq!(calculate_project_progress(&tasks), 50);
}

#[test]
fn one_of_three_completed_rounds_down() {
    let tasks = vec![
        task("a", TaskStatus::Completed),
        task("b", TaskStatus::NotStarted),
        task("c", TaskStatus::NotStarted),
    ];
    assert_eq!(calculate_project_progress(&tasks), 33);
}
