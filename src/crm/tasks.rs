//! Task views and completion toggling
//!
//! Views are plain condition lists evaluated against the task schema, so
//! "overdue" means exactly what `dueDate before now` means to the evaluator.

use crate::core::DataService;
use crate::core::condition::Condition;
use crate::core::error::{EntityError, Result};
use crate::core::evaluator::{CompiledFilter, Evaluator};
use crate::entities::{Task, TaskStatus};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskView {
    #[default]
    All,
    Pending,
    Completed,
    Overdue,
}

crate::string_enum!(TaskView {
    All => "all",
    Pending => "pending",
    Completed => "completed",
    Overdue => "overdue",
});

impl TaskView {
    /// The conditions selecting this view's tasks at the evaluator's time
    pub fn conditions(&self, evaluator: &Evaluator) -> Vec<Condition> {
        match self {
            TaskView::All => Vec::new(),
            TaskView::Pending => vec![Condition::new("status", "equals", "pending")],
            TaskView::Completed => vec![Condition::new("status", "equals", "completed")],
            TaskView::Overdue => vec![
                Condition::new("status", "equals", "pending"),
                Condition::new(
                    "dueDate",
                    "before",
                    evaluator.now().to_rfc3339_opts(SecondsFormat::Millis, true),
                ),
            ],
        }
    }

    pub fn apply(&self, tasks: &[Task], evaluator: &Evaluator) -> Vec<Task> {
        CompiledFilter::<Task>::compile(&self.conditions(evaluator)).apply(tasks, evaluator)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub pending: usize,
    pub completed: usize,
    pub overdue: usize,
    pub total: usize,
}

impl TaskCounts {
    pub fn compute(tasks: &[Task], evaluator: &Evaluator) -> Self {
        let count = |view: TaskView| {
            let filter = CompiledFilter::<Task>::compile(&view.conditions(evaluator));
            tasks.iter().filter(|task| filter.matches(task, evaluator)).count()
        };

        Self {
            pending: count(TaskView::Pending),
            completed: count(TaskView::Completed),
            overdue: count(TaskView::Overdue),
            total: tasks.len(),
        }
    }
}

/// Flip a task between pending and completed
pub async fn toggle_complete(service: &dyn DataService<Task>, id: u64) -> Result<Task> {
    let mut task = service
        .get(id)
        .await?
        .ok_or_else(|| EntityError::not_found("task", id))?;

    task.status = task.status.toggled();
    let updated = service.update(id, task).await?;

    tracing::debug!(entity = "task", id, status = %updated.status, "Task toggled");
    Ok(updated)
}

/// Pending tasks whose due date has passed
pub fn overdue(tasks: &[Task], evaluator: &Evaluator) -> Vec<Task> {
    TaskView::Overdue.apply(tasks, evaluator)
}

pub fn is_completed(task: &Task) -> bool {
    task.status == TaskStatus::Completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryDataService;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn evaluator() -> Evaluator {
        Evaluator::new(Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap())
    }

    fn tasks() -> Vec<Task> {
        let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
        let mut done = Task::new("Send contract", day(1));
        done.status = TaskStatus::Completed;
        vec![
            Task::new("Follow up", day(10)),
            Task::new("Demo", day(20)),
            done,
        ]
    }

    #[test]
    fn test_views() {
        let evaluator = evaluator();
        let titles = |view: TaskView| -> Vec<String> {
            view.apply(&tasks(), &evaluator)
                .into_iter()
                .map(|t| t.title)
                .collect()
        };

        assert_eq!(titles(TaskView::All).len(), 3);
        assert_eq!(titles(TaskView::Pending), vec!["Follow up", "Demo"]);
        assert_eq!(titles(TaskView::Completed), vec!["Send contract"]);
        assert_eq!(titles(TaskView::Overdue), vec!["Follow up"]);
    }

    #[test]
    fn test_overdue_view_agrees_with_task_predicate() {
        let evaluator = evaluator();
        let tasks = tasks();
        let expected: Vec<Task> = tasks
            .iter()
            .filter(|t| t.is_overdue(evaluator.now()))
            .cloned()
            .collect();
        assert_eq!(overdue(&tasks, &evaluator), expected);
    }

    #[test]
    fn test_counts() {
        let counts = TaskCounts::compute(&tasks(), &evaluator());
        assert_eq!(
            counts,
            TaskCounts {
                pending: 2,
                completed: 1,
                overdue: 1,
                total: 3
            }
        );
    }

    #[tokio::test]
    async fn test_toggle_complete_round_trip() {
        let service = InMemoryDataService::with_records(tasks());

        let toggled = toggle_complete(&service, 1).await.unwrap();
        assert!(is_completed(&toggled));

        let toggled = toggle_complete(&service, 1).await.unwrap();
        assert_eq!(toggled.status, TaskStatus::Pending);

        assert!(toggle_complete(&service, 9).await.unwrap_err().is_not_found());
    }

    #[test]
    fn test_view_from_str() {
        assert_eq!("overdue".parse::<TaskView>(), Ok(TaskView::Overdue));
        assert!("later".parse::<TaskView>().is_err());
    }
}
