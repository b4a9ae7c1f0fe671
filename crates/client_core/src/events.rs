use shared::domain::{Task, TaskId};

/// Input to the task screen reducer, produced by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskScreenEvent {
    GetTasks,
    AddTask { title: String, body: String },
    /// Saves the text fields into `task_to_be_updated`.
    UpdateTask,
    DeleteTask { task_id: TaskId },
    OnChangeTaskTitle { title: String },
    OnChangeTaskBody { body: String },
    OnChangeAddTaskDialogState { show: bool },
    OnChangeUpdateTaskDialogState { show: bool },
    SetTaskToBeUpdated { task: Task },
}

impl TaskScreenEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetTasks => "get_tasks",
            Self::AddTask { .. } => "add_task",
            Self::UpdateTask => "update_task",
            Self::DeleteTask { .. } => "delete_task",
            Self::OnChangeTaskTitle { .. } => "on_change_task_title",
            Self::OnChangeTaskBody { .. } => "on_change_task_body",
            Self::OnChangeAddTaskDialogState { .. } => "on_change_add_task_dialog_state",
            Self::OnChangeUpdateTaskDialogState { .. } => "on_change_update_task_dialog_state",
            Self::SetTaskToBeUpdated { .. } => "set_task_to_be_updated",
        }
    }
}

/// Transient notification for one-time presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskScreenEffect {
    ShowSnackBarMessage { message: String },
}

impl TaskScreenEffect {
    pub fn snack_bar(message: impl Into<String>) -> Self {
        Self::ShowSnackBarMessage {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::ShowSnackBarMessage { message } => message,
        }
    }
}
