use shared::domain::Task;

/// Everything the task screen renders. Never mutated in place: each change
/// produces a full copy via struct update syntax.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TasksScreenState {
    pub is_loading: bool,
    pub tasks: Vec<Task>,
    pub error_message: Option<String>,
    pub task_to_be_updated: Option<Task>,
    pub is_show_add_task_dialog: bool,
    pub is_show_update_task_dialog: bool,
    pub current_text_field_title: String,
    pub current_text_field_body: String,
}
