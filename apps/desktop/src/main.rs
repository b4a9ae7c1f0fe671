use std::{sync::Arc, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    CollectionTaskRepository, EffectStream, HttpCollectionConfig, HttpDocumentCollection,
    RepositoryConfig, TaskRepository, TaskScreenController, TaskScreenEffect, TaskScreenEvent,
    TasksScreenState,
};
use shared::domain::{Task, TaskId};
use tokio::runtime::Handle;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Task list client for the document store")]
struct Args {
    #[arg(long, env = "TASKS_SERVER_URL", default_value = "http://127.0.0.1:8787")]
    server_url: String,
    #[arg(long, default_value = client_core::http::DEFAULT_COLLECTION)]
    collection: String,
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every task.
    List,
    Add {
        title: String,
        #[arg(default_value = "")]
        body: String,
    },
    Delete {
        task_id: String,
    },
    /// Replace the title and body of an existing task.
    Update {
        task_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();
    let args = Args::parse();

    let collection = HttpDocumentCollection::new(HttpCollectionConfig {
        base_url: args.server_url,
        collection: args.collection,
    })?;
    let repository: Arc<dyn TaskRepository> = Arc::new(CollectionTaskRepository::with_config(
        collection,
        RepositoryConfig {
            call_timeout: Duration::from_secs(args.timeout_secs),
        },
    ));

    let controller = TaskScreenController::new(repository, Handle::current());
    let _subscription = controller.subscribe(|state| {
        debug!(
            loading = state.is_loading,
            tasks = state.tasks.len(),
            "task screen state changed"
        );
    });
    let mut effects = controller.effects();

    match args.command {
        Command::List => controller.send_event(TaskScreenEvent::GetTasks),
        Command::Add { title, body } => {
            controller.send_event(TaskScreenEvent::OnChangeTaskTitle {
                title: title.clone(),
            });
            controller.send_event(TaskScreenEvent::OnChangeTaskBody { body: body.clone() });
            controller.send_event(TaskScreenEvent::AddTask { title, body });
        }
        Command::Delete { task_id } => controller.send_event(TaskScreenEvent::DeleteTask {
            task_id: TaskId::new(task_id),
        }),
        Command::Update {
            task_id,
            title,
            body,
        } => {
            controller.send_event(TaskScreenEvent::GetTasks);
            controller.settle().await;
            print_effects(&mut effects);

            let current = find_task(&controller.state(), &task_id);
            controller.send_event(TaskScreenEvent::OnChangeTaskTitle {
                title: title.unwrap_or_else(|| current.title.clone()),
            });
            controller.send_event(TaskScreenEvent::OnChangeTaskBody {
                body: body.unwrap_or_else(|| current.body.clone()),
            });
            controller.send_event(TaskScreenEvent::SetTaskToBeUpdated { task: current });
            controller.send_event(TaskScreenEvent::UpdateTask);
        }
    }

    controller.settle().await;
    print_effects(&mut effects);
    print_tasks(&controller.state());
    Ok(())
}

/// Falls back to a bare task so the store reports the unknown id.
fn find_task(state: &TasksScreenState, task_id: &str) -> Task {
    state
        .tasks
        .iter()
        .find(|task| task.task_id.as_str() == task_id)
        .cloned()
        .unwrap_or_else(|| Task {
            task_id: TaskId::new(task_id),
            title: String::new(),
            body: String::new(),
            created_at: String::new(),
        })
}

fn print_effects(effects: &mut EffectStream<TaskScreenEffect>) {
    for effect in effects.drain_ready() {
        match effect {
            TaskScreenEffect::ShowSnackBarMessage { message } => eprintln!("{message}"),
        }
    }
}

fn print_tasks(state: &TasksScreenState) {
    if state.tasks.is_empty() {
        println!("(no tasks)");
        return;
    }
    for task in &state.tasks {
        println!("{}  {}  {}", task.task_id, task.created_at, task.title);
        if !task.body.is_empty() {
            println!("    {}", task.body);
        }
    }
}
