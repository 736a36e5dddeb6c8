//! Command-line client for TaskDeck
//!
//! Composition root: builds the HTTP client, session store and task store
//! from environment config and threads them through the commands. Errors
//! recorded by the stores are presented here.

mod config;

use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use td_client::auth::{AuthApi, SessionState, SessionStore};
use td_client::http::ApiClient;
use td_client::storage::FileCredentialStore;
use td_client::tasks::{TaskApi, TaskStore};
use td_core::auth::{LoginData, RegisterData};
use td_core::task::{CreateTaskData, Task, TaskFilter, TaskPriority, TaskStatus, UpdateTaskData};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "taskdeck", about = "Task management from the terminal", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and start a session
    Register {
        email: String,
        password: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Start a session
    Login { email: String, password: String },
    /// End the current session
    Logout,
    /// Show the signed-in user
    Whoami {
        /// Re-fetch the profile from the backend
        #[arg(long)]
        remote: bool,
    },
    /// Rotate the access token
    Refresh,
    /// List tasks
    List {
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a single task
    Show { id: String },
    /// Create a task
    Create {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        /// Due date, RFC 3339 (e.g. 2024-06-01T12:00:00Z)
        #[arg(long)]
        due: Option<DateTime<Utc>>,
    },
    /// Update fields of a task
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        /// Due date, RFC 3339
        #[arg(long)]
        due: Option<DateTime<Utc>>,
    },
    /// Delete a task
    Delete { id: String },
    /// Mark a task completed
    Complete { id: String },
    /// Mark a task in progress
    Start { id: String },
    /// Mark a task pending again
    Reopen { id: String },
    /// Archive a task
    Archive { id: String },
}

struct App {
    session: SessionStore,
    tasks: TaskStore,
    task_api: TaskApi,
}

impl App {
    fn new(config: &Config) -> Self {
        let client = ApiClient::new(config.api_url.clone());
        let storage = Arc::new(FileCredentialStore::new(config.credentials_path()));
        let task_api = TaskApi::new(client.clone());
        Self {
            session: SessionStore::new(AuthApi::new(client), storage),
            tasks: TaskStore::new(task_api.clone()),
            task_api,
        }
    }

    async fn require_token(&self) -> anyhow::Result<String> {
        match self.session.access_token().await {
            Some(token) => Ok(token),
            None => bail!("Not logged in. Run 'taskdeck login <email> <password>' first."),
        }
    }
}

fn print_task_row(task: &Task) {
    let due = task
        .due_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:<24} {:<12} {:<8} {:<12} {}",
        task.id,
        task.status.as_str(),
        task.priority.as_str(),
        due,
        task.title
    );
}

fn print_task_detail(task: &Task) {
    println!("id:          {}", task.id);
    println!("title:       {}", task.title);
    println!("status:      {}", task.status.as_str());
    println!("priority:    {}", task.priority.as_str());
    if let Some(description) = &task.description {
        println!("description: {}", description);
    }
    if let Some(due) = task.due_date {
        println!("due:         {}", due.to_rfc3339());
    }
    if let Some(completed) = task.completed_at {
        println!("completed:   {}", completed.to_rfc3339());
    }
    println!("created:     {}", task.created_at.to_rfc3339());
    println!("updated:     {}", task.updated_at.to_rfc3339());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "td_cli=info,td_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    tracing::debug!("Using data directory: {:?}", config.data_dir);
    let app = App::new(&config);
    app.session.restore().await;

    match cli.command {
        Commands::Register {
            email,
            password,
            first_name,
            last_name,
        } => {
            let mut data = RegisterData::new(email, password);
            if let Some(first_name) = first_name {
                data = data.with_first_name(first_name);
            }
            if let Some(last_name) = last_name {
                data = data.with_last_name(last_name);
            }
            let user = app.session.register(&data).await?;
            println!("Registered and logged in as {}", user.display_name());
        }
        Commands::Login { email, password } => {
            let user = app.session.login(&LoginData::new(email, password)).await?;
            println!("Logged in as {}", user.display_name());
        }
        Commands::Logout => {
            app.session.logout().await;
            println!("Logged out");
        }
        Commands::Whoami { remote } => {
            if app.session.state().await != SessionState::Authenticated {
                bail!("Not logged in");
            }
            let user = if remote {
                app.session.fetch_profile().await?
            } else {
                app.session.user().await.context("No user in session")?
            };
            println!("{} <{}>", user.display_name(), user.email);
        }
        Commands::Refresh => {
            app.session.refresh_token().await?;
            println!("Access token refreshed");
        }
        Commands::List {
            status,
            priority,
            search,
        } => {
            let token = app.require_token().await?;
            let filter = TaskFilter {
                status,
                priority,
                search,
            };
            let filter = (filter != TaskFilter::default()).then_some(filter);
            app.tasks.fetch_tasks(&token, filter.as_ref()).await;
            if let Some(err) = app.tasks.error().await {
                bail!(err);
            }
            let tasks = app.tasks.tasks().await;
            if tasks.is_empty() {
                println!("No tasks");
            } else {
                for task in &tasks {
                    print_task_row(task);
                }
            }
        }
        Commands::Show { id } => {
            let token = app.require_token().await?;
            let task = app.task_api.get(&token, &id).await?;
            print_task_detail(&task);
        }
        Commands::Create {
            title,
            description,
            priority,
            due,
        } => {
            let token = app.require_token().await?;
            let mut data = CreateTaskData::new(title);
            if let Some(description) = description {
                data = data.with_description(description);
            }
            if let Some(priority) = priority {
                data = data.with_priority(priority);
            }
            if let Some(due) = due {
                data = data.with_due_date(due);
            }
            let task = app.tasks.create_task(&token, &data).await?;
            println!("Created task {}", task.id);
        }
        Commands::Update {
            id,
            title,
            description,
            status,
            priority,
            due,
        } => {
            let token = app.require_token().await?;
            let updates = UpdateTaskData {
                title,
                description,
                status,
                priority,
                due_date: due,
            };
            if updates.is_empty() {
                bail!("Nothing to update; pass at least one of --title, --description, --status, --priority, --due");
            }
            let task = app.tasks.update_task(&token, &id, &updates).await?;
            print_task_detail(&task);
        }
        Commands::Delete { id } => {
            let token = app.require_token().await?;
            app.tasks.delete_task(&token, &id).await?;
            println!("Deleted task {}", id);
        }
        Commands::Complete { id } => {
            let token = app.require_token().await?;
            let task = app.tasks.mark_completed(&token, &id).await?;
            print_task_detail(&task);
        }
        Commands::Start { id } => {
            let token = app.require_token().await?;
            let task = app.tasks.mark_in_progress(&token, &id).await?;
            print_task_detail(&task);
        }
        Commands::Reopen { id } => {
            let token = app.require_token().await?;
            let task = app.tasks.mark_pending(&token, &id).await?;
            print_task_detail(&task);
        }
        Commands::Archive { id } => {
            let token = app.require_token().await?;
            let task = app.tasks.archive_task(&token, &id).await?;
            print_task_detail(&task);
        }
    }

    Ok(())
}
