use serde::{Deserialize, Serialize};
use std::fmt;

use crate::iland_api::session::SessionLink;
use crate::iland_api::types::IlandError;

/// Lifecycle state of a server-side task
///
/// `queued -> running -> {success | error | cancelled | waiting-on-user-input}`.
/// Strings the SDK does not know decode as `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Queued,
    Running,
    Success,
    Error,
    Cancelled,
    WaitingOnUserInput,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Running => "running",
            TaskStatus::Success => "success",
            TaskStatus::Error => "error",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::WaitingOnUserInput => "waiting-on-user-input",
            TaskStatus::Unknown => "unknown",
        }
    }

    /// True once the task can no longer make progress on its own
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Success
                | TaskStatus::Error
                | TaskStatus::Cancelled
                | TaskStatus::WaitingOnUserInput
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asynchronous server-side operation started by a mutation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    #[serde(skip)]
    pub(crate) link: SessionLink,
    pub uuid: String,
    pub entity_uuid: String,
    pub status: TaskStatus,
    pub progress: i64,
    pub active: bool,
    pub synchronized: bool,
    pub message: String,
    pub task_type: String,
    pub operation: String,
    #[serde(rename = "operation_description")]
    pub description: String,
    pub location_id: String,
    pub org_uuid: String,
    #[serde(rename = "task_id")]
    pub vcloud_task_id: String,
    pub username: String,
    pub initiation_time: i64,
    pub start_time: i64,
    pub end_time: i64,
}

impl Task {
    fn path(&self) -> String {
        format!("/task/{}/{}", self.location_id, self.uuid)
    }

    /// True when the server reports the task as no longer active and
    /// synchronized with the backing platform.
    pub fn is_complete(&self) -> bool {
        !self.active && self.synchronized
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Fetch the current state of this task.
    pub async fn refresh(&self) -> Result<Task, IlandError> {
        self.link.client()?.fetch_one(&self.path()).await
    }

    /// Poll until the task completes and return its final state.
    ///
    /// The first fetch happens immediately; later fetches are spaced by
    /// `task_poll_interval`. A configured `poll_timeout` bounds the whole
    /// loop. Request errors end tracking.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use iland_sdk::IlandClient;
    /// # async fn example(client: IlandClient) -> Result<(), iland_sdk::IlandError> {
    /// let vm = client.virtual_machine("vm-uuid").await?;
    /// let done = vm.power_on().await?.track().await?;
    /// println!("power on finished with {}", done.status);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn track(&self) -> Result<Task, IlandError> {
        let client = self.link.client()?;
        let path = self.path();
        let interval = client.config().task_poll_interval;

        client
            .with_poll_timeout(async {
                loop {
                    let task: Task = client.fetch_one(&path).await?;
                    if task.is_complete() {
                        tracing::info!(
                            "Task {} ({}) finished with status {}",
                            task.uuid,
                            task.operation,
                            task.status
                        );
                        return Ok(task);
                    }
                    tracing::debug!(
                        "Task {} is {} ({}%), polling again in {:?}",
                        task.uuid,
                        task.status,
                        task.progress,
                        interval
                    );
                    tokio::time::sleep(interval).await;
                }
            })
            .await
    }
}
