//! Client side of the stdio tool servers.
//!
//! One `McpStdioClient` owns at most one live session. Calls are serialized
//! behind an async mutex; a transport failure drops the session and the next
//! call reconnects. There is no retry.

use std::borrow::Cow;

use async_trait::async_trait;
use rmcp::model::CallToolRequestParam;
use rmcp::service::{RunningService, ServiceError};
use rmcp::transport::TokioChildProcess;
use rmcp::{RoleClient, ServiceExt};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use lavka_core::errors::PortError;

use crate::port_error_from_data;

pub type ToolSession = RunningService<RoleClient, ()>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to start tool server `{program}`: {message}")]
    Spawn { program: String, message: String },
    #[error("tool transport failed: {0}")]
    Transport(String),
    #[error("{message}")]
    Remote { message: String, data: Option<Value> },
    #[error("tool `{tool}` returned an unreadable result: {message}")]
    Decode { tool: String, message: String },
}

impl From<ClientError> for PortError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Remote { message, data } => port_error_from_data(&message, data.as_ref()),
            ClientError::Decode { .. } => PortError::Decode(error.to_string()),
            ClientError::Spawn { .. } | ClientError::Transport(_) => {
                PortError::Transport(error.to_string())
            }
        }
    }
}

/// Opens a fresh client session to a tool server.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    async fn connect(&self) -> Result<ToolSession, ClientError>;
}

/// Starts `program args..` as a child process and speaks MCP over its stdio.
#[derive(Clone, Debug)]
pub struct ChildProcessConnector {
    program: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl ChildProcessConnector {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), args: Vec::new(), envs: Vec::new() }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

#[async_trait]
impl SessionConnector for ChildProcessConnector {
    async fn connect(&self) -> Result<ToolSession, ClientError> {
        let mut command = tokio::process::Command::new(&self.program);
        command.args(&self.args).envs(self.envs.iter().map(|(key, value)| (key, value)));

        let transport = TokioChildProcess::new(command).map_err(|error| ClientError::Spawn {
            program: self.program.clone(),
            message: error.to_string(),
        })?;

        ().serve(transport).await.map_err(|error| ClientError::Spawn {
            program: self.program.clone(),
            message: error.to_string(),
        })
    }
}

pub struct McpStdioClient {
    connector: Box<dyn SessionConnector>,
    keep_alive: bool,
    session: Mutex<Option<ToolSession>>,
}

impl McpStdioClient {
    pub fn new(connector: impl SessionConnector + 'static, keep_alive: bool) -> Self {
        Self { connector: Box::new(connector), keep_alive, session: Mutex::new(None) }
    }

    /// Calls `tool` and returns its JSON payload.
    pub async fn call(&self, tool: &'static str, arguments: Value) -> Result<Value, ClientError> {
        let arguments = match arguments {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => {
                return Err(ClientError::Decode {
                    tool: tool.to_string(),
                    message: format!("arguments must be a JSON object, got {other}"),
                })
            }
        };
        let request = CallToolRequestParam { name: Cow::Borrowed(tool), arguments };

        let mut guard = self.session.lock().await;
        let session = match guard.take() {
            Some(session) => session,
            None => {
                debug!(event_name = "mcp.client.connecting", tool, "opening tool session");
                self.connector.connect().await?
            }
        };

        let outcome = session.call_tool(request).await;
        let keep_session = match &outcome {
            Ok(_) | Err(ServiceError::McpError(_)) => self.keep_alive,
            Err(_) => false,
        };

        if keep_session {
            *guard = Some(session);
        } else {
            drop(guard);
            close(session).await;
        }

        let result = match outcome {
            Ok(result) => result,
            Err(ServiceError::McpError(error)) => {
                return Err(ClientError::Remote {
                    message: error.message.into_owned(),
                    data: error.data,
                })
            }
            Err(error) => {
                warn!(event_name = "mcp.client.transport_failed", tool, error = %error, "tool call failed");
                return Err(ClientError::Transport(error.to_string()));
            }
        };

        let text = result
            .content
            .iter()
            .find_map(|content| content.as_text())
            .map(|text| text.text.clone());

        if result.is_error.unwrap_or(false) {
            return Err(ClientError::Remote {
                message: text.unwrap_or_else(|| format!("tool `{tool}` failed")),
                data: None,
            });
        }

        if let Some(structured) = result.structured_content {
            return Ok(structured);
        }

        let text = text.ok_or_else(|| ClientError::Decode {
            tool: tool.to_string(),
            message: "no text content".to_string(),
        })?;
        serde_json::from_str(&text)
            .map_err(|error| ClientError::Decode { tool: tool.to_string(), message: error.to_string() })
    }

    /// Closes the live session, if any.
    pub async fn shutdown(&self) {
        if let Some(session) = self.session.lock().await.take() {
            close(session).await;
        }
    }
}

async fn close(session: ToolSession) {
    if let Err(error) = session.cancel().await {
        warn!(event_name = "mcp.client.close_failed", error = %error, "tool session did not stop cleanly");
    }
}
