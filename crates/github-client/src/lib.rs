//! `github-client`: the slice of the GitHub REST API the chat relay needs.
//!
//! Two calls, both against GitHub Actions:
//!
//! ```text
//! POST /repos/{org}/{repo}/actions/workflows/{workflow}/dispatches   → 204
//! GET  /repos/{org}/{repo}/actions/workflows                          → 200
//! ```
//!
//! [`GithubClient`] implements [`chatops_core::WorkflowDispatcher`], so it
//! plugs straight into a [`chatops_core::CommandRouter`].
//!
//! # Quick start
//!
//! ```rust,ignore
//! use github_client::GithubClient;
//!
//! let client = GithubClient::new(std::env::var("GITHUB_TOKEN")?)?;
//! let list = client.list_workflows("my-org", "user-service").await?;
//! for wf in list.workflows {
//!     println!("{} {}", wf.id, wf.path);
//! }
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::GithubClient;
pub use error::GithubError;
pub use types::{Workflow, WorkflowList};

pub type Result<T> = std::result::Result<T, GithubError>;
