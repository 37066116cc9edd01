//! Async client for the Cerevox REST API.
//!
//! - [`Lexa`] parses documents (files, URLs, cloud folders) and waits for the job.
//! - [`Hippo`] manages RAG folders, chats and asks.
//! - [`Account`] covers account info, usage and user management.
//!
//! All three are thin layers over a shared [`Session`], which owns the HTTP
//! transport and the token lifecycle.

pub mod account;
pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod hippo;
pub mod http;
pub mod ingest;
pub mod lexa;
pub mod models;
pub mod runtime;

pub use account::Account;
pub use auth::{Session, TokenManager, TokenState};
pub use config::Config;
pub use error::{Error, ErrorKind, Result, RetryStrategy};
pub use hippo::Hippo;
pub use ingest::{CloudSource, FileInput, Ingest, JobPoller};
pub use lexa::{Lexa, ParseOptions};
pub use models::{JobResponse, JobStatus, ProcessingMode};
