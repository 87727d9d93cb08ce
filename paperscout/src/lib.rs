//! # Paperscout
//!
//! Retrieval-augmented paper recommendation and chat over a fixed corpus of
//! PubMed-identified papers. Given a free-text query, paperscout finds the
//! single most relevant paper by plurality vote over similarity-search hits,
//! attaches a bucketed confidence score, generates a document-stuffed
//! summary, and then lets the user converse with that paper through
//! retrieval-augmented follow-up questions.
//!
//! External collaborators are all reached over HTTP: an S3-compatible object
//! archive (metadata CSV + page images), a Qdrant vector database, and an
//! OpenAI-compatible LLM API.

pub mod api;
pub mod archive;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod llm;
pub mod models;
pub mod services;
pub mod vector;

pub use error::{PaperscoutError, Result};
