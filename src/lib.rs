//! Solar Lead Capture Library
//!
//! Backend for a solar-installation business: sizes rooftop systems from a
//! monthly electricity bill, captures quote and report requests as leads,
//! notifies the operator and returns a PDF to the submitter.
//!
//! # Modules
//!
//! - `sizing`: Bill-to-system-size calculator (pure).
//! - `models`: Lead records and API response models.
//! - `forms`: Form-body parsing into calculator input and leads.
//! - `lead_store`: Lead persistence (Postgres and in-memory).
//! - `pipeline`: Persist-then-notify-then-render capture flow.
//! - `notifier`: Operator notification (SMTP or log).
//! - `documents`: HTML templates and PDF rendering.
//! - `image_store`: External image host client.
//! - `handlers`: Public HTTP handlers, application state and router.
//! - `admin_handler`: Token-protected admin endpoints.
//! - `config`: Configuration management.
//! - `db`: Database connection pool and migrations.
//! - `errors`: Error handling types.

pub mod admin_handler;
pub mod config;
pub mod db;
pub mod documents;
pub mod errors;
pub mod forms;
pub mod handlers;
pub mod image_store;
pub mod lead_store;
pub mod models;
pub mod notifier;
pub mod pipeline;
pub mod sizing;
