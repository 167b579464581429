//! # Engine Module
//!
//! The stateful layer of molstat: an explicitly owned [`session::Session`] that tracks the
//! loaded structures, the uploaded files, the single active selection and the viewer
//! display state.
//!
//! ## Architecture
//!
//! - **Registry** ([`registry`]) - Ordered, de-duplicated structure and file collections
//! - **Selection** ([`selection`]) - The single active index and its re-clamping rules
//! - **Viewer State** ([`viewer`]) - Display configuration with validated partial updates
//! - **Events** ([`events`]) - Explicit subscribe/unsubscribe change notifications
//! - **Session** ([`session`]) - Owns all of the above and emits events after mutations
//! - **Configuration** ([`config`]) - Session construction parameters
//! - **Progress Monitoring** ([`progress`]) - Progress reporting for long-running workflows
//! - **Error Handling** ([`error`]) - Reportable session error conditions
//!
//! ## Consistency
//!
//! Every mutating operation is synchronous and validates before it writes, so a rejected
//! operation leaves the session exactly as it was.

pub mod config;
pub mod error;
pub mod events;
pub mod progress;
pub mod registry;
pub mod selection;
pub mod session;
pub mod viewer;
