//! HTTP access to the reconciliation service.
//!
//! No caching. No retries. Every failure is returned to the caller, and a `401` additionally ends
//! the shared [`SessionContext`].

mod client;
mod error;
mod session;

pub use client::{HttpReconApi, UploadReceipt};
pub use error::{Error, Result};
pub use session::{Role, SessionContext, SessionStatus, SignOutReason, User};
