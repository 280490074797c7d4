//! Key generator and validator.

pub mod generator;
pub mod validator;

pub use generator::{GeneratedKey, KeyContext, KeyGenerator};
pub use validator::{
    KeyAudit, KeyVerdict, SuspicionReason, analyze_with_value, audit_keys, suggest_fix,
};
