//! 核心层：步骤错误与恢复

pub mod error;
pub mod recovery;

pub use error::{RecoveryAction, StepError};
pub use recovery::RecoveryEngine;
