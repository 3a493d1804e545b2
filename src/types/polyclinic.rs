//! Polyclinic reference data

use serde::{Deserialize, Serialize};

/// Polyclinic identifier
pub type PolyclinicId = u64;

/// A hospital service point with its own queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polyclinic {
    pub id: PolyclinicId,
    pub code: String,
    pub name: String,
}

impl Polyclinic {
    /// Create a new polyclinic
    pub fn new(id: PolyclinicId, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
        }
    }
}
