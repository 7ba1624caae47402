use serde::Serialize;
use std::sync::Arc;

/// Incremental transfer progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub loaded: u64,
    /// Zero when the total size is unknown.
    pub total: u64,
    pub percentage: u8,
}

impl Progress {
    pub fn new(loaded: u64, total: Option<u64>) -> Self {
        match total {
            Some(total) if total > 0 => {
                let pct = ((loaded as f64 / total as f64) * 100.0).round();
                Self {
                    loaded,
                    total,
                    percentage: pct.clamp(0.0, 100.0) as u8,
                }
            }
            _ => Self {
                loaded,
                total: 0,
                percentage: 0,
            },
        }
    }
}

pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;
