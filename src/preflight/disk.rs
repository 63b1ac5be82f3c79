//! Disk headroom probing

use anyhow::{Context, Result};
use std::path::Path;

/// Space figures for the volume holding a path, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskUsage {
    pub total: u64,
    pub free: u64,
    pub available: u64,
}

impl DiskUsage {
    /// Used share of the space visible to unprivileged users, as `df` reports it
    pub fn percent_used(&self) -> f64 {
        let used = self.total.saturating_sub(self.free);
        let visible = used + self.available;
        if visible == 0 {
            return 0.0;
        }
        used as f64 * 100.0 / visible as f64
    }

    /// Usage figures that report exactly `percent` (two decimals)
    pub fn from_percent(percent: f64) -> Self {
        const SCALE: u64 = 10_000;
        let used = ((percent.clamp(0.0, 100.0) / 100.0) * SCALE as f64).round() as u64;
        let free = SCALE - used;
        Self {
            total: SCALE,
            free,
            available: free,
        }
    }
}

pub trait DiskProbe: Send + Sync {
    fn usage(&self, path: &Path) -> Result<DiskUsage>;
}

/// Reads the volume statistics through `statvfs`
pub struct StatvfsProbe;

impl DiskProbe for StatvfsProbe {
    fn usage(&self, path: &Path) -> Result<DiskUsage> {
        let stats = fs2::statvfs(path)
            .with_context(|| format!("statvfs failed for {}", path.display()))?;
        Ok(DiskUsage {
            total: stats.total_space(),
            free: stats.free_space(),
            available: stats.available_space(),
        })
    }
}

/// Always reports the same usage
pub struct FixedDiskProbe {
    usage: DiskUsage,
}

impl FixedDiskProbe {
    pub fn new(percent: f64) -> Self {
        Self {
            usage: DiskUsage::from_percent(percent),
        }
    }
}

impl DiskProbe for FixedDiskProbe {
    fn usage(&self, _path: &Path) -> Result<DiskUsage> {
        Ok(self.usage)
    }
}
