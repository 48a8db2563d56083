//! Read-only host information.

use std::num::NonZeroUsize;

use serde::Serialize;
use sysinfo::System;

use crate::config::ShellConfig;

pub fn hostname() -> String {
    gethostname::gethostname().to_string_lossy().into_owned()
}

/// Operating system identifier, e.g. `linux`, `macos` or `windows`
pub fn platform() -> &'static str {
    std::env::consts::OS
}

pub fn username() -> String {
    whoami::username()
}

pub fn cpu_count() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Aggregate view served by the `system-info://` resource
#[derive(Debug, Clone, Serialize)]
pub struct SystemSnapshot {
    pub hostname: String,
    pub platform: String,
    pub shell: String,
    pub username: String,
    pub cpus: usize,
    /// Bytes
    pub totalmem: u64,
    /// Bytes
    pub freemem: u64,
    /// Seconds since boot
    pub uptime: u64,
}

impl SystemSnapshot {
    pub fn collect(config: &ShellConfig) -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        Self {
            hostname: hostname(),
            platform: platform().to_string(),
            shell: config.shell_path.clone(),
            username: username(),
            cpus: cpu_count(),
            totalmem: sys.total_memory(),
            freemem: sys.free_memory(),
            uptime: System::uptime(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_matches_target() {
        assert_eq!(platform(), std::env::consts::OS);
    }

    #[test]
    fn test_cpu_count_is_positive() {
        assert!(cpu_count() >= 1);
    }

    #[test]
    fn test_snapshot_uses_configured_shell() {
        let snapshot = SystemSnapshot::collect(&ShellConfig::new("/bin/test/bash"));
        assert_eq!(snapshot.shell, "/bin/test/bash");
        assert!(snapshot.freemem <= snapshot.totalmem);
    }

    #[test]
    fn test_snapshot_json_fields() {
        let snapshot = SystemSnapshot {
            hostname: "test-host".to_string(),
            platform: "linux".to_string(),
            shell: "/bin/bash".to_string(),
            username: "test-user".to_string(),
            cpus: 4,
            totalmem: 8_589_934_592,
            freemem: 4_294_967_296,
            uptime: 3600,
        };
        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json()).unwrap();
        assert_eq!(value["hostname"], "test-host");
        assert_eq!(value["platform"], "linux");
        assert_eq!(value["shell"], "/bin/bash");
        assert_eq!(value["username"], "test-user");
        assert_eq!(value["cpus"], 4);
        assert_eq!(value["totalmem"], 8_589_934_592u64);
        assert_eq!(value["freemem"], 4_294_967_296u64);
        assert_eq!(value["uptime"], 3600);
    }
}
