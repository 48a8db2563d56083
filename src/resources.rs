use std::collections::HashSet;

use rmcp::model::{AnnotateAble, RawResource, Resource};
use thiserror::Error;

use crate::config::ShellConfig;
use crate::system::{self, SystemSnapshot};

/// Produces the text body of a resource
pub type ReadFn = fn(&ShellConfig) -> String;

/// One read-only resource: its URI and the handler that renders it
#[derive(Debug, Clone, Copy)]
pub struct ResourceEntry {
    pub name: &'static str,
    pub uri: &'static str,
    pub description: &'static str,
    read: ReadFn,
}

const RESOURCES: &[ResourceEntry] = &[
    ResourceEntry {
        name: "hostname",
        uri: "hostname://",
        description: "Host name of the machine running the server",
        read: read_hostname,
    },
    ResourceEntry {
        name: "platform",
        uri: "platform://",
        description: "Operating system identifier",
        read: read_platform,
    },
    ResourceEntry {
        name: "shell",
        uri: "shell://",
        description: "Shell used to run commands",
        read: read_shell,
    },
    ResourceEntry {
        name: "username",
        uri: "username://",
        description: "User the server runs as",
        read: read_username,
    },
    ResourceEntry {
        name: "system-info",
        uri: "system-info://",
        description: "JSON snapshot of host, shell, CPU, memory and uptime",
        read: read_system_info,
    },
];

fn read_hostname(_: &ShellConfig) -> String {
    system::hostname()
}

fn read_platform(_: &ShellConfig) -> String {
    system::platform().to_string()
}

fn read_shell(config: &ShellConfig) -> String {
    config.shell_path.clone()
}

fn read_username(_: &ShellConfig) -> String {
    system::username()
}

fn read_system_info(config: &ShellConfig) -> String {
    SystemSnapshot::collect(config).to_json()
}

/// Problems found while validating the resource table at startup
#[derive(Debug, PartialEq, Error)]
pub enum RegistryError {
    #[error("resource with URI '{0}' has an empty name")]
    EmptyName(String),
    #[error("resource '{name}' has malformed URI '{uri}'")]
    MalformedUri { name: String, uri: String },
    #[error("URI '{0}' is registered more than once")]
    DuplicateUri(String),
}

/// Validated URI to handler mapping
#[derive(Debug, Clone)]
pub struct ResourceTable {
    entries: &'static [ResourceEntry],
}

impl ResourceTable {
    pub fn new() -> Result<Self, RegistryError> {
        Self::from_entries(RESOURCES)
    }

    fn from_entries(entries: &'static [ResourceEntry]) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for entry in entries {
            if entry.name.is_empty() {
                return Err(RegistryError::EmptyName(entry.uri.to_string()));
            }
            let scheme = entry.uri.strip_suffix("://").unwrap_or_default();
            if scheme.is_empty() || scheme.contains('/') {
                return Err(RegistryError::MalformedUri {
                    name: entry.name.to_string(),
                    uri: entry.uri.to_string(),
                });
            }
            if !seen.insert(entry.uri) {
                return Err(RegistryError::DuplicateUri(entry.uri.to_string()));
            }
        }
        Ok(Self { entries })
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[ResourceEntry] {
        self.entries
    }

    /// Render the resource at `uri`, or `None` if nothing is registered there
    pub fn read(&self, uri: &str, config: &ShellConfig) -> Option<String> {
        self.entries
            .iter()
            .find(|entry| entry.uri == uri)
            .map(|entry| (entry.read)(config))
    }

    pub fn list(&self) -> Vec<Resource> {
        self.entries
            .iter()
            .map(|entry| {
                let mut raw = RawResource::new(entry.uri, entry.name);
                raw.description = Some(entry.description.to_string());
                raw.mime_type = Some("text/plain".to_string());
                raw.no_annotation()
            })
            .collect()
    }
}
