//! Snapshot of running processes. The companion only cares about names, and only for the
//! duration of a single tick.

use std::collections::HashSet;

use anyhow::{anyhow, Result};
use sysinfo::{ProcessesToUpdate, System};
use tracing::{debug, instrument};

use crate::config::ProcessMatching;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessNameSet {
    names: HashSet<String>,
}

impl ProcessNameSet {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Checks whether any of `wanted` is running.
    pub fn contains_any(&self, wanted: &[String], matching: ProcessMatching) -> bool {
        match matching {
            ProcessMatching::Exact => wanted.iter().any(|name| self.names.contains(name)),
            ProcessMatching::Normalized => {
                let wanted = wanted
                    .iter()
                    .map(String::as_str)
                    .map(normalize_process_name)
                    .collect::<Vec<_>>();
                self.names
                    .iter()
                    .map(String::as_str)
                    .map(normalize_process_name)
                    .any(|name| wanted.contains(&name))
            }
        }
    }
}

impl<S: Into<String>> FromIterator<S> for ProcessNameSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// `C:\Program Files\Google\Chrome.EXE`, `/usr/bin/chrome` and `chrome` all become `chrome`.
pub fn normalize_process_name(name: &str) -> String {
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let lower = file_name.trim().to_lowercase();
    match lower.strip_suffix(".exe") {
        Some(stem) => stem.to_string(),
        None => lower,
    }
}

/// Supplies names of the currently running processes.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessObserver {
    fn running_processes(&mut self) -> Result<ProcessNameSet>;
}

pub struct SysinfoProcessObserver {
    system: System,
}

impl SysinfoProcessObserver {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SysinfoProcessObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessObserver for SysinfoProcessObserver {
    #[instrument(skip(self))]
    fn running_processes(&mut self) -> Result<ProcessNameSet> {
        self.system.refresh_processes(ProcessesToUpdate::All, true);
        let names = self
            .system
            .processes()
            .values()
            .map(|process| process.name().to_string_lossy().into_owned())
            .collect::<ProcessNameSet>();

        // At the very least the companion itself should be visible.
        if names.is_empty() {
            return Err(anyhow!("Process list is empty, enumeration is probably restricted"));
        }
        debug!("Found {} distinct process names", names.len());
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_process_name, ProcessNameSet, ProcessObserver, SysinfoProcessObserver};
    use crate::config::ProcessMatching;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn normalizes_platform_specific_names() {
        assert_eq!(normalize_process_name("chrome.exe"), "chrome");
        assert_eq!(normalize_process_name("Chrome.EXE"), "chrome");
        assert_eq!(normalize_process_name("/usr/bin/python"), "python");
        assert_eq!(
            normalize_process_name(r"C:\Program Files\Steam\steam.exe"),
            "steam"
        );
        assert_eq!(normalize_process_name("exe"), "exe");
    }

    #[test]
    fn exact_matching_compares_literally() {
        let set = ["chrome.exe", "bash"].into_iter().collect::<ProcessNameSet>();
        assert!(set.contains_any(&names(&["chrome.exe"]), ProcessMatching::Exact));
        assert!(!set.contains_any(&names(&["chrome"]), ProcessMatching::Exact));
        assert!(!set.contains_any(&names(&["Chrome.exe"]), ProcessMatching::Exact));
    }

    #[test]
    fn normalized_matching_ignores_platform_details() {
        let set = ["Chrome.exe", "/usr/bin/slack"]
            .into_iter()
            .collect::<ProcessNameSet>();
        assert!(set.contains_any(&names(&["chrome"]), ProcessMatching::Normalized));
        assert!(set.contains_any(&names(&["discord", "slack.exe"]), ProcessMatching::Normalized));
        assert!(!set.contains_any(&names(&["steam"]), ProcessMatching::Normalized));
        assert!(!ProcessNameSet::default()
            .contains_any(&names(&["chrome"]), ProcessMatching::Normalized));
    }

    #[test]
    fn sysinfo_sees_the_test_process() {
        let mut observer = SysinfoProcessObserver::new();
        let processes = observer.running_processes().unwrap();
        assert!(!processes.is_empty());
    }
}
