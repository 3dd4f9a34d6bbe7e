// SPDX-License-Identifier: MIT

use core::fmt;

/// Severity of a non-fatal finding. Violations are errors and abort the
/// check instead of being recorded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warn,
}

#[derive(Clone, Debug)]
pub struct Finding {
    pub sev: Severity,
    pub code: &'static str,
    pub msg: String,
}

impl Finding {
    pub fn info(code: &'static str, msg: impl Into<String>) -> Self {
        Self {
            sev: Severity::Info,
            code,
            msg: msg.into(),
        }
    }
    pub fn warn(code: &'static str, msg: impl Into<String>) -> Self {
        Self {
            sev: Severity::Warn,
            code,
            msg: msg.into(),
        }
    }
}

/// Ordered checking phases.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CheckPhase {
    Geometry,
    Root,
    Tree,
    Inodes,
    Bitmap,
}

impl CheckPhase {
    pub fn name(&self) -> &'static str {
        match self {
            CheckPhase::Geometry => "geometry",
            CheckPhase::Root => "root",
            CheckPhase::Tree => "tree",
            CheckPhase::Inodes => "inodes",
            CheckPhase::Bitmap => "bitmap",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CheckReport {
    pub findings: Vec<Finding>,
    pub phases: Vec<CheckPhase>,
}

impl CheckReport {
    pub fn push(&mut self, f: Finding) {
        self.findings.push(f)
    }

    pub fn complete(&mut self, phase: CheckPhase) {
        self.phases.push(phase)
    }

    pub fn count(&self, s: Severity) -> usize {
        self.findings.iter().filter(|f| f.sev == s).count()
    }

    pub fn has_warnings(&self) -> bool {
        self.count(Severity::Warn) > 0
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for it in &self.findings {
            let tag = match it.sev {
                Severity::Info => "INFO",
                Severity::Warn => "WARN",
            };
            writeln!(f, "{tag}: {:<12} {}", it.code, it.msg)?;
        }
        Ok(())
    }
}
