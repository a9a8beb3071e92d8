//! Host platform with Node.js naming
//!
//! Cache keys are shared with tooling that names platforms the way
//! `process.platform` / `process.arch` do, so Rust target names are mapped
//! onto those.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub platform: String,
    pub arch: String,
}

impl Platform {
    pub fn current() -> Self {
        Self::from_rust(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn from_rust(os: &str, arch: &str) -> Self {
        let platform = match os {
            "macos" => "darwin",
            "windows" => "win32",
            other => other,
        };

        let arch = match arch {
            "x86_64" => "x64",
            "x86" => "ia32",
            "aarch64" => "arm64",
            "loongarch64" => "loong64",
            "powerpc64" => "ppc64",
            "powerpc" => "ppc",
            other => other,
        };

        Self {
            platform: platform.to_string(),
            arch: arch.to_string(),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.platform, self.arch)
    }
}
