// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Supported build targets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Operating systems a plugin binary can be built for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Darwin,
    Linux,
    Windows,
}

/// CPU architectures a plugin binary can be built for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    Amd64,
    Arm64,
}

/// An (operating system, architecture) pair. Identity is [`PlatformTarget::key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformTarget {
    pub os: Os,
    pub arch: Arch,
}

/// Every target the packager knows how to build.
pub const SUPPORTED_PLATFORMS: [PlatformTarget; 6] = [
    PlatformTarget::new(Os::Darwin, Arch::Amd64),
    PlatformTarget::new(Os::Darwin, Arch::Arm64),
    PlatformTarget::new(Os::Linux, Arch::Amd64),
    PlatformTarget::new(Os::Linux, Arch::Arm64),
    PlatformTarget::new(Os::Windows, Arch::Amd64),
    PlatformTarget::new(Os::Windows, Arch::Arm64),
];

impl PlatformTarget {
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// `<os>_<arch>`, e.g. `linux_amd64`.
    pub fn key(&self) -> String {
        format!("{}_{}", self.os, self.arch)
    }

    /// File name of the built binary for this target (`.exe` on Windows).
    pub fn binary_name(&self, base: &str) -> String {
        match self.os {
            Os::Windows => format!("{base}.exe"),
            _ => base.to_string(),
        }
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os, self.arch)
    }
}

impl FromStr for PlatformTarget {
    type Err = String;

    /// Parses `os_arch` (also accepts `os/arch` and `os-arch`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (os, arch) = s
            .split_once(['_', '/', '-'])
            .ok_or_else(|| format!("invalid platform `{s}`, expected <os>_<arch>"))?;
        let os = Os::from_str(os).map_err(|_| format!("unsupported operating system `{os}`"))?;
        let arch =
            Arch::from_str(arch).map_err(|_| format!("unsupported architecture `{arch}`"))?;
        Ok(Self { os, arch })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_joins_os_and_arch() {
        let target = PlatformTarget::new(Os::Darwin, Arch::Arm64);
        assert_eq!(target.key(), "darwin_arm64");
        assert_eq!(target.to_string(), "darwin_arm64");
    }

    #[test]
    fn supported_keys_are_unique() {
        let keys: std::collections::HashSet<String> =
            SUPPORTED_PLATFORMS.iter().map(|p| p.key()).collect();
        assert_eq!(keys.len(), SUPPORTED_PLATFORMS.len());
    }

    #[test]
    fn parse_accepts_separators() {
        let expected = PlatformTarget::new(Os::Linux, Arch::Amd64);
        assert_eq!("linux_amd64".parse::<PlatformTarget>().unwrap(), expected);
        assert_eq!("linux/amd64".parse::<PlatformTarget>().unwrap(), expected);
        assert_eq!("linux-amd64".parse::<PlatformTarget>().unwrap(), expected);
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("plan9_amd64".parse::<PlatformTarget>().is_err());
        assert!("linux_mips".parse::<PlatformTarget>().is_err());
        assert!("linux".parse::<PlatformTarget>().is_err());
    }

    #[test]
    fn windows_binaries_get_exe_suffix() {
        let win = PlatformTarget::new(Os::Windows, Arch::Amd64);
        let mac = PlatformTarget::new(Os::Darwin, Arch::Amd64);
        assert_eq!(win.binary_name("plugin"), "plugin.exe");
        assert_eq!(mac.binary_name("plugin"), "plugin");
    }
}
