//! Process-wide client identification headers.
//!
//! Computed once on first use and shared read-only for the life of the
//! process.

use std::fmt;
use std::sync::LazyLock;

use crate::headers::Headers;

/// Client package version sent in `X-Client-Package-Version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Normalized operating-system family.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlatformName {
    /// macOS
    MacOS,
    /// Linux
    Linux,
    /// Windows
    Windows,
    /// FreeBSD
    FreeBSD,
    /// OpenBSD
    OpenBSD,
    /// iOS
    IOS,
    /// Android
    Android,
    /// Recognized signal, unknown family.
    Other(String),
    /// No signal at all.
    Unknown,
}

impl PlatformName {
    /// Maps a raw OS identifier (as in `std::env::consts::OS`) onto a family.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use courier::platform::PlatformName;
    ///
    /// assert_eq!(PlatformName::normalize("macos"), PlatformName::MacOS);
    /// assert_eq!(PlatformName::normalize("Darwin").to_string(), "MacOS");
    /// assert_eq!(PlatformName::normalize("haiku").to_string(), "Other:haiku");
    /// assert_eq!(PlatformName::normalize("").to_string(), "Unknown");
    /// ```
    pub fn normalize(raw: &str) -> Self {
        let lower = raw.to_ascii_lowercase();
        match lower.as_str() {
            "" => Self::Unknown,
            "ios" => Self::IOS,
            "android" => Self::Android,
            "macos" | "darwin" => Self::MacOS,
            "windows" | "win32" => Self::Windows,
            "freebsd" => Self::FreeBSD,
            "openbsd" => Self::OpenBSD,
            "linux" => Self::Linux,
            _ => Self::Other(raw.to_string()),
        }
    }
}

impl fmt::Display for PlatformName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MacOS => write!(f, "MacOS"),
            Self::Linux => write!(f, "Linux"),
            Self::Windows => write!(f, "Windows"),
            Self::FreeBSD => write!(f, "FreeBSD"),
            Self::OpenBSD => write!(f, "OpenBSD"),
            Self::IOS => write!(f, "iOS"),
            Self::Android => write!(f, "Android"),
            Self::Other(raw) => write!(f, "Other:{raw}"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Normalized CPU architecture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 32-bit x86
    X32,
    /// 64-bit x86
    X64,
    /// 32-bit ARM
    Arm,
    /// 64-bit ARM
    Arm64,
    /// Recognized signal, unknown architecture.
    Other(String),
    /// No signal at all.
    Unknown,
}

impl Arch {
    /// Maps a raw architecture identifier (as in `std::env::consts::ARCH`).
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use courier::platform::Arch;
    ///
    /// assert_eq!(Arch::normalize("x86_64"), Arch::X64);
    /// assert_eq!(Arch::normalize("aarch64").to_string(), "arm64");
    /// assert_eq!(Arch::normalize("riscv64").to_string(), "other:riscv64");
    /// ```
    pub fn normalize(raw: &str) -> Self {
        match raw {
            "" => Self::Unknown,
            "x86" | "ia32" => Self::X32,
            "x86_64" | "x64" => Self::X64,
            "arm" => Self::Arm,
            "aarch64" | "arm64" => Self::Arm64,
            _ => Self::Other(raw.to_string()),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X32 => write!(f, "x32"),
            Self::X64 => write!(f, "x64"),
            Self::Arm => write!(f, "arm"),
            Self::Arm64 => write!(f, "arm64"),
            Self::Other(raw) => write!(f, "other:{raw}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Identification of the running client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformProperties {
    /// Language of the client library.
    pub lang: &'static str,
    /// Client package version.
    pub package_version: &'static str,
    /// Operating-system family.
    pub os: PlatformName,
    /// CPU architecture.
    pub arch: Arch,
    /// Runtime name.
    pub runtime: &'static str,
    /// Runtime version, `unknown` when not recorded at build time.
    pub runtime_version: &'static str,
}

impl PlatformProperties {
    /// Detects the properties of the current process.
    pub fn detect() -> Self {
        let runtime_version = match option_env!("COURIER_RUSTC_VERSION") {
            Some(v) if !v.is_empty() => v,
            _ => "unknown",
        };
        Self {
            lang: "rust",
            package_version: VERSION,
            os: PlatformName::normalize(std::env::consts::OS),
            arch: Arch::normalize(std::env::consts::ARCH),
            runtime: "rust",
            runtime_version,
        }
    }

    /// The identification headers.
    pub fn headers(&self) -> Headers {
        Headers::new()
            .with("X-Client-Lang", self.lang)
            .with("X-Client-Package-Version", self.package_version)
            .with("X-Client-OS", self.os.to_string())
            .with("X-Client-Arch", self.arch.to_string())
            .with("X-Client-Runtime", self.runtime)
            .with("X-Client-Runtime-Version", self.runtime_version)
    }
}

static PLATFORM_HEADERS: LazyLock<Headers> =
    LazyLock::new(|| PlatformProperties::detect().headers());

/// The process-wide identification headers, computed on first call.
pub fn platform_headers() -> &'static Headers {
    &PLATFORM_HEADERS
}
