//! Advisory warnings for packages that rarely work natively on Windows.

/// A package family with known Windows trouble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompatIssue {
    pub name: &'static str,
    pub problem: &'static str,
    pub alternative: &'static str,
}

const WINDOWS_ISSUES: &[CompatIssue] = &[
    CompatIssue {
        name: "ncurses",
        problem: "terminal UI library built for POSIX terminals",
        alternative: "use PDCurses, or build under MSYS2/WSL",
    },
    CompatIssue {
        name: "readline",
        problem: "depends on a POSIX terminal",
        alternative: "use linenoise-ng or WinEditLine",
    },
    CompatIssue {
        name: "x11",
        problem: "X11 has no native Windows server",
        alternative: "use SDL2, GLFW or the Win32 API",
    },
    CompatIssue {
        name: "xlib",
        problem: "X11 has no native Windows server",
        alternative: "use SDL2, GLFW or the Win32 API",
    },
    CompatIssue {
        name: "gtk",
        problem: "native GTK builds need the MSYS2 runtime",
        alternative: "install GTK through MSYS2, or use a portable toolkit",
    },
    CompatIssue {
        name: "gtk3",
        problem: "native GTK builds need the MSYS2 runtime",
        alternative: "install GTK through MSYS2, or use a portable toolkit",
    },
    CompatIssue {
        name: "alsa",
        problem: "ALSA is Linux-only audio",
        alternative: "use PortAudio, miniaudio or SDL2 audio",
    },
    CompatIssue {
        name: "asound2",
        problem: "ALSA is Linux-only audio",
        alternative: "use PortAudio, miniaudio or SDL2 audio",
    },
    CompatIssue {
        name: "pulse",
        problem: "PulseAudio is not available natively",
        alternative: "use PortAudio, miniaudio or SDL2 audio",
    },
];

/// Strip common library naming decoration: `lib` prefix, `-dev`/`-devel`
/// suffix.
pub fn normalize_package_name(name: &str) -> String {
    let lower = name.to_lowercase();
    let trimmed = lower
        .strip_suffix("-devel")
        .or_else(|| lower.strip_suffix("-dev"))
        .unwrap_or(&lower);
    trimmed.strip_prefix("lib").unwrap_or(trimmed).to_string()
}

/// Known Windows problem for `package`, matched on the name or its
/// normalized form.
pub fn find_issue(package: &str) -> Option<&'static CompatIssue> {
    let lower = package.to_lowercase();
    let normalized = normalize_package_name(package);
    WINDOWS_ISSUES
        .iter()
        .find(|issue| issue.name == lower || issue.name == normalized)
}

/// Warning text for a package with a known Windows problem.
pub fn compatibility_warning(package: &str) -> Option<String> {
    find_issue(package).map(|issue| {
        format!(
            "`{}` may not work on Windows: {} ({})",
            package, issue.problem, issue.alternative
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_package_name("libncurses-dev"), "ncurses");
        assert_eq!(normalize_package_name("gtk3-devel"), "gtk3");
        assert_eq!(normalize_package_name("LibX11"), "x11");
        assert_eq!(normalize_package_name("sqlite"), "sqlite");
    }

    #[test]
    fn test_warning() {
        let warning = compatibility_warning("libncurses-dev").unwrap();
        assert!(warning.contains("libncurses-dev"));
        assert!(warning.contains("PDCurses"));

        assert!(compatibility_warning("alsa").is_some());
        assert!(compatibility_warning("libasound2-dev").is_some());
        assert!(compatibility_warning("curl").is_none());
    }
}
