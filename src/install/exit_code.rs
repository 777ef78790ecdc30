//! Per-backend interpretation of install exit codes.
//!
//! Some package managers exit non-zero when there was nothing to do. Those
//! codes are reclassified so a rerun over an installed set stays green.

use crate::core::PackageManagerId;

/// What an install exit code means for the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitDisposition {
    Success,
    /// Nothing was done, and nothing needed doing.
    Skip(&'static str),
    Fail,
}

/// Maps a process exit code to an [`ExitDisposition`].
pub trait ExitCodeClassifier {
    fn classify(&self, code: Option<i32>) -> ExitDisposition;
}

/// Zero is success; anything else, including death by signal, is failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

impl ExitCodeClassifier for DefaultClassifier {
    fn classify(&self, code: Option<i32>) -> ExitDisposition {
        match code {
            Some(0) => ExitDisposition::Success,
            _ => ExitDisposition::Fail,
        }
    }
}

/// winget reports HRESULT-style codes; a handful mean the package is
/// already there or cannot be acted on again.
#[derive(Debug, Clone, Copy, Default)]
pub struct WingetClassifier;

impl WingetClassifier {
    pub const UPDATE_NOT_APPLICABLE: i32 = 0x8A15_002Bu32 as i32;
    pub const PACKAGE_ALREADY_INSTALLED: i32 = 0x8A15_0061u32 as i32;
    pub const NO_APPLICABLE_INSTALLER: i32 = 0x8A15_0010u32 as i32;
    pub const INSTALL_IN_PROGRESS: i32 = 0x8A15_0102u32 as i32;
    pub const INSTALLER_ALREADY_INSTALLED: i32 = 0x8A15_010Du32 as i32;
    /// MSI: another version of this product is already installed.
    pub const MSI_PRODUCT_VERSION_INSTALLED: i32 = 1638;
}

impl ExitCodeClassifier for WingetClassifier {
    fn classify(&self, code: Option<i32>) -> ExitDisposition {
        match code {
            Some(0) => ExitDisposition::Success,
            Some(Self::UPDATE_NOT_APPLICABLE)
            | Some(Self::PACKAGE_ALREADY_INSTALLED)
            | Some(Self::INSTALLER_ALREADY_INSTALLED)
            | Some(Self::MSI_PRODUCT_VERSION_INSTALLED) => ExitDisposition::Skip("already installed"),
            Some(Self::NO_APPLICABLE_INSTALLER) => {
                ExitDisposition::Skip("no applicable installer, likely already present")
            }
            Some(Self::INSTALL_IN_PROGRESS) => {
                ExitDisposition::Skip("another installation is in progress")
            }
            _ => ExitDisposition::Fail,
        }
    }
}

/// Chocolatey exits 1641/3010 when the install worked but wants a reboot.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChocoClassifier;

impl ExitCodeClassifier for ChocoClassifier {
    fn classify(&self, code: Option<i32>) -> ExitDisposition {
        match code {
            Some(0) | Some(1641) | Some(3010) => ExitDisposition::Success,
            _ => ExitDisposition::Fail,
        }
    }
}

/// Classifier for a backend.
pub fn classifier_for(pm: PackageManagerId) -> &'static dyn ExitCodeClassifier {
    match pm {
        PackageManagerId::Winget => &WingetClassifier,
        PackageManagerId::Choco => &ChocoClassifier,
        _ => &DefaultClassifier,
    }
}
