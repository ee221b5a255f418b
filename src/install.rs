//! Installation-directory lookup and normalization.
//!
//! Archive paths are built by concatenating an installation root with a
//! target's `source`, so the root must use forward slashes and end with one.
//!
//! On Windows the registry is consulted first: Android Studio records its
//! root under `HKLM\SOFTWARE\Android Studio`, other products are found in
//! the user's `Environment` key. The process environment comes next.

/// Product whose installation root is read from its own registry key.
#[cfg_attr(not(windows), allow(dead_code))]
const ANDROID_STUDIO: &str = "Android Studio";

/// Environment-variable values for IDE installs often point at the `bin`
/// directory and carry a trailing `;` from a `PATH`-style list.
const BIN_SUFFIX: &str = "bin;";

/// Normalizes a raw installation directory string.
///
/// Trims surrounding whitespace, drops a trailing `bin;`, converts
/// backslashes to forward slashes and guarantees a trailing `/`.
/// Returns `None` for an empty input.
pub fn normalize_install_dir(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix(BIN_SUFFIX).unwrap_or(trimmed);
    normalize_registry_path(trimmed.trim_end_matches(';'))
}

/// Normalizes an installation root read from a product's registry key.
///
/// Unlike [`normalize_install_dir`], the value names the root itself, so no
/// `bin;` suffix is stripped.
pub fn normalize_registry_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut dir = trimmed.replace('\\', "/");
    if !dir.ends_with('/') {
        dir.push('/');
    }
    Some(dir)
}

/// Finds a product's installation root without asking the user.
///
/// Tries the registry, then the environment variable named after the
/// product. The result is already normalized.
pub fn locate_install_dir(product: &str) -> Option<String> {
    install_dir_from_registry(product).or_else(|| install_dir_from_env(product))
}

/// Looks up an installation directory in the Windows registry.
#[cfg(windows)]
pub fn install_dir_from_registry(product: &str) -> Option<String> {
    use winreg::RegKey;
    use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};

    let dir = if product == ANDROID_STUDIO {
        let root = RegKey::predef(HKEY_LOCAL_MACHINE);
        read_registry_value(&root, &format!(r"SOFTWARE\{}", product), "Path")
            .and_then(|v| normalize_registry_path(&v))
    } else {
        let root = RegKey::predef(HKEY_CURRENT_USER);
        read_registry_value(&root, "Environment", product).and_then(|v| normalize_install_dir(&v))
    };

    if let Some(d) = &dir {
        log::debug!("Resolved {} installation from registry: {}", product, d);
    }
    dir
}

/// The registry only exists on Windows.
#[cfg(not(windows))]
pub fn install_dir_from_registry(_product: &str) -> Option<String> {
    None
}

#[cfg(windows)]
fn read_registry_value(root: &winreg::RegKey, sub_key: &str, name: &str) -> Option<String> {
    use std::io::ErrorKind;

    let value = root
        .open_subkey(sub_key)
        .and_then(|key| key.get_value::<String, _>(name));
    match value {
        Ok(v) => Some(v),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            log::warn!("Error accessing registry key '{}\\{}': {}", sub_key, name, e);
            None
        }
    }
}

/// Looks up an installation directory from the environment variable named
/// after the product (for example `IntelliJ IDEA`).
pub fn install_dir_from_env(product: &str) -> Option<String> {
    let value = std::env::var(product).ok()?;
    let dir = normalize_install_dir(&value);
    match &dir {
        Some(d) => log::debug!("Resolved {} installation from environment: {}", product, d),
        None => log::debug!("Environment variable '{}' is empty", product),
    }
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_windows_env_value() {
        assert_eq!(
            normalize_install_dir(r"C:\Program Files\JetBrains\IntelliJ IDEA\bin;").as_deref(),
            Some("C:/Program Files/JetBrains/IntelliJ IDEA/")
        );
    }

    #[test]
    fn test_normalize_adds_trailing_slash() {
        assert_eq!(
            normalize_install_dir("/opt/android-studio").as_deref(),
            Some("/opt/android-studio/")
        );
        assert_eq!(
            normalize_install_dir("/opt/android-studio/").as_deref(),
            Some("/opt/android-studio/")
        );
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_install_dir("   "), None);
        assert_eq!(normalize_install_dir("bin;"), None);
    }

    #[test]
    fn test_normalize_registry_path() {
        assert_eq!(
            normalize_registry_path(r"C:\Program Files\Android\Android Studio").as_deref(),
            Some("C:/Program Files/Android/Android Studio/")
        );
        // A registry root is taken as is, even when it ends in `bin`
        assert_eq!(
            normalize_registry_path(r"D:\tools\bin").as_deref(),
            Some("D:/tools/bin/")
        );
        assert_eq!(normalize_registry_path(""), None);
    }

    #[cfg(not(windows))]
    #[test]
    fn test_registry_lookup_off_windows() {
        assert_eq!(install_dir_from_registry(ANDROID_STUDIO), None);
    }

    #[test]
    fn test_install_dir_from_env_missing() {
        assert_eq!(
            install_dir_from_env("SPLASHPATCH_TEST_PRODUCT_THAT_IS_NOT_SET"),
            None
        );
    }
}
