use serde::{Deserialize, Serialize};

/// Light or dark rendering of the whole interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Appearance {
    #[default]
    Light,
    Dark,
}

impl Appearance {
    pub fn from_dark_mode(dark: bool) -> Self {
        if dark {
            Appearance::Dark
        } else {
            Appearance::Light
        }
    }

    pub fn is_dark(self) -> bool {
        self == Appearance::Dark
    }

    pub fn toggled(self) -> Self {
        match self {
            Appearance::Light => Appearance::Dark,
            Appearance::Dark => Appearance::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Appearance::Light => "light",
            Appearance::Dark => "dark",
        }
    }
}

/// Configured starting appearance. `auto` follows the desktop's setting when
/// one can be detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppearancePreference {
    #[default]
    Light,
    Dark,
    Auto,
}

impl AppearancePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            AppearancePreference::Light => "light",
            AppearancePreference::Dark => "dark",
            AppearancePreference::Auto => "auto",
        }
    }

    pub fn resolve(self) -> Appearance {
        match self {
            AppearancePreference::Light => Appearance::Light,
            AppearancePreference::Dark => Appearance::Dark,
            AppearancePreference::Auto => detect_preferred_appearance().unwrap_or_default(),
        }
    }
}

/// Best-effort lookup of the desktop's light/dark preference.
/// Returns None if no hint is available.
pub fn detect_preferred_appearance() -> Option<Appearance> {
    #[cfg(target_os = "macos")]
    {
        // The key only exists while dark mode is on.
        let output = std::process::Command::new("/usr/bin/defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .ok()?;
        let dark = output.status.success()
            && String::from_utf8_lossy(&output.stdout)
                .to_ascii_lowercase()
                .contains("dark");
        Some(Appearance::from_dark_mode(dark))
    }

    #[cfg(target_os = "windows")]
    {
        use winreg::enums::HKEY_CURRENT_USER;
        use winreg::RegKey;

        let personalize = RegKey::predef(HKEY_CURRENT_USER)
            .open_subkey("Software\\Microsoft\\Windows\\CurrentVersion\\Themes\\Personalize")
            .ok()?;
        let apps_use_light: u32 = personalize.get_value("AppsUseLightTheme").ok()?;
        Some(Appearance::from_dark_mode(apps_use_light == 0))
    }

    #[cfg(target_os = "linux")]
    {
        let output = std::process::Command::new("gsettings")
            .args(["get", "org.gnome.desktop.interface", "color-scheme"])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        parse_gnome_color_scheme(&String::from_utf8_lossy(&output.stdout))
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        None
    }
}

#[cfg_attr(not(any(target_os = "linux", test)), allow(dead_code))]
fn parse_gnome_color_scheme(value: &str) -> Option<Appearance> {
    let value = value.trim().trim_matches('\'').to_ascii_lowercase();
    match value.as_str() {
        "prefer-dark" => Some(Appearance::Dark),
        "prefer-light" | "default" => Some(Appearance::Light),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_restores_appearance() {
        assert_eq!(Appearance::Light.toggled(), Appearance::Dark);
        assert_eq!(Appearance::Light.toggled().toggled(), Appearance::Light);
    }

    #[test]
    fn explicit_preferences_resolve_without_detection() {
        assert_eq!(AppearancePreference::Light.resolve(), Appearance::Light);
        assert_eq!(AppearancePreference::Dark.resolve(), Appearance::Dark);
    }

    #[test]
    fn gnome_color_scheme_values() {
        assert_eq!(
            parse_gnome_color_scheme("'prefer-dark'\n"),
            Some(Appearance::Dark)
        );
        assert_eq!(parse_gnome_color_scheme("'default'"), Some(Appearance::Light));
        assert_eq!(parse_gnome_color_scheme("'something-else'"), None);
    }
}
