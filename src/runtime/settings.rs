use crate::config::Settings;

/// Effective settings, plus a notice for the status line when the config
/// had to be ignored. The log file alone is easy to miss.
pub struct LoadedSettings {
    pub settings: Settings,
    pub notice: Option<String>,
}

pub fn load_settings() -> LoadedSettings {
    let (settings, notice) = match Settings::load() {
        Ok(s) => match s.validate() {
            Ok(()) => (s, None),
            Err(msg) => {
                tracing::warn!("invalid config, using defaults: {msg}");
                (Settings::default(), Some(format!("invalid config ignored: {msg}")))
            }
        },
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            tracing::warn!("failed to load config, using defaults: {e}");
            (Settings::default(), Some("config unreadable, using defaults".to_string()))
        }
    };
    LoadedSettings { settings, notice }
}
