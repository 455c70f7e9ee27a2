use crate::error::{Error, Result};
use crate::job::MAX_CAPTURE_SECS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Capture settings shared by every recording request
///
/// Keys missing from a stored file take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the recorder service
    #[serde(alias = "recording_computer_url")]
    pub recorder_endpoint: String,

    /// Countdown applied when a request does not carry one (seconds)
    pub countdown_duration: f64,

    /// Capture duration per articulation (seconds)
    pub articulation_durations: BTreeMap<String, f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            recorder_endpoint: "http://recording-computer.local:5001".to_string(),
            countdown_duration: 3.0,
            articulation_durations: BTreeMap::from([
                ("short".to_string(), 0.5),
                ("long".to_string(), 2.0),
            ]),
        }
    }
}

impl Settings {
    /// Return a copy with every field present in `patch` overwritten
    pub fn merged(&self, patch: &SettingsPatch) -> Self {
        let mut merged = self.clone();
        if let Some(endpoint) = &patch.recorder_endpoint {
            merged.recorder_endpoint = endpoint.clone();
        }
        if let Some(countdown) = patch.countdown_duration {
            merged.countdown_duration = countdown;
        }
        if let Some(durations) = &patch.articulation_durations {
            merged.articulation_durations = durations.clone();
        }
        merged
    }

    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.recorder_endpoint).map_err(|e| {
            Error::InvalidSettings(format!(
                "recorder_endpoint {:?} is not a valid URL: {}",
                self.recorder_endpoint, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidSettings(format!(
                "recorder_endpoint must be http or https, got {}",
                url.scheme()
            )));
        }

        let countdown = self.countdown_duration;
        if !countdown.is_finite() || countdown < 0.0 || countdown > MAX_CAPTURE_SECS {
            return Err(Error::InvalidSettings(format!(
                "countdown_duration must be between 0 and {}, got {}",
                MAX_CAPTURE_SECS, countdown
            )));
        }

        for (articulation, duration) in &self.articulation_durations {
            if !duration.is_finite() || *duration <= 0.0 || *duration > MAX_CAPTURE_SECS {
                return Err(Error::InvalidSettings(format!(
                    "duration for articulation {:?} must be > 0 and at most {}, got {}",
                    articulation, MAX_CAPTURE_SECS, duration
                )));
            }
        }

        Ok(())
    }

    /// Capture duration for an articulation, 1.0s when it is not listed
    pub fn duration_for(&self, articulation: &str) -> f64 {
        self.articulation_durations
            .get(articulation)
            .copied()
            .unwrap_or(1.0)
    }
}

/// Partial settings update; absent keys are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsPatch {
    #[serde(default, alias = "recording_computer_url")]
    pub recorder_endpoint: Option<String>,
    #[serde(default)]
    pub countdown_duration: Option<f64>,
    #[serde(default)]
    pub articulation_durations: Option<BTreeMap<String, f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_leaves_absent_keys_untouched() {
        let settings = Settings::default();
        let patch: SettingsPatch = serde_json::from_str(r#"{"countdown_duration": 5}"#).unwrap();

        let merged = settings.merged(&patch);

        assert_eq!(merged.countdown_duration, 5.0);
        assert_eq!(merged.articulation_durations, settings.articulation_durations);
        assert_eq!(merged.recorder_endpoint, settings.recorder_endpoint);
    }

    #[test]
    fn test_merge_replaces_articulation_table() {
        let settings = Settings::default();
        let patch: SettingsPatch =
            serde_json::from_str(r#"{"articulation_durations": {"staccato": 0.3}}"#).unwrap();

        let merged = settings.merged(&patch);

        assert_eq!(merged.articulation_durations.len(), 1);
        assert_eq!(merged.duration_for("staccato"), 0.3);
        assert_eq!(merged.duration_for("long"), 1.0);
    }

    #[test]
    fn test_patch_rejects_unknown_keys() {
        let result = serde_json::from_str::<SettingsPatch>(r#"{"volume": 11}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_legacy_endpoint_key() {
        let settings: Settings = serde_json::from_str(
            r#"{
                "recording_computer_url": "http://10.0.0.2:5001",
                "countdown_duration": 2,
                "articulation_durations": {}
            }"#,
        )
        .unwrap();
        assert_eq!(settings.recorder_endpoint, "http://10.0.0.2:5001");
    }

    #[test]
    fn test_validate() {
        assert!(Settings::default().validate().is_ok());

        let mut bad = Settings::default();
        bad.countdown_duration = -1.0;
        assert!(matches!(bad.validate(), Err(Error::InvalidSettings(_))));

        let mut bad = Settings::default();
        bad.articulation_durations.insert("short".into(), 0.0);
        assert!(bad.validate().is_err());

        let mut bad = Settings::default();
        bad.recorder_endpoint = "not a url".into();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_validate_caps_durations() {
        let mut settings = Settings::default();
        settings
            .articulation_durations
            .insert("drone".into(), MAX_CAPTURE_SECS);
        assert!(settings.validate().is_ok());

        settings.articulation_durations.insert("drone".into(), 1e12);
        assert!(matches!(settings.validate(), Err(Error::InvalidSettings(_))));

        let mut bad = Settings::default();
        bad.countdown_duration = MAX_CAPTURE_SECS * 2.0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"countdown_duration": 1}"#).unwrap();

        assert_eq!(settings.countdown_duration, 1.0);
        assert_eq!(settings.recorder_endpoint, Settings::default().recorder_endpoint);
        assert_eq!(
            settings.articulation_durations,
            Settings::default().articulation_durations
        );
    }
}
