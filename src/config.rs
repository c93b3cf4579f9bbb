use std::{env, fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::resolve::SearchArea;
use crate::{Error, Result};

pub const DEFAULT_CONFIG_PATH: &str = "route_me.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkSettings {
    /// How many landmarks to ask for; 7 or 10 in practice.
    pub max_count: usize,
    pub radius_km: Option<f64>,
    pub within_bounding_box: bool,
    pub poi_categories: Vec<String>,
}

impl Default for LandmarkSettings {
    fn default() -> Self {
        Self {
            max_count: 7,
            radius_km: Some(7.0),
            within_bounding_box: false,
            poi_categories: [
                "tourist_attraction",
                "museum",
                "monument",
                "historic",
                "park",
                "church",
                "place_of_worship",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl LandmarkSettings {
    pub fn search_area(&self) -> SearchArea {
        SearchArea {
            radius_km: self.radius_km,
            within_bounding_box: self.within_bounding_box,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    pub profile: String,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            profile: "mapbox/cycling".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSettings {
    pub model: String,
    /// Word used in the tour prompt, e.g. "bike" or "walking".
    pub activity: String,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            model: "@cf/meta/llama-2-7b-chat-int8".to_string(),
            activity: "bike".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub landmarks: LandmarkSettings,
    pub optimizer: OptimizerSettings,
    pub text: TextSettings,
    pub lookup_cache: Option<PathBuf>,
}

impl Settings {
    pub fn parse_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read `path`; a missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.landmarks.max_count == 0 {
            return Err(Error::config("landmarks.max_count must be at least 1"));
        }
        if let Some(radius) = self.landmarks.radius_km {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(Error::config(format!(
                    "landmarks.radius_km must be a positive number, got {radius}"
                )));
            }
        }
        if self.optimizer.profile.trim().is_empty() {
            return Err(Error::config("optimizer.profile must not be empty"));
        }
        Ok(())
    }
}

/// API secrets, read from the environment (a `.env` file is loaded first).
#[derive(Clone)]
pub struct Credentials {
    pub mapbox_token: String,
    pub cloudflare_account_id: String,
    pub cloudflare_api_token: String,
}

impl Credentials {
    /// Everything `plan` needs: Mapbox and Workers AI.
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Self::from_vars(&env_var)
    }

    /// Only the Mapbox token, for commands that never generate text.
    pub fn mapbox_token_from_env() -> Result<String> {
        load_dotenv();
        require(&env_var, "MAPBOX_TOKEN")
    }

    fn from_vars(vars: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            mapbox_token: require(vars, "MAPBOX_TOKEN")?,
            cloudflare_account_id: require(vars, "CLOUDFLARE_ACCOUNT_ID")?,
            cloudflare_api_token: require(vars, "CLOUDFLARE_API_TOKEN")?,
        })
    }
}

fn load_dotenv() {
    if dotenv::dotenv().is_err() {
        log::debug!("no .env file found");
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok()
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("mapbox_token", &"<redacted>")
            .field("cloudflare_account_id", &self.cloudflare_account_id)
            .field("cloudflare_api_token", &"<redacted>")
            .finish()
    }
}

fn require(vars: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<String> {
    match vars(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::MissingCredential(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let settings = Settings::parse_yaml("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.landmarks.max_count, 7);
        assert_eq!(settings.landmarks.radius_km, Some(7.0));
        assert_eq!(settings.optimizer.profile, "mapbox/cycling");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let settings = Settings::parse_yaml(
            r#"
landmarks:
  max_count: 10
  within_bounding_box: true
text:
  activity: walking
lookup_cache: cache/lookups.json
"#,
        )
        .unwrap();

        assert_eq!(settings.landmarks.max_count, 10);
        assert!(settings.landmarks.within_bounding_box);
        assert_eq!(settings.landmarks.radius_km, Some(7.0));
        assert_eq!(settings.landmarks.poi_categories.len(), 7);
        assert_eq!(settings.text.activity, "walking");
        assert_eq!(settings.text.model, "@cf/meta/llama-2-7b-chat-int8");
        assert_eq!(settings.lookup_cache, Some(PathBuf::from("cache/lookups.json")));
    }

    #[test]
    fn radius_can_be_switched_off() {
        let settings = Settings::parse_yaml("landmarks:\n  radius_km: null\n").unwrap();
        assert_eq!(settings.landmarks.search_area().radius_km, None);
    }

    #[test]
    fn rejects_nonsense_values() {
        assert!(matches!(
            Settings::parse_yaml("landmarks:\n  max_count: 0\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Settings::parse_yaml("landmarks:\n  radius_km: -3\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Settings::parse_yaml("landmarks: [1, 2]"),
            Err(Error::Yaml(_))
        ));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path().join("route_me.yaml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    fn vars(pairs: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let pairs = pairs.to_vec();
        move |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn mapbox_token_alone_is_enough_for_search() {
        let mapbox_only = vars(&[("MAPBOX_TOKEN", "pk.test")]);
        assert_eq!(require(&mapbox_only, "MAPBOX_TOKEN").unwrap(), "pk.test");
        assert!(matches!(
            Credentials::from_vars(&mapbox_only),
            Err(Error::MissingCredential("CLOUDFLARE_ACCOUNT_ID"))
        ));
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let blank = vars(&[
            ("MAPBOX_TOKEN", "pk.test"),
            ("CLOUDFLARE_ACCOUNT_ID", "acct"),
            ("CLOUDFLARE_API_TOKEN", "  "),
        ]);
        assert!(matches!(
            Credentials::from_vars(&blank),
            Err(Error::MissingCredential("CLOUDFLARE_API_TOKEN"))
        ));
    }

    #[test]
    fn credentials_are_redacted_in_debug_output() {
        let credentials = Credentials {
            mapbox_token: "pk.secret".into(),
            cloudflare_account_id: "acct".into(),
            cloudflare_api_token: "cf-secret".into(),
        };
        let printed = format!("{credentials:?}");
        assert!(!printed.contains("secret"));
        assert!(printed.contains("acct"));
    }
}
