use std::{fs, path::Path};

use serde::Deserialize;
use shared::search_params::{DEFAULT_LIMIT, LIMIT_CHOICES};
use tracing::warn;

pub const SETTINGS_FILE_NAME: &str = "posts_admin.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub default_limit: u32,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "https://dummyjson.com".into(),
            default_limit: DEFAULT_LIMIT,
            request_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    default_limit: Option<u32>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then the first settings file that exists, then environment overrides.
pub fn load_settings<P: AsRef<Path>>(candidates: &[P]) -> Settings {
    load_settings_with(candidates, |name| std::env::var(name).ok())
}

fn load_settings_with<P: AsRef<Path>>(
    candidates: &[P],
    lookup: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(path) = candidates.iter().map(|p| p.as_ref()).find(|p| p.is_file()) {
        match fs::read_to_string(path) {
            Ok(raw) => apply_file(&mut settings, &raw, path),
            Err(err) => warn!(path = %path.display(), "config: unreadable settings file: {err}"),
        }
    }

    apply_env(&mut settings, lookup);
    settings
}

fn apply_file(settings: &mut Settings, raw: &str, path: &Path) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(cfg) => cfg,
        Err(err) => {
            warn!(path = %path.display(), "config: ignoring malformed settings file: {err}");
            return;
        }
    };
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = normalize_api_base_url(&v);
    }
    if let Some(v) = file_cfg.default_limit {
        settings.default_limit = sanitize_limit(v);
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v.max(1);
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("POSTS_ADMIN_API_URL") {
        settings.api_base_url = normalize_api_base_url(&v);
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = normalize_api_base_url(&v);
    }

    if let Some(v) = lookup("APP__DEFAULT_LIMIT") {
        if let Ok(parsed) = v.trim().parse::<u32>() {
            settings.default_limit = sanitize_limit(parsed);
        }
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout_secs = parsed.max(1);
        }
    }
}

pub fn normalize_api_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Settings::default().api_base_url;
    }
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

/// Limits outside the pagination choices fall back to the default page size.
fn sanitize_limit(limit: u32) -> u32 {
    if LIMIT_CHOICES.contains(&limit) {
        limit
    } else {
        DEFAULT_LIMIT
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    #[test]
    fn normalizes_base_urls() {
        assert_eq!(
            normalize_api_base_url("https://dummyjson.com/"),
            "https://dummyjson.com"
        );
        assert_eq!(
            normalize_api_base_url("localhost:3000/api"),
            "http://localhost:3000/api"
        );
        assert_eq!(normalize_api_base_url("   "), Settings::default().api_base_url);
    }

    #[test]
    fn env_overrides_apply_in_order() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("POSTS_ADMIN_API_URL", "http://first"),
            ("APP__API_BASE_URL", "http://second/"),
            ("APP__DEFAULT_LIMIT", "30"),
            ("APP__REQUEST_TIMEOUT_SECS", "0"),
        ]);
        let mut settings = Settings::default();
        apply_env(&mut settings, |name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(settings.api_base_url, "http://second");
        assert_eq!(settings.default_limit, 30);
        assert_eq!(settings.request_timeout_secs, 1);
    }

    #[test]
    fn unsupported_limit_falls_back_to_default() {
        let mut settings = Settings::default();
        apply_env(&mut settings, |name| {
            (name == "APP__DEFAULT_LIMIT").then(|| "17".to_string())
        });
        assert_eq!(settings.default_limit, DEFAULT_LIMIT);
    }

    fn temp_root(name: &str) -> std::path::PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let root = env::temp_dir().join(format!("posts_admin_{name}_{suffix}"));
        fs::create_dir_all(&root).expect("temp root");
        root
    }

    #[test]
    fn reads_settings_file_fields() {
        let root = temp_root("fields");
        let path = root.join(SETTINGS_FILE_NAME);
        fs::write(
            &path,
            "api_base_url = \"http://127.0.0.1:4000/\"\ndefault_limit = 20\nrequest_timeout_secs = 5\n",
        )
        .expect("write settings");

        let settings = load_settings_with(&[&path], |_| None);
        assert_eq!(settings.api_base_url, "http://127.0.0.1:4000");
        assert_eq!(settings.default_limit, 20);
        assert_eq!(settings.request_timeout_secs, 5);

        fs::remove_dir_all(root).expect("cleanup");
    }

    #[test]
    fn first_existing_candidate_wins_and_env_overrides_it() {
        let root = temp_root("precedence");
        let missing = root.join("missing").join(SETTINGS_FILE_NAME);
        let first = root.join("first.toml");
        let second = root.join("second.toml");
        fs::write(&first, "api_base_url = \"http://first:1\"\ndefault_limit = 20\n")
            .expect("write first");
        fs::write(&second, "api_base_url = \"http://second:2\"\ndefault_limit = 30\n")
            .expect("write second");
        let candidates = [missing, first, second];

        let settings = load_settings_with(&candidates, |_| None);
        assert_eq!(settings.api_base_url, "http://first:1");
        assert_eq!(settings.default_limit, 20);

        let settings = load_settings_with(&candidates, |name| {
            (name == "APP__DEFAULT_LIMIT").then(|| "30".to_string())
        });
        assert_eq!(settings.api_base_url, "http://first:1");
        assert_eq!(settings.default_limit, 30);

        let settings = load_settings_with(&candidates[..1], |_| None);
        assert_eq!(settings, Settings::default());

        fs::remove_dir_all(root).expect("cleanup");
    }

    #[test]
    fn malformed_file_keeps_defaults() {
        let mut settings = Settings::default();
        apply_file(&mut settings, "default_limit = \"many\"", Path::new("bad.toml"));
        assert_eq!(settings, Settings::default());
    }
}
