use super::ConfigurationError;
use super::toml::ConfigToml;
use anyhow::Context as _;
use config::{ConfigBuilder, Environment, File, FileFormat, builder::AsyncState};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt as _;

const SNAPCHECK_HELP_TOML: &str = include_str!("../../snapcheck-help.toml");
const DEFAULT_CONFIG_FILE: &str = "snapcheck.toml";
const ENV_PREFIX: &str = "snapcheck";

/// Variables read by earlier deployments, mapped to their configuration keys.
/// They have the lowest priority.
const LEGACY_ENV_VARS: [(&str, &str); 4] = [
    ("INSTANCE_ID", "target.instance_id"),
    ("SNS_TOPIC", "notification.topic_arn"),
    ("REGION", "aws.region"),
    ("credential-profile", "aws.profile"),
];

pub(crate) struct ConfigHolder {
    snapcheck_toml: Option<PathBuf>,
}

impl ConfigHolder {
    pub(crate) async fn generate_default_config(
        dst: Option<PathBuf>,
        overwrite: bool,
    ) -> Result<(), anyhow::Error> {
        let dst = dst.unwrap_or(PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .create_new(!overwrite) // `create` is ignored when set, an existing file is an error.
            .open(&dst)
            .await
            .with_context(|| {
                format!(
                    "cannot open {dst:?} for writing{}",
                    if !overwrite {
                        ", try using `--overwrite`"
                    } else {
                        ""
                    }
                )
            })?;
        file.write_all(SNAPCHECK_HELP_TOML.as_bytes())
            .await
            .with_context(|| format!("cannot write to {dst:?}"))?;
        println!("Generated {dst:?}");
        Ok(())
    }

    /// An explicit path must exist. Otherwise `snapcheck.toml` is looked up in
    /// the current directory, then in the platform config directory; running
    /// without a file is allowed.
    pub(crate) fn new(
        project_dirs: Option<&ProjectDirs>,
        config: Option<PathBuf>,
    ) -> Result<Self, ConfigurationError> {
        let snapcheck_toml = if let Some(config) = config {
            if !config.try_exists().unwrap_or_default() {
                return Err(ConfigurationError::FileNotFound(config));
            }
            Some(config)
        } else {
            [
                Some(PathBuf::from(DEFAULT_CONFIG_FILE)),
                project_dirs.map(|dirs| dirs.config_dir().join(DEFAULT_CONFIG_FILE)),
            ]
            .into_iter()
            .flatten()
            .find(|candidate| candidate.try_exists().unwrap_or_default())
        };
        Ok(Self { snapcheck_toml })
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        self.snapcheck_toml.as_deref()
    }

    pub(crate) async fn load_config(&self) -> Result<ConfigToml, ConfigurationError> {
        self.load_config_from(std::env::vars().collect()).await
    }

    async fn load_config_from(
        &self,
        env: config::Map<String, String>,
    ) -> Result<ConfigToml, ConfigurationError> {
        let mut builder = ConfigBuilder::<AsyncState>::default();
        for (var, key) in LEGACY_ENV_VARS {
            if let Some(value) = env.get(var) {
                builder = builder.set_default(key, value.as_str())?;
            }
        }
        if let Some(snapcheck_toml) = self.snapcheck_toml.as_deref() {
            builder = builder.add_source(
                File::from(snapcheck_toml)
                    .required(true)
                    .format(FileFormat::Toml),
            );
        }
        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .source(Some(env)),
            )
            .build()
            .await?;
        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml::log::LoggingStyle;
    use assert_matches::assert_matches;
    use std::io::Write as _;
    use verifier::{FailurePolicy, InvocationConfig};

    const TOML: &str = r#"
[target]
instance_id = "i-from-file"

[notification]
topic_arn = "arn:aws:sns:ap-northeast-1:123456789012:backup"

[aws]
region = "ap-northeast-1"
profile = "backup"

[verification]
utc_offset = "+09:00"
failure_policy = "fail_fast"

[log.stdout]
style = "json"
level = "debug"
"#;

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn env(vars: &[(&str, &str)]) -> config::Map<String, String> {
        vars.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[tokio::test]
    async fn file_is_loaded() {
        let file = toml_file(TOML);
        let holder = ConfigHolder::new(None, Some(file.path().to_path_buf())).unwrap();
        let config = holder.load_config_from(env(&[])).await.unwrap();
        assert_eq!(Some("i-from-file"), config.target.instance_id.as_deref());
        assert_eq!(Some("backup"), config.aws.profile.as_deref());
        assert_eq!(LoggingStyle::Json, config.log.stdout.style);
        assert!(config.log.stdout.enabled);
        let check_config = config.verify().unwrap();
        assert_eq!(FailurePolicy::FailFast, check_config.invocation.failure_policy);
    }

    #[tokio::test]
    async fn prefixed_env_overrides_file() {
        let file = toml_file(TOML);
        let holder = ConfigHolder::new(None, Some(file.path().to_path_buf())).unwrap();
        let config = holder
            .load_config_from(env(&[
                ("SNAPCHECK__TARGET__INSTANCE_ID", "i-from-env"),
                ("INSTANCE_ID", "i-legacy"),
            ]))
            .await
            .unwrap();
        assert_eq!(Some("i-from-env"), config.target.instance_id.as_deref());
    }

    #[tokio::test]
    async fn legacy_env_vars_without_file() {
        let holder = ConfigHolder {
            snapcheck_toml: None,
        };
        let config = holder
            .load_config_from(env(&[
                ("INSTANCE_ID", "i-legacy"),
                ("SNS_TOPIC", "arn:aws:sns:us-east-1:1:legacy"),
                ("REGION", "us-east-1"),
                ("credential-profile", "ops"),
            ]))
            .await
            .unwrap();
        let check_config = config.verify().unwrap();
        assert_eq!("i-legacy", &*check_config.instance_id);
        assert_eq!("arn:aws:sns:us-east-1:1:legacy", check_config.topic.as_str());
        assert_eq!("us-east-1", check_config.aws.region);
        assert_eq!(Some("ops"), check_config.aws.profile.as_deref());
    }

    #[tokio::test]
    async fn missing_instance_id_is_a_configuration_error() {
        let holder = ConfigHolder {
            snapcheck_toml: None,
        };
        let config = holder
            .load_config_from(env(&[("REGION", "us-east-1")]))
            .await
            .unwrap();
        assert_matches!(
            config.verify(),
            Err(ConfigurationError::MissingParameter("target.instance_id"))
        );
    }

    #[tokio::test]
    async fn unknown_keys_are_rejected() {
        let file = toml_file("[target]\ninstance = \"i-typo\"\n");
        let holder = ConfigHolder::new(None, Some(file.path().to_path_buf())).unwrap();
        assert_matches!(
            holder.load_config_from(env(&[])).await,
            Err(ConfigurationError::Load(_))
        );
    }

    #[test]
    fn explicit_path_must_exist() {
        assert_matches!(
            ConfigHolder::new(None, Some(PathBuf::from("/nonexistent/snapcheck.toml"))),
            Err(ConfigurationError::FileNotFound(_))
        );
    }

    #[test]
    fn help_toml_is_valid() {
        let config: ConfigToml = config::Config::builder()
            .add_source(File::from_str(SNAPCHECK_HELP_TOML, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        let check_config = config.verify().unwrap();
        assert_eq!(InvocationConfig::default(), check_config.invocation);
        assert!(SNAPCHECK_HELP_TOML.contains("`fail_fast`: stop at the first failed"));
    }

    #[tokio::test]
    async fn generated_config_is_not_overwritten_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("snapcheck.toml");
        ConfigHolder::generate_default_config(Some(dst.clone()), false)
            .await
            .unwrap();
        assert_eq!(SNAPCHECK_HELP_TOML, std::fs::read_to_string(&dst).unwrap());
        assert!(
            ConfigHolder::generate_default_config(Some(dst.clone()), false)
                .await
                .is_err()
        );
        ConfigHolder::generate_default_config(Some(dst), true)
            .await
            .unwrap();
    }
}
