use dbal::DatabaseConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A loaded `dbal.toml`.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config_dir: PathBuf,
    pub file: ConfigFile,
}

impl ProjectConfig {
    pub fn load(config_path: &Path) -> anyhow::Result<Self> {
        let config_dir = config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let raw = std::fs::read_to_string(config_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to read config file {}: {e}",
                config_path.display()
            )
        })?;

        let file = ConfigFile::parse(&raw).map_err(|e| {
            anyhow::anyhow!(
                "failed to load config file {}: {e:#}",
                config_path.display()
            )
        })?;

        Ok(Self { config_dir, file })
    }

    /// Resolve a relative SQLite path against the config file's directory.
    pub fn database_config(&self) -> DatabaseConfig {
        let mut config = self.file.database.clone();
        let db = Path::new(&config.database);
        if config.database != ":memory:" && db.is_relative() {
            config.database = self.config_dir.join(db).display().to_string();
        }
        config
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,

    #[serde(default)]
    pub database: DatabaseConfig,
}

impl ConfigFile {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut file: ConfigFile = toml::from_str(raw)?;
        file.expand_env()?;
        file.validate()?;
        Ok(file)
    }

    fn expand_env(&mut self) -> anyhow::Result<()> {
        let db = &mut self.database;
        for s in [
            &mut db.host,
            &mut db.user,
            &mut db.password,
            &mut db.database,
            &mut db.driver_name,
            &mut db.table_prefix,
        ] {
            *s = expand_env_vars(s)?;
        }

        for v in db.driver_options.values_mut() {
            *v = expand_env_vars(v)?;
        }

        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }
        if self.database.database.trim().is_empty() {
            anyhow::bail!("database.database must not be empty");
        }
        self.database.validate()?;
        Ok(())
    }
}

fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                anyhow::bail!("unterminated env var reference: ${{{key}}}");
            }
            if key.is_empty() {
                anyhow::bail!("invalid env var reference: ${{}}");
            }

            let v = std::env::var(&key)
                .map_err(|_| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_database_table_with_defaults() {
        let file = ConfigFile::parse(
            r#"
version = "1"

[database]
database = "app.db"
table_prefix = "cms_"
query_logging_enabled = true
"#,
        )
        .unwrap();
        assert_eq!(file.database.driver_name, "sqlite");
        assert_eq!(file.database.table_prefix, "cms_");
        assert!(file.database.query_logging_enabled);
    }

    #[test]
    fn expands_env_references() {
        // SAFETY: test-only env var with a unique name.
        unsafe { std::env::set_var("DBAL_CLI_TEST_PREFIX", "site_") };
        let file = ConfigFile::parse(
            r#"
version = "1"

[database]
table_prefix = "${DBAL_CLI_TEST_PREFIX}"

[database.driver_options]
journal_mode = "WAL"
"#,
        )
        .unwrap();
        assert_eq!(file.database.table_prefix, "site_");
        assert_eq!(file.database.driver_options["journal_mode"], "WAL");
    }

    #[test]
    fn rejects_missing_env_and_bad_version() {
        let err = ConfigFile::parse(
            "version = \"1\"\n[database]\npassword = \"${DBAL_CLI_TEST_MISSING}\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("DBAL_CLI_TEST_MISSING"));

        assert!(ConfigFile::parse("version = \"2\"\n").is_err());
        assert!(ConfigFile::parse("version = \"1\"\n[database]\ntable_prefix = \"a-b\"\n").is_err());
    }

    #[test]
    fn unterminated_reference_fails() {
        assert!(expand_env_vars("${OPEN").is_err());
        assert!(expand_env_vars("${}").is_err());
        assert_eq!(expand_env_vars("plain $ text").unwrap(), "plain $ text");
    }

    #[test]
    fn relative_sqlite_path_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dbal.toml");
        std::fs::write(&path, "version = \"1\"\n[database]\ndatabase = \"data/app.db\"\n").unwrap();

        let project = ProjectConfig::load(&path).unwrap();
        let config = project.database_config();
        assert_eq!(
            PathBuf::from(config.database),
            dir.path().join("data/app.db")
        );
    }
}
