use crate::cli::ImportArgs;
use crate::config::ProjectConfig;
use dbal::{Database, DatabaseConfig};
use std::path::PathBuf;

fn resolve_config(args: &ImportArgs) -> anyhow::Result<DatabaseConfig> {
    let mut config = if args.config.exists() {
        ProjectConfig::load(&args.config)?.database_config()
    } else {
        let Some(database) = args.database.as_deref() else {
            anyhow::bail!(
                "failed to load config {}; provide --database or create it",
                args.config.display()
            );
        };
        DatabaseConfig::sqlite_file(database)
    };

    if let Some(database) = &args.database {
        config.database = database.clone();
    }
    if let Some(prefix) = &args.prefix {
        config.table_prefix = prefix.clone();
    }
    if args.log {
        config.query_logging_enabled = true;
    }
    config.validate()?;
    Ok(config)
}

/// Run each script in order. Returns the executed statement count per file.
pub fn import_files(db: &Database, files: &[PathBuf]) -> anyhow::Result<Vec<usize>> {
    let mut counts = Vec::with_capacity(files.len());
    for file in files {
        let script = std::fs::read_to_string(file)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", file.display()))?;
        let count = db
            .import(&script)
            .map_err(|e| anyhow::anyhow!("import of {} failed: {e}", file.display()))?;
        tracing::info!(file = %file.display(), statements = count, "script imported");
        counts.push(count);
    }
    Ok(counts)
}

pub fn run(args: ImportArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    let db = Database::new(config)?;

    let counts = import_files(&db, &args.files)?;
    for (file, count) in args.files.iter().zip(&counts) {
        println!("{}: {count} statement(s)", file.display());
    }

    if args.log {
        let summary = db.query_log_summary();
        println!(
            "queries: {}, total: {:.3} ms, slow: {}",
            summary.query_count,
            summary.total_time.as_secs_f64() * 1000.0,
            summary.slow_count
        );
        for entry in db.slow_queries() {
            println!(
                "slow {:.3} ms [{}] {}",
                entry.duration.as_secs_f64() * 1000.0,
                entry.hash,
                entry.formatted_sql
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import_args(config: PathBuf, database: Option<String>) -> ImportArgs {
        ImportArgs {
            config,
            database,
            prefix: None,
            log: false,
            files: Vec::new(),
        }
    }

    #[test]
    fn imports_scripts_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.sql");
        let seed = dir.path().join("seed.sql");
        std::fs::write(
            &schema,
            "-- tables\nCREATE TABLE #__menu (id INTEGER PRIMARY KEY, title TEXT);",
        )
        .unwrap();
        std::fs::write(
            &seed,
            "INSERT INTO #__menu (title) VALUES ('Home');\nINSERT INTO #__menu (title) VALUES ('About');",
        )
        .unwrap();

        let db = Database::new(DatabaseConfig::sqlite_memory().table_prefix("cms_")).unwrap();
        let counts = import_files(&db, &[schema, seed]).unwrap();
        assert_eq!(counts, vec![1, 2]);

        let rows = db.select().from("cms_menu").unwrap().execute().unwrap().rows().unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn failing_script_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.sql");
        std::fs::write(&broken, "INSERT INTO missing VALUES (1);").unwrap();

        let db = Database::new(DatabaseConfig::sqlite_memory()).unwrap();
        let err = import_files(&db, &[broken]).unwrap_err();
        assert!(err.to_string().contains("broken.sql"));
    }

    #[test]
    fn missing_config_requires_database() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("dbal.toml");
        assert!(resolve_config(&import_args(absent.clone(), None)).is_err());

        let mut args = import_args(absent, Some(":memory:".to_string()));
        args.prefix = Some("t_".to_string());
        args.log = true;
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.database, ":memory:");
        assert_eq!(config.table_prefix, "t_");
        assert!(config.query_logging_enabled);
    }

    #[test]
    fn config_file_supplies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dbal.toml");
        std::fs::write(
            &path,
            "version = \"1\"\n[database]\ndatabase = \"app.db\"\ntable_prefix = \"cms_\"\n",
        )
        .unwrap();

        let config = resolve_config(&import_args(path, None)).unwrap();
        assert_eq!(config.table_prefix, "cms_");
        assert_eq!(PathBuf::from(config.database), dir.path().join("app.db"));
    }
}
