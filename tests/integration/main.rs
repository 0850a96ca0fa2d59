//! Integration tests for jlink-online

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Command isolated from the user's config, cache and environment
    fn jlink_online(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("jlink-online");
        cmd.arg("--config")
            .arg(temp.path().join("config.toml"))
            .env("RT_CACHE", temp.path().join("runtimes"))
            .env("TMP", temp.path().join("tmp"))
            .env_remove("PORT")
            .env_remove("MAVEN_CENTRAL")
            .env_remove("LOCAL_ARCH")
            .env_remove("LOCAL_PLATFORM")
            .env_remove("RUST_LOG");
        cmd
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        jlink_online(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("minimized Java runtime"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        jlink_online(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("jlink-online"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        jlink_online(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        jlink_online(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[server]"))
            .stdout(predicate::str::contains("port = 80"));
    }

    #[test]
    fn config_show_applies_environment() {
        let temp = TempDir::new().unwrap();
        jlink_online(&temp)
            .env("PORT", "8080")
            .env("MAVEN_CENTRAL", "true")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("port = 8080"))
            .stdout(predicate::str::contains("enabled = true"));
    }

    #[test]
    fn config_invalid_flag_fails() {
        let temp = TempDir::new().unwrap();
        jlink_online(&temp)
            .env("MAVEN_CENTRAL", "maybe")
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn config_init_writes_file() {
        let temp = TempDir::new().unwrap();
        jlink_online(&temp)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));

        let written = std::fs::read_to_string(temp.path().join("config.toml")).unwrap();
        assert!(written.contains("[release]"));
    }

    #[test]
    fn build_invalid_version_fails() {
        let temp = TempDir::new().unwrap();
        jlink_online(&temp)
            .args(["build", "9a.1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid Java version"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn build_with_artifacts_requires_maven() {
        let temp = TempDir::new().unwrap();
        jlink_online(&temp)
            .args(["build", "11", "--artifacts", "com.google.code.gson:gson:2.8.6"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Maven Central integration is disabled"));
    }

    #[test]
    fn build_invalid_architecture_fails() {
        let temp = TempDir::new().unwrap();
        jlink_online(&temp)
            .args(["build", "11", "--arch", "sparc"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("sparc"));
    }

    #[test]
    fn cache_list_empty() {
        let temp = TempDir::new().unwrap();
        jlink_online(&temp)
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached runtimes"));
    }

    #[test]
    fn cache_clear_empty() {
        let temp = TempDir::new().unwrap();
        jlink_online(&temp)
            .args(["cache", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached runtimes to clear"));
    }

    #[test]
    fn releases_lookup_invalid_version_fails() {
        let temp = TempDir::new().unwrap();
        jlink_online(&temp)
            .args(["releases", "lookup", "9a.1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid Java version"))
            .stderr(predicate::str::contains("panicked").not());
    }

    #[test]
    fn releases_lookup_rejects_alias_below_nine() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.toml"), "[release]\nlts = 8\n").unwrap();
        jlink_online(&temp)
            .args(["releases", "lookup", "lts"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid Java version"));
    }
}
