//! Config load validation tests for pokedex-config.
// pokedex-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding, source).
// Purpose: Ensure config input handling is strict and defaults apply only to
//          the implicit config file.
// =============================================================================

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use pokedex_config::ConfigError;
use pokedex_config::HistoryStoreType;
use pokedex_config::PokedexConfig;
use tempfile::NamedTempFile;
use tempfile::TempDir;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<PokedexConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn no_env(_: &str) -> Option<String> {
    None
}

fn write_config(contents: &str) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(contents.as_bytes()).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(PokedexConfig::load_with_env(Some(path), no_env), "config path exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(PokedexConfig::load_with_env(Some(path), no_env), "config path component too long")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'a'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(
        PokedexConfig::load_with_env(Some(file.path()), no_env),
        "config file exceeds size limit",
    )
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(
        PokedexConfig::load_with_env(Some(file.path()), no_env),
        "config file must be utf-8",
    )
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let file = write_config("[server\nbind = ")?;
    assert_invalid(PokedexConfig::load_with_env(Some(file.path()), no_env), "config parse error")
}

#[test]
fn load_rejects_missing_explicit_file() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    assert_invalid(PokedexConfig::load_with_env(Some(&path), no_env), "config io error")
}

#[test]
fn load_rejects_missing_file_named_by_env() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml").to_string_lossy().to_string();
    let result = PokedexConfig::load_with_env(None, |key| {
        (key == "POKEDEX_CONFIG").then(|| path.clone())
    });
    assert_invalid(result, "config io error")
}

#[test]
fn load_reads_file_named_by_env() -> TestResult {
    let file = write_config("[server]\nbind = \"127.0.0.1:4100\"\n")?;
    let path = file.path().to_string_lossy().to_string();
    let config = PokedexConfig::load_with_env(None, |key| {
        (key == "POKEDEX_CONFIG").then(|| path.clone())
    })
    .map_err(|err| err.to_string())?;
    if config.server.bind != "127.0.0.1:4100" {
        return Err(format!("unexpected bind {}", config.server.bind));
    }
    if config.source_path.as_deref() != Some(file.path()) {
        return Err("source_path should record the loaded file".to_string());
    }
    Ok(())
}

#[test]
fn load_applies_env_overrides_after_file() -> TestResult {
    let file = write_config(
        "[server]\nbind = \"0.0.0.0:3000\"\n\n[history_store]\ntype = \"memory\"\n",
    )?;
    let env: HashMap<&str, &str> = HashMap::from([
        ("PORT", "8080"),
        ("POKEDEX_DATABASE", "/tmp/override.db"),
        ("POKEDEX_BACKEND_URL", "http://backend.internal:8080"),
    ]);
    let config =
        PokedexConfig::load_with_env(Some(file.path()), |key| env.get(key).map(ToString::to_string))
            .map_err(|err| err.to_string())?;
    if config.server.bind != "0.0.0.0:8080" {
        return Err(format!("PORT not applied: {}", config.server.bind));
    }
    if config.history_store.store_type != HistoryStoreType::Sqlite {
        return Err("POKEDEX_DATABASE should select sqlite".to_string());
    }
    if config.history_store.sqlite_path() != Path::new("/tmp/override.db") {
        return Err("POKEDEX_DATABASE path not applied".to_string());
    }
    if config.client.backend_url != "http://backend.internal:8080" {
        return Err("POKEDEX_BACKEND_URL not applied".to_string());
    }
    Ok(())
}

#[test]
fn load_rejects_non_numeric_port_override() -> TestResult {
    let file = write_config("")?;
    let result = PokedexConfig::load_with_env(Some(file.path()), |key| {
        (key == "PORT").then(|| "eighty".to_string())
    });
    assert_invalid(result, "PORT must be a port number")
}
