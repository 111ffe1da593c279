//! Init command implementation
//!
//! Scaffolds a new game server deployment: `game.toml`, an `.env.example`
//! with freshly generated secrets, and the `data/` directory.

use super::output::Output;
use rand::RngCore;
use std::fs;
use std::path::Path;

/// Result of the init operation
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// Project already exists (game.toml found)
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: std::path::PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// Leave the starter item and quest catalog out of game.toml
    pub no_catalog: bool,
    /// Host address for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing game server");

    let base_path = &config.path;

    let config_path = base_path.join("game.toml");
    if config_path.exists() && !config.force {
        output.warning("game.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    output.step(1, 3, "Creating directories");
    let data_dir = base_path.join("data");
    if data_dir.exists() {
        output.skipped("data", "already exists");
    } else if let Err(e) = fs::create_dir_all(&data_dir) {
        output.error(&format!("Failed to create data: {}", e));
        return InitResult::Error(e.to_string());
    } else {
        output.created("directory", "data");
    }

    output.step(2, 3, "Writing configuration");
    let toml_content = generate_game_toml(&config);
    if let Err(e) = write_file(&config_path, &toml_content, config.force) {
        output.error(&format!("Failed to create game.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", "game.toml");

    let env_example_path = base_path.join(".env.example");
    let env_content = generate_env_example(&generate_secret(), &generate_secret());
    if let Err(e) = write_file(&env_example_path, &env_content, config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("env", ".env.example");

    output.step(3, 3, "Writing .gitignore");
    let gitignore_path = base_path.join(".gitignore");
    if gitignore_path.exists() {
        output.skipped(".gitignore", "already exists");
    } else if let Err(e) = write_file(&gitignore_path, GITIGNORE, false) {
        output.warning(&format!("Failed to create .gitignore: {}", e));
    } else {
        output.created("file", ".gitignore");
    }

    output.complete("Game server initialized successfully!");

    output.header("Next Steps");
    output.info("1. Review the generated secrets and activate them:");
    output.command("cp .env.example .env");
    output.info("2. Start the server:");
    output.command("game-server");

    output.hint(&format!(
        "Server will be available at http://{}:{}",
        config.host, config.port
    ));
    output.hint("OpenAPI document is served at /api-docs/openapi.json");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(()); // Skip existing files unless force is true
    }
    fs::write(path, content)
}

/// 32 random bytes, hex encoded.
fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn generate_game_toml(config: &InitConfig) -> String {
    let mut content = format!(
        r#"# Game server configuration
# Secrets are read from the environment variables named in [auth].

[server]
host = "{host}"
port = {port}
log_level = "info"
# "text" or "json"
log_format = "text"

[auth]
jwt_secret_env = "JWT_SECRET"
pepper_env = "PASSWORD_PEPPER"

[database]
# ":memory:" for a throwaway database, or a file path
url = "./data/game.db"
# turso_url_env = "TURSO_URL"
# turso_token_env = "TURSO_AUTH_TOKEN"
"#,
        host = config.host,
        port = config.port
    );

    if !config.no_catalog {
        content.push_str(STARTER_CATALOG);
    }

    content
}

const STARTER_CATALOG: &str = r#"
# Catalog entries are inserted at startup when their id is not taken yet.
[[catalog.items]]
id = 1
name = "Rusty Sword"
description = "Better than bare hands."
item_type = "weapon"

[[catalog.items]]
id = 2
name = "Health Potion"
description = "Restores a little health."
item_type = "consumable"

[[catalog.quests]]
id = 1
name = "First Steps"
description = "Explore the starting zone."
reward_xp = 50
"#;

fn generate_env_example(jwt_secret: &str, pepper: &str) -> String {
    format!(
        r#"# Game server environment variables
# Copy this file to .env. The secrets below were generated by `game-server init`.

# REQUIRED: token signing secret (minimum 32 bytes)
JWT_SECRET={jwt_secret}

# REQUIRED: appended to every password before hashing.
# Changing it invalidates every stored password.
PASSWORD_PEPPER={pepper}

# Optional: log filter, overrides server.log_level
RUST_LOG=info

# Optional: Turso cloud database (requires the `turso` feature)
# TURSO_URL=libsql://your-db.turso.io
# TURSO_AUTH_TOKEN=your-token
"#
    )
}

const GITIGNORE: &str = r#"/data/
*.db
*.db-journal
*.db-wal
*.db-shm

.env
.env.local

/target/
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::toml_config::GameConfig;
    use tempfile::TempDir;

    fn create_test_config(temp_dir: &TempDir) -> InitConfig {
        InitConfig {
            path: temp_dir.path().to_path_buf(),
            force: false,
            no_catalog: false,
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }

    #[test]
    fn test_generated_toml_parses() {
        let config = InitConfig {
            path: std::path::PathBuf::from("/tmp"),
            force: false,
            no_catalog: false,
            host: "0.0.0.0".to_string(),
            port: 8080,
        };

        let parsed: GameConfig =
            toml::from_str(&generate_game_toml(&config)).expect("generated toml must parse");

        assert_eq!(parsed.bind_addr(), "0.0.0.0:8080");
        assert_eq!(parsed.auth.pepper_env, "PASSWORD_PEPPER");
        assert_eq!(parsed.database.url, "./data/game.db");
        assert_eq!(parsed.catalog.items.len(), 2);
        assert_eq!(parsed.catalog.quests[0].reward_xp, 50);
    }

    #[test]
    fn test_generated_toml_without_catalog() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = InitConfig {
            no_catalog: true,
            ..create_test_config(&temp_dir)
        };

        let parsed: GameConfig = toml::from_str(&generate_game_toml(&config)).unwrap();
        assert!(parsed.catalog.items.is_empty());
        assert!(parsed.catalog.quests.is_empty());
    }

    #[test]
    fn test_generate_secret() {
        let a = generate_secret();
        let b = generate_secret();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_env_example() {
        let content = generate_env_example("s3cret", "p3pper");

        assert!(content.contains("JWT_SECRET=s3cret"));
        assert!(content.contains("PASSWORD_PEPPER=p3pper"));
        assert!(content.contains("RUST_LOG"));
    }

    #[test]
    fn test_write_file_skips_existing_without_force() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("test.txt");

        fs::write(&file_path, "original").expect("Failed to write");
        write_file(&file_path, "new content", false).unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "original");

        write_file(&file_path, "new content", true).unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_run_creates_all_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let output = Output::no_color();

        let result = run(create_test_config(&temp_dir), &output);
        assert!(matches!(result, InitResult::Success));

        assert!(temp_dir.path().join("game.toml").exists());
        assert!(temp_dir.path().join(".gitignore").exists());
        assert!(temp_dir.path().join("data").is_dir());

        let env = fs::read_to_string(temp_dir.path().join(".env.example")).unwrap();
        let secret = env
            .lines()
            .find_map(|l| l.strip_prefix("JWT_SECRET="))
            .expect("JWT_SECRET line");
        assert!(secret.len() >= 32);
    }

    #[test]
    fn test_run_already_exists_without_force() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("game.toml"), "existing").expect("Failed to write");

        let result = run(create_test_config(&temp_dir), &Output::no_color());

        assert!(matches!(result, InitResult::AlreadyExists));
        assert!(!temp_dir.path().join(".env.example").exists());
    }

    #[test]
    fn test_run_force_overwrites() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("game.toml"), "existing").expect("Failed to write");

        let config = InitConfig {
            force: true,
            ..create_test_config(&temp_dir)
        };
        let result = run(config, &Output::no_color());
        assert!(matches!(result, InitResult::Success));

        let content =
            fs::read_to_string(temp_dir.path().join("game.toml")).expect("Failed to read");
        assert!(content.contains("[server]"));
        assert!(!content.contains("existing"));
    }
}
