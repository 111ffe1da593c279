//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the game-server CLI.

use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the startup banner
    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n   {} {}\n   {}\n",
                "✿ Cloudflower".bright_green().bold(),
                version.dimmed(),
                "game backend server".bright_white()
            );
        } else {
            println!("\n   Cloudflower {}\n   game backend server\n", version);
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a step message (for multi-step operations)
    pub fn step(&self, step_num: u32, total: u32, message: &str) {
        if self.colored {
            println!(
                "  {} {}",
                format!("[{}/{}]", step_num, total).dimmed(),
                message.bright_white()
            );
        } else {
            println!("  [{}/{}] {}", step_num, total, message);
        }
    }

    /// Print a file creation message
    pub fn created(&self, file_type: &str, path: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "✓".green().bold(),
                file_type.dimmed(),
                path.bright_white()
            );
        } else {
            println!("  [CREATED] {} {}", file_type, path);
        }
    }

    /// Print a file skipped message
    pub fn skipped(&self, path: &str, reason: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "○".yellow(),
                path.dimmed(),
                format!("({})", reason).yellow()
            );
        } else {
            println!("  [SKIPPED] {} ({})", path, reason);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "›".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print a command suggestion
    pub fn command(&self, cmd: &str) {
        if self.colored {
            println!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            println!("     $ {}", cmd);
        }
    }

    /// Print completion message
    pub fn complete(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.bright_green().bold());
        } else {
            println!("\n  [DONE] {}", message);
        }
    }

    /// Print a table header row
    pub fn table_header(&self, columns: &[&str]) {
        let header = pad_columns(columns);
        if self.colored {
            println!("    {}", header.bright_white().bold());
            println!("    {}", "─".repeat(columns.len() * 16).dimmed());
        } else {
            println!("    {}", header);
            println!("    {}", "-".repeat(columns.len() * 16));
        }
    }

    /// Print a table row
    pub fn table_row(&self, values: &[&str]) {
        println!("    {}", pad_columns(values));
    }
}

fn pad_columns(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("{:<15}", v))
        .collect::<Vec<_>>()
        .join(" ")
}
