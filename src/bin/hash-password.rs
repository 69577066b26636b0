//! Prints a bcrypt hash for seeding or resetting the `admin_password` setting.

use bcrypt::{hash, DEFAULT_COST};
use portfolio_cms::auth::MIN_PASSWORD_LEN;
use portfolio_cms::settings::ADMIN_PASSWORD_KEY;
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    let Some(password) = env::args().nth(1) else {
        eprintln!("Usage: cargo run --bin hash-password <PASSWORD>");
        return ExitCode::FAILURE;
    };

    if password.chars().count() < MIN_PASSWORD_LEN {
        eprintln!(
            "Warning: the admin panel only accepts new passwords of at least {} characters",
            MIN_PASSWORD_LEN
        );
    }

    match hash(&password, DEFAULT_COST) {
        Ok(hashed) => {
            println!("\nCost : {}", DEFAULT_COST);
            println!("Hash : {}\n", hashed);
            println!("# Store this as the value of the `{}` setting:", ADMIN_PASSWORD_KEY);
            println!("{}", serde_json::json!({ "hash": hashed }));
            println!("\n# For example:");
            println!(
                "UPDATE admin_settings SET value = '{}'::jsonb, updated_at = now() WHERE key = '{}';",
                serde_json::json!({ "hash": hashed }),
                ADMIN_PASSWORD_KEY
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error hashing password: {}", e);
            ExitCode::FAILURE
        }
    }
}
