use std::{env, env::VarError};

/// The server takes no arguments. Passing any prints the help text and the current configuration instead.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // MPG_MIDTRANS_SERVER_KEY is deliberately absent
    const DISPLAY_ENVS: [&str; 12] = [
        "RUST_LOG",
        "MPG_HOST",
        "MPG_PORT",
        "MPG_DATABASE_URL",
        "MPG_DB_MAX_CONNECTIONS",
        "MPG_MIDTRANS_CLIENT_KEY",
        "MPG_MIDTRANS_PRODUCTION",
        "MPG_MIDTRANS_TIMEOUT_SECS",
        "MPG_SIGNATURE_CHECKS",
        "MPG_CALLBACK_FINISH_URL",
        "MPG_CALLBACK_UNFINISH_URL",
        "MPG_CALLBACK_ERROR_URL",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
