use std::env;
use std::io::{self, BufRead, IsTerminal};
use std::sync::Arc;

use fieldsync_core::{
    Authentication, Credentials, HttpUserService, Task, UserAuthenticateTask,
};

use crate::commands::common::open_database;
use crate::config::Settings;
use crate::error::CliError;

const PASSWORD_ENV: &str = "FIELDSYNC_PASSWORD";

pub fn run_login(
    username: &str,
    server: Option<&str>,
    settings: &Settings,
) -> Result<(), CliError> {
    let server_url = match server {
        Some(url) => url.to_string(),
        None => settings.engine.require_server_url()?,
    };
    let credentials = Credentials::new(username, read_password()?)?;
    let service = Arc::new(HttpUserService::new(&server_url)?);
    let database = open_database(&settings.db_path)?.into_shared();

    let task = Arc::new(UserAuthenticateTask::new(database, service, credentials));
    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(task.execute_async(runtime.handle()).join())?;

    match outcome {
        Authentication::Authenticated(user) => {
            let name = user
                .identity
                .display_name
                .as_deref()
                .or(user.identity.name.as_deref())
                .unwrap_or(username);
            println!("Signed in as {name}");
            Ok(())
        }
        Authentication::Rejected { status, message } => Err(CliError::Rejected { status, message }),
    }
}

fn read_password() -> Result<String, CliError> {
    if let Ok(password) = env::var(PASSWORD_ENV) {
        if !password.is_empty() {
            return Ok(password);
        }
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprint!("Password: ");
    }
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(CliError::MissingPassword);
    }
    Ok(password)
}
