use tally_core::session::{SessionProvider, StoredSession};

use crate::auth::{clear_stored_session, load_stored_session, save_stored_session};
use crate::cli::AuthCommands;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub fn run_auth(command: AuthCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;

    match command {
        AuthCommands::Login {
            profile,
            email,
            token,
        } => {
            let profile_name = config.resolve_profile_name(profile.as_deref().or(global_profile));
            let session = StoredSession::new(token, email)?;
            save_stored_session(&profile_name, &session)?;
            tracing::debug!(profile = %profile_name, ?session, "Stored session");
            println!("Signed in profile '{profile_name}' as {}", session.email);
            Ok(())
        }
        AuthCommands::Status { profile } => {
            let profile_name = config.resolve_profile_name(profile.as_deref().or(global_profile));
            let session = load_stored_session(&profile_name)?;
            match session.principal_identifier() {
                Some(email) => println!("Profile '{profile_name}' is signed in as {email}"),
                None => println!("Profile '{profile_name}' is not signed in."),
            }
            Ok(())
        }
        AuthCommands::Logout { profile } => {
            let profile_name = config.resolve_profile_name(profile.as_deref().or(global_profile));
            clear_stored_session(&profile_name)?;
            println!("Signed out profile '{profile_name}'");
            Ok(())
        }
    }
}
