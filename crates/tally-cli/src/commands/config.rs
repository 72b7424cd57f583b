use tally_core::config::normalize_base_url;
use tally_core::util::normalize_text_option;

use crate::cli::ConfigCommands;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            api_base_url,
            timeout_secs,
            no_activate,
        } => run_config_init(
            profile.as_deref().or(global_profile),
            api_base_url,
            timeout_secs,
            no_activate,
        ),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    api_base_url: Option<String>,
    timeout_secs: Option<u64>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);

    apply_profile_update(&mut config, &profile_name, api_base_url, timeout_secs, no_activate)?;

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );
    println!(
        "Run `tally auth login --email <email> --token <token>` to enable sync for '{profile_name}'."
    );
    Ok(())
}

/// Merge CLI values into `config`, validating the API base URL.
pub fn apply_profile_update(
    config: &mut CliProfilesConfig,
    profile_name: &str,
    api_base_url: Option<String>,
    timeout_secs: Option<u64>,
    no_activate: bool,
) -> Result<(), CliError> {
    let api_base_url = normalize_text_option(api_base_url)
        .map(normalize_base_url)
        .transpose()
        .map_err(CliError::Config)?;
    if timeout_secs == Some(0) {
        return Err(CliError::Config(
            "timeout_secs must be greater than zero".to_string(),
        ));
    }

    let profile = config.profile_mut_or_default(profile_name);
    if let Some(url) = api_base_url {
        profile.api_base_url = Some(url);
    }
    if let Some(secs) = timeout_secs {
        profile.request_timeout_secs = Some(secs);
    }

    if !no_activate {
        config.active_profile = Some(profile_name.to_string());
    }
    Ok(())
}
