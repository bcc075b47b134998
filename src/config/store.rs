//! Persisted profile store.
//!
//! Profiles live under `<config_dir>/profile/`. The `default` profile is
//! synthesized from a built-in commented template on first use; a named
//! profile that does not exist yet starts as a verbatim copy of the default
//! profile's file. A profile that fails to parse is a logged, non-fatal
//! error: resolution continues with whatever was merged so far.

use super::model::Profile;
use crate::context::ConfigContext;
use crate::error::{Result, ShakerError};
use crate::fs::atomic_write_file;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Name of the profile every other profile is seeded from.
pub const DEFAULT_PROFILE_NAME: &str = "default";

/// Ensure the default profile exists and load it.
///
/// Returns the built-in defaults overlaid by whatever the persisted file
/// contains (the synthesized file is all comments, so on first use this is
/// exactly the built-in defaults). Idempotent: a second call leaves the
/// file byte-identical.
pub fn ensure_default_profile(ctx: &ConfigContext) -> Result<Profile> {
    ensure_profile_dir(ctx)?;

    let path = ctx.profile_path(DEFAULT_PROFILE_NAME);
    if !path.is_file() {
        let content = render_default_template()?;
        atomic_write_file(&path, &content)?;
        info!(path = %path.display(), "created default profile");
    }

    let mut profile = Profile::builtin_defaults();
    if let Some(stored) = parse_profile_file(&path) {
        profile.overlay(&stored);
    }
    Ok(profile)
}

/// Load a named profile, creating it from the default profile if missing.
///
/// A missing file is copied verbatim from `profile/default`, so the new
/// profile's content equals the default profile until edited. A parse
/// failure is downgraded to a warning and `None` — the caller keeps its
/// prior merge state.
pub fn load_named_profile(ctx: &ConfigContext, name: &str) -> Result<Option<Profile>> {
    ensure_profile_dir(ctx)?;

    let path = ctx.profile_path(name);
    if !path.is_file() {
        let default_path = ctx.profile_path(DEFAULT_PROFILE_NAME);
        fs::copy(&default_path, &path).map_err(|e| {
            ShakerError::UserError(format!(
                "failed to create profile '{}' from '{}': {}",
                path.display(),
                default_path.display(),
                e
            ))
        })?;
        info!(profile = name, path = %path.display(), "created profile from default");
    }

    Ok(parse_profile_file(&path))
}

/// Persist a parameter set to the named profile file, overwriting any
/// existing content.
pub fn save_profile(profile: &Profile, ctx: &ConfigContext, name: &str) -> Result<()> {
    ensure_profile_dir(ctx)?;

    let path = ctx.profile_path(name);
    let existed = path.is_file();
    atomic_write_file(&path, &profile.to_yaml()?)?;

    if existed {
        info!(profile = name, path = %path.display(), "overwrote profile");
    } else {
        info!(profile = name, path = %path.display(), "created profile");
    }
    Ok(())
}

fn ensure_profile_dir(ctx: &ConfigContext) -> Result<()> {
    let dir = ctx.profile_dir();
    fs::create_dir_all(&dir).map_err(|e| {
        ShakerError::UserError(format!(
            "failed to create profile directory '{}': {}",
            dir.display(),
            e
        ))
    })
}

/// Parse a profile file, recovering from parse errors with a warning.
fn parse_profile_file(path: &Path) -> Option<Profile> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read profile; ignoring it");
            return None;
        }
    };

    match Profile::from_yaml(&content) {
        Ok(profile) => {
            debug!(path = %path.display(), "loaded profile");
            Some(profile)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse profile; ignoring it");
            None
        }
    }
}

/// Populate the commented default-profile template with built-in defaults.
fn render_default_template() -> Result<String> {
    let defaults = Profile::builtin_defaults();
    let mut bindings = tera::Context::new();
    bindings.insert("ssh_port", defaults.ssh_port.as_deref().unwrap_or(""));
    bindings.insert("ec2_zone", defaults.ec2_zone.as_deref().unwrap_or(""));
    bindings.insert(
        "ec2_instance_type",
        defaults.ec2_instance_type.as_deref().unwrap_or(""),
    );
    bindings.insert("ec2_distro", defaults.ec2_distro.as_deref().unwrap_or(""));
    bindings.insert("ec2_size", defaults.ec2_size.as_deref().unwrap_or(""));

    tera::Tera::one_off(DEFAULT_PROFILE_TEMPLATE, &bindings, false)
        .map_err(|e| ShakerError::TemplateError(format!("default profile template: {}", e)))
}

/// Commented template the default profile file is synthesized from. Every
/// key is present but commented out, so the file documents the parameter
/// set without overriding any built-in default.
const DEFAULT_PROFILE_TEMPLATE: &str = "\
####################################################################
# hostname, domain to assign the instance.
####################################################################

#hostname:
#domain:

####################################################################
# Install the user with sudo privileges.  If sudouser is listed
# in ssh_import, the public key will be installed from
# launchpad.net.  From the command line, sudouser defaults to
# $LOGNAME if not otherwise specified.
####################################################################

#sudouser:

####################################################################
# Import public keys from launchpad.net.  Only applicable for
# Ubuntu cloud-init.  User names are comma-separated, no spaces.
####################################################################

#ssh_import:

####################################################################
# ssh_port: You may define a non-standard ssh port, but verify
# it's open in your ec2_security_group.
####################################################################

#ssh_port: {{ ssh_port }}

####################################################################
# timezone:
# e.g. timezone: America/Chicago
####################################################################

#timezone:

####################################################################
# ec2_zone: if not specified, defaults to an arbitrary us-east zone
####################################################################

#ec2_zone: {{ ec2_zone }}

####################################################################
# ec2_instance_type defaults to m1.small
####################################################################

#ec2_instance_type: {{ ec2_instance_type }}

####################################################################
# ec2_ami_id: AMI image to launch.  AMIs are region-specific, so
# specify one matching the region of ec2_zone above.  ec2_ami_id
# overrides ec2_distro below.
####################################################################

#ec2_ami_id:

####################################################################
# ec2_distro: precise, oneiric, natty, squeeze
####################################################################

#ec2_distro: {{ ec2_distro }}

####################################################################
# ec2_size: size of the root partition in GB.  If not specified
# (or zero), defaults to the instance type's size.
####################################################################

#ec2_size: {{ ec2_size }}

####################################################################
# ec2_key_name: name of the key pair used to create the instance.
# If not specified and exactly one key pair is available, that
# pair is used.  Otherwise you must specify one.
####################################################################

#ec2_key_name:

####################################################################
# ec2_security_group: controls port access to the instance
# (ssh, http, etc.)  'default' generally permits port 22.
####################################################################

#ec2_security_group: default

####################################################################
# ec2_monitoring_enabled: CloudWatch monitoring.
####################################################################

#ec2_monitoring_enabled: false

####################################################################
# ec2_root_device: deleted upon termination of the instance.
####################################################################

#ec2_root_device: /dev/sda1

####################################################################
# Send email when configuration is complete to the 'mailto'
# address, relayed through 'relayhost'.
####################################################################

#relayhost:
#mailto:

####################################################################
# salt_master is the location (dns or ip) of the salt master
# to connect to, e.g.: master.example.com
####################################################################

#salt_master:

####################################################################
# salt_id identifies this salt minion.  If not specified,
# defaults to the fully qualified hostname.
####################################################################

#salt_id:
";
