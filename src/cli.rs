//! CLI argument parsing for shaker.
//!
//! Uses clap derive macros for declarative argument definitions. The
//! profile positional is required unless `--ami` or `--distro` compensates;
//! clap prints usage and exits non-zero when neither is given.

use crate::config::{CliOverrides, SizePolicy};
use crate::error::{Result, ShakerError};
use crate::userdata::TemplateOverrides;
use clap::Parser;
use std::path::PathBuf;

/// Shaker: build and launch EC2 instances as salt minions.
#[derive(Parser, Debug)]
#[command(name = "shaker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Profile to launch from (created from the default profile if new).
    #[arg(value_name = "PROFILE", required_unless_present_any = ["ami", "distro"])]
    pub profile: Option<String>,

    /// AMI image id to launch (overrides any profile value).
    #[arg(long, value_name = "AMI_ID")]
    pub ami: Option<String>,

    /// Distro release to resolve to an AMI (e.g. precise, squeeze, ubuntu).
    #[arg(long, value_name = "RELEASE")]
    pub distro: Option<String>,

    /// EC2 security group controlling port access.
    #[arg(long = "security-group", value_name = "GROUP")]
    pub security_group: Option<String>,

    /// Key pair used to create the instance.
    #[arg(long = "key-name", value_name = "NAME")]
    pub key_name: Option<String>,

    /// EC2 region for image lookup and API calls (default: derived from the zone).
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,

    /// EC2 availability zone to launch into.
    #[arg(long, value_name = "ZONE")]
    pub zone: Option<String>,

    /// EC2 instance type (e.g. m1.small).
    #[arg(long = "instance-type", value_name = "TYPE")]
    pub instance_type: Option<String>,

    /// Root partition size in GB (0 = instance-type default).
    #[arg(long, value_name = "GB")]
    pub size: Option<String>,

    /// SSH port the instance will listen on.
    #[arg(long = "ssh-port", value_name = "PORT")]
    pub ssh_port: Option<String>,

    /// Hostname to assign the instance.
    #[arg(long, value_name = "HOST")]
    pub hostname: Option<String>,

    /// Domain to assign the instance.
    #[arg(long, value_name = "DOMAIN")]
    pub domain: Option<String>,

    /// User installed with sudo privileges (defaults to $LOGNAME).
    #[arg(long, value_name = "USER", env = "LOGNAME")]
    pub sudouser: Option<String>,

    /// Configuration directory (default: $SHAKER_CONFIG_DIR or ~/.shaker).
    #[arg(long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// File to use instead of the cloud-init template.
    #[arg(long = "cloud-init", value_name = "FILE")]
    pub cloud_init: Option<PathBuf>,

    /// File to use instead of the user-script template.
    #[arg(long = "user-script", value_name = "FILE")]
    pub user_script: Option<PathBuf>,

    /// Resolve and render everything, but do not call the provider.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Generate the minion keypair locally and seed it via cloud-init.
    #[arg(long = "pre-seed")]
    pub pre_seed: bool,

    /// Persist the resolved parameters back to the profile file.
    #[arg(long)]
    pub save: bool,

    /// Request a DNS record for the new minion (not yet implemented).
    #[arg(long = "assign-dns")]
    pub assign_dns: bool,

    /// Policy for an unparseable --size / ec2_size: reject or zero.
    #[arg(long = "on-invalid-size", value_name = "POLICY", default_value = "reject")]
    pub on_invalid_size: String,

    /// Log level for shaker.log: debug, info, warning, error, none.
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The overlay the resolver consumes.
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            hostname: self.hostname.clone(),
            domain: self.domain.clone(),
            sudouser: self.sudouser.clone(),
            ssh_port: self.ssh_port.clone(),
            ec2_ami_id: self.ami.clone(),
            ec2_distro: self.distro.clone(),
            ec2_size: self.size.clone(),
            ec2_key_name: self.key_name.clone(),
            ec2_security_group: self.security_group.clone(),
            ec2_zone: self.zone.clone(),
            ec2_instance_type: self.instance_type.clone(),
            region: self.region.clone(),
        }
    }

    /// Template substitutions from the CLI.
    pub fn template_overrides(&self) -> TemplateOverrides {
        TemplateOverrides {
            cloud_init: self.cloud_init.clone(),
            user_script: self.user_script.clone(),
        }
    }

    /// The invalid-size policy, validated.
    pub fn size_policy(&self) -> Result<SizePolicy> {
        SizePolicy::from_str(&self.on_invalid_size).ok_or_else(|| {
            ShakerError::UserError(format!(
                "unknown --on-invalid-size policy '{}' (expected reject or zero)",
                self.on_invalid_size
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_positional_is_parsed() {
        let cli = Cli::try_parse_from(["shaker", "worker"]).unwrap();
        assert_eq!(cli.profile.as_deref(), Some("worker"));
    }

    #[test]
    fn missing_profile_without_compensating_flag_is_an_error() {
        assert!(Cli::try_parse_from(["shaker"]).is_err());
    }

    #[test]
    fn ami_flag_compensates_for_missing_profile() {
        let cli = Cli::try_parse_from(["shaker", "--ami", "ami-d50c2890"]).unwrap();
        assert!(cli.profile.is_none());
        assert_eq!(cli.ami.as_deref(), Some("ami-d50c2890"));
    }

    #[test]
    fn distro_flag_compensates_for_missing_profile() {
        let cli = Cli::try_parse_from(["shaker", "--distro", "precise"]).unwrap();
        assert_eq!(cli.distro.as_deref(), Some("precise"));
    }

    #[test]
    fn overrides_carry_flag_values() {
        let cli = Cli::try_parse_from([
            "shaker",
            "worker",
            "--zone",
            "us-west-1a",
            "--instance-type",
            "m1.large",
            "--size",
            "10",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides.ec2_zone.as_deref(), Some("us-west-1a"));
        assert_eq!(overrides.ec2_instance_type.as_deref(), Some("m1.large"));
        assert_eq!(overrides.ec2_size.as_deref(), Some("10"));
    }

    #[test]
    fn size_policy_defaults_to_reject_and_validates() {
        let cli = Cli::try_parse_from(["shaker", "worker"]).unwrap();
        assert_eq!(cli.size_policy().unwrap(), SizePolicy::Reject);

        let cli =
            Cli::try_parse_from(["shaker", "worker", "--on-invalid-size", "zero"]).unwrap();
        assert_eq!(cli.size_policy().unwrap(), SizePolicy::Zero);

        let cli =
            Cli::try_parse_from(["shaker", "worker", "--on-invalid-size", "maybe"]).unwrap();
        assert!(cli.size_policy().is_err());
    }

    #[test]
    fn log_level_defaults_to_info() {
        let cli = Cli::try_parse_from(["shaker", "worker"]).unwrap();
        assert_eq!(cli.log_level, "info");
    }
}
