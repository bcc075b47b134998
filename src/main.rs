//! Shaker: build and launch EC2 instances as salt minions.
//!
//! This is the main entry point for the `shaker` CLI. It parses arguments,
//! resolves the layered configuration, renders the provisioning documents,
//! and hands the result to the launch orchestrator, mapping errors to exit
//! codes.

mod catalog;
mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod identity;
pub mod launch;
pub mod logging;
pub mod provider;
pub mod userdata;

#[cfg(test)]
mod test_support;

use cli::Cli;
use config::store::DEFAULT_PROFILE_NAME;
use context::ConfigContext;
use error::Result;
use identity::{DEFAULT_KEY_BITS, KeyGenerator, OpensslKeyGenerator};
use provider::AwsCliProvider;
use std::process::ExitCode;
use userdata::UserData;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match run(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let ctx = ConfigContext::resolve(cli.config_dir.as_deref())?;
    logging::init(&cli.log_level, &ctx.log_path())?;

    let size_policy = cli.size_policy()?;
    let overrides = cli.overrides();
    let resolved = config::resolve(&overrides, &ctx, cli.profile.as_deref())?;

    if cli.save {
        let name = cli.profile.as_deref().unwrap_or(DEFAULT_PROFILE_NAME);
        config::store::save_profile(&resolved.to_profile(), &ctx, name)?;
    }

    if cli.assign_dns {
        launch::assign_dns(&resolved);
    }

    let keys = if cli.pre_seed {
        Some(OpensslKeyGenerator.generate(DEFAULT_KEY_BITS)?)
    } else {
        None
    };

    let documents = UserData::render(&ctx, &resolved, keys.as_ref(), &cli.template_overrides())?;

    if cli.dry_run {
        print_dry_run(&resolved, &documents);
        return Ok(());
    }

    let provider = AwsCliProvider::new(resolved.region.clone());
    launch::launch(&provider, &resolved, documents.combined(), size_policy)
}

/// Show what would be launched, without touching the provider.
fn print_dry_run(resolved: &config::ResolvedConfig, documents: &UserData) {
    println!("Dry run: no instance will be launched.");
    println!();
    println!("Resolved configuration:");
    println!("  region:             {}", resolved.region);
    println!("  ec2_zone:           {}", resolved.ec2_zone);
    println!(
        "  ec2_ami_id:         {}",
        resolved.ec2_ami_id.as_deref().unwrap_or("(unresolved)")
    );
    println!("  ec2_distro:         {}", resolved.ec2_distro);
    println!("  ec2_architecture:   {}", resolved.ec2_architecture);
    println!("  ec2_instance_type:  {}", resolved.ec2_instance_type);
    println!("  ec2_size:           {}", resolved.ec2_size);
    println!("  ec2_security_group: {}", resolved.ec2_security_group);
    println!(
        "  ec2_key_name:       {}",
        resolved.ec2_key_name.as_deref().unwrap_or("(auto-select)")
    );
    println!("  ssh_port:           {}", resolved.ssh_port);
    println!(
        "  fqdn:               {}",
        resolved.fqdn().unwrap_or_else(|| "(none)".to_string())
    );
    println!(
        "  salt_master:        {}",
        resolved.salt_master.as_deref().unwrap_or("(none)")
    );
    println!();
    println!("--- cloud-init ---");
    println!("{}", documents.cloud_init);
    println!("--- user-script ---");
    println!("{}", documents.user_script);
}
