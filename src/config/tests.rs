//! Tests for the profile model, store, and resolver.

use super::model::{Profile, ResolvedConfig};
use super::resolve::{CliOverrides, resolve};
use super::store;
use crate::test_support::temp_context;
use std::fs;

#[test]
fn test_builtin_defaults() {
    let defaults = Profile::builtin_defaults();
    assert_eq!(defaults.ssh_port.as_deref(), Some("22"));
    assert_eq!(defaults.ec2_zone.as_deref(), Some("us-east-1b"));
    assert_eq!(defaults.ec2_instance_type.as_deref(), Some("m1.small"));
    assert_eq!(defaults.ec2_distro.as_deref(), Some("precise"));
    assert_eq!(defaults.ec2_size.as_deref(), Some("0"));
    assert_eq!(defaults.ec2_security_group.as_deref(), Some("default"));
    assert_eq!(defaults.ec2_root_device.as_deref(), Some("/dev/sda1"));
}

#[test]
fn test_overlay_replaces_only_present_fields() {
    let mut base = Profile::builtin_defaults();
    let layer = Profile {
        ssh_port: Some("2222".to_string()),
        hostname: Some("minion1".to_string()),
        ..Profile::default()
    };

    base.overlay(&layer);

    assert_eq!(base.ssh_port.as_deref(), Some("2222"));
    assert_eq!(base.hostname.as_deref(), Some("minion1"));
    // Untouched fields keep their defaults.
    assert_eq!(base.ec2_zone.as_deref(), Some("us-east-1b"));
}

#[test]
fn test_parse_unquoted_scalars() {
    let profile = Profile::from_yaml(
        "ssh_port: 2222\nec2_size: 10\nec2_monitoring_enabled: true\nhostname: web1\n",
    )
    .unwrap();

    assert_eq!(profile.ssh_port.as_deref(), Some("2222"));
    assert_eq!(profile.ec2_size.as_deref(), Some("10"));
    assert_eq!(profile.ec2_monitoring_enabled, Some(true));
    assert_eq!(profile.hostname.as_deref(), Some("web1"));
}

#[test]
fn test_parse_ignores_unknown_keys() {
    let profile = Profile::from_yaml("hostname: web1\nfrobnicate: yes\n").unwrap();
    assert_eq!(profile.hostname.as_deref(), Some("web1"));
}

#[test]
fn test_parse_comment_only_document() {
    let profile = Profile::from_yaml("# nothing here\n#hostname: web1\n").unwrap();
    assert_eq!(profile, Profile::default());
}

#[test]
fn test_parse_non_mapping_rejected() {
    assert!(Profile::from_yaml("- a\n- b\n").is_err());
}

#[test]
fn test_resolved_config_requires_default_backed_keys() {
    let err = ResolvedConfig::from_profile(Profile::default(), "us-east-1".to_string())
        .unwrap_err();
    assert!(err.to_string().contains("ssh_port"));
}

#[test]
fn test_ensure_default_profile() {
    let (_dir, ctx) = temp_context();

    let profile = store::ensure_default_profile(&ctx).unwrap();

    assert!(ctx.profile_path("default").is_file());
    // The synthesized file is all comments, so the load equals the defaults.
    assert_eq!(profile, Profile::builtin_defaults());
}

#[test]
fn test_ensure_default_profile_idempotent() {
    let (_dir, ctx) = temp_context();
    let path = ctx.profile_path("default");

    store::ensure_default_profile(&ctx).unwrap();
    let first = fs::read(&path).unwrap();
    store::ensure_default_profile(&ctx).unwrap();
    let second = fs::read(&path).unwrap();

    assert_eq!(first, second, "second call must leave the file byte-identical");
}

#[test]
fn test_named_profile_copied_from_default() {
    let (_dir, ctx) = temp_context();
    store::ensure_default_profile(&ctx).unwrap();

    store::load_named_profile(&ctx, "worker").unwrap();

    let default_content = fs::read(ctx.profile_path("default")).unwrap();
    let worker_content = fs::read(ctx.profile_path("worker")).unwrap();
    assert_eq!(worker_content, default_content);
}

#[test]
fn test_unparseable_profile_recovered_as_none() {
    let (_dir, ctx) = temp_context();
    store::ensure_default_profile(&ctx).unwrap();
    fs::write(ctx.profile_path("broken"), "{ not yaml: [").unwrap();

    let loaded = store::load_named_profile(&ctx, "broken").unwrap();

    assert!(loaded.is_none());
}

#[test]
fn test_save_profile_overwrites() {
    let (_dir, ctx) = temp_context();
    store::ensure_default_profile(&ctx).unwrap();

    let profile = Profile {
        hostname: Some("web1".to_string()),
        ..Profile::builtin_defaults()
    };
    store::save_profile(&profile, &ctx, "web").unwrap();
    let reloaded = store::load_named_profile(&ctx, "web").unwrap().unwrap();
    assert_eq!(reloaded.hostname.as_deref(), Some("web1"));

    let changed = Profile {
        hostname: Some("web2".to_string()),
        ..profile
    };
    store::save_profile(&changed, &ctx, "web").unwrap();
    let reloaded = store::load_named_profile(&ctx, "web").unwrap().unwrap();
    assert_eq!(reloaded.hostname.as_deref(), Some("web2"));
}

#[test]
fn test_resolve_fresh_directory() {
    let (_dir, ctx) = temp_context();

    let resolved = resolve(&CliOverrides::default(), &ctx, None).unwrap();

    assert_eq!(resolved.ssh_port, "22");
    assert_eq!(resolved.ec2_zone, "us-east-1b");
    assert_eq!(resolved.ec2_instance_type, "m1.small");
    assert_eq!(resolved.ec2_distro, "precise");
    assert_eq!(resolved.ec2_size, "0");
    assert_eq!(resolved.ec2_security_group, "default");
    assert_eq!(resolved.ec2_root_device, "/dev/sda1");
    assert_eq!(resolved.region, "us-east-1");
    // No image id was set anywhere, so the fallback catalog lookup fills it
    // from the default distro, zone-derived region, and default arch.
    assert_eq!(resolved.ec2_ami_id.as_deref(), Some("ami-057bcf6c"));
}

#[test]
fn test_resolve_named_profile_overrides_defaults() {
    let (_dir, ctx) = temp_context();
    store::ensure_default_profile(&ctx).unwrap();
    fs::write(
        ctx.profile_path("worker"),
        "ssh_port: 2222\nec2_zone: us-west-1b\n",
    )
    .unwrap();

    let resolved = resolve(&CliOverrides::default(), &ctx, Some("worker")).unwrap();

    assert_eq!(resolved.ssh_port, "2222");
    assert_eq!(resolved.ec2_zone, "us-west-1b");
    assert_eq!(resolved.region, "us-west-1");
    // Untouched keys fall through to defaults.
    assert_eq!(resolved.ec2_instance_type, "m1.small");
}

#[test]
fn test_resolve_cli_overrides_win() {
    let (_dir, ctx) = temp_context();
    store::ensure_default_profile(&ctx).unwrap();
    fs::write(ctx.profile_path("worker"), "ssh_port: 2222\n").unwrap();

    let overrides = CliOverrides {
        ssh_port: Some("2022".to_string()),
        ..CliOverrides::default()
    };
    let resolved = resolve(&overrides, &ctx, Some("worker")).unwrap();

    assert_eq!(resolved.ssh_port, "2022");
}

#[test]
fn test_resolve_empty_cli_values_ignored() {
    let (_dir, ctx) = temp_context();
    store::ensure_default_profile(&ctx).unwrap();
    fs::write(ctx.profile_path("worker"), "ssh_port: 2222\n").unwrap();

    let overrides = CliOverrides {
        ssh_port: Some(String::new()),
        ..CliOverrides::default()
    };
    let resolved = resolve(&overrides, &ctx, Some("worker")).unwrap();

    assert_eq!(resolved.ssh_port, "2222");
}

#[test]
fn test_resolve_unparseable_profile_falls_back() {
    let (_dir, ctx) = temp_context();
    store::ensure_default_profile(&ctx).unwrap();
    fs::write(ctx.profile_path("broken"), ": : :").unwrap();

    let resolved = resolve(&CliOverrides::default(), &ctx, Some("broken")).unwrap();

    assert_eq!(resolved.ssh_port, "22");
    assert_eq!(resolved.ec2_zone, "us-east-1b");
}

#[test]
fn test_resolve_explicit_distro_overwrites_image_id() {
    let (_dir, ctx) = temp_context();

    let overrides = CliOverrides {
        ec2_ami_id: Some("ami-override".to_string()),
        ec2_distro: Some("natty".to_string()),
        ..CliOverrides::default()
    };
    let resolved = resolve(&overrides, &ctx, None).unwrap();

    // natty / us-east-1 / i386 from the embedded catalog.
    assert_eq!(resolved.ec2_ami_id.as_deref(), Some("ami-e358958a"));
}

#[test]
fn test_resolve_unknown_distro_keeps_image_id() {
    let (_dir, ctx) = temp_context();

    let overrides = CliOverrides {
        ec2_ami_id: Some("ami-mycustom".to_string()),
        ec2_distro: Some("warty".to_string()),
        ..CliOverrides::default()
    };
    let resolved = resolve(&overrides, &ctx, None).unwrap();

    assert_eq!(resolved.ec2_ami_id.as_deref(), Some("ami-mycustom"));
}

#[test]
fn test_resolve_region_flag_wins_over_zone() {
    let (_dir, ctx) = temp_context();

    let overrides = CliOverrides {
        ec2_distro: Some("precise".to_string()),
        region: Some("us-west-1".to_string()),
        ..CliOverrides::default()
    };
    let resolved = resolve(&overrides, &ctx, None).unwrap();

    assert_eq!(resolved.region, "us-west-1");
    assert_eq!(resolved.ec2_ami_id.as_deref(), Some("ami-d50c2890"));
}

#[test]
fn test_resolve_architecture_changes_image_selection() {
    let (_dir, ctx) = temp_context();
    store::ensure_default_profile(&ctx).unwrap();
    fs::write(
        ctx.profile_path("big"),
        "ec2_zone: us-west-1a\nec2_architecture: x86_64\n",
    )
    .unwrap();

    let resolved = resolve(&CliOverrides::default(), &ctx, Some("big")).unwrap();

    assert_eq!(resolved.ec2_architecture, "x86_64");
    assert_eq!(resolved.ec2_ami_id.as_deref(), Some("ami-d70c2892"));
}

#[test]
fn test_resolve_deterministic() {
    let (_dir, ctx) = temp_context();
    store::ensure_default_profile(&ctx).unwrap();
    fs::write(ctx.profile_path("worker"), "hostname: w1\ndomain: example.com\n").unwrap();

    let overrides = CliOverrides {
        ec2_instance_type: Some("m1.large".to_string()),
        ..CliOverrides::default()
    };
    let first = resolve(&overrides, &ctx, Some("worker")).unwrap();
    let second = resolve(&overrides, &ctx, Some("worker")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_resolve_salt_id_defaults_to_fqdn() {
    let (_dir, ctx) = temp_context();

    let overrides = CliOverrides {
        hostname: Some("web1".to_string()),
        domain: Some("example.com".to_string()),
        ..CliOverrides::default()
    };
    let resolved = resolve(&overrides, &ctx, None).unwrap();

    assert_eq!(resolved.salt_id.as_deref(), Some("web1.example.com"));
    assert_eq!(resolved.fqdn().as_deref(), Some("web1.example.com"));
}

#[test]
fn test_resolve_explicit_salt_id_kept() {
    let (_dir, ctx) = temp_context();
    store::ensure_default_profile(&ctx).unwrap();
    fs::write(
        ctx.profile_path("worker"),
        "hostname: web1\nsalt_id: custom-id\n",
    )
    .unwrap();

    let resolved = resolve(&CliOverrides::default(), &ctx, Some("worker")).unwrap();

    assert_eq!(resolved.salt_id.as_deref(), Some("custom-id"));
}
