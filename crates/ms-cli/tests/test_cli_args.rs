use std::path::PathBuf;

use clap::Parser;

use ms_cli::cli::{Cli, Commands, DeployEnv};

#[test]
fn deploy_alias_with_env() {
    let cli = Cli::try_parse_from(["manuscript-cli", "d", "manuscript.yaml", "--env", "local"]).unwrap();
    match cli.command {
        Commands::Deploy { manuscript, env } => {
            assert_eq!(manuscript, PathBuf::from("manuscript.yaml"));
            assert_eq!(env, DeployEnv::Local);
        }
        other => panic!("expected deploy, got {other:?}"),
    }
}

#[test]
fn deploy_requires_env() {
    assert!(Cli::try_parse_from(["manuscript-cli", "deploy", "manuscript.yaml"]).is_err());
    assert!(
        Cli::try_parse_from(["manuscript-cli", "deploy", "m.yaml", "--env", "staging"]).is_err()
    );
}

#[test]
fn init_aliases_and_answers() {
    for alias in ["init", "ini", "in", "i"] {
        let cli = Cli::try_parse_from(["manuscript-cli", alias, "--name", "demo", "--sink", "print"])
            .unwrap();
        match cli.command {
            Commands::Init(args) => {
                assert_eq!(args.name.as_deref(), Some("demo"));
                assert_eq!(args.sink.as_deref(), Some("print"));
                assert!(args.chain.is_none());
            }
            other => panic!("expected init, got {other:?}"),
        }
    }
}

#[test]
fn global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["manuscript-cli", "ls", "--config", "/tmp/ms.yaml", "--debug"])
        .unwrap();
    assert!(cli.debug);
    assert_eq!(cli.config, Some(PathBuf::from("/tmp/ms.yaml")));
    assert!(matches!(cli.command, Commands::List { directory: None }));
}

#[test]
fn job_commands_take_one_name() {
    assert!(Cli::try_parse_from(["manuscript-cli", "stop"]).is_err());
    assert!(Cli::try_parse_from(["manuscript-cli", "logs", "a", "b"]).is_err());
    let cli = Cli::try_parse_from(["manuscript-cli", "c", "demo"]).unwrap();
    assert!(matches!(cli.command, Commands::Chat { job_name } if job_name == "demo"));
}

#[test]
fn version_verbose_short_flag() {
    let cli = Cli::try_parse_from(["manuscript-cli", "version", "-v"]).unwrap();
    assert!(matches!(cli.command, Commands::Version { verbose: true }));
}
