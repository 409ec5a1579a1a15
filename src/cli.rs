use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("camstage")
        .version("0.1.0")
        .about("Periodically captures single frames from RTSP cameras and uploads them to a warehouse staging area.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom configuration file")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("run")
                .about("Run the capture/upload daemon until interrupted (default)"),
        )
        .subcommand(
            Command::new("capture")
                .about("Capture one frame from every configured camera, then exit"),
        )
        .subcommand(
            Command::new("upload")
                .about("Run one upload batch over every camera directory, then exit"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_is_accepted() {
        let matches = build_cli().try_get_matches_from(["camstage"]).unwrap();
        assert!(matches.subcommand().is_none());
    }

    #[test]
    fn config_flag_is_parsed() {
        let matches = build_cli()
            .try_get_matches_from(["camstage", "--config", "config/other.yaml", "run"])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>("config").map(|s| s.as_str()),
            Some("config/other.yaml")
        );
        assert_eq!(matches.subcommand().map(|s| s.0), Some("run"));
    }
}
