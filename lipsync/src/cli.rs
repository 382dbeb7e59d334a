// SPDX-License-Identifier: GPL-3.0-only
use std::path::PathBuf;

use clap::ValueHint;
use clap::{ArgAction, Command, arg, command, value_parser};

pub const DEFAULT_RECORD_SECONDS: &str = "5";
pub const DEFAULT_CALIBRATE_SECONDS: &str = "2";

fn format_arg() -> clap::Arg {
    arg!(-f --format <format> "Output format")
        .default_value("json")
        .help("json: full report, text: one line per tick, cues: one line per mouth change")
        .value_parser(["json", "text", "cues"])
}

fn seed_arg() -> clap::Arg {
    arg!(--seed <seed> "Seed for the fallback picker, for reproducible output")
        .required(false)
        .value_parser(value_parser!(u64))
}

#[must_use]
pub fn build() -> Command {
    command!()
    .about("👄 Lipsync - real-time mouth shapes from audio")
    .long_about(
        "Classifies audio into a small set of mouth shapes (visemes) at display rate, from audio files or a live microphone."
    )
    .subcommand_required(true)
    .arg_required_else_help(true)
    .subcommand(
        Command::new("analyze")
            .about("🎬 Analyse an audio file into a viseme timeline")
            .long_about("Decode an audio file, calibrate on it, then play it through the classifier at the configured tick rate.")
            .arg(
                arg!(<file> "Audio file to analyse")
                .value_parser(value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath)
            )
            .arg(format_arg())
            .arg(seed_arg())
    )
    .subcommand(
        Command::new("calibrate")
            .about("📏 Print the silence and voice thresholds for an audio file")
            .arg(
                arg!(<file> "Audio file to calibrate on")
                .value_parser(value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath)
            )
    )
    .subcommand(
        Command::new("record")
            .about("🎤 Record from the microphone, then analyse the recording")
            .arg(
                arg!(-s --seconds <seconds> "How long to record")
                .default_value(DEFAULT_RECORD_SECONDS)
                .value_parser(value_parser!(f64))
            )
            .arg(
                arg!(-o --output <output> "Also save the recording as a WAV file")
                .required(false)
                .value_parser(value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath)
            )
            .arg(format_arg())
            .arg(seed_arg())
    )
    .subcommand(
        Command::new("live")
            .about("📡 Track the microphone live until Ctrl+C")
            .arg(
                arg!(--"calibrate-seconds" <seconds> "Room audio to calibrate on before tracking (0 keeps the defaults)")
                .default_value(DEFAULT_CALIBRATE_SECONDS)
                .value_parser(value_parser!(f64))
            )
            .arg(seed_arg())
    )
    .subcommand(
        Command::new("config")
            .about("⚙️ Print the effective configuration as TOML")
            .arg(
                arg!(--save "Write it to the default configuration file")
                .action(ArgAction::SetTrue)
            )
    )
    .arg(
        arg!(-c --config <path> "Configuration file to use instead of the default location")
        .required(false)
        .global(true)
        .value_parser(value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
    )
    .arg(
        arg!(-v --verbose "Enable verbose logging")
        .global(true)
        .action(ArgAction::SetTrue)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        build().debug_assert();
    }

    #[test]
    fn test_analyze_arguments() {
        let matches = build()
            .try_get_matches_from(["lipsync", "analyze", "clip.wav", "--format", "cues", "--seed", "9"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "analyze");
        assert_eq!(
            sub.get_one::<PathBuf>("file"),
            Some(&PathBuf::from("clip.wav"))
        );
        assert_eq!(sub.get_one::<String>("format").map(String::as_str), Some("cues"));
        assert_eq!(sub.get_one::<u64>("seed"), Some(&9));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let matches = build()
            .try_get_matches_from(["lipsync", "live", "-v", "--config", "/tmp/lipsync.toml"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert!(sub.get_flag("verbose"));
        assert_eq!(
            sub.get_one::<PathBuf>("config"),
            Some(&PathBuf::from("/tmp/lipsync.toml"))
        );
        assert_eq!(sub.get_one::<f64>("calibrate-seconds"), Some(&2.0));
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(
            build()
                .try_get_matches_from(["lipsync", "analyze", "clip.wav", "--format", "yaml"])
                .is_err()
        );
    }
}
