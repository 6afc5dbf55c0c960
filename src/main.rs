use anyhow::Result;
use clap::Parser;
use tracing::debug;

use logbackup::cli::{handle_command, Commands, GlobalArgs};
use logbackup::config::{ConfigSource, Settings};
use logbackup::logging::init_logging;

#[derive(Parser)]
#[command(
    name = "logbackup",
    version,
    about = "Directory backups with logarithmic retention",
    long_about = "logbackup archives a directory into timestamped tarballs and prunes \
                  old archives so that recent history stays dense while older \
                  history thins out exponentially. Run it from cron; with no \
                  subcommand it archives and prunes.\n\n\
                  Archive names carry UTC timestamps. Archives named in local \
                  time by other tools are read as shifted by the UTC offset."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.log_level(), cli.global.log_format)?;

    // Config file first, then command-line overrides
    let source = ConfigSource::resolve(cli.global.config.as_deref())?;
    let mut settings = Settings::load_or_default(source.path())?;
    cli.global.apply(&mut settings);
    debug!(?source, ?settings, "resolved settings");

    handle_command(&settings, &source, cli.command.unwrap_or(Commands::Run))?;

    Ok(())
}
