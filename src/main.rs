use clap::Parser;
use color_eyre::eyre::eyre;

use gitflow_release_notes::{Args, Command, Result, command};

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("gitflow_release_notes")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;

    let cli_args = Args::parse();

    initialize_logger(cli_args.debug)?;

    match &cli_args.command {
        Command::Changelog(changelog_args) => {
            let summary =
                command::changelog::run(&cli_args, changelog_args).await?;

            if summary.failed_outputs > 0 {
                return Err(eyre!(
                    "{} changelog output(s) failed",
                    summary.failed_outputs
                ));
            }
        }
    }

    Ok(())
}
