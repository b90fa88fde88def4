use anyhow::Result;
use bacaucap::{
    app,
    cli::{apply_serve_args, handle_check_command, handle_doctor_command, load_config, Cli, CliCommand, ServeCliArgs},
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let serve_args = match cli.command {
        Some(CliCommand::Version) => {
            println!("Baca & Ucap {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some(CliCommand::Check(args)) => {
            if !handle_check_command(&args)? {
                std::process::exit(1);
            }
            return Ok(());
        }
        Some(CliCommand::Doctor) => {
            let config = load_config(cli.config.as_ref())?;
            if !handle_doctor_command(&config)? {
                std::process::exit(1);
            }
            return Ok(());
        }
        Some(CliCommand::Serve(args)) => args,
        None => ServeCliArgs::default(),
    };

    let config = apply_serve_args(load_config(cli.config.as_ref())?, &serve_args);
    app::run_service(config).await
}
