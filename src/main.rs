use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use csv_fetch::utils::{logger, validation::Validate};
use csv_fetch::{CliConfig, FileProcessingService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = cli.precheck_fields() {
        CliConfig::command()
            .error(ErrorKind::ValueValidation, e.to_string())
            .exit();
    }

    let settings = match cli.resolve_settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Configuration failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let fields = match cli.parse_fields(&settings) {
        Ok(fields) => fields,
        Err(e) => CliConfig::command()
            .error(ErrorKind::ValueValidation, e.to_string())
            .exit(),
    };

    let config = settings.service_config(fields);
    config.validate()?;

    let service = FileProcessingService::new(config);
    let output = service.process().await?;
    println!("{}", output);

    Ok(())
}
