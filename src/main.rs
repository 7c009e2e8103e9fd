#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

use crate::command::{authorize, check_redirect, clients, fetch_attributes, login};
use argh::FromArgs;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use tequila_broker::configuration::{self, Configuration, ObservabilityConfig};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

mod command;

fn set_tracing(config: Option<ObservabilityConfig>) -> Result<(), configuration::Error> {
    if let Some(ObservabilityConfig {
        tracing: Some(tracing_config),
    }) = config
    {
        let resource = Resource::builder()
            .with_service_name(env!("CARGO_PKG_NAME"))
            .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
            .build();
        let otlp_exporter = SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&tracing_config.endpoint)
            .with_timeout(std::time::Duration::from_secs(10))
            .build()?;

        let tracer_provider = SdkTracerProvider::builder()
            .with_batch_exporter(otlp_exporter)
            .with_id_generator(RandomIdGenerator::default())
            .with_resource(resource)
            .with_sampler(Sampler::TraceIdRatioBased(tracing_config.sampling_rate))
            .build();

        let tracer = tracer_provider.tracer(env!("CARGO_PKG_NAME"));
        let _ = global::set_tracer_provider(tracer_provider);
        let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);

        let _ = tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(tracing_subscriber::fmt::layer().json())
            .with(telemetry)
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(tracing_subscriber::fmt::layer().json())
            .try_init();
    }
    Ok(())
}

#[derive(FromArgs, PartialEq, Debug)]
/// Tequila SSO backend and OIDC client registry for the identity broker
struct GlobalArguments {
    #[argh(option, short = 'c', default = "String::from(\"config.toml\")")]
    /// the path to the configuration file, defaults to `config.toml`
    config: String,

    #[argh(subcommand)]
    subcommand: SubCommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
enum SubCommand {
    Login(login::Options),
    FetchAttributes(fetch_attributes::Options),
    Clients(clients::Options),
    Authorize(authorize::Options),
    CheckRedirect(check_redirect::Options),
}

fn main() -> Result<(), command::Error> {
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli_args: GlobalArguments = argh::from_env();

    let config = Configuration::load(&cli_args.config)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run_command(cli_args, config))
}

async fn run_command(
    cli_args: GlobalArguments,
    config: Configuration,
) -> Result<(), command::Error> {
    set_tracing(config.observability.clone())?;

    match cli_args.subcommand {
        SubCommand::Login(options) => login::Command::new(&options, &config)?.run().await,
        SubCommand::FetchAttributes(options) => {
            fetch_attributes::Command::new(&options, &config)?
                .run()
                .await
        }
        SubCommand::Clients(options) => {
            let registry = command::client_registry(&config).await?;
            clients::Command::new(&options, registry).run().await
        }
        SubCommand::Authorize(options) => {
            let registry = command::client_registry(&config).await?;
            authorize::Command::new(&options, &config, registry)
                .run()
                .await
        }
        SubCommand::CheckRedirect(options) => {
            let registry = command::client_registry(&config).await?;
            check_redirect::Command::new(&options, registry).run().await
        }
    }
}
