use std::ffi::OsStr;
use std::io;
use std::path::Path;

use clap::{parser::ValueSource, ArgMatches, CommandFactory, FromArgMatches};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Value},
    Figment,
};
use tracing::{debug, error, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fragtoprecer::{FragToPrecer, FragToPrecerError};

#[cfg(feature = "mimalloc")]
use mimalloc::MiMalloc;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn default_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy()
}

fn configure_log(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let (file_layer, guard) = match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path.file_name().unwrap_or(OsStr::new("fragtoprecer.log"));
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));
            let layer = fmt::layer()
                .compact()
                .with_ansi(false)
                .with_timer(fmt::time::ChronoLocal::rfc_3339())
                .with_writer(writer)
                .with_filter(default_filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()))
        .with(
            fmt::layer()
                .compact()
                .with_timer(fmt::time::ChronoLocal::rfc_3339())
                .with_writer(io::stderr)
                .with_filter(default_filter()),
        )
        .with(file_layer)
        .init();
    guard
}

/// The options that were typed on the command line, leaving out clap's defaults
fn explicit_arguments(
    args: &FragToPrecer,
    matches: &ArgMatches,
) -> Result<Dict, FragToPrecerError> {
    let mut values = Value::serialize(args)?.into_dict().unwrap_or_default();
    let command = FragToPrecer::command();
    values.retain(|key, _| {
        command.get_arguments().any(|arg| {
            arg.get_id().as_str() == key.as_str()
                && matches.value_source(key) == Some(ValueSource::CommandLine)
        })
    });
    Ok(values)
}

/// Layer the configuration, lowest precedence first: clap defaults, `fragtoprecer.toml`,
/// `--config-file`, `FRAGTOPRECER_*` environment variables, then options given on the
/// command line.
fn load_configuration(
    args: &FragToPrecer,
    matches: &ArgMatches,
) -> Result<FragToPrecer, FragToPrecerError> {
    let mut config = Figment::new()
        .merge(Serialized::defaults(args))
        .merge(Toml::file("fragtoprecer.toml"));
    if let Some(path) = args.config_file.as_ref() {
        config = config.merge(Toml::file_exact(path));
    }
    config = config
        .merge(Env::prefixed("FRAGTOPRECER_"))
        .merge(Serialized::defaults(explicit_arguments(args, matches)?));
    Ok(config.extract()?)
}

fn main() -> Result<(), FragToPrecerError> {
    let matches = FragToPrecer::command().get_matches();
    let args = FragToPrecer::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    let _guard = configure_log(args.log_file.as_deref());

    let result = load_configuration(&args, &matches).and_then(|driver| {
        match toml::to_string_pretty(&driver) {
            Ok(text) => debug!("Configuration:\n{text}"),
            Err(e) => warn!("Failed to render the configuration: {e}"),
        }
        driver.main()
    });
    if let Err(e) = result {
        error!("{e}");
        return Err(e);
    }
    Ok(())
}
