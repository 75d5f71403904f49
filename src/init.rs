use crate::config::toml::log::{AppenderCommon, LoggingConfig, LoggingStyle};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::Layer;
use tracing_subscriber::registry::LookupSpan;

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

// Code repetition because of https://github.com/tokio-rs/tracing/issues/575
fn styled_layer<S, W>(
    style: LoggingStyle,
    common: &mut AppenderCommon,
    writer: W,
    ansi: bool,
) -> BoxedLayer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    // EnvFilter missing Clone
    let env_filter = std::mem::take(&mut common.level).0;
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(common.target)
        .with_span_events(common.span.into());
    match style {
        LoggingStyle::Plain => layer.with_filter(env_filter).boxed(),
        LoggingStyle::PlainCompact => layer.compact().with_filter(env_filter).boxed(),
        LoggingStyle::Json => layer.json().with_filter(env_filter).boxed(),
    }
}

pub(crate) fn init(config: &mut LoggingConfig) -> Guard {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let out_layer = if config.stdout.enabled {
        Some(styled_layer(
            config.stdout.style,
            &mut config.stdout.common,
            std::io::stdout,
            true,
        ))
    } else {
        None
    };

    let (file_layer, file_guard) = if let Some(file) = &mut config.file {
        let appender = tracing_appender::rolling::RollingFileAppender::new(
            file.rotation.into(),
            &file.directory,
            &file.prefix,
        );
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (
            Some(styled_layer(file.style, &mut file.common, writer, false)),
            Some(guard),
        )
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(out_layer)
        .with(file_layer)
        .init();

    std::panic::set_hook(Box::new(utils::tracing_panic_hook));
    Guard {
        _file_guard: file_guard,
    }
}

/// Flushes the non-blocking file writer when dropped.
pub(crate) struct Guard {
    _file_guard: Option<WorkerGuard>,
}
