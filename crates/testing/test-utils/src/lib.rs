pub mod sim_clock;

static INIT: std::sync::Once = std::sync::Once::new();

/// Install the tracing subscriber and panic hook once per test binary.
/// Filter with `RUST_LOG`, e.g. `RUST_LOG=snapcheck_verifier=trace`.
pub fn set_up() {
    INIT.call_once(|| {
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;

        std::panic::set_hook(Box::new(utils::tracing_panic_hook));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_test_writer()
            .with_target(true);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .with(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    });
}
