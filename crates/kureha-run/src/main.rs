use clap::Parser;

#[cfg(feature = "use_mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("KUREHA_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("kureha=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    kureha_run::Cli::parse().run()
}
