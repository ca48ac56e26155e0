use tracing::{Instrument, trace_span};
use tracing_subscriber::{
    EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use pgscan::Result;

mod transport;
mod startup;
mod query;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::Registry::default()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    startup::main().instrument(trace_span!("startup")).await?;
    query::main().instrument(trace_span!("query")).await?;

    Ok(())
}
