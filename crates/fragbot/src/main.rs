use std::sync::Arc;

use tracing::info;

use fragbot_core::{
    config::Config,
    dispatcher::InlineDispatcher,
    fetchers::{FloorPriceFetcher, PriceFetcher, UsernameChecker},
};
use fragbot_sources::{
    build_http_client, BinanceClient, CoinGeckoClient, FragmentClient, GetGemsClient,
};

#[tokio::main]
async fn main() -> Result<(), fragbot_core::Error> {
    fragbot_core::logging::init("fragbot")?;

    let cfg = Arc::new(Config::load()?);
    let http = build_http_client(&cfg)?;

    let prices = PriceFetcher::new(
        Arc::new(CoinGeckoClient::new(http.clone())),
        Arc::new(BinanceClient::new(http.clone())),
    );
    let usernames = UsernameChecker::new(
        Arc::new(FragmentClient::new(http.clone())),
        cfg.fragment_request_delay,
    );
    let floor = FloorPriceFetcher::new(Arc::new(GetGemsClient::new(
        http,
        cfg.numbers_collection.clone(),
    )));

    info!(collection = %cfg.numbers_collection, "sources ready");
    let dispatcher = Arc::new(InlineDispatcher::new(prices, usernames, floor));

    fragbot_telegram::router::run_polling(cfg, dispatcher)
        .await
        .map_err(|e| fragbot_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
