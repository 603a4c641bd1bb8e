#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use time_scheduler::{Timeline, http_api, logging};

    logging::init();

    let addr: SocketAddr = std::env::var("TIME_SCHEDULER_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    println!("time-scheduler HTTP API listening on http://{addr}");
    let timeline = Timeline::new();
    http_api::serve(addr, timeline).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
