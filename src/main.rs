mod client;
mod config;
mod error;
mod http;

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{error, info};

use client::Client;
use config::Config;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let client = Client::new()?;

    let (done_tx, done_rx) = mpsc::channel();

    for (index, entry) in cfg.requests.iter().enumerate() {
        let (host, port, path) = config::split_url(&entry.url)?;

        let request = client.create_request(index as u64 + 1);
        request.set_host(host);
        request.set_port(port);
        request.set_path(path);

        let done = done_tx.clone();
        request.set_callback(move |req, resp, err| {
            match err {
                None => info!(
                    id = req.id(),
                    status = resp.status(),
                    bytes = resp.body().len(),
                    "request completed"
                ),
                Some(e) if e.is_cancelled() => info!(id = req.id(), "request cancelled"),
                Some(e) => error!(id = req.id(), error = %e, "request failed"),
            }
            let _ = done.send(());
        });

        info!(id = request.id(), url = %entry.url, "issuing request");
        request.execute();

        if let Some(ms) = entry.cancel_after_ms {
            let request = request.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(ms));
                request.cancel();
            });
        }
    }

    // Each callback holds one sender clone; recv() errors out once all the
    // outcomes are in.
    drop(done_tx);
    while done_rx.recv().is_ok() {}

    client.close();
    Ok(())
}
