//! Fetch one page over a pinned TLS connection.
//!
//! Usage: `cargo run --example pinned_get -- [host] [config.json]`
//!
//! Without a config file the pins below are used with full chain validation.

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper_util::rt::TokioIo;
use keypin::{ErrorKind, FingerprintSet, PinningConfig, PinningConnector, TlsConfig};
use std::time::Instant;

const DEFAULT_PINS: [&str; 3] = [
    "sha256/s+xUlcaUY3JfY6ABjSAQDdUXlkUUtgDghW6SdU7Gwgs=",
    "sha256/zCTnfLwLKbS9S2sbp+uFz4KZOocFvXxkV06Ce9O5M2w=",
    "sha256/hxqRlPTu1bMS/0DITB1SSu0vd4u/8l8TjPgfaAp63Gc=",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "www.google.com".to_string());

    let connector = match args.next() {
        Some(path) => PinningConfig::from_file(path)?.into_connector()?,
        None => PinningConnector::new(
            FingerprintSet::from_base64(DEFAULT_PINS)?,
            TlsConfig::default(),
        )?,
    };

    let stream = match connector.connect("tcp", &format!("{host}:443")).await {
        Ok(stream) => stream,
        Err(e) if e.kind() == ErrorKind::PinMismatch => {
            eprintln!("{host} presented no pinned key; possible interception");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };
    println!("Pinned on certificate #{}", stream.pin_match().index);

    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            eprintln!("Connection error: {e}");
        }
    });

    let request = hyper::Request::builder()
        .uri("/")
        .header(hyper::header::HOST, host.as_str())
        .body(Empty::<Bytes>::new())?;
    let response = sender.send_request(request).await?;
    let body = response.into_body().collect().await?.to_bytes();

    println!("{}", String::from_utf8_lossy(&body));
    println!("Duration : {:?}", start.elapsed());
    Ok(())
}
