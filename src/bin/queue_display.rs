//! Queue Display - terminal display board
//!
//! Shows the current number of every polyclinic (or one, with
//! `QUEUE_TOPIC=polyclinic:<id>`) and announces called numbers.

use queue_display::client::{ClientEvent, DisplayClient};
use queue_display::config::ClientConfig;
use queue_display::logging::init_logging;
use queue_display::{DisplayItem, Topic};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    init_logging();
    let config = ClientConfig::from_env()?;
    tracing::info!(base_url = config.base_url(), topic = %config.topic, "Starting display");

    let client = DisplayClient::new(config)?;
    let topic = client.config().topic;

    client
        .run(|event| match event {
            ClientEvent::Connecting => println!("... connecting"),
            ClientEvent::Snapshot(items) => render(items, topic),
            ClientEvent::Called(called) => {
                println!(">>> NOW CALLING #{} at {}", called.number, called.polyclinic_code);
            }
        })
        .await;

    Ok(())
}

fn render(items: &[DisplayItem], topic: Topic) {
    let shown = items.iter().filter(|item| match topic {
        Topic::Display => true,
        Topic::Polyclinic(id) => item.polyclinic.id == id,
    });

    println!("{:<8} {:<24} {:>8} {:<8} {:>8}", "CODE", "POLYCLINIC", "NUMBER", "STATUS", "WAITING");
    for item in shown {
        println!(
            "{:<8} {:<24} {:>8} {:<8} {:>8}",
            item.polyclinic.code,
            item.polyclinic.name,
            item.current_number,
            item.status.to_string(),
            item.waiting_count
        );
    }
}
