//! Placard native entry point

use placard_frontend::{PlacardApp, WidgetOptions};

fn main() -> eframe::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "placard_frontend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Placard");

    let mut args = std::env::args().skip(1);
    let video_url = args
        .next()
        .unwrap_or_else(|| "file://media/clip.mp4".to_string());
    let scale = args.next().and_then(|s| s.parse().ok()).unwrap_or(1.0);
    // The container id is a DOM concept; the native preview ignores it
    let options = WidgetOptions::new("placard", video_url).with_scale(scale);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Placard"),
        ..Default::default()
    };

    eframe::run_native(
        "placard",
        native_options,
        Box::new(move |cc| Ok(Box::new(PlacardApp::new(cc, options)?))),
    )
}
