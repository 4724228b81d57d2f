//! Browser entry point

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use placard_core::SetupError;

use crate::{PlacardApp, WidgetOptions};

/// Mount the widget inside the given container element.
///
/// A missing container is a non-fatal, logged early return: no session is
/// ever offered and no graphics are created.
#[wasm_bindgen]
pub fn start(container_id: String, video_url: String, scale: Option<f32>) {
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let options = WidgetOptions::new(container_id, video_url).with_scale(scale.unwrap_or(1.0));

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        log::error!("no document available");
        return;
    };
    let Some(container) = document.get_element_by_id(&options.container_id) else {
        let err = SetupError::ContainerNotFound {
            id: options.container_id.clone(),
        };
        log::error!("{err}");
        return;
    };

    let canvas: web_sys::HtmlCanvasElement = match document
        .create_element("canvas")
        .ok()
        .and_then(|element| element.dyn_into().ok())
    {
        Some(canvas) => canvas,
        None => {
            log::error!("failed to create the widget canvas");
            return;
        }
    };
    if container.append_child(&canvas).is_err() {
        log::error!("failed to attach the widget canvas");
        return;
    }

    wasm_bindgen_futures::spawn_local(async move {
        let result = eframe::WebRunner::new()
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(move |cc| Ok(Box::new(PlacardApp::new(cc, options)?))),
            )
            .await;
        if let Err(e) = result {
            log::error!("failed to start the widget: {e:?}");
        }
    });
}
