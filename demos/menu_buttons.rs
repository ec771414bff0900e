//! Menu Buttons Example
//!
//! Demonstrates standalone and fire-once bindings made through the binder a
//! UI widget exposes, while the widget alone raises the event.
//!
//! Expected output:
//!
//! ```text
//! [UI] 'Audio' slid to 0.5.
//! [Game] Audio volume 0.5
//! [UI] 'Start Game' clicked.
//! [Game] Initializing level, loading assets...
//! [UI] 'Quit' clicked.
//! [Game] Quitting... Saving progress and closing.
//! --- Player clicks again ---
//! [UI] 'Quit' clicked.
//! ```

use sparkle::prelude::*;
use tracing_subscriber::EnvFilter;

struct Button {
    label: String,
    on_click: Event<()>,
}

impl Button {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            on_click: Event::named("OnClick"),
        }
    }

    fn click(&mut self) {
        println!("[UI] '{}' clicked.", self.label);
        self.on_click.raise(());
    }

    fn on_click(&mut self) -> &mut EventBinder<()> {
        self.on_click.binder_mut()
    }
}

struct Slider {
    label: String,
    on_slide: Event<f32>,
}

impl Slider {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            on_slide: Event::named("OnSlide"),
        }
    }

    fn slide(&mut self, value: f32) {
        println!("[UI] '{}' slid to {}.", self.label, value);
        self.on_slide.raise(value);
    }

    fn on_slide(&mut self) -> &mut EventBinder<f32> {
        self.on_slide.binder_mut()
    }
}

fn adjust_audio(volume: &f32) {
    println!("[Game] Audio volume {}", volume);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut start_button = Button::new("Start Game");
    let mut quit_button = Button::new("Quit");
    let mut audio_slider = Slider::new("Audio");

    start_button
        .on_click()
        .bind(|_| println!("[Game] Initializing level, loading assets..."));

    // Quitting only needs to happen once
    quit_button
        .on_click()
        .bind_once(|_| println!("[Game] Quitting... Saving progress and closing."));

    audio_slider.on_slide().bind(adjust_audio);

    audio_slider.slide(0.5);
    start_button.click();
    quit_button.click();

    println!("--- Player clicks again ---");
    quit_button.click();
}
