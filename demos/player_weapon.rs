#![allow(clippy::ptr_arg)]
//! Player Weapon Example
//!
//! Demonstrates several weak listeners on one event, removing one of them by
//! its weak handle, and clearing the rest.
//!
//! Expected output:
//!
//! ```text
//! [Player] Picked up: Shotgun
//! [HUD] Displaying new weapon: Shotgun
//! [Audio] Playing pickup sound for Shotgun
//! --- Audio system disabled ---
//! [Player] Picked up: Rocket Launcher
//! [HUD] Displaying new weapon: Rocket Launcher
//! --- Level reload ---
//! [Player] Picked up: Sniper Rifle
//! ```
//!
//! The HUD and audio lines for one pickup may appear in either order: they
//! are bound under different subscribers.

use sparkle::prelude::*;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

struct Player {
    on_weapon_picked: Event<String>,
}

impl Player {
    fn pick_weapon(&mut self, weapon: &str) {
        println!("[Player] Picked up: {}", weapon);
        self.on_weapon_picked.raise(weapon.to_string());
    }
}

struct Hud;

impl Hud {
    fn show_weapon(&self, weapon: &String) {
        println!("[HUD] Displaying new weapon: {}", weapon);
    }
}

struct AudioManager;

impl AudioManager {
    fn play_weapon_sound(&self, weapon: &String) {
        println!("[Audio] Playing pickup sound for {}", weapon);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut player = Player {
        on_weapon_picked: Event::named("OnWeaponPicked"),
    };
    let hud = Rc::new(Hud);
    let audio = Rc::new(AudioManager);

    player
        .on_weapon_picked
        .bind_weak(&Rc::downgrade(&hud), Hud::show_weapon);
    player
        .on_weapon_picked
        .bind_weak(&Rc::downgrade(&audio), AudioManager::play_weapon_sound);

    player.pick_weapon("Shotgun");

    // Muted: drop the audio listener only
    println!("--- Audio system disabled ---");
    player.on_weapon_picked.remove_weak(&Rc::downgrade(&audio));

    player.pick_weapon("Rocket Launcher");

    // Level unload: drop everyone
    println!("--- Level reload ---");
    player.on_weapon_picked.remove_all();

    player.pick_weapon("Sniper Rifle");
}
