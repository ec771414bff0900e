//! Boss Tutorial Example
//!
//! Demonstrates a fire-once binding on an owned target: the tutorial hint is
//! shown on the boss's first spawn only.
//!
//! Expected output:
//!
//! ```text
//! [Boss] Appears on screen!
//! [UI] Showing 'Beware the Boss!' message.
//! [Boss] Appears on screen!
//! ```

use sparkle::prelude::*;
use std::cell::Cell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

struct Boss {
    on_first_spawn: Event<()>,
}

impl Boss {
    fn spawn(&mut self) {
        println!("[Boss] Appears on screen!");
        self.on_first_spawn.raise(());
    }
}

#[derive(Default)]
struct TutorialSystem {
    hints_shown: Cell<u32>,
}

impl TutorialSystem {
    fn show_boss_intro(&self, _: &()) {
        self.hints_shown.set(self.hints_shown.get() + 1);
        println!("[UI] Showing 'Beware the Boss!' message.");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut boss = Boss {
        on_first_spawn: Event::named("OnFirstSpawn"),
    };
    let tutorial = Rc::new(TutorialSystem::default());

    boss.on_first_spawn
        .bind_once_to(&tutorial, TutorialSystem::show_boss_intro);

    // First spawn triggers the tutorial
    boss.spawn();

    // Second spawn: the binding is already gone
    boss.spawn();

    assert_eq!(tutorial.hints_shown.get(), 1);
    assert!(boss.on_first_spawn.is_empty());
}
