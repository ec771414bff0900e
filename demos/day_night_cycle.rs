//! Day/Night Cycle Example
//!
//! Demonstrates an object registering itself through a weak reference, so the
//! world's event never keeps it alive and drops its binding once it is gone.
//!
//! Expected output:
//!
//! ```text
//! [World] Time changed: Night
//! [Enemy] Goblin emerges from the shadows.
//! [World] Time changed: Day
//! [Enemy] Goblin hides from the sun.
//! [Enemy] Goblin destroyed.
//! --- Time passes after enemy expired ---
//! [World] Time changed: Night
//! Enemies listening: 0
//! ```

use sparkle::prelude::*;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayNight {
    Day,
    Night,
}

impl fmt::Display for DayNight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayNight::Day => write!(f, "Day"),
            DayNight::Night => write!(f, "Night"),
        }
    }
}

struct GameWorld {
    on_day_night_changed: Event<DayNight>,
}

impl GameWorld {
    fn new() -> Self {
        Self {
            on_day_night_changed: Event::named("OnDayNightChanged"),
        }
    }

    fn set_time(&mut self, state: DayNight) {
        println!("[World] Time changed: {}", state);
        self.on_day_night_changed.raise(state);
    }

    fn on_day_night_changed(&mut self) -> &mut EventBinder<DayNight> {
        self.on_day_night_changed.binder_mut()
    }
}

struct Enemy {
    name: String,
    active: Cell<bool>,
}

impl Enemy {
    fn new(name: &str) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            active: Cell::new(true),
        })
    }

    fn register_to_world(self: &Rc<Self>, world: &mut GameWorld) {
        // Weak, so the world does not extend the enemy's lifetime
        world
            .on_day_night_changed()
            .bind_weak(&Rc::downgrade(self), Enemy::on_world_time_changed);
    }

    fn on_world_time_changed(&self, state: &DayNight) {
        if !self.active.get() {
            return;
        }
        match state {
            DayNight::Day => println!("[Enemy] {} hides from the sun.", self.name),
            DayNight::Night => println!("[Enemy] {} emerges from the shadows.", self.name),
        }
    }

    fn destroy(&self) {
        self.active.set(false);
        println!("[Enemy] {} destroyed.", self.name);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut world = GameWorld::new();

    {
        let enemy = Enemy::new("Goblin");
        enemy.register_to_world(&mut world);

        world.set_time(DayNight::Night);
        world.set_time(DayNight::Day);

        enemy.destroy();
        // The enemy goes out of scope here
    }

    println!("--- Time passes after enemy expired ---");
    world.set_time(DayNight::Night);

    println!("Enemies listening: {}", world.on_day_night_changed.size());
}
