//! Arnab's Adventure entry point
//!
//! The browser build is driven from JS through the library. Natively this
//! runs a headless autopilot through the unlocked levels and logs the
//! output events a real frontend would consume.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use arnab_adventure::consts::LEVEL_COUNT;
    use arnab_adventure::persistence::{JsonFileStore, KeyValueStore, MemoryStore};
    use arnab_adventure::sim::{GameEvent, GamePhase};
    use arnab_adventure::{Progress, SessionController, Tuning};

    env_logger::init();
    log::info!("Arnab's Adventure (headless) starting...");

    let tuning = match std::env::var("ARNAB_TUNING") {
        Ok(path) => std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
            .unwrap_or_else(|e| {
                log::warn!("Ignoring tuning file {path}: {e}");
                Tuning::default()
            }),
        Err(_) => Tuning::default(),
    };

    let save_path = std::env::temp_dir().join("arnab-adventure-save.json");
    let store: Box<dyn KeyValueStore> = match JsonFileStore::open(&save_path) {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("{e}; progress will not be saved");
            Box::new(MemoryStore::new())
        }
    };

    let seed: u64 = rand::random();
    log::info!("Level seed: {seed}");
    let mut game = SessionController::new(tuning, Progress::load(store), seed);

    game.open_level_select();
    let level = (1..=LEVEL_COUNT)
        .rev()
        .find(|&l| game.progress().is_unlocked(l))
        .unwrap_or(1);
    if let Err(e) = game.select_level(level) {
        log::error!("Could not start level {level}: {e}");
        return;
    }

    // Ten minutes of simulated time at 60 fps is more than any countdown
    for _ in 0..(60 * 600) {
        game.set_input(autopilot::steer(&game));
        game.update(1.0 / 60.0);

        for event in game.drain_events() {
            match event {
                GameEvent::UpdateHud(_) => {}
                GameEvent::PlaySound(kind) => log::debug!("sound: {kind:?}"),
                GameEvent::ShowToast { text, .. } => log::info!("toast: {text}"),
                GameEvent::UpdateScreen(phase) => log::info!("screen: {phase:?}"),
            }
        }

        if matches!(game.phase(), GamePhase::Win | GamePhase::GameOver) {
            break;
        }
    }

    match game.summary() {
        Some(summary) => {
            println!(
                "Level {}: {} | score {} | coins {}/{} | {}",
                summary.level,
                if summary.won { "WON" } else { "LOST" },
                summary.score,
                summary.coins_collected,
                summary.total_coins,
                summary.achievement
            );
        }
        None => println!("Run did not finish"),
    }
    println!("High score: {}", game.progress().high_score());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_start in the library
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use arnab_adventure::SessionController;
    use arnab_adventure::sim::TickInput;

    /// How far ahead (px) an enemy triggers a jump
    const ENEMY_LOOKAHEAD: f32 = 90.0;

    /// Run right, jumping over enemies and onto anything higher ahead
    pub fn steer(game: &SessionController) -> TickInput {
        let Some(session) = game.session() else {
            return TickInput::default();
        };
        let player = &session.player;
        let front = player.pos.x + player.size.x;

        let enemy_ahead = session.enemies.iter().any(|e| {
            e.is_active() && e.rect.x > player.pos.x && e.rect.x - front < ENEMY_LOOKAHEAD
        });
        let ledge_ahead = session.platforms.iter().skip(1).any(|p| {
            p.rect.x > front && p.rect.x - front < 60.0 && p.rect.y < player.bottom()
        });
        let flag_above = (session.flag.rect.x - player.pos.x).abs() < 60.0;

        TickInput {
            left: false,
            right: true,
            jump: enemy_ahead || ledge_ahead || flag_above,
        }
    }
}
