/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::OpenOptions;
use std::time::{Duration, Instant};

use anyhow::Context;
use config::GameConfig;
use domain::entity::FrameInput;
use sim::event::GameEvent;
use sim::step;
use sim::world::GameState;
use ui::controls::{ControlAction, VirtualControls};
use ui::gamepad::GamepadState;
use ui::input::{InputState, KEYS_BUILD, KEYS_CYCLE, KEYS_QUIT};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let (config, warnings) = GameConfig::load();

    if let Err(e) = init_logging(&config) {
        eprintln!("Logging disabled: {e:#}");
    }
    for w in &warnings {
        log::warn!("config: {w}");
    }
    log::info!("physics {:?}, display {:?}", config.physics, config.display);

    let mut renderer = Renderer::new(&config.display);

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let (tiles_x, tiles_y) = renderer.grid_dims();
    let mut state = GameState::new(tiles_x, tiles_y, config.physics.clone());
    log::info!("world {tiles_x}x{tiles_y} tiles, player at ({}, {})", state.player.x, state.player.y);

    let sound = SoundEngine::new();

    let result = game_loop(&mut state, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game loop failed: {e:#}");
        eprintln!("Game error: {e:#}");
    }

    println!("Thanks for playing Tilecraft!");
}

/// Logging goes to `general.log_file` when one is configured, filtered by
/// `RUST_LOG` or else `general.log_level`. Without a log file, logging is
/// only enabled when `RUST_LOG` is set, and then goes to stderr.
fn init_logging(config: &GameConfig) -> anyhow::Result<()> {
    let env_filter = std::env::var("RUST_LOG").ok();
    let mut builder = env_logger::Builder::new();

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            builder.parse_filters(env_filter.as_deref().unwrap_or(&config.log_level));
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => match env_filter {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => return Ok(()),
        },
    }

    builder.try_init()?;
    Ok(())
}

fn game_loop(
    state: &mut GameState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> anyhow::Result<()> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.keyboard_enhanced();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut controls = VirtualControls::new();
    let (term_w, term_h) = renderer.term_size();
    controls.layout(term_w, term_h);

    let tick_rate = Duration::from_millis(config.display.tick_rate_ms);
    let mut last_tick = Instant::now();
    let mut events = Vec::new();
    let mut tapped = FrameInput::default();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
            log::info!("quit after {} frames", state.tick);
            break;
        }

        if let Some((w, h)) = kb.take_resize() {
            renderer.resize(w, h);
            controls.layout(w as usize, h as usize);
            let (tiles_x, tiles_y) = renderer.grid_dims();
            events.push(step::resize_world(state, tiles_x, tiles_y));
        }

        // ── One-shot actions, applied between frames ──

        let mut cycle = kb.any_pressed(KEYS_CYCLE) || gp.cycle_pressed();
        let mut build = kb.any_pressed(KEYS_BUILD) || gp.build_pressed();
        for m in kb.mouse_events() {
            match controls.handle_mouse(m) {
                Some(ControlAction::Cycle) => cycle = true,
                Some(ControlAction::Build) => build = true,
                None => {}
            }
        }
        if cycle {
            events.push(step::cycle_block(state));
        }
        if build {
            let block = state.selected;
            events.extend(step::place_block(state, block));
        }

        // ── Frame: draw, then read input, then integrate ──

        tapped = tapped.or(kb.pressed_input());

        if last_tick.elapsed() >= tick_rate {
            renderer.render(state, &controls)?;
            let input = std::mem::take(&mut tapped)
                .or(kb.held_input())
                .or(controls.frame_input())
                .or(gp.frame_input());
            events.extend(step::step(state, input));
            last_tick = Instant::now();
        }

        process_events(sound, &events);
        events.clear();

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::WorldRegenerated { tiles_x, tiles_y } => {
                log::info!("viewport resized, world regenerated at {tiles_x}x{tiles_y}");
            }
            other => log::debug!("{other:?}"),
        }

        let Some(sfx) = sound else { continue };
        match event {
            GameEvent::Jumped => sfx.play_jump(),
            GameEvent::Landed => sfx.play_land(),
            GameEvent::BlockPlaced { .. } => sfx.play_place(),
            GameEvent::BlockCycled { .. } => sfx.play_cycle(),
            _ => {}
        }
    }
}
