use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use verilandia::{Identity, SyncController};

use crate::bot::Bot;
use crate::config::ClientConfig;

/// Longest step the world is ever integrated by, so a stall doesn't fling
/// entities across the map.
const MAX_FRAME_DT: f32 = 0.1;

/// Weight of the newest frame in the smoothed frame rate.
const FPS_SMOOTHING: f32 = 0.1;

pub struct App {
    controller: SyncController,
    config: ClientConfig,
    bot: Option<Bot>,
    fps: f32,
    last_frame_time: Option<Instant>,
    last_report: Instant,
}

impl App {
    pub fn new(controller: SyncController, config: ClientConfig) -> Self {
        let bot = config.bot.then(Bot::new);
        Self {
            controller,
            config,
            bot,
            fps: 0.0,
            last_frame_time: None,
            last_report: Instant::now(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let started = Instant::now();
        let frame_time = self.config.frame_time();

        log::info!(
            "Running at {} fps{}",
            self.config.fps,
            if self.bot.is_some() { " with bot input" } else { "" }
        );

        loop {
            let frame_start = Instant::now();
            if self
                .config
                .duration
                .is_some_and(|limit| started.elapsed() >= limit)
            {
                break;
            }

            self.frame()?;

            if let Some(remaining) = frame_time.checked_sub(frame_start.elapsed()) {
                thread::sleep(remaining);
            }
        }

        self.report();
        log::info!("Session over after {:.1}s", started.elapsed().as_secs_f32());
        Ok(())
    }

    fn frame(&mut self) -> Result<()> {
        let dt = self.frame_dt();
        self.fps = smooth_fps(self.fps, dt);

        self.controller.update(dt);

        if let Some(bot) = &mut self.bot {
            bot.drive(&mut self.controller, dt)?;
        }

        if self
            .config
            .report_interval
            .is_some_and(|every| self.last_report.elapsed() >= every)
        {
            self.report();
        }

        Ok(())
    }

    fn frame_dt(&mut self) -> f32 {
        let now = Instant::now();
        let dt = self
            .last_frame_time
            .map(|t| now.duration_since(t).as_secs_f32())
            .unwrap_or(0.0)
            .min(MAX_FRAME_DT);
        self.last_frame_time = Some(now);
        dt
    }

    fn report(&mut self) {
        self.last_report = Instant::now();

        let Identity::Identified(id) = self.controller.identity() else {
            log::info!(
                "Waiting for first snapshot from server | ping {}",
                format_ping(self.controller.ping())
            );
            return;
        };

        let world = self.controller.world();
        let net = self.controller.network_stats();
        let sync = self.controller.sync_stats();
        log::info!(
            "Player {} at ({:.1}, {:.1}) | {} enemies, {} bullets | ping {} | {:.0} fps | rx {} tx {} dropped {} | snapshots {}/{} rejected",
            id,
            world.player().pos.x,
            world.player().pos.y,
            world.enemies().len(),
            world.bullets().len(),
            format_ping(self.controller.ping()),
            self.fps,
            net.datagrams_received,
            net.datagrams_sent,
            net.datagrams_dropped,
            sync.snapshots_applied,
            sync.snapshots_rejected,
        );

        if self.config.scoreboard {
            for (rank, row) in world.scoreboard().iter().enumerate() {
                log::info!(
                    "  #{:<2} player {:<4} {:>3} kills {:>3} deaths  K/D {:.2}{}",
                    rank + 1,
                    row.id,
                    row.kills,
                    row.deaths,
                    row.kd_ratio,
                    if row.is_local { "  (you)" } else { "" }
                );
            }
        }
    }
}

fn smooth_fps(fps: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return fps;
    }
    let instant = 1.0 / dt;
    if fps == 0.0 {
        return instant;
    }
    fps + FPS_SMOOTHING * (instant - fps)
}

fn format_ping(ping: Duration) -> String {
    if ping.is_zero() {
        return "--".to_string();
    }
    format!("{:.1} ms", ping.as_secs_f32() * 1000.0)
}
