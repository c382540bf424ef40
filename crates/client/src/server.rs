use std::collections::VecDeque;

use glam::Vec2;

use netsync::{
    BulletEvent, FixedTimestep, InputCodes, InputMessage, LinearMovement, Movement, PlayerId,
    Snapshot,
};

const BOT_RADIUS: f32 = 80.0;
const BOT_ANGULAR_SPEED: f32 = 1.0;
const BOT_FIRE_INTERVAL: u64 = 90;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub tick_rate: u32,
    /// Ticks between broadcast snapshots.
    pub snapshot_interval: u32,
    pub bot_count: usize,
    pub move_speed: f32,
    /// Step length the client simulates each input for.
    pub input_timestep: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            snapshot_interval: 3,
            bot_count: 2,
            move_speed: netsync::player::DEFAULT_MOVE_SPEED,
            input_timestep: 1.0 / 60.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Bot {
    id: PlayerId,
    center: Vec2,
    phase: f32,
    position: Vec2,
}

impl Bot {
    fn position_at(&self, time: f64) -> Vec2 {
        let angle = time as f32 * BOT_ANGULAR_SPEED + self.phase;
        self.center + Vec2::new(angle.cos(), angle.sin()) * BOT_RADIUS
    }
}

/// Minimal authoritative simulation for one connected client plus circling bots.
pub struct AuthoritativeServer {
    config: ServerConfig,
    movement: LinearMovement,
    timestep: FixedTimestep,
    time: f64,
    tick: u64,
    client_id: PlayerId,
    client_position: Vec2,
    last_processed: Option<u32>,
    input_queue: VecDeque<InputMessage>,
    bots: Vec<Bot>,
    pending_bullets: Vec<BulletEvent>,
    next_bullet_id: u32,
    rejected_inputs: u64,
}

impl AuthoritativeServer {
    pub fn new(config: ServerConfig, client_id: PlayerId, spawn: Vec2) -> Self {
        let bots = (0..config.bot_count)
            .map(|index| {
                let center = Vec2::new(200.0 + index as f32 * 2.5 * BOT_RADIUS, 200.0);
                let phase = index as f32 * std::f32::consts::FRAC_PI_2;
                let mut bot = Bot {
                    id: PlayerId::new(format!("bot-{}", index + 1)),
                    center,
                    phase,
                    position: center,
                };
                bot.position = bot.position_at(0.0);
                bot
            })
            .collect();

        Self {
            movement: LinearMovement {
                speed: config.move_speed,
            },
            timestep: FixedTimestep::from_rate(config.tick_rate),
            time: 0.0,
            tick: 0,
            client_id,
            client_position: spawn,
            last_processed: None,
            input_queue: VecDeque::new(),
            bots,
            pending_bullets: Vec::new(),
            next_bullet_id: 1,
            rejected_inputs: 0,
            config,
        }
    }

    /// Players the client has to know about, with their current positions.
    pub fn roster(&self) -> Vec<(PlayerId, Vec2)> {
        std::iter::once((self.client_id.clone(), self.client_position))
            .chain(self.bots.iter().map(|bot| (bot.id.clone(), bot.position)))
            .collect()
    }

    pub fn receive(&mut self, line: &str) {
        match InputMessage::parse(line) {
            Ok(message) => self.input_queue.push_back(message),
            Err(err) => {
                self.rejected_inputs += 1;
                log::warn!("Dropping input {:?}: {}", line, err);
            }
        }
    }

    /// Advances the simulation by `delta` seconds and returns the snapshots broadcast
    /// meanwhile.
    pub fn update(&mut self, delta: f64) -> Vec<Snapshot> {
        self.timestep.accumulate(delta);

        let mut broadcast = Vec::new();
        while self.timestep.consume_tick() {
            self.tick();
            if self.tick % self.config.snapshot_interval.max(1) as u64 == 0 {
                broadcast.push(self.snapshot());
            }
        }
        broadcast
    }

    fn tick(&mut self) {
        self.process_inputs();

        self.time += self.timestep.dt();
        self.tick += 1;

        for bot in &mut self.bots {
            bot.position = bot.position_at(self.time);
        }

        if self.tick % BOT_FIRE_INTERVAL == 0 {
            for bot in &self.bots {
                let direction = (self.client_position - bot.position).normalize_or_zero();
                self.pending_bullets.push(BulletEvent {
                    id: self.next_bullet_id,
                    fired_by: bot.id.clone(),
                    direction: direction.into(),
                });
                self.next_bullet_id += 1;
            }
        }
    }

    fn process_inputs(&mut self) {
        while let Some(message) = self.input_queue.pop_front() {
            // Late duplicates or reordered frames never move the player backwards in sequence.
            if self
                .last_processed
                .is_some_and(|last| message.sequence <= last)
            {
                log::trace!("Ignoring stale input {}", message.sequence);
                continue;
            }

            self.client_position =
                self.movement
                    .step(self.client_position, message.codes, self.config.input_timestep);
            self.last_processed = Some(message.sequence);

            if message.codes.contains(InputCodes::FIRE) {
                self.pending_bullets.push(BulletEvent {
                    id: self.next_bullet_id,
                    fired_by: self.client_id.clone(),
                    direction: message.codes.direction().into(),
                });
                self.next_bullet_id += 1;
            }
        }
    }

    fn snapshot(&mut self) -> Snapshot {
        let mut snapshot =
            Snapshot::new(self.time).with_own_player(self.client_position, self.last_processed);
        for bot in &self.bots {
            snapshot = snapshot.with_player(bot.id.as_str(), bot.position);
        }
        snapshot.bullets = std::mem::take(&mut self.pending_bullets);
        snapshot
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn client_position(&self) -> Vec2 {
        self.client_position
    }

    pub fn last_processed(&self) -> Option<u32> {
        self.last_processed
    }

    pub fn rejected_inputs(&self) -> u64 {
        self.rejected_inputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> AuthoritativeServer {
        AuthoritativeServer::new(ServerConfig::default(), PlayerId::from("me"), Vec2::ZERO)
    }

    #[test]
    fn applies_inputs_in_sequence() {
        let mut server = server();
        server.receive("i.right.0.1");
        server.receive("i.right.0-016.2");
        server.receive("i.right.0-016.2");
        server.update(1.0 / 60.0);

        assert_eq!(server.last_processed(), Some(2));
        assert!((server.client_position().x - 4.0).abs() < 1e-4);
    }

    #[test]
    fn malformed_input_is_counted() {
        let mut server = server();
        server.receive("x.up.0.1");
        server.receive("i.jump.0.1");

        assert_eq!(server.rejected_inputs(), 2);
        assert_eq!(server.last_processed(), None);
    }

    #[test]
    fn broadcasts_at_snapshot_interval() {
        let mut server = server();
        let snapshots = server.update(0.11);

        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].players.len(), 2);
        assert!(snapshots[0].server_time < snapshots[1].server_time);
        assert!(snapshots.iter().all(|s| s.validate().is_ok()));
    }

    #[test]
    fn bots_fire_periodically() {
        let mut server = server();
        let bullets: usize = (0..BOT_FIRE_INTERVAL)
            .flat_map(|_| server.update(1.0 / 60.0))
            .map(|s| s.bullets.len())
            .sum();

        assert_eq!(bullets, 2);
    }
}
