use glam::Vec2;

use crate::error::SyncError;
use crate::net::{InputCodes, NetStats, PlayerId, Snapshot};
use crate::player::{LinearMovement, Movement, Player, PlayerRegistry};
use crate::simulation::Clock;
use crate::snapshot::{GhostArena, SnapshotBuffer};

use super::backend::{NetworkSender, RenderFrame, Renderer, dispatch_spawns};
use super::config::SyncConfig;
use super::hooks::{HookContext, HookFn, HookRegistry, HookToken};
use super::input::InputSequencer;
use super::interpolation::{InterpolationEngine, InterpolationStats, InterpolationTargets};
use super::mode::SyncMode;
use super::prediction::{ClientPrediction, Reconciliation};
use super::replay::{Spawn, collect_spawns};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub snapshots_received: u64,
    pub snapshots_rejected: u64,
    pub frames_drawn: u64,
    pub corrections: u64,
    pub pending_inputs: usize,
    pub buffered_snapshots: usize,
}

/// Client-side synchronization core.
///
/// Driven by two callbacks from the frame scheduler: [`SyncClient::update`] on every fixed
/// simulation step and [`SyncClient::draw`] on every rendered frame. Snapshots handed to
/// [`SyncClient::push_update`] are buffered; positions only change inside those two calls,
/// except in naive mode, which applies snapshots as they arrive.
pub struct SyncClient {
    config: SyncConfig,
    mode: SyncMode,
    clock: Clock,
    sequencer: InputSequencer,
    buffer: SnapshotBuffer,
    players: PlayerRegistry,
    ghosts: GhostArena,
    prediction: ClientPrediction,
    interpolation: InterpolationEngine,
    hooks: HookRegistry,
    net_stats: NetStats,
    sender: Option<Box<dyn NetworkSender>>,
    renderer: Option<Box<dyn Renderer>>,
    snapshots_received: u64,
    snapshots_rejected: u64,
    frames_drawn: u64,
}

impl SyncClient {
    pub fn new(config: SyncConfig) -> Self {
        let movement = LinearMovement {
            speed: config.move_speed,
        };
        Self::with_movement(config, Box::new(movement))
    }

    pub fn with_movement(config: SyncConfig, movement: Box<dyn Movement>) -> Self {
        let mode = config.mode();
        log::debug!(
            "Sync mode {:?}, render delay {} ms, buffer of {} snapshots",
            mode,
            config.network_offset_ms,
            config.buffer_capacity()
        );

        Self {
            mode,
            clock: Clock::new(config.network_offset()),
            sequencer: InputSequencer::new(),
            buffer: SnapshotBuffer::new(config.buffer_capacity()),
            players: PlayerRegistry::new(),
            ghosts: GhostArena::new(),
            prediction: ClientPrediction::new(movement),
            interpolation: InterpolationEngine::new(config.client_smoothing),
            hooks: HookRegistry::new(),
            net_stats: NetStats::default(),
            sender: None,
            renderer: None,
            snapshots_received: 0,
            snapshots_rejected: 0,
            frames_drawn: 0,
            config,
        }
    }

    pub fn add_player(&mut self, id: impl Into<PlayerId>, position: Vec2) {
        let id = id.into();
        self.ghosts.spawn_pair(&id, position);
        if self.players.add(Player::new(id.clone(), position)).is_some() {
            log::info!("Player {} re-added", id);
        } else {
            log::info!("Player {} added", id);
        }
    }

    /// Removes the player together with both of its ghosts and its pending input.
    pub fn remove_player(&mut self, id: &PlayerId) -> Option<Player> {
        self.ghosts.despawn_pair(id);
        let removed = self.players.remove(id);
        if removed.is_some() {
            log::info!("Player {} removed", id);
        }
        removed
    }

    pub fn set_local_player(&mut self, id: &PlayerId) -> Result<(), SyncError> {
        self.players.set_local(id)?;
        log::info!("Local player is {}", id);
        Ok(())
    }

    pub fn local_player(&self) -> Option<&Player> {
        self.players.local()
    }

    pub fn local_player_id(&self) -> Option<&PlayerId> {
        self.players.local_id()
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    pub fn set_renderer(&mut self, renderer: Box<dyn Renderer>) {
        self.renderer = Some(renderer);
    }

    pub fn set_sender(&mut self, sender: Box<dyn NetworkSender>) {
        self.sender = Some(sender);
    }

    pub fn register_hook(&mut self, name: impl Into<String>, listener: HookFn) -> HookToken {
        self.hooks.register(name, listener)
    }

    pub fn unregister_hook(&mut self, token: HookToken) -> bool {
        self.hooks.unregister(token)
    }

    pub fn unregister_hook_named(&mut self, name: &str) -> bool {
        self.hooks.unregister_named(name)
    }

    pub fn record_ping(&mut self, rtt: f64) {
        self.net_stats.record_ping(rtt);
    }

    /// Accepts one server update. Malformed snapshots are rejected before buffering.
    pub fn push_update(&mut self, snapshot: Snapshot) -> Result<(), SyncError> {
        if let Err(err) = snapshot.validate() {
            self.snapshots_rejected += 1;
            log::warn!("Rejected snapshot: {}", err);
            return Err(err.into());
        }

        self.clock.on_snapshot(snapshot.server_time);
        self.snapshots_received += 1;

        if self.mode.buffers_snapshots() {
            self.buffer.push(snapshot);
            if self.mode.predicts_local() {
                self.prediction.mark_snapshot();
            }
        } else {
            self.apply_naive(&snapshot);
        }
        Ok(())
    }

    /// One fixed simulation step: captures and sends input, then predicts the local player
    /// when prediction is on.
    pub fn update(&mut self, codes: InputCodes) -> Result<(), SyncError> {
        let dt = self.config.simulation_timestep;
        let local_time = self.clock.local_time();
        let player = self.players.local_mut().ok_or(SyncError::NoLocalPlayer)?;

        if let Some(line) = self.sequencer.capture_frame(codes, local_time, player) {
            match self.sender.as_mut() {
                Some(sender) => sender.send(line),
                None => log::trace!("No sender, dropping {}", line),
            }
        }

        if self.mode.predicts_local() {
            self.prediction.apply_input(player, codes, dt);
        }

        self.clock.advance(dt);
        Ok(())
    }

    /// One rendered frame. `interpolation` is the scheduler's blend fraction, also used as the
    /// smoothing weight.
    pub fn draw(&mut self, time: f64, interpolation: f32) -> Result<(), SyncError> {
        if self.players.local().is_none() {
            return Err(SyncError::NoLocalPlayer);
        }
        let factor = interpolation.clamp(0.0, 1.0);

        let spawns = match self.mode {
            SyncMode::Naive => Vec::new(),
            SyncMode::Predicted => {
                if let Some(player) = self.players.local_mut() {
                    self.prediction
                        .reconcile_latest(player, &mut self.ghosts, &self.buffer);
                }
                self.interpolate(factor, false)
            }
            SyncMode::InterpolationOnly => self.interpolate(factor, true),
        };

        match self.renderer.as_deref_mut() {
            Some(renderer) => {
                dispatch_spawns(renderer, &spawns);
                let frame =
                    Self::render_frame(&self.players, &self.ghosts, self.mode, time, factor);
                renderer.draw_frame(&frame);
            }
            None => log::trace!("No renderer, skipping frame at {:.3}", time),
        }

        let context = HookContext {
            time,
            client_time: self.clock.local_time(),
            server_time: self.clock.server_time(),
            net_latency: self.net_stats.latency,
            net_ping: self.net_stats.ping,
        };
        self.hooks.run(&context);
        self.frames_drawn += 1;
        Ok(())
    }

    fn interpolate(&mut self, factor: f32, include_local: bool) -> Vec<Spawn> {
        self.interpolation.update(
            &self.buffer,
            self.clock.render_time(),
            factor,
            InterpolationTargets {
                players: &mut self.players,
                ghosts: &mut self.ghosts,
                include_local,
            },
        )
    }

    fn apply_naive(&mut self, snapshot: &Snapshot) {
        if let Some(player) = self.players.local_mut() {
            player.position = snapshot.own_position();
            player.save_previous();
        }

        for state in &snapshot.players {
            if self.players.is_local(&state.id) {
                continue;
            }
            if let Some(player) = self.players.get_mut(&state.id) {
                player.position = state.position();
            }
        }

        if snapshot.has_replays() {
            let spawns = collect_spawns(snapshot, &self.players);
            if let Some(renderer) = self.renderer.as_deref_mut() {
                dispatch_spawns(renderer, &spawns);
            }
        }
    }

    fn render_frame(
        players: &PlayerRegistry,
        ghosts: &GhostArena,
        mode: SyncMode,
        time: f64,
        factor: f32,
    ) -> RenderFrame {
        let players = players
            .iter()
            .map(|player| {
                // The predicted local player is blended between simulation steps.
                let position = if mode.predicts_local() && players.is_local(&player.id) {
                    player.render_position(factor)
                } else {
                    player.position
                };
                (player.id.clone(), position)
            })
            .collect();
        let ghosts = ghosts
            .ghosts()
            .map(|ghost| (ghost.owner.clone(), ghost.kind, ghost.position))
            .collect();

        RenderFrame {
            time,
            players,
            ghosts,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn buffer(&self) -> &SnapshotBuffer {
        &self.buffer
    }

    pub fn ghosts(&self) -> &GhostArena {
        &self.ghosts
    }

    pub fn net_stats(&self) -> &NetStats {
        &self.net_stats
    }

    pub fn last_sequence(&self) -> u32 {
        self.sequencer.last_sequence()
    }

    pub fn last_reconciliation(&self) -> Option<Reconciliation> {
        self.prediction.last_outcome()
    }

    pub fn interpolation_stats(&self) -> &InterpolationStats {
        self.interpolation.stats()
    }

    pub fn stats(&self) -> SyncStats {
        SyncStats {
            snapshots_received: self.snapshots_received,
            snapshots_rejected: self.snapshots_rejected,
            frames_drawn: self.frames_drawn,
            corrections: self.prediction.corrections(),
            pending_inputs: self
                .players
                .local()
                .map_or(0, |p| p.pending_inputs().len()),
            buffered_snapshots: self.buffer.len(),
        }
    }
}
