use glam::Vec2;

use crate::net::{PlayerId, PlayerState, Snapshot};
use crate::player::PlayerRegistry;
use crate::snapshot::{GhostArena, SnapshotBuffer};

use super::replay::{Spawn, collect_spawns};

/// The snapshots around render time and how far render time has progressed between them.
#[derive(Debug, Clone, Copy)]
pub struct Bracket<'a> {
    pub previous: &'a Snapshot,
    pub target: &'a Snapshot,
    pub blend: f32,
    /// False when no pair strictly contained render time and the oldest sample is used for
    /// both ends.
    pub bracketed: bool,
}

/// Progress of `render_time` from `previous_time` toward `target_time`: 0 at `previous`,
/// 1 at `target`. A zero-width or otherwise degenerate span yields 0.
pub fn blend_factor(previous_time: f64, target_time: f64, render_time: f64) -> f32 {
    let blend = (render_time - previous_time) / (target_time - previous_time);
    if blend.is_finite() {
        blend.clamp(0.0, 1.0) as f32
    } else {
        0.0
    }
}

/// Scans oldest to newest for the first adjacent pair with
/// `previous.server_time < render_time < target.server_time`. Without one, the oldest
/// snapshot stands in for both ends instead of extrapolating.
pub fn find_bracket(buffer: &SnapshotBuffer, render_time: f64) -> Option<Bracket<'_>> {
    let found = buffer.pairs().find(|(previous, target)| {
        previous.server_time < render_time && render_time < target.server_time
    });

    let (previous, target, bracketed) = match found {
        Some((previous, target)) => (previous, target, true),
        None => {
            let oldest = buffer.oldest()?;
            (oldest, oldest, false)
        }
    };

    Some(Bracket {
        previous,
        target,
        blend: blend_factor(previous.server_time, target.server_time, render_time),
        bracketed,
    })
}

#[derive(Debug, Clone, Default)]
pub struct InterpolationStats {
    pub buffer_size: usize,
    pub render_time: f64,
    pub blend: f32,
    pub bracketed: bool,
    pub interpolated_players: usize,
    pub skipped_players: usize,
    pub replayed_spawns: usize,
}

/// What a frame of interpolation acts on.
pub struct InterpolationTargets<'a> {
    pub players: &'a mut PlayerRegistry,
    pub ghosts: &'a mut GhostArena,
    /// Drive the local player from the timeline too.
    pub include_local: bool,
}

#[derive(Debug)]
pub struct InterpolationEngine {
    smoothing: bool,
    last_replayed_time: Option<f64>,
    stats: InterpolationStats,
}

impl InterpolationEngine {
    pub fn new(smoothing: bool) -> Self {
        Self {
            smoothing,
            last_replayed_time: None,
            stats: InterpolationStats::default(),
        }
    }

    pub fn smoothing(&self) -> bool {
        self.smoothing
    }

    /// Runs one render frame. `factor` is the per-frame smoothing weight, separate from the
    /// timeline blend. Returns the bullets and events to spawn this frame.
    pub fn update(
        &mut self,
        buffer: &SnapshotBuffer,
        render_time: f64,
        factor: f32,
        targets: InterpolationTargets<'_>,
    ) -> Vec<Spawn> {
        let Some(bracket) = find_bracket(buffer, render_time) else {
            return Vec::new();
        };
        let Ok(latest) = buffer.latest() else {
            return Vec::new();
        };
        let factor = factor.clamp(0.0, 1.0);
        let InterpolationTargets {
            players,
            ghosts,
            include_local,
        } = targets;

        log::trace!(
            "Render time {:.3} between {:.3} and {:.3}, blend {:.3}",
            render_time,
            bracket.previous.server_time,
            bracket.target.server_time,
            bracket.blend
        );

        let mut interpolated = 0;
        let mut skipped = 0;

        // Players are matched by list position.
        let pairs = bracket
            .previous
            .players
            .iter()
            .zip(bracket.target.players.iter());
        for (from, to) in pairs {
            if from.id != to.id || players.is_local(&to.id) {
                skipped += 1;
                continue;
            }
            let target = from.position().lerp(to.position(), bracket.blend);
            let fresh = latest.player(&to.id).map(PlayerState::position);
            if self.blend_player(players, ghosts, &to.id, target, fresh, factor) {
                interpolated += 1;
            } else {
                skipped += 1;
            }
        }
        skipped += bracket
            .previous
            .players
            .len()
            .abs_diff(bracket.target.players.len());

        if include_local {
            self.blend_local(players, ghosts, &bracket, latest, factor);
        }

        let spawns = self.replay_through(buffer, bracket.target.server_time, players);

        self.stats = InterpolationStats {
            buffer_size: buffer.len(),
            render_time,
            blend: bracket.blend,
            bracketed: bracket.bracketed,
            interpolated_players: interpolated,
            skipped_players: skipped,
            replayed_spawns: spawns.len(),
        };

        spawns
    }

    /// `target` is the timeline position, `fresh` the newest reported one.
    fn blend_player(
        &self,
        players: &mut PlayerRegistry,
        ghosts: &mut GhostArena,
        id: &PlayerId,
        target: Vec2,
        fresh: Option<Vec2>,
        factor: f32,
    ) -> bool {
        let Some(player) = players.get_mut(id) else {
            log::trace!("Skipping untracked player {}", id);
            return false;
        };

        if let Some(fresh) = fresh {
            ghosts.set_server(id, fresh);
        }
        ghosts.set_local(id, target);
        player.position = self.smooth(player.position, target, factor);
        true
    }

    fn blend_local(
        &self,
        players: &mut PlayerRegistry,
        ghosts: &mut GhostArena,
        bracket: &Bracket<'_>,
        latest: &Snapshot,
        factor: f32,
    ) {
        let Some(player) = players.local_mut() else {
            return;
        };

        ghosts.set_server(&player.id, latest.own_position());
        let target = bracket
            .previous
            .own_position()
            .lerp(bracket.target.own_position(), bracket.blend);
        ghosts.set_local(&player.id, target);
        player.save_previous();
        player.position = self.smooth(player.position, target, factor);
    }

    fn smooth(&self, current: Vec2, target: Vec2, factor: f32) -> Vec2 {
        if self.smoothing {
            current.lerp(target, factor)
        } else {
            target
        }
    }

    /// Bullets and events are spawned once per snapshot: every buffered snapshot past the
    /// watermark up to the current target is replayed, so snapshots that arrived together and
    /// never became a target are not lost.
    fn replay_through(
        &mut self,
        buffer: &SnapshotBuffer,
        target_time: f64,
        players: &PlayerRegistry,
    ) -> Vec<Spawn> {
        let watermark = self.last_replayed_time;
        if watermark.is_some_and(|time| target_time <= time) {
            return Vec::new();
        }
        self.last_replayed_time = Some(target_time);

        buffer
            .iter()
            .filter(|snapshot| {
                snapshot.server_time <= target_time
                    && watermark.is_none_or(|time| snapshot.server_time > time)
                    && snapshot.has_replays()
            })
            .flat_map(|snapshot| collect_spawns(snapshot, players))
            .collect()
    }

    pub fn stats(&self) -> &InterpolationStats {
        &self.stats
    }

    pub fn reset(&mut self) {
        self.last_replayed_time = None;
        self.stats = InterpolationStats::default();
    }
}
