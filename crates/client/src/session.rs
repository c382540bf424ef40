use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use glam::Vec2;

use netsync::{
    FixedTimestep, HookContext, InputCodes, InputMessage, LinkConditions, LinkSimulator,
    PlayerId, Snapshot, SyncClient, SyncConfig,
};

use crate::report::SessionReport;
use crate::render::{FrameLog, LogRenderer};
use crate::server::{AuthoritativeServer, ServerConfig};

const LOCAL_PLAYER: &str = "me";
const STATUS_INTERVAL: u64 = 120;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub sync: SyncConfig,
    pub server: ServerConfig,
    pub link: LinkConditions,
    pub duration: f64,
    pub frame_rate: u32,
    pub seed: u64,
}

/// Deterministic input script: a square walk with a shot on every corner and short idle
/// pauses.
pub fn scripted_input(time: f64) -> InputCodes {
    const LEG: f64 = 0.75;
    let leg = (time / LEG) as u64;
    let within = time - leg as f64 * LEG;

    if within > LEG - 0.15 {
        return InputCodes::empty();
    }
    let codes = match leg % 4 {
        0 => InputCodes::RIGHT,
        1 => InputCodes::DOWN,
        2 => InputCodes::LEFT,
        _ => InputCodes::UP,
    };
    if within < 1.0 / 30.0 {
        codes | InputCodes::FIRE
    } else {
        codes
    }
}

/// A client and server running on one simulated clock, joined by two lossy links.
pub struct Session {
    config: SessionConfig,
    client: SyncClient,
    server: AuthoritativeServer,
    uplink: LinkSimulator<String>,
    downlink: LinkSimulator<Vec<u8>>,
    outbox: Rc<RefCell<Vec<String>>>,
    frame_log: Rc<RefCell<FrameLog>>,
    timestep: FixedTimestep,
    sent_at: BTreeMap<u32, f64>,
    now: f64,
    report: SessionReport,
}

impl Session {
    pub fn new(config: SessionConfig) -> anyhow::Result<Self> {
        let local = PlayerId::from(LOCAL_PLAYER);
        let server = AuthoritativeServer::new(config.server.clone(), local.clone(), Vec2::ZERO);

        let mut client = SyncClient::new(config.sync.clone());
        for (id, position) in server.roster() {
            client.add_player(id, position);
        }
        client.set_local_player(&local)?;

        let (renderer, frame_log) = LogRenderer::with_log();
        client.set_renderer(Box::new(renderer));

        let outbox = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&outbox);
        client.set_sender(Box::new(move |line: String| sink.borrow_mut().push(line)));

        let mut frames = 0u64;
        client.register_hook(
            "status",
            Box::new(move |ctx: &HookContext| {
                frames += 1;
                if frames % STATUS_INTERVAL == 0 {
                    log::debug!(
                        "t={:.2} client={:.2} server={:.2} ping={:.0}ms",
                        ctx.time,
                        ctx.client_time,
                        ctx.server_time,
                        ctx.net_ping * 1000.0
                    );
                }
            }),
        );

        log::info!(
            "Session: {:?} mode, {} bots, link {:?}",
            client.mode(),
            config.server.bot_count,
            config.link
        );

        Ok(Self {
            timestep: FixedTimestep::new(config.sync.simulation_timestep),
            uplink: LinkSimulator::new(config.link.clone(), config.seed),
            downlink: LinkSimulator::new(config.link.clone(), config.seed.wrapping_add(1)),
            report: SessionReport::new(client.mode()),
            client,
            server,
            outbox,
            frame_log,
            sent_at: BTreeMap::new(),
            now: 0.0,
            config,
        })
    }

    pub fn run(mut self) -> anyhow::Result<SessionReport> {
        let frame_dt = 1.0 / self.config.frame_rate.max(1) as f64;
        let frames = (self.config.duration / frame_dt).ceil() as u64;

        for _ in 0..frames {
            self.frame(frame_dt)?;
        }

        self.finish();
        Ok(self.report)
    }

    fn frame(&mut self, frame_dt: f64) -> anyhow::Result<()> {
        self.now += frame_dt;

        self.timestep.accumulate(frame_dt);
        while self.timestep.consume_tick() {
            let codes = scripted_input(self.client.clock().local_time());
            self.client.update(codes)?;
        }
        self.flush_outbox();

        for line in self.uplink.take_ready(self.now) {
            self.server.receive(&line);
        }
        for snapshot in self.server.update(frame_dt) {
            let bytes = snapshot.encode()?;
            self.downlink.send(self.now, bytes);
        }
        for bytes in self.downlink.take_ready(self.now) {
            self.deliver(&bytes);
        }

        self.client.draw(self.now, self.timestep.alpha())?;
        self.sample();
        Ok(())
    }

    fn flush_outbox(&mut self) {
        let lines: Vec<String> = self.outbox.borrow_mut().drain(..).collect();
        for line in lines {
            if let Ok(message) = InputMessage::parse(&line) {
                self.sent_at.insert(message.sequence, self.now);
            }
            self.uplink.send(self.now, line);
        }
    }

    fn deliver(&mut self, bytes: &[u8]) {
        let snapshot = match Snapshot::decode(bytes) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::warn!("Undecodable snapshot: {}", err);
                return;
            }
        };

        if let Some(acked) = snapshot.acknowledged_sequence() {
            if let Some(sent) = self.sent_at.get(&acked).copied() {
                self.client.record_ping(self.now - sent);
            }
            self.sent_at.retain(|&sequence, _| sequence > acked);
        }

        if let Err(err) = self.client.push_update(snapshot) {
            log::warn!("Snapshot rejected: {}", err);
        }
    }

    fn sample(&mut self) {
        let log = self.frame_log.borrow();
        let local = PlayerId::from(LOCAL_PLAYER);
        if let Some(rendered) = log.last_frame.as_ref().and_then(|frame| frame.player(&local)) {
            self.report
                .record_error(rendered.distance(self.server.client_position()));
        }
    }

    fn finish(&mut self) {
        let log = self.frame_log.borrow();
        let stats = self.client.stats();

        self.report.frames = log.frames;
        self.report.bullets = log.bullets;
        self.report.events = log.events;
        self.report.sync = stats;
        self.report.ping = self.client.net_stats().ping;
        self.report.uplink_dropped = self.uplink.dropped();
        self.report.downlink_dropped = self.downlink.dropped();
        self.report.in_flight = self.uplink.in_flight() + self.downlink.in_flight();
        self.report.rejected_inputs = self.server.rejected_inputs();
        self.report.server_acked = self.server.last_processed();
        self.report.server_time = self.server.time();
    }
}
