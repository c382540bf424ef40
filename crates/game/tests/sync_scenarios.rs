use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use netsync::{
    BulletEvent, GameEvent, GhostKind, HookContext, InputCodes, PlayerId, Reconciliation,
    RenderFrame, Renderer, Snapshot, SyncClient, SyncConfig, SyncError, SyncMode,
};

#[derive(Default)]
struct Recorded {
    bullets: Vec<(u32, Vec2)>,
    events: Vec<String>,
    frames: Vec<RenderFrame>,
}

struct RecordingRenderer(Rc<RefCell<Recorded>>);

impl Renderer for RecordingRenderer {
    fn spawn_bullet(&mut self, bullet: &BulletEvent, origin: Vec2) {
        self.0.borrow_mut().bullets.push((bullet.id, origin));
    }

    fn spawn_event(&mut self, event: &GameEvent, _origin: Vec2) {
        self.0.borrow_mut().events.push(event.name.clone());
    }

    fn draw_frame(&mut self, frame: &RenderFrame) {
        self.0.borrow_mut().frames.push(frame.clone());
    }
}

fn me() -> PlayerId {
    PlayerId::from("me")
}

fn p2() -> PlayerId {
    PlayerId::from("p2")
}

fn setup(config: SyncConfig) -> (SyncClient, Rc<RefCell<Recorded>>, Rc<RefCell<Vec<String>>>) {
    let mut client = SyncClient::new(config);
    client.add_player("me", Vec2::ZERO);
    client.add_player("p2", Vec2::ZERO);
    client.set_local_player(&me()).unwrap();

    let recorded = Rc::new(RefCell::new(Recorded::default()));
    client.set_renderer(Box::new(RecordingRenderer(Rc::clone(&recorded))));

    let sent = Rc::new(RefCell::new(Vec::new()));
    let outbox = Rc::clone(&sent);
    client.set_sender(Box::new(move |line: String| outbox.borrow_mut().push(line)));

    (client, recorded, sent)
}

fn fire(snapshot: &mut Snapshot, id: u32, by: &str) {
    snapshot.bullets.push(BulletEvent {
        id,
        fired_by: PlayerId::from(by),
        direction: [1.0, 0.0],
    });
}

#[test]
fn naive_mode_snaps_on_arrival() {
    let (mut client, recorded, _) = setup(SyncConfig {
        naive_approach: true,
        ..Default::default()
    });
    assert_eq!(client.mode(), SyncMode::Naive);

    let snapshot = Snapshot::new(10.0)
        .with_own_player(Vec2::new(5.0, 5.0), None)
        .with_player("p2", Vec2::new(1.0, 1.0));
    client.push_update(snapshot).unwrap();

    assert_eq!(client.local_player().unwrap().position, Vec2::new(5.0, 5.0));
    assert_eq!(client.player(&p2()).unwrap().position, Vec2::new(1.0, 1.0));
    assert!(client.buffer().is_empty());
    assert_eq!(client.ghosts().server_position(&p2()), Some(Vec2::ZERO));
    assert_eq!(client.ghosts().local_position(&p2()), Some(Vec2::ZERO));
    assert!(recorded.borrow().bullets.is_empty());
}

#[test]
fn naive_mode_replays_bullets_immediately() {
    let (mut client, recorded, _) = setup(SyncConfig {
        naive_approach: true,
        ..Default::default()
    });

    let mut snapshot = Snapshot::new(1.0).with_player("p2", Vec2::new(3.0, 0.0));
    fire(&mut snapshot, 9, "p2");
    client.push_update(snapshot).unwrap();

    assert_eq!(recorded.borrow().bullets, vec![(9, Vec2::new(3.0, 0.0))]);
}

#[test]
fn predicted_mode_without_ack_keeps_pending_input() {
    let (mut client, _, sent) = setup(SyncConfig::default());

    client.update(InputCodes::RIGHT).unwrap();
    client.update(InputCodes::RIGHT | InputCodes::UP).unwrap();
    let predicted = client.local_player().unwrap().position;
    assert!(predicted.x > 0.0);
    assert_eq!(sent.borrow().len(), 2);
    assert!(sent.borrow()[1].starts_with("i.up-right."));

    client
        .push_update(Snapshot::new(1.0).with_own_player(Vec2::new(-4.0, 2.0), None))
        .unwrap();
    client.draw(1.0, 1.0).unwrap();

    let local = client.local_player().unwrap();
    assert_eq!(local.pending_sequences(), vec![1, 2]);
    assert_eq!(local.position, predicted);
    assert_eq!(client.ghosts().server_position(&me()), Some(Vec2::new(-4.0, 2.0)));
    assert_eq!(client.last_reconciliation(), Some(Reconciliation::NoAck));
}

#[test]
fn predicted_mode_reconciles_through_acknowledged_input() {
    let (mut client, recorded, _) = setup(SyncConfig::default());
    for _ in 0..6 {
        client.update(InputCodes::DOWN).unwrap();
    }

    let ack = Snapshot::new(1.0).with_own_player(Vec2::new(0.0, 8.0), Some(4));
    client.push_update(ack.clone()).unwrap();
    client.draw(1.0, 0.5).unwrap();

    assert_eq!(client.local_player().unwrap().pending_sequences(), vec![5, 6]);
    assert_eq!(client.local_player().unwrap().position, Vec2::new(0.0, 8.0));
    let drawn = recorded.borrow().frames.last().unwrap().player(&me());
    assert_eq!(drawn, Some(Vec2::new(0.0, 8.0)));

    // The same snapshot delivered again changes nothing.
    client.push_update(ack).unwrap();
    client.draw(1.1, 1.0).unwrap();

    assert_eq!(client.local_player().unwrap().pending_sequences(), vec![5, 6]);
    assert_eq!(client.local_player().unwrap().position, Vec2::new(0.0, 8.0));
    assert_eq!(client.stats().corrections, 1);
}

#[test]
fn interpolation_only_renders_midpoint() {
    let (mut client, recorded, _) = setup(SyncConfig {
        client_prediction: false,
        client_smoothing: false,
        network_offset_ms: 500.0,
        ..Default::default()
    });
    assert_eq!(client.mode(), SyncMode::InterpolationOnly);

    client
        .push_update(
            Snapshot::new(10.0)
                .with_own_player(Vec2::new(0.0, 0.0), None)
                .with_player("p2", Vec2::new(0.0, 0.0)),
        )
        .unwrap();
    client
        .push_update(
            Snapshot::new(11.0)
                .with_own_player(Vec2::new(2.0, 0.0), None)
                .with_player("p2", Vec2::new(10.0, 4.0)),
        )
        .unwrap();
    assert!((client.clock().render_time() - 10.5).abs() < 1e-9);

    client.draw(10.5, 1.0).unwrap();

    let stats = client.interpolation_stats();
    assert!(stats.bracketed);
    assert!((stats.blend - 0.5).abs() < 1e-6);
    assert_eq!(client.player(&p2()).unwrap().position, Vec2::new(5.0, 2.0));
    assert_eq!(client.local_player().unwrap().position, Vec2::new(1.0, 0.0));

    let recorded = recorded.borrow();
    let frame = recorded.frames.last().unwrap();
    assert_eq!(frame.player(&p2()), Some(Vec2::new(5.0, 2.0)));
    assert!(frame
        .ghosts
        .iter()
        .any(|(owner, kind, position)| *owner == p2()
            && *kind == GhostKind::Server
            && *position == Vec2::new(10.0, 4.0)));
}

#[test]
fn buffer_stays_bounded() {
    let (mut client, _, _) = setup(SyncConfig {
        assumed_frame_rate: 10,
        network_buffer_size: 0.5,
        ..Default::default()
    });

    for tick in 0..20 {
        client.push_update(Snapshot::new(tick as f64 * 0.1)).unwrap();
        assert!(client.buffer().len() <= 5);
    }
    assert_eq!(client.buffer().len(), 5);
    assert!((client.buffer().oldest().unwrap().server_time - 1.5).abs() < 1e-9);
}

#[test]
fn bullets_replay_once_from_current_position() {
    let (mut client, recorded, _) = setup(SyncConfig {
        client_smoothing: false,
        network_offset_ms: 500.0,
        ..Default::default()
    });

    client
        .push_update(Snapshot::new(10.0).with_player("p2", Vec2::ZERO))
        .unwrap();
    let mut target = Snapshot::new(11.0).with_player("p2", Vec2::new(4.0, 0.0));
    fire(&mut target, 1, "p2");
    target.events.push(GameEvent {
        id: 2,
        name: "explosion".to_string(),
        fired_by: p2(),
    });
    client.push_update(target).unwrap();

    client.draw(0.0, 1.0).unwrap();
    client.draw(0.016, 1.0).unwrap();

    let recorded = recorded.borrow();
    assert_eq!(recorded.bullets, vec![(1, Vec2::new(2.0, 0.0))]);
    assert_eq!(recorded.events, vec!["explosion".to_string()]);
}

#[test]
fn removed_player_leaves_no_ghosts() {
    let (mut client, _, _) = setup(SyncConfig::default());

    client.remove_player(&p2()).unwrap();

    assert!(client.player(&p2()).is_none());
    assert!(client.ghosts().ghosts().all(|ghost| ghost.owner != p2()));
    assert!(client.ghosts().pair(&me()).is_some());
}

#[test]
fn unknown_local_player_is_rejected() {
    let mut client = SyncClient::new(SyncConfig::default());

    let result = client.set_local_player(&PlayerId::from("nobody"));

    assert!(matches!(result, Err(SyncError::UnknownPlayer(_))));
    assert!(matches!(client.draw(0.0, 0.0), Err(SyncError::NoLocalPlayer)));
}

#[test]
fn hooks_run_after_each_draw() {
    let (mut client, _, _) = setup(SyncConfig::default());
    let seen = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&seen);
    let token = client.register_hook(
        "stats",
        Box::new(move |ctx: &HookContext| sink.borrow_mut().push(*ctx)),
    );
    client.record_ping(0.2);
    client
        .push_update(Snapshot::new(3.0).with_own_player(Vec2::ZERO, None))
        .unwrap();
    client.draw(7.0, 0.5).unwrap();

    assert!(client.unregister_hook(token));
    client.draw(7.1, 0.5).unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].time, 7.0);
    assert_eq!(seen[0].server_time, 3.0);
    assert!((seen[0].net_ping - 0.2).abs() < 1e-9);
    assert!((seen[0].net_latency - 0.1).abs() < 1e-9);
}

#[test]
fn idle_input_is_not_sent() {
    let (mut client, _, sent) = setup(SyncConfig::default());

    client.update(InputCodes::empty()).unwrap();
    client.update(InputCodes::LEFT).unwrap();

    let sent = sent.borrow();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("i.left.0-0166"));
    assert!(sent[0].ends_with(".1"));
    assert_eq!(client.last_sequence(), 1);
}

#[test]
fn burst_arrivals_replay_every_snapshot() {
    let (mut client, recorded, _) = setup(SyncConfig {
        client_smoothing: false,
        network_offset_ms: 500.0,
        ..Default::default()
    });

    client
        .push_update(Snapshot::new(10.0).with_player("p2", Vec2::ZERO))
        .unwrap();
    let mut first = Snapshot::new(11.0).with_player("p2", Vec2::new(1.0, 0.0));
    fire(&mut first, 1, "p2");
    client.push_update(first).unwrap();
    client.draw(0.0, 1.0).unwrap();

    // Two snapshots land between frames; render time jumps past the first of them.
    let mut second = Snapshot::new(12.0).with_player("p2", Vec2::new(2.0, 0.0));
    fire(&mut second, 2, "p2");
    let mut third = Snapshot::new(13.0).with_player("p2", Vec2::new(3.0, 0.0));
    fire(&mut third, 3, "p2");
    client.push_update(second).unwrap();
    client.push_update(third).unwrap();

    for frame in 1..=11 {
        client.draw(frame as f64 * 0.016, 1.0).unwrap();
    }

    let ids: Vec<u32> = recorded.borrow().bullets.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}
