use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use netsync::{BulletEvent, GameEvent, RenderFrame, Renderer};

#[derive(Debug, Default)]
pub struct FrameLog {
    pub last_frame: Option<RenderFrame>,
    pub frames: u64,
    pub bullets: u64,
    pub events: u64,
}

/// Stands in for a drawing backend: keeps the last frame and counts spawns.
pub struct LogRenderer {
    log: Rc<RefCell<FrameLog>>,
}

impl LogRenderer {
    pub fn with_log() -> (Self, Rc<RefCell<FrameLog>>) {
        let log = Rc::new(RefCell::new(FrameLog::default()));
        (
            Self {
                log: Rc::clone(&log),
            },
            log,
        )
    }
}

impl Renderer for LogRenderer {
    fn spawn_bullet(&mut self, bullet: &BulletEvent, origin: Vec2) {
        log::trace!(
            "Bullet {} from {} at ({:.1}, {:.1})",
            bullet.id,
            bullet.fired_by,
            origin.x,
            origin.y
        );
        self.log.borrow_mut().bullets += 1;
    }

    fn spawn_event(&mut self, event: &GameEvent, _origin: Vec2) {
        log::trace!("Event {} from {}", event.name, event.fired_by);
        self.log.borrow_mut().events += 1;
    }

    fn draw_frame(&mut self, frame: &RenderFrame) {
        let mut log = self.log.borrow_mut();
        log.frames += 1;
        log.last_frame = Some(frame.clone());
    }
}
