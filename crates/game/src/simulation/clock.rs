/// Simulation, server and render time, in seconds.
///
/// `render_time` trails `server_time` by a fixed network offset and is only ever derived
/// from it.
#[derive(Debug, Clone)]
pub struct Clock {
    local_time: f64,
    server_time: f64,
    render_time: f64,
    network_offset: f64,
}

impl Clock {
    pub fn new(network_offset: f64) -> Self {
        Self {
            local_time: 0.0,
            server_time: 0.0,
            render_time: -network_offset,
            network_offset,
        }
    }

    pub fn advance(&mut self, delta_time: f64) {
        self.local_time += delta_time.max(0.0);
    }

    pub fn on_snapshot(&mut self, server_time: f64) {
        self.server_time = server_time;
        self.render_time = server_time - self.network_offset;
    }

    pub fn local_time(&self) -> f64 {
        self.local_time
    }

    pub fn server_time(&self) -> f64 {
        self.server_time
    }

    pub fn render_time(&self) -> f64 {
        self.render_time
    }

    pub fn network_offset(&self) -> f64 {
        self.network_offset
    }
}
