mod clock;
mod tick;

pub use clock::Clock;
pub use tick::FixedTimestep;
