use std::fmt;

use bitflags::bitflags;
use glam::Vec2;
use rkyv::{Archive, rancor};

pub const INPUT_TAG: &str = "i";
pub const FIELD_SEPARATOR: &str = ".";
pub const CODE_SEPARATOR: &str = "-";

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InputCodes: u8 {
        const UP = 1 << 0;
        const DOWN = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const FIRE = 1 << 4;
    }
}

/// Wire names, in the order they are written.
const CODE_NAMES: [(InputCodes, &str); 5] = [
    (InputCodes::UP, "up"),
    (InputCodes::DOWN, "down"),
    (InputCodes::LEFT, "left"),
    (InputCodes::RIGHT, "right"),
    (InputCodes::FIRE, "fire"),
];

impl InputCodes {
    pub fn from_wire_name(name: &str) -> Option<Self> {
        CODE_NAMES
            .iter()
            .find(|(_, wire)| *wire == name)
            .map(|(code, _)| *code)
    }

    pub fn to_wire(self) -> String {
        CODE_NAMES
            .iter()
            .filter(|(code, _)| self.contains(*code))
            .map(|(_, wire)| *wire)
            .collect::<Vec<_>>()
            .join(CODE_SEPARATOR)
    }

    pub fn from_wire(field: &str) -> Result<Self, WireError> {
        let mut codes = Self::empty();
        for name in field.split(CODE_SEPARATOR).filter(|name| !name.is_empty()) {
            codes |= Self::from_wire_name(name)
                .ok_or_else(|| WireError::UnknownCode(name.into()))?;
        }
        Ok(codes)
    }

    /// Unit direction of the pressed arrows. Screen space: y grows downward.
    pub fn direction(self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.contains(Self::UP) {
            dir.y -= 1.0;
        }
        if self.contains(Self::DOWN) {
            dir.y += 1.0;
        }
        if self.contains(Self::LEFT) {
            dir.x -= 1.0;
        }
        if self.contains(Self::RIGHT) {
            dir.x += 1.0;
        }
        dir.normalize_or_zero()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("message does not start with the input tag")]
    MissingTag,
    #[error("expected 4 fields, found {0}")]
    FieldCount(usize),
    #[error("unknown input code {0:?}")]
    UnknownCode(String),
    #[error("invalid local time {0:?}")]
    BadTime(String),
    #[error("invalid sequence number {0:?}")]
    BadSequence(String),
}

/// Outbound input line: `i.<codes>.<local time>.<sequence>`.
///
/// The local time's decimal point would collide with the field separator, so it is
/// written as `-` (`12.345` becomes `12-345`).
#[derive(Debug, Clone, PartialEq)]
pub struct InputMessage {
    pub codes: InputCodes,
    pub local_time: f64,
    pub sequence: u32,
}

impl InputMessage {
    pub fn encode(&self) -> String {
        let time = self
            .local_time
            .max(0.0)
            .to_string()
            .replace(FIELD_SEPARATOR, CODE_SEPARATOR);
        format!(
            "{INPUT_TAG}{sep}{}{sep}{time}{sep}{}",
            self.codes.to_wire(),
            self.sequence,
            sep = FIELD_SEPARATOR
        )
    }

    pub fn parse(line: &str) -> Result<Self, WireError> {
        let fields: Vec<&str> = line.trim().split(FIELD_SEPARATOR).collect();
        if fields.first() != Some(&INPUT_TAG) {
            return Err(WireError::MissingTag);
        }
        if fields.len() != 4 {
            return Err(WireError::FieldCount(fields.len()));
        }

        let codes = InputCodes::from_wire(fields[1])?;
        let local_time = fields[2]
            .replacen(CODE_SEPARATOR, FIELD_SEPARATOR, 1)
            .parse::<f64>()
            .map_err(|_| WireError::BadTime(fields[2].into()))?;
        let sequence = fields[3]
            .parse::<u32>()
            .map_err(|_| WireError::BadSequence(fields[3].into()))?;

        Ok(Self {
            codes,
            local_time,
            sequence,
        })
    }
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
    serde::Serialize,
    serde::Deserialize,
)]
#[rkyv(derive(Debug))]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
    serde::Serialize,
    serde::Deserialize,
)]
#[rkyv(derive(Debug))]
#[serde(rename_all = "camelCase")]
pub struct OwnPlayerState {
    pub position: [f32; 2],
    pub last_input_seq: Option<u32>,
}

impl OwnPlayerState {
    pub fn position(&self) -> Vec2 {
        Vec2::from(self.position)
    }
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
    serde::Serialize,
    serde::Deserialize,
)]
#[rkyv(derive(Debug))]
pub struct PlayerState {
    pub id: PlayerId,
    pub position: [f32; 2],
}

impl PlayerState {
    pub fn new(id: impl Into<String>, position: Vec2) -> Self {
        Self {
            id: PlayerId::new(id),
            position: position.into(),
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::from(self.position)
    }
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
    serde::Serialize,
    serde::Deserialize,
)]
#[rkyv(derive(Debug))]
#[serde(rename_all = "camelCase")]
pub struct BulletEvent {
    pub id: u32,
    pub fired_by: PlayerId,
    #[serde(default)]
    pub direction: [f32; 2],
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
    serde::Serialize,
    serde::Deserialize,
)]
#[rkyv(derive(Debug))]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    pub id: u32,
    pub name: String,
    pub fired_by: PlayerId,
}

/// One authoritative state report. Immutable once received.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
    serde::Serialize,
    serde::Deserialize,
)]
#[rkyv(derive(Debug))]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub server_time: f64,
    pub own_player: OwnPlayerState,
    pub players: Vec<PlayerState>,
    pub bullets: Vec<BulletEvent>,
    pub events: Vec<GameEvent>,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("server time is not finite: {0}")]
    NonFiniteServerTime(f64),
    #[error("position of {0} is not finite")]
    NonFinitePosition(String),
    #[error("player id is empty")]
    EmptyPlayerId,
    #[error("serialization failed: {0}")]
    Encode(rancor::Error),
    #[error("deserialization failed: {0}")]
    Decode(rancor::Error),
}

impl Snapshot {
    pub fn new(server_time: f64) -> Self {
        Self {
            server_time,
            own_player: OwnPlayerState::default(),
            players: Vec::new(),
            bullets: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn with_own_player(mut self, position: Vec2, last_input_seq: Option<u32>) -> Self {
        self.own_player = OwnPlayerState {
            position: position.into(),
            last_input_seq,
        };
        self
    }

    pub fn with_player(mut self, id: impl Into<String>, position: Vec2) -> Self {
        self.players.push(PlayerState::new(id, position));
        self
    }

    pub fn own_position(&self) -> Vec2 {
        self.own_player.position()
    }

    /// The last input sequence the server has processed for us. Zero counts as "none yet":
    /// sequences start at 1.
    pub fn acknowledged_sequence(&self) -> Option<u32> {
        self.own_player.last_input_seq.filter(|&seq| seq != 0)
    }

    pub fn player(&self, id: &PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn has_replays(&self) -> bool {
        !self.bullets.is_empty() || !self.events.is_empty()
    }

    pub fn validate(&self) -> Result<(), SnapshotError> {
        if !self.server_time.is_finite() {
            return Err(SnapshotError::NonFiniteServerTime(self.server_time));
        }
        if !self.own_position().is_finite() {
            return Err(SnapshotError::NonFinitePosition("own player".into()));
        }
        for player in &self.players {
            if player.id.as_str().is_empty() {
                return Err(SnapshotError::EmptyPlayerId);
            }
            if !player.position().is_finite() {
                return Err(SnapshotError::NonFinitePosition(player.id.to_string()));
            }
        }
        let firers = self
            .bullets
            .iter()
            .map(|b| &b.fired_by)
            .chain(self.events.iter().map(|e| &e.fired_by));
        for id in firers {
            if id.as_str().is_empty() {
                return Err(SnapshotError::EmptyPlayerId);
            }
        }
        Ok(())
    }

    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        rkyv::to_bytes::<rancor::Error>(self)
            .map(|aligned| aligned.into_vec())
            .map_err(SnapshotError::Encode)
    }

    pub fn decode(data: &[u8]) -> Result<Self, SnapshotError> {
        rkyv::from_bytes::<Self, rancor::Error>(data).map_err(SnapshotError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_message_encoding() {
        let message = InputMessage {
            codes: InputCodes::LEFT | InputCodes::UP,
            local_time: 12.345,
            sequence: 7,
        };

        assert_eq!(message.encode(), "i.up-left.12-345.7");
    }

    #[test]
    fn test_input_message_whole_seconds() {
        let message = InputMessage {
            codes: InputCodes::FIRE,
            local_time: 3.0,
            sequence: 1,
        };

        assert_eq!(message.encode(), "i.fire.3.1");
        assert_eq!(InputMessage::parse("i.fire.3.1").unwrap(), message);
    }

    #[test]
    fn test_input_message_parse() {
        let message = InputMessage::parse("i.down-right.0-5.42").unwrap();

        assert_eq!(message.codes, InputCodes::DOWN | InputCodes::RIGHT);
        assert!((message.local_time - 0.5).abs() < 1e-9);
        assert_eq!(message.sequence, 42);
    }

    #[test]
    fn test_input_message_rejects_garbage() {
        assert_eq!(InputMessage::parse("x.up.1.1"), Err(WireError::MissingTag));
        assert_eq!(InputMessage::parse("i.up.1"), Err(WireError::FieldCount(3)));
        assert_eq!(
            InputMessage::parse("i.jump.1.1"),
            Err(WireError::UnknownCode("jump".into()))
        );
        assert_eq!(
            InputMessage::parse("i.up.1.-3"),
            Err(WireError::BadSequence("-3".into()))
        );
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(InputCodes::from_wire_name("left"), Some(InputCodes::LEFT));
        assert_eq!(InputCodes::from_wire_name("LEFT"), None);
        assert_eq!(
            InputCodes::from_wire("fire-up"),
            Ok(InputCodes::UP | InputCodes::FIRE)
        );
    }

    #[test]
    fn test_direction_normalized() {
        let dir = (InputCodes::UP | InputCodes::RIGHT).direction();

        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!(dir.x > 0.0 && dir.y < 0.0);
        assert_eq!((InputCodes::LEFT | InputCodes::RIGHT).direction(), Vec2::ZERO);
    }

    #[test]
    fn test_zero_ack_is_none() {
        let snapshot = Snapshot::new(1.0).with_own_player(Vec2::ZERO, Some(0));
        assert_eq!(snapshot.acknowledged_sequence(), None);

        let snapshot = Snapshot::new(1.0).with_own_player(Vec2::ZERO, Some(3));
        assert_eq!(snapshot.acknowledged_sequence(), Some(3));
    }

    #[test]
    fn test_validate_rejects_malformed() {
        assert!(Snapshot::new(f64::NAN).validate().is_err());

        let bad_position = Snapshot::new(1.0).with_player("p2", Vec2::new(f32::INFINITY, 0.0));
        assert!(matches!(
            bad_position.validate(),
            Err(SnapshotError::NonFinitePosition(_))
        ));

        let empty_id = Snapshot::new(1.0).with_player("", Vec2::ZERO);
        assert!(matches!(empty_id.validate(), Err(SnapshotError::EmptyPlayerId)));

        assert!(Snapshot::new(1.0).with_player("p2", Vec2::ONE).validate().is_ok());
    }

    #[test]
    fn test_snapshot_serialization() {
        let mut snapshot = Snapshot::new(10.0)
            .with_own_player(Vec2::new(5.0, 5.0), Some(4))
            .with_player("p2", Vec2::new(1.0, 1.0));
        snapshot.bullets.push(BulletEvent {
            id: 1,
            fired_by: PlayerId::from("p2"),
            direction: [1.0, 0.0],
        });

        let bytes = snapshot.encode().unwrap();
        let decoded = Snapshot::decode(&bytes).unwrap();

        assert_eq!(decoded, snapshot);
    }
}
