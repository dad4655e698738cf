//! Core protocol types for Roshambo's wire format.
//!
//! Every type here either travels on the wire (moves, slots, scores and
//! the two message enums) or names something the wire refers to (room
//! codes in the connection path, room instance ids in logs).
//!
//! The JSON shapes are fixed by the browser client, so most of the serde
//! attributes below exist to reproduce an exact field name or encoding.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Maximum length of a room code, in characters.
pub const MAX_ROOM_CODE_LEN: usize = 32;

/// The shared code two players use to meet in the same room.
///
/// A newtype over `String` so a code can't be confused with any other
/// piece of text, and so every `RoomCode` in the system has been
/// validated: 1–32 characters, none of them `/` or a control character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Validates and wraps an already decoded code.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] if the code is empty,
    /// too long, or contains `/` or a control character.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        if raw.is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "room code is empty".into(),
            ));
        }
        if raw.chars().count() > MAX_ROOM_CODE_LEN {
            return Err(ProtocolError::InvalidMessage(format!(
                "room code longer than {MAX_ROOM_CODE_LEN} characters"
            )));
        }
        if raw.chars().any(|c| c == '/' || c.is_control()) {
            return Err(ProtocolError::InvalidMessage(format!(
                "room code {raw:?} contains invalid characters"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    /// Extracts the code from a connection path such as `/ws/4821`.
    ///
    /// `prefix` is the route the code is mounted under (`/ws/`). The code
    /// must be a single path segment; a trailing slash after it is
    /// tolerated. Percent escapes are decoded, so `/ws/a%20b` is the code
    /// `a b`.
    pub fn from_path(path: &str, prefix: &str) -> Result<Self, ProtocolError> {
        let rest = path.strip_prefix(prefix).ok_or_else(|| {
            ProtocolError::InvalidMessage(format!(
                "path {path:?} is not under {prefix:?}"
            ))
        })?;
        let segment = rest.strip_suffix('/').unwrap_or(rest);
        let decoded =
            percent_decode_str(segment).decode_utf8().map_err(|_| {
                ProtocolError::InvalidMessage(format!(
                    "room code {segment:?} is not valid UTF-8"
                ))
            })?;
        Self::parse(&decoded)
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

/// Identifies one room *instance*.
///
/// Codes are reused: once a match under code `4821` ends, the next join
/// with `4821` gets a brand new room. The `RoomId` tells those apart, so
/// a room shutting down can never evict its successor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

/// A participant's fixed seat in a room.
///
/// Slots are handed out in join order (first joiner gets `Zero`) and
/// never change. On the wire a slot is the integer `0` or `1`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum Slot {
    Zero,
    One,
}

impl Slot {
    /// Both slots, in join order.
    pub const ALL: [Slot; 2] = [Slot::Zero, Slot::One];

    /// The array index for this slot.
    pub fn index(self) -> usize {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }

    /// The other participant's slot.
    pub fn opponent(self) -> Self {
        match self {
            Self::Zero => Self::One,
            Self::One => Self::Zero,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> Self {
        slot.index() as u8
    }
}

impl TryFrom<u8> for Slot {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Zero),
            1 => Ok(Self::One),
            other => Err(ProtocolError::InvalidMessage(format!(
                "slot must be 0 or 1, got {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Game values
// ---------------------------------------------------------------------------

/// One of the three legal throws.
///
/// The wire uses single letters: `"r"`, `"p"`, `"s"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum Move {
    #[serde(rename = "r")]
    Rock,
    #[serde(rename = "p")]
    Paper,
    #[serde(rename = "s")]
    Scissors,
}

impl Move {
    /// All three moves.
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// Returns `true` if `self` defeats `other`.
    ///
    /// Rock beats scissors, scissors beats paper, paper beats rock.
    pub fn beats(self, other: Move) -> bool {
        matches!(
            (self, other),
            (Self::Rock, Self::Scissors)
                | (Self::Scissors, Self::Paper)
                | (Self::Paper, Self::Rock)
        )
    }

    /// The wire symbol for this move.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Rock => "r",
            Self::Paper => "p",
            Self::Scissors => "s",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Move {
    type Err = ProtocolError;

    /// Accepts exactly `"r"`, `"p"` or `"s"`. Nothing else is coerced.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" => Ok(Self::Rock),
            "p" => Ok(Self::Paper),
            "s" => Ok(Self::Scissors),
            other => Err(ProtocolError::InvalidMessage(format!(
                "unknown move {other:?}"
            ))),
        }
    }
}

/// Per-slot win counts.
///
/// A fixed pair rather than a map, so there's no `"0"` vs `0` key
/// ambiguity in Rust code. The JSON form the client reads is still
/// `{"0": 2, "1": 1}`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct Scores {
    #[serde(rename = "0")]
    zero: u32,
    #[serde(rename = "1")]
    one: u32,
}

impl Scores {
    /// Builds a score pair from slot 0's and slot 1's counts.
    pub fn new(zero: u32, one: u32) -> Self {
        Self { zero, one }
    }
}

impl Index<Slot> for Scores {
    type Output = u32;

    fn index(&self, slot: Slot) -> &u32 {
        match slot {
            Slot::Zero => &self.zero,
            Slot::One => &self.one,
        }
    }
}

impl IndexMut<Slot> for Scores {
    fn index_mut(&mut self, slot: Slot) -> &mut u32 {
        match slot {
            Slot::Zero => &mut self.zero,
            Slot::One => &mut self.one,
        }
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Client → Server.
///
/// Internally tagged on `action`, so a move looks like
/// `{"action": "move", "move": "r"}`. The move stays a raw string here:
/// rejecting an illegal symbol is the room's job, and it reports it as
/// its own error rather than as a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    Move {
        #[serde(rename = "move")]
        choice: String,
    },
}

/// Server → Client.
///
/// `{"action": "game_started", ...}`, `{"action": "result", ...}` and
/// `{"action": "game_over", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent to both participants once the second one joins. The client
    /// expects `player_id` as a string (`"0"` / `"1"`).
    GameStarted {
        message: String,
        #[serde(with = "slot_as_string")]
        player_id: Slot,
    },

    /// One round resolved. `opponent_move` is relative to the recipient.
    Result {
        winner: Option<Slot>,
        scores: Scores,
        opponent_move: Move,
    },

    /// The match is over; sent instead of `Result` for the final round.
    GameOver { winner: Slot },
}

/// Text of the `game_started` notice.
pub const GAME_STARTED_TEXT: &str = "Game has started! Please make your move.";

/// Plain-text notice sent before closing a connection to a full room.
pub const ROOM_FULL_TEXT: &str = "Game room is full.";

/// Plain-text notice sent before closing a connection with a bad code.
pub const INVALID_CODE_TEXT: &str = "Invalid game code.";

impl ServerMessage {
    /// The `game_started` notice for `slot`.
    pub fn game_started(slot: Slot) -> Self {
        Self::GameStarted {
            message: GAME_STARTED_TEXT.to_string(),
            player_id: slot,
        }
    }
}

mod slot_as_string {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::Slot;

    pub fn serialize<S: Serializer>(
        slot: &Slot,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(slot)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Slot, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "0" => Ok(Slot::Zero),
            "1" => Ok(Slot::One),
            other => Err(D::Error::custom(format!(
                "player_id must be \"0\" or \"1\", got {other:?}"
            ))),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser client parses these exact JSON shapes, so the tests
    //! pin field names and encodings rather than just round-tripping.

    use super::*;

    // =====================================================================
    // RoomCode
    // =====================================================================

    #[test]
    fn test_room_code_accepts_any_segment_text() {
        assert_eq!(RoomCode::parse("4821").unwrap().as_str(), "4821");
        assert!(RoomCode::parse("friday-night_1").is_ok());
        assert!(RoomCode::parse("a b").is_ok());
        assert!(RoomCode::parse("caf\u{e9}.2").is_ok());
        assert!(RoomCode::parse(&"\u{e9}".repeat(MAX_ROOM_CODE_LEN)).is_ok());
    }

    #[test]
    fn test_room_code_rejects_empty_long_and_odd_characters() {
        assert!(RoomCode::parse("").is_err());
        assert!(RoomCode::parse(&"a".repeat(MAX_ROOM_CODE_LEN + 1)).is_err());
        assert!(RoomCode::parse("../etc").is_err());
        assert!(RoomCode::parse("tab\there").is_err());
    }

    #[test]
    fn test_room_code_from_path() {
        let code = RoomCode::from_path("/ws/4821", "/ws/").unwrap();
        assert_eq!(code.as_str(), "4821");

        let code = RoomCode::from_path("/ws/4821/", "/ws/").unwrap();
        assert_eq!(code.as_str(), "4821");

        assert!(RoomCode::from_path("/ws/", "/ws/").is_err());
        assert!(RoomCode::from_path("/other/4821", "/ws/").is_err());
        assert!(RoomCode::from_path("/ws/48/21", "/ws/").is_err());
    }

    #[test]
    fn test_room_code_from_path_decodes_percent_escapes() {
        let code = RoomCode::from_path("/ws/a%20b", "/ws/").unwrap();
        assert_eq!(code.as_str(), "a b");

        let code = RoomCode::from_path("/ws/caf%C3%A9", "/ws/").unwrap();
        assert_eq!(code.as_str(), "caf\u{e9}");

        // An escaped slash still can't split the code.
        assert!(RoomCode::from_path("/ws/48%2F21", "/ws/").is_err());
        assert!(RoomCode::from_path("/ws/%FF", "/ws/").is_err());
        assert!(RoomCode::from_path("/ws/%00", "/ws/").is_err());
    }

    #[test]
    fn test_room_id_display() {
        assert_eq!(RoomId(3).to_string(), "R-3");
    }

    // =====================================================================
    // Slot
    // =====================================================================

    #[test]
    fn test_slot_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Slot::Zero).unwrap(), "0");
        assert_eq!(serde_json::to_string(&Slot::One).unwrap(), "1");
        assert_eq!(serde_json::from_str::<Slot>("1").unwrap(), Slot::One);
        assert!(serde_json::from_str::<Slot>("2").is_err());
    }

    #[test]
    fn test_slot_opponent_is_an_involution() {
        for slot in Slot::ALL {
            assert_ne!(slot.opponent(), slot);
            assert_eq!(slot.opponent().opponent(), slot);
        }
    }

    // =====================================================================
    // Move
    // =====================================================================

    #[test]
    fn test_move_parses_only_the_three_symbols() {
        assert_eq!("r".parse::<Move>().unwrap(), Move::Rock);
        assert_eq!("p".parse::<Move>().unwrap(), Move::Paper);
        assert_eq!("s".parse::<Move>().unwrap(), Move::Scissors);

        for bad in ["", "R", "rock", "x", " r"] {
            assert!(bad.parse::<Move>().is_err(), "{bad:?} must be rejected");
        }
    }

    #[test]
    fn test_move_serializes_as_symbol() {
        for m in Move::ALL {
            let json = serde_json::to_string(&m).unwrap();
            assert_eq!(json, format!("\"{}\"", m.symbol()));
        }
    }

    #[test]
    fn test_move_beats_is_cyclic() {
        assert!(Move::Rock.beats(Move::Scissors));
        assert!(Move::Scissors.beats(Move::Paper));
        assert!(Move::Paper.beats(Move::Rock));
        for m in Move::ALL {
            assert!(!m.beats(m));
        }
    }

    // =====================================================================
    // Scores
    // =====================================================================

    #[test]
    fn test_scores_json_uses_string_slot_keys() {
        let json = serde_json::to_value(Scores::new(2, 1)).unwrap();
        assert_eq!(json, serde_json::json!({"0": 2, "1": 1}));
    }

    #[test]
    fn test_scores_index_by_slot() {
        let mut scores = Scores::default();
        scores[Slot::One] += 1;
        assert_eq!(scores[Slot::Zero], 0);
        assert_eq!(scores[Slot::One], 1);
    }

    // =====================================================================
    // Messages
    // =====================================================================

    #[test]
    fn test_client_move_decodes_from_browser_shape() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"action":"move","move":"p"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Move { choice: "p".into() });
    }

    #[test]
    fn test_client_unknown_action_fails_to_decode() {
        let result = serde_json::from_str::<ClientMessage>(
            r#"{"action":"dance","move":"p"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_game_started_json_format() {
        let json = serde_json::to_value(ServerMessage::game_started(Slot::One))
            .unwrap();
        assert_eq!(json["action"], "game_started");
        assert_eq!(json["message"], GAME_STARTED_TEXT);
        // player_id is a string, unlike every other slot on the wire.
        assert_eq!(json["player_id"], "1");
    }

    #[test]
    fn test_result_json_format() {
        let msg = ServerMessage::Result {
            winner: Some(Slot::Zero),
            scores: Scores::new(1, 0),
            opponent_move: Move::Scissors,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "action": "result",
                "winner": 0,
                "scores": {"0": 1, "1": 0},
                "opponent_move": "s",
            })
        );
    }

    #[test]
    fn test_result_tie_has_null_winner() {
        let msg = ServerMessage::Result {
            winner: None,
            scores: Scores::default(),
            opponent_move: Move::Rock,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json["winner"].is_null());
    }

    #[test]
    fn test_game_over_json_format() {
        let json =
            serde_json::to_value(ServerMessage::GameOver { winner: Slot::One })
                .unwrap();
        assert_eq!(json, serde_json::json!({"action": "game_over", "winner": 1}));
    }

    #[test]
    fn test_server_message_decodes_back() {
        let raw = r#"{"action":"game_started","message":"hi","player_id":"0"}"#;
        let msg: ServerMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(
            msg,
            ServerMessage::GameStarted {
                message: "hi".into(),
                player_id: Slot::Zero,
            }
        );
    }
}
