//! Broadcast room names for the notification gateway.
//!
//! A room is a named group of WebSocket connections. The wire names are
//! fixed: `user:<id>`, `org:<id>`, `project:<id>`, and `test-run:<id>`.

use std::fmt;
use std::str::FromStr;

use crate::types::DbId;

const USER_PREFIX: &str = "user";
const ORG_PREFIX: &str = "org";
const PROJECT_PREFIX: &str = "project";
const TEST_RUN_PREFIX: &str = "test-run";

/// A typed room identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    User(DbId),
    Organization(DbId),
    Project(DbId),
    TestRun(DbId),
}

impl Room {
    /// The scoping id carried by the room.
    pub fn id(&self) -> DbId {
        match self {
            Room::User(id) | Room::Organization(id) | Room::Project(id) | Room::TestRun(id) => {
                *id
            }
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Room::User(_) => USER_PREFIX,
            Room::Organization(_) => ORG_PREFIX,
            Room::Project(_) => PROJECT_PREFIX,
            Room::TestRun(_) => TEST_RUN_PREFIX,
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix(), self.id())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RoomParseError {
    #[error("room name is missing a ':' separator")]
    MissingSeparator,
    #[error("unknown room kind '{0}'")]
    UnknownKind(String),
    #[error("invalid room id '{0}'")]
    InvalidId(String),
}

impl FromStr for Room {
    type Err = RoomParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, raw_id) = s.split_once(':').ok_or(RoomParseError::MissingSeparator)?;
        let id: DbId = raw_id
            .parse()
            .map_err(|_| RoomParseError::InvalidId(raw_id.to_string()))?;
        match kind {
            USER_PREFIX => Ok(Room::User(id)),
            ORG_PREFIX => Ok(Room::Organization(id)),
            PROJECT_PREFIX => Ok(Room::Project(id)),
            TEST_RUN_PREFIX => Ok(Room::TestRun(id)),
            other => Err(RoomParseError::UnknownKind(other.to_string())),
        }
    }
}
