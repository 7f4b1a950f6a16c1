//! Room Routes
//!
//! Maps a room URL onto the session it opens:
//!
//! | Path                  | User type | Overlays |
//! |-----------------------|-----------|----------|
//! | `/room/<name>/doctor` | doctor    | yes      |
//! | `/room/<name>`        | student   | no       |
//!
//! Anything else is not a room. Bare paths (`/room/abc?access-token=…`) are
//! accepted as well as full URLs.

use std::fmt;

use reqwest::Url;

use crate::session::UserType;

const PATH_BASE: &str = "http://localhost/";

/// A parsed room URL
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomRoute {
    /// Room name from the path
    pub room_name: String,
    /// Which side of the call the route is for
    pub user_type: UserType,
    /// The full URL (query string kept for token lookup)
    pub url: Url,
}

impl RoomRoute {
    /// Parse a room URL or path
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let url = Url::parse(input)
            .or_else(|_| Url::parse(PATH_BASE).and_then(|base| base.join(input)))
            .ok()?;

        let segments: Vec<&str> = url
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .collect();

        let (room_name, user_type) = match segments.as_slice() {
            ["room", name] => (*name, UserType::Student),
            ["room", name, "doctor"] => (*name, UserType::Doctor),
            _ => return None,
        };

        Some(Self {
            room_name: room_name.to_string(),
            user_type,
            url,
        })
    }

    /// Whether this session mounts the overlay stack
    ///
    /// Only the doctor side records treatments, so only it gets overlays.
    #[must_use]
    pub fn has_overlays(&self) -> bool {
        self.user_type == UserType::Doctor
    }
}

impl fmt::Display for RoomRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.room_name, self.user_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doctor_route() {
        let route = RoomRoute::parse("https://room.clinic.test/room/consult-7/doctor").unwrap();
        assert_eq!(route.room_name, "consult-7");
        assert_eq!(route.user_type, UserType::Doctor);
        assert!(route.has_overlays());
    }

    #[test]
    fn test_student_route_keeps_query() {
        let route = RoomRoute::parse("/room/consult-7?access-token=abc").unwrap();
        assert_eq!(route.user_type, UserType::Student);
        assert!(!route.has_overlays());
        assert_eq!(route.url.query(), Some("access-token=abc"));
    }

    #[test]
    fn test_trailing_slash() {
        let route = RoomRoute::parse("/room/consult-7/doctor/").unwrap();
        assert_eq!(route.user_type, UserType::Doctor);
    }

    #[test]
    fn test_non_room_paths() {
        assert!(RoomRoute::parse("/login").is_none());
        assert!(RoomRoute::parse("/room").is_none());
        assert!(RoomRoute::parse("/room/a/patient").is_none());
        assert!(RoomRoute::parse("/room/a/doctor/extra").is_none());
    }
}
