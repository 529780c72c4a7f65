//! In-memory room graph
//!
//! Stands in for the environment's generator. The demo facility mirrors the
//! usual zone split: one surface volume plus a handful of light, heavy and
//! entrance zone rooms, some of them rotated.

use glam::Vec3;
use super::{Room, RoomGraph, RoomId, RoomType};

/// A room graph held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct FacilityLayout {
    rooms: Vec<Room>,
    ready: bool,
}

impl FacilityLayout {
    /// Create an empty layout that is not ready yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ready layout from a list of rooms
    pub fn from_rooms(rooms: Vec<Room>) -> Self {
        Self { rooms, ready: true }
    }

    /// Add a room, assigning it the next id. Returns the id.
    pub fn add_room(&mut self, mut room: Room) -> RoomId {
        let id = self.rooms.len();
        room.id = id;
        self.rooms.push(room);
        id
    }

    /// Mark the graph as fully assembled (or not)
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// A small facility used by the binary and tests
    pub fn demo() -> Self {
        let mut layout = Self::new();
        layout.add_room(
            Room::new(0, RoomType::Surface, Vec3::new(0.0, 1000.0, 0.0))
                .with_half_extents(Vec3::new(200.0, 50.0, 200.0)),
        );
        layout.add_room(Room::new(0, RoomType::LczClassDSpawn, Vec3::new(0.0, 0.0, 0.0)));
        layout.add_room(Room::new(0, RoomType::LczArmory, Vec3::new(30.0, 0.0, 0.0)).with_yaw(90.0));
        layout.add_room(Room::new(0, RoomType::LczCafe, Vec3::new(60.0, 0.0, 0.0)).with_yaw(180.0));
        layout.add_room(Room::new(0, RoomType::LczToilets, Vec3::new(90.0, 0.0, 0.0)));
        layout.add_room(Room::new(0, RoomType::HczArmory, Vec3::new(0.0, -200.0, 40.0)).with_yaw(270.0));
        layout.add_room(Room::new(0, RoomType::HczServers, Vec3::new(30.0, -200.0, 40.0)));
        layout.add_room(Room::new(0, RoomType::HczNuke, Vec3::new(60.0, -200.0, 40.0)).with_yaw(90.0));
        layout.add_room(Room::new(0, RoomType::EzGateA, Vec3::new(0.0, 0.0, 120.0)));
        layout.add_room(Room::new(0, RoomType::EzIntercom, Vec3::new(30.0, 0.0, 120.0)).with_yaw(180.0));
        layout.add_room(Room::new(0, RoomType::EzPcs, Vec3::new(60.0, 0.0, 120.0)));
        layout.add_room(Room::new(0, RoomType::EzPcs, Vec3::new(90.0, 0.0, 120.0)).with_yaw(90.0));
        layout.set_ready(true);
        layout
    }
}

impl RoomGraph for FacilityLayout {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn rooms(&self) -> &[Room] {
        &self.rooms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_room_assigns_ids() {
        let mut layout = FacilityLayout::new();
        let a = layout.add_room(Room::new(99, RoomType::LczCafe, Vec3::ZERO));
        let b = layout.add_room(Room::new(99, RoomType::LczCafe, Vec3::X * 30.0));
        assert_eq!((a, b), (0, 1));
        assert_eq!(layout.room(b).unwrap().position.x, 30.0);
        assert!(!layout.is_ready());
    }

    #[test]
    fn test_demo_has_duplicate_room_types() {
        let layout = FacilityLayout::demo();
        assert!(layout.is_ready());
        assert_eq!(layout.rooms_of_type(RoomType::EzPcs).len(), 2);
        assert_eq!(layout.rooms_of_type(RoomType::Surface).len(), 1);
        assert!(layout.rooms_of_type(RoomType::HczTesla).is_empty());
    }
}
