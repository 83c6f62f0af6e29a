//! Per-tick notifications for audio, effects and logging.
//!
//! The simulation only reports what happened; it never calls out. Consumers are
//! free to ignore any flag.

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FrameEvents: u16 {
        const JUMP          = 1 << 0;
        const WALL_JUMP     = 1 << 1;
        const LANDED        = 1 << 2;
        const HARD_LANDING  = 1 << 3;
        const LEDGE_GRAB    = 1 << 4;
        const STOMP         = 1 << 5;
        const HURT          = 1 << 6;
        const DIED          = 1 << 7;
        const DEATH_DONE    = 1 << 8;
        const VICTORY       = 1 << 9;
        const SPAWNED       = 1 << 10;
        const SPAWN_BLOCKED = 1 << 11;
    }
}
