//! Deterministic core
//!
//! Everything that decides what happens lives here. This module must stay pure:
//! - Seeded RNG only
//! - Time comes in as explicit `now_ms` timestamps
//! - Particles move in fixed steps
//! - No rendering or platform dependencies

pub mod field;
pub mod gate;
pub mod host;
pub mod puzzle;
pub mod theme;
pub mod timer;
pub mod victory;

pub use field::{FieldConfig, Link, MotionMode, Particle, ParticleField};
pub use gate::{
    BattleState, CompletionCallback, EnemyState, GateEvent, GateSession, Phase, ProjectileState,
};
pub use host::{ContentTreatment, GateHost};
pub use puzzle::{AuthMode, Challenge, MathOp, Verse, VERSES};
pub use theme::{Theme, ThemeCycle, THEMES};
pub use timer::{FrameClock, TimerId, TimerQueue};
pub use victory::{Entanglement, Ring, VictoryScene};
