//! Physics коллаборатор
//!
//! Симуляция не владеет физикой: она получает `ContactEvent` и использует
//! area query `overlap_circle`. Источники контактов:
//! - `ProximityContactsPlugin`: headless, по расстоянию между центрами
//! - `RapierContactsPlugin`: мост из `bevy_rapier2d::CollisionEvent`

pub mod contacts;
pub mod overlap;

// Re-export основных типов
pub use contacts::{
    ActiveContacts, ContactEvent, ContactKind, ProximityContactsPlugin, RapierContactsPlugin,
};
pub use overlap::overlap_circle;
