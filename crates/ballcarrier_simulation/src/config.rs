//! Tunables: per-carrier `CarrierTuning` + session-wide `SimulationSettings`
//!
//! Оба типа serde-совместимы (`#[serde(default)]`), так что JSON может задавать
//! только часть полей. Перед использованием настройки валидируются.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ошибка валидации tunables
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuningError {
    #[error("`{field}` must be finite and non-negative (got {value})")]
    Negative { field: &'static str, value: f32 },

    #[error("`snap_lerp_strength` must be in (0, 1] (got {0})")]
    LerpStrengthOutOfRange(f32),

    #[error("`snap_epsilon` ({snap_epsilon}) must not be tighter than `aim_assist_threshold` ({threshold})")]
    SnapEpsilonTooTight { snap_epsilon: f32, threshold: f32 },

    #[error("`tick_hz` must be positive (got {0})")]
    TickRate(f64),
}

/// Ошибка загрузки настроек
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Invalid(#[from] TuningError),
}

/// Параметры carrier'а (cooldown, aim assist, blowback)
///
/// Углы в градусах, время в секундах.
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct CarrierTuning {
    /// Блокировка повторного подбора после drop
    pub cool_down_time: f32,
    /// Порог входа в snap-lock (и удержания относительно цели)
    pub aim_assist_threshold: f32,
    /// Доля lerp heading → цель за тик
    pub snap_lerp_strength: f32,
    /// Насколько input может уйти от input'а в момент lock'а
    pub snap_epsilon: f32,
    /// Debounce после срыва lock'а
    pub delay_between_snaps: f32,
    /// Скорость перемещения мяча по орбите (arc units/sec)
    pub ball_turn_speed: f32,
    /// Сдвиг точки прицеливания в ворота по +Y
    pub goal_aim_offset: f32,
    /// Орбита = multiplier × (half extent + радиус мяча)
    pub ball_offset_multiplier: f32,
    pub push_away_other_players: bool,
    pub blowback_radius: f32,
    pub blowback_force: f32,
    pub blowback_stun_time: f32,
    /// Заряженный чужой командой мяч оглушает вместо подбора
    pub charged_ball_stuns: bool,
    pub charged_stun_time: f32,
}

impl Default for CarrierTuning {
    fn default() -> Self {
        Self {
            cool_down_time: 0.1,
            aim_assist_threshold: 7.5,
            snap_lerp_strength: 0.5,
            snap_epsilon: 20.0,
            delay_between_snaps: 0.2,
            ball_turn_speed: 10.0,
            goal_aim_offset: 1.0,
            ball_offset_multiplier: 1.07,
            push_away_other_players: true,
            blowback_radius: 9.0,
            blowback_force: 30.0,
            blowback_stun_time: 0.1,
            charged_ball_stuns: false,
            charged_stun_time: 0.5,
        }
    }
}

impl CarrierTuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        let non_negative = [
            ("cool_down_time", self.cool_down_time),
            ("aim_assist_threshold", self.aim_assist_threshold),
            ("snap_epsilon", self.snap_epsilon),
            ("delay_between_snaps", self.delay_between_snaps),
            ("ball_turn_speed", self.ball_turn_speed),
            ("goal_aim_offset", self.goal_aim_offset),
            ("ball_offset_multiplier", self.ball_offset_multiplier),
            ("blowback_radius", self.blowback_radius),
            ("blowback_force", self.blowback_force),
            ("blowback_stun_time", self.blowback_stun_time),
            ("charged_stun_time", self.charged_stun_time),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(TuningError::Negative { field, value });
            }
        }

        if !(self.snap_lerp_strength > 0.0 && self.snap_lerp_strength <= 1.0) {
            return Err(TuningError::LerpStrengthOutOfRange(self.snap_lerp_strength));
        }

        // Гистерезис: выход из lock'а должен быть шире входа
        if self.snap_epsilon < self.aim_assist_threshold {
            return Err(TuningError::SnapEpsilonTooTight {
                snap_epsilon: self.snap_epsilon,
                threshold: self.aim_assist_threshold,
            });
        }

        Ok(())
    }
}

/// Настройки сессии (tick rate, seed, tuning по умолчанию для carrier'ов)
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Частота FixedUpdate
    pub tick_hz: f64,
    pub seed: u64,
    pub carrier: CarrierTuning,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            seed: 42,
            carrier: CarrierTuning::default(),
        }
    }
}

impl SimulationSettings {
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.tick_hz.is_finite() && self.tick_hz > 0.0) {
            return Err(TuningError::TickRate(self.tick_hz));
        }
        self.carrier.validate()
    }

    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
