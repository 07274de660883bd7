//! Aim assist: snap-lock state machine с гистерезисом
//!
//! Free → Locked(target, lock_start_input) когда heading смотрит на цель точнее
//! `aim_assist_threshold`. Выход из lock'а шире входа (`snap_epsilon`) и
//! сопровождается debounce `delay_between_snaps`, чтобы heading не дрожал
//! между двумя кандидатами.

use bevy::prelude::*;

use crate::config::CarrierTuning;

/// Остаток debounce меньше этого считается истёкшим (накопление f32 по тикам)
const DELAY_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum AimTarget {
    Goal,
    Teammate,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum AimState {
    #[default]
    Free,
    Locked {
        target: AimTarget,
        /// Raw input в момент захвата
        lock_start_input: Vec2,
    },
}

/// Входы одного тика
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimInputs {
    pub heading: Vec2,
    /// Raw steering input (нулевой = игрок отпустил стик)
    pub input: Vec2,
    pub goal_direction: Option<Vec2>,
    pub teammate_direction: Option<Vec2>,
    /// Мяч готов к удару по воротам (заряжен для команды carrier'а)
    pub goal_eligible: bool,
    pub delta: f32,
}

impl AimInputs {
    fn direction_to(&self, target: AimTarget) -> Option<Vec2> {
        match target {
            AimTarget::Goal => self.goal_direction,
            AimTarget::Teammate => self.teammate_direction,
        }
    }
}

/// Что делать с heading в этом тике
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AimOutput {
    /// Поворот по raw input (делегируется movement)
    Raw,
    /// Новый heading (уже интерполированный)
    Steer(Vec2),
}

/// Aim assist engine (по одному на carrier)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct AimAssist {
    state: AimState,
    snap_delay: f32,
}

impl AimAssist {
    pub fn state(&self) -> AimState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.state, AimState::Locked { .. })
    }

    pub fn locked_target(&self) -> Option<AimTarget> {
        match self.state {
            AimState::Locked { target, .. } => Some(target),
            AimState::Free => None,
        }
    }

    /// Остаток debounce (0 = можно захватывать)
    pub fn snap_delay_remaining(&self) -> f32 {
        self.snap_delay
    }

    pub fn reset(&mut self) {
        self.state = AimState::Free;
        self.snap_delay = 0.0;
    }

    /// Один fixed tick
    pub fn tick(&mut self, inputs: &AimInputs, tuning: &CarrierTuning) -> AimOutput {
        match self.state {
            AimState::Locked { target, lock_start_input } => {
                self.tick_locked(target, lock_start_input, inputs, tuning)
            }
            AimState::Free => self.tick_free(inputs, tuning),
        }
    }

    fn tick_locked(
        &mut self,
        target: AimTarget,
        lock_start_input: Vec2,
        inputs: &AimInputs,
        tuning: &CarrierTuning,
    ) -> AimOutput {
        let direction = match inputs.direction_to(target) {
            Some(direction)
                if !is_zero(inputs.input)
                    && angle_between_deg(direction, inputs.input) < tuning.aim_assist_threshold
                    && angle_between_deg(lock_start_input, inputs.input) < tuning.snap_epsilon =>
            {
                direction
            }
            // Игрок отпустил стик, увёл его от цели или цель пропала
            _ => {
                self.state = AimState::Free;
                self.snap_delay = tuning.delay_between_snaps;
                return AimOutput::Raw;
            }
        };

        AimOutput::Steer(lerp_heading(inputs.heading, direction, tuning.snap_lerp_strength))
    }

    fn tick_free(&mut self, inputs: &AimInputs, tuning: &CarrierTuning) -> AimOutput {
        if self.snap_delay > 0.0 {
            self.snap_delay -= inputs.delta;
            if self.snap_delay > DELAY_EPSILON {
                return AimOutput::Raw;
            }
            self.snap_delay = 0.0;
        }

        if is_zero(inputs.input) {
            return AimOutput::Raw;
        }

        let within = |direction: Option<Vec2>| {
            direction.filter(|direction| {
                angle_between_deg(inputs.heading, *direction) < tuning.aim_assist_threshold
            })
        };

        // Приоритет: ворота, затем партнёр
        let goal = within(inputs.goal_direction).filter(|_| inputs.goal_eligible);
        let (target, direction) = match (goal, within(inputs.teammate_direction)) {
            (Some(direction), _) => (AimTarget::Goal, direction),
            (None, Some(direction)) => (AimTarget::Teammate, direction),
            (None, None) => return AimOutput::Raw,
        };

        self.state = AimState::Locked {
            target,
            lock_start_input: inputs.input,
        };

        AimOutput::Steer(lerp_heading(inputs.heading, direction, tuning.snap_lerp_strength))
    }
}

/// Угол между векторами в градусах, [0, 180]
pub fn angle_between_deg(a: Vec2, b: Vec2) -> f32 {
    if is_zero(a) || is_zero(b) {
        return 180.0;
    }
    a.angle_to(b).abs().to_degrees()
}

/// Линейный lerp heading → direction (результат нормализован)
pub fn lerp_heading(heading: Vec2, direction: Vec2, strength: f32) -> Vec2 {
    let lerped = heading.lerp(direction, strength);
    if is_zero(lerped) {
        // Противоположные векторы при strength 0.5
        direction.normalize_or_zero()
    } else {
        lerped.normalize()
    }
}

fn is_zero(vector: Vec2) -> bool {
    vector.length_squared() <= f32::EPSILON
}
