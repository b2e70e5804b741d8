//! Device orientation → camera rotation
//!
//! Host пушит readings (alpha/beta/gamma + screen orientation, градусы).
//! Controller создаётся один раз; повторная настройка только переключает
//! input element (disconnect → set element → connect).

use bevy::prelude::*;
use std::f32::consts::FRAC_1_SQRT_2;

use vrscene_sync::log;

/// Откуда controller берёт manual input (touch drag)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputElement {
    /// Canvas renderer'а - manual control включён
    Canvas,
    /// Отсоединённый элемент - manual input никуда не приходит
    #[default]
    Detached,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeviceOrientationReading {
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
    pub screen_orientation: f32,
}

#[derive(Resource, Debug, Clone)]
pub struct DeviceOrientationController {
    pub camera: Entity,
    element: InputElement,
    connected: bool,
    reading: Option<DeviceOrientationReading>,
}

impl DeviceOrientationController {
    pub fn new(camera: Entity, element: InputElement) -> Self {
        Self {
            camera,
            element,
            connected: false,
            reading: None,
        }
    }

    pub fn connect(&mut self) {
        self.connected = true;
    }

    /// Отключение сбрасывает последний reading (камера остаётся как есть)
    pub fn disconnect(&mut self) {
        self.connected = false;
        self.reading = None;
    }

    pub fn set_element(&mut self, element: InputElement) {
        if self.element != element {
            log(&format!("Device orientation input: {:?} → {:?}", self.element, element));
        }
        self.element = element;
    }

    pub fn element(&self) -> InputElement {
        self.element
    }

    pub fn manual_control(&self) -> bool {
        self.element == InputElement::Canvas
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Reading принимается только когда connected; возвращает принят ли
    pub fn push_reading(&mut self, reading: DeviceOrientationReading) -> bool {
        if !self.connected {
            return false;
        }
        self.reading = Some(reading);
        true
    }

    pub fn reading(&self) -> Option<DeviceOrientationReading> {
        self.reading
    }
}

/// Euler(YXZ: alpha, beta, -gamma) · q(-π/2 по X) · q(-screen по Z)
///
/// Камера смотрит из задней части устройства, а не сверху.
pub fn orientation_quat(reading: &DeviceOrientationReading) -> Quat {
    let alpha = reading.alpha.to_radians();
    let beta = reading.beta.to_radians();
    let gamma = reading.gamma.to_radians();
    let screen = reading.screen_orientation.to_radians();

    let device = Quat::from_euler(EulerRot::YXZ, alpha, beta, -gamma);
    let back_camera = Quat::from_xyzw(-FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
    let screen_adjust = Quat::from_axis_angle(Vec3::Z, -screen);

    (device * back_camera * screen_adjust).normalize()
}

pub fn update_device_orientation(
    controller: Option<Res<DeviceOrientationController>>,
    mut transforms: Query<&mut Transform>,
) {
    let Some(controller) = controller else {
        return;
    };
    if !controller.is_connected() {
        return;
    }
    let Some(reading) = controller.reading() else {
        return;
    };

    if let Ok(mut transform) = transforms.get_mut(controller.camera) {
        transform.rotation = orientation_quat(&reading);
    }
}
