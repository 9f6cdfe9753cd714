use js_sys::Promise;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::error::LocationError;
use crate::workout::Coordinates;

mod geolocation {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        /// The value `getCurrentPosition` hands to its success callback.
        pub type Position;

        #[wasm_bindgen(method, getter)]
        pub fn coords(this: &Position) -> Coords;

        pub type Coords;

        #[wasm_bindgen(method, getter)]
        pub fn latitude(this: &Coords) -> f64;

        #[wasm_bindgen(method, getter)]
        pub fn longitude(this: &Coords) -> f64;
    }
}

/// Source of the device's current position. Single shot, no updates.
#[allow(async_fn_in_trait)]
pub trait Locator {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// `navigator.geolocation.getCurrentPosition`, wrapped in a future.
pub struct BrowserLocator;

impl Locator for BrowserLocator {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        let geolocation = web_sys::window()
            .ok_or(LocationError::Unsupported)?
            .navigator()
            .geolocation()
            .map_err(|_| LocationError::Unsupported)?;

        let promise = Promise::new(&mut |resolve, reject| {
            if let Err(e) =
                geolocation.get_current_position_with_error_callback(&resolve, Some(&reject))
            {
                let _ = reject.call1(&JsValue::NULL, &e);
            }
        });

        let value = JsFuture::from(promise)
            .await
            .map_err(|e| LocationError::Denied(describe(&e)))?;
        if !value.is_object() {
            return Err(LocationError::Denied("unexpected position value".to_string()));
        }

        let coords = value.unchecked_into::<geolocation::Position>().coords();
        position_at(coords.latitude(), coords.longitude())
    }
}

/// A reported position, rejected when either angle is missing or not finite.
fn position_at(latitude: f64, longitude: f64) -> Result<Coordinates, LocationError> {
    if latitude.is_finite() && longitude.is_finite() {
        Ok(Coordinates::new(latitude, longitude))
    } else {
        Err(LocationError::Denied(format!(
            "position unavailable ({}, {})",
            latitude, longitude
        )))
    }
}

/// `GeolocationPositionError` carries its text in `message`.
fn describe(err: &JsValue) -> String {
    js_sys::Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| "permission denied or position unavailable".to_string())
}
