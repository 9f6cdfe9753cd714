//! The tile map: a [`MapView`] seam plus its Leaflet implementation.

use serde::Serialize;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::config::{PopupConfig, TrackerConfig};
use crate::error::MapError;
use crate::workout::{Coordinates, Workout};

/// What the tracker needs from a map once it exists.
pub trait MapView {
    /// Call `handler` with the clicked position on every map click.
    fn on_click(&self, handler: Box<dyn FnMut(Coordinates)>);
    fn add_marker(&self, at: Coordinates, popup: &MarkerPopup);
    fn pan_to(&self, at: Coordinates, zoom: u8);
}

/// Popup attached to a workout marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPopup {
    pub content: String,
    /// CSS class, `running-popup` or `cycling-popup`.
    pub class_name: String,
}

impl MarkerPopup {
    pub fn for_workout(workout: &Workout) -> Self {
        Self {
            content: workout.popup_text(),
            class_name: format!("{}-popup", workout.kind().as_str()),
        }
    }
}

mod leaflet {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        pub type Map;

        #[wasm_bindgen(js_namespace = L, js_name = map, catch)]
        pub fn map(container_id: &str) -> Result<Map, JsValue>;

        #[wasm_bindgen(method, js_name = setView)]
        pub fn set_view(this: &Map, center: &JsValue, zoom: u8, options: &JsValue) -> Map;

        #[wasm_bindgen(method)]
        pub fn on(this: &Map, event: &str, handler: &js_sys::Function) -> Map;

        pub type TileLayer;

        #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
        pub fn tile_layer(url_template: &str, options: &JsValue) -> TileLayer;

        #[wasm_bindgen(method, js_name = addTo)]
        pub fn add_to(this: &TileLayer, map: &Map) -> TileLayer;

        pub type Marker;

        #[wasm_bindgen(js_namespace = L, js_name = marker)]
        pub fn marker(at: &JsValue) -> Marker;

        #[wasm_bindgen(method, js_name = addTo)]
        pub fn add_marker_to(this: &Marker, map: &Map) -> Marker;

        #[wasm_bindgen(method, js_name = bindPopup)]
        pub fn bind_popup(this: &Marker, popup: &Popup) -> Marker;

        #[wasm_bindgen(method, js_name = setPopupContent)]
        pub fn set_popup_content(this: &Marker, content: &str) -> Marker;

        #[wasm_bindgen(method, js_name = openPopup)]
        pub fn open_popup(this: &Marker) -> Marker;

        pub type Popup;

        #[wasm_bindgen(js_namespace = L, js_name = popup)]
        pub fn popup(options: &JsValue) -> Popup;

        pub type MouseEvent;

        #[wasm_bindgen(method, getter)]
        pub fn latlng(this: &MouseEvent) -> LatLng;

        pub type LatLng;

        #[wasm_bindgen(method, getter)]
        pub fn lat(this: &LatLng) -> f64;

        #[wasm_bindgen(method, getter)]
        pub fn lng(this: &LatLng) -> f64;
    }
}

#[derive(Serialize)]
struct TileOptions<'a> {
    attribution: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PopupOptions<'a> {
    max_width: u32,
    min_width: u32,
    auto_close: bool,
    close_on_click: bool,
    class_name: &'a str,
}

#[derive(Serialize)]
struct PanOptions {
    duration: f64,
}

#[derive(Serialize)]
struct ViewOptions {
    animate: bool,
    pan: PanOptions,
}

fn lat_lng(at: Coordinates) -> JsValue {
    js_sys::Array::of2(&JsValue::from_f64(at.lat), &JsValue::from_f64(at.lng)).into()
}

/// A Leaflet map with an OpenStreetMap tile layer.
pub struct LeafletMap {
    map: leaflet::Map,
    popup: PopupConfig,
}

impl LeafletMap {
    /// Create the map inside the element with id `container_id`, centred on
    /// `center`. Fails when Leaflet is not loaded or the container is missing.
    pub fn initialize(
        container_id: &str,
        center: Coordinates,
        config: &TrackerConfig,
    ) -> Result<Self, MapError> {
        let map = leaflet::map(container_id)
            .map_err(|e| MapError::Init(e.as_string().unwrap_or_else(|| format!("{:?}", e))))?;
        map.set_view(&lat_lng(center), config.zoom, &JsValue::UNDEFINED);

        let tile_options = serde_wasm_bindgen::to_value(&TileOptions {
            attribution: &config.attribution,
        })
        .map_err(|e| MapError::Init(e.to_string()))?;
        leaflet::tile_layer(&config.tile_url, &tile_options).add_to(&map);

        debug!("Map initialized at {}, {}", center.lat, center.lng);
        Ok(Self {
            map,
            popup: config.popup.clone(),
        })
    }
}

impl MapView for LeafletMap {
    fn on_click(&self, mut handler: Box<dyn FnMut(Coordinates)>) {
        let closure = Closure::<dyn FnMut(leaflet::MouseEvent)>::new(
            move |event: leaflet::MouseEvent| {
                let at = event.latlng();
                handler(Coordinates::new(at.lat(), at.lng()));
            },
        );
        self.map.on("click", closure.as_ref().unchecked_ref());
        // The map lives as long as the page.
        closure.forget();
    }

    fn add_marker(&self, at: Coordinates, popup: &MarkerPopup) {
        let options = match serde_wasm_bindgen::to_value(&PopupOptions {
            max_width: self.popup.max_width,
            min_width: self.popup.min_width,
            auto_close: self.popup.auto_close,
            close_on_click: self.popup.close_on_click,
            class_name: &popup.class_name,
        }) {
            Ok(options) => options,
            Err(e) => {
                warn!("Failed to build popup options: {}", e);
                return;
            }
        };

        leaflet::marker(&lat_lng(at))
            .add_marker_to(&self.map)
            .bind_popup(&leaflet::popup(&options))
            .set_popup_content(&popup.content)
            .open_popup();
    }

    fn pan_to(&self, at: Coordinates, zoom: u8) {
        let options = serde_wasm_bindgen::to_value(&ViewOptions {
            animate: true,
            pan: PanOptions { duration: 1.0 },
        })
        .unwrap_or(JsValue::UNDEFINED);
        self.map.set_view(&lat_lng(at), zoom, &options);
    }
}
