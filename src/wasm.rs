use wasm_bindgen::prelude::*;

use crate::ces::event;
use crate::ces::schema::Schemas;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = JSON)]
    fn parse(s: &str) -> JsValue;
}

fn to_js(value: &serde_json::Value) -> JsValue {
    match serde_json::to_string(value) {
        Ok(json_str) => parse(&json_str),
        Err(_) => JsValue::NULL,
    }
}

/// Decode an on-chain schema blob into its structured `{name, bytes}` form.
#[wasm_bindgen]
pub fn decode_schemas(schemas_hex: &str) -> JsValue {
    let schemas = match Schemas::from_hex(schemas_hex) {
        Ok(s) => s,
        Err(e) => return error_result(&e.to_string()),
    };
    serde_wasm_bindgen::to_value(&schemas).unwrap_or_else(|e| error_result(&e.to_string()))
}

/// Decode one hex dictionary envelope against schemas in structured form.
#[wasm_bindgen]
pub fn parse_event_name_and_data(event_hex: &str, schemas_json: &str) -> JsValue {
    let schemas = match Schemas::from_json(schemas_json) {
        Ok(s) => s,
        Err(e) => return error_result(&format!("Invalid schemas: {e}")),
    };
    let (name, data) = match event::parse_event_name_and_data(event_hex, &schemas) {
        Ok(parsed) => parsed,
        Err(e) => return error_result(&e.to_string()),
    };
    match serde_json::to_value(&data) {
        Ok(data) => to_js(&serde_json::json!({"name": name, "data": data})),
        Err(e) => error_result(&e.to_string()),
    }
}

/// Decode a bare event payload (fields only) for a named event.
#[wasm_bindgen]
pub fn parse_event_payload(schemas_json: &str, event_name: &str, payload_hex: &str) -> JsValue {
    let schemas = match Schemas::from_json(schemas_json) {
        Ok(s) => s,
        Err(e) => return error_result(&format!("Invalid schemas: {e}")),
    };
    match schemas.parse_event_raw_data_payload(event_name, payload_hex) {
        Ok(payload) => to_js(&serde_json::Value::Object(payload.into_map())),
        Err(e) => error_result(&e.to_string()),
    }
}

fn error_result(msg: &str) -> JsValue {
    let obj = serde_json::json!({"error": msg});
    to_js(&obj)
}
