//! # Slot Settings
//!
//! The persistable per-slot configuration record and the validation path
//! for untrusted profile input (imported JSON, stored profiles).
//!
//! Wire fields are concrete integers sized to their wire width, so a value
//! that survives validation always encodes. All shape checking happens here,
//! at the untrusted boundary: every wire field must be present and coerce to
//! an in-range integer, and the offending field is always named.

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{Mc3000Error, Result};
use super::tables::{self, Label};

/// Per-slot configuration, as read from or written to the charger
///
/// `id` and `name` are host-side metadata and never travel on the wire.
/// `raw` keeps the original response bytes around for diagnostics when the
/// record was decoded from a USB read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSettings {
    pub slot_number: u8,
    pub busy_tag: u8,
    pub battery_type: u8,
    pub operation_mode: u8,
    pub capacity: u16,
    pub charge_current: u16,
    pub discharge_current: u16,
    pub discharge_cut_voltage: u16,
    pub charge_end_voltage: u16,
    pub charge_end_current: u16,
    pub discharge_reduce_current: u16,
    pub number_cycle: u8,
    pub charge_resting_time: u8,
    pub cycle_mode: u8,
    pub peak_sense_voltage: u8,
    pub trickle_current: u8,
    pub restart_voltage: u16,
    pub cut_temperature: u8,
    pub cut_time: u16,
    pub temperature_unit: u8,
    pub trickle_time: u8,
    pub discharge_resting_time: u8,

    /// Identity token, regenerated on capture or import, kept on rename
    pub id: Option<String>,

    /// Optional display name
    pub name: Option<String>,

    /// Original response bytes when decoded from the device
    #[serde(skip)]
    pub raw: Option<Vec<u8>>,
}

impl SlotSettings {
    /// Battery chemistry label, resolved through the configuration table
    pub fn battery_type_label(&self) -> Label {
        tables::config_chemistry(self.battery_type)
    }

    /// Operation-mode label, gated by the battery chemistry
    pub fn operation_mode_label(&self) -> Label {
        tables::config_mode(self.battery_type, self.operation_mode)
    }

    /// Human-readable summary, e.g. `LiIon Charge 1.5A`
    ///
    /// Charge current is omitted for pure discharge programs and discharge
    /// current for pure charge programs.
    pub fn description(&self, include_name: bool) -> String {
        let mode = self.operation_mode_label();
        let mut pieces = vec![self.battery_type_label().to_string(), mode.to_string()];

        if mode.as_str() != "Discharge" {
            pieces.push(format!("{}A", self.charge_current as f32 / 1000.0));
        }
        if mode.as_str() != "Charge" {
            pieces.push(format!("{}A", self.discharge_current as f32 / 1000.0));
        }

        let description = pieces.join(" ");
        match (include_name, &self.name) {
            (true, Some(name)) if !name.is_empty() => format!("{} ({})", name, description),
            _ => description,
        }
    }

    /// Give this record a fresh identity token and return it
    ///
    /// Called when a record is newly captured from the device or imported;
    /// renaming an existing profile keeps its token.
    pub fn assign_new_id(&mut self) -> String {
        let token = Uuid::new_v4().to_string();
        self.id = Some(token.clone());
        token
    }

    /// Serialize to the flat JSON interchange form
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate and build a record from untrusted JSON text
    ///
    /// See [`SlotSettings::from_json_value`].
    pub fn from_json(payload: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_json_value(&value)
    }

    /// Validate and build a record from an untrusted JSON value
    ///
    /// Every wire field must be present and coerce to an integer fitting its
    /// wire width; JSON numbers and numeric strings are both accepted (web
    /// forms deliver strings). Failures name the offending field. Any `id`
    /// in the payload is ignored; the caller decides when to assign a fresh
    /// token. `name` is optional.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or(Mc3000Error::ProfilePayload)?;

        // Coerce everything that is present first, so a bad value is
        // reported ahead of a missing one, then require completeness in
        // wire-field order.
        let slot_number = take_u8(map, "slot_number")?;
        let busy_tag = take_u8(map, "busy_tag")?;
        let battery_type = take_u8(map, "battery_type")?;
        let operation_mode = take_u8(map, "operation_mode")?;
        let capacity = take_u16(map, "capacity")?;
        let charge_current = take_u16(map, "charge_current")?;
        let discharge_current = take_u16(map, "discharge_current")?;
        let discharge_cut_voltage = take_u16(map, "discharge_cut_voltage")?;
        let charge_end_voltage = take_u16(map, "charge_end_voltage")?;
        let charge_end_current = take_u16(map, "charge_end_current")?;
        let discharge_reduce_current = take_u16(map, "discharge_reduce_current")?;
        let number_cycle = take_u8(map, "number_cycle")?;
        let charge_resting_time = take_u8(map, "charge_resting_time")?;
        let cycle_mode = take_u8(map, "cycle_mode")?;
        let peak_sense_voltage = take_u8(map, "peak_sense_voltage")?;
        let trickle_current = take_u8(map, "trickle_current")?;
        let restart_voltage = take_u16(map, "restart_voltage")?;
        let cut_temperature = take_u8(map, "cut_temperature")?;
        let cut_time = take_u16(map, "cut_time")?;
        let temperature_unit = take_u8(map, "temperature_unit")?;
        let trickle_time = take_u8(map, "trickle_time")?;
        let discharge_resting_time = take_u8(map, "discharge_resting_time")?;

        let name = match map.get("name") {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };

        Ok(SlotSettings {
            slot_number: require(slot_number, "slot_number")?,
            busy_tag: require(busy_tag, "busy_tag")?,
            battery_type: require(battery_type, "battery_type")?,
            operation_mode: require(operation_mode, "operation_mode")?,
            capacity: require(capacity, "capacity")?,
            charge_current: require(charge_current, "charge_current")?,
            discharge_current: require(discharge_current, "discharge_current")?,
            discharge_cut_voltage: require(discharge_cut_voltage, "discharge_cut_voltage")?,
            charge_end_voltage: require(charge_end_voltage, "charge_end_voltage")?,
            charge_end_current: require(charge_end_current, "charge_end_current")?,
            discharge_reduce_current: require(discharge_reduce_current, "discharge_reduce_current")?,
            number_cycle: require(number_cycle, "number_cycle")?,
            charge_resting_time: require(charge_resting_time, "charge_resting_time")?,
            cycle_mode: require(cycle_mode, "cycle_mode")?,
            peak_sense_voltage: require(peak_sense_voltage, "peak_sense_voltage")?,
            trickle_current: require(trickle_current, "trickle_current")?,
            restart_voltage: require(restart_voltage, "restart_voltage")?,
            cut_temperature: require(cut_temperature, "cut_temperature")?,
            cut_time: require(cut_time, "cut_time")?,
            temperature_unit: require(temperature_unit, "temperature_unit")?,
            trickle_time: require(trickle_time, "trickle_time")?,
            discharge_resting_time: require(discharge_resting_time, "discharge_resting_time")?,
            id: None,
            name,
            raw: None,
        })
    }
}

fn invalid(field: &'static str, value: &Value) -> Mc3000Error {
    let rendered = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Mc3000Error::InvalidField { field, value: rendered }
}

/// Coerce a JSON number or numeric string to `i64`
fn coerce_int(field: &'static str, value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| invalid(field, value)),
        Value::String(s) => s.trim().parse().map_err(|_| invalid(field, value)),
        _ => Err(invalid(field, value)),
    }
}

fn take_u8(map: &Map<String, Value>, field: &'static str) -> Result<Option<u8>> {
    match map.get(field) {
        Some(value) => {
            let int = coerce_int(field, value)?;
            let narrowed = u8::try_from(int).map_err(|_| invalid(field, value))?;
            Ok(Some(narrowed))
        }
        None => Ok(None),
    }
}

fn take_u16(map: &Map<String, Value>, field: &'static str) -> Result<Option<u16>> {
    match map.get(field) {
        Some(value) => {
            let int = coerce_int(field, value)?;
            let narrowed = u16::try_from(int).map_err(|_| invalid(field, value))?;
            Ok(Some(narrowed))
        }
        None => Ok(None),
    }
}

fn require<T>(field_value: Option<T>, field: &'static str) -> Result<T> {
    field_value.ok_or(Mc3000Error::MissingField(field))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A representative LiIon charge program used across codec tests
    pub(crate) fn sample_settings() -> SlotSettings {
        SlotSettings {
            slot_number: 1,
            busy_tag: 0,
            battery_type: 0,
            operation_mode: 0,
            capacity: 2500,
            charge_current: 1500,
            discharge_current: 500,
            discharge_cut_voltage: 2800,
            charge_end_voltage: 4200,
            charge_end_current: 100,
            discharge_reduce_current: 300,
            number_cycle: 1,
            charge_resting_time: 10,
            cycle_mode: 0,
            peak_sense_voltage: 5,
            trickle_current: 20,
            restart_voltage: 3900,
            cut_temperature: 45,
            cut_time: 300,
            temperature_unit: 0,
            trickle_time: 30,
            discharge_resting_time: 10,
            id: None,
            name: None,
            raw: None,
        }
    }

    #[test]
    fn test_labels_use_config_registry() {
        let mut settings = sample_settings();
        assert_eq!(settings.battery_type_label(), Label::Known("LiIon"));
        assert_eq!(settings.operation_mode_label(), Label::Known("Charge"));

        settings.battery_type = 3;
        settings.operation_mode = 2;
        assert_eq!(settings.battery_type_label(), Label::Known("NiMH"));
        assert_eq!(settings.operation_mode_label(), Label::Known("Break-in"));

        settings.battery_type = 9;
        assert_eq!(settings.battery_type_label(), Label::Fallback("Type9".to_string()));
        // Chemistry 9 falls into the zinc/RAM group on the config path
        assert_eq!(settings.operation_mode_label(), Label::Known("Discharge"));

        settings.operation_mode = 7;
        assert_eq!(settings.operation_mode_label(), Label::Fallback("Mode7".to_string()));
    }

    #[test]
    fn test_description() {
        let mut settings = sample_settings();
        assert_eq!(settings.description(false), "LiIon Charge 1.5A");

        settings.operation_mode = 3; // Discharge
        assert_eq!(settings.description(false), "LiIon Discharge 0.5A");

        settings.operation_mode = 4; // Cycle uses both currents
        assert_eq!(settings.description(false), "LiIon Cycle 1.5A 0.5A");
    }

    #[test]
    fn test_description_with_name() {
        let mut settings = sample_settings();
        settings.name = Some("AA shelf".to_string());
        assert_eq!(settings.description(true), "AA shelf (LiIon Charge 1.5A)");
        assert_eq!(settings.description(false), "LiIon Charge 1.5A");
    }

    #[test]
    fn test_assign_new_id_rotates_token() {
        let mut settings = sample_settings();
        let first = settings.assign_new_id();
        assert_eq!(settings.id.as_deref(), Some(first.as_str()));
        let second = settings.assign_new_id();
        assert_ne!(second, first);
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = sample_settings();
        settings.name = Some("bench".to_string());
        let json = settings.to_json().unwrap();

        let parsed = SlotSettings::from_json(&json).unwrap();
        assert_eq!(parsed.capacity, 2500);
        assert_eq!(parsed.charge_current, 1500);
        assert_eq!(parsed.name.as_deref(), Some("bench"));
        // Identity is never imported from the payload
        assert_eq!(parsed.id, None);
    }

    #[test]
    fn test_from_json_accepts_numeric_strings() {
        let mut settings = sample_settings();
        let json = settings.to_json().unwrap();
        let mut value: Value = serde_json::from_str(&json).unwrap();
        value["capacity"] = Value::String("2500".to_string());
        value["slot_number"] = Value::String(" 1 ".to_string());

        let parsed = SlotSettings::from_json_value(&value).unwrap();
        settings.id = None;
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_from_json_names_missing_field() {
        let json = sample_settings().to_json().unwrap();
        let mut value: Value = serde_json::from_str(&json).unwrap();
        value.as_object_mut().unwrap().remove("charge_end_voltage");

        let err = SlotSettings::from_json_value(&value).unwrap_err();
        match err {
            Mc3000Error::MissingField(field) => assert_eq!(field, "charge_end_voltage"),
            other => panic!("expected MissingField, got: {:?}", other),
        }
    }

    #[test]
    fn test_from_json_names_invalid_field() {
        let json = sample_settings().to_json().unwrap();
        let mut value: Value = serde_json::from_str(&json).unwrap();
        value["discharge_current"] = Value::String("lots".to_string());

        let err = SlotSettings::from_json_value(&value).unwrap_err();
        match err {
            Mc3000Error::InvalidField { field, value } => {
                assert_eq!(field, "discharge_current");
                assert_eq!(value, "lots");
            }
            other => panic!("expected InvalidField, got: {:?}", other),
        }
    }

    #[test]
    fn test_from_json_rejects_out_of_range() {
        let json = sample_settings().to_json().unwrap();
        let mut value: Value = serde_json::from_str(&json).unwrap();

        // Too wide for the 2-byte wire field
        value["capacity"] = Value::from(70_000);
        let err = SlotSettings::from_json_value(&value).unwrap_err();
        assert!(matches!(err, Mc3000Error::InvalidField { field: "capacity", .. }));

        value["capacity"] = Value::from(-1);
        let err = SlotSettings::from_json_value(&value).unwrap_err();
        assert!(matches!(err, Mc3000Error::InvalidField { field: "capacity", .. }));

        // Too wide for the 1-byte wire field
        let json = sample_settings().to_json().unwrap();
        let mut value: Value = serde_json::from_str(&json).unwrap();
        value["number_cycle"] = Value::from(256);
        let err = SlotSettings::from_json_value(&value).unwrap_err();
        assert!(matches!(err, Mc3000Error::InvalidField { field: "number_cycle", .. }));
    }

    #[test]
    fn test_invalid_value_reported_before_missing_field() {
        let json = sample_settings().to_json().unwrap();
        let mut value: Value = serde_json::from_str(&json).unwrap();
        value.as_object_mut().unwrap().remove("slot_number");
        value["cut_time"] = Value::Bool(true);

        let err = SlotSettings::from_json_value(&value).unwrap_err();
        assert!(matches!(err, Mc3000Error::InvalidField { field: "cut_time", .. }));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = SlotSettings::from_json("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, Mc3000Error::ProfilePayload));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = SlotSettings::from_json("not json at all").unwrap_err();
        assert!(matches!(err, Mc3000Error::Json(_)));
    }

    #[test]
    fn test_raw_bytes_stay_out_of_json() {
        let mut settings = sample_settings();
        settings.raw = Some(vec![0xAA; 64]);
        let json = settings.to_json().unwrap();
        assert!(!json.contains("raw"));
    }
}
