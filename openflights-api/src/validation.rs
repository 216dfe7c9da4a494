use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use openflights_store::decimal::{COORDINATE_PRECISION, DecimalPrecision, TIMEZONE_PRECISION};
use openflights_store::models::{Airport, IATA_CODE_LENGTH, ICAO_CODE_LENGTH};
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";
pub const INVALID_INTEGER: &str = "A valid integer is required.";
pub const INVALID_NUMBER: &str = "A valid number is required.";
pub const INVALID_STRING: &str = "Not a valid string.";
pub const UNKNOWN_COUNTRY: &str = "country_id does not exist.";
pub const INVALID_IATA: &str = "IATA code must be exactly 3 characters.";
pub const INVALID_ICAO: &str = "ICAO code must be exactly 4 characters.";
pub const DUPLICATE_AIRPORT: &str = "airport with this airport_id already exists.";
pub const IMMUTABLE_AIRPORT_ID: &str = "airport_id cannot be changed.";

/// Maximum character lengths of the airport text columns.
const NAME_MAX_LENGTH: usize = 200;
const CITY_MAX_LENGTH: usize = 120;
const DST_MAX_LENGTH: usize = 1;
const TZ_MAX_LENGTH: usize = 60;
const TYPE_MAX_LENGTH: usize = 50;
const SOURCE_MAX_LENGTH: usize = 50;

/// Validation messages keyed by the name of the offending field.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(example = json!({"iata": ["IATA code must be exactly 3 characters."]}))]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an error map holding a single message.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns `value` when no error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }

        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// How much of an airport a request body must describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// A new airport: `airport_id`, `name` and `country_id` are required.
    Create,
    /// A full update: `name` and `country_id` are required, the id comes from the path.
    Replace,
    /// A partial update: every field is optional.
    Partial,
}

/// The airport fields present in a request body, validated field by field.
///
/// The outer `Option` tells whether the field was sent, the inner one whether it was set to
/// null. Checks that need the database (country existence, duplicate ids) are done by the caller.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AirportChanges {
    pub airport_id: Option<i64>,
    pub name: Option<String>,
    pub city: Option<Option<String>>,
    pub country_id: Option<i64>,
    pub iata: Option<Option<String>>,
    pub icao: Option<Option<String>>,
    pub latitude: Option<Option<BigDecimal>>,
    pub longitude: Option<Option<BigDecimal>>,
    pub altitude_ft: Option<Option<i64>>,
    pub timezone_hrs: Option<Option<BigDecimal>>,
    pub dst: Option<Option<String>>,
    pub tz: Option<Option<String>>,
    pub kind: Option<Option<String>>,
    pub source: Option<Option<String>>,
}

impl AirportChanges {
    /// Reads every known field of `body`, collecting one error list per invalid field.
    ///
    /// Unknown fields, including the read only `country_name`, are ignored.
    pub fn parse(body: &Map<String, Value>, mode: ValidationMode) -> (Self, FieldErrors) {
        let mut reader = FieldReader {
            body,
            errors: FieldErrors::new(),
        };

        let changes = Self {
            airport_id: reader.required_int("airport_id", mode == ValidationMode::Create),
            name: reader.required_string("name", NAME_MAX_LENGTH, mode != ValidationMode::Partial),
            city: reader.optional_string("city", CITY_MAX_LENGTH),
            country_id: reader.required_int("country_id", mode != ValidationMode::Partial),
            iata: reader.optional_code("iata", IATA_CODE_LENGTH, INVALID_IATA),
            icao: reader.optional_code("icao", ICAO_CODE_LENGTH, INVALID_ICAO),
            latitude: reader.optional_decimal("latitude", COORDINATE_PRECISION),
            longitude: reader.optional_decimal("longitude", COORDINATE_PRECISION),
            altitude_ft: reader.optional_int("altitude_ft"),
            timezone_hrs: reader.optional_decimal("timezone_hrs", TIMEZONE_PRECISION),
            dst: reader.optional_string("dst", DST_MAX_LENGTH),
            tz: reader.optional_string("tz", TZ_MAX_LENGTH),
            kind: reader.optional_string("type", TYPE_MAX_LENGTH),
            source: reader.optional_string("source", SOURCE_MAX_LENGTH),
        };

        (changes, reader.errors)
    }

    /// Builds a new airport, failing when a required field was not sent.
    pub fn into_airport(self) -> Result<Airport, FieldErrors> {
        let mut errors = FieldErrors::new();
        for (field, present) in [
            ("airport_id", self.airport_id.is_some()),
            ("name", self.name.is_some()),
            ("country_id", self.country_id.is_some()),
        ] {
            if !present {
                errors.add(field, REQUIRED);
            }
        }

        match (self.airport_id, self.name, self.country_id) {
            (Some(airport_id), Some(name), Some(country_id)) => Ok(Airport {
                airport_id,
                name,
                city: self.city.flatten(),
                country_id,
                iata: self.iata.flatten(),
                icao: self.icao.flatten(),
                latitude: self.latitude.flatten(),
                longitude: self.longitude.flatten(),
                altitude_ft: self.altitude_ft.flatten(),
                timezone_hrs: self.timezone_hrs.flatten(),
                dst: self.dst.flatten(),
                tz: self.tz.flatten(),
                kind: self.kind.flatten(),
                source: self.source.flatten(),
            }),
            _ => Err(errors),
        }
    }

    /// Overwrites the fields of `airport` that were sent. The primary key is left untouched.
    pub fn apply_to(self, airport: &mut Airport) {
        if let Some(name) = self.name {
            airport.name = name;
        }
        if let Some(country_id) = self.country_id {
            airport.country_id = country_id;
        }

        assign(&mut airport.city, self.city);
        assign(&mut airport.iata, self.iata);
        assign(&mut airport.icao, self.icao);
        assign(&mut airport.latitude, self.latitude);
        assign(&mut airport.longitude, self.longitude);
        assign(&mut airport.altitude_ft, self.altitude_ft);
        assign(&mut airport.timezone_hrs, self.timezone_hrs);
        assign(&mut airport.dst, self.dst);
        assign(&mut airport.tz, self.tz);
        assign(&mut airport.kind, self.kind);
        assign(&mut airport.source, self.source);
    }
}

fn assign<T>(target: &mut Option<T>, change: Option<Option<T>>) {
    if let Some(value) = change {
        *target = value;
    }
}

/// Parses an integer query filter such as `?country_id=112`.
pub fn parse_id_filter(field: &str, value: Option<&str>) -> Result<Option<i64>, FieldErrors> {
    value
        .map(|value| {
            value
                .parse::<i64>()
                .map_err(|_| FieldErrors::single(field, INVALID_INTEGER))
        })
        .transpose()
}

struct FieldReader<'a> {
    body: &'a Map<String, Value>,
    errors: FieldErrors,
}

impl FieldReader<'_> {
    fn required_int(&mut self, field: &str, required: bool) -> Option<i64> {
        match self.body.get(field) {
            None => {
                if required {
                    self.errors.add(field, REQUIRED);
                }
                None
            }
            Some(Value::Null) => {
                self.errors.add(field, NOT_NULL);
                None
            }
            Some(value) => self.int(field, value),
        }
    }

    fn optional_int(&mut self, field: &str) -> Option<Option<i64>> {
        match self.body.get(field)? {
            Value::Null => Some(None),
            Value::String(value) if value.trim().is_empty() => Some(None),
            value => self.int(field, value).map(Some),
        }
    }

    fn int(&mut self, field: &str, value: &Value) -> Option<i64> {
        let parsed = match value {
            Value::Number(number) => number.as_i64(),
            Value::String(value) => value.trim().parse().ok(),
            _ => None,
        };

        if parsed.is_none() {
            self.errors.add(field, INVALID_INTEGER);
        }
        parsed
    }

    fn required_string(&mut self, field: &str, max_length: usize, required: bool) -> Option<String> {
        match self.body.get(field) {
            None => {
                if required {
                    self.errors.add(field, REQUIRED);
                }
                None
            }
            Some(Value::Null) => {
                self.errors.add(field, NOT_NULL);
                None
            }
            Some(value) => {
                let value = self.string(field, value, max_length)?;
                if value.is_empty() {
                    self.errors.add(field, NOT_BLANK);
                    return None;
                }
                Some(value)
            }
        }
    }

    fn optional_string(&mut self, field: &str, max_length: usize) -> Option<Option<String>> {
        match self.body.get(field)? {
            Value::Null => Some(None),
            value => self.string(field, value, max_length).map(Some),
        }
    }

    /// Reads an airport code that, unless blank, must have exactly `length` characters.
    /// Accepted codes are stored uppercase.
    fn optional_code(
        &mut self,
        field: &str,
        length: usize,
        message: &str,
    ) -> Option<Option<String>> {
        match self.body.get(field)? {
            Value::Null => Some(None),
            value => {
                let value = self.string(field, value, usize::MAX)?;
                if value.is_empty() {
                    return Some(Some(value));
                }
                if value.chars().count() != length {
                    self.errors.add(field, message);
                    return None;
                }
                Some(Some(value.to_uppercase()))
            }
        }
    }

    fn string(&mut self, field: &str, value: &Value, max_length: usize) -> Option<String> {
        let value = match value {
            Value::String(value) => value.trim().to_string(),
            Value::Number(number) => number.to_string(),
            _ => {
                self.errors.add(field, INVALID_STRING);
                return None;
            }
        };

        if value.chars().count() > max_length {
            self.errors.add(
                field,
                format!("Ensure this field has no more than {max_length} characters."),
            );
            return None;
        }

        Some(value)
    }

    /// Reads a decimal, checks it against the column precision and rounds it to the column scale.
    fn optional_decimal(
        &mut self,
        field: &str,
        precision: DecimalPrecision,
    ) -> Option<Option<BigDecimal>> {
        let parsed = match self.body.get(field)? {
            Value::Null => return Some(None),
            Value::String(value) if value.trim().is_empty() => return Some(None),
            Value::String(value) => BigDecimal::from_str(value.trim()).ok(),
            Value::Number(number) => BigDecimal::from_str(&number.to_string()).ok(),
            _ => None,
        };

        let Some(value) = parsed else {
            self.errors.add(field, INVALID_NUMBER);
            return None;
        };

        if let Err(err) = precision.check(&value) {
            self.errors.add(field, err.to_string());
            return None;
        }

        Some(Some(precision.quantize(&value)))
    }
}
