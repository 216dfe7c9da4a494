//! Typed row builders, one per source, listing required and optional fields explicitly.

use openflights_store::decimal::{COORDINATE_PRECISION, TIMEZONE_PRECISION};
use openflights_store::models::{Airline, Airport, Country, Plane};
use tracing::debug;

use crate::error::LoadResult;
use crate::source::{SourceFile, SourceRecord, SourceRow};

impl SourceRow for Country {
    const SOURCE: SourceFile = SourceFile::Countries;

    fn from_record(record: &SourceRecord<'_>) -> LoadResult<Option<Self>> {
        Ok(Some(Country {
            country_id: record.required_int("country_id")?,
            name: record.required_string("name")?,
            iso2: record.optional_string("iso2"),
            dafif: record.optional_string("dafif"),
        }))
    }
}

impl SourceRow for Plane {
    const SOURCE: SourceFile = SourceFile::Planes;

    fn from_record(record: &SourceRecord<'_>) -> LoadResult<Option<Self>> {
        Ok(Some(Plane {
            plane_id: record.required_int("plane_id")?,
            name: record.required_string("name")?,
            iata: record.optional_string("iata"),
            icao: record.optional_string("icao"),
        }))
    }
}

impl SourceRow for Airport {
    const SOURCE: SourceFile = SourceFile::Airports;

    fn from_record(record: &SourceRecord<'_>) -> LoadResult<Option<Self>> {
        let Some(country_id) = record.lenient_int("country_id") else {
            debug!(line = record.line(), "skipping airport without a usable country_id");
            return Ok(None);
        };

        Ok(Some(Airport {
            airport_id: record.required_int("airport_id")?,
            name: record.required_string("name")?,
            city: record.optional_string("city"),
            country_id,
            iata: record.optional_string("iata"),
            icao: record.optional_string("icao"),
            latitude: record
                .optional_decimal("latitude")
                .map(|value| COORDINATE_PRECISION.quantize(&value)),
            longitude: record
                .optional_decimal("longitude")
                .map(|value| COORDINATE_PRECISION.quantize(&value)),
            altitude_ft: record.optional_int("altitude_ft")?,
            timezone_hrs: record
                .optional_decimal("timezone_hrs")
                .map(|value| TIMEZONE_PRECISION.quantize(&value)),
            dst: record.optional_string("dst"),
            tz: record.optional_string("tz"),
            kind: record.optional_string("type"),
            source: record.optional_string("source"),
        }))
    }
}

impl SourceRow for Airline {
    const SOURCE: SourceFile = SourceFile::Airlines;

    fn from_record(record: &SourceRecord<'_>) -> LoadResult<Option<Self>> {
        let Some(country_id) = record.lenient_int("country_id") else {
            debug!(line = record.line(), "skipping airline without a usable country_id");
            return Ok(None);
        };

        Ok(Some(Airline {
            airline_id: record.required_int("airline_id")?,
            name: record.required_string("name")?,
            alias: record.optional_string("alias"),
            iata: record.optional_string("iata"),
            icao: record.optional_string("icao"),
            callsign: record.optional_string("callsign"),
            country_id,
            active: record.optional_string("active"),
        }))
    }
}
