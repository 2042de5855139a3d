//! Serde adapters for the BSON field types existing collections use.
//!
//! Record ids stay `String` in Rust. A 24-digit hex id is written as an
//! `ObjectId`; anything else is written as a plain string. Both forms are
//! accepted on read.

use bson::{oid::ObjectId, Bson};
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Fresh record id, as the hex form of a new `ObjectId`.
pub fn new_record_id() -> String {
    ObjectId::new().to_hex()
}

fn id_from_bson<E: de::Error>(value: Bson) -> Result<String, E> {
    match value {
        Bson::ObjectId(oid) => Ok(oid.to_hex()),
        Bson::String(s) => Ok(s),
        other => Err(E::custom(format!(
            "expected an ObjectId or string id, found {:?}",
            other.element_type()
        ))),
    }
}

pub mod object_id {
    use super::*;

    pub fn serialize<S: Serializer>(id: &str, serializer: S) -> Result<S::Ok, S::Error> {
        match ObjectId::parse_str(id) {
            Ok(oid) => oid.serialize(serializer),
            Err(_) => serializer.serialize_str(id),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        id_from_bson(Bson::deserialize(deserializer)?)
    }
}

pub mod object_id_optional {
    use super::*;

    pub fn serialize<S: Serializer>(id: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => super::object_id::serialize(id, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        match Option::<Bson>::deserialize(deserializer)? {
            None | Some(Bson::Null) => Ok(None),
            Some(value) => id_from_bson(value).map(Some),
        }
    }
}

/// `Option<DateTime<Utc>>` stored as a BSON date. RFC 3339 strings are also read.
pub mod datetime_optional {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        bson::serde_helpers::chrono_datetime_as_bson_datetime_optional::serialize(value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<Bson>::deserialize(deserializer)? {
            None | Some(Bson::Null) => Ok(None),
            Some(Bson::DateTime(dt)) => Ok(Some(dt.to_chrono())),
            Some(Bson::String(s)) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(de::Error::custom),
            Some(other) => Err(de::Error::custom(format!(
                "expected a date, found {:?}",
                other.element_type()
            ))),
        }
    }
}
