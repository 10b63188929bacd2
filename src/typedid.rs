use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};

use chrono::Utc;
use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

static LAST_ISSUED: AtomicI64 = AtomicI64::new(0);

// Millisecond timestamps, bumped by one when the clock hasn't moved since the
// last id so a single process never hands out the same value twice.
fn next_timestamp_id() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ISSUED.load(AtomicOrdering::Relaxed);
    loop {
        let next = if now > last { now } else { last + 1 };
        match LAST_ISSUED.compare_exchange_weak(
            last,
            next,
            AtomicOrdering::Relaxed,
            AtomicOrdering::Relaxed,
        ) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

pub trait TypedIdMarker {
    fn tag() -> &'static str;
}

pub struct TypedId<T: TypedIdMarker>(i64, PhantomData<T>);

impl<T: TypedIdMarker> TypedId<T> {
    pub fn new() -> TypedId<T> {
        TypedId(next_timestamp_id(), PhantomData)
    }

    pub fn from_raw(raw: i64) -> TypedId<T> {
        TypedId(raw, PhantomData)
    }

    pub fn raw(&self) -> i64 {
        self.0
    }
}

impl<T: TypedIdMarker> Copy for TypedId<T> {}

impl<T: TypedIdMarker> Clone for TypedId<T> {
    fn clone(&self) -> TypedId<T> {
        *self
    }
}

impl<T: TypedIdMarker> PartialEq for TypedId<T> {
    fn eq(&self, other: &TypedId<T>) -> bool {
        self.0 == other.0
    }
}

impl<T: TypedIdMarker> Eq for TypedId<T> {}

impl<T: TypedIdMarker> PartialOrd for TypedId<T> {
    fn partial_cmp(&self, other: &TypedId<T>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: TypedIdMarker> Ord for TypedId<T> {
    fn cmp(&self, other: &TypedId<T>) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T: TypedIdMarker> Hash for TypedId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl<T: TypedIdMarker> Display for TypedId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}

impl<T: TypedIdMarker> Debug for TypedId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}#{}", T::tag(), self.0)
    }
}

impl<T: TypedIdMarker> FromStr for TypedId<T> {
    type Err = TypedIdParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // accept the tagged debug form as well as the bare number
        let raw = match s.split_once('#') {
            Some((tag, raw)) if tag == T::tag() => raw,
            Some(_) => return Err(TypedIdParseError::InvalidTag),
            None => s,
        };

        let id = raw
            .parse::<i64>()
            .map_err(|_| TypedIdParseError::InvalidNumber)?;
        if id <= 0 {
            return Err(TypedIdParseError::InvalidNumber);
        }

        Ok(TypedId(id, PhantomData))
    }
}

impl<T: TypedIdMarker> Serialize for TypedId<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de, T: TypedIdMarker> Deserialize<'de> for TypedId<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Dummy {
            Number(i64),
            Text(String),
        }

        match Dummy::deserialize(deserializer)? {
            Dummy::Number(id) if id > 0 => Ok(TypedId(id, PhantomData)),
            Dummy::Number(_) => Err(serde::de::Error::custom(TypedIdParseError::InvalidNumber)),
            Dummy::Text(s) => TypedId::from_str(&s).map_err(serde::de::Error::custom),
        }
    }
}

impl<T: TypedIdMarker> From<TypedId<T>> for Bson {
    fn from(id: TypedId<T>) -> Bson {
        Bson::Int64(id.0)
    }
}

#[derive(Copy, Clone, Debug)]
pub enum TypedIdParseError {
    InvalidTag,
    InvalidNumber,
}

impl Display for TypedIdParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl std::error::Error for TypedIdParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing;

    impl TypedIdMarker for Thing {
        fn tag() -> &'static str {
            "THG"
        }
    }

    #[test]
    fn new_ids_strictly_increase() {
        let ids: Vec<TypedId<Thing>> = (0..1000).map(|_| TypedId::new()).collect();

        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1], "{:?} !< {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn new_ids_are_close_to_now() {
        let before = Utc::now().timestamp_millis();
        let id: TypedId<Thing> = TypedId::new();

        assert!(id.raw() >= before);
    }

    #[test]
    fn parses_bare_and_tagged_forms() {
        let bare: TypedId<Thing> = "1700000000000".parse().unwrap();
        let tagged: TypedId<Thing> = "THG#1700000000000".parse().unwrap();

        assert_eq!(bare, tagged);
        assert_eq!(bare.to_string(), "1700000000000");
        assert_eq!(format!("{:?}", bare), "THG#1700000000000");
    }

    #[test]
    fn rejects_wrong_tag_and_garbage() {
        assert!(matches!(
            "CPN#12".parse::<TypedId<Thing>>(),
            Err(TypedIdParseError::InvalidTag)
        ));
        assert!(matches!(
            "twelve".parse::<TypedId<Thing>>(),
            Err(TypedIdParseError::InvalidNumber)
        ));
        assert!(matches!(
            "-4".parse::<TypedId<Thing>>(),
            Err(TypedIdParseError::InvalidNumber)
        ));
    }

    #[test]
    fn serializes_as_a_number() {
        let id: TypedId<Thing> = TypedId::from_raw(42);

        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: TypedId<Thing> = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
        let from_text: TypedId<Thing> = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(from_text, id);
    }

    #[test]
    fn deserializing_rejects_non_positive_numbers() {
        for text in ["0", "-4", "\"-4\""] {
            assert!(
                serde_json::from_str::<TypedId<Thing>>(text).is_err(),
                "{} was accepted",
                text
            );
        }
    }
}
