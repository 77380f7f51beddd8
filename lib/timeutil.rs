use chrono::{DateTime, TimeZone};

pub fn to_rfc3339<T>(input: &DateTime<T>) -> String
where
    T: TimeZone,
    <T as TimeZone>::Offset: std::fmt::Display,
{
    input.to_rfc3339_opts(chrono::SecondsFormat::Secs, /* use_z */ true)
}

pub fn default_timezone() -> chrono_tz::Tz {
    chrono_tz::UTC
}

pub mod iso8601_dateformat_serde {
    use chrono::DateTime;
    use chrono_tz::Tz;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::{default_timezone, to_rfc3339};

    pub fn serialize<S>(
        input: &DateTime<Tz>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&to_rfc3339(input))
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<DateTime<Tz>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let dt = DateTime::parse_from_rfc3339(&s).map_err(|_| {
            serde::de::Error::custom(
                "Invalid datetime format. Only ISO-8601 is allowed.",
            )
        })?;
        Ok(dt.with_timezone(&default_timezone()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike, Utc};
    use chrono_tz::UTC;
    use serde::{Deserialize, Serialize};

    use super::to_rfc3339;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Timestamped {
        #[serde(with = "super::iso8601_dateformat_serde")]
        at: chrono::DateTime<chrono_tz::Tz>,
    }

    #[test]
    fn test_rfc3339_seconds_granularity() {
        let t = Utc
            .with_ymd_and_hms(2023, 3, 5, 21, 27, 32)
            .unwrap()
            .with_timezone(&UTC);
        assert_eq!("2023-03-05T21:27:32Z", to_rfc3339(&t));
    }

    #[test]
    fn test_iso8601_serde_round_trip() {
        // Serialization drops sub-second precision, zero it for equality.
        let t = Utc::now().with_timezone(&UTC).with_nanosecond(0).unwrap();
        let v = Timestamped { at: t };
        let serialized = serde_json::to_string(&v).unwrap();
        let parsed: Timestamped = serde_json::from_str(&serialized).unwrap();
        assert_eq!(v, parsed);
    }

    #[test]
    fn test_iso8601_rejects_garbage() {
        let e = serde_json::from_str::<Timestamped>(r#"{"at":"tomorrow"}"#);
        assert!(e.is_err());
    }
}
