//! Shearwater XML dive log import.
//!
//! Reads the `<dive><diveLog>…</diveLog></dive>` export written by
//! Shearwater desktop tools. Only the fields the analysis needs are
//! decoded; everything else in the file is ignored.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::error::DiveLogError;
use crate::models::{DepthUnits, Dive, Sample};

/// `startDate` / `endDate` layout, e.g. `Thu Nov  7 13:12:46 2019 UTC`.
const DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Y UTC";

#[derive(Debug, Deserialize)]
struct SwDive {
    #[serde(rename = "diveLog")]
    dive_log: SwLog,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwLog {
    #[serde(default)]
    number: Option<i64>,
    #[serde(default)]
    gf_min: Option<u32>,
    #[serde(default)]
    gf_max: Option<u32>,
    #[serde(default)]
    imperial_units: bool,
    start_date: String,
    #[serde(default)]
    max_depth: Option<f64>,
    #[serde(default)]
    max_time: Option<u32>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    dive_log_records: SwRecords,
}

#[derive(Debug, Default, Deserialize)]
struct SwRecords {
    #[serde(rename = "diveLogRecord", default)]
    records: Vec<SwRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwRecord {
    current_time: u32,
    current_depth: f64,
    #[serde(rename = "averagePPO2", default)]
    average_ppo2: f64,
    #[serde(default)]
    fraction_o2: f64,
    #[serde(default)]
    fraction_he: f64,
}

impl From<SwRecord> for Sample {
    fn from(r: SwRecord) -> Self {
        Sample {
            offset_sec: r.current_time,
            depth: r.current_depth,
            average_ppo2: r.average_ppo2,
            fraction_o2: r.fraction_o2,
            fraction_he: r.fraction_he,
        }
    }
}

/// Summary fields from the log header, as recorded by the dive computer.
#[derive(Clone, Debug, PartialEq)]
pub struct LogHeader {
    pub number: Option<i64>,
    pub gf_min: Option<u32>,
    pub gf_max: Option<u32>,
    pub max_depth: Option<f64>,
    pub max_time: Option<u32>,
    pub start_date: String,
    pub end_date: Option<String>,
}

impl fmt::Display for LogHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opt = |v: Option<String>| v.unwrap_or_else(|| "?".to_string());
        write!(
            f,
            "log number={}, maxdepth={}, maxtime={}, from {} to {}",
            opt(self.number.map(|n| n.to_string())),
            opt(self.max_depth.map(|d| d.to_string())),
            opt(self.max_time.map(|t| t.to_string())),
            self.start_date,
            opt(self.end_date.clone()),
        )
    }
}

/// A decoded Shearwater log.
#[derive(Clone, Debug, PartialEq)]
pub struct ShearwaterLog {
    pub header: LogHeader,
    pub dive: Dive,
}

fn parse_date(value: &str) -> Result<DateTime<Utc>, DiveLogError> {
    NaiveDateTime::parse_from_str(value.trim(), DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|source| DiveLogError::InvalidStartDate {
            value: value.to_string(),
            source,
        })
}

/// Decode a Shearwater XML export.
pub fn parse_str(xml: &str) -> Result<ShearwaterLog, DiveLogError> {
    let decoded: SwDive = quick_xml::de::from_str(xml)?;
    let log = decoded.dive_log;

    let start_time = parse_date(&log.start_date)?;
    let units = DepthUnits::from_imperial(log.imperial_units);
    let samples: Vec<Sample> = log
        .dive_log_records
        .records
        .into_iter()
        .map(Sample::from)
        .collect();
    tracing::debug!(
        samples = samples.len(),
        start = %start_time,
        units = units.label(),
        "decoded shearwater log"
    );

    let dive = Dive::new(start_time, units, samples)?;
    Ok(ShearwaterLog {
        header: LogHeader {
            number: log.number,
            gf_min: log.gf_min,
            gf_max: log.gf_max,
            max_depth: log.max_depth,
            max_time: log.max_time,
            start_date: log.start_date,
            end_date: log.end_date,
        },
        dive,
    })
}

/// Read and decode a Shearwater XML export from disk.
pub fn open(path: impl AsRef<Path>) -> Result<ShearwaterLog, DiveLogError> {
    let path = path.as_ref();
    let xml = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), "reading shearwater log");
    parse_str(&xml)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    pub(crate) const SAMPLE_LOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<dive version="11">
  <diveLog>
    <number>412</number>
    <gfMin>30</gfMin>
    <gfMax>70</gfMax>
    <imperialUnits>true</imperialUnits>
    <startDate>Thu Nov  7 13:12:46 2019 UTC</startDate>
    <maxDepth>161</maxDepth>
    <maxTime>7260</maxTime>
    <endDate>Thu Nov  7 15:13:46 2019 UTC</endDate>
    <computerSerial>ABC123</computerSerial>
    <diveLogRecords>
      <diveLogRecord>
        <currentTime>0</currentTime>
        <currentDepth>0.0</currentDepth>
        <firstStopDepth>0</firstStopDepth>
        <ttsMins>0</ttsMins>
        <averagePPO2>0.7</averagePPO2>
        <fractionO2>0.18</fractionO2>
        <fractionHe>0.45</fractionHe>
        <firstStopTime>0</firstStopTime>
      </diveLogRecord>
      <diveLogRecord>
        <currentTime>10</currentTime>
        <currentDepth>12.4</currentDepth>
        <averagePPO2>0.9</averagePPO2>
        <fractionO2>0.18</fractionO2>
        <fractionHe>0.45</fractionHe>
      </diveLogRecord>
      <diveLogRecord>
        <currentTime>20</currentTime>
        <currentDepth>33.1</currentDepth>
        <averagePPO2>1.2</averagePPO2>
        <fractionO2>0.18</fractionO2>
        <fractionHe>0.45</fractionHe>
      </diveLogRecord>
    </diveLogRecords>
  </diveLog>
</dive>
"#;

    #[test]
    fn test_parse_sample_log() {
        let log = parse_str(SAMPLE_LOG).unwrap();

        assert_eq!(
            log.dive.start_time(),
            Utc.with_ymd_and_hms(2019, 11, 7, 13, 12, 46).unwrap()
        );
        assert_eq!(log.dive.units(), DepthUnits::Feet);
        assert_eq!(log.dive.samples().len(), 3);
        assert_eq!(
            log.dive.samples()[2],
            Sample {
                offset_sec: 20,
                depth: 33.1,
                average_ppo2: 1.2,
                fraction_o2: 0.18,
                fraction_he: 0.45,
            }
        );
        assert_eq!(log.header.number, Some(412));
        assert_eq!(log.header.gf_min, Some(30));
        assert_eq!(log.header.gf_max, Some(70));
    }

    #[test]
    fn test_header_display() {
        let log = parse_str(SAMPLE_LOG).unwrap();
        assert_eq!(
            log.header.to_string(),
            "log number=412, maxdepth=161, maxtime=7260, from Thu Nov  7 13:12:46 2019 UTC to Thu Nov  7 15:13:46 2019 UTC"
        );
    }

    #[test]
    fn test_metric_log_without_records() {
        let xml = r#"<dive><diveLog>
            <imperialUnits>false</imperialUnits>
            <startDate>Sat Jan 11 09:05:00 2020 UTC</startDate>
        </diveLog></dive>"#;
        let log = parse_str(xml).unwrap();
        assert_eq!(log.dive.units(), DepthUnits::Meters);
        assert!(log.dive.is_empty());
        assert_eq!(log.header.end_date, None);
    }

    #[test]
    fn test_invalid_start_date() {
        let xml = SAMPLE_LOG.replace("Thu Nov  7 13:12:46 2019 UTC</startDate>", "yesterday</startDate>");
        match parse_str(&xml) {
            Err(DiveLogError::InvalidStartDate { value, .. }) => assert_eq!(value, "yesterday"),
            other => panic!("expected InvalidStartDate, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse_str("<dive><diveLog><startDate>").unwrap_err();
        assert!(matches!(err, DiveLogError::Xml(_)));
    }

    #[test]
    fn test_out_of_order_records() {
        let xml = SAMPLE_LOG.replace("<currentTime>20</currentTime>", "<currentTime>5</currentTime>");
        let err = parse_str(&xml).unwrap_err();
        assert!(matches!(
            err,
            DiveLogError::OutOfOrderSample { index: 2, previous: 10, offset: 5 }
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let err = open("/nonexistent/dive.xml").unwrap_err();
        assert!(matches!(err, DiveLogError::Io(_)));
    }
}
