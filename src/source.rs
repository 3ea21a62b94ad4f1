//! Adapters from files to the raw inputs the pipeline consumes.
//!
//! Both are behind cargo features (`csv-source`, `geojson-source`) so the
//! core crate stays free of parsing dependencies.

#[cfg(feature = "csv-source")]
pub use self::csv_source::read_csv_records;
#[cfg(feature = "geojson-source")]
pub use self::geojson_source::features_from_geojson;

#[cfg(feature = "csv-source")]
mod csv_source {
    use std::io;

    use tracing::{debug, warn};

    use crate::core::RawRecord;
    use crate::error::{ChartError, ChartResult};

    /// Reads a header-first CSV into raw records.
    ///
    /// Headers and cells are trimmed; short rows are padded with empty cells
    /// and cells past the last header are dropped.
    pub fn read_csv_records<R: io::Read>(reader: R) -> ChartResult<Vec<RawRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();
        if headers.iter().all(String::is_empty) {
            return Err(ChartError::InvalidData(
                "CSV input contains no header row".to_owned(),
            ));
        }

        let mut records = Vec::new();
        for (line, result) in reader.records().enumerate() {
            let row = result?;
            if row.len() > headers.len() {
                warn!(
                    line = line + 2,
                    cells = row.len(),
                    headers = headers.len(),
                    "extra CSV cells ignored"
                );
            }
            let record: RawRecord = headers
                .iter()
                .enumerate()
                .map(|(index, header)| {
                    (header.clone(), row.get(index).unwrap_or("").trim().to_owned())
                })
                .collect();
            records.push(record);
        }

        debug!(records = records.len(), columns = headers.len(), "parsed CSV records");
        Ok(records)
    }
}

#[cfg(feature = "geojson-source")]
mod geojson_source {
    use geojson::{Feature, GeoJson};
    use indexmap::IndexMap;
    use tracing::debug;

    use crate::core::GeometryFeature;
    use crate::error::{ChartError, ChartResult};

    fn property_text(value: &serde_json::Value) -> Option<String> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }

    fn convert(feature: Feature) -> ChartResult<GeometryFeature> {
        let properties: IndexMap<String, String> = feature
            .properties
            .unwrap_or_default()
            .iter()
            .filter_map(|(name, value)| Some((name.clone(), property_text(value)?)))
            .collect();
        let shape = match feature.geometry {
            Some(geometry) => serde_json::to_value(&geometry)
                .map_err(|e| ChartError::InvalidData(format!("failed to encode geometry: {e}")))?,
            None => serde_json::Value::Null,
        };
        Ok(GeometryFeature { properties, shape })
    }

    /// Parses a GeoJSON document into geometry features.
    ///
    /// A feature collection yields one entry per feature; a bare feature or
    /// geometry yields a single entry (a geometry with no properties).
    pub fn features_from_geojson(input: &str) -> ChartResult<Vec<GeometryFeature>> {
        let features = match input.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(collection) => collection
                .features
                .into_iter()
                .map(convert)
                .collect::<ChartResult<Vec<_>>>()?,
            GeoJson::Feature(feature) => vec![convert(feature)?],
            GeoJson::Geometry(geometry) => vec![GeometryFeature::new(
                serde_json::to_value(&geometry).map_err(|e| {
                    ChartError::InvalidData(format!("failed to encode geometry: {e}"))
                })?,
            )],
        };
        debug!(features = features.len(), "parsed GeoJSON features");
        Ok(features)
    }
}
