// src/aggregate.rs

use std::{collections::HashSet, sync::Arc};

use crate::dataset::{AggregatedDataset, ColumnData, RegionDataset};
use crate::error::{PipelineError, Result};
use crate::schema::{self, Schema};

/// Validate a region request. `None` means every known region in table
/// order. Unknown and repeated codes are rejected before any work is done.
pub fn resolve_regions(requested: Option<&[&str]>) -> Result<Vec<&'static str>> {
    let Some(requested) = requested else {
        return Ok(schema::region_codes().collect());
    };

    let mut seen = HashSet::with_capacity(requested.len());
    requested
        .iter()
        .map(|code| {
            let known = schema::region_codes()
                .find(|known| known == code)
                .ok_or_else(|| PipelineError::UnknownRegion(code.to_string()))?;
            if !seen.insert(known) {
                return Err(PipelineError::DuplicateRegion(code.to_string()));
            }
            Ok(known)
        })
        .collect()
}

/// Concatenate `parts` column by column, keeping their order and the row
/// order inside each part.
pub fn concat(schema: &Schema, parts: &[Arc<RegionDataset>]) -> Result<AggregatedDataset> {
    let types = schema.output_types();
    let mut columns: Vec<ColumnData> = types.iter().map(|ty| ColumnData::empty(*ty)).collect();

    for part in parts {
        part.validate(&types)
            .map_err(|reason| PipelineError::SchemaMismatch {
                region: part.region.clone(),
                reason,
            })?;
        for (out, col) in columns.iter_mut().zip(&part.columns) {
            // types were checked by `validate`
            out.extend_from(col);
        }
    }

    Ok(AggregatedDataset {
        names: schema.output_names(),
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::parse_records;
    use crate::schema::Column;

    fn schema() -> Schema {
        Schema::new(vec![Column::int("id"), Column::text("s", 4)])
    }

    fn region(code: &str, ids: &[i64]) -> Arc<RegionDataset> {
        let rows: Vec<Vec<String>> = ids
            .iter()
            .map(|id| vec![id.to_string(), format!("{}{}", code, id)])
            .collect();
        Arc::new(parse_records(&rows, &schema(), code))
    }

    #[test]
    fn default_request_is_every_region() {
        let all = resolve_regions(None).unwrap();
        assert_eq!(all.len(), 14);
        assert_eq!(all[0], "PHA");
    }

    #[test]
    fn rejects_unknown_and_duplicate_codes() {
        assert!(matches!(
            resolve_regions(Some(&["JHM", "XYZ"][..])),
            Err(PipelineError::UnknownRegion(code)) if code == "XYZ"
        ));
        assert!(matches!(
            resolve_regions(Some(&["JHM", "MSK", "JHM"][..])),
            Err(PipelineError::DuplicateRegion(code)) if code == "JHM"
        ));
        assert_eq!(
            resolve_regions(Some(&["ZLK", "MSK"][..])).unwrap(),
            vec!["ZLK", "MSK"]
        );
    }

    #[test]
    fn row_count_is_the_sum_in_request_order() {
        let r1 = region("MSK", &[1, 2, 3]);
        let r2 = region("JHM", &[7, 8]);
        let agg = concat(&schema(), &[Arc::clone(&r1), Arc::clone(&r2)]).unwrap();

        assert_eq!(agg.num_rows(), 5);
        assert_eq!(agg.names, vec!["id", "s", "region"]);
        assert_eq!(
            agg.column("id").and_then(ColumnData::as_integers),
            Some(&[1, 2, 3, 7, 8][..])
        );
        let regions = agg.column("region").and_then(ColumnData::as_texts).unwrap();
        assert!(regions[..3].iter().all(|r| r == "MSK"));
        assert!(regions[3..].iter().all(|r| r == "JHM"));
    }

    #[test]
    fn empty_request_keeps_the_schema() {
        let agg = concat(&schema(), &[]).unwrap();
        assert_eq!(agg.num_rows(), 0);
        assert_eq!(agg.columns.len(), 3);
    }

    #[test]
    fn mismatched_part_is_rejected() {
        let mut bad = (*region("PHA", &[1])).clone();
        bad.columns.pop();
        let err = concat(&schema(), &[Arc::new(bad)]).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch { .. }));
    }
}
