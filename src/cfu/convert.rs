use std::collections::BTreeSet;

use anyhow::Result;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::parsing::header::parse_header;
use super::parsing::lines::{LineReader, RawRecord};
use super::scdl::{map_to_scdl, ScdlRecord};
use super::tables::{write_raw_table, write_scdl_table};

pub const DEFAULT_DELIMITER: u8 = b',';

/// Summary reported alongside the two tables.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversionStats {
    pub exercice: String,
    pub siret: String,
    pub nom: String,
    pub lignes: usize,
    pub raw_cols: usize,
}

/// Output bundle of [`convert_cfu`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conversion {
    pub raw_csv: String,
    pub scdl_csv: String,
    pub stats: ConversionStats,
}

/// Convert one CFU document into the raw and SCDL tables.
///
/// Two independent passes over the same bytes: the header pass stops
/// early once the year and entity are known, the line pass then streams
/// every `LigneBudget`. The raw table's columns are the sorted union of
/// the columns seen across all lines, so identical input always renders
/// identical output.
pub fn convert_cfu(xml: &[u8], delimiter: u8) -> Result<Conversion> {
    let header = parse_header(xml)?;
    debug!(
        "parsed header: exercice={} siret={} nom={}",
        header.exercice, header.siret, header.nom
    );

    let mut rows: Vec<RawRecord> = Vec::new();
    let mut raw_fields: BTreeSet<String> = BTreeSet::new();

    let mut lines = LineReader::new(xml);
    while let Some(row) = lines.next_record()? {
        raw_fields.extend(row.keys().cloned());
        rows.push(row);
    }

    let raw_fields: Vec<String> = raw_fields.into_iter().collect();
    let raw_csv = write_raw_table(&rows, &raw_fields, delimiter)?;

    let scdl_rows: Vec<ScdlRecord> = rows.iter().map(|row| map_to_scdl(row, &header)).collect();
    let scdl_csv = write_scdl_table(&scdl_rows, delimiter)?;

    info!(
        "converted {} budget lines ({} raw columns)",
        rows.len(),
        raw_fields.len()
    );

    let stats = ConversionStats {
        exercice: header.exercice,
        siret: header.siret,
        nom: header.nom,
        lignes: rows.len(),
        raw_cols: raw_fields.len(),
    };

    Ok(Conversion {
        raw_csv,
        scdl_csv,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfu::parsing::tests::read_test_file;

    #[test]
    fn test_convert_fixture_document() {
        let content = read_test_file("cfu_sample.xml");
        let result = convert_cfu(content.as_bytes(), DEFAULT_DELIMITER).unwrap();

        assert_eq!(result.stats.exercice, "2023");
        assert_eq!(result.stats.siret, "21060152800012");
        assert_eq!(result.stats.nom, "Commune de Valbonne");
        assert_eq!(result.stats.lignes, 2);

        // Header row plus one data row per LigneBudget.
        assert_eq!(result.raw_csv.lines().count(), 3);
        assert_eq!(result.scdl_csv.lines().count(), 3);

        // Raw columns are the sorted union across both lines.
        let raw_header = result.raw_csv.lines().next().unwrap();
        let fields: Vec<&str> = raw_header.split(',').collect();
        assert_eq!(fields.len(), result.stats.raw_cols);
        let mut sorted = fields.clone();
        sorted.sort_unstable();
        assert_eq!(fields, sorted);
        assert!(fields.contains(&"MtSup_BudgetHorsRAR"));
        assert!(fields.contains(&"CaracSup_TypOpBudg"));
        assert!(fields.contains(&"LigneBudget_id"));
    }

    #[test]
    fn test_convert_fixture_scdl_rows() {
        let content = read_test_file("cfu_sample.xml");
        let result = convert_cfu(content.as_bytes(), DEFAULT_DELIMITER).unwrap();

        let mut lines = result.scdl_csv.lines();
        lines.next();
        let first = lines.next().unwrap();
        assert!(first.starts_with("L0001,compte administratif,2023,21060152800012,"));
        assert!(first.contains("dépense"));
        assert!(first.contains("non spécialisé"));
        let second = lines.next().unwrap();
        assert!(second.contains("recette"));
        assert!(second.contains("ordre"));
    }
}
